//! Per-block abstract state.
//!
//! A `BlockState` holds the state on entry to a block, and every definition
//! made inside the block keyed by entity and then by instruction position.
//! Reading an entity at a position finds the latest definition strictly
//! before that position, falling back to the entry state.

use crate::analysis::Abstract;
use crate::il;
use rustc_hash::FxHashMap;

/// The abstract state of one block.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BlockState {
    entry: FxHashMap<il::Entity, Abstract>,
    // Sorted by position.
    definitions: FxHashMap<il::Entity, Vec<(usize, Abstract)>>,
}

impl BlockState {
    pub fn new(entry: FxHashMap<il::Entity, Abstract>) -> BlockState {
        BlockState {
            entry,
            definitions: FxHashMap::default(),
        }
    }

    /// The state on entry to the block.
    pub fn entry(&self) -> &FxHashMap<il::Entity, Abstract> {
        &self.entry
    }

    /// The value of an entity on entry to the block.
    pub fn entry_value(&self, entity: &il::Entity) -> Abstract {
        self.entry.get(entity).cloned().unwrap_or_default()
    }

    /// The value of an entity immediately before the instruction at
    /// `position` executes.
    pub fn get(&self, position: usize, entity: &il::Entity) -> Abstract {
        self.definitions
            .get(entity)
            .and_then(|definitions| {
                let before = definitions.partition_point(|&(p, _)| p < position);
                before.checked_sub(1).map(|index| definitions[index].1)
            })
            .unwrap_or_else(|| self.entry_value(entity))
    }

    /// The value of an entity immediately after the instruction at
    /// `position` executes.
    pub fn after(&self, position: usize, entity: &il::Entity) -> Abstract {
        self.get(position + 1, entity)
    }

    /// The value recorded at exactly `position`, if the instruction there
    /// defined `entity`.
    pub fn definition(&self, position: usize, entity: &il::Entity) -> Option<Abstract> {
        self.definitions.get(entity).and_then(|definitions| {
            definitions
                .binary_search_by_key(&position, |&(p, _)| p)
                .ok()
                .map(|index| definitions[index].1)
        })
    }

    /// Record the value of `entity` as defined by the instruction at
    /// `position`.
    pub fn set(&mut self, position: usize, entity: il::Entity, value: Abstract) {
        let definitions = self.definitions.entry(entity).or_default();
        match definitions.binary_search_by_key(&position, |&(p, _)| p) {
            Ok(index) => definitions[index].1 = value,
            Err(index) => definitions.insert(index, (position, value)),
        }
    }

    /// The value of an entity after the last instruction of the block.
    pub fn exit_value(&self, entity: &il::Entity) -> Abstract {
        self.definitions
            .get(entity)
            .and_then(|definitions| definitions.last())
            .map(|&(_, value)| value)
            .unwrap_or_else(|| self.entry_value(entity))
    }

    /// The state after the last instruction of the block.
    pub fn exit(&self) -> FxHashMap<il::Entity, Abstract> {
        let mut exit = self.entry.clone();
        for (entity, definitions) in &self.definitions {
            if let Some(&(_, value)) = definitions.last() {
                exit.insert(*entity, value);
            }
        }
        exit
    }

    /// Every definition made in this block as `(entity, position, value)`.
    pub fn definitions(&self) -> impl Iterator<Item = (il::Entity, usize, Abstract)> + '_ {
        self.definitions.iter().flat_map(|(entity, definitions)| {
            definitions
                .iter()
                .map(move |&(position, value)| (*entity, position, value))
        })
    }
}
