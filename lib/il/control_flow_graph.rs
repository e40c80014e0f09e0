//! A `ControlFlowGraph` is a directed `Graph` of `Block` and `Edge`.

use crate::il::*;
use crate::{graph, Error};
use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A directed graph of types `Block` and `Edge`.
///
/// The `ControlFlowGraph` also owns the cells and values of its function,
/// handing out fresh ones through `new_cell` and `new_value` and keeping
/// their names for display.
///
/// # Program order
/// Blocks are visited in the order of their indices, which is the order in
/// which they were created with `new_block`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, Default)]
pub struct ControlFlowGraph {
    // The internal graph used to store our blocks.
    graph: graph::Graph<Block, Edge>,
    // The next index to use when creating a basic block.
    next_index: usize,
    // An optional entry index for the graph.
    entry: Option<usize>,
    // Names of every cell, indexed by `Cell::index`.
    cells: Vec<String>,
    // Names of every value, indexed by `Value::index`.
    values: Vec<String>,
}

impl ControlFlowGraph {
    pub fn new() -> ControlFlowGraph {
        ControlFlowGraph::default()
    }

    /// Sets the entry point for this `ControlFlowGraph` to the given `Block` index.
    pub fn set_entry(&mut self, entry: usize) -> Result<(), Error> {
        if self.graph.has_vertex(entry) {
            self.entry = Some(entry);
            return Ok(());
        }
        Err(Error::GraphVertexNotFound(entry))
    }

    /// Get the entry `Block` index for this `ControlFlowGraph`.
    pub fn entry(&self) -> Option<usize> {
        self.entry
    }

    /// Get a `Block` by index.
    pub fn block(&self, index: usize) -> Result<&Block, Error> {
        self.graph.vertex(index)
    }

    /// Get a mutable reference to a `Block` by index.
    pub fn block_mut(&mut self, index: usize) -> Result<&mut Block, Error> {
        self.graph.vertex_mut(index)
    }

    /// Get every `Block` in this `ControlFlowGraph`, in program order.
    pub fn blocks(&self) -> Vec<&Block> {
        self.graph.vertices()
    }

    /// Get the number of blocks in this `ControlFlowGraph`.
    pub fn num_blocks(&self) -> usize {
        self.graph.num_vertices()
    }

    /// Get an `Edge` by its head and tail `Block` indices.
    pub fn edge(&self, head: usize, tail: usize) -> Result<&Edge, Error> {
        self.graph.edge(head, tail)
    }

    /// Get every `Edge` in this `ControlFlowGraph`.
    pub fn edges(&self) -> Vec<&Edge> {
        self.graph.edges()
    }

    /// Get the indices of every predecessor of a `Block` in this `ControlFlowGraph`.
    pub fn predecessor_indices(&self, index: usize) -> Result<Vec<usize>, Error> {
        self.graph.predecessor_indices(index)
    }

    /// Get the indices of every successor of a `Block` in this `ControlFlowGraph`.
    pub fn successor_indices(&self, index: usize) -> Result<Vec<usize>, Error> {
        self.graph.successor_indices(index)
    }

    /// Creates a new basic block, adds it to the graph, and returns it
    pub fn new_block<S: Into<String>>(&mut self, name: S) -> Result<&mut Block, Error> {
        let next_index = self.next_index;
        self.next_index += 1;
        let block = Block::new(next_index, name);
        self.graph.insert_vertex(block)?;
        self.graph.vertex_mut(next_index)
    }

    /// Creates a new cell with the given name.
    pub fn new_cell<S: Into<String>>(&mut self, name: S) -> Cell {
        self.cells.push(name.into());
        Cell::new(self.cells.len() - 1)
    }

    /// Creates a new value with the given name.
    pub fn new_value<S: Into<String>>(&mut self, name: S) -> Value {
        self.values.push(name.into());
        Value::new(self.values.len() - 1)
    }

    /// The number of cells created in this `ControlFlowGraph`.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// The number of values created in this `ControlFlowGraph`.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Get the name given to a cell when it was created.
    pub fn cell_name(&self, cell: Cell) -> Option<&str> {
        self.cells.get(cell.index()).map(|name| name.as_str())
    }

    /// Get the name given to a value when it was created.
    pub fn value_name(&self, value: Value) -> Option<&str> {
        self.values.get(value.index()).map(|name| name.as_str())
    }

    /// A display name for an entity, `@name` for cells and `%name` for values.
    ///
    /// Falls back to the index form when the entity does not belong to this
    /// graph.
    pub fn entity_name(&self, entity: &Entity) -> String {
        match *entity {
            Entity::Cell(cell) => match self.cell_name(cell) {
                Some(name) => format!("@{}", name),
                None => cell.to_string(),
            },
            Entity::Value(value) => match self.value_name(value) {
                Some(name) => format!("%{}", name),
                None => value.to_string(),
            },
        }
    }

    /// Format an operand using the names of its values.
    pub fn operand_string(&self, operand: &Operand) -> String {
        match *operand {
            Operand::Constant(constant) => constant.to_string(),
            Operand::Value(value) => self.entity_name(&value.into()),
        }
    }

    fn block_name(&self, index: usize) -> String {
        self.block(index)
            .map(|block| block.name().to_string())
            .unwrap_or_else(|_| format!("0x{:X}", index))
    }

    /// Format an operation using the names of its cells, values and blocks.
    pub fn operation_string(&self, operation: &Operation) -> String {
        match *operation {
            Operation::Alloc { cell } => format!("{} = alloc", self.entity_name(&cell.into())),
            Operation::Load { dst, cell } => format!(
                "{} = load {}",
                self.entity_name(&dst.into()),
                self.entity_name(&cell.into())
            ),
            Operation::Store { cell, ref src } => format!(
                "store {}, {}",
                self.entity_name(&cell.into()),
                self.operand_string(src)
            ),
            Operation::BinOp {
                dst,
                op,
                ref lhs,
                ref rhs,
            } => format!(
                "{} = {} {}, {}",
                self.entity_name(&dst.into()),
                op,
                self.operand_string(lhs),
                self.operand_string(rhs)
            ),
            Operation::Compare {
                dst,
                predicate,
                ref lhs,
                ref rhs,
            } => format!(
                "{} = icmp {} {}, {}",
                self.entity_name(&dst.into()),
                predicate,
                self.operand_string(lhs),
                self.operand_string(rhs)
            ),
            Operation::Branch {
                ref condition,
                true_target,
                false_target,
            } => format!(
                "br {}, {}, {}",
                self.operand_string(condition),
                self.block_name(true_target),
                self.block_name(false_target)
            ),
            Operation::Jump { target } => format!("jmp {}", self.block_name(target)),
        }
    }

    /// Terminates `head` with an unconditional jump to `target`.
    pub fn jump(&mut self, head: usize, target: usize) -> Result<(), Error> {
        self.terminate(
            head,
            Operation::Jump { target },
            vec![Edge::new(head, target, None)],
        )
    }

    /// Terminates `head` with a conditional branch.
    ///
    /// When both targets are the same block, a single unconditional edge is
    /// created.
    pub fn branch(
        &mut self,
        head: usize,
        condition: Operand,
        true_target: usize,
        false_target: usize,
    ) -> Result<(), Error> {
        let edges = if true_target == false_target {
            vec![Edge::new(head, true_target, None)]
        } else {
            vec![
                Edge::new(head, true_target, Some(Guard::new(condition, true))),
                Edge::new(head, false_target, Some(Guard::new(condition, false))),
            ]
        };
        self.terminate(
            head,
            Operation::Branch {
                condition,
                true_target,
                false_target,
            },
            edges,
        )
    }

    fn terminate(
        &mut self,
        head: usize,
        operation: Operation,
        edges: Vec<Edge>,
    ) -> Result<(), Error> {
        for edge in &edges {
            if !self.graph.has_vertex(edge.tail()) {
                return Err(Error::MalformedCfg(format!(
                    "block 0x{:X} branches to missing block 0x{:X}",
                    head,
                    edge.tail()
                )));
            }
        }

        let block = self.graph.vertex_mut(head)?;
        if block.terminator().is_some() {
            return Err(Error::MalformedCfg(format!(
                "block 0x{:X} already has a terminator",
                head
            )));
        }
        block.push(operation);

        for edge in edges {
            self.graph.insert_edge(edge)?;
        }

        Ok(())
    }

    /// Checks the structural invariants the analysis relies on.
    ///
    /// * An entry block is set.
    /// * A terminator only ever appears as the last instruction of a block.
    /// * Every target of a terminator exists.
    /// * The edges out of every block are exactly the targets of its
    ///   terminator. A block without a terminator has no successors.
    /// * Every value is defined by at most one instruction.
    pub fn validate(&self) -> Result<(), Error> {
        let entry = self
            .entry
            .ok_or_else(|| Error::MalformedCfg("no entry block".to_string()))?;
        if !self.graph.has_vertex(entry) {
            return Err(Error::MalformedCfg(format!(
                "entry block 0x{:X} does not exist",
                entry
            )));
        }

        let mut definitions: FxHashMap<Value, Location> = FxHashMap::default();

        for block in self.blocks() {
            for instruction in block.instructions() {
                if let Some(Entity::Value(value)) = instruction.entity_written() {
                    let location = Location::new(block.index(), instruction.index());
                    if let Some(first) = definitions.insert(value, location) {
                        return Err(Error::MalformedCfg(format!(
                            "{} is defined at {} and again at {}",
                            self.entity_name(&value.into()),
                            first,
                            location
                        )));
                    }
                }
            }

            let last = block.instructions().len().saturating_sub(1);
            if let Some(instruction) = block
                .instructions()
                .iter()
                .find(|instruction| instruction.is_terminator() && instruction.index() != last)
            {
                return Err(Error::MalformedCfg(format!(
                    "block 0x{:X} has a terminator at 0x{:02X} which is not its last instruction",
                    block.index(),
                    instruction.index()
                )));
            }

            let mut targets = block
                .terminator()
                .map(|terminator| terminator.operation().targets())
                .unwrap_or_default();
            if let Some(missing) = targets.iter().find(|&&target| !self.graph.has_vertex(target)) {
                return Err(Error::MalformedCfg(format!(
                    "block 0x{:X} branches to missing block 0x{:X}",
                    block.index(),
                    missing
                )));
            }
            targets.sort_unstable();

            if targets != self.successor_indices(block.index())? {
                return Err(Error::MalformedCfg(format!(
                    "edges out of block 0x{:X} do not match its terminator",
                    block.index()
                )));
            }
        }

        let unreachable = self.graph.unreachable_vertices(entry)?;
        if !unreachable.is_empty() {
            debug!(
                "{} blocks have no path from the entry block",
                unreachable.len()
            );
        }

        Ok(())
    }
}
