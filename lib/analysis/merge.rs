//! Computing the state on entry to a block from its predecessors.

use crate::analysis::{Abstract, BlockState, Reachability};
use crate::il;
use crate::Error;
use rustc_hash::FxHashMap;

/// Predecessors of `block` whose edge into `block` may be taken.
pub fn live_predecessors(
    control_flow_graph: &il::ControlFlowGraph,
    block: usize,
    reachability: &Reachability,
) -> Result<Vec<usize>, Error> {
    Ok(control_flow_graph
        .predecessor_indices(block)?
        .into_iter()
        .filter(|&predecessor| reachability.is_edge_live(predecessor, block))
        .collect())
}

/// Meet the exit states of every live predecessor analysed so far.
///
/// Returns `None` when no predecessor qualifies, in which case the entry
/// state of the block should be left as it was. An entity missing from some
/// predecessors is `Undefined` there, and so takes the value of the others.
pub fn merge(
    predecessors: &[usize],
    states: &FxHashMap<usize, BlockState>,
) -> Option<FxHashMap<il::Entity, Abstract>> {
    let mut exits = predecessors
        .iter()
        .filter_map(|predecessor| states.get(predecessor))
        .map(|state| state.exit());

    let first = exits.next()?;

    Some(exits.fold(first, |mut merged, exit| {
        meet_into(&mut merged, &exit);
        merged
    }))
}

/// Pointwise `meet` of `other` into `target`.
pub fn meet_into(
    target: &mut FxHashMap<il::Entity, Abstract>,
    other: &FxHashMap<il::Entity, Abstract>,
) {
    for (entity, value) in other {
        let target_value = target.entry(*entity).or_default();
        *target_value = target_value.meet(*value);
    }
}
