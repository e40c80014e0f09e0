//! Blocks and edges proven never to execute.
//!
//! Both sets only ever grow. An edge is dead when the branch at its head has
//! been decided the other way. A block is unreachable when it has at least
//! one predecessor, and every edge into it is dead or leaves an unreachable
//! block. The entry block is never unreachable.

use crate::il;
use crate::Error;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Reachability {
    unreachable: BTreeSet<usize>,
    dead_edges: BTreeSet<(usize, usize)>,
}

impl Reachability {
    pub fn new() -> Reachability {
        Reachability::default()
    }

    pub fn is_unreachable(&self, block: usize) -> bool {
        self.unreachable.contains(&block)
    }

    /// Returns true if the branch at `head` was decided away from `tail`.
    pub fn is_edge_dead(&self, head: usize, tail: usize) -> bool {
        self.dead_edges.contains(&(head, tail))
    }

    /// Returns true if control may flow from `head` to `tail`.
    pub fn is_edge_live(&self, head: usize, tail: usize) -> bool {
        !self.is_unreachable(head) && !self.is_edge_dead(head, tail)
    }

    /// Unreachable blocks, in program order.
    pub fn unreachable_blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.unreachable.iter().cloned()
    }

    pub fn dead_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.dead_edges.iter().cloned()
    }

    /// The number of facts learned so far. Never decreases.
    pub fn len(&self) -> usize {
        self.unreachable.len() + self.dead_edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record that control never flows from `head` to `tail`, and mark every
    /// block this cuts off as unreachable.
    ///
    /// Returns true if anything new was learned.
    pub fn kill_edge(
        &mut self,
        control_flow_graph: &il::ControlFlowGraph,
        head: usize,
        tail: usize,
    ) -> Result<bool, Error> {
        if !self.dead_edges.insert((head, tail)) {
            return Ok(false);
        }
        debug!("edge 0x{:X} -> 0x{:X} is dead", head, tail);
        self.propagate(control_flow_graph, tail)?;
        Ok(true)
    }

    fn propagate(
        &mut self,
        control_flow_graph: &il::ControlFlowGraph,
        start: usize,
    ) -> Result<(), Error> {
        let mut queue = vec![start];

        while let Some(block) = queue.pop() {
            if self.is_unreachable(block) || control_flow_graph.entry() == Some(block) {
                continue;
            }

            let predecessors = control_flow_graph.predecessor_indices(block)?;
            if predecessors.is_empty()
                || predecessors
                    .iter()
                    .any(|&predecessor| self.is_edge_live(predecessor, block))
            {
                continue;
            }

            debug!("block 0x{:X} is unreachable", block);
            self.unreachable.insert(block);
            queue.extend(control_flow_graph.successor_indices(block)?);
        }

        Ok(())
    }
}
