//! An `Edge` is a direct edge between `Block` in `ControlFlowGraph`
//!
//! Edges created by a `Branch` are guarded: they are taken only when the
//! branch condition matches `Guard::taken_when`. Edges created by a `Jump`,
//! or by a `Branch` whose targets coincide, are unconditional.
//!
//! To create a new edge, call `ControlFlowGraph::branch` or
//! `ControlFlowGraph::jump`.

use crate::graph;
use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The condition under which a guarded edge is taken.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Guard {
    condition: Operand,
    taken_when: bool,
}

impl Guard {
    pub fn new(condition: Operand, taken_when: bool) -> Guard {
        Guard {
            condition,
            taken_when,
        }
    }

    pub fn condition(&self) -> &Operand {
        &self.condition
    }

    /// Whether this edge is taken when the condition is true or false.
    pub fn taken_when(&self) -> bool {
        self.taken_when
    }
}

/// Edge between IL blocks
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Edge {
    head: usize,
    tail: usize,
    guard: Option<Guard>,
}

impl Edge {
    pub(crate) fn new(head: usize, tail: usize, guard: Option<Guard>) -> Edge {
        Edge { head, tail, guard }
    }

    /// Retrieve the guard for this `Edge`.
    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    /// Retrieve the index of the head `Vertex` for this `Edge`.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Retrieve the index of the tail `Vertex` for this `Edge`.
    pub fn tail(&self) -> usize {
        self.tail
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.guard {
            Some(ref guard) => write!(
                f,
                "(0x{:X}->0x{:X}) ? ({} == {})",
                self.head, self.tail, guard.condition, guard.taken_when
            ),
            None => write!(f, "(0x{:X}->0x{:X})", self.head, self.tail),
        }
    }
}

impl graph::Edge for Edge {
    fn head(&self) -> usize {
        self.head
    }
    fn tail(&self) -> usize {
        self.tail
    }
    fn dot_label(&self) -> String {
        match self.guard {
            Some(ref guard) => format!("{} == {}", guard.condition, guard.taken_when),
            None => "".to_string(),
        }
    }
}
