use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An `Operation` with a position in a `Block`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Instruction {
    operation: Operation,
    index: usize,
}

impl Instruction {
    pub(crate) fn new(index: usize, operation: Operation) -> Instruction {
        Instruction { operation, index }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// The position of this instruction within its block.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_terminator(&self) -> bool {
        self.operation.is_terminator()
    }

    pub fn entity_written(&self) -> Option<Entity> {
        self.operation.entity_written()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02X} {}", self.index, self.operation)
    }
}
