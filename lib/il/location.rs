//! A point in a function: an instruction, named by its block index and its
//! position within that block.

use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The location of an `Instruction` in a `Function`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Location {
    block: usize,
    instruction: usize,
}

impl Location {
    pub fn new(block: usize, instruction: usize) -> Location {
        Location { block, instruction }
    }

    /// The index of the block this location belongs to.
    pub fn block_index(&self) -> usize {
        self.block
    }

    /// The position of the instruction within its block.
    pub fn instruction_index(&self) -> usize {
        self.instruction
    }

    /// Find the `Instruction` this location points to.
    pub fn apply<'f>(&self, function: &'f Function) -> Result<&'f Instruction, Error> {
        function.block(self.block)?.instruction(self.instruction)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:X}:{:02X}", self.block, self.instruction)
    }
}
