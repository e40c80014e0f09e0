use crate::graph;
use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A basic block.
///
/// Instructions are appended through the methods on `Block`. Terminators
/// create edges, so they are appended through `ControlFlowGraph::branch`
/// and `ControlFlowGraph::jump` instead.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Block {
    /// The index of the block.
    index: usize,
    /// A human-readable label for the block.
    name: String,
    /// The instructions for this block.
    instructions: Vec<Instruction>,
}

impl Block {
    pub(crate) fn new<S: Into<String>>(index: usize, name: S) -> Block {
        Block {
            index,
            name: name.into(),
            instructions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, operation: Operation) {
        let index = self.instructions.len();
        self.instructions.push(Instruction::new(index, operation));
    }

    /// Returns the index of this block
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns this block's instructions
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns an instruction by index
    pub fn instruction(&self, index: usize) -> Result<&Instruction, Error> {
        self.instructions.get(index).ok_or_else(|| {
            Error::Custom(format!(
                "No instruction with index {} in block 0x{:X}",
                index, self.index
            ))
        })
    }

    /// The last instruction of this block, if it is a `Branch` or `Jump`.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions
            .last()
            .filter(|instruction| instruction.is_terminator())
    }

    /// Returns true if this block has no instructions
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Adds an alloc operation to the end of this block.
    pub fn alloc(&mut self, cell: Cell) {
        self.push(Operation::Alloc { cell });
    }

    /// Adds a load operation to the end of this block.
    pub fn load(&mut self, dst: Value, cell: Cell) {
        self.push(Operation::Load { dst, cell });
    }

    /// Adds a store operation to the end of this block.
    pub fn store(&mut self, cell: Cell, src: Operand) {
        self.push(Operation::Store { cell, src });
    }

    /// Adds a binary operation to the end of this block.
    pub fn binop(&mut self, dst: Value, op: BinaryOperator, lhs: Operand, rhs: Operand) {
        self.push(Operation::BinOp { dst, op, lhs, rhs });
    }

    /// Adds a comparison to the end of this block.
    pub fn compare(&mut self, dst: Value, predicate: Predicate, lhs: Operand, rhs: Operand) {
        self.push(Operation::Compare {
            dst,
            predicate,
            lhs,
            rhs,
        });
    }
}

impl graph::Vertex for Block {
    fn index(&self) -> usize {
        self.index
    }

    fn dot_label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ Block: 0x{:X} {} ]", self.index, self.name)?;
        for instruction in self.instructions() {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
