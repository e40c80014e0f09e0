use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed integer arithmetic.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    SDiv,
}

impl BinaryOperator {
    pub fn mnemonic(&self) -> &'static str {
        match *self {
            BinaryOperator::Add => "add",
            BinaryOperator::Sub => "sub",
            BinaryOperator::Mul => "mul",
            BinaryOperator::SDiv => "sdiv",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Signed integer comparison predicates.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Predicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl Predicate {
    pub fn mnemonic(&self) -> &'static str {
        match *self {
            Predicate::Eq => "eq",
            Predicate::Ne => "ne",
            Predicate::Slt => "slt",
            Predicate::Sle => "sle",
            Predicate::Sgt => "sgt",
            Predicate::Sge => "sge",
        }
    }

    /// Evaluate this predicate over two concrete operands.
    pub fn evaluate(&self, lhs: i64, rhs: i64) -> bool {
        match *self {
            Predicate::Eq => lhs == rhs,
            Predicate::Ne => lhs != rhs,
            Predicate::Slt => lhs < rhs,
            Predicate::Sle => lhs <= rhs,
            Predicate::Sgt => lhs > rhs,
            Predicate::Sge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// An IL Operation updates some state.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Operation {
    /// Create a fresh stack slot.
    Alloc { cell: Cell },
    /// Read the current contents of a cell into dst.
    Load { dst: Value, cell: Cell },
    /// Overwrite the contents of a cell.
    Store { cell: Cell, src: Operand },
    /// Signed integer arithmetic.
    BinOp {
        dst: Value,
        op: BinaryOperator,
        lhs: Operand,
        rhs: Operand,
    },
    /// Signed comparison, producing 1 for true and 0 for false.
    Compare {
        dst: Value,
        predicate: Predicate,
        lhs: Operand,
        rhs: Operand,
    },
    /// Branch to `true_target` if condition is non-zero, else `false_target`.
    Branch {
        condition: Operand,
        true_target: usize,
        false_target: usize,
    },
    /// Unconditional transfer to target.
    Jump { target: usize },
}

impl Operation {
    /// Returns true if this operation ends a block.
    pub fn is_terminator(&self) -> bool {
        matches!(*self, Operation::Branch { .. } | Operation::Jump { .. })
    }

    /// The entity this operation defines or overwrites, if any.
    pub fn entity_written(&self) -> Option<Entity> {
        match *self {
            Operation::Alloc { cell } | Operation::Store { cell, .. } => Some(cell.into()),
            Operation::Load { dst, .. }
            | Operation::BinOp { dst, .. }
            | Operation::Compare { dst, .. } => Some(dst.into()),
            Operation::Branch { .. } | Operation::Jump { .. } => None,
        }
    }

    /// The indices of the blocks this operation may transfer control to.
    pub fn targets(&self) -> Vec<usize> {
        match *self {
            Operation::Branch {
                true_target,
                false_target,
                ..
            } => {
                if true_target == false_target {
                    vec![true_target]
                } else {
                    vec![true_target, false_target]
                }
            }
            Operation::Jump { target } => vec![target],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operation::Alloc { ref cell } => write!(f, "{} = alloc", cell),
            Operation::Load { ref dst, ref cell } => write!(f, "{} = load {}", dst, cell),
            Operation::Store { ref cell, ref src } => write!(f, "store {}, {}", cell, src),
            Operation::BinOp {
                ref dst,
                ref op,
                ref lhs,
                ref rhs,
            } => write!(f, "{} = {} {}, {}", dst, op, lhs, rhs),
            Operation::Compare {
                ref dst,
                ref predicate,
                ref lhs,
                ref rhs,
            } => write!(f, "{} = icmp {} {}, {}", dst, predicate, lhs, rhs),
            Operation::Branch {
                ref condition,
                true_target,
                false_target,
            } => write!(
                f,
                "br {}, 0x{:X}, 0x{:X}",
                condition, true_target, false_target
            ),
            Operation::Jump { target } => write!(f, "jmp 0x{:X}", target),
        }
    }
}
