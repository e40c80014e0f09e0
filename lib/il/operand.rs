//! Cells, values, and the operands which refer to them.
//!
//! A `Cell` is a mutable stack slot created by an `alloc`. A `Value` is an
//! immutable SSA definition. Both are identified by their index within the
//! `ControlFlowGraph` which created them, never by name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar stack slot, the target of `alloc`, `load` and `store`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Cell {
    index: usize,
}

impl Cell {
    pub(crate) fn new(index: usize) -> Cell {
        Cell { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "@{}", self.index)
    }
}

/// An SSA value, defined by exactly one instruction.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Value {
    index: usize,
}

impl Value {
    pub(crate) fn new(index: usize) -> Value {
        Value { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{}", self.index)
    }
}

/// Anything the analysis tracks an abstract value for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Entity {
    Value(Value),
    Cell(Cell),
}

impl From<Value> for Entity {
    fn from(value: Value) -> Entity {
        Entity::Value(value)
    }
}

impl From<Cell> for Entity {
    fn from(cell: Cell) -> Entity {
        Entity::Cell(cell)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Entity::Value(ref value) => value.fmt(f),
            Entity::Cell(ref cell) => cell.fmt(f),
        }
    }
}

/// The input to an operation: a literal integer, or a previously defined
/// value.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Operand {
    Constant(i64),
    Value(Value),
}

impl Operand {
    /// Create a literal operand.
    pub fn constant(value: i64) -> Operand {
        Operand::Constant(value)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Operand {
        Operand::Value(value)
    }
}

impl From<i64> for Operand {
    fn from(constant: i64) -> Operand {
        Operand::Constant(constant)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operand::Constant(constant) => write!(f, "{}", constant),
            Operand::Value(ref value) => value.fmt(f),
        }
    }
}
