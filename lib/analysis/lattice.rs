//! The three-level lattice of constant values.
//!
//! ```text
//!              NotConstant
//!           /   /   |   \   \
//!   ... Constant(-1) Constant(0) Constant(1) ...
//!           \   \   |   /   /
//!               Undefined
//! ```
//!
//! Values only ever move up: an entity starts `Undefined`, may become a
//! `Constant`, and becomes `NotConstant` once two different constants reach
//! it.

use crate::il;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, PartialOrd};
use std::fmt;

/// The abstract value of a cell or value at some point.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Abstract {
    /// Nothing is known yet.
    #[default]
    Undefined,
    /// Exactly this value on every path analysed so far.
    Constant(i64),
    /// Provably varies.
    NotConstant,
}

impl Abstract {
    /// Combine two facts about the same entity.
    pub fn meet(self, other: Abstract) -> Abstract {
        match (self, other) {
            (Abstract::Undefined, x) | (x, Abstract::Undefined) => x,
            (Abstract::NotConstant, _) | (_, Abstract::NotConstant) => Abstract::NotConstant,
            (Abstract::Constant(lhs), Abstract::Constant(rhs)) => {
                if lhs == rhs {
                    Abstract::Constant(lhs)
                } else {
                    Abstract::NotConstant
                }
            }
        }
    }

    /// The position of this value in the lattice, from 0 for `Undefined` to
    /// 2 for `NotConstant`.
    pub fn height(&self) -> usize {
        match *self {
            Abstract::Undefined => 0,
            Abstract::Constant(_) => 1,
            Abstract::NotConstant => 2,
        }
    }

    /// Get the constant, if this is one.
    pub fn constant(&self) -> Option<i64> {
        match *self {
            Abstract::Constant(constant) => Some(constant),
            Abstract::Undefined | Abstract::NotConstant => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.constant().is_some()
    }

    pub fn is_not_constant(&self) -> bool {
        *self == Abstract::NotConstant
    }

    /// Interpret this value as a branch condition.
    pub fn truth(&self) -> Option<bool> {
        self.constant().map(|constant| constant != 0)
    }
}

impl PartialOrd for Abstract {
    fn partial_cmp(&self, other: &Abstract) -> Option<Ordering> {
        match (*self, *other) {
            (Abstract::Constant(lhs), Abstract::Constant(rhs)) => {
                if lhs == rhs {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }
            _ => Some(self.height().cmp(&other.height())),
        }
    }
}

impl From<i64> for Abstract {
    fn from(constant: i64) -> Abstract {
        Abstract::Constant(constant)
    }
}

impl fmt::Display for Abstract {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Abstract::Undefined => write!(f, "undef"),
            Abstract::Constant(constant) => write!(f, "{}", constant),
            Abstract::NotConstant => write!(f, "NAC"),
        }
    }
}

/// Apply `fold` when both operands are constants.
///
/// `NotConstant` wins over `Undefined`: once either side provably varies, so
/// does the result, whatever the other side turns out to be.
fn fold<F>(lhs: Abstract, rhs: Abstract, fold: F) -> Abstract
where
    F: Fn(i64, i64) -> Abstract,
{
    match (lhs, rhs) {
        (Abstract::NotConstant, _) | (_, Abstract::NotConstant) => Abstract::NotConstant,
        (Abstract::Undefined, _) | (_, Abstract::Undefined) => Abstract::Undefined,
        (Abstract::Constant(lhs), Abstract::Constant(rhs)) => fold(lhs, rhs),
    }
}

/// Fold a binary operation.
///
/// Division by zero, and arithmetic whose signed result does not fit in 64
/// bits, fold to `NotConstant`.
pub fn fold_binop(op: il::BinaryOperator, lhs: Abstract, rhs: Abstract) -> Abstract {
    fold(lhs, rhs, |lhs, rhs| {
        let result = match op {
            il::BinaryOperator::Add => lhs.checked_add(rhs),
            il::BinaryOperator::Sub => lhs.checked_sub(rhs),
            il::BinaryOperator::Mul => lhs.checked_mul(rhs),
            il::BinaryOperator::SDiv => lhs.checked_div(rhs),
        };
        result
            .map(Abstract::Constant)
            .unwrap_or(Abstract::NotConstant)
    })
}

/// Fold a comparison to `Constant(1)` or `Constant(0)`.
pub fn fold_compare(predicate: il::Predicate, lhs: Abstract, rhs: Abstract) -> Abstract {
    fold(lhs, rhs, |lhs, rhs| {
        Abstract::Constant(predicate.evaluate(lhs, rhs) as i64)
    })
}
