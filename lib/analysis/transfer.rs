//! The transfer function over one block.

use crate::analysis::{fold_binop, fold_compare, Abstract, BlockState};
use crate::il;
use log::trace;
use rustc_hash::FxHashMap;

/// A conditional branch whose condition is known.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Decision {
    head: usize,
    taken: usize,
    untaken: usize,
}

impl Decision {
    /// The block ending in the branch.
    pub fn head(&self) -> usize {
        self.head
    }

    /// The successor control always flows to.
    pub fn taken(&self) -> usize {
        self.taken
    }

    /// The successor whose edge is dead.
    pub fn untaken(&self) -> usize {
        self.untaken
    }
}

/// The state of a block after running it, and the decision for its
/// terminating branch if the condition is a constant.
#[derive(Clone, Debug)]
pub struct Transfer {
    pub state: BlockState,
    pub decision: Option<Decision>,
}

fn decide(head: usize, operation: &il::Operation, condition: Abstract) -> Option<Decision> {
    let (true_target, false_target) = match *operation {
        il::Operation::Branch {
            true_target,
            false_target,
            ..
        } if true_target != false_target => (true_target, false_target),
        _ => return None,
    };

    condition.truth().map(|truth| {
        if truth {
            Decision {
                head,
                taken: true_target,
                untaken: false_target,
            }
        } else {
            Decision {
                head,
                taken: false_target,
                untaken: true_target,
            }
        }
    })
}

fn operand_value(state: &BlockState, position: usize, operand: &il::Operand) -> Abstract {
    match *operand {
        il::Operand::Constant(constant) => Abstract::Constant(constant),
        il::Operand::Value(value) => state.get(position, &value.into()),
    }
}

/// The condition of the branch terminating `block`, if it has one.
fn branch_condition(block: &il::Block) -> Option<il::Operand> {
    block
        .terminator()
        .and_then(|terminator| match *terminator.operation() {
            il::Operation::Branch { condition, .. } => Some(condition),
            _ => None,
        })
}

/// Run every instruction of `block` in order, starting from `entry`.
///
/// Every recorded value is met with the value recorded at the same position
/// by `previous`, so values never move down the lattice between runs.
pub fn transfer(
    block: &il::Block,
    entry: FxHashMap<il::Entity, Abstract>,
    previous: Option<&BlockState>,
) -> Transfer {
    let mut state = BlockState::new(entry);
    let mut decision = None;

    for instruction in block.instructions() {
        let position = instruction.index();

        let (entity, value) = match *instruction.operation() {
            il::Operation::Alloc { cell } => (cell.into(), Abstract::Undefined),
            il::Operation::Load { dst, cell } => (dst.into(), state.get(position, &cell.into())),
            il::Operation::Store { cell, ref src } => {
                (cell.into(), operand_value(&state, position, src))
            }
            il::Operation::BinOp {
                dst,
                op,
                ref lhs,
                ref rhs,
            } => (
                dst.into(),
                fold_binop(
                    op,
                    operand_value(&state, position, lhs),
                    operand_value(&state, position, rhs),
                ),
            ),
            il::Operation::Compare {
                dst,
                predicate,
                ref lhs,
                ref rhs,
            } => (
                dst.into(),
                fold_compare(
                    predicate,
                    operand_value(&state, position, lhs),
                    operand_value(&state, position, rhs),
                ),
            ),
            il::Operation::Branch { ref condition, .. } => {
                decision = decide(
                    block.index(),
                    instruction.operation(),
                    operand_value(&state, position, condition),
                );
                continue;
            }
            il::Operation::Jump { .. } => continue,
        };

        let value = match previous.and_then(|previous| previous.definition(position, &entity)) {
            Some(previous) => value.meet(previous),
            None => value,
        };
        trace!("0x{:X}:{:02X} {} = {}", block.index(), position, entity, value);
        state.set(position, entity, value);
    }

    Transfer { state, decision }
}

/// Decide the branch terminating `block` from a state already computed for
/// it.
pub fn decision(block: &il::Block, state: &BlockState) -> Option<Decision> {
    let terminator = block.terminator()?;
    let condition = branch_condition(block)?;
    decide(
        block.index(),
        terminator.operation(),
        operand_value(state, terminator.index(), &condition),
    )
}
