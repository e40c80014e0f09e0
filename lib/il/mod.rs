//! Constprop Intermediate Language.
//!
//! # An Introduction
//!
//! The IL is a small register/stack form for a single function, closely
//! following the shape of unoptimised compiler output: locals live in stack
//! cells, and every read or write of a local goes through a `load` or a
//! `store`. Arithmetic and comparisons operate on SSA values.
//!
//! ## Limitations
//!
//! * Integers only. Every value is a signed 64-bit integer.
//! * No calls, globals or memory other than the function's own cells.
//!
//! # Components of the IL
//!
//! ## `Cell`, `Value`, `Operand` and `Entity`
//!
//! A `Cell` is a stack slot created by `alloc`, and may be overwritten any
//! number of times by `store`. A `Value` is the result of a `load`, `BinOp`
//! or `Compare`, and is normally defined by a single instruction. An `Operand` is either a literal integer or
//! a `Value`. An `Entity` is either a `Cell` or a `Value`, and is what the
//! analysis attaches abstract values to.
//!
//! Cells and values are created by the `ControlFlowGraph`, which remembers
//! their names. Their identity is their index, never their name.
//!
//! ## `Operation`
//!
//! * `Alloc`: Create a cell.
//! * `Load`: Read a cell into a value.
//! * `Store`: Overwrite a cell with an operand.
//! * `BinOp`: `add`, `sub`, `mul` or `sdiv` over two operands.
//! * `Compare`: `eq`, `ne`, `slt`, `sle`, `sgt` or `sge` over two operands,
//!   producing `1` for true and `0` for false.
//! * `Branch`: Transfer control to one of two blocks depending on whether a
//!   condition is non-zero.
//! * `Jump`: Transfer control unconditionally.
//!
//! ## `Instruction` and `Block`
//!
//! An `Instruction` gives an `Operation` a position within a `Block`. A
//! `Block` is a sequence of instructions, ended by at most one `Branch` or
//! `Jump`. A block with no terminator is an exit block.
//!
//! ## `ControlFlowGraph` and `Function`
//!
//! A `ControlFlowGraph` is a directed graph of `Block` and `Edge`. Edges are
//! created together with the terminator that implies them, through
//! `ControlFlowGraph::branch` and `ControlFlowGraph::jump`. A `Function`
//! names a `ControlFlowGraph`.
//!
//! ## `Location`
//!
//! A `Location` names one instruction of a function by block index and
//! position.

mod block;
mod control_flow_graph;
mod edge;
mod function;
mod instruction;
mod location;
mod operand;
mod operation;

pub use self::block::*;
pub use self::control_flow_graph::*;
pub use self::edge::*;
pub use self::function::*;
pub use self::instruction::*;
pub use self::location::*;
pub use self::operand::*;
pub use self::operation::*;
