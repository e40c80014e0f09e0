//! Sparse conditional constant propagation over the IL.
//!
//! The analysis is built from small pieces, leaves first:
//!
//! * `lattice`: the `Abstract` value of an entity, `meet`, and folding.
//! * `state`: the `BlockState` of every definition in one block.
//! * `transfer`: running the instructions of one block.
//! * `merge`: the state on entry to a block from its predecessors.
//! * `reachability`: dead edges and unreachable blocks.
//! * `fixed_point`: the `Driver` which sweeps until stable.
//!
//! Most users want `analyze`, which returns an `AnalysisResult`.

mod constant_propagation;
pub mod fixed_point;
mod lattice;
pub mod merge;
mod options;
mod reachability;
mod state;
pub mod transfer;

pub use self::constant_propagation::{analyze, analyze_with_options, AnalysisResult};
pub use self::fixed_point::{Driver, DriverState};
pub use self::lattice::{fold_binop, fold_compare, Abstract};
pub use self::options::{Options, OptionsBuilder};
pub use self::reachability::Reachability;
pub use self::state::BlockState;
