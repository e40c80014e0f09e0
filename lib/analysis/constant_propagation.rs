//! Sparse conditional constant propagation.
//!
//! ```
//! use constprop::analysis::{self, Abstract};
//! use constprop::il;
//!
//! # fn example() -> Result<(), constprop::Error> {
//! let mut cfg = il::ControlFlowGraph::new();
//! let c = cfg.new_value("c");
//! let entry = {
//!     let block = cfg.new_block("entry")?;
//!     block.compare(
//!         c,
//!         il::Predicate::Slt,
//!         il::Operand::constant(5),
//!         il::Operand::constant(10),
//!     );
//!     block.index()
//! };
//! let then = cfg.new_block("then")?.index();
//! let otherwise = cfg.new_block("else")?.index();
//! cfg.branch(entry, c.into(), then, otherwise)?;
//! cfg.set_entry(entry)?;
//!
//! let function = il::Function::with_control_flow_graph("f", cfg);
//! let result = analysis::analyze(&function)?;
//!
//! assert_eq!(result.exit_value(entry, &c.into()), Abstract::Constant(1));
//! assert!(result.is_unreachable(otherwise));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::analysis::{Abstract, BlockState, Driver, Options};
use crate::il;
use crate::Error;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Analyse `function` with the default options.
pub fn analyze(function: &il::Function) -> Result<AnalysisResult, Error> {
    analyze_with_options(function, &Options::default())
}

/// Analyse `function`.
///
/// Fails with `Error::MalformedCfg` if the function breaks the structural
/// rules checked by `il::ControlFlowGraph::validate`, and with
/// `Error::UnboundedIteration` if the analysis does not settle within the
/// sweep cap.
pub fn analyze_with_options(
    function: &il::Function,
    options: &Options,
) -> Result<AnalysisResult, Error> {
    let mut driver = Driver::new(function, options)?;
    driver.run()?;
    let (states, reachability, sweeps) = driver.into_parts();
    Ok(AnalysisResult {
        states,
        reachability,
        sweeps,
    })
}

/// The stable result of analysing one function.
///
/// Unreachable blocks have no state, and read as `Undefined` everywhere.
/// Nothing they define reaches any other block.
#[derive(Clone, Debug)]
pub struct AnalysisResult {
    states: FxHashMap<usize, BlockState>,
    reachability: crate::analysis::Reachability,
    sweeps: usize,
}

impl AnalysisResult {
    /// The final state of a block.
    pub fn block_state(&self, block: usize) -> Option<&BlockState> {
        self.states.get(&block)
    }

    /// The value of `entity` immediately after the instruction at
    /// `location`.
    pub fn value_of(&self, location: &il::Location, entity: &il::Entity) -> Abstract {
        self.block_state(location.block_index())
            .map(|state| state.after(location.instruction_index(), entity))
            .unwrap_or_default()
    }

    /// The value of `entity` immediately before the instruction at
    /// `location`.
    pub fn value_before(&self, location: &il::Location, entity: &il::Entity) -> Abstract {
        self.block_state(location.block_index())
            .map(|state| state.get(location.instruction_index(), entity))
            .unwrap_or_default()
    }

    pub fn entry_value(&self, block: usize, entity: &il::Entity) -> Abstract {
        self.block_state(block)
            .map(|state| state.entry_value(entity))
            .unwrap_or_default()
    }

    pub fn exit_value(&self, block: usize, entity: &il::Entity) -> Abstract {
        self.block_state(block)
            .map(|state| state.exit_value(entity))
            .unwrap_or_default()
    }

    pub fn is_unreachable(&self, block: usize) -> bool {
        self.reachability.is_unreachable(block)
    }

    /// Returns true if the branch at `head` never transfers control to
    /// `tail`.
    pub fn is_edge_dead(&self, head: usize, tail: usize) -> bool {
        self.reachability.is_edge_dead(head, tail)
    }

    /// Every block proven unreachable, in program order.
    pub fn unreachable_blocks(&self) -> Vec<usize> {
        self.reachability.unreachable_blocks().collect()
    }

    pub fn reachability(&self) -> &crate::analysis::Reachability {
        &self.reachability
    }

    /// The number of sweeps it took to reach a fixed point.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Every entity which is `NotConstant` on entry to, or after some
    /// instruction in, a reachable block.
    pub fn not_constant(&self) -> BTreeSet<il::Entity> {
        let mut not_constant = BTreeSet::new();
        for (block, state) in &self.states {
            if self.is_unreachable(*block) {
                continue;
            }
            not_constant.extend(
                state
                    .entry()
                    .iter()
                    .filter(|(_, value)| value.is_not_constant())
                    .map(|(entity, _)| *entity),
            );
            not_constant.extend(
                state
                    .definitions()
                    .filter(|(_, _, value)| value.is_not_constant())
                    .map(|(entity, _, _)| entity),
            );
        }
        not_constant
    }
}
