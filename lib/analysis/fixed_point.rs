//! Sweeping a function until nothing changes.
//!
//! Each sweep visits the blocks of a function in program order. For every
//! block that is not unreachable, the state on entry is merged from the exit
//! states of its live predecessors, and the transfer function is run over
//! the block's instructions. Sweeping stops at the first sweep which changes
//! no value and learns nothing about reachability.
//!
//! # Branch decisions
//!
//! A branch is only decided during a sweep when the state on entry to its
//! block is final, meaning every live predecessor was analysed from a final
//! entry earlier in the run. Decisions in blocks which sit inside, or after,
//! a loop wait for the fixed point. There, every branch whose condition is a
//! constant is decided at once, and sweeping resumes if an edge died.
//!
//! Values only rise from one sweep to the next, so a block which has already
//! been analysed keeps whatever flowed into it along an edge that later
//! dies. When that happens the driver restarts: every state is dropped and
//! sweeping begins again from the entry block, keeping every dead edge and
//! unreachable block. Reachability only grows across restarts, and there is
//! at most one restart per edge.

use crate::analysis::transfer::{self, Decision};
use crate::analysis::{merge, BlockState, Options, Reachability};
use crate::il;
use crate::Error;
use log::{debug, info, trace};
use rustc_hash::{FxHashMap, FxHashSet};

/// Where a `Driver` is in its run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DriverState {
    /// At least one more sweep is needed.
    Sweeping,
    /// The last sweep changed nothing.
    Stable,
}

/// Computes a default cap on the number of sweeps for `function`.
///
/// Between restarts, every sweep but the last analyses a block for the
/// first time, records a new value, raises a recorded value, or kills an
/// edge. A value is recorded for every instruction which writes an entity,
/// and for every entity on entry to every block, and each can rise at most
/// twice. Every restart follows the death of an edge.
pub fn sweep_bound(function: &il::Function) -> usize {
    let control_flow_graph = function.control_flow_graph();
    let blocks = control_flow_graph.num_blocks();
    let edges = control_flow_graph.edges().len();
    let definitions = function
        .blocks()
        .into_iter()
        .flat_map(|block| block.instructions())
        .filter(|instruction| instruction.entity_written().is_some())
        .count();
    let entities = control_flow_graph.num_cells() + control_flow_graph.num_values();
    let slots = definitions + blocks * entities;

    (edges + 1) * (3 * slots + blocks + edges + 1)
}

/// Runs the analysis over one function.
pub struct Driver<'f> {
    function: &'f il::Function,
    prune: bool,
    states: FxHashMap<usize, BlockState>,
    reachability: Reachability,
    // Blocks analysed from an entry state which can no longer change.
    final_blocks: FxHashSet<usize>,
    // An edge died after values had flowed along it.
    stale: bool,
    restarts: usize,
    sweeps: usize,
    max_sweeps: usize,
    state: DriverState,
}

impl<'f> Driver<'f> {
    /// Validate `function` and prepare to analyse it.
    pub fn new(function: &'f il::Function, options: &Options) -> Result<Driver<'f>, Error> {
        function.control_flow_graph().validate()?;

        let max_sweeps = options
            .max_sweeps()
            .unwrap_or_else(|| sweep_bound(function));
        debug!(
            "analysing {} with {} blocks, at most {} sweeps",
            function.name(),
            function.control_flow_graph().num_blocks(),
            max_sweeps
        );

        Ok(Driver {
            function,
            prune: options.prune_unreachable(),
            states: FxHashMap::default(),
            reachability: Reachability::new(),
            final_blocks: FxHashSet::default(),
            stale: false,
            restarts: 0,
            sweeps: 0,
            max_sweeps,
            state: DriverState::Sweeping,
        })
    }

    pub fn function(&self) -> &'f il::Function {
        self.function
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The number of sweeps run so far.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    pub fn max_sweeps(&self) -> usize {
        self.max_sweeps
    }

    /// The number of times every state was dropped because an edge died
    /// after values had already flowed along it.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// The state of a block as of the last sweep. `None` if the block has
    /// never been analysed.
    pub fn block_state(&self, block: usize) -> Option<&BlockState> {
        self.states.get(&block)
    }

    pub fn reachability(&self) -> &Reachability {
        &self.reachability
    }

    fn apply(&mut self, decision: Decision) -> Result<bool, Error> {
        if !self.prune {
            return Ok(false);
        }
        trace!(
            "block 0x{:X} always branches to 0x{:X}",
            decision.head(),
            decision.taken()
        );
        let killed = self.reachability.kill_edge(
            self.function.control_flow_graph(),
            decision.head(),
            decision.untaken(),
        )?;

        // Unreachable blocks are never analysed after a restart, so one
        // with a state was cut off in this run.
        if killed
            && (self.states.contains_key(&decision.untaken())
                || self
                    .reachability
                    .unreachable_blocks()
                    .any(|block| self.states.contains_key(&block)))
        {
            self.stale = true;
        }

        Ok(killed)
    }

    fn restart(&mut self) {
        debug!(
            "restarting {} after {} sweeps, {} dead edges",
            self.function.name(),
            self.sweeps,
            self.reachability.dead_edges().count()
        );
        self.states.clear();
        self.final_blocks.clear();
        self.stale = false;
        self.restarts += 1;
    }

    /// Run one sweep over every block. Returns true if anything changed.
    pub fn sweep(&mut self) -> Result<bool, Error> {
        let function = self.function;
        let control_flow_graph = function.control_flow_graph();
        let mut changed = false;

        self.sweeps += 1;
        trace!("sweep {}", self.sweeps);

        for block in control_flow_graph.blocks() {
            let index = block.index();
            if self.reachability.is_unreachable(index) {
                continue;
            }

            let predecessors =
                merge::live_predecessors(control_flow_graph, index, &self.reachability)?;
            let previous = self.states.get(&index);

            let entry = match (merge::merge(&predecessors, &self.states), previous) {
                (Some(mut merged), Some(previous)) => {
                    merge::meet_into(&mut merged, previous.entry());
                    merged
                }
                (Some(merged), None) => merged,
                (None, Some(previous)) => previous.entry().clone(),
                (None, None) => FxHashMap::default(),
            };

            let is_final = predecessors
                .iter()
                .all(|predecessor| self.final_blocks.contains(predecessor));

            let transfer = transfer::transfer(block, entry, previous);

            if previous != Some(&transfer.state) {
                changed = true;
            }
            self.states.insert(index, transfer.state);

            if is_final {
                self.final_blocks.insert(index);
                if let Some(decision) = transfer.decision {
                    changed |= self.apply(decision)?;
                }
            }
        }

        Ok(changed)
    }

    /// Decide every branch whose condition is a constant in the current
    /// state. Only sound once a sweep has changed nothing.
    ///
    /// Returns true if an edge died.
    pub fn resolve_branches(&mut self) -> Result<bool, Error> {
        let function = self.function;
        let mut decisions = Vec::new();
        for block in function.blocks() {
            if self.reachability.is_unreachable(block.index()) {
                continue;
            }
            if let Some(state) = self.states.get(&block.index()) {
                decisions.extend(transfer::decision(block, state));
            }
        }

        let mut changed = false;
        for decision in decisions {
            changed |= self.apply(decision)?;
        }
        Ok(changed)
    }

    /// Run one sweep, and on a sweep which changes nothing, resolve the
    /// remaining branches. Restarts when an edge died after values flowed
    /// along it.
    pub fn step(&mut self) -> Result<DriverState, Error> {
        if self.state == DriverState::Stable {
            return Ok(self.state);
        }
        if self.sweeps >= self.max_sweeps {
            return Err(Error::UnboundedIteration {
                sweeps: self.sweeps,
            });
        }

        let changed = self.sweep()? || self.resolve_branches()?;
        if self.stale {
            self.restart();
        } else if !changed {
            info!(
                "{} stable after {} sweeps, {} unreachable blocks",
                self.function.name(),
                self.sweeps,
                self.reachability.unreachable_blocks().count()
            );
            self.state = DriverState::Stable;
        }

        Ok(self.state)
    }

    /// Sweep until stable.
    pub fn run(&mut self) -> Result<(), Error> {
        while self.step()? == DriverState::Sweeping {}
        Ok(())
    }

    /// Give up the results of a stable run.
    pub(crate) fn into_parts(self) -> (FxHashMap<usize, BlockState>, Reachability, usize) {
        (self.states, self.reachability, self.sweeps)
    }
}
