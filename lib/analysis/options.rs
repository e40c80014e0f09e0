use std::default;

/// Options which change the behavior of the analysis.
#[derive(Clone, Debug)]
pub struct Options {
    max_sweeps: Option<usize>,
    prune_unreachable: bool,
}

impl Options {
    /// Create a new set of Options with the default settings.
    pub fn new() -> Options {
        Options::default()
    }

    /// Set the maximum number of sweeps before the analysis gives up.
    pub fn set_max_sweeps(&mut self, max_sweeps: Option<usize>) {
        self.max_sweeps = max_sweeps;
    }

    /// The maximum number of sweeps over the function before the analysis
    /// fails with `Error::UnboundedIteration`.
    ///
    /// When `None`, a bound is computed from the size of the function. Every
    /// tracked value can only move up the lattice twice, so a correct
    /// analysis never comes near it.
    pub fn max_sweeps(&self) -> Option<usize> {
        self.max_sweeps
    }

    /// Set the value of the, "Prune unreachable," option.
    pub fn set_prune_unreachable(&mut self, prune_unreachable: bool) {
        self.prune_unreachable = prune_unreachable;
    }

    /// Whether branches with constant conditions remove blocks from the
    /// analysis.
    ///
    /// On by default. Without pruning, every block contributes to every
    /// merge, and the analysis is plain constant propagation.
    pub fn prune_unreachable(&self) -> bool {
        self.prune_unreachable
    }
}

impl default::Default for Options {
    fn default() -> Options {
        Options {
            max_sweeps: None,
            prune_unreachable: true,
        }
    }
}

/// Create your options with the builder pattern.
///
/// For more details on the options, see `analysis::Options`
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Create a new builder for analysis options.
    pub fn new() -> OptionsBuilder {
        OptionsBuilder {
            options: Options::default(),
        }
    }

    /// Set the, "Max sweeps," option. By default this is computed from the
    /// function.
    pub fn max_sweeps(mut self, max_sweeps: usize) -> OptionsBuilder {
        self.options.max_sweeps = Some(max_sweeps);
        self
    }

    /// Set the, "Prune unreachable," option. By default this is true.
    pub fn prune_unreachable(mut self, prune_unreachable: bool) -> OptionsBuilder {
        self.options.prune_unreachable = prune_unreachable;
        self
    }

    pub fn build(self) -> Options {
        self.options
    }
}

impl default::Default for OptionsBuilder {
    fn default() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}
