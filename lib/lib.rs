//! Constprop: sparse conditional constant propagation.
//!
//! Constprop analyses a single function, expressed in a small register/stack
//! intermediate language, and determines for every definition point whether
//! the value defined there is a known constant, not yet known, or provably
//! not a constant. Branches whose conditions fold to constants prune the
//! blocks they can never reach.
//!
//! ```
//! use constprop::analysis;
//! use constprop::il;
//!
//! let mut function = il::Function::new("straight_line");
//! let cfg = function.control_flow_graph_mut();
//!
//! let x = cfg.new_cell("x");
//! let y = cfg.new_value("y");
//! let z = cfg.new_value("z");
//!
//! let block = cfg.new_block("entry").unwrap();
//! block.alloc(x);
//! block.store(x, il::Operand::constant(5));
//! block.load(y, x);
//! block.binop(z, il::BinaryOperator::Add, y.into(), il::Operand::constant(3));
//! let index = block.index();
//!
//! cfg.set_entry(index).unwrap();
//!
//! let result = analysis::analyze(&function).unwrap();
//! let exit = il::Entity::from(z);
//! assert_eq!(
//!     result.exit_value(index, &exit),
//!     analysis::Abstract::Constant(8)
//! );
//! ```

pub mod analysis;
pub mod graph;
pub mod il;
pub mod loader;
pub mod report;
#[cfg(test)]
mod tests;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum Error {
        #[error("Malformed control flow graph: {0}")]
        MalformedCfg(String),
        #[error("Analysis did not reach a fixed point within {sweeps} sweeps")]
        UnboundedIteration { sweeps: usize },
        #[error("The graph has no vertex with index {0}")]
        GraphVertexNotFound(usize),
        #[error("The graph has no edge 0x{0:X} -> 0x{1:X}")]
        GraphEdgeNotFound(usize, usize),
        #[error("Failed to load function: {0}")]
        Loader(String),
        #[error("Json error: {0}")]
        Json(#[from] serde_json::Error),
        #[error("Io error: {0}")]
        Io(#[from] std::io::Error),
        #[error("{0}")]
        Custom(String),
    }

    impl From<&str> for Error {
        fn from(s: &str) -> Error {
            Error::Custom(s.to_string())
        }
    }

    impl From<String> for Error {
        fn from(s: String) -> Error {
            Error::Custom(s)
        }
    }
}

pub use error::Error;
