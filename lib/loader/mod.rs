//! Loading functions into the IL.

pub mod json;

use crate::il;
use crate::Error;

pub use self::json::Json;

/// Generic trait for all loaders
pub trait Loader {
    /// The name of the function this loader provides.
    fn name(&self) -> &str;

    /// Build the function, with its first block as the entry block.
    fn function(&self) -> Result<il::Function, Error>;
}
