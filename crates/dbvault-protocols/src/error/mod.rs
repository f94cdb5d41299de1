//! Error types for the dbvault protocol layer.

mod archive;
mod source;

pub use archive::*;
pub use source::*;
