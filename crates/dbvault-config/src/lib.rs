//! # dbvault Config
//!
//! Configuration management for dbvault: TOML schema, loading with
//! environment substitution and overrides, and validation.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::{ConfigLoader, ENV_OVERRIDES};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
