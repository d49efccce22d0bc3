//! Data types for the command relay
//!
//! This module contains the core value types shared by the registry, the
//! router and both ingress paths.

mod command;
mod error;
mod role;

pub use command::{normalize_meta, Command};
pub use error::RelayError;
pub use role::{RegistrationPolicy, Role};

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
