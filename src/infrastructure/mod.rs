//! Infrastructure layer: I/O implementations
//!
//! This layer implements the storage boundary used by the CLI.

pub mod error;
pub mod store;

pub use error::{InfraError, InfraResult};
pub use store::{load_nested, read_json, write_json, write_json_stdout, ItemStore, JsonFileStore};
