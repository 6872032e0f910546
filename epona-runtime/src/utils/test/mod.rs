//! Helpers shared by unit and integration tests: nodes and network layers that record what reaches
//! them, so tests can assert on it afterwards.
mod collectors;
pub use self::collectors::*;
