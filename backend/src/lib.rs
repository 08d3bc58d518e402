//! Variable provider backed by JSON snapshots of a kernel's variables.

pub mod dump;
pub mod provider;

pub use dump::{SnapshotError, VariableDump, load_dump, parse_dump, sample_dump};
pub use provider::{DEFAULT_PAGE_SIZE, SnapshotVariableProvider};
