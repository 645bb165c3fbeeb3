//! Editorial service for explorations.
//!
//! Composes the rights gate, the change-list applier, the version store and
//! the stats ledger behind the operations an HTTP frontend exposes, and maps
//! every failure to an HTTP status and JSON payload.

mod error;
mod service;

pub use error::{EditorError, Result};
pub use service::{DownloadArtifact, EditorService, NewStateTemplate};

/// Schema identifier of a persisted editor workspace.
pub const WORKSPACE_SCHEMA: &str = "quest.workspace";

/// Current workspace file schema version.
pub const WORKSPACE_SCHEMA_VERSION: u32 = 1;
