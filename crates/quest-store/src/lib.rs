//! Append-only version storage for explorations.
//!
//! Reverting never rewrites history: the targeted snapshot is copied forward
//! as a brand-new version, so every previously stored version stays
//! retrievable unchanged.

mod error;
mod io;
mod store;

pub use error::{Result, StoreError};
pub use io::{
    STORE_SCHEMA, STORE_SCHEMA_VERSION, load_envelope, load_store, save_envelope, save_store,
};
pub use store::{CommitRecord, VersionStore};
