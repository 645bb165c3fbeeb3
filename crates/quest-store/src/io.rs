//! Store file I/O.
//!
//! Payloads are persisted as a JSON envelope carrying a schema name and
//! version, written atomically (temp file + rename) so a crash cannot leave
//! a half-written file behind. The envelope functions are generic so higher
//! layers can persist aggregates that embed a [`VersionStore`] the same way.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Result, StoreError};
use crate::store::VersionStore;

/// Schema identifier of a bare store file.
pub const STORE_SCHEMA: &str = "quest.version-store";

/// Current store file schema version.
pub const STORE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    schema: String,
    schema_version: u32,
    payload: T,
}

/// Save any serializable payload under a schema envelope at `path`,
/// creating parent directories as needed.
pub fn save_envelope<T: Serialize>(
    schema: &str,
    schema_version: u32,
    payload: &T,
    path: &Path,
) -> Result<()> {
    let envelope = Envelope {
        schema: schema.to_string(),
        schema_version,
        payload,
    };
    let json = serde_json::to_string_pretty(&envelope)
        .map_err(|source| StoreError::Serialization { source })?;

    let temp_path = path.with_extension("json.tmp");
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut file = File::create(&temp_path).map_err(|source| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    file.write_all(json.as_bytes())
        .map_err(|source| StoreError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;
    file.sync_all().map_err(|source| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| StoreError::Io {
        operation: "rename",
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Saved {} to {}", schema, path.display());
    Ok(())
}

/// Load a payload previously written by [`save_envelope`], checking the
/// schema name and rejecting files written by a newer schema version.
pub fn load_envelope<T: DeserializeOwned>(
    schema: &str,
    max_schema_version: u32,
    path: &Path,
) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let envelope: Envelope<T> =
        serde_json::from_str(&contents).map_err(|error| StoreError::InvalidFormat {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;
    if envelope.schema != schema {
        return Err(StoreError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("unexpected schema {:?}", envelope.schema),
        });
    }
    if envelope.schema_version > max_schema_version {
        return Err(StoreError::UnsupportedVersion {
            found: envelope.schema_version,
            max_supported: max_schema_version,
        });
    }
    tracing::debug!("Loaded {} from {}", schema, path.display());
    Ok(envelope.payload)
}

/// Save a bare store to `path`.
pub fn save_store(store: &VersionStore, path: &Path) -> Result<()> {
    save_envelope(STORE_SCHEMA, STORE_SCHEMA_VERSION, store, path)
}

/// Load a bare store previously written by [`save_store`].
pub fn load_store(path: &Path) -> Result<VersionStore> {
    load_envelope(STORE_SCHEMA, STORE_SCHEMA_VERSION, path)
}
