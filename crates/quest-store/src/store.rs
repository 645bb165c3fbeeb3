//! In-memory append-only version store.
//!
//! Each exploration id owns an arena of immutable snapshots: snapshot `v`
//! lives at index `v - 1` and the current version is the highest index.
//! Reverting copies an old snapshot forward as a brand-new version; history
//! is never truncated or rewritten.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quest_model::Exploration;

use crate::error::{Result, StoreError};

/// One entry of an exploration's commit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub version: u32,
    pub committer_id: String,
    pub commit_message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct VersionedExploration {
    pub(crate) snapshots: Vec<Exploration>,
    pub(crate) commits: Vec<CommitRecord>,
}

impl VersionedExploration {
    fn current_version(&self) -> u32 {
        self.snapshots.len() as u32
    }
}

/// Append-only store of exploration version histories, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionStore {
    pub(crate) records: BTreeMap<String, VersionedExploration>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, exploration_id: &str) -> bool {
        self.records.contains_key(exploration_id)
    }

    pub fn exploration_ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    fn record(&self, exploration_id: &str) -> Result<&VersionedExploration> {
        self.records
            .get(exploration_id)
            .ok_or_else(|| StoreError::NotFound {
                exploration_id: exploration_id.to_string(),
                version: None,
            })
    }

    /// Store a brand-new exploration as version 1.
    pub fn save_new(&mut self, committer_id: &str, mut exploration: Exploration) -> Result<u32> {
        let exploration_id = exploration.id.clone();
        if self.records.contains_key(&exploration_id) {
            return Err(StoreError::AlreadyExists { exploration_id });
        }
        exploration.version = 1;
        let commit = CommitRecord {
            version: 1,
            committer_id: committer_id.to_string(),
            commit_message: format!("New exploration created with title '{}'.", exploration.title),
            created_at: Utc::now(),
        };
        self.records.insert(
            exploration_id.clone(),
            VersionedExploration {
                snapshots: vec![exploration],
                commits: vec![commit],
            },
        );
        tracing::info!(%exploration_id, "stored new exploration");
        Ok(1)
    }

    /// Fetch a snapshot; `None` means the latest version.
    pub fn get(&self, exploration_id: &str, version: Option<u32>) -> Result<&Exploration> {
        let record = self.record(exploration_id)?;
        match version {
            None => record
                .snapshots
                .last()
                .ok_or_else(|| StoreError::NotFound {
                    exploration_id: exploration_id.to_string(),
                    version: None,
                }),
            Some(version) => {
                if version == 0 {
                    return Err(StoreError::NotFound {
                        exploration_id: exploration_id.to_string(),
                        version: Some(version),
                    });
                }
                record
                    .snapshots
                    .get(version as usize - 1)
                    .ok_or_else(|| StoreError::NotFound {
                        exploration_id: exploration_id.to_string(),
                        version: Some(version),
                    })
            }
        }
    }

    pub fn current_version(&self, exploration_id: &str) -> Result<u32> {
        Ok(self.record(exploration_id)?.current_version())
    }

    /// Append the next snapshot. The snapshot must carry exactly
    /// `current_version + 1`.
    pub fn append(
        &mut self,
        committer_id: &str,
        exploration: Exploration,
        commit_message: &str,
    ) -> Result<u32> {
        let exploration_id = exploration.id.clone();
        let record =
            self.records
                .get_mut(&exploration_id)
                .ok_or_else(|| StoreError::NotFound {
                    exploration_id: exploration_id.clone(),
                    version: None,
                })?;
        let expected = record.current_version() + 1;
        if exploration.version != expected {
            return Err(StoreError::NonContiguousVersion {
                expected,
                found: exploration.version,
            });
        }
        record.commits.push(CommitRecord {
            version: expected,
            committer_id: committer_id.to_string(),
            commit_message: commit_message.to_string(),
            created_at: Utc::now(),
        });
        record.snapshots.push(exploration);
        tracing::info!(%exploration_id, version = expected, "appended snapshot");
        Ok(expected)
    }

    /// Copy the snapshot at `revert_to` forward as a new version.
    ///
    /// The target must lie in `[1, current_version - 1]`: reverting to the
    /// present, the future, or version 0 is rejected.
    pub fn revert(&mut self, committer_id: &str, exploration_id: &str, revert_to: i64) -> Result<u32> {
        let current = self.current_version(exploration_id)? as i64;
        if revert_to < 1 || revert_to >= current {
            return Err(StoreError::CannotRevert { version: revert_to });
        }
        let mut snapshot = self.get(exploration_id, Some(revert_to as u32))?.clone();
        snapshot.version = current as u32 + 1;
        let version = self.append(
            committer_id,
            snapshot,
            &format!("Reverted exploration to version {revert_to}"),
        )?;
        tracing::info!(exploration_id, revert_to, version, "reverted exploration");
        Ok(version)
    }

    /// The commit log, oldest first.
    pub fn history(&self, exploration_id: &str) -> Result<&[CommitRecord]> {
        Ok(&self.record(exploration_id)?.commits)
    }

    /// Drop an exploration and its whole history.
    pub fn delete(&mut self, exploration_id: &str) -> Result<()> {
        if self.records.remove(exploration_id).is_none() {
            return Err(StoreError::NotFound {
                exploration_id: exploration_id.to_string(),
                version: None,
            });
        }
        tracing::info!(exploration_id, "deleted exploration");
        Ok(())
    }
}
