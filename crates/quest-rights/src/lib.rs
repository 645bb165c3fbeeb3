//! Rights records and capability evaluation.
//!
//! Permissions are computed by pure functions over `(actor, rights record,
//! platform config)` rather than by dispatch on a role hierarchy, so every
//! decision is a deterministic function of its inputs and can be tested
//! without any surrounding service.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RightsError {
    #[error("Ownership cannot be reassigned")]
    CannotAssignOwner,
}

/// Role of a user on a single exploration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Editor,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Publication status of an exploration. The only transition is
/// private -> public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Private,
    Public,
}

/// Per-exploration role assignments and publication status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationRights {
    pub exploration_id: String,
    pub owner_id: String,
    #[serde(default)]
    pub editor_ids: BTreeSet<String>,
    #[serde(default)]
    pub viewer_ids: BTreeSet<String>,
    pub status: PublicationStatus,
}

impl ExplorationRights {
    /// A fresh rights record for a private exploration.
    pub fn new(exploration_id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            exploration_id: exploration_id.into(),
            owner_id: owner_id.into(),
            editor_ids: BTreeSet::new(),
            viewer_ids: BTreeSet::new(),
            status: PublicationStatus::Private,
        }
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn is_editor(&self, user_id: &str) -> bool {
        self.editor_ids.contains(user_id)
    }

    pub fn is_viewer(&self, user_id: &str) -> bool {
        self.viewer_ids.contains(user_id)
    }

    /// The strongest role the user holds on this exploration.
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        if self.is_owner(user_id) {
            Some(Role::Owner)
        } else if self.is_editor(user_id) {
            Some(Role::Editor)
        } else if self.is_viewer(user_id) {
            Some(Role::Viewer)
        } else {
            None
        }
    }

    /// Grant `role` to `user_id`. Ownership is fixed at creation.
    pub fn assign(&mut self, user_id: &str, role: Role) -> Result<(), RightsError> {
        match role {
            Role::Owner => return Err(RightsError::CannotAssignOwner),
            Role::Editor => {
                self.viewer_ids.remove(user_id);
                self.editor_ids.insert(user_id.to_string());
            }
            Role::Viewer => {
                self.editor_ids.remove(user_id);
                self.viewer_ids.insert(user_id.to_string());
            }
        }
        Ok(())
    }

    /// One-way transition to public.
    pub fn publish(&mut self) {
        self.status = PublicationStatus::Public;
    }
}

/// The authenticated user a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub username: String,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// Process-wide moderation and administration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub banned_usernames: BTreeSet<String>,
    #[serde(default)]
    pub admin_usernames: BTreeSet<String>,
}

impl PlatformConfig {
    pub fn is_banned(&self, username: &str) -> bool {
        self.banned_usernames.contains(username)
    }

    pub fn is_admin(&self, username: &str) -> bool {
        self.admin_usernames.contains(username)
    }

    pub fn ban(&mut self, username: impl Into<String>) {
        self.banned_usernames.insert(username.into());
    }

    pub fn add_admin(&mut self, username: impl Into<String>) {
        self.admin_usernames.insert(username.into());
    }
}

/// Anyone may view a public exploration; a private one is visible to its
/// owner and assigned collaborators only. Bans do not remove read access.
pub fn can_view(actor: &Actor, rights: &ExplorationRights) -> bool {
    match rights.status {
        PublicationStatus::Public => true,
        PublicationStatus::Private => rights.role_of(&actor.user_id).is_some(),
    }
}

/// Owners and editors may edit, unless the actor's username is banned.
pub fn can_edit(actor: &Actor, rights: &ExplorationRights, config: &PlatformConfig) -> bool {
    if config.is_banned(&actor.username) {
        return false;
    }
    matches!(
        rights.role_of(&actor.user_id),
        Some(Role::Owner) | Some(Role::Editor)
    )
}

/// A private exploration is deletable by its owner only; a public one by a
/// site administrator only.
pub fn can_delete(actor: &Actor, rights: &ExplorationRights, config: &PlatformConfig) -> bool {
    match rights.status {
        PublicationStatus::Private => rights.is_owner(&actor.user_id),
        PublicationStatus::Public => config.is_admin(&actor.username),
    }
}

/// Only the owner may change role assignments.
pub fn can_assign_roles(actor: &Actor, rights: &ExplorationRights) -> bool {
    rights.is_owner(&actor.user_id)
}

/// Only the owner may publish.
pub fn can_publish(actor: &Actor, rights: &ExplorationRights) -> bool {
    rights.is_owner(&actor.user_id)
}
