//! The editorial service.
//!
//! Every operation follows the same shape: authorize against the rights
//! record, validate the request payload, then mutate through the version
//! store. Failures are raised before any mutation, so a rejected request
//! leaves the platform state byte-for-byte unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use quest_export::DownloadFormat;
use quest_model::{
    ContentBlock, Exploration, ExplorationChange, State, Widget, validate_state_name,
};
use quest_rights::{
    Actor, ExplorationRights, PlatformConfig, Role, can_assign_roles, can_delete, can_edit,
    can_publish, can_view,
};
use quest_stats::{PlaySummary, RuleKey, StatsEvent, StatsLedger};
use quest_store::VersionStore;

use crate::error::{EditorError, Result};

/// Payload returned when the editor requests a template for a new state.
#[derive(Debug, Clone, Serialize)]
pub struct NewStateTemplate {
    pub content: Vec<ContentBlock>,
    pub widget: Widget,
    pub unresolved_answers: BTreeMap<String, u64>,
}

/// A rendered download, ready to be served as an attachment.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Platform state plus the operations of the exploration editor.
///
/// The whole service is serializable so a frontend can persist it through
/// `quest_store::save_envelope` as one workspace file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EditorService {
    store: VersionStore,
    rights: BTreeMap<String, ExplorationRights>,
    stats: StatsLedger,
    config: PlatformConfig,
}

impl EditorService {
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            store: VersionStore::new(),
            rights: BTreeMap::new(),
            stats: StatsLedger::new(),
            config,
        }
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    pub fn stats(&self) -> &StatsLedger {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut StatsLedger {
        &mut self.stats
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PlatformConfig {
        &mut self.config
    }

    pub fn rights(&self, exploration_id: &str) -> Result<&ExplorationRights> {
        self.rights.get(exploration_id).ok_or_else(|| {
            EditorError::not_found(format!("Exploration {exploration_id} not found"))
        })
    }

    /// Store a new exploration as version 1 and create its rights record.
    pub fn create_exploration(&mut self, owner: &Actor, exploration: Exploration) -> Result<u32> {
        exploration.validate()?;
        let exploration_id = exploration.id.clone();
        let version = self.store.save_new(&owner.user_id, exploration)?;
        self.rights.insert(
            exploration_id.clone(),
            ExplorationRights::new(exploration_id, owner.user_id.clone()),
        );
        Ok(version)
    }

    /// Fetch a snapshot; `None` means the latest version.
    pub fn get_exploration(&self, exploration_id: &str, version: Option<u32>) -> Result<&Exploration> {
        Ok(self.store.get(exploration_id, version)?)
    }

    /// Whether the actor may edit, as shown in the editor page chrome.
    pub fn can_edit(&self, actor: &Actor, exploration_id: &str) -> Result<bool> {
        Ok(can_edit(actor, self.rights(exploration_id)?, &self.config))
    }

    /// Whether the actor may read the exploration at all.
    pub fn can_view(&self, actor: &Actor, exploration_id: &str) -> Result<bool> {
        Ok(can_view(actor, self.rights(exploration_id)?))
    }

    /// Apply a change list against the version the editor was looking at.
    ///
    /// Optimistic concurrency: a missing or outdated `version` is rejected
    /// with a stale-version error and nothing is mutated, so two racing
    /// editors can never silently overwrite each other.
    pub fn apply_change_list(
        &mut self,
        actor: &Actor,
        exploration_id: &str,
        version: Option<u32>,
        changes: &[ExplorationChange],
        commit_message: &str,
    ) -> Result<Exploration> {
        let rights = self.rights(exploration_id)?;
        if !can_edit(actor, rights, &self.config) {
            return Err(EditorError::unauthorized(
                &actor.username,
                "edit this exploration",
            ));
        }

        let current = self.store.current_version(exploration_id)?;
        let supplied = version.ok_or_else(|| EditorError::StaleVersion {
            message: "Invalid POST request: a version must be specified.".to_string(),
        })?;
        if supplied != current {
            return Err(EditorError::StaleVersion {
                message: format!(
                    "Trying to update version {current} of exploration from version \
                     {supplied}, which is too old. Please reload the page and try again."
                ),
            });
        }

        let exploration = self.store.get(exploration_id, None)?;
        let next = exploration.apply_change_list(changes)?;
        self.store
            .append(&actor.user_id, next.clone(), commit_message)?;
        tracing::info!(
            exploration_id,
            version = next.version,
            committer = %actor.user_id,
            "applied change list"
        );
        Ok(next)
    }

    /// Revert to an old version by copying it forward as a new one.
    ///
    /// `revert_to_version` arrives as raw JSON because the wire payload is
    /// untyped; anything but an integer is rejected up front.
    pub fn revert_exploration(
        &mut self,
        actor: &Actor,
        exploration_id: &str,
        current_version: u32,
        revert_to_version: &Value,
    ) -> Result<u32> {
        let rights = self.rights(exploration_id)?;
        if !can_edit(actor, rights, &self.config) {
            return Err(EditorError::unauthorized(
                &actor.username,
                "revert this exploration",
            ));
        }

        let revert_to = revert_to_version.as_i64().ok_or_else(|| {
            EditorError::validation(format!(
                "Expected an integer, received {revert_to_version}"
            ))
        })?;

        let current = self.store.current_version(exploration_id)?;
        if current_version != current {
            return Err(EditorError::StaleVersion {
                message: format!(
                    "Trying to revert version {current} of exploration from version \
                     {current_version}, which is too old. Please reload the page and try again."
                ),
            });
        }

        Ok(self.store.revert(&actor.user_id, exploration_id, revert_to)?)
    }

    /// Delete an exploration and its rights record.
    pub fn delete_exploration(&mut self, actor: &Actor, exploration_id: &str) -> Result<()> {
        let rights = self.rights(exploration_id)?;
        if !can_delete(actor, rights, &self.config) {
            return Err(EditorError::unauthorized(
                &actor.username,
                "delete this exploration",
            ));
        }
        self.store.delete(exploration_id)?;
        self.rights.remove(exploration_id);
        tracing::info!(exploration_id, deleter = %actor.user_id, "deleted exploration");
        Ok(())
    }

    /// Grant an editor or viewer role. Owner-only; assigned editors may not
    /// add further collaborators.
    pub fn assign_role(
        &mut self,
        granter: &Actor,
        exploration_id: &str,
        grantee_id: &str,
        role: Role,
    ) -> Result<()> {
        let rights = self.rights.get_mut(exploration_id).ok_or_else(|| {
            EditorError::not_found(format!("Exploration {exploration_id} not found"))
        })?;
        if !can_assign_roles(granter, rights) {
            return Err(EditorError::unauthorized(
                &granter.username,
                "assign roles for this exploration",
            ));
        }
        rights
            .assign(grantee_id, role)
            .map_err(|error| EditorError::validation(error.to_string()))?;
        tracing::info!(exploration_id, grantee_id, role = %role, "assigned role");
        Ok(())
    }

    /// Publish the exploration. One-way; publishing twice is a no-op.
    pub fn publish_exploration(&mut self, actor: &Actor, exploration_id: &str) -> Result<()> {
        let rights = self.rights.get_mut(exploration_id).ok_or_else(|| {
            EditorError::not_found(format!("Exploration {exploration_id} not found"))
        })?;
        if !can_publish(actor, rights) {
            return Err(EditorError::unauthorized(
                &actor.username,
                "publish this exploration",
            ));
        }
        rights.publish();
        tracing::info!(exploration_id, "published exploration");
        Ok(())
    }

    /// Mark submitted answers as resolved.
    ///
    /// The payload must be a JSON list of answer strings; anything else is
    /// rejected before the log is touched. Unknown answers are no-ops.
    pub fn resolve_answers(
        &mut self,
        actor: &Actor,
        exploration_id: &str,
        state_name: &str,
        payload: &Value,
    ) -> Result<()> {
        let rights = self.rights(exploration_id)?;
        if !can_edit(actor, rights, &self.config) {
            return Err(EditorError::unauthorized(
                &actor.username,
                "resolve answers for this exploration",
            ));
        }
        let exploration = self.store.get(exploration_id, None)?;
        if !exploration.has_state(state_name) {
            return Err(EditorError::not_found(format!(
                "Exploration {exploration_id} has no state named {state_name}"
            )));
        }

        let items = payload.as_array().ok_or_else(|| {
            EditorError::validation(format!("Expected a list of answers, received {payload}"))
        })?;
        let mut answers = Vec::with_capacity(items.len());
        for item in items {
            let answer = item.as_str().ok_or_else(|| {
                EditorError::validation(format!(
                    "Expected a list of answer strings, received {item}"
                ))
            })?;
            answers.push(answer.to_string());
        }

        self.stats
            .resolve_answers(exploration_id, state_name, &answers);
        Ok(())
    }

    /// Record a learner answer against a rule of an existing exploration.
    pub fn submit_answer(
        &mut self,
        exploration_id: &str,
        state_name: &str,
        handler_name: &str,
        rule: &str,
        answer: &str,
    ) -> Result<()> {
        self.store.get(exploration_id, None)?;
        self.stats.record_answer(
            RuleKey::new(exploration_id, state_name, handler_name, rule),
            answer,
        );
        Ok(())
    }

    /// Queue a play-start event; counters move on `process_pending_stats`.
    pub fn record_play_start(&mut self, exploration_id: &str) -> Result<()> {
        self.store.get(exploration_id, None)?;
        self.stats.dispatch(StatsEvent::ExplorationStarted {
            exploration_id: exploration_id.to_string(),
        });
        Ok(())
    }

    /// Queue a play-completion event.
    pub fn record_play_completion(&mut self, exploration_id: &str) -> Result<()> {
        self.store.get(exploration_id, None)?;
        self.stats.dispatch(StatsEvent::ExplorationCompleted {
            exploration_id: exploration_id.to_string(),
        });
        Ok(())
    }

    /// Fold queued play events into the counters.
    pub fn process_pending_stats(&mut self) -> usize {
        self.stats.process_pending()
    }

    /// Unresolved answers for one rule of an existing exploration.
    pub fn unresolved_answers(
        &self,
        exploration_id: &str,
        state_name: &str,
        handler_name: &str,
        rule: &str,
    ) -> Result<BTreeMap<String, u64>> {
        self.store.get(exploration_id, None)?;
        Ok(self.stats.unresolved_answers(&RuleKey::new(
            exploration_id,
            state_name,
            handler_name,
            rule,
        )))
    }

    /// Aggregate play counters for the statistics page.
    pub fn statistics(&self, exploration_id: &str) -> Result<PlaySummary> {
        self.store.get(exploration_id, None)?;
        Ok(self.stats.summary(exploration_id))
    }

    /// Render the latest snapshot for download.
    pub fn download(
        &self,
        exploration_id: &str,
        format: DownloadFormat,
    ) -> Result<DownloadArtifact> {
        let exploration = self.store.get(exploration_id, None)?;
        let render = |result: std::result::Result<Vec<u8>, quest_export::ExportError>| {
            result.map_err(|error| EditorError::validation(error.to_string()))
        };
        match format {
            DownloadFormat::Zip => Ok(DownloadArtifact {
                filename: quest_export::download_filename(exploration),
                content_type: "application/zip",
                body: render(quest_export::to_zip(exploration))?,
            }),
            DownloadFormat::Json => Ok(DownloadArtifact {
                filename: format!("{}.json", exploration.title),
                content_type: "application/json",
                body: render(quest_export::to_json(exploration).map(String::into_bytes))?,
            }),
            DownloadFormat::Yaml => Ok(DownloadArtifact {
                filename: quest_export::yaml_entry_name(exploration),
                content_type: "text/yaml",
                body: render(quest_export::to_yaml(exploration).map(String::into_bytes))?,
            }),
        }
    }

    /// Template for a freshly added state, after validating its name.
    pub fn new_state_template(&self, state_name: &str) -> Result<NewStateTemplate> {
        validate_state_name(state_name)?;
        let state = State::default_state(state_name);
        Ok(NewStateTemplate {
            content: state.content,
            widget: state.widget,
            unresolved_answers: BTreeMap::new(),
        })
    }
}
