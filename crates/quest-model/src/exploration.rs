//! The exploration aggregate and change-list application.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::change::{ExplorationChange, ExplorationProperty, StateProperty};
use crate::error::{ModelError, Result};
use crate::naming::{DEFAULT_STATE_NAME, END_DEST, validate_state_name};
use crate::state::{ContentBlock, State, Widget};

fn default_language_code() -> String {
    "en".to_string()
}

/// A versioned directed graph of states forming interactive content.
///
/// `version` is 0 until the exploration is first saved; the store assigns
/// contiguous versions starting at 1 from then on. Mutating methods keep the
/// graph invariants: `init_state_name` always names an existing state, and
/// every rule destination names an existing state or [`END_DEST`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exploration {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    pub init_state_name: String,
    pub states: BTreeMap<String, State>,
    #[serde(default)]
    pub version: u32,
}

impl Exploration {
    /// A new unsaved exploration with a single default state.
    pub fn default_exploration(
        id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let mut states = BTreeMap::new();
        states.insert(
            DEFAULT_STATE_NAME.to_string(),
            State::default_state(DEFAULT_STATE_NAME),
        );
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            objective: String::new(),
            language_code: default_language_code(),
            init_state_name: DEFAULT_STATE_NAME.to_string(),
            states,
            version: 0,
        }
    }

    /// The initial state of the exploration.
    ///
    /// # Panics
    ///
    /// Panics if the init-state invariant is broken; use [`validate`] first
    /// for untrusted data.
    ///
    /// [`validate`]: Exploration::validate
    pub fn init_state(&self) -> &State {
        &self.states[&self.init_state_name]
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// Add a new default state named `name`.
    pub fn add_state(&mut self, name: &str) -> Result<()> {
        validate_state_name(name)?;
        if self.states.contains_key(name) {
            return Err(ModelError::DuplicateState {
                name: name.to_string(),
            });
        }
        self.states
            .insert(name.to_string(), State::default_state(name));
        Ok(())
    }

    /// Add several default states; stops at the first invalid name.
    pub fn add_states(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            self.add_state(name)?;
        }
        Ok(())
    }

    /// Rename a state. The rename follows through to `init_state_name` and
    /// to every rule destination pointing at the old name.
    pub fn rename_state(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if !self.states.contains_key(old_name) {
            return Err(ModelError::MissingState {
                name: old_name.to_string(),
            });
        }
        if old_name == new_name {
            return Ok(());
        }
        validate_state_name(new_name)?;
        if self.states.contains_key(new_name) {
            return Err(ModelError::DuplicateState {
                name: new_name.to_string(),
            });
        }
        if let Some(state) = self.states.remove(old_name) {
            self.states.insert(new_name.to_string(), state);
        }
        if self.init_state_name == old_name {
            self.init_state_name = new_name.to_string();
        }
        for state in self.states.values_mut() {
            state.retarget_destinations(old_name, new_name);
        }
        Ok(())
    }

    /// Delete a state. The initial state cannot be deleted; rule
    /// destinations that pointed at the deleted state fall back to the end
    /// marker so the graph stays well-formed.
    pub fn delete_state(&mut self, name: &str) -> Result<()> {
        if !self.states.contains_key(name) {
            return Err(ModelError::MissingState {
                name: name.to_string(),
            });
        }
        if self.init_state_name == name {
            return Err(ModelError::DeleteInitState {
                name: name.to_string(),
            });
        }
        self.states.remove(name);
        for state in self.states.values_mut() {
            state.retarget_destinations(name, END_DEST);
        }
        Ok(())
    }

    /// Apply a change list to a staged copy of this exploration.
    ///
    /// All-or-nothing: the first failing command aborts the batch and `self`
    /// is never touched. On success the returned snapshot carries
    /// `self.version + 1`.
    pub fn apply_change_list(&self, changes: &[ExplorationChange]) -> Result<Exploration> {
        let mut draft = self.clone();
        for change in changes {
            draft.apply_change(change)?;
        }
        draft.version = self.version + 1;
        Ok(draft)
    }

    fn apply_change(&mut self, change: &ExplorationChange) -> Result<()> {
        match change {
            ExplorationChange::AddState { state_name } => self.add_state(state_name),
            ExplorationChange::RenameState {
                old_state_name,
                new_state_name,
            } => self.rename_state(old_state_name, new_state_name),
            ExplorationChange::DeleteState { state_name } => self.delete_state(state_name),
            ExplorationChange::EditStateProperty {
                state_name,
                property_name,
                new_value,
            } => self.edit_state_property(state_name, *property_name, new_value),
            ExplorationChange::EditExplorationProperty {
                property_name,
                new_value,
            } => self.edit_exploration_property(*property_name, new_value),
        }
    }

    fn edit_state_property(
        &mut self,
        state_name: &str,
        property: StateProperty,
        new_value: &Value,
    ) -> Result<()> {
        if !self.states.contains_key(state_name) {
            return Err(ModelError::MissingState {
                name: state_name.to_string(),
            });
        }
        match property {
            StateProperty::Content => {
                let content: Vec<ContentBlock> = parse_property(property.as_str(), new_value)?;
                if let Some(state) = self.states.get_mut(state_name) {
                    state.content = content;
                }
            }
            StateProperty::Widget => {
                let widget: Widget = parse_property(property.as_str(), new_value)?;
                for rule in widget
                    .handlers
                    .iter()
                    .flat_map(|handler| handler.rule_specs.iter())
                {
                    self.check_destination(state_name, &rule.dest)?;
                }
                if let Some(state) = self.states.get_mut(state_name) {
                    state.widget = widget;
                }
            }
        }
        Ok(())
    }

    fn edit_exploration_property(
        &mut self,
        property: ExplorationProperty,
        new_value: &Value,
    ) -> Result<()> {
        let text = new_value
            .as_str()
            .ok_or_else(|| ModelError::InvalidPropertyValue {
                property: property.to_string(),
                reason: format!("expected a string, received {new_value}"),
            })?;
        match property {
            ExplorationProperty::Title => self.title = text.to_string(),
            ExplorationProperty::Category => self.category = text.to_string(),
            ExplorationProperty::Objective => self.objective = text.to_string(),
            ExplorationProperty::LanguageCode => self.language_code = text.to_string(),
            ExplorationProperty::InitStateName => {
                if !self.states.contains_key(text) {
                    return Err(ModelError::InvalidInitState {
                        name: text.to_string(),
                    });
                }
                self.init_state_name = text.to_string();
            }
        }
        Ok(())
    }

    fn check_destination(&self, state_name: &str, dest: &str) -> Result<()> {
        if dest == END_DEST || self.states.contains_key(dest) {
            Ok(())
        } else {
            Err(ModelError::InvalidDestination {
                state: state_name.to_string(),
                dest: dest.to_string(),
            })
        }
    }

    /// Check the graph invariants and every state name.
    pub fn validate(&self) -> Result<()> {
        for name in self.states.keys() {
            validate_state_name(name)?;
        }
        if !self.states.contains_key(&self.init_state_name) {
            return Err(ModelError::InvalidInitState {
                name: self.init_state_name.clone(),
            });
        }
        for (name, state) in &self.states {
            for dest in state.destinations() {
                self.check_destination(name, dest)?;
            }
        }
        Ok(())
    }
}

fn parse_property<T: serde::de::DeserializeOwned>(property: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|error| ModelError::InvalidPropertyValue {
        property: property.to_string(),
        reason: error.to_string(),
    })
}
