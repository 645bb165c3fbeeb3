//! Change-list commands.
//!
//! A change list is an ordered batch of commands applied atomically to an
//! exploration snapshot. The serde shape mirrors the wire format: a `cmd`
//! tag plus command-specific payload fields, with property values carried
//! as raw JSON and checked during application.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Editable property of a single state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateProperty {
    Content,
    Widget,
}

impl StateProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateProperty::Content => "content",
            StateProperty::Widget => "widget",
        }
    }
}

impl fmt::Display for StateProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Editable property of the exploration itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationProperty {
    Title,
    Category,
    Objective,
    LanguageCode,
    InitStateName,
}

impl ExplorationProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorationProperty::Title => "title",
            ExplorationProperty::Category => "category",
            ExplorationProperty::Objective => "objective",
            ExplorationProperty::LanguageCode => "language_code",
            ExplorationProperty::InitStateName => "init_state_name",
        }
    }
}

impl fmt::Display for ExplorationProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One command of a change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ExplorationChange {
    AddState {
        state_name: String,
    },
    RenameState {
        old_state_name: String,
        new_state_name: String,
    },
    DeleteState {
        state_name: String,
    },
    EditStateProperty {
        state_name: String,
        property_name: StateProperty,
        new_value: Value,
    },
    EditExplorationProperty {
        property_name: ExplorationProperty,
        new_value: Value,
    },
}
