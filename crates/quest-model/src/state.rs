//! States and their interaction widgets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Handler name answers are submitted through.
pub const SUBMIT_HANDLER_NAME: &str = "submit";

/// Rule string of the catch-all rule every handler ends with.
pub const DEFAULT_RULE: &str = "Default";

/// Widget id used by newly created states.
pub const DEFAULT_WIDGET_ID: &str = "TextInput";

/// Kind of a rich-content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Video,
}

/// A block of rich content shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub value: String,
}

impl ContentBlock {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            value: value.into(),
        }
    }
}

/// A routing rule: when it matches, the learner moves to `dest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub definition: String,
    pub dest: String,
    #[serde(default)]
    pub feedback: Vec<String>,
}

impl RuleSpec {
    /// The catch-all rule, routing to `dest`.
    pub fn default_rule(dest: impl Into<String>) -> Self {
        Self {
            definition: DEFAULT_RULE.to_string(),
            dest: dest.into(),
            feedback: Vec::new(),
        }
    }
}

/// A named group of rules evaluated when the learner acts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handler {
    pub name: String,
    pub rule_specs: Vec<RuleSpec>,
}

impl Handler {
    /// The submit handler with only the catch-all rule.
    pub fn submit(dest: impl Into<String>) -> Self {
        Self {
            name: SUBMIT_HANDLER_NAME.to_string(),
            rule_specs: vec![RuleSpec::default_rule(dest)],
        }
    }
}

/// Interaction spec of a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub widget_id: String,
    #[serde(default)]
    pub customization_args: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub sticky: bool,
    pub handlers: Vec<Handler>,
}

impl Widget {
    /// A plain text-input widget whose catch-all rule routes to `dest`.
    pub fn text_input(dest: impl Into<String>) -> Self {
        Self {
            widget_id: DEFAULT_WIDGET_ID.to_string(),
            customization_args: BTreeMap::new(),
            sticky: false,
            handlers: vec![Handler::submit(dest)],
        }
    }
}

/// A named node of the exploration graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub content: Vec<ContentBlock>,
    pub widget: Widget,
}

impl State {
    /// A default state: one empty text block and a text-input widget whose
    /// catch-all rule routes back to the state itself.
    pub fn default_state(name: &str) -> Self {
        Self {
            content: vec![ContentBlock::text("")],
            widget: Widget::text_input(name),
        }
    }

    /// All rule destinations of this state, in handler order.
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.widget
            .handlers
            .iter()
            .flat_map(|handler| handler.rule_specs.iter())
            .map(|rule| rule.dest.as_str())
    }

    /// Rewrite every rule destination equal to `from` into `to`.
    pub(crate) fn retarget_destinations(&mut self, from: &str, to: &str) {
        for handler in &mut self.widget.handlers {
            for rule in &mut handler.rule_specs {
                if rule.dest == from {
                    rule.dest = to.to_string();
                }
            }
        }
    }
}
