//! Data model for explorations: versioned directed graphs of interactive
//! states, mutated only through atomically applied change lists.

pub mod change;
pub mod error;
pub mod exploration;
pub mod naming;
pub mod state;

pub use change::{ExplorationChange, ExplorationProperty, StateProperty};
pub use error::{ModelError, Result};
pub use exploration::Exploration;
pub use naming::{
    DEFAULT_STATE_NAME, END_DEST, INVALID_NAME_CHARS, MAX_STATE_NAME_LENGTH, validate_state_name,
};
pub use state::{
    ContentBlock, ContentKind, DEFAULT_RULE, DEFAULT_WIDGET_ID, Handler, RuleSpec,
    SUBMIT_HANDLER_NAME, State, Widget,
};
