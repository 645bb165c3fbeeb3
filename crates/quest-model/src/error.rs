use thiserror::Error;

/// Model-level validation and mutation error.
///
/// Each variant carries only its needed data; messages are user-facing and
/// surfaced verbatim by the editor layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid state name: the name should be between 1 and 50 characters, received {name:?}")]
    NameLength { name: String },

    #[error("Invalid state name: {name}")]
    ReservedName { name: String },

    #[error("Invalid character {character} in state name {name:?}")]
    InvalidCharacter { name: String, character: char },

    #[error("State names may not start or end with whitespace, received {name:?}")]
    LeadingWhitespace { name: String },

    #[error("State names may not end with whitespace, received {name:?}")]
    TrailingWhitespace { name: String },

    #[error("Adjacent whitespace in state name {name:?}")]
    AdjacentWhitespace { name: String },

    #[error("A state named {name} already exists")]
    DuplicateState { name: String },

    #[error("State {name} does not exist")]
    MissingState { name: String },

    #[error("Cannot delete initial state {name}")]
    DeleteInitState { name: String },

    #[error("Invalid value for {property}: {reason}")]
    InvalidPropertyValue { property: String, reason: String },

    #[error("Initial state name {name} is not a state of the exploration")]
    InvalidInitState { name: String },

    #[error("Destination {dest} of state {state} is neither a state nor the end marker")]
    InvalidDestination { state: String, dest: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
