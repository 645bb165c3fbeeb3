//! State naming rules.
//!
//! Checks run in declaration order and the first failure wins, so error
//! messages are stable for any given input. All whitespace handling is
//! ASCII-based and locale-independent.

use crate::error::{ModelError, Result};

/// Reserved destination marking the end of an exploration graph.
pub const END_DEST: &str = "END";

/// Name of the single state in a freshly created exploration.
pub const DEFAULT_STATE_NAME: &str = "(untitled state)";

/// Characters never allowed in a state name.
pub const INVALID_NAME_CHARS: &[char] = &['#', ':', '/', '|', '<', '>', '[', ']', '{', '}'];

/// Maximum length of a state name, in characters.
pub const MAX_STATE_NAME_LENGTH: usize = 50;

/// Validate a proposed state name.
///
/// The reserved end marker is rejected under any casing; this
/// case-insensitivity is deliberately narrow and applies nowhere else.
pub fn validate_state_name(name: &str) -> Result<()> {
    let length = name.chars().count();
    if length == 0 || length > MAX_STATE_NAME_LENGTH {
        return Err(ModelError::NameLength {
            name: name.to_string(),
        });
    }
    if name.eq_ignore_ascii_case(END_DEST) {
        return Err(ModelError::ReservedName {
            name: name.to_string(),
        });
    }
    if let Some(character) = name.chars().find(|ch| INVALID_NAME_CHARS.contains(ch)) {
        return Err(ModelError::InvalidCharacter {
            name: name.to_string(),
            character,
        });
    }
    if name
        .chars()
        .next()
        .is_some_and(|ch| ch.is_ascii_whitespace())
    {
        return Err(ModelError::LeadingWhitespace {
            name: name.to_string(),
        });
    }
    if name
        .chars()
        .last()
        .is_some_and(|ch| ch.is_ascii_whitespace())
    {
        return Err(ModelError::TrailingWhitespace {
            name: name.to_string(),
        });
    }
    let mut previous_was_whitespace = false;
    for ch in name.chars() {
        let is_whitespace = ch.is_ascii_whitespace();
        if is_whitespace && previous_was_whitespace {
            return Err(ModelError::AdjacentWhitespace {
                name: name.to_string(),
            });
        }
        previous_was_whitespace = is_whitespace;
    }
    Ok(())
}
