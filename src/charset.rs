//! Character classes accepted by the different directive scopes.

use crate::types::{ANY_SYMBOL, BLANK_SYMBOL};

/// Marker characters accepted as tape symbols besides alphanumerics.
pub const RESERVED_MARKERS: [char; 2] = ['#', BLANK_SYMBOL];

/// Separator between the segments of a qualified state name.
pub const NAME_SEPARATOR: char = '.';

/// Tape and alphabet symbols: alphanumerics plus the reserved markers.
pub fn is_tape_char(c: char) -> bool {
    c.is_alphanumeric() || RESERVED_MARKERS.contains(&c)
}

/// Transition fields: tape symbols plus the name separator and the wildcard.
pub fn is_transition_char(c: char) -> bool {
    is_tape_char(c) || c == NAME_SEPARATOR || c == ANY_SYMBOL
}

/// State names: alphanumerics plus the name separator.
pub fn is_state_char(c: char) -> bool {
    c.is_alphanumeric() || c == NAME_SEPARATOR
}

/// Namespace names: alphanumerics only.
pub fn is_namespace_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Returns `true` if every character of `name` is valid in a state name.
pub fn is_state_name(name: &str) -> bool {
    name.chars().all(is_state_char)
}
