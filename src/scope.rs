//! The scope stack driving the scanner.
//!
//! The top of the stack decides how the next character is interpreted. The bottom of the
//! stack is an implicit root namespace, so an empty stack reports [`Scope::Namespace`].

use std::fmt;
use thiserror::Error;

use crate::charset::{
    is_namespace_char, is_state_char, is_tape_char, is_transition_char, NAME_SEPARATOR,
};

/// The kinds of scope the scanner can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// `&<chars>;`
    TapeString,
    /// `@<c>:<c>:...;`
    Alphabet,
    /// `$<state>:<read> -> <target>:<write>:<dir>;`
    Transition,
    /// `!<state>;`
    InitialState,
    /// `~<state>:...;`
    HaltStates,
    /// `*<state>:...;`
    States,
    /// The name between `:` and `{` of a namespace block.
    NamespaceName,
    /// Inside `{ ... }`, or the root.
    Namespace,
    /// `#` up to the end of the line.
    Comment,
}

impl Scope {
    /// The scope entered when `c` is read at the top of a namespace.
    pub fn opened_by(c: char) -> Option<Scope> {
        match c {
            '&' => Some(Scope::TapeString),
            '@' => Some(Scope::Alphabet),
            '$' => Some(Scope::Transition),
            '!' => Some(Scope::InitialState),
            '~' => Some(Scope::HaltStates),
            '*' => Some(Scope::States),
            '#' => Some(Scope::Comment),
            ':' => Some(Scope::NamespaceName),
            _ => None,
        }
    }

    /// Returns `true` for scopes that collect a `;`-terminated directive.
    pub fn is_item(&self) -> bool {
        matches!(
            self,
            Scope::TapeString
                | Scope::Alphabet
                | Scope::Transition
                | Scope::InitialState
                | Scope::HaltStates
                | Scope::States
        )
    }

    /// Returns `true` if `:` separates fields in this scope.
    pub fn has_fields(&self) -> bool {
        matches!(
            self,
            Scope::Alphabet | Scope::Transition | Scope::HaltStates | Scope::States
        )
    }

    /// The character class of this scope's buffer.
    pub fn accepts(&self, c: char) -> bool {
        match self {
            Scope::TapeString | Scope::Alphabet => is_tape_char(c),
            Scope::Transition => is_transition_char(c),
            Scope::InitialState | Scope::HaltStates | Scope::States => is_state_char(c),
            Scope::NamespaceName => is_namespace_char(c),
            Scope::Namespace => false,
            Scope::Comment => true,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::TapeString => "tape string",
            Scope::Alphabet => "alphabet",
            Scope::Transition => "transition",
            Scope::InitialState => "initial state",
            Scope::HaltStates => "halt states",
            Scope::States => "states",
            Scope::NamespaceName => "namespace name",
            Scope::Namespace => "namespace",
            Scope::Comment => "comment",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Tried to exit {expected} but found {found}")]
    Mismatch { expected: Scope, found: Scope },
    #[error("Cannot exit {0}. At root level!")]
    Root(Scope),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub scope: Scope,
    /// Namespace name; `None` for other scopes and for namespaces opened without a valid name.
    pub name: Option<String>,
}

/// The explicit stack of open scopes.
#[derive(Debug, Clone, Default)]
pub struct Scopes {
    frames: Vec<Frame>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active scope. The root namespace when nothing is open.
    pub fn top(&self) -> Scope {
        self.frames
            .last()
            .map(|frame| frame.scope)
            .unwrap_or(Scope::Namespace)
    }

    pub fn enter(&mut self, scope: Scope, name: Option<String>) {
        self.frames.push(Frame { scope, name });
    }

    /// Closes the top scope, which must be `expected`.
    pub fn exit(&mut self, expected: Scope) -> Result<Frame, ScopeError> {
        match self.frames.last().map(|frame| frame.scope) {
            Some(found) if found != expected => Err(ScopeError::Mismatch { expected, found }),
            _ => self.frames.pop().ok_or(ScopeError::Root(expected)),
        }
    }

    /// Drains every open frame, innermost first.
    pub fn drain(&mut self) -> impl Iterator<Item = Frame> + '_ {
        self.frames.drain(..).rev()
    }

    /// Segments of the active namespace path. Namespaces opened without a valid name are
    /// numbered by their 1-based depth.
    pub fn path(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter(|frame| frame.scope == Scope::Namespace)
            .enumerate()
            .map(|(i, frame)| frame.name.clone().unwrap_or_else(|| (i + 1).to_string()))
            .collect()
    }

    /// Qualifies `name` with the active namespace path. An empty name denotes the
    /// namespace itself, or the anonymous root state at the root.
    pub fn qualify(&self, name: &str) -> String {
        let mut segments = self.path();
        if !name.is_empty() {
            segments.push(name.to_string());
        }
        segments.join(&NAME_SEPARATOR.to_string())
    }
}
