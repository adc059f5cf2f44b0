//! Diagnostics reported while scanning a program.
//!
//! Positioned diagnostics are rendered through `pest`'s error formatter, which prints the
//! line number, the offending source line and a caret under the column.

use pest::error::{Error, ErrorVariant};
use pest::Position;
use std::fmt;

use crate::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single warning or error, optionally tied to a source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// 1-based line and column, when the diagnostic points at a character.
    pub location: Option<(usize, usize)>,
    /// The scope at the top of the stack when the diagnostic was raised.
    pub scope: Scope,
    excerpt: Option<Box<Error<Scope>>>,
}

impl Diagnostic {
    /// Creates a diagnostic pointing at the byte `offset` of `input`.
    pub(crate) fn at(
        severity: Severity,
        message: impl Into<String>,
        input: &str,
        offset: usize,
        location: (usize, usize),
        scope: Scope,
    ) -> Self {
        let message = message.into();
        let excerpt = Position::new(input, offset).map(|pos| {
            Box::new(Error::new_from_pos(
                ErrorVariant::CustomError {
                    message: message.clone(),
                },
                pos,
            ))
        });

        Self {
            severity,
            message,
            location: Some(location),
            scope,
            excerpt,
        }
    }

    /// Creates a diagnostic that is not tied to a source position.
    pub(crate) fn global(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            location: None,
            scope: Scope::Namespace,
            excerpt: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The offending source line with a caret under the column, if the diagnostic has a
    /// position.
    pub fn excerpt(&self) -> Option<String> {
        self.excerpt.as_ref().map(|e| e.to_string())
    }

    /// Line number of the diagnostic, if any.
    pub fn line(&self) -> Option<usize> {
        self.location.map(|(line, _)| line)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.excerpt {
            Some(excerpt) => write!(f, "{}: {}\n{}", self.severity, self.message, excerpt),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Every diagnostic produced by one scan, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| !d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.0 {
            writeln!(f, "{diagnostic}")?;
        }
        write!(f, "{} error(s) found!", self.error_count())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
