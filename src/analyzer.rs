//! This module provides the checks run once a program has been scanned: the initial state and
//! every transition target must resolve in the transition table. It also detects transitions
//! that can never fire because their state is unreachable from the initial state.

use std::collections::HashSet;
use std::fmt;

use crate::table::{TransitionTable, ANONYMOUS_STATE};
use crate::types::Symbol;

/// Represents the problems found while analyzing a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// No initial state was declared.
    MissingStartState,
    /// The initial state is not part of the transition table.
    InvalidStartState(String),
    /// A transition targets a state that is not part of the transition table.
    UndefinedNextState {
        state: String,
        read: Symbol,
        target: String,
    },
    /// States with transitions that can never be reached from the initial state.
    UnreachableStates(Vec<String>),
}

impl AnalysisError {
    /// Returns `true` if the problem makes the program unusable.
    /// Unreachable states are only worth a warning.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AnalysisError::UnreachableStates(_))
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::MissingStartState => write!(f, "No initial state declared"),
            AnalysisError::InvalidStartState(state) => {
                write!(f, "Invalid initial state '{state}': not in transition table")
            }
            AnalysisError::UndefinedNextState {
                state,
                read,
                target,
            } => write!(
                f,
                "Invalid target state '{target}' in transition {state}:{read}"
            ),
            AnalysisError::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {states:?}")
            }
        }
    }
}

/// Runs the post-scan checks over a scanned table and its (optional) initial state.
///
/// Returns every problem found, fatal ones first in check order. Each unresolved target is
/// reported on its own.
pub fn check(table: &TransitionTable, initial_state: Option<&str>) -> Vec<AnalysisError> {
    let mut errors = Vec::new();

    match initial_state {
        None => errors.push(AnalysisError::MissingStartState),
        Some(state) if !table.contains(state) => {
            errors.push(AnalysisError::InvalidStartState(state.to_string()))
        }
        Some(_) => {}
    }

    errors.extend(check_next_states(table));

    if let Some(state) = initial_state.filter(|s| table.contains(s)) {
        if let Err(e) = check_unreachable_states(table, state) {
            errors.push(e);
        }
    }

    errors
}

/// Checks that every transition target is part of the table.
fn check_next_states(table: &TransitionTable) -> Vec<AnalysisError> {
    table
        .unresolved_targets()
        .into_iter()
        .map(|t| AnalysisError::UndefinedNextState {
            state: t.state.clone(),
            read: t.read,
            target: t.target.clone(),
        })
        .collect()
}

/// Walks the table from the initial state and reports states that own transitions but are
/// never reached. Targets of the anonymous root state count as reachable from anywhere.
fn check_unreachable_states(table: &TransitionTable, initial: &str) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut queue = vec![initial.to_string()];

    if let Some(any) = table.get(ANONYMOUS_STATE) {
        visited.insert(ANONYMOUS_STATE.to_string());
        queue.extend(any.transitions().iter().map(|t| t.target.clone()));
    }

    while let Some(state) = queue.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }

        if let Some(state) = table.get(&state) {
            for transition in state.transitions() {
                if !visited.contains(&transition.target) {
                    queue.push(transition.target.clone());
                }
            }
        }
    }

    let mut unreachable: Vec<String> = table
        .states()
        .iter()
        .filter(|s| !s.transitions().is_empty() && !visited.contains(s.name()))
        .map(|s| s.name().to_string())
        .collect();

    if !unreachable.is_empty() {
        unreachable.sort(); // Sort for deterministic output
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}
