//! This module defines `State` and `TransitionTable`.
//!
//! States are identified by their qualified name only. The table is an arena of states with a
//! name registry, so a transition can name its target before that state is declared and any
//! two references with the same name denote the same state.

use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use crate::types::Transition;

/// Name of the anonymous root state. Its transitions apply to every state.
pub const ANONYMOUS_STATE: &str = "";

/// A named state and its transitions in declaration order, at most one per read symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    name: String,
    transitions: Vec<Transition>,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
        }
    }

    /// The qualified name of the state.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns `true` for the anonymous root state.
    pub fn is_anonymous(&self) -> bool {
        self.name == ANONYMOUS_STATE
    }

    /// Finds the first transition, in declaration order, whose read symbol accepts `symbol`.
    /// A wildcard declared before an exact match shadows it.
    pub fn transition(&self, symbol: char) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.read.matches(symbol))
    }

    /// Registers `transition`, replacing in place a transition for the same read symbol.
    /// Returns `true` if one was replaced.
    fn register(&mut self, transition: Transition) -> bool {
        match self.transitions.iter_mut().find(|t| t.same_rule(&transition)) {
            Some(existing) => {
                *existing = transition;
                true
            }
            None => {
                self.transitions.push(transition);
                false
            }
        }
    }
}

/// What happened when a transition was appended to the table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Appended {
    /// States that did not exist and were created, in creation order.
    pub created: Vec<String>,
    /// Whether an earlier transition for the same (state, read) pair was replaced.
    pub replaced: bool,
}

/// An ordered collection of uniquely named states. Owns every state and transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransitionTable {
    states: Vec<State>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// All states in insertion order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&State> {
        self.index.get(name).map(|&i| &self.states[i])
    }

    /// Adds an empty state named `name` unless it exists. Returns `true` if it was created.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }

        self.index.insert(name.to_string(), self.states.len());
        self.states.push(State::new(name));
        true
    }

    /// Registers `transition` under its source state.
    ///
    /// Missing source and target states are created; the caller decides whether that
    /// deserves a warning.
    pub fn append(&mut self, transition: Transition) -> Appended {
        let mut appended = Appended::default();

        for name in [&transition.state, &transition.target] {
            if self.insert(name) {
                debug!("auto-created state '{name}'");
                appended.created.push(name.clone());
            }
        }

        let i = self.index[&transition.state];
        appended.replaced = self.states[i].register(transition);
        appended
    }

    /// Iterates over every transition, grouped by state in insertion order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.states.iter().flat_map(|s| s.transitions.iter())
    }

    /// Transitions whose target state is not part of the table.
    pub fn unresolved_targets(&self) -> Vec<&Transition> {
        self.transitions()
            .filter(|t| !self.contains(&t.target))
            .collect()
    }

    /// Finds the transition to apply in `state` when reading `symbol`.
    ///
    /// The state's own transitions are scanned first, in declaration order. When none accepts
    /// the symbol, the transitions of the anonymous root state are scanned the same way.
    pub fn lookup(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.get(state)
            .and_then(|s| s.transition(symbol))
            .or_else(|| {
                if state == ANONYMOUS_STATE {
                    return None;
                }
                self.get(ANONYMOUS_STATE)?.transition(symbol)
            })
    }
}
