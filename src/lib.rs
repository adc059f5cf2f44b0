//! This crate provides the core of an interpreter for `.tur` machine descriptions.
//! It includes a single-pass scanner that compiles a namespaced source into a transition
//! table, the execution engine that runs it on an unbounded tape, and a small set of
//! bundled demo programs.

pub mod analyzer;
pub mod charset;
pub mod diagnostic;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod scope;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `AnalysisError` enum from the analyzer module.
pub use analyzer::AnalysisError;
/// Re-exports the diagnostics produced while scanning.
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the execution engine and its run-loop hooks.
pub use machine::{
    Command, Input, Outcome, Renderer, RunConfig, RunSummary, Snapshot, TuringMachine,
};
/// Re-exports the `parse` function and the scanner from the parser module.
pub use parser::{parse, Parsed, Parser};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use scope::Scope;
pub use table::{State, TransitionTable};
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Direction, Program, Step, Symbol, Transition, TuringMachineError, BLANK_SYMBOL, HALT_STATE,
    MAX_PROGRAM_SIZE,
};
