use log::warn;
use std::sync::RwLock;

use crate::parser::parse;
use crate::types::{Program, TuringMachineError};

// Embedded demo programs, by name
const PROGRAM_TEXTS: [(&str, &str); 3] = [
    (
        "binary-increment",
        include_str!("../demos/binary-increment.tur"),
    ),
    ("unary-addition", include_str!("../demos/unary-addition.tur")),
    ("bit-flipper", include_str!("../demos/bit-flipper.tur")),
];

/// A compiled demo program.
#[derive(Debug, Clone)]
pub struct BundledProgram {
    pub name: &'static str,
    pub program: Program,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<BundledProgram>> = RwLock::new(Vec::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Compiles the embedded programs into the registry. Programs that fail to compile
    /// are skipped with a warning.
    pub fn load() -> Result<(), TuringMachineError> {
        let mut programs = Vec::with_capacity(PROGRAM_TEXTS.len());

        for (name, source) in PROGRAM_TEXTS {
            match parse(source) {
                Ok(program) => programs.push(BundledProgram { name, program }),
                Err(e) => warn!("Failed to parse bundled program '{name}': {e}"),
            }
        }

        let mut guard = PROGRAMS
            .write()
            .map_err(|_| TuringMachineError::FileError("Failed to acquire write lock".into()))?;
        *guard = programs;

        Ok(())
    }

    /// Runs `f` over the registry, loading it first if it is empty.
    fn with_programs<T>(
        f: impl FnOnce(&[BundledProgram]) -> T,
    ) -> Result<T, TuringMachineError> {
        let loaded = PROGRAMS.read().map(|p| !p.is_empty()).unwrap_or(false);
        if !loaded {
            Self::load()?;
        }

        let programs = PROGRAMS
            .read()
            .map_err(|_| TuringMachineError::FileError("Failed to acquire read lock".into()))?;
        Ok(f(&programs))
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        Self::with_programs(|programs| programs.len()).unwrap_or(0)
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        Self::with_programs(|programs| programs.get(index).map(|p| p.program.clone()))?
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program index {index} out of range"))
            })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        Self::with_programs(|programs| {
            programs
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.program.clone())
        })?
        .ok_or_else(|| TuringMachineError::ValidationError(format!("Program '{name}' not found")))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        Self::with_programs(|programs| programs.iter().map(|p| p.name).collect())
            .unwrap_or_default()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        Self::with_programs(|programs| {
            programs.get(index).map(|p| ProgramInfo {
                index,
                name: p.name.to_string(),
                initial_state: p.program.initial_state.clone(),
                initial_tape: p.program.tape.to_string(),
                state_count: p.program.state_names().len(),
                transition_count: p.program.transition_count(),
            })
        })?
        .ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {index} out of range"))
        })
    }
}

/// Summary of a bundled program, as listed by the CLI.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub initial_tape: String,
    pub state_count: usize,
    pub transition_count: usize,
}
