//! This module provides the `ProgramLoader` struct, responsible for loading `.tur` programs
//! from files and directories.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::parser::parse;
use crate::types::{Program, TuringMachineError, MAX_PROGRAM_SIZE};

/// The extension of program sources.
pub const PROGRAM_EXTENSION: &str = "tur";

/// `ProgramLoader` is a utility struct for loading programs.
/// It provides methods to load programs from individual files and to discover and load all
/// `.tur` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Reads the source of a program, enforcing [`MAX_PROGRAM_SIZE`].
    ///
    /// # Returns
    ///
    /// * `Ok(String)` with the file content.
    /// * `Err(TuringMachineError::FileError)` if the file is missing, unreadable or too large.
    pub fn read_source(path: &Path) -> Result<String, TuringMachineError> {
        let metadata = fs::metadata(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(TuringMachineError::FileError(format!(
                "{} is not a file",
                path.display()
            )));
        }

        if metadata.len() > MAX_PROGRAM_SIZE as u64 {
            return Err(TuringMachineError::FileError(format!(
                "File {} exceeds the maximum program size of {} bytes",
                path.display(),
                MAX_PROGRAM_SIZE
            )));
        }

        fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and compiled.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ParseError)` if the source contains errors.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = Self::read_source(path)?;
        debug!("loaded {} ({} bytes)", path.display(), content.len());

        parse(&content)
    }

    /// Returns `true` if `path` carries the `.tur` extension.
    pub fn has_program_extension(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == PROGRAM_EXTENSION)
    }

    /// Loads all program files (`.tur` extension) from a given directory.
    ///
    /// Directories and non-`.tur` files are skipped. Results are sorted by path.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !path.is_dir() && Self::has_program_extension(&path) {
                        paths.push(path);
                    }
                }
                Err(e) => results.push(Err(TuringMachineError::FileError(format!(
                    "Failed to read directory entry: {e}"
                )))),
            }
        }

        paths.sort();
        results.extend(paths.into_iter().map(|path| match Self::load_program(&path) {
            Ok(program) => Ok((path, program)),
            Err(e) => Err(TuringMachineError::FileError(format!(
                "Failed to load program from {}: {}",
                path.display(),
                e
            ))),
        }));

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = "@a:b;\n!start;\n$start:a -> stop:b:R;\n&a;";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = write(dir.path(), "test.tur", VALID);

        let program = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(program.initial_state, "start");
        assert_eq!(program.tape.to_string(), "a");
        assert!(program.table.contains("start"));
        assert!(program.table.contains("stop"));
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = write(dir.path(), "invalid.tur", "This is not a valid program");

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(TuringMachineError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_program(&dir.path().join("missing.tur"));
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));

        let result = ProgramLoader::load_program(dir.path());
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_oversized_program() {
        let dir = tempdir().unwrap();
        let source = format!("{VALID}\n{}", "#".repeat(MAX_PROGRAM_SIZE));
        let file_path = write(dir.path(), "big.tur", &source);

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(TuringMachineError::FileError(msg)) if msg.contains("maximum")));
    }

    #[test]
    fn test_program_extension() {
        assert!(ProgramLoader::has_program_extension(Path::new("a/b.tur")));
        assert!(!ProgramLoader::has_program_extension(Path::new("a/b.txt")));
        assert!(!ProgramLoader::has_program_extension(Path::new("tur")));
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write(dir.path(), "valid.tur", VALID);
        write(dir.path(), "invalid.tur", "This is not a valid program");
        write(dir.path(), "ignored.txt", "This file should be ignored");

        let results = ProgramLoader::load_programs(dir.path());

        // We should have 2 results: 1 success and 1 error
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(matches!(&results[1], Ok((path, _)) if path.ends_with("valid.tur")));
    }
}
