//! Loading machine definitions from JSON files, strings and stdin.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tmsim::TuringMachine;

/// Errors raised while reading a machine definition.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read file {}: {source}", .path.display())]
    File { path: PathBuf, source: io::Error },
    #[error("Failed to read from stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("Invalid machine definition: {0}")]
    Definition(#[from] serde_json::Error),
}

/// `MachineLoader` reads `TuringMachine` definitions stored as JSON.
pub struct MachineLoader;

impl MachineLoader {
    /// Loads a machine definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` if the file is read and holds a valid definition.
    /// * `Err(LoadError::File)` if the file cannot be read.
    /// * `Err(LoadError::Definition)` if the content is not a valid definition.
    pub fn load_machine(path: &Path) -> Result<TuringMachine, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::File {
            path: path.to_path_buf(),
            source,
        })?;

        Self::load_machine_from_string(&content)
    }

    /// Loads a machine definition from string content.
    pub fn load_machine_from_string(content: &str) -> Result<TuringMachine, LoadError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads a machine definition piped through stdin.
    pub fn load_machine_from_stdin() -> Result<TuringMachine, LoadError> {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(LoadError::Stdin)?;

        Self::load_machine_from_string(&buffer)
    }
}
