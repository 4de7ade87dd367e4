//! Validate command: check that a manifest file parses

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::manifest::{ManifestError, validate_yaml};
use crate::utils::errors::InstallerError;

/// Outcome of validating one file
#[derive(Debug, PartialEq, Eq)]
pub enum Validation {
    Valid { documents: usize },
    Invalid { document: usize, reason: String },
    Empty,
}

/// Validate the YAML stream in `path`
pub fn validate_file(path: &Path) -> Result<Validation> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(match validate_yaml(&contents) {
        Ok(documents) => Validation::Valid { documents },
        Err(ManifestError::InvalidYaml { document, source }) => Validation::Invalid {
            document,
            reason: source.to_string(),
        },
        Err(ManifestError::EmptyStream) => Validation::Empty,
        Err(other) => return Err(other.into()),
    })
}

/// Handle validate command
pub fn validate(path: &Path) -> Result<()> {
    match validate_file(path)? {
        Validation::Valid { documents } => {
            println!("{}: {} valid document(s)", path.display(), documents);
            Ok(())
        }
        Validation::Invalid { document, reason } => Err(InstallerError::new(format!(
            "{}: document {} is not valid YAML: {}",
            path.display(),
            document,
            reason
        ))
        .suggest("Documents are numbered from 0 in the order they appear")
        .into()),
        Validation::Empty => Err(InstallerError::new(format!(
            "{}: no documents found",
            path.display()
        ))
        .into()),
    }
}
