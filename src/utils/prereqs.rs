//! Prerequisite checking system for required tools

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrereqError {
    #[error("Tool '{name}' not found")]
    NotFound { name: String, hint: String },

    #[error("Failed to check for tool '{name}': {source}")]
    CheckFailed { name: String, source: anyhow::Error },
}

/// Trait for checking prerequisites
pub trait Prerequisite {
    /// Name of the prerequisite tool
    fn name(&self) -> &str;

    /// Check if the tool is available
    fn check(&self) -> Result<(), PrereqError>;

    /// Installation hint for the user
    fn install_hint(&self) -> &str;
}

/// Basic prerequisite that checks if a command exists
pub struct CommandPrereq {
    pub name: String,
    pub hint: String,
}

impl CommandPrereq {
    pub fn new(name: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: hint.into(),
        }
    }
}

impl Prerequisite for CommandPrereq {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), PrereqError> {
        match which::which(&self.name) {
            Ok(_) => Ok(()),
            Err(which::Error::CannotFindBinaryPath) => Err(PrereqError::NotFound {
                name: self.name.clone(),
                hint: self.hint.clone(),
            }),
            Err(e) => Err(PrereqError::CheckFailed {
                name: self.name.clone(),
                source: e.into(),
            }),
        }
    }

    fn install_hint(&self) -> &str {
        &self.hint
    }
}

/// Outcome of checking a set of prerequisites
#[derive(Debug, Default)]
pub struct PrereqReport {
    pub found: Vec<String>,
    /// `(name, install hint)` per missing tool
    pub missing: Vec<(String, String)>,
}

impl PrereqReport {
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Tools the installer shells out to
pub struct CommonPrereqs;

impl CommonPrereqs {
    /// Get kubectl prerequisite
    pub fn kubectl() -> CommandPrereq {
        CommandPrereq::new(
            "kubectl",
            "Install from: https://kubernetes.io/docs/tasks/tools/",
        )
    }

    /// Get oc (OpenShift CLI) prerequisite
    pub fn oc() -> CommandPrereq {
        CommandPrereq::new(
            "oc",
            "Install from: https://docs.openshift.com/container-platform/latest/cli_reference/openshift_cli/getting-started-cli.html",
        )
    }

    /// Check all prerequisites
    pub fn check_all(prereqs: &[&dyn Prerequisite]) -> PrereqReport {
        let mut report = PrereqReport::default();

        for prereq in prereqs {
            match prereq.check() {
                Ok(_) => {
                    report.found.push(prereq.name().to_string());
                }
                Err(PrereqError::NotFound { name, hint }) => {
                    report.missing.push((name, hint));
                }
                Err(PrereqError::CheckFailed { name, source }) => {
                    crate::log_warn!("Failed to check {}: {}", name, source);
                    report
                        .missing
                        .push((name, prereq.install_hint().to_string()));
                }
            }
        }

        report
    }
}
