//! Enhanced error types with actionable suggestions

use colored::Colorize;
use thiserror::Error;

/// Enhanced error with suggestions and documentation links
#[derive(Error, Debug)]
#[error("{message}")]
pub struct InstallerError {
    pub message: String,
    pub suggestions: Vec<String>,
    pub docs_link: Option<String>,
}

pub const DOCS_LINK: &str = "https://docs.netapp.com/us-en/trident/";

impl InstallerError {
    /// Create a new error with suggestions
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: Vec::new(),
            docs_link: None,
        }
    }

    /// Add a suggestion to the error
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a documentation link
    pub fn with_docs(mut self, link: impl Into<String>) -> Self {
        self.docs_link = Some(link.into());
        self
    }

    /// Display the error with suggestions
    pub fn display(&self) {
        crate::log_error!("{}", self.message);
        eprintln!("{} {}", "error:".red().bold(), self.message);

        if !self.suggestions.is_empty() {
            eprintln!();
            eprintln!("{}", "Suggestions:".yellow().bold());
            for suggestion in &self.suggestions {
                eprintln!("  {} {}", "→".blue(), suggestion);
            }
        }

        if let Some(docs) = &self.docs_link {
            eprintln!();
            eprintln!("{} {}", "Documentation:".cyan(), docs);
        }
    }

    // Common error patterns

    /// Tool not found error
    pub fn tool_not_found(tool: &str, install_hint: &str) -> Self {
        Self::new(format!("Required tool '{}' not found", tool))
            .suggest(install_hint.to_string())
            .suggest("Ensure the tool is in your PATH")
    }

    /// Kubernetes version string could not be used
    pub fn invalid_version(input: &str) -> Self {
        Self::new(format!("Unrecognised Kubernetes version '{}'", input))
            .suggest("Pass a version such as 1.19 or v1.18.3 with --kubernetes-version")
            .suggest("Or leave it unset to detect the version with kubectl")
    }

    /// A rendered manifest did not parse
    pub fn invalid_manifest(reason: &str) -> Self {
        Self::new(format!("Rendered manifest is not valid YAML: {}", reason))
            .suggest("Check names and labels for newlines or YAML special characters")
            .suggest("Inspect the output with: trident-installer generate bundle")
    }

    /// Permission denied error
    pub fn permission_denied(operation: &str) -> Self {
        Self::new(format!("Permission denied: {}", operation))
            .suggest("Verify you have sufficient cluster permissions")
            .suggest("Installing cluster-scoped objects needs the cluster-admin role")
            .suggest("For OpenShift: ensure you're logged in as a privileged user")
    }

    /// Cluster could not be reached
    pub fn cluster_unreachable() -> Self {
        Self::new("Unable to reach the Kubernetes API server")
            .suggest("Check your current context: kubectl config current-context")
            .suggest("Verify network connectivity to the cluster")
            .suggest("Use --kubernetes-version and --flavor to render offline")
    }

    /// Missing prerequisite error
    pub fn missing_prerequisite(prereq: &str, reason: &str) -> Self {
        Self::new(format!("Missing prerequisite: {} ({})", prereq, reason))
            .suggest("Run 'trident-installer check' to see all prerequisites")
            .suggest(format!("Install {}", prereq))
    }

    /// OpenShift not logged in error
    pub fn openshift_not_logged_in() -> Self {
        Self::new("Not logged into an OpenShift cluster")
            .suggest("Log in with: oc login <cluster-url>")
            .suggest("Verify credentials and cluster accessibility")
    }
}

/// Helper to display error and exit
pub fn display_error_and_exit(error: InstallerError) -> ! {
    error.display();
    std::process::exit(1);
}

/// Convert anyhow error to InstallerError when possible
pub fn enhance_error(err: anyhow::Error) -> InstallerError {
    let err = match err.downcast::<InstallerError>() {
        Ok(already) => return already,
        Err(err) => err,
    };

    if let Some(manifest) = err.downcast_ref::<crate::manifest::ManifestError>() {
        return match manifest {
            crate::manifest::ManifestError::InvalidVersion { input, .. } => {
                InstallerError::invalid_version(input)
            }
            other => InstallerError::invalid_manifest(&other.to_string()),
        };
    }

    let err_str = format!("{:#}", err);

    if err_str.contains("connection refused")
        || err_str.contains("Unable to connect")
        || err_str.contains("timeout")
    {
        return InstallerError::cluster_unreachable();
    }

    if err_str.contains("unauthorized") || err_str.contains("forbidden") {
        return InstallerError::permission_denied("cluster operation");
    }

    if err_str.contains("not logged") {
        return InstallerError::openshift_not_logged_in();
    }

    // Default error with generic suggestion
    InstallerError::new(err_str)
        .suggest("Run with -v or -vv for more details")
        .with_docs(DOCS_LINK)
}
