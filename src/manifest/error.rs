//! Errors raised around manifest rendering
//!
//! Rendering itself never fails. These cover parsing user-provided
//! parameters and checking rendered output.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("unknown orchestrator flavor '{0}' (expected 'k8s' or 'openshift')")]
    UnknownFlavor(String),

    #[error("invalid Kubernetes version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("document {document} is not valid YAML: {source}")]
    InvalidYaml {
        document: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAML stream contains no documents")]
    EmptyStream,
}

pub type Result<T> = std::result::Result<T, ManifestError>;
