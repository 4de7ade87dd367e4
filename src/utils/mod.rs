//! Utility modules for trident-installer

pub mod dryrun;
pub mod errors;
pub mod logger;
pub mod prereqs;
pub mod progress;
pub mod prompt;

// Re-export commonly used items
pub use dryrun::DryRun;
pub use errors::InstallerError;
pub use logger::{log_error, log_info, log_warn};
pub use prereqs::{CommonPrereqs, Prerequisite};
pub use prompt::{confirm, confirm_destructive};
