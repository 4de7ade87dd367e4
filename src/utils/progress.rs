//! Progress indicators for cluster operations

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Create a progress bar counting applied objects
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");

    let pb = ProgressBar::new(len);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Tracks objects being applied to or deleted from the cluster
pub struct ObjectProgress {
    pb: ProgressBar,
    verb: String,
}

impl ObjectProgress {
    /// `enabled = false` gives a hidden bar, for `--dry-run` or disabled progress
    pub fn new(verb: &str, total: usize, enabled: bool) -> Self {
        let pb = if enabled {
            create_progress_bar(total as u64, verb)
        } else {
            ProgressBar::hidden()
        };

        Self {
            pb,
            verb: verb.to_string(),
        }
    }

    pub fn start(&self, kind: &str, name: &str) {
        self.pb
            .set_message(format!("{} {}/{}", self.verb, kind, name));
    }

    pub fn done(&self) {
        self.pb.inc(1);
    }

    pub fn finish_success(&self, message: &str) {
        self.pb.finish_with_message(format!("✓ {}", message));
    }

    pub fn finish_error(&self, error: &str) {
        self.pb.finish_with_message(format!("✗ {}", error));
    }

    pub fn position(&self) -> u64 {
        self.pb.position()
    }
}

/// Helper to run a function with a spinner and show result
pub fn with_spinner_result<F, T, E>(message: &str, success_msg: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: std::fmt::Display,
{
    let pb = create_spinner(message);
    match f() {
        Ok(result) => {
            pb.finish_with_message(format!("✓ {}", success_msg));
            Ok(result)
        }
        Err(e) => {
            pb.finish_with_message(format!("✗ Failed: {}", e));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spinner() {
        let pb = create_spinner("Detecting cluster");
        assert!(pb.message().contains("Detecting cluster"));
        pb.finish_and_clear();
    }

    #[test]
    fn test_create_progress_bar() {
        let pb = create_progress_bar(12, "Applying");
        assert_eq!(pb.length(), Some(12));
        pb.finish_and_clear();
    }

    #[test]
    fn test_hidden_object_progress_still_counts() {
        let progress = ObjectProgress::new("Applying", 3, false);
        progress.start("Namespace", "trident");
        progress.done();
        progress.done();
        assert_eq!(progress.position(), 2);
        progress.finish_success("done");
    }

    #[test]
    fn test_with_spinner_result_passes_error_through() {
        let result: Result<(), String> =
            with_spinner_result("Testing", "ok", || Err("boom".to_string()));
        assert_eq!(result, Err("boom".to_string()));
    }
}
