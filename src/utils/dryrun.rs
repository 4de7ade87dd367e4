//! Dry-run mode utilities

use colored::Colorize;

/// Whether cluster-changing actions are executed or only reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DryRun(pub bool);

impl DryRun {
    pub fn is_enabled(&self) -> bool {
        self.0
    }

    /// Log a dry-run action
    pub fn log_action(&self, action: &str) {
        if self.0 {
            println!("  {} {}", "[DRY RUN]".cyan().bold(), action);
        }
    }

    /// Log multiple dry-run actions as a numbered list
    pub fn log_actions(&self, actions: &[String]) {
        if !self.0 {
            return;
        }

        println!(
            "{}",
            "[DRY RUN] Would perform the following actions:"
                .cyan()
                .bold()
        );
        println!();

        for (i, action) in actions.iter().enumerate() {
            println!("  {}. {}", i + 1, action);
        }

        println!();
        println!("{}", "No changes were made (--dry-run mode)".yellow());
    }

    /// Execute function only if not in dry-run mode
    pub fn exec<F>(&self, action_desc: &str, f: F) -> anyhow::Result<()>
    where
        F: FnOnce() -> anyhow::Result<()>,
    {
        self.exec_with_default(action_desc, (), f)
    }

    /// Execute function and return its value, or `default` in dry-run mode
    pub fn exec_with_default<F, T>(&self, action_desc: &str, default: T, f: F) -> anyhow::Result<T>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        if self.0 {
            self.log_action(action_desc);
            Ok(default)
        } else {
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        assert!(!DryRun::default().is_enabled());
    }

    #[test]
    fn test_exec_runs_when_disabled() {
        let mut executed = false;
        let result = DryRun(false).exec("apply bundle", || {
            executed = true;
            Ok(())
        });

        assert!(result.is_ok());
        assert!(executed);
    }

    #[test]
    fn test_exec_skips_in_dry_run_mode() {
        let mut executed = false;
        let result = DryRun(true).exec("apply bundle", || {
            executed = true;
            Ok(())
        });

        assert!(result.is_ok());
        assert!(!executed);
    }

    #[test]
    fn test_exec_with_default() {
        let value = DryRun(true)
            .exec_with_default("detect version", "1.19.0".to_string(), || {
                Ok("1.21.3".to_string())
            })
            .unwrap();
        assert_eq!(value, "1.19.0");
    }
}
