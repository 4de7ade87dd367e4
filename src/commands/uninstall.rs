//! Uninstall command implementation

use anyhow::Result;

use super::RenderOverrides;
use crate::config::Settings;
use crate::install::apply::delete_bundle;
use crate::install::{BundleEntry, InstallBundle};
use crate::utils::{DryRun, confirm_destructive};

/// Options for the uninstall command
pub struct UninstallOptions {
    pub overrides: RenderOverrides,
    pub yes: bool,
    /// Also delete the CRDs (and the custom resources they hold) and the namespace
    pub purge: bool,
}

/// Objects kept unless purging, since they hold backend and volume state
fn is_persistent(entry: &BundleEntry) -> bool {
    matches!(entry.kind, "CustomResourceDefinition" | "Namespace")
}

/// The part of the installation that uninstall removes
pub fn removal_set(bundle: InstallBundle, purge: bool) -> InstallBundle {
    if purge {
        bundle
    } else {
        bundle.retain(|e| !is_persistent(e))
    }
}

/// Handle uninstall command
pub fn uninstall(settings: &Settings, options: UninstallOptions, dry_run: DryRun) -> Result<()> {
    let install = options.overrides.resolve(settings, true)?;
    let bundle = removal_set(InstallBundle::build(&install), options.purge);

    if !dry_run.is_enabled() {
        let prompt = if options.purge {
            format!(
                "Remove Trident, its CRDs and namespace '{}'? All backend and volume records will be lost",
                install.namespace
            )
        } else {
            format!("Remove Trident from namespace '{}'?", install.namespace)
        };

        if !confirm_destructive(&prompt, options.yes, settings.behavior.confirm_destructive)? {
            crate::log_warn!("Uninstall cancelled");
            return Ok(());
        }
    }

    delete_bundle(
        &bundle,
        options.overrides.kubeconfig.as_deref(),
        dry_run,
        settings.behavior.show_progress,
    )?;

    if !dry_run.is_enabled() {
        crate::log_info!("Trident removed from namespace '{}'", install.namespace);
    }
    Ok(())
}
