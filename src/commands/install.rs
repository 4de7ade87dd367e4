//! Install command implementation

use anyhow::Result;

use super::RenderOverrides;
use crate::config::Settings;
use crate::install::InstallBundle;
use crate::install::apply::{apply_bundle, wait_for_workloads};
use crate::utils::errors::{InstallerError, display_error_and_exit};
use crate::utils::prereqs::Prerequisite;
use crate::utils::{CommonPrereqs, DryRun};

/// Options for the install command
pub struct InstallCommandOptions {
    pub overrides: RenderOverrides,
    pub wait: bool,
    pub timeout: String,
}

/// Handle install command
pub fn install(settings: &Settings, options: InstallCommandOptions, dry_run: DryRun) -> Result<()> {
    let kubectl = CommonPrereqs::kubectl();
    if kubectl.check().is_err() {
        display_error_and_exit(InstallerError::tool_not_found(
            kubectl.name(),
            kubectl.install_hint(),
        ));
    }

    let install = options.overrides.resolve(settings, true)?;
    let kubeconfig = options.overrides.kubeconfig.as_deref();

    crate::log_info!(
        "Installing Trident into namespace '{}' on {} {}",
        install.namespace,
        install.flavor,
        install.version
    );

    let bundle = InstallBundle::build(&install);
    if let Err(e) = bundle.validate() {
        display_error_and_exit(InstallerError::invalid_manifest(&format!("{:#}", e)));
    }

    apply_bundle(
        &bundle,
        kubeconfig,
        dry_run,
        settings.behavior.show_progress,
    )?;

    if options.wait {
        wait_for_workloads(
            &bundle,
            &install.namespace,
            &options.timeout,
            kubeconfig,
            dry_run,
        )?;
    }

    if !dry_run.is_enabled() {
        crate::log_info!("Trident installed in namespace '{}'", install.namespace);
    }
    Ok(())
}
