//! Push a rendered bundle to the cluster, or take it down again

use anyhow::{Context, Result};
use std::path::Path;

use super::bundle::InstallBundle;
use crate::k8s::kubectl;
use crate::utils::DryRun;
use crate::utils::progress::ObjectProgress;

/// Describe each entry as `<verb> <kind>/<name>`
pub fn describe(bundle: &InstallBundle, verb: &str) -> Vec<String> {
    bundle
        .entries()
        .iter()
        .map(|e| format!("{} {}/{}", verb, e.kind, e.name))
        .collect()
}

/// Apply every object in order
pub fn apply_bundle(
    bundle: &InstallBundle,
    kubeconfig: Option<&Path>,
    dry_run: DryRun,
    show_progress: bool,
) -> Result<()> {
    if dry_run.is_enabled() {
        dry_run.log_actions(&describe(bundle, "kubectl apply"));
        return Ok(());
    }

    let progress = ObjectProgress::new("Applying", bundle.len(), show_progress);

    for entry in bundle.entries() {
        progress.start(entry.kind, &entry.name);
        crate::log_info!("Applying {}/{}", entry.kind, entry.name);

        if let Err(e) = kubectl::apply_yaml(&entry.yaml, kubeconfig) {
            progress.finish_error(&format!("{}/{}", entry.kind, entry.name));
            return Err(e).with_context(|| format!("Failed to apply {}/{}", entry.kind, entry.name));
        }
        progress.done();
    }

    progress.finish_success(&format!("Applied {} objects", bundle.len()));
    Ok(())
}

/// Delete every object, last-applied first
pub fn delete_bundle(
    bundle: &InstallBundle,
    kubeconfig: Option<&Path>,
    dry_run: DryRun,
    show_progress: bool,
) -> Result<()> {
    let reversed = bundle.reversed();

    if dry_run.is_enabled() {
        dry_run.log_actions(&describe(&reversed, "kubectl delete"));
        return Ok(());
    }

    let progress = ObjectProgress::new("Deleting", reversed.len(), show_progress);

    for entry in reversed.entries() {
        progress.start(entry.kind, &entry.name);
        crate::log_info!("Deleting {}/{}", entry.kind, entry.name);

        if let Err(e) = kubectl::delete_yaml(&entry.yaml, kubeconfig) {
            progress.finish_error(&format!("{}/{}", entry.kind, entry.name));
            return Err(e)
                .with_context(|| format!("Failed to delete {}/{}", entry.kind, entry.name));
        }
        progress.done();
    }

    progress.finish_success(&format!("Deleted {} objects", reversed.len()));
    Ok(())
}

/// Wait for the controller and node workloads to roll out
pub fn wait_for_workloads(
    bundle: &InstallBundle,
    namespace: &str,
    timeout: &str,
    kubeconfig: Option<&Path>,
    dry_run: DryRun,
) -> Result<()> {
    for entry in bundle.entries() {
        let resource = match entry.kind {
            "Deployment" => format!("deployment/{}", entry.name),
            "DaemonSet" => format!("daemonset/{}", entry.name),
            _ => continue,
        };

        dry_run.exec(&format!("kubectl rollout status {}", resource), || {
            crate::log_info!("Waiting for {} to roll out...", resource);
            kubectl::wait_for_rollout(&resource, namespace, timeout, kubeconfig)
                .with_context(|| format!("{} did not become ready", resource))
        })?;
    }
    Ok(())
}
