//! Command implementations for trident-installer CLI

pub mod generate;
pub mod install;
pub mod uninstall;
pub mod validate;

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Settings;
use crate::install::InstallOptions;
use crate::k8s::kubectl;
use crate::manifest::{Flavor, Labels, parse_kube_version};
use crate::utils::progress::with_spinner_result;

/// Command-line values that take precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct RenderOverrides {
    pub namespace: Option<String>,
    pub flavor: Option<Flavor>,
    pub kubernetes_version: Option<String>,
    pub legacy: bool,
    pub trident_image: Option<String>,
    pub autosupport_image: Option<String>,
    pub image_registry: Option<String>,
    pub kubelet_dir: Option<String>,
    pub log_format: Option<String>,
    pub image_pull_secrets: Vec<String>,
    pub debug: bool,
    pub use_ipv6: bool,
    pub topology_enabled: bool,
    pub silence_autosupport: bool,
    pub secret_data: Vec<(String, String)>,
    pub kubeconfig: Option<PathBuf>,
}

impl RenderOverrides {
    /// Fold the overrides into a copy of `settings`
    pub fn apply(&self, settings: &Settings) -> Settings {
        let mut merged = settings.clone();
        let defaults = &mut merged.defaults;

        if let Some(ns) = &self.namespace {
            defaults.namespace = ns.clone();
        }
        if let Some(flavor) = self.flavor {
            defaults.flavor = flavor;
        }
        if let Some(version) = &self.kubernetes_version {
            defaults.kubernetes_version = Some(version.clone());
        }
        if self.legacy {
            defaults.csi = false;
        }
        if let Some(registry) = &self.image_registry {
            defaults.image_registry = registry.clone();
        }
        if let Some(dir) = &self.kubelet_dir {
            defaults.kubelet_dir = dir.clone();
        }
        if let Some(format) = &self.log_format {
            defaults.log_format = format.clone();
        }

        if let Some(image) = &self.trident_image {
            merged.images.trident = image.clone();
        }
        if let Some(image) = &self.autosupport_image {
            merged.images.autosupport = image.clone();
        }
        merged
            .images
            .pull_secrets
            .extend(self.image_pull_secrets.iter().cloned());

        merged.features.debug |= self.debug;
        merged.features.use_ipv6 |= self.use_ipv6;
        merged.features.topology_enabled |= self.topology_enabled;
        merged.autosupport.silence |= self.silence_autosupport;

        merged
    }

    /// Build install options, asking the cluster for whatever was not given.
    /// With `detect_flavor` the flavor is taken from the cluster unless set on
    /// the command line.
    pub fn resolve(&self, settings: &Settings, detect_flavor: bool) -> Result<InstallOptions> {
        let merged = self.apply(settings);
        let kubeconfig = self.kubeconfig.as_deref();

        let version = match &merged.defaults.kubernetes_version {
            Some(raw) => parse_kube_version(raw)?,
            None => with_spinner_result(
                "Detecting Kubernetes version",
                "Kubernetes version detected",
                || kubectl::server_version(kubeconfig),
            )
            .context("Failed to detect the Kubernetes version; pass --kubernetes-version")?,
        };

        let mut options = InstallOptions::from_settings(&merged, version);

        if detect_flavor && self.flavor.is_none() {
            options.flavor = kubectl::detect_flavor(kubeconfig)
                .context("Failed to detect the cluster flavor; pass --flavor")?;
        }
        options.secret_data = self.secret_data.iter().cloned().collect::<Labels>();

        crate::log_info!(
            "Rendering for {} {} (csi: {})",
            options.flavor,
            options.version,
            options.csi
        );
        Ok(options)
    }
}

/// Parse a `KEY=VALUE` command-line pair
pub fn parse_key_value(input: &str) -> std::result::Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", input)),
    }
}
