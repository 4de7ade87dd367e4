//! Ordered set of manifests making up one installation

use anyhow::{Context, Result};
use semver::Version;

use crate::config::Settings;
use crate::manifest::crd::{
    TRIDENT_CRDS, crd_yaml, csi_driver_crd_yaml, csi_node_info_crd_yaml,
};
use crate::manifest::rbac::{
    cluster_role_binding_yaml, cluster_role_yaml, openshift_scc_yaml, pod_security_policy_yaml,
    service_account_yaml,
};
use crate::manifest::resources::{
    CONTROLLER_APP_LABEL, NODE_APP_LABEL, csi_driver_yaml, csi_service_yaml, namespace_yaml,
    secret_yaml,
};
use crate::manifest::workload::{
    AutosupportParams, CsiDaemonSetParams, CsiDeploymentParams, DeploymentParams,
    LEGACY_APP_LABEL, csi_daemonset_yaml, csi_deployment_yaml, deployment_yaml,
};
use crate::manifest::{CrdApi, Flavor, Labels, OwnerRef, at_least, validate_yaml};

pub const CSI_NAME: &str = "trident-csi";
pub const LEGACY_NAME: &str = "trident";
pub const PSP_NAME: &str = "tridentpods";
pub const CSI_DRIVER_NAME: &str = "csi.trident.netapp.io";

/// Everything needed to render an installation
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub namespace: String,
    pub flavor: Flavor,
    pub version: Version,
    pub csi: bool,
    pub trident_image: String,
    pub autosupport: AutosupportParams,
    pub image_registry: String,
    pub kubelet_dir: String,
    pub log_format: String,
    pub image_pull_secrets: Vec<String>,
    pub debug: bool,
    pub use_ipv6: bool,
    pub topology_enabled: bool,
    /// Rendered as the `stringData` of the installation Secret
    pub secret_data: Labels,
}

impl InstallOptions {
    pub fn from_settings(settings: &Settings, version: Version) -> Self {
        let defaults = &settings.defaults;
        let asup = &settings.autosupport;

        Self {
            namespace: defaults.namespace.clone(),
            flavor: defaults.flavor,
            version,
            csi: defaults.csi,
            trident_image: settings.images.trident.clone(),
            autosupport: AutosupportParams {
                image: settings.images.autosupport.clone(),
                proxy_url: asup.proxy_url.clone(),
                custom_url: asup.custom_url.clone(),
                serial_number: asup.serial_number.clone(),
                hostname: asup.hostname.clone(),
                silence: asup.silence,
            },
            image_registry: defaults.image_registry.clone(),
            kubelet_dir: defaults.kubelet_dir.clone(),
            log_format: defaults.log_format.clone(),
            image_pull_secrets: settings.images.pull_secrets.clone(),
            debug: settings.features.debug,
            use_ipv6: settings.features.use_ipv6,
            topology_enabled: settings.features.topology_enabled,
            secret_data: Labels::new(),
        }
    }

    /// Name shared by the account, role, binding and controller objects
    pub fn name(&self) -> &'static str {
        if self.csi { CSI_NAME } else { LEGACY_NAME }
    }

    fn controller_labels(&self) -> Labels {
        let app = if self.csi {
            CONTROLLER_APP_LABEL
        } else {
            LEGACY_APP_LABEL
        };
        Labels::from([("app".to_string(), app.to_string())])
    }

    fn node_labels(&self) -> Labels {
        Labels::from([("app".to_string(), NODE_APP_LABEL.to_string())])
    }

    fn deployment_params(&self) -> DeploymentParams {
        DeploymentParams {
            name: self.name().to_string(),
            trident_image: self.trident_image.clone(),
            log_format: self.log_format.clone(),
            image_pull_secrets: self.image_pull_secrets.clone(),
            labels: self.controller_labels(),
            owner_ref: OwnerRef::new(),
            debug: self.debug,
        }
    }

    fn csi_deployment_params(&self) -> CsiDeploymentParams {
        CsiDeploymentParams {
            name: self.name().to_string(),
            trident_image: self.trident_image.clone(),
            autosupport: self.autosupport.clone(),
            image_registry: self.image_registry.clone(),
            log_format: self.log_format.clone(),
            image_pull_secrets: self.image_pull_secrets.clone(),
            labels: self.controller_labels(),
            owner_ref: OwnerRef::new(),
            debug: self.debug,
            use_ipv6: self.use_ipv6,
            topology_enabled: self.topology_enabled,
            version: self.version.clone(),
        }
    }

    fn csi_daemonset_params(&self) -> CsiDaemonSetParams {
        CsiDaemonSetParams {
            name: self.name().to_string(),
            trident_image: self.trident_image.clone(),
            image_registry: self.image_registry.clone(),
            kubelet_dir: self.kubelet_dir.clone(),
            log_format: self.log_format.clone(),
            image_pull_secrets: self.image_pull_secrets.clone(),
            labels: self.node_labels(),
            owner_ref: OwnerRef::new(),
            debug: self.debug,
            version: self.version.clone(),
        }
    }
}

/// One rendered object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub kind: &'static str,
    pub name: String,
    pub yaml: String,
}

/// Installation objects in apply order
#[derive(Debug, Clone, Default)]
pub struct InstallBundle {
    entries: Vec<BundleEntry>,
}

impl InstallBundle {
    pub fn build(options: &InstallOptions) -> Self {
        let mut bundle = Self::default();
        let name = options.name();
        let ns = options.namespace.as_str();
        let labels = options.controller_labels();
        let owner = OwnerRef::new();

        bundle.push("Namespace", ns, namespace_yaml(ns));

        let crd_api = CrdApi::for_version(&options.version);
        for crd in TRIDENT_CRDS {
            bundle.push("CustomResourceDefinition", crd.name(), crd_yaml(crd, crd_api));
        }
        // 1.13 has no CSIDriver/CSINode objects, only their alpha CRDs
        if options.csi && !at_least(&options.version, 1, 14) {
            bundle.push(
                "CustomResourceDefinition",
                "csidrivers.csi.storage.k8s.io",
                csi_driver_crd_yaml(),
            );
            bundle.push(
                "CustomResourceDefinition",
                "csinodeinfos.csi.storage.k8s.io",
                csi_node_info_crd_yaml(),
            );
        }

        bundle.push(
            "ServiceAccount",
            name,
            service_account_yaml(name, &[], &labels, &owner),
        );
        bundle.push(
            "ClusterRole",
            name,
            cluster_role_yaml(options.flavor, name, &labels, &owner, options.csi),
        );
        bundle.push(
            "ClusterRoleBinding",
            name,
            cluster_role_binding_yaml(ns, options.flavor, name, &labels, &owner, options.csi),
        );

        match options.flavor {
            Flavor::OpenShift => bundle.push(
                "SecurityContextConstraints",
                name,
                openshift_scc_yaml(name, name, ns, &labels, &owner),
            ),
            Flavor::K8s => bundle.push(
                "PodSecurityPolicy",
                PSP_NAME,
                pod_security_policy_yaml(PSP_NAME, &labels, &owner),
            ),
        }

        if options.csi {
            bundle.push("Service", name, csi_service_yaml(name, &labels, &owner));
            if at_least(&options.version, 1, 14) {
                bundle.push(
                    "CSIDriver",
                    CSI_DRIVER_NAME,
                    csi_driver_yaml(CSI_DRIVER_NAME, &options.version, &labels, &owner),
                );
            }
            bundle.push(
                "Deployment",
                name,
                csi_deployment_yaml(&options.csi_deployment_params()),
            );
            bundle.push(
                "DaemonSet",
                name,
                csi_daemonset_yaml(&options.csi_daemonset_params()),
            );
        } else {
            bundle.push(
                "Deployment",
                name,
                deployment_yaml(&options.deployment_params()),
            );
        }

        if !options.secret_data.is_empty() {
            bundle.push(
                "Secret",
                name,
                secret_yaml(name, ns, &labels, &owner, &Labels::new(), &options.secret_data),
            );
        }

        bundle
    }

    fn push(&mut self, kind: &'static str, name: impl Into<String>, yaml: String) {
        self.entries.push(BundleEntry {
            kind,
            name: name.into(),
            yaml,
        });
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.kind).collect()
    }

    /// Find an entry by kind, for rendering a single object
    pub fn find(&self, kind: &str) -> Option<&BundleEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// All documents as one `---` separated stream
    pub fn to_yaml(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.yaml.as_str())
            .collect::<Vec<_>>()
            .join("---\n")
    }

    /// Parse every document, naming the first object that fails
    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            validate_yaml(&entry.yaml)
                .with_context(|| format!("Invalid manifest for {}/{}", entry.kind, entry.name))?;
        }
        Ok(())
    }

    /// Keep only the entries matching `keep`
    pub fn retain<F>(mut self, keep: F) -> Self
    where
        F: FnMut(&BundleEntry) -> bool,
    {
        self.entries.retain(keep);
        self
    }

    /// Entries in deletion order (reverse of apply order)
    pub fn reversed(&self) -> Self {
        Self {
            entries: self.entries.iter().rev().cloned().collect(),
        }
    }
}
