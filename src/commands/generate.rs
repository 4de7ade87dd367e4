//! Generate command: render manifests without applying them

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::RenderOverrides;
use crate::config::Settings;
use crate::install::bundle::{CSI_DRIVER_NAME, PSP_NAME};
use crate::install::{InstallBundle, InstallOptions};
use crate::manifest::crd::{crds_yaml, csi_driver_crd_yaml, csi_node_info_crd_yaml};
use crate::manifest::installer::{
    installer_cluster_role_binding_yaml, installer_cluster_role_yaml, installer_pod_yaml,
    installer_service_account_yaml, uninstaller_pod_yaml,
};
use crate::manifest::rbac::{
    cluster_role_binding_yaml, cluster_role_yaml, openshift_scc_query_yaml, openshift_scc_yaml,
    pod_security_policy_yaml, service_account_yaml,
};
use crate::manifest::resources::{
    csi_driver_yaml, csi_service_yaml, namespace_yaml, secret_yaml,
};
use crate::manifest::workload::version_pod_yaml;
use crate::manifest::{CrdApi, Labels, OwnerRef, validate_yaml};
use crate::utils::errors::InstallerError;

pub const VERSION_POD_NAME: &str = "trident-version-pod";

/// Kinds of manifest that can be rendered on their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Resource {
    Namespace,
    ServiceAccount,
    ClusterRole,
    ClusterRoleBinding,
    /// Controller Deployment (CSI or legacy, per settings)
    Deployment,
    Daemonset,
    Service,
    CsiDriver,
    Secret,
    PodSecurityPolicy,
    Scc,
    SccQuery,
    VersionPod,
    Crds,
    CsiDriverCrd,
    CsiNodeInfoCrd,
    InstallerServiceAccount,
    InstallerClusterRole,
    InstallerClusterRoleBinding,
    InstallerPod,
    UninstallerPod,
    /// Every object of an installation, in apply order
    Bundle,
}

/// Options for the generate command
pub struct GenerateOptions {
    pub resource: Resource,
    pub overrides: RenderOverrides,
    pub output: Option<String>,
}

/// Render a single resource kind
pub fn render(resource: Resource, options: &InstallOptions) -> Result<String> {
    let name = options.name();
    let ns = options.namespace.as_str();
    let none = Labels::new();
    let owner = OwnerRef::new();
    let bundle = || InstallBundle::build(options);
    let from_bundle = |kind: &str| -> Result<String> {
        let install = if options.csi { "CSI" } else { "legacy" };
        bundle().find(kind).map(|e| e.yaml.clone()).ok_or_else(|| {
            InstallerError::new(format!("The {} installation has no {} object", install, kind))
                .suggest("List every object with: trident-installer generate bundle")
                .into()
        })
    };

    Ok(match resource {
        Resource::Namespace => namespace_yaml(ns),
        Resource::ServiceAccount => service_account_yaml(name, &[], &none, &owner),
        Resource::ClusterRole => cluster_role_yaml(options.flavor, name, &none, &owner, options.csi),
        Resource::ClusterRoleBinding => {
            cluster_role_binding_yaml(ns, options.flavor, name, &none, &owner, options.csi)
        }
        Resource::Deployment => from_bundle("Deployment")?,
        Resource::Daemonset => from_bundle("DaemonSet")?,
        Resource::Service => csi_service_yaml(name, &none, &owner),
        Resource::CsiDriver => csi_driver_yaml(CSI_DRIVER_NAME, &options.version, &none, &owner),
        Resource::Secret => secret_yaml(name, ns, &none, &owner, &Labels::new(), &options.secret_data),
        Resource::PodSecurityPolicy => pod_security_policy_yaml(PSP_NAME, &none, &owner),
        Resource::Scc => openshift_scc_yaml(name, name, ns, &none, &owner),
        Resource::SccQuery => openshift_scc_query_yaml(name),
        Resource::VersionPod => version_pod_yaml(
            VERSION_POD_NAME,
            &options.trident_image,
            name,
            &options.image_pull_secrets,
            &none,
            &owner,
        ),
        Resource::Crds => crds_yaml(CrdApi::for_version(&options.version)),
        Resource::CsiDriverCrd => csi_driver_crd_yaml(),
        Resource::CsiNodeInfoCrd => csi_node_info_crd_yaml(),
        Resource::InstallerServiceAccount => installer_service_account_yaml(),
        Resource::InstallerClusterRole => installer_cluster_role_yaml(options.flavor),
        Resource::InstallerClusterRoleBinding => {
            installer_cluster_role_binding_yaml(ns, options.flavor)
        }
        Resource::InstallerPod => {
            installer_pod_yaml(ns, &options.trident_image, &["install", "--namespace", ns])
        }
        Resource::UninstallerPod => {
            uninstaller_pod_yaml(ns, &options.trident_image, &["uninstall", "--namespace", ns])
        }
        Resource::Bundle => bundle().to_yaml(),
    })
}

/// Write `yaml` to `output`, or stdout when unset
pub fn write_output(yaml: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, yaml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            crate::log_info!("Wrote {}", path.display());
        }
        None => print!("{}", yaml),
    }
    Ok(())
}

/// Handle generate command
pub fn generate(settings: &Settings, options: GenerateOptions) -> Result<()> {
    let install = options.overrides.resolve(settings, false)?;
    let yaml = render(options.resource, &install)?;

    // Output is still written so the offending text can be inspected
    if let Err(e) = validate_yaml(&yaml) {
        crate::log_warn!("Rendered {:?} is not valid YAML: {}", options.resource, e);
    }

    write_output(&yaml, options.output.as_deref().map(Path::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Flavor;
    use clap::ValueEnum;
    use semver::Version;

    fn options(flavor: Flavor, csi: bool) -> InstallOptions {
        let mut settings = Settings::default();
        settings.defaults.flavor = flavor;
        settings.defaults.csi = csi;
        InstallOptions::from_settings(&settings, Version::new(1, 19, 0))
    }

    #[test]
    fn test_every_resource_renders_valid_yaml() {
        for flavor in [Flavor::K8s, Flavor::OpenShift] {
            for csi in [true, false] {
                let opts = options(flavor, csi);
                for resource in Resource::value_variants() {
                    // the legacy install has no node plugin
                    if !csi && *resource == Resource::Daemonset {
                        assert!(render(*resource, &opts).is_err());
                        continue;
                    }
                    let yaml = render(*resource, &opts).unwrap();
                    assert!(
                        validate_yaml(&yaml).is_ok(),
                        "{:?} ({}, csi={}) should be valid",
                        resource,
                        flavor,
                        csi
                    );
                }
            }
        }
    }

    #[test]
    fn test_deployment_follows_csi_flag() {
        let csi: serde_yaml::Value =
            serde_yaml::from_str(&render(Resource::Deployment, &options(Flavor::K8s, true)).unwrap())
                .unwrap();
        assert_eq!(csi["metadata"]["name"].as_str(), Some("trident-csi"));

        let legacy: serde_yaml::Value =
            serde_yaml::from_str(&render(Resource::Deployment, &options(Flavor::K8s, false)).unwrap())
                .unwrap();
        assert_eq!(legacy["metadata"]["name"].as_str(), Some("trident"));
    }

    #[test]
    fn test_installer_pod_args() {
        let pod: serde_yaml::Value =
            serde_yaml::from_str(&render(Resource::InstallerPod, &options(Flavor::K8s, true)).unwrap())
                .unwrap();
        assert_eq!(
            pod["spec"]["containers"][0]["args"][0].as_str(),
            Some("install")
        );
    }

    #[test]
    fn test_generate_legacy_daemonset_fails() {
        let err = render(Resource::Daemonset, &options(Flavor::K8s, false)).unwrap_err();
        let installer = err.downcast_ref::<InstallerError>().unwrap();
        assert_eq!(
            installer.message,
            "The legacy installation has no DaemonSet object"
        );

        let mut settings = Settings::default();
        settings.defaults.csi = false;
        settings.defaults.kubernetes_version = Some("1.19".to_string());
        let result = generate(
            &settings,
            GenerateOptions {
                resource: Resource::Daemonset,
                overrides: RenderOverrides::default(),
                output: None,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.yaml");
        write_output("a: 1\n", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a: 1\n");
    }
}
