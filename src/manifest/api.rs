//! Cluster flavors and the API group/version tables keyed on them

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::at_least;
use super::error::ManifestError;

/// Target cluster type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    #[default]
    #[value(name = "k8s")]
    K8s,
    #[value(name = "openshift")]
    OpenShift,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::K8s => "k8s",
            Flavor::OpenShift => "openshift",
        }
    }
}

impl FromStr for Flavor {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "k8s" | "kubernetes" => Ok(Flavor::K8s),
            "openshift" => Ok(Flavor::OpenShift),
            _ => Err(ManifestError::UnknownFlavor(s.to_string())),
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API group used for ClusterRole and ClusterRoleBinding objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RbacApi {
    Kubernetes,
    OpenShift,
}

impl RbacApi {
    /// OpenShift keeps its own RBAC group unless the caller opts into the
    /// standard one with `csi`.
    pub const fn select(flavor: Flavor, csi: bool) -> Self {
        match (flavor, csi) {
            (Flavor::OpenShift, false) => RbacApi::OpenShift,
            _ => RbacApi::Kubernetes,
        }
    }

    pub const fn api_version(self) -> &'static str {
        match self {
            RbacApi::Kubernetes => "rbac.authorization.k8s.io/v1",
            RbacApi::OpenShift => "authorization.openshift.io/v1",
        }
    }
}

/// CustomResourceDefinition API variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrdApi {
    V1beta1,
    V1,
}

impl CrdApi {
    /// apiextensions v1 is served from Kubernetes 1.16
    pub fn for_version(version: &Version) -> Self {
        if at_least(version, 1, 16) {
            CrdApi::V1
        } else {
            CrdApi::V1beta1
        }
    }

    pub const fn api_version(self) -> &'static str {
        match self {
            CrdApi::V1beta1 => "apiextensions.k8s.io/v1beta1",
            CrdApi::V1 => "apiextensions.k8s.io/v1",
        }
    }
}

/// API version for CSIDriver objects, GA from Kubernetes 1.18
pub fn csi_driver_api_version(version: &Version) -> &'static str {
    if at_least(version, 1, 18) {
        "storage.k8s.io/v1"
    } else {
        "storage.k8s.io/v1beta1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rbac_table() {
        assert_eq!(RbacApi::select(Flavor::K8s, false), RbacApi::Kubernetes);
        assert_eq!(RbacApi::select(Flavor::K8s, true), RbacApi::Kubernetes);
        assert_eq!(RbacApi::select(Flavor::OpenShift, false), RbacApi::OpenShift);
        assert_eq!(RbacApi::select(Flavor::OpenShift, true), RbacApi::Kubernetes);
    }

    #[test]
    fn test_flavor_parsing() {
        assert_eq!("k8s".parse::<Flavor>().unwrap(), Flavor::K8s);
        assert_eq!("OpenShift".parse::<Flavor>().unwrap(), Flavor::OpenShift);
        assert!(matches!(
            "nomad".parse::<Flavor>(),
            Err(ManifestError::UnknownFlavor(_))
        ));
        assert_eq!(Flavor::OpenShift.to_string(), "openshift");
    }

    #[test]
    fn test_crd_api_for_version() {
        assert_eq!(CrdApi::for_version(&Version::new(1, 15, 3)), CrdApi::V1beta1);
        assert_eq!(CrdApi::for_version(&Version::new(1, 16, 0)), CrdApi::V1);
    }

    #[test]
    fn test_csi_driver_api_version() {
        assert_eq!(
            csi_driver_api_version(&Version::new(1, 17, 9)),
            "storage.k8s.io/v1beta1"
        );
        assert_eq!(
            csi_driver_api_version(&Version::new(1, 18, 0)),
            "storage.k8s.io/v1"
        );
    }
}
