//! CSI sidecar image table, keyed on the target Kubernetes version

use semver::Version;

use crate::manifest::{at_least, resolve_registry};

/// Sidecar image names (without registry) for one Kubernetes release line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sidecars {
    pub provisioner: &'static str,
    pub attacher: &'static str,
    pub resizer: &'static str,
    pub snapshotter: &'static str,
    pub registrar: &'static str,
}

/// Sidecars published under sig-storage, for Kubernetes 1.17 and later
pub const CURRENT_SIDECARS: Sidecars = Sidecars {
    provisioner: "csi-provisioner:v2.0.2",
    attacher: "csi-attacher:v3.0.0",
    resizer: "csi-resizer:v1.0.0",
    snapshotter: "csi-snapshotter:v3.0.0",
    registrar: "csi-node-driver-registrar:v2.0.1",
};

/// Sidecars published under quay.io/k8scsi, for older clusters
pub const LEGACY_SIDECARS: Sidecars = Sidecars {
    provisioner: "csi-provisioner:v1.6.0",
    attacher: "csi-attacher:v2.2.0",
    resizer: "csi-resizer:v0.5.0",
    snapshotter: "csi-snapshotter:v2.1.1",
    registrar: "csi-node-driver-registrar:v1.3.0",
};

impl Sidecars {
    pub fn for_version(version: &Version) -> Self {
        if Self::uses_sig_storage(version) {
            CURRENT_SIDECARS
        } else {
            LEGACY_SIDECARS
        }
    }

    /// sig-storage hosts the sidecar releases used from 1.17 onwards
    pub fn uses_sig_storage(version: &Version) -> bool {
        at_least(version, 1, 17)
    }
}

/// Fully qualified sidecar images for a cluster version and registry override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarImages {
    pub provisioner: String,
    pub attacher: String,
    pub resizer: String,
    pub snapshotter: String,
    pub registrar: String,
}

impl SidecarImages {
    pub fn resolve(image_registry: &str, version: &Version) -> Self {
        let registry = resolve_registry(image_registry, Sidecars::uses_sig_storage(version));
        let sidecars = Sidecars::for_version(version);
        let qualify = |image: &str| format!("{}/{}", registry, image);

        Self {
            provisioner: qualify(sidecars.provisioner),
            attacher: qualify(sidecars.attacher),
            resizer: qualify(sidecars.resizer),
            snapshotter: qualify(sidecars.snapshotter),
            registrar: qualify(sidecars.registrar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_by_version() {
        let current = SidecarImages::resolve("", &Version::new(1, 17, 0));
        assert_eq!(
            current.provisioner,
            "k8s.gcr.io/sig-storage/csi-provisioner:v2.0.2"
        );

        let legacy = SidecarImages::resolve("", &Version::new(1, 16, 4));
        assert_eq!(legacy.attacher, "quay.io/k8scsi/csi-attacher:v2.2.0");
    }

    #[test]
    fn test_custom_registry() {
        let images = SidecarImages::resolve("registry.example.com/mirror/", &Version::new(1, 19, 0));
        assert_eq!(
            images.registrar,
            "registry.example.com/mirror/csi-node-driver-registrar:v2.0.1"
        );
    }
}
