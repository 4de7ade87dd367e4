//! Container registry resolution for CSI sidecar images

/// Registry hosting the current CSI sidecar releases
pub const CSI_SIDECAR_REGISTRY: &str = "k8s.gcr.io/sig-storage";

/// Registry hosting the older CSI sidecar releases
pub const LEGACY_SIDECAR_REGISTRY: &str = "quay.io/k8scsi";

/// Normalize a user supplied registry prefix.
///
/// A non-empty value only loses a single trailing `/`; paths inside it are
/// kept. An empty value falls back to the default registry for `csi`.
pub fn resolve_registry(registry: &str, csi: bool) -> String {
    if registry.is_empty() {
        let default = if csi {
            CSI_SIDECAR_REGISTRY
        } else {
            LEGACY_SIDECAR_REGISTRY
        };
        return default.to_string();
    }

    registry.strip_suffix('/').unwrap_or(registry).to_string()
}
