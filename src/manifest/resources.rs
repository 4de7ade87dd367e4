//! Simple namespaced and cluster objects: Namespace, Secret, Service, CSIDriver

use semver::Version;

use super::api::csi_driver_api_version;
use super::template::{Template, mapping_block};
use super::{Labels, OwnerRef};

/// Label value selecting the CSI controller pod
pub const CONTROLLER_APP_LABEL: &str = "controller.csi.trident.netapp.io";

/// Label value selecting the CSI node pods
pub const NODE_APP_LABEL: &str = "node.csi.trident.netapp.io";

pub(crate) const NAMESPACE_TEMPLATE: &str = r#"apiVersion: v1
kind: Namespace
metadata:
  name: {NAMESPACE}
"#;

const SECRET_TEMPLATE: &str = r#"apiVersion: v1
kind: Secret
metadata:
  name: {NAME}
  namespace: {NAMESPACE}
  {LABELS}
  {OWNER_REF}
type: Opaque
{DATA}
{STRING_DATA}
"#;

const CSI_SERVICE_TEMPLATE: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
spec:
  selector:
    app: {APP_LABEL}
  ports:
    - name: https
      protocol: TCP
      port: 34571
      targetPort: 8443
    - name: metrics
      protocol: TCP
      port: 9220
      targetPort: 8001
"#;

const CSI_DRIVER_TEMPLATE: &str = r#"apiVersion: {API_VERSION}
kind: CSIDriver
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
spec:
  attachRequired: true
"#;

/// The `app` label of `labels`, or `default` when unset
pub(crate) fn app_label<'a>(labels: &'a Labels, default: &'a str) -> &'a str {
    labels.get("app").map(String::as_str).unwrap_or(default)
}

pub fn namespace_yaml(namespace: &str) -> String {
    Template::new(NAMESPACE_TEMPLATE)
        .set("NAMESPACE", namespace)
        .render()
}

/// Opaque Secret. `data` values must already be base64 encoded.
pub fn secret_yaml(
    name: &str,
    namespace: &str,
    labels: &Labels,
    owner_ref: &OwnerRef,
    data: &Labels,
    string_data: &Labels,
) -> String {
    Template::new(SECRET_TEMPLATE)
        .metadata(labels, owner_ref)
        .block("DATA", &mapping_block("data", data))
        .block("STRING_DATA", &mapping_block("stringData", string_data))
        .set("NAMESPACE", namespace)
        .set("NAME", name)
        .render()
}

/// Service exposing the controller's REST and metrics ports
pub fn csi_service_yaml(name: &str, labels: &Labels, owner_ref: &OwnerRef) -> String {
    Template::new(CSI_SERVICE_TEMPLATE)
        .metadata(labels, owner_ref)
        .set("APP_LABEL", app_label(labels, CONTROLLER_APP_LABEL))
        .set("NAME", name)
        .render()
}

pub fn csi_driver_yaml(
    name: &str,
    version: &Version,
    labels: &Labels,
    owner_ref: &OwnerRef,
) -> String {
    Template::new(CSI_DRIVER_TEMPLATE)
        .metadata(labels, owner_ref)
        .set("API_VERSION", csi_driver_api_version(version))
        .set("NAME", name)
        .render()
}
