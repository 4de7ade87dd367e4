//! Objects for running the installer itself inside the cluster
//!
//! Every placeholder here sits in value position, so the raw templates are
//! valid YAML before rendering.

use super::api::{Flavor, RbacApi};
use super::template::Template;

pub const INSTALLER_NAME: &str = "trident-installer";
pub const UNINSTALLER_NAME: &str = "trident-uninstaller";

pub(crate) const INSTALLER_SERVICE_ACCOUNT_YAML: &str = r#"apiVersion: v1
kind: ServiceAccount
metadata:
  name: trident-installer
"#;

pub(crate) const INSTALLER_CLUSTER_ROLE_TEMPLATE: &str = r#"apiVersion: {API_VERSION}
kind: ClusterRole
metadata:
  name: trident-installer
rules:
  - apiGroups: [""]
    resources: ["namespaces", "pods", "pods/exec", "pods/log", "services", "secrets", "serviceaccounts", "configmaps", "persistentvolumes", "persistentvolumeclaims", "events"]
    verbs: ["*"]
  - apiGroups: ["apps", "extensions"]
    resources: ["deployments", "daemonsets", "replicasets"]
    verbs: ["*"]
  - apiGroups: ["rbac.authorization.k8s.io", "authorization.openshift.io"]
    resources: ["clusterroles", "clusterrolebindings"]
    verbs: ["*"]
  - apiGroups: ["apiextensions.k8s.io"]
    resources: ["customresourcedefinitions"]
    verbs: ["*"]
  - apiGroups: ["trident.netapp.io", "csi.storage.k8s.io", "storage.k8s.io"]
    resources: ["*"]
    verbs: ["*"]
  - apiGroups: ["policy"]
    resources: ["podsecuritypolicies"]
    verbs: ["*"]
  - apiGroups: ["security.openshift.io"]
    resources: ["securitycontextconstraints"]
    verbs: ["*"]
"#;

pub(crate) const INSTALLER_CLUSTER_ROLE_BINDING_KUBERNETES_TEMPLATE: &str = r#"apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: trident-installer
subjects:
  - kind: ServiceAccount
    name: trident-installer
    namespace: {NAMESPACE}
roleRef:
  kind: ClusterRole
  name: trident-installer
  apiGroup: rbac.authorization.k8s.io
"#;

pub(crate) const INSTALLER_CLUSTER_ROLE_BINDING_OPENSHIFT_TEMPLATE: &str = r#"apiVersion: authorization.openshift.io/v1
kind: ClusterRoleBinding
metadata:
  name: trident-installer
subjects:
  - kind: ServiceAccount
    name: trident-installer
    namespace: {NAMESPACE}
roleRef:
  name: trident-installer
"#;

pub(crate) const INSTALLER_POD_TEMPLATE: &str = r#"apiVersion: v1
kind: Pod
metadata:
  name: trident-installer
  namespace: {NAMESPACE}
  labels:
    app: trident-installer.netapp.io
spec:
  serviceAccount: trident-installer
  restartPolicy: Never
  containers:
  - name: trident-installer
    image: {TRIDENT_IMAGE}
    workingDir: /
    command: ["tridentctl"]
    args: [{INSTALLER_ARGS}]
    volumeMounts:
    - name: setup-dir
      mountPath: /setup
  volumes:
  - name: setup-dir
    configMap:
      name: trident-installer
"#;

pub(crate) const UNINSTALLER_POD_TEMPLATE: &str = r#"apiVersion: v1
kind: Pod
metadata:
  name: trident-uninstaller
  namespace: {NAMESPACE}
  labels:
    app: trident-uninstaller.netapp.io
spec:
  serviceAccount: trident-installer
  restartPolicy: Never
  containers:
  - name: trident-uninstaller
    image: {TRIDENT_IMAGE}
    workingDir: /
    command: ["tridentctl"]
    args: [{INSTALLER_ARGS}]
"#;

/// Quote each argument as a flow-sequence entry
fn flow_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| serde_json::Value::String(arg.as_ref().to_string()).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn installer_service_account_yaml() -> String {
    INSTALLER_SERVICE_ACCOUNT_YAML.to_string()
}

pub fn installer_cluster_role_yaml(flavor: Flavor) -> String {
    Template::new(INSTALLER_CLUSTER_ROLE_TEMPLATE)
        .set("API_VERSION", RbacApi::select(flavor, false).api_version())
        .render()
}

pub fn installer_cluster_role_binding_yaml(namespace: &str, flavor: Flavor) -> String {
    let template = match RbacApi::select(flavor, false) {
        RbacApi::Kubernetes => INSTALLER_CLUSTER_ROLE_BINDING_KUBERNETES_TEMPLATE,
        RbacApi::OpenShift => INSTALLER_CLUSTER_ROLE_BINDING_OPENSHIFT_TEMPLATE,
    };

    Template::new(template).set("NAMESPACE", namespace).render()
}

/// Pod running `tridentctl` with `args` under the installer account
pub fn installer_pod_yaml<S: AsRef<str>>(namespace: &str, image: &str, args: &[S]) -> String {
    Template::new(INSTALLER_POD_TEMPLATE)
        .set("INSTALLER_ARGS", flow_args(args))
        .set("TRIDENT_IMAGE", image)
        .set("NAMESPACE", namespace)
        .render()
}

pub fn uninstaller_pod_yaml<S: AsRef<str>>(namespace: &str, image: &str, args: &[S]) -> String {
    Template::new(UNINSTALLER_POD_TEMPLATE)
        .set("INSTALLER_ARGS", flow_args(args))
        .set("TRIDENT_IMAGE", image)
        .set("NAMESPACE", namespace)
        .render()
}
