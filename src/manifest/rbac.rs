//! Identity and access objects: ServiceAccount, ClusterRole,
//! ClusterRoleBinding, PodSecurityPolicy and OpenShift SCCs

use super::api::{Flavor, RbacApi};
use super::template::{Template, name_list_block};
use super::{Labels, OwnerRef};

const SERVICE_ACCOUNT_TEMPLATE: &str = r#"apiVersion: v1
kind: ServiceAccount
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
{SECRETS}
"#;

const CLUSTER_ROLE_TEMPLATE: &str = r#"apiVersion: {API_VERSION}
kind: ClusterRole
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
rules:
  - apiGroups: [""]
    resources: ["namespaces"]
    verbs: ["get", "list"]
  - apiGroups: [""]
    resources: ["persistentvolumes", "persistentvolumeclaims"]
    verbs: ["get", "list", "watch", "create", "delete", "update", "patch"]
  - apiGroups: [""]
    resources: ["persistentvolumeclaims/status"]
    verbs: ["update", "patch"]
  - apiGroups: ["storage.k8s.io"]
    resources: ["storageclasses"]
    verbs: ["get", "list", "watch", "create", "delete", "update", "patch"]
  - apiGroups: [""]
    resources: ["events"]
    verbs: ["get", "list", "watch", "create", "update", "patch"]
  - apiGroups: [""]
    resources: ["secrets"]
    verbs: ["get", "list", "watch", "create", "delete", "update", "patch"]
  - apiGroups: [""]
    resources: ["pods"]
    verbs: ["get", "list", "watch"]
  - apiGroups: [""]
    resources: ["nodes"]
    verbs: ["get", "list", "watch", "update"]
  - apiGroups: ["storage.k8s.io"]
    resources: ["volumeattachments"]
    verbs: ["get", "list", "watch", "update", "patch"]
  - apiGroups: ["storage.k8s.io"]
    resources: ["volumeattachments/status"]
    verbs: ["update", "patch"]
  - apiGroups: ["snapshot.storage.k8s.io"]
    resources: ["volumesnapshots", "volumesnapshotclasses"]
    verbs: ["get", "list", "watch", "update", "patch"]
  - apiGroups: ["snapshot.storage.k8s.io"]
    resources: ["volumesnapshots/status", "volumesnapshotcontents/status"]
    verbs: ["update", "patch"]
  - apiGroups: ["snapshot.storage.k8s.io"]
    resources: ["volumesnapshotcontents"]
    verbs: ["get", "list", "watch", "create", "delete", "update", "patch"]
  - apiGroups: ["csi.storage.k8s.io"]
    resources: ["csidrivers", "csinodeinfos"]
    verbs: ["get", "list", "watch", "create", "delete", "update", "patch"]
  - apiGroups: ["storage.k8s.io"]
    resources: ["csidrivers", "csinodes"]
    verbs: ["get", "list", "watch", "create", "delete", "update", "patch"]
  - apiGroups: ["apiextensions.k8s.io"]
    resources: ["customresourcedefinitions"]
    verbs: ["get", "list", "watch", "create", "delete", "update", "patch"]
  - apiGroups: ["trident.netapp.io"]
    resources: ["tridentversions", "tridentbackends", "tridentstorageclasses", "tridentvolumes",
      "tridentnodes", "tridenttransactions", "tridentsnapshots", "tridentprovisioners",
      "tridentprovisioners/status", "tridentorchestrators", "tridentorchestrators/status"]
    verbs: ["get", "list", "watch", "create", "delete", "update", "patch"]
  - apiGroups: ["policy"]
    resources: ["podsecuritypolicies"]
    verbs: ["use"]
    resourceNames:
      - tridentpods
"#;

const CLUSTER_ROLE_BINDING_KUBERNETES_TEMPLATE: &str = r#"apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
subjects:
  - kind: ServiceAccount
    name: {NAME}
    namespace: {NAMESPACE}
roleRef:
  kind: ClusterRole
  name: {NAME}
  apiGroup: rbac.authorization.k8s.io
"#;

const CLUSTER_ROLE_BINDING_OPENSHIFT_TEMPLATE: &str = r#"apiVersion: authorization.openshift.io/v1
kind: ClusterRoleBinding
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
subjects:
  - kind: ServiceAccount
    name: {NAME}
    namespace: {NAMESPACE}
roleRef:
  name: {NAME}
"#;

const POD_SECURITY_POLICY_TEMPLATE: &str = r#"apiVersion: policy/v1beta1
kind: PodSecurityPolicy
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
spec:
  privileged: true
  allowPrivilegeEscalation: true
  allowedCapabilities:
  - "SYS_ADMIN"
  hostIPC: true
  hostPID: true
  hostNetwork: true
  seLinux:
    rule: RunAsAny
  supplementalGroups:
    rule: RunAsAny
  runAsUser:
    rule: RunAsAny
  fsGroup:
    rule: RunAsAny
  volumes:
  - hostPath
  - projected
  - emptyDir
"#;

const OPENSHIFT_SCC_TEMPLATE: &str = r#"apiVersion: security.openshift.io/v1
kind: SecurityContextConstraints
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
allowHostDirVolumePlugin: true
allowHostIPC: true
allowHostNetwork: true
allowHostPID: true
allowHostPorts: false
allowPrivilegeEscalation: true
allowPrivilegedContainer: true
allowedCapabilities:
- SYS_ADMIN
allowedUnsafeSysctls: null
defaultAddCapabilities: null
fsGroup:
  type: RunAsAny
groups: []
priority: 10
readOnlyRootFilesystem: false
requiredDropCapabilities:
- KILL
- MKNOD
- SETUID
- SETGID
runAsUser:
  type: RunAsAny
seLinuxContext:
  type: RunAsAny
supplementalGroups:
  type: RunAsAny
users:
- system:serviceaccount:{NAMESPACE}:{USER}
volumes:
- hostPath
- downwardAPI
- projected
- emptyDir
"#;

pub(crate) const OPENSHIFT_SCC_QUERY_TEMPLATE: &str = r#"apiVersion: security.openshift.io/v1
kind: SecurityContextConstraints
metadata:
  name: {SCC}
"#;

/// ServiceAccount, optionally listing its token secrets
pub fn service_account_yaml(
    name: &str,
    secrets: &[String],
    labels: &Labels,
    owner_ref: &OwnerRef,
) -> String {
    Template::new(SERVICE_ACCOUNT_TEMPLATE)
        .metadata(labels, owner_ref)
        .block("SECRETS", &name_list_block("secrets", secrets))
        .set("NAME", name)
        .render()
}

pub fn cluster_role_yaml(
    flavor: Flavor,
    name: &str,
    labels: &Labels,
    owner_ref: &OwnerRef,
    csi: bool,
) -> String {
    Template::new(CLUSTER_ROLE_TEMPLATE)
        .metadata(labels, owner_ref)
        .set("API_VERSION", RbacApi::select(flavor, csi).api_version())
        .set("NAME", name)
        .render()
}

/// Binds the ClusterRole `name` to the ServiceAccount `name` in `namespace`
pub fn cluster_role_binding_yaml(
    namespace: &str,
    flavor: Flavor,
    name: &str,
    labels: &Labels,
    owner_ref: &OwnerRef,
    csi: bool,
) -> String {
    let template = match RbacApi::select(flavor, csi) {
        RbacApi::Kubernetes => CLUSTER_ROLE_BINDING_KUBERNETES_TEMPLATE,
        RbacApi::OpenShift => CLUSTER_ROLE_BINDING_OPENSHIFT_TEMPLATE,
    };

    Template::new(template)
        .metadata(labels, owner_ref)
        .set("NAMESPACE", namespace)
        .set("NAME", name)
        .render()
}

pub fn pod_security_policy_yaml(name: &str, labels: &Labels, owner_ref: &OwnerRef) -> String {
    Template::new(POD_SECURITY_POLICY_TEMPLATE)
        .metadata(labels, owner_ref)
        .set("NAME", name)
        .render()
}

/// Privileged SCC granted to `system:serviceaccount:<namespace>:<user>`
pub fn openshift_scc_yaml(
    name: &str,
    user: &str,
    namespace: &str,
    labels: &Labels,
    owner_ref: &OwnerRef,
) -> String {
    Template::new(OPENSHIFT_SCC_TEMPLATE)
        .metadata(labels, owner_ref)
        .set("NAMESPACE", namespace)
        .set("USER", user)
        .set("NAME", name)
        .render()
}

/// Minimal SCC document used to look up an existing SCC by name
pub fn openshift_scc_query_yaml(scc: &str) -> String {
    Template::new(OPENSHIFT_SCC_QUERY_TEMPLATE)
        .set("SCC", scc)
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::validate_yaml;

    const NAME: &str = "trident";
    const NAMESPACE: &str = "trident";

    fn labels() -> Labels {
        Labels::from([("app".to_string(), "trident".to_string())])
    }

    fn owner_ref() -> OwnerRef {
        OwnerRef::from([
            ("uid".to_string(), "123456789".to_string()),
            ("kind".to_string(), "TridentOrchestrator".to_string()),
        ])
    }

    fn secrets() -> Vec<String> {
        vec!["thisisasecret1".to_string(), "thisisasecret2".to_string()]
    }

    fn parse(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).expect("rendered manifest should parse")
    }

    #[test]
    fn test_factory_output_is_valid_yaml() {
        let none = Labels::new();
        let no_owner = OwnerRef::new();

        let outputs = vec![
            service_account_yaml(NAME, &[], &none, &no_owner),
            service_account_yaml(NAME, &secrets(), &labels(), &owner_ref()),
            cluster_role_yaml(Flavor::K8s, NAME, &none, &no_owner, false),
            cluster_role_yaml(Flavor::OpenShift, NAME, &labels(), &owner_ref(), true),
            cluster_role_binding_yaml(NAMESPACE, Flavor::OpenShift, NAME, &none, &owner_ref(), false),
            cluster_role_binding_yaml(NAMESPACE, Flavor::K8s, NAME, &labels(), &owner_ref(), true),
            pod_security_policy_yaml("tridentpods", &labels(), &no_owner),
            openshift_scc_yaml(NAME, "trident-csi", NAMESPACE, &labels(), &owner_ref()),
            openshift_scc_query_yaml("privileged"),
        ];

        for (i, yaml) in outputs.iter().enumerate() {
            assert!(
                validate_yaml(yaml).is_ok(),
                "expected output {} to be valid YAML:\n{}",
                i,
                yaml
            );
        }
    }

    #[test]
    fn test_api_version_table() {
        let none = Labels::new();
        let no_owner = OwnerRef::new();
        let cases = [
            (Flavor::K8s, false, "rbac.authorization.k8s.io/v1"),
            (Flavor::K8s, true, "rbac.authorization.k8s.io/v1"),
            (Flavor::OpenShift, false, "authorization.openshift.io/v1"),
            (Flavor::OpenShift, true, "rbac.authorization.k8s.io/v1"),
        ];

        for (flavor, csi, expected) in cases {
            let role = parse(&cluster_role_yaml(flavor, NAME, &none, &no_owner, csi));
            assert_eq!(role["apiVersion"].as_str(), Some(expected));

            let binding = parse(&cluster_role_binding_yaml(
                NAMESPACE, flavor, NAME, &none, &no_owner, csi,
            ));
            assert_eq!(binding["apiVersion"].as_str(), Some(expected));
        }
    }

    #[test]
    fn test_role_ref_shape_follows_api_group() {
        let none = Labels::new();
        let no_owner = OwnerRef::new();

        let k8s = parse(&cluster_role_binding_yaml(
            NAMESPACE, Flavor::K8s, NAME, &none, &no_owner, false,
        ));
        assert_eq!(
            k8s["roleRef"]["apiGroup"].as_str(),
            Some("rbac.authorization.k8s.io")
        );

        let openshift = parse(&cluster_role_binding_yaml(
            NAMESPACE, Flavor::OpenShift, NAME, &none, &no_owner, false,
        ));
        assert!(openshift["roleRef"].get("apiGroup").is_none());
        assert_eq!(
            openshift["subjects"][0]["namespace"].as_str(),
            Some(NAMESPACE)
        );
    }

    #[test]
    fn test_optional_blocks_omitted() {
        let yaml = service_account_yaml(NAME, &[], &Labels::new(), &OwnerRef::new());
        let sa = parse(&yaml);
        assert!(sa["metadata"].get("labels").is_none());
        assert!(sa["metadata"].get("ownerReferences").is_none());
        assert!(sa.get("secrets").is_none());
    }

    #[test]
    fn test_metadata_blocks_rendered() {
        let yaml = service_account_yaml(NAME, &secrets(), &labels(), &owner_ref());
        // owner values are copied through as written
        assert!(yaml.contains("\n    uid: 123456789\n"), "{}", yaml);

        let sa = parse(&yaml);
        assert_eq!(sa["metadata"]["labels"]["app"].as_str(), Some("trident"));
        assert_eq!(
            sa["metadata"]["ownerReferences"][0]["kind"].as_str(),
            Some("TridentOrchestrator")
        );
        assert_eq!(sa["secrets"][1]["name"].as_str(), Some("thisisasecret2"));
    }

    #[test]
    fn test_scc_user() {
        let scc = parse(&openshift_scc_yaml(
            NAME,
            "trident-csi",
            "storage",
            &Labels::new(),
            &OwnerRef::new(),
        ));
        assert_eq!(
            scc["users"][0].as_str(),
            Some("system:serviceaccount:storage:trident-csi")
        );
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let a = cluster_role_binding_yaml(NAMESPACE, Flavor::K8s, NAME, &labels(), &owner_ref(), true);
        let b = cluster_role_binding_yaml(NAMESPACE, Flavor::K8s, NAME, &labels(), &owner_ref(), true);
        assert_eq!(a, b);
    }
}
