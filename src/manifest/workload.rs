//! Workload objects: the controller Deployment (legacy and CSI), the CSI node
//! DaemonSet and the one-shot version Pod

use semver::Version;

use super::at_least;
use super::resources::{CONTROLLER_APP_LABEL, NODE_APP_LABEL, app_label};
use super::template::{Template, args_block, lines, name_list_block};
use super::{Labels, OwnerRef};
use crate::config::images::SidecarImages;

/// Default `app` label of the legacy (non-CSI) controller
pub const LEGACY_APP_LABEL: &str = "trident.netapp.io";

/// Default kubelet state directory
pub const DEFAULT_KUBELET_DIR: &str = "/var/lib/kubelet";

const DEPLOYMENT_TEMPLATE: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
spec:
  replicas: 1
  selector:
    matchLabels:
      app: {APP_LABEL}
  template:
    metadata:
      labels:
        app: {APP_LABEL}
    spec:
      serviceAccount: {NAME}
      containers:
      - name: trident-main
        image: {TRIDENT_IMAGE}
        imagePullPolicy: IfNotPresent
        command:
        - /trident_orchestrator
        args:
        - "--crd_persistence"
        - "--k8s_pod"
        - "--address=127.0.0.1"
        - "--log_format={LOG_FORMAT}"
        {DEBUG_ARGS}
        livenessProbe:
          exec:
            command:
            - tridentctl
            - -s
            - "127.0.0.1:8000"
            - version
          failureThreshold: 2
          initialDelaySeconds: 120
          periodSeconds: 120
          timeoutSeconds: 90
      {IMAGE_PULL_SECRETS}
      nodeSelector:
        kubernetes.io/os: linux
        kubernetes.io/arch: amd64
"#;

const CSI_DEPLOYMENT_TEMPLATE: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
spec:
  replicas: 1
  strategy:
    type: Recreate
  selector:
    matchLabels:
      app: {APP_LABEL}
  template:
    metadata:
      labels:
        app: {APP_LABEL}
    spec:
      serviceAccount: {NAME}
      containers:
      - name: trident-main
        image: {TRIDENT_IMAGE}
        imagePullPolicy: IfNotPresent
        ports:
        - containerPort: 8443
        - containerPort: 8001
        command:
        - /trident_orchestrator
        args:
        - "--crd_persistence"
        - "--k8s_pod"
        - "--https_rest"
        - "--https_port=8443"
        - "--csi_node_name=$(KUBE_NODE_NAME)"
        - "--csi_endpoint=$(CSI_ENDPOINT)"
        - "--csi_role=controller"
        - "--log_format={LOG_FORMAT}"
        - "--address={IP_LOCALHOST}"
        - "--metrics"
        {DEBUG_ARGS}
        livenessProbe:
          exec:
            command:
            - tridentctl
            - -s
            - "{IP_LOCALHOST}:8000"
            - version
          failureThreshold: 2
          initialDelaySeconds: 120
          periodSeconds: 120
          timeoutSeconds: 90
        env:
        - name: KUBE_NODE_NAME
          valueFrom:
            fieldRef:
              apiVersion: v1
              fieldPath: spec.nodeName
        - name: CSI_ENDPOINT
          value: unix://plugin/csi.sock
        - name: TRIDENT_SERVER
          value: "{IP_LOCALHOST}:8000"
        volumeMounts:
        - name: socket-dir
          mountPath: /plugin
        - name: certs
          mountPath: /certs
          readOnly: true
      - name: trident-autosupport
        image: {AUTOSUPPORT_IMAGE}
        command:
        - /usr/local/bin/trident-autosupport
        args:
        - "--k8s-pod"
        - "--log-format={LOG_FORMAT}"
        - "--trident-silence-collector={SILENCE_AUTOSUPPORT}"
        {AUTOSUPPORT_ARGS}
        resources:
          limits:
            memory: 1Gi
        volumeMounts:
        - name: asup-dir
          mountPath: /asup
      - name: csi-provisioner
        image: {PROVISIONER_IMAGE}
        args:
        - "--v=2"
        - "--timeout=600s"
        - "--csi-address=$(ADDRESS)"
        {PROVISIONER_ARGS}
        env:
        - name: ADDRESS
          value: /var/lib/csi/sockets/pluginproxy/csi.sock
        volumeMounts:
        - name: socket-dir
          mountPath: /var/lib/csi/sockets/pluginproxy/
      - name: csi-attacher
        image: {ATTACHER_IMAGE}
        args:
        - "--v=2"
        - "--timeout=60s"
        - "--retry-interval-start=10s"
        - "--csi-address=$(ADDRESS)"
        env:
        - name: ADDRESS
          value: /var/lib/csi/sockets/pluginproxy/csi.sock
        volumeMounts:
        - name: socket-dir
          mountPath: /var/lib/csi/sockets/pluginproxy/
      {RESIZER_CONTAINER}
      - name: csi-snapshotter
        image: {SNAPSHOTTER_IMAGE}
        args:
        - "--v=2"
        - "--timeout=300s"
        - "--csi-address=$(ADDRESS)"
        env:
        - name: ADDRESS
          value: /var/lib/csi/sockets/pluginproxy/csi.sock
        volumeMounts:
        - name: socket-dir
          mountPath: /var/lib/csi/sockets/pluginproxy/
      {IMAGE_PULL_SECRETS}
      nodeSelector:
        kubernetes.io/os: linux
        kubernetes.io/arch: amd64
      volumes:
      - name: socket-dir
        emptyDir:
      - name: certs
        projected:
          sources:
          - secret:
              name: trident-csi
              optional: true
          - secret:
              name: trident-encryption-keys
              optional: true
      - name: asup-dir
        emptyDir:
          medium: ""
          sizeLimit: 1Gi
"#;

const RESIZER_CONTAINER_TEMPLATE: &str = r#"- name: csi-resizer
  image: {RESIZER_IMAGE}
  args:
  - "--v=2"
  - "--timeout=300s"
  - "--csi-address=$(ADDRESS)"
  env:
  - name: ADDRESS
    value: /var/lib/csi/sockets/pluginproxy/csi.sock
  volumeMounts:
  - name: socket-dir
    mountPath: /var/lib/csi/sockets/pluginproxy/
"#;

const CSI_DAEMONSET_TEMPLATE: &str = r#"apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
spec:
  selector:
    matchLabels:
      app: {APP_LABEL}
  template:
    metadata:
      labels:
        app: {APP_LABEL}
    spec:
      serviceAccount: {NAME}
      hostNetwork: true
      hostIPC: true
      hostPID: true
      dnsPolicy: ClusterFirstWithHostNet
      priorityClassName: system-node-critical
      containers:
      - name: trident-main
        securityContext:
          privileged: true
          allowPrivilegeEscalation: true
        image: {TRIDENT_IMAGE}
        imagePullPolicy: IfNotPresent
        command:
        - /trident_orchestrator
        args:
        - "--no_persistence"
        - "--rest=false"
        - "--csi_node_name=$(KUBE_NODE_NAME)"
        - "--csi_endpoint=$(CSI_ENDPOINT)"
        - "--csi_role=node"
        - "--log_format={LOG_FORMAT}"
        {DEBUG_ARGS}
        env:
        - name: KUBE_NODE_NAME
          valueFrom:
            fieldRef:
              fieldPath: spec.nodeName
        - name: CSI_ENDPOINT
          value: unix://plugin/csi.sock
        - name: PATH
          value: /netapp:/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin
        volumeMounts:
        - name: plugin-dir
          mountPath: /plugin
        - name: plugins-mount-dir
          mountPath: {KUBELET_DIR}/plugins
          mountPropagation: "Bidirectional"
        - name: pods-mount-dir
          mountPath: {KUBELET_DIR}/pods
          mountPropagation: "Bidirectional"
        - name: dev-dir
          mountPath: /dev
        - name: sys-dir
          mountPath: /sys
        - name: host-dir
          mountPath: /host
          mountPropagation: "Bidirectional"
        - name: trident-tracking-dir
          mountPath: /var/lib/trident/tracking
          mountPropagation: "Bidirectional"
        - name: certs
          mountPath: /certs
          readOnly: true
      - name: driver-registrar
        image: {REGISTRAR_IMAGE}
        imagePullPolicy: IfNotPresent
        args:
        - "--v=2"
        - "--csi-address=$(ADDRESS)"
        - "--kubelet-registration-path=$(REGISTRATION_PATH)"
        env:
        - name: ADDRESS
          value: /plugin/csi.sock
        - name: REGISTRATION_PATH
          value: "{KUBELET_DIR}/plugins/csi.trident.netapp.io/csi.sock"
        - name: KUBE_NODE_NAME
          valueFrom:
            fieldRef:
              fieldPath: spec.nodeName
        volumeMounts:
        - name: plugin-dir
          mountPath: /plugin
        - name: registration-dir
          mountPath: /registration
      {IMAGE_PULL_SECRETS}
      tolerations:
      - effect: NoExecute
        operator: Exists
      - effect: NoSchedule
        operator: Exists
      nodeSelector:
        {OS_LABEL}: linux
        {ARCH_LABEL}: amd64
      volumes:
      - name: plugin-dir
        hostPath:
          path: {KUBELET_DIR}/plugins/csi.trident.netapp.io/
          type: DirectoryOrCreate
      - name: registration-dir
        hostPath:
          path: {KUBELET_DIR}/plugins_registry/
          type: Directory
      - name: plugins-mount-dir
        hostPath:
          path: {KUBELET_DIR}/plugins
          type: DirectoryOrCreate
      - name: pods-mount-dir
        hostPath:
          path: {KUBELET_DIR}/pods
          type: DirectoryOrCreate
      - name: dev-dir
        hostPath:
          path: /dev
          type: Directory
      - name: sys-dir
        hostPath:
          path: /sys
          type: Directory
      - name: host-dir
        hostPath:
          path: /
          type: Directory
      - name: trident-tracking-dir
        hostPath:
          path: /var/lib/trident/tracking
          type: DirectoryOrCreate
      - name: certs
        projected:
          sources:
          - secret:
              name: trident-csi
              optional: true
          - secret:
              name: trident-encryption-keys
              optional: true
"#;

const VERSION_POD_TEMPLATE: &str = r#"apiVersion: v1
kind: Pod
metadata:
  name: {NAME}
  {LABELS}
  {OWNER_REF}
spec:
  serviceAccount: {SERVICE_ACCOUNT}
  restartPolicy: Never
  containers:
  - name: trident-main
    imagePullPolicy: IfNotPresent
    image: {TRIDENT_IMAGE}
    command: ["tridentctl"]
    args: ["pause"]
  {IMAGE_PULL_SECRETS}
  nodeSelector:
    kubernetes.io/os: linux
    kubernetes.io/arch: amd64
"#;

/// Parameters of the legacy (non-CSI) controller Deployment
#[derive(Debug, Clone, Default)]
pub struct DeploymentParams {
    pub name: String,
    pub trident_image: String,
    pub log_format: String,
    pub image_pull_secrets: Vec<String>,
    pub labels: Labels,
    pub owner_ref: OwnerRef,
    pub debug: bool,
}

/// Autosupport collector settings carried by the CSI controller Deployment
#[derive(Debug, Clone, Default)]
pub struct AutosupportParams {
    pub image: String,
    pub proxy_url: String,
    pub custom_url: String,
    pub serial_number: String,
    pub hostname: String,
    pub silence: bool,
}

/// Parameters of the CSI controller Deployment
#[derive(Debug, Clone)]
pub struct CsiDeploymentParams {
    pub name: String,
    pub trident_image: String,
    pub autosupport: AutosupportParams,
    pub image_registry: String,
    pub log_format: String,
    pub image_pull_secrets: Vec<String>,
    pub labels: Labels,
    pub owner_ref: OwnerRef,
    pub debug: bool,
    pub use_ipv6: bool,
    pub topology_enabled: bool,
    pub version: Version,
}

/// Parameters of the CSI node DaemonSet
#[derive(Debug, Clone)]
pub struct CsiDaemonSetParams {
    pub name: String,
    pub trident_image: String,
    pub image_registry: String,
    pub kubelet_dir: String,
    pub log_format: String,
    pub image_pull_secrets: Vec<String>,
    pub labels: Labels,
    pub owner_ref: OwnerRef,
    pub debug: bool,
    pub version: Version,
}

fn debug_args(debug: bool) -> Vec<String> {
    if debug {
        args_block(&["--debug"])
    } else {
        Vec::new()
    }
}

/// Legacy controller Deployment running the orchestrator without CSI sidecars
pub fn deployment_yaml(params: &DeploymentParams) -> String {
    Template::new(DEPLOYMENT_TEMPLATE)
        .metadata(&params.labels, &params.owner_ref)
        .block("DEBUG_ARGS", &debug_args(params.debug))
        .block(
            "IMAGE_PULL_SECRETS",
            &name_list_block("imagePullSecrets", &params.image_pull_secrets),
        )
        .set("APP_LABEL", app_label(&params.labels, LEGACY_APP_LABEL))
        .set("TRIDENT_IMAGE", &params.trident_image)
        .set("LOG_FORMAT", &params.log_format)
        .set("NAME", &params.name)
        .render()
}

/// CSI controller Deployment: orchestrator, autosupport collector and the
/// controller-side sidecars. Fields tied to newer Kubernetes releases are left
/// out entirely on older clusters.
pub fn csi_deployment_yaml(params: &CsiDeploymentParams) -> String {
    let images = SidecarImages::resolve(&params.image_registry, &params.version);
    let ip_localhost = if params.use_ipv6 { "[::1]" } else { "127.0.0.1" };

    let asup = &params.autosupport;
    let mut autosupport_args = Vec::new();
    if !asup.proxy_url.is_empty() {
        autosupport_args.push(format!("--proxy-url={}", asup.proxy_url));
    }
    if !asup.custom_url.is_empty() {
        autosupport_args.push(format!("--custom-url={}", asup.custom_url));
    }
    if !asup.serial_number.is_empty() {
        autosupport_args.push(format!("--serial-number={}", asup.serial_number));
    }
    if !asup.hostname.is_empty() {
        autosupport_args.push(format!("--hostname={}", asup.hostname));
    }
    if params.debug {
        autosupport_args.push("-debug".to_string());
    }

    let mut provisioner_args = Vec::new();
    if params.topology_enabled {
        provisioner_args.push("--feature-gates=Topology=True");
    }
    if at_least(&params.version, 1, 17) {
        provisioner_args.push("--extra-create-metadata");
    }

    let resizer = if at_least(&params.version, 1, 16) {
        lines(
            &Template::new(RESIZER_CONTAINER_TEMPLATE)
                .set("RESIZER_IMAGE", &images.resizer)
                .render(),
        )
    } else {
        Vec::new()
    };

    Template::new(CSI_DEPLOYMENT_TEMPLATE)
        .metadata(&params.labels, &params.owner_ref)
        .block("DEBUG_ARGS", &debug_args(params.debug))
        .block("AUTOSUPPORT_ARGS", &args_block(&autosupport_args))
        .block("PROVISIONER_ARGS", &args_block(&provisioner_args))
        .block("RESIZER_CONTAINER", &resizer)
        .block(
            "IMAGE_PULL_SECRETS",
            &name_list_block("imagePullSecrets", &params.image_pull_secrets),
        )
        .set("APP_LABEL", app_label(&params.labels, CONTROLLER_APP_LABEL))
        .set("TRIDENT_IMAGE", &params.trident_image)
        .set("AUTOSUPPORT_IMAGE", &asup.image)
        .set("SILENCE_AUTOSUPPORT", asup.silence.to_string())
        .set("PROVISIONER_IMAGE", &images.provisioner)
        .set("ATTACHER_IMAGE", &images.attacher)
        .set("SNAPSHOTTER_IMAGE", &images.snapshotter)
        .set("IP_LOCALHOST", ip_localhost)
        .set("LOG_FORMAT", &params.log_format)
        .set("NAME", &params.name)
        .render()
}

/// CSI node DaemonSet: node plugin plus the node-driver-registrar sidecar
pub fn csi_daemonset_yaml(params: &CsiDaemonSetParams) -> String {
    let images = SidecarImages::resolve(&params.image_registry, &params.version);
    let kubelet_dir = if params.kubelet_dir.is_empty() {
        DEFAULT_KUBELET_DIR
    } else {
        params.kubelet_dir.trim_end_matches('/')
    };

    // node labels lost their beta prefix in 1.14
    let (os_label, arch_label) = if at_least(&params.version, 1, 14) {
        ("kubernetes.io/os", "kubernetes.io/arch")
    } else {
        ("beta.kubernetes.io/os", "beta.kubernetes.io/arch")
    };

    Template::new(CSI_DAEMONSET_TEMPLATE)
        .metadata(&params.labels, &params.owner_ref)
        .block("DEBUG_ARGS", &debug_args(params.debug))
        .block(
            "IMAGE_PULL_SECRETS",
            &name_list_block("imagePullSecrets", &params.image_pull_secrets),
        )
        .set("APP_LABEL", app_label(&params.labels, NODE_APP_LABEL))
        .set("TRIDENT_IMAGE", &params.trident_image)
        .set("REGISTRAR_IMAGE", &images.registrar)
        .set("KUBELET_DIR", kubelet_dir)
        .set("OS_LABEL", os_label)
        .set("ARCH_LABEL", arch_label)
        .set("LOG_FORMAT", &params.log_format)
        .set("NAME", &params.name)
        .render()
}

/// Pod that idles so the installer can exec `tridentctl version` in it
pub fn version_pod_yaml(
    name: &str,
    trident_image: &str,
    service_account: &str,
    image_pull_secrets: &[String],
    labels: &Labels,
    owner_ref: &OwnerRef,
) -> String {
    Template::new(VERSION_POD_TEMPLATE)
        .metadata(labels, owner_ref)
        .block(
            "IMAGE_PULL_SECRETS",
            &name_list_block("imagePullSecrets", image_pull_secrets),
        )
        .set("SERVICE_ACCOUNT", service_account)
        .set("TRIDENT_IMAGE", trident_image)
        .set("NAME", name)
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::validate_yaml;

    fn labels() -> Labels {
        Labels::from([("app".to_string(), "trident".to_string())])
    }

    fn owner_ref() -> OwnerRef {
        OwnerRef::from([
            ("uid".to_string(), "123456789".to_string()),
            ("kind".to_string(), "TridentProvisioner".to_string()),
        ])
    }

    fn csi_params(name: &str, version: Version) -> CsiDeploymentParams {
        CsiDeploymentParams {
            name: name.to_string(),
            trident_image: "netapp/trident:20.10.0-custom".to_string(),
            autosupport: AutosupportParams {
                image: "netapp/trident-autosupport:20.10.0-custom".to_string(),
                proxy_url: "http://127.0.0.1/".to_string(),
                custom_url: "http://172.16.150.125:8888/".to_string(),
                serial_number: "0000-0000".to_string(),
                hostname: "21e160d3-721f-4ec4-bcd4-c5e0d31d1a6e".to_string(),
                silence: false,
            },
            image_registry: "k8s.gcr.io".to_string(),
            log_format: "text".to_string(),
            image_pull_secrets: vec!["thisisasecret".to_string()],
            labels: labels(),
            owner_ref: OwnerRef::new(),
            debug: true,
            use_ipv6: true,
            topology_enabled: true,
            version,
        }
    }

    fn daemonset_params(version: Version) -> CsiDaemonSetParams {
        CsiDaemonSetParams {
            name: "trident-csi".to_string(),
            trident_image: "netapp/trident:20.10.0".to_string(),
            image_registry: String::new(),
            kubelet_dir: String::new(),
            log_format: "json".to_string(),
            image_pull_secrets: Vec::new(),
            labels: Labels::new(),
            owner_ref: owner_ref(),
            debug: false,
            version,
        }
    }

    fn parse(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).expect("rendered manifest should parse")
    }

    fn container_names(doc: &serde_yaml::Value) -> Vec<String> {
        doc["spec"]["template"]["spec"]["containers"]
            .as_sequence()
            .expect("containers list")
            .iter()
            .filter_map(|c| c["name"].as_str().map(str::to_string))
            .collect()
    }

    fn container_args(doc: &serde_yaml::Value, container: &str) -> Vec<String> {
        doc["spec"]["template"]["spec"]["containers"]
            .as_sequence()
            .expect("containers list")
            .iter()
            .find(|c| c["name"].as_str() == Some(container))
            .and_then(|c| c["args"].as_sequence())
            .map(|args| {
                args.iter()
                    .filter_map(|a| a.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_csi_deployment_valid_name() {
        let yaml = csi_deployment_yaml(&csi_params("trident-csi", Version::new(1, 17, 0)));
        assert!(validate_yaml(&yaml).is_ok(), "expected valid YAML:\n{}", yaml);
    }

    #[test]
    fn test_csi_deployment_leading_newline_name_is_invalid() {
        let yaml = csi_deployment_yaml(&csi_params("\ntrident-csi", Version::new(1, 17, 0)));
        assert!(validate_yaml(&yaml).is_err(), "expected invalid YAML:\n{}", yaml);
    }

    #[test]
    fn test_csi_deployment_flags() {
        let doc = parse(&csi_deployment_yaml(&csi_params(
            "trident-csi",
            Version::new(1, 18, 0),
        )));

        let main_args = container_args(&doc, "trident-main");
        assert!(main_args.contains(&"--debug".to_string()));
        assert!(main_args.contains(&"--address=[::1]".to_string()));

        let asup_args = container_args(&doc, "trident-autosupport");
        assert!(asup_args.contains(&"--trident-silence-collector=false".to_string()));
        assert!(asup_args.contains(&"--proxy-url=http://127.0.0.1/".to_string()));
        assert!(asup_args.contains(&"--serial-number=0000-0000".to_string()));
        assert!(asup_args.contains(&"-debug".to_string()));

        let provisioner_args = container_args(&doc, "csi-provisioner");
        assert!(provisioner_args.contains(&"--feature-gates=Topology=True".to_string()));
    }

    #[test]
    fn test_csi_deployment_optional_flags_off() {
        let mut params = csi_params("trident-csi", Version::new(1, 18, 0));
        params.debug = false;
        params.use_ipv6 = false;
        params.topology_enabled = false;
        params.autosupport.proxy_url.clear();
        params.autosupport.custom_url.clear();
        params.image_pull_secrets.clear();

        let doc = parse(&csi_deployment_yaml(&params));
        let main_args = container_args(&doc, "trident-main");
        assert!(!main_args.contains(&"--debug".to_string()));
        assert!(main_args.contains(&"--address=127.0.0.1".to_string()));

        let asup_args = container_args(&doc, "trident-autosupport");
        assert!(!asup_args.iter().any(|a| a.starts_with("--proxy-url")));
        assert!(!asup_args.iter().any(|a| a.starts_with("--custom-url")));

        let provisioner_args = container_args(&doc, "csi-provisioner");
        assert!(!provisioner_args.iter().any(|a| a.starts_with("--feature-gates")));
        assert!(doc["spec"]["template"]["spec"].get("imagePullSecrets").is_none());
    }

    #[test]
    fn test_csi_deployment_version_gates() {
        let old = parse(&csi_deployment_yaml(&csi_params(
            "trident-csi",
            Version::new(1, 15, 0),
        )));
        assert!(!container_names(&old).contains(&"csi-resizer".to_string()));
        assert!(
            !container_args(&old, "csi-provisioner").contains(&"--extra-create-metadata".to_string())
        );

        let mid = parse(&csi_deployment_yaml(&csi_params(
            "trident-csi",
            Version::new(1, 16, 0),
        )));
        assert!(container_names(&mid).contains(&"csi-resizer".to_string()));
        assert!(
            !container_args(&mid, "csi-provisioner").contains(&"--extra-create-metadata".to_string())
        );

        let new = parse(&csi_deployment_yaml(&csi_params(
            "trident-csi",
            Version::new(1, 17, 0),
        )));
        assert!(
            container_args(&new, "csi-provisioner").contains(&"--extra-create-metadata".to_string())
        );
    }

    #[test]
    fn test_csi_deployment_sidecar_registry() {
        let doc = parse(&csi_deployment_yaml(&csi_params(
            "trident-csi",
            Version::new(1, 17, 0),
        )));
        let containers = doc["spec"]["template"]["spec"]["containers"]
            .as_sequence()
            .unwrap();
        let provisioner = containers
            .iter()
            .find(|c| c["name"].as_str() == Some("csi-provisioner"))
            .unwrap();
        assert_eq!(
            provisioner["image"].as_str(),
            Some("k8s.gcr.io/csi-provisioner:v2.0.2")
        );
    }

    #[test]
    fn test_csi_deployment_selector_matches_pod_labels() {
        let doc = parse(&csi_deployment_yaml(&csi_params(
            "trident-csi",
            Version::new(1, 17, 0),
        )));
        assert_eq!(
            doc["spec"]["selector"]["matchLabels"]["app"],
            doc["spec"]["template"]["metadata"]["labels"]["app"]
        );
    }

    #[test]
    fn test_csi_deployment_is_idempotent() {
        let params = csi_params("trident-csi", Version::new(1, 19, 0));
        assert_eq!(csi_deployment_yaml(&params), csi_deployment_yaml(&params));
    }

    #[test]
    fn test_csi_deployment_values_are_verbatim() {
        let mut params = csi_params("trident-csi", Version::new(1, 18, 0));
        params.trident_image = "reg/{NAME}:1".to_string();
        params.labels.insert("tier".to_string(), "ui{NAME}".to_string());

        let doc = parse(&csi_deployment_yaml(&params));
        assert_eq!(
            doc["spec"]["template"]["spec"]["containers"][0]["image"].as_str(),
            Some("reg/{NAME}:1")
        );
        assert_eq!(doc["metadata"]["labels"]["tier"].as_str(), Some("ui{NAME}"));
        assert_eq!(doc["metadata"]["name"].as_str(), Some("trident-csi"));
    }

    #[test]
    fn test_csi_deployment_with_owner_ref() {
        for minor in [15, 19] {
            let mut params = csi_params("trident-csi", Version::new(1, minor, 0));
            params.owner_ref = owner_ref();

            let yaml = csi_deployment_yaml(&params);
            assert!(validate_yaml(&yaml).is_ok(), "expected valid YAML:\n{}", yaml);

            let doc = parse(&yaml);
            let owner = &doc["metadata"]["ownerReferences"][0];
            assert_eq!(owner["kind"].as_str(), Some("TridentProvisioner"));
            assert_eq!(doc["metadata"]["labels"]["app"].as_str(), Some("trident"));
            assert_eq!(
                doc["spec"]["template"]["spec"]["imagePullSecrets"][0]["name"].as_str(),
                Some("thisisasecret")
            );
        }
    }

    #[test]
    fn test_legacy_deployment() {
        let params = DeploymentParams {
            name: "trident".to_string(),
            trident_image: "trident-image".to_string(),
            log_format: "text".to_string(),
            image_pull_secrets: vec!["thisisasecret".to_string()],
            labels: labels(),
            owner_ref: owner_ref(),
            debug: true,
        };
        let yaml = deployment_yaml(&params);
        assert!(validate_yaml(&yaml).is_ok(), "expected valid YAML:\n{}", yaml);

        let doc = parse(&yaml);
        assert_eq!(
            doc["spec"]["template"]["spec"]["imagePullSecrets"][0]["name"].as_str(),
            Some("thisisasecret")
        );
        assert!(container_args(&doc, "trident-main").contains(&"--debug".to_string()));
    }

    #[test]
    fn test_legacy_deployment_defaults() {
        let yaml = deployment_yaml(&DeploymentParams {
            name: "trident".to_string(),
            trident_image: "trident-image".to_string(),
            log_format: "text".to_string(),
            ..Default::default()
        });
        let doc = parse(&yaml);
        assert_eq!(
            doc["spec"]["selector"]["matchLabels"]["app"].as_str(),
            Some(LEGACY_APP_LABEL)
        );
    }

    #[test]
    fn test_daemonset() {
        let yaml = csi_daemonset_yaml(&daemonset_params(Version::new(1, 18, 0)));
        assert!(validate_yaml(&yaml).is_ok(), "expected valid YAML:\n{}", yaml);

        let doc = parse(&yaml);
        assert_eq!(
            doc["spec"]["selector"]["matchLabels"]["app"].as_str(),
            Some(NODE_APP_LABEL)
        );
        let volumes = doc["spec"]["template"]["spec"]["volumes"]
            .as_sequence()
            .unwrap();
        let registration = volumes
            .iter()
            .find(|v| v["name"].as_str() == Some("registration-dir"))
            .unwrap();
        assert_eq!(
            registration["hostPath"]["path"].as_str(),
            Some("/var/lib/kubelet/plugins_registry/")
        );
    }

    #[test]
    fn test_daemonset_with_labels_and_pull_secrets() {
        let mut params = daemonset_params(Version::new(1, 18, 0));
        params.labels = labels();
        params.image_pull_secrets = vec!["thisisasecret".to_string()];
        params.debug = true;

        let yaml = csi_daemonset_yaml(&params);
        assert!(validate_yaml(&yaml).is_ok(), "expected valid YAML:\n{}", yaml);

        let doc = parse(&yaml);
        assert_eq!(doc["metadata"]["labels"]["app"].as_str(), Some("trident"));
        assert_eq!(
            doc["metadata"]["ownerReferences"][0]["kind"].as_str(),
            Some("TridentProvisioner")
        );
        assert_eq!(
            doc["spec"]["selector"]["matchLabels"]["app"].as_str(),
            Some("trident")
        );
        assert_eq!(
            doc["spec"]["template"]["spec"]["imagePullSecrets"][0]["name"].as_str(),
            Some("thisisasecret")
        );
        assert!(container_args(&doc, "trident-main").contains(&"--debug".to_string()));
    }

    #[test]
    fn test_daemonset_custom_kubelet_dir_and_old_node_labels() {
        let mut params = daemonset_params(Version::new(1, 13, 0));
        params.kubelet_dir = "/var/data/kubelet/".to_string();

        let doc = parse(&csi_daemonset_yaml(&params));
        let selector = &doc["spec"]["template"]["spec"]["nodeSelector"];
        assert_eq!(selector["beta.kubernetes.io/os"].as_str(), Some("linux"));
        assert!(selector.get("kubernetes.io/os").is_none());

        let registrar_env = &doc["spec"]["template"]["spec"]["containers"][1]["env"][1];
        assert_eq!(
            registrar_env["value"].as_str(),
            Some("/var/data/kubelet/plugins/csi.trident.netapp.io/csi.sock")
        );
    }

    #[test]
    fn test_version_pod() {
        let none = Labels::new();
        let no_owner = OwnerRef::new();
        let outputs = [
            version_pod_yaml("transient-trident-version-pod", "trident-image", "trident-csi", &[], &none, &no_owner),
            version_pod_yaml(
                "transient-trident-version-pod",
                "trident-image",
                "trident-csi",
                &["thisisasecret".to_string()],
                &labels(),
                &owner_ref(),
            ),
        ];
        for yaml in &outputs {
            assert!(validate_yaml(yaml).is_ok(), "expected valid YAML:\n{}", yaml);
        }

        let doc = parse(&outputs[1]);
        assert_eq!(doc["spec"]["serviceAccount"].as_str(), Some("trident-csi"));
        assert_eq!(doc["spec"]["imagePullSecrets"][0]["name"].as_str(), Some("thisisasecret"));
    }
}
