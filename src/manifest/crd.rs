//! CustomResourceDefinitions for the orchestrator's own objects
//!
//! The CRDs are described once in [`TRIDENT_CRDS`] and rendered into either
//! the `apiextensions.k8s.io/v1beta1` or `apiextensions.k8s.io/v1` shape.

use super::api::CrdApi;
use super::template::Template;

pub const TRIDENT_GROUP: &str = "trident.netapp.io";

/// An extra column shown by `kubectl get`
#[derive(Debug, Clone, Copy)]
pub struct PrinterColumn {
    pub name: &'static str,
    pub column_type: &'static str,
    pub description: &'static str,
    pub priority: u32,
    pub json_path: &'static str,
}

/// One CRD in group [`TRIDENT_GROUP`]
#[derive(Debug, Clone, Copy)]
pub struct CrdDefinition {
    pub plural: &'static str,
    pub singular: &'static str,
    pub kind: &'static str,
    pub short_names: &'static [&'static str],
    pub categories: &'static [&'static str],
    pub columns: &'static [PrinterColumn],
}

impl CrdDefinition {
    pub fn name(&self) -> String {
        format!("{}.{}", self.plural, TRIDENT_GROUP)
    }
}

const AGE_COLUMN: PrinterColumn = PrinterColumn {
    name: "Age",
    column_type: "date",
    description: "Creation time",
    priority: 0,
    json_path: ".metadata.creationTimestamp",
};

pub const TRIDENT_CRDS: &[CrdDefinition] = &[
    CrdDefinition {
        plural: "tridentversions",
        singular: "tridentversion",
        kind: "TridentVersion",
        short_names: &["tver", "tversion"],
        categories: &["trident", "trident-internal"],
        columns: &[PrinterColumn {
            name: "Version",
            column_type: "string",
            description: "The Trident version",
            priority: 0,
            json_path: ".trident_version",
        }],
    },
    CrdDefinition {
        plural: "tridentbackends",
        singular: "tridentbackend",
        kind: "TridentBackend",
        short_names: &["tbe", "tbackend"],
        categories: &["trident", "trident-internal"],
        columns: &[
            PrinterColumn {
                name: "Backend",
                column_type: "string",
                description: "The backend name",
                priority: 0,
                json_path: ".backendName",
            },
            PrinterColumn {
                name: "Backend UUID",
                column_type: "string",
                description: "The backend UUID",
                priority: 0,
                json_path: ".backendUUID",
            },
        ],
    },
    CrdDefinition {
        plural: "tridentstorageclasses",
        singular: "tridentstorageclass",
        kind: "TridentStorageClass",
        short_names: &["tsc", "tstorageclass"],
        categories: &["trident", "trident-internal"],
        columns: &[],
    },
    CrdDefinition {
        plural: "tridentvolumes",
        singular: "tridentvolume",
        kind: "TridentVolume",
        short_names: &["tvol", "tvolume"],
        categories: &["trident", "trident-internal"],
        columns: &[
            AGE_COLUMN,
            PrinterColumn {
                name: "Size",
                column_type: "string",
                description: "The volume's size",
                priority: 1,
                json_path: ".config.size",
            },
            PrinterColumn {
                name: "Storage Class",
                column_type: "string",
                description: "The volume's storage class",
                priority: 1,
                json_path: ".config.storageClass",
            },
            PrinterColumn {
                name: "State",
                column_type: "string",
                description: "The volume's state",
                priority: 1,
                json_path: ".state",
            },
            PrinterColumn {
                name: "Protocol",
                column_type: "string",
                description: "The volume's protocol",
                priority: 1,
                json_path: ".config.protocol",
            },
            PrinterColumn {
                name: "Backend UUID",
                column_type: "string",
                description: "The volume's backend UUID",
                priority: 1,
                json_path: ".backendUUID",
            },
            PrinterColumn {
                name: "Pool",
                column_type: "string",
                description: "The volume's pool",
                priority: 1,
                json_path: ".pool",
            },
        ],
    },
    CrdDefinition {
        plural: "tridentnodes",
        singular: "tridentnode",
        kind: "TridentNode",
        short_names: &["tnode"],
        categories: &["trident", "trident-internal"],
        columns: &[],
    },
    CrdDefinition {
        plural: "tridenttransactions",
        singular: "tridenttransaction",
        kind: "TridentTransaction",
        short_names: &["ttx", "ttransaction"],
        categories: &["trident-internal"],
        columns: &[],
    },
    CrdDefinition {
        plural: "tridentsnapshots",
        singular: "tridentsnapshot",
        kind: "TridentSnapshot",
        short_names: &["tss", "tsnap", "tsnapshot"],
        categories: &["trident", "trident-internal"],
        columns: &[PrinterColumn {
            name: "State",
            column_type: "string",
            description: "The snapshot's state",
            priority: 1,
            json_path: ".state",
        }],
    },
];

const CRD_V1BETA1_TEMPLATE: &str = r#"apiVersion: {API_VERSION}
kind: CustomResourceDefinition
metadata:
  name: {CRD_NAME}
spec:
  group: {GROUP}
  versions:
    - name: v1
      served: true
      storage: true
  scope: Namespaced
  names:
    plural: {PLURAL}
    singular: {SINGULAR}
    kind: {KIND}
    {NAMES}
  {PRINTER_COLUMNS}
"#;

const CRD_V1_TEMPLATE: &str = r#"apiVersion: {API_VERSION}
kind: CustomResourceDefinition
metadata:
  name: {CRD_NAME}
spec:
  group: {GROUP}
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          x-kubernetes-preserve-unknown-fields: true
      {PRINTER_COLUMNS}
  scope: Namespaced
  names:
    plural: {PLURAL}
    singular: {SINGULAR}
    kind: {KIND}
    {NAMES}
"#;

pub(crate) const CSI_DRIVER_CRD_YAML: &str = r#"apiVersion: apiextensions.k8s.io/v1beta1
kind: CustomResourceDefinition
metadata:
  name: csidrivers.csi.storage.k8s.io
  labels:
    addonmanager.kubernetes.io/mode: Reconcile
spec:
  group: csi.storage.k8s.io
  names:
    kind: CSIDriver
    plural: csidrivers
  scope: Cluster
  validation:
    openAPIV3Schema:
      properties:
        spec:
          description: Specification of the CSI Driver.
          properties:
            attachRequired:
              description: Indicates this CSI volume driver requires an attach operation,
                and that Kubernetes should call attach and wait for any attach operation
                to complete before proceeding to mount.
              type: boolean
            podInfoOnMountVersion:
              description: Indicates this CSI volume driver requires additional pod
                information (like podName, podUID, etc.) during mount operations.
              type: string
  version: v1alpha1
"#;

pub(crate) const CSI_NODE_INFO_CRD_YAML: &str = r#"apiVersion: apiextensions.k8s.io/v1beta1
kind: CustomResourceDefinition
metadata:
  name: csinodeinfos.csi.storage.k8s.io
  labels:
    addonmanager.kubernetes.io/mode: Reconcile
spec:
  group: csi.storage.k8s.io
  names:
    kind: CSINodeInfo
    plural: csinodeinfos
  scope: Cluster
  validation:
    openAPIV3Schema:
      properties:
        spec:
          description: Specification of CSINodeInfo
          properties:
            drivers:
              description: List of CSI drivers running on the node and their specs.
              type: array
              items:
                properties:
                  name:
                    description: The CSI driver that this object refers to.
                    type: string
                  nodeID:
                    description: The node from the driver point of view.
                    type: string
                  topologyKeys:
                    description: List of keys supported by the driver.
                    items:
                      type: string
                    type: array
        status:
          description: Status of CSINodeInfo
          properties:
            drivers:
              description: List of CSI drivers running on the node and their statuses.
              type: array
              items:
                properties:
                  name:
                    description: The CSI driver that this object refers to.
                    type: string
                  available:
                    description: Whether the CSI driver is installed.
                    type: boolean
                  volumePluginMechanism:
                    description: Indicates to external components the required mechanism
                      to use for any in-tree plugins replaced by this driver.
                    pattern: in-tree|csi
                    type: string
  version: v1alpha1
"#;

fn names_block(crd: &CrdDefinition) -> Vec<String> {
    let mut block = Vec::new();
    if !crd.short_names.is_empty() {
        block.push("shortNames:".to_string());
        block.extend(crd.short_names.iter().map(|n| format!("- {}", n)));
    }
    if !crd.categories.is_empty() {
        block.push("categories:".to_string());
        block.extend(crd.categories.iter().map(|c| format!("- {}", c)));
    }
    block
}

fn printer_columns_block(columns: &[PrinterColumn], api: CrdApi) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    // v1beta1 spells the path key in upper case
    let path_key = match api {
        CrdApi::V1beta1 => "JSONPath",
        CrdApi::V1 => "jsonPath",
    };

    let mut block = vec!["additionalPrinterColumns:".to_string()];
    for column in columns {
        block.push(format!("  - name: {}", column.name));
        block.push(format!("    type: {}", column.column_type));
        block.push(format!("    description: {}", column.description));
        block.push(format!("    priority: {}", column.priority));
        block.push(format!("    {}: {}", path_key, column.json_path));
    }
    block
}

/// Render a single CRD in the requested API shape
pub fn crd_yaml(crd: &CrdDefinition, api: CrdApi) -> String {
    let template = match api {
        CrdApi::V1beta1 => CRD_V1BETA1_TEMPLATE,
        CrdApi::V1 => CRD_V1_TEMPLATE,
    };

    Template::new(template)
        .block("NAMES", &names_block(crd))
        .block("PRINTER_COLUMNS", &printer_columns_block(crd.columns, api))
        .set("API_VERSION", api.api_version())
        .set("CRD_NAME", crd.name())
        .set("GROUP", TRIDENT_GROUP)
        .set("PLURAL", crd.plural)
        .set("SINGULAR", crd.singular)
        .set("KIND", crd.kind)
        .render()
}

/// All orchestrator CRDs as one `---` separated stream
pub fn crds_yaml(api: CrdApi) -> String {
    TRIDENT_CRDS
        .iter()
        .map(|crd| crd_yaml(crd, api))
        .collect::<Vec<_>>()
        .join("---\n")
}

/// Alpha `csidrivers.csi.storage.k8s.io` CRD needed by Kubernetes 1.13
pub fn csi_driver_crd_yaml() -> String {
    CSI_DRIVER_CRD_YAML.to_string()
}

/// Alpha `csinodeinfos.csi.storage.k8s.io` CRD needed by Kubernetes 1.13
pub fn csi_node_info_crd_yaml() -> String {
    CSI_NODE_INFO_CRD_YAML.to_string()
}

/// Names of the CRDs rendered by [`crds_yaml`]
pub fn crd_names() -> Vec<String> {
    TRIDENT_CRDS.iter().map(CrdDefinition::name).collect()
}
