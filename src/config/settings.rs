//! Configuration file support for trident-installer

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::manifest::Flavor;

pub const LOCAL_CONFIG_FILE: &str = ".trident-installer.toml";

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub images: Images,

    #[serde(default)]
    pub autosupport: Autosupport,

    #[serde(default)]
    pub features: Features,

    #[serde(default)]
    pub colors: Colors,

    #[serde(default)]
    pub behavior: Behavior,
}

/// Default values for rendering and installing
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Defaults {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub flavor: Flavor,

    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_kubelet_dir")]
    pub kubelet_dir: String,

    /// Sidecar registry override. Empty picks the registry for the cluster version.
    #[serde(default)]
    pub image_registry: String,

    /// Render for this version instead of asking the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,

    /// Deploy the CSI controller and node plugin rather than the legacy deployment
    #[serde(default = "default_true")]
    pub csi: bool,
}

/// Container images
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Images {
    #[serde(default = "default_trident_image")]
    pub trident: String,

    #[serde(default = "default_autosupport_image")]
    pub autosupport: String,

    #[serde(default)]
    pub pull_secrets: Vec<String>,
}

/// Autosupport sidecar settings
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Autosupport {
    #[serde(default)]
    pub proxy_url: String,

    #[serde(default)]
    pub custom_url: String,

    #[serde(default)]
    pub serial_number: String,

    #[serde(default)]
    pub hostname: String,

    #[serde(default)]
    pub silence: bool,
}

/// Optional behaviour of the deployed components
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Features {
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub use_ipv6: bool,

    #[serde(default)]
    pub topology_enabled: bool,
}

/// Color and theme settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Colors {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Behavior settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Behavior {
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,

    #[serde(default = "default_true")]
    pub show_progress: bool,
}

// Default value functions
fn default_namespace() -> String {
    "trident".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_kubelet_dir() -> String {
    crate::manifest::workload::DEFAULT_KUBELET_DIR.to_string()
}

fn default_trident_image() -> String {
    "netapp/trident:20.10.0".to_string()
}

fn default_autosupport_image() -> String {
    "netapp/trident-autosupport:20.10.0".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            flavor: Flavor::default(),
            log_format: default_log_format(),
            kubelet_dir: default_kubelet_dir(),
            image_registry: String::new(),
            kubernetes_version: None,
            csi: default_true(),
        }
    }
}

impl Default for Images {
    fn default() -> Self {
        Self {
            trident: default_trident_image(),
            autosupport: default_autosupport_image(),
            pull_secrets: Vec::new(),
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            confirm_destructive: default_true(),
            show_progress: default_true(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the first config file found in the
    /// standard locations, or return defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        match Self::find_config_file() {
            Some(found) => match Self::load_from_file(&found) {
                Ok(settings) => Ok(settings),
                Err(e) => {
                    crate::log_warn!("Ignoring config file: {:#}", e);
                    Ok(Self::default())
                }
            },
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .trident-installer.toml in current directory
    /// 2. ~/.config/trident-installer/config.toml (XDG config directory)
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("trident-installer").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example config file content
    pub fn example_config() -> String {
        let header = "# trident-installer configuration file\n\
                      # Place this file at ~/.config/trident-installer/config.toml or .trident-installer.toml in your project\n\n";

        match toml::to_string_pretty(&Settings::default()) {
            Ok(config) => format!("{}{}", header, config),
            Err(_) => format!("{}{}", header, FALLBACK_EXAMPLE),
        }
    }
}

const FALLBACK_EXAMPLE: &str = r#"[defaults]
namespace = "trident"
flavor = "k8s"
log_format = "text"
kubelet_dir = "/var/lib/kubelet"
image_registry = ""
# kubernetes_version = "1.19"  # Optional: skip asking the cluster
csi = true

[images]
trident = "netapp/trident:20.10.0"
autosupport = "netapp/trident-autosupport:20.10.0"
pull_secrets = []

[autosupport]
proxy_url = ""
custom_url = ""
serial_number = ""
hostname = ""
silence = false

[features]
debug = false
use_ipv6 = false
topology_enabled = false

[colors]
enabled = true

[behavior]
confirm_destructive = true
show_progress = true
"#;
