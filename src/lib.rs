//! trident-installer: renders the Kubernetes manifests for the Trident CSI
//! storage orchestrator and installs them with kubectl

pub mod commands;
pub mod config;
pub mod install;
pub mod k8s;
pub mod manifest;
pub mod utils;
