//! Installer settings and the sidecar image table

pub mod images;
pub mod settings;

pub use settings::Settings;
