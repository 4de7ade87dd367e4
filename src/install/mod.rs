//! Building, applying and removing an installation

pub mod apply;
pub mod bundle;

pub use bundle::{BundleEntry, InstallBundle, InstallOptions};
