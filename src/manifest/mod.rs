//! Manifest factory: renders Kubernetes objects as YAML text
//!
//! Every rendering function is pure and infallible. Inputs are substituted
//! into the templates verbatim, so a caller that passes a name containing a
//! newline gets back text that fails to parse. [`validate_yaml`] is how
//! callers find out.

pub mod api;
pub mod crd;
pub mod error;
pub mod installer;
pub mod rbac;
pub mod registry;
pub mod resources;
pub mod template;
pub mod workload;

use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;

pub use api::{CrdApi, Flavor, RbacApi};
pub use error::{ManifestError, Result};
pub use registry::resolve_registry;

/// Object labels. Ordered so repeated renders are byte-identical.
pub type Labels = BTreeMap<String, String>;

/// Owner reference fields (`uid`, `kind`, `name`, `apiVersion`, ...)
pub type OwnerRef = BTreeMap<String, String>;

/// Parse every document of a YAML stream, returning the number of non-empty
/// documents. A stream with none is an error.
pub fn validate_yaml(yaml: &str) -> Result<usize> {
    let mut count = 0;

    for (document, de) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
        let value = serde_yaml::Value::deserialize(de)
            .map_err(|source| ManifestError::InvalidYaml { document, source })?;
        if !value.is_null() {
            count += 1;
        }
    }

    if count == 0 {
        return Err(ManifestError::EmptyStream);
    }
    Ok(count)
}

/// Parse a Kubernetes version string such as `v1.17.3-eks-1`, `1.18.2+k3s1`
/// or `1.19`
pub fn parse_kube_version(input: &str) -> Result<Version> {
    let invalid = |reason: String| ManifestError::InvalidVersion {
        input: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    let raw = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if raw.is_empty() {
        return Err(invalid("empty version".to_string()));
    }

    let (core, suffix) = match raw.find(['-', '+']) {
        Some(idx) => raw.split_at(idx),
        None => (raw, ""),
    };

    let core = match core.split('.').count() {
        1 => format!("{}.0.0", core),
        2 => format!("{}.0", core),
        _ => core.to_string(),
    };

    Version::parse(&format!("{}{}", core, suffix)).map_err(|e| invalid(e.to_string()))
}

/// True when `version` is at least `major.minor`, ignoring patch and any
/// vendor pre-release suffix
pub fn at_least(version: &Version, major: u64, minor: u64) -> bool {
    (version.major, version.minor) >= (major, minor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_version() {
        assert_eq!(parse_kube_version("1.17.0").unwrap(), Version::new(1, 17, 0));
        assert_eq!(parse_kube_version("v1.19.4").unwrap(), Version::new(1, 19, 4));
    }

    #[test]
    fn test_parse_short_version() {
        assert_eq!(parse_kube_version("1.18").unwrap(), Version::new(1, 18, 0));
        assert_eq!(parse_kube_version("v1").unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_parse_vendor_versions() {
        let eks = parse_kube_version("v1.17.3-eks-1").unwrap();
        assert_eq!((eks.major, eks.minor, eks.patch), (1, 17, 3));
        assert!(at_least(&eks, 1, 17));

        let k3s = parse_kube_version("v1.18.2+k3s1").unwrap();
        assert_eq!((k3s.major, k3s.minor), (1, 18));
    }

    #[test]
    fn test_parse_invalid_version() {
        assert!(matches!(
            parse_kube_version(""),
            Err(ManifestError::InvalidVersion { .. })
        ));
        assert!(parse_kube_version("one.two").is_err());
    }

    #[test]
    fn test_at_least() {
        let v = Version::new(1, 16, 9);
        assert!(at_least(&v, 1, 16));
        assert!(at_least(&v, 1, 15));
        assert!(!at_least(&v, 1, 17));
    }

    #[test]
    fn test_validate_multi_document_stream() {
        let yaml = "a: 1\n---\nb: 2\n";
        assert_eq!(validate_yaml(yaml).unwrap(), 2);
    }

    #[test]
    fn test_validate_rejects_empty_stream() {
        for yaml in ["", "\n", "# comment only\n", "---\n", "~\n"] {
            assert!(
                matches!(validate_yaml(yaml), Err(ManifestError::EmptyStream)),
                "{:?} should be rejected",
                yaml
            );
        }
        assert_eq!(validate_yaml("---\na: 1\n---\n").unwrap(), 1);
    }

    #[test]
    fn test_validate_reports_failing_document() {
        let yaml = "a: 1\n---\nmetadata:\n  name: \nbroken\n  labels: {}\n";
        match validate_yaml(yaml) {
            Err(ManifestError::InvalidYaml { document, .. }) => assert_eq!(document, 1),
            other => panic!("expected invalid YAML, got {:?}", other),
        }
    }
}
