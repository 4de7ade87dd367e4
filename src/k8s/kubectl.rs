//! Kubectl wrapper utilities

use anyhow::{Context, Result, anyhow};
use semver::Version;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::manifest::{Flavor, parse_kube_version};

fn kubectl(kubeconfig: Option<&Path>) -> Command {
    let mut cmd = Command::new("kubectl");

    if let Some(kc) = kubeconfig {
        cmd.env("KUBECONFIG", kc);
    }

    cmd
}

/// Run a kubectl command with optional kubeconfig
pub fn run_kubectl(args: &[&str], kubeconfig: Option<&Path>) -> Result<()> {
    tracing::debug!("kubectl {}", args.join(" "));

    let status = kubectl(kubeconfig)
        .args(args)
        .status()
        .context("Failed to run kubectl command")?;

    if !status.success() {
        return Err(anyhow!("kubectl command failed: {}", args.join(" ")));
    }

    Ok(())
}

/// Run kubectl and capture output
pub fn run_kubectl_output(args: &[&str], kubeconfig: Option<&Path>) -> Result<String> {
    tracing::debug!("kubectl {}", args.join(" "));

    let output = kubectl(kubeconfig)
        .args(args)
        .output()
        .context("Failed to run kubectl command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "kubectl command failed: {}\n{}",
            args.join(" "),
            stderr
        ));
    }

    Ok(String::from_utf8(output.stdout)?)
}

/// Feed `yaml` to `kubectl <args> -f -`
fn pipe_yaml(args: &[&str], yaml: &str, kubeconfig: Option<&Path>) -> Result<()> {
    let verb = args.join(" ");
    tracing::debug!("kubectl {} -f - ({} bytes)", verb, yaml.len());

    let mut child = kubectl(kubeconfig)
        .args(args)
        .args(["-f", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("Failed to spawn kubectl {}", verb))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(yaml.as_bytes())
            .context("Failed to write YAML to kubectl")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for kubectl {}", verb))?;

    if !status.success() {
        return Err(anyhow!("kubectl {} failed", verb));
    }

    Ok(())
}

/// Apply a YAML manifest from string
pub fn apply_yaml(yaml: &str, kubeconfig: Option<&Path>) -> Result<()> {
    pipe_yaml(&["apply"], yaml, kubeconfig)
}

/// Delete the objects of a YAML manifest, ignoring ones already gone
pub fn delete_yaml(yaml: &str, kubeconfig: Option<&Path>) -> Result<()> {
    pipe_yaml(&["delete", "--ignore-not-found"], yaml, kubeconfig)
}

/// Wait for a deployment or daemonset rollout to finish
pub fn wait_for_rollout(
    resource: &str,
    namespace: &str,
    timeout: &str,
    kubeconfig: Option<&Path>,
) -> Result<()> {
    let timeout = format!("--timeout={}", timeout);
    run_kubectl(
        &["rollout", "status", resource, "-n", namespace, &timeout],
        kubeconfig,
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo {
    git_version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionOutput {
    server_version: Option<VersionInfo>,
}

/// Extract the server version from `kubectl version -o json` output
pub fn parse_server_version(json: &str) -> Result<Version> {
    let output: VersionOutput =
        serde_json::from_str(json).context("Failed to parse kubectl version output")?;

    let server = output
        .server_version
        .ok_or_else(|| anyhow!("kubectl did not report a server version"))?;

    Ok(parse_kube_version(&server.git_version)?)
}

/// Kubernetes version of the current cluster
pub fn server_version(kubeconfig: Option<&Path>) -> Result<Version> {
    let json = run_kubectl_output(&["version", "-o", "json"], kubeconfig)?;
    parse_server_version(&json)
}

/// True when the `api-versions` listing includes the OpenShift security group
pub fn is_openshift(api_versions: &str) -> bool {
    api_versions
        .lines()
        .any(|line| line.trim().starts_with("security.openshift.io/"))
}

/// Flavor of the current cluster
pub fn detect_flavor(kubeconfig: Option<&Path>) -> Result<Flavor> {
    let api_versions = run_kubectl_output(&["api-versions"], kubeconfig)?;

    Ok(if is_openshift(&api_versions) {
        Flavor::OpenShift
    } else {
        Flavor::K8s
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_version() {
        let json = r#"{
  "clientVersion": {"major": "1", "minor": "19", "gitVersion": "v1.19.3"},
  "serverVersion": {"major": "1", "minor": "18+", "gitVersion": "v1.18.9-eks-d1db3c", "platform": "linux/amd64"}
}"#;
        let version = parse_server_version(json).unwrap();
        assert_eq!((version.major, version.minor, version.patch), (1, 18, 9));
    }

    #[test]
    fn test_parse_server_version_missing_server() {
        let json = r#"{"clientVersion": {"gitVersion": "v1.19.3"}}"#;
        let err = parse_server_version(json).unwrap_err();
        assert!(err.to_string().contains("server version"));
    }

    #[test]
    fn test_parse_server_version_bad_json() {
        assert!(parse_server_version("Client Version: v1.19.3").is_err());
    }

    #[test]
    fn test_is_openshift() {
        let openshift = "apps/v1\nroute.openshift.io/v1\nsecurity.openshift.io/v1\nv1\n";
        assert!(is_openshift(openshift));

        let k8s = "apps/v1\nrbac.authorization.k8s.io/v1\nstorage.k8s.io/v1\nv1\n";
        assert!(!is_openshift(k8s));
    }
}
