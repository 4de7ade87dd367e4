//! trident-installer CLI - render and install Trident manifests

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use trident_installer::commands::generate::{GenerateOptions, Resource};
use trident_installer::commands::install::InstallCommandOptions;
use trident_installer::commands::uninstall::UninstallOptions;
use trident_installer::commands::{RenderOverrides, parse_key_value};
use trident_installer::config::Settings;
use trident_installer::manifest::{Flavor, resolve_registry};
use trident_installer::utils::errors::{display_error_and_exit, enhance_error};
use trident_installer::utils::prereqs::Prerequisite;
use trident_installer::utils::{CommonPrereqs, DryRun, logger};
use trident_installer::{log_error, log_info};

#[derive(Parser)]
#[command(name = "trident-installer")]
#[command(author, version, about = "Render and install the Trident CSI storage orchestrator", long_about = None)]
struct Cli {
    /// Verbose output (can be used multiple times: -v, -vv, -vvv)
    /// -v: INFO, -vv: DEBUG, -vvv: TRACE
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dry-run mode: show what would be done without making changes
    #[arg(long, global = true)]
    dry_run: bool,

    /// Path to a configuration file
    #[arg(long, global = true, env = "TRIDENT_INSTALLER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Values that override the configuration file when rendering
#[derive(Args, Debug, Clone, Default)]
struct RenderArgs {
    /// Namespace to install into
    #[arg(short, long)]
    namespace: Option<String>,

    /// Cluster flavor (detected from the cluster by install/uninstall when unset)
    #[arg(long, value_enum)]
    flavor: Option<Flavor>,

    /// Kubernetes version to render for (e.g. 1.19, v1.18.3-eks-1); asks the cluster when unset
    #[arg(long)]
    kubernetes_version: Option<String>,

    /// Render the legacy (non-CSI) deployment
    #[arg(long)]
    legacy: bool,

    /// Trident image
    #[arg(long)]
    image: Option<String>,

    /// Autosupport collector image
    #[arg(long)]
    autosupport_image: Option<String>,

    /// Registry hosting the CSI sidecar images
    #[arg(long)]
    image_registry: Option<String>,

    /// Kubelet root directory on the nodes
    #[arg(long)]
    kubelet_dir: Option<String>,

    /// Log format of the Trident containers (text or json)
    #[arg(long)]
    log_format: Option<String>,

    /// Image pull secret (repeatable)
    #[arg(long = "pull-secret")]
    pull_secrets: Vec<String>,

    /// Enable debug logging in the deployed components
    #[arg(long)]
    debug: bool,

    /// Use IPv6 localhost for the controller's REST endpoint
    #[arg(long)]
    use_ipv6: bool,

    /// Enable CSI topology in the provisioner
    #[arg(long)]
    enable_topology: bool,

    /// Silence the autosupport collector
    #[arg(long)]
    silence_autosupport: bool,

    /// Secret entry KEY=VALUE (repeatable)
    #[arg(long = "secret", value_parser = parse_key_value)]
    secrets: Vec<(String, String)>,

    /// Path to kubeconfig file
    #[arg(short, long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,
}

impl From<RenderArgs> for RenderOverrides {
    fn from(args: RenderArgs) -> Self {
        Self {
            namespace: args.namespace,
            flavor: args.flavor,
            kubernetes_version: args.kubernetes_version,
            legacy: args.legacy,
            trident_image: args.image,
            autosupport_image: args.autosupport_image,
            image_registry: args.image_registry,
            kubelet_dir: args.kubelet_dir,
            log_format: args.log_format,
            image_pull_secrets: args.pull_secrets,
            debug: args.debug,
            use_ipv6: args.use_ipv6,
            topology_enabled: args.enable_topology,
            silence_autosupport: args.silence_autosupport,
            secret_data: args.secrets,
            kubeconfig: args.kubeconfig,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render one manifest kind, or the whole bundle
    Generate {
        /// Resource to render
        #[arg(value_enum)]
        resource: Resource,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Install Trident into the current cluster
    Install {
        /// Wait for the controller and node pods to roll out
        #[arg(long)]
        wait: bool,

        /// Rollout timeout used with --wait
        #[arg(long, default_value = "300s")]
        timeout: String,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Remove Trident from the current cluster
    Uninstall {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Also delete the CRDs and the namespace
        #[arg(long)]
        purge: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Print the registry the CSI sidecars are pulled from
    Registry {
        /// Registry override; empty selects the default
        #[arg(default_value = "")]
        value: String,

        /// Resolve for the pre-sig-storage sidecar line
        #[arg(long)]
        legacy: bool,
    },

    /// Check that a YAML manifest file parses
    Validate {
        /// Multi-document YAML file
        file: PathBuf,
    },

    /// Check prerequisites
    Check {
        /// Check for OpenShift tools
        #[arg(long)]
        openshift: bool,
    },

    /// Print an example configuration file
    Config,

    /// Generate shell completion scripts
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    logger::init(cli.verbose);

    let dry_run = DryRun(cli.dry_run);
    if dry_run.is_enabled() {
        log_info!("DRY RUN MODE: No changes will be made");
    }

    if let Err(e) = run(cli, dry_run) {
        display_error_and_exit(enhance_error(e));
    }
}

fn run(cli: Cli, dry_run: DryRun) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    if !settings.colors.enabled {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Generate {
            resource,
            output,
            render,
        } => trident_installer::commands::generate::generate(
            &settings,
            GenerateOptions {
                resource,
                overrides: render.into(),
                output,
            },
        ),
        Commands::Install {
            wait,
            timeout,
            render,
        } => trident_installer::commands::install::install(
            &settings,
            InstallCommandOptions {
                overrides: render.into(),
                wait,
                timeout,
            },
            dry_run,
        ),
        Commands::Uninstall { yes, purge, render } => {
            trident_installer::commands::uninstall::uninstall(
                &settings,
                UninstallOptions {
                    overrides: render.into(),
                    yes,
                    purge,
                },
                dry_run,
            )
        }
        Commands::Registry { value, legacy } => handle_registry_command(&value, legacy),
        Commands::Validate { file } => trident_installer::commands::validate::validate(&file),
        Commands::Check { openshift } => handle_check_command(openshift),
        Commands::Config => handle_config_command(),
        Commands::Completion { shell } => handle_completion_command(shell),
        Commands::Version => handle_version_command(),
    }
}

fn handle_registry_command(value: &str, legacy: bool) -> Result<()> {
    println!("{}", resolve_registry(value, !legacy));
    Ok(())
}

fn handle_check_command(openshift: bool) -> Result<()> {
    log_info!("Checking prerequisites...");

    let kubectl = CommonPrereqs::kubectl();
    let oc = CommonPrereqs::oc();

    let mut prereqs: Vec<&dyn Prerequisite> = vec![&kubectl];
    if openshift {
        prereqs.push(&oc);
    }

    let report = CommonPrereqs::check_all(&prereqs);
    for tool in &report.found {
        println!("  ✓ {}", tool);
    }
    for (tool, hint) in &report.missing {
        println!("  ✗ {} ({})", tool, hint);
    }

    if report.is_satisfied() {
        log_info!("All prerequisites satisfied");
        Ok(())
    } else {
        log_error!("{} prerequisite(s) missing", report.missing.len());
        std::process::exit(1);
    }
}

fn handle_config_command() -> Result<()> {
    print!("{}", Settings::example_config());
    Ok(())
}

fn handle_completion_command(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "trident-installer", &mut io::stdout());
    Ok(())
}

fn handle_version_command() -> Result<()> {
    println!("trident-installer {}", env!("CARGO_PKG_VERSION"));
    println!("Manifest factory and installer for the Trident CSI storage orchestrator");
    Ok(())
}
