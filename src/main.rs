use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kube_glance::contexts::{ClusterContext, ConnectOptions};
use kube_glance::k8s::{build_report, AggregationMode, KubeLister, MemorySource, ReportOptions};
use kube_glance::utils::config;
use kube_glance::utils::settings::{OutputFormat, Settings};
use kube_glance::views;

/// Summarize a Kubernetes cluster at a glance
#[derive(Parser)]
#[command(name = "kubectl-glance", author, version, about, long_about = None)]
struct Cli {
    /// Path to the kubeconfig file to use
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// The name of the kubeconfig context to use
    #[arg(long)]
    context: Option<String>,

    /// The name of the kubeconfig cluster to use
    #[arg(long)]
    cluster: Option<String>,

    /// The name of the kubeconfig user to use
    #[arg(long)]
    user: Option<String>,

    /// Namespace the client is bound to (used for --pod)
    #[arg(short, long)]
    namespace: Option<String>,

    /// How resource kinds are listed
    #[arg(long, value_enum)]
    mode: Option<AggregationMode>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Node status map the memory total is read from
    #[arg(long, value_enum)]
    memory_source: Option<MemorySource>,

    /// Look up the node a pod in the bound namespace runs on
    #[arg(long)]
    pod: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Settings file (defaults to <config dir>/kube-glance/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
            cluster: self.cluster.clone(),
            user: self.user.clone(),
            namespace: self.namespace.clone(),
        }
    }

    /// Command-line flags win over the settings file
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(output) = self.output {
            settings.output = output;
        }
        if let Some(memory_source) = self.memory_source {
            settings.memory_source = memory_source;
        }
        if self.no_color {
            settings.color = false;
        }
        settings
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => config::DEFAULT_LOG_FILTER,
            1 => "warn,kube_glance=info",
            _ => "info,kube_glance=debug",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = cli.apply(Settings::load(cli.config.as_deref())?);
    if !settings.color {
        colored::control::set_override(false);
    }

    let cluster = ClusterContext::connect(&cli.connect_options())
        .await
        .context("Failed to initialize the cluster client")?;
    let lister = KubeLister::new(cluster.client.clone());

    let options = ReportOptions {
        mode: settings.mode,
        memory_source: settings.memory_source,
        pod: cli.pod.clone(),
    };
    let report = build_report(&lister, &cluster.namespace, &options)
        .await
        .context("Failed to build the cluster report")?;

    views::print_report(&report, settings.output, settings.color)?;
    Ok(())
}
