use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;

use super::error::{GlanceError, GlanceResult};

/// Cluster selection flags, mirroring the usual kubectl ones.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub cluster: Option<String>,
    pub user: Option<String>,
    pub namespace: Option<String>,
}

impl ConnectOptions {
    fn kubeconfig_options(&self) -> KubeConfigOptions {
        KubeConfigOptions {
            context: self.context.clone(),
            cluster: self.cluster.clone(),
            user: self.user.clone(),
        }
    }

    fn selects_from_kubeconfig(&self) -> bool {
        self.context.is_some() || self.cluster.is_some() || self.user.is_some()
    }
}

/// The authenticated client for one glance run and the namespace it is bound to.
#[derive(Clone)]
pub struct ClusterContext {
    pub client: Client,
    pub namespace: String,
}

impl ClusterContext {
    pub async fn connect(options: &ConnectOptions) -> GlanceResult<Self> {
        let config = load_config(options).await?;
        let namespace = config.default_namespace.clone();
        tracing::debug!("Connecting to {} (namespace {})", config.cluster_url, namespace);

        let client = Client::try_from(config)
            .map_err(|e| GlanceError::Config(format!("Failed to create client: {}", e)))?;

        Ok(Self { client, namespace })
    }
}

/// Resolves the client configuration, applying the namespace override last.
pub async fn load_config(options: &ConnectOptions) -> GlanceResult<Config> {
    let mut config = if let Some(path) = &options.kubeconfig {
        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            GlanceError::Config(format!("Failed to read kubeconfig {}: {}", path.display(), e))
        })?;
        config_from_kubeconfig(kubeconfig, options).await?
    } else if options.selects_from_kubeconfig() {
        Config::from_kubeconfig(&options.kubeconfig_options())
            .await
            .map_err(|e| GlanceError::Config(format!("Failed to load kubeconfig: {}", e)))?
    } else {
        Config::infer()
            .await
            .map_err(|e| GlanceError::Config(format!("Failed to infer configuration: {}", e)))?
    };

    if let Some(namespace) = &options.namespace {
        config.default_namespace = namespace.clone();
    }
    Ok(config)
}

async fn config_from_kubeconfig(
    kubeconfig: Kubeconfig,
    options: &ConnectOptions,
) -> GlanceResult<Config> {
    Config::from_custom_kubeconfig(kubeconfig, &options.kubeconfig_options())
        .await
        .map_err(|e| GlanceError::Config(format!("Failed to create config: {}", e)))
}
