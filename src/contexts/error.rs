use thiserror::Error;

use crate::k8s::QuantityError;

/// Errors that stop a glance report from being produced.
///
/// Failures of individual resource listings never show up here; the
/// aggregator absorbs them and marks the affected counts as partial.
#[derive(Debug, Error)]
pub enum GlanceError {
    /// The kubeconfig or in-cluster configuration could not produce a client
    #[error("Invalid cluster configuration: {0}")]
    Config(String),

    /// The glance settings file could not be read or parsed
    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Got an error while listing namespaces: {0}")]
    NamespaceList(#[source] kube::Error),

    #[error("Got an error while listing nodes: {0}")]
    NodeList(#[source] kube::Error),

    /// A node reported a quantity outside the Kubernetes grammar
    #[error("Node {node} reported an unreadable {field}: {source}")]
    NodeQuantity {
        node: String,
        field: &'static str,
        #[source]
        source: QuantityError,
    },

    #[error("Pod {pod} not found in namespace {namespace}: {source}")]
    PodNotFound {
        pod: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Got an error while retrieving pod {pod}: {source}")]
    PodLookup {
        pod: String,
        #[source]
        source: kube::Error,
    },

    #[error("Pod {0} is not scheduled on any node yet")]
    PodNotScheduled(String),
}

impl GlanceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GlanceError::PodNotFound { .. })
    }
}

/// Result type for glance operations
pub type GlanceResult<T> = Result<T, GlanceError>;
