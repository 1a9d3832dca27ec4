use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{
    ConfigMap, Endpoints, Namespace, Node, PersistentVolume, PersistentVolumeClaim, Pod, Secret,
    Service, ServiceAccount,
};
use kube::{
    api::{Api, ListParams},
    core::{NamespaceResourceScope, Resource, ResourceExt},
    Client,
};
use serde::de::DeserializeOwned;
use std::fmt;

use super::resource_kind::ResourceKind;

/// Which namespaces a single list call covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamespaceScope {
    All,
    Named(String),
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceScope::All => f.write_str("all namespaces"),
            NamespaceScope::Named(ns) => write!(f, "namespace {}", ns),
        }
    }
}

/// Read-only view of the cluster used by the aggregator and the node surveyor.
#[async_trait]
pub trait ResourceLister: Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>, kube::Error>;

    async fn count(&self, kind: ResourceKind, scope: &NamespaceScope) -> Result<usize, kube::Error>;

    async fn count_persistent_volumes(&self) -> Result<usize, kube::Error>;

    async fn list_nodes(&self) -> Result<Vec<Node>, kube::Error>;

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, kube::Error>;
}

/// `ResourceLister` backed by the API server.
#[derive(Clone)]
pub struct KubeLister {
    client: Client,
}

impl KubeLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn count_namespaced<K>(&self, scope: &NamespaceScope) -> Result<usize, kube::Error>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + fmt::Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Named(ns) => Api::namespaced(self.client.clone(), ns),
        };
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.len())
    }
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list_namespaces(&self) -> Result<Vec<String>, kube::Error> {
        tracing::debug!("Listing namespaces");
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn count(&self, kind: ResourceKind, scope: &NamespaceScope) -> Result<usize, kube::Error> {
        tracing::debug!("Listing {} in {}", kind, scope);
        match kind {
            ResourceKind::Namespaces => self.list_namespaces().await.map(|names| names.len()),
            ResourceKind::Pods => self.count_namespaced::<Pod>(scope).await,
            ResourceKind::Services => self.count_namespaced::<Service>(scope).await,
            ResourceKind::ConfigMaps => self.count_namespaced::<ConfigMap>(scope).await,
            ResourceKind::PersistentVolumeClaims => {
                self.count_namespaced::<PersistentVolumeClaim>(scope).await
            }
            ResourceKind::ServiceAccounts => self.count_namespaced::<ServiceAccount>(scope).await,
            ResourceKind::Secrets => self.count_namespaced::<Secret>(scope).await,
            ResourceKind::Endpoints => self.count_namespaced::<Endpoints>(scope).await,
            ResourceKind::DaemonSets => self.count_namespaced::<DaemonSet>(scope).await,
            ResourceKind::Deployments => self.count_namespaced::<Deployment>(scope).await,
            ResourceKind::ReplicaSets => self.count_namespaced::<ReplicaSet>(scope).await,
            ResourceKind::StatefulSets => self.count_namespaced::<StatefulSet>(scope).await,
            ResourceKind::Jobs => self.count_namespaced::<Job>(scope).await,
        }
    }

    async fn count_persistent_volumes(&self) -> Result<usize, kube::Error> {
        tracing::debug!("Listing persistent volumes");
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.len())
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, kube::Error> {
        tracing::debug!("Listing nodes");
        let api: Api<Node> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, kube::Error> {
        tracing::debug!("Getting pod {} in namespace {}", name, namespace);
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        api.get(name).await
    }
}
