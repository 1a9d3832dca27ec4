use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity as KubeQuantity;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};

use super::lister::ResourceLister;
use super::quantity::Quantity;
use crate::contexts::{GlanceError, GlanceResult};

/// Node status map the memory total is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MemorySource {
    #[default]
    Capacity,
    Allocatable,
}

impl MemorySource {
    fn field(self) -> &'static str {
        match self {
            MemorySource::Capacity => "memory capacity",
            MemorySource::Allocatable => "allocatable memory",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub total_nodes: usize,
    pub unschedulable_nodes: usize,
    pub allocatable_cpu: Quantity,
    pub allocatable_memory: Quantity,
}

impl NodeSummary {
    pub fn schedulable_nodes(&self) -> usize {
        self.total_nodes - self.unschedulable_nodes
    }

    fn observe(&mut self, node: &Node, memory_source: MemorySource) -> GlanceResult<()> {
        let name = node.name_any();
        let status = node.status.as_ref();

        let cpu = status
            .and_then(|s| s.allocatable.as_ref())
            .and_then(|a| a.get("cpu"));
        let memory = status
            .and_then(|s| match memory_source {
                MemorySource::Capacity => s.capacity.as_ref(),
                MemorySource::Allocatable => s.allocatable.as_ref(),
            })
            .and_then(|m| m.get("memory"));

        let cpu = read_quantity(&name, "allocatable cpu", cpu)?;
        let memory = read_quantity(&name, memory_source.field(), memory)?;
        let unschedulable = node
            .spec
            .as_ref()
            .and_then(|s| s.unschedulable)
            .unwrap_or(false);

        tracing::debug!("Node {} cpu {} memory {}", name, cpu, memory);

        self.total_nodes += 1;
        if unschedulable {
            self.unschedulable_nodes += 1;
        }
        self.allocatable_cpu += cpu;
        self.allocatable_memory += memory;
        Ok(())
    }
}

/// A node without the field contributes nothing.
fn read_quantity(
    node: &str,
    field: &'static str,
    quantity: Option<&KubeQuantity>,
) -> GlanceResult<Quantity> {
    match quantity {
        Some(q) => Quantity::try_from(q).map_err(|source| GlanceError::NodeQuantity {
            node: node.to_string(),
            field,
            source,
        }),
        None => Ok(Quantity::zero()),
    }
}

/// Summarizes every node from one cluster-wide node listing.
pub async fn survey_nodes<L>(lister: &L, memory_source: MemorySource) -> GlanceResult<NodeSummary>
where
    L: ResourceLister + ?Sized,
{
    let nodes = lister.list_nodes().await.map_err(GlanceError::NodeList)?;

    let mut summary = NodeSummary::default();
    for node in &nodes {
        summary.observe(node, memory_source)?;
    }
    Ok(summary)
}

/// Returns the node a pod in `namespace` is scheduled on.
pub async fn node_name_for_pod<L>(lister: &L, namespace: &str, pod_name: &str) -> GlanceResult<String>
where
    L: ResourceLister + ?Sized,
{
    let pod = lister
        .get_pod(namespace, pod_name)
        .await
        .map_err(|source| {
            if matches!(&source, kube::Error::Api(response) if response.code == 404) {
                GlanceError::PodNotFound {
                    pod: pod_name.to_string(),
                    namespace: namespace.to_string(),
                    source,
                }
            } else {
                GlanceError::PodLookup {
                    pod: pod_name.to_string(),
                    source,
                }
            }
        })?;

    pod.spec
        .and_then(|spec| spec.node_name)
        .filter(|node| !node.is_empty())
        .ok_or_else(|| GlanceError::PodNotScheduled(pod_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::lister::fake::{api_error, FakeLister};
    use k8s_openapi::api::core::v1::Pod;
    use serde_json::json;

    fn node(name: &str, unschedulable: bool, cpu: &str, memory: &str) -> Node {
        serde_json::from_value(json!({
            "metadata": { "name": name },
            "spec": { "unschedulable": unschedulable },
            "status": {
                "allocatable": { "cpu": cpu, "memory": "1Gi" },
                "capacity": { "cpu": cpu, "memory": memory }
            }
        }))
        .unwrap()
    }

    fn pod(name: &str, namespace: &str, node_name: Option<&str>) -> Pod {
        serde_json::from_value(json!({
            "metadata": { "name": name, "namespace": namespace },
            "spec": { "containers": [], "nodeName": node_name }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_survey_three_nodes() {
        let lister = FakeLister {
            nodes: Some(vec![
                node("node-a", false, "1", "4Gi"),
                node("node-b", true, "2", "4Gi"),
                node("node-c", false, "0.5", "8Gi"),
            ]),
            ..Default::default()
        };

        let summary = survey_nodes(&lister, MemorySource::Capacity).await.unwrap();

        assert_eq!(summary.total_nodes, 3);
        assert_eq!(summary.unschedulable_nodes, 1);
        assert_eq!(summary.schedulable_nodes(), 2);
        assert_eq!(summary.allocatable_cpu.to_string(), "3.5");
        assert_eq!(summary.allocatable_memory.to_string(), "16Gi");
    }

    #[tokio::test]
    async fn test_survey_reads_allocatable_memory_when_asked() {
        let lister = FakeLister {
            nodes: Some(vec![node("a", false, "1", "4Gi"), node("b", false, "1", "4Gi")]),
            ..Default::default()
        };

        let summary = survey_nodes(&lister, MemorySource::Allocatable)
            .await
            .unwrap();
        assert_eq!(summary.allocatable_memory.to_string(), "2Gi");
    }

    #[tokio::test]
    async fn test_survey_mixed_units() {
        let lister = FakeLister {
            nodes: Some(vec![
                node("a", false, "3800m", "16393452Ki"),
                node("b", false, "4", "16Gi"),
            ]),
            ..Default::default()
        };

        let summary = survey_nodes(&lister, MemorySource::Capacity).await.unwrap();
        assert_eq!(summary.allocatable_cpu.to_string(), "7.8");
        assert_eq!(
            summary.allocatable_memory,
            Quantity::parse("33170668Ki").unwrap()
        );
    }

    #[tokio::test]
    async fn test_survey_empty_cluster() {
        let lister = FakeLister {
            nodes: Some(Vec::new()),
            ..Default::default()
        };

        let summary = survey_nodes(&lister, MemorySource::Capacity).await.unwrap();
        assert_eq!(summary, NodeSummary::default());
        assert!(summary.allocatable_cpu.is_zero());
    }

    #[tokio::test]
    async fn test_survey_node_without_status() {
        let bare: Node = serde_json::from_value(json!({ "metadata": { "name": "bare" } })).unwrap();
        let lister = FakeLister {
            nodes: Some(vec![bare, node("full", false, "2", "2Gi")]),
            ..Default::default()
        };

        let summary = survey_nodes(&lister, MemorySource::Capacity).await.unwrap();
        assert_eq!(summary.total_nodes, 2);
        assert_eq!(summary.allocatable_cpu.to_string(), "2");
    }

    #[tokio::test]
    async fn test_node_list_failure_is_fatal() {
        let lister = FakeLister::default();
        let result = survey_nodes(&lister, MemorySource::Capacity).await;
        assert!(matches!(result, Err(GlanceError::NodeList(_))));
    }

    #[tokio::test]
    async fn test_malformed_quantity_is_fatal() {
        let lister = FakeLister {
            nodes: Some(vec![node("ok", false, "1", "1Gi"), node("odd", false, "lots", "1Gi")]),
            ..Default::default()
        };

        let err = survey_nodes(&lister, MemorySource::Capacity)
            .await
            .unwrap_err();
        assert!(matches!(err, GlanceError::NodeQuantity { ref node, .. } if node == "odd"));
        assert!(err.to_string().contains("lots"));
    }

    #[tokio::test]
    async fn test_node_name_for_pod() {
        let lister = FakeLister {
            pods: vec![pod("web-0", "shop", Some("worker-2"))],
            ..Default::default()
        };

        let node = node_name_for_pod(&lister, "shop", "web-0").await.unwrap();
        assert_eq!(node, "worker-2");
    }

    #[tokio::test]
    async fn test_node_name_for_missing_pod() {
        let lister = FakeLister {
            pods: vec![pod("web-0", "shop", Some("worker-2"))],
            ..Default::default()
        };

        let err = node_name_for_pod(&lister, "default", "web-0")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("web-0"));
    }

    #[tokio::test]
    async fn test_node_name_for_unscheduled_pod() {
        let lister = FakeLister {
            pods: vec![pod("pending", "default", None)],
            ..Default::default()
        };

        let err = node_name_for_pod(&lister, "default", "pending")
            .await
            .unwrap_err();
        assert!(matches!(err, GlanceError::PodNotScheduled(ref name) if name == "pending"));
    }

    #[test]
    fn test_pod_lookup_error_keeps_pod_name() {
        let err = GlanceError::PodLookup {
            pod: "api-7f9".to_string(),
            source: api_error(500, "InternalError"),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("api-7f9"));
    }
}
