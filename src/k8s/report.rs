use serde::Serialize;

use super::cluster_resources::{node_name_for_pod, survey_nodes, MemorySource, NodeSummary};
use super::cluster_stats::{aggregate, count_persistent_volumes, AggregationMode, ResourceCounts, Tally};
use super::lister::ResourceLister;
use crate::contexts::GlanceResult;

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub mode: AggregationMode,
    pub memory_source: MemorySource,
    /// Pod whose node should be looked up in the bound namespace
    pub pod: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodPlacement {
    pub pod: String,
    pub namespace: String,
    pub node: String,
}

/// Everything one glance run learned about the cluster.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    pub resources: ResourceCounts,
    pub degraded: Vec<&'static str>,
    pub persistent_volumes: Tally,
    pub nodes: NodeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod: Option<PodPlacement>,
}

/// Issues the whole batch of read-only queries, one after another.
pub async fn build_report<L>(
    lister: &L,
    namespace: &str,
    options: &ReportOptions,
) -> GlanceResult<ClusterReport>
where
    L: ResourceLister + ?Sized,
{
    let resources = aggregate(lister, options.mode).await?;
    let persistent_volumes = count_persistent_volumes(lister).await;
    let nodes = survey_nodes(lister, options.memory_source).await?;

    let pod = match &options.pod {
        Some(pod) => {
            let node = node_name_for_pod(lister, namespace, pod).await?;
            Some(PodPlacement {
                pod: pod.clone(),
                namespace: namespace.to_string(),
                node,
            })
        }
        None => None,
    };

    let mut degraded: Vec<_> = resources.degraded().map(|kind| kind.label()).collect();
    if persistent_volumes.degraded {
        degraded.push("persistent volumes");
    }
    if !degraded.is_empty() {
        tracing::info!("Report is partial for: {}", degraded.join(", "));
    }

    Ok(ClusterReport {
        resources,
        degraded,
        persistent_volumes,
        nodes,
        pod,
    })
}
