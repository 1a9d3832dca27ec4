use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;

use super::lister::{NamespaceScope, ResourceLister};
use super::resource_kind::ResourceKind;
use crate::contexts::{GlanceError, GlanceResult};

/// How resource kinds are listed across namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    /// One list call per kind across all namespaces
    #[default]
    ClusterWide,
    /// One list call per kind and namespace
    PerNamespace,
}

/// Outcome of one list call after the degraded-failure policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Tally {
    pub count: usize,
    pub degraded: bool,
}

/// Runs one list call, turning a failure into a degraded zero tally.
pub async fn try_count<F>(target: impl fmt::Display, scope: &NamespaceScope, call: F) -> Tally
where
    F: Future<Output = Result<usize, kube::Error>>,
{
    match call.await {
        Ok(count) => Tally {
            count,
            degraded: false,
        },
        Err(e) => {
            tracing::warn!("Failed to list {} in {}: {}", target, scope, e);
            Tally {
                count: 0,
                degraded: true,
            }
        }
    }
}

/// Cluster-wide count per resource kind. Every catalog kind is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCounts {
    counts: BTreeMap<ResourceKind, usize>,
    degraded: BTreeSet<ResourceKind>,
}

impl ResourceCounts {
    fn seeded(namespace_count: usize) -> Self {
        let counts = ResourceKind::ALL
            .into_iter()
            .map(|kind| {
                let seed = if kind == ResourceKind::Namespaces {
                    namespace_count
                } else {
                    0
                };
                (kind, seed)
            })
            .collect();

        Self {
            counts,
            degraded: BTreeSet::new(),
        }
    }

    fn record(&mut self, kind: ResourceKind, tally: Tally) {
        if tally.degraded {
            self.degraded.insert(kind);
        } else {
            *self.counts.entry(kind).or_insert(0) += tally.count;
        }
    }

    pub fn get(&self, kind: ResourceKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    #[cfg(test)]
    fn by_label(&self, label: &str) -> Option<usize> {
        ResourceKind::from_label(label).map(|kind| self.get(kind))
    }

    /// True when at least one list call for `kind` failed.
    pub fn is_degraded(&self, kind: ResourceKind) -> bool {
        self.degraded.contains(&kind)
    }

    pub fn degraded(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.degraded.iter().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl Serialize for ResourceCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (kind, count) in &self.counts {
            map.serialize_entry(kind.label(), count)?;
        }
        map.end()
    }
}

/// Counts every catalog kind across the cluster.
///
/// Only the namespace listing is fatal. Any other failed call leaves its kind
/// at the value it already had and marks it degraded.
pub async fn aggregate<L>(lister: &L, mode: AggregationMode) -> GlanceResult<ResourceCounts>
where
    L: ResourceLister + ?Sized,
{
    let namespaces = lister
        .list_namespaces()
        .await
        .map_err(GlanceError::NamespaceList)?;
    tracing::debug!("Aggregating {} namespaces in {:?} mode", namespaces.len(), mode);

    let mut counts = ResourceCounts::seeded(namespaces.len());

    match mode {
        AggregationMode::ClusterWide => {
            let scope = NamespaceScope::All;
            for kind in ResourceKind::listed() {
                let tally = try_count(kind, &scope, lister.count(kind, &scope)).await;
                counts.record(kind, tally);
            }
        }
        AggregationMode::PerNamespace => {
            for namespace in &namespaces {
                let scope = NamespaceScope::Named(namespace.clone());
                for kind in ResourceKind::listed() {
                    let tally = try_count(kind, &scope, lister.count(kind, &scope)).await;
                    counts.record(kind, tally);
                }
            }
        }
    }

    Ok(counts)
}

pub async fn count_persistent_volumes<L>(lister: &L) -> Tally
where
    L: ResourceLister + ?Sized,
{
    try_count(
        "persistent volumes",
        &NamespaceScope::All,
        lister.count_persistent_volumes(),
    )
    .await
}
