use std::fmt;

/// The countable resource kinds reported by glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Namespaces,
    Pods,
    Services,
    ConfigMaps,
    PersistentVolumeClaims,
    ServiceAccounts,
    Secrets,
    Endpoints,
    DaemonSets,
    Deployments,
    ReplicaSets,
    StatefulSets,
    Jobs,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 13] = [
        ResourceKind::Namespaces,
        ResourceKind::Pods,
        ResourceKind::Services,
        ResourceKind::ConfigMaps,
        ResourceKind::PersistentVolumeClaims,
        ResourceKind::ServiceAccounts,
        ResourceKind::Secrets,
        ResourceKind::Endpoints,
        ResourceKind::DaemonSets,
        ResourceKind::Deployments,
        ResourceKind::ReplicaSets,
        ResourceKind::StatefulSets,
        ResourceKind::Jobs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Namespaces => "namespaces",
            ResourceKind::Pods => "pods",
            ResourceKind::Services => "services",
            ResourceKind::ConfigMaps => "config maps",
            ResourceKind::PersistentVolumeClaims => "persistent volume claims",
            ResourceKind::ServiceAccounts => "service accounts",
            ResourceKind::Secrets => "secrets",
            ResourceKind::Endpoints => "endpoints",
            ResourceKind::DaemonSets => "daemonsets",
            ResourceKind::Deployments => "deployments",
            ResourceKind::ReplicaSets => "replica sets",
            ResourceKind::StatefulSets => "stateful sets",
            ResourceKind::Jobs => "jobs",
        }
    }

    #[cfg(test)]
    pub(crate) fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// Kinds counted by list calls; namespaces come from the initial listing.
    pub fn listed() -> impl Iterator<Item = ResourceKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| *kind != ResourceKind::Namespaces)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
