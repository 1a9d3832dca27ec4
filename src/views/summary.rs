use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::k8s::ClusterReport;
use crate::utils::settings::OutputFormat;

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "RESOURCE")]
    resource: String,
    #[tabled(rename = "COUNT")]
    count: String,
    #[tabled(rename = "DETAILS")]
    details: String,
}

#[derive(Clone, Copy)]
enum Tone {
    Good,
    Bad,
}

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, value: impl ToString, tone: Tone) -> String {
        let text = value.to_string();
        if !self.color {
            return text;
        }
        match tone {
            Tone::Good => text.green().to_string(),
            Tone::Bad => text.red().bold().to_string(),
        }
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn partial(degraded: bool) -> String {
    if degraded {
        "partial: some list calls failed".to_string()
    } else {
        String::new()
    }
}

fn tone(degraded: bool) -> Tone {
    if degraded {
        Tone::Bad
    } else {
        Tone::Good
    }
}

/// Renders the report as an aligned table, one row per resource kind.
pub fn render_table(report: &ClusterReport, color: bool) -> String {
    let painter = Painter { color };
    let mut rows: Vec<SummaryRow> = report
        .resources
        .iter()
        .map(|(kind, count)| {
            let degraded = report.resources.is_degraded(kind);
            SummaryRow {
                resource: capitalize(kind.label()),
                count: painter.paint(count, tone(degraded)),
                details: partial(degraded),
            }
        })
        .collect();

    let pv = report.persistent_volumes;
    rows.push(SummaryRow {
        resource: "Persistent volumes".to_string(),
        count: painter.paint(pv.count, tone(pv.degraded)),
        details: partial(pv.degraded),
    });

    let nodes = &report.nodes;
    rows.push(SummaryRow {
        resource: "Nodes".to_string(),
        count: painter.paint(nodes.total_nodes, Tone::Good),
        details: format!(
            "{} schedulable, {} unschedulable, {} cpu allocatable, {} memory",
            nodes.schedulable_nodes(),
            painter.paint(nodes.unschedulable_nodes, Tone::Bad),
            nodes.allocatable_cpu,
            nodes.allocatable_memory,
        ),
    });

    if let Some(placement) = &report.pod {
        rows.push(SummaryRow {
            resource: format!("Pod {}", placement.pod),
            count: "-".to_string(),
            details: format!(
                "scheduled on node {} (namespace {})",
                painter.paint(&placement.node, Tone::Good),
                placement.namespace
            ),
        });
    }

    Table::new(rows).with(Style::blank()).to_string()
}

pub fn render_json(report: &ClusterReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Print the report to stdout in the requested format
pub fn print_report(report: &ClusterReport, format: OutputFormat, color: bool) -> serde_json::Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_table(report, color)),
        OutputFormat::Json => println!("{}", render_json(report)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::lister::fake::FakeLister;
    use crate::k8s::{build_report, NamespaceScope, ReportOptions, ResourceKind};
    use serde_json::json;

    async fn sample_report() -> ClusterReport {
        let mut lister = FakeLister::with_namespaces(&["default", "kube-system"]);
        lister.set(ResourceKind::Pods, NamespaceScope::All, 12);
        lister.set(ResourceKind::Services, NamespaceScope::All, 3);
        lister.nodes = Some(vec![serde_json::from_value(json!({
            "metadata": { "name": "n1" },
            "spec": { "unschedulable": true },
            "status": {
                "allocatable": { "cpu": "1500m" },
                "capacity": { "memory": "4Gi" }
            }
        }))
        .unwrap()]);
        build_report(&lister, "default", &ReportOptions::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("config maps"), "Config maps");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_table_has_every_row() {
        let report = sample_report().await;
        let table = render_table(&report, false);

        for kind in ResourceKind::ALL {
            assert!(table.contains(&capitalize(kind.label())), "missing {}", kind);
        }
        assert!(table.contains("Persistent volumes"));
        assert!(table.contains("0 schedulable, 1 unschedulable, 1.5 cpu allocatable, 4Gi memory"));
        assert!(table.contains("RESOURCE"));
        assert!(!table.contains('\u{1b}'));
    }

    #[tokio::test]
    async fn test_table_marks_partial_rows() {
        let report = sample_report().await;
        let table = render_table(&report, false);

        let secrets = table.lines().find(|l| l.contains("Secrets")).unwrap();
        assert!(secrets.contains("partial"));
        let pods = table.lines().find(|l| l.contains("Pods")).unwrap();
        assert!(pods.contains("12"));
        assert!(!pods.contains("partial"));
    }

    #[tokio::test]
    async fn test_colored_table_keeps_rows() {
        colored::control::set_override(true);
        let report = sample_report().await;
        let table = render_table(&report, true);
        assert!(table.contains("Nodes"));
        assert!(table.contains('\u{1b}'));
    }

    #[tokio::test]
    async fn test_json_output() {
        let report = sample_report().await;
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["resources"]["pods"], 12);
        assert_eq!(value["nodes"]["unschedulable_nodes"], 1);
        assert_eq!(value["nodes"]["allocatable_cpu"], "1.5");
        assert_eq!(value["persistent_volumes"]["degraded"], true);
    }
}
