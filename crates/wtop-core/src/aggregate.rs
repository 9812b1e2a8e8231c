use crate::metric::{MetricName, MetricSet, Metered, Reduction};
use crate::table::StatsTable;
use std::collections::HashMap;
use std::fmt;

pub const UNKNOWN: &str = "unknown";

/// Grouping semantics of the main table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMode {
    /// One row per physical client host.
    #[default]
    Client,
    /// One row per (host, role) pair of backend processes.
    Backend,
}

impl GroupMode {
    pub fn label(self) -> &'static str {
        match self {
            GroupMode::Client => "Client",
            GroupMode::Backend => "Backend",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            GroupMode::Client => GroupMode::Backend,
            GroupMode::Backend => GroupMode::Client,
        }
    }
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One raw observation for one process.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub host: String,
    pub role: Option<String>,
    pub metrics: MetricSet,
}

/// One aggregated row per host group.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSummary {
    pub group_key: String,
    pub base_host: String,
    pub role: Option<String>,
    pub metrics: MetricSet,
}

impl Metered for MetricRow {
    fn metrics(&self) -> &MetricSet {
        &self.metrics
    }
}

impl Metered for HostSummary {
    fn metrics(&self) -> &MetricSet {
        &self.metrics
    }
}

impl MetricRow {
    pub fn group_key(&self, mode: GroupMode) -> String {
        match (mode, &self.role) {
            (GroupMode::Backend, Some(role)) => group_key(&self.host, role),
            (GroupMode::Backend, None) => group_key(&self.host, UNKNOWN),
            (GroupMode::Client, _) => self.host.clone(),
        }
    }
}

pub fn group_key(host: &str, role: &str) -> String {
    format!("{host}-{role}")
}

/// Splits a backend group key at its last `-` into base host and role.
pub fn split_group_key(key: &str) -> Option<(&str, &str)> {
    let (host, role) = key.rsplit_once('-')?;
    if host.is_empty() || role.is_empty() {
        return None;
    }
    Some((host, role))
}

/// Reads host-level rows from a stats payload.
pub fn parse_metric_rows(table: &StatsTable, mode: GroupMode) -> Vec<MetricRow> {
    table
        .records()
        .map(|record| {
            let host = record
                .get("Hostname")
                .filter(|value| !value.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string();
            let role = match mode {
                GroupMode::Client => None,
                GroupMode::Backend => Some(
                    record
                        .first_of(&["Roles", "role"])
                        .unwrap_or(UNKNOWN)
                        .to_string(),
                ),
            };
            MetricRow {
                host,
                role,
                metrics: record.metrics(),
            }
        })
        .collect()
}

/// Groups rows by `key_fn` and reduces each group to one summary, keeping
/// groups in order of first appearance.
pub fn aggregate<F>(rows: &[MetricRow], key_fn: F) -> Vec<HostSummary>
where
    F: Fn(&MetricRow) -> String,
{
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&MetricRow>> = HashMap::new();
    for row in rows {
        let key = key_fn(row);
        let members = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        members.push(row);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let members = groups.remove(&key)?;
            let first = members.first()?;
            Some(HostSummary {
                base_host: first.host.clone(),
                role: first.role.clone(),
                metrics: reduce(&members, MetricName::group_reduction),
                group_key: key,
            })
        })
        .collect()
}

/// Aggregates by the grouping key the mode implies.
pub fn aggregate_by_mode(rows: &[MetricRow], mode: GroupMode) -> Vec<HostSummary> {
    aggregate(rows, |row| row.group_key(mode))
}

/// The drill-down totals row: CPU is the max, latencies the mean, the rest summed.
pub fn totals<T: Metered>(rows: &[T]) -> Option<MetricSet> {
    if rows.is_empty() {
        return None;
    }
    let members: Vec<&T> = rows.iter().collect();
    Some(reduce(&members, MetricName::totals_reduction))
}

fn reduce<T: Metered>(members: &[&T], policy: fn(MetricName) -> Reduction) -> MetricSet {
    let mut out = MetricSet::new();
    if members.is_empty() {
        return out;
    }
    let count = members.len() as f64;
    for metric in MetricName::ALL {
        let values = members.iter().map(|row| row.metric(metric));
        let value = match policy(metric) {
            Reduction::Sum => values.sum(),
            Reduction::Mean => {
                let sum: f64 = values.sum();
                if sum != 0.0 {
                    sum / count
                } else {
                    sum
                }
            }
            Reduction::Max => values.fold(f64::NEG_INFINITY, f64::max),
        };
        out.set(metric, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(host: &str, role: Option<&str>, values: &[(MetricName, f64)]) -> MetricRow {
        let mut metrics = MetricSet::new();
        for (metric, value) in values {
            metrics.set(*metric, *value);
        }
        MetricRow {
            host: host.to_string(),
            role: role.map(str::to_string),
            metrics,
        }
    }

    #[test]
    fn sums_throughput_and_averages_cpu() {
        let rows = vec![
            row("A", None, &[(MetricName::Ops, 100.0), (MetricName::Cpu, 20.0)]),
            row("A", None, &[(MetricName::Ops, 300.0), (MetricName::Cpu, 40.0)]),
            row("B", None, &[(MetricName::Ops, 7.0)]),
        ];
        let summaries = aggregate_by_mode(&rows, GroupMode::Client);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].group_key, "A");
        assert_eq!(summaries[0].metrics[MetricName::Ops], 400.0);
        assert_eq!(summaries[0].metrics[MetricName::Cpu], 30.0);
        assert_eq!(summaries[1].metrics[MetricName::Ops], 7.0);
        assert_eq!(summaries[1].metrics[MetricName::RdmaSent], 0.0);
    }

    #[test]
    fn mean_divides_by_every_row_in_group() {
        let rows = vec![
            row("A", None, &[(MetricName::ReadLatency, 90.0)]),
            row("A", None, &[]),
            row("A", None, &[]),
        ];
        let summaries = aggregate_by_mode(&rows, GroupMode::Client);
        assert_eq!(summaries[0].metrics[MetricName::ReadLatency], 30.0);
    }

    #[test]
    fn backend_groups_by_host_and_role() {
        let rows = vec![
            row("hostX", Some("DRIVES"), &[(MetricName::Reads, 1.0)]),
            row("hostX", Some("COMPUTE"), &[(MetricName::Reads, 2.0)]),
            row("hostX", Some("DRIVES"), &[(MetricName::Reads, 3.0)]),
        ];
        let summaries = aggregate_by_mode(&rows, GroupMode::Backend);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].group_key, "hostX-DRIVES");
        assert_eq!(summaries[0].base_host, "hostX");
        assert_eq!(summaries[0].role.as_deref(), Some("DRIVES"));
        assert_eq!(summaries[0].metrics[MetricName::Reads], 4.0);
    }

    #[test]
    fn totals_use_max_cpu() {
        let rows = vec![
            row("A", None, &[(MetricName::Cpu, 20.0), (MetricName::WriteLatency, 10.0)]),
            row("A", None, &[(MetricName::Cpu, 70.0), (MetricName::WriteLatency, 30.0)]),
            row("A", None, &[(MetricName::Cpu, 40.0), (MetricName::WriteLatency, 20.0)]),
        ];
        let totals = totals(&rows).expect("totals");
        assert_eq!(totals[MetricName::Cpu], 70.0);
        assert_eq!(totals[MetricName::WriteLatency], 20.0);
        assert!(super::totals::<MetricRow>(&[]).is_none());
    }

    #[test]
    fn split_group_key_uses_last_dash() {
        assert_eq!(
            split_group_key("hcsf1-01.entstorage-DRIVES"),
            Some(("hcsf1-01.entstorage", "DRIVES"))
        );
        assert_eq!(split_group_key("plain"), None);
    }

    #[test]
    fn parses_backend_roles_from_either_column() {
        let table = StatsTable::parse("Hostname,Roles,Ops/s\nh1,FRONTEND,5\n,,\n");
        let rows = parse_metric_rows(&table, GroupMode::Backend);
        assert_eq!(rows[0].role.as_deref(), Some("FRONTEND"));
        assert_eq!(rows[1].host, UNKNOWN);
        assert_eq!(rows[1].role.as_deref(), Some(UNKNOWN));

        let table = StatsTable::parse("Hostname,role\nh2,COMPUTE\n");
        let rows = parse_metric_rows(&table, GroupMode::Backend);
        assert_eq!(rows[0].group_key(GroupMode::Backend), "h2-COMPUTE");
    }
}
