//! Contracts for the two external data sources polled every cycle.

use crate::aggregate::GroupMode;
use crate::metric::MetricName;
use crate::status::ClusterSnapshot;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} timed out after {}s", .timeout.as_secs_f64())]
    Timeout { command: String, timeout: Duration },
    #[error("{command} exited with {code:?}: {stderr}")]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("invalid status payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// What a stats call is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsScope {
    Clients,
    Backends,
    ClientHost(String),
    BackendHost(String),
}

/// One stats provider request: scope plus the metric columns to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub scope: StatsScope,
    pub metrics: Vec<MetricName>,
}

impl StatsQuery {
    pub fn hosts(mode: GroupMode, metrics: &[MetricName]) -> Self {
        let scope = match mode {
            GroupMode::Client => StatsScope::Clients,
            GroupMode::Backend => StatsScope::Backends,
        };
        Self {
            scope,
            metrics: metrics.to_vec(),
        }
    }

    pub fn host_detail(mode: GroupMode, base_host: &str, metrics: &[MetricName]) -> Self {
        let scope = match mode {
            GroupMode::Client => StatsScope::ClientHost(base_host.to_string()),
            GroupMode::Backend => StatsScope::BackendHost(base_host.to_string()),
        };
        Self {
            scope,
            metrics: metrics.to_vec(),
        }
    }

    pub fn filters(&self) -> Vec<String> {
        match &self.scope {
            StatsScope::Clients => vec!["mode=client".to_string(), "role=frontend".to_string()],
            StatsScope::Backends | StatsScope::BackendHost(_) => vec!["mode=backend".to_string()],
            StatsScope::ClientHost(host) => {
                vec!["mode=client".to_string(), format!("hostname={host}")]
            }
        }
    }

    /// Identity fields first, then only the requested metrics.
    pub fn output_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = match self.scope {
            StatsScope::Clients => vec!["hostname"],
            StatsScope::Backends => vec!["hostname", "role"],
            StatsScope::ClientHost(_) => vec!["node", "hostname"],
            StatsScope::BackendHost(_) => vec!["node", "hostname", "role"],
        };
        for metric in &self.metrics {
            if !fields.contains(&metric.field()) {
                fields.push(metric.field());
            }
        }
        fields
    }
}

/// A cluster data source. Implementations must bound each call in time.
pub trait ClusterSource {
    fn status(&self) -> Result<ClusterSnapshot, ProviderError>;

    /// Returns the raw tabular payload for `query`.
    fn stats(&self, query: &StatsQuery) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_query_filters_frontends() {
        let query = StatsQuery::hosts(GroupMode::Client, &[MetricName::Cpu, MetricName::L6Sent]);
        assert_eq!(query.filters(), vec!["mode=client", "role=frontend"]);
        assert_eq!(query.output_fields(), vec!["hostname", "cpu", "l6send"]);
    }

    #[test]
    fn backend_query_adds_role() {
        let query = StatsQuery::hosts(GroupMode::Backend, &[MetricName::Ops]);
        assert_eq!(query.filters(), vec!["mode=backend"]);
        assert_eq!(query.output_fields(), vec!["hostname", "role", "ops"]);
    }

    #[test]
    fn detail_queries_include_node_identity() {
        let client = StatsQuery::host_detail(GroupMode::Client, "c1", &[MetricName::Reads]);
        assert_eq!(client.filters(), vec!["mode=client", "hostname=c1"]);
        assert_eq!(client.output_fields(), vec!["node", "hostname", "readps"]);

        let backend = StatsQuery::host_detail(GroupMode::Backend, "b1", &[]);
        assert_eq!(backend.filters(), vec!["mode=backend"]);
        assert_eq!(backend.output_fields(), vec!["node", "hostname", "role"]);
    }

    #[test]
    fn timeout_error_reports_seconds() {
        let err = ProviderError::Timeout {
            command: "weka status".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "weka status timed out after 5s");
    }
}
