//! Cluster-wide snapshot from the status provider and the figures derived
//! from it for the header lines.

use crate::coerce::to_float;
use crate::format::{format_capacity, format_ops, format_throughput};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub release: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: Capacity,
    #[serde(default, deserialize_with = "deserialize_active")]
    pub clients: f64,
    #[serde(default, deserialize_with = "deserialize_active")]
    pub io_nodes: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activity: Activity,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub active_alerts_count: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub buckets: Buckets,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Capacity {
    #[serde(default, deserialize_with = "deserialize_number")]
    pub total_bytes: f64,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub unprovisioned_bytes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Activity {
    #[serde(default, deserialize_with = "deserialize_number")]
    pub num_ops: f64,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub num_reads: f64,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub num_writes: f64,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub sum_bytes_read: f64,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub sum_bytes_written: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Buckets {
    #[serde(default, deserialize_with = "deserialize_number")]
    pub total: f64,
    #[serde(default, deserialize_with = "deserialize_number")]
    pub active: f64,
}

impl ClusterSnapshot {
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn summary(&self) -> ClusterSummary {
        let total_capacity = self.capacity.total_bytes;
        let read = self.activity.sum_bytes_read;
        let written = self.activity.sum_bytes_written;
        ClusterSummary {
            release: self.release.clone().unwrap_or_else(|| "Unknown".to_string()),
            name: self.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            status: self.status.clone().unwrap_or_else(|| "Unknown".to_string()),
            total_capacity,
            used_capacity: total_capacity - self.capacity.unprovisioned_bytes,
            active_clients: self.clients as u64,
            active_io_nodes: self.io_nodes as u64,
            ops_total: self.activity.num_ops,
            ops_read: self.activity.num_reads,
            ops_write: self.activity.num_writes,
            throughput_total: read + written,
            throughput_read: read,
            throughput_write: written,
            alerts: self.active_alerts_count as u64,
            buckets_total: self.buckets.total as i64,
            buckets_active: self.buckets.active as i64,
            buckets_down: (self.buckets.total - self.buckets.active) as i64,
        }
    }
}

/// Display-ready cluster health figures.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub release: String,
    pub name: String,
    pub status: String,
    pub total_capacity: f64,
    pub used_capacity: f64,
    pub active_clients: u64,
    pub active_io_nodes: u64,
    pub ops_total: f64,
    pub ops_read: f64,
    pub ops_write: f64,
    pub throughput_total: f64,
    pub throughput_read: f64,
    pub throughput_write: f64,
    pub alerts: u64,
    pub buckets_total: i64,
    pub buckets_active: i64,
    pub buckets_down: i64,
}

impl ClusterSummary {
    pub fn identity_line(&self) -> String {
        format!(
            "Release: {} | Cluster: {} | Status: {} | Capacity: {} | Used: {} | Clients: {} | IO-Nodes: {} | Buckets: {} | Active Buckets: {} | Down Buckets: {} | Alerts: {}",
            self.release,
            self.name,
            self.status,
            format_capacity(self.total_capacity),
            format_capacity(self.used_capacity),
            self.active_clients,
            self.active_io_nodes,
            self.buckets_total,
            self.buckets_active,
            self.buckets_down,
            self.alerts,
        )
    }

    pub fn activity_line(&self) -> String {
        format!(
            "OPS: {} (R:{} W:{}) | Throughput: {} (R:{} W:{})",
            format_ops(self.ops_total),
            format_ops(self.ops_read),
            format_ops(self.ops_write),
            format_throughput(self.throughput_total),
            format_throughput(self.throughput_read),
            format_throughput(self.throughput_write),
        )
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn number_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => to_float(s),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

/// Accepts `{"active": n, ...}` or a bare count.
fn deserialize_active<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Object(map) => map.get("active").map(number_from_value).unwrap_or(0.0),
        other => number_from_value(other),
    })
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: f64 = 1_073_741_824.0;

    #[test]
    fn parses_full_snapshot() {
        let payload = r#"{
            "release": "4.2.1",
            "name": "prod",
            "status": "OK",
            "capacity": {"total_bytes": 10737418240, "unprovisioned_bytes": 2147483648},
            "clients": {"active": 12, "total": 14},
            "io_nodes": {"active": 6},
            "activity": {"num_ops": 2500, "num_reads": 2000, "num_writes": 500,
                         "sum_bytes_read": 2048, "sum_bytes_written": 1024},
            "active_alerts_count": 3,
            "buckets": {"total": 10, "active": 8},
            "ignored": [1, 2, 3]
        }"#;
        let snapshot = ClusterSnapshot::from_json(payload).expect("snapshot");
        let summary = snapshot.summary();
        assert_eq!(summary.release, "4.2.1");
        assert_eq!(summary.total_capacity, 10.0 * GIB);
        assert_eq!(summary.used_capacity, 8.0 * GIB);
        assert_eq!(summary.active_clients, 12);
        assert_eq!(summary.active_io_nodes, 6);
        assert_eq!(summary.throughput_total, 3072.0);
        assert_eq!(summary.buckets_down, 2);
        assert_eq!(summary.alerts, 3);
        assert!(summary.identity_line().contains("Capacity: 10.00GB | Used: 8.00GB"));
        assert_eq!(
            summary.activity_line(),
            "OPS: 2.50Kops (R:2.00Kops W:500.00) | Throughput: 3.00KB/s (R:2.00KB/s W:1.00KB/s)"
        );
    }

    #[test]
    fn missing_and_null_fields_default() {
        let snapshot =
            ClusterSnapshot::from_json(r#"{"capacity": null, "buckets": {"total": null}, "io_nodes": 4}"#)
                .expect("snapshot");
        let summary = snapshot.summary();
        assert_eq!(summary.release, "Unknown");
        assert_eq!(summary.total_capacity, 0.0);
        assert_eq!(summary.buckets_total, 0);
        assert_eq!(summary.active_io_nodes, 4);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(ClusterSnapshot::from_json("not json").is_err());
    }
}
