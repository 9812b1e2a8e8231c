use crate::coerce::{to_bandwidth, to_float};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

pub const METRIC_COUNT: usize = 12;

/// The fixed catalog of per-process metrics reported by the stats provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    Cpu,
    Ops,
    Reads,
    Writes,
    ReadLatency,
    WriteLatency,
    L6Recv,
    L6Sent,
    ObsUpload,
    ObsDownload,
    RdmaRecv,
    RdmaSent,
}

/// How a metric collapses when several process rows share one host group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Percent,
    Latency,
    Ops,
    Bandwidth,
}

impl MetricName {
    pub const ALL: [MetricName; METRIC_COUNT] = [
        MetricName::Cpu,
        MetricName::Ops,
        MetricName::Reads,
        MetricName::Writes,
        MetricName::ReadLatency,
        MetricName::WriteLatency,
        MetricName::L6Recv,
        MetricName::L6Sent,
        MetricName::ObsUpload,
        MetricName::ObsDownload,
        MetricName::RdmaRecv,
        MetricName::RdmaSent,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name as it appears in the provider's header row.
    pub fn header(self) -> &'static str {
        match self {
            MetricName::Cpu => "CPU%",
            MetricName::Ops => "Ops/s",
            MetricName::Reads => "Reads/s",
            MetricName::Writes => "Writes/s",
            MetricName::ReadLatency => "Read Latency(µs)",
            MetricName::WriteLatency => "Write Latency(µs)",
            MetricName::L6Recv => "L6 Recv",
            MetricName::L6Sent => "L6 Sent",
            MetricName::ObsUpload => "OBS Upload",
            MetricName::ObsDownload => "OBS Download",
            MetricName::RdmaRecv => "RDMA Recv",
            MetricName::RdmaSent => "RDMA Sent",
        }
    }

    /// Token passed to the provider's output-column selector.
    pub fn field(self) -> &'static str {
        match self {
            MetricName::Cpu => "cpu",
            MetricName::Ops => "ops",
            MetricName::Reads => "readps",
            MetricName::Writes => "writeps",
            MetricName::ReadLatency => "rlatency",
            MetricName::WriteLatency => "wlatency",
            MetricName::L6Recv => "l6recv",
            MetricName::L6Sent => "l6send",
            MetricName::ObsUpload => "upload",
            MetricName::ObsDownload => "download",
            MetricName::RdmaRecv => "rdmarecv",
            MetricName::RdmaSent => "rdmasend",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            MetricName::Cpu => MetricKind::Percent,
            MetricName::ReadLatency | MetricName::WriteLatency => MetricKind::Latency,
            MetricName::Ops | MetricName::Reads | MetricName::Writes => MetricKind::Ops,
            _ => MetricKind::Bandwidth,
        }
    }

    /// Reduction used when building one summary row per host group.
    pub fn group_reduction(self) -> Reduction {
        match self.kind() {
            MetricKind::Percent | MetricKind::Latency => Reduction::Mean,
            MetricKind::Ops | MetricKind::Bandwidth => Reduction::Sum,
        }
    }

    /// Reduction used for the drill-down totals row. CPU spotlights the hottest process.
    pub fn totals_reduction(self) -> Reduction {
        match self.kind() {
            MetricKind::Percent => Reduction::Max,
            MetricKind::Latency => Reduction::Mean,
            MetricKind::Ops | MetricKind::Bandwidth => Reduction::Sum,
        }
    }

    pub fn coerce(self, raw: &str) -> f64 {
        match self.kind() {
            MetricKind::Bandwidth => to_bandwidth(raw),
            _ => to_float(raw),
        }
    }

    /// Next catalog entry, wrapping at the end.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % METRIC_COUNT]
    }
}

impl Reduction {
    pub fn label(self) -> &'static str {
        match self {
            Reduction::Sum => "(total)",
            Reduction::Mean => "(avg)",
            Reduction::Max => "(max)",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for MetricName {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim();
        if normalized.is_empty() {
            return Err("empty metric name".to_string());
        }
        MetricName::ALL
            .iter()
            .copied()
            .find(|metric| {
                metric.header().eq_ignore_ascii_case(normalized)
                    || metric.field().eq_ignore_ascii_case(normalized)
                    || format!("{metric:?}").eq_ignore_ascii_case(normalized)
            })
            .ok_or_else(|| format!("Unknown metric: {normalized}"))
    }
}

/// Dense metric values for one row; every catalog entry is always present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSet([f64; METRIC_COUNT]);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: MetricName) -> f64 {
        self.0[metric.index()]
    }

    pub fn set(&mut self, metric: MetricName, value: f64) {
        self.0[metric.index()] = value;
    }
}

impl Index<MetricName> for MetricSet {
    type Output = f64;

    fn index(&self, metric: MetricName) -> &f64 {
        &self.0[metric.index()]
    }
}

/// Anything carrying a metric set can be sorted and projected onto columns.
pub trait Metered {
    fn metrics(&self) -> &MetricSet;

    fn metric(&self, metric: MetricName) -> f64 {
        self.metrics().get(metric)
    }
}

impl Metered for MetricSet {
    fn metrics(&self) -> &MetricSet {
        self
    }
}
