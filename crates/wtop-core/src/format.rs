use crate::metric::{MetricKind, MetricName};

const KIB: f64 = 1024.0;
const MIB: f64 = 1_048_576.0;
const GIB: f64 = 1_073_741_824.0;
const TIB: f64 = 1_099_511_627_776.0;

pub fn format_ops(ops: f64) -> String {
    if ops >= 1_000_000.0 {
        format!("{:.2}Mops", ops / 1_000_000.0)
    } else if ops >= 1000.0 {
        format!("{:.2}Kops", ops / 1000.0)
    } else {
        format!("{ops:.2}")
    }
}

pub fn format_throughput(bytes_per_sec: f64) -> String {
    if bytes_per_sec >= TIB {
        format!("{:.2}TB/s", bytes_per_sec / TIB)
    } else if bytes_per_sec >= GIB {
        format!("{:.2}GB/s", bytes_per_sec / GIB)
    } else if bytes_per_sec >= MIB {
        format!("{:.2}MB/s", bytes_per_sec / MIB)
    } else if bytes_per_sec >= KIB {
        format!("{:.2}KB/s", bytes_per_sec / KIB)
    } else {
        format!("{bytes_per_sec:.2}B/s")
    }
}

pub fn format_capacity(bytes: f64) -> String {
    if bytes >= TIB {
        format!("{:.2}TB", bytes / TIB)
    } else if bytes >= GIB {
        format!("{:.2}GB", bytes / GIB)
    } else {
        format!("{bytes:.2}B")
    }
}

pub fn format_metric(metric: MetricName, value: f64) -> String {
    match metric.kind() {
        MetricKind::Percent | MetricKind::Latency => format!("{value:.2}"),
        MetricKind::Ops => format_ops(value),
        MetricKind::Bandwidth => format_throughput(value),
    }
}

/// Totals-row cell, labelled with how the column was reduced.
pub fn format_total(metric: MetricName, value: f64) -> String {
    format!(
        "{} {}",
        format_metric(metric, value),
        metric.totals_reduction().label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_scale() {
        assert_eq!(format_ops(12.0), "12.00");
        assert_eq!(format_ops(1500.0), "1.50Kops");
        assert_eq!(format_ops(2_500_000.0), "2.50Mops");
    }

    #[test]
    fn throughput_scale() {
        assert_eq!(format_throughput(512.0), "512.00B/s");
        assert_eq!(format_throughput(2048.0), "2.00KB/s");
        assert_eq!(format_throughput(3.0 * MIB), "3.00MB/s");
        assert_eq!(format_throughput(GIB), "1.00GB/s");
        assert_eq!(format_throughput(2.0 * TIB), "2.00TB/s");
    }

    #[test]
    fn capacity_has_no_kb_or_mb_step() {
        assert_eq!(format_capacity(4096.0), "4096.00B");
        assert_eq!(format_capacity(5.0 * GIB), "5.00GB");
        assert_eq!(format_capacity(1.5 * TIB), "1.50TB");
    }

    #[test]
    fn metric_cells_follow_kind() {
        assert_eq!(format_metric(MetricName::Cpu, 12.5), "12.50");
        assert_eq!(format_metric(MetricName::Reads, 2000.0), "2.00Kops");
        assert_eq!(format_total(MetricName::Cpu, 80.0), "80.00 (max)");
        assert_eq!(format_total(MetricName::ReadLatency, 5.0), "5.00 (avg)");
        assert_eq!(format_total(MetricName::RdmaRecv, 0.0), "0.00B/s (total)");
    }
}
