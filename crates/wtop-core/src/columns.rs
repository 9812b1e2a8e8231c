use crate::metric::MetricName;

pub const MAX_COLUMNS: usize = 9;

pub const DEFAULT_COLUMNS: [MetricName; 6] = [
    MetricName::Cpu,
    MetricName::Ops,
    MetricName::Reads,
    MetricName::Writes,
    MetricName::ReadLatency,
    MetricName::WriteLatency,
];

/// Ordered, duplicate-free set of visible metric columns. The hostname column
/// is implicit and never part of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnConfig {
    columns: Vec<MetricName>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self::from_metrics(DEFAULT_COLUMNS)
    }
}

impl ColumnConfig {
    /// Builds a set from `metrics`, dropping duplicates and anything past the cap.
    pub fn from_metrics<I>(metrics: I) -> Self
    where
        I: IntoIterator<Item = MetricName>,
    {
        let mut columns = Vec::new();
        for metric in metrics {
            if columns.len() >= MAX_COLUMNS {
                break;
            }
            if !columns.contains(&metric) {
                columns.push(metric);
            }
        }
        Self { columns }
    }

    pub fn as_slice(&self) -> &[MetricName] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, metric: MetricName) -> bool {
        self.columns.contains(&metric)
    }

    /// Column at a 1-based slot number, as typed by the user.
    pub fn slot(&self, number: usize) -> Option<MetricName> {
        number
            .checked_sub(1)
            .and_then(|idx| self.columns.get(idx).copied())
    }

    /// Replaces the metric at `slot` (0-based) with the next catalog metric
    /// not shown in another slot. Returns whether anything changed.
    pub fn cycle(&mut self, slot: usize) -> bool {
        let Some(current) = self.columns.get(slot).copied() else {
            return false;
        };
        let mut candidate = current.next();
        while candidate != current {
            if !self.contains(candidate) {
                self.columns[slot] = candidate;
                return true;
            }
            candidate = candidate.next();
        }
        false
    }

    /// Appends the first catalog metric not in use.
    pub fn add(&mut self) -> Option<MetricName> {
        if self.columns.len() >= MAX_COLUMNS {
            return None;
        }
        let metric = MetricName::ALL
            .iter()
            .copied()
            .find(|metric| !self.contains(*metric))?;
        self.columns.push(metric);
        Some(metric)
    }

    /// Drops the last column.
    pub fn remove(&mut self) -> Option<MetricName> {
        self.columns.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_six_priority_metrics() {
        let config = ColumnConfig::default();
        assert_eq!(config.as_slice(), &DEFAULT_COLUMNS);
        assert_eq!(config.slot(2), Some(MetricName::Ops));
        assert_eq!(config.slot(0), None);
        assert_eq!(config.slot(7), None);
    }

    #[test]
    fn cycle_skips_metrics_used_elsewhere() {
        let mut config = ColumnConfig::default();
        assert!(config.cycle(0));
        assert_eq!(config.as_slice()[0], MetricName::L6Recv);
        assert!(config.cycle(5));
        assert_eq!(config.as_slice()[5], MetricName::L6Sent);
        assert!(!config.cycle(6));
    }

    #[test]
    fn cycle_wraps_to_start_of_catalog() {
        let mut config = ColumnConfig::from_metrics([MetricName::RdmaSent]);
        assert!(config.cycle(0));
        assert_eq!(config.as_slice(), &[MetricName::Cpu]);
    }

    #[test]
    fn full_set_cycles_into_remaining_metrics() {
        let mut config = ColumnConfig::from_metrics(MetricName::ALL);
        assert_eq!(config.len(), MAX_COLUMNS);
        assert_eq!(config.as_slice()[8], MetricName::ObsUpload);
        assert!(config.cycle(8));
        assert_eq!(config.as_slice()[8], MetricName::ObsDownload);
        assert!(!config.cycle(MAX_COLUMNS));
    }

    #[test]
    fn add_stops_at_cap_and_never_duplicates() {
        let mut config = ColumnConfig::default();
        assert_eq!(config.add(), Some(MetricName::L6Recv));
        assert_eq!(config.add(), Some(MetricName::L6Sent));
        assert_eq!(config.add(), Some(MetricName::ObsUpload));
        assert_eq!(config.add(), None);
        assert_eq!(config.len(), MAX_COLUMNS);
        let mut seen = config.as_slice().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), config.len());
    }

    #[test]
    fn remove_on_empty_is_noop() {
        let mut config = ColumnConfig::from_metrics([MetricName::Cpu]);
        assert_eq!(config.remove(), Some(MetricName::Cpu));
        assert_eq!(config.remove(), None);
        assert!(config.is_empty());
        assert_eq!(config.add(), Some(MetricName::Cpu));
    }

    #[test]
    fn from_metrics_deduplicates() {
        let config = ColumnConfig::from_metrics([MetricName::Ops, MetricName::Ops, MetricName::Cpu]);
        assert_eq!(config.as_slice(), &[MetricName::Ops, MetricName::Cpu]);
    }
}
