pub mod aggregate;
pub mod app;
pub mod coerce;
pub mod columns;
pub mod command;
pub mod detail;
pub mod format;
pub mod metric;
pub mod poller;
pub mod provider;
pub mod sort;
pub mod status;
pub mod table;

pub use aggregate::{GroupMode, HostSummary, MetricRow};
pub use app::{App, InputEvent, InputMode, View};
pub use columns::ColumnConfig;
pub use detail::{DrillTarget, NodeRow, Role, RoleFilters};
pub use metric::{MetricName, MetricSet, Metered};
pub use poller::{run_cycle, RefreshSchedule, Ticker};
pub use provider::{ClusterSource, ProviderError, StatsQuery, StatsScope};
pub use sort::{Direction, SortState};
pub use status::{ClusterSnapshot, ClusterSummary};
pub use table::StatsTable;
