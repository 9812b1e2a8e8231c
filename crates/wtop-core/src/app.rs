use crate::aggregate::{aggregate_by_mode, parse_metric_rows, split_group_key, totals, GroupMode, HostSummary};
use crate::columns::ColumnConfig;
use crate::command::{parse_command, Command};
use crate::detail::{parse_node_rows, DrillTarget, NodeRow, Role, RoleFilters};
use crate::metric::{MetricName, MetricSet};
use crate::poller::RefreshSchedule;
use crate::provider::{ProviderError, StatsQuery};
use crate::sort::{Direction, SortState};
use crate::status::ClusterSnapshot;
use crate::table::StatsTable;
use tracing::{debug, info};

pub const STATUS_UPDATED: &str = "Data updated successfully";
pub const STATUS_FETCHING: &str = "Fetching data...";

/// Terminal-independent input, translated by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Up,
    Down,
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Main,
    NodeDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Command,
}

/// Everything one poll produced, applied to the app in a single step.
#[derive(Debug)]
pub struct CycleData {
    pub status: Result<ClusterSnapshot, ProviderError>,
    pub stats: Result<StatsTable, ProviderError>,
}

#[derive(Debug, Clone)]
pub struct App {
    pub mode: GroupMode,
    pub view: View,
    pub input_mode: InputMode,
    pub input: String,
    pub show_help: bool,
    pub selected_row: usize,
    pub columns: ColumnConfig,
    pub sort: SortState,
    pub role_filters: RoleFilters,
    pub hosts: Vec<HostSummary>,
    pub drill: Option<DrillTarget>,
    pub nodes: Vec<NodeRow>,
    pub node_totals: Option<MetricSet>,
    pub cluster: Option<ClusterSnapshot>,
    pub schedule: RefreshSchedule,
    pub status_message: String,
    main_columns: Option<ColumnConfig>,
    refresh_requested: bool,
    should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(GroupMode::default(), RefreshSchedule::default())
    }
}

impl App {
    pub fn new(mode: GroupMode, schedule: RefreshSchedule) -> Self {
        Self {
            mode,
            view: View::Main,
            input_mode: InputMode::Normal,
            input: String::new(),
            show_help: false,
            selected_row: 0,
            columns: ColumnConfig::default(),
            sort: SortState::default(),
            role_filters: RoleFilters::default(),
            hosts: Vec::new(),
            drill: None,
            nodes: Vec::new(),
            node_totals: None,
            cluster: None,
            schedule,
            status_message: STATUS_FETCHING.to_string(),
            main_columns: None,
            refresh_requested: false,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Returns and clears the pending early-refresh flag.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// The stats request matching the current view, mode and columns.
    pub fn stats_query(&self) -> StatsQuery {
        match (&self.view, &self.drill) {
            (View::NodeDetails, Some(target)) => {
                StatsQuery::host_detail(self.mode, &target.base_host, self.columns.as_slice())
            }
            _ => StatsQuery::hosts(self.mode, self.columns.as_slice()),
        }
    }

    /// Drill-down rows after role filtering; filters only apply in backend mode.
    pub fn visible_nodes(&self) -> Vec<&NodeRow> {
        self.nodes
            .iter()
            .filter(|row| self.mode == GroupMode::Client || self.role_filters.admits(row))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        match self.view {
            View::Main => self.hosts.len(),
            View::NodeDetails => self.visible_nodes().len(),
        }
    }

    pub fn role_filters_active(&self) -> bool {
        self.view == View::NodeDetails && self.mode == GroupMode::Backend
    }

    /// Swaps in one poll's results. Returns the number of rows received.
    /// Either provider failing counts as a failed poll for the schedule.
    pub fn apply_cycle(&mut self, data: CycleData) -> usize {
        let CycleData { status, stats } = data;
        let status_error = match status {
            Ok(snapshot) => {
                self.cluster = Some(snapshot);
                None
            }
            Err(err) => {
                self.cluster = None;
                Some(err)
            }
        };

        let (count, stats_error) = match stats {
            Ok(table) => (self.replace_rows(&table), None),
            Err(err) => (self.replace_rows(&StatsTable::default()), Some(err)),
        };

        self.status_message = match (&stats_error, &status_error) {
            (Some(err), _) => format!("Error updating data - {err}"),
            (None, Some(err)) => {
                let base = if count == 0 { STATUS_FETCHING } else { STATUS_UPDATED };
                format!("{base} (cluster status unavailable - {err})")
            }
            (None, None) if count == 0 => STATUS_FETCHING.to_string(),
            (None, None) => STATUS_UPDATED.to_string(),
        };

        if stats_error.is_some() || status_error.is_some() {
            self.schedule.on_failure();
        } else if count == 0 {
            self.schedule.on_empty();
        } else {
            self.schedule.on_data();
        }
        count
    }

    fn replace_rows(&mut self, table: &StatsTable) -> usize {
        let count = match (&self.view, &self.drill) {
            (View::NodeDetails, Some(target)) => {
                let mut nodes = parse_node_rows(table, self.mode, &target.base_host);
                let node_totals = totals(&nodes);
                self.sort.reapply(&mut nodes);
                let count = nodes.len();
                self.nodes = nodes;
                self.node_totals = node_totals;
                count
            }
            _ => {
                let rows = parse_metric_rows(table, self.mode);
                let mut hosts = aggregate_by_mode(&rows, self.mode);
                self.sort.reapply(&mut hosts);
                let count = hosts.len();
                self.hosts = hosts;
                count
            }
        };
        self.clamp_selection();
        count
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if matches!(event, InputEvent::Interrupt | InputEvent::Char('q')) {
            self.should_quit = true;
            return;
        }
        if self.show_help {
            self.show_help = false;
            return;
        }
        if self.input_mode == InputMode::Command {
            self.handle_command_input(event);
            return;
        }

        match event {
            InputEvent::Char('h') => self.show_help = true,
            InputEvent::Char('m') => self.toggle_mode(),
            InputEvent::Char('+') => self.schedule.slower(),
            InputEvent::Char('-') => self.schedule.faster(),
            InputEvent::Char('a') => {
                if let Some(metric) = self.columns.add() {
                    debug!(%metric, "column added");
                }
            }
            InputEvent::Char('r') => {
                if let Some(metric) = self.columns.remove() {
                    debug!(%metric, "column removed");
                }
            }
            InputEvent::Char(':') => self.begin_command(""),
            InputEvent::Char('s') => self.begin_command("s"),
            InputEvent::Char(key @ '1'..='9') => self.handle_number_key(key),
            InputEvent::Enter => match self.view {
                View::Main => self.drill_down(),
                View::NodeDetails => self.return_to_main(),
            },
            InputEvent::Escape => {
                if self.view == View::NodeDetails {
                    self.return_to_main();
                }
            }
            InputEvent::Up => self.move_selection(-1),
            InputEvent::Down => self.move_selection(1),
            _ => {}
        }
    }

    fn handle_number_key(&mut self, key: char) {
        if self.role_filters_active() {
            if let Some(role) = Role::from_key(key) {
                let visible = self.role_filters.toggle(role);
                debug!(role = role.as_str(), visible, "role filter toggled");
                self.clamp_selection();
                return;
            }
        }
        let slot = key.to_digit(10).unwrap_or(0) as usize;
        if slot > 0 {
            self.columns.cycle(slot - 1);
        }
    }

    fn handle_command_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Enter => self.submit_command(),
            InputEvent::Escape => self.cancel_command(),
            InputEvent::Backspace => {
                self.input.pop();
            }
            InputEvent::Char('d') if self.is_row_command() => self.quick_drill(),
            InputEvent::Char(c) if !c.is_control() => self.input.push(c),
            _ => {}
        }
    }

    fn is_row_command(&self) -> bool {
        self.view == View::Main && !self.input.is_empty() && !self.input.starts_with('s')
    }

    fn begin_command(&mut self, prefix: &str) {
        self.input_mode = InputMode::Command;
        self.input = prefix.to_string();
    }

    fn cancel_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    fn submit_command(&mut self) {
        let input = std::mem::take(&mut self.input);
        self.input_mode = InputMode::Normal;
        match parse_command(&input, &self.columns) {
            Some(Command::SelectRow(row)) if row <= self.row_count() => {
                self.selected_row = row - 1;
            }
            Some(Command::Sort { metric, direction }) => self.sort_by(metric, direction),
            _ => debug!(input = %input, "ignoring invalid command"),
        }
    }

    fn quick_drill(&mut self) {
        let input = std::mem::take(&mut self.input);
        self.input_mode = InputMode::Normal;
        match parse_command(&input, &self.columns) {
            Some(Command::SelectRow(row)) if row <= self.hosts.len() => {
                self.selected_row = row - 1;
                self.drill_down();
            }
            _ => debug!(input = %input, "ignoring invalid drill command"),
        }
    }

    /// Explicit user resort of the current view. Resets the selection.
    pub fn sort_by(&mut self, metric: MetricName, direction: Direction) {
        let applied = self.sort.request(metric, Some(direction));
        match self.view {
            View::Main => self.sort.reapply(&mut self.hosts),
            View::NodeDetails => self.sort.reapply(&mut self.nodes),
        }
        self.selected_row = 0;
        debug!(%metric, direction = ?applied, "sorted");
    }

    fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        self.selected_row = 0;
        match self.view {
            View::Main => self.hosts.clear(),
            View::NodeDetails => {
                self.nodes.clear();
                self.node_totals = None;
            }
        }
        self.refresh_requested = true;
        info!(mode = %self.mode, "grouping mode switched");
    }

    fn drill_down(&mut self) {
        if self.view != View::Main {
            return;
        }
        let Some(host) = self.hosts.get(self.selected_row) else {
            return;
        };
        let target = match (self.mode, split_group_key(&host.group_key)) {
            (GroupMode::Backend, Some((base, role))) if host.role.is_none() => DrillTarget {
                group_key: host.group_key.clone(),
                base_host: base.to_string(),
                role: Some(role.to_string()),
            },
            _ => DrillTarget {
                group_key: host.group_key.clone(),
                base_host: host.base_host.clone(),
                role: host.role.clone(),
            },
        };
        info!(host = %target.base_host, role = ?target.role, "drilling into host");
        self.main_columns = Some(self.columns.clone());
        self.drill = Some(target);
        self.view = View::NodeDetails;
        self.nodes.clear();
        self.node_totals = None;
        self.selected_row = 0;
        self.refresh_requested = true;
    }

    fn return_to_main(&mut self) {
        if let Some(columns) = self.main_columns.take() {
            self.columns = columns;
        }
        self.view = View::Main;
        self.drill = None;
        self.nodes.clear();
        self.node_totals = None;
        self.selected_row = 0;
        self.refresh_requested = true;
        debug!("returned to host view");
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.row_count();
        if count == 0 {
            self.selected_row = 0;
            return;
        }
        let next = self.selected_row as isize + delta;
        self.selected_row = next.clamp(0, count as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        self.selected_row = if count == 0 {
            0
        } else {
            self.selected_row.min(count - 1)
        };
    }
}
