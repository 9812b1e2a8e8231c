//! Drill-down rows: the individual processes behind one host group.

use crate::aggregate::{GroupMode, UNKNOWN};
use crate::metric::{MetricSet, Metered};
use crate::table::StatsTable;

const NODE_ID_COLUMNS: [&str; 6] = ["Node ID", "Node", "node", "NodeId", "node_id", "Node_Id"];

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub node_id: String,
    pub host: String,
    pub role: Option<String>,
    pub metrics: MetricSet,
}

impl Metered for NodeRow {
    fn metrics(&self) -> &MetricSet {
        &self.metrics
    }
}

/// The host group a drill-down is focused on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillTarget {
    pub group_key: String,
    pub base_host: String,
    pub role: Option<String>,
}

/// Backend process roles that can be hidden in the drill-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Drives,
    Compute,
    Frontend,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Drives, Role::Compute, Role::Frontend];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Drives => "DRIVES",
            Role::Compute => "COMPUTE",
            Role::Frontend => "FRONTEND",
        }
    }

    /// Role bound to a number key while drilled into backend mode.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(Role::Drives),
            '2' => Some(Role::Compute),
            '3' => Some(Role::Frontend),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Display-time row filter; never touches fetched data or the totals row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleFilters {
    visible: [bool; 3],
}

impl Default for RoleFilters {
    fn default() -> Self {
        Self { visible: [true; 3] }
    }
}

impl RoleFilters {
    pub fn toggle(&mut self, role: Role) -> bool {
        let slot = &mut self.visible[role as usize];
        *slot = !*slot;
        *slot
    }

    pub fn is_visible(&self, role: Role) -> bool {
        self.visible[role as usize]
    }

    /// Rows with an unrecognised role are hidden while filtering.
    pub fn admits(&self, row: &NodeRow) -> bool {
        row.role
            .as_deref()
            .and_then(Role::parse)
            .map(|role| self.is_visible(role))
            .unwrap_or(false)
    }

}

/// Reads drill-down rows. Backend payloads cover every host, so only rows
/// whose hostname is `base_host` or a qualified form of it are kept.
pub fn parse_node_rows(table: &StatsTable, mode: GroupMode, base_host: &str) -> Vec<NodeRow> {
    table
        .records()
        .filter_map(|record| {
            let host = record
                .get("Hostname")
                .filter(|value| !value.is_empty())
                .unwrap_or(match mode {
                    GroupMode::Client => "N/A",
                    GroupMode::Backend => UNKNOWN,
                })
                .to_string();
            let role = match mode {
                GroupMode::Client => None,
                GroupMode::Backend => {
                    if !is_same_host(&host, base_host) {
                        return None;
                    }
                    Some(
                        record
                            .first_of(&["Roles", "role"])
                            .unwrap_or(UNKNOWN)
                            .to_string(),
                    )
                }
            };
            let node_id = match record.first_of(&NODE_ID_COLUMNS) {
                Some(id) => id.to_string(),
                None => fallback_node_id(mode, &host, role.as_deref()),
            };
            Some(NodeRow {
                node_id,
                host,
                role,
                metrics: record.metrics(),
            })
        })
        .collect()
}

/// `host` is `base` itself or `base` followed by a domain or suffix label.
fn is_same_host(host: &str, base: &str) -> bool {
    host.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('-'))
}

fn fallback_node_id(mode: GroupMode, host: &str, role: Option<&str>) -> String {
    match (mode, role) {
        (GroupMode::Client, _) => "N/A".to_string(),
        (GroupMode::Backend, Some(role)) if role != UNKNOWN => {
            format!("{host}-{}", capitalize(role))
        }
        (GroupMode::Backend, _) => host.to_string(),
    }
}

fn capitalize(value: &str) -> String {
    let lower = value.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MetricName;

    #[test]
    fn client_rows_resolve_node_id_variants() {
        let table = StatsTable::parse(
            "Node,Hostname,CPU%,Ops/s\nNodeId<41>,client-1,12,100\n,client-1,8,50\n",
        );
        let rows = parse_node_rows(&table, GroupMode::Client, "client-1");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].node_id, "NodeId<41>");
        assert_eq!(rows[1].node_id, "N/A");
        assert_eq!(rows[0].metrics[MetricName::Ops], 100.0);
        assert_eq!(rows[0].role, None);
    }

    #[test]
    fn backend_rows_filter_by_base_host() {
        let table = StatsTable::parse(
            "Node ID,Hostname,Roles,CPU%\n\
             NodeId<1>,hostX,DRIVES,50\n\
             NodeId<2>,hostY,DRIVES,10\n\
             ,hostX.lan,COMPUTE,30\n",
        );
        let rows = parse_node_rows(&table, GroupMode::Backend, "hostX");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].role.as_deref(), Some("DRIVES"));
        assert_eq!(rows[1].node_id, "hostX.lan-Compute");
    }

    #[test]
    fn longer_hostnames_sharing_a_prefix_are_excluded() {
        let table = StatsTable::parse(
            "Node ID,Hostname,Roles,CPU%\n\
             NodeId<1>,b1,DRIVES,50\n\
             NodeId<2>,b10,DRIVES,10\n\
             NodeId<3>,b11,COMPUTE,30\n\
             NodeId<4>,b1-data,FRONTEND,5\n",
        );
        let rows = parse_node_rows(&table, GroupMode::Backend, "b1");
        let ids: Vec<&str> = rows.iter().map(|row| row.node_id.as_str()).collect();
        assert_eq!(ids, vec!["NodeId<1>", "NodeId<4>"]);
    }

    #[test]
    fn role_filters_toggle_independently() {
        let mut filters = RoleFilters::default();
        let row = NodeRow {
            node_id: "n".to_string(),
            host: "h".to_string(),
            role: Some("COMPUTE".to_string()),
            metrics: MetricSet::new(),
        };
        assert!(filters.admits(&row));
        assert!(!filters.toggle(Role::Compute));
        assert!(!filters.admits(&row));
        assert!(filters.is_visible(Role::Drives));
        assert!(filters.is_visible(Role::Frontend));
        assert!(filters.toggle(Role::Compute));
        assert!(filters.admits(&row));
    }

    #[test]
    fn number_keys_map_to_roles() {
        assert_eq!(Role::from_key('1'), Some(Role::Drives));
        assert_eq!(Role::from_key('3'), Some(Role::Frontend));
        assert_eq!(Role::from_key('4'), None);
    }
}
