//! Grammar of the `:` command line: `<row>` jumps to a row, `s<+|-><column>`
//! sorts by a column slot number or a metric name.

use crate::columns::ColumnConfig;
use crate::metric::MetricName;
use crate::sort::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 1-based row number.
    SelectRow(usize),
    Sort {
        metric: MetricName,
        direction: Direction,
    },
}

/// Parses a completed command buffer. Anything malformed, out of range or
/// naming an inactive column yields `None`.
pub fn parse_command(input: &str, columns: &ColumnConfig) -> Option<Command> {
    if let Some(rest) = input.strip_prefix('s') {
        return parse_sort(rest, columns);
    }
    let row = input.trim().parse::<usize>().ok()?;
    (row >= 1).then_some(Command::SelectRow(row))
}

fn parse_sort(rest: &str, columns: &ColumnConfig) -> Option<Command> {
    let mut chars = rest.chars();
    let direction = match chars.next()? {
        '+' => Direction::Ascending,
        '-' => Direction::Descending,
        _ => return None,
    };
    let target = chars.as_str().trim();
    let metric = match target.parse::<usize>() {
        Ok(slot) => columns.slot(slot)?,
        Err(_) => {
            let metric = target.parse::<MetricName>().ok()?;
            if !columns.contains(metric) {
                return None;
            }
            metric
        }
    };
    Some(Command::Sort { metric, direction })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_numbers_are_one_based() {
        let columns = ColumnConfig::default();
        assert_eq!(parse_command("3", &columns), Some(Command::SelectRow(3)));
        assert_eq!(parse_command("0", &columns), None);
        assert_eq!(parse_command("x1", &columns), None);
    }

    #[test]
    fn sort_by_slot_number() {
        let columns = ColumnConfig::default();
        assert_eq!(
            parse_command("s+2", &columns),
            Some(Command::Sort {
                metric: MetricName::Ops,
                direction: Direction::Ascending
            })
        );
        assert_eq!(
            parse_command("s-1", &columns),
            Some(Command::Sort {
                metric: MetricName::Cpu,
                direction: Direction::Descending
            })
        );
        assert_eq!(parse_command("s+7", &columns), None);
    }

    #[test]
    fn sort_by_active_metric_name() {
        let columns = ColumnConfig::default();
        assert_eq!(
            parse_command("s-Ops/s", &columns),
            Some(Command::Sort {
                metric: MetricName::Ops,
                direction: Direction::Descending
            })
        );
        assert_eq!(parse_command("s+L6 Recv", &columns), None);
        assert_eq!(parse_command("s+Bogus", &columns), None);
    }

    #[test]
    fn malformed_sort_commands_are_rejected() {
        let columns = ColumnConfig::default();
        assert_eq!(parse_command("s", &columns), None);
        assert_eq!(parse_command("s3", &columns), None);
        assert_eq!(parse_command("s+", &columns), None);
    }
}
