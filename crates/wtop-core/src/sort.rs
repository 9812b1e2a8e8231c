use crate::metric::{MetricName, Metered};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Direction::Ascending => '+',
            Direction::Descending => '-',
        }
    }
}

/// The active ordering, remembered across refresh cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: Option<MetricName>,
    pub descending: bool,
}

impl SortState {
    pub fn direction(&self) -> Direction {
        if self.descending {
            Direction::Descending
        } else {
            Direction::Ascending
        }
    }

    /// Applies an explicit user resort. Repeating the active key flips the
    /// direction; a new key takes `direction`, or ascending when none is given.
    pub fn request(&mut self, key: MetricName, direction: Option<Direction>) -> Direction {
        let next = if self.key == Some(key) {
            self.direction().flip()
        } else {
            direction.unwrap_or(Direction::Ascending)
        };
        self.key = Some(key);
        self.descending = next == Direction::Descending;
        next
    }

    /// Reorders `rows` by the remembered key without toggling anything.
    pub fn reapply<T: Metered>(&self, rows: &mut [T]) {
        if let Some(key) = self.key {
            sort_rows(rows, key, self.direction());
        }
    }
}

/// Stable numeric sort. NaN sinks to the bottom in either direction.
pub fn sort_rows<T: Metered>(rows: &mut [T], key: MetricName, direction: Direction) {
    rows.sort_by(|a, b| compare(a.metric(key), b.metric(key), direction));
}

fn compare(a: f64, b: f64, direction: Direction) -> Ordering {
    match direction {
        Direction::Ascending => sanitize(a, f64::INFINITY).total_cmp(&sanitize(b, f64::INFINITY)),
        Direction::Descending => {
            sanitize(b, f64::NEG_INFINITY).total_cmp(&sanitize(a, f64::NEG_INFINITY))
        }
    }
}

fn sanitize(value: f64, invalid: f64) -> f64 {
    if value.is_nan() {
        invalid
    } else {
        value
    }
}
