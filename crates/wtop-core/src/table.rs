//! Minimal reader for the stats provider's tabular (CSV) stream.

use crate::metric::{MetricName, MetricSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    headers: &'a [String],
    fields: &'a [String],
}

impl StatsTable {
    /// Parses a header row followed by data rows. A payload with fewer than
    /// two lines has no data and yields an empty table.
    pub fn parse(payload: &str) -> Self {
        let lines: Vec<&str> = payload
            .trim()
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        if lines.len() < 2 {
            return Self::default();
        }

        let headers: Vec<String> = split_line(lines[0].trim_start_matches('\u{feff}'))
            .into_iter()
            .map(|header| header.trim().to_string())
            .collect();

        let records = lines[1..]
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut fields = split_line(line);
                if fields.len() < headers.len() {
                    fields.resize(headers.len(), String::new());
                }
                fields
            })
            .collect();

        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.records.iter().map(|fields| Record {
            headers: &self.headers,
            fields,
        })
    }
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|header| header == column)?;
        self.fields.get(idx).map(|value| value.trim())
    }

    /// First non-empty value among several candidate column names.
    pub fn first_of(&self, columns: &[&str]) -> Option<&'a str> {
        columns
            .iter()
            .filter_map(|column| self.get(column))
            .find(|value| !value.is_empty())
    }

    /// Every catalog metric, coerced; absent columns read as 0.0.
    pub fn metrics(&self) -> MetricSet {
        let mut metrics = MetricSet::new();
        for metric in MetricName::ALL {
            if let Some(raw) = self.get(metric.header()) {
                metrics.set(metric, metric.coerce(raw));
            }
        }
        metrics
    }
}

fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
