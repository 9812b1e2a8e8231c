//! Tolerant string to number conversion for provider output.
//!
//! Both functions are total: anything that cannot be read as a number is 0.0.

pub fn to_float(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return 0.0;
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return value;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Reads a "value unit" pair such as `3 B/s`; the leading token is bytes/sec.
pub fn to_bandwidth(raw: &str) -> f64 {
    let magnitude = raw.split_whitespace().next().unwrap_or("");
    to_float(magnitude)
}
