//! Plain text rendering helpers and `--format json` output

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::hub::Listing;
use crate::model::arg::OutputFormat;

const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

/// Decimal size with one fractional digit, `123B`, `4.2MB`
pub fn size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}{}", bytes, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

pub fn time(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "never".to_string(),
    }
}

/// Coarse duration, `6 hours`, `1 minute`, `45 seconds`
pub fn duration(secs: i64) -> String {
    let (value, unit) = match secs {
        s if s >= 86_400 && s % 86_400 == 0 => (s / 86_400, "day"),
        s if s >= 3_600 => (s / 3_600, "hour"),
        s if s >= 60 => (s / 60, "minute"),
        s => (s, "second"),
    };
    if value == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", value, unit)
    }
}

pub fn active(is_active: bool) -> &'static str {
    if is_active { "active" } else { "inactive" }
}

/// Footer printed under a listing that stopped after the first page
pub fn partial_footer<T>(listing: &Listing<T>, what: &str) -> Option<String> {
    listing.is_partial().then(|| {
        format!(
            "{}/{} listed, use --all flag to show all {}",
            listing.items.len(),
            listing.total,
            what
        )
    })
}

/// Render `value` as indented JSON, or as text through `text`
pub fn output<T>(format: Option<OutputFormat>, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<String>
where
    T: Serialize + ?Sized,
{
    match format {
        None => Ok(text(value)),
        Some(OutputFormat::Json) => {
            let mut json = serde_json::to_string_pretty(value).context("Failed to encode JSON output")?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Plan limit, `9999` is how the billing API spells unlimited
pub fn limit(value: u64) -> String {
    if value == UNLIMITED {
        "unlimited".to_string()
    } else {
        value.to_string()
    }
}

const UNLIMITED: u64 = 9999;
