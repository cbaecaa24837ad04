//! Size formatting and parsing: human-readable rendering for output, and
//! the unit-suffix grammar accepted by `--file-limit`/`--size-limit`.

use anyhow::{anyhow, Result};

/// Unit system for size formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    /// Binary units (1024-based): K, M, G, T, P, E, Z, Y
    Binary,
    /// SI units (1000-based): KB, MB, GB, TB, ...
    Si,
}

impl Default for UnitSystem {
    fn default() -> Self {
        UnitSystem::Binary
    }
}

const BINARY_UNITS: &[&str] = &["B", "K", "M", "G", "T", "P", "E", "Z", "Y"];
const SI_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a size in bytes to a human-readable string
///
/// Picks the largest unit whose multiplier is strictly less than the
/// value, and prints `precision` decimal places.
pub fn format_size(bytes: u64, unit_system: UnitSystem, precision: usize) -> String {
    let (base, units) = match unit_system {
        UnitSystem::Binary => (1024.0, BINARY_UNITS),
        UnitSystem::Si => (1000.0, SI_UNITS),
    };

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;
    while size >= base && unit_index < units.len() - 1 {
        size /= base;
        unit_index += 1;
    }

    // Use precision only for non-byte values
    if unit_index == 0 {
        format!("{} {}", bytes, units[unit_index])
    } else {
        format!("{:.prec$} {}", size, units[unit_index], prec = precision)
    }
}

/// Format a size in bytes with automatic precision adjustment.
/// Uses 1 decimal place for clarity.
pub fn format_size_auto(bytes: u64) -> String {
    format_size(bytes, UnitSystem::Binary, 1)
}

/// Engine-facing alias for [`format_size_auto`], used wherever the core
/// talks about `to_human` in its testable properties.
pub fn to_human(bytes: u64) -> String {
    format_size_auto(bytes)
}

/// Calculate percentage and format as string
pub fn format_percentage(part: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }

    let percentage = (part as f64 / total as f64) * 100.0;
    format!("{:>3.0}%", percentage)
}

/// Parses a human-formatted size such as `"4.5 G"` or `"512 B"` back into a
/// byte count, the inverse of [`to_human`].
pub fn from_human(s: &str) -> Result<u64> {
    parse_with_default_unit(s, "B")
}

/// Parses a CLI size/count argument per the grammar
/// `^([0-9]+(\.[0-9]+)?)([A-Za-z]+)?$`, defaulting to bytes when no suffix
/// is given.
pub fn parse_size_with_unit(s: &str) -> Result<u64> {
    parse_with_default_unit(s, "B")
}

fn parse_with_default_unit(s: &str, default_unit: &str) -> Result<u64> {
    let s = s.trim();
    let split_at = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (num_str, unit_str) = s.split_at(split_at);
    if num_str.is_empty() {
        return Err(anyhow!("invalid size `{s}`: missing numeric value"));
    }
    let number: f64 = num_str
        .parse()
        .map_err(|_| anyhow!("invalid size `{s}`: not a number"))?;
    let unit_str = unit_str.trim();
    let unit = if unit_str.is_empty() { default_unit } else { unit_str };
    let multiplier = unit_multiplier(unit)?;
    Ok((number * multiplier as f64).round() as u64)
}

fn unit_multiplier(unit: &str) -> Result<u64> {
    let normalized = unit.trim().to_ascii_uppercase();
    let letter = normalized
        .chars()
        .next()
        .ok_or_else(|| anyhow!("unknown size unit `{unit}`"))?;
    let exponent = match letter {
        'B' => 0,
        'K' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        'P' => 5,
        'E' => 6,
        'Z' => 7,
        'Y' => 8,
        _ => return Err(anyhow!("unknown size unit `{unit}`")),
    };
    Ok(1024u64.pow(exponent))
}
