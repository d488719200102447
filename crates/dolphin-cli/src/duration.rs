//! Interval parsing and formatting.
//!
//! Accepts Go-style durations (`3s`, `1m30s`, `500ms`, `1.5h`) and bare
//! integers, which are read as seconds. Negative values clamp to zero.

use std::fmt::Write;
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Parse an `--interval` value.
///
/// # Errors
///
/// Returns a message suitable for clap if the value is not a duration.
pub fn parse_interval(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let (negative, body) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    if body.is_empty() {
        return Err(format!("invalid duration {value:?}"));
    }

    let duration = if body.bytes().all(|b| b.is_ascii_digit()) {
        let secs: u64 = body
            .parse()
            .map_err(|_| format!("invalid duration {value:?}"))?;
        Duration::from_secs(secs)
    } else {
        parse_units(body).map_err(|e| format!("invalid duration {value:?}: {e}"))?
    };

    Ok(if negative { Duration::ZERO } else { duration })
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn parse_units(mut rest: &str) -> Result<Duration, String> {
    let mut total = Duration::ZERO;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("expected a number before {rest:?}"));
        }
        let (number, tail) = rest.split_at(number_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(format!("missing unit after {number}"));
        }
        let scale = unit_nanos(unit).ok_or_else(|| format!("unknown unit {unit:?}"))?;

        let part = if number.contains('.') {
            let value: f64 = number
                .parse()
                .map_err(|_| format!("invalid number {number:?}"))?;
            #[allow(clippy::cast_precision_loss)]
            let secs = value * scale as f64 / NANOS_PER_SEC as f64;
            Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())?
        } else {
            let value: u64 = number
                .parse()
                .map_err(|_| format!("invalid number {number:?}"))?;
            let nanos = value
                .checked_mul(scale)
                .ok_or_else(|| "duration out of range".to_string())?;
            Duration::from_nanos(nanos)
        };

        total = total
            .checked_add(part)
            .ok_or_else(|| "duration out of range".to_string())?;
        rest = tail;
    }

    Ok(total)
}

/// Format an interval the way it was most likely typed, e.g. `1m30s`.
#[must_use]
pub fn format_interval(interval: Duration) -> String {
    if interval.is_zero() {
        return "0s".to_string();
    }
    if interval < Duration::from_micros(1) {
        return format!("{}ns", interval.as_nanos());
    }
    if interval < Duration::from_millis(1) {
        return format!("{}µs", trim_fraction(interval.as_nanos(), 1_000));
    }
    if interval < Duration::from_secs(1) {
        return format!("{}ms", trim_fraction(interval.as_nanos(), 1_000_000));
    }

    let secs = interval.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);
    let millis = interval.subsec_millis();

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    if millis > 0 {
        let fraction = format!("{millis:03}");
        let _ = write!(out, "{seconds}.{}s", fraction.trim_end_matches('0'));
    } else {
        let _ = write!(out, "{seconds}s");
    }
    out
}

/// `value / unit` with the remainder as a decimal fraction, trailing zeros dropped.
fn trim_fraction(value: u128, unit: u128) -> String {
    let (whole, rest) = (value / unit, value % unit);
    if rest == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let fraction = format!("{rest:0width$}");
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}
