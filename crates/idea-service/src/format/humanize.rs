//! Human readable numbers and durations for user-facing text

use chrono::{DateTime, Utc};

/// `1` -> `1st`, `12` -> `12th`, `23` -> `23rd`
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Thousands separated with commas, e.g. `1234567` -> `1,234,567`
pub fn comma(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Distance between `then` and `now` with a direction label, e.g. `3 hours after`
///
/// `after` is used when `then` lies before `now`.
pub fn relative(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const UNITS: [(i64, &str); 6] = [
        (365 * 24 * 60 * 60, "year"),
        (30 * 24 * 60 * 60, "month"),
        (7 * 24 * 60 * 60, "week"),
        (24 * 60 * 60, "day"),
        (60 * 60, "hour"),
        (60, "minute"),
    ];

    let label = if then <= now { "after" } else { "before" };
    let secs = (now - then).num_seconds().abs();

    if secs < 1 {
        return format!("moments {label}");
    }

    let (amount, unit) = UNITS
        .iter()
        .find(|(size, _)| secs >= *size)
        .map_or((secs, "second"), |(size, unit)| (secs / size, *unit));

    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} {label}")
}
