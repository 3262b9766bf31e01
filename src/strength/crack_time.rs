//! Illustrative brute-force crack-time estimate.
//!
//! The keyspace is `pool_size ^ length`, where the pool is the sum of
//! the sizes of the character classes present. An exact match against
//! the common-password list shrinks the keyspace to the list size. The
//! attacker is assumed to need half the keyspace on average at
//! [`GUESSES_PER_SECOND`]. Arithmetic is done in log10 space so very long
//! inputs cannot overflow.

use serde::{Deserialize, Serialize};

/// Assumed attacker speed: one billion guesses per second (offline
/// attack against a fast hash on a single modern GPU).
pub const GUESSES_PER_SECOND: f64 = 1_000_000_000.0;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;
const MONTH: f64 = 30.0 * DAY;
const YEAR: f64 = 365.0 * DAY;
const CENTURY: f64 = 100.0 * YEAR;

/// Human-readable crack-time estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackTime {
    pub time: String,
}

/// log10 of the number of seconds needed to search half the keyspace.
pub fn log10_seconds(log10_keyspace: f64) -> f64 {
    log10_keyspace - 2f64.log10() - GUESSES_PER_SECOND.log10()
}

/// Estimate the crack time for a keyspace given as log10.
pub fn estimate(log10_keyspace: f64) -> CrackTime {
    CrackTime {
        time: display_seconds(log10_seconds(log10_keyspace)),
    }
}

fn plural(value: f64, unit: &str) -> String {
    let rounded = value.round().max(1.0) as u64;
    if rounded == 1 {
        format!("1 {unit}")
    } else {
        format!("{rounded} {unit}s")
    }
}

fn display_seconds(log10_secs: f64) -> String {
    if log10_secs >= CENTURY.log10() {
        return "centuries".to_string();
    }

    let secs = 10f64.powf(log10_secs);
    if secs < 1.0 {
        "less than a second".to_string()
    } else if secs < MINUTE {
        plural(secs, "second")
    } else if secs < HOUR {
        plural(secs / MINUTE, "minute")
    } else if secs < DAY {
        plural(secs / HOUR, "hour")
    } else if secs < WEEK {
        plural(secs / DAY, "day")
    } else if secs < MONTH {
        plural(secs / WEEK, "week")
    } else if secs < YEAR {
        plural(secs / MONTH, "month")
    } else {
        plural(secs / YEAR, "year")
    }
}
