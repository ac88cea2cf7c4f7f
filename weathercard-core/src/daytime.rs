//! Local-time helpers: parsing provider time strings, the night window and
//! the position of the "now" marker on the card's day timeline.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Smallest marker offset; anything earlier in the day sits at the left edge.
pub const PROGRESS_MIN: i32 = 0;
/// Marker offset at 23:59.
pub const PROGRESS_MAX: i32 = 830;

/// Parses `HH:MM`, tolerating the leading space providers put before
/// single-digit hours (`" 1:55"`).
pub fn parse_local_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Splits a `YYYY-MM-DD H:MM` local timestamp into its date and time.
pub fn parse_local_datetime(value: &str) -> Option<(NaiveDate, NaiveTime)> {
    let (date, time) = value.trim().split_once(' ')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = parse_local_time(time)?;
    Some((date, time))
}

/// Local times that are drawn with the moon instead of the reported condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWindow {
    /// Night starts at this time (inclusive).
    pub night: NaiveTime,
    /// Night lasts until this time (inclusive).
    pub dawn: NaiveTime,
}

impl NightWindow {
    pub fn new(night: NaiveTime, dawn: NaiveTime) -> Self {
        Self { night, dawn }
    }

    pub fn is_night(&self, time: NaiveTime) -> bool {
        time >= self.night || time <= self.dawn
    }
}

impl Default for NightWindow {
    fn default() -> Self {
        Self {
            night: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default(),
            dawn: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
        }
    }
}

/// Unclamped marker offset. Each three-hour block of the timeline is 133px
/// wide and the strip starts 232.5px into the day.
pub fn raw_daily_progress(time: NaiveTime) -> i32 {
    let minutes = time.hour() * 60 + time.minute();
    (f64::from(minutes) * 133.0 / 180.0 - 232.5) as i32
}

/// Marker offset clamped to `[PROGRESS_MIN, PROGRESS_MAX]`.
pub fn daily_progress(time: NaiveTime) -> i32 {
    raw_daily_progress(time).clamp(PROGRESS_MIN, PROGRESS_MAX)
}
