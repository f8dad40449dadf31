//! Time window resolution
//!
//! Accepts absolute timestamps (RFC 3339, a few naive forms assumed to be
//! UTC, or epoch seconds/milliseconds), `now` and `now-<N><s|m|h|d>`, plus
//! durations like `2h`, `90m` or bare minutes. Bad input never fails a
//! tool call; it degrades to the default lookback window.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::builder::to_epoch_millis;
use super::Resolved;

lazy_static! {
    static ref RELATIVE_RE: Regex = Regex::new(r"^now-(\d+)([smhd])$").expect("relative time pattern");
    static ref DURATION_RE: Regex = Regex::new(r"^(\d+)([hm])$").expect("duration pattern");
}

/// Default lookback for query tools
pub const DEFAULT_LOOKBACK_HOURS: i64 = 3;

/// Default lookback for the services listing
pub const SERVICES_LOOKBACK_HOURS: i64 = 24;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

/// A concrete UTC window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// `[end - span, end]`
    pub fn ending_at(end: DateTime<Utc>, span: TimeDelta) -> Self {
        Self {
            start: end.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC),
            end,
        }
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    pub fn start_ns(&self) -> i64 {
        self.start.timestamp_micros().saturating_mul(1_000)
    }

    pub fn end_ns(&self) -> i64 {
        self.end.timestamp_micros().saturating_mul(1_000)
    }
}

fn unit_delta(amount: &str, unit: &str) -> Option<TimeDelta> {
    let n: i64 = amount.parse().ok()?;
    match unit {
        "s" => TimeDelta::try_seconds(n),
        "m" => TimeDelta::try_minutes(n),
        "h" => TimeDelta::try_hours(n),
        "d" => TimeDelta::try_days(n),
        _ => None,
    }
}

/// Parse one time expression relative to `now`
pub fn parse_time(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    let lowered = text.to_ascii_lowercase();
    if lowered == "now" {
        return Some(now);
    }
    if lowered.starts_with("now") {
        let caps = RELATIVE_RE.captures(&lowered)?;
        let delta = unit_delta(&caps[1], &caps[2])?;
        return now.checked_sub_signed(delta);
    }

    parse_absolute(text)
}

fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    if text.bytes().all(|b| b.is_ascii_digit()) {
        let raw: f64 = text.parse().ok()?;
        return DateTime::from_timestamp_millis(to_epoch_millis(raw));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse `<N>h`, `<N>m` or bare minutes
pub fn parse_duration(input: &str) -> Option<TimeDelta> {
    let text = input.trim().to_ascii_lowercase();

    if let Some(caps) = DURATION_RE.captures(&text) {
        return unit_delta(&caps[1], &caps[2]);
    }

    let minutes: i64 = text.parse().ok()?;
    if minutes < 0 {
        return None;
    }
    TimeDelta::try_minutes(minutes)
}

/// Resolve the window for a tool call
///
/// Precedence: `start` and `end` together, then `duration` ending now,
/// then `default_lookback` ending now.
pub fn resolve_time_range(
    start: Option<&str>,
    end: Option<&str>,
    duration: Option<&str>,
    default_lookback: TimeDelta,
    now: DateTime<Utc>,
) -> Resolved<TimeRange> {
    fn present(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|s| !s.is_empty())
    }
    let (start, end, duration) = (present(start), present(end), present(duration));

    let mut reason = None;
    match (start, end) {
        (Some(s), Some(e)) => match (parse_time(s, now), parse_time(e, now)) {
            (Some(start), Some(end)) => {
                if start > end {
                    warn!(start = s, end = e, "time range start is after end");
                }
                debug!(%start, %end, "parsed explicit time range");
                return Resolved::Parsed(TimeRange { start, end });
            }
            _ => {
                warn!(start = s, end = e, "could not parse time range");
                reason = Some(format!("could not parse start '{s}' or end '{e}'"));
            }
        },
        (Some(_), None) | (None, Some(_)) => {
            warn!("start_time and end_time must be given together, ignoring");
            reason = Some("only one of start_time/end_time given".to_string());
        }
        (None, None) => {}
    }

    if let Some(d) = duration {
        match parse_duration(d) {
            Some(span) => {
                let range = TimeRange::ending_at(now, span);
                return match reason {
                    None => Resolved::Parsed(range),
                    Some(reason) => Resolved::defaulted(range, reason),
                };
            }
            None => {
                warn!(duration = d, "could not parse duration");
                reason = Some(format!("could not parse duration '{d}'"));
            }
        }
    }

    Resolved::defaulted(
        TimeRange::ending_at(now, default_lookback),
        reason.unwrap_or_else(|| "no time range given".to_string()),
    )
}
