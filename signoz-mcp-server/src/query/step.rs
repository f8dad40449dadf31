//! Step interval parsing

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Resolved;

lazy_static! {
    static ref STEP_RE: Regex = Regex::new(r"^(\d+)([smhd])$").expect("step pattern");
}

/// Step used whenever none is given or it cannot be read
pub const DEFAULT_STEP_SECS: u64 = 60;

/// A step as it arrives in tool arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepArg {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for StepArg {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for StepArg {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

fn positive(n: i64) -> Option<u64> {
    u64::try_from(n).ok().filter(|n| *n > 0)
}

fn parse_text(text: &str) -> Option<u64> {
    let text = text.trim();
    if let Some(caps) = STEP_RE.captures(text) {
        let n: u64 = caps[1].parse().ok()?;
        let factor = match &caps[2] {
            "s" => 1,
            "m" => 60,
            "h" => 3_600,
            "d" => 86_400,
            _ => return None,
        };
        return n.checked_mul(factor).filter(|secs| *secs > 0);
    }
    positive(text.parse().ok()?)
}

/// Step in seconds; anything unreadable yields [`DEFAULT_STEP_SECS`]
pub fn parse_step(step: Option<&StepArg>) -> Resolved<u64> {
    let parsed = match step {
        None => return Resolved::defaulted(DEFAULT_STEP_SECS, "no step given"),
        Some(StepArg::Int(n)) => positive(*n),
        Some(StepArg::Float(f)) if f.fract() == 0.0 && *f >= 1.0 && *f <= u32::MAX as f64 => Some(*f as u64),
        Some(StepArg::Float(_)) => None,
        Some(StepArg::Text(text)) => parse_text(text),
    };

    match parsed {
        Some(secs) => Resolved::Parsed(secs),
        None => {
            warn!(?step, "could not parse step, using default");
            Resolved::defaulted(DEFAULT_STEP_SECS, format!("unreadable step {step:?}"))
        }
    }
}
