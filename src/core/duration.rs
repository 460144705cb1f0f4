//! Age filter parsing for `--older-than`
//!
//! Accepts human-readable durations such as `60d`, `2w`, `1y` or compound
//! forms like `1w3d`, and truncates them to a whole number of days. A year
//! is always 365 days.

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// A year is a flat 365 days
const DAYS_PER_YEAR: u64 = 365;

const YEAR_UNITS: [&str; 5] = ["y", "yr", "yrs", "year", "years"];

/// At least one of these unit markers must appear in the input
const DAY_UNITS: [char; 3] = ['d', 'w', 'y'];

/// A strictly positive minimum object age, in whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OlderThan {
    days: u64,
}

impl OlderThan {
    /// Returns `None` for zero days
    pub fn from_days(days: u64) -> Option<Self> {
        (days > 0).then_some(Self { days })
    }

    pub fn days(self) -> u64 {
        self.days
    }

    /// Render as a Go-style duration string (`1440h0m0s` for 60 days),
    /// which is the form the server expects in the `older-than` query value.
    pub fn to_go_duration(self) -> String {
        format!("{}h0m0s", self.days * 24)
    }
}

impl fmt::Display for OlderThan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days)
    }
}

/// Errors produced while parsing an age filter
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum AgeFilterError {
    #[error("Unable to parse older-than=`{value}`: {reason}")]
    #[diagnostic(
        code(objctl::resync::older_than),
        help("use a day, week or year unit, e.g. 60d, 2w or 1y")
    )]
    Invalid { value: String, reason: String },

    #[error("older-than cannot be set to zero")]
    #[diagnostic(code(objctl::resync::older_than_zero))]
    Zero,

    #[error("older-than=`{value}` is shorter than one day")]
    #[diagnostic(
        code(objctl::resync::older_than_short),
        help("the filter is applied in whole days; use at least 1d")
    )]
    LessThanADay { value: String },
}

/// Parse an `--older-than` value.
///
/// An empty string means the flag carried no value and yields `Ok(None)`.
pub fn parse_older_than(value: &str) -> Result<Option<OlderThan>, AgeFilterError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: String| AgeFilterError::Invalid {
        value: value.to_string(),
        reason,
    };

    // Years are flat 365-day units; humantime only sees the other components
    let (years, rest) =
        split_years(value).ok_or_else(|| invalid("number is too large".to_string()))?;
    let rest = rest.trim();
    let rest_secs = if rest.is_empty() {
        0
    } else {
        humantime::parse_duration(rest)
            .map_err(|e| invalid(e.to_string()))?
            .as_secs()
    };
    let secs = years
        .checked_mul(DAYS_PER_YEAR * SECS_PER_DAY)
        .and_then(|years_secs| years_secs.checked_add(rest_secs))
        .ok_or_else(|| invalid("number is too large".to_string()))?;

    if !value.contains(DAY_UNITS) {
        return Err(AgeFilterError::Invalid {
            value: value.to_string(),
            reason: "no day, week or year unit".to_string(),
        });
    }

    if secs == 0 {
        return Err(AgeFilterError::Zero);
    }

    OlderThan::from_days(secs / SECS_PER_DAY)
        .map(Some)
        .ok_or_else(|| AgeFilterError::LessThanADay {
            value: value.to_string(),
        })
}

/// Pull the year components out of `value`.
///
/// Returns the summed year count and the input with those components
/// removed. `None` means the year count overflowed.
fn split_years(value: &str) -> Option<(u64, String)> {
    let mut years: u64 = 0;
    let mut rest = String::with_capacity(value.len());
    let mut chars = value.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if !c.is_ascii_digit() {
            rest.push(c);
            chars.next();
            continue;
        }

        let mut digits_end = start;
        while let Some(&(i, c)) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits_end = i + c.len_utf8();
            chars.next();
        }
        while chars.peek().is_some_and(|&(_, c)| c == ' ') {
            chars.next();
        }
        let unit_start = chars.peek().map_or(value.len(), |&(i, _)| i);
        let mut end = unit_start;
        while let Some(&(i, c)) = chars.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }

        if YEAR_UNITS.contains(&&value[unit_start..end]) {
            let count: u64 = value[start..digits_end].parse().ok()?;
            years = years.checked_add(count)?;
        } else {
            rest.push_str(&value[start..end]);
            rest.push(' ');
        }
    }

    Some((years, rest))
}
