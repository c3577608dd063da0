//! Date and relative-time resolution for date filters
//!
//! Every failure path (missing timestamp, unparsable date, bad unit,
//! overflowing magnitude) resolves to "no match". Nothing here returns an
//! error to the caller.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use helpdesk_core::Record;
use regex::Regex;
use serde_json::Value;

use crate::query::FilterValue;
use crate::tokenizer::FieldOp;

/// Query field names interpreted by the date resolver.
pub const DATE_FIELDS: &[&str] = &["created", "updated", "due", "due_date", "solved"];

/// `<int><unit>` with an optional space between magnitude and unit.
static RELATIVE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(hours?|h|minutes?|mins?|days?|d|weeks?|w|months?|years?|y)$")
        .expect("relative time regex")
});

#[must_use]
pub fn is_date_field(field: &str) -> bool {
    DATE_FIELDS.contains(&field)
}

/// Record field holding the timestamp for a query field name.
#[must_use]
pub fn canonical_field(field: &str) -> &str {
    match field {
        "created" => "created_at",
        "updated" => "updated_at",
        "solved" => "solved_at",
        "due" | "due_date" => "due_at",
        other => other,
    }
}

/// Parse an ISO-8601 datetime or date. Naive values are taken as UTC and a
/// bare date is midnight.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a relative duration such as `4hours`, `2 days`, or `"1w"`.
///
/// Months are 30 days and years are 365 days.
#[must_use]
pub fn parse_relative(raw: &str) -> Option<TimeDelta> {
    let cleaned = raw.trim().trim_matches(|c: char| c == '"' || c == '\'').to_lowercase();
    let caps = RELATIVE_TIME.captures(&cleaned)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2)?.as_str() {
        "hour" | "hours" | "h" => TimeDelta::try_hours(amount),
        "minute" | "minutes" | "min" | "mins" => TimeDelta::try_minutes(amount),
        "day" | "days" | "d" => TimeDelta::try_days(amount),
        "week" | "weeks" | "w" => TimeDelta::try_weeks(amount),
        "month" | "months" => TimeDelta::try_days(amount.checked_mul(30)?),
        "year" | "years" | "y" => TimeDelta::try_days(amount.checked_mul(365)?),
        _ => None,
    }
}

/// Resolve a filter value to the instant it compares against.
#[must_use]
pub fn resolve_comparand(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(delta) = parse_relative(value) {
        return now.checked_sub_signed(delta);
    }
    parse_timestamp(value.trim_matches(|c: char| c == '"' || c == '\''))
}

/// Apply a comparison operator to two instants. `:` means "at or after".
#[must_use]
pub fn compare(lhs: DateTime<Utc>, op: FieldOp, rhs: DateTime<Utc>) -> bool {
    match op {
        FieldOp::Gt => lhs > rhs,
        FieldOp::Lt => lhs < rhs,
        FieldOp::Gte | FieldOp::Colon => lhs >= rhs,
        FieldOp::Lte => lhs <= rhs,
    }
}

/// Evaluate one date filter against a record.
#[must_use]
pub fn matches(field: &str, value: &FilterValue, record: &Record, now: DateTime<Utc>) -> bool {
    let Some(stamp) = record_timestamp(record, canonical_field(field)) else {
        return false;
    };
    let check = |op: FieldOp, target: &str| {
        resolve_comparand(target, now).is_some_and(|comparand| compare(stamp, op, comparand))
    };
    match value {
        FilterValue::Scalar(target) => check(FieldOp::Colon, target),
        FilterValue::List(targets) => targets.iter().any(|t| check(FieldOp::Colon, t)),
        FilterValue::Range { operator, value } => check(*operator, value),
        FilterValue::AnyOf(alternatives) => alternatives
            .iter()
            .any(|alternative| matches(field, alternative, record, now)),
    }
}

fn record_timestamp(record: &Record, field: &str) -> Option<DateTime<Utc>> {
    match record.get(field)? {
        Value::String(s) => parse_timestamp(s),
        _ => None,
    }
}
