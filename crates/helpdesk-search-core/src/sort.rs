//! Result ordering

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates::parse_timestamp;
use crate::error::SearchError;
use crate::matcher::priority_rank;
use crate::results::SearchHit;

/// Fields a search may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Priority,
    Status,
    TicketType,
}

impl SortField {
    pub const ALL: [Self; 5] = [
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::Priority,
        Self::Status,
        Self::TicketType,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::TicketType => "ticket_type",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
                SearchError::InvalidValue(format!(
                    "sort_by must be one of: {}. Got: {s}",
                    allowed.join(", ")
                ))
            })
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(SearchError::InvalidValue(format!(
                "sort_order must be 'asc' or 'desc'. Got: {other}"
            ))),
        }
    }
}

/// Stable in-place sort of hits.
///
/// Timestamps that fail to parse sort as the earliest instant. On generic
/// fields a missing value sorts first in either direction.
pub fn sort_hits(hits: &mut [SearchHit], field: SortField, order: SortOrder) {
    match field {
        SortField::CreatedAt | SortField::UpdatedAt => {
            hits.sort_by(|a, b| {
                order.apply(timestamp_key(a, field).cmp(&timestamp_key(b, field)))
            });
        }
        SortField::Priority => {
            hits.sort_by(|a, b| order.apply(priority_key(a).cmp(&priority_key(b))));
        }
        SortField::Status | SortField::TicketType => {
            let name = field.as_str();
            hits.sort_by(|a, b| match (a.get(name), b.get(name)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => order.apply(compare_values(x, y)),
            });
        }
    }
}

fn timestamp_key(hit: &SearchHit, field: SortField) -> DateTime<Utc> {
    hit.get(field.as_str())
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn priority_key(hit: &SearchHit) -> u8 {
    priority_rank(hit.get("priority").and_then(Value::as_str).unwrap_or_default())
}

/// Ordering across JSON values: booleans, then numbers, then strings, then
/// anything else by its JSON text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    const fn type_rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}
