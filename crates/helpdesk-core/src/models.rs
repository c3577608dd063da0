//! Record model for the simulated helpdesk store
//!
//! Records are loosely-typed field maps. The store owns them; the search
//! engine only reads them for the duration of one call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored entity: field name to scalar, list, or null.
///
/// Field order is preserved so that search hits echo records back in the
/// order they were stored.
pub type Record = serde_json::Map<String, Value>;

/// The four entity kinds the store exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Ticket,
    User,
    Organization,
    Group,
}

impl RecordKind {
    /// Every kind, in the order result sets are concatenated.
    pub const ALL: [Self; 4] = [Self::Ticket, Self::User, Self::Organization, Self::Group];

    /// Singular name (`ticket`, `user`, ...), as used by `result_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::User => "user",
            Self::Organization => "organization",
            Self::Group => "group",
        }
    }

    /// Plural collection name (`tickets`, `users`, ...).
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Ticket => "tickets",
            Self::User => "users",
            Self::Organization => "organizations",
            Self::Group => "groups",
        }
    }

    /// Resolve a plural collection name back to its kind.
    #[must_use]
    pub fn from_collection(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.collection() == name)
    }

    /// Canonical API path for a record of this kind.
    #[must_use]
    pub fn url_for(self, id: &Value) -> String {
        let id = id_key(id).unwrap_or_default();
        format!("/api/v2/{}/{id}.json", self.collection())
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`RecordKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown record kind: {0}")]
pub struct UnknownKind(pub String);

impl std::str::FromStr for RecordKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ticket" => Ok(Self::Ticket),
            "user" => Ok(Self::User),
            "organization" => Ok(Self::Organization),
            "group" => Ok(Self::Group),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// The id of a record, honouring the `user_id` alias on user records.
#[must_use]
pub fn record_id(kind: RecordKind, record: &Record) -> Option<&Value> {
    let primary = record.get("id").filter(|v| !v.is_null());
    match kind {
        RecordKind::User => primary.or_else(|| record.get("user_id").filter(|v| !v.is_null())),
        _ => primary,
    }
}

/// Normalize an id value into the string key collections are indexed by.
///
/// Integers and non-empty strings are valid ids; everything else is not.
#[must_use]
pub fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}
