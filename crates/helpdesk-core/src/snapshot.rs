//! In-memory snapshot of the simulated helpdesk store
//!
//! A fixture is a JSON object with up to four top-level collections
//! (`tickets`, `users`, `organizations`, `groups`). Each collection may be
//! either an object keyed by id or a plain array of records.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Record, RecordKind, id_key, record_id};

/// All four collections, each in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    tickets: IndexMap<String, Record>,
    users: IndexMap<String, Record>,
    organizations: IndexMap<String, Record>,
    groups: IndexMap<String, Record>,
}

impl Collections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a fixture document.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(root) = value else {
            return Err(Error::InvalidFixture(
                "top-level fixture must be a JSON object".to_string(),
            ));
        };

        let mut collections = Self::new();
        for (name, body) in root {
            let Some(kind) = RecordKind::from_collection(&name) else {
                tracing::debug!(collection = %name, "ignoring unknown fixture collection");
                continue;
            };
            match body {
                Value::Object(keyed) => {
                    for (key, record) in keyed {
                        let record = into_record(kind, record)?;
                        let id = record_id(kind, &record)
                            .and_then(id_key)
                            .unwrap_or(key);
                        collections.map_mut(kind).insert(id, record);
                    }
                }
                Value::Array(items) => {
                    for record in items {
                        collections.insert(kind, into_record(kind, record)?)?;
                    }
                }
                Value::Null => {}
                other => {
                    return Err(Error::InvalidFixture(format!(
                        "collection '{name}' must be an object or array, got {}",
                        json_type_name(&other)
                    )));
                }
            }
        }

        tracing::debug!(
            tickets = collections.tickets.len(),
            users = collections.users.len(),
            organizations = collections.organizations.len(),
            groups = collections.groups.len(),
            "loaded helpdesk snapshot"
        );
        Ok(collections)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(contents)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Insert or replace a record, keyed by its id.
    pub fn insert(&mut self, kind: RecordKind, record: Record) -> Result<()> {
        let id = record_id(kind, &record)
            .and_then(id_key)
            .ok_or_else(|| Error::MissingId(kind.collection().to_string()))?;
        self.map_mut(kind).insert(id, record);
        Ok(())
    }

    /// Look up a record by id. Integer and string ids address the same record.
    #[must_use]
    pub fn get(&self, kind: RecordKind, id: &Value) -> Option<&Record> {
        let key = id_key(id)?;
        self.map(kind).get(&key)
    }

    /// Records of one kind, in insertion order.
    pub fn records(&self, kind: RecordKind) -> impl Iterator<Item = &Record> + '_ {
        self.map(kind).values()
    }

    #[must_use]
    pub fn len(&self, kind: RecordKind) -> usize {
        self.map(kind).len()
    }

    #[must_use]
    pub fn total_len(&self) -> usize {
        RecordKind::ALL.iter().map(|kind| self.len(*kind)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    const fn map(&self, kind: RecordKind) -> &IndexMap<String, Record> {
        match kind {
            RecordKind::Ticket => &self.tickets,
            RecordKind::User => &self.users,
            RecordKind::Organization => &self.organizations,
            RecordKind::Group => &self.groups,
        }
    }

    const fn map_mut(&mut self, kind: RecordKind) -> &mut IndexMap<String, Record> {
        match kind {
            RecordKind::Ticket => &mut self.tickets,
            RecordKind::User => &mut self.users,
            RecordKind::Organization => &mut self.organizations,
            RecordKind::Group => &mut self.groups,
        }
    }
}

fn into_record(kind: RecordKind, value: Value) -> Result<Record> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(Error::InvalidFixture(format!(
            "record in '{}' must be an object, got {}",
            kind.collection(),
            json_type_name(&other)
        ))),
    }
}

/// JSON type name of a value, as used in error messages.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
