//! Search response model
//!
//! [`SearchResponse`] is the output of [`crate::SearchEngine::search`]. Each
//! result is a [`SearchHit`]: the stored record's fields plus `result_type`
//! and a canonical `url`.

use helpdesk_core::{Record, RecordKind, record_id};
use serde::Serialize;
use serde_json::Value;

use crate::side_load::SideLoaded;

/// A matched record, shaped for the response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(skip)]
    pub kind: RecordKind,
    #[serde(flatten)]
    pub fields: Record,
}

impl SearchHit {
    /// Copy a stored record into a hit.
    ///
    /// Adds `result_type`, a `url` when the record has none, `ticket_type`
    /// mirrored from `type` on tickets, and `id` mirrored from `user_id` on
    /// users.
    #[must_use]
    pub fn from_record(kind: RecordKind, record: &Record) -> Self {
        let mut fields = with_url(kind, record);
        match kind {
            RecordKind::Ticket => {
                if !fields.contains_key("ticket_type")
                    && let Some(ticket_type) = record.get("type").cloned()
                {
                    fields.insert("ticket_type".to_string(), ticket_type);
                }
            }
            RecordKind::User => {
                if fields.get("id").is_none_or(Value::is_null)
                    && let Some(user_id) = record.get("user_id").cloned()
                {
                    fields.insert("id".to_string(), user_id);
                }
            }
            RecordKind::Organization | RecordKind::Group => {}
        }
        fields.insert(
            "result_type".to_string(),
            Value::String(kind.as_str().to_string()),
        );
        Self { kind, fields }
    }

    /// A field value, treating explicit null as absent.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        record_id(self.kind, &self.fields)
    }
}

/// Clone a record, adding its canonical `url` if it has an id and no url.
#[must_use]
pub fn with_url(kind: RecordKind, record: &Record) -> Record {
    let mut fields = record.clone();
    if !fields.contains_key("url")
        && let Some(id) = record_id(kind, record)
    {
        let url = kind.url_for(id);
        fields.insert("url".to_string(), Value::String(url));
    }
    fields
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    /// Total matches before pagination.
    pub count: usize,
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<u32>,
    #[serde(flatten)]
    pub side_loaded: SideLoaded,
}

impl SearchResponse {
    /// Ids of the hits on this page, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&Value> {
        self.results.iter().filter_map(SearchHit::id).collect()
    }
}
