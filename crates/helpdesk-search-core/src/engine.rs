//! Search engine entry point
//!
//! The engine reads records through [`RecordSource`] so it does not depend
//! on how the store keeps them. A call never mutates the source.

use chrono::{DateTime, Utc};
use helpdesk_core::{Collections, Record, RecordKind};
use serde_json::Value;
use tracing::debug;

use crate::error::SearchResult;
use crate::matcher::QueryMatcher;
use crate::parser::parse_query;
use crate::request::SearchRequest;
use crate::results::{SearchHit, SearchResponse};
use crate::side_load::side_load;
use crate::sort::sort_hits;

/// Read-only access to the four record collections.
///
/// [`Collections`] is one implementation; callers holding records elsewhere
/// can provide their own.
pub trait RecordSource: Send + Sync {
    /// Records of one kind, in storage order.
    fn records(&self, kind: RecordKind) -> impl Iterator<Item = &Record> + '_;

    /// Fetch one record by id. Integer and string ids are interchangeable.
    fn lookup(&self, kind: RecordKind, id: &Value) -> Option<&Record>;
}

impl RecordSource for Collections {
    fn records(&self, kind: RecordKind) -> impl Iterator<Item = &Record> + '_ {
        Self::records(self, kind)
    }

    fn lookup(&self, kind: RecordKind, id: &Value) -> Option<&Record> {
        self.get(kind, id)
    }
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn records(&self, kind: RecordKind) -> impl Iterator<Item = &Record> + '_ {
        (**self).records(kind)
    }

    fn lookup(&self, kind: RecordKind, id: &Value) -> Option<&Record> {
        (**self).lookup(kind, id)
    }
}

/// Runs searches against a record source
#[derive(Debug, Clone)]
pub struct SearchEngine<S> {
    source: S,
}

impl<S: RecordSource> SearchEngine<S> {
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Validate loosely-typed JSON arguments and search.
    pub fn search_json(&self, args: &Value) -> SearchResult<SearchResponse> {
        let request = SearchRequest::from_json(args)?;
        self.search(&request)
    }

    /// Search relative to the current time.
    pub fn search(&self, request: &SearchRequest) -> SearchResult<SearchResponse> {
        self.search_at(request, Utc::now())
    }

    /// Search with relative-time filters resolved against `now`.
    pub fn search_at(
        &self,
        request: &SearchRequest,
        now: DateTime<Utc>,
    ) -> SearchResult<SearchResponse> {
        request.validate()?;
        let window = request.window();

        let query = parse_query(&request.query);
        let matcher = QueryMatcher::new(&query, now);
        let mut hits: Vec<SearchHit> = Vec::new();
        for kind in query.requested_kinds() {
            let before = hits.len();
            hits.extend(
                self.source
                    .records(kind)
                    .filter(|record| matcher.matches(kind, record))
                    .map(|record| SearchHit::from_record(kind, record)),
            );
            debug!(kind = %kind, matched = hits.len() - before, "matched records");
        }

        if let Some(field) = request.sort_by {
            sort_hits(&mut hits, field, request.effective_sort_order());
        }

        let count = hits.len();
        let results = window.slice(&hits).to_vec();
        let side_loaded = side_load(&request.include, &results, &self.source);
        debug!(
            count,
            page = window.page,
            per_page = window.per_page,
            returned = results.len(),
            "search complete"
        );

        Ok(SearchResponse {
            results,
            count,
            page: window.page,
            per_page: window.per_page,
            next_page: window.next_page(count),
            previous_page: window.previous_page(),
            side_loaded,
        })
    }
}
