//! Query language and search engine for the helpdesk simulator
//!
//! This crate turns a helpdesk-style query string into a ranked, paginated
//! result page:
//! - [`tokenizer`] / [`parser`] build a [`Query`] from the raw string
//! - [`matcher`] evaluates a query against ticket, user, organization, and
//!   group records, with [`wildcard`] and [`dates`] helpers
//! - [`sort`], [`paginate`], and [`side_load`] shape the response
//! - [`SearchEngine`] ties them together over any [`RecordSource`]

#![forbid(unsafe_code)]

pub mod dates;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod paginate;
pub mod parser;
pub mod query;
pub mod request;
pub mod results;
pub mod side_load;
pub mod sort;
pub mod tokenizer;
pub mod wildcard;

// Re-export key types
pub use engine::{RecordSource, SearchEngine};
pub use error::{SearchError, SearchResult};
pub use matcher::QueryMatcher;
pub use paginate::{PageWindow, RESULT_WINDOW};
pub use parser::{parse_query, parse_tokens};
pub use query::{FilterValue, Query};
pub use request::SearchRequest;
pub use results::{SearchHit, SearchResponse};
pub use side_load::{SideLoad, SideLoaded, parse_include};
pub use sort::{SortField, SortOrder};
pub use tokenizer::{FieldOp, Token, tokenize};
pub use wildcard::{PatternSet, wildcard_match};
