//! Search request model and argument validation
//!
//! Validation runs in two passes. Every parameter is type-checked first, so
//! a request with both a wrong type and a bad value reports the type error.
//! Value checks then run in the order page, per_page, result window,
//! sort_by, sort_order.

use helpdesk_core::json_type_name;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{SearchError, SearchResult};
use crate::paginate::{MAX_PER_PAGE, PageWindow};
use crate::side_load::{SideLoad, parse_include};
use crate::sort::{SortField, SortOrder};

const DEFAULT_PAGE: u32 = 1;

/// A validated search call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Raw query string
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    /// Direction; descending when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// 1-indexed page number
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<SideLoad>,
}

impl SearchRequest {
    /// Create a request for the first page with default settings
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sort_by: None,
            sort_order: None,
            page: DEFAULT_PAGE,
            per_page: MAX_PER_PAGE,
            include: Vec::new(),
        }
    }

    /// Set the sort field
    #[must_use]
    pub const fn with_sort(mut self, field: SortField) -> Self {
        self.sort_by = Some(field);
        self
    }

    /// Set the sort direction
    #[must_use]
    pub const fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Set the page number
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the related collections to side-load
    #[must_use]
    pub fn with_include(mut self, include: impl IntoIterator<Item = SideLoad>) -> Self {
        self.include = include.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.per_page)
    }

    /// Sort direction to apply, defaulting to descending.
    #[must_use]
    pub fn effective_sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }

    /// Check page bounds and the result window.
    pub fn validate(&self) -> SearchResult<()> {
        check_page(i64::from(self.page))?;
        check_per_page(i64::from(self.per_page))?;
        self.window().check_result_window()
    }

    /// Build a request from loosely-typed JSON tool arguments.
    pub fn from_json(args: &Value) -> SearchResult<Self> {
        let empty = Map::new();
        let args = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(SearchError::InvalidType {
                    param: "arguments",
                    expected: "an object",
                    got: json_type_name(other),
                });
            }
        };
        let arg = |name: &str| args.get(name).unwrap_or(&Value::Null);

        let query = required_string("query", arg("query"))?;
        let sort_by = optional_string("sort_by", arg("sort_by"))?;
        let sort_order = optional_string("sort_order", arg("sort_order"))?;
        let page = optional_integer("page", arg("page"))?;
        let per_page = optional_integer("per_page", arg("per_page"))?;
        let include = optional_string("include", arg("include"))?;

        let page = check_page(page.unwrap_or(i64::from(DEFAULT_PAGE)))?;
        let per_page = check_per_page(per_page.unwrap_or(i64::from(MAX_PER_PAGE)))?;
        PageWindow::new(page, per_page).check_result_window()?;
        let sort_by = sort_by.map(str::parse::<SortField>).transpose()?;
        let sort_order = sort_order.map(str::parse::<SortOrder>).transpose()?;

        Ok(Self {
            query: query.to_string(),
            sort_by,
            sort_order,
            page,
            per_page,
            include: include.map(parse_include).unwrap_or_default(),
        })
    }
}

fn check_page(page: i64) -> SearchResult<u32> {
    if page < 1 {
        return Err(SearchError::InvalidValue("page must be >= 1".to_string()));
    }
    // Anything past u32 is far beyond the result window anyway.
    Ok(u32::try_from(page).unwrap_or(u32::MAX))
}

fn check_per_page(per_page: i64) -> SearchResult<u32> {
    u32::try_from(per_page)
        .ok()
        .filter(|p| (1..=MAX_PER_PAGE).contains(p))
        .ok_or_else(|| {
            SearchError::InvalidValue(format!("per_page must be between 1 and {MAX_PER_PAGE}"))
        })
}

fn required_string<'a>(param: &'static str, value: &'a Value) -> SearchResult<&'a str> {
    value.as_str().ok_or(SearchError::InvalidType {
        param,
        expected: "a string",
        got: json_type_name(value),
    })
}

/// A string or null. Blank strings count as unset.
fn optional_string<'a>(param: &'static str, value: &'a Value) -> SearchResult<Option<&'a str>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.as_str())),
        other => Err(SearchError::InvalidType {
            param,
            expected: "a string or None",
            got: json_type_name(other),
        }),
    }
}

fn optional_integer(param: &'static str, value: &Value) -> SearchResult<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            Ok(Some(n.as_i64().unwrap_or(i64::MAX)))
        }
        other => Err(SearchError::InvalidType {
            param,
            expected: "an integer",
            got: json_type_name(other),
        }),
    }
}
