//! Per-entity record matchers
//!
//! A record matches a [`Query`] when all of these hold:
//! 1. every text term is found in one of the kind's searchable fields
//! 2. no negated term is found
//! 3. every filter passes and no negated filter passes
//! 4. every date filter passes
//!
//! List filter values pass when any element passes, so a negated list
//! filter inverts the whole OR rather than each element.

use chrono::{DateTime, Utc};
use helpdesk_core::{Record, RecordKind};
use serde_json::Value;

use crate::dates;
use crate::query::{FilterValue, Query};
use crate::tokenizer::FieldOp;
use crate::wildcard::PatternSet;

/// Alias for the current agent; there is no session, so it is always user 1.
const CURRENT_USER_ID: i64 = 1;

/// Ordinal rank of a priority name. Unknown names rank as `normal`.
#[must_use]
pub fn priority_rank(priority: &str) -> u8 {
    match priority.trim().to_lowercase().as_str() {
        "low" => 1,
        "high" => 3,
        "urgent" => 4,
        _ => 2,
    }
}

/// Evaluate `query` against one record of the given kind.
///
/// Compiles the query's patterns on every call; use [`QueryMatcher`] to
/// test many records.
#[must_use]
pub fn matches(kind: RecordKind, record: &Record, query: &Query, now: DateTime<Utc>) -> bool {
    QueryMatcher::new(query, now).matches(kind, record)
}

/// A query prepared for matching many records
#[derive(Debug)]
pub struct QueryMatcher<'q> {
    query: &'q Query,
    patterns: PatternSet,
    now: DateTime<Utc>,
}

impl<'q> QueryMatcher<'q> {
    /// Compile the wildcard patterns of `query` once.
    #[must_use]
    pub fn new(query: &'q Query, now: DateTime<Utc>) -> Self {
        let mut lowered: Vec<String> = query
            .text_terms
            .iter()
            .chain(&query.negated_terms)
            .map(|term| term.to_lowercase())
            .collect();
        lowered.extend(
            query
                .filters
                .values()
                .chain(query.negated_filters.values())
                .flat_map(FilterValue::values)
                .map(str::to_lowercase),
        );
        let patterns = PatternSet::new(lowered.iter().map(String::as_str));
        Self {
            query,
            patterns,
            now,
        }
    }

    /// Evaluate the query against one record of the given kind.
    #[must_use]
    pub fn matches(&self, kind: RecordKind, record: &Record) -> bool {
        let query = self.query;
        query
            .text_terms
            .iter()
            .all(|term| self.text_matches(kind, term, record))
            && !query
                .negated_terms
                .iter()
                .any(|term| self.text_matches(kind, term, record))
            && query
                .filters
                .iter()
                .all(|(field, value)| self.filter_matches(kind, field, value, record))
            && !query
                .negated_filters
                .iter()
                .any(|(field, value)| self.filter_matches(kind, field, value, record))
            && query
                .date_filters
                .iter()
                .all(|(field, value)| dates::matches(field, value, record, self.now))
    }

    /// Free-text term test: substring, or anchored glob when the term has a `*`.
    #[must_use]
    pub fn text_matches(&self, kind: RecordKind, term: &str, record: &Record) -> bool {
        let term = term.to_lowercase();
        let in_fields = searchable_fields(kind).iter().any(|field| {
            record
                .get(*field)
                .and_then(value_text)
                .is_some_and(|text| self.patterns.contains_match(&term, &text.to_lowercase()))
        });
        if in_fields || !has_searchable_tags(kind) {
            return in_fields;
        }

        let tags = tag_list(record);
        if term.contains('*') {
            tags.iter()
                .any(|tag| self.patterns.wildcard_match(&term, tag))
        } else {
            tags.join(" ").contains(&term)
        }
    }

    /// Evaluate one filter entry, dispatching by value shape and field name.
    #[must_use]
    pub fn filter_matches(
        &self,
        kind: RecordKind,
        field: &str,
        value: &FilterValue,
        record: &Record,
    ) -> bool {
        if dates::is_date_field(field) {
            return dates::matches(field, value, record, self.now);
        }
        let fields = FieldMatcher {
            patterns: &self.patterns,
            record,
        };
        match value {
            FilterValue::Scalar(v) => fields.matches(kind, field, v),
            FilterValue::List(values) => values.iter().any(|v| fields.matches(kind, field, v)),
            FilterValue::Range { operator, value } => {
                compare_relational(record.get(field), *operator, value)
            }
            FilterValue::AnyOf(alternatives) => alternatives
                .iter()
                .any(|alternative| self.filter_matches(kind, field, alternative, record)),
        }
    }
}

/// Fields consulted by free-text terms, tags aside.
const fn searchable_fields(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Ticket => &["subject", "description", "status", "priority"],
        RecordKind::User => &["name", "email", "role", "notes", "details"],
        RecordKind::Organization => &["name", "details", "notes"],
        RecordKind::Group => &["name", "description"],
    }
}

const fn has_searchable_tags(kind: RecordKind) -> bool {
    !matches!(kind, RecordKind::Group)
}

/// Scalar filter values tested against one record
struct FieldMatcher<'a> {
    patterns: &'a PatternSet,
    record: &'a Record,
}

impl FieldMatcher<'_> {
    fn matches(&self, kind: RecordKind, field: &str, value: &str) -> bool {
        match kind {
            RecordKind::Ticket => self.ticket(field, value),
            RecordKind::User => self.user(field, value),
            RecordKind::Organization => self.organization(field, value),
            RecordKind::Group => self.group(field, value),
        }
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    fn ticket(&self, field: &str, value: &str) -> bool {
        match field {
            "status" => self.exact(self.get("status"), value),
            "ticket_type" => self.exact(self.get("type").or_else(|| self.get("ticket_type")), value),
            "priority" => {
                let actual = self.get("priority").and_then(value_text).unwrap_or_default();
                priority_rank(&actual) >= priority_rank(value)
            }
            "assignee" => id_matches(value, self.get("assignee_id"), true),
            "requester" => id_matches(value, self.get("requester_id"), true),
            "organization" => id_matches(value, self.get("organization_id"), false),
            "group" => id_matches(value, self.get("group_id"), false),
            "tags" => self.tags(value),
            "subject" | "description" => self.substring(self.get(field), value),
            _ => self.exact(self.get(field), value),
        }
    }

    fn user(&self, field: &str, value: &str) -> bool {
        match field {
            "role" => self.exact(self.get("role"), value),
            "email" | "name" => self.substring(self.get(field), value),
            "organization" => id_matches(value, self.get("organization_id"), false),
            "tags" => self.tags(value),
            "verified" => flag(self.get("verified"), false) == value.eq_ignore_ascii_case("true"),
            "active" => flag(self.get("active"), true) == value.eq_ignore_ascii_case("true"),
            _ => self.exact(self.get(field), value),
        }
    }

    fn organization(&self, field: &str, value: &str) -> bool {
        match field {
            "name" => self.substring(self.get("name"), value),
            "tags" => self.tags(value),
            _ => self.exact(self.get(field), value),
        }
    }

    fn group(&self, field: &str, value: &str) -> bool {
        match field {
            "name" => self.substring(self.get("name"), value),
            _ => self.exact(self.get(field), value),
        }
    }

    /// Case-insensitive equality, with `*` globbing. Absent or null is `""`.
    fn exact(&self, actual: Option<&Value>, value: &str) -> bool {
        let actual = actual.and_then(value_text).unwrap_or_default();
        self.patterns
            .wildcard_match(&value.to_lowercase(), &actual.to_lowercase())
    }

    /// Case-insensitive containment, with `*` globbing.
    fn substring(&self, actual: Option<&Value>, value: &str) -> bool {
        let actual = actual.and_then(value_text).unwrap_or_default();
        self.patterns
            .contains_match(&value.to_lowercase(), &actual.to_lowercase())
    }

    /// Tag membership. `none` matches an empty or missing tag list.
    fn tags(&self, value: &str) -> bool {
        let tags = tag_list(self.record);
        if value == "none" {
            return tags.is_empty();
        }
        let value = value.to_lowercase();
        tags.iter()
            .any(|tag| self.patterns.wildcard_match(&value, tag))
    }
}

fn flag(actual: Option<&Value>, default: bool) -> bool {
    actual.and_then(Value::as_bool).unwrap_or(default)
}

/// Foreign-key filter. `none` matches a missing id; `me` is the current user.
fn id_matches(value: &str, id: Option<&Value>, allow_me: bool) -> bool {
    let id = id.filter(|v| !v.is_null());
    if value == "none" {
        return id.is_none();
    }
    let Some(id) = id else {
        return false;
    };
    if allow_me && value == "me" {
        return id.as_i64() == Some(CURRENT_USER_ID)
            || id.as_str().is_some_and(|s| s.trim() == CURRENT_USER_ID.to_string());
    }
    value_text(id).is_some_and(|text| text == value)
}

/// Lowercased tags of a record.
fn tag_list(record: &Record) -> Vec<String> {
    match record.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_text)
            .map(|tag| tag.to_lowercase())
            .collect(),
        Some(Value::String(single)) if !single.is_empty() => vec![single.to_lowercase()],
        _ => Vec::new(),
    }
}

/// Relational comparison for non-date fields: instants first, then numbers.
fn compare_relational(actual: Option<&Value>, op: FieldOp, target: &str) -> bool {
    let Some(actual) = actual.and_then(value_text) else {
        return false;
    };
    if op == FieldOp::Colon {
        return actual.to_lowercase() == target.to_lowercase();
    }
    if let (Some(lhs), Some(rhs)) = (
        dates::parse_timestamp(&actual),
        dates::parse_timestamp(target),
    ) {
        return dates::compare(lhs, op, rhs);
    }
    match (actual.trim().parse::<f64>(), target.trim().parse::<f64>()) {
        (Ok(lhs), Ok(rhs)) => match op {
            FieldOp::Gt => lhs > rhs,
            FieldOp::Lt => lhs < rhs,
            FieldOp::Gte => lhs >= rhs,
            FieldOp::Lte => lhs <= rhs,
            FieldOp::Colon => false,
        },
        _ => false,
    }
}

/// Text rendering of a field value. Null renders as nothing; lists are
/// space-joined.
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_text)
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn rec(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn hit(kind: RecordKind, record: &Record, query: &str) -> bool {
        matches(kind, record, &Query::parse(query), now())
    }

    fn ticket() -> Record {
        rec(json!({
            "id": 7,
            "subject": "Printer on fire",
            "description": "Smoke coming from tray 2",
            "status": "open",
            "priority": "high",
            "type": "incident",
            "assignee_id": 1,
            "requester_id": 42,
            "organization_id": null,
            "group_id": 3,
            "tags": ["Hardware", "urgent-care"],
            "created_at": "2024-06-15T08:00:00Z",
            "score": 12
        }))
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(hit(RecordKind::Ticket, &ticket(), ""));
        assert!(hit(RecordKind::Group, &Record::new(), ""));
    }

    #[test]
    fn text_terms_are_case_insensitive_substrings() {
        let t = ticket();
        assert!(hit(RecordKind::Ticket, &t, "printer"));
        assert!(hit(RecordKind::Ticket, &t, "SMOKE tray"));
        assert!(hit(RecordKind::Ticket, &t, "hardware"));
        assert!(!hit(RecordKind::Ticket, &t, "printer scanner"));
        assert!(hit(RecordKind::Ticket, &t, r#""on fire""#));
    }

    #[test]
    fn text_term_ignores_unsearchable_fields() {
        let t = ticket();
        assert!(!hit(RecordKind::Ticket, &t, "incident"));
        assert!(!hit(RecordKind::Ticket, &t, "12"));
    }

    #[test]
    fn wildcard_text_terms_are_anchored() {
        let org = rec(json!({"name": "Ultimate Global Solutions", "tags": ["enterprise"]}));
        let corp = rec(json!({"name": "Global Corp"}));
        assert!(hit(RecordKind::Organization, &corp, "global*"));
        assert!(!hit(RecordKind::Organization, &org, "global*"));
        assert!(hit(RecordKind::Organization, &org, "*global*"));
        assert!(hit(RecordKind::Organization, &org, "enter*"));
    }

    #[test]
    fn negated_terms_exclude() {
        let t = ticket();
        assert!(!hit(RecordKind::Ticket, &t, "-printer"));
        assert!(hit(RecordKind::Ticket, &t, "-scanner"));
    }

    #[test]
    fn ticket_categorical_filters() {
        let t = ticket();
        assert!(hit(RecordKind::Ticket, &t, "status:OPEN"));
        assert!(!hit(RecordKind::Ticket, &t, "status:pending"));
        assert!(hit(RecordKind::Ticket, &t, "ticket_type:Incident"));
        assert!(hit(RecordKind::Ticket, &t, "subject:fire"));
        assert!(hit(RecordKind::Ticket, &t, r#"description:"tray 2""#));
        assert!(hit(RecordKind::Ticket, &t, "tags:hardware"));
        assert!(!hit(RecordKind::Ticket, &t, "tags:software"));
    }

    #[test]
    fn priority_is_at_least() {
        let t = ticket();
        assert!(hit(RecordKind::Ticket, &t, "priority:low"));
        assert!(hit(RecordKind::Ticket, &t, "priority:normal"));
        assert!(hit(RecordKind::Ticket, &t, "priority:high"));
        assert!(!hit(RecordKind::Ticket, &t, "priority:urgent"));
        assert!(hit(RecordKind::Ticket, &t, "priority:whatever"));
    }

    #[test]
    fn unknown_record_priority_ranks_normal() {
        let t = rec(json!({"priority": "meh"}));
        assert!(hit(RecordKind::Ticket, &t, "priority:normal"));
        assert!(!hit(RecordKind::Ticket, &t, "priority:high"));
        assert!(hit(RecordKind::Ticket, &Record::new(), "priority:low"));
    }

    #[test]
    fn id_filters() {
        let t = ticket();
        assert!(hit(RecordKind::Ticket, &t, "assignee:me"));
        assert!(hit(RecordKind::Ticket, &t, "assignee:1"));
        assert!(hit(RecordKind::Ticket, &t, "requester:42"));
        assert!(!hit(RecordKind::Ticket, &t, "requester:me"));
        assert!(hit(RecordKind::Ticket, &t, "organization:none"));
        assert!(!hit(RecordKind::Ticket, &t, "group:none"));
        assert!(hit(RecordKind::Ticket, &t, "group:3"));
        assert!(!hit(RecordKind::Ticket, &t, "organization:me"));
    }

    #[test]
    fn tags_none() {
        assert!(hit(RecordKind::Ticket, &rec(json!({"tags": []})), "tags:none"));
        assert!(hit(RecordKind::Organization, &Record::new(), "tags:none"));
        assert!(!hit(RecordKind::Ticket, &ticket(), "tags:none"));
    }

    #[test]
    fn generic_fallback_is_exact() {
        let t = ticket();
        assert!(hit(RecordKind::Ticket, &t, "score:12"));
        assert!(!hit(RecordKind::Ticket, &t, "score:1"));
        assert!(hit(RecordKind::Ticket, &t, "via:"));
        assert!(hit(RecordKind::Ticket, &t, "subject:printer*"));
    }

    #[test]
    fn user_filters() {
        let user = rec(json!({
            "id": 5,
            "name": "Ann Agent",
            "email": "ann@example.com",
            "role": "agent",
            "organization_id": 9,
            "verified": true,
            "tags": []
        }));
        assert!(hit(RecordKind::User, &user, "role:Agent"));
        assert!(hit(RecordKind::User, &user, "email:example.com"));
        assert!(hit(RecordKind::User, &user, "name:ann"));
        assert!(hit(RecordKind::User, &user, "organization:9"));
        assert!(hit(RecordKind::User, &user, "verified:true"));
        assert!(hit(RecordKind::User, &user, "active:true"));
        assert!(!hit(RecordKind::User, &user, "active:false"));
        assert!(hit(RecordKind::User, &user, "tags:none"));
        assert!(hit(RecordKind::User, &rec(json!({"name": "Bob"})), "verified:false"));
    }

    #[test]
    fn group_has_no_tag_search() {
        let group = rec(json!({"name": "Support", "tags": ["tier1"]}));
        assert!(!hit(RecordKind::Group, &group, "tier1"));
        assert!(hit(RecordKind::Group, &group, "name:supp"));
    }

    #[test]
    fn list_filters_use_or() {
        let t = ticket();
        assert!(hit(RecordKind::Ticket, &t, "status:pending OR open"));
        assert!(!hit(RecordKind::Ticket, &t, "status:pending OR solved"));
        assert!(!hit(RecordKind::Ticket, &t, "-status:pending OR open"));
        assert!(hit(RecordKind::Ticket, &t, "-status:pending OR solved"));
    }

    #[test]
    fn relational_filters() {
        let t = ticket();
        assert!(hit(RecordKind::Ticket, &t, "score>10"));
        assert!(!hit(RecordKind::Ticket, &t, "score<10"));
        assert!(hit(RecordKind::Ticket, &t, "score<=12"));
        assert!(hit(RecordKind::Ticket, &t, "created_at>2024-06-01"));
        assert!(!hit(RecordKind::Ticket, &t, "status>open"));
        assert!(!hit(RecordKind::Ticket, &t, "missing>1"));
    }

    #[test]
    fn or_between_relational_filters() {
        for id in [1, 3] {
            let t = rec(json!({"id": id}));
            assert!(hit(RecordKind::Ticket, &t, "id<2 OR id>2"), "{id}");
        }
        assert!(!hit(RecordKind::Ticket, &rec(json!({"id": 2})), "id<2 OR id>2"));
        assert!(hit(RecordKind::Ticket, &rec(json!({"id": 7})), "id>10 OR 7"));
        assert!(!hit(RecordKind::Ticket, &rec(json!({"id": 3})), "-id<2 OR id>2"));
    }

    #[test]
    fn prepared_matcher_reuses_patterns() {
        let query = Query::parse("global* tags:ent* -name:*solutions");
        let matcher = QueryMatcher::new(&query, now());
        let corp = rec(json!({"name": "Global Corp", "tags": ["enterprise"]}));
        let solutions = rec(json!({"name": "Global Solutions", "tags": ["enterprise"]}));
        assert!(matcher.matches(RecordKind::Organization, &corp));
        assert!(!matcher.matches(RecordKind::Organization, &solutions));
        assert!(!matcher.matches(RecordKind::Organization, &Record::new()));
    }

    #[test]
    fn date_filters_and_negated_dates() {
        let t = ticket();
        assert!(hit(RecordKind::Ticket, &t, "created>2024-06-01"));
        assert!(hit(RecordKind::Ticket, &t, "created:8hours"));
        assert!(!hit(RecordKind::Ticket, &t, "created:2hours"));
        assert!(!hit(RecordKind::Ticket, &t, "-created>2024-06-01"));
        assert!(!hit(RecordKind::Ticket, &t, "updated>2024-06-01"));
    }

    #[test]
    fn value_text_rendering() {
        assert_eq!(value_text(&json!(null)), None);
        assert_eq!(value_text(&json!(true)), Some("true".into()));
        assert_eq!(value_text(&json!(3)), Some("3".into()));
        assert_eq!(value_text(&json!(["a", 1, null])), Some("a 1".into()));
    }

    #[test]
    fn priority_ranks() {
        assert!(priority_rank("low") < priority_rank("normal"));
        assert!(priority_rank("normal") < priority_rank("high"));
        assert!(priority_rank("HIGH") < priority_rank("urgent"));
        assert_eq!(priority_rank(""), priority_rank("normal"));
    }
}
