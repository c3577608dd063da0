//! Parsed query model
//!
//! A [`Query`] is the parser's only output. It is fully determined by the
//! query string and never references records.

use helpdesk_core::RecordKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::tokenizer::FieldOp;

/// Value attached to a field filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// `field:value`
    Scalar(String),
    /// `field:a OR b OR c`, matched with OR semantics
    List(Vec<String>),
    /// `field>value` and friends
    Range { operator: FieldOp, value: String },
    /// An OR chain with at least one range, e.g. `created<X OR created>Y`
    AnyOf(Vec<FilterValue>),
}

impl FilterValue {
    /// Extend an OR chain with another alternative.
    ///
    /// Plain values collapse into a [`List`](Self::List); once a range is
    /// involved the chain becomes [`AnyOf`](Self::AnyOf).
    pub fn push_alternative(&mut self, alternative: Self) {
        let current = std::mem::replace(self, Self::List(Vec::new()));
        *self = match (current, alternative) {
            (Self::Scalar(first), Self::Scalar(next)) => Self::List(vec![first, next]),
            (Self::List(mut values), Self::Scalar(next)) => {
                values.push(next);
                Self::List(values)
            }
            (current, alternative) => {
                let mut alternatives = current.into_alternatives();
                alternatives.extend(alternative.into_alternatives());
                Self::AnyOf(alternatives)
            }
        };
    }

    /// The raw value strings, operators dropped.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Scalar(value) | Self::Range { value, .. } => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
            Self::AnyOf(alternatives) => alternatives.iter().flat_map(Self::values).collect(),
        }
    }

    fn into_alternatives(self) -> Vec<Self> {
        match self {
            Self::List(values) => values.into_iter().map(Self::Scalar).collect(),
            Self::AnyOf(alternatives) => alternatives,
            single => vec![single],
        }
    }
}

/// Structured form of a search query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Every term must match some searchable field.
    pub text_terms: Vec<String>,
    /// No term may match any searchable field.
    pub negated_terms: Vec<String>,
    pub filters: IndexMap<String, FilterValue>,
    pub negated_filters: IndexMap<String, FilterValue>,
    /// Entity kinds to search; empty means all of them.
    pub type_filter: Vec<String>,
    /// Entity kinds removed from the search by `-type:…`.
    pub negated_type_filter: Vec<String>,
    pub date_filters: IndexMap<String, FilterValue>,
}

impl Query {
    /// Parse a raw query string.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        crate::parser::parse_query(input)
    }

    /// True when the query places no constraint on records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_terms.is_empty()
            && self.negated_terms.is_empty()
            && self.filters.is_empty()
            && self.negated_filters.is_empty()
            && self.type_filter.is_empty()
            && self.negated_type_filter.is_empty()
            && self.date_filters.is_empty()
    }

    /// Entity kinds this query searches, in result concatenation order.
    ///
    /// Unknown type names select nothing and exclude nothing.
    #[must_use]
    pub fn requested_kinds(&self) -> Vec<RecordKind> {
        let named = |names: &[String]| -> Vec<RecordKind> {
            names.iter().filter_map(|name| name.parse().ok()).collect()
        };
        let included = named(&self.type_filter);
        let excluded = named(&self.negated_type_filter);
        RecordKind::ALL
            .into_iter()
            .filter(|kind| self.type_filter.is_empty() || included.contains(kind))
            .filter(|kind| !excluded.contains(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_becomes_list_on_or() {
        let mut value = FilterValue::Scalar("open".into());
        value.push_alternative(FilterValue::Scalar("pending".into()));
        value.push_alternative(FilterValue::Scalar("hold".into()));
        assert_eq!(
            value,
            FilterValue::List(vec!["open".into(), "pending".into(), "hold".into()])
        );
        assert_eq!(value.values(), vec!["open", "pending", "hold"]);
    }

    #[test]
    fn ranges_extend_into_any_of() {
        let lt = FilterValue::Range {
            operator: FieldOp::Lt,
            value: "2".into(),
        };
        let gt = FilterValue::Range {
            operator: FieldOp::Gt,
            value: "5".into(),
        };
        let mut value = lt.clone();
        value.push_alternative(gt.clone());
        assert_eq!(value, FilterValue::AnyOf(vec![lt.clone(), gt.clone()]));

        let mut mixed = FilterValue::List(vec!["a".into(), "b".into()]);
        mixed.push_alternative(gt.clone());
        mixed.push_alternative(FilterValue::Scalar("c".into()));
        assert_eq!(
            mixed,
            FilterValue::AnyOf(vec![
                FilterValue::Scalar("a".into()),
                FilterValue::Scalar("b".into()),
                gt,
                FilterValue::Scalar("c".into()),
            ])
        );
        assert_eq!(mixed.values(), vec!["a", "b", "5", "c"]);
    }

    #[test]
    fn filter_value_json_shapes() {
        assert_eq!(
            serde_json::to_value(FilterValue::Scalar("open".into())).unwrap(),
            json!("open")
        );
        assert_eq!(
            serde_json::to_value(FilterValue::List(vec!["a".into(), "b".into()])).unwrap(),
            json!(["a", "b"])
        );
        assert_eq!(
            serde_json::to_value(FilterValue::Range {
                operator: FieldOp::Gte,
                value: "2024-01-01".into()
            })
            .unwrap(),
            json!({"operator": ">=", "value": "2024-01-01"})
        );
        let any_of = FilterValue::AnyOf(vec![
            FilterValue::Scalar("1".into()),
            FilterValue::Range {
                operator: FieldOp::Gt,
                value: "5".into(),
            },
        ]);
        let shape = json!(["1", {"operator": ">", "value": "5"}]);
        assert_eq!(serde_json::to_value(&any_of).unwrap(), shape);
        assert_eq!(serde_json::from_value::<FilterValue>(shape).unwrap(), any_of);
        let back: FilterValue =
            serde_json::from_value(json!({"operator": "<", "value": "3"})).unwrap();
        assert_eq!(
            back,
            FilterValue::Range {
                operator: FieldOp::Lt,
                value: "3".into()
            }
        );
    }

    #[test]
    fn requested_kinds_defaults_to_all() {
        assert_eq!(Query::default().requested_kinds(), RecordKind::ALL.to_vec());
    }

    #[test]
    fn requested_kinds_keeps_canonical_order() {
        let query = Query {
            type_filter: vec!["group".into(), "Ticket".into(), "widget".into()],
            ..Query::default()
        };
        assert_eq!(
            query.requested_kinds(),
            vec![RecordKind::Ticket, RecordKind::Group]
        );

        let unknown = Query {
            type_filter: vec!["widget".into()],
            ..Query::default()
        };
        assert!(unknown.requested_kinds().is_empty());
    }

    #[test]
    fn negated_types_are_removed() {
        let query = Query {
            negated_type_filter: vec!["ticket".into(), "widget".into()],
            ..Query::default()
        };
        assert_eq!(
            query.requested_kinds(),
            vec![RecordKind::User, RecordKind::Organization, RecordKind::Group]
        );

        let both = Query {
            type_filter: vec!["ticket".into(), "user".into()],
            negated_type_filter: vec!["user".into()],
            ..Query::default()
        };
        assert_eq!(both.requested_kinds(), vec![RecordKind::Ticket]);
        assert!(!both.is_empty());
    }

    #[test]
    fn empty_query() {
        assert!(Query::default().is_empty());
        let query = Query {
            text_terms: vec!["printer".into()],
            ..Query::default()
        };
        assert!(!query.is_empty());
    }
}
