//! Query parser
//!
//! Folds the token stream into a [`Query`]. The only state carried between
//! tokens is the slot the previous value landed in and whether an `OR` is
//! waiting to join it with the next value.

use tracing::debug;

use crate::dates::is_date_field;
use crate::query::{FilterValue, Query};
use crate::tokenizer::{FieldOp, Token, tokenize};

/// Which map of the query a field value is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Filters,
    NegatedFilters,
    DateFilters,
    Type,
    NegatedType,
}

impl Target {
    fn route(field: &str, negated: bool) -> Self {
        match (field == "type", negated) {
            (true, false) => Self::Type,
            (true, true) => Self::NegatedType,
            (false, true) => Self::NegatedFilters,
            (false, false) if is_date_field(field) => Self::DateFilters,
            (false, false) => Self::Filters,
        }
    }

    const fn is_negated(self) -> bool {
        matches!(self, Self::NegatedFilters | Self::NegatedType)
    }
}

/// Where the most recent value went
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Field { target: Target, field: String },
    Text { negated: bool },
}

impl Slot {
    const fn is_negated(&self) -> bool {
        match self {
            Self::Field { target, .. } => target.is_negated(),
            Self::Text { negated } => *negated,
        }
    }
}

/// Accumulator threaded through the token fold
#[derive(Debug, Default)]
pub struct ParseState {
    query: Query,
    last: Option<Slot>,
    pending_or: bool,
}

impl ParseState {
    /// Consume one token.
    #[must_use]
    pub fn apply(mut self, token: Token) -> Self {
        match token {
            Token::Or => self.apply_or(),
            Token::Field {
                field,
                op,
                value,
                negated,
            } => self.apply_field(field, op, value, negated),
            Token::Word { text, negated } | Token::Phrase { text, negated } => {
                self.apply_text(text, negated);
            }
        }
        self
    }

    /// Finish the fold. A trailing `OR` has nothing to join and is dropped.
    #[must_use]
    pub fn finish(self) -> Query {
        self.query
    }

    fn apply_or(&mut self) {
        match self.last.clone() {
            // `a OR OR b` keeps an empty alternative in a positive chain. In a
            // negated chain it would exclude everything, so it is skipped.
            Some(slot) if self.pending_or => {
                if !slot.is_negated() {
                    self.append(&slot, FilterValue::Scalar(String::new()));
                }
            }
            Some(_) => self.pending_or = true,
            None => {
                self.query.text_terms.push(String::new());
                self.last = Some(Slot::Text { negated: false });
                self.pending_or = true;
            }
        }
    }

    fn apply_field(&mut self, field: String, op: FieldOp, value: String, negated: bool) {
        let target = Target::route(&field, negated);
        let slot = Slot::Field {
            target,
            field: field.clone(),
        };
        let filter = if op.is_relational() {
            FilterValue::Range {
                operator: op,
                value,
            }
        } else {
            FilterValue::Scalar(value)
        };

        if self.pending_or && self.last.as_ref() == Some(&slot) {
            self.append(&slot, filter);
        } else {
            self.store(target, field, filter);
        }

        self.last = Some(slot);
        self.pending_or = false;
    }

    /// A bare value right after `OR` joins whatever slot came before it,
    /// inheriting that slot's negation.
    fn apply_text(&mut self, text: String, negated: bool) {
        if self.pending_or
            && !negated
            && let Some(slot) = self.last.clone()
        {
            self.append(&slot, FilterValue::Scalar(text));
            self.pending_or = false;
            return;
        }

        if negated {
            self.query.negated_terms.push(text);
        } else {
            self.query.text_terms.push(text);
        }
        self.last = Some(Slot::Text { negated });
        self.pending_or = false;
    }

    /// Overwrite a field entry; a repeated key without `OR` is last-write-wins.
    fn store(&mut self, target: Target, field: String, filter: FilterValue) {
        let map = match target {
            Target::Type => {
                self.query.type_filter = owned_values(&filter);
                return;
            }
            Target::NegatedType => {
                self.query.negated_type_filter = owned_values(&filter);
                return;
            }
            Target::Filters => &mut self.query.filters,
            Target::NegatedFilters => &mut self.query.negated_filters,
            Target::DateFilters => &mut self.query.date_filters,
        };
        map.insert(field, filter);
    }

    /// Add an OR alternative to an existing slot.
    fn append(&mut self, slot: &Slot, alternative: FilterValue) {
        match slot {
            Slot::Text { negated } => {
                let terms = if *negated {
                    &mut self.query.negated_terms
                } else {
                    &mut self.query.text_terms
                };
                terms.extend(owned_values(&alternative));
            }
            Slot::Field {
                target: Target::Type,
                ..
            } => self.query.type_filter.extend(owned_values(&alternative)),
            Slot::Field {
                target: Target::NegatedType,
                ..
            } => self
                .query
                .negated_type_filter
                .extend(owned_values(&alternative)),
            Slot::Field { target, field } => {
                let map = match target {
                    Target::NegatedFilters => &mut self.query.negated_filters,
                    Target::DateFilters => &mut self.query.date_filters,
                    _ => &mut self.query.filters,
                };
                match map.get_mut(field) {
                    Some(existing) => existing.push_alternative(alternative),
                    None => {
                        map.insert(field.clone(), alternative);
                    }
                }
            }
        }
    }
}

fn owned_values(filter: &FilterValue) -> Vec<String> {
    filter.values().into_iter().map(str::to_string).collect()
}

/// Fold a token stream into a [`Query`].
#[must_use]
pub fn parse_tokens<I>(tokens: I) -> Query
where
    I: IntoIterator<Item = Token>,
{
    tokens
        .into_iter()
        .fold(ParseState::default(), ParseState::apply)
        .finish()
}

/// Tokenize and parse a raw query string.
#[must_use]
pub fn parse_query(input: &str) -> Query {
    let query = parse_tokens(tokenize(input));
    debug!(
        text_terms = query.text_terms.len(),
        negated_terms = query.negated_terms.len(),
        filters = query.filters.len(),
        negated_filters = query.negated_filters.len(),
        type_filter = query.type_filter.len(),
        negated_type_filter = query.negated_type_filter.len(),
        date_filters = query.date_filters.len(),
        "parsed search query"
    );
    query
}
