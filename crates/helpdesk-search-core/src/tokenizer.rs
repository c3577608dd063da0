//! Query tokenizer
//!
//! Splits a raw query string into a flat token stream:
//! - bare words and `"quoted phrases"`
//! - `field:value` pairs, plus relational `field>value`, `field<value`,
//!   `field>=value`, `field<=value`
//! - the literal `OR` joiner
//! - a leading `-` negation marker on any word, phrase, or field
//!
//! Tokenizing never fails. An unclosed `"` keeps the quote character in the
//! token's value instead of raising.

use serde::{Deserialize, Serialize};

/// Operator joining a field name to its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldOp {
    #[serde(rename = ":")]
    Colon,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

impl FieldOp {
    /// Longest operators first so `>=` is never read as `>` followed by `=`.
    const BY_LENGTH: [Self; 5] = [Self::Gte, Self::Lte, Self::Gt, Self::Lt, Self::Colon];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Colon => ":",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }

    /// Whether this operator produces a range filter rather than a plain value.
    #[must_use]
    pub const fn is_relational(self) -> bool {
        !matches!(self, Self::Colon)
    }
}

impl std::fmt::Display for FieldOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lexical unit of the query language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Unquoted free text
    Word { text: String, negated: bool },
    /// Double-quoted free text
    Phrase { text: String, negated: bool },
    /// `field<op>value`
    Field {
        field: String,
        op: FieldOp,
        value: String,
        negated: bool,
    },
    /// The literal, case-sensitive `OR`
    Or,
}

/// Tokenize a raw query string.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();
    while !rest.is_empty() {
        let (token, remaining) = next_token(rest);
        tokens.push(token);
        rest = remaining.trim_start();
    }
    tokens
}

/// Read one token from the front of `input`, which starts at a non-space char.
fn next_token(input: &str) -> (Token, &str) {
    let (negated, body) = match input.strip_prefix('-') {
        Some(body) if body.starts_with(|c: char| !c.is_whitespace()) => (true, body),
        _ => (false, input),
    };

    if let Some(after_quote) = body.strip_prefix('"') {
        return match after_quote.find('"') {
            Some(end) => (
                Token::Phrase {
                    text: after_quote[..end].to_string(),
                    negated,
                },
                &after_quote[end + 1..],
            ),
            // Unclosed: the rest of the input, opening quote included.
            None => (
                Token::Phrase {
                    text: body.trim_end().to_string(),
                    negated,
                },
                "",
            ),
        };
    }

    if let Some((field, op, after_op)) = split_field(body) {
        let (value, remaining) = read_field_value(after_op);
        return (
            Token::Field {
                field: field.to_string(),
                op,
                value,
                negated,
            },
            remaining,
        );
    }

    let end = body.find(char::is_whitespace).unwrap_or(body.len());
    let (word, remaining) = body.split_at(end);
    let token = if word == "OR" && !negated {
        Token::Or
    } else {
        Token::Word {
            text: word.to_string(),
            negated,
        }
    };
    (token, remaining)
}

/// Split `name<op>rest` where `name` is a run of word characters.
fn split_field(input: &str) -> Option<(&str, FieldOp, &str)> {
    let name_len = input
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(input.len());
    if name_len == 0 {
        return None;
    }
    let (name, rest) = input.split_at(name_len);
    FieldOp::BY_LENGTH
        .into_iter()
        .find_map(|op| rest.strip_prefix(op.as_str()).map(|after| (name, op, after)))
}

/// Read a field value. A closed quote may span whitespace; anything else
/// (including an unclosed quote) runs to the next whitespace.
fn read_field_value(input: &str) -> (String, &str) {
    if let Some(quoted) = input.strip_prefix('"')
        && let Some(end) = quoted.find('"')
    {
        return (quoted[..end].to_string(), &quoted[end + 1..]);
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    (input[..end].to_string(), &input[end..])
}
