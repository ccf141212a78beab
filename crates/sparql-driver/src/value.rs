//! Column values and argument binding
//!
//! Bound terms are reduced to plain column values. The only type inference
//! performed is for `xsd:dateTime` literals, which become timestamps when
//! their text parses; everything else passes through as text.

use chrono::{DateTime, NaiveDateTime, Utc};
use sparql_client::{xsd, Param, ParamValue, Term};
use std::fmt;

/// Timestamp text without an offset, read as UTC
const NAIVE_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One column slot of a row
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Variable unbound in this row
    #[default]
    Null,
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Column value for an optional binding
    pub fn from_binding(term: Option<&Term>) -> Self {
        term.map(Value::from_term).unwrap_or(Value::Null)
    }

    /// Column value for a bound term
    pub fn from_term(term: &Term) -> Self {
        match term {
            Term::Literal(literal) => {
                let is_date_time = literal
                    .data_type_iri()
                    .map_or(false, |dt| dt.as_str() == xsd::DATE_TIME);
                if is_date_time {
                    if let Some(ts) = parse_date_time(&literal.value) {
                        return Value::Timestamp(ts);
                    }
                }
                Value::Text(literal.value.clone())
            }
            Term::Boolean(b) => Value::Bool(*b),
            other => Value::Text(other.as_text()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(text) => write!(f, "{}", text),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

/// Try the offset-less form first, then RFC 3339
fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, NAIVE_DATE_TIME) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// An argument bound to a statement execution
#[derive(Debug, Clone)]
pub struct NamedValue {
    /// Position starting from one
    pub ordinal: usize,
    /// Optional name, reachable as `@name`
    pub name: Option<String>,
    pub value: ParamValue,
}

impl NamedValue {
    pub fn new(ordinal: usize, value: impl Into<ParamValue>) -> Self {
        Self {
            ordinal,
            name: None,
            value: value.into(),
        }
    }

    pub fn named(ordinal: usize, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            ordinal,
            name: Some(name.into()),
            value: value.into(),
        }
    }

    /// Positional arguments numbered from one
    pub fn positional<I, V>(values: I) -> Vec<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| NamedValue::new(i + 1, v))
            .collect()
    }
}

impl From<NamedValue> for Param {
    fn from(arg: NamedValue) -> Self {
        Param {
            ordinal: arg.ordinal,
            name: arg.name,
            value: arg.value,
            data_type: None,
            language_tag: None,
        }
    }
}

pub(crate) fn to_params(args: &[NamedValue]) -> Vec<Param> {
    args.iter().cloned().map(Param::from).collect()
}
