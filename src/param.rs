//! Query parameters and their inline serialization
//!
//! A [`Param`] fills `$<ordinal>` placeholders (and `@<name>` when named) in a
//! query template. [`Param::serialize`] is a pure function of the parameter's
//! fields and always yields text that can be spliced in place of the
//! placeholder.

use crate::iri::{Iri, IriRef, PrefixedName};
use crate::term::{triple_quote, Literal};
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone};
use std::fmt;
use std::sync::Arc;

/// A value that renders its own query text
pub trait ToSparql: fmt::Debug + Send + Sync {
    /// Text spliced into the query in place of the placeholder
    fn to_sparql(&self) -> String;
}

impl ToSparql for Iri {
    fn to_sparql(&self) -> String {
        self.to_ref()
    }
}

impl ToSparql for PrefixedName {
    fn to_sparql(&self) -> String {
        self.to_ref()
    }
}

impl ToSparql for IriRef {
    fn to_sparql(&self) -> String {
        self.to_ref()
    }
}

impl ToSparql for Literal {
    fn to_sparql(&self) -> String {
        Literal::to_sparql(self)
    }
}

/// The runtime kind of a parameter value
#[derive(Debug, Clone)]
pub enum ParamValue {
    /// Signed integer, rendered in decimal
    Int(i64),
    /// Unsigned integer, rendered in decimal
    UInt(u64),
    /// Single precision float, rendered in exponent notation
    Float32(f32),
    /// Double precision float, rendered in exponent notation
    Float64(f64),
    /// Rendered as the `true`/`false` keyword
    Bool(bool),
    /// Raw bytes, rendered as a long string (lossy UTF-8)
    Bytes(Vec<u8>),
    /// Text, rendered as a long string
    Text(String),
    /// Timestamp, rendered as `"<RFC 3339>"^^xsd:dateTime`
    DateTime(DateTime<FixedOffset>),
    /// Full IRI, rendered in angle brackets
    Iri(Iri),
    /// Prefixed name, rendered verbatim
    PrefixedName(PrefixedName),
    /// Literal with its own datatype or language tag
    Literal(Literal),
    /// Anything that renders itself
    Custom(Arc<dyn ToSparql>),
    /// Display text of any other value, rendered as a long string
    Other(String),
}

impl ParamValue {
    /// Fallback for values without a dedicated kind: their `Display` text
    pub fn other(value: impl fmt::Display) -> Self {
        ParamValue::Other(value.to_string())
    }

    /// Wrap a self-rendering value
    pub fn custom(value: impl ToSparql + 'static) -> Self {
        ParamValue::Custom(Arc::new(value))
    }

    /// Plain text form, used when a datatype or language tag is attached
    pub fn to_plain_text(&self) -> String {
        match self {
            ParamValue::Int(v) => v.to_string(),
            ParamValue::UInt(v) => v.to_string(),
            ParamValue::Float32(v) => special_double(*v).map_or_else(|| v.to_string(), str::to_string),
            ParamValue::Float64(v) => special_double(*v).map_or_else(|| v.to_string(), str::to_string),
            ParamValue::Bool(v) => v.to_string(),
            ParamValue::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
            ParamValue::Text(v) | ParamValue::Other(v) => v.clone(),
            ParamValue::DateTime(v) => v.to_rfc3339_opts(SecondsFormat::Secs, true),
            ParamValue::Iri(v) => v.as_str().to_string(),
            ParamValue::PrefixedName(v) => v.as_str().to_string(),
            ParamValue::Literal(v) => v.value.clone(),
            ParamValue::Custom(v) => v.to_sparql(),
        }
    }

    /// Render by kind
    pub fn to_sparql(&self) -> String {
        match self {
            ParamValue::Int(v) => v.to_string(),
            ParamValue::UInt(v) => v.to_string(),
            ParamValue::Float32(v) => float_to_sparql(*v),
            ParamValue::Float64(v) => float_to_sparql(*v),
            ParamValue::Bool(v) => v.to_string(),
            ParamValue::Bytes(v) => triple_quote(&String::from_utf8_lossy(v)),
            ParamValue::Text(v) | ParamValue::Other(v) => triple_quote(v),
            ParamValue::DateTime(v) => format!(
                "\"{}\"^^xsd:dateTime",
                v.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            ParamValue::Iri(v) => v.to_ref(),
            ParamValue::PrefixedName(v) => v.to_ref(),
            ParamValue::Literal(v) => v.to_sparql(),
            ParamValue::Custom(v) => v.to_sparql(),
        }
    }
}

/// `xsd:double` lexical form of NaN and the infinities
fn special_double(v: impl Into<f64>) -> Option<&'static str> {
    let v: f64 = v.into();
    if v.is_nan() {
        Some("NaN")
    } else if v == f64::INFINITY {
        Some("INF")
    } else if v == f64::NEG_INFINITY {
        Some("-INF")
    } else {
        None
    }
}

fn float_to_sparql<F: Into<f64> + fmt::LowerExp + Copy>(v: F) -> String {
    match special_double(v) {
        Some(name) => format!("\"{}\"^^xsd:double", name),
        None => format!("{:e}", v),
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for ParamValue {
                fn from(v: $t) -> Self {
                    ParamValue::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64);
impl_from_int!(UInt, u64, u8, u16, u32, u64);

impl From<isize> for ParamValue {
    fn from(v: isize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::UInt(v as u64)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float32(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float64(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(v: Vec<u8>) -> Self {
        ParamValue::Bytes(v)
    }
}

impl From<&[u8]> for ParamValue {
    fn from(v: &[u8]) -> Self {
        ParamValue::Bytes(v.to_vec())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for ParamValue {
    fn from(v: DateTime<Tz>) -> Self {
        ParamValue::DateTime(v.fixed_offset())
    }
}

impl From<Iri> for ParamValue {
    fn from(v: Iri) -> Self {
        ParamValue::Iri(v)
    }
}

impl From<PrefixedName> for ParamValue {
    fn from(v: PrefixedName) -> Self {
        ParamValue::PrefixedName(v)
    }
}

impl From<IriRef> for ParamValue {
    fn from(v: IriRef) -> Self {
        match v {
            IriRef::Iri(iri) => ParamValue::Iri(iri),
            IriRef::Prefixed(name) => ParamValue::PrefixedName(name),
        }
    }
}

impl From<Literal> for ParamValue {
    fn from(v: Literal) -> Self {
        ParamValue::Literal(v)
    }
}

/// A parameter filling the placeholders of one query
#[derive(Debug, Clone)]
pub struct Param {
    /// Position starting from one, always set
    pub ordinal: usize,
    /// Optional name, also reachable as `@name`
    pub name: Option<String>,
    /// The value
    pub value: ParamValue,
    /// Datatype forcing a typed literal
    pub data_type: Option<IriRef>,
    /// Language tag forcing a language-tagged literal, wins over `data_type`
    pub language_tag: Option<String>,
}

impl Param {
    /// A positional parameter
    pub fn new(ordinal: usize, value: impl Into<ParamValue>) -> Self {
        Self {
            ordinal,
            name: None,
            value: value.into(),
            data_type: None,
            language_tag: None,
        }
    }

    /// A parameter reachable both as `$ordinal` and `@name`
    pub fn named(ordinal: usize, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(ordinal, value)
        }
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<IriRef>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    #[must_use]
    pub fn with_language_tag(mut self, tag: impl Into<String>) -> Self {
        self.language_tag = Some(tag.into());
        self
    }

    /// Every placeholder spelling that resolves to this parameter
    pub fn placeholders(&self) -> Vec<String> {
        let mut keys = vec![format!("${}", self.ordinal)];
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            keys.push(format!("@{}", name));
        }
        keys
    }

    /// Inline query text for this parameter
    pub fn serialize(&self) -> String {
        if let Some(lang) = self.language_tag.as_deref().filter(|tag| !tag.is_empty()) {
            return format!("{}@{}", triple_quote(&self.value.to_plain_text()), lang);
        }
        if let Some(data_type) = &self.data_type {
            return format!(
                "{}^^{}",
                triple_quote(&self.value.to_plain_text()),
                data_type.to_ref()
            );
        }
        self.value.to_sparql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[derive(Debug)]
    struct Empty;

    impl ToSparql for Empty {
        fn to_sparql(&self) -> String {
            r#""""""""#.to_string()
        }
    }

    fn serialize(value: impl Into<ParamValue>) -> String {
        Param::new(1, value).serialize()
    }

    #[test]
    fn test_serialize_integers() {
        assert_eq!(serialize(1i8), "1");
        assert_eq!(serialize(1i16), "1");
        assert_eq!(serialize(1i32), "1");
        assert_eq!(serialize(-42i64), "-42");
        assert_eq!(serialize(1u8), "1");
        assert_eq!(serialize(1u16), "1");
        assert_eq!(serialize(1u32), "1");
        assert_eq!(serialize(u64::MAX), "18446744073709551615");
        assert_eq!(serialize(7usize), "7");
    }

    #[test]
    fn test_serialize_floats() {
        assert_eq!(serialize(1.0f32), "1e0");
        assert_eq!(serialize(1.0f64), "1e0");
        assert_eq!(serialize(0.0025f64), "2.5e-3");
        assert_eq!(serialize(1234.5f64), "1.2345e3");
    }

    #[test]
    fn test_serialize_non_finite_floats() {
        assert_eq!(serialize(f64::NAN), r#""NaN"^^xsd:double"#);
        assert_eq!(serialize(f64::INFINITY), r#""INF"^^xsd:double"#);
        assert_eq!(serialize(f64::NEG_INFINITY), r#""-INF"^^xsd:double"#);
        assert_eq!(serialize(f32::NAN), r#""NaN"^^xsd:double"#);
        assert_eq!(serialize(f32::NEG_INFINITY), r#""-INF"^^xsd:double"#);

        let p = Param::new(1, f64::INFINITY).with_data_type(PrefixedName::new("xsd:double"));
        assert_eq!(p.serialize(), r#""""INF"""^^xsd:double"#);
    }

    #[test]
    fn test_serialize_bool() {
        assert_eq!(serialize(true), "true");
        assert_eq!(serialize(false), "false");
    }

    #[test]
    fn test_serialize_text_and_bytes() {
        assert_eq!(serialize("hello"), r#""""hello""""#);
        assert_eq!(serialize(b"hello".as_slice()), r#""""hello""""#);
        assert_eq!(serialize(""), r#""""""""#);
    }

    #[test]
    fn test_serialize_text_with_triple_quotes() {
        assert_eq!(
            serialize(r#"a"""b"#),
            r#""""a\"\"\"b""""#
        );
    }

    #[test]
    fn test_serialize_datetime() {
        let t = Utc.with_ymd_and_hms(2018, 9, 21, 12, 8, 10).unwrap();
        assert_eq!(serialize(t), r#""2018-09-21T12:08:10Z"^^xsd:dateTime"#);

        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let t = jst.with_ymd_and_hms(2015, 11, 19, 9, 10, 11).unwrap();
        assert_eq!(serialize(t), r#""2015-11-19T09:10:11+09:00"^^xsd:dateTime"#);
    }

    #[test]
    fn test_serialize_references() {
        assert_eq!(serialize(Iri::new("foo")), "<foo>");
        assert_eq!(serialize(PrefixedName::new("dbpj:Tokyo")), "dbpj:Tokyo");
    }

    #[test]
    fn test_serialize_literal_value() {
        assert_eq!(
            serialize(Literal::with_language("ももいろクローバー", "ja")),
            r#""""ももいろクローバー"""@ja"#
        );
    }

    #[test]
    fn test_serialize_custom() {
        assert_eq!(serialize(ParamValue::custom(Empty)), r#""""""""#);
    }

    #[test]
    fn test_serialize_fallback() {
        assert_eq!(
            serialize(ParamValue::other(std::net::Ipv4Addr::LOCALHOST)),
            r#""""127.0.0.1""""#
        );
    }

    #[test]
    fn test_serialize_with_language_tag() {
        let p = Param::new(1, "chat").with_language_tag("fr");
        assert_eq!(p.serialize(), r#""""chat"""@fr"#);
    }

    #[test]
    fn test_serialize_with_data_type() {
        let p = Param::new(1, 30).with_data_type(PrefixedName::new("xsd:integer"));
        assert_eq!(p.serialize(), r#""""30"""^^xsd:integer"#);

        let p = Param::new(1, "1").with_data_type(Iri::new("foo"));
        assert_eq!(p.serialize(), r#""""1"""^^<foo>"#);
    }

    #[test]
    fn test_serialize_typed_escapes_triple_quotes() {
        let p = Param::new(1, r#"x"""y"#).with_data_type(Iri::new("t"));
        assert_eq!(p.serialize(), r#""""x\"\"\"y"""^^<t>"#);
    }

    #[test]
    fn test_empty_language_tag_is_unset() {
        let p = Param::new(1, "x").with_language_tag("");
        assert_eq!(p.serialize(), r#""""x""""#);

        let p = Param::new(1, "30")
            .with_data_type(PrefixedName::new("xsd:integer"))
            .with_language_tag("");
        assert_eq!(p.serialize(), r#""""30"""^^xsd:integer"#);

        assert_eq!(serialize(Literal::with_language("x", "")), r#""""x""""#);
    }

    #[test]
    fn test_language_tag_wins_over_data_type() {
        let p = Param::new(1, "chat")
            .with_data_type(Iri::new("t"))
            .with_language_tag("fr");
        assert_eq!(p.serialize(), r#""""chat"""@fr"#);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Param::new(3, 1).placeholders(), vec!["$3"]);
        assert_eq!(
            Param::named(1, "name", "Bob").placeholders(),
            vec!["$1", "@name"]
        );
    }
}
