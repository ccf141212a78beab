//! RDF terms as they appear in query results and as literal parameters

use crate::iri::{Iri, IriRef};
use std::collections::HashMap;
use std::fmt;

/// XML Schema datatype IRIs used by the client
pub mod xsd {
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// Namespace of the `xml:lang` attribute
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

const TRIPLE_QUOTE: &str = r#"""""#;
const ESCAPED_TRIPLE_QUOTE: &str = r#"\"\"\""#;

/// Wrap text in `"""` after escaping every inner `"""` as `\"\"\"`.
pub(crate) fn triple_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 6);
    out.push_str(TRIPLE_QUOTE);
    out.push_str(&text.replace(TRIPLE_QUOTE, ESCAPED_TRIPLE_QUOTE));
    out.push_str(TRIPLE_QUOTE);
    out
}

/// An RDF literal
///
/// A literal carries either a datatype or a language tag. When both are set
/// the language tag wins on serialization and the datatype is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Literal {
    /// Lexical form
    pub value: String,
    /// Datatype reference
    pub data_type: Option<IriRef>,
    /// Language tag
    pub language_tag: Option<String>,
}

impl Literal {
    /// A plain literal with neither datatype nor language
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// A typed literal
    pub fn typed(value: impl Into<String>, data_type: impl Into<IriRef>) -> Self {
        Self {
            value: value.into(),
            data_type: Some(data_type.into()),
            language_tag: None,
        }
    }

    /// A language-tagged literal
    pub fn with_language(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            data_type: None,
            language_tag: Some(language.into()),
        }
    }

    /// The datatype when it is a full IRI
    pub fn data_type_iri(&self) -> Option<&Iri> {
        self.data_type.as_ref().and_then(IriRef::as_iri)
    }

    /// Render in query syntax: `"""value"""`, `"""value"""@lang` or `"""value"""^^type`
    pub fn to_sparql(&self) -> String {
        let mut out = triple_quote(&self.value);
        if let Some(lang) = self.language_tag.as_deref().filter(|tag| !tag.is_empty()) {
            out.push('@');
            out.push_str(lang);
        } else if let Some(data_type) = &self.data_type {
            out.push_str("^^");
            out.push_str(&data_type.to_ref());
        }
        out
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A value bound to a variable in one result row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// `<uri>` binding
    Iri(Iri),
    /// `<literal>` binding
    Literal(Literal),
    /// `<bnode>` binding, opaque outside its result set
    BlankNode(String),
    /// Boolean value reported directly by a lenient JSON endpoint
    Boolean(bool),
}

impl Term {
    /// Natural text form: IRI text, literal lexical form, blank node label
    pub fn as_text(&self) -> String {
        match self {
            Term::Iri(iri) => iri.as_str().to_string(),
            Term::Literal(literal) => literal.value.clone(),
            Term::BlankNode(id) => id.clone(),
            Term::Boolean(b) => b.to_string(),
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Literal(literal) => write!(f, "\"{}\"", literal.value),
            Term::BlankNode(id) => write!(f, "_:{}", id),
            Term::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// One result row: variable name → bound value. Unbound variables are absent.
pub type Solution = HashMap<String, Term>;
