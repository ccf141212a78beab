//! IRI references: full IRIs and prefixed names
//!
//! See <https://www.w3.org/TR/rdf-sparql-query/#rIRIref>.

use std::fmt;

/// Characters that may not appear raw inside `<...>` and their replacements.
///
/// This is a fixed substitution table, not percent-encoding: everything else,
/// including non-ASCII text, passes through untouched.
const IRI_ESCAPES: [(char, &str); 10] = [
    ('<', "%3C"),
    ('>', "%3E"),
    ('"', "%22"),
    (' ', "%20"),
    ('{', "%7B"),
    ('}', "%7D"),
    ('|', "%7C"),
    ('\\', "%5C"),
    ('^', "%5E"),
    ('`', "%60"),
];

fn escape_iri(iri: &str, out: &mut String) {
    for c in iri.chars() {
        match IRI_ESCAPES.iter().find(|(raw, _)| *raw == c) {
            Some((_, escaped)) => out.push_str(escaped),
            None => out.push(c),
        }
    }
}

/// An absolute IRI, e.g. `http://xmlns.com/foaf/0.1/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Iri(String);

impl Iri {
    /// Create a new IRI. The text is not validated.
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// Get the raw IRI string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw IRI string
    pub fn into_string(self) -> String {
        self.0
    }

    /// Render as an `IRI_REF`: `<` + escaped text + `>`
    pub fn to_ref(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        out.push('<');
        escape_iri(&self.0, &mut out);
        out.push('>');
        out
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(iri: &str) -> Self {
        Self::new(iri)
    }
}

impl From<String> for Iri {
    fn from(iri: String) -> Self {
        Self(iri)
    }
}

impl PartialEq<str> for Iri {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Iri {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A `prefix:local` name, resolved by the endpoint against the query's PREFIX lines
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefixedName(String);

impl PrefixedName {
    /// Create from a full `prefix:local` string
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create from separate prefix and local parts
    pub fn from_parts(prefix: &str, local: &str) -> Self {
        Self(format!("{}:{}", prefix, local))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefixed names are spliced verbatim
    pub fn to_ref(&self) -> String {
        self.0.clone()
    }
}

impl fmt::Display for PrefixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrefixedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Either form of IRI reference accepted wherever a datatype is expected
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IriRef {
    /// Full IRI, serialized in angle brackets
    Iri(Iri),
    /// Prefixed name, serialized verbatim
    Prefixed(PrefixedName),
}

impl IriRef {
    /// Render in query syntax
    pub fn to_ref(&self) -> String {
        match self {
            IriRef::Iri(iri) => iri.to_ref(),
            IriRef::Prefixed(name) => name.to_ref(),
        }
    }

    /// The full IRI, if this is not a prefixed name
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            IriRef::Iri(iri) => Some(iri),
            IriRef::Prefixed(_) => None,
        }
    }
}

impl From<Iri> for IriRef {
    fn from(iri: Iri) -> Self {
        IriRef::Iri(iri)
    }
}

impl From<PrefixedName> for IriRef {
    fn from(name: PrefixedName) -> Self {
        IriRef::Prefixed(name)
    }
}

impl fmt::Display for IriRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IriRef::Iri(iri) => iri.fmt(f),
            IriRef::Prefixed(name) => name.fmt(f),
        }
    }
}
