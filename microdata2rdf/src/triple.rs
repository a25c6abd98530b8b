use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;

/// Subject of an output triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Iri(String),
    /// Blank node label, without the `_:` sigil.
    Blank(String),
}

impl Subject {
    /// Classifies an item identifier: `_:`-prefixed identifiers are blank
    /// nodes, everything else is an IRI.
    pub fn from_id(id: &str) -> Self {
        match id.strip_prefix("_:") {
            Some(label) => Subject::Blank(label.to_string()),
            None => Subject::Iri(id.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Subject::Blank(_))
    }
}

/// Object of an output triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Object {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

impl Object {
    pub fn iri(iri: impl Into<String>) -> Self {
        Object::Iri(iri.into())
    }

    pub fn simple_literal(value: impl Into<String>) -> Self {
        Object::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }
}

impl From<Subject> for Object {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Iri(iri) => Object::Iri(iri),
            Subject::Blank(label) => Object::Blank(label),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: String,
    pub object: Object,
}

impl Triple {
    pub fn new(subject: Subject, predicate: impl Into<String>, object: impl Into<Object>) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Iri(iri) => write!(f, "<{iri}>"),
            Subject::Blank(label) => write!(f, "_:{label}"),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Iri(iri) => write!(f, "<{iri}>"),
            Object::Blank(label) => write!(f, "_:{label}"),
            Object::Literal {
                value,
                language,
                datatype,
            } => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")?;
                if let Some(language) = language {
                    write!(f, "@{language}")
                } else if let Some(datatype) = datatype {
                    write!(f, "^^<{datatype}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// Receives the triples produced by an extraction.
pub trait TripleSink {
    /// Accepts a triple; returns whether it was newly added.
    fn accept(&mut self, triple: Triple) -> bool;
}

impl TripleSink for Vec<Triple> {
    fn accept(&mut self, triple: Triple) -> bool {
        self.push(triple);
        true
    }
}

/// An ordered triple buffer, optionally skipping duplicates.
#[derive(Clone, Debug, Default)]
pub struct Triples {
    triples: Vec<Triple>,
    seen: Option<HashSet<Triple>>,
}

impl Triples {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that drops triples identical to one already accepted.
    pub fn deduplicating() -> Self {
        Self {
            triples: Vec::new(),
            seen: Some(HashSet::new()),
        }
    }

    /// Total number of triples held.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    pub fn as_slice(&self) -> &[Triple] {
        &self.triples
    }

    pub fn into_vec(self) -> Vec<Triple> {
        self.triples
    }
}

impl TripleSink for Triples {
    fn accept(&mut self, triple: Triple) -> bool {
        if let Some(seen) = &mut self.seen {
            if !seen.insert(triple.clone()) {
                tracing::trace!(%triple, "skipping duplicate triple");
                return false;
            }
        }

        self.triples.push(triple);
        true
    }
}

impl<'a> IntoIterator for &'a Triples {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl IntoIterator for Triples {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

/// One triple per line, N-Triples style.
impl fmt::Display for Triples {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.triples.iter().join("\n"))
    }
}

/// Per-parse blank node allocator: `<prefix>1`, `<prefix>2`, ...
#[derive(Debug)]
pub(crate) struct BlankNodes {
    prefix: String,
    issued: u64,
}

impl BlankNodes {
    /// Without an explicit prefix a random one is chosen, so that labels from
    /// separate parses do not collide when merged.
    pub(crate) fn new(prefix: Option<&str>) -> Self {
        let prefix = match prefix {
            Some(prefix) => prefix.to_string(),
            None => {
                let random = oxrdf::BlankNode::default();
                let random = random.as_str();
                format!("md{}b", &random[..random.len().min(8)])
            }
        };

        Self { prefix, issued: 0 }
    }

    pub(crate) fn issued(&self) -> u64 {
        self.issued
    }

    pub(crate) fn fresh(&mut self) -> Subject {
        self.issued += 1;
        Subject::Blank(format!("{}{}", self.prefix, self.issued))
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub enum TermError {
    #[display("invalid IRI: <{iri}>")]
    InvalidIri {
        source: oxiri::IriParseError,
        iri: String,
    },

    #[display("invalid blank node label: _:{label}")]
    InvalidBlankNode {
        source: oxrdf::BlankNodeIdParseError,
        label: String,
    },

    #[display("invalid language tag: @{tag}")]
    InvalidLanguageTag {
        source: oxrdf::LanguageTagParseError,
        tag: String,
    },
}

fn named_node(iri: &str) -> Result<oxrdf::NamedNode, TermError> {
    oxrdf::NamedNode::new(iri).map_err(|source| TermError::InvalidIri {
        source,
        iri: iri.to_string(),
    })
}

fn blank_node(label: &str) -> Result<oxrdf::BlankNode, TermError> {
    oxrdf::BlankNode::new(label).map_err(|source| TermError::InvalidBlankNode {
        source,
        label: label.to_string(),
    })
}

impl TryFrom<&Triple> for oxrdf::Triple {
    type Error = TermError;

    fn try_from(triple: &Triple) -> Result<Self, Self::Error> {
        let subject: oxrdf::Subject = match &triple.subject {
            Subject::Iri(iri) => named_node(iri)?.into(),
            Subject::Blank(label) => blank_node(label)?.into(),
        };

        let predicate = named_node(&triple.predicate)?;

        let object: oxrdf::Term = match &triple.object {
            Object::Iri(iri) => named_node(iri)?.into(),
            Object::Blank(label) => blank_node(label)?.into(),
            Object::Literal {
                value,
                language: Some(tag),
                ..
            } => oxrdf::Literal::new_language_tagged_literal(value.as_str(), tag.as_str())
                .map_err(|source| TermError::InvalidLanguageTag {
                    source,
                    tag: tag.clone(),
                })?
                .into(),
            Object::Literal {
                value,
                language: None,
                datatype: Some(datatype),
            } => oxrdf::Literal::new_typed_literal(value.as_str(), named_node(datatype)?).into(),
            Object::Literal {
                value,
                language: None,
                datatype: None,
            } => oxrdf::Literal::new_simple_literal(value.as_str()).into(),
        };

        Ok(oxrdf::Triple::new(subject, predicate, object))
    }
}
