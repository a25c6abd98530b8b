use std::borrow::Cow;

use indexmap::IndexMap;

use crate::extract::Extras;
use crate::registry::{PrefixScheme, Registry};

/// Namespace under which contextual property IRIs are minted.
pub const CONTEXTUAL_NAMESPACE: &str = "http://www.w3.org/ns/md";

/// The base used to expand property names of an item, and the registry
/// prefix (if any) whose per-property rules apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VocabBase<'r> {
    pub base: String,
    pub prefix: Option<&'r str>,
}

/// Resolves the vocabulary of an item from its first type.
///
/// With [`Extras::PROPERTY_URI`] the first registry prefix the type starts
/// with is used (and counted in `usage`); otherwise, or when nothing
/// matches, the type IRI is cut after its last `#` or `/`.
pub(crate) fn find_vocab_base<'r>(
    registry: &'r Registry,
    extras: Extras,
    type_uri: &str,
    usage: &mut IndexMap<String, usize>,
) -> VocabBase<'r> {
    if extras.contains(Extras::PROPERTY_URI) {
        if let Some((prefix, vocabulary)) = registry.match_prefix(type_uri) {
            *usage.entry(prefix.to_string()).or_default() += 1;

            let base = match vocabulary.scheme() {
                PrefixScheme::Contextual => format!(
                    "{CONTEXTUAL_NAMESPACE}?type={}&prop=",
                    frag_escape(type_uri)
                ),
                PrefixScheme::VocabularyNeedsHash => format!("{prefix}#"),
                PrefixScheme::Vocabulary => prefix.to_string(),
            };

            tracing::trace!(type_uri, prefix, base = %base, "vocabulary from registry");
            return VocabBase {
                base,
                prefix: Some(prefix),
            };
        }
    }

    let (namespace, _) = split_iri(type_uri);
    tracing::trace!(type_uri, base = namespace, "vocabulary from type IRI");
    VocabBase {
        base: namespace.to_string(),
        prefix: None,
    }
}

/// Splits an IRI into namespace and local name after the last `#` or `/`,
/// or failing that the last `:`.
pub fn split_iri(iri: &str) -> (&str, &str) {
    let at = iri.rfind(['#', '/']).or_else(|| iri.rfind(':'));
    match at {
        Some(at) => iri.split_at(at + 1),
        None => (iri, ""),
    }
}

/// Percent-encodes the characters HTML's "fragment-escape" covers:
/// `" # % < > [ \ ] ^ { | }`.
pub fn frag_escape(uri: &str) -> Cow<'_, str> {
    const ESCAPED: [char; 12] = ['"', '#', '%', '<', '>', '[', '\\', ']', '^', '{', '|', '}'];

    if !uri.contains(ESCAPED) {
        return Cow::Borrowed(uri);
    }

    let mut escaped = String::with_capacity(uri.len() + 8);
    for c in uri.chars() {
        if ESCAPED.contains(&c) {
            escaped.push_str(&format!("%{:02X}", c as u32));
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}
