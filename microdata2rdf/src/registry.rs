//! The Microdata to RDF vocabulary registry.
//!
//! A registry maps vocabulary IRI prefixes to the rules used when generating
//! property IRIs, ordering multiple values, typing literals and expanding
//! vocabularies. The format is the JSON document published at
//! <http://www.w3.org/ns/md>; a copy of it is compiled in and available as
//! [`Registry::builtin`].

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub enum RegistryError {
    #[display("unable to read vocabulary registry `{}`", path.display())]
    Load {
        source: std::io::Error,
        path: PathBuf,
    },

    #[display("malformed vocabulary registry: {_0}")]
    Format(serde_json::Error),
}

/// The `propertyURI` setting of a vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyUriMode {
    #[default]
    Vocabulary,
    Contextual,
}

/// The `multipleValues` setting of a vocabulary or property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultipleValues {
    #[default]
    Unordered,
    List,
}

/// Per-property overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    #[serde(default)]
    pub multiple_values: Option<MultipleValues>,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub sub_property_of: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub equivalent_property: Vec<String>,
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(iri) => vec![iri],
        OneOrMany::Many(iris) => iris,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VocabularyDef {
    #[serde(rename = "propertyURI", default)]
    property_uri: PropertyUriMode,
    #[serde(default)]
    multiple_values: Option<MultipleValues>,
    #[serde(default)]
    properties: IndexMap<String, PropertyDef>,
}

/// How property IRIs are formed for items of a vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixScheme {
    /// The prefix ends in `#` or `/` and is used as-is.
    Vocabulary,
    /// The prefix needs a `#` appended before property names.
    VocabularyNeedsHash,
    /// Property IRIs are minted per type in the `md` namespace.
    Contextual,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    scheme: PrefixScheme,
    multiple_values: Option<MultipleValues>,
    properties: IndexMap<String, PropertyDef>,
}

impl Vocabulary {
    fn new(prefix: &str, def: VocabularyDef) -> Self {
        let scheme = match def.property_uri {
            PropertyUriMode::Contextual => PrefixScheme::Contextual,
            PropertyUriMode::Vocabulary if prefix.ends_with(['#', '/']) => {
                PrefixScheme::Vocabulary
            }
            PropertyUriMode::Vocabulary => PrefixScheme::VocabularyNeedsHash,
        };

        Self {
            scheme,
            multiple_values: def.multiple_values,
            properties: def.properties,
        }
    }

    pub fn scheme(&self) -> PrefixScheme {
        self.scheme
    }

    /// The vocabulary-wide `multipleValues`, if declared.
    pub fn multiple_values(&self) -> Option<MultipleValues> {
        self.multiple_values
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }
}

/// Vocabulary prefixes and their rules, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    vocabularies: IndexMap<String, Vocabulary>,
}

impl Registry {
    /// A registry with no vocabularies; every type falls back to splitting
    /// its IRI.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in copy of the W3C registry (as of 2012-12-01).
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Registry::from_json(include_str!("md-registry.json"))
                .expect("built-in registry is well-formed")
        })
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let defs: IndexMap<String, VocabularyDef> =
            serde_json::from_str(json).map_err(RegistryError::Format)?;

        let vocabularies = defs
            .into_iter()
            .map(|(prefix, def)| {
                let vocabulary = Vocabulary::new(&prefix, def);
                (prefix, vocabulary)
            })
            .collect();

        Ok(Self { vocabularies })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Load {
            source,
            path: path.to_path_buf(),
        })?;

        let registry = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            vocabularies = registry.len(),
            "loaded vocabulary registry"
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.vocabularies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabularies.is_empty()
    }

    pub fn vocabulary(&self, prefix: &str) -> Option<&Vocabulary> {
        self.vocabularies.get(prefix)
    }

    pub fn property(&self, prefix: &str, name: &str) -> Option<&PropertyDef> {
        self.vocabulary(prefix)?.property(name)
    }

    /// Prefixes in declaration order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.vocabularies.keys().map(String::as_str)
    }

    /// The first declared prefix that `iri` starts with. Declaration order
    /// decides, not prefix length.
    pub fn match_prefix(&self, iri: &str) -> Option<(&str, &Vocabulary)> {
        self.vocabularies
            .iter()
            .find(|(prefix, _)| iri.starts_with(prefix.as_str()))
            .map(|(prefix, vocabulary)| (prefix.as_str(), vocabulary))
    }
}
