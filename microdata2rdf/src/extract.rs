//! The Microdata to RDF extraction algorithm.

use std::ops::{BitOr, BitOrAssign};

use indexmap::IndexMap;
use oxrdf::vocab::rdf;
use vec1::Vec1;

use crate::collection;
use crate::datatype;
use crate::item::{Item, PropertyValue, ValueKind};
use crate::policy::Policy;
use crate::registry::{MultipleValues, PropertyDef, Registry};
use crate::triple::{BlankNodes, Object, Subject, Triple, TripleSink, Triples};
use crate::vocabulary::{self, VocabBase};

/// Selects which triples beyond the plain Microdata model are generated.
///
/// Each flag corresponds to an optional part of the "Microdata to RDF"
/// note; flags combine with `|`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extras(u8);

impl Extras {
    pub const NONE: Self = Self(0);
    /// Use the registry's `propertyURI` to form property IRIs.
    pub const PROPERTY_URI: Self = Self(1);
    /// Use the registry's `multipleValues` (RDF collections for `list`).
    pub const MULTIPLE_VALUES: Self = Self(2);
    /// Emit triples for `subPropertyOf` and `equivalentProperty` targets.
    pub const VOCAB_EXPANSION: Self = Self(4);
    /// Type literals from the registry or from `time` values.
    pub const DATATYPE: Self = Self(8);
    /// Link the document to a collection of its top-level items.
    pub const TOP_ITEMS: Self = Self(16);
    /// Emit `rdfa:usesVocabulary` for each registry vocabulary used.
    pub const USES_VOCABULARY: Self = Self(32);
    /// Emit `owl:equivalentProperty` / `rdfs:subPropertyOf` for expansions.
    pub const VOCAB_ENTAILMENT: Self = Self(64);
    pub const ALL: Self = Self(127);

    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for Extras {
    fn default() -> Self {
        Self::PROPERTY_URI
    }
}

impl BitOr for Extras {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Extras {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub extras: Extras,
    /// Fixed prefix for generated blank node labels. When unset a random
    /// prefix is drawn for each extraction.
    pub blank_node_prefix: Option<String>,
}

impl Options {
    pub fn with_extras(extras: Extras) -> Self {
        Self {
            extras,
            ..Self::default()
        }
    }

    pub fn with_blank_node_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.blank_node_prefix = Some(prefix.into());
        self
    }
}

/// The two vocabulary expansion relations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    EquivalentProperty,
    SubPropertyOf,
}

impl Relation {
    pub const ALL: [Relation; 2] = [Relation::EquivalentProperty, Relation::SubPropertyOf];

    pub(crate) fn targets(self, def: &PropertyDef) -> &[String] {
        match self {
            Relation::EquivalentProperty => &def.equivalent_property,
            Relation::SubPropertyOf => &def.sub_property_of,
        }
    }
}

/// Converts item trees into triples using one registry and one set of
/// options. An extractor holds no per-document state and may be shared.
#[derive(Clone, Debug)]
pub struct Extractor<'r> {
    registry: &'r Registry,
    options: Options,
}

impl<'r> Extractor<'r> {
    pub fn new(registry: &'r Registry, options: Options) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Extracts the top-level `items` of the document at `base`.
    pub fn extract(&self, items: &[Item], base: &str) -> Triples {
        let mut triples = Triples::new();
        self.extract_into(items, base, &mut triples);
        triples
    }

    /// Like [`Self::extract`], sending triples to `sink` as they are made.
    pub fn extract_into<S: TripleSink + ?Sized>(&self, items: &[Item], base: &str, sink: &mut S) {
        let mut context = ParseContext::new(self.registry, &self.options, base, sink);

        let top_items = items
            .iter()
            .map(|item| Object::from(context.extract(item, None)))
            .collect::<Vec<_>>();

        context.emit_extras(top_items);
        tracing::debug!(
            items = items.len(),
            blank_nodes = context.blank_nodes_issued(),
            "extraction finished"
        );
    }
}

/// State owned by a single extraction.
pub(crate) struct ParseContext<'a, S: ?Sized> {
    pub(crate) registry: &'a Registry,
    pub(crate) extras: Extras,
    pub(crate) base: &'a str,
    /// Vocabulary of untyped items without a typed ancestor.
    fallback_vocab: String,
    pub(crate) blank_nodes: BlankNodes,
    /// Number of items that selected each registry prefix, in first-use order.
    pub(crate) used_vocabularies: IndexMap<String, usize>,
    /// (relation, original predicate) to entailed predicate to count.
    pub(crate) expanded: IndexMap<(Relation, String), IndexMap<String, usize>>,
    pub(crate) sink: &'a mut S,
}

impl<'a, S: TripleSink + ?Sized> ParseContext<'a, S> {
    fn new(registry: &'a Registry, options: &Options, base: &'a str, sink: &'a mut S) -> Self {
        Self {
            registry,
            extras: options.extras,
            base,
            fallback_vocab: format!("{}#", vocabulary::frag_escape(base)),
            blank_nodes: BlankNodes::new(options.blank_node_prefix.as_deref()),
            used_vocabularies: IndexMap::new(),
            expanded: IndexMap::new(),
            sink,
        }
    }

    fn blank_nodes_issued(&self) -> u64 {
        self.blank_nodes.issued()
    }

    pub(crate) fn emit(&mut self, triple: Triple) {
        tracing::trace!(%triple, "emitting triple");
        self.sink.accept(triple);
    }

    /// Emits the triples of `item` and returns its subject.
    ///
    /// `parent` is the vocabulary of the item this one is a property value
    /// of; untyped items use it for their own properties.
    pub(crate) fn extract(&mut self, item: &Item, parent: Option<&VocabBase<'a>>) -> Subject {
        let subject = match item.id() {
            Some(id) => Subject::from_id(id),
            None => self.blank_nodes.fresh(),
        };

        let vocab = match item.types.first() {
            Some(first_type) => {
                let vocab = vocabulary::find_vocab_base(
                    self.registry,
                    self.extras,
                    first_type,
                    &mut self.used_vocabularies,
                );

                for ty in &item.types {
                    self.emit(Triple::new(
                        subject.clone(),
                        rdf::TYPE.as_str(),
                        Object::iri(ty.as_str()),
                    ));
                }

                vocab
            }
            None => match parent {
                Some(parent) => parent.clone(),
                None => VocabBase {
                    base: self.fallback_vocab.clone(),
                    prefix: None,
                },
            },
        };

        self.add_properties(item, &subject, &vocab);
        subject
    }

    fn add_properties(&mut self, item: &Item, subject: &Subject, vocab: &VocabBase<'a>) {
        let registry = self.registry;
        let vocabulary = vocab.prefix.and_then(|prefix| registry.vocabulary(prefix));

        let default_order = Policy::resolve(
            vocabulary.and_then(|v| v.multiple_values()),
            None,
            MultipleValues::Unordered,
            self.extras,
        )
        .order;

        for (name, values) in &item.properties {
            let predicate = if is_absolute_iri(name) {
                name.clone()
            } else {
                format!("{}{}", vocab.base, name)
            };

            let def = vocabulary.and_then(|v| v.property(name));
            let policy = Policy::for_property(def, default_order, self.extras);

            let mut objects = Vec::with_capacity(values.len());
            for value in values {
                let object = self.value_object(value, &policy, vocab);

                if self.extras.contains(Extras::VOCAB_EXPANSION) {
                    if let Some(def) = def {
                        self.expand(def, subject, &predicate, &object);
                    }
                }

                objects.push(object);
            }

            match (policy.order, Vec1::try_from_vec(objects)) {
                (MultipleValues::List, Ok(objects)) => {
                    collection::build(
                        objects,
                        subject.clone(),
                        &predicate,
                        &mut self.blank_nodes,
                        &mut *self.sink,
                    );
                }
                (MultipleValues::Unordered, Ok(objects)) => {
                    for object in objects {
                        self.emit(Triple::new(subject.clone(), predicate.as_str(), object));
                    }
                }
                (_, Err(_)) => {}
            }
        }
    }

    fn value_object(&mut self, value: &PropertyValue, policy: &Policy, vocab: &VocabBase<'a>) -> Object {
        match value {
            PropertyValue::Item(nested) => self.extract(nested, Some(vocab)).into(),
            PropertyValue::Literal(literal) => match literal.kind {
                ValueKind::Uri => Object::Iri(literal.value.clone()),
                ValueKind::Literal => {
                    let language = literal.lang.clone().filter(|lang| !lang.is_empty());
                    let datatype = if language.is_none() && self.extras.contains(Extras::DATATYPE) {
                        datatype::infer(&literal.value, &literal.element, policy.datatype.as_deref())
                    } else {
                        None
                    };

                    Object::Literal {
                        value: literal.value.clone(),
                        language,
                        datatype,
                    }
                }
            },
        }
    }

    /// Emits one triple per `equivalentProperty`/`subPropertyOf` target of
    /// `def` and records the expansion for entailment.
    fn expand(&mut self, def: &PropertyDef, subject: &Subject, predicate: &str, object: &Object) {
        for relation in Relation::ALL {
            for entailed in relation.targets(def) {
                self.emit(Triple::new(subject.clone(), entailed.as_str(), object.clone()));

                *self
                    .expanded
                    .entry((relation, predicate.to_string()))
                    .or_default()
                    .entry(entailed.clone())
                    .or_default() += 1;
            }
        }
    }
}

/// Property names that are already absolute `http:`/`https:` IRIs are used
/// verbatim. Other colon-bearing tokens (`og:title`) are plain names.
fn is_absolute_iri(name: &str) -> bool {
    oxiri::Iri::parse(name).is_ok_and(|iri| matches!(iri.scheme(), "http" | "https"))
}
