//! The Microdata item tree consumed by the extractor.
//!
//! Items are usually produced by [`crate::html::items_from_html`], but any
//! Microdata front end can build them directly.

use indexmap::{IndexMap, IndexSet};

/// A Microdata item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Item {
    /// Global identifier: an absolute IRI, or a blank node label starting
    /// with `_:`. `None` (or an empty string) means a fresh blank node is
    /// allocated for the item.
    pub id: Option<String>,
    /// Item types, in document order. Only the first one selects the
    /// vocabulary.
    pub types: IndexSet<String>,
    /// Property name to values, in first-seen order.
    pub properties: IndexMap<String, Vec<PropertyValue>>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.types.insert(ty.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.add_property(name, value);
        self
    }

    pub fn add_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// The identifier, treating an empty string as absent.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// The value of one `itemprop`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    Item(Item),
    Literal(LiteralValue),
}

impl From<Item> for PropertyValue {
    fn from(item: Item) -> Self {
        PropertyValue::Item(item)
    }
}

impl From<LiteralValue> for PropertyValue {
    fn from(literal: LiteralValue) -> Self {
        PropertyValue::Literal(literal)
    }
}

/// How the raw string of a non-item value is to be interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Literal,
    Uri,
}

/// A non-item property value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteralValue {
    pub value: String,
    pub kind: ValueKind,
    /// Only set when the property element itself carries `lang`; the
    /// language is never inherited from ancestors.
    pub lang: Option<String>,
    /// Local name of the element the value came from. Only `time` has an
    /// effect (datatype inference).
    pub element: String,
}

impl LiteralValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: ValueKind::Literal,
            lang: None,
            element: String::new(),
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Uri,
            ..Self::text(value)
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = element.into();
        self
    }
}
