//! Discovery of Microdata items in an HTML document.
//!
//! This implements the item and property crawl of the HTML Microdata
//! specification on top of a `scraper` DOM.

use std::collections::{HashMap, HashSet};

use ego_tree::NodeId;
use indexmap::IndexMap;
use itertools::Itertools;
use oxiri::Iri;
use scraper::{ElementRef, Html};

use crate::Error;
use crate::item::{Item, LiteralValue, PropertyValue};
use crate::triple::BlankNodes;

/// The items of one HTML document.
#[derive(Clone, Debug)]
pub struct Document {
    /// The document base, after applying any `<base href>`.
    pub base: Iri<String>,
    /// Top-level items (`itemscope` without `itemprop`), in tree order.
    pub items: Vec<Item>,
}

pub fn items_from_html(input: &str, base: Iri<String>) -> Result<Document, Error> {
    let html = Html::parse_document(input);
    for err in html.errors.iter() {
        tracing::debug!(%err, "HTML parse error");
    }

    let base = document_base(&html, base)?;
    let items = Collector::new(&html, &base).top_level_items();
    tracing::debug!(base = %base, items = items.len(), "collected microdata items");

    Ok(Document { base, items })
}

fn document_base(html: &Html, base: Iri<String>) -> Result<Iri<String>, Error> {
    let href = html
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "base")
        .find_map(|el| el.value().attr("href"));

    match href {
        Some(href) => {
            let resolved = base.resolve(href).map_err(|source| Error::IriParseError {
                source,
                iri: href.to_string(),
            })?;
            tracing::debug!(base = %resolved, "<base> found");
            Ok(resolved)
        }
        None => Ok(base),
    }
}

struct Collector<'a> {
    base: &'a Iri<String>,
    /// All elements, in tree order.
    elements: Vec<ElementRef<'a>>,
    positions: HashMap<NodeId, usize>,
    /// First element carrying each `id`.
    by_id: HashMap<&'a str, ElementRef<'a>>,
    /// Items currently being built, innermost last.
    in_progress: Vec<NodeId>,
    /// Blank node identifiers handed out for items referenced from inside
    /// themselves.
    shared_ids: HashMap<NodeId, String>,
    blank_nodes: BlankNodes,
}

impl<'a> Collector<'a> {
    fn new(html: &'a Html, base: &'a Iri<String>) -> Self {
        let elements = html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .collect::<Vec<_>>();

        let positions = elements
            .iter()
            .enumerate()
            .map(|(position, el)| (el.id(), position))
            .collect();

        let mut by_id = HashMap::new();
        for el in &elements {
            if let Some(id) = el.value().attr("id") {
                by_id.entry(id).or_insert(*el);
            }
        }

        Self {
            base,
            elements,
            positions,
            by_id,
            in_progress: Vec::new(),
            shared_ids: HashMap::new(),
            blank_nodes: BlankNodes::new(None),
        }
    }

    fn top_level_items(mut self) -> Vec<Item> {
        let roots = self
            .elements
            .iter()
            .filter(|el| {
                let el = el.value();
                el.attr("itemscope").is_some() && el.attr("itemprop").is_none()
            })
            .copied()
            .collect::<Vec<_>>();

        roots.into_iter().map(|root| self.item(root)).collect()
    }

    fn item(&mut self, element: ElementRef<'a>) -> Item {
        let key = element.id();
        self.in_progress.push(key);

        let types = element
            .value()
            .attr("itemtype")
            .unwrap_or_default()
            .split_ascii_whitespace()
            .filter(|ty| Iri::parse(*ty).is_ok())
            .map(str::to_string)
            .collect();

        let mut item = Item {
            id: None,
            types,
            properties: IndexMap::new(),
        };

        for property in self.property_elements(element) {
            let names = property
                .value()
                .attr("itemprop")
                .unwrap_or_default()
                .split_ascii_whitespace()
                .unique()
                .collect::<Vec<_>>();

            let value = self.property_value(property);
            for name in names {
                item.add_property(name, value.clone());
            }
        }

        self.in_progress.pop();
        item.id = self
            .item_id(element)
            .or_else(|| self.shared_ids.get(&key).cloned());
        item
    }

    /// The property elements of an item, in tree order.
    fn property_elements(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let mut memory = HashSet::from([root.id()]);
        let mut pending = child_elements(root).collect::<Vec<_>>();

        if let Some(refs) = root.value().attr("itemref") {
            pending.extend(
                refs.split_ascii_whitespace()
                    .filter_map(|id| self.by_id.get(id).copied()),
            );
        }

        let mut results = Vec::new();
        while let Some(candidate) = pending.pop() {
            if !memory.insert(candidate.id()) {
                continue;
            }

            let el = candidate.value();
            if el.attr("itemscope").is_none() {
                pending.extend(child_elements(candidate));
            }

            if el.attr("itemprop").is_some_and(|names| !names.trim().is_empty()) {
                results.push(candidate);
            }
        }

        results.sort_by_key(|el| self.positions.get(&el.id()).copied());
        results
    }

    fn property_value(&mut self, element: ElementRef<'a>) -> PropertyValue {
        if element.value().attr("itemscope").is_some() {
            if self.in_progress.contains(&element.id()) {
                let reference = Item::new().with_id(self.reference_id(element));
                return PropertyValue::Item(reference);
            }

            return PropertyValue::Item(self.item(element));
        }

        PropertyValue::Literal(self.literal_value(element))
    }

    fn literal_value(&self, element: ElementRef<'a>) -> LiteralValue {
        let el = element.value();
        let name = el.name();

        let url_attribute = match name {
            "a" | "area" | "link" => Some("href"),
            "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => Some("src"),
            "object" => Some("data"),
            _ => None,
        };

        let value = match url_attribute {
            Some(attribute) => match el.attr(attribute).and_then(|url| self.resolve(url)) {
                Some(iri) => LiteralValue::uri(iri.into_inner()),
                None => LiteralValue::text(""),
            },
            None => {
                let text = match name {
                    "meta" => el.attr("content").unwrap_or_default().to_string(),
                    "data" | "meter" => el.attr("value").unwrap_or_default().to_string(),
                    "time" => match el.attr("datetime") {
                        Some(datetime) => datetime.to_string(),
                        None => element.text().collect(),
                    },
                    _ => element.text().collect(),
                };

                let literal = LiteralValue::text(text);
                match el.attr("lang") {
                    Some(lang) => literal.with_lang(lang),
                    None => literal,
                }
            }
        };

        value.with_element(name)
    }

    fn item_id(&self, element: ElementRef<'a>) -> Option<String> {
        let id = element.value().attr("itemid")?;
        self.resolve(id).map(Iri::into_inner)
    }

    /// Identifier for an item that is referenced while it is still being
    /// built.
    fn reference_id(&mut self, element: ElementRef<'a>) -> String {
        if let Some(id) = self.item_id(element) {
            return id;
        }

        let blank_nodes = &mut self.blank_nodes;
        self.shared_ids
            .entry(element.id())
            .or_insert_with(|| blank_nodes.fresh().to_string())
            .clone()
    }

    fn resolve(&self, value: &str) -> Option<Iri<String>> {
        match self.base.resolve(value.trim()) {
            Ok(iri) => Some(iri),
            Err(err) => {
                tracing::warn!(value, %err, "ignoring unresolvable URL");
                None
            }
        }
    }
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}
