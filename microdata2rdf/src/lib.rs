//! Microdata to RDF.
//!
//! Converts HTML Microdata items into RDF triples following the W3C
//! ["Microdata to RDF"](https://www.w3.org/TR/microdata-rdf/) note,
//! including the optional registry-driven extras (property IRI schemes,
//! ordered values, datatypes, vocabulary expansion and entailment).
//!
//! ```
//! use microdata2rdf::{Extractor, Item, LiteralValue, Options, Registry};
//!
//! let person = Item::new()
//!     .with_type("http://schema.org/Person")
//!     .with_property("name", LiteralValue::text("Alice"));
//!
//! let extractor = Extractor::new(Registry::builtin(), Options::default());
//! let triples = extractor.extract(&[person], "http://example.org/");
//! assert_eq!(triples.len(), 2);
//! ```

use oxiri::Iri;
use oxrdf::{Graph, TripleRef};

mod collection;
pub mod datatype;
mod extract;
pub mod html;
mod item;
mod policy;
mod post;
pub mod registry;
mod triple;
pub mod vocabulary;

pub use extract::{Extractor, Extras, Options, Relation};
pub use item::{Item, LiteralValue, PropertyValue, ValueKind};
pub use policy::Policy;
pub use registry::{MultipleValues, PropertyDef, Registry, RegistryError};
pub use triple::{Object, Subject, TermError, Triple, TripleSink, Triples};

#[derive(derive_more::Error, derive_more::Display, derive_more::From, Debug)]
pub enum Error {
    #[display("IRI parse error: `{iri}`")]
    IriParseError {
        source: oxiri::IriParseError,
        iri: String,
    },

    Registry(RegistryError),
}

/// Extracts the Microdata of an HTML document into `output_graph`.
///
/// Problems that do not stop extraction, such as a triple that cannot be
/// represented in `oxrdf`, and errors that stop it, such as an invalid
/// `<base href>`, are reported as nodes in `processor_graph`. Returns the
/// number of triples extracted.
pub fn process(
    input: &str,
    base: Iri<String>,
    extractor: &Extractor<'_>,
    output_graph: &mut Graph,
    processor_graph: &mut Graph,
) -> Result<usize, Error> {
    let triples = match parse(input, base, extractor) {
        Ok(triples) => triples,
        Err(e) => {
            emit_processor(processor_graph, PGType::DocumentError, &e.to_string());
            return Ok(0);
        }
    };

    insert_triples(&triples, output_graph, processor_graph);
    Ok(triples.len())
}

/// Extracts the Microdata of an HTML document as ordered triples.
pub fn parse(input: &str, base: Iri<String>, extractor: &Extractor<'_>) -> Result<Triples, Error> {
    let document = html::items_from_html(input, base)?;
    Ok(extractor.extract(&document.items, document.base.as_str()))
}

/// Adds extracted triples to a graph, reporting the ones `oxrdf` rejects as
/// warnings in `processor_graph`.
pub fn insert_triples(triples: &Triples, output_graph: &mut Graph, processor_graph: &mut Graph) {
    for triple in triples {
        match oxrdf::Triple::try_from(triple) {
            Ok(triple) => {
                output_graph.insert(&triple);
            }
            Err(e) => {
                tracing::warn!(%triple, error = %e, "dropping unrepresentable triple");
                emit_processor(processor_graph, PGType::Warning, &format!("{e} in {triple}"));
            }
        }
    }
}

pub mod vocab {
    pub mod md {
        use oxrdf::NamedNodeRef;

        pub static ITEM: NamedNodeRef =
            NamedNodeRef::new_unchecked("http://www.w3.org/ns/md#item");
    }

    pub mod rdfa {
        use oxrdf::NamedNodeRef;

        pub static USES_VOCABULARY: NamedNodeRef =
            NamedNodeRef::new_unchecked("http://www.w3.org/ns/rdfa#usesVocabulary");

        pub static WARNING: NamedNodeRef =
            NamedNodeRef::new_unchecked("http://www.w3.org/ns/rdfa#Warning");

        pub static DOCUMENT_ERROR: NamedNodeRef =
            NamedNodeRef::new_unchecked("http://www.w3.org/ns/rdfa#DocumentError");
    }

    pub mod owl {
        use oxrdf::NamedNodeRef;

        pub static EQUIVALENT_PROPERTY: NamedNodeRef =
            NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#equivalentProperty");
    }

    pub mod rdfs {
        use oxrdf::NamedNodeRef;

        pub static SUB_PROPERTY_OF: NamedNodeRef =
            NamedNodeRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#subPropertyOf");
    }

    pub mod dc {
        use oxrdf::NamedNodeRef;

        pub static DESCRIPTION: NamedNodeRef =
            NamedNodeRef::new_unchecked("http://purl.org/dc/terms/description");
    }
}

enum PGType {
    Warning,
    DocumentError,
}

impl From<PGType> for oxrdf::NamedNodeRef<'static> {
    fn from(val: PGType) -> Self {
        match val {
            PGType::Warning => vocab::rdfa::WARNING,
            PGType::DocumentError => vocab::rdfa::DOCUMENT_ERROR,
        }
    }
}

fn emit_processor(pg: &mut Graph, pg_type: PGType, msg: &str) {
    let node = oxrdf::BlankNode::default();
    let pg_type: oxrdf::NamedNodeRef = pg_type.into();
    pg.insert(TripleRef::new(&node, oxrdf::vocab::rdf::TYPE, pg_type));
    pg.insert(TripleRef::new(
        &node,
        vocab::dc::DESCRIPTION,
        oxrdf::LiteralRef::new_simple_literal(msg),
    ));
}

/// Prefixes for the vocabularies that show up in extracted graphs, for use
/// when serializing.
pub fn well_known_prefixes() -> &'static curie::PrefixMapping {
    static PREFIXES: std::sync::OnceLock<curie::PrefixMapping> = std::sync::OnceLock::new();
    PREFIXES.get_or_init(|| {
        let mut mapping = curie::PrefixMapping::default();
        for (prefix, iri) in [
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
            ("owl", "http://www.w3.org/2002/07/owl#"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
            ("md", "http://www.w3.org/ns/md#"),
            ("rdfa", "http://www.w3.org/ns/rdfa#"),
            ("dcterms", "http://purl.org/dc/terms/"),
            ("schema", "http://schema.org/"),
            ("hcard", "http://microformats.org/profile/hcard#"),
            ("hcal", "http://microformats.org/profile/hcalendar#"),
        ] {
            mapping
                .add_prefix(prefix, iri)
                .expect("well-known prefixes are not reserved");
        }
        mapping
    })
}
