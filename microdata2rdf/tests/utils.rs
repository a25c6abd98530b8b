use std::collections::BTreeSet;

use itertools::Itertools;
use microdata2rdf::{Extractor, Extras, Options, Registry, Triples};
use oxrdf::Graph;

pub const BASE: &str = "http://example.org/";

pub fn serialize_graph(graph: Graph, base: &str) -> String {
    // NB: we use rdf_canon here because the one provided by oxrdf hangs
    let idents = rdf_canon::issue_graph_with::<sha2::Sha256>(&graph, &Default::default()).unwrap();
    let graph = rdf_canon::relabel_graph(&graph, &idents).unwrap();

    let mut output = Vec::new();
    let mut ttl = oxttl::TurtleSerializer::new().with_base_iri(base).unwrap();

    // slow but makes test output nicer
    let mut prefixes_to_use = BTreeSet::new();
    let mut add_prefix = |full_iri: &str| {
        if let Some((known_prefix, iri)) = microdata2rdf::well_known_prefixes()
            .mappings()
            .find(|(_, iri)| full_iri.starts_with(iri.as_str()))
        {
            prefixes_to_use.insert((known_prefix.clone(), iri.clone()));
        }
    };

    for triple in graph.iter() {
        if let oxrdf::SubjectRef::NamedNode(n) = triple.subject {
            add_prefix(n.as_str());
        }

        add_prefix(triple.predicate.as_str());

        if let oxrdf::TermRef::NamedNode(n) = triple.object {
            add_prefix(n.as_str());
        } else if let oxrdf::TermRef::Literal(l) = triple.object {
            if !l.is_plain() {
                add_prefix(l.datatype().as_str());
            }
        }
    }

    for (prefix, iri) in prefixes_to_use {
        ttl = ttl.with_prefix(prefix, iri).unwrap();
    }

    let mut ttl = ttl.for_writer(&mut output);
    for triple in graph.iter().sorted_by_cached_key(|t| {
        (
            t.subject.to_string(),
            if t.predicate.as_str() == "http://www.w3.org/1999/02/22-rdf-syntax-ns#type" {
                // make "a" come first
                None
            } else {
                Some(t.predicate.to_string())
            },
            t.object.to_string(),
        )
    }) {
        ttl.serialize_triple(triple).unwrap();
    }

    ttl.finish().unwrap();

    String::from_utf8_lossy(&output).into_owned()
}

#[allow(unused)]
pub fn graph_of(triples: &Triples) -> Graph {
    let mut graph = Graph::new();
    for triple in triples {
        graph.insert(&oxrdf::Triple::try_from(triple).unwrap());
    }
    graph
}

#[allow(unused)]
pub fn turtle_graph(ttl: &str) -> Graph {
    let mut ttl_graph = Graph::new();
    let ttl_rdf = oxttl::TurtleParser::new()
        .with_base_iri(BASE)
        .unwrap()
        .for_slice(ttl.as_bytes());
    for triple in ttl_rdf {
        ttl_graph.insert(&triple.unwrap());
    }
    ttl_graph
}

/// Compares extracted triples with Turtle, up to blank node renaming.
#[allow(unused)]
pub fn assert_triples(triples: &Triples, ttl: &str) {
    let output = serialize_graph(graph_of(triples), BASE);
    let ttl_output = serialize_graph(turtle_graph(ttl), BASE);

    pretty_assertions::assert_eq!(output, ttl_output);
}

#[allow(unused)]
pub fn assert_html(html: &str, extras: Extras, ttl: &str) {
    let extractor = Extractor::new(Registry::builtin(), Options::with_extras(extras));
    let mut output_graph = Graph::new();
    let mut processor_graph = Graph::new();
    let base = oxiri::Iri::parse(BASE.to_string()).unwrap();
    microdata2rdf::process(html, base, &extractor, &mut output_graph, &mut processor_graph)
        .unwrap();

    assert!(
        processor_graph.is_empty(),
        "unexpected processor output:\n{}",
        serialize_graph(processor_graph, BASE)
    );

    let output = serialize_graph(output_graph, BASE);
    let ttl_output = serialize_graph(turtle_graph(ttl), BASE);

    pretty_assertions::assert_eq!(output, ttl_output);
}

/// Extracts with the built-in registry and a fixed blank node prefix.
#[allow(unused)]
pub fn extract(items: &[microdata2rdf::Item], extras: Extras) -> Triples {
    extract_with(Registry::builtin(), items, extras)
}

#[allow(unused)]
pub fn extract_with(registry: &Registry, items: &[microdata2rdf::Item], extras: Extras) -> Triples {
    let options = Options::with_extras(extras).with_blank_node_prefix("b");
    Extractor::new(registry, options).extract(items, BASE)
}
