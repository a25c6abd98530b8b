use oxrdf::vocab::rdf;
use vec1::Vec1;

use crate::triple::{BlankNodes, Object, Subject, Triple, TripleSink};

/// Emits `subject predicate ( o1 o2 ... on )` as an RDF collection.
///
/// The head is linked first, then one `rdf:first`/`rdf:rest` pair per
/// member, each on a fresh blank node; the last `rdf:rest` is `rdf:nil`.
pub(crate) fn build<S: TripleSink + ?Sized>(
    objects: Vec1<Object>,
    subject: Subject,
    predicate: &str,
    blank_nodes: &mut BlankNodes,
    sink: &mut S,
) {
    let mut node = blank_nodes.fresh();
    sink.accept(Triple::new(subject, predicate, node.clone()));

    let (init, last) = objects.split_off_last();
    for member in init {
        let next = blank_nodes.fresh();
        add_member(node, member, next.clone().into(), sink);
        node = next;
    }

    add_member(node, last, Object::iri(rdf::NIL.as_str()), sink);
}

fn add_member<S: TripleSink + ?Sized>(node: Subject, member: Object, rest: Object, sink: &mut S) {
    sink.accept(Triple::new(node.clone(), rdf::FIRST.as_str(), member));
    sink.accept(Triple::new(node, rdf::REST.as_str(), rest));
}
