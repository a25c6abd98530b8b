use vec1::Vec1;

use crate::collection;
use crate::extract::{Extras, ParseContext, Relation};
use crate::triple::{Object, Subject, Triple, TripleSink};
use crate::vocab;

impl<S: TripleSink + ?Sized> ParseContext<'_, S> {
    /// Document-level triples, generated once every top-level item has been
    /// extracted.
    pub(crate) fn emit_extras(&mut self, top_items: Vec<Object>) {
        let document = Subject::Iri(self.base.to_string());

        if self.extras.contains(Extras::TOP_ITEMS) {
            if let Ok(top_items) = Vec1::try_from_vec(top_items) {
                collection::build(
                    top_items,
                    document.clone(),
                    vocab::md::ITEM.as_str(),
                    &mut self.blank_nodes,
                    &mut *self.sink,
                );
            }
        }

        if self.extras.contains(Extras::USES_VOCABULARY) {
            let used = std::mem::take(&mut self.used_vocabularies);
            for prefix in used.into_keys() {
                self.emit(Triple::new(
                    document.clone(),
                    vocab::rdfa::USES_VOCABULARY.as_str(),
                    Object::Iri(prefix),
                ));
            }
        }

        // Only the property relationships are asserted; types implied by
        // equivalentProperty are left to a reasoner.
        if self.extras.contains(Extras::VOCAB_ENTAILMENT) {
            let expanded = std::mem::take(&mut self.expanded);
            for relation in Relation::ALL {
                let predicate = match relation {
                    Relation::EquivalentProperty => vocab::owl::EQUIVALENT_PROPERTY,
                    Relation::SubPropertyOf => vocab::rdfs::SUB_PROPERTY_OF,
                };

                for ((_, original), entailed) in expanded.iter().filter(|((r, _), _)| *r == relation) {
                    for entailed in entailed.keys() {
                        self.emit(Triple::new(
                            Subject::Iri(original.clone()),
                            predicate.as_str(),
                            Object::iri(entailed.as_str()),
                        ));
                    }
                }
            }
        }
    }
}
