//! Structural comparison of annotation records.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;

use crate::adapter::{AdapterRegistry, TypeAdapter};
use crate::document::{AnnotationId, Document, RecordRef, Value};
use crate::position::Position;

/// Nesting limit when following references into records without a range.
pub const MAX_NESTING_DEPTH: usize = 16;

/// Decides whether two records are the same annotation.
///
/// Label features are visited in sorted order; the sorted list is computed
/// once per type and kept for the life of the engine.
#[derive(Debug)]
pub struct StructuralEquality {
    adapters: AdapterRegistry,
    sorted_labels: RefCell<HashMap<String, Rc<[String]>>>,
}

impl StructuralEquality {
    pub fn new(adapters: AdapterRegistry) -> Self {
        Self {
            adapters,
            sorted_labels: RefCell::new(HashMap::new()),
        }
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub(crate) fn into_registry(self) -> AdapterRegistry {
        self.adapters
    }

    /// Position of a record taken at revision 0, for comparing referenced
    /// records by where they are.
    pub fn position_of(&self, record: &RecordRef<'_>) -> Position {
        self.adapters.resolve(record.type_name()).position(0, record)
    }

    pub fn equal(&self, a: Option<&RecordRef<'_>>, b: Option<&RecordRef<'_>>) -> bool {
        self.equal_at_depth(a, b, 0)
    }

    fn equal_at_depth(
        &self,
        a: Option<&RecordRef<'_>>,
        b: Option<&RecordRef<'_>>,
        depth: usize,
    ) -> bool {
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            (None, None) => return true,
            _ => return false,
        };
        if a.is_same(b) {
            return true;
        }
        if a.type_name() != b.type_name() {
            return false;
        }

        let labels = self.sorted_labels(a.type_name());
        labels.iter().all(|label| {
            self.values_equal(
                a.feature(label),
                a.document(),
                b.feature(label),
                b.document(),
                depth,
            )
        })
    }

    fn values_equal(
        &self,
        a: &Value,
        a_doc: &Document,
        b: &Value,
        b_doc: &Document,
        depth: usize,
    ) -> bool {
        match (a, b) {
            (Value::Subject, _) | (_, Value::Subject) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Record(x), Value::Record(y)) => self.nested_equal(a_doc, *x, b_doc, *y, depth),
            (Value::Records(xs), Value::Records(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|(x, y)| self.nested_equal(a_doc, *x, b_doc, *y, depth))
            }
            _ => false,
        }
    }

    fn nested_equal(
        &self,
        a_doc: &Document,
        a: AnnotationId,
        b_doc: &Document,
        b: AnnotationId,
        depth: usize,
    ) -> bool {
        let (a, b) = match (a_doc.record(a), b_doc.record(b)) {
            (Some(a), Some(b)) => (a, b),
            (None, None) => return true,
            _ => return false,
        };
        if a.is_same(&b) {
            return true;
        }
        if a.type_name() != b.type_name() {
            return false;
        }
        // positioned records stand for themselves
        if a.range().is_some() || b.range().is_some() {
            return self.position_of(&a) == self.position_of(&b);
        }
        if depth >= MAX_NESTING_DEPTH {
            warn!(
                type_name = a.type_name(),
                depth, "nesting limit reached, treating records as different"
            );
            return false;
        }
        self.equal_at_depth(Some(&a), Some(&b), depth + 1)
    }

    fn sorted_labels(&self, type_name: &str) -> Rc<[String]> {
        if let Some(labels) = self.sorted_labels.borrow().get(type_name) {
            return Rc::clone(labels);
        }
        let adapter = self.adapters.resolve(type_name);
        let labels = canonical_labels(&adapter);
        self.sorted_labels
            .borrow_mut()
            .insert(type_name.to_string(), Rc::clone(&labels));
        labels
    }
}

fn canonical_labels(adapter: &TypeAdapter) -> Rc<[String]> {
    let mut labels: Vec<String> = adapter.labels().map(str::to_string).collect();
    labels.sort();
    labels.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Annotation;

    fn engine(adapters: Vec<TypeAdapter>) -> StructuralEquality {
        StructuralEquality::new(AdapterRegistry::new(adapters).unwrap())
    }

    fn pos_engine() -> StructuralEquality {
        engine(vec![TypeAdapter::span("POS", ["PosValue", "Coarse"])])
    }

    fn single(annotation: Annotation) -> (Document, AnnotationId) {
        let mut builder = Document::builder("The cat sat");
        let id = builder.add(annotation);
        (builder.build(), id)
    }

    #[test]
    fn test_equal_labels() {
        let eq = pos_engine();
        let (a, a_id) = single(
            Annotation::span("POS", 0, 3)
                .with("PosValue", "DT")
                .with("Noise", 1),
        );
        let (b, b_id) = single(
            Annotation::span("POS", 0, 3)
                .with("PosValue", "DT")
                .with("Noise", 2),
        );
        assert!(eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
    }

    #[test]
    fn test_unset_equals_null_only() {
        let eq = pos_engine();
        let (a, a_id) = single(Annotation::span("POS", 0, 3).with("PosValue", "DT"));
        let (b, b_id) = single(
            Annotation::span("POS", 0, 3)
                .with("PosValue", "DT")
                .with("Coarse", Value::Null),
        );
        let (c, c_id) = single(
            Annotation::span("POS", 0, 3)
                .with("PosValue", "DT")
                .with("Coarse", ""),
        );
        assert!(eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
        assert!(!eq.equal(a.record(a_id).as_ref(), c.record(c_id).as_ref()));
    }

    #[test]
    fn test_scalar_kinds_differ() {
        let eq = engine(vec![TypeAdapter::span("Num", ["value"])]);
        let (a, a_id) = single(Annotation::span("Num", 0, 3).with("value", 1));
        let (b, b_id) = single(Annotation::span("Num", 0, 3).with("value", 1.0));
        assert!(!eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
    }

    #[test]
    fn test_absent_and_type_mismatch() {
        let eq = pos_engine();
        let (a, a_id) = single(Annotation::span("POS", 0, 3));
        let (b, b_id) = single(Annotation::span("Lemma", 0, 3));
        assert!(!eq.equal(a.record(a_id).as_ref(), None));
        assert!(!eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
    }

    #[test]
    fn test_subject_is_skipped() {
        let eq = engine(vec![TypeAdapter::span("Meta", ["sofa", "value"])]);
        let (a, a_id) = single(
            Annotation::span("Meta", 0, 3)
                .with("sofa", Value::Subject)
                .with("value", "x"),
        );
        let (b, b_id) = single(Annotation::span("Meta", 0, 3).with("value", "x"));
        assert!(eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
    }

    #[test]
    fn test_nested_span_compared_by_position() {
        let eq = engine(vec![
            TypeAdapter::span("Lemma", ["value"]),
            TypeAdapter::span("Token", ["lemma"]),
        ]);
        let build = |lemma: &str, begin: usize| {
            let mut builder = Document::builder("The cat sat");
            let l = builder.add(Annotation::span("Lemma", begin, 3).with("value", lemma));
            let t = builder.add(Annotation::span("Token", 0, 3).with("lemma", l));
            (builder.build(), t)
        };
        let (a, a_id) = build("the", 0);
        let (b, b_id) = build("THE", 0);
        let (c, c_id) = build("the", 1);
        // label of the nested span is not looked at
        assert!(eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
        assert!(!eq.equal(a.record(a_id).as_ref(), c.record(c_id).as_ref()));
    }

    #[test]
    fn test_nested_feature_structure_recurses() {
        let eq = engine(vec![
            TypeAdapter::span("Entity", ["info"]),
            TypeAdapter::span("Info", ["kind"]),
        ]);
        let build = |kind: &str| {
            let mut builder = Document::builder("The cat sat");
            let info = builder.add(Annotation::record("Info").with("kind", kind));
            let e = builder.add(Annotation::span("Entity", 4, 7).with("info", info));
            (builder.build(), e)
        };
        let (a, a_id) = build("animal");
        let (b, b_id) = build("animal");
        let (c, c_id) = build("plant");
        assert!(eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
        assert!(!eq.equal(a.record(a_id).as_ref(), c.record(c_id).as_ref()));
    }

    #[test]
    fn test_record_lists_elementwise() {
        let eq = engine(vec![
            TypeAdapter::span("Entity", ["infos"]),
            TypeAdapter::span("Info", ["kind"]),
        ]);
        let build = |kinds: &[&str]| {
            let mut builder = Document::builder("The cat sat");
            let infos: Vec<AnnotationId> = kinds
                .iter()
                .map(|kind| builder.add(Annotation::record("Info").with("kind", *kind)))
                .collect();
            let e = builder.add(Annotation::span("Entity", 4, 7).with("infos", infos));
            (builder.build(), e)
        };
        let (a, a_id) = build(&["x", "y"]);
        let (b, b_id) = build(&["x", "y"]);
        let (c, c_id) = build(&["y", "x"]);
        let (d, d_id) = build(&["x"]);
        assert!(eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
        assert!(!eq.equal(a.record(a_id).as_ref(), c.record(c_id).as_ref()));
        assert!(!eq.equal(a.record(a_id).as_ref(), d.record(d_id).as_ref()));
    }

    #[test]
    fn test_self_referencing_chain_is_bounded() {
        let eq = engine(vec![TypeAdapter::span("Node", ["next"])]);
        let build = || {
            let mut builder = Document::builder("loop");
            let first = builder.add(Annotation::record("Node"));
            let second = builder.add(Annotation::record("Node").with("next", first));
            builder.set(first, "next", second);
            let host = builder.add(Annotation::span("Node", 0, 4).with("next", first));
            (builder.build(), host)
        };
        let (a, a_id) = build();
        let (b, b_id) = build();
        assert!(!eq.equal(a.record(a_id).as_ref(), b.record(b_id).as_ref()));
    }

    #[test]
    fn test_identity() {
        let eq = engine(vec![]);
        let (a, a_id) = single(Annotation::span("POS", 0, 3).with("PosValue", "DT"));
        assert!(eq.equal(a.record(a_id).as_ref(), a.record(a_id).as_ref()));
    }
}
