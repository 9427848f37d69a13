use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::{Annotation, AnnotationId, Document, Value};

/// Accumulates annotation records over a fixed text.
///
/// Ids are handed out in insertion order, so a record may reference any
/// record added before it; forward references are set afterwards with
/// [`DocumentBuilder::set`].
pub struct DocumentBuilder {
    text: String,
    annotations: Vec<Annotation>,
}

impl DocumentBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotations: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id.index())
    }

    pub fn add(&mut self, annotation: Annotation) -> AnnotationId {
        let id = AnnotationId(self.annotations.len() as u32);
        self.annotations.push(annotation);
        id
    }

    /// Set a feature on an already added record. Unknown ids are ignored.
    pub fn set(
        &mut self,
        id: AnnotationId,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        match self.annotations.get_mut(id.index()) {
            Some(annotation) => annotation.set_feature(name.into(), value.into()),
            None => debug!(%id, "ignoring feature on unknown record"),
        }
        self
    }

    /// Add one `type_name` span per word-bound segment that is not whitespace.
    pub fn tokenize(&mut self, type_name: &str) -> Vec<AnnotationId> {
        let bounds: Vec<(usize, usize)> = self
            .text
            .split_word_bound_indices()
            .filter(|(_, segment)| !segment.trim().is_empty())
            .map(|(begin, segment)| (begin, begin + segment.len()))
            .collect();
        bounds
            .into_iter()
            .map(|(begin, end)| self.add(Annotation::span(type_name, begin, end)))
            .collect()
    }

    pub fn build(self) -> Document {
        Document {
            text: self.text,
            annotations: self.annotations,
        }
    }
}
