//! Immutable annotated documents.
//!
//! A [`Document`] is a text plus an arena of annotation records. Records are
//! addressed by [`AnnotationId`], which stays valid for the whole life of the
//! document, so a diff result can point back into the documents it was
//! computed from without copying them.

mod builder;
mod link;

pub use builder::DocumentBuilder;
pub use link::SlotLink;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Byte range within a document's text. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub begin: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `other` lies completely inside this range.
    pub fn covers(&self, other: &TextRange) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}

/// Stable address of an annotation record inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnnotationId(pub(crate) u32);

impl AnnotationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A feature value of an annotation record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unset feature
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Reference to another record of the same document
    Record(AnnotationId),
    /// Ordered list of records, e.g. the link records of a slot feature
    Records(Vec<AnnotationId>),
    /// Handle to the document's own text subject
    Subject,
}

static NULL_VALUE: Value = Value::Null;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<AnnotationId> {
        match self {
            Value::Record(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[AnnotationId]> {
        match self {
            Value::Records(ids) => Some(ids),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<AnnotationId> for Value {
    fn from(value: AnnotationId) -> Self {
        Value::Record(value)
    }
}

impl From<Vec<AnnotationId>> for Value {
    fn from(value: Vec<AnnotationId>) -> Self {
        Value::Records(value)
    }
}

/// A typed annotation record.
///
/// Span- and arc-style records carry a text range; plain feature structures
/// (link records, nested values) do not.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    type_name: String,
    range: Option<TextRange>,
    features: BTreeMap<String, Value>,
}

impl Annotation {
    /// A record anchored to `begin..end` of the text.
    pub fn span(type_name: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            type_name: type_name.into(),
            range: Some(TextRange::new(begin, end)),
            features: BTreeMap::new(),
        }
    }

    /// A record without a text range.
    pub fn record(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            range: None,
            features: BTreeMap::new(),
        }
    }

    /// Set a feature, consuming and returning the record.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.features.insert(name.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn range(&self) -> Option<TextRange> {
        self.range
    }

    /// Value of a feature, [`Value::Null`] when it was never set.
    pub fn feature(&self, name: &str) -> &Value {
        self.features.get(name).unwrap_or(&NULL_VALUE)
    }

    pub fn features(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn set_feature(&mut self, name: String, value: Value) {
        self.features.insert(name, value);
    }
}

/// An immutable text plus annotation graph snapshot.
#[derive(Clone)]
pub struct Document {
    text: String,
    annotations: Vec<Annotation>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text_len", &self.text.len())
            .field("annotation_count", &self.annotations.len())
            .finish()
    }
}

impl Document {
    /// Start building a document over `text`.
    pub fn builder(text: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder::new(text)
    }

    /// A document without any annotations.
    pub fn from_text(text: impl Into<String>) -> Self {
        DocumentBuilder::new(text).build()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of annotation records.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.get(id.index())
    }

    /// Resolve an id into a record handle bound to this document.
    pub fn record(&self, id: AnnotationId) -> Option<RecordRef<'_>> {
        self.annotation(id).map(|annotation| RecordRef {
            document: self,
            id,
            annotation,
        })
    }

    pub fn annotations(&self) -> impl Iterator<Item = (AnnotationId, &Annotation)> {
        self.annotations
            .iter()
            .enumerate()
            .map(|(idx, a)| (AnnotationId(idx as u32), a))
    }

    /// All records of `type_name`, in text index order.
    ///
    /// Positioned records sort by begin ascending, end descending, then id.
    /// Records without a range follow in id order.
    pub fn select(&self, type_name: &str) -> Vec<AnnotationId> {
        let mut ids: Vec<(AnnotationId, Option<TextRange>)> = self
            .annotations()
            .filter(|(_, a)| a.type_name == type_name)
            .map(|(id, a)| (id, a.range))
            .collect();
        ids.sort_by(|(a_id, a_range), (b_id, b_range)| match (a_range, b_range) {
            (Some(a), Some(b)) => a
                .begin
                .cmp(&b.begin)
                .then(b.end.cmp(&a.end))
                .then(a_id.cmp(b_id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a_id.cmp(b_id),
        });
        ids.into_iter().map(|(id, _)| id).collect()
    }

    /// Records of `type_name` lying completely inside `scope`.
    pub fn select_covered(&self, type_name: &str, scope: TextRange) -> Vec<AnnotationId> {
        self.select(type_name)
            .into_iter()
            .filter(|id| {
                self.annotation(*id)
                    .and_then(Annotation::range)
                    .map_or(false, |range| scope.covers(&range))
            })
            .collect()
    }

    /// Text under a positioned record.
    pub fn covered_text(&self, id: AnnotationId) -> Option<&str> {
        let range = self.annotation(id)?.range?;
        self.text.get(range.begin..range.end)
    }
}

/// A record together with the document it lives in.
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    document: &'a Document,
    id: AnnotationId,
    annotation: &'a Annotation,
}

impl<'a> RecordRef<'a> {
    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn annotation(&self) -> &'a Annotation {
        self.annotation
    }

    pub fn type_name(&self) -> &'a str {
        &self.annotation.type_name
    }

    pub fn range(&self) -> Option<TextRange> {
        self.annotation.range
    }

    pub fn feature(&self, name: &str) -> &'a Value {
        self.annotation.feature(name)
    }

    /// Follow a [`Value::Record`] feature to the referenced record.
    pub fn referenced(&self, name: &str) -> Option<RecordRef<'a>> {
        self.feature(name)
            .as_record()
            .and_then(|id| self.document.record(id))
    }

    /// Same document instance and same address.
    pub fn is_same(&self, other: &RecordRef<'_>) -> bool {
        std::ptr::eq(self.document, other.document) && self.id == other.id
    }
}

impl fmt::Display for RecordRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record_head(f, self.document, self.id)?;
        if self.annotation.features.is_empty() {
            return Ok(());
        }
        f.write_str(" {")?;
        for (idx, (name, value)) in self.annotation.features.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, " {}=", name)?;
            match value {
                Value::Null => f.write_str("null")?,
                Value::Bool(b) => write!(f, "{}", b)?,
                Value::Int(i) => write!(f, "{}", i)?,
                Value::Float(x) => write!(f, "{}", x)?,
                Value::Str(s) => write!(f, "{:?}", s)?,
                Value::Record(id) => write_record_head(f, self.document, *id)?,
                Value::Records(ids) => {
                    f.write_str("[")?;
                    for (i, id) in ids.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write_record_head(f, self.document, *id)?;
                    }
                    f.write_str("]")?;
                }
                Value::Subject => f.write_str("<subject>")?,
            }
        }
        f.write_str(" }")
    }
}

// Type[begin-end] for positioned records, Type#id otherwise.
fn write_record_head(
    f: &mut fmt::Formatter<'_>,
    document: &Document,
    id: AnnotationId,
) -> fmt::Result {
    match document.annotation(id) {
        Some(a) => match a.range {
            Some(range) => write!(f, "{}[{}]", short_type_name(&a.type_name), range),
            None => write!(f, "{}{}", short_type_name(&a.type_name), id),
        },
        None => write!(f, "<dangling {}>", id),
    }
}

/// Segment of a qualified type name after the last `.`.
pub fn short_type_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}
