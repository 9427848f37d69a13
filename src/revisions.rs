use indexmap::IndexMap;

use crate::document::Document;

/// Documents of a study: for each group, its revisions by index.
///
/// Groups keep insertion order, which is the order used for completeness
/// checks and reports. A `None` revision means the group never produced it.
#[derive(Debug, Clone, Default)]
pub struct GroupedRevisions {
    groups: IndexMap<String, Vec<Option<Document>>>,
}

impl GroupedRevisions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a group, returning the previous revisions.
    pub fn insert(
        &mut self,
        group: impl Into<String>,
        revisions: Vec<Option<Document>>,
    ) -> Option<Vec<Option<Document>>> {
        self.groups.insert(group.into(), revisions)
    }

    pub fn with(mut self, group: impl Into<String>, revisions: Vec<Option<Document>>) -> Self {
        self.insert(group, revisions);
        self
    }

    /// A group owning a single present revision.
    pub fn with_document(self, group: impl Into<String>, document: Document) -> Self {
        self.with(group, vec![Some(document)])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<Document>])> {
        self.groups.iter().map(|(g, r)| (g.as_str(), r.as_slice()))
    }

    pub fn revisions(&self, group: &str) -> Option<&[Option<Document>]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    pub fn document(&self, group: &str, revision: usize) -> Option<&Document> {
        self.groups.get(group)?.get(revision)?.as_ref()
    }
}
