//! Per-type descriptions of what makes two annotations "the same".

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::document::{RecordRef, SlotLink};
use crate::errors::DiffError;
use crate::position::{Extent, Position, PositionKind};

/// How a type is anchored in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterKind {
    /// Anchored at the record's own range.
    Span,
    /// Anchored at the ranges of the records referenced by two features.
    Arc { source: String, target: String },
    /// Stand-in for a type nobody described. Positional, no labels.
    Unknown,
}

/// A multi-valued feature holding link records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDecl {
    pub name: String,
    pub role_feature: String,
    /// `None` when links only carry a role
    pub target_feature: Option<String>,
}

impl SlotDecl {
    pub fn links<'a>(&self, record: &RecordRef<'a>) -> Vec<SlotLink<'a>> {
        record.links(&self.name, &self.role_feature, self.target_feature.as_deref())
    }

    pub fn link_at<'a>(&self, record: &RecordRef<'a>, index: usize) -> Option<SlotLink<'a>> {
        record.link_at(
            &self.name,
            index,
            &self.role_feature,
            self.target_feature.as_deref(),
        )
    }
}

/// Label features and slot declarations for one annotation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAdapter {
    type_name: String,
    kind: AdapterKind,
    labels: HashSet<String>,
    slots: Vec<SlotDecl>,
}

impl TypeAdapter {
    pub fn span<I, S>(type_name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            kind: AdapterKind::Span,
            labels: labels.into_iter().map(Into::into).collect(),
            slots: Vec::new(),
        }
    }

    pub fn arc<I, S>(
        type_name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        labels: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            kind: AdapterKind::Arc {
                source: source.into(),
                target: target.into(),
            },
            labels: labels.into_iter().map(Into::into).collect(),
            slots: Vec::new(),
        }
    }

    pub fn unknown(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: AdapterKind::Unknown,
            labels: HashSet::new(),
            slots: Vec::new(),
        }
    }

    /// Declare a slot whose links carry a role and a target.
    pub fn with_slot(
        mut self,
        name: impl Into<String>,
        role_feature: impl Into<String>,
        target_feature: impl Into<String>,
    ) -> Self {
        self.slots.push(SlotDecl {
            name: name.into(),
            role_feature: role_feature.into(),
            target_feature: Some(target_feature.into()),
        });
        self
    }

    /// Declare a slot whose links only carry a role.
    pub fn with_role_slot(
        mut self,
        name: impl Into<String>,
        role_feature: impl Into<String>,
    ) -> Self {
        self.slots.push(SlotDecl {
            name: name.into(),
            role_feature: role_feature.into(),
            target_feature: None,
        });
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> &AdapterKind {
        &self.kind
    }

    pub fn position_kind(&self) -> PositionKind {
        match self.kind {
            AdapterKind::Arc { .. } => PositionKind::Arc,
            AdapterKind::Span | AdapterKind::Unknown => PositionKind::Span,
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn is_label(&self, feature: &str) -> bool {
        self.labels.contains(feature)
    }

    pub fn slots(&self) -> &[SlotDecl] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&SlotDecl> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// Primary position of `record`.
    pub fn position(&self, revision: usize, record: &RecordRef<'_>) -> Position {
        match &self.kind {
            AdapterKind::Span | AdapterKind::Unknown => {
                Position::span(revision, &self.type_name, record.range())
            }
            AdapterKind::Arc { source, target } => Position::arc(
                revision,
                &self.type_name,
                endpoint(record, source),
                endpoint(record, target),
            ),
        }
    }

    /// One sub-position per distinct (slot, role) among the record's links.
    ///
    /// The informational link target is taken from the first link with that
    /// role.
    pub fn sub_positions(&self, revision: usize, record: &RecordRef<'_>) -> Vec<Position> {
        let mut positions = Vec::new();
        if self.slots.is_empty() {
            return positions;
        }
        let primary = self.position(revision, record);
        for slot in &self.slots {
            let mut seen: Vec<Option<&str>> = Vec::new();
            for link in slot.links(record) {
                if seen.contains(&link.role) {
                    continue;
                }
                seen.push(link.role);
                let link_target = link.target.and_then(|target| target.range());
                positions.push(primary.with_slot(&slot.name, link.role, link_target));
            }
        }
        positions
    }
}

fn endpoint(record: &RecordRef<'_>, feature: &str) -> Extent {
    record.referenced(feature).and_then(|endpoint| endpoint.range())
}

/// Adapters of one run keyed by type name.
///
/// Types without an adapter get [`TypeAdapter::unknown`]; the first lookup of
/// each such type logs a warning.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    by_type: HashMap<String, TypeAdapter>,
    warned: RefCell<HashSet<String>>,
}

impl AdapterRegistry {
    pub fn new<I>(adapters: I) -> Result<Self, DiffError>
    where
        I: IntoIterator<Item = TypeAdapter>,
    {
        let mut by_type = HashMap::new();
        for adapter in adapters {
            let type_name = adapter.type_name.clone();
            if by_type.insert(type_name.clone(), adapter).is_some() {
                return Err(DiffError::DuplicateAdapter { type_name });
            }
        }
        Ok(Self {
            by_type,
            warned: RefCell::new(HashSet::new()),
        })
    }

    pub(crate) fn into_adapters(self) -> HashMap<String, TypeAdapter> {
        self.by_type
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeAdapter> {
        self.by_type.get(type_name)
    }

    /// Adapter for `type_name`, falling back to an unknown adapter.
    pub fn resolve(&self, type_name: &str) -> Cow<'_, TypeAdapter> {
        if let Some(adapter) = self.by_type.get(type_name) {
            return Cow::Borrowed(adapter);
        }
        if self.warned.borrow_mut().insert(type_name.to_string()) {
            warn!(type_name, "no adapter for type, comparing by position only");
        }
        Cow::Owned(TypeAdapter::unknown(type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Annotation, Document, TextRange};

    #[test]
    fn test_arc_position_uses_endpoints() {
        let mut builder = Document::builder("John loves Mary");
        let john = builder.add(Annotation::span("Token", 0, 4));
        let loves = builder.add(Annotation::span("Token", 5, 10));
        let dep = builder.add(
            Annotation::span("Dependency", 5, 10)
                .with("Governor", loves)
                .with("Dependent", john),
        );
        let dangling = builder.add(Annotation::span("Dependency", 0, 4).with("Governor", john));
        let doc = builder.build();

        let adapter = TypeAdapter::arc("Dependency", "Governor", "Dependent", ["DependencyType"]);
        let position = adapter.position(0, &doc.record(dep).unwrap());
        assert_eq!(
            position,
            Position::arc(
                0,
                "Dependency",
                Some(TextRange::new(5, 10)),
                Some(TextRange::new(0, 4))
            )
        );

        let position = adapter.position(0, &doc.record(dangling).unwrap());
        assert_eq!(
            position.to_string(),
            "Arc [rev=0, type=Dependency, source=(0-4), target=unset]"
        );
    }

    #[test]
    fn test_sub_positions_one_per_role() {
        let mut builder = Document::builder("a b c");
        let a = builder.add(Annotation::span("Token", 0, 1));
        let c = builder.add(Annotation::span("Token", 4, 5));
        let l1 = builder.add(Annotation::record("Link").with("role", "arg").with("target", a));
        let l2 = builder.add(Annotation::record("Link").with("role", "arg").with("target", c));
        let l3 = builder.add(Annotation::record("Link").with("role", "mod").with("target", c));
        let host = builder.add(Annotation::span("Frame", 2, 3).with("links", vec![l1, l2, l3]));
        let doc = builder.build();

        let adapter = TypeAdapter::span("Frame", ["value"]).with_slot("links", "role", "target");
        let positions = adapter.sub_positions(0, &doc.record(host).unwrap());
        let rendered: Vec<String> = positions.iter().map(ToString::to_string).collect();
        insta::assert_snapshot!(rendered.join("\n"), @r###"
        Span [rev=0, type=Frame, begin=2, end=3, slot=links, role=arg]
        Span [rev=0, type=Frame, begin=2, end=3, slot=links, role=mod]
        "###);
        assert_eq!(
            positions[0].slot().unwrap().link_target,
            Some(TextRange::new(0, 1))
        );
    }

    #[test]
    fn test_no_links_no_sub_positions() {
        let mut builder = Document::builder("x");
        let host = builder.add(Annotation::span("Frame", 0, 1));
        let doc = builder.build();
        let adapter =
            TypeAdapter::span("Frame", Vec::<String>::new()).with_role_slot("links", "role");
        assert!(adapter.sub_positions(0, &doc.record(host).unwrap()).is_empty());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let err = AdapterRegistry::new(vec![
            TypeAdapter::span("POS", ["PosValue"]),
            TypeAdapter::span("POS", ["Other"]),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "more than one adapter supplied for type \"POS\"");
    }

    #[test]
    fn test_registry_falls_back_to_unknown() {
        let registry = AdapterRegistry::new(vec![TypeAdapter::span("POS", ["PosValue"])]).unwrap();
        assert!(matches!(registry.resolve("POS"), Cow::Borrowed(_)));
        let fallback = registry.resolve("Lemma");
        assert_eq!(fallback.kind(), &AdapterKind::Unknown);
        assert_eq!(fallback.labels().count(), 0);
        assert_eq!(fallback.position_kind(), PositionKind::Span);
    }
}
