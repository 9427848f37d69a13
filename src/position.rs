//! Alignment keys for annotations across independently authored documents.
//!
//! Two documents "talk about the same place" when their annotations map to
//! equal [`Position`]s. The [`Ord`] implementation is the report order of a
//! diff result.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::document::{short_type_name, TextRange};

/// Text extent of an anchor. `None` marks an endpoint that could not be
/// resolved and sorts before every resolved extent.
pub type Extent = Option<TextRange>;

/// Begin ascending, then end descending, so enclosing extents come first.
pub(crate) fn cmp_extent(a: &Extent, b: &Extent) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.begin.cmp(&b.begin).then(b.end.cmp(&a.end)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionKind {
    Span,
    Arc,
}

/// Where a position sits in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Span(Extent),
    /// Extents of the records referenced by the source and target features
    Arc { source: Extent, target: Extent },
}

impl Anchor {
    pub fn kind(&self) -> PositionKind {
        match self {
            Anchor::Span(_) => PositionKind::Span,
            Anchor::Arc { .. } => PositionKind::Arc,
        }
    }
}

impl Ord for Anchor {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Anchor::Span(a), Anchor::Span(b)) => cmp_extent(a, b),
            (
                Anchor::Arc {
                    source: a_source,
                    target: a_target,
                },
                Anchor::Arc {
                    source: b_source,
                    target: b_target,
                },
            ) => cmp_extent(a_source, b_source).then_with(|| cmp_extent(a_target, b_target)),
            (Anchor::Span(_), Anchor::Arc { .. }) => Ordering::Less,
            (Anchor::Arc { .. }, Anchor::Span(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Anchor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The slot part of a sub-position.
///
/// `link_target` records where the first matching link pointed. It is shown
/// in reports but does not take part in equality, hashing or ordering: links
/// with the same role but different targets share one position and end up
/// as separate configurations.
#[derive(Debug, Clone)]
pub struct SlotRef {
    pub feature: String,
    pub role: Option<String>,
    pub link_target: Extent,
}

impl PartialEq for SlotRef {
    fn eq(&self, other: &Self) -> bool {
        self.feature == other.feature && self.role == other.role
    }
}

impl Eq for SlotRef {}

impl Hash for SlotRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.feature.hash(state);
        self.role.hash(state);
    }
}

impl Ord for SlotRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.feature
            .cmp(&other.feature)
            .then_with(|| self.role.cmp(&other.role))
    }
}

impl PartialOrd for SlotRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A logical place in the text at one revision index.
///
/// A position with a slot is a sub-position: it stands for all links of one
/// slot feature carrying one role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    revision: usize,
    type_name: String,
    slot: Option<SlotRef>,
    anchor: Anchor,
}

impl Position {
    pub fn span(revision: usize, type_name: impl Into<String>, extent: Extent) -> Self {
        Self {
            revision,
            type_name: type_name.into(),
            slot: None,
            anchor: Anchor::Span(extent),
        }
    }

    pub fn arc(
        revision: usize,
        type_name: impl Into<String>,
        source: Extent,
        target: Extent,
    ) -> Self {
        Self {
            revision,
            type_name: type_name.into(),
            slot: None,
            anchor: Anchor::Arc { source, target },
        }
    }

    /// Derive the sub-position for one slot feature and role.
    pub fn with_slot(
        &self,
        feature: impl Into<String>,
        role: Option<&str>,
        link_target: Extent,
    ) -> Self {
        Self {
            slot: Some(SlotRef {
                feature: feature.into(),
                role: role.map(str::to_string),
                link_target,
            }),
            ..self.clone()
        }
    }

    pub fn revision(&self) -> usize {
        self.revision
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn slot(&self) -> Option<&SlotRef> {
        self.slot.as_ref()
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub fn kind(&self) -> PositionKind {
        self.anchor.kind()
    }

    pub fn is_sub_position(&self) -> bool {
        self.slot.is_some()
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.revision
            .cmp(&other.revision)
            .then_with(|| self.type_name.cmp(&other.type_name))
            .then_with(|| self.slot.cmp(&other.slot))
            .then_with(|| self.anchor.cmp(&other.anchor))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct ExtentDisplay<'a>(&'a Extent);

impl fmt::Display for ExtentDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(range) => write!(f, "({})", range),
            None => f.write_str("unset"),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = short_type_name(&self.type_name);
        match &self.anchor {
            Anchor::Span(Some(range)) => write!(
                f,
                "Span [rev={}, type={}, begin={}, end={}",
                self.revision, type_name, range.begin, range.end
            )?,
            Anchor::Span(None) => write!(
                f,
                "Span [rev={}, type={}, begin=unset, end=unset",
                self.revision, type_name
            )?,
            Anchor::Arc { source, target } => write!(
                f,
                "Arc [rev={}, type={}, source={}, target={}",
                self.revision,
                type_name,
                ExtentDisplay(source),
                ExtentDisplay(target)
            )?,
        }
        if let Some(slot) = &self.slot {
            write!(
                f,
                ", slot={}, role={}",
                slot.feature,
                slot.role.as_deref().unwrap_or("unset")
            )?;
        }
        f.write_str("]")
    }
}
