//! Running a diff over the revisions of several groups.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::adapter::{AdapterRegistry, TypeAdapter};
use crate::configuration::ConfigurationSet;
use crate::document::{RecordRef, TextRange};
use crate::equality::StructuralEquality;
use crate::errors::DiffError;
use crate::position::{Position, PositionKind};
use crate::result::DiffResult;
use crate::revisions::GroupedRevisions;

/// Whether inputs are checked before diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    /// Equal revision counts and equal texts per revision index.
    #[default]
    Always,
    Skip,
}

/// Options of a diff run.
///
/// ```toml
/// validation = "skip"
/// span = { begin = 0, end = 12 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffOptions {
    /// Only annotations lying completely inside this range take part.
    pub span: Option<TextRange>,
    pub validation: Validation,
}

impl DiffOptions {
    pub fn scoped(begin: usize, end: usize) -> Self {
        Self {
            span: Some(TextRange::new(begin, end)),
            ..Self::default()
        }
    }

    pub fn without_validation(mut self) -> Self {
        self.validation = Validation::Skip;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self, DiffError> {
        let options: Self = toml::from_str(source)?;
        options.check()?;
        Ok(options)
    }

    /// The span, if any, must not be inverted.
    pub fn check(&self) -> Result<(), DiffError> {
        match self.span {
            Some(span) if span.begin > span.end => Err(DiffError::InvalidSpan {
                begin: span.begin,
                end: span.end,
            }),
            _ => Ok(()),
        }
    }
}

/// Compare the `entry_types` annotations of all groups.
pub fn diff<I, S, A>(
    entry_types: I,
    adapters: A,
    revisions: &GroupedRevisions,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    A: IntoIterator<Item = TypeAdapter>,
{
    let engine = DiffEngine::new(adapters, options.clone())?;
    engine.run(entry_types, revisions)
}

/// Ordered position table that keeps each type to one position shape.
#[derive(Debug, Default)]
pub(crate) struct PositionTable {
    sets: BTreeMap<Position, ConfigurationSet>,
    shapes: HashMap<String, PositionKind>,
}

impl PositionTable {
    pub(crate) fn entry(&mut self, position: Position) -> Result<&mut ConfigurationSet, DiffError> {
        let kind = position.kind();
        let expected = *self
            .shapes
            .entry(position.type_name().to_string())
            .or_insert(kind);
        if expected != kind {
            return Err(DiffError::PositionShapeMismatch {
                type_name: position.type_name().to_string(),
            });
        }
        Ok(self
            .sets
            .entry(position.clone())
            .or_insert_with(|| ConfigurationSet::new(position)))
    }

    pub(crate) fn into_sets(self) -> BTreeMap<Position, ConfigurationSet> {
        self.sets
    }
}

/// State of a single diff run.
///
/// The label and fallback-adapter caches live here and are dropped with the
/// engine.
#[derive(Debug)]
pub struct DiffEngine {
    equality: StructuralEquality,
    options: DiffOptions,
    table: PositionTable,
}

impl DiffEngine {
    pub fn new<A>(adapters: A, options: DiffOptions) -> Result<Self, DiffError>
    where
        A: IntoIterator<Item = TypeAdapter>,
    {
        options.check()?;
        Ok(Self {
            equality: StructuralEquality::new(AdapterRegistry::new(adapters)?),
            options,
            table: PositionTable::default(),
        })
    }

    pub fn run<I, S>(
        mut self,
        entry_types: I,
        revisions: &GroupedRevisions,
    ) -> Result<DiffResult, DiffError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.options.validation == Validation::Always {
            validate(revisions)?;
        }
        let entry_types: Vec<S> = entry_types.into_iter().collect();

        let mut records = 0usize;
        for (group, docs) in revisions.iter() {
            for (revision, doc) in docs.iter().enumerate() {
                let doc = match doc {
                    Some(doc) => doc,
                    None => continue,
                };
                for type_name in &entry_types {
                    let type_name = type_name.as_ref();
                    let ids = match self.options.span {
                        Some(scope) => doc.select_covered(type_name, scope),
                        None => doc.select(type_name),
                    };
                    for record in ids.into_iter().filter_map(|id| doc.record(id)) {
                        self.add_record(revisions, group, revision, &record)?;
                        records += 1;
                    }
                }
            }
        }

        let sets = self.table.into_sets();
        debug!(
            groups = revisions.len(),
            records,
            positions = sets.len(),
            "diff finished"
        );
        Ok(DiffResult::new(
            revisions.groups().map(str::to_string).collect(),
            sets,
            self.equality.into_registry().into_adapters(),
        ))
    }

    fn add_record(
        &mut self,
        revisions: &GroupedRevisions,
        group: &str,
        revision: usize,
        record: &RecordRef<'_>,
    ) -> Result<(), DiffError> {
        let adapter = self.equality.adapters().resolve(record.type_name());
        let mut positions = vec![adapter.position(revision, record)];
        positions.extend(adapter.sub_positions(revision, record));

        for position in positions {
            trace!(group, %position, id = %record.id(), "routing record");
            let set = self.table.entry(position)?;
            set.add_configuration(&self.equality, revisions, group, record);
        }
        Ok(())
    }
}

/// Equal revision counts across groups and equal text per revision index.
///
/// At each index the first present document is the reference, so an absent
/// revision in the first group does not hide mismatches among the others.
fn validate(revisions: &GroupedRevisions) -> Result<(), DiffError> {
    let mut groups = revisions.iter();
    let expected = match groups.next() {
        Some((_, docs)) => docs.len(),
        None => return Ok(()),
    };
    for (group, docs) in groups {
        if docs.len() != expected {
            return Err(DiffError::RevisionCountMismatch {
                group: group.to_string(),
                expected,
                actual: docs.len(),
            });
        }
    }

    for revision in 0..expected {
        let mut present = revisions
            .iter()
            .filter_map(|(group, docs)| Some((group, docs[revision].as_ref()?)));
        let (reference, reference_doc) = match present.next() {
            Some(first) => first,
            None => continue,
        };
        for (group, doc) in present {
            if doc.text() != reference_doc.text() {
                return Err(DiffError::TextMismatch {
                    revision,
                    group: group.to_string(),
                    reference: reference.to_string(),
                });
            }
        }
    }
    Ok(())
}
