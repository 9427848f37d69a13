use std::io;

use layered_diff::document::Document;
use layered_diff::{DiffResult, GroupedRevisions, Position, SlotDecl, Value};
use tracing::debug;

use crate::errors::AgreementError;
use crate::kappa::{category_label, ContingencyTable};

/// One complete position with the category each group chose.
#[derive(Debug, Clone, PartialEq)]
pub struct AgreementItem {
    pub position: Position,
    pub values: [Option<String>; 2],
}

impl AgreementItem {
    pub fn is_agreement(&self) -> bool {
        self.values[0] == self.values[1]
    }
}

/// Pairwise agreement on one feature of one type.
#[derive(Debug, Clone)]
pub struct AgreementResult {
    type_name: String,
    attribute: String,
    groups: [String; 2],
    items: Vec<AgreementItem>,
    incomplete: Vec<Position>,
    stacked: Vec<Position>,
    table: ContingencyTable,
}

impl AgreementResult {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn groups(&self) -> &[String; 2] {
        &self.groups
    }

    pub fn items(&self) -> &[AgreementItem] {
        &self.items
    }

    /// Positions skipped because a group did not annotate them.
    pub fn incomplete_positions(&self) -> &[Position] {
        &self.incomplete
    }

    /// Positions skipped because a group annotated them more than once.
    pub fn stacked_positions(&self) -> &[Position] {
        &self.stacked
    }

    pub fn table(&self) -> &ContingencyTable {
        &self.table
    }

    pub fn observed_agreement(&self) -> f64 {
        self.table.observed_agreement()
    }

    pub fn expected_agreement(&self) -> f64 {
        self.table.expected_agreement()
    }

    /// Cohen's kappa over all items.
    pub fn agreement(&self) -> f64 {
        self.table.kappa()
    }

    /// Write a readable account of the study to `out`.
    pub fn dump(&self, out: &mut impl io::Write) -> io::Result<()> {
        writeln!(
            out,
            "{}/{}: {} vs {}",
            self.type_name, self.attribute, self.groups[0], self.groups[1]
        )?;
        writeln!(
            out,
            "items: {}, incomplete: {}, stacked: {}",
            self.items.len(),
            self.incomplete.len(),
            self.stacked.len()
        )?;
        writeln!(
            out,
            "observed: {:.6}, expected: {:.6}, kappa: {:.6}",
            self.observed_agreement(),
            self.expected_agreement(),
            self.agreement()
        )?;
        for item in &self.items {
            writeln!(
                out,
                "{} {}: {} | {}",
                if item.is_agreement() { "=" } else { "!" },
                item.position,
                category_label(&item.values[0]),
                category_label(&item.values[1])
            )?;
        }
        for position in &self.incomplete {
            writeln!(out, "? {}", position)?;
        }
        for position in &self.stacked {
            writeln!(out, "+ {}", position)?;
        }
        Ok(())
    }
}

/// Cohen's kappa between the two groups of `result` on `attribute` of
/// `type_name`.
///
/// When `attribute` is a slot of the type and the result has sub-positions
/// for it, items are those sub-positions and a group's category is where its
/// link points (or the link's role for role-only slots). Otherwise items are
/// the primary positions and the category is the feature value.
pub fn cohen_kappa(
    result: &DiffResult,
    type_name: &str,
    attribute: &str,
    revisions: &GroupedRevisions,
) -> Result<AgreementResult, AgreementError> {
    let groups: [String; 2] = match result.groups() {
        [a, b] => [a.clone(), b.clone()],
        other => return Err(AgreementError::GroupCount { found: other.len() }),
    };

    let slot = result
        .adapter(type_name)
        .and_then(|adapter| adapter.slot(attribute))
        .filter(|_| {
            result.positions().any(|position| {
                position.type_name() == type_name
                    && position.slot().map_or(false, |slot| slot.feature == attribute)
            })
        });

    let mut items = Vec::new();
    let mut incomplete = Vec::new();
    let mut stacked = Vec::new();
    for set in result.configuration_sets() {
        let position = set.position();
        if position.type_name() != type_name {
            continue;
        }
        let relevant = match (slot, position.slot()) {
            (Some(_), Some(sub)) => sub.feature == attribute,
            (None, None) => true,
            _ => false,
        };
        if !relevant {
            continue;
        }
        if !result.is_complete(set)? {
            incomplete.push(position.clone());
            continue;
        }
        if groups.iter().any(|group| set.configurations_for(group).len() > 1) {
            stacked.push(position.clone());
            continue;
        }

        let value_of = |group: &str| -> Option<String> {
            let cfg = set.configurations_for(group).into_iter().next()?;
            match slot {
                Some(decl) => link_category(decl, cfg.resolve_link(group, decl, revisions)?),
                None => {
                    let record = cfg.resolve(group, revisions)?;
                    value_category(record.feature(attribute), record.document())
                }
            }
        };
        items.push(AgreementItem {
            position: position.clone(),
            values: [value_of(&groups[0]), value_of(&groups[1])],
        });
    }

    let table = ContingencyTable::from_pairs(
        items
            .iter()
            .map(|item| (&item.values[0], &item.values[1])),
    );
    debug!(
        type_name,
        attribute,
        items = items.len(),
        incomplete = incomplete.len(),
        stacked = stacked.len(),
        "agreement study"
    );
    Ok(AgreementResult {
        type_name: type_name.to_string(),
        attribute: attribute.to_string(),
        groups,
        items,
        incomplete,
        stacked,
        table,
    })
}

fn link_category(decl: &SlotDecl, link: layered_diff::SlotLink<'_>) -> Option<String> {
    match decl.target_feature {
        Some(_) => link.target?.range().map(|range| range.to_string()),
        None => link.role.map(str::to_string),
    }
}

fn value_category(value: &Value, document: &Document) -> Option<String> {
    match value {
        Value::Null | Value::Subject => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(x) => Some(x.to_string()),
        Value::Str(s) => Some(s.clone()),
        Value::Record(id) => document.record(*id)?.range().map(|range| range.to_string()),
        Value::Records(ids) => Some(
            ids.iter()
                .filter_map(|id| document.record(*id)?.range())
                .map(|range| range.to_string())
                .collect::<Vec<_>>()
                .join(","),
        ),
    }
}
