//! Grouping of annotations observed at one position.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::unsync::OnceCell;
use tracing::{debug, trace};

use crate::adapter::SlotDecl;
use crate::document::{AnnotationId, RecordRef, SlotLink};
use crate::equality::StructuralEquality;
use crate::position::{Position, SlotRef};
use crate::revisions::GroupedRevisions;

/// Index of a link inside a slot feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotIndex {
    pub feature: String,
    pub index: usize,
}

/// Where a group's annotation lives in that group's document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub id: AnnotationId,
    pub slot: Option<SlotIndex>,
}

impl Address {
    pub fn record(id: AnnotationId) -> Self {
        Self { id, slot: None }
    }

    pub fn link(id: AnnotationId, feature: impl Into<String>, index: usize) -> Self {
        Self {
            id,
            slot: Some(SlotIndex {
                feature: feature.into(),
                index,
            }),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.slot {
            Some(slot) => write!(f, "{} {}[{}]", self.id, slot.feature, slot.index),
            None => write!(f, "{}", self.id),
        }
    }
}

/// One distinct value observed at a position, with the groups that chose it.
#[derive(Debug, Clone)]
pub struct Configuration {
    revision: usize,
    addresses: BTreeMap<String, Address>,
}

impl Configuration {
    fn new(revision: usize) -> Self {
        Self {
            revision,
            addresses: BTreeMap::new(),
        }
    }

    pub fn revision(&self) -> usize {
        self.revision
    }

    /// Contributing groups in name order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.addresses.keys().map(String::as_str)
    }

    pub fn contains(&self, group: &str) -> bool {
        self.addresses.contains_key(group)
    }

    pub fn address(&self, group: &str) -> Option<&Address> {
        self.addresses.get(group)
    }

    pub fn addresses(&self) -> impl Iterator<Item = (&str, &Address)> {
        self.addresses.iter().map(|(g, a)| (g.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// First group in name order; its record stands for the configuration.
    pub fn representative_group(&self) -> Option<&str> {
        self.addresses.keys().next().map(String::as_str)
    }

    pub fn representative_address(&self) -> Option<&Address> {
        self.addresses.values().next()
    }

    /// The record `group` contributed, looked up in its own document.
    pub fn resolve<'d>(
        &self,
        group: &str,
        revisions: &'d GroupedRevisions,
    ) -> Option<RecordRef<'d>> {
        let address = self.addresses.get(group)?;
        revisions.document(group, self.revision)?.record(address.id)
    }

    /// The link `group` contributed, for configurations of a sub-position.
    pub fn resolve_link<'d>(
        &self,
        group: &str,
        slot: &SlotDecl,
        revisions: &'d GroupedRevisions,
    ) -> Option<SlotLink<'d>> {
        let index = self.addresses.get(group)?.slot.as_ref()?.index;
        slot.link_at(&self.resolve(group, revisions)?, index)
    }

    pub fn representative<'d>(&self, revisions: &'d GroupedRevisions) -> Option<RecordRef<'d>> {
        self.resolve(self.representative_group()?, revisions)
    }

    fn insert(&mut self, group: &str, address: Address) {
        if let Some(previous) = self.addresses.insert(group.to_string(), address) {
            debug!(group, %previous, "group contributed twice to one configuration");
        }
    }
}

/// All configurations observed at one position.
#[derive(Debug)]
pub struct ConfigurationSet {
    position: Position,
    configurations: Vec<Configuration>,
    completeness: OnceCell<bool>,
}

impl ConfigurationSet {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            configurations: Vec::new(),
            completeness: OnceCell::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Configurations `group` contributed to. More than one means the group
    /// stacked annotations at this position.
    pub fn configurations_for(&self, group: &str) -> Vec<&Configuration> {
        self.configurations
            .iter()
            .filter(|cfg| cfg.contains(group))
            .collect()
    }

    /// Total number of recorded addresses across all configurations.
    pub fn recorded_configuration_count(&self) -> usize {
        self.configurations.iter().map(Configuration::len).sum()
    }

    /// Groups that contributed, in name order.
    pub fn groups(&self) -> BTreeSet<&str> {
        self.configurations
            .iter()
            .flat_map(Configuration::groups)
            .collect()
    }

    pub(crate) fn is_complete_for<'g, I>(&self, all_groups: I) -> bool
    where
        I: IntoIterator<Item = &'g str>,
    {
        *self.completeness.get_or_init(|| {
            all_groups
                .into_iter()
                .all(|group| self.configurations.iter().any(|cfg| cfg.contains(group)))
        })
    }

    /// Route one record of `group` into this set.
    pub(crate) fn add_configuration(
        &mut self,
        equality: &StructuralEquality,
        revisions: &GroupedRevisions,
        group: &str,
        record: &RecordRef<'_>,
    ) {
        match self.position.slot().cloned() {
            None => self.add_record(equality, revisions, group, record),
            Some(slot) => self.add_links(equality, revisions, group, record, &slot),
        }
    }

    fn add_record(
        &mut self,
        equality: &StructuralEquality,
        revisions: &GroupedRevisions,
        group: &str,
        record: &RecordRef<'_>,
    ) {
        let existing = self.configurations.iter().position(|cfg| {
            let representative = cfg.representative(revisions);
            equality.equal(representative.as_ref(), Some(record))
        });
        let address = Address::record(record.id());
        self.insert_at(existing, group, address);
    }

    fn add_links(
        &mut self,
        equality: &StructuralEquality,
        revisions: &GroupedRevisions,
        group: &str,
        record: &RecordRef<'_>,
        slot: &SlotRef,
    ) {
        let adapter = equality.adapters().resolve(record.type_name());
        let decl = match adapter.slot(&slot.feature) {
            Some(decl) => decl,
            None => {
                trace!(feature = %slot.feature, "record type declares no such slot");
                return;
            }
        };

        for link in decl.links(record) {
            if link.role != slot.role.as_deref() {
                continue;
            }
            let target = link.target.map(|target| equality.position_of(&target));
            let existing = self.configurations.iter().position(|cfg| {
                let representative_link = cfg.representative_address().and_then(|address| {
                    let index = address.slot.as_ref()?.index;
                    let group = cfg.representative_group()?;
                    let representative =
                        revisions.document(group, cfg.revision)?.record(address.id)?;
                    decl.link_at(&representative, index)
                });
                match representative_link {
                    Some(rep) => rep.target.map(|t| equality.position_of(&t)) == target,
                    None => false,
                }
            });
            let address = Address::link(record.id(), &decl.name, link.index);
            self.insert_at(existing, group, address);
        }
    }

    fn insert_at(&mut self, existing: Option<usize>, group: &str, address: Address) {
        if self.configurations.iter().any(|cfg| cfg.contains(group))
            && !existing.map_or(false, |idx| self.configurations[idx].contains(group))
        {
            debug!(group, position = %self.position, "group holds several configurations");
        }
        match existing {
            Some(idx) => self.configurations[idx].insert(group, address),
            None => {
                let mut cfg = Configuration::new(self.position.revision());
                cfg.insert(group, address);
                trace!(group, position = %self.position, "new configuration");
                self.configurations.push(cfg);
            }
        }
    }
}
