//! Read-only view over a finished diff.

use std::collections::{BTreeMap, HashMap};
use std::io;

use crate::adapter::TypeAdapter;
use crate::configuration::ConfigurationSet;
use crate::display::DiffReport;
use crate::errors::DiffError;
use crate::position::Position;

/// Positions of a diff run with their configuration sets, in position order.
///
/// Agreement and completeness are independent: a set may agree while some
/// group never annotated the position.
#[derive(Debug)]
pub struct DiffResult {
    groups: Vec<String>,
    sets: BTreeMap<Position, ConfigurationSet>,
    adapters: HashMap<String, TypeAdapter>,
    has_differences: bool,
}

impl DiffResult {
    pub(crate) fn new(
        groups: Vec<String>,
        sets: BTreeMap<Position, ConfigurationSet>,
        adapters: HashMap<String, TypeAdapter>,
    ) -> Self {
        let has_differences = sets.values().any(|set| set.configurations().len() != 1);
        Self {
            groups,
            sets,
            adapters,
            has_differences,
        }
    }

    /// Adapter the run was given for `type_name`.
    pub fn adapter(&self, type_name: &str) -> Option<&TypeAdapter> {
        self.adapters.get(type_name)
    }

    /// All groups of the run, in input order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of positions of one type, sub-positions included.
    pub fn len_of_type(&self, type_name: &str) -> usize {
        self.sets
            .keys()
            .filter(|position| position.type_name() == type_name)
            .count()
    }

    /// True if any position saw more than one configuration.
    pub fn has_differences(&self) -> bool {
        self.has_differences
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.sets.keys()
    }

    pub fn configuration_sets(&self) -> impl Iterator<Item = &ConfigurationSet> {
        self.sets.values()
    }

    pub fn configuration_set(&self, position: &Position) -> Option<&ConfigurationSet> {
        self.sets.get(position)
    }

    /// Exactly one configuration at the set's position.
    pub fn is_agreement(&self, set: &ConfigurationSet) -> Result<bool, DiffError> {
        self.check_owned(set)?;
        Ok(set.configurations().len() == 1)
    }

    /// Every group of the run contributed at the set's position.
    pub fn is_complete(&self, set: &ConfigurationSet) -> Result<bool, DiffError> {
        self.check_owned(set)?;
        Ok(set.is_complete_for(self.groups.iter().map(String::as_str)))
    }

    pub fn differing_configuration_sets(&self) -> Vec<&ConfigurationSet> {
        self.sets
            .values()
            .filter(|set| set.configurations().len() != 1)
            .collect()
    }

    pub fn incomplete_configuration_sets(&self) -> Vec<&ConfigurationSet> {
        self.sets
            .values()
            .filter(|set| !set.is_complete_for(self.groups.iter().map(String::as_str)))
            .collect()
    }

    /// Printable report of every position.
    pub fn report(&self) -> DiffReport<'_> {
        DiffReport::new(self)
    }

    /// Write the plain report to `sink`.
    pub fn print(&self, sink: &mut impl io::Write) -> io::Result<()> {
        write!(sink, "{}", self.report())
    }

    fn check_owned(&self, set: &ConfigurationSet) -> Result<(), DiffError> {
        match self.sets.get(set.position()) {
            Some(own) if std::ptr::eq(own, set) => Ok(()),
            _ => Err(DiffError::ForeignConfigurationSet),
        }
    }
}
