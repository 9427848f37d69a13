//! Slot links: the role/target records held by a multi-valued feature.

use super::{RecordRef, Value};

/// One element of a slot feature.
#[derive(Debug, Clone, Copy)]
pub struct SlotLink<'a> {
    /// Index of the link record within the slot's list
    pub index: usize,
    pub role: Option<&'a str>,
    /// Resolved target record, `None` when unset or when the link mode has no target
    pub target: Option<RecordRef<'a>>,
}

impl<'a> RecordRef<'a> {
    /// Links held by `feature`, in list order.
    ///
    /// A single [`Value::Record`] is read as a one-element list. Dangling link
    /// ids are skipped but keep their index slot.
    pub fn links(
        &self,
        feature: &str,
        role_feature: &str,
        target_feature: Option<&str>,
    ) -> Vec<SlotLink<'a>> {
        let ids = match self.feature(feature) {
            Value::Records(ids) => ids.as_slice(),
            Value::Record(id) => std::slice::from_ref(id),
            _ => &[],
        };
        let document = self.document();
        ids.iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let link = document.record(*id)?;
                Some(SlotLink {
                    index,
                    role: link.feature(role_feature).as_str(),
                    target: target_feature.and_then(|name| link.referenced(name)),
                })
            })
            .collect()
    }

    /// The link at `index` of `feature`, if present.
    pub fn link_at(
        &self,
        feature: &str,
        index: usize,
        role_feature: &str,
        target_feature: Option<&str>,
    ) -> Option<SlotLink<'a>> {
        self.links(feature, role_feature, target_feature)
            .into_iter()
            .find(|link| link.index == index)
    }
}
