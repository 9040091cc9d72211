//! Group labels and the group/ungroup operations.
//!
//! A group stores no member list. Membership is whatever layers carry the
//! group's id in `group_id`, found by scanning the page.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LayerId, LayerPatch, Page};

/// Unique identifier for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Mint a new unique group ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named label tying layers together for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier within the page.
    pub id: GroupId,
    /// Display name.
    pub name: String,
}

impl Group {
    /// Create a group with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
        }
    }
}

impl Page {
    /// Look up a group.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups().iter().find(|g| g.id == id)
    }

    /// Ids of every layer tagged with `group`, in composite order.
    #[must_use]
    pub fn group_members(&self, group: GroupId) -> Vec<LayerId> {
        self.all_layers()
            .filter(|l| l.group_id == Some(group))
            .map(|l| l.id)
            .collect()
    }

    /// Whether `ids` may be grouped: at least two distinct existing layers,
    /// none grouped.
    #[must_use]
    pub fn can_group(&self, ids: &[LayerId]) -> bool {
        let distinct: HashSet<_> = ids.iter().copied().collect();
        distinct.len() >= 2
            && distinct
                .iter()
                .all(|id| self.layer(*id).is_some_and(|l| l.group_id.is_none()))
    }

    /// Tag layers with a new group.
    ///
    /// Returns the new page and the group's id, or `None` if [`Page::can_group`]
    /// rejects the ids. Geometry and z-order are untouched.
    #[must_use]
    pub fn group_layers(&self, ids: &[LayerId]) -> Option<(Self, GroupId)> {
        if !self.can_group(ids) {
            return None;
        }
        let group = Group::new(format!("Group {}", self.groups().len() + 1));
        let group_id = group.id;
        let mut next = self.clone();
        next.groups_mut().push(group);
        let patch = LayerPatch::group(Some(group_id));
        let updates: Vec<_> = ids.iter().map(|id| (*id, patch.clone())).collect();
        let next = next.update_layers(&updates)?;
        tracing::debug!("Grouped {} layers into {group_id}", ids.len());
        Some((next, group_id))
    }

    /// Remove a group and clear `group_id` on every member.
    ///
    /// Returns `None` if the group does not exist.
    #[must_use]
    pub fn ungroup(&self, group: GroupId) -> Option<Self> {
        self.group(group)?;
        let mut next = self.clone();
        next.groups_mut().retain(|g| g.id != group);
        for layer in next.all_layers_mut() {
            if layer.group_id == Some(group) {
                layer.group_id = None;
            }
        }
        tracing::debug!("Ungrouped {group}");
        Some(next)
    }

    /// Drop groups with no remaining members.
    #[must_use]
    pub fn pruned_groups(&self) -> Option<Self> {
        let orphans: Vec<GroupId> = self
            .groups()
            .iter()
            .map(|g| g.id)
            .filter(|g| self.group_members(*g).is_empty())
            .collect();
        if orphans.is_empty() {
            return None;
        }
        let mut next = self.clone();
        next.groups_mut().retain(|g| !orphans.contains(&g.id));
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Geometry, Layer, ShapeType};

    fn page_with(n: usize) -> (Page, Vec<LayerId>) {
        let mut page = Page::new(800.0, 600.0);
        let mut ids = Vec::new();
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let layer = Layer::shape(
                ShapeType::Rectangle,
                Geometry::new(i as f32 * 60.0, 0.0, 50.0, 50.0),
            );
            ids.push(layer.id);
            page = page.add_layer(layer).expect("fresh id");
        }
        (page, ids)
    }

    #[test]
    fn test_group_then_ungroup_round_trip() {
        let (page, ids) = page_with(2);
        let (grouped, group) = page.group_layers(&ids).expect("groupable");
        assert_eq!(grouped.group_members(group), ids);
        assert!(grouped.group(group).is_some());

        let ungrouped = grouped.ungroup(group).expect("exists");
        assert!(ungrouped.group(group).is_none());
        assert!(ungrouped.all_layers().all(|l| l.group_id.is_none()));
    }

    #[test]
    fn test_group_requires_two_ungrouped_layers() {
        let (page, ids) = page_with(3);
        assert!(page.group_layers(&ids[..1]).is_none());

        let (grouped, _) = page.group_layers(&ids[..2]).expect("groupable");
        assert!(grouped.group_layers(&ids[1..]).is_none());
        assert!(!grouped.can_group(&[ids[2], LayerId::new()]));
    }

    #[test]
    fn test_group_counts_distinct_layers() {
        let (page, ids) = page_with(2);
        assert!(!page.can_group(&[ids[0], ids[0]]));
        assert!(page.group_layers(&[ids[0], ids[0]]).is_none());

        let (grouped, group) = page.group_layers(&[ids[0], ids[1], ids[0]]).expect("groupable");
        assert_eq!(grouped.group_members(group).len(), 2);
    }

    #[test]
    fn test_grouping_keeps_geometry_and_order() {
        let (page, ids) = page_with(3);
        let (grouped, _) = page.group_layers(&[ids[0], ids[2]]).expect("groupable");
        let before: Vec<_> = page.all_layers().map(|l| (l.id, l.geometry)).collect();
        let after: Vec<_> = grouped.all_layers().map(|l| (l.id, l.geometry)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_ungroup_unknown_is_noop() {
        let (page, _) = page_with(2);
        assert!(page.ungroup(GroupId::new()).is_none());
    }

    #[test]
    fn test_removing_last_member_prunes_group() {
        let (page, ids) = page_with(2);
        let (grouped, group) = page.group_layers(&ids).expect("groupable");
        let partial = grouped.remove_layers(&ids[..1]).expect("removed");
        assert!(partial.group(group).is_some());
        let empty = partial.remove_layers(&ids[1..]).expect("removed");
        assert!(empty.group(group).is_none());
    }

    #[test]
    fn test_pruned_groups() {
        let (page, _) = page_with(1);
        let mut orphaned = page.clone();
        orphaned.groups_mut().push(Group::new("Empty"));
        let pruned = orphaned.pruned_groups().expect("pruned");
        assert!(pruned.groups().is_empty());
        assert!(page.pruned_groups().is_none());
    }
}
