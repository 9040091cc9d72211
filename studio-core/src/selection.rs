//! Selection state and selection-derived facts.
//!
//! Derived facts take the current page as an argument and are recomputed on
//! every call, because layers change independently of the selection.

use serde::{Deserialize, Serialize};

use crate::{GroupId, Layer, LayerId, Page};

/// How many layers are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    /// Nothing selected.
    None,
    /// Exactly one layer.
    Single,
    /// Two or more layers.
    Multiple,
}

/// The set of selected layer ids, in the order they were selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<LayerId>,
}

impl Selection {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. Duplicates are dropped.
    pub fn select(&mut self, ids: impl IntoIterator<Item = LayerId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Add if absent, remove if present. Returns whether `id` is now selected.
    pub fn toggle(&mut self, id: LayerId) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer resolve on `page`. Returns whether anything changed.
    pub fn retain_existing(&mut self, page: &Page) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| page.contains_layer(*id));
        before != self.ids.len()
    }

    /// Selected ids.
    #[must_use]
    pub fn ids(&self) -> &[LayerId] {
        &self.ids
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// None, single or multiple.
    #[must_use]
    pub fn kind(&self) -> SelectionKind {
        match self.ids.len() {
            0 => SelectionKind::None,
            1 => SelectionKind::Single,
            _ => SelectionKind::Multiple,
        }
    }

    /// Selected layers that exist on `page`, in selection order.
    pub fn layers<'a>(&'a self, page: &'a Page) -> impl Iterator<Item = &'a Layer> + 'a {
        self.ids.iter().filter_map(|id| page.layer(*id))
    }

    /// The one selected layer, if exactly one is selected and it exists.
    #[must_use]
    pub fn single<'a>(&self, page: &'a Page) -> Option<&'a Layer> {
        match self.ids.as_slice() {
            [only] => page.layer(*only),
            _ => None,
        }
    }

    /// At least two selected, none already grouped.
    #[must_use]
    pub fn can_group(&self, page: &Page) -> bool {
        page.can_group(&self.ids)
    }

    /// The group every selected layer shares, if it exists on the page.
    #[must_use]
    pub fn common_group(&self, page: &Page) -> Option<GroupId> {
        let first = *self.ids.first()?;
        let group = page.layer(first)?.group_id?;
        page.group(group)?;
        self.ids
            .iter()
            .all(|id| page.layer(*id).is_some_and(|l| l.group_id == Some(group)))
            .then_some(group)
    }

    /// At least one selected, all sharing the same existing group.
    #[must_use]
    pub fn can_ungroup(&self, page: &Page) -> bool {
        self.common_group(page).is_some()
    }
}
