//! Z-order within the per-variant layer sequences.
//!
//! Reordering never moves a layer between sequences: shapes always paint
//! below images, and images below text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{LayerId, LayerVariant, Page};

/// Where to move the named layers within their sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// One step up, past the nearest unselected layer above.
    Forward,
    /// One step down, past the nearest unselected layer below.
    Backward,
    /// To the top of the sequence.
    Front,
    /// To the bottom of the sequence.
    Back,
}

/// Reorder `items` so the selected ones move in `direction`.
///
/// Selected items keep their relative order and end up as one contiguous
/// block. For `Forward`/`Backward` the block lands directly past the nearest
/// unselected neighbour of the extremal selected item; with a single selected
/// item that is an adjacent swap. Returns `None` when the order is unchanged.
pub(crate) fn arrange<T: Clone>(
    items: &[T],
    is_selected: impl Fn(&T) -> bool,
    direction: ReorderDirection,
) -> Option<Vec<T>> {
    let (picked, rest): (Vec<usize>, Vec<usize>) =
        (0..items.len()).partition(|&i| is_selected(&items[i]));
    if picked.is_empty() {
        return None;
    }

    let insert_at = match direction {
        ReorderDirection::Front => rest.len(),
        ReorderDirection::Back => 0,
        ReorderDirection::Forward => {
            let top = *picked.last()?;
            rest.iter().position(|&i| i > top)? + 1
        }
        ReorderDirection::Backward => {
            let bottom = picked[0];
            rest.iter().rposition(|&i| i < bottom)?
        }
    };

    let mut order = rest;
    order.splice(insert_at..insert_at, picked);
    if order.iter().enumerate().all(|(pos, &i)| pos == i) {
        return None;
    }
    Some(order.into_iter().map(|i| items[i].clone()).collect())
}

impl Page {
    /// Move layers within their own sequences.
    ///
    /// Each variant's sequence is handled independently. Unknown ids are
    /// ignored. Returns `None` when nothing moved.
    #[must_use]
    pub fn reorder(&self, ids: &[LayerId], direction: ReorderDirection) -> Option<Self> {
        let wanted: HashSet<LayerId> = ids.iter().copied().collect();
        let mut next: Option<Self> = None;
        for variant in LayerVariant::PAINT_ORDER {
            let Some(sequence) = arrange(self.layers(variant), |l| wanted.contains(&l.id), direction)
            else {
                continue;
            };
            *next.get_or_insert_with(|| self.clone()).layers_mut(variant) = sequence;
        }
        if next.is_some() {
            tracing::debug!("Reordered {} layers {direction:?}", ids.len());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Geometry, Layer, ShapeType};

    fn arranged(items: &[char], picked: &str, direction: ReorderDirection) -> String {
        arrange(items, |c| picked.contains(*c), direction)
            .map_or_else(|| "unchanged".to_string(), |v| v.into_iter().collect())
    }

    const ABCDE: [char; 5] = ['a', 'b', 'c', 'd', 'e'];

    #[test]
    fn test_single_forward_backward_swap() {
        assert_eq!(arranged(&ABCDE, "b", ReorderDirection::Forward), "acbde");
        assert_eq!(arranged(&ABCDE, "b", ReorderDirection::Backward), "bacde");
        assert_eq!(arranged(&ABCDE, "e", ReorderDirection::Forward), "unchanged");
        assert_eq!(arranged(&ABCDE, "a", ReorderDirection::Backward), "unchanged");
    }

    #[test]
    fn test_front_and_back_keep_relative_order() {
        assert_eq!(arranged(&ABCDE, "db", ReorderDirection::Front), "acebd");
        assert_eq!(arranged(&ABCDE, "db", ReorderDirection::Back), "bdace");
        assert_eq!(arranged(&ABCDE, "de", ReorderDirection::Front), "unchanged");
    }

    #[test]
    fn test_multi_step_moves_block_past_neighbour() {
        assert_eq!(arranged(&ABCDE, "ac", ReorderDirection::Forward), "bdace");
        assert_eq!(arranged(&ABCDE, "ce", ReorderDirection::Backward), "acebd");
    }

    #[test]
    fn test_nothing_selected() {
        assert_eq!(arranged(&ABCDE, "z", ReorderDirection::Front), "unchanged");
    }

    #[test]
    fn test_reorder_isolated_per_variant() {
        let s1 = Layer::shape(ShapeType::Rectangle, Geometry::default());
        let s2 = Layer::shape(ShapeType::Circle, Geometry::default());
        let t1 = Layer::text("one", Geometry::default());
        let t2 = Layer::text("two", Geometry::default());
        let i1 = Layer::image("img", Geometry::default());
        let ids = [s1.id, s2.id, t1.id, t2.id, i1.id];
        let mut page = Page::new(500.0, 500.0);
        for layer in [s1, s2, t1, t2, i1] {
            page = page.add_layer(layer).expect("fresh");
        }

        let next = page.reorder(&[ids[0]], ReorderDirection::Front).expect("moved");
        let shapes: Vec<_> = next.layers(LayerVariant::Shape).iter().map(|l| l.id).collect();
        assert_eq!(shapes, vec![ids[1], ids[0]]);
        assert_eq!(next.layers(LayerVariant::Text), page.layers(LayerVariant::Text));
        assert_eq!(next.layers(LayerVariant::Image), page.layers(LayerVariant::Image));
    }

    #[test]
    fn test_reorder_unknown_ids_is_noop() {
        let page = Page::new(100.0, 100.0)
            .add_layer(Layer::text("x", Geometry::default()))
            .expect("fresh");
        assert!(page.reorder(&[LayerId::new()], ReorderDirection::Front).is_none());
    }
}
