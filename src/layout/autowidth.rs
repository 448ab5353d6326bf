//! Automatic column widths for table rows.
//!
//! With `autowidth=yes` on a table or a section, the direct Text, Barcode and
//! Box children of each row template become columns. The available width,
//! less the spacing between columns, is split in proportion to each column's
//! declared `width` magnitude (any unit is read as a bare weight; no width
//! means weight 1).
//!
//! The result is a side table of placements by child index. The document
//! tree is never touched, so running the pass twice gives the same answer.

use crate::model::{Node, NodeKind};

/// A resolved column: local `x` and `width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub width: f64,
}

/// Placements for `children`, `None` for children that are not columns.
pub fn distribute(children: &[Node], available: f64, spacing: f64) -> Vec<Option<Placement>> {
    let weight = |node: &Node| {
        node.common
            .width
            .map(|e| e.magnitude)
            .filter(|w| *w > 0.0)
            .unwrap_or(1.0)
    };
    let is_column = |node: &Node| {
        matches!(
            node.kind,
            NodeKind::Text(_) | NodeKind::Barcode(_) | NodeKind::Box
        )
    };

    let columns = children.iter().filter(|c| is_column(*c)).count();
    if columns == 0 {
        return vec![None; children.len()];
    }
    let total_weight: f64 = children.iter().filter(|c| is_column(*c)).map(weight).sum();
    let usable = (available - spacing * (columns - 1) as f64).max(0.0);

    let mut x = 0.0;
    children
        .iter()
        .map(|child| {
            if !is_column(child) {
                return None;
            }
            let width = usable * weight(child) / total_weight;
            let placement = Placement { x, width };
            x += width + spacing;
            Some(placement)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;

    fn text(width: Option<&str>) -> Node {
        let attrs: Vec<(&str, &str)> = width.map(|w| ("width", w)).into_iter().collect();
        Node::new(Tag::Text, attrs, "", vec![])
    }

    #[test]
    fn proportional_split_with_spacing() {
        let children = vec![text(Some("1")), text(Some("3")), text(None)];
        let p = distribute(&children, 108.0, 4.0);
        // 100 usable, weights 1:3:1
        assert_eq!(p[0], Some(Placement { x: 0.0, width: 20.0 }));
        assert_eq!(p[1], Some(Placement { x: 24.0, width: 60.0 }));
        assert_eq!(p[2], Some(Placement { x: 88.0, width: 20.0 }));
    }

    #[test]
    fn units_are_ignored_for_weights() {
        let children = vec![text(Some("10m")), text(Some("10%"))];
        let p = distribute(&children, 100.0, 0.0);
        assert_eq!(p[0].map(|c| c.width), Some(50.0));
        assert_eq!(p[1].map(|c| c.x), Some(50.0));
    }

    #[test]
    fn non_columns_are_left_alone() {
        let table = Node::new(Tag::Table, Vec::<(String, String)>::new(), "", vec![]);
        let children = vec![text(None), table, text(None)];
        let p = distribute(&children, 50.0, 10.0);
        assert_eq!(p[1], None);
        assert_eq!(p[2], Some(Placement { x: 30.0, width: 20.0 }));
    }

    #[test]
    fn pass_is_idempotent() {
        let children = vec![text(Some("2")), text(None)];
        assert_eq!(distribute(&children, 90.0, 3.0), distribute(&children, 90.0, 3.0));
    }

    #[test]
    fn spacing_larger_than_width_gives_zero_columns() {
        let children = vec![text(None), text(None)];
        let p = distribute(&children, 2.0, 10.0);
        assert_eq!(p[0].map(|c| c.width), Some(0.0));
    }
}
