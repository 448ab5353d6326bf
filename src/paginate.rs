//! # Pagination Calculator
//!
//! Runs once, before any page is rendered. Every table that declares an
//! explicit `rows` count is a window onto one record list; the widest window
//! per list decides how many rows of that list fit on a page, and the list
//! needing the most pages decides the page count.
//!
//! Tables without `rows` are sized from their height at render time and are
//! invisible here.

use tracing::debug;

use crate::model::{Node, NodeKind};
use crate::record::DataSet;

/// Per-run page counters, fixed before page 1 apart from `page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// Current page, 1-based.
    pub page: usize,
    pub total_pages: usize,
    /// Rows per page for each record list, same indexing as the data set.
    pub rows_per_list: Vec<usize>,
}

impl PageState {
    pub fn new(pagination: &Pagination) -> Self {
        PageState {
            page: 1,
            total_pages: pagination.total_pages,
            rows_per_list: pagination.rows_per_list.clone(),
        }
    }

    /// Rows per page for a 1-based list; 0 when unknown.
    pub fn rows_for(&self, list: usize) -> usize {
        list.checked_sub(1)
            .and_then(|i| self.rows_per_list.get(i))
            .copied()
            .unwrap_or(0)
    }
}

/// Result of the pre-scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub total_pages: usize,
    pub rows_per_list: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Window {
    rows: usize,
    row_offset: usize,
}

/// Count the pages needed to show every record list.
pub fn compute_total_pages(root: &Node, data: &DataSet, single_page: bool) -> Pagination {
    let mut windows = vec![Window::default(); data.lists.len()];
    collect_windows(root, None, &mut windows);

    let rows_per_list: Vec<usize> = windows.iter().map(|w| w.rows).collect();

    let total_pages = if single_page {
        1
    } else {
        windows
            .iter()
            .zip(&data.lists)
            .filter(|(w, _)| w.rows > 0)
            .map(|(w, list)| {
                let shown = list.len().saturating_sub(w.row_offset.saturating_sub(1));
                shown.div_ceil(w.rows)
            })
            .max()
            .unwrap_or(0)
            .max(1)
    };

    debug!(total_pages, ?rows_per_list, "pagination computed");
    Pagination {
        total_pages,
        rows_per_list,
    }
}

fn collect_windows(node: &Node, inherited: Option<usize>, windows: &mut [Window]) {
    let mut list = inherited;
    if let NodeKind::Table(table) = &node.kind {
        list = table.list.or(inherited);
        if let (Some(l), Some(rows)) = (list, table.rows) {
            if let Some(w) = windows.get_mut(l - 1) {
                if rows > w.rows {
                    *w = Window {
                        rows,
                        row_offset: table.row_offset,
                    };
                }
            }
        }
    }
    for child in &node.children {
        collect_windows(child, list, windows);
    }
}
