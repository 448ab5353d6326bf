//! Repeating tables.
//!
//! A table binds a record list and shows a window of it on every page:
//!
//! ```text
//! +---------------------------+  <- header, first line of the window
//! | body, line N              |
//! | body, line N+1            |
//! | ...                       |  <- `rows` slots
//! +---------------------------+  <- footer, last line of the window or list
//! ```
//!
//! The first line on page `p` is `rowoffset + (p - 1) * rows_per_page`.
//! Rows per page come from the pagination pre-scan for the bound list; a
//! table the pre-scan knows nothing about uses its own row count.
//!
//! A body whose `cond` is false leaves its slot empty. With `omitnodata` a
//! line without a record takes no slot at all and later rows move up.

use tracing::trace;

use crate::error::ReportError;
use crate::font::FontParam;
use crate::model::{Node, NodeKind, SectionAttrs, TableAttrs, Tag};
use crate::param::{resolve_size_opt, Axis};
use crate::surface::Surface;

use super::autowidth::distribute;
use super::{draw_border, h_shift, v_shift, Cursor, LayoutContext, PageLayout, Placement};

/// A header, body or footer with its resolved row height.
struct Section<'n, 'a> {
    node: &'n Node,
    attrs: &'n SectionAttrs,
    font: &'a FontParam,
    height: f64,
}

impl<'a> PageLayout<'a> {
    pub(super) fn render_table(
        &self,
        ctx: &LayoutContext<'a>,
        node: &Node,
        attrs: &TableAttrs,
        at: Cursor,
        placement: Option<Placement>,
        surface: &mut dyn Surface,
    ) -> Result<(), ReportError> {
        let scale = ctx.font.scale(&*surface);
        let (left, width) = match placement {
            Some(p) => (p.x, p.width),
            None => {
                let w = resolve_size_opt(node.common.width.as_ref(), Axis::X, at.x, ctx.width, &scale);
                (at.x - h_shift(node.common.align, w), w)
            }
        };
        let height = resolve_size_opt(node.common.height.as_ref(), Axis::Y, at.y, ctx.height, &scale);
        let top = at.y - v_shift(node.common.valign, height);
        if width <= 0.0 || height <= 0.0 {
            trace!(width, height, "zero-size table skipped");
            return Ok(());
        }

        let rect = ctx.absolute(left, top, width, height);
        let table_ctx = ctx.child(rect);
        let list = attrs.list.or(ctx.list);

        let header = self.section(&table_ctx, node, Tag::Header, surface);
        let body = self.section(&table_ctx, node, Tag::Body, surface);
        let footer = self.section(&table_ctx, node, Tag::Footer, surface);
        let header_h = header.as_ref().map_or(0.0, |s| s.height);
        let footer_h = footer.as_ref().map_or(0.0, |s| s.height);
        let body_h = body.as_ref().map_or(0.0, |s| s.height);

        let rows = attrs.rows.unwrap_or_else(|| {
            if body_h > 0.0 {
                ((height - header_h - footer_h) / body_h).floor().max(0.0) as usize
            } else {
                0
            }
        });
        let rows = rows.min(TableAttrs::MAX_ROWS);
        let rows_per_page = list
            .map(|l| self.page.rows_for(l))
            .filter(|&r| r > 0)
            .unwrap_or(rows);
        let first_line = attrs
            .row_offset
            .saturating_add(self.page.page.saturating_sub(1).saturating_mul(rows_per_page));
        trace!(?list, rows, rows_per_page, first_line, "table window");

        let spacing = attrs
            .column_space
            .map_or(self.column_space, |e| e.magnitude_points(Axis::X, width, &scale));
        let autowidth = |section: &Section<'_, '_>| attrs.autowidth || section.attrs.autowidth;

        if let Some(section) = &header {
            self.render_section(&table_ctx, section, 0.0, list, first_line, autowidth(section), spacing, surface)?;
        }

        let mut slot = 0usize;
        if let Some(section) = &body {
            for row in 0..rows {
                let line = first_line.saturating_add(row);
                if section.attrs.omit_no_data && !self.has_record(list, line) {
                    continue;
                }
                let y = header_h + slot as f64 * body_h;
                self.render_section(&table_ctx, section, y, list, line, autowidth(section), spacing, surface)?;
                slot += 1;
            }
        }

        if let Some(section) = &footer {
            let last_line = self.footer_line(list, first_line, rows);
            let y = header_h + slot as f64 * body_h;
            self.render_section(&table_ctx, section, y, list, last_line, autowidth(section), spacing, surface)?;
        }

        draw_border(surface, rect, &node.common.border)?;
        Ok(())
    }

    fn section<'n>(
        &self,
        table_ctx: &LayoutContext<'a>,
        table: &'n Node,
        tag: Tag,
        surface: &dyn Surface,
    ) -> Option<Section<'n, 'a>> {
        let node = table.child(tag)?;
        let attrs = match &node.kind {
            NodeKind::Header(a) | NodeKind::Body(a) | NodeKind::Footer(a) => a,
            _ => return None,
        };
        let font = match &node.common.font {
            Some(name) => self.fonts.resolve(name),
            None => table_ctx.font,
        };
        let height = match node.common.height {
            Some(e) => e.resolve_size(Axis::Y, 0.0, table_ctx.height, &font.scale(surface)),
            None => font.line_height(surface),
        };
        Some(Section {
            node,
            attrs,
            font,
            height,
        })
    }

    /// Line given to the footer: the end of the window, or the list's last
    /// line when the list ends inside the window.
    fn footer_line(&self, list: Option<usize>, first_line: usize, rows: usize) -> usize {
        let window_end = first_line.saturating_add(rows.saturating_sub(1));
        match list.and_then(|l| self.fields.data().list(l)) {
            Some(records) if (first_line..window_end).contains(&records.len()) => records.len(),
            _ => window_end,
        }
    }

    fn has_record(&self, list: Option<usize>, line: usize) -> bool {
        list.and_then(|l| self.fields.data().list(l))
            .and_then(|records| records.line(line))
            .is_some()
    }

    /// One header, body or footer row at local `y` of the table.
    #[allow(clippy::too_many_arguments)]
    fn render_section(
        &self,
        table_ctx: &LayoutContext<'a>,
        section: &Section<'_, 'a>,
        y: f64,
        list: Option<usize>,
        line: usize,
        autowidth: bool,
        spacing: f64,
        surface: &mut dyn Surface,
    ) -> Result<(), ReportError> {
        if let Some(cond) = &section.node.common.cond {
            if !self.fields.condition(cond, list, line) {
                trace!(tag = section.node.tag().name(), line, "row condition false");
                return Ok(());
            }
        }
        let rect = table_ctx.absolute(0.0, y, table_ctx.width, section.height);
        let row_ctx = table_ctx
            .child(rect)
            .with_font(section.font)
            .with_row(list, line);
        let placements = if autowidth {
            distribute(&section.node.children, row_ctx.width, spacing)
        } else {
            Vec::new()
        };
        self.render_children(&row_ctx, &section.node.children, &placements, surface)?;
        draw_border(surface, rect, &section.node.common.border)?;
        Ok(())
    }
}
