//! # Layout Context
//!
//! The cursor engine. One page is rendered by walking the document tree
//! top-down with a [`LayoutContext`]: an origin on the page, an extent, the
//! active font and the active `(list, line)` for unqualified `{list...}`
//! fields. Boxes, tables and table sections open a child context over their
//! own rectangle, so every coordinate inside them is local to that rectangle.
//!
//! ## The cursor
//!
//! Siblings are rendered in order and share a cursor. Each node resolves its
//! `x`/`y` against the cursor it receives (`+10` means "10 past the previous
//! sibling") and hands a cursor back:
//!
//! - Text and Barcode return the position they were drawn at, so the next
//!   sibling can chain off them.
//! - Box and Table return the cursor they were given. What happens inside
//!   them never moves their siblings.
//! - A node whose `cond` is false is skipped and leaves the cursor alone.
//!
//! The cursor is a plain value. Nothing is shared between siblings except
//! what `render_node` returns.

pub mod autowidth;
mod barcode;
mod table;
mod text;

pub use autowidth::Placement;

use tracing::trace;

use crate::error::{ReportError, SurfaceError};
use crate::font::{FontParam, FontSet};
use crate::model::{Border, HAlign, Node, NodeKind, PageGeometry, VAlign};
use crate::paginate::PageState;
use crate::param::{resolve_opt, resolve_size_opt, Axis};
use crate::surface::{Line, Rect, Surface};
use crate::template::FieldResolver;

/// A position relative to the current context's origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

impl Cursor {
    pub fn new(x: f64, y: f64) -> Self {
        Cursor { x, y }
    }
}

/// One scope of the recursive walk.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    /// Absolute page position of this scope's (0, 0).
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
    pub font: &'a FontParam,
    /// 1-based record list bound by the nearest enclosing table.
    pub list: Option<usize>,
    /// 1-based line of that list.
    pub line: usize,
}

impl<'a> LayoutContext<'a> {
    /// The content area of a page, inside the margins.
    pub fn page(geometry: &PageGeometry, font: &'a FontParam) -> Self {
        LayoutContext {
            origin_x: geometry.margin.left,
            origin_y: geometry.margin.top,
            width: geometry.content_width(),
            height: geometry.content_height(),
            font,
            list: None,
            line: 0,
        }
    }

    /// A nested scope over an absolute rectangle.
    pub fn child(&self, rect: Rect) -> Self {
        LayoutContext {
            origin_x: rect.x,
            origin_y: rect.y,
            width: rect.width.max(0.0),
            height: rect.height.max(0.0),
            ..*self
        }
    }

    pub fn with_font(&self, font: &'a FontParam) -> Self {
        LayoutContext { font, ..*self }
    }

    pub fn with_row(&self, list: Option<usize>, line: usize) -> Self {
        LayoutContext {
            list,
            line,
            ..*self
        }
    }

    /// Convert a local rectangle to page coordinates.
    pub fn absolute(&self, x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect::new(self.origin_x + x, self.origin_y + y, width, height)
    }
}

/// Renders pages of one run.
pub struct PageLayout<'a> {
    fonts: &'a FontSet,
    fields: &'a FieldResolver<'a>,
    page: &'a PageState,
    /// Gap between autowidth columns when a table sets no `columnspace`.
    column_space: f64,
}

impl<'a> PageLayout<'a> {
    pub fn new(
        fonts: &'a FontSet,
        fields: &'a FieldResolver<'a>,
        page: &'a PageState,
        column_space: f64,
    ) -> Self {
        PageLayout {
            fonts,
            fields,
            page,
            column_space,
        }
    }

    /// Render the children of the page root into the content area.
    pub fn render_page(
        &self,
        root: &Node,
        geometry: &PageGeometry,
        surface: &mut dyn Surface,
    ) -> Result<(), ReportError> {
        let font = self.node_font(root, self.fonts.default_font());
        let ctx = LayoutContext::page(geometry, font);
        self.render_children(&ctx, &root.children, &[], surface)?;
        Ok(())
    }

    /// Render siblings in order, threading the cursor through them.
    /// `placements` are autowidth overrides by child index.
    pub fn render_children(
        &self,
        ctx: &LayoutContext<'a>,
        children: &[Node],
        placements: &[Option<Placement>],
        surface: &mut dyn Surface,
    ) -> Result<Cursor, ReportError> {
        let mut cursor = Cursor::default();
        for (i, child) in children.iter().enumerate() {
            let placement = placements.get(i).copied().flatten();
            cursor = self.render_node(ctx, child, cursor, placement, surface)?;
        }
        Ok(cursor)
    }

    /// Render one node and return the cursor for its next sibling.
    pub fn render_node(
        &self,
        ctx: &LayoutContext<'a>,
        node: &Node,
        cursor: Cursor,
        placement: Option<Placement>,
        surface: &mut dyn Surface,
    ) -> Result<Cursor, ReportError> {
        if let Some(cond) = &node.common.cond {
            if !self.fields.condition(cond, ctx.list, ctx.line) {
                trace!(tag = node.tag().name(), cond = %cond, "condition false, skipped");
                return Ok(cursor);
            }
        }

        let ctx = ctx.with_font(self.node_font(node, ctx.font));
        let scale = ctx.font.scale(&*surface);
        let x = match placement {
            Some(p) => p.x,
            None => resolve_opt(node.common.x.as_ref(), Axis::X, cursor.x, ctx.width, &scale, cursor.x),
        };
        let y = resolve_opt(node.common.y.as_ref(), Axis::Y, cursor.y, ctx.height, &scale, cursor.y);
        let at = Cursor::new(x, y);
        trace!(tag = node.tag().name(), x, y, list = ?ctx.list, line = ctx.line, "render node");

        match &node.kind {
            NodeKind::Text(attrs) => {
                let content = self.fields.substitute(&node.text, ctx.list, ctx.line);
                self.draw_text_field(&ctx, node, attrs.overflow, &content, at, placement, surface)?;
                Ok(at)
            }
            NodeKind::Barcode(attrs) => {
                let drawn = self.render_barcode(&ctx, node, attrs, at, placement, surface)?;
                Ok(if drawn { at } else { cursor })
            }
            NodeKind::Table(attrs) => {
                self.render_table(&ctx, node, attrs, at, placement, surface)?;
                Ok(cursor)
            }
            NodeKind::Page(_)
            | NodeKind::Box
            | NodeKind::Header(_)
            | NodeKind::Body(_)
            | NodeKind::Footer(_) => {
                self.render_box(&ctx, node, at, placement, surface)?;
                Ok(cursor)
            }
        }
    }

    fn node_font(&self, node: &Node, inherited: &'a FontParam) -> &'a FontParam {
        match &node.common.font {
            Some(name) => self.fonts.resolve(name),
            None => inherited,
        }
    }

    fn render_box(
        &self,
        ctx: &LayoutContext<'a>,
        node: &Node,
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
            trace!(tag = node.tag().name(), width, height, "zero-size box skipped");
            return Ok(());
        }

        let rect = ctx.absolute(left, top, width, height);
        self.render_children(&ctx.child(rect), &node.children, &[], surface)?;
        draw_border(surface, rect, &node.common.border)?;
        Ok(())
    }
}

/// How far `align` moves a box of `size` back from its anchor.
pub(crate) fn h_shift(align: HAlign, size: f64) -> f64 {
    match align {
        HAlign::Left => 0.0,
        HAlign::Center => size / 2.0,
        HAlign::Right => size,
    }
}

pub(crate) fn v_shift(valign: VAlign, size: f64) -> f64 {
    match valign {
        VAlign::Top => 0.0,
        VAlign::Center => size / 2.0,
        VAlign::Bottom => size,
    }
}

/// Stroke the sides and diagonals of `border` around `rect`.
pub(crate) fn draw_border(
    surface: &mut dyn Surface,
    rect: Rect,
    border: &Border,
) -> Result<(), SurfaceError> {
    if border.is_empty() {
        return Ok(());
    }
    let (l, t, r, b) = (rect.x, rect.y, rect.right(), rect.bottom());
    let sides = [
        (border.top, l, t, r, t),
        (border.right, r, t, r, b),
        (border.bottom, l, b, r, b),
        (border.left, l, t, l, b),
    ];
    for (width, x1, y1, x2, y2) in sides {
        if width > 0.0 {
            surface.draw_line(Line { x1, y1, x2, y2, width })?;
        }
    }

    let widest = sides.iter().map(|s| s.0).fold(0.0, f64::max);
    let width = if widest > 0.0 { widest } else { Border::DEFAULT_LINE_WIDTH };
    if border.crossline || border.slashline {
        surface.draw_line(Line { x1: l, y1: b, x2: r, y2: t, width })?;
    }
    if border.crossline || border.backslashline {
        surface.draw_line(Line { x1: l, y1: t, x2: r, y2: b, width })?;
    }
    Ok(())
}
