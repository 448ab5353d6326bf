//! Barcodes.
//!
//! The symbol size comes from the backend unless `width`/`height` override
//! it. Whatever goes wrong in the backend (unknown family, payload it cannot
//! encode) the page still renders: the code, or `alttext`, is drawn as a
//! plain text field in its place.

use tracing::warn;

use crate::error::ReportError;
use crate::model::{BarcodeAttrs, Node, Overflow};
use crate::param::Axis;
use crate::surface::{BarcodeSpec, Surface};

use super::{draw_border, h_shift, v_shift, Cursor, LayoutContext, PageLayout, Placement};

impl<'a> PageLayout<'a> {
    /// Returns `false` when the code is empty and nothing was drawn.
    pub(super) fn render_barcode(
        &self,
        ctx: &LayoutContext<'a>,
        node: &Node,
        attrs: &BarcodeAttrs,
        at: Cursor,
        placement: Option<Placement>,
        surface: &mut dyn Surface,
    ) -> Result<bool, ReportError> {
        let code = self.fields.substitute(&node.text, ctx.list, ctx.line);
        let code = code.trim();
        if code.is_empty() {
            return Ok(false);
        }

        let spec = BarcodeSpec {
            kind: attrs.kind.clone(),
            code: code.to_string(),
            baseline: attrs.baseline,
            show_text: !attrs.no_text,
            top_text: attrs.top_text,
            start_stop_text: attrs.start_stop_text,
        };

        let drawn = surface.barcode_size(&spec).and_then(|(natural_w, natural_h)| {
            let scale = ctx.font.scale(&*surface);
            let (left, width) = match placement {
                Some(p) => (p.x, p.width),
                None => {
                    let w = node
                        .common
                        .width
                        .map_or(natural_w, |e| e.resolve_size(Axis::X, at.x, ctx.width, &scale));
                    (at.x - h_shift(node.common.align, w), w)
                }
            };
            let height = node
                .common
                .height
                .map_or(natural_h, |e| e.resolve_size(Axis::Y, at.y, ctx.height, &scale));
            let top = at.y - v_shift(node.common.valign, height);

            let rect = ctx.absolute(left, top, width, height);
            surface.draw_barcode(&spec, rect)?;
            draw_border(surface, rect, &node.common.border)
        });

        if let Err(e) = drawn {
            warn!(
                kind = spec.kind.name(),
                code = %spec.code,
                error = %e,
                "barcode not drawable, rendering as text"
            );
            let fallback = match &attrs.alt_text {
                Some(alt) => self.fields.substitute(alt, ctx.list, ctx.line),
                None => spec.code.clone(),
            };
            self.draw_text_field(ctx, node, Overflow::Visible, &fallback, at, placement, surface)?;
        }
        Ok(true)
    }
}
