//! Text fields.
//!
//! A text field is one line. Without a `width` it is unconstrained and
//! `align` anchors the text itself at `x` (left edge, centre or right edge).
//! With a `width` the field is the box `[x, x + width]`, text is aligned
//! inside it and the overflow policy applies. Vertically the same rules use
//! `height`, defaulting to the font's line height.

use crate::error::ReportError;
use crate::font::{FontParam, MIN_SHRINK_SIZE};
use crate::model::{HAlign, Node, Overflow, VAlign};
use crate::param::Axis;
use crate::surface::{Surface, TextRun};

use super::{draw_border, h_shift, v_shift, Cursor, LayoutContext, PageLayout, Placement};

impl<'a> PageLayout<'a> {
    /// Draw `content` as the text field described by `node`.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn draw_text_field(
        &self,
        ctx: &LayoutContext<'a>,
        node: &Node,
        overflow: Overflow,
        content: &str,
        at: Cursor,
        placement: Option<Placement>,
        surface: &mut dyn Surface,
    ) -> Result<(), ReportError> {
        let scale = ctx.font.scale(&*surface);
        let width = match placement {
            Some(p) => p.width,
            None => node
                .common
                .width
                .map_or(0.0, |e| e.resolve_size(Axis::X, at.x, ctx.width, &scale)),
        };

        let mut text = content.to_string();
        let mut shrunk: Option<FontParam> = None;
        if width > 0.0 {
            match overflow {
                Overflow::Clip => clip_to_width(ctx.font, &*surface, &mut text, width),
                Overflow::Shrink => shrunk = shrink_to_width(ctx.font, &*surface, &text, width),
                Overflow::Visible => {}
            }
        }
        let font = shrunk.as_ref().unwrap_or(ctx.font);

        let metrics = font.metrics(&*surface);
        let text_width = font.text_width(&*surface, &text);
        let (box_left, box_width, text_left) = if width > 0.0 {
            let inset = match node.common.align {
                HAlign::Left => 0.0,
                HAlign::Center => (width - text_width) / 2.0,
                HAlign::Right => width - text_width,
            };
            (at.x, width, at.x + inset)
        } else {
            let left = at.x - h_shift(node.common.align, text_width);
            (left, text_width, left)
        };

        // Line height of the field's own font, not the shrunk one, so a
        // shrunk field keeps its slot.
        let line_height = ctx.font.line_height(&*surface);
        let (box_top, box_height, text_top) = match node.common.height {
            Some(e) => {
                let h = e.resolve_size(Axis::Y, at.y, ctx.height, &scale);
                let inset = match node.common.valign {
                    VAlign::Top => 0.0,
                    VAlign::Center => (h - metrics.line_height) / 2.0,
                    VAlign::Bottom => h - metrics.line_height,
                };
                (at.y, h, at.y + inset)
            }
            None => {
                let top = at.y - v_shift(node.common.valign, line_height);
                let inset = (line_height - metrics.line_height) / 2.0;
                (top, line_height, top + inset)
            }
        };

        if !text.is_empty() {
            surface.draw_text(&TextRun {
                x: ctx.origin_x + text_left,
                baseline: ctx.origin_y + text_top + metrics.ascent,
                text,
                font: font.spec(),
                char_spacing: font.def.char_spacing,
                rotated: false,
            })?;
        }

        let rect = ctx.absolute(box_left, box_top, box_width, box_height);
        draw_border(surface, rect, &node.common.border)?;
        Ok(())
    }
}

/// Drop trailing characters until `text` fits in `width`.
fn clip_to_width(font: &FontParam, surface: &dyn Surface, text: &mut String, width: f64) {
    while !text.is_empty() && font.text_width(surface, text) > width {
        text.pop();
    }
}

/// Step the size down one point at a time until `text` fits, stopping at
/// [`MIN_SHRINK_SIZE`]. `None` when the original size already fits.
fn shrink_to_width(
    font: &FontParam,
    surface: &dyn Surface,
    text: &str,
    width: f64,
) -> Option<FontParam> {
    if font.text_width(surface, text) <= width {
        return None;
    }
    let mut size = font.def.size;
    let mut smaller = None;
    while size - 1.0 >= MIN_SHRINK_SIZE {
        size -= 1.0;
        let candidate = font.resized(size);
        let fits = candidate.text_width(surface, text) <= width;
        smaller = Some(candidate);
        if fits {
            break;
        }
    }
    smaller
}

#[cfg(test)]
mod tests {
    use super::super::tests::{node, one_page, render};
    use crate::model::Tag;
    use crate::record::{DataSet, Record};

    #[test]
    fn substitutes_fields() {
        let data = DataSet::new(Record::from_pairs([("who", "World")]), vec![]);
        let s = render(vec![node(Tag::Text, &[], "Hello {who}!", vec![])], &data, one_page());
        assert_eq!(s.pages[0].strings(), vec!["Hello World!"]);
    }

    #[test]
    fn unconstrained_alignment_anchors_text() {
        // "abcd" is 24pt wide at 10pt.
        let s = render(
            vec![
                node(Tag::Text, &[("x", "100"), ("align", "center")], "abcd", vec![]),
                node(Tag::Text, &[("x", "100"), ("align", "right")], "abcd", vec![]),
            ],
            &DataSet::default(),
            one_page(),
        );
        let t = s.pages[0].texts();
        assert_eq!(t[0].x, 88.0);
        assert_eq!(t[1].x, 76.0);
    }

    #[test]
    fn aligned_inside_width() {
        let s = render(
            vec![node(
                Tag::Text,
                &[("x", "10"), ("width", "100"), ("align", "right")],
                "abcd",
                vec![],
            )],
            &DataSet::default(),
            one_page(),
        );
        assert_eq!(s.pages[0].texts()[0].x, 86.0);
    }

    #[test]
    fn vertical_alignment_inside_height() {
        let s = render(
            vec![node(
                Tag::Text,
                &[("y", "0"), ("height", "30"), ("vertical-align", "bottom")],
                "x",
                vec![],
            )],
            &DataSet::default(),
            one_page(),
        );
        assert_eq!(s.pages[0].texts()[0].baseline, 28.0);
    }

    #[test]
    fn clip_truncates_to_width() {
        let s = render(
            vec![node(Tag::Text, &[("width", "20"), ("clip", "char")], "abcdef", vec![])],
            &DataSet::default(),
            one_page(),
        );
        assert_eq!(s.pages[0].strings(), vec!["abc"]);
    }

    #[test]
    fn shrink_reduces_size_with_floor() {
        let s = render(
            vec![
                node(Tag::Text, &[("width", "24"), ("clip", "shrink")], "abcde", vec![]),
                node(Tag::Text, &[("y", "+1l"), ("width", "1"), ("clip", "shrink")], "abcde", vec![]),
                node(Tag::Text, &[("y", "+1l"), ("width", "100"), ("clip", "shrink")], "abcde", vec![]),
            ],
            &DataSet::default(),
            one_page(),
        );
        let t = s.pages[0].texts();
        assert_eq!(t[0].font.size, 8.0);
        assert_eq!(t[1].font.size, 5.0);
        assert_eq!(t[2].font.size, 10.0);
        assert_eq!(t[0].text, "abcde");
    }

    #[test]
    fn empty_text_still_draws_border() {
        let s = render(
            vec![node(Tag::Text, &[("width", "50"), ("border", "yes")], "{list.x}", vec![])],
            &DataSet::default(),
            one_page(),
        );
        assert!(s.pages[0].texts().is_empty());
        assert_eq!(s.pages[0].lines().len(), 4);
    }
}
