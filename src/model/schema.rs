//! Typed attribute schema, one struct per node kind.
//!
//! Attributes arrive as unparsed strings. They are read once, when a node is
//! built, into the structs below. A missing or malformed attribute is never an
//! error: it takes the documented default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::param::Expr;

/// Horizontal anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Line widths per side (0 = no line) plus the diagonal decorations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    pub crossline: bool,
    pub slashline: bool,
    pub backslashline: bool,
}

impl Border {
    pub const DEFAULT_LINE_WIDTH: f64 = 0.5;

    pub fn is_empty(&self) -> bool {
        self.top <= 0.0
            && self.right <= 0.0
            && self.bottom <= 0.0
            && self.left <= 0.0
            && !self.crossline
            && !self.slashline
            && !self.backslashline
    }

    fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        let all = attrs.get("border").map_or(0.0, |v| line_width(v));
        let side = |name: &str| attrs.get(name).map_or(all, |v| line_width(v));
        Border {
            top: side("border-top"),
            right: side("border-right"),
            bottom: side("border-bottom"),
            left: side("border-left"),
            crossline: flag(attrs, "crossline"),
            slashline: flag(attrs, "slashline"),
            backslashline: flag(attrs, "backslashline"),
        }
    }
}

/// Attributes shared by Text, Box, Table, sections and Barcode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Common {
    pub x: Option<Expr>,
    pub y: Option<Expr>,
    pub width: Option<Expr>,
    pub height: Option<Expr>,
    pub align: HAlign,
    pub valign: VAlign,
    pub cond: Option<String>,
    pub font: Option<String>,
    pub border: Border,
}

impl Common {
    pub(crate) fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        let expr = |name: &str| attrs.get(name).and_then(|v| Expr::parse(v));
        Common {
            x: expr("x"),
            y: expr("y"),
            width: expr("width"),
            height: expr("height"),
            align: match lower(attrs, "align").as_deref() {
                Some("center") => HAlign::Center,
                Some("right") => HAlign::Right,
                _ => HAlign::Left,
            },
            valign: match lower(attrs, "vertical-align").as_deref() {
                Some("center") | Some("middle") => VAlign::Center,
                Some("bottom") => VAlign::Bottom,
                _ => VAlign::Top,
            },
            cond: attrs.get("cond").cloned(),
            font: attrs
                .get("font")
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
            border: Border::from_attrs(attrs),
        }
    }
}

/// What a Text node does when its content is wider than `width`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overflow {
    #[default]
    Visible,
    /// Drop trailing characters until it fits.
    Clip,
    /// Step the font size down until it fits.
    Shrink,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAttrs {
    pub overflow: Overflow,
}

impl TextAttrs {
    fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        let overflow = match lower(attrs, "clip").as_deref() {
            Some("char") | Some("yes") | Some("true") => Overflow::Clip,
            Some("shrink") => Overflow::Shrink,
            _ => Overflow::Visible,
        };
        TextAttrs { overflow }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableAttrs {
    /// Explicit body rows per page.
    pub rows: Option<usize>,
    /// 1-based record list bound by this table.
    pub list: Option<usize>,
    /// 1-based line of the first row on page 1.
    pub row_offset: usize,
    pub autowidth: bool,
    pub column_space: Option<Expr>,
}

impl Default for TableAttrs {
    fn default() -> Self {
        TableAttrs {
            rows: None,
            list: None,
            row_offset: 1,
            autowidth: false,
            column_space: None,
        }
    }
}

impl TableAttrs {
    /// Upper bound on body rows per page, explicit or derived from the height.
    pub const MAX_ROWS: usize = 10_000;

    fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        TableAttrs {
            rows: count(attrs, "rows").map(|r| r.min(Self::MAX_ROWS)),
            list: count(attrs, "list").filter(|&l| l > 0),
            row_offset: count(attrs, "rowoffset").unwrap_or(1),
            autowidth: flag(attrs, "autowidth"),
            column_space: attrs.get("columnspace").and_then(|v| Expr::parse(v)),
        }
    }
}

/// Header, body and footer row templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionAttrs {
    /// Skip body rows whose list line holds no record.
    pub omit_no_data: bool,
    pub autowidth: bool,
}

impl SectionAttrs {
    fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        SectionAttrs {
            omit_no_data: flag(attrs, "omitnodata"),
            autowidth: flag(attrs, "autowidth"),
        }
    }
}

/// Barcode symbol families. Whether a payload is valid is up to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarcodeKind {
    #[default]
    Code128,
    Code39,
    Ean13,
    Ean8,
    Interleaved2of5,
    Qr,
    Other(String),
}

impl BarcodeKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "code128" | "128" => BarcodeKind::Code128,
            "code39" | "39" => BarcodeKind::Code39,
            "ean13" | "ean" => BarcodeKind::Ean13,
            "ean8" => BarcodeKind::Ean8,
            "itf" | "2of5" | "interleaved2of5" => BarcodeKind::Interleaved2of5,
            "qr" | "qrcode" => BarcodeKind::Qr,
            other => BarcodeKind::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BarcodeKind::Code128 => "code128",
            BarcodeKind::Code39 => "code39",
            BarcodeKind::Ean13 => "ean13",
            BarcodeKind::Ean8 => "ean8",
            BarcodeKind::Interleaved2of5 => "itf",
            BarcodeKind::Qr => "qr",
            BarcodeKind::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarcodeAttrs {
    pub kind: BarcodeKind,
    /// Bar height relative to the symbol height, when the family has bars.
    pub baseline: Option<f64>,
    pub start_stop_text: bool,
    pub no_text: bool,
    pub top_text: bool,
    /// Text rendered instead of the code when the symbol cannot be drawn.
    pub alt_text: Option<String>,
}

impl BarcodeAttrs {
    fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        BarcodeAttrs {
            kind: BarcodeKind::from_name(attrs.get("type").map_or("", |s| s.as_str())),
            baseline: attrs.get("baseline").and_then(|v| v.trim().parse().ok()),
            start_stop_text: flag(attrs, "startstoptext"),
            no_text: flag(attrs, "notext"),
            top_text: flag(attrs, "toptext"),
            alt_text: attrs.get("alttext").cloned().filter(|s| !s.is_empty()),
        }
    }
}

/// Per-side margin expressions of the page root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginExprs {
    pub top: Option<Expr>,
    pub right: Option<Expr>,
    pub bottom: Option<Expr>,
    pub left: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAttrs {
    pub paper: super::PaperSize,
    pub landscape: bool,
    pub margin: MarginExprs,
}

impl PageAttrs {
    fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        let all = attrs.get("margin").and_then(|v| Expr::parse(v));
        let side = |name: &str| attrs.get(name).and_then(|v| Expr::parse(v)).or(all);
        PageAttrs {
            paper: attrs
                .get("paper")
                .and_then(|p| super::PaperSize::parse(p))
                .unwrap_or_default(),
            landscape: lower(attrs, "orientation").as_deref() == Some("landscape"),
            margin: MarginExprs {
                top: side("margin-top"),
                right: side("margin-right"),
                bottom: side("margin-bottom"),
                left: side("margin-left"),
            },
        }
    }
}

/// Element names accepted in layout markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Page,
    Text,
    Box,
    Table,
    Header,
    Body,
    Footer,
    Barcode,
}

impl Tag {
    pub fn from_name(name: &str) -> Option<Tag> {
        Some(match name.to_ascii_lowercase().as_str() {
            "page" | "report" | "document" => Tag::Page,
            "text" => Tag::Text,
            "box" => Tag::Box,
            "table" => Tag::Table,
            "header" => Tag::Header,
            "body" => Tag::Body,
            "footer" => Tag::Footer,
            "barcode" => Tag::Barcode,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tag::Page => "page",
            Tag::Text => "text",
            Tag::Box => "box",
            Tag::Table => "table",
            Tag::Header => "header",
            Tag::Body => "body",
            Tag::Footer => "footer",
            Tag::Barcode => "barcode",
        }
    }
}

/// A node kind together with its kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Page(PageAttrs),
    Text(TextAttrs),
    Box,
    Table(TableAttrs),
    Header(SectionAttrs),
    Body(SectionAttrs),
    Footer(SectionAttrs),
    Barcode(BarcodeAttrs),
}

impl NodeKind {
    pub(crate) fn from_attrs(tag: Tag, attrs: &BTreeMap<String, String>) -> Self {
        match tag {
            Tag::Page => NodeKind::Page(PageAttrs::from_attrs(attrs)),
            Tag::Text => NodeKind::Text(TextAttrs::from_attrs(attrs)),
            Tag::Box => NodeKind::Box,
            Tag::Table => NodeKind::Table(TableAttrs::from_attrs(attrs)),
            Tag::Header => NodeKind::Header(SectionAttrs::from_attrs(attrs)),
            Tag::Body => NodeKind::Body(SectionAttrs::from_attrs(attrs)),
            Tag::Footer => NodeKind::Footer(SectionAttrs::from_attrs(attrs)),
            Tag::Barcode => NodeKind::Barcode(BarcodeAttrs::from_attrs(attrs)),
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            NodeKind::Page(_) => Tag::Page,
            NodeKind::Text(_) => Tag::Text,
            NodeKind::Box => Tag::Box,
            NodeKind::Table(_) => Tag::Table,
            NodeKind::Header(_) => Tag::Header,
            NodeKind::Body(_) => Tag::Body,
            NodeKind::Footer(_) => Tag::Footer,
            NodeKind::Barcode(_) => Tag::Barcode,
        }
    }
}

// ── attribute helpers ──────────────────────────────────────────────

fn lower(attrs: &BTreeMap<String, String>, name: &str) -> Option<String> {
    attrs.get(name).map(|v| v.trim().to_ascii_lowercase())
}

pub(crate) fn is_yes(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1" | "on"
    )
}

fn flag(attrs: &BTreeMap<String, String>, name: &str) -> bool {
    attrs.get(name).is_some_and(|v| is_yes(v))
}

fn count(attrs: &BTreeMap<String, String>, name: &str) -> Option<usize> {
    attrs.get(name).and_then(|v| v.trim().parse().ok())
}

/// `yes` → default width, a number → that width, anything else → no line.
fn line_width(value: &str) -> f64 {
    let v = value.trim();
    if let Ok(w) = v.parse::<f64>() {
        return w.max(0.0);
    }
    if is_yes(v) {
        Border::DEFAULT_LINE_WIDTH
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Anchor;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn common_defaults_when_missing() {
        let c = Common::from_attrs(&attrs(&[]));
        assert_eq!(c, Common::default());
    }

    #[test]
    fn common_parses_expressions_once() {
        let c = Common::from_attrs(&attrs(&[
            ("x", "+5"),
            ("y", "bogus"),
            ("align", "RIGHT"),
            ("vertical-align", "middle"),
        ]));
        assert_eq!(c.x.unwrap().anchor, Anchor::RelativeForward);
        assert!(c.y.is_none());
        assert_eq!(c.align, HAlign::Right);
        assert_eq!(c.valign, VAlign::Center);
    }

    #[test]
    fn border_sides_override_all() {
        let b = Border::from_attrs(&attrs(&[("border", "yes"), ("border-top", "2"), ("border-left", "no")]));
        assert_eq!(b.top, 2.0);
        assert_eq!(b.right, Border::DEFAULT_LINE_WIDTH);
        assert_eq!(b.left, 0.0);
        assert!(!b.crossline);
    }

    #[test]
    fn table_defaults() {
        let t = TableAttrs::from_attrs(&attrs(&[("rows", "x"), ("list", "0")]));
        assert_eq!(t.rows, None);
        assert_eq!(t.list, None);
        assert_eq!(t.row_offset, 1);
    }

    #[test]
    fn table_rows_are_capped() {
        let t = TableAttrs::from_attrs(&attrs(&[
            ("rows", "18446744073709551615"),
            ("rowoffset", "18446744073709551615"),
        ]));
        assert_eq!(t.rows, Some(TableAttrs::MAX_ROWS));
        assert_eq!(t.row_offset, usize::MAX);
    }

    #[test]
    fn barcode_kind_names() {
        assert_eq!(BarcodeKind::from_name("QR"), BarcodeKind::Qr);
        assert_eq!(BarcodeKind::from_name(""), BarcodeKind::Code128);
        assert_eq!(
            BarcodeKind::from_name("aztec"),
            BarcodeKind::Other("aztec".to_string())
        );
    }

    #[test]
    fn text_clip_modes() {
        let t = |v: &str| TextAttrs::from_attrs(&attrs(&[("clip", v)])).overflow;
        assert_eq!(t("char"), Overflow::Clip);
        assert_eq!(t("yes"), Overflow::Clip);
        assert_eq!(t("shrink"), Overflow::Shrink);
        assert_eq!(t("no"), Overflow::Visible);
    }
}
