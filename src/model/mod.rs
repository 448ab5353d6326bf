//! # Document Model
//!
//! The input representation for the report engine. A document is a tree of
//! positioned nodes (text fields, boxes, repeating tables, barcodes) under a
//! single page root, plus the named font definitions the tree refers to.
//!
//! The tree is immutable once built. Attribute strings are kept as they came
//! in, and the typed per-kind schema in [`schema`] is derived from them when a
//! node is constructed, so layout never re-parses an attribute.

pub mod schema;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::param::{Axis, Expr, FontScale};
pub use schema::*;

/// A complete report layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The page root. Rendered once per page.
    pub root: Node,

    /// Named fonts referenced by `font=` attributes.
    #[serde(default)]
    pub fonts: Vec<FontDef>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            fonts: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    /// Page attributes of the root, if the root is a page.
    pub fn page(&self) -> Option<&PageAttrs> {
        match &self.root.kind {
            NodeKind::Page(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// Document metadata handed to the surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// A named font definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDef {
    pub name: String,
    /// Backend face name (e.g. "Helvetica", "Courier").
    #[serde(default = "default_face")]
    pub face: String,
    #[serde(default = "default_size")]
    pub size: f64,
    #[serde(default)]
    pub bold: bool,
    /// Explicit overrides; each wins over the measured value.
    #[serde(default)]
    pub line_height: Option<f64>,
    #[serde(default)]
    pub descent: Option<f64>,
    #[serde(default)]
    pub char_width: Option<f64>,
    /// Extra spacing added after every character.
    #[serde(default)]
    pub char_spacing: f64,
    /// Font file, looked up in the configured font directory.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_face() -> String {
    "Helvetica".to_string()
}

fn default_size() -> f64 {
    10.0
}

impl FontDef {
    pub fn new(name: &str, face: &str, size: f64) -> Self {
        Self {
            name: name.to_string(),
            face: face.to_string(),
            size,
            bold: false,
            line_height: None,
            descent: None,
            char_width: None,
            char_spacing: 0.0,
            file: None,
        }
    }

    /// Build a definition from markup attributes. Numbers that do not parse
    /// are ignored.
    pub fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        let num = |name: &str| attrs.get(name).and_then(|v| v.trim().parse::<f64>().ok());
        let mut def = FontDef::new(
            attrs.get("name").map_or("default", |s| s.trim()),
            attrs.get("face").map_or("Helvetica", |s| s.trim()),
            num("size").filter(|s| *s > 0.0).unwrap_or(10.0),
        );
        def.bold = attrs.get("bold").is_some_and(|v| schema::is_yes(v));
        def.line_height = num("lineheight");
        def.descent = num("descent");
        def.char_width = num("charwidth");
        def.char_spacing = num("charspacing").unwrap_or(0.0);
        def.file = attrs.get("file").cloned().filter(|f| !f.is_empty());
        def
    }
}

impl Default for FontDef {
    fn default() -> Self {
        FontDef::new("default", "Helvetica", 10.0)
    }
}

/// Paper sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PaperSize {
    /// Returns (width, height) in points, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::A3 => (841.89, 1190.55),
            PaperSize::A5 => (419.53, 595.28),
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Legal => (612.0, 1008.0),
            PaperSize::Tabloid => (792.0, 1224.0),
            PaperSize::Custom { width, height } => (*width, *height),
        }
    }

    /// Parse a paper name or `"<w> <h>"` with unit-suffixed parts.
    pub fn parse(s: &str) -> Option<PaperSize> {
        let named = match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(PaperSize::A4),
            "a3" => Some(PaperSize::A3),
            "a5" => Some(PaperSize::A5),
            "letter" => Some(PaperSize::Letter),
            "legal" => Some(PaperSize::Legal),
            "tabloid" => Some(PaperSize::Tabloid),
            _ => None,
        };
        if named.is_some() {
            return named;
        }

        let unit = FontScale {
            char_width: 0.0,
            line_height: 0.0,
        };
        let mut parts = s.split_whitespace().map(Expr::parse);
        let (w, h) = match (parts.next(), parts.next(), parts.next()) {
            (Some(Some(w)), Some(Some(h)), None) => (w, h),
            _ => return None,
        };
        let width = w.magnitude_points(Axis::X, 0.0, &unit);
        let height = h.magnitude_points(Axis::Y, 0.0, &unit);
        (width > 0.0 && height > 0.0).then_some(PaperSize::Custom { width, height })
    }
}

/// Edge values (top, right, bottom, left) in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Resolved page geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: Edges,
}

impl PageGeometry {
    pub fn content_width(&self) -> f64 {
        (self.width - self.margin.horizontal()).max(0.0)
    }

    pub fn content_height(&self) -> f64 {
        (self.height - self.margin.vertical()).max(0.0)
    }
}

impl PageAttrs {
    /// Resolve paper, orientation and margins. Margins may use `%` of the
    /// page dimension on their axis; font units resolve against `font`.
    pub fn geometry(&self, font: &FontScale) -> PageGeometry {
        let (mut width, mut height) = self.paper.dimensions();
        if self.landscape {
            std::mem::swap(&mut width, &mut height);
        }
        let m = |e: Option<Expr>, axis: Axis, extent: f64| {
            e.map_or(0.0, |e| e.magnitude_points(axis, extent, font).max(0.0))
        };
        PageGeometry {
            width,
            height,
            margin: Edges {
                top: m(self.margin.top, Axis::Y, height),
                right: m(self.margin.right, Axis::X, width),
                bottom: m(self.margin.bottom, Axis::Y, height),
                left: m(self.margin.left, Axis::X, width),
            },
        }
    }
}

/// A node in the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct Node {
    /// Kind plus kind-specific attributes.
    pub kind: NodeKind,
    /// Attributes shared by every positioned kind.
    pub common: Common,
    /// The unparsed attributes, as given.
    pub attributes: BTreeMap<String, String>,
    /// Text content (template text for Text, code for Barcode).
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new<I, K, V>(tag: Tag, attributes: I, text: &str, children: Vec<Node>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let attributes: BTreeMap<String, String> = attributes
            .into_iter()
            .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
            .collect();
        Self {
            kind: NodeKind::from_attrs(tag, &attributes),
            common: Common::from_attrs(&attributes),
            attributes,
            text: text.to_string(),
            children,
        }
    }

    pub fn tag(&self) -> Tag {
        self.kind.tag()
    }

    /// The raw value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// First direct child with the given tag.
    pub fn child(&self, tag: Tag) -> Option<&Node> {
        self.children.iter().find(|c| c.tag() == tag)
    }
}

/// Serialized form of a node: a tag name, raw attributes, text and children.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl TryFrom<RawNode> for Node {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let tag = Tag::from_name(&raw.tag).ok_or_else(|| format!("unknown node type '{}'", raw.tag))?;
        Ok(Node::new(tag, raw.attributes, &raw.text, raw.children))
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        RawNode {
            tag: node.tag().name().to_string(),
            attributes: node.attributes,
            text: node.text,
            children: node.children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_names_and_custom() {
        assert_eq!(PaperSize::parse("letter"), Some(PaperSize::Letter));
        let custom = PaperSize::parse("100 200").unwrap();
        assert_eq!(custom.dimensions(), (100.0, 200.0));
        let mm = PaperSize::parse("210m 297m").unwrap();
        let (w, h) = mm.dimensions();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
        assert_eq!(PaperSize::parse("huge"), None);
        assert_eq!(PaperSize::parse("1 2 3"), None);
    }

    #[test]
    fn landscape_swaps_and_margins_resolve() {
        let root = Node::new(
            Tag::Page,
            [("paper", "A4"), ("orientation", "landscape"), ("margin", "10"), ("margin-left", "10%")],
            "",
            vec![],
        );
        let attrs = match &root.kind {
            NodeKind::Page(a) => a.clone(),
            _ => unreachable!(),
        };
        let unit = FontScale {
            char_width: 5.0,
            line_height: 10.0,
        };
        let g = attrs.geometry(&unit);
        assert!(g.width > g.height);
        assert_eq!(g.margin.top, 10.0);
        assert!((g.margin.left - 84.189).abs() < 0.001);
    }

    #[test]
    fn json_round_trip_keeps_typed_schema() {
        let json = r#"{
            "type": "table",
            "attributes": { "rows": "3", "list": "1", "x": "+2" },
            "children": [ { "type": "body", "attributes": { "omitnodata": "yes" } } ]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        match &node.kind {
            NodeKind::Table(t) => {
                assert_eq!(t.rows, Some(3));
                assert_eq!(t.list, Some(1));
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert!(node.common.x.is_some());
        let back = serde_json::to_string(&node).unwrap();
        let again: Node = serde_json::from_str(&back).unwrap();
        assert_eq!(node, again);
    }

    #[test]
    fn unknown_json_type_is_rejected() {
        let err = serde_json::from_str::<Node>(r#"{ "type": "marquee" }"#).unwrap_err();
        assert!(err.to_string().contains("unknown node type"));
    }

    #[test]
    fn font_def_from_attrs() {
        let attrs: BTreeMap<String, String> = [("name", "small"), ("size", "8"), ("bold", "yes"), ("lineheight", "x")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let def = FontDef::from_attrs(&attrs);
        assert_eq!(def.name, "small");
        assert_eq!(def.size, 8.0);
        assert!(def.bold);
        assert_eq!(def.line_height, None);
    }
}
