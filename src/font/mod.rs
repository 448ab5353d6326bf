//! # Font Parameter Set
//!
//! Named font definitions for one report run. Each [`FontParam`] measures
//! itself against the drawing surface the first time its metrics are asked
//! for and keeps the result for the rest of the run. Numbers declared on the
//! definition (`lineheight`, `descent`, `charwidth`) always win over what the
//! surface reports.
//!
//! Lookups never fail: an unknown or empty name gets the `"default"` entry.

pub mod metrics;

pub use metrics::{CustomFontMetrics, StandardFont, StandardFontMetrics};

use std::cell::OnceCell;
use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::model::FontDef;
use crate::param::FontScale;
use crate::surface::{FontSpec, Surface};

/// Name of the fallback entry.
pub const DEFAULT_FONT: &str = "default";

/// Smallest size the `shrink` overflow policy goes down to.
pub const MIN_SHRINK_SIZE: f64 = 5.0;

/// Resolved metrics of one font, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMetrics {
    pub ascent: f64,
    pub descent: f64,
    pub line_height: f64,
    pub char_width: f64,
}

/// A named font plus its lazily measured metrics.
#[derive(Debug, Clone)]
pub struct FontParam {
    pub def: FontDef,
    metrics: OnceCell<ResolvedMetrics>,
}

impl FontParam {
    pub fn new(def: FontDef) -> Self {
        FontParam {
            def,
            metrics: OnceCell::new(),
        }
    }

    pub fn spec(&self) -> FontSpec {
        FontSpec {
            face: self.def.face.clone(),
            size: self.def.size,
            bold: self.def.bold,
        }
    }

    /// Metrics, measured on first use.
    pub fn metrics(&self, surface: &dyn Surface) -> ResolvedMetrics {
        *self.metrics.get_or_init(|| {
            let spec = self.spec();
            let measured = surface.measure_font(&spec);
            let m = ResolvedMetrics {
                ascent: measured.ascent,
                descent: self.def.descent.unwrap_or(measured.descent),
                line_height: self
                    .def
                    .line_height
                    .unwrap_or(measured.ascent + measured.descent + measured.line_gap),
                char_width: self
                    .def
                    .char_width
                    .unwrap_or_else(|| surface.text_width(&spec, "0") + self.def.char_spacing),
            };
            debug!(font = %self.def.name, ?m, "font metrics resolved");
            m
        })
    }

    pub fn line_height(&self, surface: &dyn Surface) -> f64 {
        self.metrics(surface).line_height
    }

    pub fn descent(&self, surface: &dyn Surface) -> f64 {
        self.metrics(surface).descent
    }

    pub fn char_width(&self, surface: &dyn Surface) -> f64 {
        self.metrics(surface).char_width
    }

    /// Scale for `c`/`l` coordinate units.
    pub fn scale(&self, surface: &dyn Surface) -> FontScale {
        let m = self.metrics(surface);
        FontScale {
            char_width: m.char_width,
            line_height: m.line_height,
        }
    }

    /// Width of `text` including character spacing.
    pub fn text_width(&self, surface: &dyn Surface, text: &str) -> f64 {
        surface.text_width(&self.spec(), text)
            + self.def.char_spacing * text.chars().count() as f64
    }

    /// The same font at another size, with fresh metrics. Explicit overrides
    /// are size-specific and are dropped.
    pub fn resized(&self, size: f64) -> FontParam {
        FontParam::new(FontDef {
            size,
            line_height: None,
            descent: None,
            char_width: None,
            ..self.def.clone()
        })
    }
}

/// Every font of one run, by name.
#[derive(Debug, Clone)]
pub struct FontSet {
    default: FontParam,
    named: HashMap<String, FontParam>,
}

impl FontSet {
    /// Build from the document's definitions. A definition named `default`
    /// replaces `fallback`.
    pub fn new(defs: &[FontDef], fallback: &FontDef) -> Self {
        let mut default = FontParam::new(FontDef {
            name: DEFAULT_FONT.to_string(),
            ..fallback.clone()
        });
        let mut named = HashMap::new();
        for def in defs {
            if def.name == DEFAULT_FONT {
                default = FontParam::new(def.clone());
            } else {
                named.insert(def.name.clone(), FontParam::new(def.clone()));
            }
        }
        FontSet { default, named }
    }

    /// Look a font up by name; unknown or empty names give the default.
    pub fn resolve(&self, name: &str) -> &FontParam {
        self.named.get(name.trim()).unwrap_or(&self.default)
    }

    pub fn default_font(&self) -> &FontParam {
        &self.default
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontParam> {
        std::iter::once(&self.default).chain(self.named.values())
    }

    /// Hand every `file=` font to the surface. Unreadable or rejected files
    /// are logged and the font keeps rendering with the backend's fallback.
    pub fn load_files(&self, font_dir: Option<&Path>, surface: &mut dyn Surface) {
        for param in self.iter() {
            let Some(file) = param.def.file.as_deref() else {
                continue;
            };
            let path = match font_dir {
                Some(dir) if Path::new(file).is_relative() => dir.join(file),
                _ => Path::new(file).to_path_buf(),
            };
            match std::fs::read(&path) {
                Ok(data) => {
                    if let Err(e) = surface.register_font(&param.def.face, data) {
                        warn!(path = %path.display(), error = %e, "font file rejected");
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "font file unreadable"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    #[test]
    fn unknown_and_empty_names_fall_back() {
        let set = FontSet::new(&[FontDef::new("big", "Helvetica", 20.0)], &FontDef::default());
        assert_eq!(set.resolve("big").def.size, 20.0);
        assert_eq!(set.resolve("").def.name, "default");
        assert_eq!(set.resolve("nope").def.name, "default");
    }

    #[test]
    fn document_default_replaces_config_default() {
        let set = FontSet::new(
            &[FontDef::new("default", "Courier", 8.0)],
            &FontDef::new("ignored", "Helvetica", 10.0),
        );
        assert_eq!(set.resolve("x").def.face, "Courier");
        assert_eq!(set.default_font().def.size, 8.0);
    }

    #[test]
    fn metrics_are_measured_and_overridable() {
        let surface = RecordingSurface::new();
        let measured = FontParam::new(FontDef::new("a", "Helvetica", 10.0));
        assert_eq!(measured.line_height(&surface), 10.0);
        assert_eq!(measured.char_width(&surface), 6.0);
        assert_eq!(measured.descent(&surface), 2.0);

        let mut def = FontDef::new("b", "Helvetica", 10.0);
        def.line_height = Some(14.0);
        def.char_width = Some(7.5);
        let declared = FontParam::new(def);
        assert_eq!(declared.line_height(&surface), 14.0);
        assert_eq!(declared.char_width(&surface), 7.5);
    }

    #[test]
    fn char_spacing_widens_text() {
        let surface = RecordingSurface::new();
        let mut def = FontDef::new("s", "Helvetica", 10.0);
        def.char_spacing = 1.0;
        let f = FontParam::new(def);
        assert_eq!(f.text_width(&surface, "ab"), 14.0);
        assert_eq!(f.char_width(&surface), 7.0);
    }

    #[test]
    fn resized_drops_overrides() {
        let mut def = FontDef::new("s", "Helvetica", 10.0);
        def.line_height = Some(30.0);
        let smaller = FontParam::new(def).resized(5.0);
        assert_eq!(smaller.def.size, 5.0);
        assert_eq!(smaller.def.line_height, None);
        assert_eq!(smaller.line_height(&RecordingSurface::new()), 5.0);
    }

    #[test]
    fn missing_font_file_is_not_fatal() {
        let mut def = FontDef::new("custom", "MyFace", 10.0);
        def.file = Some("does-not-exist.ttf".into());
        let set = FontSet::new(&[def], &FontDef::default());
        let mut surface = RecordingSurface::new();
        set.load_files(Some(Path::new("/nonexistent")), &mut surface);
        assert!(surface.fonts.is_empty());
    }
}
