//! # Drawing Surface
//!
//! The layout engine never writes output itself. It talks to a paged drawing
//! surface through the [`Surface`] trait: open a document, open a page, emit
//! lines, text runs and barcodes, close the page, finish the document. Font
//! measurement lives here too, since only the backend knows its glyphs.
//!
//! Coordinates are page coordinates in points with the origin at the top-left
//! corner and y growing downward. Backends with a different convention (PDF)
//! convert on their side.

pub mod recording;

pub use recording::{Primitive, RecordedPage, RecordingSurface};

use crate::error::SurfaceError;
use crate::model::{BarcodeKind, Metadata};

/// Font identity handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub face: String,
    pub size: f64,
    pub bold: bool,
}

/// Vertical font metrics in points. `descent` is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f64,
    pub descent: f64,
    pub line_gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
}

/// One line of text starting at `x` on `baseline`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub baseline: f64,
    pub text: String,
    pub font: FontSpec,
    pub char_spacing: f64,
    /// Runs downward (quarter turn clockwise) instead of left to right.
    pub rotated: bool,
}

/// What to draw for a barcode. The backend decides whether the code is valid
/// for the symbol family.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeSpec {
    pub kind: BarcodeKind,
    pub code: String,
    pub baseline: Option<f64>,
    pub show_text: bool,
    pub top_text: bool,
    pub start_stop_text: bool,
}

/// A paged drawing backend.
pub trait Surface {
    fn begin_document(&mut self, metadata: &Metadata) -> Result<(), SurfaceError>;
    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), SurfaceError>;
    fn end_page(&mut self) -> Result<(), SurfaceError>;
    /// Complete the document and flush the output.
    fn finish(&mut self) -> Result<(), SurfaceError>;
    /// Give up on a partially written document.
    fn abandon(&mut self);

    fn draw_line(&mut self, line: Line) -> Result<(), SurfaceError>;
    fn draw_text(&mut self, run: &TextRun) -> Result<(), SurfaceError>;
    fn draw_barcode(&mut self, spec: &BarcodeSpec, rect: Rect) -> Result<(), SurfaceError>;

    /// Natural `(width, height)` of a symbol.
    fn barcode_size(&self, spec: &BarcodeSpec) -> Result<(f64, f64), SurfaceError>;
    fn measure_font(&self, font: &FontSpec) -> FontMetrics;
    /// Advance width of `text`, without character spacing.
    fn text_width(&self, font: &FontSpec, text: &str) -> f64;
    /// Make a font file available under `face`.
    fn register_font(&mut self, face: &str, data: Vec<u8>) -> Result<(), SurfaceError>;
}

/// Turns every page a quarter turn clockwise.
///
/// The layout is computed on the unrotated page; each primitive is mapped
/// through `(x, y) -> (H - y, x)`, where `H` is the unrotated page height,
/// onto a page whose width and height are swapped.
pub struct Rotated<'a> {
    inner: &'a mut dyn Surface,
    page_height: f64,
}

impl<'a> Rotated<'a> {
    pub fn new(inner: &'a mut dyn Surface) -> Self {
        Rotated {
            inner,
            page_height: 0.0,
        }
    }

    fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (self.page_height - y, x)
    }

    fn rect(&self, r: Rect) -> Rect {
        Rect::new(self.page_height - r.y - r.height, r.x, r.height, r.width)
    }
}

impl Surface for Rotated<'_> {
    fn begin_document(&mut self, metadata: &Metadata) -> Result<(), SurfaceError> {
        self.inner.begin_document(metadata)
    }

    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), SurfaceError> {
        self.page_height = height;
        self.inner.begin_page(height, width)
    }

    fn end_page(&mut self) -> Result<(), SurfaceError> {
        self.inner.end_page()
    }

    fn finish(&mut self) -> Result<(), SurfaceError> {
        self.inner.finish()
    }

    fn abandon(&mut self) {
        self.inner.abandon()
    }

    fn draw_line(&mut self, line: Line) -> Result<(), SurfaceError> {
        let (x1, y1) = self.point(line.x1, line.y1);
        let (x2, y2) = self.point(line.x2, line.y2);
        self.inner.draw_line(Line {
            x1,
            y1,
            x2,
            y2,
            width: line.width,
        })
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<(), SurfaceError> {
        let (x, baseline) = self.point(run.x, run.baseline);
        self.inner.draw_text(&TextRun {
            x,
            baseline,
            rotated: !run.rotated,
            ..run.clone()
        })
    }

    fn draw_barcode(&mut self, spec: &BarcodeSpec, rect: Rect) -> Result<(), SurfaceError> {
        let rect = self.rect(rect);
        self.inner.draw_barcode(spec, rect)
    }

    fn barcode_size(&self, spec: &BarcodeSpec) -> Result<(f64, f64), SurfaceError> {
        self.inner.barcode_size(spec)
    }

    fn measure_font(&self, font: &FontSpec) -> FontMetrics {
        self.inner.measure_font(font)
    }

    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        self.inner.text_width(font, text)
    }

    fn register_font(&mut self, face: &str, data: Vec<u8>) -> Result<(), SurfaceError> {
        self.inner.register_font(face, data)
    }
}

/// An open document on a surface. Dropping the guard before
/// [`finish`](DocumentGuard::finish) abandons the document, so a failure on
/// any page still releases the backend's output.
pub struct DocumentGuard<'a> {
    surface: &'a mut dyn Surface,
    finished: bool,
}

impl<'a> DocumentGuard<'a> {
    pub fn begin(surface: &'a mut dyn Surface, metadata: &Metadata) -> Result<Self, SurfaceError> {
        surface.begin_document(metadata)?;
        Ok(DocumentGuard {
            surface,
            finished: false,
        })
    }

    pub fn surface(&mut self) -> &mut dyn Surface {
        &mut *self.surface
    }

    pub fn finish(mut self) -> Result<(), SurfaceError> {
        self.surface.finish()?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for DocumentGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.surface.abandon();
        }
    }
}
