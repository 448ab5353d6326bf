//! A surface that keeps every primitive in memory.
//!
//! Metrics are deterministic and face-independent: every character advances
//! 0.6 em, ascent is 0.8 em, descent 0.2 em, no line gap. A 10pt font is
//! therefore exactly 10pt tall and 6pt per character.

use crate::error::SurfaceError;
use crate::model::{BarcodeKind, Metadata};

use super::{BarcodeSpec, FontMetrics, FontSpec, Line, Rect, Surface, TextRun};

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line(Line),
    Text(TextRun),
    Barcode { spec: BarcodeSpec, rect: Rect },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPage {
    pub width: f64,
    pub height: f64,
    pub primitives: Vec<Primitive>,
}

impl RecordedPage {
    /// Text runs in drawing order.
    pub fn texts(&self) -> Vec<&TextRun> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Just the strings of [`texts`](Self::texts).
    pub fn strings(&self) -> Vec<&str> {
        self.texts().into_iter().map(|t| t.text.as_str()).collect()
    }

    pub fn lines(&self) -> Vec<&Line> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Line(l) => Some(l),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub metadata: Option<Metadata>,
    pub pages: Vec<RecordedPage>,
    pub fonts: Vec<String>,
    pub finished: bool,
    pub abandoned: bool,
    open: Option<RecordedPage>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn page_mut(&mut self) -> Result<&mut RecordedPage, SurfaceError> {
        self.open.as_mut().ok_or(SurfaceError::NoOpenPage)
    }

    fn check_barcode(spec: &BarcodeSpec) -> Result<(), SurfaceError> {
        let digits_only = spec.code.chars().all(|c| c.is_ascii_digit());
        match &spec.kind {
            BarcodeKind::Other(name) => Err(SurfaceError::UnsupportedBarcode(name.clone())),
            BarcodeKind::Ean13 | BarcodeKind::Ean8 | BarcodeKind::Interleaved2of5
                if !digits_only =>
            {
                Err(SurfaceError::InvalidBarcode(format!(
                    "{} accepts digits only: '{}'",
                    spec.kind.name(),
                    spec.code
                )))
            }
            _ => Ok(()),
        }
    }
}

impl Surface for RecordingSurface {
    fn begin_document(&mut self, metadata: &Metadata) -> Result<(), SurfaceError> {
        self.metadata = Some(metadata.clone());
        Ok(())
    }

    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), SurfaceError> {
        if let Some(page) = self.open.take() {
            self.pages.push(page);
        }
        self.open = Some(RecordedPage {
            width,
            height,
            primitives: Vec::new(),
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), SurfaceError> {
        let page = self.open.take().ok_or(SurfaceError::NoOpenPage)?;
        self.pages.push(page);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SurfaceError> {
        if let Some(page) = self.open.take() {
            self.pages.push(page);
        }
        self.finished = true;
        Ok(())
    }

    fn abandon(&mut self) {
        self.open = None;
        self.abandoned = true;
    }

    fn draw_line(&mut self, line: Line) -> Result<(), SurfaceError> {
        self.page_mut()?.primitives.push(Primitive::Line(line));
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<(), SurfaceError> {
        self.page_mut()?.primitives.push(Primitive::Text(run.clone()));
        Ok(())
    }

    fn draw_barcode(&mut self, spec: &BarcodeSpec, rect: Rect) -> Result<(), SurfaceError> {
        Self::check_barcode(spec)?;
        self.page_mut()?.primitives.push(Primitive::Barcode {
            spec: spec.clone(),
            rect,
        });
        Ok(())
    }

    fn barcode_size(&self, spec: &BarcodeSpec) -> Result<(f64, f64), SurfaceError> {
        Self::check_barcode(spec)?;
        Ok(match spec.kind {
            BarcodeKind::Qr => (40.0, 40.0),
            _ => (spec.code.chars().count() as f64 * 8.0 + 20.0, 30.0),
        })
    }

    fn measure_font(&self, font: &FontSpec) -> FontMetrics {
        FontMetrics {
            ascent: font.size * 4.0 / 5.0,
            descent: font.size / 5.0,
            line_gap: 0.0,
        }
    }

    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        text.chars().count() as f64 * font.size * 3.0 / 5.0
    }

    fn register_font(&mut self, face: &str, _data: Vec<u8>) -> Result<(), SurfaceError> {
        self.fonts.push(face.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: BarcodeKind, code: &str) -> BarcodeSpec {
        BarcodeSpec {
            kind,
            code: code.to_string(),
            baseline: None,
            show_text: true,
            top_text: false,
            start_stop_text: false,
        }
    }

    #[test]
    fn drawing_without_page_fails() {
        let mut s = RecordingSurface::new();
        let line = Line {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
            width: 1.0,
        };
        assert!(matches!(s.draw_line(line), Err(SurfaceError::NoOpenPage)));
        assert!(matches!(s.end_page(), Err(SurfaceError::NoOpenPage)));
    }

    #[test]
    fn pages_are_kept_in_order() {
        let mut s = RecordingSurface::new();
        s.begin_page(100.0, 200.0).unwrap();
        s.end_page().unwrap();
        s.begin_page(300.0, 400.0).unwrap();
        s.finish().unwrap();
        assert_eq!(s.pages.len(), 2);
        assert_eq!(s.pages[1].width, 300.0);
        assert!(s.finished);
    }

    #[test]
    fn barcode_validation() {
        let s = RecordingSurface::new();
        assert!(s.barcode_size(&spec(BarcodeKind::Code128, "ABC-1")).is_ok());
        assert!(matches!(
            s.barcode_size(&spec(BarcodeKind::Ean13, "12AB")),
            Err(SurfaceError::InvalidBarcode(_))
        ));
        assert!(matches!(
            s.barcode_size(&spec(BarcodeKind::Other("pdf417".into()), "x")),
            Err(SurfaceError::UnsupportedBarcode(_))
        ));
    }

    #[test]
    fn metrics_are_monospace() {
        let s = RecordingSurface::new();
        let font = FontSpec {
            face: "Anything".into(),
            size: 10.0,
            bold: true,
        };
        assert_eq!(s.text_width(&font, "abc"), 18.0);
        let m = s.measure_font(&font);
        assert_eq!(m.ascent + m.descent + m.line_gap, 10.0);
    }
}
