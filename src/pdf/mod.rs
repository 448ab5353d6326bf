//! # PDF Surface
//!
//! A [`Surface`] that writes a PDF 1.7 file. Pages are collected as content
//! streams while the report renders and serialized in one go on
//! [`finish`](Surface::finish).
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- Catalog
//! 2 0 obj ... endobj  <- Pages tree
//! ...                 <- fonts, then content stream + page per page, Info
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Text uses the standard Type1 fonts with WinAnsiEncoding, so nothing is
//! embedded. Fonts registered from files only contribute metrics; they are
//! drawn with Helvetica. QR codes are drawn as filled modules and the linear
//! families (Code 128, Code 39, EAN-13, EAN-8, interleaved 2 of 5) as filled
//! bars. Any other family is reported as unsupported and the layout falls
//! back to text.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite; // for write! on String
use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::Path;

use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::tf::TF;
use miniz_oxide::deflate::compress_to_vec_zlib;
use qrcode::{Color, QrCode};
use tracing::debug;

use crate::error::SurfaceError;
use crate::font::{CustomFontMetrics, StandardFont};
use crate::model::{BarcodeKind, Metadata};
use crate::surface::{BarcodeSpec, FontMetrics, FontSpec, Line, Rect, Surface, TextRun};

/// Points per QR module at natural size.
const QR_MODULE: f64 = 2.0;
/// Points per linear bar module and bar height at natural size.
const BAR_MODULE: f64 = 1.0;
const BAR_HEIGHT: f64 = 36.0;

/// Code 128 character set B, used when the code names no set itself.
const CODE128_SET_B: char = 'Ɓ';

struct PdfPage {
    width: f64,
    height: f64,
    content: String,
}

struct PdfObject {
    data: Vec<u8>,
}

pub struct PdfSurface<W: IoWrite> {
    out: Option<W>,
    metadata: Metadata,
    pages: Vec<PdfPage>,
    current: Option<PdfPage>,
    /// Standard fonts in first-use order; the index is the `/F<n>` name.
    fonts: Vec<StandardFont>,
    custom: HashMap<String, CustomFontMetrics>,
}

impl PdfSurface<BufWriter<File>> {
    /// Open `path` for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SurfaceError> {
        let file = File::create(path.as_ref())?;
        Ok(PdfSurface::new(BufWriter::new(file)))
    }
}

impl<W: IoWrite> PdfSurface<W> {
    pub fn new(out: W) -> Self {
        PdfSurface {
            out: Some(out),
            metadata: Metadata::default(),
            pages: Vec::new(),
            current: None,
            fonts: Vec::new(),
            custom: HashMap::new(),
        }
    }

    /// The writer, once the surface is done with it. `None` after
    /// [`abandon`](Surface::abandon).
    pub fn into_inner(self) -> Option<W> {
        self.out
    }

    fn page_mut(&mut self) -> Result<&mut PdfPage, SurfaceError> {
        self.current.as_mut().ok_or(SurfaceError::NoOpenPage)
    }

    fn font_index(&mut self, font: StandardFont) -> usize {
        match self.fonts.iter().position(|f| *f == font) {
            Some(i) => i,
            None => {
                self.fonts.push(font);
                self.fonts.len() - 1
            }
        }
    }

    fn qr(spec: &BarcodeSpec) -> Result<QrCode, SurfaceError> {
        QrCode::new(spec.code.as_bytes()).map_err(|e| SurfaceError::InvalidBarcode(e.to_string()))
    }

    /// Bar modules of a linear symbol, 1 for a dark module.
    fn bars(spec: &BarcodeSpec) -> Result<Vec<u8>, SurfaceError> {
        let code = spec.code.as_str();
        let encoded = match spec.kind {
            BarcodeKind::Code128 => {
                let data = if code.starts_with(['À', 'Ɓ', 'Ć']) {
                    code.to_string()
                } else {
                    format!("{}{}", CODE128_SET_B, code)
                };
                Code128::new(data.as_str()).map(|b| b.encode())
            }
            BarcodeKind::Code39 => Code39::new(code).map(|b| b.encode()),
            BarcodeKind::Ean13 => EAN13::new(code).map(|b| b.encode()),
            BarcodeKind::Ean8 => EAN8::new(code).map(|b| b.encode()),
            BarcodeKind::Interleaved2of5 => TF::interleaved(code).map(|b| b.encode()),
            BarcodeKind::Qr | BarcodeKind::Other(_) => {
                return Err(SurfaceError::UnsupportedBarcode(spec.kind.name().to_string()))
            }
        };
        encoded.map_err(|e| {
            SurfaceError::InvalidBarcode(format!("{} '{}': {}", spec.kind.name(), code, e))
        })
    }

    /// Build the complete file.
    fn build(&self) -> Vec<u8> {
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        let mut objects: Vec<PdfObject> = (0..3).map(|_| PdfObject { data: vec![] }).collect();

        let font_ids: Vec<usize> = self
            .fonts
            .iter()
            .map(|font| {
                let id = objects.len();
                objects.push(PdfObject {
                    data: format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    )
                    .into_bytes(),
                });
                id
            })
            .collect();
        let font_resources: String = font_ids
            .iter()
            .enumerate()
            .map(|(i, id)| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in &self.pages {
            let compressed = compress_to_vec_zlib(page.content.as_bytes(), 6);

            let content_obj_id = objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            objects.push(PdfObject { data: content_data });

            let page_obj_id = objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width, page.height, content_obj_id, font_resources
            );
            objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let meta = &self.metadata;
        let info_obj_id = if meta.title.is_some() || meta.author.is_some() || meta.subject.is_some() {
            let id = objects.len();
            let mut info = String::from("<< ");
            if let Some(ref title) = meta.title {
                let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
            }
            if let Some(ref author) = meta.author {
                let _ = write!(info, "/Author ({}) ", escape_pdf_string(author));
            }
            if let Some(ref subject) = meta.subject {
                let _ = write!(info, "/Subject ({}) ", escape_pdf_string(subject));
            }
            info.push_str("/Producer (pagewright) >>");
            objects.push(PdfObject {
                data: info.into_bytes(),
            });
            Some(id)
        } else {
            None
        };

        serialize(&objects, info_obj_id)
    }

    /// Linear symbol stretched over `rect`; runs of dark modules become one bar.
    fn draw_bars(&mut self, spec: &BarcodeSpec, rect: Rect) -> Result<(), SurfaceError> {
        let bars = Self::bars(spec)?;
        let page = self.page_mut()?;
        let module = rect.width / bars.len().max(1) as f64;
        let bottom = page.height - rect.y - rect.height;

        page.content.push_str("q\n0 g\n");
        let mut i = 0;
        while i < bars.len() {
            if bars[i] == 0 {
                i += 1;
                continue;
            }
            let start = i;
            while i < bars.len() && bars[i] == 1 {
                i += 1;
            }
            let _ = write!(
                page.content,
                "{:.3} {:.3} {:.3} {:.3} re\n",
                rect.x + start as f64 * module,
                bottom,
                (i - start) as f64 * module,
                rect.height
            );
        }
        page.content.push_str("f\nQ\n");
        Ok(())
    }
}

impl<W: IoWrite> Surface for PdfSurface<W> {
    fn begin_document(&mut self, metadata: &Metadata) -> Result<(), SurfaceError> {
        self.metadata = metadata.clone();
        Ok(())
    }

    fn begin_page(&mut self, width: f64, height: f64) -> Result<(), SurfaceError> {
        if let Some(page) = self.current.take() {
            self.pages.push(page);
        }
        self.current = Some(PdfPage {
            width,
            height,
            content: String::new(),
        });
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), SurfaceError> {
        let page = self.current.take().ok_or(SurfaceError::NoOpenPage)?;
        self.pages.push(page);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SurfaceError> {
        if let Some(page) = self.current.take() {
            self.pages.push(page);
        }
        let bytes = self.build();
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| std::io::Error::other("surface was abandoned"))?;
        out.write_all(&bytes)?;
        out.flush()?;
        debug!(pages = self.pages.len(), bytes = bytes.len(), "pdf written");
        Ok(())
    }

    fn abandon(&mut self) {
        self.current = None;
        self.pages.clear();
        self.out = None;
    }

    fn draw_line(&mut self, line: Line) -> Result<(), SurfaceError> {
        let page = self.page_mut()?;
        let h = page.height;
        let _ = write!(
            page.content,
            "q\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
            line.width,
            line.x1,
            h - line.y1,
            line.x2,
            h - line.y2
        );
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<(), SurfaceError> {
        let index = self.font_index(StandardFont::for_face(&run.font.face, run.font.bold));
        let page = self.page_mut()?;
        let y = page.height - run.baseline;
        let matrix = if run.rotated { "0 -1 1 0" } else { "1 0 0 1" };
        let _ = write!(page.content, "BT\n/F{} {:.2} Tf\n", index, run.font.size);
        if run.char_spacing != 0.0 {
            let _ = write!(page.content, "{:.2} Tc\n", run.char_spacing);
        }
        let _ = write!(
            page.content,
            "{} {:.2} {:.2} Tm\n({}) Tj\nET\n",
            matrix,
            run.x,
            y,
            encode_winansi(&run.text)
        );
        Ok(())
    }

    fn draw_barcode(&mut self, spec: &BarcodeSpec, rect: Rect) -> Result<(), SurfaceError> {
        if spec.kind != BarcodeKind::Qr {
            return self.draw_bars(spec, rect);
        }
        let code = Self::qr(spec)?;
        let modules = code.width();
        let colors = code.to_colors();
        let page = self.page_mut()?;
        let module = rect.width.min(rect.height) / modules as f64;
        let top = page.height - rect.y;

        page.content.push_str("q\n0 g\n");
        for (i, color) in colors.iter().enumerate() {
            if *color == Color::Dark {
                let (col, row) = (i % modules, i / modules);
                let _ = write!(
                    page.content,
                    "{:.3} {:.3} {:.3} {:.3} re\n",
                    rect.x + col as f64 * module,
                    top - (row + 1) as f64 * module,
                    module,
                    module
                );
            }
        }
        page.content.push_str("f\nQ\n");
        Ok(())
    }

    fn barcode_size(&self, spec: &BarcodeSpec) -> Result<(f64, f64), SurfaceError> {
        match spec.kind {
            BarcodeKind::Qr => {
                let side = Self::qr(spec)?.width() as f64 * QR_MODULE;
                Ok((side, side))
            }
            _ => {
                let modules = Self::bars(spec)?.len() as f64;
                Ok((modules * BAR_MODULE, BAR_HEIGHT))
            }
        }
    }

    fn measure_font(&self, font: &FontSpec) -> FontMetrics {
        if let Some(custom) = self.custom.get(&font.face) {
            let (ascent, descent, line_gap) = custom.vertical(font.size);
            return FontMetrics {
                ascent,
                descent,
                line_gap,
            };
        }
        let m = StandardFont::for_face(&font.face, font.bold).metrics();
        let scale = font.size / 1000.0;
        FontMetrics {
            ascent: m.ascender as f64 * scale,
            descent: m.descender as f64 * scale,
            line_gap: m.line_gap as f64 * scale,
        }
    }

    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        match self.custom.get(&font.face) {
            Some(custom) => custom.measure_string(text, font.size, 0.0),
            None => StandardFont::for_face(&font.face, font.bold)
                .metrics()
                .measure_string(text, font.size, 0.0),
        }
    }

    fn register_font(&mut self, face: &str, data: Vec<u8>) -> Result<(), SurfaceError> {
        let metrics = CustomFontMetrics::from_font_data(&data)
            .ok_or_else(|| SurfaceError::Font(format!("'{}' is not a TrueType/OpenType font", face)))?;
        self.custom.insert(face.to_string(), metrics);
        Ok(())
    }
}

/// Escape special characters in a PDF string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Encode text for a WinAnsi string literal. Bytes outside ASCII are written
/// as octal escapes; characters WinAnsi cannot show become `?`.
fn encode_winansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match unicode_to_winansi(ch).unwrap_or(b'?') {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b @ 0x20..=0x7E => out.push(b as char),
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// contains special mappings for smart quotes, bullets, dashes, etc.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}

/// Serialize all objects into the final PDF byte stream.
fn serialize(objects: &[PdfObject], info_obj_id: Option<usize>) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; objects.len()];

    // Header
    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let header = format!("{} 0 obj\n", i);
        output.extend_from_slice(header.as_bytes());
        output.extend_from_slice(&obj.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", objects.len());
    if let Some(info_id) = info_obj_id {
        let _ = write!(output, " /Info {} 0 R", info_id);
    }
    let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(bytes: &[u8], needle: &str) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle.as_bytes())
    }

    fn run(text: &str) -> TextRun {
        TextRun {
            x: 10.0,
            baseline: 20.0,
            text: text.to_string(),
            font: FontSpec {
                face: "Helvetica".to_string(),
                size: 12.0,
                bold: false,
            },
            char_spacing: 0.0,
            rotated: false,
        }
    }

    fn qr(code: &str) -> BarcodeSpec {
        BarcodeSpec {
            kind: BarcodeKind::Qr,
            code: code.to_string(),
            baseline: None,
            show_text: false,
            top_text: false,
            start_stop_text: false,
        }
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn winansi_encoding() {
        assert_eq!(encode_winansi("a(b)"), "a\\(b\\)");
        assert_eq!(encode_winansi("€ é"), "\\200 \\351");
        assert_eq!(encode_winansi("日"), "?");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let mut pdf = PdfSurface::new(Vec::new());
        pdf.begin_document(&Metadata::default()).unwrap();
        pdf.begin_page(595.28, 841.89).unwrap();
        pdf.end_page().unwrap();
        pdf.finish().unwrap();
        let bytes = pdf.into_inner().unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, "%%EOF"));
        assert!(contains(&bytes, "xref"));
        assert!(contains(&bytes, "trailer"));
        assert!(contains(&bytes, "/Count 1"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let mut pdf = PdfSurface::new(Vec::new());
        pdf.begin_document(&Metadata {
            title: Some("Test Document".to_string()),
            author: Some("Reports".to_string()),
            subject: None,
        })
        .unwrap();
        pdf.begin_page(100.0, 100.0).unwrap();
        pdf.finish().unwrap();
        let bytes = pdf.into_inner().unwrap();
        assert!(contains(&bytes, "/Title (Test Document)"));
        assert!(contains(&bytes, "/Author (Reports)"));
    }

    #[test]
    fn fonts_are_registered_once_per_face() {
        let mut pdf = PdfSurface::new(Vec::new());
        pdf.begin_page(100.0, 100.0).unwrap();
        pdf.draw_text(&run("a")).unwrap();
        pdf.draw_text(&run("b")).unwrap();
        let mut bold = run("c");
        bold.font.bold = true;
        pdf.draw_text(&bold).unwrap();
        pdf.finish().unwrap();
        let bytes = pdf.into_inner().unwrap();
        assert!(contains(&bytes, "/BaseFont /Helvetica "));
        assert!(contains(&bytes, "/BaseFont /Helvetica-Bold"));
        assert!(contains(&bytes, "/F0 3 0 R /F1 4 0 R"));
    }

    #[test]
    fn drawing_needs_open_page() {
        let mut pdf = PdfSurface::new(Vec::new());
        assert!(matches!(pdf.draw_text(&run("x")), Err(SurfaceError::NoOpenPage)));
    }

    fn linear(kind: BarcodeKind, code: &str) -> BarcodeSpec {
        BarcodeSpec {
            kind,
            ..qr(code)
        }
    }

    #[test]
    fn qr_has_natural_size() {
        let pdf = PdfSurface::new(Vec::new());
        let (w, h) = pdf.barcode_size(&qr("hello")).unwrap();
        assert_eq!(w, h);
        assert_eq!(w, 21.0 * QR_MODULE);
    }

    #[test]
    fn linear_codes_have_natural_size() {
        let pdf = PdfSurface::new(Vec::new());
        // EAN-13 is always 95 modules wide.
        let (w, h) = pdf.barcode_size(&linear(BarcodeKind::Ean13, "750103131130")).unwrap();
        assert_eq!(w, 95.0 * BAR_MODULE);
        assert_eq!(h, BAR_HEIGHT);

        let (w, _) = pdf.barcode_size(&linear(BarcodeKind::Code128, "AB-1")).unwrap();
        assert!(w > 0.0);
        assert!(pdf.barcode_size(&linear(BarcodeKind::Code39, "TRK-0042")).is_ok());
    }

    #[test]
    fn bad_linear_payloads_and_unknown_families_fail() {
        let pdf = PdfSurface::new(Vec::new());
        assert!(matches!(
            pdf.barcode_size(&linear(BarcodeKind::Ean8, "AB-1")),
            Err(SurfaceError::InvalidBarcode(_))
        ));
        assert!(matches!(
            pdf.barcode_size(&linear(BarcodeKind::Other("aztec".to_string()), "x")),
            Err(SurfaceError::UnsupportedBarcode(_))
        ));
    }

    #[test]
    fn code128_draws_bars_inside_rect() {
        let mut pdf = PdfSurface::new(Vec::new());
        pdf.begin_page(200.0, 100.0).unwrap();
        pdf.draw_barcode(&linear(BarcodeKind::Code128, "AB-1"), Rect::new(10.0, 20.0, 120.0, 30.0))
            .unwrap();
        let content = &pdf.current.as_ref().unwrap().content;
        // Bars run from y = 100 - 20 - 30 up to the top of the rect.
        assert!(content.contains(" 50.000 "));
        assert!(content.contains(" 30.000 re\n"));
        assert!(content.ends_with("f\nQ\n"));
    }

    #[test]
    fn qr_draws_modules() {
        let mut pdf = PdfSurface::new(Vec::new());
        pdf.begin_page(100.0, 100.0).unwrap();
        pdf.draw_barcode(&qr("hello"), Rect::new(0.0, 0.0, 42.0, 42.0)).unwrap();
        let content = &pdf.current.as_ref().unwrap().content;
        assert!(content.contains(" re\n"));
        assert!(content.ends_with("f\nQ\n"));
    }

    #[test]
    fn standard_metrics() {
        let pdf = PdfSurface::new(Vec::new());
        let font = FontSpec {
            face: "Helvetica".to_string(),
            size: 10.0,
            bold: false,
        };
        let m = pdf.measure_font(&font);
        assert!((m.ascent - 7.18).abs() < 1e-9);
        assert!((pdf.text_width(&font, "00") - 11.12).abs() < 1e-9);
    }

    #[test]
    fn bad_font_file_is_rejected() {
        let mut pdf = PdfSurface::new(Vec::new());
        assert!(matches!(
            pdf.register_font("Mine", b"junk".to_vec()),
            Err(SurfaceError::Font(_))
        ));
    }

    #[test]
    fn abandoned_surface_writes_nothing() {
        let mut pdf = PdfSurface::new(Vec::new());
        pdf.begin_page(10.0, 10.0).unwrap();
        pdf.abandon();
        assert!(pdf.finish().is_err());
        assert!(pdf.into_inner().is_none());
    }
}
