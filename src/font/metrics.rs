//! Glyph metrics for the standard PDF fonts and for TrueType files.
//!
//! Standard fonts use the Adobe AFM advance widths (1/1000 em) for the
//! printable ASCII range; everything else takes the font's default width.

use std::collections::HashMap;

/// The standard Type1 fonts the PDF backend writes without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    /// Pick the standard font for a face name. Unknown faces fall back to
    /// Helvetica.
    pub fn for_face(face: &str, bold: bool) -> Self {
        let lower = face.to_ascii_lowercase();
        let bold = bold || lower.contains("bold");
        if lower.starts_with("courier") || lower.contains("mono") {
            if bold {
                StandardFont::CourierBold
            } else {
                StandardFont::Courier
            }
        } else if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica => StandardFontMetrics {
                widths: Some(&HELVETICA_WIDTHS),
                default_width: 556,
                ascender: 718,
                descender: 207,
                line_gap: 231,
            },
            Self::HelveticaBold => StandardFontMetrics {
                widths: Some(&HELVETICA_BOLD_WIDTHS),
                default_width: 556,
                ascender: 718,
                descender: 207,
                line_gap: 231,
            },
            Self::Courier | Self::CourierBold => StandardFontMetrics {
                widths: None,
                default_width: 600,
                ascender: 629,
                descender: 157,
                line_gap: 214,
            },
        }
    }
}

/// Metrics of a standard font in 1/1000 em.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E; `None` for monospaced faces.
    widths: Option<&'static [u16; 95]>,
    default_width: u16,
    pub ascender: u16,
    pub descender: u16,
    pub line_gap: u16,
}

impl StandardFontMetrics {
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match self.widths {
            Some(table) => (ch as u32)
                .checked_sub(32)
                .and_then(|i| table.get(i as usize))
                .copied()
                .unwrap_or(self.default_width),
            None => self.default_width,
        };
        units as f64 / 1000.0 * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }

    /// Ascent, descent (positive) and line gap in points.
    pub fn vertical(&self, font_size: f64) -> (f64, f64, f64) {
        let scale = font_size / self.units_per_em as f64;
        (
            self.ascender as f64 * scale,
            (self.descender as f64).abs() * scale,
            self.line_gap.max(0) as f64 * scale,
        )
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        // Latin, Latin-1 and Latin Extended cover what WinAnsi output can show.
        for code in 32u32..=0x24F {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        })
    }
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];
