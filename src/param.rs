//! # Parameter Resolver
//!
//! Coordinate and size attributes are tiny expressions:
//!
//! ```text
//! [sign] magnitude [unit]
//!
//! sign:  +  relative to the cursor, forward
//!        -  relative to the cursor, backward
//!        !  measured back from the container's far edge
//! unit:  %  percentage of the container extent on this axis
//!        c  character width (X) / line height (Y) of the current font
//!        l  same as c; the axis picks the metric
//!        m  millimetres
//! ```
//!
//! Parsing yields a tagged [`Expr`]; anything that does not match is simply
//! "not specified" and the caller's default is used. The resolver never fails.

use serde::{Deserialize, Serialize};

/// Points per millimetre.
pub const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Which axis an expression is resolved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// How the magnitude relates to the cursor and the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Absolute,
    /// `+v`: cursor plus v.
    RelativeForward,
    /// `-v`: cursor minus v.
    RelativeBackward,
    /// `!v`: container extent minus v.
    RelativeToFarEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Already in points.
    Native,
    Percent,
    /// Font-relative (`c` or `l`).
    Font,
    Millimetre,
}

/// A parsed coordinate expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub anchor: Anchor,
    pub magnitude: f64,
    pub unit: Unit,
}

/// Font metrics needed for `c`/`l` units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontScale {
    pub char_width: f64,
    pub line_height: f64,
}

impl FontScale {
    fn for_axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.char_width,
            Axis::Y => self.line_height,
        }
    }
}

impl Expr {
    /// Parse an expression. Returns `None` for empty or malformed input.
    pub fn parse(input: &str) -> Option<Expr> {
        let s = input.trim();
        let mut chars = s.char_indices().peekable();

        let anchor = match chars.peek().map(|&(_, c)| c) {
            Some('+') => Anchor::RelativeForward,
            Some('-') => Anchor::RelativeBackward,
            Some('!') => Anchor::RelativeToFarEdge,
            Some(_) => Anchor::Absolute,
            None => return None,
        };
        let body = if anchor == Anchor::Absolute { s } else { &s[1..] };
        let body = body.trim_start();

        let number_end = body
            .char_indices()
            .find(|&(_, c)| !(c.is_ascii_digit() || c == '.'))
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        let (number, rest) = body.split_at(number_end);
        if !number.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        let magnitude: f64 = number.parse().ok()?;

        let unit = match rest.trim() {
            "" => Unit::Native,
            "%" => Unit::Percent,
            "c" | "l" => Unit::Font,
            "m" => Unit::Millimetre,
            _ => return None,
        };

        Some(Expr {
            anchor,
            magnitude,
            unit,
        })
    }

    /// The magnitude converted to points, before the anchor is applied.
    pub fn magnitude_points(&self, axis: Axis, extent: f64, font: &FontScale) -> f64 {
        match self.unit {
            Unit::Native => self.magnitude,
            Unit::Percent => extent * self.magnitude / 100.0,
            Unit::Font => self.magnitude * font.for_axis(axis),
            Unit::Millimetre => self.magnitude * POINTS_PER_MM,
        }
    }

    /// Resolve a position on `axis`.
    pub fn resolve(&self, axis: Axis, cursor: f64, extent: f64, font: &FontScale) -> f64 {
        let v = self.magnitude_points(axis, extent, font);
        match self.anchor {
            Anchor::Absolute => v,
            Anchor::RelativeForward => cursor + v,
            Anchor::RelativeBackward => cursor - v,
            Anchor::RelativeToFarEdge => extent - v,
        }
    }

    /// Resolve a size for a node placed at `position`. Backward and far-edge
    /// anchors measure what is left of the container after `position`.
    pub fn resolve_size(&self, axis: Axis, position: f64, extent: f64, font: &FontScale) -> f64 {
        let v = self.magnitude_points(axis, extent, font);
        let size = match self.anchor {
            Anchor::Absolute | Anchor::RelativeForward => v,
            Anchor::RelativeBackward | Anchor::RelativeToFarEdge => extent - position - v,
        };
        size.max(0.0)
    }
}

/// Resolve a textual position expression, falling back to `default`.
pub fn resolve(
    expr: &str,
    axis: Axis,
    cursor: f64,
    extent: f64,
    font: &FontScale,
    default: f64,
) -> f64 {
    match Expr::parse(expr) {
        Some(e) => e.resolve(axis, cursor, extent, font),
        None => default,
    }
}

/// Resolve an optional pre-parsed position, falling back to `default`.
pub fn resolve_opt(
    expr: Option<&Expr>,
    axis: Axis,
    cursor: f64,
    extent: f64,
    font: &FontScale,
    default: f64,
) -> f64 {
    expr.map_or(default, |e| e.resolve(axis, cursor, extent, font))
}

/// Resolve an optional size. Missing sizes take whatever the container has
/// left after `position`.
pub fn resolve_size_opt(
    expr: Option<&Expr>,
    axis: Axis,
    position: f64,
    extent: f64,
    font: &FontScale,
) -> f64 {
    match expr {
        Some(e) => e.resolve_size(axis, position, extent, font),
        None => (extent - position).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: FontScale = FontScale {
        char_width: 6.0,
        line_height: 12.0,
    };

    fn r(expr: &str, cursor: f64, extent: f64) -> f64 {
        resolve(expr, Axis::X, cursor, extent, &FONT, -1.0)
    }

    #[test]
    fn relative_forward_adds_to_cursor() {
        assert_eq!(r("+10", 50.0, 100.0), 60.0);
    }

    #[test]
    fn relative_backward_subtracts_from_cursor() {
        assert_eq!(r("-10", 50.0, 100.0), 40.0);
    }

    #[test]
    fn far_edge_subtracts_from_extent() {
        assert_eq!(r("!10", 0.0, 100.0), 90.0);
    }

    #[test]
    fn percent_of_extent() {
        assert_eq!(r("50%", 0.0, 200.0), 100.0);
        assert_eq!(r("+50%", 10.0, 200.0), 110.0);
    }

    #[test]
    fn absolute_and_whitespace() {
        assert_eq!(r("  25.5 ", 99.0, 100.0), 25.5);
        assert_eq!(r(".5", 0.0, 100.0), 0.5);
    }

    #[test]
    fn font_units_follow_axis() {
        assert_eq!(resolve("2c", Axis::X, 0.0, 0.0, &FONT, 0.0), 12.0);
        assert_eq!(resolve("2l", Axis::X, 0.0, 0.0, &FONT, 0.0), 12.0);
        assert_eq!(resolve("2l", Axis::Y, 0.0, 0.0, &FONT, 0.0), 24.0);
        assert_eq!(resolve("+1l", Axis::Y, 10.0, 0.0, &FONT, 0.0), 22.0);
    }

    #[test]
    fn millimetres() {
        let v = r("10m", 0.0, 0.0);
        assert!((v - 28.3465).abs() < 0.001);
    }

    #[test]
    fn malformed_input_returns_default() {
        for bad in ["", "   ", "abc", "+", "!%", "10px", "1.2.3", "--5", "%"] {
            assert_eq!(r(bad, 50.0, 100.0), -1.0, "input {:?}", bad);
        }
    }

    #[test]
    fn parse_is_tagged() {
        let e = Expr::parse("!3c").unwrap();
        assert_eq!(e.anchor, Anchor::RelativeToFarEdge);
        assert_eq!(e.unit, Unit::Font);
        assert_eq!(e.magnitude, 3.0);
    }

    #[test]
    fn size_from_far_edge_uses_remaining_extent() {
        let e = Expr::parse("!10").unwrap();
        assert_eq!(e.resolve_size(Axis::X, 30.0, 100.0, &FONT), 60.0);
        let e = Expr::parse("!200").unwrap();
        assert_eq!(e.resolve_size(Axis::X, 30.0, 100.0, &FONT), 0.0);
    }

    #[test]
    fn missing_size_fills_remaining() {
        assert_eq!(resolve_size_opt(None, Axis::Y, 40.0, 100.0, &FONT), 60.0);
        assert_eq!(resolve_size_opt(None, Axis::Y, 140.0, 100.0, &FONT), 0.0);
    }
}
