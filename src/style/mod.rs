//! # Style
//!
//! Colors, fonts and the layout constants that shape every card.
//!
//! Nothing here is global: a `LayoutOptions` value travels with each
//! `paginate` call, so two reports with different palettes can be laid out
//! side by side without interfering.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::model::{PageMetrics, Unit};

/// Millimetres to PDF points.
pub const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// An RGBA color.
///
/// Deserializes from a `"#rrggbb"` / `"#rgb"` hex string, a named palette
/// token such as `"primary"`, or an `{ "r", "g", "b", "a" }` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    /// Parse `#rgb` or `#rrggbb`. Returns `None` for anything else.
    pub fn hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => (
                u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?,
            ),
            6 => (
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            ),
            _ => return None,
        };
        Some(Self::rgb8(r, g, b))
    }

    /// Approximate relative luminance, 0.0 (black) to 1.0 (white).
    pub fn luminance(&self) -> f64 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Text color that stays readable on top of this color.
    pub fn contrast_text(&self) -> Color {
        if self.luminance() < 0.5 {
            Color::WHITE
        } else {
            Palette::DARK
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Token(String),
    Rgba {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default = "opaque")]
        a: f64,
    },
}

fn opaque() -> f64 {
    1.0
}

impl TryFrom<ColorRepr> for Color {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Rgba { r, g, b, a } => Ok(Color { r, g, b, a }),
            ColorRepr::Token(token) if token.starts_with('#') => {
                Color::hex(&token).ok_or_else(|| format!("invalid hex color {token:?}"))
            }
            ColorRepr::Token(token) => {
                Palette::named(&token).ok_or_else(|| format!("unknown color token {token:?}"))
            }
        }
    }
}

/// Named style tokens used by report generators for header and body bands.
pub struct Palette;

impl Palette {
    pub const PRIMARY: Color = Color::rgb8(37, 99, 235);
    pub const SUCCESS: Color = Color::rgb8(22, 163, 74);
    pub const WARNING: Color = Color::rgb8(217, 119, 6);
    pub const DANGER: Color = Color::rgb8(220, 38, 38);
    pub const INFO: Color = Color::rgb8(8, 145, 178);
    pub const PURPLE: Color = Color::rgb8(124, 58, 237);
    pub const MUTED: Color = Color::rgb8(100, 116, 139);
    pub const LIGHT: Color = Color::rgb8(241, 245, 249);
    pub const DARK: Color = Color::rgb8(15, 23, 42);

    pub fn named(token: &str) -> Option<Color> {
        let color = match token.to_ascii_lowercase().as_str() {
            "primary" => Self::PRIMARY,
            "success" => Self::SUCCESS,
            "warning" => Self::WARNING,
            "danger" => Self::DANGER,
            "info" => Self::INFO,
            "purple" => Self::PURPLE,
            "muted" => Self::MUTED,
            "light" => Self::LIGHT,
            "dark" => Self::DARK,
            "white" => Color::WHITE,
            "black" => Color::BLACK,
            _ => return None,
        };
        Some(color)
    }
}

/// Font family, size (always in points) and weight for one run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub bold: bool,
}

impl FontSpec {
    pub fn regular(size: f64) -> Self {
        Self {
            family: "Helvetica".to_string(),
            size,
            bold: false,
        }
    }

    pub fn bold(size: f64) -> Self {
        Self {
            bold: true,
            ..Self::regular(size)
        }
    }

    /// The PDF font weight this spec resolves to.
    pub fn weight(&self) -> u32 {
        if self.bold {
            700
        } else {
            400
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::regular(10.0)
    }
}

/// Geometry, fonts and colors shared by every card in a report.
///
/// Geometric values are in the page's document unit (see [`Unit`]);
/// font sizes are always points. Defaults are tuned for millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Inner padding between the card border and its text.
    pub padding: f64,
    /// Height of the colored title band at the top of each card.
    pub header_height: f64,
    /// Height of one body text line.
    pub line_height: f64,
    /// Baseline position inside a line box, as a fraction of `line_height`.
    pub baseline_ratio: f64,
    /// Vertical space between consecutive fields of a card.
    pub field_gap: f64,
    /// Vertical space between blocks of the same section.
    pub card_gap: f64,
    /// Vertical space before the first block of a section.
    pub section_gap: f64,
    /// Horizontal space between cards of a row without pinned `x`.
    pub column_gap: f64,
    /// Height reserved for a section heading.
    pub heading_height: f64,
    pub border_width: f64,

    pub body_font: FontSpec,
    pub label_font: FontSpec,
    pub title_font: FontSpec,
    pub heading_font: FontSpec,
    pub header_font: FontSpec,
    pub footer_font: FontSpec,

    pub text_color: Color,
    pub heading_color: Color,
    pub border_color: Color,
    pub rule_color: Color,
    pub footer_color: Color,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            padding: 4.0,
            header_height: 8.0,
            line_height: 5.0,
            baseline_ratio: 0.75,
            field_gap: 1.0,
            card_gap: 2.0,
            section_gap: 4.0,
            column_gap: 4.0,
            heading_height: 8.0,
            border_width: 0.3,
            body_font: FontSpec::regular(10.0),
            label_font: FontSpec::bold(10.0),
            title_font: FontSpec::bold(11.0),
            heading_font: FontSpec::bold(13.0),
            header_font: FontSpec::bold(12.0),
            footer_font: FontSpec::regular(8.0),
            text_color: Color::rgb8(31, 41, 55),
            heading_color: Palette::DARK,
            border_color: Color::rgb8(203, 213, 225),
            rule_color: Color::rgb8(148, 163, 184),
            footer_color: Palette::MUTED,
        }
    }
}

impl LayoutOptions {
    /// Defaults rescaled for pages measured in `unit`.
    pub fn for_unit(unit: Unit) -> Self {
        Self::default().scaled(unit.per_mm())
    }

    /// Multiply every geometric constant by `factor`. Font sizes are untouched.
    pub fn scaled(mut self, factor: f64) -> Self {
        for v in [
            &mut self.padding,
            &mut self.header_height,
            &mut self.line_height,
            &mut self.field_gap,
            &mut self.card_gap,
            &mut self.section_gap,
            &mut self.column_gap,
            &mut self.heading_height,
            &mut self.border_width,
        ] {
            *v *= factor;
        }
        self
    }

    /// Reject constants that would put text outside its card or page band.
    pub fn validate(&self, metrics: &PageMetrics) -> Result<(), LayoutError> {
        let geometry = [
            ("padding", self.padding),
            ("headerHeight", self.header_height),
            ("fieldGap", self.field_gap),
            ("cardGap", self.card_gap),
            ("sectionGap", self.section_gap),
            ("columnGap", self.column_gap),
            ("headingHeight", self.heading_height),
            ("borderWidth", self.border_width),
        ];
        for (name, value) in geometry {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidOptions(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(LayoutError::InvalidOptions(format!(
                "lineHeight must be positive, got {}",
                self.line_height
            )));
        }
        if !(0.0..=1.0).contains(&self.baseline_ratio) {
            return Err(LayoutError::InvalidOptions(format!(
                "baselineRatio must be between 0 and 1, got {}",
                self.baseline_ratio
            )));
        }
        let fonts = [
            ("bodyFont", &self.body_font),
            ("labelFont", &self.label_font),
            ("titleFont", &self.title_font),
            ("headingFont", &self.heading_font),
            ("headerFont", &self.header_font),
            ("footerFont", &self.footer_font),
        ];
        for (name, font) in fonts {
            if !font.size.is_finite() || font.size <= 0.0 {
                return Err(LayoutError::InvalidOptions(format!(
                    "{name} size must be positive, got {}",
                    font.size
                )));
            }
        }
        if self.heading_height + self.header_height >= metrics.usable_height() {
            return Err(LayoutError::InvalidOptions(format!(
                "headingHeight {} plus headerHeight {} leaves no room for a card in {}",
                self.heading_height,
                self.header_height,
                metrics.usable_height()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors_parse() {
        let c = Color::hex("#ff0000").unwrap();
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));
        let short = Color::hex("#0f0").unwrap();
        assert_eq!(short, Color::rgb(0.0, 1.0, 0.0));
        assert!(Color::hex("#12").is_none());
        assert!(Color::hex("#zzzzzz").is_none());
    }

    #[test]
    fn test_colors_deserialize_from_tokens_hex_and_objects() {
        let c: Color = serde_json::from_str("\"primary\"").unwrap();
        assert_eq!(c, Palette::PRIMARY);
        let c: Color = serde_json::from_str("\"#ffffff\"").unwrap();
        assert_eq!(c, Color::WHITE);
        let c: Color = serde_json::from_str(r#"{"r":0.5,"g":0.5,"b":0.5}"#).unwrap();
        assert_eq!(c.a, 1.0);
        assert!(serde_json::from_str::<Color>("\"chartreuse-ish\"").is_err());
    }

    #[test]
    fn test_contrast_text_flips_on_light_backgrounds() {
        assert_eq!(Palette::PRIMARY.contrast_text(), Color::WHITE);
        assert_eq!(Palette::LIGHT.contrast_text(), Palette::DARK);
    }

    #[test]
    fn test_options_scale_geometry_but_not_fonts() {
        let pt = LayoutOptions::for_unit(Unit::Pt);
        let mm = LayoutOptions::default();
        assert!((pt.line_height - mm.line_height * POINTS_PER_MM).abs() < 1e-9);
        assert_eq!(pt.body_font, mm.body_font);
    }

    fn rejects(options: LayoutOptions, field: &str) {
        match options.validate(&PageMetrics::a4_mm()) {
            Err(LayoutError::InvalidOptions(msg)) => assert!(msg.contains(field), "got: {msg}"),
            other => panic!("expected {field} to be rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_default_options_are_valid() {
        assert!(LayoutOptions::default().validate(&PageMetrics::a4_mm()).is_ok());
        let pt = PageMetrics::a4_pt();
        assert!(LayoutOptions::for_unit(pt.unit).validate(&pt).is_ok());
    }

    #[test]
    fn test_negative_geometry_is_rejected() {
        let base = LayoutOptions::default;
        rejects(LayoutOptions { padding: -30.0, ..base() }, "padding");
        rejects(LayoutOptions { header_height: -40.0, ..base() }, "headerHeight");
        rejects(LayoutOptions { field_gap: -1.0, ..base() }, "fieldGap");
        rejects(LayoutOptions { card_gap: -2.0, ..base() }, "cardGap");
        rejects(LayoutOptions { section_gap: -4.0, ..base() }, "sectionGap");
        rejects(LayoutOptions { column_gap: -4.0, ..base() }, "columnGap");
        rejects(LayoutOptions { heading_height: -8.0, ..base() }, "headingHeight");
        rejects(LayoutOptions { border_width: -0.3, ..base() }, "borderWidth");
    }

    #[test]
    fn test_line_height_must_be_positive() {
        let base = LayoutOptions::default;
        rejects(LayoutOptions { line_height: -20.0, ..base() }, "lineHeight");
        rejects(LayoutOptions { line_height: 0.0, ..base() }, "lineHeight");
        rejects(LayoutOptions { line_height: f64::NAN, ..base() }, "lineHeight");
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let base = LayoutOptions::default;
        rejects(LayoutOptions { padding: f64::INFINITY, ..base() }, "padding");
        rejects(LayoutOptions { card_gap: f64::NAN, ..base() }, "cardGap");
        rejects(LayoutOptions { baseline_ratio: 1.5, ..base() }, "baselineRatio");
        rejects(
            LayoutOptions { body_font: FontSpec::regular(0.0), ..base() },
            "bodyFont",
        );
    }

    #[test]
    fn test_heading_band_must_leave_room_for_a_card() {
        // a4_mm has 247 usable; 240 + 8 leaves nothing.
        rejects(
            LayoutOptions { heading_height: 240.0, ..LayoutOptions::default() },
            "headingHeight",
        );
    }

    #[test]
    fn test_partial_options_fill_defaults() {
        let opts: LayoutOptions = serde_json::from_str(r#"{"padding": 2}"#).unwrap();
        assert_eq!(opts.padding, 2.0);
        assert_eq!(opts.line_height, LayoutOptions::default().line_height);
    }
}
