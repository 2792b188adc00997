//! # Report Model
//!
//! The input representation for the pagination engine. A report is an
//! ordered list of sections; each section is an ordered list of blocks; a
//! block is either one card or a row of cards laid out side by side.
//!
//! Cards never split across pages. Sections do: successive blocks of one
//! section may land on different pages.
//!
//! The types deserialize from JSON (camelCase) so report-assembly code in
//! any host can hand a document straight to the engine.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::style::{Color, LayoutOptions, Palette, POINTS_PER_MM};

/// A JSON render request: page metrics, layout options and the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default)]
    pub page: PageMetrics,

    /// Layout constants. When absent, defaults for `page.unit` are used.
    #[serde(default)]
    pub layout: Option<LayoutOptions>,

    pub document: ReportDocument,
}

impl RenderRequest {
    pub fn options(&self) -> LayoutOptions {
        self.layout
            .clone()
            .unwrap_or_else(|| LayoutOptions::for_unit(self.page.unit))
    }
}

/// A complete report ready for pagination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    #[serde(default)]
    pub metadata: Metadata,

    /// Running header drawn on every page.
    #[serde(default)]
    pub header: Option<PageHeader>,

    /// Running footer drawn on every page.
    #[serde(default)]
    pub footer: Option<PageFooter>,

    pub sections: Vec<Section>,
}

impl ReportDocument {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, header: PageHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: PageFooter) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Check the document for configuration errors before any layout runs.
    pub fn validate(
        &self,
        metrics: &PageMetrics,
        options: &LayoutOptions,
    ) -> Result<(), LayoutError> {
        if self.sections.is_empty() {
            return Err(LayoutError::EmptyDocument);
        }
        let content_width = metrics.content_width();
        for (index, section) in self.sections.iter().enumerate() {
            if section.blocks.is_empty() {
                return Err(LayoutError::EmptySection { section: index });
            }
            for block in &section.blocks {
                if block.cards().is_empty() {
                    return Err(LayoutError::EmptyRow { section: index });
                }
                for card in block.cards() {
                    card.validate()?;
                }
                block.validate_width(content_width, options.column_gap)?;
            }
        }
        Ok(())
    }
}

/// Document metadata embedded in rendered output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Text drawn in the header band of every page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHeader {
    pub title: String,
    /// Right-aligned secondary text (candidate name, report date, ...).
    #[serde(default)]
    pub subtitle: Option<String>,
}

/// Text drawn in the footer band of every page.
///
/// `page_label` may use `{{pageNumber}}` and `{{totalPages}}`; both are
/// substituted after pagination, once the final page count is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFooter {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_page_label")]
    pub page_label: String,
}

fn default_page_label() -> String {
    "Page {{pageNumber}} of {{totalPages}}".to_string()
}

impl Default for PageFooter {
    fn default() -> Self {
        Self {
            text: None,
            page_label: default_page_label(),
        }
    }
}

/// The coordinate unit every geometric value of a document is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Mm,
    Pt,
}

impl Unit {
    /// How many document units make up one PDF point.
    pub fn per_point(&self) -> f64 {
        match self {
            Unit::Mm => 1.0 / POINTS_PER_MM,
            Unit::Pt => 1.0,
        }
    }

    /// How many document units make up one millimetre.
    pub fn per_mm(&self) -> f64 {
        match self {
            Unit::Mm => 1.0,
            Unit::Pt => POINTS_PER_MM,
        }
    }
}

/// Fixed page geometry for one document.
///
/// The usable content band of every page is
/// `[margin_top + header_height, height - margin_bottom - footer_height]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub header_height: f64,
    pub footer_height: f64,
    /// Defaults to `margin_top`.
    #[serde(default)]
    pub margin_left: Option<f64>,
    /// Defaults to `margin_bottom`.
    #[serde(default)]
    pub margin_right: Option<f64>,
    #[serde(default)]
    pub unit: Unit,
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self::a4_mm()
    }
}

impl PageMetrics {
    /// A4 in millimetres with a 20mm header band and 10mm footer band.
    pub fn a4_mm() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin_top: 10.0,
            margin_bottom: 10.0,
            header_height: 20.0,
            footer_height: 10.0,
            margin_left: None,
            margin_right: None,
            unit: Unit::Mm,
        }
    }

    /// The same A4 geometry expressed in points.
    pub fn a4_pt() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin_top: 28.35,
            margin_bottom: 28.35,
            header_height: 56.69,
            footer_height: 28.35,
            margin_left: None,
            margin_right: None,
            unit: Unit::Pt,
        }
    }

    pub fn content_top(&self) -> f64 {
        self.margin_top + self.header_height
    }

    pub fn content_bottom(&self) -> f64 {
        self.height - self.margin_bottom - self.footer_height
    }

    pub fn usable_height(&self) -> f64 {
        self.content_bottom() - self.content_top()
    }

    pub fn content_left(&self) -> f64 {
        self.margin_left.unwrap_or(self.margin_top)
    }

    pub fn content_right(&self) -> f64 {
        self.width - self.margin_right.unwrap_or(self.margin_bottom)
    }

    pub fn content_width(&self) -> f64 {
        self.content_right() - self.content_left()
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let named = [
            ("width", self.width),
            ("height", self.height),
            ("marginTop", self.margin_top),
            ("marginBottom", self.margin_bottom),
            ("headerHeight", self.header_height),
            ("footerHeight", self.footer_height),
            ("marginLeft", self.content_left()),
            ("marginRight", self.width - self.content_right()),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidMetrics(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LayoutError::InvalidMetrics(
                "page width and height must be positive".to_string(),
            ));
        }
        if self.usable_height() <= 0.0 {
            return Err(LayoutError::InvalidMetrics(format!(
                "margins and bands leave no vertical content area ({} of {})",
                self.usable_height(),
                self.height
            )));
        }
        if self.content_width() <= 0.0 {
            return Err(LayoutError::InvalidMetrics(format!(
                "margins leave no horizontal content area ({} of {})",
                self.content_width(),
                self.width
            )));
        }
        Ok(())
    }
}

/// A group of blocks rendered top to bottom.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Optional heading, kept on the same page as the first block.
    #[serde(default)]
    pub heading: Option<String>,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn card(mut self, card: CardSpec) -> Self {
        self.blocks.push(Block::Card(card));
        self
    }

    pub fn row(mut self, cards: Vec<CardSpec>) -> Self {
        self.blocks.push(Block::Row { cards });
        self
    }
}

/// One page-break unit: a single card, or cards sharing a Y position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Block {
    Row { cards: Vec<CardSpec> },
    Card(CardSpec),
}

impl Block {
    pub fn cards(&self) -> &[CardSpec] {
        match self {
            Block::Row { cards } => cards,
            Block::Card(card) => std::slice::from_ref(card),
        }
    }

    pub fn is_row(&self) -> bool {
        matches!(self, Block::Row { .. })
    }

    /// X offsets (relative to the content left edge) of each card, in order.
    pub fn column_offsets(&self, column_gap: f64) -> Vec<f64> {
        let mut next = 0.0;
        self.cards()
            .iter()
            .map(|card| {
                let x = card.x.unwrap_or(next);
                next = x + card.width + column_gap;
                x
            })
            .collect()
    }

    fn validate_width(&self, content_width: f64, column_gap: f64) -> Result<(), LayoutError> {
        for (card, x) in self.cards().iter().zip(self.column_offsets(column_gap)) {
            if x < 0.0 || x + card.width > content_width + 1e-6 {
                return Err(LayoutError::InvalidCard {
                    title: card.title.clone(),
                    reason: format!(
                        "spans x {}..{} but the content area is {} wide",
                        x,
                        x + card.width,
                        content_width
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A card's vertical size: fixed, or measured from its fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CardHeight {
    Fixed(f64),
    #[default]
    Auto,
}

impl Serialize for CardHeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CardHeight::Fixed(h) => serializer.serialize_f64(*h),
            CardHeight::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for CardHeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Keyword(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Number(h) => Ok(CardHeight::Fixed(h)),
            Repr::Keyword(k) if k == "auto" => Ok(CardHeight::Auto),
            Repr::Keyword(k) => Err(de::Error::custom(format!(
                "card height must be a number or \"auto\", got {k:?}"
            ))),
        }
    }
}

/// A bordered block with a colored title band and a list of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardSpec {
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    pub width: f64,
    #[serde(default)]
    pub height: CardHeight,
    #[serde(default = "default_header_color")]
    pub header_color: Color,
    #[serde(default)]
    pub body_color: Option<Color>,
    /// Pinned X offset from the content left edge (rows only).
    #[serde(default)]
    pub x: Option<f64>,
}

fn default_header_color() -> Color {
    Palette::PRIMARY
}

impl CardSpec {
    /// An auto-height card with no fields.
    pub fn new(title: impl Into<String>, width: f64) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            width,
            height: CardHeight::Auto,
            header_color: default_header_color(),
            body_color: None,
            x: None,
        }
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = CardHeight::Fixed(height);
        self
    }

    pub fn header_color(mut self, color: Color) -> Self {
        self.header_color = color;
        self
    }

    pub fn body_color(mut self, color: Color) -> Self {
        self.body_color = Some(color);
        self
    }

    pub fn at_x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn label(self, text: impl Into<String>) -> Self {
        self.field(Field::label(text))
    }

    pub fn key_value(self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.field(Field::key_value(label, value))
    }

    pub fn bullets<S: Into<String>>(self, items: impl IntoIterator<Item = S>) -> Self {
        self.field(Field::bullets(items))
    }

    pub fn paragraph(self, text: impl Into<String>) -> Self {
        self.field(Field::paragraph(text))
    }

    /// Half a line of vertical space.
    pub fn blank(self) -> Self {
        self.field(Field::label(""))
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let invalid = |reason: String| LayoutError::InvalidCard {
            title: self.title.clone(),
            reason,
        };
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(invalid(format!("width must be positive, got {}", self.width)));
        }
        if let CardHeight::Fixed(h) = self.height {
            if !h.is_finite() || h <= 0.0 {
                return Err(invalid(format!("height must be positive, got {h}")));
            }
        }
        if let Some(x) = self.x {
            if !x.is_finite() {
                return Err(invalid(format!("x offset must be finite, got {x}")));
            }
        }
        Ok(())
    }
}

/// One logical unit of card content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Field {
    /// Bold text. An empty label is a half-line spacer.
    Label { text: String },
    /// `"<label>: "` in bold followed by the value inline.
    KeyValue { label: String, value: String },
    BulletList {
        items: Vec<String>,
        #[serde(default)]
        marker: ListMarker,
    },
    Paragraph { text: String },
}

impl Field {
    pub fn label(text: impl Into<String>) -> Self {
        Field::Label { text: text.into() }
    }

    pub fn key_value(label: impl Into<String>, value: impl Into<String>) -> Self {
        Field::KeyValue {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn bullets<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Field::BulletList {
            items: items.into_iter().map(Into::into).collect(),
            marker: ListMarker::Bullet,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Field::Paragraph { text: text.into() }
    }

    /// True for the `Label("")` spacer.
    pub fn is_spacer(&self) -> bool {
        matches!(self, Field::Label { text } if text.is_empty())
    }
}

/// The marker drawn in front of each list item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListMarker {
    /// `"• "`
    #[default]
    Bullet,
    /// `"A) "`, `"B) "`, ... for multiple-choice options.
    Lettered,
    /// `"1. "`, `"2. "`, ...
    Numbered,
}

impl ListMarker {
    pub fn prefix(&self, index: usize) -> String {
        match self {
            ListMarker::Bullet => "\u{2022} ".to_string(),
            ListMarker::Lettered => format!("{}) ", lettered(index)),
            ListMarker::Numbered => format!("{}. ", index + 1),
        }
    }
}

/// 0 → "A", 25 → "Z", 26 → "AA".
fn lettered(mut index: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
