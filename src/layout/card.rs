//! # Card Layout
//!
//! Geometry of one bordered card and the streaming of its fields into the
//! card body. A card is never split. When its fields need more room than a
//! fixed height allows, the overflowing lines (and every field after them)
//! are dropped. That clipping is deliberate and silent: it keeps one verbose
//! card from drawing over its neighbours.
//!
//! The same streaming pass measures `"auto"` cards: run it with no lower
//! bound, and the cursor position at the end is the content height.

use serde::Serialize;

use super::format::{FieldFormatter, FormattedLine};
use super::{DrawOp, TextLine, TextRole};
use crate::error::LayoutError;
use crate::model::{CardHeight, CardSpec};
use crate::style::LayoutOptions;
use crate::text::TextMeasurer;

const EPSILON: f64 = 1e-6;

/// Title baseline inside the header band, as a fraction of its height.
const TITLE_BASELINE: f64 = 0.68;

/// Where a card is in its placement lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardState {
    /// No field has been started.
    Empty,
    /// Fields are being written.
    Placing,
    /// A line did not fit; it and everything after it was dropped.
    Truncated,
    /// Every line of every field was written.
    Complete,
}

/// A card laid out at its final position.
#[derive(Debug, Clone)]
pub struct PlacedCard {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub state: CardState,
    pub lines_written: usize,
    pub ops: Vec<DrawOp>,
}

/// Lays out cards against a measurer and a set of layout options.
pub struct CardLayout<'a> {
    measurer: &'a dyn TextMeasurer,
    options: &'a LayoutOptions,
    formatter: FieldFormatter<'a>,
}

impl<'a> CardLayout<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, options: &'a LayoutOptions) -> Self {
        Self {
            measurer,
            options,
            formatter: FieldFormatter::new(measurer, &options.body_font, &options.label_font),
        }
    }

    /// Height of the card's field content alone, with no vertical bound.
    pub fn content_height(&self, card: &CardSpec) -> Result<f64, LayoutError> {
        let mut writer = CardWriter::new(0.0, f64::INFINITY, None);
        self.stream(card, 0.0, &mut writer)?;
        Ok(writer.cursor)
    }

    /// Full height an `"auto"` card needs: header band, padding and content.
    pub fn measure_height(&self, card: &CardSpec) -> Result<f64, LayoutError> {
        let o = self.options;
        Ok(o.header_height + 2.0 * o.padding + self.content_height(card)?)
    }

    /// The card's height before placement: fixed, or measured.
    pub fn resolve_height(&self, card: &CardSpec) -> Result<f64, LayoutError> {
        match card.height {
            CardHeight::Fixed(h) => Ok(h),
            CardHeight::Auto => self.measure_height(card),
        }
    }

    /// Lay the card out with its top-left corner at (`x`, `y`) and the given
    /// outer `height`. Content that does not fit is dropped.
    pub fn place(&self, card: &CardSpec, x: f64, y: f64, height: f64) -> Result<PlacedCard, LayoutError> {
        let o = self.options;
        let mut ops = Vec::new();

        if let Some(body) = card.body_color {
            ops.push(DrawOp::FilledRect {
                x,
                y,
                width: card.width,
                height,
                color: body,
            });
        }
        let band = o.header_height.min(height);
        ops.push(DrawOp::FilledRect {
            x,
            y,
            width: card.width,
            height: band,
            color: card.header_color,
        });
        if let Some(title) = self.title_line(card)? {
            ops.push(DrawOp::TextLine(TextLine {
                x: x + o.padding,
                y: y + band * TITLE_BASELINE,
                text: title,
                font: o.title_font.clone(),
                color: card.header_color.contrast_text(),
                role: TextRole::Title,
            }));
        }

        let content_top = y + o.header_height + o.padding;
        let max_y = y + height - o.padding;
        let mut writer = CardWriter::new(content_top, max_y, Some(ops));
        self.stream(card, x + o.padding, &mut writer)?;

        let lines_written = writer.lines_written;
        let (state, mut ops) = writer.finish();
        ops.push(DrawOp::StrokedRect {
            x,
            y,
            width: card.width,
            height,
            color: o.border_color,
            line_width: o.border_width,
        });

        Ok(PlacedCard {
            x,
            y,
            width: card.width,
            height,
            state,
            lines_written,
            ops,
        })
    }

    fn inner_width(&self, card: &CardSpec) -> Result<f64, LayoutError> {
        let inner = card.width - 2.0 * self.options.padding;
        if inner <= 0.0 {
            return Err(LayoutError::InvalidCard {
                title: card.title.clone(),
                reason: format!(
                    "width {} leaves no room inside {} padding",
                    card.width, self.options.padding
                ),
            });
        }
        Ok(inner)
    }

    /// The title clipped to a single line.
    fn title_line(&self, card: &CardSpec) -> Result<Option<String>, LayoutError> {
        let inner = self.inner_width(card)?;
        let mut lines = self
            .measurer
            .wrap(&card.title, &self.options.title_font, inner)?;
        Ok(if lines.is_empty() {
            None
        } else {
            Some(lines.swap_remove(0))
        })
    }

    fn stream(&self, card: &CardSpec, left: f64, writer: &mut CardWriter) -> Result<(), LayoutError> {
        let o = self.options;
        let inner = self.inner_width(card)?;

        'fields: for field in &card.fields {
            writer.start_field(o.field_gap);
            for line in self.formatter.format(field, inner)? {
                let height = if line.is_blank() {
                    o.line_height / 2.0
                } else {
                    o.line_height
                };
                let Some(top) = writer.reserve(height) else {
                    break 'fields;
                };
                if let FormattedLine::Text(runs) = line {
                    let baseline = top + o.line_height * o.baseline_ratio;
                    for run in runs {
                        writer.push(DrawOp::TextLine(TextLine {
                            x: left + run.offset,
                            y: baseline,
                            text: run.text,
                            font: self.formatter.font(run.bold).clone(),
                            color: o.text_color,
                            role: TextRole::Body,
                        }));
                    }
                }
            }
        }
        Ok(())
    }
}

/// The vertical write cursor inside one card body.
struct CardWriter {
    state: CardState,
    top: f64,
    cursor: f64,
    max_y: f64,
    lines_written: usize,
    /// `None` while measuring.
    ops: Option<Vec<DrawOp>>,
}

impl CardWriter {
    fn new(top: f64, max_y: f64, ops: Option<Vec<DrawOp>>) -> Self {
        Self {
            state: CardState::Empty,
            top,
            cursor: top,
            max_y,
            lines_written: 0,
            ops,
        }
    }

    fn start_field(&mut self, gap: f64) {
        match self.state {
            CardState::Empty => self.state = CardState::Placing,
            CardState::Placing => self.cursor += gap,
            CardState::Truncated | CardState::Complete => {}
        }
    }

    /// Claim a line box of `height`. Returns its top edge, or `None` once the
    /// card body is full.
    fn reserve(&mut self, height: f64) -> Option<f64> {
        if self.state == CardState::Truncated {
            return None;
        }
        if self.cursor + height > self.max_y + EPSILON {
            self.state = CardState::Truncated;
            return None;
        }
        let top = self.cursor;
        self.cursor += height;
        self.lines_written += 1;
        Some(top)
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(ops) = self.ops.as_mut() {
            ops.push(op);
        }
    }

    fn finish(self) -> (CardState, Vec<DrawOp>) {
        debug_assert!(self.cursor >= self.top);
        let state = match self.state {
            CardState::Truncated => CardState::Truncated,
            _ => CardState::Complete,
        };
        (state, self.ops.unwrap_or_default())
    }
}
