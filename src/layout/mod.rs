//! # Page-Native Card Layout
//!
//! This is the heart of the engine. Cards are laid out INTO pages: every
//! placement decision is made with the page's content band as a hard
//! boundary, and a card (or a row of cards) is never sliced across pages
//! after the fact.
//!
//! ## The Algorithm
//!
//! For each block of each section:
//! 1. Resolve every card's height: fixed, or measured by streaming its
//!    fields with no lower bound. A row is as tall as its tallest card.
//! 2. Add the leading gap (none at the top of a page) and, for a section's
//!    first block, the section heading, which always travels with the block.
//! 3. If that does not fit in the remaining height, open a new page. A unit
//!    taller than a whole page is placed on the fresh page anyway and its
//!    cards truncate.
//! 4. Place each card via [`card::CardLayout`] and advance the cursor.
//!
//! Running headers and footers are drawn in a final pass ([`chrome`]) once
//! the page count is known.

pub mod card;
pub mod chrome;
pub mod cursor;
pub mod format;
pub mod page_break;

use log::{debug, info};
use serde::Serialize;

use crate::error::LayoutError;
use crate::model::{Block, PageMetrics, ReportDocument};
use crate::style::{Color, FontSpec, LayoutOptions};
use crate::text::TextMeasurer;

use card::CardLayout;
use cursor::PageCursor;
use page_break::{decide_break, BreakDecision};

/// Heading baseline inside the heading band, as a fraction of its height.
const HEADING_BASELINE: f64 = 0.7;

/// A finished page: absolutely positioned draw operations in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Zero-based page index.
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub draw_ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(index: usize, metrics: &PageMetrics) -> Self {
        Self {
            index,
            width: metrics.width,
            height: metrics.height,
            draw_ops: Vec::new(),
        }
    }

    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.draw_ops.iter().filter_map(|op| match op {
            DrawOp::TextLine(line) => Some(line),
            _ => None,
        })
    }
}

/// What to draw. Coordinates are in document units, origin top-left,
/// Y growing downward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    #[serde(rename_all = "camelCase")]
    FilledRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    #[serde(rename_all = "camelCase")]
    StrokedRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        line_width: f64,
    },
    /// A straight rule, used by the page header and footer.
    #[serde(rename_all = "camelCase")]
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        line_width: f64,
    },
    TextLine(TextLine),
}

/// One run of text on one line. `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font: FontSpec,
    pub color: Color,
    pub role: TextRole,
}

/// Where a text line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextRole {
    /// A card title in the header band.
    Title,
    /// Field content inside a card body.
    Body,
    /// A section heading above the section's first block.
    Heading,
    /// The running page header.
    Header,
    /// The running page footer.
    Footer,
}

/// What precedes a block: the start of a section (with its optional
/// heading) or another block of the same section.
#[derive(Debug, Clone, Copy)]
enum Lead<'s> {
    Section(Option<&'s str>),
    Block,
}

/// Walks a document's sections and places their cards onto pages.
pub struct ReportPaginator<'a> {
    measurer: &'a dyn TextMeasurer,
    options: &'a LayoutOptions,
}

impl<'a> ReportPaginator<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, options: &'a LayoutOptions) -> Self {
        Self { measurer, options }
    }

    /// Lay a document out into pages.
    pub fn paginate(
        &self,
        document: &ReportDocument,
        metrics: &PageMetrics,
    ) -> Result<Vec<Page>, LayoutError> {
        metrics.validate()?;
        self.options.validate(metrics)?;
        document.validate(metrics, self.options)?;

        let cards = CardLayout::new(self.measurer, self.options);
        let mut cursor = PageCursor::new(metrics);

        for (section_index, section) in document.sections.iter().enumerate() {
            for (block_index, block) in section.blocks.iter().enumerate() {
                let lead = if block_index == 0 {
                    Lead::Section(section.heading.as_deref())
                } else {
                    Lead::Block
                };
                self.place_block(&cards, &mut cursor, metrics, section_index, block, lead)?;
            }
        }

        let mut pages = cursor.into_pages();
        chrome::apply_page_chrome(
            &mut pages,
            document.header.as_ref(),
            document.footer.as_ref(),
            metrics,
            self.measurer,
            self.options,
        )?;

        info!(
            "paginated {} sections into {} pages",
            document.sections.len(),
            pages.len()
        );
        Ok(pages)
    }

    fn place_block(
        &self,
        cards: &CardLayout,
        cursor: &mut PageCursor,
        metrics: &PageMetrics,
        section_index: usize,
        block: &Block,
        lead: Lead,
    ) -> Result<(), LayoutError> {
        let o = self.options;

        let heights = block
            .cards()
            .iter()
            .map(|card| cards.resolve_height(card))
            .collect::<Result<Vec<_>, _>>()?;
        let unit_height = heights.iter().copied().fold(0.0, f64::max);
        let heading = match lead {
            Lead::Section(heading) => heading,
            Lead::Block => None,
        };
        let heading_height = if heading.is_some() { o.heading_height } else { 0.0 };

        let mut gap = match lead {
            _ if cursor.at_page_top() => 0.0,
            Lead::Section(_) => o.section_gap,
            Lead::Block => o.card_gap,
        };

        let needed = gap + heading_height + unit_height;
        match decide_break(cursor.remaining_height(), needed, cursor.at_page_top()) {
            BreakDecision::Place => {}
            BreakDecision::MoveToNextPage => {
                debug!(
                    "section {}: {:.2} needed, {:.2} left on page {}; breaking",
                    section_index,
                    needed,
                    cursor.remaining_height(),
                    cursor.page_index() + 1
                );
                cursor.new_page();
                gap = 0.0;
                if !cursor.can_fit(heading_height + unit_height) {
                    debug!(
                        "section {}: {:.2} exceeds a full page ({:.2}); placing oversized",
                        section_index,
                        heading_height + unit_height,
                        metrics.usable_height()
                    );
                }
            }
            BreakDecision::PlaceOversized => {
                debug!(
                    "section {}: {:.2} exceeds a full page ({:.2}); placing oversized",
                    section_index,
                    needed,
                    metrics.usable_height()
                );
            }
        }

        cursor.advance(gap);

        if let Some(text) = heading {
            let band = heading_height.min(cursor.remaining_height());
            if let Some(line) = self.heading_line(text, metrics, cursor.y(), band)? {
                cursor.extend([line]);
            }
            cursor.advance(band);
        }

        let available = cursor.remaining_height();
        let left = metrics.content_left();
        let offsets = block.column_offsets(o.column_gap);
        for ((card, height), dx) in block.cards().iter().zip(heights).zip(offsets) {
            let placed = cards.place(card, left + dx, cursor.y(), height.min(available))?;
            cursor.extend(placed.ops);
        }
        cursor.advance(unit_height.min(available));
        Ok(())
    }

    /// The section heading clipped to one line of the content width.
    fn heading_line(
        &self,
        text: &str,
        metrics: &PageMetrics,
        top: f64,
        band: f64,
    ) -> Result<Option<DrawOp>, LayoutError> {
        let o = self.options;
        let mut lines = self
            .measurer
            .wrap(text, &o.heading_font, metrics.content_width())?;
        if lines.is_empty() {
            return Ok(None);
        }
        Ok(Some(DrawOp::TextLine(TextLine {
            x: metrics.content_left(),
            y: top + band * HEADING_BASELINE,
            text: lines.swap_remove(0),
            font: o.heading_font.clone(),
            color: o.heading_color,
            role: TextRole::Heading,
        })))
    }
}

/// Paginate `document` with the given measurer and options.
pub fn paginate(
    document: &ReportDocument,
    metrics: &PageMetrics,
    measurer: &dyn TextMeasurer,
    options: &LayoutOptions,
) -> Result<Vec<Page>, LayoutError> {
    ReportPaginator::new(measurer, options).paginate(document, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use crate::model::{CardSpec, PageFooter, PageHeader, Section};
    use crate::text::{FontMeasurer, MonospaceMeasurer};

    // ─── Helpers ────────────────────────────────────────────────

    fn run(doc: &ReportDocument) -> Vec<Page> {
        let metrics = PageMetrics::a4_mm();
        paginate(
            doc,
            &metrics,
            &MonospaceMeasurer::new(1.0),
            &LayoutOptions::default(),
        )
        .unwrap()
    }

    fn stat(title: &str) -> CardSpec {
        CardSpec::new(title, 44.0)
            .height(30.0)
            .key_value("Value", "82")
    }

    fn stat_row() -> Vec<CardSpec> {
        vec![stat("Score"), stat("Accuracy"), stat("Speed"), stat("Rank")]
    }

    fn detail(title: &str, height: f64) -> CardSpec {
        CardSpec::new(title, 190.0)
            .height(height)
            .paragraph("details")
    }

    /// Page index of the card whose title line reads `title`.
    fn page_of(pages: &[Page], title: &str) -> Option<usize> {
        pages.iter().find_map(|p| {
            p.text_lines()
                .any(|t| t.role == TextRole::Title && t.text == title)
                .then_some(p.index)
        })
    }

    fn body_texts(pages: &[Page]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.text_lines())
            .filter(|t| t.role == TextRole::Body)
            .map(|t| t.text.clone())
            .collect()
    }

    // ─── Page breaking ──────────────────────────────────────────

    #[test]
    fn test_three_sections_of_rows_and_details_take_two_pages() {
        let sections = (1..=3)
            .map(|i| {
                Section::new()
                    .row(stat_row())
                    .card(detail(&format!("Detail {i}"), 70.0))
            })
            .collect();
        let pages = run(&ReportDocument::new(sections));

        assert_eq!(pages.len(), 2);
        assert_eq!(page_of(&pages, "Detail 2"), Some(0));
        assert_eq!(page_of(&pages, "Detail 3"), Some(1));
    }

    #[test]
    fn test_row_moves_to_next_page_as_a_unit() {
        let doc = ReportDocument::new(vec![
            Section::new().card(detail("Filler", 230.0)),
            Section::new().row(stat_row()),
        ]);
        let pages = run(&doc);

        assert_eq!(pages.len(), 2);
        for title in ["Score", "Accuracy", "Speed", "Rank"] {
            assert_eq!(page_of(&pages, title), Some(1), "{title} split from its row");
        }
    }

    #[test]
    fn test_no_gap_at_top_of_new_page() {
        let doc = ReportDocument::new(vec![
            Section::new().card(detail("Filler", 230.0)),
            Section::new().card(detail("Next", 40.0)),
        ]);
        let pages = run(&doc);
        let first = pages[1].draw_ops.first();
        assert!(
            matches!(first, Some(DrawOp::FilledRect { y, .. }) if *y == 30.0),
            "expected the card at the content top, got {first:?}"
        );
    }

    #[test]
    fn test_heading_is_kept_with_first_block() {
        // 247 usable: filler ends at 260, leaving 17. Heading (8) plus gap (4)
        // plus a 12-high card do not fit, so both move together.
        let doc = ReportDocument::new(vec![
            Section::new().card(detail("Filler", 230.0)),
            Section::new()
                .heading("Recommendations")
                .card(CardSpec::new("Practice", 190.0).height(12.0)),
        ]);
        let pages = run(&doc);

        let heading_page = pages.iter().find_map(|p| {
            p.text_lines()
                .any(|t| t.role == TextRole::Heading)
                .then_some(p.index)
        });
        assert_eq!(heading_page, Some(1));
        assert_eq!(page_of(&pages, "Practice"), Some(1));
    }

    #[test]
    fn test_oversized_card_is_placed_and_truncated_not_dropped() {
        let long = (0..100).fold(CardSpec::new("Transcript", 190.0), |c, i| {
            c.paragraph(format!("line {i}"))
        });
        let doc = ReportDocument::new(vec![
            Section::new().card(detail("Intro", 40.0)),
            Section::new().card(long),
            Section::new().card(detail("After", 40.0)),
        ]);
        let pages = run(&doc);

        assert_eq!(pages.len(), 3);
        assert_eq!(page_of(&pages, "Transcript"), Some(1));
        assert_eq!(page_of(&pages, "After"), Some(2));
        let texts = body_texts(&pages);
        assert!(texts.contains(&"line 0".to_string()));
        assert!(!texts.contains(&"line 99".to_string()));

        // Clamped to the usable height of the page it sits on.
        let border = pages[1].draw_ops.iter().find_map(|op| match op {
            DrawOp::StrokedRect { y, height, .. } => Some((*y, *height)),
            _ => None,
        });
        assert_eq!(border, Some((30.0, 247.0)));
    }

    #[test]
    fn test_fixed_card_truncates_inside_a_report() {
        let card = (1..=5).fold(CardSpec::new("Metrics", 190.0).height(40.0), |c, i| {
            c.key_value(format!("Metric {i}"), "ok")
        });
        let pages = run(&ReportDocument::new(vec![Section::new().card(card)]));
        let texts = body_texts(&pages);

        assert!(texts.contains(&"Metric 4: ".to_string()));
        assert!(!texts.contains(&"Metric 5: ".to_string()));
    }

    // ─── Invariants ─────────────────────────────────────────────

    fn busy_document() -> ReportDocument {
        let mut sections = Vec::new();
        for i in 0..6 {
            let notes = (0..i * 3).fold(CardSpec::new(format!("Notes {i}"), 190.0), |c, j| {
                c.bullets([format!("observation {j} about the candidate's approach")])
            });
            sections.push(
                Section::new()
                    .heading(format!("Section {i}"))
                    .row(stat_row())
                    .card(notes),
            );
        }
        ReportDocument::new(sections)
            .with_header(PageHeader {
                title: "Candidate Report".into(),
                subtitle: Some("Ada".into()),
            })
            .with_footer(PageFooter::default())
    }

    #[test]
    fn test_content_text_stays_inside_the_content_band() {
        let metrics = PageMetrics::a4_mm();
        let pages = run(&busy_document());
        assert!(pages.len() > 1);
        for page in &pages {
            for line in page.text_lines() {
                if matches!(line.role, TextRole::Header | TextRole::Footer) {
                    continue;
                }
                assert!(
                    line.y >= metrics.content_top() && line.y <= metrics.content_bottom(),
                    "{:?} at y={} on page {}",
                    line.text,
                    line.y,
                    page.index
                );
            }
        }
    }

    #[test]
    fn test_pagination_is_deterministic() {
        let doc = busy_document();
        assert_eq!(run(&doc), run(&doc));
    }

    #[test]
    fn test_footer_carries_final_page_count() {
        let pages = run(&busy_document());
        let total = pages.len();
        let last = pages
            .last()
            .and_then(|p| p.text_lines().find(|t| t.role == TextRole::Footer))
            .map(|t| t.text.clone());
        assert_eq!(last, Some(format!("Page {total} of {total}")));
    }

    // ─── Errors ─────────────────────────────────────────────────

    #[test]
    fn test_empty_document_is_rejected() {
        let result = paginate(
            &ReportDocument::default(),
            &PageMetrics::a4_mm(),
            &MonospaceMeasurer::new(1.0),
            &LayoutOptions::default(),
        );
        assert!(matches!(result, Err(LayoutError::EmptyDocument)));
    }

    #[test]
    fn test_negative_line_height_is_rejected_before_layout() {
        let doc = ReportDocument::new(vec![Section::new().card(
            CardSpec::new("Notes", 190.0)
                .height(60.0)
                .paragraph("one")
                .paragraph("two")
                .paragraph("three"),
        )]);
        let options = LayoutOptions {
            line_height: -20.0,
            ..LayoutOptions::default()
        };
        let result = paginate(&doc, &PageMetrics::a4_mm(), &MonospaceMeasurer::new(1.0), &options);
        assert!(matches!(result, Err(LayoutError::InvalidOptions(_))));
    }

    #[test]
    fn test_measurer_failure_propagates() {
        struct Broken;
        impl TextMeasurer for Broken {
            fn measure(&self, text: &str, _font: &FontSpec) -> Result<f64, MeasureError> {
                Err(MeasureError::new(text, "no metrics"))
            }
        }
        let doc = ReportDocument::new(vec![Section::new().card(detail("Any", 40.0))]);
        let result = paginate(&doc, &PageMetrics::a4_mm(), &Broken, &LayoutOptions::default());
        assert!(matches!(result, Err(LayoutError::Measurement(_))));
    }

    #[test]
    fn test_strict_font_measurer_rejects_unencodable_text() {
        let doc = ReportDocument::new(vec![Section::new().card(
            CardSpec::new("Notes", 190.0).paragraph("snowman \u{2603}"),
        )]);
        let result = paginate(
            &doc,
            &PageMetrics::a4_mm(),
            &FontMeasurer::new(crate::model::Unit::Mm).strict(),
            &LayoutOptions::default(),
        );
        assert!(matches!(result, Err(LayoutError::Measurement(_))));
    }
}
