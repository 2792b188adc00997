//! Running headers and footers.
//!
//! Applied as a final pass over the finished page list: the footer's
//! `{{totalPages}}` is only known once the last page exists.

use super::{DrawOp, Page, TextLine, TextRole};
use crate::error::MeasureError;
use crate::model::{PageFooter, PageHeader, PageMetrics};
use crate::style::{FontSpec, LayoutOptions};
use crate::text::{LineWrapper, TextMeasurer};

pub const PAGE_NUMBER: &str = "{{pageNumber}}";
pub const TOTAL_PAGES: &str = "{{totalPages}}";

/// Substitute the page placeholders in `template`.
pub fn page_label(template: &str, page_number: usize, total_pages: usize) -> String {
    template
        .replace(PAGE_NUMBER, &page_number.to_string())
        .replace(TOTAL_PAGES, &total_pages.to_string())
}

/// Draw the header and footer bands on every page.
pub fn apply_page_chrome(
    pages: &mut [Page],
    header: Option<&PageHeader>,
    footer: Option<&PageFooter>,
    metrics: &PageMetrics,
    measurer: &dyn TextMeasurer,
    options: &LayoutOptions,
) -> Result<(), MeasureError> {
    let total = pages.len();
    let left = metrics.content_left();
    let right = metrics.content_right();

    for page in pages.iter_mut() {
        if let (Some(header), true) = (header, metrics.header_height > 0.0) {
            let baseline = metrics.margin_top + metrics.header_height * 0.6;
            let mut title_width = right - left;
            if let Some(subtitle) = &header.subtitle {
                let width = measurer.measure(subtitle, &options.body_font)?;
                title_width -= width + options.column_gap;
                page.draw_ops.push(DrawOp::TextLine(TextLine {
                    x: right - width,
                    y: baseline,
                    text: subtitle.clone(),
                    font: options.body_font.clone(),
                    color: options.footer_color,
                    role: TextRole::Header,
                }));
            }
            if let Some(title) = first_line(measurer, &header.title, &options.header_font, title_width)? {
                page.draw_ops.push(text(left, baseline, &title, options, TextRole::Header));
            }
            let rule_y = metrics.content_top() - metrics.header_height * 0.15;
            page.draw_ops.push(rule(left, right, rule_y, options));
        }

        if let (Some(footer), true) = (footer, metrics.footer_height > 0.0) {
            let band_top = metrics.content_bottom();
            let baseline = band_top + metrics.footer_height * 0.65;
            page.draw_ops
                .push(rule(left, right, band_top + metrics.footer_height * 0.15, options));
            let mut note_width = right - left;
            let label = page_label(&footer.page_label, page.index + 1, total);
            if !label.is_empty() {
                let width = measurer.measure(&label, &options.footer_font)?;
                note_width -= width + options.column_gap;
                page.draw_ops
                    .push(text(right - width, baseline, &label, options, TextRole::Footer));
            }
            if let Some(note) = &footer.text {
                if let Some(note) = first_line(measurer, note, &options.footer_font, note_width)? {
                    page.draw_ops.push(text(left, baseline, &note, options, TextRole::Footer));
                }
            }
        }
    }
    Ok(())
}

/// The first wrapped line of `text`, or `None` when nothing fits.
fn first_line(
    measurer: &dyn TextMeasurer,
    text: &str,
    font: &FontSpec,
    max_width: f64,
) -> Result<Option<String>, MeasureError> {
    if max_width <= 0.0 {
        return Ok(None);
    }
    match LineWrapper::new(measurer, text, font, max_width).next() {
        Some(line) => line.map(|l| Some(l).filter(|l| !l.is_empty())),
        None => Ok(None),
    }
}

fn text(x: f64, y: f64, text: &str, options: &LayoutOptions, role: TextRole) -> DrawOp {
    let (font, color) = match role {
        TextRole::Header => (options.header_font.clone(), options.heading_color),
        _ => (options.footer_font.clone(), options.footer_color),
    };
    DrawOp::TextLine(TextLine {
        x,
        y,
        text: text.to_string(),
        font,
        color,
        role,
    })
}

fn rule(x1: f64, x2: f64, y: f64, options: &LayoutOptions) -> DrawOp {
    DrawOp::Line {
        x1,
        y1: y,
        x2,
        y2: y,
        color: options.rule_color,
        line_width: options.border_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::MonospaceMeasurer;

    #[test]
    fn test_page_label_substitutes_both_placeholders() {
        assert_eq!(
            page_label("Page {{pageNumber}} of {{totalPages}}", 2, 5),
            "Page 2 of 5"
        );
        assert_eq!(page_label("no placeholders", 1, 1), "no placeholders");
    }

    #[test]
    fn test_footer_numbers_every_page_with_final_count() {
        let metrics = PageMetrics::a4_mm();
        let mut pages: Vec<Page> = (0..3).map(|i| Page::new(i, &metrics)).collect();
        let footer = PageFooter::default();
        apply_page_chrome(
            &mut pages,
            None,
            Some(&footer),
            &metrics,
            &MonospaceMeasurer::new(1.0),
            &LayoutOptions::default(),
        )
        .unwrap();

        for (i, page) in pages.iter().enumerate() {
            let label = page
                .text_lines()
                .find(|t| t.role == TextRole::Footer)
                .map(|t| t.text.clone());
            assert_eq!(label, Some(format!("Page {} of 3", i + 1)));
        }
    }

    #[test]
    fn test_long_header_title_and_footer_note_are_clipped() {
        let metrics = PageMetrics {
            width: 80.0,
            margin_left: Some(10.0),
            margin_right: Some(10.0),
            ..PageMetrics::a4_mm()
        };
        let mut pages = vec![Page::new(0, &metrics)];
        let header = PageHeader {
            title: "Quarterly performance review for the platform engineering team".into(),
            subtitle: Some("Ada L.".into()),
        };
        let footer = PageFooter {
            text: Some("Generated on 2026-03-01 by the reporting service".into()),
            ..PageFooter::default()
        };
        apply_page_chrome(
            &mut pages,
            Some(&header),
            Some(&footer),
            &metrics,
            &MonospaceMeasurer::new(1.0),
            &LayoutOptions::default(),
        )
        .unwrap();

        // 60 wide: the subtitle takes 6 + 4 gap, the label "Page 1 of 1" 11 + 4.
        let lines: Vec<&TextLine> = pages[0].text_lines().collect();
        let title = lines.iter().find(|t| t.x == 10.0 && t.role == TextRole::Header).unwrap();
        assert_eq!(title.text, "Quarterly performance review for the platform");
        let note = lines.iter().find(|t| t.x == 10.0 && t.role == TextRole::Footer).unwrap();
        assert_eq!(note.text, "Generated on 2026-03-01 by the reporting");
        for t in &lines {
            assert!(t.x + t.text.chars().count() as f64 <= 70.0 + 1e-9, "{:?} overflows", t.text);
        }
        let subtitle = lines.iter().find(|t| t.text == "Ada L.").unwrap();
        assert!(title.x + title.text.len() as f64 <= subtitle.x - 4.0);
    }

    #[test]
    fn test_header_subtitle_is_right_aligned() {
        let metrics = PageMetrics::a4_mm();
        let mut pages = vec![Page::new(0, &metrics)];
        let header = PageHeader {
            title: "Candidate Report".into(),
            subtitle: Some("Ada L.".into()),
        };
        apply_page_chrome(
            &mut pages,
            Some(&header),
            None,
            &metrics,
            &MonospaceMeasurer::new(2.0),
            &LayoutOptions::default(),
        )
        .unwrap();
        let subtitle = pages[0]
            .text_lines()
            .find(|t| t.text == "Ada L.")
            .expect("subtitle");
        assert_eq!(subtitle.x, 200.0 - 12.0);
        assert!(subtitle.y < metrics.content_top());
    }
}
