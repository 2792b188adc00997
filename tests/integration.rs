//! Integration tests for the reportflow pipeline.
//!
//! These tests exercise the full path from JSON input to PDF output.
//! They verify:
//! - JSON deserialization of render requests and candidate data
//! - Page breaks happen at block boundaries, rows stay together
//! - Fixed-height cards clip instead of growing
//! - Running footers know the final page count
//! - PDF output is structurally valid

use reportflow::error::{LayoutError, ReportError};
use reportflow::layout::{paginate, DrawOp, Page, TextRole};
use reportflow::model::*;
use reportflow::report::CandidateReport;
use reportflow::style::LayoutOptions;
use reportflow::text::{FontMeasurer, MonospaceMeasurer};

// ─── Helpers ────────────────────────────────────────────────────

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(contains(bytes, b"%%EOF"), "Missing %%EOF marker");
    assert!(contains(bytes, b"xref"), "Missing xref table");
    assert!(contains(bytes, b"trailer"), "Missing trailer");
}

fn contains(bytes: &[u8], needle: &[u8]) -> bool {
    bytes.windows(needle.len()).any(|w| w == needle)
}

fn mono_pages(doc: &ReportDocument) -> Vec<Page> {
    paginate(
        doc,
        &PageMetrics::a4_mm(),
        &MonospaceMeasurer::new(1.0),
        &LayoutOptions::default(),
    )
    .expect("pagination should succeed")
}

fn titles_on(page: &Page) -> Vec<String> {
    page.text_lines()
        .filter(|t| t.role == TextRole::Title)
        .map(|t| t.text.clone())
        .collect()
}

fn stat(title: &str) -> CardSpec {
    CardSpec::new(title, 44.0).height(30.0).label("42")
}

const REQUEST_JSON: &str = r##"{
  "page": {
    "width": 210, "height": 297,
    "marginTop": 10, "marginBottom": 10,
    "headerHeight": 20, "footerHeight": 10
  },
  "document": {
    "metadata": { "title": "Quarterly Review" },
    "header": { "title": "Quarterly Review", "subtitle": "Team Alpha" },
    "footer": { "text": "Confidential" },
    "sections": [
      {
        "heading": "Summary",
        "blocks": [
          { "cards": [
            { "title": "Score", "width": 44, "height": 30, "headerColor": "success",
              "fields": [ { "type": "label", "text": "82" } ] },
            { "title": "Accuracy", "width": 44, "height": 30,
              "fields": [ { "type": "label", "text": "91%" } ] }
          ] },
          { "title": "Notes", "width": 190, "height": "auto", "headerColor": "#7c3aed",
            "fields": [
              { "type": "keyValue", "label": "Reviewer", "value": "J. Smith" },
              { "type": "bulletList", "items": ["Consistent", "Fast"] },
              { "type": "bulletList", "items": ["Yes", "No"], "marker": "lettered" },
              { "type": "paragraph", "text": "Good quarter overall." }
            ] }
        ]
      }
    ]
  }
}"##;

// ─── JSON pipeline ──────────────────────────────────────────────

#[test]
fn test_render_json_produces_valid_pdf() {
    let bytes = reportflow::render_json(REQUEST_JSON).expect("render should succeed");
    assert_valid_pdf(&bytes);
    assert!(contains(&bytes, b"/Title (Quarterly Review)"));
    assert!(contains(&bytes, b"/Count 1"));
}

#[test]
fn test_request_deserializes_rows_and_cards() {
    let request: RenderRequest = serde_json::from_str(REQUEST_JSON).unwrap();
    let blocks = &request.document.sections[0].blocks;
    assert!(blocks[0].is_row());
    assert_eq!(blocks[0].cards().len(), 2);
    assert!(!blocks[1].is_row());
    assert_eq!(blocks[1].cards()[0].height, CardHeight::Auto);
    assert_eq!(request.page.unit, Unit::Mm);
}

#[test]
fn test_layout_json_dumps_draw_ops() {
    let json = reportflow::layout_json(REQUEST_JSON).expect("layout should succeed");
    let pages: serde_json::Value = serde_json::from_str(&json).unwrap();
    let ops = pages[0]["drawOps"].as_array().expect("drawOps array");
    assert!(ops.iter().any(|op| op["op"] == "filledRect"));
    assert!(ops.iter().any(|op| op["op"] == "textLine" && op["text"] == "Page 1 of 1"));
    assert!(ops.iter().any(|op| op["op"] == "textLine" && op["text"] == "A) "));
}

#[test]
fn test_malformed_json_reports_parse_hint() {
    let err = reportflow::render_json("{ \"document\": ").unwrap_err();
    assert!(matches!(err, ReportError::Parse { .. }));
    assert!(err.to_string().contains("Hint:"));
}

#[test]
fn test_card_wider_than_page_is_rejected() {
    let json = REQUEST_JSON.replace("\"width\": 190", "\"width\": 400");
    let err = reportflow::render_json(&json).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Layout(LayoutError::InvalidCard { .. })
    ));
}

#[test]
fn test_negative_layout_constants_are_rejected() {
    for (key, value) in [("lineHeight", -20.0), ("padding", -30.0), ("headerHeight", -40.0)] {
        let mut request: serde_json::Value = serde_json::from_str(REQUEST_JSON).unwrap();
        request["layout"] = serde_json::json!({ key: value });
        let err = reportflow::layout_json(&request.to_string()).unwrap_err();
        assert!(
            matches!(err, ReportError::Layout(LayoutError::InvalidOptions(_))),
            "{key} = {value} should be rejected, got {err:?}"
        );
    }
}

// ─── Page breaking ──────────────────────────────────────────────

#[test]
fn test_blocks_flow_onto_new_pages() {
    // 247 usable holds three 70-high cards with gaps, not four.
    let cards: Vec<CardSpec> = (0..7)
        .map(|i| CardSpec::new(format!("Card {i}"), 190.0).height(70.0).paragraph("body"))
        .collect();
    let section = cards.into_iter().fold(Section::new(), Section::card);
    let pages = mono_pages(&ReportDocument::new(vec![section]));

    assert_eq!(pages.len(), 3);
    assert_eq!(titles_on(&pages[0]), vec!["Card 0", "Card 1", "Card 2"]);
    assert_eq!(titles_on(&pages[1]), vec!["Card 3", "Card 4", "Card 5"]);
    assert_eq!(titles_on(&pages[2]), vec!["Card 6"]);
}

#[test]
fn test_row_never_splits_across_pages() {
    let filler = CardSpec::new("Filler", 190.0).height(220.0);
    let doc = ReportDocument::new(vec![Section::new()
        .card(filler)
        .row(vec![stat("A"), stat("B"), stat("C"), stat("D")])]);
    let pages = mono_pages(&doc);

    assert_eq!(pages.len(), 2);
    assert_eq!(titles_on(&pages[1]), vec!["A", "B", "C", "D"]);
    let ys: Vec<f64> = pages[1]
        .draw_ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::StrokedRect { y, .. } => Some(*y),
            _ => None,
        })
        .collect();
    assert_eq!(ys.len(), 4);
    assert!(ys.iter().all(|y| *y == ys[0]), "row cards share one Y: {ys:?}");
}

#[test]
fn test_fixed_card_clips_overflow() {
    let card = (0..20).fold(CardSpec::new("Log", 190.0).height(50.0), |c, i| {
        c.paragraph(format!("entry {i}"))
    });
    let pages = mono_pages(&ReportDocument::new(vec![Section::new().card(card)]));
    let body: Vec<String> = pages[0]
        .text_lines()
        .filter(|t| t.role == TextRole::Body)
        .map(|t| t.text.clone())
        .collect();

    // 50 - 8 header - 8 padding = 34: five 5-high lines with 1 gaps.
    assert_eq!(body, vec!["entry 0", "entry 1", "entry 2", "entry 3", "entry 4"]);
    assert_eq!(pages.len(), 1);
}

#[test]
fn test_footer_page_numbers_use_final_count() {
    let section = (0..10).fold(Section::new(), |s, i| {
        s.card(CardSpec::new(format!("Card {i}"), 190.0).height(80.0))
    });
    let doc = ReportDocument::new(vec![section]).with_footer(PageFooter::default());
    let pages = mono_pages(&doc);
    let total = pages.len();

    for page in &pages {
        let label = page
            .text_lines()
            .find(|t| t.role == TextRole::Footer)
            .map(|t| t.text.clone());
        assert_eq!(label, Some(format!("Page {} of {}", page.index + 1, total)));
    }
}

// ─── Candidate reports ──────────────────────────────────────────

#[test]
fn test_candidate_report_renders_to_pdf() {
    let metrics = PageMetrics::a4_mm();
    let options = LayoutOptions::default();
    let doc = CandidateReport::example().to_document(&metrics, &options, None);
    let request = RenderRequest {
        page: metrics,
        layout: Some(options),
        document: doc,
    };
    let bytes = reportflow::render(&request).expect("render should succeed");
    assert_valid_pdf(&bytes);
    assert!(contains(&bytes, b"/BaseFont /Helvetica-Bold"));
}

#[test]
fn test_candidate_report_in_points() {
    let metrics = PageMetrics::a4_pt();
    let options = LayoutOptions::for_unit(metrics.unit);
    let doc = CandidateReport::example().to_document(&metrics, &options, Some("today"));
    let pages = paginate(&doc, &metrics, &FontMeasurer::new(metrics.unit), &options).unwrap();
    assert!(pages.len() >= 2);

    let request = RenderRequest {
        page: metrics,
        layout: Some(options),
        document: doc,
    };
    let bytes = reportflow::render(&request).unwrap();
    assert_valid_pdf(&bytes);
    assert!(contains(&bytes, b"/MediaBox [0 0 595.28 841.89]"));
}
