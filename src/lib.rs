//! # Reportflow
//!
//! A card-based report layout and pagination engine.
//!
//! Reports here are stacks of bordered cards: a colored title band over a
//! list of labels, key/value pairs, bullet lists and paragraphs. The engine
//! wraps each field's text to its card, decides which page every card lands
//! on, and hands back absolutely positioned draw operations.
//!
//! **The page is the unit of layout.** A card, or a row of cards sharing a
//! line, is never sliced across a page boundary. If it does not fit it moves
//! to the next page whole; if a fixed-height card's fields do not fit inside
//! it, the overflow is clipped rather than drawn over its neighbours.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Sections, blocks, cards, fields, page metrics
//!       ↓
//!   [text]     — Pluggable width measurement and word wrapping
//!       ↓
//!   [layout]   — Field formatting, card geometry, page breaking
//!       ↓
//!   [pdf]      — Serialize pages to PDF bytes (or dump them as JSON)
//! ```
//!
//! [report] assembles candidate reports into the input model.

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod report;
pub mod style;
pub mod text;

use error::ReportError;
use layout::{Page, ReportPaginator};
use model::RenderRequest;
use pdf::PdfWriter;
use text::FontMeasurer;

/// Paginate a render request using the standard PDF font metrics.
pub fn paginate_request(request: &RenderRequest) -> Result<Vec<Page>, ReportError> {
    let options = request.options();
    let measurer = FontMeasurer::new(request.page.unit);
    let pages = ReportPaginator::new(&measurer, &options).paginate(&request.document, &request.page)?;
    Ok(pages)
}

/// Render a request to PDF bytes.
///
/// This is the primary entry point.
pub fn render(request: &RenderRequest) -> Result<Vec<u8>, ReportError> {
    let pages = paginate_request(request)?;
    let writer = PdfWriter::new(request.page.unit);
    Ok(writer.write(&pages, &request.document.metadata))
}

/// Render a request described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, ReportError> {
    let request: RenderRequest = serde_json::from_str(json)?;
    render(&request)
}

/// Paginate a request described as JSON and return the pages as JSON, for
/// hosts that draw the operations themselves.
pub fn layout_json(json: &str) -> Result<String, ReportError> {
    let request: RenderRequest = serde_json::from_str(json)?;
    let pages = paginate_request(&request)?;
    serde_json::to_string_pretty(&pages).map_err(|e| ReportError::Render(e.to_string()))
}
