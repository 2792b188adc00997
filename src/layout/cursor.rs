//! # Page Cursor
//!
//! Tracks where we are during pagination: which page is open and how far
//! down its content band the next block starts. The cursor owns the pages
//! produced so far; nothing escapes until [`PageCursor::into_pages`].

use super::{DrawOp, Page};
use crate::model::PageMetrics;

/// Tolerance for height comparisons.
const EPSILON: f64 = 1e-6;

/// The current page and vertical write position.
#[derive(Debug, Clone)]
pub struct PageCursor<'m> {
    metrics: &'m PageMetrics,
    pages: Vec<Page>,
    y: f64,
}

impl<'m> PageCursor<'m> {
    /// Open the first page with the cursor at the top of its content band.
    pub fn new(metrics: &'m PageMetrics) -> Self {
        Self {
            metrics,
            pages: vec![Page::new(0, metrics)],
            y: metrics.content_top(),
        }
    }

    /// Zero-based index of the open page.
    pub fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn remaining_height(&self) -> f64 {
        (self.metrics.content_bottom() - self.y).max(0.0)
    }

    pub fn can_fit(&self, height: f64) -> bool {
        height <= self.remaining_height() + EPSILON
    }

    /// True when nothing has been placed on the open page yet.
    pub fn at_page_top(&self) -> bool {
        self.y <= self.metrics.content_top() + EPSILON
    }

    /// Move down by `height`, never past the bottom of the content band.
    pub fn advance(&mut self, height: f64) {
        debug_assert!(height >= 0.0, "cursor cannot move up");
        self.y = (self.y + height.max(0.0)).min(self.metrics.content_bottom());
    }

    /// Open a fresh page and move the cursor to the top of its content band.
    pub fn new_page(&mut self) {
        let index = self.pages.len();
        self.pages.push(Page::new(index, self.metrics));
        self.y = self.metrics.content_top();
    }

    /// Append draw operations to the open page.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = DrawOp>) {
        if let Some(page) = self.pages.last_mut() {
            page.draw_ops.extend(ops);
        }
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}
