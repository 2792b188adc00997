//! # Page Break Decisions
//!
//! Cards are unbreakable, and so are rows of cards. The only question when
//! a block arrives is whether it goes on this page, on the next one, or (when
//! nothing could ever hold it) on the current fresh page anyway.

/// Tolerance for height comparisons.
const EPSILON: f64 = 1e-6;

/// What to do with a placement unit given the space left on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// The unit fits in the remaining space.
    Place,
    /// The unit does not fit here but a fresh page may hold it.
    MoveToNextPage,
    /// The page is already fresh and still too short. Place the unit here
    /// and let its cards truncate, rather than opening empty pages forever.
    PlaceOversized,
}

/// Decide where a unit of `needed` height goes.
///
/// `at_page_top` is true when nothing has been placed on the current page.
pub fn decide_break(remaining_height: f64, needed: f64, at_page_top: bool) -> BreakDecision {
    if needed <= remaining_height + EPSILON {
        return BreakDecision::Place;
    }
    if !at_page_top {
        return BreakDecision::MoveToNextPage;
    }
    BreakDecision::PlaceOversized
}
