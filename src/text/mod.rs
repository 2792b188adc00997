//! # Text Measurement and Wrapping
//!
//! The engine never assumes glyph metrics. Everything it knows about text
//! width comes through [`TextMeasurer`], so a host can plug in whatever its
//! renderer uses. Two measurers ship with the crate: [`FontMeasurer`] (real
//! standard-font metrics) and [`MonospaceMeasurer`] (one fixed advance per
//! character).
//!
//! Wrapping is greedy and breaks at whitespace only. A token that is wider
//! than the line on its own is placed alone on its own line, unbroken.

use std::iter::Peekable;
use std::str::{Split, SplitWhitespace};

use crate::error::MeasureError;
use crate::font::FontContext;
use crate::model::Unit;
use crate::style::FontSpec;

/// Tolerance for width comparisons.
const EPSILON: f64 = 1e-6;

/// Pluggable text width measurement.
pub trait TextMeasurer {
    /// Rendered width of `text` in document units.
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError>;

    /// Wrap `text` into lines no wider than `max_width`.
    fn wrap(&self, text: &str, font: &FontSpec, max_width: f64) -> Result<Vec<String>, MeasureError> {
        LineWrapper::new(self, text, font, max_width).collect()
    }
}

/// A lazy, restartable sequence of wrapped lines.
///
/// The first line may be narrower than the rest (`first_width`), which is
/// how inline prefixes such as `"Score: "` are accounted for. When the first
/// word does not fit in that narrower first line, an empty first line is
/// yielded and the word moves down to a full-width line.
pub struct LineWrapper<'a, M: TextMeasurer + ?Sized> {
    measurer: &'a M,
    font: &'a FontSpec,
    segments: Split<'a, char>,
    words: Option<Peekable<SplitWhitespace<'a>>>,
    first_width: f64,
    rest_width: f64,
    emitted: usize,
    segment_has_output: bool,
    done: bool,
}

impl<'a, M: TextMeasurer + ?Sized> LineWrapper<'a, M> {
    pub fn new(measurer: &'a M, text: &'a str, font: &'a FontSpec, max_width: f64) -> Self {
        Self::indented(measurer, text, font, max_width, max_width)
    }

    pub fn indented(
        measurer: &'a M,
        text: &'a str,
        font: &'a FontSpec,
        first_width: f64,
        rest_width: f64,
    ) -> Self {
        let text = text.trim_end();
        Self {
            measurer,
            font,
            segments: text.split('\n'),
            words: None,
            first_width,
            rest_width,
            emitted: 0,
            segment_has_output: false,
            done: text.is_empty(),
        }
    }

    fn limit(&self) -> f64 {
        if self.emitted == 0 {
            self.first_width
        } else {
            self.rest_width
        }
    }

    fn emit(&mut self, line: String) -> Option<Result<String, MeasureError>> {
        self.emitted += 1;
        self.segment_has_output = true;
        Some(Ok(line))
    }
}

impl<M: TextMeasurer + ?Sized> Clone for LineWrapper<'_, M> {
    fn clone(&self) -> Self {
        Self {
            measurer: self.measurer,
            font: self.font,
            segments: self.segments.clone(),
            words: self.words.clone(),
            first_width: self.first_width,
            rest_width: self.rest_width,
            emitted: self.emitted,
            segment_has_output: self.segment_has_output,
            done: self.done,
        }
    }
}

impl<M: TextMeasurer + ?Sized> Iterator for LineWrapper<'_, M> {
    type Item = Result<String, MeasureError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.words.is_none() {
                match self.segments.next() {
                    Some(segment) => {
                        self.words = Some(segment.split_whitespace().peekable());
                        self.segment_has_output = false;
                    }
                    None => {
                        self.done = true;
                        return None;
                    }
                }
            }

            let limit = self.limit();
            let narrow_first = self.emitted == 0 && self.first_width < self.rest_width;
            let mut line = String::new();
            let mut exhausted = false;

            if let Some(words) = self.words.as_mut() {
                while let Some(&word) = words.peek() {
                    let candidate = if line.is_empty() {
                        word.to_string()
                    } else {
                        format!("{line} {word}")
                    };
                    let width = match self.measurer.measure(&candidate, self.font) {
                        Ok(w) => w,
                        Err(e) => {
                            self.done = true;
                            return Some(Err(e));
                        }
                    };
                    if width <= limit + EPSILON {
                        line = candidate;
                        words.next();
                        continue;
                    }
                    if line.is_empty() && !narrow_first {
                        // Unbreakable token: alone on its own line.
                        line = candidate;
                        words.next();
                    }
                    break;
                }
                exhausted = words.peek().is_none();
            }

            if !line.is_empty() {
                return self.emit(line);
            }
            if !exhausted {
                // The first word did not fit beside the prefix.
                return self.emit(String::new());
            }
            self.words = None;
            if !self.segment_has_output {
                return self.emit(String::new());
            }
        }
    }
}

/// Wrap `text` with a narrower first line. See [`LineWrapper::indented`].
pub fn wrap_indented<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    font: &FontSpec,
    first_width: f64,
    rest_width: f64,
) -> Result<Vec<String>, MeasureError> {
    LineWrapper::indented(measurer, text, font, first_width, rest_width).collect()
}

/// Measures with the standard PDF font metrics, scaled into document units.
#[derive(Debug, Clone)]
pub struct FontMeasurer {
    context: FontContext,
    per_point: f64,
    strict: bool,
}

impl FontMeasurer {
    pub fn new(unit: Unit) -> Self {
        Self {
            context: FontContext::new(),
            per_point: unit.per_point(),
            strict: false,
        }
    }

    /// Fail on characters the standard fonts cannot encode instead of
    /// measuring them with a fallback width.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f64, MeasureError> {
        if self.strict {
            if let Some(ch) = text.chars().find(|&c| !self.context.has_glyph(c)) {
                return Err(MeasureError::new(
                    text,
                    format!("no glyph for {ch:?} in {}", font.family),
                ));
            }
        }
        let points = self
            .context
            .measure_string(text, &font.family, font.weight(), font.size);
        Ok(points * self.per_point)
    }
}

/// Every character advances by the same distance, whatever the font.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    pub advance: f64,
}

impl MonospaceMeasurer {
    pub fn new(advance: f64) -> Self {
        Self { advance }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, _font: &FontSpec) -> Result<f64, MeasureError> {
        Ok(text.chars().count() as f64 * self.advance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono() -> MonospaceMeasurer {
        MonospaceMeasurer::new(1.0)
    }

    fn font() -> FontSpec {
        FontSpec::regular(10.0)
    }

    #[test]
    fn test_empty_text_wraps_to_nothing() {
        assert!(mono().wrap("", &font(), 10.0).unwrap().is_empty());
        assert!(mono().wrap("   \n ", &font(), 10.0).unwrap().is_empty());
    }

    #[test]
    fn test_greedy_wrap_at_word_boundaries() {
        let lines = mono()
            .wrap("the quick brown fox jumps over", &font(), 10.0)
            .unwrap();
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over"]);
    }

    #[test]
    fn test_exact_fit_stays_on_one_line() {
        let lines = mono().wrap("abcde fghi", &font(), 10.0).unwrap();
        assert_eq!(lines, vec!["abcde fghi"]);
    }

    #[test]
    fn test_overlong_token_is_placed_alone_unbroken() {
        let lines = mono()
            .wrap("see https://example.com/very/long/path now", &font(), 10.0)
            .unwrap();
        assert_eq!(lines, vec!["see", "https://example.com/very/long/path", "now"]);
    }

    #[test]
    fn test_newlines_force_breaks_and_keep_blank_lines() {
        let lines = mono().wrap("one\n\ntwo", &font(), 10.0).unwrap();
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_narrow_first_line_pushes_word_down() {
        let m = mono();
        let f = font();
        let lines = wrap_indented(&m, "elephant grass", &f, 4.0, 10.0).unwrap();
        assert_eq!(lines, vec!["", "elephant", "grass"]);
        let lines = wrap_indented(&m, "an elephant", &f, 4.0, 10.0).unwrap();
        assert_eq!(lines, vec!["an", "elephant"]);
    }

    #[test]
    fn test_wrapper_is_restartable() {
        let m = mono();
        let f = font();
        let wrapper = LineWrapper::new(&m, "alpha beta gamma delta", &f, 11.0);
        let first: Vec<_> = wrapper.clone().map(Result::unwrap).collect();
        let second: Vec<_> = wrapper.map(Result::unwrap).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_no_line_exceeds_width_unless_single_token() {
        let measurer = FontMeasurer::new(Unit::Mm);
        let f = font();
        let text = "Demonstrates consistent problem-solving ability across algorithmic \
                    questions; supercalifragilisticexpialidocious outlier token included.";
        for width in [15.0, 30.0, 55.0, 120.0] {
            for line in measurer.wrap(text, &f, width).unwrap() {
                let w = measurer.measure(&line, &f).unwrap();
                assert!(
                    w <= width + 1e-6 || !line.contains(' '),
                    "{line:?} is {w} wide at limit {width}"
                );
            }
        }
    }

    #[test]
    fn test_font_measurer_converts_points_to_millimetres() {
        let f = font();
        let pt = FontMeasurer::new(Unit::Pt).measure("Hello", &f).unwrap();
        let mm = FontMeasurer::new(Unit::Mm).measure("Hello", &f).unwrap();
        assert!((pt * 25.4 / 72.0 - mm).abs() < 1e-9);
    }

    #[test]
    fn test_strict_measurer_fails_on_missing_glyphs() {
        let m = FontMeasurer::new(Unit::Mm).strict();
        let err = m.measure("score \u{1F600}", &font()).unwrap_err();
        assert!(err.reason.contains("no glyph"));
        let err = m.wrap("fine \u{1F600}", &font(), 100.0).unwrap_err();
        assert_eq!(err.text, "fine \u{1F600}");
    }
}
