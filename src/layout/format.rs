//! # Field Formatting
//!
//! Turns one [`Field`] into display lines for a given width. Each line is a
//! list of runs with horizontal offsets, because a key/value line mixes a
//! bold label with a regular value and list items hang their continuation
//! lines under the item text rather than under the marker.

use serde::Serialize;

use crate::error::MeasureError;
use crate::model::{Field, ListMarker};
use crate::style::FontSpec;
use crate::text::{wrap_indented, TextMeasurer};

/// A piece of a line drawn in one font weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRun {
    pub text: String,
    /// Horizontal offset from the card's inner left edge.
    pub offset: f64,
    pub bold: bool,
}

/// One formatted display line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FormattedLine {
    Text(Vec<LineRun>),
    /// A half-height spacer produced by an empty label.
    Blank,
}

impl FormattedLine {
    fn plain(text: String, offset: f64, bold: bool) -> Self {
        FormattedLine::Text(vec![LineRun { text, offset, bold }])
    }

    /// The concatenated text of every run.
    pub fn text(&self) -> String {
        match self {
            FormattedLine::Text(runs) => runs.iter().map(|r| r.text.as_str()).collect(),
            FormattedLine::Blank => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, FormattedLine::Blank)
    }
}

/// Formats fields against a measurer and the card's body and label fonts.
pub struct FieldFormatter<'a> {
    measurer: &'a dyn TextMeasurer,
    body: &'a FontSpec,
    strong: &'a FontSpec,
}

impl<'a> FieldFormatter<'a> {
    pub fn new(measurer: &'a dyn TextMeasurer, body: &'a FontSpec, strong: &'a FontSpec) -> Self {
        Self {
            measurer,
            body,
            strong,
        }
    }

    pub fn font(&self, bold: bool) -> &'a FontSpec {
        if bold {
            self.strong
        } else {
            self.body
        }
    }

    pub fn format(&self, field: &Field, max_width: f64) -> Result<Vec<FormattedLine>, MeasureError> {
        match field {
            field if field.is_spacer() => Ok(vec![FormattedLine::Blank]),
            Field::Label { text } => self.plain(text, max_width, true),
            Field::Paragraph { text } => self.plain(text, max_width, false),
            Field::KeyValue { label, value } => self.key_value(label, value, max_width),
            Field::BulletList { items, marker } => self.list(items, *marker, max_width),
        }
    }

    fn plain(&self, text: &str, max_width: f64, bold: bool) -> Result<Vec<FormattedLine>, MeasureError> {
        Ok(self
            .measurer
            .wrap(text, self.font(bold), max_width)?
            .into_iter()
            .map(|line| FormattedLine::plain(line, 0.0, bold))
            .collect())
    }

    fn key_value(
        &self,
        label: &str,
        value: &str,
        max_width: f64,
    ) -> Result<Vec<FormattedLine>, MeasureError> {
        let prefix = format!("{label}: ");
        let prefix_width = self.measurer.measure(&prefix, self.strong)?;

        if prefix_width > max_width {
            // The label alone overflows: wrap it, then start the value below.
            let mut lines = self.plain(&format!("{label}:"), max_width, true)?;
            lines.extend(self.plain(value, max_width, false)?);
            return Ok(lines);
        }

        let value_lines = wrap_indented(
            self.measurer,
            value,
            self.body,
            max_width - prefix_width,
            max_width,
        )?;
        let mut value_lines = value_lines.into_iter();

        let mut first = vec![LineRun {
            text: prefix.trim_end().to_string(),
            offset: 0.0,
            bold: true,
        }];
        if let Some(head) = value_lines.next().filter(|l| !l.is_empty()) {
            first[0].text = prefix;
            first.push(LineRun {
                text: head,
                offset: prefix_width,
                bold: false,
            });
        }

        let mut lines = vec![FormattedLine::Text(first)];
        lines.extend(value_lines.map(|line| FormattedLine::plain(line, 0.0, false)));
        Ok(lines)
    }

    fn list(
        &self,
        items: &[String],
        marker: ListMarker,
        max_width: f64,
    ) -> Result<Vec<FormattedLine>, MeasureError> {
        let mut lines = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let prefix = marker.prefix(index);
            let indent = self.measurer.measure(&prefix, self.body)?;
            // A marker wider than the card leaves nothing to hang text under.
            let indent = if indent < max_width { indent } else { 0.0 };
            let item_lines = self.measurer.wrap(item, self.body, max_width - indent)?;

            let mut item_lines = item_lines.into_iter();
            let mut first = vec![LineRun {
                text: prefix.trim_end().to_string(),
                offset: 0.0,
                bold: false,
            }];
            if let Some(head) = item_lines.next() {
                first[0].text = prefix;
                first.push(LineRun {
                    text: head,
                    offset: indent,
                    bold: false,
                });
            }
            lines.push(FormattedLine::Text(first));
            lines.extend(item_lines.map(|line| FormattedLine::plain(line, indent, false)));
        }
        Ok(lines)
    }
}
