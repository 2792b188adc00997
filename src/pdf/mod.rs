//! # PDF Serializer
//!
//! Takes the paginated pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Reports only need filled and
//! stroked rectangles, rules and single-line text in the standard Type1
//! faces, so the subset of the format involved is small: no embedding, no
//! subsetting, WinAnsi-encoded strings.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Pages come in document units with a top-left origin. PDF user space is
//! points with a bottom-left origin, so every coordinate is scaled and Y is
//! flipped on the way out.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::{encode_winansi, FontContext, StandardFont};
use crate::layout::{DrawOp, Page, TextLine};
use crate::model::{Metadata, Unit};
use crate::style::{Color, FontSpec};

pub struct PdfWriter {
    /// Points per document unit.
    scale: f64,
    fonts: FontContext,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Faces in use, in resource order: `/F0`, `/F1`, ...
    font_objects: Vec<(StandardFont, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfWriter {
    pub fn new(unit: Unit) -> Self {
        Self {
            scale: 1.0 / unit.per_point(),
            fonts: FontContext::new(),
        }
    }

    /// Write paginated pages to a PDF byte vector.
    pub fn write(&self, pages: &[Page], metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then content streams and page objects
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: vec![] });
        }

        self.register_fonts(&mut builder, pages);
        let font_resources = Self::build_font_resource_dict(&builder.font_objects);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages {
            let content = self.build_content_stream(page, &builder.font_objects);
            let compressed = compress_to_vec_zlib(&content, 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width * self.scale,
                page.height * self.scale,
                content_obj_id,
                font_resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = self.write_info(&mut builder, metadata);
        Self::serialize(&builder, info_obj_id)
    }

    /// Info dictionary, when there is any metadata to record.
    fn write_info(&self, builder: &mut PdfBuilder, metadata: &Metadata) -> Option<usize> {
        if metadata.title.is_none() && metadata.author.is_none() && metadata.subject.is_none() {
            return None;
        }
        let mut info: Vec<u8> = b"<< ".to_vec();
        for (key, value) in [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
        ] {
            if let Some(value) = value {
                let _ = write!(info, "/{} (", key);
                info.extend_from_slice(&Self::encode_pdf_string(value));
                info.extend_from_slice(b") ");
            }
        }
        info.extend_from_slice(b"/Producer (reportflow) >>");
        let id = builder.objects.len();
        builder.objects.push(PdfObject { data: info });
        Some(id)
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &Page, font_objects: &[(StandardFont, usize)]) -> Vec<u8> {
        let mut stream = String::new();
        let mut bytes: Vec<u8> = Vec::new();
        let page_height = page.height;

        for op in &page.draw_ops {
            match op {
                DrawOp::FilledRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    if color.a <= 0.0 {
                        continue;
                    }
                    let (px, py, pw, ph) = self.rect(*x, *y, *width, *height, page_height);
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        color.r, color.g, color.b, px, py, pw, ph
                    );
                }
                DrawOp::StrokedRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                    line_width,
                } => {
                    if *line_width <= 0.0 {
                        continue;
                    }
                    let (px, py, pw, ph) = self.rect(*x, *y, *width, *height, page_height);
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        color.r,
                        color.g,
                        color.b,
                        line_width * self.scale,
                        px,
                        py,
                        pw,
                        ph
                    );
                }
                DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                    line_width,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        color.r,
                        color.g,
                        color.b,
                        line_width * self.scale,
                        x1 * self.scale,
                        (page_height - y1) * self.scale,
                        x2 * self.scale,
                        (page_height - y2) * self.scale
                    );
                }
                DrawOp::TextLine(line) => {
                    // Text carries raw WinAnsi bytes, so flush what we have.
                    bytes.extend_from_slice(stream.as_bytes());
                    stream.clear();
                    self.write_text(&mut bytes, line, page_height, font_objects);
                }
            }
        }
        bytes.extend_from_slice(stream.as_bytes());
        bytes
    }

    fn write_text(
        &self,
        out: &mut Vec<u8>,
        line: &TextLine,
        page_height: f64,
        font_objects: &[(StandardFont, usize)],
    ) {
        if line.text.is_empty() {
            return;
        }
        let Color { r, g, b, .. } = line.color;
        let _ = write!(
            out,
            "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n(",
            r,
            g,
            b,
            self.font_index(&line.font, font_objects),
            line.font.size,
            line.x * self.scale,
            (page_height - line.y) * self.scale
        );
        out.extend_from_slice(&Self::encode_pdf_string(&line.text));
        out.extend_from_slice(b") Tj\nET\n");
    }

    /// Scale a top-left rectangle and flip it into PDF user space.
    fn rect(&self, x: f64, y: f64, w: f64, h: f64, page_height: f64) -> (f64, f64, f64, f64) {
        (
            x * self.scale,
            (page_height - y - h) * self.scale,
            w * self.scale,
            h * self.scale,
        )
    }

    /// Register the faces used across all pages. Helvetica is always present
    /// so `/F0` resolves even for a page with no text.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[Page]) {
        let mut used = vec![StandardFont::Helvetica];
        for page in pages {
            for line in page.text_lines() {
                used.push(self.fonts.resolve(&line.font.family, line.font.weight()));
            }
        }

        for face in StandardFont::ALL {
            if !used.contains(&face) {
                continue;
            }
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                face.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push((face, obj_id));
        }
    }

    fn build_font_resource_dict(font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resource index (/F0, /F1, ...) for a font spec.
    fn font_index(&self, font: &FontSpec, font_objects: &[(StandardFont, usize)]) -> usize {
        let face = self.fonts.resolve(&font.family, font.weight());
        font_objects
            .iter()
            .position(|(f, _)| *f == face)
            .unwrap_or(0)
    }

    /// WinAnsi-encode and escape text for a PDF literal string.
    /// Characters outside WinAnsi become `?`.
    fn encode_pdf_string(s: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(s.len());
        for ch in s.chars() {
            let byte = encode_winansi(ch).unwrap_or(b'?');
            if matches!(byte, b'\\' | b'(' | b')') {
                out.push(b'\\');
            }
            out.push(byte);
        }
        out
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len());
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}
