//! PDF summary report for evidence bundles.
//!
//! Layout is in points on an A4 portrait page with the origin at the bottom
//! left. Page 1 is the cover, each decodable chart gets a page, and the row
//! excerpt follows on as many pages as it needs.

use std::io::BufWriter;

use image::DynamicImage;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};

use super::{ChartImage, ChartOutcome, EvidenceMetadata};
use crate::error::{Error, Result};
use crate::record::{EventRecord, COLUMNS};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const LEFT: f32 = 40.0;
const LAYER_NAME: &str = "content";

const CHART_MAX_HEIGHT: f32 = 400.0;
const CHART_TOP_GAP: f32 = 60.0;

const EXCERPT_COLUMNS: usize = 8;
const CELL_WIDTH: usize = 18;
const HEADER_WIDTH: usize = 200;
const SUMMARY_WRAP: usize = 110;

/// Vertical layout of the excerpt table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct ExcerptLayout {
    pub page_height: f32,
    /// Baseline of the column header line on the first excerpt page.
    pub header_top: f32,
    /// Gap between the header line and the first row.
    pub header_gap: f32,
    /// Gap between rows.
    pub pitch: f32,
    /// A new page starts once the cursor drops below this.
    pub bottom_margin: f32,
    /// Distance from the top where continuation pages start.
    pub continuation_top: f32,
}

impl Default for ExcerptLayout {
    fn default() -> Self {
        Self {
            page_height: PAGE_HEIGHT,
            header_top: 70.0,
            header_gap: 14.0,
            pitch: 12.0,
            bottom_margin: 60.0,
            continuation_top: 60.0,
        }
    }
}

/// A line of text positioned on an excerpt page.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PlacedLine {
    pub y: f32,
    pub text: String,
}

pub(super) struct ReportInput<'a> {
    pub organization: &'a str,
    pub metadata: &'a EvidenceMetadata,
    pub rows: &'a [EventRecord],
    pub charts: &'a [ChartImage],
    pub excerpt_rows: usize,
}

pub(super) struct RenderedReport {
    pub pdf: Vec<u8>,
    pub charts: Vec<ChartOutcome>,
    pub pages: usize,
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

/// Column header line for the excerpt.
pub(super) fn excerpt_header() -> String {
    truncate(&COLUMNS[..EXCERPT_COLUMNS].join(" | "), HEADER_WIDTH)
}

/// One excerpt row: first columns only, each cell truncated.
pub(super) fn excerpt_line(record: &EventRecord) -> String {
    record.cells()[..EXCERPT_COLUMNS]
        .iter()
        .map(|cell| truncate(cell, CELL_WIDTH))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Split the excerpt into pages of positioned lines.
///
/// The first page always holds the header line, so an empty selection still
/// yields one page.
pub(super) fn excerpt_pages(
    rows: &[EventRecord],
    limit: usize,
    layout: ExcerptLayout,
) -> Vec<Vec<PlacedLine>> {
    let mut y = layout.page_height - layout.header_top;
    let mut pages = vec![vec![PlacedLine {
        y,
        text: excerpt_header(),
    }]];
    y -= layout.header_gap;

    let shown = &rows[..rows.len().min(limit)];
    for (index, record) in shown.iter().enumerate() {
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine {
                y,
                text: excerpt_line(record),
            });
        }
        y -= layout.pitch;
        if y < layout.bottom_margin && index + 1 < shown.len() {
            pages.push(Vec::new());
            y = layout.page_height - layout.continuation_top;
        }
    }
    pages
}

/// Greedy word wrap to at most `width` characters per line.
pub(super) fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn summary_text(rows: usize) -> String {
    format!(
        "This evidence package contains {rows} event rows selected from the Mission Control \
         dashboard to support an Engineering Authorization."
    )
}

struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
}

impl Canvas {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::report(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::report(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
    }

    fn text(&self, text: &str, size: f32, y: f32) {
        self.layer
            .use_text(text, size, mm(LEFT), mm(y), &self.regular);
    }

    fn heading(&self, text: &str, size: f32, y: f32) {
        self.layer.use_text(text, size, mm(LEFT), mm(y), &self.bold);
    }

    fn image(&self, decoded: &DynamicImage) {
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        #[allow(clippy::cast_precision_loss)]
        let (px_width, px_height) = (rgb.width().max(1) as f32, rgb.height().max(1) as f32);

        // Fit inside the content box, keeping the aspect ratio
        let max_width = PAGE_WIDTH - 2.0 * LEFT;
        let dpi = (px_width * 72.0 / max_width).max(px_height * 72.0 / CHART_MAX_HEIGHT);
        let drawn_height = px_height * 72.0 / dpi;

        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(mm(LEFT)),
                translate_y: Some(mm(PAGE_HEIGHT - CHART_TOP_GAP - drawn_height)),
                dpi: Some(dpi),
                ..ImageTransform::default()
            },
        );
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut writer = BufWriter::new(Vec::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| Error::report(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

fn cover_page(canvas: &Canvas, input: &ReportInput<'_>) {
    let meta = input.metadata;
    let top = PAGE_HEIGHT;
    canvas.heading(
        &format!("{} - Compliance Evidence", input.organization),
        16.0,
        top - 50.0,
    );
    canvas.text(&format!("Evidence ID: {}", meta.evidence_id), 10.0, top - 70.0);
    canvas.text(&format!("Title: {}", meta.title), 10.0, top - 85.0);
    canvas.text(
        &format!("Created by: {}    Priority: {}", meta.created_by, meta.priority),
        10.0,
        top - 100.0,
    );
    canvas.text(&format!("Created on: {}", meta.created_on), 10.0, top - 115.0);
    canvas.heading("Executive Summary", 12.0, top - 140.0);

    let mut y = top - 155.0;
    for line in wrap_words(&summary_text(meta.rows), SUMMARY_WRAP) {
        canvas.text(&line, 9.0, y);
        y -= 11.0;
    }
}

/// Render the report. Charts that fail to decode are skipped.
pub(super) fn render(input: &ReportInput<'_>) -> Result<RenderedReport> {
    let mut canvas = Canvas::new(&format!("Evidence {}", input.metadata.evidence_id))?;
    cover_page(&canvas, input);

    let mut outcomes = Vec::with_capacity(input.charts.len());
    for chart in input.charts {
        match image::load_from_memory(&chart.bytes) {
            Ok(decoded) => {
                canvas.new_page();
                canvas.heading(&chart.label, 12.0, PAGE_HEIGHT - 50.0);
                canvas.image(&decoded);
                outcomes.push(ChartOutcome::Embedded {
                    label: chart.label.clone(),
                });
            }
            Err(e) => outcomes.push(ChartOutcome::Skipped {
                label: chart.label.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let excerpt = excerpt_pages(input.rows, input.excerpt_rows, ExcerptLayout::default());
    for (index, page) in excerpt.iter().enumerate() {
        canvas.new_page();
        if index == 0 {
            canvas.heading(
                &format!("Selected Events (first {} rows)", input.excerpt_rows),
                12.0,
                PAGE_HEIGHT - 50.0,
            );
        }
        for line in page {
            canvas.text(&line.text, 8.0, line.y);
        }
    }

    let pages = canvas.pages;
    let pdf = canvas.finish()?;
    Ok(RenderedReport {
        pdf,
        charts: outcomes,
        pages,
    })
}
