use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};
use tracing::{debug, info, warn};

use crate::domain::TrackerError;
use crate::table::Table;

// US Letter in points
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const PAGE_MARGIN: f32 = 30.0;
pub const COLUMN_SPACING: f32 = 100.0;
pub const LINE_HEIGHT: f32 = 20.0;
pub const FONT_SIZE: f32 = 12.0;

pub const TOP_TITLE: &str = "Top Table Data";
pub const BOTTOM_TITLE: &str = "Bottom Table Data";

/// Writes both tables as one delimited text: top header and rows,
/// an empty line, bottom header and rows. Lines end in CRLF.
pub fn write_delimited<W: Write>(out: &mut W, top: &Table, bottom: &Table) -> Result<(), TrackerError> {
    write_block(&mut *out, top)?;
    // csv refuses empty records, the separator goes straight to the sink
    out.write_all(b"\r\n")?;
    write_block(&mut *out, bottom)?;
    Ok(())
}

// One writer per block, the blocks differ in field count.
fn write_block<W: Write>(out: W, table: &Table) -> Result<(), TrackerError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);
    writer.write_record(table.columns())?;
    for record in table.records() {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// One record as a single delimited line, without terminator.
pub fn record_line(record: &[String]) -> Result<String, TrackerError> {
    let mut out = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut out);
        writer.write_record(record)?;
        writer.flush()?;
    }
    Ok(String::from_utf8_lossy(&out).trim_end_matches('\n').to_string())
}

pub fn export_delimited(path: &Path, top: &Table, bottom: &Table) -> Result<(), TrackerError> {
    let start_time = Instant::now();
    let mut out = BufWriter::new(File::create(path)?);
    write_delimited(&mut out, top, bottom)?;
    out.flush()?;
    info!(
        "Wrote {} + {} rows to {} in {}ms",
        top.len(),
        bottom.len(),
        path.display(),
        start_time.elapsed().as_millis()
    );
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Text fragments and their page coordinates (points, origin bottom left).
#[derive(Debug, Default)]
pub struct PositionalLayout {
    pub items: Vec<PlacedText>,
}

impl PositionalLayout {
    /// Everything goes on one page. There is no page break, rows that do
    /// not fit end up below the bottom edge.
    pub fn build(top: &Table, bottom: &Table) -> Self {
        let mut layout = PositionalLayout::default();

        layout.place(PAGE_MARGIN, PAGE_HEIGHT - PAGE_MARGIN, TOP_TITLE);
        let mut cursor = PAGE_HEIGHT - 50.0;
        cursor = layout.place_table(top, cursor);

        layout.place(PAGE_MARGIN, cursor - 30.0, BOTTOM_TITLE);
        cursor -= 50.0;
        layout.place_table(bottom, cursor);

        layout
    }

    fn place(&mut self, x: f32, y: f32, text: &str) {
        self.items.push(PlacedText {
            x,
            y,
            text: text.to_string(),
        });
    }

    // Header row first, then the records. Returns the cursor below the last row.
    fn place_table(&mut self, table: &Table, mut cursor: f32) -> f32 {
        let rows = std::iter::once(table.columns()).chain(table.records().iter().map(|r| r.as_slice()));
        for row in rows {
            let mut x = PAGE_MARGIN;
            for value in row {
                self.place(x, cursor, value);
                x += COLUMN_SPACING;
            }
            cursor -= LINE_HEIGHT;
        }
        cursor
    }

    pub fn overflows(&self) -> bool {
        self.items.iter().any(|i| i.y < 0.0)
    }
}

pub fn export_positional(path: &Path, top: &Table, bottom: &Table) -> Result<(), TrackerError> {
    let start_time = Instant::now();
    let layout = PositionalLayout::build(top, bottom);
    if layout.overflows() {
        warn!(
            "Report content runs past the bottom of the page ({} + {} rows)",
            top.len(),
            bottom.len()
        );
    }

    let (doc, page, layer) = PdfDocument::new(
        "Expense Invoice Tracker",
        Mm::from(Pt(PAGE_WIDTH)),
        Mm::from(Pt(PAGE_HEIGHT)),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let canvas = doc.get_page(page).get_layer(layer);
    for item in layout.items.iter() {
        canvas.use_text(
            item.text.clone(),
            FONT_SIZE,
            Mm::from(Pt(item.x)),
            Mm::from(Pt(item.y)),
            &font,
        );
    }
    debug!("Placed {} text items", layout.items.len());

    doc.save(&mut BufWriter::new(File::create(path)?))?;
    info!(
        "Wrote {} in {}ms",
        path.display(),
        start_time.elapsed().as_millis()
    );
    Ok(())
}
