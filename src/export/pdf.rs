use std::io::BufWriter;

use printpdf::*;

use crate::error::{Result, TallyError};
use crate::fmt;
use crate::report::{Cell, Chart, Content, Report, Table};

// US Letter dimensions (mm)
const PAGE_W: f32 = 215.9;
const PAGE_H: f32 = 279.4;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 25.4;
const MARGIN_LEFT: f32 = 19.05;
const MARGIN_RIGHT: f32 = 19.05;
const CONTENT_W: f32 = PAGE_W - MARGIN_LEFT - MARGIN_RIGHT;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 10.0;
const SMALL_FONT_SIZE: f32 = 7.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;
const WRAP_WIDTH: usize = 95;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| TallyError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| TallyError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc
            .get_page(self.current_page)
            .get_layer(self.current_layer)
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer().use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self.layer();
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, report: &Report) {
        self.text(&report.title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        if !report.company.is_empty() {
            self.text(&report.company, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        self.text(&report.period, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 5.0;
        let ts = format!("Generated {}", fmt::timestamp(&report.generated_at));
        self.text(&ts, MARGIN_LEFT, 8.0, false);
        self.y += 5.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 5.0;
    }

    fn cells(&mut self, cols: &[Col], values: &[String], size: f32, bold: bool) {
        let mut x = MARGIN_LEFT;
        for (col, value) in cols.iter().zip(values) {
            match col.align {
                Align::Left => self.text(value, x, size, bold),
                Align::Right => {
                    let tw = approx_text_width(value, size);
                    self.text(value, x + col.width - tw, size, bold);
                }
            }
            x += col.width;
        }
    }

    fn table_header(&mut self, cols: &[Col], headers: &[String], size: f32) {
        self.ensure_space(ROW_H * 2.0);
        self.cells(cols, headers, size, true);
        self.y += ROW_H;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[String], size: f32, bold: bool) {
        self.ensure_space(ROW_H);
        self.cells(cols, values, size, bold);
        self.y += ROW_H;
    }

    fn section_label(&mut self, label: &str) {
        self.ensure_space(ROW_H * 3.0);
        self.text(label, MARGIN_LEFT, FONT_SIZE + 1.0, true);
        self.y += ROW_H + 1.0;
    }

    fn line(&mut self, s: &str) {
        self.ensure_space(ROW_H);
        self.text(s, MARGIN_LEFT, FONT_SIZE, false);
        self.y += ROW_H;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| TallyError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| TallyError::Pdf(e.to_string()))
    }
}

fn label_value_cols() -> [Col; 2] {
    [
        Col { width: 110.0, align: Align::Left },
        Col { width: CONTENT_W - 110.0, align: Align::Right },
    ]
}

/// Evenly split columns; numeric columns right-aligned by their first row.
fn table_cols(table: &Table) -> Vec<Col> {
    let n = table.headers.len().max(1);
    let width = CONTENT_W / n as f32;
    (0..n)
        .map(|i| {
            let numeric = table
                .rows
                .first()
                .and_then(|r| r.cells.get(i))
                .is_some_and(Cell::is_numeric);
            Col {
                width,
                align: if numeric { Align::Right } else { Align::Left },
            }
        })
        .collect()
}

fn render_table(pdf: &mut PdfWriter, table: &Table, currency: &str) {
    let cols = table_cols(table);
    let size = if cols.len() > 6 { SMALL_FONT_SIZE } else { FONT_SIZE };
    pdf.table_header(&cols, &table.headers, size);
    if table.rows.is_empty() {
        pdf.line("No entries");
    }
    for row in &table.rows {
        let values: Vec<String> = row.cells.iter().map(|c| c.display(currency)).collect();
        pdf.table_row(&cols, &values, size, false);
    }
}

fn render_chart(pdf: &mut PdfWriter, chart: &Chart, currency: &str) {
    let cols = label_value_cols();
    if chart.points.is_empty() {
        pdf.line("No data");
    }
    for point in &chart.points {
        let values = [point.label.clone(), chart.unit.cell(point.value).display(currency)];
        pdf.table_row(&cols, &values, FONT_SIZE, false);
    }
}

fn render_recommendations(pdf: &mut PdfWriter, items: &[String]) {
    if items.is_empty() {
        pdf.line("No recommendations for this period.");
    }
    for item in items {
        for (i, line) in textwrap::wrap(item, WRAP_WIDTH).iter().enumerate() {
            let prefix = if i == 0 { "- " } else { "  " };
            pdf.line(&format!("{prefix}{line}"));
        }
    }
}

/// Render `report` as a paginated Letter-size PDF.
pub fn render(report: &Report) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new(&report.title)?;
    pdf.header(report);

    for section in &report.sections {
        pdf.section_label(&section.title);
        match &section.content {
            Content::Summary(items) => {
                let cols = label_value_cols();
                for (label, cell) in items {
                    let values = [label.clone(), cell.display(&report.currency)];
                    pdf.table_row(&cols, &values, FONT_SIZE, false);
                }
            }
            Content::Table(table) => render_table(&mut pdf, table, &report.currency),
            Content::Chart(chart) => render_chart(&mut pdf, chart, &report.currency),
            Content::Recommendations(items) => render_recommendations(&mut pdf, items),
        }
        pdf.blank_row();
    }

    pdf.to_bytes()
}
