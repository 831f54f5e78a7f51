//! Self-contained HTML report document.
//!
//! The document carries its own stylesheet and no scripts. Each chart block
//! holds a static bar list plus its points as a JSON island, so a downstream
//! rasterizer or browser can draw it either way.

use std::fmt::Write;

use crate::fmt;
use crate::report::{Cell, Chart, ChartKind, Content, Report, Row, Section, Table};

const STYLE: &str = "\
body{font-family:Helvetica,Arial,sans-serif;color:#212121;margin:32px;}\
header{border-bottom:2px solid #1976d2;margin-bottom:24px;padding-bottom:8px;}\
h1{margin:0 0 4px;font-size:24px;}\
h2{font-size:16px;margin:24px 0 8px;color:#1976d2;}\
.meta{color:#607d8b;font-size:12px;margin:2px 0;}\
table{border-collapse:collapse;width:100%;font-size:12px;}\
th,td{border-bottom:1px solid #e0e0e0;padding:6px 8px;text-align:left;}\
th{background:#f5f5f5;}\
td.num{text-align:right;}\
table.summary{width:auto;}\
table.summary th{background:none;font-weight:normal;color:#607d8b;}\
tr.tone-critical td{background:#ffebee;}\
tr.tone-warning td{background:#fff3e0;}\
tr.tone-caution td{background:#fffde7;}\
tr.tone-good td{background:#e8f5e9;}\
.chart{margin:8px 0;}\
.bar-row{display:flex;align-items:center;font-size:12px;margin:3px 0;}\
.bar-label{width:180px;}\
.bar-track{flex:1;background:#eceff1;height:12px;margin:0 8px;}\
.bar{display:block;height:12px;}\
.bar-value{width:120px;text-align:right;}\
ul.recommendations li{margin:4px 0;}\
.empty{color:#607d8b;font-style:italic;}";

/// Escape text for element content and double-quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Chart points as JSON that is safe inside a `<script>` element.
fn chart_json(chart: &Chart) -> String {
    let json = serde_json::to_string(&chart.points).unwrap_or_else(|_| "[]".to_string());
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn cell_td(cell: &Cell, currency: &str, style: Option<&str>) -> String {
    let class = if cell.is_numeric() { " class=\"num\"" } else { "" };
    let style = style
        .map(|s| format!(" style=\"{s}\""))
        .unwrap_or_default();
    format!("<td{class}{style}>{}</td>", escape(&cell.display(currency)))
}

fn summary_html(out: &mut String, items: &[(String, Cell)], currency: &str) {
    out.push_str("<table class=\"summary\">");
    for (label, cell) in items {
        let _ = write!(out, "<tr><th>{}</th>{}</tr>", escape(label), cell_td(cell, currency, None));
    }
    out.push_str("</table>\n");
}

fn row_html(row: &Row, currency: &str) -> String {
    let mut html = match row.tone {
        Some(tone) => format!("<tr class=\"{}\">", tone.class()),
        None => "<tr>".to_string(),
    };
    for (i, cell) in row.cells.iter().enumerate() {
        let marker = match (i, row.tone) {
            (0, Some(tone)) => Some(format!("border-left:4px solid {}", tone.color())),
            _ => None,
        };
        html.push_str(&cell_td(cell, currency, marker.as_deref()));
    }
    html.push_str("</tr>");
    html
}

fn table_html(out: &mut String, table: &Table, currency: &str) {
    out.push_str("<table class=\"data\"><thead><tr>");
    for h in &table.headers {
        let _ = write!(out, "<th>{}</th>", escape(h));
    }
    out.push_str("</tr></thead><tbody>");
    if table.rows.is_empty() {
        let _ = write!(
            out,
            "<tr><td class=\"empty\" colspan=\"{}\">No entries</td></tr>",
            table.headers.len().max(1)
        );
    }
    for row in &table.rows {
        out.push_str(&row_html(row, currency));
    }
    out.push_str("</tbody></table>\n");
}

fn chart_html(out: &mut String, chart: &Chart, currency: &str) {
    let _ = write!(out, "<div class=\"chart chart-{}\">", chart.kind.name());
    // Pie slices are listed by share of the whole, bars against the largest value.
    let scale = match chart.kind {
        ChartKind::Bar => chart.points.iter().map(|p| p.value).fold(0.0_f64, f64::max),
        ChartKind::Pie => chart.points.iter().map(|p| p.value.max(0.0)).sum(),
    };
    for point in &chart.points {
        let width = if scale > 0.0 {
            (point.value / scale * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let _ = write!(
            out,
            "<div class=\"bar-row\"><span class=\"bar-label\">{}</span>\
             <span class=\"bar-track\"><span class=\"bar\" style=\"width:{width:.1}%;background:{}\"></span></span>\
             <span class=\"bar-value\">{}</span></div>",
            escape(&point.label),
            escape(&point.color),
            escape(&chart.unit.cell(point.value).display(currency)),
        );
    }
    let _ = write!(
        out,
        "<script type=\"application/json\" class=\"chart-data\">{}</script></div>\n",
        chart_json(chart)
    );
}

fn recommendations_html(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("<p class=\"empty\">No recommendations for this period.</p>\n");
        return;
    }
    out.push_str("<ul class=\"recommendations\">");
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>\n");
}

fn section_html(out: &mut String, section: &Section, currency: &str) {
    let _ = write!(out, "<section><h2>{}</h2>\n", escape(&section.title));
    match &section.content {
        Content::Summary(items) => summary_html(out, items, currency),
        Content::Table(table) => table_html(out, table, currency),
        Content::Chart(chart) => chart_html(out, chart, currency),
        Content::Recommendations(items) => recommendations_html(out, items),
    }
    out.push_str("</section>\n");
}

/// Render `report` as a complete HTML document.
pub fn to_markup_document(report: &Report) -> String {
    let mut out = String::new();
    let title = escape(&report.title);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title}</title><style>{STYLE}</style></head>\n<body>\n<header><h1>{title}</h1>"
    );
    if !report.company.is_empty() {
        let _ = write!(out, "<p class=\"meta company\">{}</p>", escape(&report.company));
    }
    let _ = write!(
        out,
        "<p class=\"meta\">Period: {}</p><p class=\"meta\">Generated: {}</p></header>\n",
        escape(&report.period),
        fmt::timestamp(&report.generated_at)
    );
    for section in &report.sections {
        section_html(&mut out, section, &report.currency);
    }
    out.push_str("</body></html>\n");
    out
}
