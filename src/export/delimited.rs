//! Comma-separated spreadsheet export.
//!
//! Layout: a header block (title, company, period, generated), then one block
//! per report section. Each block opens with its title row and blocks are
//! separated by a single blank line. Fields are never quoted; separators,
//! quote characters and line breaks inside a field are replaced instead.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{Result, TallyError};
use crate::fmt;
use crate::report::{Content, Report, Section};

/// Make a field safe for an unquoted comma-separated row.
pub fn sanitize(field: &str) -> String {
    field
        .chars()
        .map(|c| match c {
            ',' => ';',
            '"' => '\'',
            '\r' | '\n' => ' ',
            c => c,
        })
        .collect()
}

fn write_block(rows: &[Vec<String>]) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);
    for row in rows {
        let fields: Vec<String> = row.iter().map(|f| sanitize(f)).collect();
        wtr.write_record(&fields)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| TallyError::Other(format!("CSV writer error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| TallyError::Other(format!("CSV encoding error: {e}")))
}

fn header_rows(report: &Report) -> Vec<Vec<String>> {
    let company = if report.company.is_empty() {
        "-".to_string()
    } else {
        report.company.clone()
    };
    vec![
        vec![report.title.clone()],
        vec!["Company".to_string(), company],
        vec!["Period".to_string(), report.period.clone()],
        vec!["Generated".to_string(), fmt::timestamp(&report.generated_at)],
        vec!["Currency".to_string(), report.currency.clone()],
    ]
}

fn section_rows(section: &Section) -> Vec<Vec<String>> {
    let mut rows = vec![vec![section.title.clone()]];
    match &section.content {
        Content::Summary(items) => {
            rows.extend(items.iter().map(|(label, cell)| vec![label.clone(), cell.plain()]));
        }
        Content::Table(table) => {
            rows.push(table.headers.clone());
            rows.extend(
                table
                    .rows
                    .iter()
                    .map(|row| row.cells.iter().map(|c| c.plain()).collect()),
            );
        }
        Content::Chart(chart) => {
            rows.push(vec!["Label".to_string(), "Value".to_string()]);
            rows.extend(
                chart
                    .points
                    .iter()
                    .map(|p| vec![p.label.clone(), chart.unit.cell(p.value).plain()]),
            );
        }
        Content::Recommendations(items) => {
            if items.is_empty() {
                rows.push(vec!["No recommendations for this period".to_string()]);
            }
            rows.extend(items.iter().map(|item| vec![item.clone()]));
        }
    }
    rows
}

/// Serialize `report` as comma-separated text.
pub fn to_delimited_text(report: &Report) -> Result<String> {
    let mut blocks = vec![write_block(&header_rows(report))?];
    for section in &report.sections {
        blocks.push(write_block(&section_rows(section))?);
    }
    Ok(blocks.join("\n"))
}
