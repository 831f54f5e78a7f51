use colored::{ColoredString, Colorize};
use comfy_table::{Cell as TableCell, CellAlignment, Table as TermTable};

use crate::cli::{context, load_report};
use crate::engine::ReportKind;
use crate::error::Result;
use crate::fmt;
use crate::report::{Cell, Chart, ChartKind, Content, Report, Table, Tone};
use crate::settings::load_settings;

const BAR_WIDTH: usize = 30;

pub fn run(kind: ReportKind, input: &str, period: Option<String>) -> Result<()> {
    let settings = load_settings();
    let ctx = context(&settings, period);
    let report = load_report(kind, input, &ctx)?;
    print!("{}", format_report(&report));
    Ok(())
}

fn toned(text: &str, tone: Option<Tone>) -> ColoredString {
    match tone {
        Some(Tone::Critical) => text.red().bold(),
        Some(Tone::Warning) => text.yellow().bold(),
        Some(Tone::Caution) => text.yellow(),
        Some(Tone::Good) => text.green(),
        Some(Tone::Neutral) => text.dimmed(),
        None => text.normal(),
    }
}

fn term_cell(cell: &Cell, currency: &str, tone: Option<Tone>) -> TableCell {
    let shown = TableCell::new(toned(&cell.display(currency), tone));
    if cell.is_numeric() {
        shown.set_alignment(CellAlignment::Right)
    } else {
        shown
    }
}

fn format_summary(items: &[(String, Cell)], currency: &str) -> String {
    let mut table = TermTable::new();
    for (label, cell) in items {
        table.add_row(vec![TableCell::new(label), term_cell(cell, currency, None)]);
    }
    table.to_string()
}

fn format_table(data: &Table, currency: &str) -> String {
    if data.rows.is_empty() {
        return "No entries".dimmed().to_string();
    }
    let mut table = TermTable::new();
    table.set_header(data.headers.clone());
    for row in &data.rows {
        table.add_row(
            row.cells
                .iter()
                .map(|c| term_cell(c, currency, row.tone))
                .collect::<Vec<_>>(),
        );
    }
    table.to_string()
}

fn format_chart(chart: &Chart, currency: &str) -> String {
    if chart.points.is_empty() {
        return "No data".dimmed().to_string();
    }
    let scale = match chart.kind {
        ChartKind::Bar => chart.points.iter().map(|p| p.value).fold(0.0_f64, f64::max),
        ChartKind::Pie => chart.points.iter().map(|p| p.value.max(0.0)).sum(),
    };
    let mut table = TermTable::new();
    for point in &chart.points {
        let len = if scale > 0.0 {
            ((point.value / scale).clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        table.add_row(vec![
            TableCell::new(&point.label),
            TableCell::new("█".repeat(len).as_str().cyan()),
            term_cell(&chart.unit.cell(point.value), currency, None),
        ]);
    }
    table.to_string()
}

fn format_recommendations(items: &[String]) -> String {
    if items.is_empty() {
        return "No recommendations for this period.".dimmed().to_string();
    }
    items
        .iter()
        .map(|item| {
            let options = textwrap::Options::new(90).subsequent_indent("    ");
            let wrapped = textwrap::fill(item, options);
            format!("  • {wrapped}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_report(report: &Report) -> String {
    let mut out = String::new();
    if !report.company.is_empty() {
        out.push_str(&format!("{}\n", report.company));
    }
    out.push_str(&format!("{}\n", report.title.as_str().bold()));
    out.push_str(&format!(
        "Period: {}   Generated: {}\n",
        report.period,
        fmt::timestamp(&report.generated_at)
    ));
    for section in &report.sections {
        out.push_str(&format!("\n{}\n", section.title.to_uppercase().as_str().bold()));
        let body = match &section.content {
            Content::Summary(items) => format_summary(items, &report.currency),
            Content::Table(table) => format_table(table, &report.currency),
            Content::Chart(chart) => format_chart(chart, &report.currency),
            Content::Recommendations(items) => format_recommendations(items),
        };
        out.push_str(&body);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{build_from_json, ReportContext};

    #[test]
    fn test_format_report_uses_shared_rounding() {
        colored::control::set_override(false);
        let at = chrono::NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let ctx = ReportContext::new(at, "KES");
        let json = r#"{"commissions": [
            {"rep_name": "Wanjiku", "total_sales": 1234567.6, "commission_amount": 61728.4, "commission_rate": 5}
        ]}"#;
        let report = build_from_json(ReportKind::Commission, json, &ctx).unwrap();
        let out = format_report(&report);
        assert!(out.contains("Commission Report"));
        assert!(out.contains("KES 61,728"));
        assert!(out.contains("Wanjiku"));
        assert!(out.contains("RECOMMENDATIONS"));
    }

    #[test]
    fn test_empty_table_and_recommendations() {
        colored::control::set_override(false);
        let table = Table {
            headers: vec!["A".to_string()],
            rows: vec![],
        };
        assert_eq!(format_table(&table, "KES"), "No entries");
        assert_eq!(format_recommendations(&[]), "No recommendations for this period.");
    }
}
