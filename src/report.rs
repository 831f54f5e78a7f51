//! Format-neutral report model.
//!
//! Domain calculators lay their insights out as a [`Report`]; the terminal
//! view and every exporter walk the same structure, so a figure can only be
//! formatted one way per output.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::engine::ReportKind;
use crate::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Critical,
    Warning,
    Caution,
    Good,
    Neutral,
}

impl Tone {
    pub fn color(&self) -> &'static str {
        match self {
            Self::Critical => "#d32f2f",
            Self::Warning => "#f57c00",
            Self::Caution => "#fbc02d",
            Self::Good => "#388e3c",
            Self::Neutral => "#607d8b",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::Critical => "tone-critical",
            Self::Warning => "tone-warning",
            Self::Caution => "tone-caution",
            Self::Good => "tone-good",
            Self::Neutral => "tone-neutral",
        }
    }
}

const PALETTE: [&str; 8] = [
    "#1976d2", "#388e3c", "#f57c00", "#7b1fa2", "#0097a7", "#c2185b", "#5d4037", "#607d8b",
];

/// Series color for the `i`th chart slice, cycling.
pub fn palette(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Money(f64),
    Percent(f64),
    Trend(f64),
    Count(u64),
    Days(i64),
    Ratio(f64),
    Date(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Human-facing rendering shared by the terminal view, markup and PDF.
    pub fn display(&self, currency: &str) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Money(v) => fmt::money(currency, *v),
            Self::Percent(v) => fmt::percent(*v),
            Self::Trend(v) => fmt::trend(*v),
            Self::Count(n) => fmt::count(*n),
            Self::Days(d) => match *d {
                d if d < 0 => "Expired".to_string(),
                0 => "Today".to_string(),
                1 => "1 day".to_string(),
                d => format!("{d} days"),
            },
            Self::Ratio(v) => fmt::ratio(*v),
            Self::Date(s) => fmt::date_label(s),
        }
    }

    /// Spreadsheet rendering: bare numbers, same rounding as [`Cell::display`].
    pub fn plain(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Money(v) => fmt::money_plain(*v),
            Self::Percent(v) => fmt::percent(*v),
            Self::Trend(v) => fmt::trend(*v),
            Self::Count(n) => n.to_string(),
            Self::Days(d) => d.to_string(),
            Self::Ratio(v) => fmt::ratio(*v),
            Self::Date(s) => fmt::date_label(s),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_) | Self::Date(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub tone: Option<Tone>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells, tone: None }
    }

    pub fn toned(cells: Vec<Cell>, tone: Tone) -> Self {
        Self {
            cells,
            tone: Some(tone),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Pie => "pie",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueUnit {
    Money,
    Percent,
}

impl ValueUnit {
    pub fn cell(&self, value: f64) -> Cell {
        match self {
            Self::Money => Cell::Money(value),
            Self::Percent => Cell::Percent(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub color: String,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64, color: &str) -> Self {
        Self {
            label: label.into(),
            value,
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub unit: ValueUnit,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Summary(Vec<(String, Cell)>),
    Table(Table),
    Chart(Chart),
    Recommendations(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub content: Content,
}

impl Section {
    pub fn summary(title: &str, items: Vec<(&str, Cell)>) -> Self {
        Self {
            title: title.to_string(),
            content: Content::Summary(
                items
                    .into_iter()
                    .map(|(label, cell)| (label.to_string(), cell))
                    .collect(),
            ),
        }
    }

    pub fn table(title: &str, headers: &[&str], rows: Vec<Row>) -> Self {
        Self {
            title: title.to_string(),
            content: Content::Table(Table {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows,
            }),
        }
    }

    pub fn chart(title: &str, kind: ChartKind, unit: ValueUnit, points: Vec<ChartPoint>) -> Self {
        Self {
            title: title.to_string(),
            content: Content::Chart(Chart { kind, unit, points }),
        }
    }

    pub fn recommendations(items: Vec<String>) -> Self {
        Self {
            title: "Recommendations".to_string(),
            content: Content::Recommendations(items),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub company: String,
    pub period: String,
    pub generated_at: NaiveDateTime,
    pub currency: String,
    pub sections: Vec<Section>,
}
