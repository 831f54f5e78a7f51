use std::fmt;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domains::{commission, daily, inventory, products, reps, sales};
use crate::error::{Result, TallyError};
use crate::recommend::{self, Rule};
use crate::report::{Report, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    Inventory,
    Sales,
    Commission,
    DailySales,
    TopProducts,
    TopSalesReps,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        Self::Inventory,
        Self::Sales,
        Self::Commission,
        Self::DailySales,
        Self::TopProducts,
        Self::TopSalesReps,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Sales => "sales",
            Self::Commission => "commission",
            Self::DailySales => "daily-sales",
            Self::TopProducts => "top-products",
            Self::TopSalesReps => "top-sales-reps",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Inventory => "Inventory Report",
            Self::Sales => "Sales Report",
            Self::Commission => "Commission Report",
            Self::DailySales => "Daily Sales Report",
            Self::TopProducts => "Top Products Report",
            Self::TopSalesReps => "Top Sales Reps Report",
        }
    }

    /// Export file names start with this.
    pub fn file_prefix(&self) -> String {
        format!("{}-report", self.key())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-domain schema: payload shape, calculator, rules and layout.
pub trait ReportDomain {
    type Payload: DeserializeOwned;
    type Insights;

    const KIND: ReportKind;

    /// `None` when there is no payload to derive from.
    fn compute(payload: Option<&Self::Payload>) -> Option<Self::Insights>;

    fn rules() -> Vec<Rule<Self::Insights>>;

    fn sections(payload: &Self::Payload, insights: &Self::Insights) -> Vec<Section>;

    /// Reporting period carried by the payload itself, if any.
    fn period_hint(_payload: &Self::Payload) -> Option<String> {
        None
    }
}

/// Everything a report needs besides the payload. Captured once per export
/// so repeated renders of the same report are byte-identical.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub period: Option<String>,
    pub generated_at: NaiveDateTime,
    pub currency: String,
    pub company: String,
}

impl ReportContext {
    pub fn new(generated_at: NaiveDateTime, currency: &str) -> Self {
        Self {
            period: None,
            generated_at,
            currency: currency.to_string(),
            company: String::new(),
        }
    }
}

pub fn recommendations<D: ReportDomain>(insights: &D::Insights) -> Vec<String> {
    recommend::assemble(&D::rules(), insights)
}

pub fn build<D: ReportDomain>(payload: Option<&D::Payload>, ctx: &ReportContext) -> Result<Report> {
    let Some(payload) = payload else {
        warn!(kind = %D::KIND, "no payload supplied");
        return Err(TallyError::NothingToExport(D::KIND));
    };
    let insights = D::compute(Some(payload)).ok_or(TallyError::NothingToExport(D::KIND))?;

    let recs = recommendations::<D>(&insights);
    let rec_count = recs.len();
    let mut sections = D::sections(payload, &insights);
    sections.push(Section::recommendations(recs));

    let period = ctx
        .period
        .clone()
        .or_else(|| D::period_hint(payload))
        .unwrap_or_else(|| "Current period".to_string());

    debug!(
        kind = %D::KIND,
        sections = sections.len(),
        recommendations = rec_count,
        "report built"
    );

    Ok(Report {
        kind: D::KIND,
        title: D::KIND.title().to_string(),
        company: ctx.company.clone(),
        period,
        generated_at: ctx.generated_at,
        currency: ctx.currency.clone(),
        sections,
    })
}

fn build_json<D: ReportDomain>(json: &str, ctx: &ReportContext) -> Result<Report> {
    let payload: Option<D::Payload> = serde_json::from_str(json)?;
    debug!(kind = %D::KIND, present = payload.is_some(), "payload decoded");
    build::<D>(payload.as_ref(), ctx)
}

/// Decode a JSON payload of the given kind and build its report.
/// A literal `null` payload is treated as absent.
pub fn build_from_json(kind: ReportKind, json: &str, ctx: &ReportContext) -> Result<Report> {
    match kind {
        ReportKind::Inventory => build_json::<inventory::Inventory>(json, ctx),
        ReportKind::Sales => build_json::<sales::Sales>(json, ctx),
        ReportKind::Commission => build_json::<commission::Commission>(json, ctx),
        ReportKind::DailySales => build_json::<daily::DailySales>(json, ctx),
        ReportKind::TopProducts => build_json::<products::TopProducts>(json, ctx),
        ReportKind::TopSalesReps => build_json::<reps::TopSalesReps>(json, ctx),
    }
}
