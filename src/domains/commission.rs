use serde::Deserialize;

use crate::engine::{ReportDomain, ReportKind};
use crate::fmt;
use crate::metrics::{bottom_by, growth_pct, safe_div, share_pct, top_by};
use crate::numeric;
use crate::recommend::{plural, Rule};
use crate::report::{palette, Cell, ChartKind, ChartPoint, Row, Section, Tone, ValueUnit};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommissionReport {
    pub summary: CommissionSummary,
    pub commissions: Vec<RepCommission>,
}

/// Commission totals for the reporting period and the one before it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommissionSummary {
    #[serde(alias = "currentPeriodTotal", deserialize_with = "numeric::amount")]
    pub current_period_total: f64,
    #[serde(alias = "previousPeriodTotal", deserialize_with = "numeric::amount")]
    pub previous_period_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RepCommission {
    #[serde(deserialize_with = "numeric::identifier")]
    pub rep_id: String,
    #[serde(deserialize_with = "numeric::text")]
    pub rep_name: String,
    #[serde(deserialize_with = "numeric::amount")]
    pub total_sales: f64,
    /// Percent of sales, e.g. `5.0` for 5%.
    #[serde(deserialize_with = "numeric::amount")]
    pub commission_rate: f64,
    #[serde(deserialize_with = "numeric::amount")]
    pub commission_amount: f64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub orders: u64,
    #[serde(deserialize_with = "numeric::text")]
    pub status: String,
}

impl RepCommission {
    pub fn is_pending(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("pending")
    }

    /// Sales per commission point: higher means cheaper revenue.
    pub fn efficiency_score(&self) -> f64 {
        safe_div(self.total_sales, self.commission_rate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommissionInsights {
    pub total_commission: f64,
    pub total_sales: f64,
    pub effective_rate: f64,
    pub average_commission: f64,
    pub current_period_total: f64,
    pub previous_period_total: f64,
    pub trend: f64,
    pub top_earner: Option<RepCommission>,
    pub lowest_earner: Option<RepCommission>,
    pub most_efficient: Option<RepCommission>,
    pub pending_count: usize,
    pub pending_total: f64,
    pub reps_without_sales: usize,
}

pub fn compute(payload: Option<&CommissionReport>) -> Option<CommissionInsights> {
    let report = payload?;
    let reps = &report.commissions;

    let total_commission: f64 = reps.iter().map(|r| r.commission_amount).sum();
    let total_sales: f64 = reps.iter().map(|r| r.total_sales).sum();
    let current_period_total = if report.summary.current_period_total > 0.0 {
        report.summary.current_period_total
    } else {
        total_commission
    };
    let previous_period_total = report.summary.previous_period_total;
    let pending: Vec<&RepCommission> = reps.iter().filter(|r| r.is_pending()).collect();

    Some(CommissionInsights {
        total_commission,
        total_sales,
        effective_rate: share_pct(total_commission, total_sales),
        average_commission: safe_div(total_commission, reps.len() as f64),
        current_period_total,
        previous_period_total,
        trend: growth_pct(current_period_total, previous_period_total),
        top_earner: top_by(reps, |r| r.commission_amount).cloned(),
        lowest_earner: bottom_by(reps, |r| r.commission_amount).cloned(),
        most_efficient: top_by(reps, |r| r.efficiency_score()).cloned(),
        pending_count: pending.len(),
        pending_total: pending.iter().map(|r| r.commission_amount).sum(),
        reps_without_sales: reps.iter().filter(|r| r.total_sales == 0.0).count(),
    })
}

const RATE_REVIEW_PCT: f64 = 10.0;

pub fn rules() -> Vec<Rule<CommissionInsights>> {
    vec![
        Rule::new(
            |i| i.trend > 0.0,
            |i| {
                let lead = i
                    .top_earner
                    .as_ref()
                    .map(|r| format!(" and recognise top earners such as {}", r.rep_name))
                    .unwrap_or_default();
                format!(
                    "Commission payouts rose {} on the previous period; maintain positive momentum{lead}.",
                    fmt::trend(i.trend)
                )
            },
        ),
        Rule::new(
            |i| i.trend < 0.0,
            |i| {
                format!(
                    "Commissions show a declining trend ({}); review targets and support underperforming reps.",
                    fmt::trend(i.trend)
                )
            },
        ),
        Rule::new(
            |i| i.effective_rate > RATE_REVIEW_PCT,
            |i| {
                format!(
                    "Commission costs are {} of sales; review the commission rate structure.",
                    fmt::percent(i.effective_rate)
                )
            },
        ),
        Rule::new(
            |i| i.reps_without_sales > 0,
            |i| {
                format!(
                    "{} recorded no sales this period; schedule coaching sessions.",
                    plural(i.reps_without_sales, "rep", "reps")
                )
            },
        ),
        Rule::new(
            |i| i.pending_count > 0,
            |i| {
                format!(
                    "{} still awaiting approval; settle them before the next payout.",
                    plural(i.pending_count, "commission payment is", "commission payments are")
                )
            },
        ),
    ]
}

fn sections(report: &CommissionReport, insights: &CommissionInsights) -> Vec<Section> {
    let mut summary = vec![
        ("Total Commission", Cell::Money(insights.total_commission)),
        ("Total Sales", Cell::Money(insights.total_sales)),
        ("Effective Rate", Cell::Percent(insights.effective_rate)),
        ("Average per Rep", Cell::Money(insights.average_commission)),
        ("Current Period", Cell::Money(insights.current_period_total)),
        ("Previous Period", Cell::Money(insights.previous_period_total)),
        ("Trend", Cell::Trend(insights.trend)),
        ("Pending Payouts", Cell::Money(insights.pending_total)),
    ];
    if let Some(r) = &insights.top_earner {
        summary.push(("Top Earner", Cell::text(&r.rep_name)));
    }
    if let Some(r) = &insights.lowest_earner {
        summary.push(("Lowest Earner", Cell::text(&r.rep_name)));
    }
    if let Some(r) = &insights.most_efficient {
        summary.push(("Most Efficient", Cell::text(&r.rep_name)));
    }
    let mut out = vec![Section::summary("Summary", summary)];

    if !report.commissions.is_empty() {
        let rows = report
            .commissions
            .iter()
            .map(|r| {
                let cells = vec![
                    Cell::text(&r.rep_name),
                    Cell::Count(r.orders),
                    Cell::Money(r.total_sales),
                    Cell::Percent(r.commission_rate),
                    Cell::Money(r.commission_amount),
                    Cell::Ratio(r.efficiency_score()),
                    Cell::text(if r.status.trim().is_empty() { "—" } else { r.status.trim() }),
                ];
                if r.is_pending() {
                    Row::toned(cells, Tone::Caution)
                } else {
                    Row::new(cells)
                }
            })
            .collect();
        out.push(Section::table(
            "Commission by Rep",
            &["Rep", "Orders", "Sales", "Rate", "Commission", "Efficiency", "Status"],
            rows,
        ));

        let points = report
            .commissions
            .iter()
            .enumerate()
            .map(|(i, r)| ChartPoint::new(&r.rep_name, r.commission_amount, palette(i)))
            .collect();
        out.push(Section::chart(
            "Commission Distribution",
            ChartKind::Pie,
            ValueUnit::Money,
            points,
        ));
    }

    out.push(Section::chart(
        "Period Comparison",
        ChartKind::Bar,
        ValueUnit::Money,
        vec![
            ChartPoint::new("Previous", insights.previous_period_total, Tone::Neutral.color()),
            ChartPoint::new(
                "Current",
                insights.current_period_total,
                if insights.trend < 0.0 { Tone::Critical.color() } else { Tone::Good.color() },
            ),
        ],
    ));

    out
}

pub struct Commission;

impl ReportDomain for Commission {
    type Payload = CommissionReport;
    type Insights = CommissionInsights;

    const KIND: ReportKind = ReportKind::Commission;

    fn compute(payload: Option<&CommissionReport>) -> Option<CommissionInsights> {
        compute(payload)
    }

    fn rules() -> Vec<Rule<CommissionInsights>> {
        rules()
    }

    fn sections(payload: &CommissionReport, insights: &CommissionInsights) -> Vec<Section> {
        sections(payload, insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::assemble;
    use crate::report::Content;

    fn rep(name: &str, sales: f64, rate: f64, amount: f64) -> RepCommission {
        RepCommission {
            rep_id: name.to_lowercase(),
            rep_name: name.to_string(),
            total_sales: sales,
            commission_rate: rate,
            commission_amount: amount,
            orders: 10,
            status: "paid".to_string(),
        }
    }

    fn report() -> CommissionReport {
        CommissionReport {
            summary: CommissionSummary {
                current_period_total: 150_000.0,
                previous_period_total: 100_000.0,
            },
            commissions: vec![
                rep("Achieng", 1_000_000.0, 5.0, 50_000.0),
                rep("Baraka", 2_000_000.0, 5.0, 100_000.0),
            ],
        }
    }

    #[test]
    fn test_absent_payload_yields_none() {
        assert!(compute(None).is_none());
    }

    #[test]
    fn test_trend_and_totals() {
        let ins = compute(Some(&report())).unwrap();
        assert_eq!(ins.trend, 50.0);
        assert_eq!(ins.total_commission, 150_000.0);
        assert_eq!(ins.effective_rate, 5.0);
        assert_eq!(ins.average_commission, 75_000.0);
        assert_eq!(ins.top_earner.unwrap().rep_name, "Baraka");
        assert_eq!(ins.lowest_earner.unwrap().rep_name, "Achieng");
        assert_eq!(ins.most_efficient.unwrap().rep_name, "Baraka");
    }

    #[test]
    fn test_summary_names_top_and_lowest_earner() {
        let r = report();
        let ins = compute(Some(&r)).unwrap();
        let summary = match &sections(&r, &ins)[0].content {
            Content::Summary(items) => items.clone(),
            other => panic!("expected summary, got {other:?}"),
        };
        let name = |label: &str| summary.iter().find(|(l, _)| l == label).map(|(_, c)| c.clone());
        assert_eq!(name("Top Earner"), Some(Cell::text("Baraka")));
        assert_eq!(name("Lowest Earner"), Some(Cell::text("Achieng")));
    }

    #[test]
    fn test_positive_trend_recommendations() {
        let ins = compute(Some(&report())).unwrap();
        let recs = assemble(&rules(), &ins);
        assert!(recs.iter().any(|r| r.contains("maintain positive momentum")));
        assert!(!recs.iter().any(|r| r.contains("declining trend")));
        assert!(recs[0].contains("+50%"));
    }

    #[test]
    fn test_declining_trend() {
        let mut r = report();
        r.summary.previous_period_total = 300_000.0;
        let ins = compute(Some(&r)).unwrap();
        assert_eq!(ins.trend, -50.0);
        let recs = assemble(&rules(), &ins);
        assert!(recs[0].contains("declining trend"));
        assert!(!recs.iter().any(|r| r.contains("positive momentum")));
    }

    #[test]
    fn test_previous_zero_quirk() {
        let mut r = report();
        r.summary.previous_period_total = 0.0;
        assert_eq!(compute(Some(&r)).unwrap().trend, 100.0);

        let empty = CommissionReport::default();
        let ins = compute(Some(&empty)).unwrap();
        assert_eq!(ins.trend, 0.0);
        assert_eq!(ins.effective_rate, 0.0);
        assert_eq!(ins.average_commission, 0.0);
        assert!(ins.top_earner.is_none());
        assert!(assemble(&rules(), &ins).is_empty());
    }

    #[test]
    fn test_current_total_falls_back_to_rep_sum() {
        let mut r = report();
        r.summary.current_period_total = 0.0;
        let ins = compute(Some(&r)).unwrap();
        assert_eq!(ins.current_period_total, 150_000.0);
        assert_eq!(ins.trend, 50.0);
    }

    #[test]
    fn test_pending_and_idle_reps() {
        let mut r = report();
        r.commissions.push(RepCommission {
            status: "Pending".to_string(),
            ..rep("Chebet", 0.0, 5.0, 0.0)
        });
        let ins = compute(Some(&r)).unwrap();
        assert_eq!(ins.pending_count, 1);
        assert_eq!(ins.reps_without_sales, 1);
        let recs = assemble(&rules(), &ins);
        assert!(recs.iter().any(|r| r.starts_with("1 rep recorded no sales")));
        assert!(recs.iter().any(|r| r.starts_with("1 commission payment is still awaiting")));
    }

    #[test]
    fn test_zero_rate_efficiency_is_guarded() {
        assert_eq!(rep("Dan", 500.0, 0.0, 0.0).efficiency_score(), 0.0);
    }
}
