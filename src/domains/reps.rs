use serde::Deserialize;

use crate::engine::{ReportDomain, ReportKind};
use crate::fmt;
use crate::metrics::{count_total, growth_pct, rank_desc, safe_div, share_pct, top_by};
use crate::numeric;
use crate::recommend::{plural, Rule};
use crate::report::{palette, Cell, ChartKind, ChartPoint, Row, Section, Tone, ValueUnit};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SalesRepReport {
    pub reps: Vec<SalesRepPerformance>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SalesRepPerformance {
    #[serde(deserialize_with = "numeric::identifier")]
    pub rep_id: String,
    #[serde(deserialize_with = "numeric::text")]
    pub rep_name: String,
    #[serde(deserialize_with = "numeric::amount")]
    pub total_sales: f64,
    #[serde(deserialize_with = "numeric::amount")]
    pub previous_sales: f64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub orders: u64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub customers_served: u64,
    #[serde(deserialize_with = "numeric::amount")]
    pub commission_rate: f64,
    /// Sales target for the period; 0 when none is set.
    #[serde(deserialize_with = "numeric::amount")]
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepLine {
    pub rank: usize,
    pub rep_name: String,
    pub total_sales: f64,
    pub orders: u64,
    pub customers_served: u64,
    pub share_pct: f64,
    pub growth_pct: f64,
    pub average_order_value: f64,
    pub target: f64,
    pub target_attainment_pct: f64,
    pub efficiency_score: f64,
}

impl RepLine {
    pub fn below_target(&self) -> bool {
        self.target > 0.0 && self.total_sales < self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepInsights {
    pub team_sales: f64,
    pub team_previous_sales: f64,
    pub team_orders: u64,
    pub average_sales_per_rep: f64,
    pub team_trend: f64,
    /// Ordered by sales, highest first.
    pub ranked: Vec<RepLine>,
    pub top_rep: Option<RepLine>,
    pub bottom_rep: Option<RepLine>,
    pub most_efficient: Option<RepLine>,
    pub below_target_count: usize,
}

pub fn compute(payload: Option<&SalesRepReport>) -> Option<RepInsights> {
    let report = payload?;
    let reps = &report.reps;

    let team_sales: f64 = reps.iter().map(|r| r.total_sales).sum();
    let team_previous_sales: f64 = reps.iter().map(|r| r.previous_sales).sum();
    let team_orders = count_total(reps.iter().map(|r| r.orders));

    let ranked: Vec<RepLine> = rank_desc(reps, |r| r.total_sales)
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| {
            let r = &reps[idx];
            RepLine {
                rank: pos + 1,
                rep_name: r.rep_name.clone(),
                total_sales: r.total_sales,
                orders: r.orders,
                customers_served: r.customers_served,
                share_pct: share_pct(r.total_sales, team_sales),
                growth_pct: growth_pct(r.total_sales, r.previous_sales),
                average_order_value: safe_div(r.total_sales, r.orders as f64),
                target: r.target,
                target_attainment_pct: share_pct(r.total_sales, r.target),
                efficiency_score: safe_div(r.total_sales, r.commission_rate),
            }
        })
        .collect();

    Some(RepInsights {
        team_sales,
        team_previous_sales,
        team_orders,
        average_sales_per_rep: safe_div(team_sales, reps.len() as f64),
        team_trend: growth_pct(team_sales, team_previous_sales),
        top_rep: ranked.first().cloned(),
        bottom_rep: ranked.last().cloned(),
        most_efficient: top_by(&ranked, |l| l.efficiency_score).cloned(),
        below_target_count: ranked.iter().filter(|l| l.below_target()).count(),
        ranked,
    })
}

const TOP_REP_CONCENTRATION_PCT: f64 = 40.0;

pub fn rules() -> Vec<Rule<RepInsights>> {
    vec![
        Rule::new(
            |i| i.team_trend > 0.0,
            |i| {
                format!(
                    "Team sales grew {} on the previous period; maintain positive momentum with regular route reviews.",
                    fmt::trend(i.team_trend)
                )
            },
        ),
        Rule::new(
            |i| i.team_trend < 0.0,
            |i| {
                format!(
                    "Team sales are on a declining trend ({}); revisit territories and targets.",
                    fmt::trend(i.team_trend)
                )
            },
        ),
        Rule::new(
            |i| i.below_target_count > 0,
            |i| {
                format!(
                    "{} below target; pair them with top performers for coaching.",
                    plural(i.below_target_count, "rep is", "reps are")
                )
            },
        ),
        Rule::new(
            |i| {
                i.ranked.len() > 1
                    && i.top_rep
                        .as_ref()
                        .is_some_and(|r| r.share_pct > TOP_REP_CONCENTRATION_PCT)
            },
            |i| match &i.top_rep {
                Some(r) => format!(
                    "{} brings in {} of team sales; spread key accounts to reduce dependence on one rep.",
                    r.rep_name,
                    fmt::percent(r.share_pct)
                ),
                None => String::new(),
            },
        ),
        Rule::new(
            |i| i.most_efficient.as_ref().is_some_and(|r| r.efficiency_score > 0.0),
            |i| match &i.most_efficient {
                Some(r) => format!(
                    "{} returns the most sales per commission point; share their approach with the team.",
                    r.rep_name
                ),
                None => String::new(),
            },
        ),
    ]
}

fn sections(insights: &RepInsights) -> Vec<Section> {
    let mut summary = vec![
        ("Team Sales", Cell::Money(insights.team_sales)),
        ("Previous Period", Cell::Money(insights.team_previous_sales)),
        ("Trend", Cell::Trend(insights.team_trend)),
        ("Orders", Cell::Count(insights.team_orders)),
        ("Average per Rep", Cell::Money(insights.average_sales_per_rep)),
        ("Below Target", Cell::Count(insights.below_target_count as u64)),
    ];
    if let Some(r) = &insights.top_rep {
        summary.push(("Top Rep", Cell::text(&r.rep_name)));
    }
    if let Some(r) = &insights.bottom_rep {
        summary.push(("Bottom Rep", Cell::text(&r.rep_name)));
    }
    if let Some(r) = &insights.most_efficient {
        summary.push(("Most Efficient", Cell::text(&r.rep_name)));
    }
    let mut out = vec![Section::summary("Summary", summary)];

    if !insights.ranked.is_empty() {
        let rows = insights
            .ranked
            .iter()
            .map(|l| {
                let cells = vec![
                    Cell::Count(l.rank as u64),
                    Cell::text(&l.rep_name),
                    Cell::Money(l.total_sales),
                    Cell::Percent(l.share_pct),
                    Cell::Trend(l.growth_pct),
                    Cell::Count(l.orders),
                    Cell::Count(l.customers_served),
                    Cell::Money(l.average_order_value),
                    Cell::Percent(l.target_attainment_pct),
                    Cell::Ratio(l.efficiency_score),
                ];
                if l.below_target() {
                    Row::toned(cells, Tone::Warning)
                } else if l.rank == 1 {
                    Row::toned(cells, Tone::Good)
                } else {
                    Row::new(cells)
                }
            })
            .collect();
        out.push(Section::table(
            "Rep Ranking",
            &[
                "#", "Rep", "Sales", "Share", "Growth", "Orders", "Customers", "Avg Order", "Target",
                "Efficiency",
            ],
            rows,
        ));

        let points = insights
            .ranked
            .iter()
            .enumerate()
            .map(|(i, l)| ChartPoint::new(&l.rep_name, l.total_sales, palette(i)))
            .collect();
        out.push(Section::chart("Sales by Rep", ChartKind::Bar, ValueUnit::Money, points));

        let attainment = insights
            .ranked
            .iter()
            .filter(|l| l.target > 0.0)
            .map(|l| {
                let tone = if l.below_target() { Tone::Warning } else { Tone::Good };
                ChartPoint::new(&l.rep_name, l.target_attainment_pct.min(100.0), tone.color())
            })
            .collect::<Vec<_>>();
        if !attainment.is_empty() {
            out.push(Section::chart(
                "Target Attainment",
                ChartKind::Bar,
                ValueUnit::Percent,
                attainment,
            ));
        }
    }

    out
}

pub struct TopSalesReps;

impl ReportDomain for TopSalesReps {
    type Payload = SalesRepReport;
    type Insights = RepInsights;

    const KIND: ReportKind = ReportKind::TopSalesReps;

    fn compute(payload: Option<&SalesRepReport>) -> Option<RepInsights> {
        compute(payload)
    }

    fn rules() -> Vec<Rule<RepInsights>> {
        rules()
    }

    fn sections(_payload: &SalesRepReport, insights: &RepInsights) -> Vec<Section> {
        sections(insights)
    }
}
