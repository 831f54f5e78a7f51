use serde::Deserialize;

use super::{cash_share, payment_chart, payment_shares, PaymentShare};
use crate::engine::{ReportDomain, ReportKind};
use crate::fmt;
use crate::metrics::{bottom_by, growth_pct, safe_div, share_pct, top_by};
use crate::numeric;
use crate::recommend::Rule;
use crate::report::{Cell, ChartKind, ChartPoint, Row, Section, Tone, ValueUnit};
use crate::thresholds::CASH_SHARE_ALERT_PCT;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SalesReport {
    pub summary: SalesSummary,
    pub payment_breakdown: Vec<PaymentTotal>,
    pub daily_sales: Vec<DailyTotal>,
    pub top_customers: Vec<CustomerTotal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalesSummary {
    #[serde(deserialize_with = "numeric::amount")]
    pub total_sales: f64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub total_orders: u64,
    #[serde(deserialize_with = "numeric::amount")]
    pub previous_sales: f64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub previous_orders: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentTotal {
    #[serde(deserialize_with = "numeric::text")]
    pub payment_type: String,
    #[serde(deserialize_with = "numeric::amount")]
    pub amount: f64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub transactions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DailyTotal {
    #[serde(deserialize_with = "numeric::text")]
    pub date: String,
    #[serde(deserialize_with = "numeric::amount")]
    pub total_sales: f64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub orders: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CustomerTotal {
    #[serde(deserialize_with = "numeric::text")]
    pub customer_name: String,
    #[serde(deserialize_with = "numeric::amount")]
    pub total_spent: f64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesInsights {
    pub total_sales: f64,
    pub total_orders: u64,
    pub average_order_value: f64,
    pub sales_trend: f64,
    pub orders_trend: f64,
    pub payment_shares: Vec<PaymentShare>,
    pub dominant_payment: Option<PaymentShare>,
    pub cash_share_pct: f64,
    pub best_day: Option<DailyTotal>,
    pub slowest_day: Option<DailyTotal>,
    pub daily_average: f64,
    pub top_customer: Option<CustomerTotal>,
    pub top_customer_share: f64,
}

/// The summary total, else the payment breakdown sum, else the daily sum.
fn period_total(report: &SalesReport) -> f64 {
    if report.summary.total_sales > 0.0 {
        return report.summary.total_sales;
    }
    let by_payment: f64 = report.payment_breakdown.iter().map(|p| p.amount).sum();
    if by_payment > 0.0 {
        return by_payment;
    }
    report.daily_sales.iter().map(|d| d.total_sales).sum()
}

pub fn compute(payload: Option<&SalesReport>) -> Option<SalesInsights> {
    let report = payload?;
    let s = &report.summary;
    let total_sales = period_total(report);

    let shares = payment_shares(
        &report.payment_breakdown,
        |p| p.payment_type.as_str(),
        |p| p.amount,
        |p| p.transactions,
        total_sales,
    );
    let dominant_payment = top_by(&shares, |p| p.amount).cloned();
    let cash_share_pct = cash_share(&shares);

    let daily_total: f64 = report.daily_sales.iter().map(|d| d.total_sales).sum();
    let daily_average = safe_div(daily_total, report.daily_sales.len() as f64);

    let top_customer = top_by(&report.top_customers, |c| c.total_spent).cloned();
    let top_customer_share = top_customer
        .as_ref()
        .map(|c| share_pct(c.total_spent, total_sales))
        .unwrap_or(0.0);

    Some(SalesInsights {
        total_sales,
        total_orders: s.total_orders,
        average_order_value: safe_div(total_sales, s.total_orders as f64),
        sales_trend: growth_pct(total_sales, s.previous_sales),
        orders_trend: growth_pct(s.total_orders as f64, s.previous_orders as f64),
        dominant_payment,
        cash_share_pct,
        payment_shares: shares,
        best_day: top_by(&report.daily_sales, |d| d.total_sales).cloned(),
        slowest_day: bottom_by(&report.daily_sales, |d| d.total_sales).cloned(),
        daily_average,
        top_customer,
        top_customer_share,
    })
}

const CUSTOMER_CONCENTRATION_PCT: f64 = 30.0;
const SLOW_DAY_FRACTION: f64 = 0.5;

pub fn rules() -> Vec<Rule<SalesInsights>> {
    vec![
        Rule::new(
            |i| i.sales_trend < 0.0,
            |i| {
                format!(
                    "Sales are on a declining trend ({}) against the previous period; review pricing and follow up with inactive customers.",
                    fmt::trend(i.sales_trend)
                )
            },
        ),
        Rule::new(
            |i| i.sales_trend > 0.0,
            |i| {
                format!(
                    "Sales grew {} on the previous period; maintain positive momentum by keeping best sellers in stock.",
                    fmt::trend(i.sales_trend)
                )
            },
        ),
        Rule::new(
            |i| i.cash_share_pct > CASH_SHARE_ALERT_PCT,
            |i| {
                format!(
                    "Cash makes up {} of sales; encourage mobile and card payments to reduce cash handling.",
                    fmt::percent(i.cash_share_pct)
                )
            },
        ),
        Rule::new(
            |i| i.top_customer_share > CUSTOMER_CONCENTRATION_PCT,
            |i| {
                let name = i.top_customer.as_ref().map(|c| c.customer_name.as_str()).unwrap_or("");
                format!(
                    "{name} accounts for {} of sales; widen the customer base to reduce concentration risk.",
                    fmt::percent(i.top_customer_share)
                )
            },
        ),
        Rule::new(
            |i| {
                i.slowest_day
                    .as_ref()
                    .is_some_and(|d| d.total_sales < i.daily_average * SLOW_DAY_FRACTION)
            },
            |i| {
                let day = i
                    .slowest_day
                    .as_ref()
                    .map(|d| fmt::date_label(&d.date))
                    .unwrap_or_default();
                format!(
                    "Sales on {day} fell below half the daily average; look into what held that day back."
                )
            },
        ),
        Rule::new(
            |i| i.total_orders == 0,
            |_| "No orders were recorded for this period.".to_string(),
        ),
    ]
}

fn sections(report: &SalesReport, insights: &SalesInsights) -> Vec<Section> {
    let mut summary = vec![
        ("Total Sales", Cell::Money(insights.total_sales)),
        ("Orders", Cell::Count(insights.total_orders)),
        ("Average Order Value", Cell::Money(insights.average_order_value)),
        ("Sales Trend", Cell::Trend(insights.sales_trend)),
        ("Orders Trend", Cell::Trend(insights.orders_trend)),
        ("Daily Average", Cell::Money(insights.daily_average)),
    ];
    if let Some(day) = &insights.best_day {
        summary.push(("Best Day", Cell::Date(day.date.clone())));
        summary.push(("Best Day Sales", Cell::Money(day.total_sales)));
    }
    if let Some(p) = &insights.dominant_payment {
        summary.push(("Top Payment Type", Cell::text(&p.payment_type)));
    }
    let mut out = vec![Section::summary("Summary", summary)];

    if !insights.payment_shares.is_empty() {
        let rows = insights
            .payment_shares
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::text(&p.payment_type),
                    Cell::Count(p.transactions),
                    Cell::Money(p.amount),
                    Cell::Percent(p.share_pct),
                ])
            })
            .collect();
        out.push(Section::table(
            "Payment Breakdown",
            &["Payment Type", "Transactions", "Amount", "Share"],
            rows,
        ));
        out.push(Section::chart(
            "Sales by Payment Type",
            ChartKind::Pie,
            ValueUnit::Money,
            payment_chart(&insights.payment_shares),
        ));
    }

    if !report.daily_sales.is_empty() {
        let rows = report
            .daily_sales
            .iter()
            .map(|d| {
                let cells = vec![
                    Cell::Date(d.date.clone()),
                    Cell::Count(d.orders),
                    Cell::Money(d.total_sales),
                    Cell::Money(safe_div(d.total_sales, d.orders as f64)),
                ];
                if d.total_sales < insights.daily_average * SLOW_DAY_FRACTION {
                    Row::toned(cells, Tone::Warning)
                } else {
                    Row::new(cells)
                }
            })
            .collect();
        out.push(Section::table(
            "Daily Sales",
            &["Date", "Orders", "Sales", "Average Order"],
            rows,
        ));
        let points = report
            .daily_sales
            .iter()
            .map(|d| {
                ChartPoint::new(
                    fmt::date_label(&d.date),
                    d.total_sales,
                    Tone::Neutral.color(),
                )
            })
            .collect();
        out.push(Section::chart("Sales Trend", ChartKind::Bar, ValueUnit::Money, points));
    }

    if !report.top_customers.is_empty() {
        let rows = report
            .top_customers
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::text(&c.customer_name),
                    Cell::Count(c.orders),
                    Cell::Money(c.total_spent),
                    Cell::Percent(share_pct(c.total_spent, insights.total_sales)),
                ])
            })
            .collect();
        out.push(Section::table(
            "Top Customers",
            &["Customer", "Orders", "Spent", "Share"],
            rows,
        ));
    }

    out
}

pub struct Sales;

impl ReportDomain for Sales {
    type Payload = SalesReport;
    type Insights = SalesInsights;

    const KIND: ReportKind = ReportKind::Sales;

    fn compute(payload: Option<&SalesReport>) -> Option<SalesInsights> {
        compute(payload)
    }

    fn rules() -> Vec<Rule<SalesInsights>> {
        rules()
    }

    fn sections(payload: &SalesReport, insights: &SalesInsights) -> Vec<Section> {
        sections(payload, insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::assemble;

    fn report() -> SalesReport {
        SalesReport {
            summary: SalesSummary {
                total_sales: 100_000.0,
                total_orders: 40,
                previous_sales: 80_000.0,
                previous_orders: 40,
            },
            payment_breakdown: vec![
                PaymentTotal { payment_type: "Cash".into(), amount: 70_000.0, transactions: 30 },
                PaymentTotal { payment_type: "M-Pesa".into(), amount: 30_000.0, transactions: 10 },
            ],
            daily_sales: vec![
                DailyTotal { date: "2025-03-01".into(), total_sales: 60_000.0, orders: 20 },
                DailyTotal { date: "2025-03-02".into(), total_sales: 35_000.0, orders: 15 },
                DailyTotal { date: "2025-03-03".into(), total_sales: 5_000.0, orders: 5 },
            ],
            top_customers: vec![CustomerTotal {
                customer_name: "Mama Mboga".into(),
                total_spent: 12_000.0,
                orders: 6,
            }],
        }
    }

    #[test]
    fn test_absent_payload_yields_none() {
        assert!(compute(None).is_none());
    }

    #[test]
    fn test_totals_and_trends() {
        let ins = compute(Some(&report())).unwrap();
        assert_eq!(ins.average_order_value, 2_500.0);
        assert_eq!(ins.sales_trend, 25.0);
        assert_eq!(ins.orders_trend, 0.0);
        assert_eq!(ins.cash_share_pct, 70.0);
        assert_eq!(ins.dominant_payment.unwrap().payment_type, "Cash");
        assert_eq!(ins.best_day.unwrap().date, "2025-03-01");
        assert_eq!(ins.slowest_day.unwrap().date, "2025-03-03");
        assert!((ins.daily_average - 33_333.333).abs() < 0.01);
    }

    #[test]
    fn test_zero_orders_are_guarded() {
        let ins = compute(Some(&SalesReport::default())).unwrap();
        assert_eq!(ins.average_order_value, 0.0);
        assert_eq!(ins.sales_trend, 0.0);
        assert_eq!(ins.daily_average, 0.0);
        assert!(ins.best_day.is_none());
        let recs = assemble(&rules(), &ins);
        assert_eq!(recs, vec!["No orders were recorded for this period."]);
    }

    #[test]
    fn test_recommendations() {
        let ins = compute(Some(&report())).unwrap();
        let recs = assemble(&rules(), &ins);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].contains("maintain positive momentum"));
        assert!(recs[1].starts_with("Cash makes up 70%"));
        assert!(recs[2].contains("03 Mar 2025"));
        assert!(!recs.iter().any(|r| r.contains("declining trend")));
    }

    #[test]
    fn test_missing_summary_total_falls_back_to_breakdown() {
        let mut r = report();
        r.summary.total_sales = 0.0;
        r.summary.previous_sales = 0.0;
        let ins = compute(Some(&r)).unwrap();
        assert_eq!(ins.total_sales, 100_000.0);
        assert_eq!(ins.cash_share_pct, 70.0);
        assert_eq!(ins.top_customer_share, 12.0);
        let recs = assemble(&rules(), &ins);
        assert!(recs.iter().any(|r| r.starts_with("Cash makes up 70%")));

        r.payment_breakdown.clear();
        let ins = compute(Some(&r)).unwrap();
        assert_eq!(ins.total_sales, 100_000.0);
    }

    #[test]
    fn test_declining_sales() {
        let mut r = report();
        r.summary.previous_sales = 200_000.0;
        let ins = compute(Some(&r)).unwrap();
        assert_eq!(ins.sales_trend, -50.0);
        let recs = assemble(&rules(), &ins);
        assert!(recs[0].contains("declining trend (-50%)"));
    }
}
