use serde::Deserialize;

use super::{cash_share, normalise_label, payment_chart, payment_shares, PaymentShare};
use crate::engine::{ReportDomain, ReportKind};
use crate::fmt;
use crate::metrics::{count_total, group_totals, growth_pct, safe_div, top_by, GroupTotal};
use crate::numeric;
use crate::recommend::{plural, Rule};
use crate::report::{Cell, ChartKind, ChartPoint, Row, Section, Tone, ValueUnit};
use crate::thresholds::CASH_SHARE_ALERT_PCT;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailySalesReport {
    #[serde(deserialize_with = "numeric::text")]
    pub date: String,
    #[serde(alias = "previous_day_total", deserialize_with = "numeric::amount")]
    pub previous_day_total: f64,
    pub sales: Vec<SaleEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SaleEntry {
    #[serde(deserialize_with = "numeric::identifier")]
    pub sale_id: String,
    #[serde(deserialize_with = "numeric::text")]
    pub customer_name: String,
    #[serde(deserialize_with = "numeric::text")]
    pub sales_rep: String,
    #[serde(deserialize_with = "numeric::amount")]
    pub amount: f64,
    #[serde(deserialize_with = "numeric::text")]
    pub payment_type: String,
    #[serde(deserialize_with = "numeric::quantity")]
    pub items: u64,
    /// "HH:MM", "HH:MM:SS" or an ISO date-time.
    #[serde(alias = "created_at", deserialize_with = "numeric::text")]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourTotal {
    pub hour: u32,
    pub total: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyInsights {
    pub date: String,
    pub total_sales: f64,
    pub transaction_count: usize,
    pub average_ticket: f64,
    pub items_sold: u64,
    pub previous_day_total: f64,
    pub trend: f64,
    pub payment_shares: Vec<PaymentShare>,
    pub cash_share_pct: f64,
    pub hourly: Vec<HourTotal>,
    pub peak_hour: Option<HourTotal>,
    pub largest_sale: Option<SaleEntry>,
    pub rep_totals: Vec<GroupTotal>,
    pub top_rep: Option<GroupTotal>,
}

fn hourly_totals(sales: &[SaleEntry]) -> Vec<HourTotal> {
    let mut hours: Vec<HourTotal> = Vec::new();
    for sale in sales {
        let Some(hour) = fmt::hour_of(&sale.time) else {
            continue;
        };
        match hours.iter_mut().find(|h| h.hour == hour) {
            Some(h) => {
                h.total += sale.amount;
                h.count = h.count.saturating_add(1);
            }
            None => hours.push(HourTotal {
                hour,
                total: sale.amount,
                count: 1,
            }),
        }
    }
    hours.sort_by_key(|h| h.hour);
    hours
}

pub fn compute(payload: Option<&DailySalesReport>) -> Option<DailyInsights> {
    let report = payload?;
    let sales = &report.sales;

    let total_sales: f64 = sales.iter().map(|s| s.amount).sum();
    let shares = payment_shares(
        sales,
        |s| s.payment_type.as_str(),
        |s| s.amount,
        |_| 1,
        total_sales,
    );
    let hourly = hourly_totals(sales);
    let rep_totals = group_totals(sales, |s| normalise_label(&s.sales_rep), |s| s.amount);

    Some(DailyInsights {
        date: report.date.clone(),
        total_sales,
        transaction_count: sales.len(),
        average_ticket: safe_div(total_sales, sales.len() as f64),
        items_sold: count_total(sales.iter().map(|s| s.items)),
        previous_day_total: report.previous_day_total,
        trend: growth_pct(total_sales, report.previous_day_total),
        cash_share_pct: cash_share(&shares),
        payment_shares: shares,
        peak_hour: top_by(&hourly, |h| h.total).cloned(),
        hourly,
        largest_sale: top_by(sales, |s| s.amount).cloned(),
        top_rep: top_by(&rep_totals, |r| r.total).cloned(),
        rep_totals,
    })
}

pub fn rules() -> Vec<Rule<DailyInsights>> {
    vec![
        Rule::new(
            |i| i.transaction_count == 0,
            |i| format!("No sales were recorded on {}.", fmt::date_label(&i.date)),
        ),
        Rule::new(
            |i| i.trend < 0.0,
            |i| {
                format!(
                    "Sales are on a declining trend against the previous day ({}); check stock-outs and rep coverage.",
                    fmt::trend(i.trend)
                )
            },
        ),
        Rule::new(
            |i| i.trend > 0.0,
            |i| {
                format!(
                    "Sales are up {} on the previous day; maintain positive momentum.",
                    fmt::trend(i.trend)
                )
            },
        ),
        Rule::new(
            |i| i.peak_hour.is_some(),
            |i| match &i.peak_hour {
                Some(h) => format!(
                    "Peak trading hour was {:02}:00 with {}; schedule staff accordingly.",
                    h.hour,
                    plural(h.count as usize, "sale", "sales")
                ),
                None => String::new(),
            },
        ),
        Rule::new(
            |i| i.cash_share_pct > CASH_SHARE_ALERT_PCT,
            |i| {
                format!(
                    "Cash made up {} of the day's takings; bank it promptly and encourage mobile payments.",
                    fmt::percent(i.cash_share_pct)
                )
            },
        ),
    ]
}

fn sections(report: &DailySalesReport, insights: &DailyInsights) -> Vec<Section> {
    let mut summary = vec![
        ("Total Sales", Cell::Money(insights.total_sales)),
        ("Transactions", Cell::Count(insights.transaction_count as u64)),
        ("Average Ticket", Cell::Money(insights.average_ticket)),
        ("Items Sold", Cell::Count(insights.items_sold)),
        ("Previous Day", Cell::Money(insights.previous_day_total)),
        ("Trend", Cell::Trend(insights.trend)),
    ];
    if let Some(s) = &insights.largest_sale {
        summary.push(("Largest Sale", Cell::Money(s.amount)));
    }
    if let Some(r) = &insights.top_rep {
        summary.push(("Top Rep", Cell::text(&r.key)));
    }
    let mut out = vec![Section::summary("Summary", summary)];

    if !report.sales.is_empty() {
        let rows = report
            .sales
            .iter()
            .map(|s| {
                Row::new(vec![
                    Cell::text(&s.sale_id),
                    Cell::text(&s.time),
                    Cell::text(&s.customer_name),
                    Cell::text(normalise_label(&s.sales_rep)),
                    Cell::text(normalise_label(&s.payment_type)),
                    Cell::Count(s.items),
                    Cell::Money(s.amount),
                ])
            })
            .collect();
        out.push(Section::table(
            "Transactions",
            &["Sale", "Time", "Customer", "Rep", "Payment", "Items", "Amount"],
            rows,
        ));
    }

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
            "Takings by Payment Type",
            ChartKind::Pie,
            ValueUnit::Money,
            payment_chart(&insights.payment_shares),
        ));
    }

    if !insights.rep_totals.is_empty() {
        let rows = insights
            .rep_totals
            .iter()
            .map(|r| Row::new(vec![Cell::text(&r.key), Cell::Count(r.count), Cell::Money(r.total)]))
            .collect();
        out.push(Section::table("Sales by Rep", &["Rep", "Sales", "Amount"], rows));
    }

    if !insights.hourly.is_empty() {
        let peak = insights.peak_hour.as_ref().map(|h| h.hour);
        let points = insights
            .hourly
            .iter()
            .map(|h| {
                let tone = if Some(h.hour) == peak { Tone::Good } else { Tone::Neutral };
                ChartPoint::new(format!("{:02}:00", h.hour), h.total, tone.color())
            })
            .collect();
        out.push(Section::chart("Sales by Hour", ChartKind::Bar, ValueUnit::Money, points));
    }

    out
}

pub struct DailySales;

impl ReportDomain for DailySales {
    type Payload = DailySalesReport;
    type Insights = DailyInsights;

    const KIND: ReportKind = ReportKind::DailySales;

    fn compute(payload: Option<&DailySalesReport>) -> Option<DailyInsights> {
        compute(payload)
    }

    fn rules() -> Vec<Rule<DailyInsights>> {
        rules()
    }

    fn sections(payload: &DailySalesReport, insights: &DailyInsights) -> Vec<Section> {
        sections(payload, insights)
    }

    fn period_hint(payload: &DailySalesReport) -> Option<String> {
        if payload.date.trim().is_empty() {
            None
        } else {
            Some(fmt::date_label(&payload.date))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{build_from_json, ReportContext};
    use crate::recommend::assemble;
    use crate::report::Content;

    fn sale(id: &str, rep: &str, amount: f64, payment: &str, time: &str) -> SaleEntry {
        SaleEntry {
            sale_id: id.to_string(),
            customer_name: "Walk-in".to_string(),
            sales_rep: rep.to_string(),
            amount,
            payment_type: payment.to_string(),
            items: 2,
            time: time.to_string(),
        }
    }

    fn report() -> DailySalesReport {
        DailySalesReport {
            date: "2025-03-04".to_string(),
            previous_day_total: 4_000.0,
            sales: vec![
                sale("S1", "Achieng", 1_000.0, "Cash", "09:15"),
                sale("S2", "Baraka", 2_500.0, "M-Pesa", "14:05"),
                sale("S3", "Achieng", 1_500.0, "Cash", "14:40"),
                sale("S4", "Baraka", 1_000.0, "M-Pesa", "2025-03-04T09:55:00"),
            ],
        }
    }

    #[test]
    fn test_absent_payload_yields_none() {
        assert!(compute(None).is_none());
    }

    #[test]
    fn test_daily_totals() {
        let ins = compute(Some(&report())).unwrap();
        assert_eq!(ins.total_sales, 6_000.0);
        assert_eq!(ins.transaction_count, 4);
        assert_eq!(ins.average_ticket, 1_500.0);
        assert_eq!(ins.items_sold, 8);
        assert_eq!(ins.trend, 50.0);
        assert_eq!(ins.largest_sale.unwrap().sale_id, "S2");
    }

    #[test]
    fn test_hourly_and_peak() {
        let ins = compute(Some(&report())).unwrap();
        assert_eq!(ins.hourly.len(), 2);
        assert_eq!(ins.hourly[0].hour, 9);
        assert_eq!(ins.hourly[0].total, 2_000.0);
        let peak = ins.peak_hour.unwrap();
        assert_eq!(peak.hour, 14);
        assert_eq!(peak.count, 2);
    }

    #[test]
    fn test_rep_totals_tie_keeps_first() {
        let mut r = report();
        r.sales[1].amount = 1_500.0;
        let ins = compute(Some(&r)).unwrap();
        assert_eq!(ins.rep_totals[0].total, 2_500.0);
        assert_eq!(ins.rep_totals[1].total, 2_500.0);
        assert_eq!(ins.top_rep.unwrap().key, "Achieng");
    }

    #[test]
    fn test_payment_transactions_are_counted() {
        let ins = compute(Some(&report())).unwrap();
        assert_eq!(ins.payment_shares[0].payment_type, "Cash");
        assert_eq!(ins.payment_shares[0].transactions, 2);
        assert!((ins.payment_shares[0].share_pct - 41.666).abs() < 0.01);
    }

    #[test]
    fn test_empty_day() {
        let r = DailySalesReport {
            date: "2025-03-04".to_string(),
            ..Default::default()
        };
        let ins = compute(Some(&r)).unwrap();
        assert_eq!(ins.average_ticket, 0.0);
        assert_eq!(ins.trend, 0.0);
        let recs = assemble(&rules(), &ins);
        assert_eq!(recs, vec!["No sales were recorded on 04 Mar 2025."]);
    }

    #[test]
    fn test_blank_rep_reads_unspecified_in_transactions() {
        let mut r = report();
        r.sales[0].sales_rep = "  ".to_string();
        let ins = compute(Some(&r)).unwrap();
        let table = sections(&r, &ins)
            .into_iter()
            .find(|s| s.title == "Transactions")
            .unwrap();
        let Content::Table(table) = table.content else {
            panic!("expected a table");
        };
        assert_eq!(table.rows[0].cells[3], Cell::text("Unspecified"));
        assert_eq!(table.rows[1].cells[3], Cell::text("Baraka"));
    }

    #[test]
    fn test_huge_item_counts_saturate() {
        let ctx = ReportContext::new(
            chrono::NaiveDate::from_ymd_opt(2025, 3, 4)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
            "KES",
        );
        let json = r#"{"sales": [{"items": 9007199254740992}, {"items": 9007199254740992}]}"#;
        assert!(build_from_json(ReportKind::DailySales, json, &ctx).is_ok());

        let mut r = report();
        r.sales[0].items = u64::MAX;
        assert_eq!(compute(Some(&r)).unwrap().items_sold, u64::MAX);

        let json = r#"{"sales": [{"items": 18446744073709551615}]}"#;
        assert!(build_from_json(ReportKind::DailySales, json, &ctx).is_err());
    }

    #[test]
    fn test_recommendations() {
        let ins = compute(Some(&report())).unwrap();
        let recs = assemble(&rules(), &ins);
        assert_eq!(recs.len(), 2);
        assert!(recs[0].contains("maintain positive momentum"));
        assert!(recs[1].starts_with("Peak trading hour was 14:00 with 2 sales"));
    }
}
