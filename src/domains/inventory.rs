use serde::Deserialize;

use crate::engine::{ReportDomain, ReportKind};
use crate::fmt;
use crate::metrics::{bottom_by, safe_div, share_pct, top_by};
use crate::numeric;
use crate::recommend::{plural, Rule};
use crate::report::{palette, Cell, ChartKind, ChartPoint, Row, Section, ValueUnit};
use crate::thresholds::{
    stock_health_pct, ExpiryUrgency, StockStatus, HEALTH_BAR_CAP_PCT, WATCH_EXPIRY_DAYS,
};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InventoryReport {
    pub summary: InventorySummary,
    pub low_stock_products: Vec<LowStockProduct>,
    pub expiring_batches: Vec<ExpiringBatch>,
    pub category_breakdown: Vec<CategoryStock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventorySummary {
    #[serde(deserialize_with = "numeric::quantity")]
    pub total_products: u64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub total_units: u64,
    #[serde(deserialize_with = "numeric::amount")]
    pub total_stock_value: f64,
    /// Cost value of stock that left inventory during the period.
    #[serde(deserialize_with = "numeric::amount")]
    pub value_moved: f64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub period_days: u64,
}

impl Default for InventorySummary {
    fn default() -> Self {
        Self {
            total_products: 0,
            total_units: 0,
            total_stock_value: 0.0,
            value_moved: 0.0,
            period_days: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LowStockProduct {
    #[serde(deserialize_with = "numeric::identifier")]
    pub product_id: String,
    #[serde(deserialize_with = "numeric::text")]
    pub product_name: String,
    #[serde(deserialize_with = "numeric::text")]
    pub category: String,
    #[serde(deserialize_with = "numeric::quantity")]
    pub total_stock: u64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub reorder_level: u64,
    #[serde(deserialize_with = "numeric::amount")]
    pub unit_cost: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpiringBatch {
    #[serde(deserialize_with = "numeric::identifier")]
    pub batch_number: String,
    #[serde(deserialize_with = "numeric::text")]
    pub product_name: String,
    #[serde(deserialize_with = "numeric::quantity")]
    pub quantity: u64,
    #[serde(deserialize_with = "numeric::text")]
    pub expiry_date: String,
    #[serde(alias = "daysUntilExpiry", deserialize_with = "numeric::days")]
    pub days_until_expiry: i64,
    #[serde(deserialize_with = "numeric::amount")]
    pub unit_cost: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryStock {
    #[serde(deserialize_with = "numeric::text")]
    pub category: String,
    #[serde(deserialize_with = "numeric::quantity")]
    pub product_count: u64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub units: u64,
    #[serde(deserialize_with = "numeric::amount")]
    pub stock_value: f64,
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StockLine {
    pub product_name: String,
    pub category: String,
    pub total_stock: u64,
    pub reorder_level: u64,
    pub health_pct: f64,
    pub status: StockStatus,
    pub units_to_reorder_level: u64,
    pub restock_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryLine {
    pub batch_number: String,
    pub product_name: String,
    pub quantity: u64,
    pub expiry_date: String,
    pub days_until_expiry: i64,
    pub urgency: ExpiryUrgency,
    pub value_at_risk: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub product_count: u64,
    pub stock_value: f64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryInsights {
    pub total_stock_value: f64,
    pub total_products: u64,
    pub total_units: u64,
    pub stock_lines: Vec<StockLine>,
    pub critical_count: usize,
    pub low_count: usize,
    pub adequate_count: usize,
    pub restock_cost: f64,
    pub most_critical: Option<StockLine>,
    pub expiry_lines: Vec<ExpiryLine>,
    pub urgent_count: usize,
    pub warning_count: usize,
    pub watch_count: usize,
    pub value_at_risk: f64,
    pub categories: Vec<CategoryShare>,
    pub top_category: Option<CategoryShare>,
    /// Annualised: value moved over stock value, scaled from the period to 365 days.
    pub turnover_rate: f64,
}

pub fn compute(payload: Option<&InventoryReport>) -> Option<InventoryInsights> {
    let report = payload?;

    let stock_lines: Vec<StockLine> = report
        .low_stock_products
        .iter()
        .map(|p| {
            let units_to_reorder_level = p.reorder_level.saturating_sub(p.total_stock);
            StockLine {
                product_name: p.product_name.clone(),
                category: p.category.clone(),
                total_stock: p.total_stock,
                reorder_level: p.reorder_level,
                health_pct: stock_health_pct(p.total_stock, p.reorder_level),
                status: StockStatus::classify(p.total_stock, p.reorder_level),
                units_to_reorder_level,
                restock_cost: units_to_reorder_level as f64 * p.unit_cost,
            }
        })
        .collect();

    let count_status = |s: StockStatus| stock_lines.iter().filter(|l| l.status == s).count();
    let critical_count = count_status(StockStatus::Critical);
    let low_count = count_status(StockStatus::Low);
    let adequate_count = count_status(StockStatus::Adequate);
    let restock_cost = stock_lines.iter().map(|l| l.restock_cost).sum();
    let with_reorder_level: Vec<StockLine> = stock_lines
        .iter()
        .filter(|l| l.reorder_level > 0)
        .cloned()
        .collect();
    let most_critical = bottom_by(&with_reorder_level, |l| l.health_pct).cloned();

    let expiry_lines: Vec<ExpiryLine> = report
        .expiring_batches
        .iter()
        .map(|b| ExpiryLine {
            batch_number: b.batch_number.clone(),
            product_name: b.product_name.clone(),
            quantity: b.quantity,
            expiry_date: b.expiry_date.clone(),
            days_until_expiry: b.days_until_expiry,
            urgency: ExpiryUrgency::classify(b.days_until_expiry),
            value_at_risk: b.quantity as f64 * b.unit_cost,
        })
        .collect();
    let count_urgency =
        |u: ExpiryUrgency| expiry_lines.iter().filter(|l| l.urgency == u).count();
    let urgent_count = count_urgency(ExpiryUrgency::Urgent);
    let warning_count = count_urgency(ExpiryUrgency::Warning);
    let watch_count = count_urgency(ExpiryUrgency::Watch);
    let value_at_risk = expiry_lines
        .iter()
        .filter(|l| l.urgency.within_watch_window())
        .map(|l| l.value_at_risk)
        .sum();

    let category_total: f64 = report.category_breakdown.iter().map(|c| c.stock_value).sum();
    let total_stock_value = if report.summary.total_stock_value > 0.0 {
        report.summary.total_stock_value
    } else {
        category_total
    };
    let categories: Vec<CategoryShare> = report
        .category_breakdown
        .iter()
        .map(|c| CategoryShare {
            category: c.category.clone(),
            product_count: c.product_count,
            stock_value: c.stock_value,
            share_pct: share_pct(c.stock_value, category_total),
        })
        .collect();
    let top_category = top_by(&categories, |c| c.stock_value).cloned();

    let turnover_rate = safe_div(report.summary.value_moved, total_stock_value)
        * safe_div(365.0, report.summary.period_days as f64);

    Some(InventoryInsights {
        total_stock_value,
        total_products: report.summary.total_products,
        total_units: report.summary.total_units,
        stock_lines,
        critical_count,
        low_count,
        adequate_count,
        restock_cost,
        most_critical,
        expiry_lines,
        urgent_count,
        warning_count,
        watch_count,
        value_at_risk,
        categories,
        top_category,
        turnover_rate,
    })
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

const SLOW_TURNOVER: f64 = 2.0;
const CATEGORY_CONCENTRATION_PCT: f64 = 50.0;

pub fn rules() -> Vec<Rule<InventoryInsights>> {
    vec![
        Rule::new(
            |i| i.critical_count > 0,
            |i| {
                let worst = i
                    .most_critical
                    .as_ref()
                    .map(|l| {
                        format!(
                            "; {} is at {} of its reorder level",
                            l.product_name,
                            fmt::percent(l.health_pct)
                        )
                    })
                    .unwrap_or_default();
                format!(
                    "Restock {} at critical stock levels immediately{worst}.",
                    plural(i.critical_count, "product", "products")
                )
            },
        ),
        Rule::new(
            |i| i.urgent_count > 0,
            |i| {
                format!(
                    "Clear or discount {} expiring within 7 days before they become a write-off.",
                    plural(i.urgent_count, "batch", "batches")
                )
            },
        ),
        Rule::new(
            |i| i.low_count > 0,
            |i| {
                format!(
                    "Plan reorders for {} running low (26-75% of reorder level).",
                    plural(i.low_count, "product", "products")
                )
            },
        ),
        Rule::new(
            |i| i.warning_count + i.watch_count > 0,
            |i| {
                format!(
                    "Schedule promotions for {} expiring within {WATCH_EXPIRY_DAYS} days.",
                    plural(i.warning_count + i.watch_count, "batch", "batches")
                )
            },
        ),
        Rule::new(
            |i| i.turnover_rate > 0.0 && i.turnover_rate < SLOW_TURNOVER,
            |i| {
                format!(
                    "Inventory turns over only {} per year; review slow-moving stock.",
                    fmt::ratio(i.turnover_rate)
                )
            },
        ),
        Rule::new(
            |i| {
                i.top_category
                    .as_ref()
                    .is_some_and(|c| c.share_pct > CATEGORY_CONCENTRATION_PCT)
            },
            |i| match &i.top_category {
                Some(c) => format!(
                    "{} holds {} of stock value; consider spreading investment across categories.",
                    c.category,
                    fmt::percent(c.share_pct)
                ),
                None => String::new(),
            },
        ),
        Rule::new(
            |i| i.critical_count == 0 && i.low_count == 0 && i.urgent_count == 0,
            |_| "Stock levels are healthy; keep the current reorder schedule.".to_string(),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn sections(insights: &InventoryInsights) -> Vec<Section> {
    let mut out = vec![Section::summary(
        "Summary",
        vec![
            ("Total Stock Value", Cell::Money(insights.total_stock_value)),
            ("Products", Cell::Count(insights.total_products)),
            ("Units in Stock", Cell::Count(insights.total_units)),
            ("Turnover Rate", Cell::Ratio(insights.turnover_rate)),
            ("Critical Stock", Cell::Count(insights.critical_count as u64)),
            ("Low Stock", Cell::Count(insights.low_count as u64)),
            ("Restock Cost", Cell::Money(insights.restock_cost)),
            (
                "Expiring Within 30 Days",
                Cell::Count(
                    (insights.urgent_count + insights.warning_count + insights.watch_count) as u64,
                ),
            ),
            ("Value at Risk", Cell::Money(insights.value_at_risk)),
        ],
    )];

    if !insights.stock_lines.is_empty() {
        let rows = insights
            .stock_lines
            .iter()
            .map(|l| {
                Row::toned(
                    vec![
                        Cell::text(&l.product_name),
                        Cell::text(&l.category),
                        Cell::Count(l.total_stock),
                        Cell::Count(l.reorder_level),
                        Cell::Percent(l.health_pct),
                        Cell::text(l.status.label()),
                        Cell::Money(l.restock_cost),
                    ],
                    l.status.tone(),
                )
            })
            .collect();
        out.push(Section::table(
            "Low Stock Products",
            &["Product", "Category", "Stock", "Reorder Level", "Health", "Status", "Restock Cost"],
            rows,
        ));

        let points = insights
            .stock_lines
            .iter()
            .map(|l| {
                ChartPoint::new(
                    &l.product_name,
                    l.health_pct.min(HEALTH_BAR_CAP_PCT),
                    l.status.tone().color(),
                )
            })
            .collect();
        out.push(Section::chart("Stock Health", ChartKind::Bar, ValueUnit::Percent, points));
    }

    if !insights.expiry_lines.is_empty() {
        let rows = insights
            .expiry_lines
            .iter()
            .map(|l| {
                Row::toned(
                    vec![
                        Cell::text(&l.batch_number),
                        Cell::text(&l.product_name),
                        Cell::Count(l.quantity),
                        Cell::Date(l.expiry_date.clone()),
                        Cell::Days(l.days_until_expiry),
                        Cell::text(l.urgency.label()),
                        Cell::Money(l.value_at_risk),
                    ],
                    l.urgency.tone(),
                )
            })
            .collect();
        out.push(Section::table(
            "Expiring Batches",
            &["Batch", "Product", "Quantity", "Expiry Date", "Days Left", "Urgency", "Value"],
            rows,
        ));
    }

    if !insights.categories.is_empty() {
        let rows = insights
            .categories
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::text(&c.category),
                    Cell::Count(c.product_count),
                    Cell::Money(c.stock_value),
                    Cell::Percent(c.share_pct),
                ])
            })
            .collect();
        out.push(Section::table(
            "Category Distribution",
            &["Category", "Products", "Stock Value", "Share"],
            rows,
        ));

        let points = insights
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| ChartPoint::new(&c.category, c.stock_value, palette(i)))
            .collect();
        out.push(Section::chart(
            "Stock Value by Category",
            ChartKind::Pie,
            ValueUnit::Money,
            points,
        ));
    }

    out
}

pub struct Inventory;

impl ReportDomain for Inventory {
    type Payload = InventoryReport;
    type Insights = InventoryInsights;

    const KIND: ReportKind = ReportKind::Inventory;

    fn compute(payload: Option<&InventoryReport>) -> Option<InventoryInsights> {
        compute(payload)
    }

    fn rules() -> Vec<Rule<InventoryInsights>> {
        rules()
    }

    fn sections(_payload: &InventoryReport, insights: &InventoryInsights) -> Vec<Section> {
        sections(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::assemble;

    fn product(name: &str, stock: u64, reorder: u64) -> LowStockProduct {
        LowStockProduct {
            product_id: name.to_lowercase(),
            product_name: name.to_string(),
            category: "Dairy".to_string(),
            total_stock: stock,
            reorder_level: reorder,
            unit_cost: 50.0,
        }
    }

    fn batch(days: i64) -> ExpiringBatch {
        ExpiringBatch {
            batch_number: format!("B-{days}"),
            product_name: "Yoghurt".to_string(),
            quantity: 10,
            expiry_date: "2025-03-10".to_string(),
            days_until_expiry: days,
            unit_cost: 20.0,
        }
    }

    #[test]
    fn test_absent_payload_yields_none() {
        assert!(compute(None).is_none());
    }

    #[test]
    fn test_critical_and_adequate_classification() {
        let report = InventoryReport {
            low_stock_products: vec![product("Milk", 10, 40), product("Butter", 35, 40)],
            ..Default::default()
        };
        let ins = compute(Some(&report)).unwrap();
        assert_eq!(ins.stock_lines[0].status, StockStatus::Critical);
        assert_eq!(ins.stock_lines[0].health_pct, 25.0);
        assert_eq!(ins.stock_lines[1].status, StockStatus::Adequate);
        assert_eq!(ins.critical_count, 1);
        assert_eq!(ins.adequate_count, 1);
        assert_eq!(ins.most_critical.as_ref().unwrap().product_name, "Milk");
        // 30 units short at 50 each, Butter 5 short
        assert_eq!(ins.restock_cost, 1500.0 + 250.0);
    }

    #[test]
    fn test_expiry_urgency_and_value_at_risk() {
        let report = InventoryReport {
            expiring_batches: vec![batch(5), batch(12), batch(25), batch(60)],
            ..Default::default()
        };
        let ins = compute(Some(&report)).unwrap();
        assert_eq!(ins.expiry_lines[0].urgency, ExpiryUrgency::Urgent);
        assert_eq!(ins.urgent_count, 1);
        assert_eq!(ins.warning_count, 1);
        assert_eq!(ins.watch_count, 1);
        // The 60-day batch is outside the watch window
        assert_eq!(ins.value_at_risk, 600.0);
    }

    #[test]
    fn test_turnover_is_annualised_and_guarded() {
        let mut report = InventoryReport::default();
        report.summary.total_stock_value = 100_000.0;
        report.summary.value_moved = 50_000.0;
        report.summary.period_days = 73;
        let ins = compute(Some(&report)).unwrap();
        assert!((ins.turnover_rate - 2.5).abs() < 1e-9);

        report.summary.total_stock_value = 0.0;
        assert_eq!(compute(Some(&report)).unwrap().turnover_rate, 0.0);

        report.summary.total_stock_value = 100_000.0;
        report.summary.period_days = 0;
        assert_eq!(compute(Some(&report)).unwrap().turnover_rate, 0.0);
    }

    #[test]
    fn test_category_shares_with_zero_total() {
        let report = InventoryReport {
            category_breakdown: vec![CategoryStock {
                category: "Dairy".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let ins = compute(Some(&report)).unwrap();
        assert_eq!(ins.categories[0].share_pct, 0.0);
        assert_eq!(ins.total_stock_value, 0.0);
    }

    #[test]
    fn test_stock_value_falls_back_to_categories() {
        let report = InventoryReport {
            category_breakdown: vec![
                CategoryStock {
                    category: "Dairy".into(),
                    stock_value: 300.0,
                    ..Default::default()
                },
                CategoryStock {
                    category: "Bakery".into(),
                    stock_value: 100.0,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let ins = compute(Some(&report)).unwrap();
        assert_eq!(ins.total_stock_value, 400.0);
        assert_eq!(ins.categories[0].share_pct, 75.0);
        assert_eq!(ins.top_category.unwrap().category, "Dairy");
    }

    #[test]
    fn test_recommendations_in_rule_order() {
        let report = InventoryReport {
            low_stock_products: vec![product("Milk", 10, 40), product("Eggs", 20, 40)],
            expiring_batches: vec![batch(5)],
            ..Default::default()
        };
        let ins = compute(Some(&report)).unwrap();
        let recs = assemble(&rules(), &ins);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].starts_with("Restock 1 product"), "got: {}", recs[0]);
        assert!(recs[0].contains("Milk is at 25%"));
        assert!(recs[1].starts_with("Clear or discount 1 batch"));
        assert!(recs[2].starts_with("Plan reorders for 1 product"));
    }

    #[test]
    fn test_healthy_inventory_gets_single_reassurance() {
        let report = InventoryReport {
            low_stock_products: vec![product("Milk", 80, 40)],
            ..Default::default()
        };
        let ins = compute(Some(&report)).unwrap();
        let recs = assemble(&rules(), &ins);
        assert_eq!(recs, vec!["Stock levels are healthy; keep the current reorder schedule."]);
    }

    #[test]
    fn test_decodes_api_payload() {
        let json = r#"{
            "summary": {"total_products": "120", "total_stock_value": 250000, "value_moved": "125000.00", "period_days": 30},
            "lowStockProducts": [{"product_id": 7, "product_name": "Milk", "total_stock": 10, "reorder_level": 40}],
            "expiringBatches": [{"batch_number": "B1", "product_name": "Milk", "quantity": 5, "daysUntilExpiry": 5}]
        }"#;
        let report: InventoryReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.summary.total_products, 120);
        assert_eq!(report.low_stock_products[0].product_id, "7");
        assert_eq!(report.expiring_batches[0].days_until_expiry, 5);
        assert_eq!(report.summary.period_days, 30);
    }
}
