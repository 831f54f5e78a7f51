use serde::Deserialize;

use crate::engine::{ReportDomain, ReportKind};
use crate::fmt;
use crate::metrics::{
    count_total, group_totals, growth_pct, rank_desc, share_pct, top_by, GroupTotal,
};
use crate::numeric;
use crate::recommend::{plural, Rule};
use crate::report::{palette, Cell, ChartKind, ChartPoint, Row, Section, ValueUnit};
use crate::thresholds::{ExpiryUrgency, StockStatus, WATCH_EXPIRY_DAYS};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductReport {
    pub products: Vec<ProductPerformance>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductPerformance {
    #[serde(deserialize_with = "numeric::identifier")]
    pub product_id: String,
    #[serde(deserialize_with = "numeric::text")]
    pub product_name: String,
    #[serde(deserialize_with = "numeric::text")]
    pub category: String,
    #[serde(deserialize_with = "numeric::quantity")]
    pub units_sold: u64,
    #[serde(deserialize_with = "numeric::amount")]
    pub revenue: f64,
    #[serde(deserialize_with = "numeric::amount")]
    pub previous_revenue: f64,
    #[serde(alias = "total_stock", deserialize_with = "numeric::quantity")]
    pub current_stock: u64,
    #[serde(deserialize_with = "numeric::quantity")]
    pub reorder_level: u64,
    #[serde(alias = "daysUntilExpiry", deserialize_with = "numeric::optional_days")]
    pub days_until_expiry: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductLine {
    pub rank: usize,
    pub product_name: String,
    pub category: String,
    pub units_sold: u64,
    pub revenue: f64,
    pub share_pct: f64,
    pub growth_pct: f64,
    pub current_stock: u64,
    pub stock_status: StockStatus,
    pub days_until_expiry: Option<i64>,
    pub expiry: Option<ExpiryUrgency>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductInsights {
    pub total_revenue: f64,
    pub total_units: u64,
    /// Ordered by revenue, highest first.
    pub ranked: Vec<ProductLine>,
    pub top_product: Option<ProductLine>,
    pub bottom_product: Option<ProductLine>,
    pub fastest_growing: Option<ProductLine>,
    pub categories: Vec<GroupTotal>,
    pub critical_stock_count: usize,
    pub expiring_count: usize,
    pub declining_count: usize,
}

pub fn compute(payload: Option<&ProductReport>) -> Option<ProductInsights> {
    let report = payload?;
    let products = &report.products;

    let total_revenue: f64 = products.iter().map(|p| p.revenue).sum();
    let total_units = count_total(products.iter().map(|p| p.units_sold));

    let ranked: Vec<ProductLine> = rank_desc(products, |p| p.revenue)
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| {
            let p = &products[idx];
            let expiry = p.days_until_expiry.map(ExpiryUrgency::classify);
            ProductLine {
                rank: pos + 1,
                product_name: p.product_name.clone(),
                category: p.category.clone(),
                units_sold: p.units_sold,
                revenue: p.revenue,
                share_pct: share_pct(p.revenue, total_revenue),
                growth_pct: growth_pct(p.revenue, p.previous_revenue),
                current_stock: p.current_stock,
                stock_status: StockStatus::classify(p.current_stock, p.reorder_level),
                days_until_expiry: p.days_until_expiry,
                expiry,
            }
        })
        .collect();

    let categories = group_totals(products, |p| super::normalise_label(&p.category), |p| p.revenue);

    Some(ProductInsights {
        total_revenue,
        total_units,
        top_product: ranked.first().cloned(),
        bottom_product: ranked.last().cloned(),
        fastest_growing: top_by(&ranked, |l| l.growth_pct).cloned(),
        categories,
        critical_stock_count: ranked
            .iter()
            .filter(|l| l.stock_status == StockStatus::Critical)
            .count(),
        expiring_count: ranked
            .iter()
            .filter(|l| l.expiry.is_some_and(|u| u.within_watch_window()))
            .count(),
        declining_count: ranked.iter().filter(|l| l.growth_pct < 0.0).count(),
        ranked,
    })
}

const TAIL_SHARE_PCT: f64 = 1.0;

pub fn rules() -> Vec<Rule<ProductInsights>> {
    vec![
        Rule::new(
            |i| i.top_product.as_ref().is_some_and(|p| p.revenue > 0.0),
            |i| match &i.top_product {
                Some(p) => format!(
                    "{} leads with {} of revenue; keep it well stocked and visible.",
                    p.product_name,
                    fmt::percent(p.share_pct)
                ),
                None => String::new(),
            },
        ),
        Rule::new(
            |i| i.critical_stock_count > 0,
            |i| {
                format!(
                    "{} at critical stock levels; restock before they sell out.",
                    plural(i.critical_stock_count, "selling product is", "selling products are")
                )
            },
        ),
        Rule::new(
            |i| i.expiring_count > 0,
            |i| {
                format!(
                    "{} within {WATCH_EXPIRY_DAYS} days; bundle or discount to move them.",
                    plural(i.expiring_count, "product expires", "products expire")
                )
            },
        ),
        Rule::new(
            |i| {
                i.ranked.len() > 1
                    && i.bottom_product.as_ref().is_some_and(|p| p.share_pct < TAIL_SHARE_PCT)
            },
            |i| match &i.bottom_product {
                Some(p) => format!(
                    "{} contributes {} of revenue; review its shelf space.",
                    p.product_name,
                    fmt::percent(p.share_pct)
                ),
                None => String::new(),
            },
        ),
        Rule::new(
            |i| i.declining_count > 0,
            |i| {
                format!(
                    "{} a declining trend against the previous period.",
                    plural(i.declining_count, "product shows", "products show")
                )
            },
        ),
    ]
}

fn sections(insights: &ProductInsights) -> Vec<Section> {
    let mut summary = vec![
        ("Total Revenue", Cell::Money(insights.total_revenue)),
        ("Units Sold", Cell::Count(insights.total_units)),
        ("Products", Cell::Count(insights.ranked.len() as u64)),
        ("Critical Stock", Cell::Count(insights.critical_stock_count as u64)),
        ("Expiring Within 30 Days", Cell::Count(insights.expiring_count as u64)),
    ];
    if let Some(p) = &insights.top_product {
        summary.push(("Top Product", Cell::text(&p.product_name)));
    }
    if let Some(p) = &insights.fastest_growing {
        summary.push(("Fastest Growing", Cell::text(&p.product_name)));
    }
    let mut out = vec![Section::summary("Summary", summary)];

    if !insights.ranked.is_empty() {
        let rows = insights
            .ranked
            .iter()
            .map(|l| {
                let cells = vec![
                    Cell::Count(l.rank as u64),
                    Cell::text(&l.product_name),
                    Cell::text(&l.category),
                    Cell::Count(l.units_sold),
                    Cell::Money(l.revenue),
                    Cell::Percent(l.share_pct),
                    Cell::Trend(l.growth_pct),
                    Cell::Count(l.current_stock),
                    Cell::text(l.stock_status.label()),
                    match l.days_until_expiry {
                        Some(d) => Cell::Days(d),
                        None => Cell::text("—"),
                    },
                ];
                // Expiry urgency outranks stock status when both apply.
                match l.expiry.filter(|u| u.within_watch_window()) {
                    Some(u) => Row::toned(cells, u.tone()),
                    None => Row::toned(cells, l.stock_status.tone()),
                }
            })
            .collect();
        out.push(Section::table(
            "Product Ranking",
            &[
                "#", "Product", "Category", "Units", "Revenue", "Share", "Growth", "Stock", "Status",
                "Expires In",
            ],
            rows,
        ));

        let points = insights
            .ranked
            .iter()
            .enumerate()
            .map(|(i, l)| ChartPoint::new(&l.product_name, l.revenue, palette(i)))
            .collect();
        out.push(Section::chart("Revenue by Product", ChartKind::Bar, ValueUnit::Money, points));
    }

    if !insights.categories.is_empty() {
        let rows = insights
            .categories
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::text(&c.key),
                    Cell::Count(c.count),
                    Cell::Money(c.total),
                    Cell::Percent(share_pct(c.total, insights.total_revenue)),
                ])
            })
            .collect();
        out.push(Section::table(
            "Revenue by Category",
            &["Category", "Products", "Revenue", "Share"],
            rows,
        ));
        let points = insights
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| ChartPoint::new(&c.key, c.total, palette(i)))
            .collect();
        out.push(Section::chart("Category Mix", ChartKind::Pie, ValueUnit::Money, points));
    }

    out
}

pub struct TopProducts;

impl ReportDomain for TopProducts {
    type Payload = ProductReport;
    type Insights = ProductInsights;

    const KIND: ReportKind = ReportKind::TopProducts;

    fn compute(payload: Option<&ProductReport>) -> Option<ProductInsights> {
        compute(payload)
    }

    fn rules() -> Vec<Rule<ProductInsights>> {
        rules()
    }

    fn sections(_payload: &ProductReport, insights: &ProductInsights) -> Vec<Section> {
        sections(insights)
    }
}
