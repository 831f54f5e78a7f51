pub mod commission;
pub mod daily;
pub mod inventory;
pub mod products;
pub mod reps;
pub mod sales;

use crate::metrics::{count_total, group_totals, share_pct};
use crate::report::{palette, ChartPoint};

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentShare {
    pub payment_type: String,
    pub amount: f64,
    pub transactions: u64,
    pub share_pct: f64,
}

/// Share of `total` per payment type, groups in order of first appearance.
/// Blank payment types are reported as "Unspecified".
pub(crate) fn payment_shares<T>(
    items: &[T],
    payment_type: impl Fn(&T) -> &str,
    amount: impl Fn(&T) -> f64,
    transactions: impl Fn(&T) -> u64,
    total: f64,
) -> Vec<PaymentShare> {
    let groups = group_totals(items, |i| normalise_label(payment_type(i)), &amount);
    groups
        .into_iter()
        .map(|g| {
            let count = count_total(
                items
                    .iter()
                    .filter(|i| normalise_label(payment_type(*i)) == g.key)
                    .map(&transactions),
            );
            PaymentShare {
                share_pct: share_pct(g.total, total),
                payment_type: g.key,
                amount: g.total,
                transactions: count,
            }
        })
        .collect()
}

pub(crate) fn normalise_label(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "Unspecified".to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn cash_share(shares: &[PaymentShare]) -> f64 {
    shares
        .iter()
        .filter(|s| s.payment_type.eq_ignore_ascii_case("cash"))
        .map(|s| s.share_pct)
        .sum()
}

pub(crate) fn payment_chart(shares: &[PaymentShare]) -> Vec<ChartPoint> {
    shares
        .iter()
        .enumerate()
        .map(|(i, s)| ChartPoint::new(&s.payment_type, s.amount, palette(i)))
        .collect()
}
