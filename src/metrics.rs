//! Guarded arithmetic shared by every report calculator.

/// Division that yields 0 instead of NaN/∞ for a zero or non-finite denominator.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let q = numerator / denominator;
    if q.is_finite() {
        q
    } else {
        0.0
    }
}

/// `part` as a percentage of `total`, clamped to `[0, ∞)`.
pub fn share_pct(part: f64, total: f64) -> f64 {
    let pct = safe_div(part, total) * 100.0;
    if pct.is_finite() {
        pct.max(0.0)
    } else {
        0.0
    }
}

/// Period-over-period growth.
///
/// A zero previous period with a positive current one counts as exactly
/// +100%; there is no matching negative case.
pub fn growth_pct(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// First item with the strictly greatest key. Ties keep the earlier item.
pub fn top_by<T, F>(items: &[T], key: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    items.iter().fold(None, |best: Option<&T>, item| match best {
        Some(b) if key(item) <= key(b) => Some(b),
        _ => Some(item),
    })
}

/// First item with the strictly smallest key. Ties keep the earlier item.
pub fn bottom_by<T, F>(items: &[T], key: F) -> Option<&T>
where
    F: Fn(&T) -> f64,
{
    items.iter().fold(None, |worst: Option<&T>, item| match worst {
        Some(w) if key(item) >= key(w) => Some(w),
        _ => Some(item),
    })
}

/// Indices of `items` ordered by `key` descending; equal keys keep input order.
pub fn rank_desc<T, F>(items: &[T], key: F) -> Vec<usize>
where
    F: Fn(&T) -> f64,
{
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| key(&items[b]).total_cmp(&key(&items[a])));
    order
}

/// Sum of counts, saturating at `u64::MAX`.
pub fn count_total<I>(counts: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    counts.into_iter().fold(0, u64::saturating_add)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
    pub count: u64,
}

/// Sum `value` per `key`, groups in order of first appearance.
pub fn group_totals<T, K, V>(items: &[T], key: K, value: V) -> Vec<GroupTotal>
where
    K: Fn(&T) -> String,
    V: Fn(&T) -> f64,
{
    let mut groups: Vec<GroupTotal> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|g| g.key == k) {
            Some(g) => {
                g.total += value(item);
                g.count = g.count.saturating_add(1);
            }
            None => groups.push(GroupTotal {
                key: k,
                total: value(item),
                count: 1,
            }),
        }
    }
    groups
}
