//! Threshold-driven recommendation assembly.
//!
//! A domain supplies an ordered list of rules; every rule whose predicate
//! holds contributes exactly one entry, in list order. Entries are never
//! merged, deduplicated or re-ranked.

pub struct Rule<I> {
    pub applies: fn(&I) -> bool,
    pub message: fn(&I) -> String,
}

impl<I> Rule<I> {
    pub fn new(applies: fn(&I) -> bool, message: fn(&I) -> String) -> Self {
        Self { applies, message }
    }
}

pub fn assemble<I>(rules: &[Rule<I>], insights: &I) -> Vec<String> {
    rules
        .iter()
        .filter(|rule| (rule.applies)(insights))
        .map(|rule| (rule.message)(insights))
        .collect()
}

/// "1 product" / "3 products".
pub fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}
