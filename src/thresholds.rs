//! Shared threshold table for stock health and expiry urgency.
//!
//! Every report that classifies stock or expiry goes through this module so
//! inventory and product reports agree on boundaries. All boundaries are
//! inclusive upper bounds (`<=`).

use crate::metrics::share_pct;
use crate::report::Tone;

/// Stock at or below this share of its reorder level is critical.
pub const CRITICAL_STOCK_PCT: f64 = 25.0;

/// Stock at or below this share of its reorder level is low.
pub const LOW_STOCK_PCT: f64 = 75.0;

/// Batches expiring within this many days (or already expired) are urgent.
pub const URGENT_EXPIRY_DAYS: i64 = 7;
pub const WARNING_EXPIRY_DAYS: i64 = 15;
pub const WATCH_EXPIRY_DAYS: i64 = 30;

/// Visual cap for stock-health bars.
pub const HEALTH_BAR_CAP_PCT: f64 = 200.0;

/// Payment type whose share triggers the digital-payments recommendation.
pub const CASH_SHARE_ALERT_PCT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Critical,
    Low,
    Adequate,
}

impl StockStatus {
    pub fn from_health(health_pct: f64) -> Self {
        if health_pct <= CRITICAL_STOCK_PCT {
            Self::Critical
        } else if health_pct <= LOW_STOCK_PCT {
            Self::Low
        } else {
            Self::Adequate
        }
    }

    /// A product without a reorder level has nothing to fall below.
    pub fn classify(total_stock: u64, reorder_level: u64) -> Self {
        if reorder_level == 0 {
            return Self::Adequate;
        }
        Self::from_health(stock_health_pct(total_stock, reorder_level))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Low => "Low",
            Self::Adequate => "Adequate",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Critical => Tone::Critical,
            Self::Low => Tone::Warning,
            Self::Adequate => Tone::Good,
        }
    }
}

/// Current stock as a percentage of reorder level; 0 when no reorder level is set.
pub fn stock_health_pct(total_stock: u64, reorder_level: u64) -> f64 {
    share_pct(total_stock as f64, reorder_level as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryUrgency {
    Urgent,
    Warning,
    Watch,
    Normal,
}

impl ExpiryUrgency {
    pub fn classify(days_until_expiry: i64) -> Self {
        if days_until_expiry <= URGENT_EXPIRY_DAYS {
            Self::Urgent
        } else if days_until_expiry <= WARNING_EXPIRY_DAYS {
            Self::Warning
        } else if days_until_expiry <= WATCH_EXPIRY_DAYS {
            Self::Watch
        } else {
            Self::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::Warning => "Warning",
            Self::Watch => "Watch",
            Self::Normal => "Normal",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Urgent => Tone::Critical,
            Self::Warning => Tone::Warning,
            Self::Watch => Tone::Caution,
            Self::Normal => Tone::Neutral,
        }
    }

    pub fn within_watch_window(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_boundaries() {
        assert_eq!(StockStatus::classify(10, 40), StockStatus::Critical);
        assert_eq!(StockStatus::classify(20, 40), StockStatus::Low);
        assert_eq!(StockStatus::classify(30, 40), StockStatus::Low);
        assert_eq!(StockStatus::classify(35, 40), StockStatus::Adequate);
        assert_eq!(StockStatus::classify(0, 40), StockStatus::Critical);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(StockStatus::from_health(25.0), StockStatus::Critical);
        assert_eq!(StockStatus::from_health(25.1), StockStatus::Low);
        assert_eq!(StockStatus::from_health(75.0), StockStatus::Low);
        assert_eq!(StockStatus::from_health(75.1), StockStatus::Adequate);
    }

    #[test]
    fn test_zero_reorder_level_is_adequate() {
        assert_eq!(StockStatus::classify(0, 0), StockStatus::Adequate);
        assert_eq!(stock_health_pct(10, 0), 0.0);
    }

    #[test]
    fn test_expiry_tiers() {
        assert_eq!(ExpiryUrgency::classify(-2), ExpiryUrgency::Urgent);
        assert_eq!(ExpiryUrgency::classify(5), ExpiryUrgency::Urgent);
        assert_eq!(ExpiryUrgency::classify(7), ExpiryUrgency::Urgent);
        assert_eq!(ExpiryUrgency::classify(8), ExpiryUrgency::Warning);
        assert_eq!(ExpiryUrgency::classify(15), ExpiryUrgency::Warning);
        assert_eq!(ExpiryUrgency::classify(30), ExpiryUrgency::Watch);
        assert_eq!(ExpiryUrgency::classify(31), ExpiryUrgency::Normal);
    }

    #[test]
    fn test_urgent_gets_highest_tone() {
        assert_eq!(ExpiryUrgency::classify(5).tone(), Tone::Critical);
        assert_eq!(StockStatus::Critical.tone(), Tone::Critical);
    }
}
