use std::fmt;

use serde::{Deserialize, Serialize};

const DEFAULT_DUE_SOON_DAYS: i64 = 7;

/// Qualitative bucket for how pressing the next payment is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentUrgency {
    High,
    Medium,
    Low,
}

impl PaymentUrgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentUrgency::High => "high",
            PaymentUrgency::Medium => "medium",
            PaymentUrgency::Low => "low",
        }
    }
}

impl fmt::Display for PaymentUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day boundaries separating the urgency buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyThresholds {
    /// Last day (inclusive) still counted as medium urgency.
    pub due_soon_days: i64,
}

impl Default for UrgencyThresholds {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

impl UrgencyThresholds {
    /// Overdue or due today is high, within the due-soon window medium, anything later low.
    pub fn classify(&self, days_until_payment: i64) -> PaymentUrgency {
        if days_until_payment <= 0 {
            PaymentUrgency::High
        } else if days_until_payment <= self.due_soon_days {
            PaymentUrgency::Medium
        } else {
            PaymentUrgency::Low
        }
    }
}

/// Classifies with the default thresholds.
pub fn get_payment_urgency(days_until_payment: i64) -> PaymentUrgency {
    UrgencyThresholds::default().classify(days_until_payment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_boundaries() {
        assert_eq!(get_payment_urgency(-5), PaymentUrgency::High);
        assert_eq!(get_payment_urgency(0), PaymentUrgency::High);
        assert_eq!(get_payment_urgency(1), PaymentUrgency::Medium);
        assert_eq!(get_payment_urgency(7), PaymentUrgency::Medium);
        assert_eq!(get_payment_urgency(8), PaymentUrgency::Low);
    }

    #[test]
    fn custom_window_moves_medium_boundary() {
        let thresholds = UrgencyThresholds { due_soon_days: 3 };
        assert_eq!(thresholds.classify(3), PaymentUrgency::Medium);
        assert_eq!(thresholds.classify(4), PaymentUrgency::Low);
    }

    #[test]
    fn high_sorts_first() {
        let mut levels = vec![
            PaymentUrgency::Low,
            PaymentUrgency::High,
            PaymentUrgency::Medium,
        ];
        levels.sort();
        assert_eq!(
            levels,
            vec![
                PaymentUrgency::High,
                PaymentUrgency::Medium,
                PaymentUrgency::Low
            ]
        );
    }
}
