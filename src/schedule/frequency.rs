use std::{fmt, str::FromStr};

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ScheduleError;

/// Recurrence interval between two installment payments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 3] = [
        PaymentFrequency::Weekly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Monthly,
    ];

    /// Projects `anchor` forward by `steps` whole intervals.
    ///
    /// Monthly steps are measured from the anchor itself so a clamped short month never
    /// drags later occurrences earlier (Jan 31 → Feb 29 → Mar 31). Returns `None` when the
    /// result falls outside the representable calendar.
    pub fn advance(&self, anchor: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            PaymentFrequency::Weekly => add_days(anchor, u64::from(steps) * 7),
            PaymentFrequency::Biweekly => add_days(anchor, u64::from(steps) * 14),
            PaymentFrequency::Monthly => anchor.checked_add_months(Months::new(steps)),
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Monthly => 12,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "Weekly",
            PaymentFrequency::Biweekly => "Every 2 Weeks",
            PaymentFrequency::Monthly => "Monthly",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFrequency {
    type Err = ScheduleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PaymentFrequency::Weekly),
            "biweekly" | "bi-weekly" => Ok(PaymentFrequency::Biweekly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            _ => Err(ScheduleError::UnknownFrequency(value.to_string())),
        }
    }
}

fn add_days(anchor: NaiveDate, days: u64) -> Option<NaiveDate> {
    anchor.checked_add_days(Days::new(days))
}
