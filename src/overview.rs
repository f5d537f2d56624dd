//! Filtering, ordering, and totals across many installments.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    errors::ScheduleError,
    installment::{Installment, InstallmentSummary},
    schedule::{PaymentUrgency, UrgencyThresholds},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstallmentFilter {
    #[default]
    Active,
    Archived,
    All,
}

impl InstallmentFilter {
    fn accepts(&self, installment: &Installment) -> bool {
        match self {
            InstallmentFilter::Active => !installment.archived,
            InstallmentFilter::Archived => installment.archived,
            InstallmentFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    NextPayment,
    Urgency,
    Name,
    PercentPaid,
}

impl FromStr for SortKey {
    type Err = ScheduleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "next" | "next-payment" | "date" => Ok(SortKey::NextPayment),
            "urgency" => Ok(SortKey::Urgency),
            "name" => Ok(SortKey::Name),
            "percent" | "progress" => Ok(SortKey::PercentPaid),
            other => Err(ScheduleError::validation(format!(
                "unknown sort key `{other}`"
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortKey::NextPayment => "next",
            SortKey::Urgency => "urgency",
            SortKey::Name => "name",
            SortKey::PercentPaid => "percent",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewTotals {
    pub count: usize,
    pub paid_off: usize,
    pub due_this_week: usize,
    pub outstanding_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub reference_date: NaiveDate,
    pub entries: Vec<InstallmentSummary>,
    pub totals: OverviewTotals,
}

/// Summarizes the installments that pass `filter`, ordered by `sort`.
///
/// Paid-off entries always sort after open ones for date and urgency orderings.
pub fn build_overview(
    installments: &[Installment],
    filter: InstallmentFilter,
    sort: SortKey,
    today: NaiveDate,
    thresholds: &UrgencyThresholds,
) -> Overview {
    let mut entries: Vec<InstallmentSummary> = installments
        .iter()
        .filter(|installment| filter.accepts(installment))
        .map(|installment| installment.summary(today, thresholds))
        .collect();
    entries.sort_by(|a, b| compare(a, b, sort));

    let totals = entries.iter().fold(
        OverviewTotals {
            count: entries.len(),
            ..OverviewTotals::default()
        },
        |mut totals, entry| {
            if entry.next.is_paid_off {
                totals.paid_off += 1;
            }
            if matches!(
                entry.urgency,
                Some(PaymentUrgency::High) | Some(PaymentUrgency::Medium)
            ) {
                totals.due_this_week += 1;
            }
            totals.outstanding_amount += entry.progress.amount_remaining;
            totals
        },
    );

    Overview {
        reference_date: today,
        entries,
        totals,
    }
}

fn compare(a: &InstallmentSummary, b: &InstallmentSummary, sort: SortKey) -> Ordering {
    let primary = match sort {
        SortKey::NextPayment => open_first(a.next.next_payment, b.next.next_payment),
        SortKey::Urgency => open_first(a.urgency, b.urgency)
            .then_with(|| open_first(a.next.next_payment, b.next.next_payment)),
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::PercentPaid => b.percent_paid().cmp(&a.percent_paid()),
    };
    primary.then_with(|| a.name.cmp(&b.name))
}

fn open_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::PaymentFrequency;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Installment> {
        let rent = Installment::new(
            "Rent-to-own",
            2400.0,
            200.0,
            PaymentFrequency::Monthly,
            date(2024, 1, 5),
            12,
        )
        .with_payments_made(5);
        let bike = Installment::new(
            "bike",
            300.0,
            50.0,
            PaymentFrequency::Weekly,
            date(2024, 5, 1),
            6,
        )
        .with_payments_made(6);
        let mut tv = Installment::new(
            "TV",
            800.0,
            100.0,
            PaymentFrequency::Biweekly,
            date(2024, 5, 20),
            8,
        );
        tv.archive();
        let course = Installment::new(
            "Course",
            600.0,
            100.0,
            PaymentFrequency::Weekly,
            date(2024, 5, 28),
            6,
        );
        vec![rent, bike, tv, course]
    }

    #[test]
    fn active_overview_sorted_by_next_payment() {
        let overview = build_overview(
            &sample(),
            InstallmentFilter::Active,
            SortKey::NextPayment,
            date(2024, 5, 30),
            &UrgencyThresholds::default(),
        );
        let names: Vec<_> = overview.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Course", "Rent-to-own", "bike"]);
        assert_eq!(overview.totals.count, 3);
        assert_eq!(overview.totals.paid_off, 1);
        // Course overdue (May 28) and rent due Jun 5
        assert_eq!(overview.totals.due_this_week, 2);
        assert_eq!(overview.totals.outstanding_amount, 1400.0 + 600.0);
    }

    #[test]
    fn archived_filter_and_name_sort() {
        let archived = build_overview(
            &sample(),
            InstallmentFilter::Archived,
            SortKey::Name,
            date(2024, 5, 30),
            &UrgencyThresholds::default(),
        );
        assert_eq!(archived.entries.len(), 1);
        assert_eq!(archived.entries[0].name, "TV");

        let all = build_overview(
            &sample(),
            InstallmentFilter::All,
            SortKey::Name,
            date(2024, 5, 30),
            &UrgencyThresholds::default(),
        );
        let names: Vec<_> = all.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["bike", "Course", "Rent-to-own", "TV"]);
    }

    #[test]
    fn percent_sort_is_descending() {
        let overview = build_overview(
            &sample(),
            InstallmentFilter::Active,
            SortKey::PercentPaid,
            date(2024, 5, 30),
            &UrgencyThresholds::default(),
        );
        let percents: Vec<_> = overview.entries.iter().map(|e| e.percent_paid()).collect();
        assert_eq!(percents, vec![100, 42, 0]);
    }

    #[test]
    fn sort_keys_parse() {
        assert_eq!("urgency".parse::<SortKey>(), Ok(SortKey::Urgency));
        assert!("size".parse::<SortKey>().is_err());
    }
}
