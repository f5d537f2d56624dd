//! Projection of the next due date for an installment schedule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::frequency::PaymentFrequency;

/// `days_until_payment` reported when no payment is upcoming.
pub const NO_UPCOMING_PAYMENT: i64 = -1;

/// Outcome of projecting an installment schedule against a reference day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NextPaymentResult {
    pub next_payment: Option<NaiveDate>,
    pub is_paid_off: bool,
    pub days_until_payment: i64,
}

impl NextPaymentResult {
    pub fn paid_off() -> Self {
        Self {
            next_payment: None,
            is_paid_off: true,
            days_until_payment: NO_UPCOMING_PAYMENT,
        }
    }

    pub fn is_overdue(&self) -> bool {
        !self.is_paid_off && self.days_until_payment < 0
    }
}

/// Projects the next due date of a schedule relative to `today`.
///
/// Negative or zero counts are treated as a settled schedule rather than an error so the
/// caller can always render something. An `end_date` caps the schedule: a projection
/// beyond it means the loan is paid off.
pub fn calculate_next_payment_date(
    first_payment_date: NaiveDate,
    frequency: PaymentFrequency,
    payments_made: i32,
    number_of_payments: i32,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> NextPaymentResult {
    if payments_made < 0 || number_of_payments <= 0 {
        tracing::warn!(
            payments_made,
            number_of_payments,
            "degenerate payment counts; treating schedule as paid off"
        );
        return NextPaymentResult::paid_off();
    }
    if payments_made >= number_of_payments {
        return NextPaymentResult::paid_off();
    }

    let Some(projected) = frequency.advance(first_payment_date, payments_made as u32) else {
        tracing::warn!(
            %first_payment_date,
            %frequency,
            payments_made,
            "projection leaves the supported calendar; treating schedule as paid off"
        );
        return NextPaymentResult::paid_off();
    };
    if end_date.is_some_and(|end| projected > end) {
        tracing::debug!(%projected, ?end_date, "projection passed end date");
        return NextPaymentResult::paid_off();
    }

    NextPaymentResult {
        next_payment: Some(projected),
        is_paid_off: false,
        days_until_payment: (projected - today).num_days(),
    }
}

/// Date of the last scheduled payment, capped by `end_date`.
///
/// A schedule running past the supported calendar ends at `end_date`, if any.
pub fn estimated_final_payment(
    first_payment_date: NaiveDate,
    frequency: PaymentFrequency,
    number_of_payments: i32,
    end_date: Option<NaiveDate>,
) -> Option<NaiveDate> {
    if number_of_payments <= 0 {
        return None;
    }
    let Some(last) = frequency.advance(first_payment_date, (number_of_payments - 1) as u32)
    else {
        tracing::warn!(
            %first_payment_date,
            %frequency,
            number_of_payments,
            "final payment leaves the supported calendar"
        );
        return end_date;
    };
    Some(match end_date {
        Some(end) if end < last => end,
        _ => last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn settled_counts_report_paid_off() {
        let today = date(2024, 5, 1);
        for (made, total) in [(12, 12), (13, 12), (0, 0), (-1, 12), (3, -4)] {
            let result = calculate_next_payment_date(
                date(2024, 1, 1),
                PaymentFrequency::Monthly,
                made,
                total,
                None,
                today,
            );
            assert_eq!(result, NextPaymentResult::paid_off(), "{made}/{total}");
        }
    }

    #[test]
    fn monthly_projection_clamps_february() {
        let result = calculate_next_payment_date(
            date(2024, 1, 31),
            PaymentFrequency::Monthly,
            1,
            6,
            None,
            date(2024, 2, 20),
        );
        assert_eq!(result.next_payment, Some(date(2024, 2, 29)));
        assert_eq!(result.days_until_payment, 9);
        assert!(!result.is_paid_off);
    }

    #[test]
    fn weekly_projection_and_overdue_days() {
        let result = calculate_next_payment_date(
            date(2024, 3, 1),
            PaymentFrequency::Weekly,
            3,
            10,
            None,
            date(2024, 3, 25),
        );
        assert_eq!(result.next_payment, Some(date(2024, 3, 22)));
        assert_eq!(result.days_until_payment, -3);
        assert!(result.is_overdue());
    }

    #[test]
    fn end_date_caps_the_schedule() {
        let capped = calculate_next_payment_date(
            date(2024, 1, 1),
            PaymentFrequency::Monthly,
            6,
            12,
            Some(date(2024, 6, 15)),
            date(2024, 6, 20),
        );
        assert_eq!(capped, NextPaymentResult::paid_off());

        let on_end = calculate_next_payment_date(
            date(2024, 1, 1),
            PaymentFrequency::Monthly,
            5,
            12,
            Some(date(2024, 6, 1)),
            date(2024, 5, 30),
        );
        assert_eq!(on_end.next_payment, Some(date(2024, 6, 1)));
        assert_eq!(on_end.days_until_payment, 2);
    }

    #[test]
    fn projection_is_deterministic_for_a_fixed_day() {
        let run = || {
            calculate_next_payment_date(
                date(2024, 1, 1),
                PaymentFrequency::Biweekly,
                4,
                20,
                None,
                date(2024, 2, 1),
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn final_payment_respects_end_date() {
        let first = date(2024, 1, 1);
        assert_eq!(
            estimated_final_payment(first, PaymentFrequency::Monthly, 12, None),
            Some(date(2024, 12, 1))
        );
        assert_eq!(
            estimated_final_payment(
                first,
                PaymentFrequency::Monthly,
                12,
                Some(date(2024, 9, 30))
            ),
            Some(date(2024, 9, 30))
        );
        assert_eq!(
            estimated_final_payment(first, PaymentFrequency::Weekly, 0, None),
            None
        );
    }

    #[test]
    fn huge_counts_settle_instead_of_panicking() {
        let today = date(2024, 6, 1);
        let first = date(2024, 1, 1);
        for (frequency, made, total) in [
            (PaymentFrequency::Weekly, 20_000_000, 30_000_000),
            (PaymentFrequency::Biweekly, i32::MAX - 1, i32::MAX),
            (PaymentFrequency::Monthly, 5_000_000, 6_000_000),
            (PaymentFrequency::Monthly, i32::MAX - 1, i32::MAX),
        ] {
            let result = calculate_next_payment_date(first, frequency, made, total, None, today);
            assert_eq!(result, NextPaymentResult::paid_off(), "{frequency} {made}/{total}");
        }
        assert_eq!(
            estimated_final_payment(first, PaymentFrequency::Monthly, i32::MAX, None),
            None
        );
        assert_eq!(
            estimated_final_payment(
                first,
                PaymentFrequency::Weekly,
                30_000_000,
                Some(date(2030, 1, 1))
            ),
            Some(date(2030, 1, 1))
        );
    }
}
