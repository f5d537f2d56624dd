//! Solves for the number of fixed payments needed to repay a principal.
//!
//! Interest is always compounded monthly from a nominal annual percentage, whatever the
//! installment's payment frequency.

use crate::errors::ScheduleError;

const MONTHS_PER_YEAR: f64 = 12.0;
pub(crate) const MAX_INTEREST_RATE: f64 = 100.0;
/// Upper bound on a schedule's payment count; keeps every projected date inside the calendar.
pub const MAX_NUMBER_OF_PAYMENTS: u32 = 100_000;
// Absorbs binary-float noise such as 1.1 / 0.1 = 11.000000000000002.
const CEIL_TOLERANCE: f64 = 1e-9;

/// Returns how many payments of `amount_per_payment` amortize `total_amount`.
///
/// When the payment does not cover a single month of interest the compound formula has
/// no solution; the simple `total / payment` count is returned instead.
pub fn solve_number_of_payments(
    total_amount: f64,
    amount_per_payment: f64,
    interest_rate: Option<f64>,
) -> Result<u32, ScheduleError> {
    if !total_amount.is_finite() || total_amount <= 0.0 {
        return Err(ScheduleError::validation(
            "total amount must be greater than zero",
        ));
    }
    if !amount_per_payment.is_finite() || amount_per_payment <= 0.0 {
        return Err(ScheduleError::validation(
            "amount per payment must be greater than zero",
        ));
    }

    let rate = interest_rate.unwrap_or(0.0);
    if !rate.is_finite() || !(0.0..=MAX_INTEREST_RATE).contains(&rate) {
        return Err(ScheduleError::validation(format!(
            "interest rate must be between 0 and {MAX_INTEREST_RATE}"
        )));
    }

    if rate == 0.0 {
        return simple_payment_count(total_amount, amount_per_payment);
    }

    let monthly_rate = rate / 100.0 / MONTHS_PER_YEAR;
    let monthly_interest = total_amount * monthly_rate;
    if amount_per_payment <= monthly_interest {
        tracing::debug!(
            total_amount,
            amount_per_payment,
            rate,
            "payment does not cover monthly interest; using simple division"
        );
        return simple_payment_count(total_amount, amount_per_payment);
    }

    let periods =
        -(1.0 - monthly_interest / amount_per_payment).ln() / (1.0 + monthly_rate).ln();
    round_up_payments(periods)
}

fn simple_payment_count(total_amount: f64, amount_per_payment: f64) -> Result<u32, ScheduleError> {
    round_up_payments(total_amount / amount_per_payment)
}

fn round_up_payments(periods: f64) -> Result<u32, ScheduleError> {
    let count = (periods - CEIL_TOLERANCE).ceil().max(1.0);
    if !count.is_finite() || count > f64::from(MAX_NUMBER_OF_PAYMENTS) {
        return Err(ScheduleError::validation(format!(
            "number of payments is too large (at most {MAX_NUMBER_OF_PAYMENTS})"
        )));
    }
    Ok(count as u32)
}
