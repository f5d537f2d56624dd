use serde::{Deserialize, Serialize};

/// Share of scheduled payments already made, as a whole percentage.
pub fn calculate_percent_paid(payments_made: i32, number_of_payments: i32) -> u8 {
    if number_of_payments <= 0 {
        return 0;
    }
    let ratio = 100.0 * payments_made as f64 / number_of_payments as f64;
    ratio.round().clamp(0.0, 100.0) as u8
}

/// Payment counts and amounts for a progress bar or card footer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProgress {
    pub payments_made: i32,
    pub number_of_payments: i32,
    pub payments_remaining: i32,
    pub percent_paid: u8,
    pub amount_paid: f64,
    pub amount_remaining: f64,
}

impl PaymentProgress {
    pub fn new(payments_made: i32, number_of_payments: i32, amount_per_payment: f64) -> Self {
        let made = payments_made.max(0);
        let total = number_of_payments.max(0);
        let remaining = (total - made).max(0);
        Self {
            payments_made: made,
            number_of_payments: total,
            payments_remaining: remaining,
            percent_paid: calculate_percent_paid(payments_made, number_of_payments),
            amount_paid: made.min(total) as f64 * amount_per_payment,
            amount_remaining: remaining as f64 * amount_per_payment,
        }
    }
}
