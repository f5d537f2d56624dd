//! Pure installment schedule calculations: due dates, urgency, progress and payment counts.

pub mod amortization;
pub mod clock;
pub mod frequency;
pub mod progress;
pub mod projector;
pub mod urgency;

pub use amortization::{solve_number_of_payments, MAX_NUMBER_OF_PAYMENTS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use frequency::PaymentFrequency;
pub use progress::{calculate_percent_paid, PaymentProgress};
pub use projector::{
    calculate_next_payment_date, estimated_final_payment, NextPaymentResult, NO_UPCOMING_PAYMENT,
};
pub use urgency::{get_payment_urgency, PaymentUrgency, UrgencyThresholds};
