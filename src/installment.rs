//! The installment value object and its derived, never-persisted views.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::ScheduleError,
    schedule::{
        amortization::{MAX_INTEREST_RATE, MAX_NUMBER_OF_PAYMENTS},
        calculate_next_payment_date, calculate_percent_paid, estimated_final_payment,
        NextPaymentResult, PaymentFrequency, PaymentProgress,
        PaymentUrgency, UrgencyThresholds,
    },
};

/// A fixed-payment loan or subscription tracked on a recurring schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_amount: f64,
    pub amount_per_payment: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    pub frequency: PaymentFrequency,
    pub first_payment_date: NaiveDate,
    pub payments_made: i32,
    pub number_of_payments: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Installment {
    pub fn new(
        name: impl Into<String>,
        total_amount: f64,
        amount_per_payment: f64,
        frequency: PaymentFrequency,
        first_payment_date: NaiveDate,
        number_of_payments: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            total_amount,
            amount_per_payment,
            interest_rate: None,
            frequency,
            first_payment_date,
            payments_made: 0,
            number_of_payments,
            end_date: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_interest_rate(mut self, rate: f64) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_payments_made(mut self, payments_made: i32) -> Self {
        self.payments_made = payments_made;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Checks the field invariants a stored installment must satisfy.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.name.trim().is_empty() {
            return Err(ScheduleError::validation("name must not be empty"));
        }
        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            return Err(ScheduleError::validation(
                "total amount must not be negative",
            ));
        }
        if !self.amount_per_payment.is_finite() || self.amount_per_payment <= 0.0 {
            return Err(ScheduleError::validation(
                "amount per payment must be greater than zero",
            ));
        }
        if let Some(rate) = self.interest_rate {
            if !rate.is_finite() || !(0.0..=MAX_INTEREST_RATE).contains(&rate) {
                return Err(ScheduleError::validation(format!(
                    "interest rate must be between 0 and {MAX_INTEREST_RATE}"
                )));
            }
        }
        if self.payments_made < 0 {
            return Err(ScheduleError::validation(
                "payments made must not be negative",
            ));
        }
        if self.number_of_payments < 0 {
            return Err(ScheduleError::validation(
                "number of payments must not be negative",
            ));
        }
        let limit = MAX_NUMBER_OF_PAYMENTS as i32;
        if self.number_of_payments > limit || self.payments_made > limit {
            return Err(ScheduleError::validation(format!(
                "payment counts must not exceed {MAX_NUMBER_OF_PAYMENTS}"
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.first_payment_date {
                return Err(ScheduleError::validation(
                    "end date must not precede the first payment date",
                ));
            }
        }
        Ok(())
    }

    pub fn next_payment(&self, today: NaiveDate) -> NextPaymentResult {
        calculate_next_payment_date(
            self.first_payment_date,
            self.frequency,
            self.payments_made,
            self.number_of_payments,
            self.end_date,
            today,
        )
    }

    pub fn percent_paid(&self) -> u8 {
        calculate_percent_paid(self.payments_made, self.number_of_payments)
    }

    pub fn progress(&self) -> PaymentProgress {
        PaymentProgress::new(
            self.payments_made,
            self.number_of_payments,
            self.amount_per_payment,
        )
    }

    pub fn final_payment_date(&self) -> Option<NaiveDate> {
        estimated_final_payment(
            self.first_payment_date,
            self.frequency,
            self.number_of_payments,
            self.end_date,
        )
    }

    pub fn is_paid_off(&self, today: NaiveDate) -> bool {
        self.next_payment(today).is_paid_off
    }

    pub fn summary(&self, today: NaiveDate, thresholds: &UrgencyThresholds) -> InstallmentSummary {
        let next = self.next_payment(today);
        let urgency = (!next.is_paid_off).then(|| thresholds.classify(next.days_until_payment));
        InstallmentSummary {
            id: self.id,
            name: self.name.clone(),
            frequency: self.frequency,
            archived: self.archived,
            next,
            urgency,
            progress: self.progress(),
            final_payment: self.final_payment_date(),
        }
    }

    /// Counts one more completed payment.
    pub fn record_payment(&mut self) -> Result<i32, ScheduleError> {
        if self.archived {
            return Err(ScheduleError::Archived(self.name.clone()));
        }
        if self.payments_made >= self.number_of_payments {
            return Err(ScheduleError::AlreadyPaidOff(self.name.clone()));
        }
        self.payments_made += 1;
        self.touch();
        tracing::debug!(id = %self.id, payments_made = self.payments_made, "payment recorded");
        Ok(self.payments_made)
    }

    /// Hides the installment from active views. Returns whether the state changed.
    pub fn archive(&mut self) -> bool {
        if self.archived {
            return false;
        }
        self.archived = true;
        self.touch();
        true
    }

    /// Returns an archived installment to active views. Returns whether the state changed.
    pub fn restore(&mut self) -> bool {
        if !self.archived {
            return false;
        }
        self.archived = false;
        self.touch();
        true
    }
}

/// Everything a list row or card shows about one installment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentSummary {
    pub id: Uuid,
    pub name: String,
    pub frequency: PaymentFrequency,
    pub archived: bool,
    pub next: NextPaymentResult,
    pub urgency: Option<PaymentUrgency>,
    pub progress: PaymentProgress,
    pub final_payment: Option<NaiveDate>,
}

impl InstallmentSummary {
    pub fn percent_paid(&self) -> u8 {
        self.progress.percent_paid
    }
}
