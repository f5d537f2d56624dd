//! Create/edit form model for installments.
//!
//! In create mode the payment count is derived from the amount fields and re-solved every
//! time one of them changes. In edit mode the stored count is kept as-is, even when the
//! amounts are edited.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    errors::ScheduleError,
    installment::Installment,
    schedule::{solve_number_of_payments, PaymentFrequency},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone)]
pub struct InstallmentForm {
    mode: FormMode,
    source: Option<Installment>,
    pub name: String,
    pub description: Option<String>,
    total_amount: Option<f64>,
    amount_per_payment: Option<f64>,
    interest_rate: Option<f64>,
    pub frequency: PaymentFrequency,
    pub first_payment_date: Option<NaiveDate>,
    pub payments_made: i32,
    pub end_date: Option<NaiveDate>,
    number_of_payments: Option<u32>,
}

impl InstallmentForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            source: None,
            name: String::new(),
            description: None,
            total_amount: None,
            amount_per_payment: None,
            interest_rate: None,
            frequency: PaymentFrequency::Monthly,
            first_payment_date: None,
            payments_made: 0,
            end_date: None,
            number_of_payments: None,
        }
    }

    pub fn edit(existing: &Installment) -> Self {
        Self {
            mode: FormMode::Edit,
            source: Some(existing.clone()),
            name: existing.name.clone(),
            description: existing.description.clone(),
            total_amount: Some(existing.total_amount),
            amount_per_payment: Some(existing.amount_per_payment),
            interest_rate: existing.interest_rate,
            frequency: existing.frequency,
            first_payment_date: Some(existing.first_payment_date),
            payments_made: existing.payments_made,
            end_date: existing.end_date,
            number_of_payments: u32::try_from(existing.number_of_payments).ok(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn total_amount(&self) -> Option<f64> {
        self.total_amount
    }

    pub fn amount_per_payment(&self) -> Option<f64> {
        self.amount_per_payment
    }

    pub fn interest_rate(&self) -> Option<f64> {
        self.interest_rate
    }

    /// The payment count shown read-only in the form.
    pub fn number_of_payments(&self) -> Option<u32> {
        self.number_of_payments
    }

    pub fn set_total_amount(&mut self, value: Option<f64>) {
        self.total_amount = value;
        self.recompute();
    }

    pub fn set_amount_per_payment(&mut self, value: Option<f64>) {
        self.amount_per_payment = value;
        self.recompute();
    }

    pub fn set_interest_rate(&mut self, value: Option<f64>) {
        self.interest_rate = value;
        self.recompute();
    }

    fn recompute(&mut self) {
        if self.mode == FormMode::Edit {
            return;
        }
        self.number_of_payments = match (self.total_amount, self.amount_per_payment) {
            (Some(total), Some(per_payment)) => {
                solve_number_of_payments(total, per_payment, self.interest_rate).ok()
            }
            _ => None,
        };
    }

    /// Validates the form and produces the installment to store.
    pub fn submit(&self) -> Result<Installment, ScheduleError> {
        let total_amount = self
            .total_amount
            .ok_or_else(|| ScheduleError::validation("total amount is required"))?;
        let amount_per_payment = self
            .amount_per_payment
            .ok_or_else(|| ScheduleError::validation("amount per payment is required"))?;
        let first_payment_date = self
            .first_payment_date
            .ok_or_else(|| ScheduleError::validation("first payment date is required"))?;
        let number_of_payments = match self.mode {
            FormMode::Create => {
                solve_number_of_payments(total_amount, amount_per_payment, self.interest_rate)?
            }
            FormMode::Edit => self
                .number_of_payments
                .ok_or_else(|| ScheduleError::validation("number of payments is missing"))?,
        };
        let number_of_payments = i32::try_from(number_of_payments)
            .map_err(|_| ScheduleError::validation("number of payments is too large"))?;

        let mut installment = match &self.source {
            Some(existing) => existing.clone(),
            None => Installment::new(
                self.name.trim(),
                total_amount,
                amount_per_payment,
                self.frequency,
                first_payment_date,
                number_of_payments,
            ),
        };
        installment.name = self.name.trim().to_string();
        installment.description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        installment.total_amount = total_amount;
        installment.amount_per_payment = amount_per_payment;
        installment.interest_rate = self.interest_rate.filter(|rate| *rate > 0.0);
        installment.frequency = self.frequency;
        installment.first_payment_date = first_payment_date;
        installment.payments_made = self.payments_made;
        installment.number_of_payments = number_of_payments;
        installment.end_date = self.end_date;
        if self.mode == FormMode::Edit {
            installment.touch();
        }
        installment.validate()?;
        Ok(installment)
    }

    pub fn target_id(&self) -> Option<Uuid> {
        self.source.as_ref().map(|existing| existing.id)
    }
}
