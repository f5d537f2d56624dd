//! Display helpers for payment dates and due-date messages.
//!
//! Every caller renders due-date text through [`get_payment_message`] and supplies a
//! [`PaymentMessages`] provider, so the day thresholds live in exactly one place.

use std::{collections::HashMap, fs, path::Path};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const KEY_PAID_OFF: &str = "installments.paidOff";
pub const KEY_OVERDUE: &str = "installments.overdue";
pub const KEY_DUE_TODAY: &str = "installments.dueToday";
pub const KEY_DUE_IN_DAYS_ONE: &str = "installments.dueInDays_one";
pub const KEY_DUE_IN_DAYS_OTHER: &str = "installments.dueInDays_other";

const COUNT_PLACEHOLDER: &str = "{{count}}";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateFormatStyle {
    Short,
    #[default]
    Medium,
    Long,
}

pub fn format_payment_date(date: NaiveDate, style: DateFormatStyle) -> String {
    match style {
        DateFormatStyle::Short => date.format("%Y-%m-%d").to_string(),
        DateFormatStyle::Medium => date.format("%d %b %Y").to_string(),
        DateFormatStyle::Long => date.format("%A, %B %-d, %Y").to_string(),
    }
}

/// Source of the user-facing strings for each due-date state.
pub trait PaymentMessages {
    fn paid_off(&self) -> String;
    fn overdue(&self) -> String;
    fn due_today(&self) -> String;
    fn due_in_days(&self, days: i64) -> String;
}

/// Picks the message for a projected schedule.
///
/// A negative day count on an open schedule means the due date has already passed.
pub fn get_payment_message(
    days_until_payment: i64,
    is_paid_off: bool,
    messages: &dyn PaymentMessages,
) -> String {
    if is_paid_off {
        messages.paid_off()
    } else if days_until_payment < 0 {
        messages.overdue()
    } else if days_until_payment == 0 {
        messages.due_today()
    } else {
        messages.due_in_days(days_until_payment)
    }
}

/// Fixed English wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMessages;

impl PaymentMessages for EnglishMessages {
    fn paid_off(&self) -> String {
        "Paid off".into()
    }

    fn overdue(&self) -> String {
        "Payment overdue".into()
    }

    fn due_today(&self) -> String {
        "Due today".into()
    }

    fn due_in_days(&self, days: i64) -> String {
        if days == 1 {
            "Due in 1 day".into()
        } else {
            format!("Due in {days} days")
        }
    }
}

/// Translated templates keyed like `installments.dueToday`.
///
/// Missing keys fall back to [`EnglishMessages`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CatalogMessages {
    templates: HashMap<String, String>,
}

impl CatalogMessages {
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::Serde(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn render(&self, key: &str, count: Option<i64>) -> Option<String> {
        let template = self.templates.get(key)?;
        Some(match count {
            Some(count) => template.replace(COUNT_PLACEHOLDER, &count.to_string()),
            None => template.clone(),
        })
    }
}

impl PaymentMessages for CatalogMessages {
    fn paid_off(&self) -> String {
        self.render(KEY_PAID_OFF, None)
            .unwrap_or_else(|| EnglishMessages.paid_off())
    }

    fn overdue(&self) -> String {
        self.render(KEY_OVERDUE, None)
            .unwrap_or_else(|| EnglishMessages.overdue())
    }

    fn due_today(&self) -> String {
        self.render(KEY_DUE_TODAY, None)
            .unwrap_or_else(|| EnglishMessages.due_today())
    }

    fn due_in_days(&self, days: i64) -> String {
        let key = if days == 1 {
            KEY_DUE_IN_DAYS_ONE
        } else {
            KEY_DUE_IN_DAYS_OTHER
        };
        self.render(key, Some(days))
            .unwrap_or_else(|| EnglishMessages.due_in_days(days))
    }
}
