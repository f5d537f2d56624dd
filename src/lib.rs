#![doc(test(attr(deny(warnings))))]

//! Installment Core computes payment schedules for installment loans: next due dates,
//! urgency, progress, and the number of payments needed to amortize a principal.

pub mod cli;
pub mod config;
pub mod errors;
pub mod form;
pub mod installment;
pub mod messages;
pub mod overview;
pub mod schedule;
pub mod utils;

pub use installment::{Installment, InstallmentSummary};
pub use schedule::{NextPaymentResult, PaymentFrequency, PaymentUrgency};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(
            build = env!("INSTALLMENT_CORE_BUILD_HASH"),
            "Installment Core tracing initialized."
        );
    });
}

/// Human readable build description embedded at compile time.
pub fn build_info() -> String {
    format!(
        "installment_core {} ({}-{}, {} {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("INSTALLMENT_CORE_BUILD_HASH"),
        env!("INSTALLMENT_CORE_BUILD_STATUS"),
        env!("INSTALLMENT_CORE_BUILD_PROFILE"),
        env!("INSTALLMENT_CORE_BUILD_TARGET"),
        env!("INSTALLMENT_CORE_BUILD_TIMESTAMP"),
    )
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }

    #[test]
    fn build_info_names_the_crate() {
        assert!(super::build_info().starts_with("installment_core "));
    }
}
