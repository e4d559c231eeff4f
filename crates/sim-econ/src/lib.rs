//! Money side of the promotion: weekly show finances and talent contracts.
//!
//! This crate provides validated utilities for:
//! - Turning a finished show into a revenue/expense row and updating cash
//! - Queuing one-off adjustments that land with a later show
//! - Backfilling, counting down and renewing contracts
//! - Moving talent between brands and free agency

pub mod contracts;
pub mod finances;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sim_core::Brand;
use thiserror::Error;

pub use contracts::{
    backfill_contracts, contract_tick, release_to_free_agency, salary_for_overall, sign_to_brand,
};
pub use finances::{ensure_ledger, queue_adjustment, record_weekly_finance, FinanceBreakdown};

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Only the two competing brands run shows and keep books.
    #[error("{0} does not keep books")]
    NotABrand(Brand),
    /// TV rating or amount was NaN or infinite.
    #[error("non-finite numeric value")]
    NonFinite,
    /// Named character is not on the roster.
    #[error("unknown character: {0}")]
    UnknownCharacter(String),
}

/// Whole-dollar display with thousands separators, e.g. `-$1,250,000`.
pub fn format_money(amount: Decimal) -> String {
    let whole = amount.round().to_i128().unwrap_or(0);
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}${out}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(Decimal::new(1_250_000, 0)), "$1,250,000");
        assert_eq!(format_money(Decimal::new(-999, 0)), "-$999");
        assert_eq!(format_money(Decimal::new(1000, 0)), "$1,000");
        assert_eq!(format_money(Decimal::ZERO), "$0");
    }
}
