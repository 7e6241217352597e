//! Field-level validation for ledger inputs.
//!
//! Each helper either returns the parsed value or a
//! [`LedgerError::ValidationFailed`] naming the field.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::LedgerError;
use super::types::{EntryStatus, EntryType, LineInput};

/// Decimal places kept for every stored amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount a `DECIMAL(15, 2)` column holds: 9,999,999,999,999.99.
pub const MAX_AMOUNT: Decimal =
    Decimal::from_parts(2_764_472_319, 232_830, 0, false, AMOUNT_SCALE);

/// Parses an entry type. Spanish labels are accepted as aliases.
pub fn parse_entry_type(value: &str) -> Result<EntryType, LedgerError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "manual" => Ok(EntryType::Manual),
        "purchase" | "compra" => Ok(EntryType::Purchase),
        "sale" | "venta" => Ok(EntryType::Sale),
        "adjustment" | "ajuste" => Ok(EntryType::Adjustment),
        _ => Err(LedgerError::validation(
            "entry_type",
            format!("'{value}' must be one of Manual, Purchase, Sale, Adjustment"),
        )),
    }
}

/// Parses an entry status.
pub fn parse_status(value: &str) -> Result<EntryStatus, LedgerError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pending" | "pendiente" => Ok(EntryStatus::Pending),
        "posted" | "procesado" => Ok(EntryStatus::Posted),
        _ => Err(LedgerError::validation(
            "status",
            format!("'{value}' must be one of pending, posted"),
        )),
    }
}

/// Parses a postable flag written as `Si`/`No` or `true`/`false`.
pub fn parse_postable(value: &str) -> Result<bool, LedgerError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "si" | "sí" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        _ => Err(LedgerError::validation(
            "postable",
            format!("'{value}' must be Si or No"),
        )),
    }
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_entry_date(value: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::validation("date", format!("'{value}' is not a valid YYYY-MM-DD date"))
    })
}

/// Rejects empty or whitespace-only text, returning it trimmed.
pub fn require_non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(field, "must not be empty"));
    }
    Ok(trimmed)
}

/// Rejects text longer than `max` characters.
pub fn require_max_len(field: &'static str, value: &str, max: usize) -> Result<(), LedgerError> {
    if value.chars().count() > max {
        return Err(LedgerError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Requires at least one line.
pub fn require_lines(lines: &[LineInput]) -> Result<(), LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::validation(
            "lines",
            "a journal entry needs at least one line",
        ));
    }
    Ok(())
}

/// Rejects negative amounts.
pub fn require_non_negative(field: &'static str, amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(LedgerError::validation(
            field,
            format!("{amount} must not be negative"),
        ));
    }
    Ok(())
}

/// Rejects amounts above [`MAX_AMOUNT`].
pub fn require_max_amount(field: &'static str, amount: Decimal) -> Result<(), LedgerError> {
    if amount > MAX_AMOUNT {
        return Err(LedgerError::validation(
            field,
            format!("{amount} exceeds the maximum of {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

/// Rounds an amount to [`AMOUNT_SCALE`] places using banker's rounding.
#[must_use]
pub fn normalize_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven)
}
