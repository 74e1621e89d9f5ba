//! Canonical storage form for customer fields.
//!
//! Every value that reaches a [`CustomerRecord`](crate::CustomerRecord) goes
//! through one of these functions first. All of them are idempotent.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits every stored amount carries.
pub const MONEY_SCALE: u32 = 2;

/// Trim an optional string, turning a blank result into `None`.
///
/// Used for optional columns (billing address, tax code) so storage never
/// holds an empty string.
///
/// ```
/// use customer_master_core::normalize::trim_or_none;
///
/// assert_eq!(trim_or_none(Some("  x  ")), Some("x".to_string()));
/// assert_eq!(trim_or_none(Some("   ")), None);
/// assert_eq!(trim_or_none(None), None);
/// ```
#[must_use]
pub fn trim_or_none(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Trim a required string.
///
/// A blank result stays an empty string; rejecting it is the validator's job.
#[must_use]
pub fn trim_required(value: &str) -> String {
    value.trim().to_owned()
}

/// Bring an amount into storage form: absent is zero, exactly two fractional
/// digits, round-half-up, never below zero.
///
/// ```
/// use customer_master_core::normalize::normalize_money;
/// use rust_decimal::Decimal;
///
/// let amount: Decimal = "1.005".parse().unwrap();
/// assert_eq!(normalize_money(Some(amount)).to_string(), "1.01");
/// assert_eq!(normalize_money(None).to_string(), "0.00");
/// ```
#[must_use]
pub fn normalize_money(amount: Option<Decimal>) -> Decimal {
    let mut normalized = amount
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO);
    // round_dp never widens the scale, so 100 stays "100" without this.
    normalized.rescale(MONEY_SCALE);
    normalized
}

/// Default an absent active flag to `true`.
#[must_use]
pub fn normalize_active(flag: Option<bool>) -> bool {
    flag.unwrap_or(true)
}
