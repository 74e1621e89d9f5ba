//! Field constraints for customer requests.
//!
//! Validation runs before normalization and reports every failing rule at
//! once, in field declaration order, so a client can fix a payload in one
//! round trip.
//!
//! ## Constraints
//!
//! | Field            | Rule                                              |
//! |------------------|---------------------------------------------------|
//! | `code`           | required on create/replace, 1-32 of `[A-Za-z0-9_-]` |
//! | `name`           | required on create/replace, non-blank, max 128    |
//! | `billingAddress` | max 256 after trim                                |
//! | `taxCode`        | max 16 after trim                                 |
//! | `creditLimit`    | `>= 0`, at most 13 integer digits once rounded    |

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CustomerRequest;
use crate::normalize::normalize_money;

/// Maximum length of a customer code.
pub const CODE_MAX_LENGTH: usize = 32;
/// Maximum length of a customer name, after trimming.
pub const NAME_MAX_LENGTH: usize = 128;
/// Maximum length of a billing address, after trimming.
pub const BILLING_ADDRESS_MAX_LENGTH: usize = 256;
/// Maximum length of a tax code, after trimming.
pub const TAX_CODE_MAX_LENGTH: usize = 16;
/// Integer digits a stored credit limit may carry (`NUMERIC(15, 2)`).
pub const CREDIT_LIMIT_INTEGER_DIGITS: u32 = 13;

const MUST_NOT_BE_BLANK: &str = "must not be blank";
const INVALID_CODE_CHARACTERS: &str = "must contain only letters, digits, '_' or '-'";
const MUST_NOT_BE_NEGATIVE: &str = "must be greater than or equal to 0";
const CREDIT_LIMIT_TOO_LARGE: &str = "must have at most 13 integer digits";

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid regex"));

/// Which write a request is being validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// `POST`: code and name required.
    Create,
    /// `PUT`: code and name required, absent optionals reset.
    Replace,
    /// `PATCH`: nothing required, absent fields are kept.
    Patch,
}

impl RequestMode {
    const fn requires_identity(self) -> bool {
        matches!(self, Self::Create | Self::Replace)
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON path of the failing field (e.g. `billingAddress`, `codes[1]`).
    pub field: String,
    /// Human-readable rule description.
    pub reason: String,
    /// The value that was rejected, `null` when the field was absent.
    pub rejected_value: Value,
}

impl Violation {
    /// Create a new violation.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>, rejected_value: Value) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
            rejected_value,
        }
    }
}

impl CustomerRequest {
    /// Check this request against the field constraints for `mode`.
    ///
    /// # Errors
    ///
    /// Returns every violation found, ordered by field.
    pub fn validate(&self, mode: RequestMode) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();

        match self.code.as_deref() {
            Some(code) => {
                violations.extend(code_rules(code).map(|reason| Violation::new("code", reason, code.into())));
            }
            None if mode.requires_identity() => {
                violations.push(Violation::new("code", MUST_NOT_BE_BLANK, Value::Null));
            }
            None => {}
        }

        match self.name.as_deref() {
            Some(name) => {
                if name.trim().is_empty() {
                    violations.push(Violation::new("name", MUST_NOT_BE_BLANK, name.into()));
                }
                check_max_length(&mut violations, "name", name, NAME_MAX_LENGTH);
            }
            None if mode.requires_identity() => {
                violations.push(Violation::new("name", MUST_NOT_BE_BLANK, Value::Null));
            }
            None => {}
        }

        if let Some(address) = self.billing_address.as_deref() {
            check_max_length(
                &mut violations,
                "billingAddress",
                address,
                BILLING_ADDRESS_MAX_LENGTH,
            );
        }

        if let Some(tax_code) = self.tax_code.as_deref() {
            check_max_length(&mut violations, "taxCode", tax_code, TAX_CODE_MAX_LENGTH);
        }

        if let Some(limit) = self.credit_limit {
            if limit < Decimal::ZERO {
                violations.push(Violation::new(
                    "creditLimit",
                    MUST_NOT_BE_NEGATIVE,
                    amount_value(limit),
                ));
            } else if normalize_money(Some(limit)) >= credit_limit_bound() {
                // Rounding can carry into a fourteenth digit.
                violations.push(Violation::new(
                    "creditLimit",
                    CREDIT_LIMIT_TOO_LARGE,
                    amount_value(limit),
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Check a customer code received as a path or query parameter.
///
/// Returns the first failing rule only; `field` names the parameter
/// (e.g. `code` or `codes[2]`).
#[must_use]
pub fn validate_code_param(field: &str, value: &str) -> Option<Violation> {
    code_rules(value)
        .next()
        .map(|reason| Violation::new(field, reason, value.into()))
}

/// Every rule a code breaks, in rule order.
fn code_rules(code: &str) -> impl Iterator<Item = String> {
    let blank = code.trim().is_empty();
    let too_long = code.chars().count() > CODE_MAX_LENGTH;
    let bad_characters = !blank && !CODE_PATTERN.is_match(code);

    [
        blank.then(|| MUST_NOT_BE_BLANK.to_string()),
        too_long.then(|| max_length_reason(CODE_MAX_LENGTH)),
        bad_characters.then(|| INVALID_CODE_CHARACTERS.to_string()),
    ]
    .into_iter()
    .flatten()
}

fn credit_limit_bound() -> Decimal {
    Decimal::from(10_i64.pow(CREDIT_LIMIT_INTEGER_DIGITS))
}

/// An amount as the JSON number it arrived as.
fn amount_value(amount: Decimal) -> Value {
    amount
        .to_string()
        .parse::<serde_json::Number>()
        .map_or(Value::Null, Value::Number)
}

fn check_max_length(violations: &mut Vec<Violation>, field: &str, value: &str, max: usize) {
    if value.trim().chars().count() > max {
        violations.push(Violation::new(field, max_length_reason(max), value.into()));
    }
}

fn max_length_reason(max: usize) -> String {
    format!("must be at most {max} characters")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_request() -> CustomerRequest {
        CustomerRequest {
            code: Some("C001".to_string()),
            name: Some("Acme".to_string()),
            billing_address: Some("Tokyo".to_string()),
            tax_code: Some("T1234567890123".to_string()),
            credit_limit: Some("100.00".parse().unwrap()),
            active: None,
        }
    }

    fn fields(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_request_passes_every_mode() {
        let request = valid_request();
        assert!(request.validate(RequestMode::Create).is_ok());
        assert!(request.validate(RequestMode::Replace).is_ok());
        assert!(request.validate(RequestMode::Patch).is_ok());
    }

    #[test]
    fn test_empty_request_requires_code_and_name_on_create() {
        let violations = CustomerRequest::default()
            .validate(RequestMode::Create)
            .unwrap_err();

        assert_eq!(fields(&violations), ["code", "name"]);
        assert!(violations.iter().all(|v| v.reason == MUST_NOT_BE_BLANK));
        assert!(violations.iter().all(|v| v.rejected_value.is_null()));
    }

    #[test]
    fn test_empty_request_is_a_valid_patch() {
        assert!(CustomerRequest::default().validate(RequestMode::Patch).is_ok());
    }

    #[test]
    fn test_blank_name_rejected_even_on_patch() {
        let request = CustomerRequest {
            name: Some("   ".to_string()),
            ..CustomerRequest::default()
        };
        let violations = request.validate(RequestMode::Patch).unwrap_err();
        assert_eq!(fields(&violations), ["name"]);
        assert_eq!(violations[0].rejected_value, Value::String("   ".to_string()));
    }

    #[test]
    fn test_code_pattern_and_length() {
        let request = CustomerRequest {
            code: Some("C 001!".to_string()),
            ..valid_request()
        };
        let violations = request.validate(RequestMode::Create).unwrap_err();
        assert_eq!(fields(&violations), ["code"]);
        assert_eq!(violations[0].reason, INVALID_CODE_CHARACTERS);

        let request = CustomerRequest {
            code: Some("X".repeat(33)),
            ..valid_request()
        };
        let violations = request.validate(RequestMode::Create).unwrap_err();
        assert_eq!(violations[0].reason, "must be at most 32 characters");

        let request = CustomerRequest {
            code: Some("ab_CD-09".to_string()),
            ..valid_request()
        };
        assert!(request.validate(RequestMode::Create).is_ok());
    }

    #[test]
    fn test_lengths_measured_after_trim() {
        let request = CustomerRequest {
            tax_code: Some(format!("  {}  ", "T".repeat(16))),
            ..valid_request()
        };
        assert!(request.validate(RequestMode::Create).is_ok());

        let request = CustomerRequest {
            tax_code: Some("T".repeat(17)),
            billing_address: Some("a".repeat(257)),
            name: Some("n".repeat(129)),
            ..valid_request()
        };
        let violations = request.validate(RequestMode::Create).unwrap_err();
        assert_eq!(fields(&violations), ["name", "billingAddress", "taxCode"]);
    }

    #[test]
    fn test_negative_credit_limit() {
        let request = CustomerRequest {
            credit_limit: Some("-0.01".parse().unwrap()),
            ..valid_request()
        };
        let violations = request.validate(RequestMode::Create).unwrap_err();
        assert_eq!(fields(&violations), ["creditLimit"]);
        assert!(violations[0].rejected_value.is_number());
        assert_eq!(violations[0].rejected_value.to_string(), "-0.01");

        let request = CustomerRequest {
            credit_limit: Some(Decimal::ZERO),
            ..valid_request()
        };
        assert!(request.validate(RequestMode::Create).is_ok());
    }

    #[test]
    fn test_credit_limit_integer_digits() {
        let request = CustomerRequest {
            credit_limit: Some("9999999999999.99".parse().unwrap()),
            ..valid_request()
        };
        assert!(request.validate(RequestMode::Create).is_ok());

        let request = CustomerRequest {
            credit_limit: Some("10000000000000".parse().unwrap()),
            ..valid_request()
        };
        let violations = request.validate(RequestMode::Patch).unwrap_err();
        assert_eq!(fields(&violations), ["creditLimit"]);
        assert_eq!(violations[0].reason, CREDIT_LIMIT_TOO_LARGE);
        assert_eq!(violations[0].rejected_value.to_string(), "10000000000000");

        let request = CustomerRequest {
            credit_limit: Some("9999999999999.995".parse().unwrap()),
            ..valid_request()
        };
        let violations = request.validate(RequestMode::Create).unwrap_err();
        assert_eq!(violations[0].reason, CREDIT_LIMIT_TOO_LARGE);
    }

    #[test]
    fn test_violations_follow_field_order() {
        let request = CustomerRequest {
            code: Some(String::new()),
            name: None,
            billing_address: None,
            tax_code: Some("T".repeat(20)),
            credit_limit: Some("-1".parse().unwrap()),
            active: Some(false),
        };
        let violations = request.validate(RequestMode::Replace).unwrap_err();
        assert_eq!(fields(&violations), ["code", "name", "taxCode", "creditLimit"]);
    }

    #[test]
    fn test_validate_code_param() {
        assert!(validate_code_param("code", "C001").is_none());

        let violation = validate_code_param("codes[1]", " ").unwrap();
        assert_eq!(violation.field, "codes[1]");
        assert_eq!(violation.reason, MUST_NOT_BE_BLANK);

        let violation = validate_code_param("code", "a/b").unwrap();
        assert_eq!(violation.reason, INVALID_CODE_CHARACTERS);
        assert_eq!(violation.rejected_value, Value::String("a/b".to_string()));
    }
}
