//! Customer shapes: persisted record, inbound request, outbound response.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CustomerId;

/// A persisted customer (domain type).
///
/// Values are always in storage form (see [`crate::normalize`]): strings are
/// trimmed, optional strings are `None` rather than empty, the credit limit
/// has exactly two fractional digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    /// Assigned once at creation, never changed.
    pub id: CustomerId,
    /// Business code, unique across all records.
    pub code: String,
    /// Display / company name.
    pub name: String,
    pub billing_address: Option<String>,
    pub tax_code: Option<String>,
    /// Non-negative, scale 2.
    pub credit_limit: Decimal,
    /// Deactivation flag; records are never deleted.
    pub active: bool,
}

/// Inbound customer payload for create, replace (PUT) and merge (PATCH).
///
/// Every field is optional at the wire level; which ones are required
/// depends on the [`RequestMode`](crate::RequestMode) it is validated under.
/// An explicit empty string is a value, distinct from an omitted field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub credit_limit: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Outbound projection of a [`CustomerRecord`].
///
/// Nulls are kept as nulls; consumers are other back-office systems.
/// `creditLimit` is a JSON number that keeps its two fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub code: String,
    pub name: String,
    pub billing_address: Option<String>,
    pub tax_code: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub credit_limit: Decimal,
    pub active: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: CustomerRequest = serde_json::from_str(
            r#"{"code":"C001","name":"Acme","billingAddress":"Tokyo","taxCode":"T1","creditLimit":100.00,"active":false}"#,
        )
        .unwrap();

        assert_eq!(request.code.as_deref(), Some("C001"));
        assert_eq!(request.billing_address.as_deref(), Some("Tokyo"));
        assert_eq!(request.tax_code.as_deref(), Some("T1"));
        assert_eq!(request.credit_limit.unwrap().to_string(), "100.00");
        assert_eq!(request.active, Some(false));
    }

    #[test]
    fn test_request_distinguishes_empty_from_missing() {
        let request: CustomerRequest = serde_json::from_str(r#"{"billingAddress":""}"#).unwrap();
        assert_eq!(request.billing_address.as_deref(), Some(""));
        assert_eq!(request.tax_code, None);
    }

    #[test]
    fn test_request_accepts_string_amount() {
        let request: CustomerRequest = serde_json::from_str(r#"{"creditLimit":"12.345"}"#).unwrap();
        assert_eq!(request.credit_limit.unwrap().to_string(), "12.345");
    }

    #[test]
    fn test_request_keeps_exact_literal() {
        let request: CustomerRequest =
            serde_json::from_str(r#"{"creditLimit":1234567890123.455}"#).unwrap();
        assert_eq!(request.credit_limit.unwrap().to_string(), "1234567890123.455");

        let request: CustomerRequest = serde_json::from_str(r#"{"creditLimit":null}"#).unwrap();
        assert_eq!(request.credit_limit, None);
    }

    #[test]
    fn test_response_keeps_nulls() {
        let response = CustomerResponse {
            code: "C001".to_string(),
            name: "Acme".to_string(),
            billing_address: None,
            tax_code: None,
            credit_limit: "100.00".parse().unwrap(),
            active: true,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["billingAddress"], serde_json::Value::Null);
        assert_eq!(json["taxCode"], serde_json::Value::Null);
        assert!(json["creditLimit"].is_number());
        assert_eq!(json["creditLimit"].to_string(), "100.00");
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"code":"C001","name":"Acme","billingAddress":null,"taxCode":null,"creditLimit":100.00,"active":true}"#
        );
        assert_eq!(json["active"], true);
    }
}
