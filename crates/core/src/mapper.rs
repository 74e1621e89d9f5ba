//! Request → record write policies and record → response projections.
//!
//! | Entry point       | Absent field means                       |
//! |-------------------|------------------------------------------|
//! | [`build_new`]     | default (credit limit 0.00, active true) |
//! | [`replace_all`]   | default, overwriting the stored value    |
//! | [`merge_partial`] | keep the stored value                    |
//!
//! All three expect a request that already passed
//! [`CustomerRequest::validate`](crate::CustomerRequest::validate).

use crate::normalize::{normalize_active, normalize_money, trim_or_none, trim_required};
use crate::{CustomerId, CustomerRecord, CustomerRequest, CustomerResponse};

/// Build a brand-new record with a freshly assigned id.
#[must_use]
pub fn build_new(request: &CustomerRequest) -> CustomerRecord {
    CustomerRecord {
        id: CustomerId::new_v4(),
        code: trim_required(request.code.as_deref().unwrap_or_default()),
        name: trim_required(request.name.as_deref().unwrap_or_default()),
        billing_address: trim_or_none(request.billing_address.as_deref()),
        tax_code: trim_or_none(request.tax_code.as_deref()),
        credit_limit: normalize_money(request.credit_limit),
        active: normalize_active(request.active),
    }
}

/// Overwrite every field of `record` from `request` (PUT semantics).
///
/// An absent credit limit becomes 0.00 and an absent flag becomes `true`;
/// nothing is carried over from the stored record except its id.
pub fn replace_all(record: &mut CustomerRecord, request: &CustomerRequest) {
    record.code = trim_required(request.code.as_deref().unwrap_or_default());
    record.name = trim_required(request.name.as_deref().unwrap_or_default());
    record.billing_address = trim_or_none(request.billing_address.as_deref());
    record.tax_code = trim_or_none(request.tax_code.as_deref());
    record.credit_limit = normalize_money(request.credit_limit);
    record.active = normalize_active(request.active);
}

/// Overwrite only the fields present in `request` (PATCH semantics).
///
/// `Some("")` on an optional field is a present value and clears it.
pub fn merge_partial(record: &mut CustomerRecord, request: &CustomerRequest) {
    if let Some(code) = request.code.as_deref() {
        record.code = trim_required(code);
    }
    if let Some(name) = request.name.as_deref() {
        record.name = trim_required(name);
    }
    if let Some(address) = request.billing_address.as_deref() {
        record.billing_address = trim_or_none(Some(address));
    }
    if let Some(tax_code) = request.tax_code.as_deref() {
        record.tax_code = trim_or_none(Some(tax_code));
    }
    if let Some(limit) = request.credit_limit {
        record.credit_limit = normalize_money(Some(limit));
    }
    if let Some(active) = request.active {
        record.active = active;
    }
}

impl From<&CustomerRecord> for CustomerResponse {
    fn from(record: &CustomerRecord) -> Self {
        Self {
            code: record.code.clone(),
            name: record.name.clone(),
            billing_address: record.billing_address.clone(),
            tax_code: record.tax_code.clone(),
            credit_limit: record.credit_limit,
            active: record.active,
        }
    }
}

/// Project a record for the wire.
#[must_use]
pub fn to_response(record: &CustomerRecord) -> CustomerResponse {
    CustomerResponse::from(record)
}

/// Project records for the wire, keeping their order.
#[must_use]
pub fn to_response_list(records: &[CustomerRecord]) -> Vec<CustomerResponse> {
    records.iter().map(CustomerResponse::from).collect()
}
