//! Request extractors that reject with [`AppError`].
//!
//! axum's built-in `Json`, `Path` and `Query` rejections render plain-text
//! bodies; these wrappers map every failure onto the API error shape.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::{Path as JsonPath, Segment};

use customer_master_core::Violation;
use customer_master_core::validation::validate_code_param;

use crate::error::AppError;

/// JSON body extractor.
///
/// Syntax errors reject without detail. A value of the wrong type for a
/// known field rejects with one violation naming that field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Status {
                status: rejection.status(),
                reason: Some(rejection.body_text()),
            })?;

        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| AppError::MalformedBody {
                detail: e.to_string(),
                violation: None,
            })?;

        serde_path_to_error::deserialize(&value)
            .map(ApiJson)
            .map_err(|e| {
                let violation = e.path().iter().next().is_some().then(|| {
                    Violation::new(
                        e.path().to_string(),
                        format!("invalid value type: {}", e.inner()),
                        value_at(&value, e.path()),
                    )
                });

                AppError::MalformedBody {
                    detail: e.to_string(),
                    violation,
                }
            })
    }
}

/// Value found at `path` inside `root`, `null` if the path leaves the tree.
fn value_at(root: &Value, path: &JsonPath) -> Value {
    let mut current = root;
    for segment in path.iter() {
        let next = match segment {
            Segment::Map { key } => current.get(key.as_str()),
            Segment::Seq { index } => current.get(*index),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    current.clone()
}

/// The `codes` query parameter.
///
/// Accepts repeated parameters (`codes=a&codes=b`), comma-separated values
/// (`codes=a,b`) or both. Entries are trimmed and each must be a valid
/// customer code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodesQuery(pub Vec<String>);

const CODES_PARAM: &str = "codes";

impl<S> FromRequestParts<S> for CodesQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();

        let values: Vec<String> = url::form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| key == CODES_PARAM)
            .map(|(_, value)| value.into_owned())
            .collect();

        if values.is_empty() {
            return Err(AppError::MissingParameter(CODES_PARAM.to_string()));
        }

        let codes: Vec<String> = values
            .iter()
            .flat_map(|value| value.split(','))
            .map(|code| code.trim().to_owned())
            .collect();

        let violations: Vec<Violation> = codes
            .iter()
            .enumerate()
            .filter_map(|(i, code)| validate_code_param(&format!("{CODES_PARAM}[{i}]"), code))
            .collect();

        if violations.is_empty() {
            Ok(Self(codes))
        } else {
            Err(AppError::InvalidParameter(violations))
        }
    }
}

/// A customer code taken from the `{code}` path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePath(pub String);

impl<S> FromRequestParts<S> for CodePath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(code) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::InvalidParameter(vec![Violation::new(
                    "code",
                    rejection.body_text(),
                    Value::Null,
                )])
            })?;

        match validate_code_param("code", &code) {
            Some(violation) => Err(AppError::InvalidParameter(vec![violation])),
            None => Ok(Self(code)),
        }
    }
}
