//! Request-body extraction with schema validation.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use inkworld_shared::first_violation;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::error::ApiError;

/// JSON body that has passed its `validator` rules.
///
/// Malformed JSON and rule failures both become `VALIDATION_ERROR`; rule
/// failures carry the message of the first failing rule.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ApiError::Validation(first_violation(&errors)))?;
        Ok(ValidatedJson(value))
    }
}
