//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::domain::validation::validate;
use crate::errors::AppError;

/// Validated JSON extractor that automatically validates requests.
///
/// Malformed JSON becomes a plain 400; rule violations become a 400 whose
/// `details` list every offending field.
///
/// ```rust,ignore
/// async fn create_product(ValidatedJson(payload): ValidatedJson<ProductInput>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        validate(&value)?;

        Ok(ValidatedJson(value))
    }
}
