//! Query string extractor with validation.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ApiError, ValidationDetail};

/// Deserializes the query string into `T` and runs its validation rules.
///
/// Both a malformed query string and a failed rule are reported as a 422
/// validation error.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(vec![ValidationDetail::new("query", rejection.body_text())])
            })?;

        value.validate()?;
        Ok(Self(value))
    }
}
