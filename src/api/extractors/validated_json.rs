//! JSON body extractor that runs `validator` rules before the handler.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// Deserialized and validated request body.
///
/// Malformed JSON and failed rules both become `AppError::Validation`
/// (HTTP 400) with a readable reason.
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
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(reason = %rejection.body_text(), "Request body rejected");
            AppError::validation(rejection.body_text())
        })?;

        value
            .validate()
            .map_err(|e| AppError::validation(validation_message(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// One sentence per failed rule, in field order, duplicates dropped.
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages: Vec<String> = Vec::new();
    for (field, errs) in fields {
        for err in errs {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            if !messages.contains(&message) {
                messages.push(message);
            }
        }
    }
    messages.join(", ")
}
