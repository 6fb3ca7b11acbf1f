//! Request extractors with domain-shaped rejections.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use chapel_core::DomainError;

use crate::app::errors::ApiError;

/// `Json<T>` whose rejection renders as a `{ success: false, error }` 400.
///
/// Covers a missing content type, unparseable JSON and missing required fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(status = %rejection.status(), "request body rejected");
                Err(ApiError(DomainError::validation(rejection.body_text())))
            }
        }
    }
}
