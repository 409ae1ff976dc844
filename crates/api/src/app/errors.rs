use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use revdesk_core::{DomainError, ErrorKind};

/// Handler error: a [`DomainError`] rendered as a JSON body.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl<E> From<E> for ApiError
where
    E: Into<DomainError>,
{
    fn from(value: E) -> Self {
        ApiError(value.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self.0.kind() {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        json_error(status, self.code(), self.0.message())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// JSON body extractor whose rejection is a 400 in the API's error shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Payload(value))
            .map_err(|rejection| ApiError(DomainError::invalid_input(rejection.body_text())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_one_status() {
        let cases = [
            (DomainError::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::conflict("x"), StatusCode::CONFLICT),
            (DomainError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn crate_errors_convert_through_domain_error() {
        let err: ApiError = revdesk_auth::AuthzError::MissingToken.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
