//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use homelink_domain::error::HomelinkError;

/// JSON error body returned by the operator endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`HomelinkError`] to an HTTP response with appropriate status code.
///
/// The fulfillment webhook never produces one: its failures are folded into
/// the per-device entries of the response.
#[derive(Debug)]
pub struct ApiError(HomelinkError);

impl From<HomelinkError> for ApiError {
    fn from(err: HomelinkError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            HomelinkError::Validation(_) => StatusCode::BAD_REQUEST,
            HomelinkError::NotFound(_) => StatusCode::NOT_FOUND,
            HomelinkError::Capability(_) | HomelinkError::Command(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            HomelinkError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
            HomelinkError::Storage(_) | HomelinkError::Uplink(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = ?self.0, "request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelink_domain::error::{BoxError, NotFoundError, ValidationError};

    #[test]
    fn should_map_validation_to_bad_request() {
        let err = ApiError::from(HomelinkError::from(ValidationError::EmptyId));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn should_map_not_found_to_404() {
        let err = ApiError::from(HomelinkError::from(NotFoundError {
            entity: "Device",
            id: "light1".to_string(),
        }));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn should_map_storage_failure_to_500() {
        let err = ApiError::from(HomelinkError::Storage(BoxError::from("disk full")));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn should_map_missing_credential_to_503() {
        let err = ApiError::from(HomelinkError::MissingCredential);
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
