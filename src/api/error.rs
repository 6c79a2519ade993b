//! Error responses of the plot API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde_json::json;

use crate::errors::{FastlapError, no_data_warning};

/// What a request failure looks like to the client.
#[derive(Debug)]
pub enum ApiError {
    /// The selection exists but has nothing to plot
    NoData { what: &'static str, driver: String },
    /// A request field could not be understood
    BadRequest(String),
    /// Anything else, including unknown events and sessions
    Internal(String),
}

impl ApiError {
    /// Classify a failure raised while serving `driver`'s plots.
    pub fn from_error(err: FastlapError, what: &'static str, driver: &str) -> Self {
        if err.is_data_absence() {
            warn!("No {} data for {}: {}", what, driver, err);
            return Self::NoData {
                what,
                driver: driver.to_string(),
            };
        }
        match err {
            FastlapError::InvalidUserInput { .. } => Self::BadRequest(err.to_string()),
            other => {
                error!("Request for {} failed: {}", driver, other);
                Self::Internal(other.to_string())
            }
        }
    }

    /// - NoData: 404 Not Found
    /// - BadRequest: 400 Bad Request
    /// - Internal: 500 Internal Server Error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NoData { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::NoData { what, driver } => json!({ "warning": no_data_warning(what, &driver) }),
            Self::BadRequest(message) | Self::Internal(message) => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Channel;

    #[test]
    fn test_error_status_codes() {
        let no_data = ApiError::from_error(
            FastlapError::DriverNotFound {
                driver: "XXX".to_string(),
            },
            "speed",
            "XXX",
        );
        assert_eq!(no_data.status_code(), StatusCode::NOT_FOUND);

        let missing = ApiError::from_error(
            FastlapError::MissingField {
                channel: Channel::X,
            },
            "speed",
            "LEC",
        );
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let bad = ApiError::from_error(
            FastlapError::InvalidUserInput {
                field: "session".to_string(),
                reason: "nope".to_string(),
            },
            "speed",
            "LEC",
        );
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);

        let lookup = ApiError::from_error(
            FastlapError::EventNotFound {
                year: 2024,
                track: "Nowhere".to_string(),
            },
            "speed",
            "LEC",
        );
        assert_eq!(lookup.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_no_data_response() {
        let response = ApiError::NoData {
            what: "speed",
            driver: "HAM".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
