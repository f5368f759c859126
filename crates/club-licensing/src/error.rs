use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::licensing::router::error_response;
use crate::workflows::licensing::LicensingError;
use crate::workflows::review_import::ReviewImportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Licensing(LicensingError),
    Import(ReviewImportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Licensing(err) => write!(f, "licensing error: {}", err),
            AppError::Import(err) => write!(f, "review import error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Licensing(err) => Some(err),
            AppError::Import(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Licensing(ref err) => return error_response(err),
            AppError::Import(ReviewImportError::Licensing { ref source, .. }) => {
                error_response(source).status()
            }
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<LicensingError> for AppError {
    fn from(value: LicensingError) -> Self {
        Self::Licensing(value)
    }
}

impl From<ReviewImportError> for AppError {
    fn from(value: ReviewImportError) -> Self {
        Self::Import(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn licensing_errors_keep_their_http_mapping() {
        let response =
            AppError::from(LicensingError::not_found("document check", 42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::from(LicensingError::Cycle { node: 3 }).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn malformed_review_sheet_is_a_bad_request() {
        let error = AppError::from(ReviewImportError::Row {
            row: 3,
            message: "unknown stage `audit`".to_string(),
        });
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn import_rows_failing_in_the_state_machine_map_like_licensing_errors() {
        let error = AppError::from(ReviewImportError::Licensing {
            row: 2,
            source: LicensingError::Validation("industry check requires first check".into()),
        });
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
