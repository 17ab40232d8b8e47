use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Import error: {0}")]
    Import(#[from] importer::ImportError),
    #[error("API client error: {0}")]
    Api(#[from] api_client::error::ApiError),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(DbError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Import(import_err) => {
                tracing::error!(error = ?import_err, "Import error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Order synchronization failed".to_string(),
                )
            }
            AppError::Api(api_err) => {
                tracing::error!(error = ?api_err, "API client error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The remote orders API could not be reached".to_string(),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
