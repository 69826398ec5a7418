use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Field name -> human readable failure messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// RepoError
///
/// Failures raised by the persistence layer. Constraint violations are kept
/// apart from generic database errors so the handlers can turn them into the
/// same Conflict responses their own pre-checks produce.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error(transparent)]
    Database(sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for RepoError {
    /// Classifies Postgres constraint errors by SQLSTATE (23505 unique, 23503 foreign key).
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some("23505") => return RepoError::UniqueViolation(constraint),
                Some("23503") => return RepoError::ForeignKeyViolation(constraint),
                _ => {}
            }
        }
        RepoError::Database(err)
    }
}

/// ApiError
///
/// The complete error taxonomy surfaced to HTTP callers. Every variant renders
/// as `{ "error": ..., "details"?: ... }` with the matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid input")]
    InvalidInput(FieldErrors),
    /// Uniqueness violations and the delete-guard. Reported as 400.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal server error")]
    Internal(#[from] RepoError),
    #[error("Internal server error")]
    Render(#[from] minijinja::Error),
}

/// ErrorBody
///
/// Wire shape of every failure response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    /// Builds an InvalidInput error carrying a single message for one field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut details = FieldErrors::new();
        details.insert(field.to_string(), vec![message.into()]);
        ApiError::InvalidInput(details)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidInput(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::InvalidInput(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal detail stays in the logs.
        match &self {
            ApiError::Internal(e) => tracing::error!(error = %e, "request failed: storage error"),
            ApiError::Render(e) => tracing::error!(error = %e, "request failed: render error"),
            _ => {}
        }

        let status = self.status();
        let error = self.to_string();
        let details = match self {
            ApiError::InvalidInput(details) => Some(details),
            _ => None,
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn internal_errors_hide_storage_detail() {
        let err = ApiError::Internal(RepoError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_become_field_details() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "slug",
            ValidationError::new("slug").with_message("bad slug".into()),
        );
        errors.add("name", ValidationError::new("length"));

        match ApiError::from(errors) {
            ApiError::InvalidInput(details) => {
                assert_eq!(details["slug"], vec!["bad slug".to_string()]);
                assert_eq!(details["name"], vec!["length".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn conflicts_are_bad_requests() {
        let err = ApiError::Conflict("Tag with this name or slug already exists".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
