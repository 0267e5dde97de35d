//! Conversions from external infrastructure errors into domain errors.

use adpublish_domain::PublishError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PublishError);

impl From<InfraError> for PublishError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PublishError> for InfraError {
    fn from(value: PublishError) -> Self {
        InfraError(value)
    }
}

trait IntoPublishError {
    fn into_publish_error(self) -> PublishError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → PublishError */
/* -------------------------------------------------------------------------- */

impl IntoPublishError for SqlError {
    fn into_publish_error(self) -> PublishError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        PublishError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        PublishError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        PublishError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        PublishError::Database("foreign key constraint violation".into())
                    }
                    _ => PublishError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                PublishError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                PublishError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => PublishError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => PublishError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_publish_error())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → PublishError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(PublishError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PublishError */
/* -------------------------------------------------------------------------- */

impl IntoPublishError for HttpError {
    fn into_publish_error(self) -> PublishError {
        if self.is_timeout() {
            return PublishError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return PublishError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return PublishError::Internal(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            return PublishError::Network(format!(
                "HTTP {} {}",
                code,
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        PublishError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_publish_error())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → PublishError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(PublishError::Internal(format!("JSON serialization failed: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
