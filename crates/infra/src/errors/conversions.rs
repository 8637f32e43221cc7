//! Conversions from external infrastructure errors into domain errors.

use mes_domain::MesError;
use reqwest::Error as HttpError;
use reqwest::StatusCode;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MesError);

impl From<InfraError> for MesError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MesError> for InfraError {
    fn from(value: MesError) -> Self {
        InfraError(value)
    }
}

/// Shorthand for `MesError::from(InfraError::from(err))` in `map_err` calls.
pub fn to_domain<E>(err: E) -> MesError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

trait IntoMesError {
    fn into_mes(self) -> MesError;
}

/* -------------------------------------------------------------------------- */
/* HTTP status → MesError */
/* -------------------------------------------------------------------------- */

/// Map a non-success HTTP status (plus optional response detail) to a domain
/// error.
pub fn status_error(status: StatusCode, detail: &str) -> MesError {
    let code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let mut message = format!("HTTP {code} {reason}");
    let detail = detail.trim();
    if !detail.is_empty() {
        message.push_str(": ");
        message.push_str(truncate(detail, 300));
    }

    match code {
        401 | 403 => MesError::Auth(message),
        404 => MesError::NotFound(message),
        409 => MesError::Conflict(message),
        429 => MesError::Network(message),
        400..=499 => MesError::InvalidInput(message),
        _ => MesError::Network(message),
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → MesError */
/* -------------------------------------------------------------------------- */

impl IntoMesError for SqlError {
    fn into_mes(self) -> MesError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => MesError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        MesError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        MesError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        MesError::Database(format!("foreign key constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 275) => {
                        MesError::Database(format!("check constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 1299) => {
                        MesError::Database(format!("not null constraint violation: {message}"))
                    }
                    _ => MesError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => MesError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                MesError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                MesError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => MesError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => MesError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_mes())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → MesError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(MesError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MesError */
/* -------------------------------------------------------------------------- */

impl IntoMesError for HttpError {
    fn into_mes(self) -> MesError {
        if self.is_timeout() {
            return MesError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return MesError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return status_error(status, "");
        }

        if self.is_decode() {
            return MesError::Network(format!("invalid response body: {self}"));
        }

        MesError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_mes())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → MesError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(MesError::Internal(format!("JSON serialization failed: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
