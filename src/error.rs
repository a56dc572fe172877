use reqwest::StatusCode;
use std::fmt::{Display, Formatter};
use std::{fmt, io};

/// Errors produced by the transport layer and the API wrappers.
#[derive(Debug)]
pub enum AppError {
    Network(reqwest::Error),
    Io(io::Error),
    Json(serde_json::Error),
    /// Non-2xx response carrying a backend-provided `detail` message.
    Api { status: StatusCode, detail: String },
    Unauthorized,
    NotFound,
    /// The session can no longer be recovered; the caller should send the
    /// user back to login.
    SessionExpired,
    Validation(String),
    Unexpected(StatusCode),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(e) => write!(f, "network error: {e}"),
            AppError::Io(e) => write!(f, "io error: {e}"),
            AppError::Json(e) => write!(f, "json error: {e}"),
            AppError::Api { status, detail } => write!(f, "api error ({status}): {detail}"),
            AppError::Unauthorized => write!(f, "unauthorized"),
            AppError::NotFound => write!(f, "not found"),
            AppError::SessionExpired => write!(f, "session expired"),
            AppError::Validation(msg) => write!(f, "validation error: {msg}"),
            AppError::Unexpected(s) => write!(f, "unexpected http status: {s}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e)
    }
}
impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e)
    }
}
impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}

/// Errors produced by the session layer (login, refresh, hydration).
#[derive(Debug)]
pub enum AuthError {
    Network(reqwest::Error),
    Io(io::Error),
    Json(serde_json::Error),
    Api { status: StatusCode, detail: String },
    BadCredentials,
    /// A 401 was received but no refresh token is stored locally.
    MissingRefreshToken,
    SessionExpired,
    Validation(String),
    Unexpected(StatusCode),
    Other(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Network(e) => write!(f, "network error: {e}"),
            AuthError::Io(e) => write!(f, "io error: {e}"),
            AuthError::Json(e) => write!(f, "json error: {e}"),
            AuthError::Api { status, detail } => write!(f, "api error ({status}): {detail}"),
            AuthError::BadCredentials => write!(f, "bad credentials"),
            AuthError::MissingRefreshToken => write!(f, "missing refresh token"),
            AuthError::SessionExpired => write!(f, "session expired"),
            AuthError::Validation(msg) => write!(f, "validation error: {msg}"),
            AuthError::Unexpected(s) => write!(f, "unexpected http status: {s}"),
            AuthError::Other(msg) => write!(f, "other error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e)
    }
}

impl From<AppError> for AuthError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Network(e) => AuthError::Network(e),
            AppError::Io(e) => AuthError::Io(e),
            AppError::Json(e) => AuthError::Json(e),
            AppError::Api { status, detail } => AuthError::Api { status, detail },
            AppError::Unauthorized => AuthError::BadCredentials,
            AppError::SessionExpired => AuthError::SessionExpired,
            AppError::Validation(msg) => AuthError::Validation(msg),
            AppError::NotFound => AuthError::Unexpected(StatusCode::NOT_FOUND),
            AppError::Unexpected(s) => AuthError::Unexpected(s),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Network(e) => AppError::Network(e),
            AuthError::Io(e) => AppError::Io(e),
            AuthError::Json(e) => AppError::Json(e),
            AuthError::Api { status, detail } => AppError::Api { status, detail },
            AuthError::BadCredentials => AppError::Unauthorized,
            AuthError::MissingRefreshToken | AuthError::SessionExpired => AppError::SessionExpired,
            AuthError::Validation(msg) => AppError::Validation(msg),
            AuthError::Unexpected(s) => AppError::Unexpected(s),
            AuthError::Other(_) => AppError::Unexpected(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl AuthError {
    /// Rebuilds an owned error from one shared between single-flight
    /// waiters. Variants wrapping non-clonable sources collapse to their
    /// message form.
    pub(crate) fn from_shared(e: &AuthError) -> Self {
        match e {
            AuthError::Api { status, detail } => AuthError::Api {
                status: *status,
                detail: detail.clone(),
            },
            AuthError::BadCredentials => AuthError::BadCredentials,
            AuthError::MissingRefreshToken => AuthError::MissingRefreshToken,
            AuthError::SessionExpired => AuthError::SessionExpired,
            AuthError::Validation(msg) => AuthError::Validation(msg.clone()),
            AuthError::Unexpected(s) => AuthError::Unexpected(*s),
            other => AuthError::Other(other.to_string()),
        }
    }
}
