//! Remote [`Api`]-related definitions.

#[cfg(feature = "http")]
pub mod http;

use common::operations::Perform;
use derive_more::{Debug, Display, Error as StdError};
use serde::{Deserialize, Serialize};
use tracerr::Traced;

use crate::domain::user::session;

#[cfg(feature = "http")]
pub use self::http::Http;

/// Remote API operation.
pub use common::Handler as Api;

/// Parsed JSON body of a successful [`Api`] response.
pub type Response = serde_json::Value;

/// [`Api`] capable of [`Perform`]ing [`Request`]s.
pub trait Backend:
    Api<Perform<Request>, Ok = Response, Err = Traced<Error>>
{
}

impl<T> Backend for T where
    T: Api<Perform<Request>, Ok = Response, Err = Traced<Error>> + ?Sized
{
}

/// Descriptor of a single outbound [`Api`] request.
#[derive(Clone, Debug)]
pub struct Request {
    /// HTTP method of this [`Request`].
    pub method: ::http::Method,

    /// Endpoint path, relative to the base URL of the [`Api`].
    pub path: String,

    /// Additional headers to send.
    pub headers: ::http::HeaderMap,

    /// [`session::Token`] to authorize this [`Request`] with.
    pub token: Option<session::Token>,

    /// [`Body`] of this [`Request`], if any.
    pub body: Option<Body>,
}

impl Request {
    /// Creates a new [`Request`] with the provided method and path.
    #[must_use]
    pub fn new(method: ::http::Method, path: impl Into<String>) -> Self {
        let mut headers = ::http::HeaderMap::new();
        drop(headers.insert(
            ::http::header::ACCEPT,
            ::http::HeaderValue::from_static("application/json"),
        ));
        Self {
            method,
            path: path.into(),
            headers,
            token: None,
            body: None,
        }
    }

    /// Creates a new `GET` [`Request`].
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(::http::Method::GET, path)
    }

    /// Creates a new `POST` [`Request`].
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(::http::Method::POST, path)
    }

    /// Creates a new `PUT` [`Request`].
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(::http::Method::PUT, path)
    }

    /// Attaches the provided JSON `body` to this [`Request`].
    ///
    /// # Errors
    ///
    /// If the `body` cannot be represented as JSON.
    pub fn json<T>(mut self, body: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        self.body = Some(Body::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attaches the provided multipart form `parts` to this [`Request`].
    #[must_use]
    pub fn form(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(Body::Form(parts));
        self
    }

    /// Authorizes this [`Request`] with the provided [`session::Token`].
    #[must_use]
    pub fn bearer(mut self, token: session::Token) -> Self {
        self.token = Some(token);
        self
    }
}

/// Body of a [`Request`].
#[derive(Clone, Debug)]
pub enum Body {
    /// JSON-encoded body.
    Json(serde_json::Value),

    /// `multipart/form-data` body.
    Form(Vec<FormPart>),
}

/// Single part of a [`Body::Form`].
#[derive(Clone, Debug)]
pub struct FormPart {
    /// Name of the form field.
    pub name: String,

    /// Name of the transferred file, if the part is a file.
    pub file_name: Option<String>,

    /// MIME type of the `content`.
    pub content_type: Option<String>,

    /// Raw content of this [`FormPart`].
    #[debug("{} bytes", content.len())]
    pub content: Vec<u8>,
}

/// Parses the body of a successful [`Api`] response.
///
/// Empty bodies and bodies that are not valid JSON result in an empty JSON
/// object.
#[must_use]
pub fn parse_success(body: &str) -> Response {
    if body.trim().is_empty() {
        return Response::Object(serde_json::Map::new());
    }
    serde_json::from_str(body).unwrap_or_else(|e| {
        tracing::warn!("response body is not a valid JSON: {e}");
        Response::Object(serde_json::Map::new())
    })
}

/// [`Api`] error.
///
/// [`Display`] renders the message suitable for showing to an end user.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Provided credentials were rejected.
    #[display("Invalid email or password.")]
    InvalidCredentials,

    /// Too many attempts were made in a short period.
    #[display("Too many login attempts. Please try again later.")]
    TooManyAttempts,

    /// Account with the provided details already exists.
    #[display(
        "An account with these details already exists. \
         Please sign in instead."
    )]
    AccountExists,

    /// Part of the provided details is already registered.
    #[display(
        "Some of the provided information is already in use. \
         Please use different details."
    )]
    DuplicateInfo,

    /// Remote server failed to process the request.
    #[display("Server error. Please try again later.")]
    Server {
        /// [`http::StatusCode`] of the response.
        ///
        /// [`http::StatusCode`]: ::http::StatusCode
        status: ::http::StatusCode,
    },

    /// Request was rejected with a non-successful status.
    #[display("{message}")]
    Rejected {
        /// [`http::StatusCode`] of the response.
        ///
        /// [`http::StatusCode`]: ::http::StatusCode
        status: ::http::StatusCode,

        /// Message describing the rejection.
        message: String,
    },

    /// Failed to establish a connection to the server.
    #[display(
        "Unable to connect to the server. \
         Please check your internet connection."
    )]
    Connection,

    /// Request didn't complete in time.
    #[display("Request timed out. Please try again.")]
    Timeout,

    /// Network is unreachable.
    #[display(
        "You appear to be offline. Please check your internet connection."
    )]
    Offline,

    /// Any other transport failure.
    #[cfg(feature = "http")]
    #[display("HTTP request failed: {_0}")]
    Transport(reqwest::Error),
}

impl Error {
    /// Classifies a non-successful response by its `status` and raw `body`.
    #[must_use]
    pub fn from_response(status: ::http::StatusCode, body: &str) -> Self {
        use ::http::StatusCode as S;

        let envelope = Envelope::parse(body);
        let message = envelope.message();

        if status == S::INTERNAL_SERVER_ERROR
            && message.as_deref().map(str::trim) == Some("Invalid credentials")
        {
            return Self::InvalidCredentials;
        }
        match status {
            S::UNAUTHORIZED => return Self::InvalidCredentials,
            S::TOO_MANY_REQUESTS => return Self::TooManyAttempts,
            _ => {}
        }
        if let Some(err) = envelope.code.as_deref().and_then(Self::from_code) {
            return err;
        }

        if status.as_u16() >= 500 {
            let text = body.to_lowercase();
            if text.contains("already exists") {
                Self::AccountExists
            } else if text.contains("duplicate") {
                Self::DuplicateInfo
            } else {
                Self::Server { status }
            }
        } else {
            Self::Rejected {
                status,
                message: message.unwrap_or_else(|| {
                    format!(
                        "Error {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or_default(),
                    )
                }),
            }
        }
    }

    /// Maps a typed error `code` of the response envelope, if it's known.
    fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "INVALID_CREDENTIALS" => Self::InvalidCredentials,
            "TOO_MANY_REQUESTS" => Self::TooManyAttempts,
            "ACCOUNT_EXISTS" => Self::AccountExists,
            "DUPLICATE_ENTRY" => Self::DuplicateInfo,
            _ => return None,
        })
    }

    /// Returns the [`http::StatusCode`] of the response caused this
    /// [`Error`], if any.
    ///
    /// [`http::StatusCode`]: ::http::StatusCode
    #[must_use]
    pub fn status(&self) -> Option<::http::StatusCode> {
        match self {
            Self::InvalidCredentials => Some(::http::StatusCode::UNAUTHORIZED),
            Self::TooManyAttempts => {
                Some(::http::StatusCode::TOO_MANY_REQUESTS)
            }
            Self::Server { status } | Self::Rejected { status, .. } => {
                Some(*status)
            }
            Self::AccountExists
            | Self::DuplicateInfo
            | Self::Connection
            | Self::Timeout
            | Self::Offline => None,
            #[cfg(feature = "http")]
            Self::Transport(e) => e.status(),
        }
    }
}

/// Error envelope of a non-successful response.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    /// Human-readable message.
    ///
    /// Either a string or a list of strings.
    #[serde(default)]
    message: Option<serde_json::Value>,

    /// Short error description.
    #[serde(default)]
    error: Option<serde_json::Value>,

    /// Machine-readable error code.
    #[serde(default)]
    code: Option<String>,
}

impl Envelope {
    /// Parses an [`Envelope`] from the raw response `body`.
    ///
    /// Non-JSON bodies result in an empty [`Envelope`].
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Returns the message of this [`Envelope`], preferring `message` over
    /// `error`.
    fn message(&self) -> Option<String> {
        fn text(value: &serde_json::Value) -> Option<String> {
            match value {
                serde_json::Value::String(s) if !s.is_empty() => {
                    Some(s.clone())
                }
                serde_json::Value::Array(items) => {
                    let joined = items
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    (!joined.is_empty()).then_some(joined)
                }
                serde_json::Value::Null
                | serde_json::Value::Bool(_)
                | serde_json::Value::Number(_)
                | serde_json::Value::String(_)
                | serde_json::Value::Object(_) => None,
            }
        }

        self.message
            .as_ref()
            .and_then(text)
            .or_else(|| self.error.as_ref().and_then(text))
    }
}

#[cfg(test)]
mod spec {
    use ::http::StatusCode;

    use super::{parse_success, Error};

    #[test]
    fn invalid_credentials_on_server_error() {
        let err = Error::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message": "Invalid credentials"}"#,
        );

        assert!(matches!(err, Error::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid email or password.");
    }

    #[test]
    fn unauthorized_regardless_of_body() {
        for body in ["", "nope", r#"{"message": "Token expired"}"#] {
            assert_eq!(
                Error::from_response(StatusCode::UNAUTHORIZED, body)
                    .to_string(),
                "Invalid email or password.",
            );
        }
    }

    #[test]
    fn too_many_requests() {
        assert_eq!(
            Error::from_response(StatusCode::TOO_MANY_REQUESTS, "")
                .to_string(),
            "Too many login attempts. Please try again later.",
        );
    }

    #[test]
    fn server_errors_by_body_text() {
        assert!(matches!(
            Error::from_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "User with email a@b.c already exists",
            ),
            Error::AccountExists,
        ));
        assert!(matches!(
            Error::from_response(
                StatusCode::BAD_GATEWAY,
                r#"{"error": "Key (phone)=(1) already exists"}"#,
            ),
            Error::AccountExists,
        ));
        assert!(matches!(
            Error::from_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"message": "duplicate key value violates constraint"}"#,
            ),
            Error::DuplicateInfo,
        ));
        assert!(matches!(
            Error::from_response(StatusCode::SERVICE_UNAVAILABLE, ""),
            Error::Server {
                status: StatusCode::SERVICE_UNAVAILABLE,
            },
        ));
    }

    #[test]
    fn status_rules_win_over_typed_code() {
        assert!(matches!(
            Error::from_response(
                StatusCode::UNAUTHORIZED,
                r#"{"code": "TOO_MANY_REQUESTS"}"#,
            ),
            Error::InvalidCredentials,
        ));
        assert_eq!(
            Error::from_response(
                StatusCode::TOO_MANY_REQUESTS,
                r#"{"code": "INVALID_CREDENTIALS"}"#,
            )
            .to_string(),
            "Too many login attempts. Please try again later.",
        );
        assert!(matches!(
            Error::from_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"code": "DUPLICATE_ENTRY", "message": "Invalid credentials"}"#,
            ),
            Error::InvalidCredentials,
        ));
    }

    #[test]
    fn typed_code_wins_over_heuristics() {
        assert!(matches!(
            Error::from_response(
                StatusCode::CONFLICT,
                r#"{"code": "ACCOUNT_EXISTS", "message": "Conflict"}"#,
            ),
            Error::AccountExists,
        ));
        assert!(matches!(
            Error::from_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"code": "SOMETHING_ELSE", "message": "already exists"}"#,
            ),
            Error::AccountExists,
        ));
        assert!(matches!(
            Error::from_response(
                StatusCode::BAD_GATEWAY,
                r#"{"code": "DUPLICATE_ENTRY", "message": "already exists"}"#,
            ),
            Error::DuplicateInfo,
        ));
    }

    #[test]
    fn body_text_is_matched_case_insensitively() {
        assert!(matches!(
            Error::from_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Account Already Exists",
            ),
            Error::AccountExists,
        ));
        assert!(matches!(
            Error::from_response(StatusCode::BAD_GATEWAY, "DUPLICATE key"),
            Error::DuplicateInfo,
        ));
    }

    #[test]
    fn other_statuses_use_server_message() {
        let err = Error::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Phone number is invalid"}"#,
        );
        assert_eq!(err.to_string(), "Phone number is invalid");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

        assert_eq!(
            Error::from_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"message": ["email must be an email", "otp is empty"]}"#,
            )
            .to_string(),
            "email must be an email, otp is empty",
        );
        assert_eq!(
            Error::from_response(
                StatusCode::FORBIDDEN,
                r#"{"error": "Forbidden"}"#,
            )
            .to_string(),
            "Forbidden",
        );
    }

    #[test]
    fn other_statuses_fall_back_to_status_text() {
        assert_eq!(
            Error::from_response(StatusCode::NOT_FOUND, "<html></html>")
                .to_string(),
            "Error 404: Not Found",
        );
    }

    #[test]
    fn success_body_degrades_to_empty_object() {
        assert_eq!(parse_success(""), serde_json::json!({}));
        assert_eq!(parse_success("  \n"), serde_json::json!({}));
        assert_eq!(parse_success("<html>"), serde_json::json!({}));
        assert_eq!(
            parse_success(r#"{"ok": true}"#),
            serde_json::json!({"ok": true}),
        );
    }
}
