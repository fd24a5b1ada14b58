//! [`Session`] definitions.

use std::fmt;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::User;

/// Authenticated session of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    /// Access [`Token`] of this [`Session`].
    pub token: Token,

    /// [`DateTime`] when this [`Session`] expires, if known.
    pub expires_at: Option<ExpirationDateTime>,

    /// [`User`] this [`Session`] belongs to, if known.
    pub user: Option<User>,

    /// Verification level of the [`User`], if known.
    pub verification_level: Option<serde_json::Value>,
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

/// Access token of a [`Session`].
#[derive(Clone, Eq, PartialEq)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] if the provided value is not blank.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.trim().is_empty()).then_some(Self(token))
    }

    /// Reads the `exp` claim of this [`Token`], if it's a [JWT] carrying one.
    ///
    /// Signature is not verified: the claim is only used to estimate the
    /// [`Session`] lifetime on the client side.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[must_use]
    pub fn expires_at(&self) -> Option<ExpirationDateTime> {
        /// Claims of a [`Token`] relevant to the client.
        #[derive(Deserialize)]
        struct Claims {
            /// Expiration as a Unix timestamp in seconds.
            exp: Option<i64>,
        }

        let mut validation =
            jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = jsonwebtoken::decode::<Claims>(
            &self.0,
            &jsonwebtoken::DecodingKey::from_secret(&[]),
            &validation,
        )
        .ok()?
        .claims;

        ExpirationDateTime::from_unix_timestamp(claims.exp?)
    }
}

impl ExposeSecret<str> for Token {
    fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Authentication data returned by the backend on a successful login,
/// registration or two-factor verification.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    /// Access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Access token under its alternative name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Expiration of the access token.
    ///
    /// Either a Unix timestamp in milliseconds (a number or a numeric
    /// string), or an [RFC 3339] string.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<serde_json::Value>,

    /// Authenticated [`User`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Verification level of the authenticated [`User`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_level: Option<serde_json::Value>,
}

impl AuthData {
    /// Extracts [`AuthData`] out of a backend `response`.
    ///
    /// Responses wrapping their payload into a `data` object are unwrapped.
    /// [`None`] is returned if no token can be found.
    #[must_use]
    pub fn from_response(response: &serde_json::Value) -> Option<Self> {
        let parse = |v: &serde_json::Value| {
            serde_json::from_value::<Self>(v.clone())
                .ok()
                .filter(|d| d.token().is_some())
        };
        parse(response).or_else(|| response.get("data").and_then(parse))
    }

    /// Returns the access [`Token`], preferring `token` over `accessToken`.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.token
            .clone()
            .and_then(Token::new)
            .or_else(|| self.access_token.clone().and_then(Token::new))
    }

    /// Returns the explicitly provided expiration, if it's recognizable.
    #[must_use]
    pub fn expires_at(&self) -> Option<ExpirationDateTime> {
        match self.expires_at.as_ref()? {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(truncate_millis))
                .and_then(ExpirationDateTime::from_unix_timestamp_millis),
            serde_json::Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().map_or_else(
                    || ExpirationDateTime::from_rfc3339(s).ok(),
                    ExpirationDateTime::from_unix_timestamp_millis,
                )
            }
            serde_json::Value::Null
            | serde_json::Value::Bool(_)
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }

    /// Returns the verification level, falling back to the one nested into
    /// the `user` record.
    #[must_use]
    pub fn verification_level(&self) -> Option<serde_json::Value> {
        self.verification_level
            .clone()
            .filter(|v| !v.is_null())
            .or_else(|| {
                let user = self.user.as_ref()?;
                user.get("verificationLevel")
                    .or_else(|| user.get("verification_level"))
                    .filter(|v| !v.is_null())
                    .cloned()
            })
    }
}

/// Truncates fractional milliseconds.
#[expect(
    clippy::cast_possible_truncation,
    reason = "fractions of milliseconds are irrelevant"
)]
fn truncate_millis(millis: f64) -> i64 {
    millis as i64
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use secrecy::ExposeSecret as _;

    use super::{AuthData, ExpirationDateTime, Token};

    /// `{"alg":"HS256","typ":"JWT"}.{"sub":"1","exp":2000000000}.sig`
    const JWT: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
                       eyJzdWIiOiIxIiwiZXhwIjoyMDAwMDAwMDAwfQ.\
                       c2lnbmF0dXJl";

    #[test]
    fn blank_token_is_rejected() {
        assert!(Token::new("").is_none());
        assert!(Token::new("  ").is_none());
        assert_eq!(Token::new("abc").unwrap().expose_secret(), "abc");
    }

    #[test]
    fn token_is_not_printed() {
        assert_eq!(format!("{:?}", Token::new("abc").unwrap()), "Token(***)");
    }

    #[test]
    fn reads_jwt_expiration() {
        assert_eq!(
            Token::new(JWT).unwrap().expires_at(),
            ExpirationDateTime::from_unix_timestamp(2_000_000_000),
        );
        assert_eq!(Token::new("opaque").unwrap().expires_at(), None);
    }

    #[test]
    fn falls_back_to_access_token() {
        let data: AuthData =
            serde_json::from_value(json!({"accessToken": "xyz"})).unwrap();

        assert_eq!(data.token().unwrap().expose_secret(), "xyz");
    }

    #[test]
    fn parses_expiration_forms() {
        for (raw, millis) in [
            (json!(1_900_000_000_000_i64), 1_900_000_000_000),
            (json!("1900000000000"), 1_900_000_000_000),
            (json!("2030-03-17T17:46:40Z"), 1_900_000_000_000),
        ] {
            let data = AuthData {
                expires_at: Some(raw),
                ..AuthData::default()
            };
            assert_eq!(
                data.expires_at().map(|e| e.unix_timestamp_millis()),
                Some(millis),
            );
        }
        let data = AuthData {
            expires_at: Some(json!("soon")),
            ..AuthData::default()
        };
        assert_eq!(data.expires_at(), None);
    }

    #[test]
    fn verification_level_falls_back_to_user() {
        let data: AuthData = serde_json::from_value(json!({
            "token": "abc",
            "user": {"name": "A", "verificationLevel": 2},
        }))
        .unwrap();

        assert_eq!(data.verification_level(), Some(json!(2)));
    }

    #[test]
    fn unwraps_data_envelope() {
        let data = AuthData::from_response(&json!({
            "data": {"token": "abc", "user": {"name": "A"}},
        }))
        .unwrap();

        assert_eq!(data.token().unwrap().expose_secret(), "abc");
        assert_eq!(data.user, Some(json!({"name": "A"})));
        assert!(AuthData::from_response(&json!({"status": "ok"})).is_none());
    }
}
