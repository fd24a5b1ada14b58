//! HTTP [`Api`] implementation.

use std::{error::Error as StdError, io, time::Duration};

use common::operations::Perform;
use secrecy::ExposeSecret as _;
use smart_default::SmartDefault;
use tracerr::Traced;

#[cfg(doc)]
use crate::infra::Api;

use super::{parse_success, Body, Error, Request, Response};

/// [`Http`] client configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Base URL every [`Request::path`] is appended to.
    #[default("http://localhost:8080/auth-service/api".to_owned())]
    pub url: String,

    /// Timeout of a single [`Request`].
    #[default(Duration::from_secs(30))]
    pub timeout: Duration,
}

/// HTTP [`Api`] client.
#[derive(Clone, Debug)]
pub struct Http {
    /// Underlying [`reqwest::Client`].
    client: reqwest::Client,

    /// Base URL without a trailing slash.
    base_url: String,
}

impl Http {
    /// Creates a new [`Http`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the underlying [`reqwest::Client`] cannot be initialized.
    pub fn new(conf: &Config) -> Result<Self, Traced<Error>> {
        let client = reqwest::Client::builder()
            .timeout(conf.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(Self {
            client,
            base_url: conf.url.trim_end_matches('/').to_owned(),
        })
    }

    /// Returns the base URL of this [`Http`] client.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a [`reqwest::RequestBuilder`] out of the provided [`Request`].
    fn build(
        &self,
        req: Request,
    ) -> Result<reqwest::RequestBuilder, reqwest::Error> {
        let Request {
            method,
            path,
            headers,
            token,
            body,
        } = req;

        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .headers(headers);
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        Ok(match body {
            None => builder,
            Some(Body::Json(json)) => builder.json(&json),
            Some(Body::Form(parts)) => {
                let mut form = reqwest::multipart::Form::new();
                for p in parts {
                    let mut part = reqwest::multipart::Part::bytes(p.content);
                    if let Some(name) = p.file_name {
                        part = part.file_name(name);
                    }
                    if let Some(mime) = p.content_type {
                        part = part.mime_str(&mime)?;
                    }
                    form = form.part(p.name, part);
                }
                builder.multipart(form)
            }
        })
    }
}

impl super::Api<Perform<Request>> for Http {
    type Ok = Response;
    type Err = Traced<Error>;

    #[tracing::instrument(
        skip_all,
        fields(
            http.method = %op.0.method,
            http.route = %op.0.path,
            http.status_code = tracing::field::Empty,
        ),
    )]
    async fn execute(
        &self,
        op: Perform<Request>,
    ) -> Result<Self::Ok, Self::Err> {
        let Perform(req) = op;

        let resp = self
            .build(req)
            .map_err(Error::from)
            .map_err(tracerr::wrap!())?
            .send()
            .await
            .map_err(Error::from)
            .map_err(tracerr::wrap!())?;

        let status = resp.status();
        _ = tracing::Span::current().record(
            "http.status_code",
            tracing::field::display(status.as_u16()),
        );

        let body = resp
            .text()
            .await
            .map_err(Error::from)
            .map_err(tracerr::wrap!())?;

        if status.is_success() || status.is_redirection() {
            Ok(parse_success(&body))
        } else {
            let err = Error::from_response(status, &body);
            tracing::debug!("request rejected: {err}");
            Err(tracerr::new!(err))
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            if is_network_unreachable(&err) {
                Self::Offline
            } else {
                Self::Connection
            }
        } else {
            Self::Transport(err)
        }
    }
}

/// Checks whether the provided `err` is caused by an unreachable network.
fn is_network_unreachable(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<io::Error>() {
            if matches!(
                io.kind(),
                io::ErrorKind::NetworkUnreachable
                    | io::ErrorKind::HostUnreachable
                    | io::ErrorKind::NetworkDown
            ) {
                return true;
            }
        }
        source = e.source();
    }
    false
}
