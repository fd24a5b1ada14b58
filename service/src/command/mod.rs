//! [`Command`] definition.

pub mod auth;
pub mod business;
pub mod kyc;
pub mod password;
pub mod profile;
pub mod security;
pub mod session;

use common::operations::{By, Perform, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::infra::{Api, Storage};
use crate::{
    infra::{
        api::{self, Request, Response},
        storage::{self, Key},
        Backend, SessionStorage,
    },
    query, Service,
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    auth::{Login, RegisterBusiness, RegisterIndividual, VerifyTwoFactor},
    business::UpdateBusinessInfo,
    kyc::UploadKycDocuments,
    password::{ChangePassword, RequestPasswordReset, ResetPassword},
    profile::{UpdatePersonalInfo, UpdatePreferences},
    security::{
        DisableTwoFactor, EnableTwoFactor, RequestPhoneOtp, SetPin,
        VerifyEmail, VerifyPhone, VerifyPin,
    },
    session::{CheckSession, ClearSession, Logout, SaveSession},
};

impl<A, S> Service<A, S>
where
    S: SessionStorage,
{
    /// Loads the raw value stored under the provided [`Key`].
    pub(crate) async fn load(
        &self,
        key: Key,
    ) -> Result<Option<String>, Traced<ExecutionError>> {
        self.storage()
            .execute(Select(By::new(key)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

impl<A, S> Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    /// Sends the provided [`Request`] as is.
    pub(crate) async fn send(
        &self,
        req: Request,
    ) -> Result<Response, Traced<ExecutionError>> {
        self.api()
            .execute(Perform(req))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }

    /// Sends the provided [`Request`] authorized with the stored
    /// [`session::Token`].
    ///
    /// Nothing is sent if there is no stored [`session::Token`].
    ///
    /// [`session::Token`]: crate::domain::user::session::Token
    pub(crate) async fn send_authorized(
        &self,
        req: Request,
    ) -> Result<Response, Traced<ExecutionError>> {
        let token = self
            .execute(query::session::Token)
            .await
            .map_err(tracerr::wrap!())?
            .ok_or_else(|| {
                tracerr::new!(ExecutionError::AuthenticationRequired)
            })?;

        self.send(req.bearer(token)).await.map_err(tracerr::wrap!())
    }
}

/// Error of a [`Command`] or a [`Query`] execution.
///
/// [`Query`]: crate::Query
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Api`] error.
    #[display("{_0}")]
    Api(api::Error),

    /// Session [`Storage`] error.
    #[display("Session `Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// Failed to encode or decode a JSON value.
    #[display("Invalid JSON: {_0}")]
    Json(serde_json::Error),

    /// Operation requires a session, but there is none.
    #[display("Authentication required")]
    #[from(ignore)]
    AuthenticationRequired,
}

impl ExecutionError {
    /// Returns the [`api::Error`] caused this [`ExecutionError`], if any.
    #[must_use]
    pub fn api(&self) -> Option<&api::Error> {
        match self {
            Self::Api(e) => Some(e),
            Self::Storage(_)
            | Self::Json(_)
            | Self::AuthenticationRequired => None,
        }
    }
}
