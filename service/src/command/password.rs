//! [`Command`]s managing a [`user::Password`].

use secrecy::{ExposeSecret as _, SecretBox};
use serde::Serialize;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::user,
    infra::{
        api::{Request, Response},
        Backend, SessionStorage,
    },
    Service,
};

use super::{Command, ExecutionError};

/// [`Command`] for requesting a one-time code to reset a forgotten
/// [`user::Password`].
#[derive(Clone, Debug)]
pub struct RequestPasswordReset {
    /// [`user::Email`] of the [`User`] the code is sent to.
    pub email: user::Email,
}

impl<A, S> Command<RequestPasswordReset> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestPasswordReset,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a [`RequestPasswordReset`] request.
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a user::Email,
        }

        let req = Request::post("/publicauth/password/request-reset")
            .json(&Body { email: &cmd.email })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send(req).await.map_err(tracerr::wrap!())
    }
}

/// [`Command`] for resetting a forgotten [`user::Password`] with a one-time
/// code.
#[derive(Clone, Debug)]
pub struct ResetPassword {
    /// [`user::Email`] of the [`User`].
    pub email: user::Email,

    /// One-time code received after a [`RequestPasswordReset`].
    pub otp: SecretBox<user::Otp>,

    /// New [`user::Password`] of the [`User`].
    pub new_password: SecretBox<user::Password>,
}

impl<A, S> Command<ResetPassword> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResetPassword,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a [`ResetPassword`] request.
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a user::Email,
            otp: &'a str,
            new_password: &'a str,
        }

        let req = Request::post("/publicauth/password/reset-with-otp")
            .json(&Body {
                email: &cmd.email,
                otp: cmd.otp.expose_secret().as_str(),
                new_password: cmd.new_password.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send(req).await.map_err(tracerr::wrap!())
    }
}

/// [`Command`] for changing a [`user::Password`] of the authenticated
/// [`User`].
#[derive(Clone, Debug)]
pub struct ChangePassword {
    /// Current [`user::Password`] of the [`User`].
    pub current_password: SecretBox<user::Password>,

    /// New [`user::Password`] of the [`User`].
    pub new_password: SecretBox<user::Password>,
}

impl<A, S> Command<ChangePassword> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ChangePassword,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a [`ChangePassword`] request.
        #[derive(Serialize)]
        struct Body<'a> {
            current_password: &'a str,
            new_password: &'a str,
        }

        let req = Request::post("/auth/password/change")
            .json(&Body {
                current_password: cmd
                    .current_password
                    .expose_secret()
                    .as_str(),
                new_password: cmd.new_password.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}
