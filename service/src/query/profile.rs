//! [`Query`] collection related to a profile of the authenticated [`User`].

use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    infra::{
        api::{Request, Response},
        Backend, SessionStorage,
    },
    Service,
};

use super::{session, ExecutionError, Query};

/// Queries personal information of the authenticated [`User`].
#[derive(Clone, Copy, Debug)]
pub struct PersonalInfo;

impl<A, S> Query<PersonalInfo> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: PersonalInfo) -> Result<Self::Ok, Self::Err> {
        self.send_authorized(Request::get("/auth/profile/personal-info"))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Queries preferences of the authenticated [`User`].
#[derive(Clone, Copy, Debug)]
pub struct Preferences;

impl<A, S> Query<Preferences> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Preferences) -> Result<Self::Ok, Self::Err> {
        self.send_authorized(Request::get("/auth/profile/preferences"))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Queries the verification level of a [`User`] from the backend.
///
/// The stored token is attached, if there is one, but isn't required.
#[derive(Clone, Copy, Debug)]
pub struct VerificationLevel;

impl<A, S> Query<VerificationLevel> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        _: VerificationLevel,
    ) -> Result<Self::Ok, Self::Err> {
        let mut req = Request::get("/publicauth/get-verification-level");
        if let Some(token) = self
            .execute(session::Token)
            .await
            .map_err(tracerr::wrap!())?
        {
            req = req.bearer(token);
        }
        self.send(req).await.map_err(tracerr::wrap!())
    }
}
