//! [`Command`]s managing a business of the authenticated [`User`].

use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::business,
    infra::{
        api::{Request, Response},
        Backend, SessionStorage,
    },
    Service,
};

use super::{Command, ExecutionError};

/// [`Command`] for updating [`business::Info`].
#[derive(Clone, Debug)]
pub struct UpdateBusinessInfo {
    /// ID of the business to update.
    pub id: business::Id,

    /// New [`business::Info`].
    pub info: business::Info,
}

impl<A, S> Command<UpdateBusinessInfo> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateBusinessInfo,
    ) -> Result<Self::Ok, Self::Err> {
        let req =
            Request::put(format!("/auth/business/{}/business-info", cmd.id))
                .json(&cmd.info)
                .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}
