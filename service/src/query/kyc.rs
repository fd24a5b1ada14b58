//! [`Query`] collection related to KYC documents.

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

use super::{ExecutionError, Query};

/// Queries KYC documents uploaded by the authenticated [`User`].
#[derive(Clone, Copy, Debug)]
pub struct KycDocuments;

impl<A, S> Query<KycDocuments> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: KycDocuments) -> Result<Self::Ok, Self::Err> {
        self.send_authorized(Request::get("/auth/profile/kyc-docs"))
            .await
            .map_err(tracerr::wrap!())
    }
}
