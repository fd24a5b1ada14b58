//! [`Query`] collection related to a business.

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

use super::{ExecutionError, Query};

/// Queries information about a business of the authenticated [`User`] by its
/// [`business::Id`].
#[derive(Clone, Debug)]
pub struct BusinessInfo(pub business::Id);

impl<A, S> Query<BusinessInfo> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        BusinessInfo(id): BusinessInfo,
    ) -> Result<Self::Ok, Self::Err> {
        self.send_authorized(Request::get(format!(
            "/auth/business/{id}/business-info",
        )))
        .await
        .map_err(tracerr::wrap!())
    }
}
