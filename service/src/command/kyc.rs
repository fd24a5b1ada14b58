//! [`Command`]s managing KYC [`Document`]s.

use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::kyc::Document,
    infra::{
        api::{Request, Response},
        Backend, SessionStorage,
    },
    Service,
};

use super::{Command, ExecutionError};

/// [`Command`] for uploading KYC [`Document`]s of the authenticated [`User`].
///
/// All the [`Document`]s are sent in a single `multipart/form-data` request.
#[derive(Clone, Debug)]
pub struct UploadKycDocuments(pub Vec<Document>);

impl<A, S> Command<UploadKycDocuments> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        UploadKycDocuments(docs): UploadKycDocuments,
    ) -> Result<Self::Ok, Self::Err> {
        let req = Request::post("/auth/profile/kyc-docs")
            .form(docs.into_iter().map(Into::into).collect());
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}
