//! [`Command`]s updating a profile of the authenticated [`User`].

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

/// [`Command`] for updating personal information of the authenticated
/// [`User`].
///
/// Only the provided fields are sent, so the rest stay untouched.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdatePersonalInfo {
    /// New first name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<user::Name>,

    /// New last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<user::Name>,

    /// New [`user::PhoneNumber`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<user::PhoneNumber>,

    /// New date of birth, formatted as `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    /// New residential address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl<A, S> Command<UpdatePersonalInfo> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdatePersonalInfo,
    ) -> Result<Self::Ok, Self::Err> {
        let req = Request::put("/auth/profile/personal-info")
            .json(&cmd)
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}

/// [`Command`] for updating preferences of the authenticated [`User`].
///
/// Only the provided fields are sent, so the rest stay untouched.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdatePreferences {
    /// Preferred interface language, as an [ISO 639-1] code.
    ///
    /// [ISO 639-1]: https://en.wikipedia.org/wiki/ISO_639-1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Preferred display currency, as an [ISO 4217] code.
    ///
    /// [ISO 4217]: https://en.wikipedia.org/wiki/ISO_4217
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Whether notifications are delivered by email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,

    /// Whether notifications are delivered by SMS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_notifications: Option<bool>,

    /// Whether push notifications are delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
}

impl<A, S> Command<UpdatePreferences> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdatePreferences,
    ) -> Result<Self::Ok, Self::Err> {
        let req = Request::put("/auth/profile/preferences")
            .json(&cmd)
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}
