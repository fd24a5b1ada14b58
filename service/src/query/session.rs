//! [`Query`] collection related to the stored [`Session`].

use tracerr::Traced;

use crate::{
    domain::{user::session, Session, User},
    infra::{storage::Key, SessionStorage},
    Service,
};

use super::{ExecutionError, Query};

/// Queries the stored [`session::Token`].
#[derive(Clone, Copy, Debug)]
pub struct Token;

impl<A, S> Query<Token> for Service<A, S>
where
    S: SessionStorage,
{
    type Ok = Option<session::Token>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Token) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .load(Key::AuthToken)
            .await
            .map_err(tracerr::wrap!())?
            .and_then(session::Token::new))
    }
}

/// Queries the stored [`User`] record.
#[derive(Clone, Copy, Debug)]
pub struct UserData;

impl<A, S> Query<UserData> for Service<A, S>
where
    S: SessionStorage,
{
    type Ok = Option<User>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: UserData) -> Result<Self::Ok, Self::Err> {
        self.load(Key::UserData)
            .await
            .map_err(tracerr::wrap!())?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))
    }
}

/// Queries the stored verification level of the [`User`].
#[derive(Clone, Copy, Debug)]
pub struct VerificationLevel;

impl<A, S> Query<VerificationLevel> for Service<A, S>
where
    S: SessionStorage,
{
    type Ok = Option<serde_json::Value>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        _: VerificationLevel,
    ) -> Result<Self::Ok, Self::Err> {
        self.load(Key::VerificationLevel)
            .await
            .map_err(tracerr::wrap!())?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))
    }
}

/// Queries the whole stored [`Session`].
///
/// Validity of the [`Session`] is not checked, use [`CheckSession`] for
/// that.
///
/// [`CheckSession`]: crate::command::CheckSession
#[derive(Clone, Copy, Debug)]
pub struct Current;

impl<A, S> Query<Current> for Service<A, S>
where
    S: SessionStorage,
{
    type Ok = Option<Session>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Current) -> Result<Self::Ok, Self::Err> {
        let Some(token) =
            self.execute(Token).await.map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };
        let expires_at = self
            .load(Key::TokenExpiry)
            .await
            .map_err(tracerr::wrap!())?
            .and_then(|e| e.trim().parse().ok())
            .and_then(session::ExpirationDateTime::from_unix_timestamp_millis);
        let user = self.execute(UserData).await.map_err(tracerr::wrap!())?;
        let verification_level = self
            .execute(VerificationLevel)
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(Session {
            token,
            expires_at,
            user,
            verification_level,
        }))
    }
}
