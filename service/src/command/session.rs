//! [`Command`]s managing the stored [`Session`].

use common::{
    operations::{Delete, Insert},
    DateTime,
};
use secrecy::ExposeSecret as _;
use strum::IntoEnumIterator as _;
use tracerr::Traced;

use crate::{
    domain::{
        user::session::{AuthData, Token},
        Session,
    },
    infra::{
        storage::{Entry, Key},
        SessionStorage,
    },
    Service,
};

use super::{Command, ExecutionError};

/// [`Command`] for storing a new [`Session`] out of [`AuthData`].
///
/// The [`Session`] expires at the explicitly provided `expiresAt`, otherwise
/// at the `exp` claim of its [`Token`], otherwise after the configured
/// [`Config::session_lifetime`].
///
/// Data without a [`Token`] is still stored, but results in no [`Session`],
/// so the [`CheckSession`] fails until a [`Token`] is saved.
///
/// [`Config::session_lifetime`]: crate::Config::session_lifetime
#[derive(Clone, Debug)]
pub struct SaveSession(pub AuthData);

impl<A, S> Command<SaveSession> for Service<A, S>
where
    S: SessionStorage,
{
    type Ok = Option<Session>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        SaveSession(data): SaveSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let token = data.token();
        let expires_at = data
            .expires_at()
            .or_else(|| token.as_ref().and_then(Token::expires_at))
            .unwrap_or_else(|| {
                (DateTime::now() + self.config().session_lifetime).coerce()
            });
        let verification_level = data.verification_level();

        let mut entries = Vec::with_capacity(5);
        if let Some(token) = &token {
            entries.push(Entry::new(Key::AuthToken, token.expose_secret()));
        }
        entries.push(Entry::new(
            Key::TokenExpiry,
            expires_at.unix_timestamp_millis().to_string(),
        ));
        if let Some(user) = &data.user {
            entries.push(Entry::new(
                Key::UserData,
                serde_json::to_string(user)
                    .map_err(tracerr::from_and_wrap!(=> E))?,
            ));
        }
        if let Some(level) = &verification_level {
            entries.push(Entry::new(
                Key::VerificationLevel,
                serde_json::to_string(level)
                    .map_err(tracerr::from_and_wrap!(=> E))?,
            ));
        }
        // Goes last, so a partially stored session is never considered
        // authenticated.
        entries.push(Entry::new(Key::IsAuthenticated, "true"));

        for entry in entries {
            self.storage()
                .execute(Insert(entry))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }
        tracing::debug!(
            expires_at = %expires_at.to_rfc3339(),
            with_token = token.is_some(),
            "session saved",
        );

        Ok(token.map(|token| Session {
            token,
            expires_at: Some(expires_at),
            user: data.user,
            verification_level,
        }))
    }
}

/// [`Command`] for removing the stored [`Session`] entirely.
#[derive(Clone, Copy, Debug)]
pub struct ClearSession;

impl<A, S> Command<ClearSession> for Service<A, S>
where
    S: SessionStorage,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: ClearSession) -> Result<Self::Ok, Self::Err> {
        for key in Key::iter() {
            self.storage()
                .execute(Delete(key))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        }
        tracing::debug!("session cleared");

        Ok(())
    }
}

/// [`Command`] for checking whether the stored [`Session`] is still valid.
///
/// Invalid [`Session`] is cleared.
#[derive(Clone, Copy, Debug)]
pub struct CheckSession;

impl<A, S> Command<CheckSession> for Service<A, S>
where
    S: SessionStorage,
{
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: CheckSession) -> Result<Self::Ok, Self::Err> {
        let flag = self
            .load(Key::IsAuthenticated)
            .await
            .map_err(tracerr::wrap!())?;
        let token = self.load(Key::AuthToken).await.map_err(tracerr::wrap!())?;
        let expiry =
            self.load(Key::TokenExpiry).await.map_err(tracerr::wrap!())?;

        let is_valid = flag.as_deref() == Some("true")
            && token.is_some_and(|t| !t.is_empty())
            && expiry.is_none_or(|e| {
                e.trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(DateTime::from_unix_timestamp_millis)
                    .is_some_and(|at| !at.is_past())
            });
        if !is_valid {
            self.execute(ClearSession).await.map_err(tracerr::wrap!())?;
        }

        Ok(is_valid)
    }
}

/// [`Command`] for ending the current [`Session`].
///
/// Only the locally stored [`Session`] is removed, the backend isn't
/// notified.
#[derive(Clone, Copy, Debug)]
pub struct Logout;

impl<A, S> Command<Logout> for Service<A, S>
where
    S: SessionStorage,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Logout) -> Result<Self::Ok, Self::Err> {
        self.execute(ClearSession).await.map_err(tracerr::wrap!())?;
        tracing::info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };
    use serde_json::json;
    use strum::IntoEnumIterator as _;

    use crate::{
        domain::user::session::AuthData,
        infra::{
            storage::{Entry, Key},
            Memory, Storage as _,
        },
        query, Config, Service,
    };

    use super::{
        CheckSession, ClearSession, Command as _, Logout, SaveSession,
    };

    fn service() -> Service<(), Memory> {
        Service::new(Config::default(), (), Memory::new())
    }

    async fn stored(svc: &Service<(), Memory>, key: Key) -> Option<String> {
        svc.storage().execute(Select(By::new(key))).await.unwrap()
    }

    fn in_an_hour() -> serde_json::Value {
        (DateTime::now() + Duration::from_secs(3600))
            .unix_timestamp_millis()
            .into()
    }

    #[tokio::test]
    async fn saved_session_is_valid_until_cleared() {
        let svc = service();

        _ = svc
            .execute(SaveSession(AuthData {
                token: Some("abc".into()),
                expires_at: Some(in_an_hour()),
                ..AuthData::default()
            }))
            .await
            .unwrap();
        assert!(svc.execute(CheckSession).await.unwrap());

        svc.execute(ClearSession).await.unwrap();
        assert!(!svc.execute(CheckSession).await.unwrap());
    }

    #[tokio::test]
    async fn expired_session_is_cleared() {
        let svc = service();
        _ = svc
            .execute(SaveSession(AuthData {
                token: Some("abc".into()),
                user: Some(json!({"name": "A"})),
                verification_level: Some(json!(1)),
                ..AuthData::default()
            }))
            .await
            .unwrap();
        let past = (DateTime::now() - Duration::from_secs(1))
            .unix_timestamp_millis()
            .to_string();
        svc.storage()
            .execute(Insert(Entry::new(Key::TokenExpiry, past)))
            .await
            .unwrap();

        assert!(!svc.execute(CheckSession).await.unwrap());
        for key in Key::iter() {
            assert_eq!(stored(&svc, key).await, None, "`{key}` remains");
        }
    }

    #[tokio::test]
    async fn missing_flag_invalidates_session() {
        let svc = service();
        svc.storage()
            .execute(Insert(Entry::new(Key::AuthToken, "abc")))
            .await
            .unwrap();

        assert!(!svc.execute(CheckSession).await.unwrap());
        assert_eq!(stored(&svc, Key::AuthToken).await, None);
    }

    #[tokio::test]
    async fn garbage_expiry_invalidates_session() {
        let svc = service();
        for (key, value) in [
            (Key::AuthToken, "abc"),
            (Key::IsAuthenticated, "true"),
            (Key::TokenExpiry, "tomorrow"),
        ] {
            svc.storage()
                .execute(Insert(Entry::new(key, value)))
                .await
                .unwrap();
        }

        assert!(!svc.execute(CheckSession).await.unwrap());
    }

    #[tokio::test]
    async fn session_without_expiry_is_valid() {
        let svc = service();
        for (key, value) in
            [(Key::AuthToken, "abc"), (Key::IsAuthenticated, "true")]
        {
            svc.storage()
                .execute(Insert(Entry::new(key, value)))
                .await
                .unwrap();
        }

        assert!(svc.execute(CheckSession).await.unwrap());
    }

    #[tokio::test]
    async fn expiry_defaults_to_configured_lifetime() {
        let svc = Service::new(
            Config {
                session_lifetime: Duration::from_secs(60),
            },
            (),
            Memory::new(),
        );
        let before = DateTime::now();

        let session = svc
            .execute(SaveSession(AuthData {
                access_token: Some("opaque".into()),
                ..AuthData::default()
            }))
            .await
            .unwrap();

        let expires_at = session.unwrap().expires_at.unwrap().coerce();
        assert!(expires_at >= before + Duration::from_secs(60));
        assert!(expires_at <= DateTime::now() + Duration::from_secs(60));
        assert_eq!(
            stored(&svc, Key::TokenExpiry).await,
            Some(expires_at.unix_timestamp_millis().to_string()),
        );
    }

    #[tokio::test]
    async fn stores_user_and_verification_level() {
        let svc = service();

        _ = svc
            .execute(SaveSession(AuthData {
                token: Some("abc".into()),
                user: Some(json!({"name": "A", "verificationLevel": 2})),
                ..AuthData::default()
            }))
            .await
            .unwrap();

        assert_eq!(
            svc.execute(query::session::UserData).await.unwrap(),
            Some(json!({"name": "A", "verificationLevel": 2})),
        );
        assert_eq!(
            svc.execute(query::session::VerificationLevel).await.unwrap(),
            Some(json!(2)),
        );
    }

    #[tokio::test]
    async fn tokenless_data_is_stored_but_not_authenticated() {
        let svc = service();

        let session = svc
            .execute(SaveSession(AuthData {
                user: Some(json!({"name": "A"})),
                verification_level: Some(json!(1)),
                ..AuthData::default()
            }))
            .await
            .unwrap();

        assert_eq!(session, None);
        assert_eq!(stored(&svc, Key::AuthToken).await, None);
        assert_eq!(
            stored(&svc, Key::UserData).await.as_deref(),
            Some(r#"{"name":"A"}"#),
        );
        assert_eq!(
            stored(&svc, Key::VerificationLevel).await.as_deref(),
            Some("1"),
        );
        assert!(!svc.execute(CheckSession).await.unwrap());
    }

    #[tokio::test]
    async fn tokenless_data_keeps_previous_token() {
        let svc = service();
        _ = svc
            .execute(SaveSession(AuthData {
                token: Some("abc".into()),
                ..AuthData::default()
            }))
            .await
            .unwrap();

        _ = svc
            .execute(SaveSession(AuthData {
                user: Some(json!({"name": "B"})),
                ..AuthData::default()
            }))
            .await
            .unwrap();

        assert_eq!(stored(&svc, Key::AuthToken).await.as_deref(), Some("abc"));
        assert!(svc.execute(CheckSession).await.unwrap());
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let svc = service();
        _ = svc
            .execute(SaveSession(AuthData {
                token: Some("abc".into()),
                ..AuthData::default()
            }))
            .await
            .unwrap();

        svc.execute(Logout).await.unwrap();

        assert_eq!(svc.execute(query::session::Token).await.unwrap(), None);
    }
}
