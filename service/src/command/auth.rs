//! [`Command`]s authenticating a [`User`].

use secrecy::{ExposeSecret as _, SecretBox};
use serde::Serialize;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{
        user::{self, session::AuthData},
        Session,
    },
    infra::{
        api::{Request, Response},
        Backend, SessionStorage,
    },
    Service,
};

use super::{ClearSession, Command, ExecutionError, SaveSession};

/// Output of an authenticating [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Backend response, as is.
    pub response: Response,

    /// [`Session`] established out of the `response`.
    ///
    /// [`None`] if the `response` contains no token (when the backend
    /// requires an additional verification step, for example).
    pub session: Option<Session>,
}

impl<A, S> Service<A, S>
where
    S: SessionStorage,
{
    /// Saves a [`Session`] out of the provided `response`, if it contains
    /// one.
    async fn establish_session(
        &self,
        response: Response,
    ) -> Result<Output, Traced<ExecutionError>> {
        let session = match AuthData::from_response(&response) {
            Some(data) => self
                .execute(SaveSession(data))
                .await
                .map_err(tracerr::wrap!())?,
            None => {
                tracing::debug!("response contains no session");
                None
            }
        };
        Ok(Output { response, session })
    }
}

/// [`Command`] for logging a [`User`] in by credentials.
#[derive(Clone, Debug)]
pub struct Login {
    /// [`user::Email`] of the [`User`].
    pub email: user::Email,

    /// [`user::Password`] of the [`User`].
    pub password: SecretBox<user::Password>,
}

impl<A, S> Command<Login> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: Login) -> Result<Self::Ok, Self::Err> {
        /// Body of a [`Login`] request.
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a user::Email,
            password: &'a str,
        }

        let req = Request::post("/publicauth/login")
            .json(&Body {
                email: &cmd.email,
                password: cmd.password.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        let response = self.send(req).await.map_err(tracerr::wrap!())?;

        self.establish_session(response)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Command`] for registering a new individual [`User`].
#[derive(Clone, Debug)]
pub struct RegisterIndividual {
    /// First name of the [`User`].
    pub first_name: user::Name,

    /// Last name of the [`User`].
    pub last_name: user::Name,

    /// [`user::Email`] of the [`User`].
    pub email: user::Email,

    /// [`user::PhoneNumber`] of the [`User`].
    pub phone_number: user::PhoneNumber,

    /// [`user::Password`] of the [`User`].
    pub password: SecretBox<user::Password>,
}

impl<A, S> Command<RegisterIndividual> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterIndividual,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a [`RegisterIndividual`] request.
        #[derive(Serialize)]
        struct Body<'a> {
            first_name: &'a user::Name,
            last_name: &'a user::Name,
            email: &'a user::Email,
            phone_number: &'a user::PhoneNumber,
            password: &'a str,
        }

        let req = Request::post("/publicauth/register")
            .json(&Body {
                first_name: &cmd.first_name,
                last_name: &cmd.last_name,
                email: &cmd.email,
                phone_number: &cmd.phone_number,
                password: cmd.password.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        let response = self.send(req).await.map_err(tracerr::wrap!())?;

        self.establish_session(response)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Command`] for registering a new business [`User`].
#[derive(Clone, Debug)]
pub struct RegisterBusiness {
    /// Registered name of the business.
    pub business_name: user::Name,

    /// First name of the business representative.
    pub first_name: user::Name,

    /// Last name of the business representative.
    pub last_name: user::Name,

    /// [`user::Email`] of the business.
    pub email: user::Email,

    /// [`user::PhoneNumber`] of the business.
    pub phone_number: user::PhoneNumber,

    /// [`user::Password`] of the [`User`].
    pub password: SecretBox<user::Password>,
}

impl<A, S> Command<RegisterBusiness> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterBusiness,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a [`RegisterBusiness`] request.
        #[derive(Serialize)]
        struct Body<'a> {
            business_name: &'a user::Name,
            first_name: &'a user::Name,
            last_name: &'a user::Name,
            email: &'a user::Email,
            phone_number: &'a user::PhoneNumber,
            password: &'a str,
        }

        let req = Request::post("/publicauth/register-business")
            .json(&Body {
                business_name: &cmd.business_name,
                first_name: &cmd.first_name,
                last_name: &cmd.last_name,
                email: &cmd.email,
                phone_number: &cmd.phone_number,
                password: cmd.password.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        let response = self.send(req).await.map_err(tracerr::wrap!())?;

        self.establish_session(response)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Command`] for completing a login with a two-factor verification code.
///
/// Any failure clears the stored [`Session`], so the login has to be started
/// over.
#[derive(Clone, Debug)]
pub struct VerifyTwoFactor {
    /// Verification code delivered to the [`User`].
    pub code: SecretBox<user::Otp>,
}

impl<A, S> Command<VerifyTwoFactor> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: VerifyTwoFactor,
    ) -> Result<Self::Ok, Self::Err> {
        /// Body of a [`VerifyTwoFactor`] request.
        #[derive(Serialize)]
        struct Body<'a> {
            code: &'a str,
        }

        let req = Request::post("/auth/login/verify-2fa")
            .json(&Body {
                code: cmd.code.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        let response = match self.send_authorized(req).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!("two-factor verification failed: {e}");
                self.execute(ClearSession)
                    .await
                    .map_err(tracerr::wrap!())?;
                return Err(e).map_err(tracerr::wrap!());
            }
        };

        self.establish_session(response)
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(all(test, feature = "http"))]
mod spec {
    use secrecy::{ExposeSecret as _, SecretBox};
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        command::{fixture, CheckSession, Command as _},
        domain::user,
        infra::api,
        query::{self, Query as _},
    };

    use super::{Login, RegisterIndividual, VerifyTwoFactor};

    fn password(raw: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(raw).unwrap()))
    }

    #[tokio::test]
    async fn login_saves_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/publicauth/login"))
            .and(body_json(json!({
                "email": "jane@example.com",
                "password": "secret-pass",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "abc",
                "user": {"name": "Jane", "verificationLevel": 1},
            })))
            .expect(1)
            .mount(&server)
            .await;
        let svc = fixture::service(&server);

        let out = svc
            .execute(Login {
                email: user::Email::new("jane@example.com").unwrap(),
                password: password("secret-pass"),
            })
            .await
            .unwrap();

        assert_eq!(out.response["token"], "abc");
        assert_eq!(out.session.unwrap().token.expose_secret(), "abc");
        assert!(svc.execute(CheckSession).await.unwrap());
        assert_eq!(
            svc.execute(query::session::VerificationLevel).await.unwrap(),
            Some(json!(1)),
        );
    }

    #[tokio::test]
    async fn login_without_token_keeps_no_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/publicauth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"requires2FA": true})),
            )
            .mount(&server)
            .await;
        let svc = fixture::service(&server);

        let out = svc
            .execute(Login {
                email: user::Email::new("jane@example.com").unwrap(),
                password: password("secret-pass"),
            })
            .await
            .unwrap();

        assert!(out.session.is_none());
        assert_eq!(out.response, json!({"requires2FA": true}));
        assert!(!svc.execute(CheckSession).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/publicauth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let svc = fixture::service(&server);

        let err = svc
            .execute(Login {
                email: user::Email::new("jane@example.com").unwrap(),
                password: password("wrong-pass"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref().api(),
            Some(api::Error::InvalidCredentials),
        ));
        assert_eq!(err.to_string(), "Invalid email or password.");
    }

    #[tokio::test]
    async fn registration_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/publicauth/register"))
            .and(body_json(json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "email": "jane@example.com",
                "phone_number": "+2348012345678",
                "password": "secret-pass",
            })))
            .respond_with(ResponseTemplate::new(500).set_body_string(
                "User with this email already exists",
            ))
            .expect(1)
            .mount(&server)
            .await;
        let svc = fixture::service(&server);

        let err = svc
            .execute(RegisterIndividual {
                first_name: user::Name::new("Jane").unwrap(),
                last_name: user::Name::new("Doe").unwrap(),
                email: user::Email::new("jane@example.com").unwrap(),
                phone_number: user::PhoneNumber::new("+2348012345678")
                    .unwrap(),
                password: password("secret-pass"),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "An account with these details already exists. \
             Please sign in instead.",
        );
    }

    #[tokio::test]
    async fn verified_two_factor_replaces_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/auth/login/verify-2fa"))
            .and(header("authorization", "Bearer abc"))
            .and(body_json(json!({"code": "123456"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"accessToken": "def"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let svc = fixture::authorized(&server).await;

        _ = svc
            .execute(VerifyTwoFactor {
                code: SecretBox::new(Box::new(
                    user::Otp::new("123456").unwrap(),
                )),
            })
            .await
            .unwrap();

        assert_eq!(
            svc.execute(query::session::Token)
                .await
                .unwrap()
                .unwrap()
                .expose_secret(),
            "def",
        );
    }

    #[tokio::test]
    async fn failed_two_factor_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/auth/login/verify-2fa"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"message": "Invalid code"})),
            )
            .mount(&server)
            .await;
        let svc = fixture::authorized(&server).await;

        let err = svc
            .execute(VerifyTwoFactor {
                code: SecretBox::new(Box::new(
                    user::Otp::new("000000").unwrap(),
                )),
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid code");
        assert!(svc.execute(query::session::Token).await.unwrap().is_none());
    }
}
