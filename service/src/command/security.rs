//! [`Command`]s managing security settings of the authenticated [`User`].

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

/// Body of a [`Request`] carrying a single one-time code.
#[derive(Serialize)]
struct OtpBody<'a> {
    /// One-time code.
    otp: &'a str,
}

/// Body of a [`Request`] carrying a single [`user::Pin`].
#[derive(Serialize)]
struct PinBody<'a> {
    /// Transaction PIN.
    pin: &'a str,
}

/// [`Command`] for verifying an [`user::Email`] of the authenticated
/// [`User`].
#[derive(Clone, Debug)]
pub struct VerifyEmail {
    /// One-time code delivered to the [`user::Email`].
    pub otp: SecretBox<user::Otp>,
}

impl<A, S> Command<VerifyEmail> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: VerifyEmail) -> Result<Self::Ok, Self::Err> {
        let req = Request::post("/auth/verify-email")
            .json(&OtpBody {
                otp: cmd.otp.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}

/// [`Command`] for setting a transaction [`user::Pin`] of the authenticated
/// [`User`].
#[derive(Clone, Debug)]
pub struct SetPin {
    /// New [`user::Pin`].
    pub pin: SecretBox<user::Pin>,
}

impl<A, S> Command<SetPin> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SetPin) -> Result<Self::Ok, Self::Err> {
        let req = Request::put("/auth/profile/security")
            .json(&PinBody {
                pin: cmd.pin.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}

/// [`Command`] for verifying a transaction [`user::Pin`] of the
/// authenticated [`User`].
#[derive(Clone, Debug)]
pub struct VerifyPin {
    /// [`user::Pin`] to verify.
    pub pin: SecretBox<user::Pin>,
}

impl<A, S> Command<VerifyPin> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: VerifyPin) -> Result<Self::Ok, Self::Err> {
        let req = Request::post("/auth/profile/verify-pin")
            .json(&PinBody {
                pin: cmd.pin.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}

/// [`Command`] for enabling two-factor authentication of the authenticated
/// [`User`].
#[derive(Clone, Copy, Debug)]
pub struct EnableTwoFactor;

impl<A, S> Command<EnableTwoFactor> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: EnableTwoFactor) -> Result<Self::Ok, Self::Err> {
        self.send_authorized(Request::get("/auth/profile/enable-2FA"))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Command`] for disabling two-factor authentication of the authenticated
/// [`User`].
#[derive(Clone, Copy, Debug)]
pub struct DisableTwoFactor;

impl<A, S> Command<DisableTwoFactor> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        _: DisableTwoFactor,
    ) -> Result<Self::Ok, Self::Err> {
        self.send_authorized(Request::get("/auth/profile/disable-2FA"))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// [`Command`] for requesting a one-time code verifying a
/// [`user::PhoneNumber`] of the authenticated [`User`].
#[derive(Clone, Debug)]
pub struct RequestPhoneOtp {
    /// How the code should be delivered.
    pub kind: user::OtpType,
}

impl<A, S> Command<RequestPhoneOtp> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestPhoneOtp,
    ) -> Result<Self::Ok, Self::Err> {
        self.send_authorized(Request::get(format!(
            "/auth/request-verify-phone-otp/{}",
            cmd.kind,
        )))
        .await
        .map_err(tracerr::wrap!())
    }
}

/// [`Command`] for verifying a [`user::PhoneNumber`] of the authenticated
/// [`User`].
#[derive(Clone, Debug)]
pub struct VerifyPhone {
    /// One-time code received after a [`RequestPhoneOtp`].
    pub otp: SecretBox<user::Otp>,
}

impl<A, S> Command<VerifyPhone> for Service<A, S>
where
    A: Backend,
    S: SessionStorage,
{
    type Ok = Response;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: VerifyPhone) -> Result<Self::Ok, Self::Err> {
        let req = Request::post("/auth/verify-phone")
            .json(&OtpBody {
                otp: cmd.otp.expose_secret().as_str(),
            })
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;
        self.send_authorized(req).await.map_err(tracerr::wrap!())
    }
}

#[cfg(all(test, feature = "http"))]
mod spec {
    use secrecy::SecretBox;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        command::{fixture, Command as _},
        domain::user,
        infra::api,
    };

    use super::{
        DisableTwoFactor, EnableTwoFactor, RequestPhoneOtp, SetPin,
        VerifyEmail, VerifyPhone, VerifyPin,
    };

    fn pin(raw: &str) -> SecretBox<user::Pin> {
        SecretBox::new(Box::new(user::Pin::new(raw).unwrap()))
    }

    fn otp(raw: &str) -> SecretBox<user::Otp> {
        SecretBox::new(Box::new(user::Otp::new(raw).unwrap()))
    }

    #[tokio::test]
    async fn nothing_is_sent_without_session() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let svc = fixture::service(&server);

        let errs = [
            svc.execute(VerifyEmail { otp: otp("1234") }).await.unwrap_err(),
            svc.execute(SetPin { pin: pin("1234") }).await.unwrap_err(),
            svc.execute(VerifyPin { pin: pin("1234") }).await.unwrap_err(),
            svc.execute(EnableTwoFactor).await.unwrap_err(),
            svc.execute(DisableTwoFactor).await.unwrap_err(),
            svc.execute(RequestPhoneOtp {
                kind: user::OtpType::new("sms").unwrap(),
            })
            .await
            .unwrap_err(),
            svc.execute(VerifyPhone { otp: otp("1234") }).await.unwrap_err(),
        ];

        for err in errs {
            assert_eq!(err.to_string(), "Authentication required");
        }
    }

    #[tokio::test]
    async fn sets_pin() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/auth-service/api/auth/profile/security"))
            .and(header("authorization", "Bearer abc"))
            .and(body_json(json!({"pin": "2580"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "PIN set"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let svc = fixture::authorized(&server).await;

        let resp = svc.execute(SetPin { pin: pin("2580") }).await.unwrap();

        assert_eq!(resp, json!({"message": "PIN set"}));
    }

    #[tokio::test]
    async fn wrong_pin_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/auth/profile/verify-pin"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": ["PIN", "mismatch"]})),
            )
            .mount(&server)
            .await;
        let svc = fixture::authorized(&server).await;

        let err = svc
            .execute(VerifyPin { pin: pin("0000") })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref().api(),
            Some(api::Error::Rejected { .. }),
        ));
        assert_eq!(err.to_string(), "PIN, mismatch");
    }

    #[tokio::test]
    async fn toggles_two_factor() {
        let server = MockServer::start().await;
        for route in ["enable-2FA", "disable-2FA"] {
            Mock::given(method("GET"))
                .and(path(format!("/auth-service/api/auth/profile/{route}")))
                .and(header("authorization", "Bearer abc"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"route": route})),
                )
                .expect(1)
                .mount(&server)
                .await;
        }
        let svc = fixture::authorized(&server).await;

        assert_eq!(
            svc.execute(EnableTwoFactor).await.unwrap(),
            json!({"route": "enable-2FA"}),
        );
        assert_eq!(
            svc.execute(DisableTwoFactor).await.unwrap(),
            json!({"route": "disable-2FA"}),
        );
    }

    #[tokio::test]
    async fn verifies_phone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/auth-service/api/auth/request-verify-phone-otp/whatsapp",
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/auth/verify-phone"))
            .and(body_json(json!({"otp": "836201"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"verified": true})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let svc = fixture::authorized(&server).await;

        _ = svc
            .execute(RequestPhoneOtp {
                kind: user::OtpType::new("whatsapp").unwrap(),
            })
            .await
            .unwrap();
        let resp =
            svc.execute(VerifyPhone { otp: otp("836201") }).await.unwrap();

        assert_eq!(resp, json!({"verified": true}));
    }

    #[tokio::test]
    async fn verifies_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth-service/api/auth/verify-email"))
            .and(body_json(json!({"otp": "5150"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let svc = fixture::authorized(&server).await;

        _ = svc.execute(VerifyEmail { otp: otp("5150") }).await.unwrap();
    }
}
