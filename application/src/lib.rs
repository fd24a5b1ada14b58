//! Console of the fintech authentication backend, running [`Service`]
//! operations from the command line.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod args;
pub mod config;
pub mod error;

use std::{ffi::OsStr, path::PathBuf};

use secrecy::{zeroize::Zeroize, SecretBox};
use serde_json::{json, Value};
use service::{
    command,
    domain::{business, kyc, user::session::ExpirationDateTime},
    infra::{Backend, File, Http, SessionStorage},
    query::{self, ExecutionError},
    Command as _,
};
use tracerr::Traced;
// Used in binary.
use tracing_subscriber as _;

pub use self::{args::Args, config::Config, error::Error};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<Http, File>;

/// Runs the provided console [`args::Command`] against the `service`.
///
/// Returns the JSON to be printed, which is [`Value::Null`] when there is
/// nothing to show.
///
/// # Errors
///
/// If the operation fails, or a KYC document cannot be read.
#[expect(clippy::too_many_lines, reason = "flat dispatch is more readable")]
pub async fn run<A, S>(
    service: &service::Service<A, S>,
    cmd: args::Command,
) -> Result<Value, Traced<Error>>
where
    A: Backend,
    S: SessionStorage,
{
    use crate::args::Command as C;

    let out = match cmd {
        C::Login { email, password } => service
            .execute(command::Login {
                email,
                password: secret(password),
            })
            .await
            .map(|out| out.response),
        C::Register {
            first_name,
            last_name,
            email,
            phone_number,
            password,
        } => service
            .execute(command::RegisterIndividual {
                first_name,
                last_name,
                email,
                phone_number,
                password: secret(password),
            })
            .await
            .map(|out| out.response),
        C::RegisterBusiness {
            business_name,
            first_name,
            last_name,
            email,
            phone_number,
            password,
        } => service
            .execute(command::RegisterBusiness {
                business_name,
                first_name,
                last_name,
                email,
                phone_number,
                password: secret(password),
            })
            .await
            .map(|out| out.response),
        C::RequestPasswordReset { email } => {
            service.execute(command::RequestPasswordReset { email }).await
        }
        C::ResetPassword {
            email,
            otp,
            new_password,
        } => {
            service
                .execute(command::ResetPassword {
                    email,
                    otp: secret(otp),
                    new_password: secret(new_password),
                })
                .await
        }
        C::ChangePassword {
            current_password,
            new_password,
        } => {
            service
                .execute(command::ChangePassword {
                    current_password: secret(current_password),
                    new_password: secret(new_password),
                })
                .await
        }
        C::VerificationLevel => service.execute(query::VerificationLevel).await,
        C::VerifyEmail { otp } => {
            service.execute(command::VerifyEmail { otp: secret(otp) }).await
        }
        C::PersonalInfo => service.execute(query::PersonalInfo).await,
        C::UpdatePersonalInfo {
            first_name,
            last_name,
            phone_number,
            date_of_birth,
            address,
        } => {
            service
                .execute(command::UpdatePersonalInfo {
                    first_name,
                    last_name,
                    phone_number,
                    date_of_birth,
                    address,
                })
                .await
        }
        C::Preferences => service.execute(query::Preferences).await,
        C::UpdatePreferences {
            language,
            currency,
            email_notifications,
            sms_notifications,
            push_notifications,
        } => {
            service
                .execute(command::UpdatePreferences {
                    language,
                    currency,
                    email_notifications,
                    sms_notifications,
                    push_notifications,
                })
                .await
        }
        C::SetPin { pin } => {
            service.execute(command::SetPin { pin: secret(pin) }).await
        }
        C::VerifyPin { pin } => {
            service.execute(command::VerifyPin { pin: secret(pin) }).await
        }
        C::EnableTwoFactor => service.execute(command::EnableTwoFactor).await,
        C::DisableTwoFactor => service.execute(command::DisableTwoFactor).await,
        C::VerifyTwoFactor { code } => service
            .execute(command::VerifyTwoFactor {
                code: secret(code),
            })
            .await
            .map(|out| out.response),
        C::RequestPhoneOtp { kind } => {
            service.execute(command::RequestPhoneOtp { kind }).await
        }
        C::VerifyPhone { otp } => {
            service.execute(command::VerifyPhone { otp: secret(otp) }).await
        }
        C::KycDocuments => service.execute(query::KycDocuments).await,
        C::UploadKycDocuments { documents } => {
            let mut docs = Vec::with_capacity(documents.len());
            for (kind, path) in documents {
                docs.push(
                    read_document(kind, path)
                        .await
                        .map_err(tracerr::wrap!())?,
                );
            }
            service.execute(command::UploadKycDocuments(docs)).await
        }
        C::BusinessInfo { id } => {
            service.execute(query::BusinessInfo(id)).await
        }
        C::UpdateBusinessInfo {
            id,
            business_name,
            registration_number,
            business_type,
            address,
            website,
        } => {
            service
                .execute(command::UpdateBusinessInfo {
                    id,
                    info: business::Info {
                        business_name,
                        registration_number,
                        business_type,
                        address,
                        website,
                    },
                })
                .await
        }
        C::Status => status(service).await,
        C::Logout => {
            service.execute(command::Logout).await.map(|()| Value::Null)
        }
    };

    out.map_err(tracerr::map_from_and_wrap!(=> Error))
}

/// Describes the locally stored session, dropping it if it's no longer
/// valid.
async fn status<A, S>(
    service: &service::Service<A, S>,
) -> Result<Value, Traced<ExecutionError>>
where
    S: SessionStorage,
{
    let authenticated = service
        .execute(command::CheckSession)
        .await
        .map_err(tracerr::wrap!())?;
    let session = service
        .execute(query::session::Current)
        .await
        .map_err(tracerr::wrap!())?;

    Ok(json!({
        "authenticated": authenticated,
        "expiresAt": session
            .as_ref()
            .and_then(|s| s.expires_at.as_ref())
            .map(ExpirationDateTime::to_rfc3339),
        "user": session.as_ref().and_then(|s| s.user.clone()),
        "verificationLevel": session.and_then(|s| s.verification_level),
    }))
}

/// Reads a [`kyc::Document`] of the provided [`kyc::DocumentKind`] from the
/// disk.
async fn read_document(
    kind: kyc::DocumentKind,
    path: PathBuf,
) -> Result<kyc::Document, Traced<Error>> {
    let content = tokio::fs::read(&path).await.map_err(|source| {
        tracerr::new!(Error::Document {
            path: path.clone(),
            source,
        })
    })?;

    Ok(kyc::Document {
        kind,
        file_name: path.file_name().map_or_else(
            || kind.to_string(),
            |name| name.to_string_lossy().into_owned(),
        ),
        content_type: path
            .extension()
            .and_then(OsStr::to_str)
            .and_then(content_type)
            .map(ToOwned::to_owned),
        content,
    })
}

/// Guesses a MIME type of a document by its file `extension`.
fn content_type(extension: &str) -> Option<&'static str> {
    Some(match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => return None,
    })
}

/// Wraps the provided `value` into a [`SecretBox`].
fn secret<T: Zeroize>(value: T) -> SecretBox<T> {
    SecretBox::new(Box::new(value))
}
