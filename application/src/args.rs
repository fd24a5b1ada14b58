//! [`Args`] definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use service::domain::{business, kyc, user};

/// Console of the fintech authentication backend.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Operation performed by the console.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Logs in by credentials and stores the session.
    Login {
        /// Email of the user.
        #[arg(long)]
        email: user::Email,

        /// Password of the user.
        #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
        password: user::Password,
    },

    /// Registers a new individual user and stores the session.
    Register {
        /// First name of the user.
        #[arg(long)]
        first_name: user::Name,

        /// Last name of the user.
        #[arg(long)]
        last_name: user::Name,

        /// Email of the user.
        #[arg(long)]
        email: user::Email,

        /// Phone number of the user.
        #[arg(long)]
        phone_number: user::PhoneNumber,

        /// Password of the user.
        #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
        password: user::Password,
    },

    /// Registers a new business user and stores the session.
    RegisterBusiness {
        /// Registered name of the business.
        #[arg(long)]
        business_name: user::Name,

        /// First name of the business representative.
        #[arg(long)]
        first_name: user::Name,

        /// Last name of the business representative.
        #[arg(long)]
        last_name: user::Name,

        /// Email of the business.
        #[arg(long)]
        email: user::Email,

        /// Phone number of the business.
        #[arg(long)]
        phone_number: user::PhoneNumber,

        /// Password of the user.
        #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
        password: user::Password,
    },

    /// Requests a one-time code to reset a forgotten password.
    RequestPasswordReset {
        /// Email the code is sent to.
        #[arg(long)]
        email: user::Email,
    },

    /// Resets a forgotten password with a one-time code.
    ResetPassword {
        /// Email of the user.
        #[arg(long)]
        email: user::Email,

        /// One-time code received by email.
        #[arg(long)]
        otp: user::Otp,

        /// New password.
        #[arg(long, env = "AUTH_NEW_PASSWORD", hide_env_values = true)]
        new_password: user::Password,
    },

    /// Changes the password of the current user.
    ChangePassword {
        /// Current password.
        #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
        current_password: user::Password,

        /// New password.
        #[arg(long, env = "AUTH_NEW_PASSWORD", hide_env_values = true)]
        new_password: user::Password,
    },

    /// Shows the verification level reported by the backend.
    VerificationLevel,

    /// Verifies the email of the current user.
    VerifyEmail {
        /// One-time code received by email.
        #[arg(long)]
        otp: user::Otp,
    },

    /// Shows personal information of the current user.
    PersonalInfo,

    /// Updates personal information of the current user.
    UpdatePersonalInfo {
        /// New first name.
        #[arg(long)]
        first_name: Option<user::Name>,

        /// New last name.
        #[arg(long)]
        last_name: Option<user::Name>,

        /// New phone number.
        #[arg(long)]
        phone_number: Option<user::PhoneNumber>,

        /// New date of birth (`YYYY-MM-DD`).
        #[arg(long)]
        date_of_birth: Option<String>,

        /// New residential address.
        #[arg(long)]
        address: Option<String>,
    },

    /// Shows preferences of the current user.
    Preferences,

    /// Updates preferences of the current user.
    UpdatePreferences {
        /// Interface language.
        #[arg(long)]
        language: Option<String>,

        /// Display currency.
        #[arg(long)]
        currency: Option<String>,

        /// Whether to deliver notifications by email.
        #[arg(long)]
        email_notifications: Option<bool>,

        /// Whether to deliver notifications by SMS.
        #[arg(long)]
        sms_notifications: Option<bool>,

        /// Whether to deliver push notifications.
        #[arg(long)]
        push_notifications: Option<bool>,
    },

    /// Sets the transaction PIN of the current user.
    SetPin {
        /// New PIN.
        #[arg(long, env = "AUTH_PIN", hide_env_values = true)]
        pin: user::Pin,
    },

    /// Verifies the transaction PIN of the current user.
    VerifyPin {
        /// PIN to verify.
        #[arg(long, env = "AUTH_PIN", hide_env_values = true)]
        pin: user::Pin,
    },

    /// Enables two-factor authentication.
    #[command(name = "enable-2fa")]
    EnableTwoFactor,

    /// Disables two-factor authentication.
    #[command(name = "disable-2fa")]
    DisableTwoFactor,

    /// Completes a login with a two-factor verification code.
    #[command(name = "verify-2fa")]
    VerifyTwoFactor {
        /// Verification code.
        #[arg(long)]
        code: user::Otp,
    },

    /// Requests a one-time code verifying the phone number.
    RequestPhoneOtp {
        /// Delivery channel of the code (`sms`, `whatsapp`, etc).
        #[arg(default_value = "sms")]
        kind: user::OtpType,
    },

    /// Verifies the phone number with a one-time code.
    VerifyPhone {
        /// One-time code received on the phone.
        #[arg(long)]
        otp: user::Otp,
    },

    /// Lists uploaded KYC documents.
    KycDocuments,

    /// Uploads KYC documents.
    UploadKycDocuments {
        /// Document to upload, as `KIND=PATH`.
        ///
        /// `KIND` is one of `id_front`, `id_back`, `selfie`,
        /// `proof_of_address` or `business_registration`.
        #[arg(
            long = "document",
            required = true,
            value_parser = parse_document
        )]
        documents: Vec<(kyc::DocumentKind, PathBuf)>,
    },

    /// Shows information about a business.
    BusinessInfo {
        /// ID of the business.
        id: business::Id,
    },

    /// Updates information about a business.
    UpdateBusinessInfo {
        /// ID of the business.
        id: business::Id,

        /// Registered name of the business.
        #[arg(long)]
        business_name: Option<String>,

        /// Official registration number of the business.
        #[arg(long)]
        registration_number: Option<String>,

        /// Legal type of the business.
        #[arg(long)]
        business_type: Option<String>,

        /// Postal address of the business.
        #[arg(long)]
        address: Option<String>,

        /// Website of the business.
        #[arg(long)]
        website: Option<String>,
    },

    /// Shows the stored session and whether it's still valid.
    Status,

    /// Removes the stored session.
    Logout,
}

/// Parses a `KIND=PATH` pair of a KYC document.
fn parse_document(
    raw: &str,
) -> Result<(kyc::DocumentKind, PathBuf), String> {
    let (kind, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `KIND=PATH`, got `{raw}`"))?;
    let kind = kind
        .trim()
        .parse()
        .map_err(|e| format!("unknown document kind `{kind}`: {e}"))?;
    if path.is_empty() {
        return Err("empty document path".to_owned());
    }
    Ok((kind, PathBuf::from(path)))
}
