//! [`User`]-related definitions.
//!
//! The user record itself is opaque to this client and is kept as JSON.

pub mod session;

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::Serialize;

pub use self::session::Session;

/// Opaque user record returned by the backend.
pub type User = serde_json::Value;

/// Defines a validated string newtype.
macro_rules! define_string {
    (
        $(#[$attr:meta])*
        $name:ident, $what:literal, |$v:ident| $check:expr
    ) => {
        $(#[$attr])*
        #[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
        #[as_ref(str, String)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`] if \
                             the given value is valid.")]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            #[doc = concat!("Checks whether the given value is a valid [`",
                            stringify!($name), "`].")]
            fn check($v: &str) -> bool {
                $check
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", $what, "`"))
            }
        }
    };
}

/// Defines a validated secret string newtype.
macro_rules! define_secret {
    (
        $(#[$attr:meta])*
        $name:ident, $what:literal, |$v:ident| $check:expr
    ) => {
        $(#[$attr])*
        #[derive(Clone, Eq, PartialEq)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`] if \
                             the given value is valid.")]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            #[doc = concat!("Checks whether the given value is a valid [`",
                            stringify!($name), "`].")]
            fn check($v: &str) -> bool {
                $check
            }

            #[doc = concat!("Returns the raw value of this [`",
                            stringify!($name), "`].")]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(concat!(stringify!($name), "(***)"))
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", $what, "`"))
            }
        }

        impl CloneableSecret for $name {}
        impl Zeroize for $name {
            fn zeroize(&mut self) {
                self.0.zeroize();
            }
        }
    };
}

define_string! {
    /// Name of a person or a business.
    Name, "Name", |name| {
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

define_string! {
    /// Email address of a user.
    Email, "Email", |address| {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        REGEX.is_match(address)
    }
}

define_string! {
    /// Phone number of a user, optionally in an international format.
    PhoneNumber, "PhoneNumber", |number| {
        /// Regular expression checking [`PhoneNumber`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d[\d\s-]{6,18}\d$")
                .expect("valid regex")
        });

        REGEX.is_match(number)
    }
}

define_string! {
    /// Delivery type of a phone verification code (`sms`, `whatsapp`, etc).
    OtpType, "OtpType", |kind| {
        !kind.is_empty()
            && kind.len() <= 32
            && kind
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

define_secret! {
    /// Password of a user.
    Password, "Password", |password| {
        password.len() > 1 && password.len() <= 128
    }
}

define_secret! {
    /// Transaction PIN of a user.
    Pin, "Pin", |pin| {
        (4..=6).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit())
    }
}

define_secret! {
    /// One-time verification code.
    Otp, "Otp", |code| {
        (4..=12).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

#[cfg(test)]
mod spec {
    use super::{Email, Name, Otp, OtpType, Password, PhoneNumber, Pin};

    #[test]
    fn validates_contacts() {
        assert!(Email::new("jane.doe@example.com").is_some());
        assert!(Email::new("jane.doe@").is_none());

        assert!(PhoneNumber::new("+2348012345678").is_some());
        assert!(PhoneNumber::new("555-123-4567").is_some());
        assert!(PhoneNumber::new("call me").is_none());

        assert!(Name::new("Jane").is_some());
        assert!(Name::new(" Jane").is_none());
        assert!(Name::new("").is_none());
    }

    #[test]
    fn validates_secrets() {
        assert!(Pin::new("1234").is_some());
        assert!(Pin::new("12a4").is_none());
        assert!(Pin::new("123").is_none());

        assert!(Otp::new("A1B2C3").is_some());
        assert!(Otp::new("12 34").is_none());

        assert!(Password::new("x").is_none());
        assert!(Password::new("correct horse").is_some());
    }

    #[test]
    fn secrets_are_not_printed() {
        let pin = Pin::new("4321").unwrap();

        assert_eq!(format!("{pin:?}"), "Pin(***)");
    }

    #[test]
    fn otp_type_is_a_path_segment() {
        assert!(OtpType::new("sms").is_some());
        assert!(OtpType::new("sms/../admin").is_none());
    }
}
