//! [`Query`] definition.

pub mod business;
pub mod kyc;
pub mod profile;
pub mod session;

#[cfg(doc)]
use crate::Service;

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

pub use self::{
    business::BusinessInfo,
    kyc::KycDocuments,
    profile::{PersonalInfo, Preferences, VerificationLevel},
};
pub use crate::command::ExecutionError;
