//! Domain definitions.

pub mod business;
pub mod kyc;
pub mod user;

pub use self::user::{Session, User};
