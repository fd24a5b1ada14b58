//! Session [`Storage`]-related implementations.

#[cfg(feature = "file")]
pub mod file;
pub mod memory;

use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error as StdError, From};
use strum::{AsRefStr, EnumIter, EnumString};
use tracerr::Traced;

#[cfg(feature = "file")]
pub use self::file::File;
pub use self::memory::Memory;

/// Key-value storage operation.
pub use common::Handler as Storage;

/// [`Storage`] capable of holding session [`Entry`]s.
pub trait SessionStorage:
    Storage<
        Select<By<Option<String>, Key>>,
        Ok = Option<String>,
        Err = Traced<Error>,
    > + Storage<Insert<Entry>, Ok = (), Err = Traced<Error>>
    + Storage<Delete<Key>, Ok = (), Err = Traced<Error>>
{
}

impl<T> SessionStorage for T where
    T: Storage<
            Select<By<Option<String>, Key>>,
            Ok = Option<String>,
            Err = Traced<Error>,
        > + Storage<Insert<Entry>, Ok = (), Err = Traced<Error>>
        + Storage<Delete<Key>, Ok = (), Err = Traced<Error>>
        + ?Sized
{
}

/// Key of a session [`Entry`].
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[strum(serialize_all = "camelCase")]
pub enum Key {
    /// Access token of the session.
    AuthToken,

    /// Expiration of the session as a Unix timestamp in milliseconds.
    TokenExpiry,

    /// JSON-encoded user record.
    UserData,

    /// JSON-encoded verification level.
    VerificationLevel,

    /// `"true"` if the session has been established.
    IsAuthenticated,
}

/// Session [`Storage`] entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// [`Key`] of this [`Entry`].
    pub key: Key,

    /// Value of this [`Entry`].
    pub value: String,
}

impl Entry {
    /// Creates a new [`Entry`].
    #[must_use]
    pub fn new(key: Key, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "file")]
    /// [`File`] error.
    File(file::Error),
}
