//! Infrastructure layer.

pub mod api;
pub mod storage;

#[cfg(feature = "http")]
pub use self::api::Http;
#[cfg(feature = "file")]
pub use self::storage::File;
pub use self::{
    api::{Api, Backend},
    storage::{Memory, SessionStorage, Storage},
};
