//! [`Error`]-related definitions.

use std::{io, path::PathBuf};

use derive_more::{Display, Error as StdError, From};
use service::query::ExecutionError;

/// Error of running a console [`Command`].
///
/// [`Command`]: crate::args::Command
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Service`] failed to execute the operation.
    ///
    /// [`Service`]: crate::Service
    #[display("{_0}")]
    Execution(ExecutionError),

    /// KYC document cannot be read from the disk.
    #[display("Failed to read `{}`: {source}", path.display())]
    #[from(ignore)]
    Document {
        /// Path to the document.
        path: PathBuf,

        /// Underlying I/O error.
        source: io::Error,
    },
}
