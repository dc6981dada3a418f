//! [`Database`]-related implementations.

#[cfg(feature = "firebase")]
pub mod firebase;
pub mod memory;

use derive_more::{Display, Error as StdError, From};

use crate::domain::session;

#[cfg(feature = "firebase")]
pub use self::firebase::Firebase;
pub use self::memory::Memory;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "firebase")]
    /// [`Firebase`] error.
    Firebase(firebase::Error),

    /// [`Memory`] error.
    Memory(memory::Error),
}

impl Error {
    /// Checks whether the store refused the operation because of missing or
    /// rejected credentials.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            #[cfg(feature = "firebase")]
            Self::Firebase(e) => matches!(e, firebase::Error::PermissionDenied),
            Self::Memory(e) => matches!(e, memory::Error::PermissionDenied),
        }
    }
}

/// Credentials of a [`Database`] client carrying none.
#[derive(Clone, Copy, Debug, Default)]
pub struct Anonymous;

/// Credentials of a [`Database`] client acting on behalf of a [`Session`].
///
/// [`Session`]: crate::domain::Session
#[derive(Clone, Debug)]
pub struct Authorized(pub session::Token);

/// Credentials a [`Database`] client attaches to its requests.
pub trait Credentials {
    /// Returns the [`session::Token`] to present, if any.
    fn token(&self) -> Option<&session::Token>;
}

impl Credentials for Anonymous {
    fn token(&self) -> Option<&session::Token> {
        None
    }
}

impl Credentials for Authorized {
    fn token(&self) -> Option<&session::Token> {
        Some(&self.0)
    }
}
