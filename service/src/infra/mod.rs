//! Infrastructure layer.

pub mod database;

pub use self::database::{Database, Memory};
#[cfg(feature = "firebase")]
pub use self::database::{firebase, Firebase};
