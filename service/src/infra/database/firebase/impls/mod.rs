//! [`Database`] implementations for [`Firebase`].
//!
//! [`Database`]: crate::infra::Database
//! [`Firebase`]: super::Firebase

mod session;
mod student;
