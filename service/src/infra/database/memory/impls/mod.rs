//! [`Database`] implementations for [`Memory`].
//!
//! [`Database`]: crate::infra::Database
//! [`Memory`]: super::Memory

mod session;
mod student;
