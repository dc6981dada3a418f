//! [`Command`] definition.

pub mod authorize_session;
pub mod create_session;
pub mod create_student;
pub mod delete_student;
pub mod drop_session;
pub mod update_student;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_session::AuthorizeSession, create_session::CreateSession,
    create_student::CreateStudent, delete_student::DeleteStudent,
    drop_session::DropSession, update_student::UpdateStudent,
};
