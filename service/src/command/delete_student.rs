//! [`Command`] for deleting a [`Student`].

use common::operations::{Authorize, By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{session, student, Student},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Student`].
///
/// Deleting a missing [`Student`] succeeds.
#[derive(Clone, Debug)]
pub struct DeleteStudent {
    /// [`session::Token`] authorizing the operation.
    pub token: session::Token,

    /// ID of the [`Student`] to delete.
    pub id: student::Id,
}

impl<Db> Command<DeleteStudent> for Service<Db>
where
    Db: Database<
        Authorize<session::Token>,
        Ok: Database<
            Delete<By<Student, student::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteStudent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteStudent { token, id } = cmd;

        self.database()
            .execute(Authorize(token))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .execute(Delete(By::new(id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(%id, "`Student` deleted");

        Ok(())
    }
}

/// Error of [`DeleteStudent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
