//! [`Command`] for creating a new [`Student`].

use common::{
    operations::{Authorize, Insert},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{session, student, Student},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Student`].
#[derive(Clone, Debug)]
pub struct CreateStudent {
    /// [`session::Token`] authorizing the operation.
    pub token: session::Token,

    /// [`student::Fields`] of the new [`Student`].
    pub fields: student::Fields,
}

impl<Db> Command<CreateStudent> for Service<Db>
where
    Db: Database<
        Authorize<session::Token>,
        Ok: Database<
            Insert<student::Draft>,
            Ok = student::Id,
            Err = Traced<database::Error>,
        >,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Student;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateStudent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateStudent { token, fields } = cmd;

        let now = DateTime::now();
        let draft = student::Draft {
            fields,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let id = self
            .database()
            .execute(Authorize(token))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .execute(Insert(draft.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(%id, "`Student` created");

        Ok(Student::new(id, draft))
    }
}

/// Error of [`CreateStudent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
