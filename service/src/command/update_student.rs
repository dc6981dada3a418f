//! [`Command`] for updating an existing [`Student`].

use common::{
    operations::{Authorize, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Student;
use crate::{
    domain::{session, student},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for replacing the [`student::Fields`] of an existing
/// [`Student`].
#[derive(Clone, Debug)]
pub struct UpdateStudent {
    /// [`session::Token`] authorizing the operation.
    pub token: session::Token,

    /// ID of the [`Student`] to update.
    pub id: student::Id,

    /// New [`student::Fields`] of the [`Student`].
    pub fields: student::Fields,
}

impl<Db> Command<UpdateStudent> for Service<Db>
where
    Db: Database<
        Authorize<session::Token>,
        Ok: Database<
            Update<student::Patch>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateStudent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateStudent { token, id, fields } = cmd;

        self.database()
            .execute(Authorize(token))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .execute(Update(student::Patch {
                id: id.clone(),
                fields,
                updated_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(%id, "`Student` updated");

        Ok(())
    }
}

/// Error of [`UpdateStudent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretString;

    use crate::{
        command::{CreateSession, CreateStudent},
        domain::{access::Code, student},
        infra::Memory,
        query, Command as _, Config, Service,
    };

    use super::UpdateStudent;

    fn fields(last_name: &str, forfait_days: u32) -> student::Fields {
        student::Fields {
            first_name: student::Name::new("Léa").unwrap(),
            last_name: student::Name::new(last_name).unwrap(),
            class: student::Class::new("TG1").unwrap(),
            forfait_days,
            rental_days: 0,
            keycards: 1,
        }
    }

    #[tokio::test]
    async fn replaces_fields_and_keeps_creation_time() {
        let svc = Service::new(
            Config::default(),
            Memory::with_code(&Code::new("1234").unwrap()),
        );
        let token = svc
            .execute(CreateSession {
                code: SecretString::from("1234".to_owned()),
            })
            .await
            .unwrap()
            .token;
        let created = svc
            .execute(CreateStudent {
                token: token.clone(),
                fields: fields("Martin", 1),
            })
            .await
            .unwrap();

        svc.execute(UpdateStudent {
            token: token.clone(),
            id: created.id.clone(),
            fields: fields("Durand", 3),
        })
        .await
        .unwrap();

        let students = svc
            .execute(query::students::List::by(token, ()))
            .await
            .unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, created.id);
        assert_eq!(students[0].last_name, "Durand");
        assert_eq!(students[0].forfait_days, 3);
        assert_eq!(students[0].created_at, created.created_at);
        assert!(students[0].updated_at >= created.updated_at);
    }
}
