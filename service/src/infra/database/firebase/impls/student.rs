//! [`Student`]-related [`Database`] implementations.

use std::collections::BTreeMap;

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{student, Student},
    infra::{
        database::{self, firebase, Authorized},
        Database, Firebase,
    },
};

impl Database<Select<By<Vec<Student>, ()>>> for Firebase<Authorized> {
    type Ok = Vec<Student>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Student>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let students = self
            .get::<BTreeMap<String, Student>>(&["students"])
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))?
            .unwrap_or_default();

        Ok(students
            .into_iter()
            .filter_map(|(key, student)| {
                let Some(id) = student::Id::new(&*key) else {
                    log::warn!(%key, "skipping `Student` with invalid key");
                    return None;
                };
                Some(Student { id, ..student })
            })
            .collect())
    }
}

impl Database<Insert<student::Draft>> for Firebase<Authorized> {
    type Ok = student::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<student::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = self
            .post(&["students"], &draft)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))?;

        student::Id::new(&*key)
            .ok_or_else(|| {
                tracerr::new!(firebase::Error::Malformed(format!(
                    "pushed key `{key}` is not a valid `student::Id`",
                )))
            })
            .map_err(tracerr::map_from)
    }
}

impl Database<Update<student::Patch>> for Firebase<Authorized> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(patch): Update<student::Patch>,
    ) -> Result<Self::Ok, Self::Err> {
        self.patch(&["students", patch.id.as_ref()], &patch)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))
    }
}

impl Database<Delete<By<Student, student::Id>>> for Firebase<Authorized> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Student, student::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.delete(&["students", id.as_ref()])
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))
    }
}
