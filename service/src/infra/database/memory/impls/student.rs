//! [`Student`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{student, Student},
    infra::{
        database::{self, Authorized},
        Database, Memory,
    },
};

impl Database<Select<By<Vec<Student>, ()>>> for Memory<Authorized> {
    type Ok = Vec<Student>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Student>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .enter()
            .await
            .map_err(tracerr::wrap!())?
            .students
            .values()
            .cloned()
            .collect())
    }
}

impl Database<Insert<student::Draft>> for Memory<Authorized> {
    type Ok = student::Id;
    type Err = Traced<database::Error>;

    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    async fn execute(
        &self,
        Insert(draft): Insert<student::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.enter().await.map_err(tracerr::wrap!())?;

        state.last_id += 1;
        // Zero-padded sequence keeps key order chronological.
        let id = student::Id::new(format!("-{:019}", state.last_id))
            .expect("infallible");

        drop(
            state
                .students
                .insert(id.clone(), Student::new(id.clone(), draft)),
        );
        Ok(id)
    }
}

impl Database<Update<student::Patch>> for Memory<Authorized> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(patch): Update<student::Patch>,
    ) -> Result<Self::Ok, Self::Err> {
        let student::Patch {
            id,
            fields,
            updated_at,
        } = patch;

        let mut state = self.enter().await.map_err(tracerr::wrap!())?;
        let student = state.students.entry(id.clone()).or_default();

        student.id = id;
        student.first_name = fields.first_name.into();
        student.last_name = fields.last_name.into();
        student.class = fields.class.into();
        student.forfait_days = fields.forfait_days;
        student.rental_days = fields.rental_days;
        student.keycards = fields.keycards;
        student.updated_at = updated_at;

        Ok(())
    }
}

impl Database<Delete<By<Student, student::Id>>> for Memory<Authorized> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Student, student::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.enter().await.map_err(tracerr::wrap!())?;
        drop(state.students.remove(&id));
        Ok(())
    }
}
