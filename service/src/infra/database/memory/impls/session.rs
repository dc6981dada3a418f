//! [`Session`]-related [`Database`] implementations.
//!
//! [`Session`]: crate::domain::Session

use common::operations::{Authorize, By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{access, challenge, session, Challenge},
    infra::{
        database::{self, Authorized},
        Database, Memory,
    },
};

impl Database<Select<By<Option<access::Fingerprint>, ()>>> for Memory {
    type Ok = Option<access::Fingerprint>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<access::Fingerprint>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .enter()
            .await
            .map_err(tracerr::wrap!())?
            .fingerprint
            .clone())
    }
}

impl Database<Insert<session::Record>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<session::Record>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.enter().await.map_err(tracerr::wrap!())?;
        drop(state.sessions.insert(record.token.clone(), record));
        Ok(())
    }
}

impl Database<Select<By<Option<session::Record>, session::Token>>> for Memory {
    type Ok = Option<session::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<session::Record>, session::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        let token = by.into_inner();
        Ok(self
            .enter()
            .await
            .map_err(tracerr::wrap!())?
            .sessions
            .get(&token)
            .cloned())
    }
}

impl Database<Delete<By<session::Record, session::Token>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<session::Record, session::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        let token = by.into_inner();
        let mut state = self.enter().await.map_err(tracerr::wrap!())?;
        drop(state.sessions.remove(&token));
        Ok(())
    }
}

impl Database<Insert<Challenge>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(challenge): Insert<Challenge>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.enter().await.map_err(tracerr::wrap!())?;
        drop(state.challenges.insert(challenge.id, challenge));
        Ok(())
    }
}

impl Database<Delete<By<Challenge, challenge::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Challenge, challenge::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let mut state = self.enter().await.map_err(tracerr::wrap!())?;
        drop(state.challenges.remove(&id));
        Ok(())
    }
}

impl Database<Insert<challenge::Response>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(response): Insert<challenge::Response>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.enter().await.map_err(tracerr::wrap!())?;
        drop(state.responses.insert(response.token.clone(), response));
        Ok(())
    }
}

impl Database<Delete<By<challenge::Response, session::Token>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<challenge::Response, session::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        let token = by.into_inner();
        let mut state = self.enter().await.map_err(tracerr::wrap!())?;
        drop(state.responses.remove(&token));
        Ok(())
    }
}

impl Database<Authorize<session::Token>> for Memory {
    type Ok = Memory<Authorized>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Authorize(token): Authorize<session::Token>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(Memory {
            state: self.state.clone(),
            credentials: Authorized(token),
        })
    }
}
