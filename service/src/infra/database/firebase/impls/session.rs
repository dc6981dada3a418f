//! [`Session`]-related [`Database`] implementations.
//!
//! [`Session`]: crate::domain::Session

use common::operations::{Authorize, By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{access, challenge, session, Challenge},
    infra::{
        database::{self, Authorized},
        Database, Firebase,
    },
};

impl Database<Select<By<Option<access::Fingerprint>, ()>>> for Firebase {
    type Ok = Option<access::Fingerprint>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<access::Fingerprint>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .get::<String>(&["access_control", "hash"])
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))?
            .map(access::Fingerprint::from_hex))
    }
}

impl Database<Insert<session::Record>> for Firebase {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<session::Record>,
    ) -> Result<Self::Ok, Self::Err> {
        self.put(&["sessions", record.token.as_ref()], &record)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))
    }
}

impl Database<Select<By<Option<session::Record>, session::Token>>>
    for Firebase
{
    type Ok = Option<session::Record>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<session::Record>, session::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        let token = by.into_inner();
        Ok(self
            .get::<session::Record>(&["sessions", token.as_ref()])
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))?
            .map(|record| session::Record { token, ..record }))
    }
}

impl Database<Delete<By<session::Record, session::Token>>> for Firebase {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<session::Record, session::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        let token = by.into_inner();
        self.delete(&["sessions", token.as_ref()])
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))
    }
}

impl Database<Insert<Challenge>> for Firebase {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(challenge): Insert<Challenge>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = challenge.id.to_string();
        self.put(&["challenges", id.as_str()], &challenge)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))
    }
}

impl Database<Delete<By<Challenge, challenge::Id>>> for Firebase {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Challenge, challenge::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner().to_string();
        self.delete(&["challenges", id.as_str()])
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))
    }
}

impl Database<Insert<challenge::Response>> for Firebase {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(response): Insert<challenge::Response>,
    ) -> Result<Self::Ok, Self::Err> {
        self.put(&["valid_responses", response.token.as_ref()], &response)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))
    }
}

impl Database<Delete<By<challenge::Response, session::Token>>> for Firebase {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<challenge::Response, session::Token>>,
    ) -> Result<Self::Ok, Self::Err> {
        let token = by.into_inner();
        self.delete(&["valid_responses", token.as_ref()])
            .await
            .map_err(tracerr::map_from_and_wrap!(=> database::Error))
    }
}

impl Database<Authorize<session::Token>> for Firebase {
    type Ok = Firebase<Authorized>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Authorize(token): Authorize<session::Token>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(Firebase {
            client: self.client.clone(),
            base: self.base.clone(),
            credentials: Authorized(token),
        })
    }
}
