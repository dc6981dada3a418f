//! [`Command`] for dropping a [`Session`].

use std::convert::Infallible;

use common::operations::{By, Delete};
use derive_more::From;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{challenge, session, Challenge, Session},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for dropping a [`Session`], removing its remote mirror.
///
/// Removal is best-effort: failures are logged and never returned, as the
/// local [`Session`] state is authoritative.
#[derive(Clone, Debug, From)]
pub struct DropSession {
    /// [`Session`] to drop.
    pub session: Session,
}

impl<Db> Command<DropSession> for Service<Db>
where
    Db: Database<
            Delete<By<session::Record, session::Token>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Challenge, challenge::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<challenge::Response, session::Token>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, cmd: DropSession) -> Result<Self::Ok, Self::Err> {
        let Session {
            token,
            challenge_id,
            ..
        } = cmd.session;

        if let Some(id) = challenge_id {
            if let Err(e) = self
                .database()
                .execute(Delete(By::<challenge::Response, _>::new(token)))
                .await
            {
                log::warn!("Failed to remove `challenge::Response`: {e}");
            }
            if let Err(e) = self
                .database()
                .execute(Delete(By::<Challenge, _>::new(id)))
                .await
            {
                log::warn!("Failed to remove `Challenge`: {e}");
            }
        } else if let Err(e) = self
            .database()
            .execute(Delete(By::<session::Record, _>::new(token)))
            .await
        {
            log::warn!("Failed to remove `session::Record`: {e}");
        }

        log::info!("`Session` dropped");

        Ok(())
    }
}
