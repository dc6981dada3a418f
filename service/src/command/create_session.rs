//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretString};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{access, challenge, session, Challenge, Session},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by the shared access code.
///
/// The code format is checked before any [`Database`] operation is issued.
#[derive(Debug)]
pub struct CreateSession {
    /// Candidate access code, as entered.
    pub code: SecretString,
}

impl<Db> Command<CreateSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<access::Fingerprint>, ()>>,
            Ok = Option<access::Fingerprint>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<session::Record>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Insert<Challenge>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Insert<challenge::Response>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateSession) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let code = access::Code::new(cmd.code.expose_secret())
            .ok_or_else(|| E::MalformedCode)
            .map_err(tracerr::wrap!())?;

        let fingerprint = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NoFingerprint)
            .map_err(tracerr::wrap!())?;
        if access::Fingerprint::of(&code) != fingerprint {
            return Err(tracerr::new!(E::WrongCode));
        }

        let now = DateTime::now();
        let scheme = self.config().scheme;
        let session = match scheme {
            session::Scheme::Token => {
                let created_at = now.coerce();
                let session = Session {
                    token: session::Token::derive(&fingerprint, created_at),
                    created_at,
                    challenge_id: None,
                };
                self.database()
                    .execute(Insert(session::Record::of(&session)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                session
            }
            session::Scheme::ChallengeResponse => {
                let challenge = Challenge::generate(now.coerce());
                let response = challenge::Response::derive(&code, &challenge);
                let session = Session {
                    token: response.token.clone(),
                    created_at: now.coerce(),
                    challenge_id: Some(challenge.id),
                };
                self.database()
                    .execute(Insert(challenge))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                self.database()
                    .execute(Insert(response))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                session
            }
        };

        log::info!(%scheme, "`Session` issued");

        Ok(session)
    }
}

/// Error of [`CreateSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Access code is not exactly four decimal digits.
    #[display("Access code must be exactly four digits")]
    #[from(ignore)]
    MalformedCode,

    /// No [`access::Fingerprint`] is stored to compare against.
    #[display("Access fingerprint is not configured")]
    #[from(ignore)]
    NoFingerprint,

    /// Access code doesn't match the stored [`access::Fingerprint`].
    #[display("Wrong access code")]
    #[from(ignore)]
    WrongCode,
}
