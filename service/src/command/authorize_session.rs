//! [`Command`] for checking that a [`Session`] is still valid.

use common::{
    operations::{Authorize, By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{session, Session, Student},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for checking that a [`Session`] is still valid.
///
/// An expired [`Session`] is rejected without any [`Database`] operation.
/// Otherwise, a [`session::Scheme::Token`] one needs a granting
/// [`session::Record`], while a [`session::Scheme::ChallengeResponse`] one
/// needs its [`session::Token`] to be accepted for reading the roster.
#[derive(Clone, Debug, From)]
pub struct AuthorizeSession {
    /// [`Session`] to check.
    pub session: Session,
}

impl<Db> Command<AuthorizeSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<session::Record>, session::Token>>,
            Ok = Option<session::Record>,
            Err = Traced<database::Error>,
        > + Database<
            Authorize<session::Token>,
            Ok: Database<
                Select<By<Vec<Student>, ()>>,
                Ok = Vec<Student>,
                Err = Traced<database::Error>,
            >,
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeSession { session } = cmd;

        let now = DateTime::now();
        if session.is_expired(now) {
            return Err(tracerr::new!(E::Expired));
        }

        match session.scheme() {
            session::Scheme::Token => {
                let granted = self
                    .database()
                    .execute(Select(By::new(session.token)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .is_some_and(|record| record.grants(now));
                if !granted {
                    return Err(tracerr::new!(E::Revoked));
                }
            }
            session::Scheme::ChallengeResponse => {
                let roster = self
                    .database()
                    .execute(Authorize(session.token))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .execute(Select(By::<Vec<Student>, _>::new(())))
                    .await;
                match roster {
                    Ok(_) => {}
                    Err(e) if e.as_ref().is_permission_denied() => {
                        return Err(tracerr::new!(E::Revoked));
                    }
                    Err(e) => return Err(tracerr::map_from(e)),
                }
            }
        }

        Ok(())
    }
}

/// Error of [`AuthorizeSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Session`] lifetime is over.
    #[display("`Session` is expired")]
    #[from(ignore)]
    Expired,

    /// [`Session`] is no longer accepted by the store.
    #[display("`Session` is revoked")]
    #[from(ignore)]
    Revoked,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use secrecy::SecretString;

    use crate::{
        command::CreateSession,
        domain::{access::Code, session, Session},
        infra::Memory,
        Command as _, Config, Service,
    };

    use super::{AuthorizeSession, ExecutionError};

    async fn login(scheme: session::Scheme) -> (Service<Memory>, Session) {
        let svc = Service::new(
            Config { scheme },
            Memory::with_code(&Code::new("1234").unwrap()),
        );
        let session = svc
            .execute(CreateSession {
                code: SecretString::from("1234".to_owned()),
            })
            .await
            .unwrap();
        (svc, session)
    }

    #[tokio::test]
    async fn fresh_session_is_valid() {
        for scheme in
            [session::Scheme::Token, session::Scheme::ChallengeResponse]
        {
            let (svc, session) = login(scheme).await;

            svc.execute(AuthorizeSession { session }).await.unwrap();
        }
    }

    #[tokio::test]
    async fn expired_session_is_rejected_without_remote_call() {
        let (svc, mut session) = login(session::Scheme::Token).await;
        session.created_at = (DateTime::now()
            - (Session::LIFETIME + Duration::from_secs(1)))
        .coerce();
        let calls = svc.database().calls().await;

        let err = svc.execute(AuthorizeSession { session }).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Expired));
        assert_eq!(svc.database().calls().await, calls);
    }

    #[tokio::test]
    async fn revoked_session_is_rejected() {
        for scheme in
            [session::Scheme::Token, session::Scheme::ChallengeResponse]
        {
            let (svc, session) = login(scheme).await;
            svc.database().revoke(&session.token).await;

            let err =
                svc.execute(AuthorizeSession { session }).await.unwrap_err();

            assert!(matches!(err.as_ref(), ExecutionError::Revoked));
        }
    }

    #[tokio::test]
    async fn unreachable_store_is_not_revocation() {
        let (svc, session) = login(session::Scheme::Token).await;
        svc.database().set_offline(true).await;

        let err = svc.execute(AuthorizeSession { session }).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
    }
}
