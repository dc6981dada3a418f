//! [`SessionProvider`] definitions.

use std::{convert::Infallible, future::Future};

use secrecy::SecretString;
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{
        authorize_session, create_session, AuthorizeSession, CreateSession,
        DropSession,
    },
    domain::Session,
    Command,
};

/// Error of [`SessionProvider::authenticate()`].
pub type AuthError = create_session::ExecutionError;

/// Provider of operator [`Session`]s.
///
/// Hides the [`session::Scheme`] sessions are issued by, so callers only deal
/// with the [`Session`] itself.
///
/// [`session::Scheme`]: crate::domain::session::Scheme
pub trait SessionProvider {
    /// Authenticates the provided access code, issuing a new [`Session`].
    fn authenticate(
        &self,
        code: SecretString,
    ) -> impl Future<Output = Result<Session, Traced<AuthError>>>;

    /// Checks whether the provided [`Session`] is still valid.
    ///
    /// A [`Session`] whose [`Validity`] cannot be established reads as
    /// invalid.
    fn validate(&self, session: &Session) -> impl Future<Output = bool>;

    /// Establishes the [`Validity`] of the provided [`Session`].
    fn check(&self, session: &Session) -> impl Future<Output = Validity>;

    /// Invalidates the provided [`Session`], removing its remote mirror on a
    /// best-effort basis.
    fn invalidate(&self, session: &Session) -> impl Future<Output = ()>;
}

impl<S> SessionProvider for S
where
    S: Command<CreateSession, Ok = Session, Err = Traced<AuthError>>
        + Command<
            AuthorizeSession,
            Ok = (),
            Err = Traced<authorize_session::ExecutionError>,
        > + Command<DropSession, Ok = (), Err = Infallible>,
{
    async fn authenticate(
        &self,
        code: SecretString,
    ) -> Result<Session, Traced<AuthError>> {
        self.execute(CreateSession { code }).await
    }

    async fn validate(&self, session: &Session) -> bool {
        self.check(session).await == Validity::Valid
    }

    async fn check(&self, session: &Session) -> Validity {
        use authorize_session::ExecutionError as E;

        let Err(e) =
            self.execute(AuthorizeSession::from(session.clone())).await
        else {
            return Validity::Valid;
        };
        match e.as_ref() {
            E::Expired | E::Revoked => {
                log::info!("`Session` is no longer valid: {e}");
                Validity::Invalid
            }
            E::Db(db) if db.is_permission_denied() => {
                log::info!("`Session` is no longer valid: {e}");
                Validity::Invalid
            }
            E::Db(_) => {
                log::warn!("Cannot check `Session` validity: {e}");
                Validity::Unknown
            }
        }
    }

    async fn invalidate(&self, session: &Session) {
        match self.execute(DropSession::from(session.clone())).await {
            Ok(()) => {}
            Err(e) => match e {},
        }
    }
}

/// Outcome of a [`SessionProvider::check()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Validity {
    /// [`Session`] is accepted by the store.
    Valid,

    /// [`Session`] is expired, revoked or denied by the store.
    Invalid,

    /// Store couldn't be reached to tell.
    Unknown,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use secrecy::SecretString;

    use crate::{
        domain::{access::Code, session, Session},
        infra::Memory,
        Config, Service,
    };

    use super::{AuthError, SessionProvider, Validity};

    fn provider(scheme: session::Scheme) -> Service<Memory> {
        Service::new(
            Config { scheme },
            Memory::with_code(&Code::new("1234").unwrap()),
        )
    }

    fn code(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[tokio::test]
    async fn authenticated_session_is_valid_until_invalidated() {
        for scheme in
            [session::Scheme::Token, session::Scheme::ChallengeResponse]
        {
            let svc = provider(scheme);

            let session = svc.authenticate(code("1234")).await.unwrap();
            assert!(svc.validate(&session).await);

            svc.invalidate(&session).await;
            assert!(!svc.validate(&session).await);
        }
    }

    #[tokio::test]
    async fn rejects_non_digit_codes_locally() {
        let svc = provider(session::Scheme::ChallengeResponse);

        for input in ["12a4", "１２３４", "1234 ", "0"] {
            let err = svc.authenticate(code(input)).await.unwrap_err();
            assert!(matches!(err.as_ref(), AuthError::MalformedCode));
        }
        assert_eq!(svc.database().calls().await, 0);
    }

    #[tokio::test]
    async fn stale_session_is_invalid() {
        let svc = provider(session::Scheme::Token);
        let mut session = svc.authenticate(code("1234")).await.unwrap();
        session.created_at = (DateTime::now()
            - (Session::LIFETIME + Duration::from_secs(60)))
        .coerce();

        assert!(!svc.validate(&session).await);
    }

    #[tokio::test]
    async fn invalidation_tolerates_unreachable_store() {
        let svc = provider(session::Scheme::Token);
        let session = svc.authenticate(code("1234")).await.unwrap();
        svc.database().set_offline(true).await;

        svc.invalidate(&session).await;
        svc.database().set_offline(false).await;

        assert!(svc.database().holds(&session.token).await);
    }

    #[tokio::test]
    async fn tells_unreachable_store_from_revocation() {
        for scheme in
            [session::Scheme::Token, session::Scheme::ChallengeResponse]
        {
            let svc = provider(scheme);
            let session = svc.authenticate(code("1234")).await.unwrap();

            svc.database().set_offline(true).await;
            assert_eq!(svc.check(&session).await, Validity::Unknown);
            assert!(!svc.validate(&session).await);

            svc.database().set_offline(false).await;
            assert_eq!(svc.check(&session).await, Validity::Valid);

            svc.database().revoke(&session.token).await;
            assert_eq!(svc.check(&session).await, Validity::Invalid);
        }
    }
}
