//! In-memory [`Database`] implementation.
//!
//! Enforces the access rule assumed from the remote store: roster paths are
//! only reachable with a [`session::Token`] backed by a granting
//! [`session::Record`] or a stored [`challenge::Response`].
//!
//! [`Database`]: crate::infra::Database

mod impls;

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use common::DateTime;
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, MutexGuard};
use tracerr::Traced;

use crate::{
    domain::{access, challenge, session, student, Challenge, Student},
    infra::database::{self, Anonymous, Credentials},
};

/// In-memory [`Database`] client.
///
/// Clones share the same storage.
///
/// [`Database`]: crate::infra::Database
#[derive(Clone, Debug, Default)]
pub struct Memory<C = Anonymous> {
    /// Shared storage.
    state: Arc<Mutex<State>>,

    /// [`Credentials`] attached to operations.
    credentials: C,
}

/// Contents of a [`Memory`] storage.
#[derive(Debug, Default)]
struct State {
    /// Stored [`access::Fingerprint`].
    fingerprint: Option<access::Fingerprint>,

    /// Stored [`session::Record`]s.
    sessions: HashMap<session::Token, session::Record>,

    /// Stored [`Challenge`]s.
    challenges: HashMap<challenge::Id, Challenge>,

    /// Stored [`challenge::Response`]s.
    responses: HashMap<session::Token, challenge::Response>,

    /// Stored [`Student`]s, in key order.
    students: BTreeMap<student::Id, Student>,

    /// Sequence number of the last pushed [`Student`].
    last_id: u64,

    /// Number of operations attempted so far.
    calls: usize,

    /// Indicator whether operations fail as unreachable.
    offline: bool,
}

impl State {
    /// Checks whether the provided [`session::Token`] grants access to the
    /// roster at the provided moment.
    fn permits(&self, token: &session::Token, now: DateTime) -> bool {
        self.sessions.get(token).is_some_and(|r| r.grants(now))
            || self.responses.contains_key(token)
    }
}

impl Memory {
    /// Creates a new empty [`Memory`] storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`Memory`] storage holding the [`access::Fingerprint`]
    /// of the provided [`access::Code`].
    #[must_use]
    pub fn with_code(code: &access::Code) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                fingerprint: Some(access::Fingerprint::of(code)),
                ..State::default()
            })),
            credentials: Anonymous,
        }
    }
}

impl<C> Memory<C> {
    /// Returns the number of operations attempted so far.
    pub async fn calls(&self) -> usize {
        self.state.lock().await.calls
    }

    /// Makes every following operation fail as unreachable, or not.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Removes everything granting access to the provided
    /// [`session::Token`].
    pub async fn revoke(&self, token: &session::Token) {
        let mut state = self.state.lock().await;
        drop(state.sessions.remove(token));
        drop(state.responses.remove(token));
    }

    /// Checks whether a [`session::Record`] or a [`challenge::Response`] is
    /// stored for the provided [`session::Token`].
    pub async fn holds(&self, token: &session::Token) -> bool {
        let state = self.state.lock().await;
        state.sessions.contains_key(token)
            || state.responses.contains_key(token)
    }

    /// Returns the number of stored [`Challenge`]s.
    pub async fn challenges(&self) -> usize {
        self.state.lock().await.challenges.len()
    }
}

impl<C: Credentials> Memory<C> {
    /// Starts an operation, checking reachability and [`Credentials`].
    async fn enter(
        &self,
    ) -> Result<MutexGuard<'_, State>, Traced<database::Error>> {
        let mut state = self.state.lock().await;
        state.calls += 1;

        if state.offline {
            return Err(tracerr::new!(database::Error::from(
                Error::Unavailable
            )));
        }
        if let Some(token) = self.credentials.token() {
            if !state.permits(token, DateTime::now()) {
                return Err(tracerr::new!(database::Error::from(
                    Error::PermissionDenied
                )));
            }
        }

        Ok(state)
    }
}

/// [`Memory`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Credentials`] don't grant access.
    #[display("Permission denied")]
    PermissionDenied,

    /// Storage is unreachable.
    #[display("Storage is unavailable")]
    Unavailable,
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{Authorize, By, Insert, Select},
        DateTime, Handler as _,
    };

    use crate::domain::{access, session, Session, Student};

    use super::Memory;

    fn session() -> Session {
        let created_at = DateTime::now().coerce();
        Session {
            token: session::Token::from_digest(access::digest("token")),
            created_at,
            challenge_id: None,
        }
    }

    #[tokio::test]
    async fn denies_roster_without_session() {
        let db = Memory::new();
        let authorized =
            db.execute(Authorize(session().token)).await.unwrap();

        let err = authorized
            .execute(Select(By::<Vec<Student>, _>::new(())))
            .await
            .unwrap_err();

        assert!(err.as_ref().is_permission_denied());
    }

    #[tokio::test]
    async fn grants_roster_with_session_record() {
        let db = Memory::new();
        let session = session();
        db.execute(Insert(session::Record::of(&session)))
            .await
            .unwrap();
        let authorized =
            db.execute(Authorize(session.token.clone())).await.unwrap();

        let students = authorized
            .execute(Select(By::<Vec<Student>, _>::new(())))
            .await
            .unwrap();
        assert!(students.is_empty());

        db.revoke(&session.token).await;
        assert!(authorized
            .execute(Select(By::<Vec<Student>, _>::new(())))
            .await
            .unwrap_err()
            .as_ref()
            .is_permission_denied());
    }

    #[tokio::test]
    async fn counts_calls_and_fails_offline() {
        let db = Memory::with_code(&access::Code::new("1234").unwrap());

        let fingerprint = db
            .execute(Select(By::<Option<access::Fingerprint>, _>::new(())))
            .await
            .unwrap();
        assert_eq!(fingerprint.unwrap().as_ref(), access::digest("1234"));
        assert_eq!(db.calls().await, 1);

        db.set_offline(true).await;
        let err = db
            .execute(Select(By::<Option<access::Fingerprint>, _>::new(())))
            .await
            .unwrap_err();
        assert!(!err.as_ref().is_permission_denied());
        assert_eq!(db.calls().await, 2);
    }
}
