//! [`Context`]-related definitions.

use std::{fmt, future::Future, path::PathBuf, time::Duration};

use common::DateTime;
use secrecy::SecretString;
use service::{
    command::{
        create_session, create_student, delete_student, update_student,
        CreateStudent, DeleteStudent, UpdateStudent,
    },
    domain::{session, student, Session, Student},
    infra::database,
    query,
    read::{
        student::{Filter, View},
        Roster,
    },
    provider::Validity,
    Command, Query, SessionProvider,
};
use tokio::fs;
use tracerr::Traced;
use tracing as log;

use crate::{
    define_error, export, form::Form, storage::SessionFile, AsError, Error,
};

/// Operations of the [`Service`] a [`Context`] relies on.
///
/// [`Service`]: service::Service
pub trait Backend:
    SessionProvider
    + Command<
        CreateStudent,
        Ok = Student,
        Err = Traced<create_student::ExecutionError>,
    > + Command<
        UpdateStudent,
        Ok = (),
        Err = Traced<update_student::ExecutionError>,
    > + Command<
        DeleteStudent,
        Ok = (),
        Err = Traced<delete_student::ExecutionError>,
    > + Query<
        query::students::List,
        Ok = Vec<Student>,
        Err = Traced<database::Error>,
    >
{
}

impl<S> Backend for S where
    S: SessionProvider
        + Command<
            CreateStudent,
            Ok = Student,
            Err = Traced<create_student::ExecutionError>,
        > + Command<
            UpdateStudent,
            Ok = (),
            Err = Traced<update_student::ExecutionError>,
        > + Command<
            DeleteStudent,
            Ok = (),
            Err = Traced<delete_student::ExecutionError>,
        > + Query<
            query::students::List,
            Ok = Vec<Student>,
            Err = Traced<database::Error>,
        >
{
}

/// Asker of a yes/no question to the operator.
pub trait Confirm {
    /// Asks the provided question, resolving to the operator's answer.
    fn confirm(&mut self, question: &str) -> impl Future<Output = bool>;
}

/// Fixed answer.
impl Confirm for bool {
    async fn confirm(&mut self, _: &str) -> bool {
        *self
    }
}

/// Application state: the current [`Session`], the loaded [`Roster`], the
/// search [`Filter`] and the [`Student`] being edited.
///
/// Every operator action goes through this [`Context`].
#[derive(Debug)]
pub struct Context<S = crate::Service> {
    /// [`Backend`] operations are performed with.
    service: S,

    /// [`SessionFile`] the current [`Session`] survives restarts in.
    file: SessionFile,

    /// Directory CSV exports are written into.
    export_dir: PathBuf,

    /// Current [`Session`], if authenticated.
    session: Option<Session>,

    /// Last loaded [`Roster`].
    roster: Roster,

    /// Current search [`Filter`].
    filter: Filter,

    /// ID of the [`Student`] being edited, if any.
    editing: Option<student::Id>,

    /// [`Notice`]s not shown yet.
    notices: Vec<Notice>,
}

impl<S> Context<S> {
    /// Creates a new unauthenticated [`Context`].
    #[must_use]
    pub fn new(
        service: S,
        file: SessionFile,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            service,
            file,
            export_dir: export_dir.into(),
            session: None,
            roster: Roster::default(),
            filter: Filter::default(),
            editing: None,
            notices: Vec::new(),
        }
    }

    /// Returns the [`Backend`] of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Checks whether this [`Context`] holds a [`Session`].
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the lifetime left to the current [`Session`] at the provided
    /// moment, if authenticated.
    #[must_use]
    pub fn remaining(&self, now: DateTime) -> Option<Duration> {
        self.session.as_ref().map(|s| s.remaining(now))
    }

    /// Returns the [`View`] of the [`Roster`] kept by the current search
    /// [`Filter`].
    #[must_use]
    pub fn view(&self) -> View {
        self.roster.view(&self.filter)
    }

    /// Returns the ID of the [`Student`] being edited, if any.
    #[must_use]
    pub fn editing(&self) -> Option<&student::Id> {
        self.editing.as_ref()
    }

    /// Replaces the search [`Filter`], returning the new [`View`].
    pub fn search(&mut self, text: &str) -> View {
        self.filter = Filter::new(text);
        self.view()
    }

    /// Starts editing the [`Student`] with the provided ID, returning the
    /// [`Form`] filled with its current values.
    ///
    /// # Errors
    ///
    /// If the loaded [`Roster`] has no such [`Student`].
    pub fn edit(&mut self, id: &student::Id) -> Result<Form, Error> {
        let row = self
            .roster
            .get(id)
            .ok_or_else(|| Error::from(RosterError::UnknownStudent))?;
        let form = Form::from(&row.student);
        let notice = Notice::info(format!(
            "Modification de {} {}",
            row.student.last_name, row.student.first_name,
        ));
        self.notify(notice);
        self.editing = Some(id.clone());
        Ok(form)
    }

    /// Stops editing, so the next [`Context::submit()`] creates a new
    /// [`Student`].
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Takes the [`Notice`]s not shown yet.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Queues the provided [`Notice`].
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Returns the current [`Session`].
    ///
    /// # Errors
    ///
    /// If not authenticated.
    fn current_session(&self) -> Result<&Session, Error> {
        self.session
            .as_ref()
            .ok_or_else(|| AuthError::Unauthenticated.into())
    }
}

impl<S: Backend> Context<S> {
    /// Restores the [`Session`] kept in the [`SessionFile`], if it's still
    /// valid, and loads the [`Roster`] for it.
    ///
    /// A [`Session`] the store cannot be reached to check is kept as is.
    ///
    /// Returns whether this [`Context`] is authenticated afterwards.
    pub async fn restore(&mut self) -> bool {
        let stored = match self.file.load().await {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("Discarding stored `Session`: {e}");
                self.forget().await;
                return false;
            }
        };
        let Some(session) = stored else {
            return false;
        };

        if session.is_expired(DateTime::now()) {
            log::info!("Stored `Session` is expired");
            self.service.invalidate(&session).await;
            self.forget().await;
            return false;
        }
        match self.service.check(&session).await {
            Validity::Valid => {}
            Validity::Invalid => {
                self.forget().await;
                return false;
            }
            Validity::Unknown => {
                self.session = Some(session);
                self.notify(Notice::error(
                    Error::from(AuthError::ConnectionFailed).message,
                ));
                return true;
            }
        }

        self.session = Some(session);
        if let Err(e) = self.reload().await {
            self.notify(Notice::error(e.message));
        }
        self.is_authenticated()
    }

    /// Authenticates with the provided access code and loads the
    /// [`Roster`].
    ///
    /// # Errors
    ///
    /// If the code is rejected, or the [`Roster`] cannot be loaded.
    pub async fn login(&mut self, code: SecretString) -> Result<(), Error> {
        if self.is_authenticated() {
            self.logout().await;
        }

        let session = self.service.authenticate(code).await.map_err(|e| {
            let err = e.into_error();
            log::info!("Authentication failed: {err}");
            err
        })?;
        if let Err(e) = self.file.save(&session).await {
            log::warn!("Failed to store `Session`: {e}");
        }
        self.session = Some(session);

        self.reload().await
    }

    /// Recomputes the lifetime left to the current [`Session`], ending it
    /// once the lifetime is over.
    ///
    /// Returns the lifetime left, if still authenticated.
    pub async fn tick(&mut self, now: DateTime) -> Option<Duration> {
        let remaining = self.remaining(now)?;
        if remaining.is_zero() {
            log::info!("`Session` expired");
            self.logout().await;
            self.notify(Notice::error(
                Error::from(AuthError::SessionExpired).message,
            ));
            return None;
        }
        Some(remaining)
    }

    /// Ends the current [`Session`], if any, both locally and remotely.
    ///
    /// Remote cleanup is best-effort.
    pub async fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            self.service.invalidate(&session).await;
        }
        self.forget().await;
    }

    /// Loads the [`Roster`] from the store.
    ///
    /// # Errors
    ///
    /// If not authenticated, or the store refuses or fails the read.
    pub async fn reload(&mut self) -> Result<(), Error> {
        let token = self.live_token().await?;

        match self
            .service
            .execute(query::students::List::by(token, ()))
            .await
        {
            Ok(students) => {
                self.roster = Roster::new(students);
                Ok(())
            }
            Err(e) => Err(self
                .recover(e.into_error(), |msg| {
                    format!("Erreur de chargement des données: {msg}")
                })
                .await),
        }
    }

    /// Saves the provided [`Form`]: updates the [`Student`] being edited, or
    /// creates a new one, then reloads the [`Roster`].
    ///
    /// # Errors
    ///
    /// If not authenticated, the [`Form`] is invalid, or the store refuses
    /// or fails the write.
    pub async fn submit(&mut self, form: &Form) -> Result<(), Error> {
        _ = self.current_session()?;
        let fields = form.validate().map_err(AsError::into_error)?;
        let token = self.live_token().await?;

        let saved = if let Some(id) = self.editing.clone() {
            self.service
                .execute(UpdateStudent { token, id, fields })
                .await
                .map(|()| "Élève mis à jour avec succès")
                .map_err(AsError::into_error)
        } else {
            self.service
                .execute(CreateStudent { token, fields })
                .await
                .map(|_| "Élève ajouté avec succès")
                .map_err(AsError::into_error)
        };
        match saved {
            Ok(msg) => {
                self.editing = None;
                self.notify(Notice::success(msg));
                self.reload().await
            }
            Err(e) => Err(self
                .recover(e, |msg| format!("Erreur de sauvegarde: {msg}"))
                .await),
        }
    }

    /// Deletes the [`Student`] with the provided ID once the operator
    /// confirms it, then reloads the [`Roster`].
    ///
    /// Returns whether the [`Student`] was deleted.
    ///
    /// # Errors
    ///
    /// If not authenticated, or the store refuses or fails the removal.
    pub async fn delete(
        &mut self,
        id: &student::Id,
        confirm: &mut impl Confirm,
    ) -> Result<bool, Error> {
        _ = self.current_session()?;
        if !confirm.confirm("Supprimer cet élève ?").await {
            return Ok(false);
        }
        let token = self.live_token().await?;

        let deleted = self
            .service
            .execute(DeleteStudent {
                token,
                id: id.clone(),
            })
            .await;
        if let Err(e) = deleted {
            return Err(self
                .recover(e.into_error(), |_| "Erreur de suppression".to_owned())
                .await);
        }

        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        self.notify(Notice::success("Élève supprimé avec succès"));
        self.reload().await.map(|()| true)
    }

    /// Exports the whole [`Roster`] as a CSV file named after the provided
    /// moment, returning the path of the file.
    ///
    /// # Errors
    ///
    /// If not authenticated, the [`Roster`] is empty, or the file cannot be
    /// written.
    pub async fn export(&mut self, now: DateTime) -> Result<PathBuf, Error> {
        _ = self.current_session()?;
        if self.roster.is_empty() {
            return Err(RosterError::NothingToExport.into());
        }

        let path = self.export_dir.join(export::file_name(now));
        let csv = export::render(&self.roster);
        let written = async {
            fs::create_dir_all(&self.export_dir).await?;
            fs::write(&path, csv).await
        }
        .await;
        if let Err(e) = written {
            log::error!(path = %path.display(), "Failed to write CSV: {e}");
            let mut err = Error::internal(&e);
            err.message = format!("Erreur d'export: {e}");
            return Err(err);
        }

        log::info!(path = %path.display(), "CSV exported");
        self.notify(Notice::success("Export CSV généré"));
        Ok(path)
    }

    /// Returns the [`session::Token`] of the current [`Session`], ending the
    /// [`Session`] instead if its lifetime is over.
    ///
    /// # Errors
    ///
    /// If not authenticated, or the [`Session`] is expired.
    async fn live_token(&mut self) -> Result<session::Token, Error> {
        let session = self.current_session()?;
        if session.is_expired(DateTime::now()) {
            log::info!("`Session` expired");
            self.logout().await;
            return Err(AuthError::SessionExpired.into());
        }
        Ok(session.token.clone())
    }

    /// Settles the provided operation [`Error`]: ends the [`Session`] if the
    /// [`Error`] demands it, or rewords an unexpected failure with the
    /// provided `describe` function.
    async fn recover(
        &mut self,
        mut err: Error,
        describe: impl FnOnce(&str) -> String,
    ) -> Error {
        if err.logout {
            log::info!("`Session` rejected by the store: {err}");
            self.logout().await;
        } else if err.is_internal() {
            log::error!("{err}");
            err.message = describe(&err.message);
        }
        err
    }

    /// Drops every trace of the [`Session`] kept in this [`Context`].
    async fn forget(&mut self) {
        self.session = None;
        self.roster = Roster::default();
        self.filter = Filter::default();
        self.editing = None;
        if let Err(e) = self.file.clear().await {
            log::warn!("Failed to clear stored `Session`: {e}");
        }
    }
}

/// Message shown to the operator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    /// [`Level`] of this [`Notice`].
    pub level: Level,

    /// Text of this [`Notice`].
    pub message: String,
}

impl Notice {
    /// Creates a new [`Level::Success`] [`Notice`].
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    /// Creates a new [`Level::Error`] [`Notice`].
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    /// Creates a new [`Level::Info`] [`Notice`].
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Success => "OK",
            Level::Error => "ERREUR",
            Level::Info => "INFO",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Level of a [`Notice`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    /// Operation succeeded.
    Success,

    /// Operation failed.
    Error,

    /// Informational message.
    Info,
}

impl AsError for create_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(
            match self {
                Self::MalformedCode => AuthError::MalformedCode,
                Self::WrongCode => AuthError::WrongCode,
                Self::Db(_) | Self::NoFingerprint => AuthError::ConnectionFailed,
            }
            .into(),
        )
    }
}

impl AsError for create_student::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for update_student::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for delete_student::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "MALFORMED_CODE"]
        #[logout = false]
        #[message = "Le code doit contenir exactement 4 chiffres"]
        MalformedCode,

        #[code = "WRONG_CODE"]
        #[logout = false]
        #[message = "Code incorrect"]
        WrongCode,

        #[code = "CONNECTION_FAILED"]
        #[logout = false]
        #[message = "Erreur de connexion"]
        ConnectionFailed,

        #[code = "UNAUTHENTICATED"]
        #[logout = true]
        #[message = "Non authentifié"]
        Unauthenticated,

        #[code = "SESSION_EXPIRED"]
        #[logout = true]
        #[message = "Session expirée. Veuillez vous reconnecter."]
        SessionExpired,
    }
}

define_error! {
    enum RosterError {
        #[code = "UNKNOWN_STUDENT"]
        #[logout = false]
        #[message = "Élève introuvable"]
        UnknownStudent,

        #[code = "NOTHING_TO_EXPORT"]
        #[logout = false]
        #[message = "Aucun élève à exporter"]
        NothingToExport,
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use secrecy::SecretString;
    use service::{
        domain::{access::Code, session, student, Session},
        infra::Memory,
        Config, Service,
    };
    use tempfile::TempDir;

    use crate::{form::Form, storage::SessionFile};

    use super::{Context, Level};

    struct Fixture {
        dir: TempDir,
        ctx: Context<Service<Memory>>,
    }

    impl Fixture {
        fn new(scheme: session::Scheme) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let svc = Service::new(
                Config { scheme },
                Memory::with_code(&Code::new("1234").unwrap()),
            );
            let ctx = Self::context(&dir, svc);
            Self { dir, ctx }
        }

        fn context(
            dir: &TempDir,
            svc: Service<Memory>,
        ) -> Context<Service<Memory>> {
            Context::new(svc, Self::file(dir), dir.path().join("exports"))
        }

        fn file(dir: &TempDir) -> SessionFile {
            SessionFile::new(dir.path().join("session.json"))
        }

        /// Restarts the program over the same store and files.
        fn restart(&self) -> Context<Service<Memory>> {
            Self::context(&self.dir, self.ctx.service().clone())
        }

        async fn calls(&self) -> usize {
            self.ctx.service().database().calls().await
        }
    }

    fn code(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    async fn logged_in() -> Fixture {
        let mut f = Fixture::new(session::Scheme::Token);
        f.ctx.login(code("1234")).await.unwrap();
        f
    }

    async fn add(f: &mut Fixture, line: &str) {
        f.ctx.submit(&Form::parse(line)).await.unwrap();
    }

    fn id_of(f: &Fixture, last_name: &str) -> student::Id {
        f.ctx
            .view()
            .rows
            .into_iter()
            .find(|r| r.student.last_name == last_name)
            .unwrap()
            .student
            .id
    }

    #[tokio::test]
    async fn logs_in_and_persists_session() {
        for scheme in
            [session::Scheme::Token, session::Scheme::ChallengeResponse]
        {
            let mut f = Fixture::new(scheme);

            f.ctx.login(code("1234")).await.unwrap();

            assert!(f.ctx.is_authenticated());
            let stored = Fixture::file(&f.dir).load().await.unwrap();
            assert_eq!(stored.as_ref(), f.ctx.session.as_ref());
        }
    }

    #[tokio::test]
    async fn rejects_malformed_code_without_remote_call() {
        let mut f = Fixture::new(session::Scheme::Token);

        let err = f.ctx.login(code("123")).await.unwrap_err();

        assert_eq!(err.code, "MALFORMED_CODE");
        assert_eq!(err.message, "Le code doit contenir exactement 4 chiffres");
        assert_eq!(f.calls().await, 0);
        assert!(!f.ctx.is_authenticated());
    }

    #[tokio::test]
    async fn reports_wrong_code_and_connection_failures() {
        let mut f = Fixture::new(session::Scheme::Token);

        let err = f.ctx.login(code("4321")).await.unwrap_err();
        assert_eq!(err.message, "Code incorrect");

        f.ctx.service().database().set_offline(true).await;
        let err = f.ctx.login(code("1234")).await.unwrap_err();
        assert_eq!(err.message, "Erreur de connexion");
        assert!(!f.ctx.is_authenticated());
    }

    #[tokio::test]
    async fn restores_fresh_session() {
        let f = logged_in().await;

        let mut ctx = f.restart();

        assert!(ctx.restore().await);
        assert_eq!(ctx.session, f.ctx.session);
    }

    #[tokio::test]
    async fn discards_expired_session_on_restore() {
        let f = Fixture::new(session::Scheme::Token);
        let file = Fixture::file(&f.dir);
        file.save(&Session {
            token: session::Token::from_digest("stale".to_owned()),
            created_at: (DateTime::now()
                - (Session::LIFETIME + Duration::from_secs(1)))
            .coerce(),
            challenge_id: None,
        })
        .await
        .unwrap();

        let mut ctx = f.restart();

        assert!(!ctx.restore().await);
        assert_eq!(file.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn discards_revoked_session_on_restore() {
        let f = logged_in().await;
        let token = f.ctx.session.clone().unwrap().token;
        f.ctx.service().database().revoke(&token).await;

        let mut ctx = f.restart();

        assert!(!ctx.restore().await);
        assert_eq!(Fixture::file(&f.dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn keeps_session_when_store_is_unreachable_on_restore() {
        let f = logged_in().await;
        f.ctx.service().database().set_offline(true).await;

        let mut ctx = f.restart();

        assert!(ctx.restore().await);
        assert_eq!(ctx.session, f.ctx.session);
        assert_eq!(
            Fixture::file(&f.dir).load().await.unwrap().as_ref(),
            f.ctx.session.as_ref(),
        );
        let notices = ctx.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Erreur de connexion");
    }

    #[tokio::test]
    async fn expired_session_issues_no_remote_write() {
        let mut f = logged_in().await;
        add(&mut f, "Martin;Léa;TG1;1").await;
        let id = id_of(&f, "Martin");
        if let Some(s) = f.ctx.session.as_mut() {
            s.created_at = (DateTime::now()
                - (Session::LIFETIME + Duration::from_secs(1)))
            .coerce();
        }

        let err = f.ctx.delete(&id, &mut true).await.unwrap_err();
        assert_eq!(err.message, "Session expirée. Veuillez vous reconnecter.");
        assert!(!f.ctx.is_authenticated());
        assert_eq!(Fixture::file(&f.dir).load().await.unwrap(), None);

        let err = f.ctx.submit(&Form::parse("Durand;Hugo;1S2")).await;
        assert_eq!(err.unwrap_err().message, "Non authentifié");

        f.ctx.login(code("1234")).await.unwrap();
        let view = f.ctx.view();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].student.last_name, "Martin");
    }

    #[tokio::test]
    async fn tick_expires_session() {
        let mut f = logged_in().await;
        let now = DateTime::now();

        let left = f.ctx.tick(now).await.unwrap();
        assert!(left <= Session::LIFETIME);
        assert!(left > Session::LIFETIME - Duration::from_secs(60));

        assert_eq!(f.ctx.tick(now + Session::LIFETIME).await, None);
        assert!(!f.ctx.is_authenticated());
        let notices = f.ctx.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, Level::Error);
        assert_eq!(
            notices[0].message,
            "Session expirée. Veuillez vous reconnecter.",
        );
        assert_eq!(Fixture::file(&f.dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn creates_and_updates_students() {
        let mut f = logged_in().await;

        add(&mut f, "Martin;Léa;tg1;1;0;0").await;
        assert_eq!(
            f.ctx.take_notices()[0].message,
            "Élève ajouté avec succès",
        );
        let id = id_of(&f, "Martin");

        let form = f.ctx.edit(&id).unwrap();
        assert_eq!(form.to_line(), "Martin;Léa;TG1;1;0;0");
        assert_eq!(f.ctx.editing(), Some(&id));

        add(&mut f, "Martin;Léa;TG1;2;0;0").await;
        let notices = f.ctx.take_notices();
        assert_eq!(
            notices.last().unwrap().message,
            "Élève mis à jour avec succès",
        );
        assert_eq!(f.ctx.editing(), None);

        let view = f.ctx.view();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].student.forfait_days, 2);
    }

    #[tokio::test]
    async fn rejects_invalid_form_without_remote_call() {
        let mut f = logged_in().await;
        let calls = f.calls().await;

        let err = f.ctx.submit(&Form::parse("Martin;;TG1")).await.unwrap_err();
        assert_eq!(err.message, "Veuillez remplir tous les champs");

        let err = f.ctx.submit(&Form::parse("Martin;Léa;T1")).await.unwrap_err();
        assert_eq!(
            err.message,
            "La classe doit contenir 3 caractères (ex: 203, TG1)",
        );

        assert_eq!(f.calls().await, calls);
        assert!(f.ctx.is_authenticated());
    }

    #[tokio::test]
    async fn access_denial_forces_logout() {
        let mut f = logged_in().await;
        let token = f.ctx.session.clone().unwrap().token;
        f.ctx.service().database().revoke(&token).await;

        let err = f.ctx.submit(&Form::parse("Martin;Léa;TG1")).await;

        let err = err.unwrap_err();
        assert_eq!(err.message, "Accès refusé. Veuillez vous reconnecter.");
        assert!(!f.ctx.is_authenticated());
        assert_eq!(Fixture::file(&f.dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreachable_store_keeps_session() {
        let mut f = logged_in().await;
        f.ctx.service().database().set_offline(true).await;

        let err = f.ctx.reload().await.unwrap_err();

        assert!(err
            .message
            .starts_with("Erreur de chargement des données: "));
        assert!(f.ctx.is_authenticated());

        let err = f.ctx.submit(&Form::parse("Martin;Léa;TG1")).await;
        assert!(err.unwrap_err().message.starts_with("Erreur de sauvegarde: "));
        assert!(f.ctx.is_authenticated());
    }

    #[tokio::test]
    async fn deletes_only_when_confirmed() {
        let mut f = logged_in().await;
        add(&mut f, "Martin;Léa;TG1;1").await;
        add(&mut f, "Durand;Hugo;1S2;2").await;
        let id = id_of(&f, "Martin");
        let calls = f.calls().await;

        assert!(!f.ctx.delete(&id, &mut false).await.unwrap());
        assert_eq!(f.calls().await, calls);
        assert_eq!(f.ctx.view().rows.len(), 2);

        assert!(f.ctx.delete(&id, &mut true).await.unwrap());
        let view = f.ctx.view();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].student.last_name, "Durand");
        assert_eq!(
            f.ctx.take_notices().last().unwrap().message,
            "Élève supprimé avec succès",
        );
    }

    #[tokio::test]
    async fn searches_roster() {
        let mut f = logged_in().await;
        add(&mut f, "Martin;Léa;TG1;1").await;
        add(&mut f, "Durand;Hugo;1S2;2").await;

        let view = f.ctx.search("HUG");
        assert_eq!(view.totals.count, 1);
        assert_eq!(view.rows[0].student.last_name, "Durand");

        assert_eq!(f.ctx.search("").totals.count, 2);
    }

    #[tokio::test]
    async fn refuses_to_export_empty_roster() {
        let mut f = logged_in().await;

        let err = f.ctx.export(DateTime::now()).await.unwrap_err();

        assert_eq!(err.message, "Aucun élève à exporter");
        assert!(!f.dir.path().join("exports").exists());
    }

    #[tokio::test]
    async fn exports_full_roster() {
        let mut f = logged_in().await;
        add(&mut f, "Martin;Léa;TG1;1").await;
        add(&mut f, "Durand;Hugo;1S2;2").await;
        _ = f.ctx.search("martin");

        let path = f.ctx.export(DateTime::now()).await.unwrap();

        let csv = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(csv.starts_with('\u{feff}'));
        assert_eq!(csv.lines().count(), 3);
        assert!(path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("paiements_sortie_"));
    }

    #[tokio::test]
    async fn requires_session() {
        let mut f = Fixture::new(session::Scheme::Token);

        let err = f.ctx.reload().await.unwrap_err();

        assert_eq!(err.message, "Non authentifié");
        assert_eq!(f.calls().await, 0);
    }
}
