//! Interactive terminal front-end of a [`Context`].

use std::{fmt::Write as _, io, time::Duration};

use common::DateTime;
use secrecy::SecretString;
use service::{domain::student, read::student::View};
use tokio::{
    io::{
        AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, Lines, Stdin,
        Stdout,
    },
    time::{self, MissedTickBehavior},
};
use tracing as log;

use crate::{
    context::{Backend, Confirm},
    form::{self, Form},
    Context,
};

/// Operator input on the main screen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input {
    /// Show the roster.
    List,

    /// Replace the search text.
    Search(String),

    /// Save the form.
    Save(Form),

    /// Start editing a student.
    Edit(String),

    /// Stop editing.
    Cancel,

    /// Delete a student.
    Delete(String),

    /// Export the roster as CSV.
    Export,

    /// End the session.
    Logout,

    /// Show the available commands.
    Help,

    /// Leave the program.
    Quit,

    /// Blank line.
    Empty,

    /// Unrecognized command.
    Unknown(String),
}

impl Input {
    /// Parses an [`Input`] out of a line typed on the main screen.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match cmd {
            "" => Self::Empty,
            "list" | "ls" => Self::List,
            "search" => Self::Search(rest.to_owned()),
            "save" => Self::Save(Form::parse(rest)),
            "edit" => Self::Edit(rest.to_owned()),
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(rest.to_owned()),
            "export" => Self::Export,
            "logout" => Self::Logout,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

/// Help text of the main screen.
pub const HELP: &str = "\
Commandes :
  list                      afficher la liste des élèves
  search [texte]            filtrer par nom, prénom ou classe
  save Nom;Prénom;Classe;Forfait;Location;KeyCard
                            ajouter un élève, ou enregistrer la modification
  edit <id>                 modifier un élève
  cancel                    annuler la modification
  delete <id>               supprimer un élève
  export                    exporter la liste en CSV
  logout                    se déconnecter
  quit                      quitter";

/// Runs the terminal front-end over the provided [`Context`] until the
/// operator quits or the input ends.
///
/// The [`Session`] lifetime is recomputed every second, regardless of the
/// input.
///
/// # Errors
///
/// If reading the input or writing the output fails.
///
/// [`Session`]: service::domain::Session
pub async fn run<S: Backend>(
    mut ctx: Context<S>,
    drop_on_exit: bool,
) -> io::Result<()> {
    let mut screen = Screen::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if ctx.restore().await {
        screen.view(&ctx.view()).await?;
    }
    screen.notices(&mut ctx).await?;
    screen.prompt(&ctx).await?;

    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let authenticated = ctx.is_authenticated();
                if authenticated && ctx.tick(DateTime::now()).await.is_none() {
                    screen.line("").await?;
                    screen.notices(&mut ctx).await?;
                    screen.prompt(&ctx).await?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if ctx.is_authenticated() {
                    let input = Input::parse(&line);
                    if input == Input::Quit {
                        break;
                    }
                    handle(&mut ctx, input, &mut screen, &mut lines).await?;
                } else {
                    let code = SecretString::from(form::code_input(&line));
                    match ctx.login(code).await {
                        Ok(()) => {
                            screen.view(&ctx.view()).await?;
                            screen.line(HELP).await?;
                        }
                        Err(e) => screen.error(&e.message).await?,
                    }
                }
                screen.notices(&mut ctx).await?;
                screen.prompt(&ctx).await?;
            }
        }
    }

    if drop_on_exit {
        log::info!("Dropping `Session` on exit");
        ctx.logout().await;
    }
    Ok(())
}

/// Performs the provided [`Input`] on the main screen.
async fn handle<S: Backend>(
    ctx: &mut Context<S>,
    input: Input,
    screen: &mut Screen,
    lines: &mut Lines<BufReader<Stdin>>,
) -> io::Result<()> {
    let res = match input {
        Input::Empty | Input::Quit => Ok(None),
        Input::List => ctx.reload().await.map(|()| ctx.view()).map(Some),
        Input::Search(text) => Ok(Some(ctx.search(&text))),
        Input::Save(form) => {
            ctx.submit(&form).await.map(|()| Some(ctx.view()))
        }
        Input::Edit(id) => match id.parse::<student::Id>() {
            Ok(id) => ctx.edit(&id).map(|form| {
                screen.pending = Some(format!("save {}", form.to_line()));
                None
            }),
            Err(_) => return screen.error("Identifiant invalide").await,
        },
        Input::Cancel => {
            ctx.cancel_edit();
            Ok(None)
        }
        Input::Delete(id) => match id.parse::<student::Id>() {
            Ok(id) => {
                let mut asker = Asker {
                    screen: &mut *screen,
                    lines: &mut *lines,
                };
                match ctx.delete(&id, &mut asker).await {
                    Ok(true) => Ok(Some(ctx.view())),
                    Ok(false) => Ok(None),
                    Err(e) => Err(e),
                }
            }
            Err(_) => return screen.error("Identifiant invalide").await,
        },
        Input::Export => ctx.export(DateTime::now()).await.map(|path| {
            screen.pending = Some(path.display().to_string());
            None
        }),
        Input::Logout => {
            ctx.logout().await;
            Ok(None)
        }
        Input::Help => return screen.line(HELP).await,
        Input::Unknown(cmd) => {
            return screen
                .error(&format!("Commande inconnue : {cmd} (help)"))
                .await;
        }
    };

    match res {
        Ok(view) => {
            if let Some(view) = view {
                screen.view(&view).await?;
            }
            if let Some(pending) = screen.pending.take() {
                screen.line(&pending).await?;
            }
            Ok(())
        }
        Err(e) => screen.error(&e.message).await,
    }
}

/// [`Confirm`] asking on the terminal.
struct Asker<'a> {
    /// [`Screen`] the question is written to.
    screen: &'a mut Screen,

    /// Input the answer is read from.
    lines: &'a mut Lines<BufReader<Stdin>>,
}

impl Confirm for Asker<'_> {
    async fn confirm(&mut self, question: &str) -> bool {
        if self.screen.write(&format!("{question} (o/N) ")).await.is_err() {
            return false;
        }
        match self.lines.next_line().await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(e) => {
                log::warn!("Failed to read confirmation: {e}");
                false
            }
        }
    }
}

/// Checks whether the provided answer is affirmative.
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "o" | "oui" | "y" | "yes")
}

/// Output of the terminal front-end.
#[derive(Debug)]
struct Screen {
    /// Standard output the [`Screen`] is written to.
    out: Stdout,

    /// Line to show after the next [`View`].
    pending: Option<String>,
}

impl Screen {
    /// Creates a new [`Screen`] over the standard output.
    fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
            pending: None,
        }
    }

    /// Writes the provided text as is.
    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await
    }

    /// Writes the provided text as a line.
    async fn line(&mut self, text: &str) -> io::Result<()> {
        self.write(&format!("{text}\n")).await
    }

    /// Writes the provided error message.
    async fn error(&mut self, message: &str) -> io::Result<()> {
        self.line(&format!("[ERREUR] {message}")).await
    }

    /// Writes the provided [`View`].
    async fn view(&mut self, view: &View) -> io::Result<()> {
        self.write(&render_view(view)).await
    }

    /// Writes the [`Notice`]s queued in the provided [`Context`].
    ///
    /// [`Notice`]: crate::context::Notice
    async fn notices<S>(&mut self, ctx: &mut Context<S>) -> io::Result<()> {
        for notice in ctx.take_notices() {
            self.line(&notice.to_string()).await?;
        }
        Ok(())
    }

    /// Writes the prompt matching the state of the provided [`Context`].
    async fn prompt<S>(&mut self, ctx: &Context<S>) -> io::Result<()> {
        self.write(&prompt(ctx.remaining(DateTime::now()))).await
    }
}

/// Renders the prompt: the lifetime left to the session as `[MM:SS]`, or
/// the access code request when unauthenticated.
#[must_use]
pub fn prompt(remaining: Option<Duration>) -> String {
    match remaining {
        Some(left) => {
            let secs = left.as_secs();
            format!("[{:02}:{:02}] > ", secs / 60, secs % 60)
        }
        None => "Code d'accès : ".to_owned(),
    }
}

/// Renders the provided [`View`] as a table followed by its statistics.
#[must_use]
pub fn render_view(view: &View) -> String {
    let mut out = String::new();
    if view.rows.is_empty() {
        out.push_str("Aucun élève\n");
    } else {
        _ = writeln!(
            out,
            "{:<22} {:<16} {:<12} {:<6} {:>7} {:>8} {:>7} {:>10} {:>10} {:>10}",
            "Id",
            "Nom",
            "Prénom",
            "Classe",
            "Forfait",
            "Location",
            "KeyCard",
            "Total",
            "Économie",
            "Total réel",
        );
        for row in &view.rows {
            let (s, b) = (&row.student, &row.bill);
            _ = writeln!(
                out,
                "{:<22} {:<16} {:<12} {:<6} {:>7} {:>8} {:>7} {:>10} {:>10} \
                 {:>10}",
                s.id.to_string(),
                s.last_name,
                s.first_name,
                s.class,
                format!("{}j", s.forfait_days),
                format!("{}j", s.rental_days),
                if s.keycards > 0 { "Oui" } else { "Non" },
                b.total.to_string(),
                b.savings.to_string(),
                b.net.to_string(),
            );
        }
    }
    _ = writeln!(
        out,
        "Élèves : {} | Total : {} | Économies : {}",
        view.totals.count, view.totals.total, view.totals.savings,
    );
    out
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use service::{
        domain::{student, Student},
        read::{student::Filter, Roster},
    };

    use crate::form::Form;

    use super::{is_yes, prompt, render_view, Input};

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("  "), Input::Empty);
        assert_eq!(Input::parse("list"), Input::List);
        assert_eq!(
            Input::parse("search  mart "),
            Input::Search("mart".to_owned()),
        );
        assert_eq!(Input::parse("search"), Input::Search(String::new()));
        assert_eq!(
            Input::parse("save Martin;Léa;tg1;1;0;1"),
            Input::Save(Form::parse("Martin;Léa;tg1;1;0;1")),
        );
        assert_eq!(Input::parse("edit -01"), Input::Edit("-01".to_owned()));
        assert_eq!(Input::parse("rm -01"), Input::Delete("-01".to_owned()));
        assert_eq!(Input::parse("quit"), Input::Quit);
        assert_eq!(Input::parse("dance"), Input::Unknown("dance".to_owned()));
    }

    #[test]
    fn renders_prompt() {
        assert_eq!(
            prompt(Some(Duration::from_secs(29 * 60 + 5))),
            "[29:05] > ",
        );
        assert_eq!(prompt(Some(Duration::ZERO)), "[00:00] > ");
        assert_eq!(prompt(None), "Code d'accès : ");
    }

    #[test]
    fn recognizes_confirmation() {
        for yes in ["o", "OUI", " y ", "yes"] {
            assert!(is_yes(yes), "`{yes}` must confirm");
        }
        for no in ["", "n", "non", "peut-être"] {
            assert!(!is_yes(no), "`{no}` must not confirm");
        }
    }

    #[test]
    fn renders_rows_and_totals() {
        let roster = Roster::new(vec![Student {
            id: student::Id::new("-1").unwrap(),
            last_name: "Martin".into(),
            first_name: "Léa".into(),
            class: "TG1".into(),
            forfait_days: 1,
            rental_days: 1,
            keycards: 1,
            ..Student::default()
        }]);

        let out = render_view(&roster.view(&Filter::default()));

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        for cell in ["Martin", "Léa", "TG1", "1j", "Oui", "29,50€", "9,47€"] {
            assert!(lines[1].contains(cell), "missing `{cell}`");
        }
        assert!(lines[1].ends_with("20,03€"));
        assert_eq!(
            lines[2],
            "Élèves : 1 | Total : 29,50€ | Économies : 9,47€",
        );
    }

    #[test]
    fn renders_empty_view() {
        let out = render_view(&Roster::default().view(&Filter::default()));

        assert_eq!(
            out,
            "Aucun élève\nÉlèves : 0 | Total : 0,00€ | Économies : 0,00€\n",
        );
    }
}
