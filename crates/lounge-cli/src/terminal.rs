//! Terminal driver for the CLI.
//!
//! Implements the [`Driver`] trait over a scripted command and a plain text
//! writer. A page is printed once it finishes loading; afterwards only cards
//! whose settled values changed are printed again, so optimistic interim
//! states never reach the output.

use std::{
    collections::VecDeque,
    io::{self, Write},
};

use lounge_app::{App, AppEvent, Driver, LoadStatus, LoungeCard, Route};
use lounge_core::{LoungeId, Notification, NotificationLevel, SessionState, ToggleState};
use thiserror::Error;

use crate::Step;

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Generic over the writer so tests can capture output in a `Vec<u8>`.
pub struct TerminalDriver<W> {
    out: W,
    steps: VecDeque<Step>,
    show_session: bool,
    session_shown: bool,
    page: Option<(Route, LoadStatus)>,
    shown: Vec<(LoungeId, ToggleState)>,
    failed: bool,
}

impl<W: Write + Send> TerminalDriver<W> {
    /// Create a driver that feeds `steps` to the runtime and writes to `out`.
    pub fn new(out: W, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            out,
            steps: steps.into_iter().collect(),
            show_session: false,
            session_shown: false,
            page: None,
            shown: Vec::new(),
            failed: false,
        }
    }

    /// Print who is signed in once the session is known.
    #[must_use]
    pub fn with_session_line(mut self) -> Self {
        self.show_session = true;
        self
    }

    /// Whether anything went wrong: an error notification, a failed or
    /// missing page, or a redirect to sign in.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// The underlying writer.
    pub fn output(&self) -> &W {
        &self.out
    }

    fn print_session(&mut self, session: &SessionState) -> io::Result<()> {
        match session {
            SessionState::SignedIn(identity) => match &identity.email {
                Some(email) => writeln!(self.out, "Signed in as {email}"),
                None => writeln!(self.out, "Signed in as {}", identity.user_id),
            },
            SessionState::SignedOut | SessionState::Loading => writeln!(self.out, "Not signed in"),
        }
    }

    fn print_page(&mut self, app: &App) -> io::Result<()> {
        match app.load_status() {
            LoadStatus::Idle | LoadStatus::Loading => Ok(()),
            LoadStatus::Loaded if app.cards().is_empty() => {
                if app.route() == &Route::MyLounges {
                    writeln!(self.out, "You have not joined any lounges yet.")
                } else {
                    writeln!(self.out, "No lounges yet.")
                }
            },
            LoadStatus::Loaded => {
                let detail = matches!(app.route(), Route::Lounge { .. });
                for card in app.cards() {
                    self.print_card(card)?;
                    if detail && let Some(description) = &card.lounge().description {
                        writeln!(self.out, "  {description}")?;
                    }
                }
                Ok(())
            },
            LoadStatus::NotFound => {
                self.failed = true;
                writeln!(self.out, "Lounge not found")
            },
            LoadStatus::SignInRequired => {
                self.failed = true;
                writeln!(self.out, "Sign in to see your lounges.")
            },
            // The failure was already reported as a notification.
            LoadStatus::Failed(_) => {
                self.failed = true;
                Ok(())
            },
        }
    }

    fn print_card(&mut self, card: &LoungeCard) -> io::Result<()> {
        writeln!(self.out, "{}", card_line(card))
    }
}

/// One line per card: slug, title, member count, and a marker when joined.
fn card_line(card: &LoungeCard) -> String {
    let lounge = card.lounge();
    let state = card.state();
    let noun = if state.member_count == 1 { "member" } else { "members" };
    let mut line =
        format!("{:<16} {} ({} {noun})", lounge.slug, lounge.title, state.member_count);
    if state.is_member {
        line.push_str(" [joined]");
    }
    line
}

impl<W: Write + Send> Driver for TerminalDriver<W> {
    type Error = TerminalError;

    async fn poll_event(&mut self, app: &App) -> Result<Option<AppEvent>, Self::Error> {
        while let Some(step) = self.steps.pop_front() {
            match step {
                Step::Event(event) => return Ok(Some(event)),
                Step::Membership { slug, intent } => {
                    // No card means the page already reported why.
                    let Some(card) = app.card_by_slug(&slug) else {
                        tracing::debug!(%slug, "no card to change membership on");
                        continue;
                    };
                    let lounge_id = card.lounge().id;
                    return Ok(Some(match intent {
                        Some(intent) => AppEvent::SetMembership { lounge_id, intent },
                        None => AppEvent::Toggle { lounge_id },
                    }));
                },
            }
        }
        Ok(None)
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        if app.session().is_loading() {
            return Ok(());
        }
        if self.show_session && !self.session_shown {
            self.session_shown = true;
            self.print_session(app.session())?;
        }

        let page = (app.route().clone(), app.load_status().clone());
        if self.page.as_ref() != Some(&page) {
            self.page = Some(page);
            self.print_page(app)?;
            self.shown = app.cards().iter().map(|card| (card.lounge().id, card.state())).collect();
            return Ok(());
        }

        let mut changed = Vec::new();
        for card in app.cards() {
            let state = card.state();
            if state.is_loading {
                continue;
            }
            if let Some(entry) = self.shown.iter_mut().find(|(id, _)| *id == card.lounge().id)
                && entry.1 != state
            {
                entry.1 = state;
                changed.push(card);
            }
        }
        for card in changed {
            self.print_card(card)?;
        }
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), Self::Error> {
        let prefix = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "note",
            NotificationLevel::Error => {
                self.failed = true;
                "error"
            },
        };
        writeln!(self.out, "{prefix}: {notification}")?;
        Ok(())
    }

    fn redirect(&mut self, route: &Route) -> Result<(), Self::Error> {
        if route == &Route::SignIn {
            self.failed = true;
            writeln!(self.out, "Sign in required. Run `lounge sign-in <email>` first.")?;
        } else {
            writeln!(self.out, "Redirected to {route}")?;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Err(err) = self.out.flush() {
            tracing::warn!(%err, "failed to flush output");
        }
    }
}

#[cfg(test)]
mod tests {
    use lounge_core::{Identity, Lounge, SessionState, UserId};

    use super::*;

    fn driver() -> TerminalDriver<Vec<u8>> {
        TerminalDriver::new(Vec::new(), [])
    }

    fn text(driver: &TerminalDriver<Vec<u8>>) -> String {
        String::from_utf8(driver.output().clone()).unwrap()
    }

    fn row(slug: &str, is_member: bool, member_count: u64) -> Lounge {
        Lounge {
            id: LoungeId::new_v4(),
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            description: Some(format!("All about {slug}")),
            image_url: format!("https://images.example/{slug}.png"),
            member_count,
            is_member,
        }
    }

    fn loaded(route: Route, rows: Vec<Lounge>) -> App {
        let mut app = App::new();
        app.handle(AppEvent::SessionChanged(SessionState::SignedIn(Identity::new(
            UserId::new_v4(),
            None,
        ))));
        let query = route.query().unwrap();
        app.handle(AppEvent::Navigate(route));
        app.handle(AppEvent::LoungesLoaded { query, lounges: rows });
        app
    }

    #[test]
    fn card_line_marks_membership() {
        let app = loaded(Route::Lounges, vec![row("rust", true, 1), row("chess", false, 4)]);

        insta::assert_snapshot!(
            app.cards().iter().map(card_line).collect::<Vec<_>>().join("\n"),
            @r"
        rust             RUST (1 member) [joined]
        chess            CHESS (4 members)
        "
        );
    }

    #[test]
    fn detail_page_includes_description() {
        let app = loaded(Route::lounge("jazz"), vec![row("jazz", false, 0)]);
        let mut driver = driver();

        driver.render(&app).unwrap();

        insta::assert_snapshot!(text(&driver), @r"
        jazz             JAZZ (0 members)
          All about jazz
        ");
        assert!(!driver.failed());
    }

    #[test]
    fn unchanged_page_prints_once() {
        let app = loaded(Route::Lounges, vec![row("rust", false, 0)]);
        let mut driver = driver();

        driver.render(&app).unwrap();
        driver.render(&app).unwrap();

        assert_eq!(text(&driver).lines().count(), 1);
    }

    #[test]
    fn sessionless_render_prints_nothing() {
        let mut driver = driver().with_session_line();

        driver.render(&App::new()).unwrap();

        assert!(text(&driver).is_empty());
    }

    #[test]
    fn error_notification_marks_failure() {
        let mut driver = driver();

        driver.notify(&Notification::success("Successfully joined the lounge")).unwrap();
        assert!(!driver.failed());
        driver.notify(&Notification::error("Failed to join")).unwrap();

        assert!(driver.failed());
        insta::assert_snapshot!(text(&driver), @r"
        ok: Successfully joined the lounge
        error: Failed to join
        ");
    }

    #[tokio::test]
    async fn membership_step_resolves_slug_to_card() {
        let app = loaded(Route::lounge("rust"), vec![row("rust", false, 2)]);
        let id = app.cards()[0].lounge().id;
        let mut driver = TerminalDriver::new(Vec::new(), [
            Step::Membership { slug: "missing".into(), intent: None },
            Step::Membership { slug: "rust".into(), intent: None },
        ]);

        assert_eq!(
            driver.poll_event(&app).await.unwrap(),
            Some(AppEvent::Toggle { lounge_id: id })
        );
        assert_eq!(driver.poll_event(&app).await.unwrap(), None);
    }
}
