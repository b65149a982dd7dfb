//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Backend`]: store and identity provider
//! - [`Driver`]: Platform-specific I/O
//!
//! Reads and auth requests are awaited in place. Membership mutations run on
//! a [`JoinSet`] so the driver keeps being polled while they are in flight;
//! their results re-enter the App as [`AppEvent::MutationCompleted`].

use lounge_client::{Backend, MembershipMutator};
use lounge_core::MutationRequest;
use tokio::task::{JoinError, JoinSet};

use crate::{App, AppAction, AppEvent, Driver, LoungeQuery};

/// What woke the event loop.
enum Wake<E> {
    Input(Result<Option<AppEvent>, E>),
    Completed(Result<AppEvent, JoinError>),
    Idle,
}

/// Generic runtime that orchestrates App, Backend, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `B`: Backend for reads, mutations, and sign-in
pub struct Runtime<D, B>
where
    D: Driver,
    B: Backend,
{
    driver: D,
    app: App,
    backend: B,
    mutator: MembershipMutator<B>,
    in_flight: JoinSet<AppEvent>,
}

impl<D, B> Runtime<D, B>
where
    D: Driver,
    B: Backend,
{
    /// Create a new runtime with the given driver and backend.
    pub fn new(driver: D, backend: B) -> Self {
        let mutator = MembershipMutator::new(backend.clone());
        Self { driver, app: App::new(), backend, mutator, in_flight: JoinSet::new() }
    }

    /// Run the main event loop.
    ///
    /// Refreshes the session, then alternates between driver input and
    /// mutation results until the App quits, or until the driver is
    /// exhausted and no mutation is in flight. Mutations still in flight on
    /// quit are aborted.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        let actions = self.app.start();
        if self.process_actions(actions).await? {
            self.shutdown();
            return Ok(());
        }

        let mut input_open = true;
        loop {
            let wake = tokio::select! {
                biased;
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    Wake::Completed(joined)
                },
                polled = self.driver.poll_event(&self.app), if input_open => Wake::Input(polled),
                else => Wake::Idle,
            };

            let event = match wake {
                Wake::Input(polled) => match polled? {
                    Some(event) => event,
                    None => {
                        tracing::debug!(in_flight = self.in_flight.len(), "input exhausted");
                        input_open = false;
                        continue;
                    },
                },
                Wake::Completed(Ok(event)) => event,
                Wake::Completed(Err(err)) => {
                    tracing::error!(%err, "mutation task failed");
                    continue;
                },
                Wake::Idle => break,
            };

            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                break;
            }
        }

        self.shutdown();
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.in_flight.is_empty() {
            tracing::debug!(in_flight = self.in_flight.len(), "aborting pending mutations");
            self.in_flight.abort_all();
        }
        self.driver.stop();
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                let event = match action {
                    AppAction::Render => {
                        self.driver.render(&self.app)?;
                        continue;
                    },
                    AppAction::Quit => return Ok(true),
                    AppAction::Redirect { to } => {
                        self.driver.redirect(&to)?;
                        continue;
                    },
                    AppAction::Notify(notification) => {
                        self.driver.notify(&notification)?;
                        continue;
                    },
                    AppAction::Mutate(request) => {
                        self.spawn_mutation(request);
                        continue;
                    },
                    AppAction::Load(query) => self.load(query).await,
                    AppAction::SendMagicLink { email } => {
                        match self.backend.sign_in_with_email(&email).await {
                            Ok(()) => AppEvent::MagicLinkSent { email },
                            Err(err) => AppEvent::SignInFailed { reason: err.to_string() },
                        }
                    },
                    AppAction::SignOut => match self.backend.sign_out().await {
                        Ok(()) => AppEvent::SignedOut,
                        Err(err) => AppEvent::SignOutFailed { reason: err.to_string() },
                    },
                    AppAction::RefreshSession => match self.backend.current_user().await {
                        Ok(identity) => AppEvent::SessionChanged(identity.into()),
                        Err(err) => {
                            tracing::warn!(%err, "failed to fetch session");
                            AppEvent::SessionFailed { reason: err.to_string() }
                        },
                    },
                };

                pending_actions.extend(self.app.handle(event));
            }
        }
        Ok(false)
    }

    async fn load(&self, query: LoungeQuery) -> AppEvent {
        tracing::debug!(?query, "loading lounges");
        let result = match &query {
            LoungeQuery::All => self.backend.lounges_with_membership().await,
            LoungeQuery::Mine => self.backend.my_lounges().await,
            LoungeQuery::BySlug(slug) => self.backend.lounge_by_slug(slug).await,
        };

        match result {
            Ok(lounges) => AppEvent::LoungesLoaded { query, lounges },
            Err(err) => {
                tracing::warn!(?query, %err, "load failed");
                AppEvent::LoadFailed { query, reason: err.to_string() }
            },
        }
    }

    fn spawn_mutation(&mut self, request: MutationRequest) {
        let mutator = self.mutator.clone();
        let lounge_id = request.membership.lounge_id;
        tracing::debug!(lounge = %lounge_id, ticket = %request.ticket, intent = %request.intent, "spawning mutation");

        self.in_flight.spawn(async move {
            let result = mutator.apply(&request).await.map_err(|err| err.to_string());
            AppEvent::MutationCompleted { lounge_id, ticket: request.ticket, result }
        });
    }

    /// Current application state.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The driver, for inspecting captured output after a run.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Number of mutations still in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
