//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages what the user
//! sees completely decoupled from the backend.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks the session, the current route and the cards shown on it.
//! - Routes join/leave intents to the card's [`lounge_core::MembershipToggle`]
//!   and mutation results back to it.
//! - Drops results that arrive for a route or card that is no longer shown.

use lounge_core::{
    Identity, Lounge, LoungeId, MembershipIntent, Notification, SessionState, Ticket,
    ToggleAction, ToggleError,
};

use crate::{AppAction, AppEvent, LoadStatus, LoungeCard, LoungeQuery, Route};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Identity as last reported by the identity provider.
    session: SessionState,
    /// Page being shown.
    route: Route,
    /// Cards on the current page, in server order.
    cards: Vec<LoungeCard>,
    /// Progress of the read backing the current page.
    load: LoadStatus,
    /// A sign-in or sign-out request is in flight.
    auth_busy: bool,
    /// Most recent notification. `None` if nothing was reported yet.
    last_notification: Option<Notification>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an App on the home page with the session still loading.
    pub fn new() -> Self {
        Self {
            session: SessionState::Loading,
            route: Route::Home,
            cards: Vec::new(),
            load: LoadStatus::Idle,
            auth_busy: false,
            last_notification: None,
        }
    }

    /// Actions to run once at startup.
    pub fn start(&self) -> Vec<AppAction> {
        vec![AppAction::RefreshSession, AppAction::Render]
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Navigate(route) => self.navigate(route),
            AppEvent::Toggle { lounge_id } => self.toggle_membership(lounge_id),
            AppEvent::SetMembership { lounge_id, intent } => self.set_membership(lounge_id, intent),
            AppEvent::SignIn { email } => self.sign_in(email),
            AppEvent::SignOut => self.sign_out(),
            AppEvent::Quit => self.quit(),
            AppEvent::SessionChanged(session) => self.session_changed(session),
            AppEvent::SessionFailed { reason } => {
                let mut actions =
                    vec![self.notify(Notification::error(format!("Failed to load session: {reason}")))];
                actions.extend(self.session_changed(SessionState::SignedOut));
                actions
            },
            AppEvent::LoungesLoaded { query, lounges } => self.lounges_loaded(query, lounges),
            AppEvent::LoadFailed { query, reason } => {
                if !self.is_current(&query) {
                    tracing::debug!(?query, "dropping failure for a page no longer shown");
                    return vec![];
                }
                self.cards.clear();
                self.load = LoadStatus::Failed(reason.clone());
                vec![
                    self.notify(Notification::error(format!("Failed to load lounges: {reason}"))),
                    AppAction::Render,
                ]
            },
            AppEvent::MutationCompleted { lounge_id, ticket, result } => {
                self.mutation_completed(lounge_id, ticket, result)
            },
            AppEvent::MagicLinkSent { email } => {
                self.auth_busy = false;
                tracing::debug!(%email, "magic link sent");
                vec![
                    self.notify(Notification::success("Check your email for a magic link!")),
                    AppAction::Render,
                ]
            },
            AppEvent::SignInFailed { reason } => {
                self.auth_busy = false;
                vec![self.notify(Notification::error(reason)), AppAction::Render]
            },
            AppEvent::SignedOut => {
                self.auth_busy = false;
                let mut actions = vec![self.notify(Notification::success("Successfully signed out"))];
                actions.extend(self.session_changed(SessionState::SignedOut));
                actions
            },
            AppEvent::SignOutFailed { reason } => {
                self.auth_busy = false;
                tracing::warn!(%reason, "sign-out failed");
                vec![self.notify(Notification::error("Failed to sign out")), AppAction::Render]
            },
        }
    }

    /// Show a different page, replacing the current cards.
    ///
    /// Pending mutations on the old cards keep running; their results are
    /// dropped when they arrive.
    pub fn navigate(&mut self, route: Route) -> Vec<AppAction> {
        self.route = route;
        self.cards.clear();
        self.reload()
    }

    /// Flip membership of a displayed lounge.
    pub fn toggle_membership(&mut self, lounge_id: LoungeId) -> Vec<AppAction> {
        let identity = self.session.identity().cloned();
        let Some(card) = self.card_mut(lounge_id) else {
            tracing::debug!(lounge = %lounge_id, "toggle for a lounge not shown");
            return vec![];
        };
        let result = card.toggle_mut().toggle(identity.as_ref());
        self.after_toggle(lounge_id, result)
    }

    /// Join or leave a displayed lounge.
    pub fn set_membership(&mut self, lounge_id: LoungeId, intent: MembershipIntent) -> Vec<AppAction> {
        let identity = self.session.identity().cloned();
        let Some(card) = self.card_mut(lounge_id) else {
            tracing::debug!(lounge = %lounge_id, %intent, "membership change for a lounge not shown");
            return vec![];
        };
        let title = card.lounge().title.clone();
        match card.toggle_mut().request(intent, identity.as_ref()) {
            Err(ToggleError::AlreadyInState { intent }) => {
                let message = match intent {
                    MembershipIntent::Join => format!("Already a member of {title}"),
                    MembershipIntent::Leave => format!("Not a member of {title}"),
                };
                vec![self.notify(Notification::info(message)), AppAction::Render]
            },
            result => self.after_toggle(lounge_id, result),
        }
    }

    /// Request a magic sign-in link.
    pub fn sign_in(&mut self, email: String) -> Vec<AppAction> {
        self.auth_busy = true;
        vec![AppAction::SendMagicLink { email }, AppAction::Render]
    }

    /// End the session.
    pub fn sign_out(&mut self) -> Vec<AppAction> {
        self.auth_busy = true;
        vec![AppAction::SignOut, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    fn session_changed(&mut self, session: SessionState) -> Vec<AppAction> {
        let before = self.session.identity().map(|identity| identity.user_id);
        let after = session.identity().map(|identity| identity.user_id);
        self.session = session;

        // Membership flags are per viewer, so a different viewer means a
        // different page.
        let viewer_changed = before != after;
        let waiting_for_session = self.load == LoadStatus::SignInRequired && after.is_some();

        if viewer_changed || waiting_for_session {
            self.cards.clear();
            return self.reload();
        }
        vec![AppAction::Render]
    }

    /// Issue the read for the current route, if it has one.
    fn reload(&mut self) -> Vec<AppAction> {
        match self.route.query() {
            None => {
                self.load = LoadStatus::Idle;
                vec![AppAction::Render]
            },
            Some(LoungeQuery::Mine) if self.session.identity().is_none() => {
                self.load = LoadStatus::SignInRequired;
                vec![AppAction::Render]
            },
            Some(query) => {
                self.load = LoadStatus::Loading;
                vec![AppAction::Load(query), AppAction::Render]
            },
        }
    }

    fn lounges_loaded(&mut self, query: LoungeQuery, lounges: Vec<Lounge>) -> Vec<AppAction> {
        if !self.is_current(&query) || self.load != LoadStatus::Loading {
            tracing::debug!(?query, "dropping rows for a page no longer shown");
            return vec![];
        }

        if lounges.is_empty() && matches!(query, LoungeQuery::BySlug(_)) {
            self.cards.clear();
            self.load = LoadStatus::NotFound;
            return vec![AppAction::Render];
        }

        // A detail lookup shows only the first row.
        let take = if matches!(query, LoungeQuery::BySlug(_)) { 1 } else { lounges.len() };
        self.cards = lounges.into_iter().take(take).map(LoungeCard::new).collect();
        self.load = LoadStatus::Loaded;
        vec![AppAction::Render]
    }

    fn mutation_completed(
        &mut self,
        lounge_id: LoungeId,
        ticket: Ticket,
        result: Result<(), String>,
    ) -> Vec<AppAction> {
        let Some(card) = self.card_mut(lounge_id) else {
            tracing::debug!(lounge = %lounge_id, %ticket, "dropping result for a card no longer shown");
            return vec![];
        };
        let result = card.toggle_mut().complete(ticket, result);
        self.after_toggle(lounge_id, result)
    }

    /// Translate toggle output into app actions.
    fn after_toggle(
        &mut self,
        lounge_id: LoungeId,
        result: Result<Vec<ToggleAction>, ToggleError>,
    ) -> Vec<AppAction> {
        let toggle_actions = match result {
            Ok(actions) => actions,
            Err(err) => {
                tracing::debug!(lounge = %lounge_id, %err, "toggle request ignored");
                return vec![];
            },
        };

        let mut actions = Vec::with_capacity(toggle_actions.len());
        for action in toggle_actions {
            match action {
                ToggleAction::RequireSignIn => {
                    actions.push(AppAction::Redirect { to: Route::SignIn });
                    actions.extend(self.navigate(Route::SignIn));
                },
                ToggleAction::Mutate(request) => actions.push(AppAction::Mutate(request)),
                ToggleAction::Notify(notification) => actions.push(self.notify(notification)),
                ToggleAction::Render => actions.push(AppAction::Render),
            }
        }
        actions
    }

    fn notify(&mut self, notification: Notification) -> AppAction {
        self.last_notification = Some(notification.clone());
        AppAction::Notify(notification)
    }

    fn is_current(&self, query: &LoungeQuery) -> bool {
        self.route.query().as_ref() == Some(query)
    }

    fn card_mut(&mut self, lounge_id: LoungeId) -> Option<&mut LoungeCard> {
        self.cards.iter_mut().find(|card| card.lounge().id == lounge_id)
    }

    /// Session as last reported.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Signed-in identity. `None` while loading or signed out.
    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    /// Page being shown.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Cards on the current page, in server order.
    pub fn cards(&self) -> &[LoungeCard] {
        &self.cards
    }

    /// Card for a lounge on the current page.
    pub fn card(&self, lounge_id: LoungeId) -> Option<&LoungeCard> {
        self.cards.iter().find(|card| card.lounge().id == lounge_id)
    }

    /// Card for a slug on the current page.
    pub fn card_by_slug(&self, slug: &str) -> Option<&LoungeCard> {
        self.cards.iter().find(|card| card.lounge().slug == slug)
    }

    /// Progress of the read backing the current page.
    pub fn load_status(&self) -> &LoadStatus {
        &self.load
    }

    /// A sign-in or sign-out request is in flight.
    pub fn is_auth_busy(&self) -> bool {
        self.auth_busy
    }

    /// Most recent notification. `None` if nothing was reported yet.
    pub fn last_notification(&self) -> Option<&Notification> {
        self.last_notification.as_ref()
    }
}
