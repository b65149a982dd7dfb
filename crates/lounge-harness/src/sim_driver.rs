//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`lounge_app::Runtime`] orchestration code runs in both production and
//! simulation.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use lounge_app::{App, AppEvent, Driver, Route};
use lounge_core::Notification;

use crate::invariants::{AppSnapshot, InvariantRegistry};

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("SimDriverError: {0}")]
pub struct SimDriverError(pub String);

/// Shared state for event injection and output capture.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    renders: Vec<AppSnapshot>,
    notifications: Vec<Notification>,
    redirects: Vec<Route>,
    stopped: bool,
}

/// Simulation driver for deterministic testing.
///
/// Input is a queue of scripted [`AppEvent`]s; once it is empty the driver
/// reports input as exhausted. Every render is captured as an
/// [`AppSnapshot`] and, when enabled, checked against an
/// [`InvariantRegistry`].
///
/// By default the next event is delivered as soon as it is polled, so every
/// scripted event reaches the App before any spawned mutation gets to run on
/// a current-thread runtime. [`Self::settle_between_events`] yields to the
/// runtime first instead, letting in-flight mutations finish between events.
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<InvariantRegistry>,
    settle: bool,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(SharedState::default())), invariants: None, settle: false }
    }

    /// Create a driver with a scripted event queue.
    pub fn scripted(events: impl IntoIterator<Item = AppEvent>) -> Self {
        let driver = Self::new();
        for event in events {
            driver.inject_event(event);
        }
        driver
    }

    /// Enable invariant checking.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Yield to the runtime before delivering each event.
    #[must_use]
    pub fn settle_between_events(mut self) -> Self {
        self.settle = true;
        self
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().expect("Mutex poisoned")
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.lock().pending_events.is_empty()
    }

    /// Every render so far, oldest first.
    pub fn renders(&self) -> Vec<AppSnapshot> {
        self.lock().renders.clone()
    }

    /// Most recent render.
    pub fn last_render(&self) -> Option<AppSnapshot> {
        self.lock().renders.last().cloned()
    }

    /// Every notification shown so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    /// Every redirect so far, oldest first.
    pub fn redirects(&self) -> Vec<Route> {
        self.lock().redirects.clone()
    }

    /// Whether the runtime stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            registry.assert_all(&AppSnapshot::from_app(app), context);
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self, _app: &App) -> Result<Option<AppEvent>, Self::Error> {
        if self.settle {
            tokio::task::yield_now().await;
        }
        let event = self.lock().pending_events.pop_front();
        if let Some(event) = &event {
            tracing::trace!(?event, "delivering scripted event");
        }
        Ok(event)
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let snapshot = AppSnapshot::from_app(app);
        let context = {
            let mut state = self.lock();
            if state.stopped {
                return Err(SimDriverError("render after stop".into()));
            }
            state.renders.push(snapshot);
            format!("at render #{} ({})", state.renders.len(), app.route())
        };
        self.check_invariants(app, &context);
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), Self::Error> {
        self.lock().notifications.push(notification.clone());
        Ok(())
    }

    fn redirect(&mut self, route: &Route) -> Result<(), Self::Error> {
        self.lock().redirects.push(route.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::new();
        driver.inject_event(AppEvent::Navigate(Route::Lounges));

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn poll_event_drains_in_order() {
        let mut driver =
            SimDriver::scripted([AppEvent::Navigate(Route::Lounges), AppEvent::Quit]);
        let app = App::new();

        assert_eq!(
            driver.poll_event(&app).await.unwrap(),
            Some(AppEvent::Navigate(Route::Lounges))
        );
        assert_eq!(driver.poll_event(&app).await.unwrap(), Some(AppEvent::Quit));
        assert_eq!(driver.poll_event(&app).await.unwrap(), None);
    }

    #[test]
    fn render_captures_snapshot() {
        let mut driver = SimDriver::new().with_invariants(InvariantRegistry::standard());
        let mut app = App::new();
        app.navigate(Route::Lounges);

        driver.render(&app).unwrap();

        let render = driver.last_render().unwrap();
        assert_eq!(render.route, "/lounges");
        assert!(render.cards.is_empty());
    }

    #[test]
    fn render_after_stop_fails() {
        let mut driver = SimDriver::new();
        driver.stop();

        assert!(driver.is_stopped());
        assert!(driver.render(&App::new()).is_err());
    }
}
