//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific input and output, while the generic [`crate::Runtime`]
//! handles all orchestration and talks to the backend.

use std::future::Future;

use lounge_core::Notification;

use crate::{App, AppEvent, Route};

/// Abstracts user-facing I/O for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal client and simulation.
///
/// # Implementations
///
/// - **Terminal**: scripted commands in, plain text out
/// - **Simulation**: scripted events, captured output, invariant checks
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next user intent.
    ///
    /// Returns `None` once input is exhausted. The runtime keeps running
    /// until in-flight mutations settle, without polling again.
    ///
    /// The returned future may be dropped before completion when a mutation
    /// result arrives first, so it must not lose events when cancelled.
    fn poll_event(
        &mut self,
        app: &App,
    ) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Show a transient notification.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    fn notify(&mut self, notification: &Notification) -> Result<(), Self::Error>;

    /// The application navigated on the user's behalf.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    fn redirect(&mut self, route: &Route) -> Result<(), Self::Error>;

    /// Clean up resources.
    fn stop(&mut self);
}
