//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use lounge_core::{MutationRequest, Notification};

use crate::{LoungeQuery, Route};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Navigation happened on the user's behalf.
    Redirect {
        /// Where the user was sent.
        to: Route,
    },

    /// Read lounges for the current route.
    Load(LoungeQuery),

    /// Execute a membership mutation and report back with
    /// [`crate::AppEvent::MutationCompleted`].
    Mutate(MutationRequest),

    /// Request a magic sign-in link.
    SendMagicLink {
        /// Recipient address, as typed.
        email: String,
    },

    /// End the current session.
    SignOut,

    /// Fetch the current identity from the identity provider.
    RefreshSession,

    /// Show a transient notification.
    Notify(Notification),
}
