//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User intents, delivered by the driver.
//! - Backend results, delivered by the runtime after executing an action.

use lounge_core::{Lounge, LoungeId, MembershipIntent, SessionState, Ticket};

use crate::{LoungeQuery, Route};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Go to a page.
    Navigate(Route),

    /// Flip membership of a displayed lounge.
    Toggle {
        /// Lounge whose card was activated.
        lounge_id: LoungeId,
    },

    /// Join or leave a displayed lounge explicitly.
    SetMembership {
        /// Target lounge.
        lounge_id: LoungeId,
        /// Join or leave.
        intent: MembershipIntent,
    },

    /// Submit the email sign-in form.
    SignIn {
        /// Address typed by the user.
        email: String,
    },

    /// Sign out.
    SignOut,

    /// Quit the application.
    Quit,

    /// Identity provider reported the current session.
    SessionChanged(SessionState),

    /// Session could not be determined.
    SessionFailed {
        /// Failure description.
        reason: String,
    },

    /// A read finished.
    LoungesLoaded {
        /// Read that produced the rows.
        query: LoungeQuery,
        /// Rows in server order.
        lounges: Vec<Lounge>,
    },

    /// A read failed.
    LoadFailed {
        /// Read that failed.
        query: LoungeQuery,
        /// Failure description.
        reason: String,
    },

    /// A membership mutation finished.
    MutationCompleted {
        /// Lounge the mutation targeted.
        lounge_id: LoungeId,
        /// Ticket from the originating request.
        ticket: Ticket,
        /// `Err` carries the user-facing failure reason.
        result: Result<(), String>,
    },

    /// Magic link accepted by the identity provider.
    MagicLinkSent {
        /// Recipient address.
        email: String,
    },

    /// Magic link request failed.
    SignInFailed {
        /// Failure description.
        reason: String,
    },

    /// Session ended.
    SignedOut,

    /// Sign-out request failed.
    SignOutFailed {
        /// Failure description.
        reason: String,
    },
}
