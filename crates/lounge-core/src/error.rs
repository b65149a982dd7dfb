//! Toggle state machine errors.

use thiserror::Error;

use crate::toggle::{MembershipIntent, Ticket};

/// Requests the [`crate::MembershipToggle`] refuses to act on.
///
/// None of these change state; the caller may simply drop them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleError {
    /// A mutation is already in flight for this card.
    #[error("membership change already pending ({ticket})")]
    Pending {
        /// Ticket of the in-flight mutation.
        ticket: Ticket,
    },

    /// The requested intent is already reflected by the current state.
    #[error("cannot {intent}: already in that state")]
    AlreadyInState {
        /// Intent that was requested.
        intent: MembershipIntent,
    },

    /// Completion for a mutation this card is no longer waiting on.
    ///
    /// Happens after [`crate::MembershipToggle::reset`] or when a result is
    /// delivered twice.
    #[error("stale mutation result ({ticket})")]
    StaleTicket {
        /// Ticket carried by the result.
        ticket: Ticket,
    },
}
