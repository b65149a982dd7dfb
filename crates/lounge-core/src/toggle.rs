//! Membership toggle state machine.
//!
//! One [`MembershipToggle`] backs one rendered lounge card. It turns a join or
//! leave intent into an optimistic local update plus a [`MutationRequest`] for
//! the caller to execute, then reconciles when the caller reports the result
//! through [`MembershipToggle::complete`].
//!
//! ```text
//!            toggle()                    complete(Ok)
//!   Idle ───────────────▶ Pending ──────────────────────▶ Idle (optimistic kept)
//!                            │
//!                            │        complete(Err)
//!                            └──────────────────────────▶ Idle (snapshot restored)
//! ```
//!
//! The machine is Sans-IO: it never calls the store. The caller owns the
//! mutation and must feed back exactly the ticket it was handed.
//!
//! # Invariants
//!
//! - `is_loading` is true exactly while a ticket is pending.
//! - A failed mutation restores the state captured before the toggle, field
//!   for field.
//! - At most one mutation is pending per card; further toggles are rejected
//!   with [`ToggleError::Pending`].

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{Identity, Lounge, LoungeId, Membership, Notification, ToggleError};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Direction of a membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipIntent {
    /// Insert a membership row.
    Join,
    /// Delete the membership row.
    Leave,
}

impl MembershipIntent {
    /// Lower-case verb, as used in notifications.
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
        }
    }

    /// Membership flag once this intent has been applied.
    pub const fn target_is_member(self) -> bool {
        matches!(self, Self::Join)
    }

    /// Intent that flips the given membership flag.
    pub const fn flipping(is_member: bool) -> Self {
        if is_member { Self::Leave } else { Self::Join }
    }
}

impl fmt::Display for MembershipIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Handle correlating a mutation result with the toggle that issued it.
///
/// Unique within the process, so a result can never be mistaken for one
/// issued by a different card or by an earlier incarnation of the same card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    fn next() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ticket #{}", self.0)
    }
}

/// Mutation the caller must perform against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRequest {
    /// Ticket to hand back to [`MembershipToggle::complete`].
    pub ticket: Ticket,
    /// Insert or delete.
    pub intent: MembershipIntent,
    /// Row to insert or delete.
    pub membership: Membership,
}

/// Observable per-card state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    /// Viewer is (or is optimistically) a member.
    pub is_member: bool,
    /// Displayed member count.
    pub member_count: u64,
    /// A mutation is in flight. Trigger controls should be disabled.
    pub is_loading: bool,
}

impl ToggleState {
    /// Idle state with the given values.
    pub const fn idle(is_member: bool, member_count: u64) -> Self {
        Self { is_member, member_count, is_loading: false }
    }
}

/// Side effects requested by the toggle state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAction {
    /// No authenticated identity; send the user to sign in.
    RequireSignIn,
    /// Execute a store mutation and report back via `complete`.
    Mutate(MutationRequest),
    /// Show a transient notification.
    Notify(Notification),
    /// State changed; re-render the card.
    Render,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: Ticket,
    intent: MembershipIntent,
    before: ToggleState,
}

/// Optimistic join/leave state machine for one lounge card.
#[derive(Debug, Clone)]
pub struct MembershipToggle {
    lounge_id: LoungeId,
    state: ToggleState,
    pending: Option<Pending>,
}

impl MembershipToggle {
    /// Create an idle toggle from server-supplied values.
    pub fn new(lounge_id: LoungeId, is_member: bool, member_count: u64) -> Self {
        Self { lounge_id, state: ToggleState::idle(is_member, member_count), pending: None }
    }

    /// Create an idle toggle for a lounge row.
    pub fn from_lounge(lounge: &Lounge) -> Self {
        Self::new(lounge.id, lounge.is_member, lounge.member_count)
    }

    /// Flip membership: leave if currently a member, join otherwise.
    pub fn toggle(&mut self, identity: Option<&Identity>) -> Result<Vec<ToggleAction>, ToggleError> {
        let intent = MembershipIntent::flipping(self.state.is_member);
        self.apply(intent, identity)
    }

    /// Request an explicit intent.
    ///
    /// Unlike [`Self::toggle`], a join while already a member (or a leave
    /// while not one) is rejected instead of being turned around.
    pub fn request(
        &mut self,
        intent: MembershipIntent,
        identity: Option<&Identity>,
    ) -> Result<Vec<ToggleAction>, ToggleError> {
        if identity.is_some()
            && self.pending.is_none()
            && self.state.is_member == intent.target_is_member()
        {
            return Err(ToggleError::AlreadyInState { intent });
        }
        self.apply(intent, identity)
    }

    fn apply(
        &mut self,
        intent: MembershipIntent,
        identity: Option<&Identity>,
    ) -> Result<Vec<ToggleAction>, ToggleError> {
        let Some(identity) = identity else {
            tracing::debug!(lounge = %self.lounge_id, "toggle without identity, sign-in required");
            return Ok(vec![ToggleAction::RequireSignIn]);
        };

        if let Some(pending) = self.pending {
            return Err(ToggleError::Pending { ticket: pending.ticket });
        }

        let before = self.state;
        let ticket = Ticket::next();

        self.state = match intent {
            MembershipIntent::Join => ToggleState {
                is_member: true,
                member_count: before.member_count.saturating_add(1),
                is_loading: true,
            },
            MembershipIntent::Leave => ToggleState {
                is_member: false,
                member_count: before.member_count.saturating_sub(1),
                is_loading: true,
            },
        };
        self.pending = Some(Pending { ticket, intent, before });

        tracing::debug!(lounge = %self.lounge_id, %intent, %ticket, "optimistic update applied");

        let request = MutationRequest {
            ticket,
            intent,
            membership: Membership::new(identity.user_id, self.lounge_id),
        };
        Ok(vec![ToggleAction::Mutate(request), ToggleAction::Render])
    }

    /// Resolve the pending mutation.
    ///
    /// On success the optimistic state is kept. On failure the pre-toggle
    /// snapshot is restored and the error is reported in the notification.
    pub fn complete<E: fmt::Display>(
        &mut self,
        ticket: Ticket,
        result: Result<(), E>,
    ) -> Result<Vec<ToggleAction>, ToggleError> {
        let pending = match self.pending {
            Some(pending) if pending.ticket == ticket => pending,
            _ => return Err(ToggleError::StaleTicket { ticket }),
        };
        self.pending = None;

        let notification = match result {
            Ok(()) => {
                self.state.is_loading = false;
                tracing::debug!(lounge = %self.lounge_id, %ticket, "mutation confirmed");
                match pending.intent {
                    MembershipIntent::Join => Notification::success("Successfully joined the lounge"),
                    MembershipIntent::Leave => Notification::success("Successfully left the lounge"),
                }
            },
            Err(reason) => {
                self.state = pending.before;
                self.state.is_loading = false;
                tracing::debug!(lounge = %self.lounge_id, %ticket, %reason, "mutation failed, reverted");
                Notification::error(format!("Failed to {} lounge: {reason}", pending.intent))
            },
        };

        Ok(vec![ToggleAction::Notify(notification), ToggleAction::Render])
    }

    /// Re-initialize from fresh server values.
    ///
    /// Any pending ticket is forgotten; its result will be rejected as stale.
    pub fn reset(&mut self, is_member: bool, member_count: u64) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(lounge = %self.lounge_id, ticket = %pending.ticket, "pending mutation abandoned");
        }
        self.state = ToggleState::idle(is_member, member_count);
    }

    /// Lounge this toggle belongs to.
    pub fn lounge_id(&self) -> LoungeId {
        self.lounge_id
    }

    /// Current observable state.
    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Ticket of the in-flight mutation. `None` when idle.
    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending.map(|p| p.ticket)
    }

    /// Intent of the in-flight mutation. `None` when idle.
    pub fn pending_intent(&self) -> Option<MembershipIntent> {
        self.pending.map(|p| p.intent)
    }
}
