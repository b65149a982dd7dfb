//! Membership mutator.
//!
//! One store call per operation and nothing else. Idempotency is not
//! provided: joining twice surfaces the store's uniqueness error, and callers
//! rely on the toggle's `is_member` flag to avoid redundant calls.

use lounge_core::{LoungeId, Membership, MembershipIntent, MutationRequest, UserId};

use crate::{MembershipStore, MutationError};

/// Executes join and leave mutations against a [`MembershipStore`].
#[derive(Debug, Clone)]
pub struct MembershipMutator<S> {
    store: S,
}

impl<S: MembershipStore> MembershipMutator<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Insert the `(user_id, lounge_id)` membership row.
    pub async fn join(&self, user_id: UserId, lounge_id: LoungeId) -> Result<(), MutationError> {
        let membership = Membership::new(user_id, lounge_id);
        tracing::debug!(user = %user_id, lounge = %lounge_id, "joining lounge");

        self.store.insert_membership(membership).await.map_err(|err| {
            tracing::warn!(user = %user_id, lounge = %lounge_id, %err, "join failed");
            MutationError::from(err)
        })
    }

    /// Delete the `(user_id, lounge_id)` membership row.
    pub async fn leave(&self, user_id: UserId, lounge_id: LoungeId) -> Result<(), MutationError> {
        let membership = Membership::new(user_id, lounge_id);
        tracing::debug!(user = %user_id, lounge = %lounge_id, "leaving lounge");

        self.store.delete_membership(membership).await.map_err(|err| {
            tracing::warn!(user = %user_id, lounge = %lounge_id, %err, "leave failed");
            MutationError::from(err)
        })
    }

    /// Execute a request produced by the toggle state machine.
    pub async fn apply(&self, request: &MutationRequest) -> Result<(), MutationError> {
        let Membership { user_id, lounge_id } = request.membership;
        match request.intent {
            MembershipIntent::Join => self.join(user_id, lounge_id).await,
            MembershipIntent::Leave => self.leave(user_id, lounge_id).await,
        }
    }
}
