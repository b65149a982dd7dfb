//! Reference model of one lounge card.

use lounge_core::{MembershipIntent, ToggleState};

use super::ToggleOp;

/// What the model expects an operation to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOutcome {
    /// No identity: the user is sent to sign in and nothing changes.
    RequireSignIn,
    /// A mutation with this intent was issued.
    Mutate(MembershipIntent),
    /// The request was refused without changing state.
    Rejected,
    /// The pending mutation resolved.
    Completed {
        /// The notification reports a failure.
        failed: bool,
    },
    /// Nothing observable happened.
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    before_is_member: bool,
    before_count: u64,
}

/// Reference model of a card's membership toggle.
#[derive(Debug, Clone)]
pub struct ToggleModel {
    is_member: bool,
    member_count: u64,
    pending: Option<Pending>,
}

impl ToggleModel {
    /// Model of an idle card.
    pub fn new(is_member: bool, member_count: u64) -> Self {
        Self { is_member, member_count, pending: None }
    }

    /// Apply an operation, returning the expected outcome.
    pub fn apply(&mut self, op: ToggleOp) -> ModelOutcome {
        match op {
            ToggleOp::Toggle { signed_in } => {
                let join = !self.is_member;
                self.start(join, signed_in)
            },
            ToggleOp::Request { join, signed_in } => {
                if signed_in && self.pending.is_none() && self.is_member == join {
                    return ModelOutcome::Rejected;
                }
                self.start(join, signed_in)
            },
            ToggleOp::Complete { success } => match self.pending.take() {
                None => ModelOutcome::Ignored,
                Some(_) if success => ModelOutcome::Completed { failed: false },
                Some(pending) => {
                    self.is_member = pending.before_is_member;
                    self.member_count = pending.before_count;
                    ModelOutcome::Completed { failed: true }
                },
            },
            ToggleOp::CompleteStale { .. } => ModelOutcome::Ignored,
            ToggleOp::Reset { is_member, member_count } => {
                self.is_member = is_member;
                self.member_count = u64::from(member_count);
                self.pending = None;
                ModelOutcome::Ignored
            },
        }
    }

    fn start(&mut self, join: bool, signed_in: bool) -> ModelOutcome {
        if !signed_in {
            return ModelOutcome::RequireSignIn;
        }
        if self.pending.is_some() {
            return ModelOutcome::Rejected;
        }

        self.pending =
            Some(Pending { before_is_member: self.is_member, before_count: self.member_count });
        self.is_member = join;
        if join {
            self.member_count += 1;
            ModelOutcome::Mutate(MembershipIntent::Join)
        } else {
            self.member_count = self.member_count.saturating_sub(1);
            ModelOutcome::Mutate(MembershipIntent::Leave)
        }
    }

    /// Observable state the real toggle must match.
    pub fn observable(&self) -> ToggleState {
        ToggleState {
            is_member: self.is_member,
            member_count: self.member_count,
            is_loading: self.pending.is_some(),
        }
    }

    /// A mutation is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_leave_at_zero_restores_snapshot() {
        let mut model = ToggleModel::new(true, 0);
        assert_eq!(
            model.apply(ToggleOp::Toggle { signed_in: true }),
            ModelOutcome::Mutate(MembershipIntent::Leave)
        );
        assert_eq!(model.observable(), ToggleState { is_member: false, member_count: 0, is_loading: true });

        model.apply(ToggleOp::Complete { success: false });
        assert_eq!(model.observable(), ToggleState::idle(true, 0));
    }

    #[test]
    fn reset_drops_pending() {
        let mut model = ToggleModel::new(false, 1);
        model.apply(ToggleOp::Toggle { signed_in: true });
        model.apply(ToggleOp::Reset { is_member: false, member_count: 2 });

        assert!(!model.is_pending());
        assert_eq!(model.apply(ToggleOp::Complete { success: true }), ModelOutcome::Ignored);
    }
}
