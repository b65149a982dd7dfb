//! Operations for model-based testing.
//!
//! Operations represent everything that can happen to one lounge card. They
//! are generated randomly by proptest and applied to both the model and the
//! real state machine.

use proptest::prelude::*;

/// Operations that can be applied to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOp {
    /// User activates the join/leave control.
    Toggle {
        /// An identity is present.
        signed_in: bool,
    },

    /// User asks for a specific membership state.
    Request {
        /// Join if true, leave otherwise.
        join: bool,
        /// An identity is present.
        signed_in: bool,
    },

    /// The in-flight mutation finishes.
    Complete {
        /// Store accepted the mutation.
        success: bool,
    },

    /// A result arrives for a mutation the card no longer waits on.
    CompleteStale {
        /// Store accepted the mutation.
        success: bool,
    },

    /// The card is rebuilt from fresh server values.
    Reset {
        /// Server membership flag.
        is_member: bool,
        /// Server member count (kept small so floors are hit).
        member_count: u8,
    },
}

impl ToggleOp {
    /// Weighted strategy biased towards toggles and completions.
    pub fn strategy() -> impl Strategy<Value = Self> {
        prop_oneof![
            4 => any::<bool>().prop_map(|signed_in| Self::Toggle { signed_in }),
            2 => (any::<bool>(), any::<bool>())
                .prop_map(|(join, signed_in)| Self::Request { join, signed_in }),
            4 => any::<bool>().prop_map(|success| Self::Complete { success }),
            1 => any::<bool>().prop_map(|success| Self::CompleteStale { success }),
            1 => (any::<bool>(), 0u8..3)
                .prop_map(|(is_member, member_count)| Self::Reset { is_member, member_count }),
        ]
    }
}
