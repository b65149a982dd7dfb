//! Observable application state types.
//!
//! View-model types rendered by drivers: one [`LoungeCard`] per lounge on the
//! current page, and the [`LoadStatus`] of the read that produced them.

use lounge_core::{Lounge, MembershipToggle, ToggleState};

/// Progress of the read backing the current route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing to load (static page).
    #[default]
    Idle,
    /// Read in flight.
    Loading,
    /// Cards reflect the latest read.
    Loaded,
    /// Detail lookup matched no lounge.
    NotFound,
    /// Read failed. Cards are empty.
    Failed(String),
    /// Page requires an identity and there is none.
    SignInRequired,
}

/// One rendered lounge with its membership toggle.
///
/// The lounge row keeps the server-supplied values; [`Self::state`] is what
/// should be displayed.
#[derive(Debug, Clone)]
pub struct LoungeCard {
    lounge: Lounge,
    toggle: MembershipToggle,
}

impl LoungeCard {
    /// Card initialized from a server row.
    pub fn new(lounge: Lounge) -> Self {
        let toggle = MembershipToggle::from_lounge(&lounge);
        Self { lounge, toggle }
    }

    /// Server row the card was built from.
    pub fn lounge(&self) -> &Lounge {
        &self.lounge
    }

    /// Membership flag, member count and loading flag to display.
    pub fn state(&self) -> ToggleState {
        self.toggle.state()
    }

    /// Toggle state machine.
    pub fn toggle(&self) -> &MembershipToggle {
        &self.toggle
    }

    pub(crate) fn toggle_mut(&mut self) -> &mut MembershipToggle {
        &mut self.toggle
    }
}
