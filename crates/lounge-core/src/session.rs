//! Session state supplied by the identity provider.
//!
//! The session is passed explicitly into every operation that needs it, so
//! the toggle state machine never looks up a current user on its own.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned user ID.
    #[serde(rename = "id")]
    pub user_id: UserId,
    /// Email the magic link was sent to. Absent for phone-only accounts.
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    /// Create an identity.
    pub fn new(user_id: UserId, email: impl Into<Option<String>>) -> Self {
        Self { user_id, email: email.into() }
    }
}

/// Session as observed by the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Provider has not answered yet.
    #[default]
    Loading,
    /// No authenticated user.
    SignedOut,
    /// Authenticated.
    SignedIn(Identity),
}

impl SessionState {
    /// Authenticated identity, if any. `Loading` counts as absent.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::Loading | Self::SignedOut => None,
        }
    }

    /// Whether the provider is still resolving the session.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl From<Option<Identity>> for SessionState {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or(Self::SignedOut, Self::SignedIn)
    }
}
