//! Boundary error types.
//!
//! Store, identity provider and mutator errors are kept apart so callers can
//! tell "the row could not be written" from "nobody is signed in". The
//! `Display` text of [`StoreError`] and [`MutationError`] is what the user
//! sees in a failure notification, so it carries the backend's own message
//! without a prefix.

use thiserror::Error;

/// Errors from the relational store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Unique constraint violation (e.g. joining twice).
    #[error("{message}")]
    Conflict {
        /// Backend message.
        message: String,
    },

    /// Request lacked a valid session.
    #[error("{message}")]
    Unauthorized {
        /// Backend message.
        message: String,
    },

    /// Any other rejection by the backend (RLS, foreign key, bad RPC args).
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Backend error code (Postgres SQLSTATE for PostgREST), if any.
        code: Option<String>,
        /// Backend message.
        message: String,
    },

    /// Request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Returns true if the same request may succeed on retry.
    ///
    /// Only transport failures qualify; anything the backend answered is a
    /// definitive rejection.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Errors from the identity provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email address rejected before any request was made.
    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    /// Provider answered with an error.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// Request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Outcome of a failed join or leave.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// No session, or the session was rejected by the store.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Store refused or could not be reached.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for MutationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized { .. } => Self::NotAuthenticated,
            other => Self::Store(other),
        }
    }
}

/// Invalid backend configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL could not be parsed or cannot be a base.
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidUrl {
        /// URL as given.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Http(String),
}
