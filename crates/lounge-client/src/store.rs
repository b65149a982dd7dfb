//! Boundary traits for the managed backend.
//!
//! The backend is two collaborators: a relational store reached through row
//! operations and stored procedures, and an identity provider doing
//! passwordless email sign-in. Both traits are async and return
//! `Send` futures so the runtime can execute mutations on spawned tasks.
//!
//! Implementations share their state internally (typically through `Arc`),
//! so clones talk to the same backend.

use std::future::Future;

use lounge_core::{Identity, Lounge, Membership};

use crate::{AuthError, StoreError};

/// Relational store holding lounges and memberships.
pub trait MembershipStore: Clone + Send + Sync + 'static {
    /// Insert a membership row.
    ///
    /// Fails with [`StoreError::Conflict`] if the row already exists.
    fn insert_membership(
        &self,
        membership: Membership,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete the row(s) matching both the user and the lounge.
    ///
    /// Deleting a row that does not exist is not an error.
    fn delete_membership(
        &self,
        membership: Membership,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// `rpc get_lounges_with_user_membership`: every lounge, annotated for
    /// the current viewer.
    fn lounges_with_membership(
        &self,
    ) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send;

    /// `rpc get_my_lounges`: lounges the current viewer belongs to.
    fn my_lounges(&self) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send;

    /// `rpc get_lounge_by_slug`: zero or one rows.
    fn lounge_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send;
}

/// Passwordless identity provider.
pub trait IdentityProvider: Clone + Send + Sync + 'static {
    /// Currently authenticated user. `None` if signed out or the session
    /// expired.
    fn current_user(&self) -> impl Future<Output = Result<Option<Identity>, AuthError>> + Send;

    /// Email a sign-in link. Creates the account on first use.
    fn sign_in_with_email(&self, email: &str)
    -> impl Future<Output = Result<(), AuthError>> + Send;

    /// End the current session.
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// A complete backend: store plus identity provider.
pub trait Backend: MembershipStore + IdentityProvider {}

impl<T: MembershipStore + IdentityProvider> Backend for T {}

/// Minimal syntactic check applied before asking a provider to send mail.
pub(crate) fn validate_email(email: &str) -> Result<&str, AuthError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(trimmed),
        _ => Err(AuthError::InvalidEmail(email.to_string())),
    }
}
