//! Chaotic store wrapper for fault injection testing
//!
//! Store wrapper that randomly fails operations to exercise rollback paths.
//! Failures are injected before the inner store is called, so an injected
//! failure never leaves a partial write behind.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::{
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use lounge_core::{Identity, Lounge, Membership};

use crate::{AuthError, IdentityProvider, MembershipStore, StoreError};

/// Chaotic store wrapper that randomly injects failures
///
/// Delegates to an underlying store but fails operations with
/// [`StoreError::Transport`] based on a configured failure rate. Identity
/// provider calls are passed through untouched.
#[derive(Clone)]
pub struct ChaoticStore<S> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    /// Store operations attempted
    operation_count: Arc<AtomicUsize>,
    /// Store operations that were failed on purpose
    injected_count: Arc<AtomicUsize>,
}

/// Simple deterministic RNG for chaos injection
///
/// Linear congruential generator, so chaos runs are reproducible with the
/// same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // LCG constants from Numerical Recipes
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }

    fn should_fail(&mut self, failure_rate: f64) -> bool {
        self.next() < failure_rate
    }
}

impl<S> ChaoticStore<S> {
    /// Create a chaotic wrapper with the default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Create with explicit seed for reproducible chaos
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    #[allow(clippy::panic)]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operation_count: Arc::new(AtomicUsize::new(0)),
            injected_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying store (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of store operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operation_count.load(Ordering::Relaxed)
    }

    /// Number of operations failed by injection.
    pub fn injected_count(&self) -> usize {
        self.injected_count.load(Ordering::Relaxed)
    }

    /// Count the operation and decide whether it fails.
    fn roll(&self, operation: &'static str) -> Result<(), StoreError> {
        self.operation_count.fetch_add(1, Ordering::Relaxed);

        #[allow(clippy::expect_used)]
        let fail =
            self.rng.lock().expect("ChaoticRng mutex poisoned").should_fail(self.failure_rate);

        if fail {
            self.injected_count.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(operation, "injecting store failure");
            return Err(StoreError::Transport(format!("injected failure during {operation}")));
        }
        Ok(())
    }
}

impl<S: MembershipStore> MembershipStore for ChaoticStore<S> {
    fn insert_membership(
        &self,
        membership: Membership,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let rolled = self.roll("insert_membership");
        async move {
            rolled?;
            self.inner.insert_membership(membership).await
        }
    }

    fn delete_membership(
        &self,
        membership: Membership,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let rolled = self.roll("delete_membership");
        async move {
            rolled?;
            self.inner.delete_membership(membership).await
        }
    }

    fn lounges_with_membership(
        &self,
    ) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send {
        let rolled = self.roll("lounges_with_membership");
        async move {
            rolled?;
            self.inner.lounges_with_membership().await
        }
    }

    fn my_lounges(&self) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send {
        let rolled = self.roll("my_lounges");
        async move {
            rolled?;
            self.inner.my_lounges().await
        }
    }

    fn lounge_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send {
        let rolled = self.roll("lounge_by_slug");
        async move {
            rolled?;
            self.inner.lounge_by_slug(slug).await
        }
    }
}

impl<S: IdentityProvider> IdentityProvider for ChaoticStore<S> {
    fn current_user(&self) -> impl Future<Output = Result<Option<Identity>, AuthError>> + Send {
        self.inner.current_user()
    }

    fn sign_in_with_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send {
        self.inner.sign_in_with_email(email)
    }

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send {
        self.inner.sign_out()
    }
}
