//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during system execution.
//! Unlike example-based tests that check specific scenarios, invariants
//! verify behavioral properties across all possible execution paths.
//!
//! # Architecture
//!
//! The invariant system extracts observable state from the App into an
//! [`AppSnapshot`], then runs registered [`Invariant`] checks against it.
//! Violations trigger panics with detailed context for debugging.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = AppSnapshot::from_app(&app);
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

use std::fmt;

pub use checks::{CardsMatchRoute, LoadingMatchesPending, OptimisticTarget};
pub use snapshot::{AppSnapshot, CardSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Identifies an invariant in violation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantKind {
    /// See [`LoadingMatchesPending`].
    LoadingMatchesPending,
    /// See [`OptimisticTarget`].
    OptimisticTarget,
    /// See [`CardsMatchRoute`].
    CardsMatchRoute,
}

impl fmt::Display for InvariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadingMatchesPending => "loading_matches_pending",
            Self::OptimisticTarget => "optimistic_target",
            Self::CardsMatchRoute => "cards_match_route",
        };
        f.write_str(name)
    }
}

/// Invariant violation with context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{invariant}: {message}")]
pub struct Violation {
    /// Violated invariant.
    pub invariant: InvariantKind,
    /// Description of what went wrong.
    pub message: String,
}

/// An invariant that can be checked against App state.
///
/// Invariants are behavioral properties that must always hold.
/// They capture WHAT must be true, not specific test scenarios.
pub trait Invariant: Send + Sync {
    /// Invariant identity for error reporting.
    fn kind(&self) -> InvariantKind;

    /// Check the invariant against the current state.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &AppSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
///
/// Collects multiple invariants and runs them all against App state.
/// Use [`InvariantRegistry::standard()`] for the common App invariants.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard App invariants.
    ///
    /// Includes:
    /// - [`LoadingMatchesPending`]: a card is loading iff a mutation is pending
    /// - [`OptimisticTarget`]: a pending card already shows its target state
    /// - [`CardsMatchRoute`]: the cards shown belong to the current page
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(LoadingMatchesPending);
        registry.add(OptimisticTarget);
        registry.add(CardsMatchRoute);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &AppSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking on first violation.
    ///
    /// Use this in tests where you want immediate failure with context.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, state: &AppSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            for violation in &violations {
                tracing::error!(
                    invariant = %violation.invariant,
                    route = %state.route,
                    %context,
                    "{}",
                    violation.message
                );
            }
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use lounge_app::LoadStatus;
    use lounge_core::LoungeId;

    use super::*;

    fn card(is_member: bool, is_loading: bool) -> CardSnapshot {
        CardSnapshot {
            lounge_id: LoungeId::new_v4(),
            slug: "rust".into(),
            server_is_member: false,
            server_member_count: 0,
            is_member,
            member_count: u64::from(is_member),
            is_loading,
            pending: None,
        }
    }

    fn snapshot(cards: Vec<CardSnapshot>) -> AppSnapshot {
        AppSnapshot {
            route: "/lounges".into(),
            query: Some(lounge_app::LoungeQuery::All),
            load: LoadStatus::Loaded,
            signed_in: true,
            cards,
        }
    }

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
    }

    #[test]
    fn consistent_snapshot_passes() {
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&snapshot(vec![card(false, false)])).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let registry = InvariantRegistry::standard();
        let mut bad = snapshot(vec![card(false, true)]);
        bad.load = LoadStatus::Loading;

        let violations = registry.check_all(&bad).unwrap_err();
        let kinds: Vec<_> = violations.iter().map(|v| v.invariant).collect();
        assert_eq!(kinds, vec![InvariantKind::LoadingMatchesPending, InvariantKind::CardsMatchRoute]);
    }

    #[test]
    #[should_panic(expected = "Invariant violation after toggle")]
    fn assert_all_panics_with_context() {
        let registry = InvariantRegistry::standard();
        registry.assert_all(&snapshot(vec![card(true, true)]), "after toggle");
    }
}
