//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use lounge_app::{LoadStatus, LoungeQuery};

use super::{AppSnapshot, Invariant, InvariantKind, InvariantResult, Violation};

/// A card is loading exactly while a mutation is pending for it.
///
/// A stuck loading flag leaves the toggle disabled forever; a missing one
/// lets a second mutation race the first.
pub struct LoadingMatchesPending;

impl Invariant for LoadingMatchesPending {
    fn kind(&self) -> InvariantKind {
        InvariantKind::LoadingMatchesPending
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        for card in &state.cards {
            if card.is_loading != card.pending.is_some() {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "{}: is_loading={} but pending={:?}",
                        card.slug, card.is_loading, card.pending
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A card with a pending mutation already shows the mutation's outcome.
pub struct OptimisticTarget;

impl Invariant for OptimisticTarget {
    fn kind(&self) -> InvariantKind {
        InvariantKind::OptimisticTarget
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        for card in &state.cards {
            if let Some(intent) = card.pending
                && card.is_member != intent.target_is_member()
            {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!(
                        "{}: pending {intent} but is_member={}",
                        card.slug, card.is_member
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Cards shown belong to the current page.
///
/// - Cards only exist once the page's read has loaded.
/// - Static pages show no cards.
/// - A detail page shows at most the one lounge it names.
/// - "My lounges" only shows rows the server marked as joined.
/// - No lounge is shown twice.
/// - Sign-in is only demanded from a signed-out viewer.
pub struct CardsMatchRoute;

impl CardsMatchRoute {
    fn violation(&self, state: &AppSnapshot, message: impl Into<String>) -> Violation {
        Violation {
            invariant: self.kind(),
            message: format!("{}: {}", state.route, message.into()),
        }
    }
}

impl Invariant for CardsMatchRoute {
    fn kind(&self) -> InvariantKind {
        InvariantKind::CardsMatchRoute
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        if state.load == LoadStatus::SignInRequired && state.signed_in {
            return Err(self.violation(state, "sign-in required while signed in"));
        }

        if state.cards.is_empty() {
            return Ok(());
        }

        if state.load != LoadStatus::Loaded {
            return Err(self.violation(
                state,
                format!("{} cards shown while {:?}", state.cards.len(), state.load),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(card) = state.cards.iter().find(|card| !seen.insert(card.lounge_id)) {
            return Err(self.violation(state, format!("{} shown twice", card.slug)));
        }

        match &state.query {
            None => Err(self.violation(state, "static page shows cards")),
            Some(LoungeQuery::BySlug(slug)) => {
                if state.cards.len() > 1 || state.cards.iter().any(|card| &card.slug != slug) {
                    let slugs: Vec<_> = state.cards.iter().map(|card| card.slug.as_str()).collect();
                    Err(self.violation(state, format!("detail page shows {slugs:?}")))
                } else {
                    Ok(())
                }
            },
            Some(LoungeQuery::Mine) => match state.cards.iter().find(|card| !card.server_is_member)
            {
                Some(card) => Err(self.violation(state, format!("{} is not joined", card.slug))),
                None => Ok(()),
            },
            Some(LoungeQuery::All) => Ok(()),
        }
    }
}
