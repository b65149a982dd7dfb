//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the App at a point in time.
//! Invariants operate on snapshots rather than live state, and drivers keep
//! one per render so tests can inspect intermediate states after a run.

use lounge_app::{App, LoadStatus, LoungeQuery};
use lounge_core::{LoungeId, MembershipIntent};
use serde::Serialize;

/// Snapshot of the App as rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSnapshot {
    /// Path of the current route.
    pub route: String,
    /// Read backing the current route, `None` for static pages.
    #[serde(skip)]
    pub query: Option<LoungeQuery>,
    /// Load status of the current route.
    #[serde(serialize_with = "serialize_debug")]
    pub load: LoadStatus,
    /// An identity is present.
    pub signed_in: bool,
    /// Cards in display order.
    pub cards: Vec<CardSnapshot>,
}

/// Snapshot of one lounge card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSnapshot {
    /// Lounge shown on the card.
    pub lounge_id: LoungeId,
    /// Lounge slug.
    pub slug: String,
    /// Membership flag from the row the card was built from.
    pub server_is_member: bool,
    /// Member count from the row the card was built from.
    pub server_member_count: u64,
    /// Displayed membership flag.
    pub is_member: bool,
    /// Displayed member count.
    pub member_count: u64,
    /// Toggle is disabled while a mutation is in flight.
    pub is_loading: bool,
    /// Intent of the in-flight mutation, if any.
    #[serde(skip)]
    pub pending: Option<MembershipIntent>,
}

impl AppSnapshot {
    /// Capture the App's observable state.
    pub fn from_app(app: &App) -> Self {
        let cards = app
            .cards()
            .iter()
            .map(|card| {
                let lounge = card.lounge();
                let state = card.state();
                CardSnapshot {
                    lounge_id: lounge.id,
                    slug: lounge.slug.clone(),
                    server_is_member: lounge.is_member,
                    server_member_count: lounge.member_count,
                    is_member: state.is_member,
                    member_count: state.member_count,
                    is_loading: state.is_loading,
                    pending: card.toggle().pending_intent(),
                }
            })
            .collect();

        Self {
            route: app.route().path(),
            query: app.route().query(),
            load: app.load_status().clone(),
            signed_in: app.identity().is_some(),
            cards,
        }
    }

    /// Card for a slug.
    pub fn card(&self, slug: &str) -> Option<&CardSnapshot> {
        self.cards.iter().find(|card| card.slug == slug)
    }
}

fn serialize_debug<T: std::fmt::Debug, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{value:?}"))
}
