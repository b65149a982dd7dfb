//! Chaos tests for the runtime.
//!
//! The runtime runs against `ChaoticStore<MemoryBackend>`, which fails a
//! seeded fraction of store calls. Whatever fails, once nothing is in flight
//! every card shown must agree with the backend, and the standard invariants
//! must hold at every render.

use lounge_app::{AppEvent, LoadStatus, Route, Runtime};
use lounge_client::{ChaoticStore, MemoryBackend};
use lounge_core::{Identity, LoungeId, UserId};
use lounge_harness::{InvariantRegistry, SimDriver};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

fn seeded() -> (MemoryBackend, UserId, Vec<LoungeId>) {
    let backend = MemoryBackend::new();
    let lounges =
        ["rust", "chess", "jazz"].iter().map(|slug| backend.add_lounge(slug, slug, None)).collect();
    let user = UserId::new_v4();
    backend.set_session(Some(Identity::new(user, None)));
    (backend, user, lounges)
}

#[test]
fn prop_cards_settle_to_backend_state() {
    proptest!(|(
        failure_rate in 0.0..0.6,
        seed in any::<u64>(),
        settle in any::<bool>(),
        script in prop::collection::vec((0usize..3, prop::bool::weighted(0.1)), 1..25),
    )| {
        let (backend, user, lounges) = seeded();
        let store = ChaoticStore::with_seed(backend.clone(), failure_rate, seed);

        let mut events = vec![AppEvent::Navigate(Route::Lounges)];
        for (index, reload) in script {
            // Without settling, a reload can read rows before earlier
            // mutations land, which legitimately shows stale values.
            if reload && settle {
                events.push(AppEvent::Navigate(Route::Lounges));
            }
            events.push(AppEvent::Toggle { lounge_id: lounges[index] });
        }

        let mut driver = SimDriver::scripted(events).with_invariants(InvariantRegistry::standard());
        if settle {
            driver = driver.settle_between_events();
        }
        let mut runtime_under_test = Runtime::new(driver, store.clone());
        runtime().block_on(runtime_under_test.run()).unwrap();

        let app = runtime_under_test.app();
        prop_assert_eq!(runtime_under_test.in_flight(), 0);

        match app.load_status() {
            LoadStatus::Loaded => {
                for card in app.cards() {
                    let id = card.lounge().id;
                    let state = card.state();
                    prop_assert!(!state.is_loading);
                    prop_assert_eq!(state.is_member, backend.is_member(user, id));
                    prop_assert_eq!(state.member_count, backend.member_count(id));
                }
            },
            LoadStatus::Failed(_) => prop_assert!(app.cards().is_empty()),
            other => prop_assert!(false, "unexpected load status {:?}", other),
        }

        let failures = runtime_under_test
            .driver()
            .notifications()
            .iter()
            .filter(|n| n.is_error())
            .count();
        prop_assert!(failures <= store.injected_count());
    });
}

#[tokio::test]
async fn failed_load_leaves_nothing_to_toggle() {
    let (backend, user, lounges) = seeded();
    let store = ChaoticStore::new(backend.clone(), 1.0);
    let mut events = vec![AppEvent::Navigate(Route::Lounges)];
    events.extend(lounges.iter().map(|&lounge_id| AppEvent::Toggle { lounge_id }));

    let driver = SimDriver::scripted(events).with_invariants(InvariantRegistry::standard());
    let mut runtime = Runtime::new(driver, store.clone());
    runtime.run().await.unwrap();

    assert!(matches!(runtime.app().load_status(), LoadStatus::Failed(_)));
    assert!(lounges.iter().all(|&id| !backend.is_member(user, id)));
    assert_eq!(store.operation_count(), 1);
    assert_eq!(store.injected_count(), 1);

    let notifications = runtime.driver().notifications();
    assert_eq!(notifications.len(), 1);
    assert!(
        notifications[0]
            .message
            .starts_with("Failed to load lounges: network error: injected failure")
    );
}
