//! Chaos property tests for the membership mutator.
//!
//! The mutator runs against `ChaoticStore<MemoryBackend>`. Whatever mix of
//! injected failures occurs, the store must reflect exactly the mutations
//! that reported success, and duplicate joins must be refused.

use lounge_client::{
    ChaoticStore, MemoryBackend, MembershipMutator, MutationError, StoreError,
};
use lounge_core::{Identity, UserId};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

#[test]
fn prop_store_reflects_successful_mutations_only() {
    proptest!(|(
        failure_rate in 0.0..0.8,
        seed in any::<u64>(),
        ops in prop::collection::vec((any::<bool>(), 0usize..3), 1..40),
    )| {
        let backend = MemoryBackend::new();
        let lounges = [
            backend.add_lounge("a", "A", None),
            backend.add_lounge("b", "B", None),
            backend.add_lounge("c", "C", None),
        ];
        let user = UserId::new_v4();
        backend.set_session(Some(Identity::new(user, None)));

        let store = ChaoticStore::with_seed(backend.clone(), failure_rate, seed);
        let mutator = MembershipMutator::new(store.clone());
        let mut model = [false; 3];

        runtime().block_on(async {
            for (join, idx) in ops {
                let lounge = lounges[idx];
                let result = if join {
                    mutator.join(user, lounge).await
                } else {
                    mutator.leave(user, lounge).await
                };

                match result {
                    Ok(()) => model[idx] = join,
                    Err(MutationError::Store(StoreError::Conflict { .. })) => {
                        assert!(join && model[idx], "conflict only on duplicate join");
                    },
                    Err(MutationError::Store(err)) => assert!(err.is_transient()),
                    Err(MutationError::NotAuthenticated) => unreachable!("session is set"),
                }
            }
        });

        for (idx, lounge) in lounges.iter().enumerate() {
            prop_assert_eq!(backend.is_member(user, *lounge), model[idx]);
        }
        prop_assert!(store.injected_count() <= store.operation_count());
    });
}

#[tokio::test]
async fn mutator_without_session_reports_not_authenticated() {
    let backend = MemoryBackend::new();
    let lounge = backend.add_lounge("rust", "Rust", None);
    let mutator = MembershipMutator::new(backend);

    let err = mutator.join(UserId::new_v4(), lounge).await.unwrap_err();
    assert_eq!(err, MutationError::NotAuthenticated);
    assert_eq!(err.to_string(), "Not authenticated");
}
