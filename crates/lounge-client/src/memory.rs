#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::{HashMap, HashSet},
    future::{Future, ready},
    sync::{Arc, Mutex, MutexGuard},
};

use lounge_core::{Identity, Lounge, LoungeId, Membership, UserId};

use crate::{AuthError, IdentityProvider, MembershipStore, StoreError, store::validate_email};

/// In-memory backend for testing and simulation
///
/// Behaves like the managed backend as far as this application can observe:
/// the unique `(user_id, lounge_id)` constraint, row-level security on
/// memberships (a user may only write their own rows), per-viewer RPC
/// annotations, and magic-link sign-in. All state is wrapped in
/// `Arc<Mutex<>>` so clones share it. Uses `lock().expect()`, which panics if
/// the mutex is poisoned - acceptable for test code.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryBackendInner>>,
}

#[derive(Default)]
struct MemoryBackendInner {
    /// Lounge rows in insertion order
    lounges: Vec<LoungeRecord>,

    /// Membership rows
    memberships: HashSet<Membership>,

    /// Registered accounts by email
    accounts: HashMap<String, UserId>,

    /// Identity of the current session, `None` when signed out
    session: Option<Identity>,

    /// Emails a magic link was sent to, oldest first
    outbox: Vec<String>,
}

#[derive(Clone)]
struct LoungeRecord {
    id: LoungeId,
    slug: String,
    title: String,
    description: Option<String>,
    image_url: String,
}

impl MemoryBackend {
    /// Create an empty backend with no lounges and no session.
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, MemoryBackendInner> {
        self.inner.lock().expect("Mutex poisoned")
    }

    /// Add a lounge. Returns its generated ID.
    pub fn add_lounge(&self, slug: &str, title: &str, description: Option<&str>) -> LoungeId {
        let id = LoungeId::new_v4();
        self.lock().lounges.push(LoungeRecord {
            id,
            slug: slug.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            image_url: format!("https://images.example/{slug}.png"),
        });
        id
    }

    /// Insert a membership directly, bypassing session checks.
    ///
    /// Useful for seeding other users' memberships.
    pub fn seed_membership(&self, user_id: UserId, lounge_id: LoungeId) {
        self.lock().memberships.insert(Membership::new(user_id, lounge_id));
    }

    /// Replace the current session.
    pub fn set_session(&self, identity: Option<Identity>) {
        self.lock().session = identity;
    }

    /// Complete a magic-link sign-in for `email`, as if the link was opened.
    ///
    /// Returns `None` if no link was ever sent to that address.
    pub fn open_magic_link(&self, email: &str) -> Option<Identity> {
        let mut inner = self.lock();
        if !inner.outbox.iter().any(|sent| sent == email) {
            return None;
        }
        let user_id = *inner.accounts.get(email)?;
        let identity = Identity::new(user_id, Some(email.to_string()));
        inner.session = Some(identity.clone());
        Some(identity)
    }

    /// Emails a magic link was sent to, oldest first.
    pub fn sent_magic_links(&self) -> Vec<String> {
        self.lock().outbox.clone()
    }

    /// Whether the membership row exists.
    pub fn is_member(&self, user_id: UserId, lounge_id: LoungeId) -> bool {
        self.lock().memberships.contains(&Membership::new(user_id, lounge_id))
    }

    /// Number of membership rows for a lounge.
    pub fn member_count(&self, lounge_id: LoungeId) -> u64 {
        self.lock().memberships.iter().filter(|m| m.lounge_id == lounge_id).count() as u64
    }

    fn insert_sync(&self, membership: Membership) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.authorize_write(membership)?;

        if !inner.lounges.iter().any(|l| l.id == membership.lounge_id) {
            return Err(StoreError::Rejected {
                status: 409,
                code: Some("23503".to_string()),
                message: "insert or update on table \"memberships\" violates foreign key \
                          constraint \"memberships_lounge_id_fkey\""
                    .to_string(),
            });
        }

        if !inner.memberships.insert(membership) {
            return Err(StoreError::Conflict {
                message: "duplicate key value violates unique constraint \"memberships_pkey\""
                    .to_string(),
            });
        }
        Ok(())
    }

    fn delete_sync(&self, membership: Membership) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.authorize_write(membership)?;
        inner.memberships.remove(&membership);
        Ok(())
    }

    fn lounges_sync(&self, filter: impl Fn(&LoungeRecord, bool) -> bool) -> Vec<Lounge> {
        let inner = self.lock();
        let viewer = inner.session.as_ref().map(|s| s.user_id);

        inner
            .lounges
            .iter()
            .filter_map(|record| {
                let is_member = viewer.is_some_and(|user_id| {
                    inner.memberships.contains(&Membership::new(user_id, record.id))
                });
                filter(record, is_member).then(|| inner.to_lounge(record, is_member))
            })
            .collect()
    }
}

impl MemoryBackendInner {
    fn authorize_write(&self, membership: Membership) -> Result<(), StoreError> {
        match &self.session {
            None => Err(StoreError::Unauthorized { message: "JWT required".to_string() }),
            Some(identity) if identity.user_id != membership.user_id => {
                Err(StoreError::Rejected {
                    status: 403,
                    code: Some("42501".to_string()),
                    message: "new row violates row-level security policy for table \
                              \"memberships\""
                        .to_string(),
                })
            },
            Some(_) => Ok(()),
        }
    }

    fn to_lounge(&self, record: &LoungeRecord, is_member: bool) -> Lounge {
        Lounge {
            id: record.id,
            slug: record.slug.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            image_url: record.image_url.clone(),
            member_count: self.memberships.iter().filter(|m| m.lounge_id == record.id).count()
                as u64,
            is_member,
        }
    }
}

impl MembershipStore for MemoryBackend {
    fn insert_membership(
        &self,
        membership: Membership,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        ready(self.insert_sync(membership))
    }

    fn delete_membership(
        &self,
        membership: Membership,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        ready(self.delete_sync(membership))
    }

    fn lounges_with_membership(
        &self,
    ) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send {
        ready(Ok(self.lounges_sync(|_, _| true)))
    }

    fn my_lounges(&self) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send {
        ready(Ok(self.lounges_sync(|_, is_member| is_member)))
    }

    fn lounge_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Vec<Lounge>, StoreError>> + Send {
        ready(Ok(self.lounges_sync(|record, _| record.slug == slug)))
    }
}

impl IdentityProvider for MemoryBackend {
    fn current_user(&self) -> impl Future<Output = Result<Option<Identity>, AuthError>> + Send {
        ready(Ok(self.lock().session.clone()))
    }

    fn sign_in_with_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send {
        let result = validate_email(email).map(|email| {
            let mut inner = self.lock();
            inner.accounts.entry(email.to_string()).or_insert_with(UserId::new_v4);
            inner.outbox.push(email.to_string());
        });
        ready(result)
    }

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send {
        self.lock().session = None;
        ready(Ok(()))
    }
}
