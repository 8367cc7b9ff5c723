//! Role and subscription access resolution.
//!
//! `AccessService` is the single authority for "who is an admin" and
//! "who currently has access". It is constructed once at startup from the
//! database handle and cloned into each route state. Access-check results
//! are memoized in a short-TTL per-process cache; role reads always go to
//! the database.

mod cache;

pub use cache::{AccessCache, CACHE_CAPACITY, CACHE_TTL};

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::error;

use crate::db::{Database, Role, SubscriptionRecord};

/// Normalize an email for use as a lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[derive(Clone)]
pub struct AccessService {
    db: Database,
    cache: Arc<Mutex<AccessCache>>,
}

impl AccessService {
    pub fn new(db: Database) -> Self {
        Self::with_cache(db, AccessCache::default())
    }

    pub fn with_cache(db: Database, cache: AccessCache) -> Self {
        Self {
            db,
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Resolve the role for an email. `None` means no role record exists.
    /// Never fails the caller: backing-store errors log and resolve to `None`.
    pub async fn get_role(&self, email: &str) -> Option<Role> {
        let email = normalize_email(email);
        match self.db.roles().get(&email).await {
            Ok(role) => role,
            Err(e) => {
                error!(error = %e, "Failed to read role record");
                None
            }
        }
    }

    /// Upsert the role record for an email. Returns false (and logs) on
    /// backing-store error. Authorization is the middleware's concern,
    /// not this service's.
    pub async fn set_role(&self, email: &str, role: Role) -> bool {
        let email = normalize_email(email);
        match self.db.roles().upsert(&email, role).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to write role record");
                false
            }
        }
    }

    pub async fn is_admin(&self, email: &str) -> bool {
        self.get_role(email).await == Some(Role::Admin)
    }

    /// Evaluate the access predicate for an email, serving from the cache
    /// when fresh. Absent record, inactive, or expired subscription means
    /// no access. Backing-store errors deny access and are not cached.
    pub async fn check_access(&self, email: &str) -> bool {
        let email = normalize_email(email);

        if let Some(hit) = self.lock_cache().get(&email) {
            return hit;
        }

        let allowed = match self.db.subscriptions().get(&email).await {
            Ok(Some(sub)) => sub.grants_access_at(Utc::now()),
            Ok(None) => false,
            Err(e) => {
                error!(error = %e, "Subscription lookup failed, denying access");
                return false;
            }
        };

        self.lock_cache().insert(email, allowed);
        allowed
    }

    /// The raw subscription record. Backing-store errors propagate: this
    /// path feeds status display, not a security gate.
    pub async fn get_subscription(
        &self,
        email: &str,
    ) -> Result<Option<SubscriptionRecord>, sqlx::Error> {
        self.db.subscriptions().get(&normalize_email(email)).await
    }

    /// Record a payment confirmation: upsert the subscription and evict
    /// the cached access result so the change is visible immediately
    /// within this process.
    pub async fn record_subscription(
        &self,
        email: &str,
        customer_id: &str,
        expiration_date: DateTime<Utc>,
        active: bool,
    ) -> Result<(), sqlx::Error> {
        let email = normalize_email(email);
        self.db
            .subscriptions()
            .upsert(&email, customer_id, expiration_date, active)
            .await?;
        self.lock_cache().invalidate(&email);
        Ok(())
    }

    /// The out-of-band claims update: drop the role record and evict the
    /// cached access result. Returns false (and logs) on backing-store error.
    pub async fn reset_claims(&self, email: &str) -> bool {
        let email = normalize_email(email);
        match self.db.roles().delete(&email).await {
            Ok(_) => {
                self.lock_cache().invalidate(&email);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to reset claims");
                false
            }
        }
    }

    /// Evict the cached access result for an email.
    pub fn invalidate(&self, email: &str) {
        self.lock_cache().invalidate(&normalize_email(email));
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, AccessCache> {
        // Lock is held only for map operations, never across an await.
        self.cache.lock().expect("access cache lock poisoned")
    }
}
