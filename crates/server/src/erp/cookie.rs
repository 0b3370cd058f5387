//! ERP session cookie lifecycle.
//!
//! The ERP issues short-lived session cookies (about five minutes). The
//! manager caches the current cookie in the shared document store and
//! refreshes it proactively at a fixed margin before expiry, so a cookie
//! that is about to lapse is never presented. There is no background
//! refresh loop: refresh happens lazily on access, and the UI's periodic
//! poll of the refresh endpoint converges on the same stored state.
//! Concurrent refreshes are tolerated - last write wins, and a stale
//! overwrite only costs one extra login round-trip.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::db::{DocumentStore, ERP_COOKIE_KEY, StoreError};

use super::ErpClient;

/// The cached cookie document as stored under [`ERP_COOKIE_KEY`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CookieDoc {
    pub cookie: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_refreshed: DateTime<Utc>,
}

impl CookieDoc {
    /// Whether the cookie may still be handed out at `now`.
    ///
    /// Fresh means inside the proactive refresh window and not past the
    /// hard expiry.
    fn is_fresh(&self, now: DateTime<Utc>, refresh_interval: Duration) -> bool {
        now < self.expires_at && now - self.last_refreshed < refresh_interval
    }
}

/// Manages the shared ERP session cookie.
#[derive(Clone)]
pub struct CookieManager {
    erp: ErpClient,
    store: Arc<dyn DocumentStore>,
    refresh_interval: Duration,
    lifetime: Duration,
}

impl std::fmt::Debug for CookieManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieManager")
            .field("refresh_interval", &self.refresh_interval)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl CookieManager {
    /// Create a manager over the given client and store, taking the
    /// refresh/lifetime windows from the client's configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configured durations exceed `chrono`'s range, which
    /// config validation already prevents.
    #[must_use]
    pub fn new(erp: ErpClient, store: Arc<dyn DocumentStore>) -> Self {
        let config = erp.config();
        let refresh_interval =
            Duration::from_std(config.cookie_refresh).expect("refresh interval in range");
        let lifetime = Duration::from_std(config.cookie_lifetime).expect("lifetime in range");
        Self {
            erp,
            store,
            refresh_interval,
            lifetime,
        }
    }

    /// Return a valid session cookie, logging in first if the cached one
    /// is missing, stale, or due for proactive refresh.
    ///
    /// Returns `Ok(None)` when the ERP cannot be reached or rejects the
    /// login - the caller must treat the ERP as unavailable and fail the
    /// report request rather than retry indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error only for document store failures.
    #[instrument(skip(self))]
    pub async fn get_valid_cookie(&self) -> Result<Option<String>, StoreError> {
        let now = Utc::now();
        if let Some(doc) = self.load().await?
            && doc.is_fresh(now, self.refresh_interval)
        {
            return Ok(Some(doc.cookie));
        }
        self.refresh().await
    }

    /// Force a login and store the fresh cookie, regardless of the cached
    /// state. Used by the explicit refresh endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error only for document store failures; a failed login
    /// is `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Option<String>, StoreError> {
        let cookie = match self.erp.login().await {
            Ok(cookie) => cookie,
            Err(e) => {
                warn!(error = %e, "ERP login failed, no session cookie available");
                return Ok(None);
            }
        };

        let now = Utc::now();
        let doc = CookieDoc {
            cookie: cookie.clone(),
            created_at: now,
            expires_at: now + self.lifetime,
            last_refreshed: now,
        };
        self.store
            .upsert(ERP_COOKIE_KEY, serde_json::to_value(&doc)?)
            .await?;
        info!(expires_at = %doc.expires_at, "ERP session cookie refreshed");

        Ok(Some(cookie))
    }

    async fn load(&self) -> Result<Option<CookieDoc>, StoreError> {
        let Some(value) = self.store.get(ERP_COOKIE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_value::<CookieDoc>(value) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                // Corrupt document: treat as absent and let refresh
                // overwrite it.
                warn!(error = %e, "discarding malformed cached cookie document");
                Ok(None)
            }
        }
    }
}
