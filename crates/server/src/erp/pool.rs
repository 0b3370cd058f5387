//! Parallel authenticated sessions for the color-wise drill-down.
//!
//! The drill-down issues two lookups per distinct challan. Running them
//! through one session would serialize on the ERP's per-session handling,
//! so the pool logs in several independent sessions and fans the lookups
//! out across them, bounded by the configured maximum. Tasks check a
//! session out for the duration of one challan and return it afterwards,
//! so a session never carries two requests at once. Each challan's
//! resolution is isolated: a failure becomes a sentinel record with zero
//! quantity, never an abort of the batch.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use seamline_core::report::{ChallanDetailRecord, ChallanRecord};

use super::parse::drill;
use super::{ErpClient, ErpError};

/// Attempts for the system-id resolution (transport failures only).
const RESOLVE_ATTEMPTS: u32 = 3;
/// Randomized backoff window between resolution attempts.
const BACKOFF_MIN_MS: u64 = 100;
const BACKOFF_MAX_MS: u64 = 300;

/// Color marker of a sentinel record for a failed resolution.
pub const ERROR_COLOR: &str = "Error";
/// Line marker of a sentinel record for a failed resolution.
pub const NOT_FOUND_LINE: &str = "Not Found";

/// A fixed set of independently authenticated ERP sessions.
///
/// Sessions not currently checked out sit in `idle`; `count` is the total
/// the pool was opened with and bounds the drill-down's concurrency.
pub struct SessionPool {
    idle: Mutex<Vec<String>>,
    count: usize,
}

impl SessionPool {
    /// Log in up to `wanted` sessions (capped by configuration).
    ///
    /// Individual login failures are tolerated as long as at least one
    /// session opens.
    ///
    /// # Errors
    ///
    /// Returns [`ErpError::Unavailable`] when no session could be opened.
    #[instrument(skip(erp))]
    pub async fn open(erp: &ErpClient, wanted: usize) -> Result<Self, ErpError> {
        let cap = erp.config().max_pool_sessions.min(wanted.max(1));
        let mut sessions = Vec::with_capacity(cap);

        for _ in 0..cap {
            match erp.login().await {
                Ok(cookie) => sessions.push(cookie),
                Err(e) => warn!(error = %e, "pool session login failed"),
            }
        }

        if sessions.is_empty() {
            return Err(ErpError::Unavailable(
                "could not open any drill-down session".to_string(),
            ));
        }
        info!(sessions = sessions.len(), "drill-down session pool ready");
        let count = sessions.len();
        Ok(Self {
            idle: Mutex::new(sessions),
            count,
        })
    }

    /// Number of open sessions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// True when the pool holds no sessions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Take an idle session out of the pool. The drill-down's concurrency
    /// is capped at the pool size, so under that cap one is always idle.
    async fn checkout(&self) -> Option<String> {
        self.idle.lock().await.pop()
    }

    /// Return a session to the pool.
    async fn checkin(&self, cookie: String) {
        self.idle.lock().await.push(cookie);
    }

    #[cfg(test)]
    fn with_sessions(sessions: Vec<String>) -> Self {
        let count = sessions.len();
        Self {
            idle: Mutex::new(sessions),
            count,
        }
    }
}

/// Fan out the per-challan drill-down across the pool.
///
/// Ordering between concurrent lookups is not guaranteed; the caller
/// groups results by color, which is order-independent.
#[instrument(skip_all, fields(challans = challans.len(), sessions = pool.len()))]
pub async fn drill_down(
    erp: &ErpClient,
    pool: &SessionPool,
    challans: &[ChallanRecord],
    company_id: Option<u32>,
) -> Vec<ChallanDetailRecord> {
    let tasks: Vec<_> = challans
        .iter()
        .map(|challan| async move {
            let cookie = pool.checkout().await;
            let records =
                fetch_one(erp, cookie.as_deref().unwrap_or(""), challan, company_id).await;
            if let Some(cookie) = cookie {
                pool.checkin(cookie).await;
            }
            records
        })
        .collect();

    stream::iter(tasks)
        .buffer_unordered(pool.len().max(1))
        .collect::<Vec<Vec<ChallanDetailRecord>>>()
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Sentinel for a challan whose resolution or detail fetch failed.
fn sentinel(challan: &ChallanRecord, company_id: Option<u32>) -> ChallanDetailRecord {
    ChallanDetailRecord {
        challan_no: challan.challan_no.clone(),
        date: challan.date.clone(),
        buyer: challan.buyer.clone(),
        style: challan.style.clone(),
        line: NOT_FOUND_LINE.to_string(),
        color: ERROR_COLOR.to_string(),
        quantity: 0,
        system_id: None,
        company_id,
    }
}

async fn fetch_one(
    erp: &ErpClient,
    cookie: &str,
    challan: &ChallanRecord,
    company_id: Option<u32>,
) -> Vec<ChallanDetailRecord> {
    let Some(system_id) = resolve_system_id(erp, cookie, &challan.challan_no).await else {
        return vec![sentinel(challan, company_id)];
    };

    let html = match erp.fetch_challan_detail(system_id, cookie).await {
        Ok(html) => html,
        Err(e) => {
            warn!(challan = %challan.challan_no, error = %e, "detail fetch failed");
            return vec![sentinel(challan, company_id)];
        }
    };

    let rows = drill::parse_detail_rows(&html);
    if rows.is_empty() {
        return vec![sentinel(challan, company_id)];
    }

    rows.into_iter()
        .map(|row| ChallanDetailRecord {
            challan_no: challan.challan_no.clone(),
            date: challan.date.clone(),
            buyer: challan.buyer.clone(),
            style: challan.style.clone(),
            line: row.line,
            color: row.color,
            quantity: row.quantity,
            system_id: Some(system_id),
            company_id,
        })
        .collect()
}

/// Resolve a challan's internal system id, retrying transport failures
/// with a short randomized backoff. A served-but-empty search result is
/// final: only the transport layer earns a retry.
async fn resolve_system_id(erp: &ErpClient, cookie: &str, challan_no: &str) -> Option<i64> {
    for attempt in 1..=RESOLVE_ATTEMPTS {
        match erp.search_challan(challan_no, cookie).await {
            Ok(html) => return drill::parse_search_system_id(&html, challan_no),
            Err(e) => {
                warn!(challan = %challan_no, attempt, error = %e, "system-id search failed");
                if attempt < RESOLVE_ATTEMPTS {
                    tokio::time::sleep(backoff()).await;
                }
            }
        }
    }
    None
}

fn backoff() -> Duration {
    let ms = rand::rng().random_range(BACKOFF_MIN_MS..=BACKOFF_MAX_MS);
    Duration::from_millis(ms)
}
