//! Error type for the ERP integration layer.

use thiserror::Error;

use crate::db::StoreError;

/// Errors surfaced by the ERP integration layer.
///
/// "Booking not found" is deliberately not an error: an exhausted sweep is
/// a normal outcome and travels as `None` through the report services.
#[derive(Debug, Error)]
pub enum ErpError {
    /// Login failed or the ERP could not be reached at a point where the
    /// whole report request must fail (not a per-combination skip).
    #[error("ERP unavailable: {0}")]
    Unavailable(String),

    /// The shared document store failed; unexpected, propagates to a 500.
    #[error("document store error: {0}")]
    Store(#[from] StoreError),
}
