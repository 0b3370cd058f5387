//! Report services.
//!
//! Each service owns one report family end to end: obtain a session
//! cookie, sweep the ERP for the document, parse the rendered HTML, and
//! shape the response. Handlers stay thin; "found nothing" is data here
//! (`Ok(None)` / `success: false`), not an error.

pub mod challan;
pub mod closing;
pub mod color_wise;
pub mod factory;
pub mod sewing;

use crate::erp::ErpError;
use crate::erp::cookie::CookieManager;
use crate::error::AppError;

/// Obtain a session cookie or fail the request as ERP-unavailable.
///
/// A missing cookie here means the login itself failed (bad credentials
/// or ERP down), which must surface as 502, never as "not found".
pub(crate) async fn require_cookie(cookies: &CookieManager) -> Result<String, AppError> {
    match cookies.get_valid_cookie().await? {
        Some(cookie) => Ok(cookie),
        None => Err(AppError::Erp(ErpError::Unavailable(
            "no ERP session cookie available".to_string(),
        ))),
    }
}
