//! Legacy ERP integration layer.
//!
//! The ERP is a classic server-rendered web application: you log in with a
//! form POST and get a short-lived session cookie, then POST form fields at
//! report endpoints and scrape the HTML they render. Nothing about it is an
//! API; this module is the seam that makes it look like one.
//!
//! - [`cookie`] - session cookie lifecycle (proactive refresh)
//! - [`prober`] - combinatorial dimension sweep against report endpoints
//! - [`parse`] - HTML table parsers (pure functions)
//! - [`pool`] - parallel authenticated sessions for the drill-down phase

pub mod cookie;
pub mod error;
pub mod parse;
pub mod pool;
pub mod prober;

use std::sync::Arc;

use reqwest::header::SET_COOKIE;
use reqwest::redirect::Policy;
use secrecy::ExposeSecret;
use tracing::instrument;
use url::Url;

use seamline_core::report::ReportKind;

use crate::config::ErpConfig;
pub use error::ErpError;

/// Login endpoint, relative to the ERP base URL.
const LOGIN_PATH: &str = "Account/Login";
/// Challan search ("create") endpoint used to resolve internal system ids.
const SEARCH_PATH: &str = "Challan/Search";
/// Per-challan breakdown endpoint, keyed by internal system id.
const DETAIL_PATH: &str = "Challan/Details";

/// Report-generation endpoint for a report family.
const fn report_path(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Closing => "Report/CuttingClosing",
        ReportKind::Sewing => "Report/SewingClosing",
        // The color-wise drill-down starts from the challan register.
        ReportKind::Challan | ReportKind::ColorWise => "Report/AccessoriesChallan",
        ReportKind::Factory => "Report/HourlySewingInput",
    }
}

/// HTTP client for the legacy ERP.
///
/// Cheap to clone; the underlying `reqwest::Client` is shared.
#[derive(Clone)]
pub struct ErpClient {
    inner: Arc<ErpClientInner>,
}

struct ErpClientInner {
    client: reqwest::Client,
    config: ErpConfig,
}

impl std::fmt::Debug for ErpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ErpClient {
    /// Create a new ERP client.
    ///
    /// Redirects are not followed: the login endpoint answers a successful
    /// form POST with a 302 whose `Set-Cookie` header we must read before
    /// reqwest would throw it away.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn new(config: ErpConfig) -> Self {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(ErpClientInner { client, config }),
        }
    }

    /// The ERP configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ErpConfig {
        &self.inner.config
    }

    fn endpoint(&self, path: &str) -> Url {
        // Base URL is validated at config load; joining a static path
        // cannot fail.
        self.inner
            .config
            .base_url
            .join(path)
            .unwrap_or_else(|_| self.inner.config.base_url.clone())
    }

    /// Log in and return the session cookie header value.
    ///
    /// Collects every `Set-Cookie` of the response (session id plus any
    /// anti-forgery cookie) into one `Cookie` header value.
    ///
    /// # Errors
    ///
    /// Returns [`ErpError::Unavailable`] on transport failure, a
    /// non-success/non-redirect status, or a response without cookies.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<String, ErpError> {
        let config = &self.inner.config;
        let form = [
            ("UserName", config.username.as_str()),
            ("Password", config.password.expose_secret()),
        ];

        let response = self
            .inner
            .client
            .post(self.endpoint(LOGIN_PATH))
            .form(&form)
            .send()
            .await
            .map_err(|e| ErpError::Unavailable(format!("login request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(ErpError::Unavailable(format!(
                "login rejected with status {status}"
            )));
        }

        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join("; ");

        if cookie.is_empty() {
            return Err(ErpError::Unavailable(
                "login response carried no Set-Cookie header".to_string(),
            ));
        }

        Ok(cookie)
    }

    /// Form-POST a report endpoint with an authenticated session cookie.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged; callers decide whether it is
    /// a skip (prober) or a failure (pool).
    pub(crate) async fn post_form(
        &self,
        path: &str,
        form: &[(String, String)],
        cookie: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.inner
            .client
            .post(self.endpoint(path))
            .header(reqwest::header::COOKIE, cookie)
            .form(form)
            .send()
            .await
    }

    /// Search for a challan by number; returns the raw HTML of the search
    /// results.
    pub(crate) async fn search_challan(
        &self,
        challan_no: &str,
        cookie: &str,
    ) -> Result<String, reqwest::Error> {
        let form = [("SearchText".to_string(), challan_no.to_string())];
        let response = self.post_form(SEARCH_PATH, &form, cookie).await?;
        response.error_for_status()?.text().await
    }

    /// Fetch the per-challan size/line/color breakdown by system id.
    pub(crate) async fn fetch_challan_detail(
        &self,
        system_id: i64,
        cookie: &str,
    ) -> Result<String, reqwest::Error> {
        let form = [("Id".to_string(), system_id.to_string())];
        let response = self.post_form(DETAIL_PATH, &form, cookie).await?;
        response.error_for_status()?.text().await
    }
}
