//! Integration test support: an in-process mock of the legacy ERP.
//!
//! The mock speaks just enough of the ERP's dialect for the server crate's
//! integration layer: form-POST login answered with a 302 and a session
//! cookie, report endpoints that render HTML tables only for one specific
//! dimension combination, and the challan search/detail pair used by the
//! color-wise drill-down. Everything else renders the ERP's "Data Not
//! Found" page.
//!
//! Tests construct a [`MockErp`], point an `ErpConfig` at its ephemeral
//! port, and drive the real client code against it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::post;
use secrecy::SecretString;
use url::Url;

use seamline_server::config::{ErpConfig, SweepConfig};

/// The short page the ERP renders when a report query matches nothing.
const NO_DATA_PAGE: &str = "<html><body>Data Not Found</body></html>";

/// What the mock ERP serves. Fields are read once at startup; toggle
/// [`MockErp::set_reject_login`] for runtime behavior changes.
#[derive(Debug, Clone, Default)]
pub struct MockErpOptions {
    /// Booking number (or report date) the report endpoints have data for.
    pub booking_no: String,
    /// Fiscal year the document was booked under.
    pub hit_year: i32,
    /// Company id the document was booked under.
    pub hit_company: u32,
    /// Report HTML served on a dimension hit.
    pub report_html: String,
    /// Challan number to internal system id, for the search endpoint.
    pub search_ids: HashMap<String, i64>,
    /// System id to detail-page HTML, for the detail endpoint.
    pub details: HashMap<i64, String>,
    /// Challan numbers whose search requests fail with a 500.
    pub failing_searches: Vec<String>,
    /// Artificial latency on the search endpoint, so tests can observe
    /// whether drill-down requests overlap on a session.
    pub search_delay: Duration,
}

struct MockState {
    options: MockErpOptions,
    logins: AtomicUsize,
    reports: AtomicUsize,
    reject_login: AtomicBool,
    /// In-flight drill-down requests per session cookie.
    inflight: std::sync::Mutex<HashMap<String, usize>>,
    /// Highest in-flight count observed on any single session cookie.
    session_overlap: AtomicUsize,
}

/// A running mock ERP bound to an ephemeral local port.
pub struct MockErp {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockErp {
    /// Start the mock on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(options: MockErpOptions) -> Self {
        let state = Arc::new(MockState {
            options,
            logins: AtomicUsize::new(0),
            reports: AtomicUsize::new(0),
            reject_login: AtomicBool::new(false),
            inflight: std::sync::Mutex::new(HashMap::new()),
            session_overlap: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/Account/Login", post(login))
            .route("/Report/CuttingClosing", post(report))
            .route("/Report/SewingClosing", post(report))
            .route("/Report/AccessoriesChallan", post(report))
            .route("/Report/HourlySewingInput", post(report))
            .route("/Challan/Search", post(search))
            .route("/Challan/Details", post(details))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock erp");
        let addr = listener.local_addr().expect("mock erp local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock erp");
        });

        Self { addr, state }
    }

    /// Base URL of the running mock.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("mock erp url")
    }

    /// How many successful logins the mock has answered.
    #[must_use]
    pub fn login_count(&self) -> usize {
        self.state.logins.load(Ordering::SeqCst)
    }

    /// How many authenticated report requests the mock has answered.
    #[must_use]
    pub fn report_count(&self) -> usize {
        self.state.reports.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously in-flight drill-down requests
    /// seen on any single session cookie.
    #[must_use]
    pub fn max_session_overlap(&self) -> usize {
        self.state.session_overlap.load(Ordering::SeqCst)
    }

    /// Make subsequent logins fail with 403.
    pub fn set_reject_login(&self, reject: bool) {
        self.state.reject_login.store(reject, Ordering::SeqCst);
    }

    /// An `ErpConfig` pointed at this mock, with a small sweep so tests
    /// probe a handful of combinations at most.
    #[must_use]
    pub fn config(&self) -> ErpConfig {
        ErpConfig {
            base_url: self.base_url(),
            username: "operator".to_string(),
            password: SecretString::from("s3cure-test-pass"),
            sweep: SweepConfig {
                years_back: 1,
                years_forward: 0,
                max_company_id: 2,
                location_ids: vec![1],
                warehouse_ids: vec![1],
            },
            cookie_refresh: Duration::from_secs(240),
            cookie_lifetime: Duration::from_secs(300),
            max_pool_sessions: 4,
        }
    }
}

/// Pad report HTML past the prober's minimum-body screen.
#[must_use]
pub fn pad_report(html: &str) -> String {
    format!("<html><body>{html}<!-- {} --></body></html>", "~".repeat(600))
}

/// A minimal challan register page listing `(challan_no, qty)` rows.
#[must_use]
pub fn challan_register(rows: &[(&str, i64)]) -> String {
    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, (challan_no, qty))| {
            format!(
                "<tr><td>{}</td><td>{challan_no}</td><td>ACME</td><td>ST-1</td>\
                 <td>Wash Ltd</td><td>{qty}</td><td>12-Aug-26</td></tr>",
                i + 1
            )
        })
        .collect();
    pad_report(&format!(
        r#"<table><tbody id="tblChallanRegister">{body}</tbody></table>"#
    ))
}

/// A challan search-result page exposing one system id.
#[must_use]
pub fn search_result(challan_no: &str, system_id: i64) -> String {
    format!(r#"<select><option value="{system_id}">{challan_no} / 12-Aug-26</option></select>"#)
}

/// A challan detail page with `(line, color, qty)` rows.
#[must_use]
pub fn detail_page(rows: &[(&str, &str, i64)]) -> String {
    let body: String = rows
        .iter()
        .map(|(line, color, qty)| {
            format!("<tr><td>{line}</td><td>{color}</td><td>{qty}</td></tr>")
        })
        .collect();
    format!(r#"<table><tbody id="tblChallanDetail">{body}</tbody></table>"#)
}

async fn login(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if state.reject_login.load(Ordering::SeqCst) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if form.get("UserName").map(String::as_str) != Some("operator") {
        return StatusCode::FORBIDDEN.into_response();
    }
    let n = state.logins.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/Home".to_string()),
            (
                header::SET_COOKIE,
                format!("ASP.NET_SessionId=mock-session-{n}; path=/"),
            ),
        ],
    )
        .into_response()
}

fn authed(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("ASP.NET_SessionId="))
}

fn session_key(headers: &HeaderMap) -> String {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn begin_session_request(state: &MockState, headers: &HeaderMap) {
    let mut inflight = state.inflight.lock().expect("inflight lock");
    let count = inflight.entry(session_key(headers)).or_insert(0);
    *count += 1;
    state.session_overlap.fetch_max(*count, Ordering::SeqCst);
}

fn end_session_request(state: &MockState, headers: &HeaderMap) {
    let mut inflight = state.inflight.lock().expect("inflight lock");
    if let Some(count) = inflight.get_mut(&session_key(headers)) {
        *count = count.saturating_sub(1);
    }
}

async fn report(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authed(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.reports.fetch_add(1, Ordering::SeqCst);
    let options = &state.options;
    let reference = form
        .get("BookingNo")
        .or_else(|| form.get("ReportDate"))
        .map(String::as_str);
    let year = form.get("Year").and_then(|v| v.parse::<i32>().ok());
    let company = form.get("CompanyId").and_then(|v| v.parse::<u32>().ok());

    if reference == Some(options.booking_no.as_str())
        && year == Some(options.hit_year)
        && company == Some(options.hit_company)
    {
        Html(options.report_html.clone()).into_response()
    } else {
        Html(NO_DATA_PAGE.to_string()).into_response()
    }
}

async fn search(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authed(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    begin_session_request(&state, &headers);
    if !state.options.search_delay.is_zero() {
        tokio::time::sleep(state.options.search_delay).await;
    }
    let response = match form.get("SearchText") {
        None => StatusCode::BAD_REQUEST.into_response(),
        Some(challan_no)
            if state
                .options
                .failing_searches
                .iter()
                .any(|c| c == challan_no) =>
        {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Some(challan_no) => match state.options.search_ids.get(challan_no) {
            Some(&system_id) => Html(search_result(challan_no, system_id)).into_response(),
            None => Html("<select></select>".to_string()).into_response(),
        },
    };
    end_session_request(&state, &headers);
    response
}

async fn details(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !authed(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    begin_session_request(&state, &headers);
    let system_id = form.get("Id").and_then(|v| v.parse::<i64>().ok());
    let response = match system_id.and_then(|id| state.options.details.get(&id)) {
        Some(html) => Html(html.clone()).into_response(),
        None => Html("<html></html>".to_string()).into_response(),
    };
    end_session_request(&state, &headers);
    response
}
