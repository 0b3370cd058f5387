//! HTTP surface tests: real router, real services, mock ERP behind them.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Datelike, Utc};
use secrecy::SecretString;
use tower::ServiceExt;

use seamline_integration_tests::{MockErp, MockErpOptions, challan_register};
use seamline_server::config::ServerConfig;
use seamline_server::db::MemoryDocumentStore;
use seamline_server::routes;
use seamline_server::state::AppState;

fn app(mock: &MockErp) -> Router {
    let config = ServerConfig {
        database_url: SecretString::from("postgres://unused-in-tests"),
        host: "127.0.0.1".parse().expect("host"),
        port: 0,
        erp: mock.config(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    };
    let state = AppState::new(config, Arc::new(MemoryDocumentStore::new()));
    routes::routes().with_state(state)
}

fn mock_options() -> MockErpOptions {
    MockErpOptions {
        booking_no: "BK-42".to_string(),
        hit_year: Utc::now().year(),
        hit_company: 1,
        report_html: challan_register(&[("CH-1", 250)]),
        ..Default::default()
    }
}

async fn get(app: Router, uri: &str) -> StatusCode {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    response.status()
}

#[tokio::test]
async fn test_challan_report_found() {
    let mock = MockErp::start(mock_options()).await;
    let status = get(app(&mock), "/api/reports/challan/BK-42").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_challan_report_unknown_booking_is_404() {
    let mock = MockErp::start(mock_options()).await;
    let status = get(app(&mock), "/api/reports/challan/BK-NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_erp_down_is_bad_gateway_not_404() {
    let mock = MockErp::start(mock_options()).await;
    mock.set_reject_login(true);
    let status = get(app(&mock), "/api/reports/challan/BK-42").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_cookie_endpoint_reports_current_session() {
    let mock = MockErp::start(mock_options()).await;
    let status = get(app(&mock), "/api/erp/cookie").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mock.login_count(), 1);
}

#[tokio::test]
async fn test_po_parse_roundtrip() {
    let mock = MockErp::start(mock_options()).await;
    let text = "4501234567 NAVY BLUE M 120\n4501234567 NAVY BLUE L 80\n";
    let response = app(&mock)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/po/parse")
                .body(Body::from(text))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_po_parse_rejects_empty_body() {
    let mock = MockErp::start(mock_options()).await;
    let response = app(&mock)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/po/parse")
                .body(Body::from("   \n "))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
