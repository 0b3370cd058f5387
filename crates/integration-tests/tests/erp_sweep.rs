//! Dimension-sweep probing against the mock ERP.

use chrono::{Datelike, Utc};

use seamline_core::report::{ReportKind, ReportQuery};
use seamline_integration_tests::{MockErp, MockErpOptions, challan_register};
use seamline_server::erp::{ErpClient, prober};

fn query(reference: &str, kind: ReportKind) -> ReportQuery {
    ReportQuery {
        reference: reference.to_string(),
        kind,
    }
}

#[tokio::test]
async fn test_sweep_finds_document_under_older_year() {
    // The document sits at the last probed combination: previous fiscal
    // year, highest company id.
    let mock = MockErp::start(MockErpOptions {
        booking_no: "BK-77".to_string(),
        hit_year: Utc::now().year() - 1,
        hit_company: 2,
        report_html: challan_register(&[("CH-1", 100)]),
        ..Default::default()
    })
    .await;

    let erp = ErpClient::new(mock.config());
    let cookie = erp.login().await.expect("login");

    let hit = prober::fetch_report(&erp, &query("BK-77", ReportKind::Challan), &cookie)
        .await
        .expect("sweep hit");
    assert_eq!(hit.combo.year, Utc::now().year() - 1);
    assert_eq!(hit.combo.company_id, 2);
    assert!(hit.html.contains("CH-1"));
}

#[tokio::test]
async fn test_sweep_exhausts_for_unknown_booking() {
    let mock = MockErp::start(MockErpOptions {
        booking_no: "BK-77".to_string(),
        hit_year: Utc::now().year(),
        hit_company: 1,
        report_html: challan_register(&[("CH-1", 100)]),
        ..Default::default()
    })
    .await;

    let erp = ErpClient::new(mock.config());
    let cookie = erp.login().await.expect("login");

    let miss = prober::fetch_report(&erp, &query("BK-UNKNOWN", ReportKind::Challan), &cookie).await;
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_sweep_stops_probing_at_the_first_hit() {
    // Sweep order for this config: (current year, company 1),
    // (current year, company 2), (previous year, company 1),
    // (previous year, company 2). The document sits at the second
    // combination, so the last two must never be requested.
    let mock = MockErp::start(MockErpOptions {
        booking_no: "BK-77".to_string(),
        hit_year: Utc::now().year(),
        hit_company: 2,
        report_html: challan_register(&[("CH-1", 100)]),
        ..Default::default()
    })
    .await;

    let erp = ErpClient::new(mock.config());
    let cookie = erp.login().await.expect("login");

    let hit = prober::fetch_report(&erp, &query("BK-77", ReportKind::Challan), &cookie)
        .await
        .expect("sweep hit");
    assert_eq!(hit.combo.company_id, 2);
    assert_eq!(
        mock.report_count(),
        2,
        "the sweep must not probe combinations past the match"
    );
}

#[tokio::test]
async fn test_sweep_is_deterministic() {
    let mock = MockErp::start(MockErpOptions {
        booking_no: "BK-5".to_string(),
        hit_year: Utc::now().year(),
        hit_company: 2,
        report_html: challan_register(&[("CH-9", 10)]),
        ..Default::default()
    })
    .await;

    let erp = ErpClient::new(mock.config());
    let cookie = erp.login().await.expect("login");

    let q = query("BK-5", ReportKind::Challan);
    let first = prober::fetch_report(&erp, &q, &cookie)
        .await
        .expect("first sweep");
    let second = prober::fetch_report(&erp, &q, &cookie)
        .await
        .expect("second sweep");
    assert_eq!(first.combo, second.combo);
}

#[tokio::test]
async fn test_unauthenticated_sweep_is_exhausted_not_an_error() {
    let mock = MockErp::start(MockErpOptions {
        booking_no: "BK-77".to_string(),
        hit_year: Utc::now().year(),
        hit_company: 1,
        report_html: challan_register(&[("CH-1", 100)]),
        ..Default::default()
    })
    .await;

    let erp = ErpClient::new(mock.config());
    // No session cookie: every combination answers 401 and is skipped.
    let miss = prober::fetch_report(&erp, &query("BK-77", ReportKind::Challan), "").await;
    assert!(miss.is_none());
}
