//! Combinatorial endpoint probing.
//!
//! The ERP's report endpoints silently render an empty page unless the
//! request carries the exact fiscal year, company, and (for some reports)
//! location and warehouse-company ids the document was booked under - and
//! nothing in the ERP tells you which those are. The prober sweeps a
//! bounded, deterministic cross-product of dimension values and
//! short-circuits on the first response with usable data.
//!
//! Each attempt is a `Result<String, SkipReason>`: transport errors and
//! "no data" pages are skips, not failures. Only total exhaustion is
//! surfaced, as `None` ("booking not found").

use chrono::{Datelike, Utc};
use tracing::{debug, info, instrument};

use seamline_core::report::{ReportKind, ReportQuery};

use crate::config::SweepConfig;

use super::{ErpClient, report_path};

/// Bodies shorter than this are near-empty error pages, not reports.
const MIN_BODY_LEN: usize = 500;

/// Phrases the ERP renders instead of a table when nothing matched.
const NO_DATA_SENTINELS: [&str; 2] = ["data not found", "no data found"];

/// One point of the dimension cross-product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionCombo {
    pub year: i32,
    pub company_id: u32,
    pub location_id: Option<u32>,
    pub warehouse_id: Option<u32>,
}

impl std::fmt::Display for DimensionCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "year={} company={}", self.year, self.company_id)?;
        if let Some(location) = self.location_id {
            write!(f, " location={location}")?;
        }
        if let Some(warehouse) = self.warehouse_id {
            write!(f, " warehouse={warehouse}")?;
        }
        Ok(())
    }
}

/// Why one combination was skipped. Data, not an error: the sweep simply
/// moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Network/transport failure for this one request.
    Transport(String),
    /// Non-200 status.
    Status(u16),
    /// Body below [`MIN_BODY_LEN`].
    TooShort(usize),
    /// Body contained a known "no data" sentinel phrase.
    NoData,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Status(code) => write!(f, "status {code}"),
            Self::TooShort(len) => write!(f, "body too short ({len} bytes)"),
            Self::NoData => write!(f, "no-data sentinel"),
        }
    }
}

/// The first usable response of a sweep.
#[derive(Debug, Clone)]
pub struct SweepHit {
    pub html: String,
    /// The combination that produced the data, for operator logs.
    pub combo: DimensionCombo,
}

/// Build the full sweep order for a report kind.
///
/// Deterministic: years descending from `current + years_forward` to
/// `current - years_back` (recent documents are overwhelmingly more
/// likely), company ids ascending, then location x warehouse ascending for
/// warehouse-scoped kinds. First-match-wins semantics depend on this order
/// never changing between runs.
#[must_use]
pub fn combinations(
    sweep: &SweepConfig,
    kind: ReportKind,
    current_year: i32,
) -> Vec<DimensionCombo> {
    let mut combos = Vec::new();
    let top = current_year + sweep.years_forward;
    let bottom = current_year - sweep.years_back;

    for year in (bottom..=top).rev() {
        for company_id in 1..=sweep.max_company_id {
            if kind.warehouse_scoped() {
                for &location_id in &sweep.location_ids {
                    for &warehouse_id in &sweep.warehouse_ids {
                        combos.push(DimensionCombo {
                            year,
                            company_id,
                            location_id: Some(location_id),
                            warehouse_id: Some(warehouse_id),
                        });
                    }
                }
            } else {
                combos.push(DimensionCombo {
                    year,
                    company_id,
                    location_id: None,
                    warehouse_id: None,
                });
            }
        }
    }
    combos
}

/// Screen a 200 body for usable report data.
fn usable(body: &str) -> Result<(), SkipReason> {
    if body.len() < MIN_BODY_LEN {
        return Err(SkipReason::TooShort(body.len()));
    }
    let lower = body.to_lowercase();
    if NO_DATA_SENTINELS.iter().any(|s| lower.contains(s)) {
        return Err(SkipReason::NoData);
    }
    Ok(())
}

fn build_form(query: &ReportQuery, combo: DimensionCombo) -> Vec<(String, String)> {
    let reference_field = match query.kind {
        // The factory report is keyed by date, not booking number.
        ReportKind::Factory => "ReportDate",
        _ => "BookingNo",
    };
    let mut form = vec![
        (reference_field.to_string(), query.reference.clone()),
        ("Year".to_string(), combo.year.to_string()),
        ("CompanyId".to_string(), combo.company_id.to_string()),
    ];
    if let Some(location_id) = combo.location_id {
        form.push(("LocationId".to_string(), location_id.to_string()));
    }
    if let Some(warehouse_id) = combo.warehouse_id {
        form.push((
            "WareHouseCompanyId".to_string(),
            warehouse_id.to_string(),
        ));
    }
    form
}

async fn attempt(
    erp: &ErpClient,
    query: &ReportQuery,
    cookie: &str,
    combo: DimensionCombo,
) -> Result<String, SkipReason> {
    let form = build_form(query, combo);
    let response = erp
        .post_form(report_path(query.kind), &form, cookie)
        .await
        .map_err(|e| SkipReason::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SkipReason::Status(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| SkipReason::Transport(e.to_string()))?;
    usable(&body)?;
    Ok(body)
}

/// Sweep the dimension cross-product until one combination renders usable
/// report HTML.
///
/// Combinations are probed sequentially (one request in flight) both to
/// spare the legacy ERP and to keep first-match semantics deterministic.
/// Returns `None` when the sweep is exhausted - the caller surfaces
/// "booking not found".
#[instrument(skip(erp, cookie), fields(reference = %query.reference, kind = ?query.kind))]
pub async fn fetch_report(
    erp: &ErpClient,
    query: &ReportQuery,
    cookie: &str,
) -> Option<SweepHit> {
    let combos = combinations(&erp.config().sweep, query.kind, Utc::now().year());
    let total = combos.len();

    for (probed, combo) in combos.into_iter().enumerate() {
        match attempt(erp, query, cookie, combo).await {
            Ok(html) => {
                info!(%combo, probed = probed + 1, total, "sweep hit");
                return Some(SweepHit { html, combo });
            }
            Err(skip) => {
                debug!(%combo, %skip, "combination skipped");
            }
        }
    }

    info!(total, "sweep exhausted without usable data");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> SweepConfig {
        SweepConfig {
            years_back: 3,
            years_forward: 1,
            max_company_id: 5,
            location_ids: vec![1, 2],
            warehouse_ids: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_combination_count_simple_kind() {
        // 5 years x 5 companies
        let combos = combinations(&sweep(), ReportKind::Closing, 2026);
        assert_eq!(combos.len(), 25);
        assert!(combos.iter().all(|c| c.location_id.is_none()));
    }

    #[test]
    fn test_combination_count_warehouse_scoped() {
        // 5 years x 5 companies x 2 locations x 3 warehouses
        let combos = combinations(&sweep(), ReportKind::Challan, 2026);
        assert_eq!(combos.len(), 150);
    }

    #[test]
    fn test_sweep_order_years_descending_then_company_ascending() {
        let combos = combinations(&sweep(), ReportKind::Closing, 2026);
        let first = combos.first().expect("non-empty");
        assert_eq!((first.year, first.company_id), (2027, 1));
        let second = combos.get(1).expect("non-empty");
        assert_eq!((second.year, second.company_id), (2027, 2));
        let last = combos.last().expect("non-empty");
        assert_eq!((last.year, last.company_id), (2023, 5));
    }

    #[test]
    fn test_sweep_order_is_reproducible() {
        let a = combinations(&sweep(), ReportKind::ColorWise, 2026);
        let b = combinations(&sweep(), ReportKind::ColorWise, 2026);
        assert_eq!(a, b);
    }

    #[test]
    fn test_usable_rejects_short_bodies() {
        assert_eq!(usable("<html></html>"), Err(SkipReason::TooShort(13)));
    }

    #[test]
    fn test_usable_rejects_no_data_sentinels() {
        let body = format!("<html>{}Data not Found</html>", "x".repeat(600));
        assert_eq!(usable(&body), Err(SkipReason::NoData));
        let body = format!("<html>{}NO DATA FOUND</html>", "x".repeat(600));
        assert_eq!(usable(&body), Err(SkipReason::NoData));
    }

    #[test]
    fn test_usable_accepts_real_tables() {
        let body = format!("<html><table>{}</table></html>", "<tr><td>1</td></tr>".repeat(50));
        assert_eq!(usable(&body), Ok(()));
    }

    #[test]
    fn test_factory_form_uses_report_date() {
        let query = ReportQuery::new("2026-08-01".to_string(), ReportKind::Factory);
        let combo = DimensionCombo {
            year: 2026,
            company_id: 1,
            location_id: None,
            warehouse_id: None,
        };
        let form = build_form(&query, combo);
        assert_eq!(
            form.first().map(|(k, v)| (k.as_str(), v.as_str())),
            Some(("ReportDate", "2026-08-01"))
        );
    }
}
