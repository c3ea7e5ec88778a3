use std::time::Duration;

use axum::Json;
use serde::Serialize;

use server_timing::{MetricMap, Result, ServerTiming, Timeline};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub id: u32,
    pub label: String,
}

// ─── GET /api/report ─────────────────────────────────────────────
// Simulates a page render that contains a data fetch.
//
//   render: whole render, reported as render minus data via a hook
//   data:   the (fake) backend fetch
//   cache:  an externally measured lookup

pub async fn report(timing: ServerTiming) -> Result<Json<Report>> {
    timing.lock().from("render", Some("Render"))?;

    // ── Fetch ───────────────────────────────────────────────────
    timing.lock().from("data", Some("Data fetch"))?;
    let rows = fetch_rows().await;
    timing.lock().to("data", None)?;

    // Pretend a cache client measured this on its own.
    timing.lock().add("cache", "Cache lookup", 0.4)?;

    // ── Render ──────────────────────────────────────────────────
    tokio::time::sleep(Duration::from_millis(5)).await;
    let report = Report { rows, cached: false };

    let mut session = timing.lock();
    session.to("render", None)?;
    session.add_hook("render-excludes-data", exclude_data_from_render, None);

    Ok(Json(report))
}

async fn fetch_rows() -> Vec<ReportRow> {
    tokio::time::sleep(Duration::from_millis(20)).await;
    (1..=3)
        .map(|id| ReportRow {
            id,
            label: format!("row {id}"),
        })
        .collect()
}

/// Rewrites `render` so it only covers time not spent in `data`.
fn exclude_data_from_render(mut metrics: MetricMap, timeline: &Timeline) -> MetricMap {
    let own = match (metrics.get("render"), metrics.get("data")) {
        (Some(render), Some(data)) => Some(
            (timeline.calculate_duration_smart(render) - timeline.calculate_duration_smart(data))
                .abs(),
        ),
        _ => None,
    };
    if let (Some(own), Some(render)) = (own, metrics.get_mut("render")) {
        render.duration = Some(own);
    }
    metrics
}
