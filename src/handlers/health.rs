use axum::Json;
use serde::Serialize;

use server_timing::{Result, ServerTiming};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

// ─── GET /api/health ─────────────────────────────────────────────
// Only reports a whole-request `total` metric: with no `from`/`to` the
// span runs from session start to the moment headers are written.

pub async fn health(timing: ServerTiming) -> Result<Json<Health>> {
    timing.lock().description("total", "Total response time")?;
    Ok(Json(Health { status: "ok" }))
}
