use std::net::SocketAddr;

use crate::engine::EngineError;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: booking attempts. Labels: status.
pub const BOOKINGS_TOTAL: &str = "slotbook_bookings_total";

/// Histogram: booking latency in seconds, lock wait included.
pub const BOOKING_DURATION_SECONDS: &str = "slotbook_booking_duration_seconds";

/// Counter: availability computations.
pub const AVAILABILITY_QUERIES_TOTAL: &str = "slotbook_availability_queries_total";

/// Counter: appointments deleted.
pub const APPOINTMENTS_REMOVED_TOTAL: &str = "slotbook_appointments_removed_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: appointments currently held.
pub const APPOINTMENTS_ACTIVE: &str = "slotbook_appointments_active";

/// Gauge: timeslots in the loaded catalog.
pub const TIMESLOTS_LOADED: &str = "slotbook_timeslots_loaded";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Short label for a booking outcome.
pub fn outcome_label<T>(result: &Result<T, EngineError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) if e.is_validation() => "invalid",
        Err(EngineError::Conflict { .. }) => "conflict",
        Err(EngineError::NotFound { .. }) => "not_found",
        Err(EngineError::LimitExceeded(_)) => "limit",
        Err(_) => "error",
    }
}
