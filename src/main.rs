use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use slotbook::config::EngineConfig;
use slotbook::engine::Engine;
use slotbook::model::Catalog;
use slotbook::notify::NotifyHub;
use slotbook::window::SlotCell;

/// Load a JSON catalog and print the first window of open slots.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let metrics_port: Option<u16> = std::env::var("SLOTBOOK_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    slotbook::observability::init(metrics_port)?;

    let catalog_path = std::env::var("SLOTBOOK_CATALOG")
        .map(PathBuf::from)
        .map_err(|_| "SLOTBOOK_CATALOG must point to a JSON catalog")?;
    let practitioner: Option<u64> = std::env::var("SLOTBOOK_PRACTITIONER")
        .ok()
        .and_then(|s| s.parse().ok());
    let config = EngineConfig::from_env()?;

    let raw = std::fs::read_to_string(&catalog_path)?;
    let catalog: Catalog = serde_json::from_str(&raw)?;
    info!("catalog: {}", catalog_path.display());
    info!("  window_days: {}", config.window_days);
    info!("  utc_offset_minutes: {}", config.utc_offset_minutes);

    let engine = Engine::new(config, Arc::new(NotifyHub::new()))?;
    engine.load_catalog(catalog).await;

    let practitioner = match practitioner {
        Some(id) => Some(id),
        None => engine.practitioners().await.first().map(|p| p.id),
    };
    if let Some(id) = practitioner {
        let p = engine.get_practitioner(id).await?;
        println!("{}", p.display_name());
    }

    let window = engine.initial_window().await;
    for day in engine.availability_window(practitioner, &window, None).await {
        let cells: Vec<&str> = day
            .slots
            .iter()
            .map(|c| match c {
                SlotCell::Open { label, .. } => label.as_str(),
                SlotCell::Empty => "-",
            })
            .collect();
        println!("{} {} {}: {}", day.weekday, day.day, day.month, cells.join(" "));
    }

    for row in engine.list_appointments().await? {
        println!("#{} {} / {} / {}", row.id, row.practitioner, row.patient, row.when);
    }
    Ok(())
}
