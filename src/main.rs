use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use asir_services::directory::place_counts;
use asir_services::{
    open_backend, AdminWorkflow, DescriptionEnhancer, GeminiEnhancer, GovernorateRepository,
    MockMapsImporter, NoopEnhancer,
};
use asir_weather::MockWeatherProvider;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    asir_core::init()?;

    let app = asir_core::App::new()?;
    app.initialize()?;
    let config = app.config();

    tracing::info!("Asir Explorer started");

    let backend = open_backend(&config.storage, &config.data_dir)?;
    let repository = GovernorateRepository::with_key(backend, config.storage.key.clone());

    let importer = MockMapsImporter::new()
        .with_latency(Duration::from_millis(config.import.latency_ms))
        .with_batch_size(config.import.batch_size);
    let enhancer: Arc<dyn DescriptionEnhancer> = if config.ai.is_configured() {
        Arc::new(GeminiEnhancer::new(&config.ai)?)
    } else {
        Arc::new(NoopEnhancer)
    };

    let workflow = AdminWorkflow::open(repository, Arc::new(importer), enhancer)?;
    let governorates = workflow.governorates();

    let weather = MockWeatherProvider::new()
        .with_latency(Duration::from_millis(config.weather.latency_ms))
        .fetch(governorates.iter().map(|g| g.id.as_str()))
        .await;

    println!("Asir Explorer - Regional Tourism Directory");
    println!("Storage: {:?} ({})", config.storage.backend, config.data_dir.display());
    println!();
    for (id, name, count) in place_counts(&governorates) {
        match weather.get(id) {
            Some(w) => println!(
                "  {:<16} {:>3} places   {} {}° {}",
                name, count, w.icon, w.temp, w.condition
            ),
            None => println!("  {:<16} {:>3} places", name, count),
        }
    }

    if let Some(selected) = workflow.selected() {
        println!();
        println!("{}: {}", selected.name, workflow.region_summary().await?);
    }

    // Graceful shutdown
    app.shutdown()?;

    Ok(())
}
