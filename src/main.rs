use anyhow::Result;
use receipt_shelflife::config::EngineConfig;
use receipt_shelflife::food_table::load_food_table;
use receipt_shelflife::pipeline::ReceiptPipeline;
use std::env;
use std::fs;
use std::io::Read;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize structured logging from the RUST_LOG environment variable
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read the raw OCR lines: from the file named as the first argument, or
/// from stdin when no argument is given
fn read_input() -> Result<String> {
    match env::args().nth(1) {
        Some(path) => {
            info!("Reading OCR lines from {}", path);
            Ok(fs::read_to_string(&path)?)
        }
        None => {
            info!("Reading OCR lines from stdin");
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    // Fail fast on startup: an invalid configuration or a structurally
    // invalid food table must never reach the scan path.
    let config = EngineConfig::from_env()?;
    config.validate()?;

    let table = load_food_table()?;
    info!(
        entries = table.len(),
        categories = table.categories().len(),
        "Engine ready"
    );

    let input = read_input()?;
    let pipeline = ReceiptPipeline::new(&table, &config);
    let items = pipeline.process_text(&input);

    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
