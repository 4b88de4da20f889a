use llm_market_sim::config::{AppConfig, ReportFormat};
use llm_market_sim::market::MarketEnvironment;
use llm_market_sim::services::reporting::{self, RunSummary};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Pick up OPENAI_API_KEY etc. from a local .env
    dotenvy::dotenv().ok();

    // Load Configuration
    let config = AppConfig::load()?;

    // Setup Logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.chatter_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting LLM Market Sim...");
    info!(
        "Loaded Configuration: agents={}, ticks={}, provider={}, seed={:?}",
        config.agents,
        config.ticks,
        config.decision.provider.as_str(),
        config.seed
    );

    let mut market = MarketEnvironment::new(&config);

    if let Some(reason) = market.halt_reason() {
        error!("Simulation not started: {}", reason);
        println!("{}", reporting::halted_message(reason));
        return Ok(());
    }

    info!("Starting Financial Market Simulation...");

    if config.report.format == ReportFormat::Table {
        println!("{}", reporting::table_header());
        println!("{}", reporting::separator());
    }

    let start_price = market.price();
    for _ in 0..config.ticks {
        let Some(snapshot) = market.tick().await else {
            break;
        };
        match config.report.format {
            ReportFormat::Table => println!("{}", reporting::format_row(snapshot)),
            ReportFormat::Json => println!("{}", reporting::format_json(snapshot)?),
        }
    }

    let summary = RunSummary::from_snapshots(start_price, market.recorder().snapshots());
    if config.report.format == ReportFormat::Table {
        println!("{}", reporting::separator());
        println!("{}", summary.render());
    } else {
        println!("{}", serde_json::to_string(&summary)?);
    }

    Ok(())
}
