use clap::{Parser, Subcommand};
use hrb_scraper::browser::HttpBrowser;
use hrb_scraper::config::Config;
use hrb_scraper::ledger::{InMemoryLedger, LedgerStore, SheetsLedger};
use hrb_scraper::pipeline::{self, sink::IngestionSink, RunHandle};
use hrb_scraper::{logging, server};
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "hrb_scraper")]
#[command(about = "Handelsregister registration announcement scraper")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one crawl–dedup–extract pass, appending new records to the ledger
    Run,
    /// Run one pass, writing the batch to a local CSV file instead
    Export {
        /// Skip the ledger entirely and dedup against an empty snapshot
        #[arg(long)]
        offline: bool,
    },
    /// Start the HTTP trigger server (and the scheduler, if enabled)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(path: &str) -> Config {
    match Config::load_from(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("⚠️  Could not load '{path}' ({e}), using built-in defaults");
            Config::defaults()
        }
    }
}

fn print_report(report: &pipeline::RunReport) {
    println!("\n📊 Run {} results:", report.run_id);
    println!("   Query tasks: {}", report.tasks_total);
    println!("   Candidates discovered: {}", report.candidates_discovered);
    println!("   New candidates: {}", report.new_candidates);
    println!("   Records extracted: {}", report.records_extracted);
    println!("   Rows appended: {}", report.rows_appended);
    if let Some(file) = &report.output_file {
        println!("   Output file: {file}");
    }
    if !report.tasks_failed.is_empty() {
        println!("\n⚠️  Failed search tasks:");
        for failure in &report.tasks_failed {
            println!("   - {failure}");
        }
    }
    if !report.failed_extractions.is_empty() {
        println!("\n⚠️  Failed extractions (retried on the next run):");
        for id in &report.failed_extractions {
            println!("   - {id}");
        }
    }
    println!("   Duration: {:.1}s", report.duration_secs);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli.config);

    match cli.command {
        Commands::Run => {
            println!("🔄 Running scrape pipeline against the ledger...");
            let ledger: Arc<dyn LedgerStore> = Arc::new(SheetsLedger::from_config(&config.ledger));
            let sink = IngestionSink::Ledger {
                store: ledger.clone(),
                table: config.ledger.table.clone(),
            };
            let mut browser = HttpBrowser::new();
            let handle = RunHandle::new();
            match pipeline::run(&config, &mut browser, ledger, &sink, &handle).await {
                Ok(report) => print_report(&report),
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Pipeline failed: {e}");
                }
            }
        }
        Commands::Export { offline } => {
            println!("📤 Running scrape pipeline with local export...");
            let ledger: Arc<dyn LedgerStore> = if offline {
                Arc::new(InMemoryLedger::new())
            } else {
                Arc::new(SheetsLedger::from_config(&config.ledger))
            };
            let sink = IngestionSink::LocalExport {
                output_dir: config.export.output_dir.clone(),
            };
            let mut browser = HttpBrowser::new();
            let handle = RunHandle::new();
            match pipeline::run(&config, &mut browser, ledger, &sink, &handle).await {
                Ok(report) => print_report(&report),
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Pipeline failed: {e}");
                }
            }
        }
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            server::start_server(Arc::new(config)).await?;
        }
    }
    Ok(())
}
