//! QueryDesk - run SQL and ask questions about your data from the terminal.

use std::sync::Arc;

use querydesk::api::{Backend, HttpBackend, MockBackend};
use querydesk::cli::Cli;
use querydesk::error::Result;
use querydesk::{logging, tui};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Loaded before logging so RUST_LOG and QUERYDESK_API_URL can live in .env
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    if cli.is_headless() {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    match run(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<i32> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = cli.load_config()?;

    let backend: Arc<dyn Backend> = if cli.mock {
        info!("Using mock backend");
        Arc::new(MockBackend::new())
    } else {
        let http = HttpBackend::new(&config.api)?;
        info!("Using backend at {}", http.base_url());
        Arc::new(http)
    };

    if cli.is_headless() {
        return tui::headless::run_headless(cli, backend, &config).await;
    }

    tui::run(backend, &config).await?;
    Ok(0)
}
