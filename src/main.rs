use clap::Parser;

use kvgate::cli::{Cli, execute_command, init_logger_from_settings, load_config};
use kvgate::error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let (settings, environment) = load_config(&cli)?;

    init_logger_from_settings(&settings, &cli).map_err(AppError::from)?;

    tracing::debug!(
        version = kvgate::pkg_version(),
        environment = %environment,
        "kvgate starting"
    );

    execute_command(&cli, settings, environment).await
}
