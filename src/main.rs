use clap::Parser;
use stagetrack::cli::{record, Cli};
use stagetrack::config::Config;
use tracing::error;

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json_logs {
        config.logging.format = "json".into();
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }
    config.init_logging();

    if let Err(e) = record::execute(cli.command, &config) {
        error!(error = %format!("{e:#}"), "Command failed");
        std::process::exit(1);
    }
}
