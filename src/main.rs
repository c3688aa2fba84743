use std::process;

use clap::Parser;
use log::error;

use repolens::{logging, Config, RepoExplainer, Result};

/// Explain a GitHub repository from the command line
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository URL to explain
    #[arg(short, long)]
    url: String,

    /// Pretty-print the JSON payload
    #[arg(short, long)]
    pretty: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let config = Config::load()?;
    config.ensure_tokens()?;

    let explainer = RepoExplainer::new(&config)?;
    match explainer.explain(&cli.url).await {
        Ok(payload) => {
            let rendered = if cli.pretty {
                serde_json::to_string_pretty(&payload)?
            } else {
                serde_json::to_string(&payload)?
            };
            println!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
