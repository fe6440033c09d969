use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use latexmill::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Diagnostics from latex go to stdout through the reporter; tracing goes to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.kind() == ErrorKind::DisplayVersion { 0 } else { 1 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    tracing::info!("CLI arguments parsed, invoking run");
    let result = run(cli).await;
    match &result {
        Ok(_) => tracing::info!("CLI completed successfully"),
        Err(e) => tracing::error!(error = %e, "CLI exited with error"),
    }
    result
}
