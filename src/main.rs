//! Loan Console
//!
//! Command line front end for loan administrators: browse and filter loan
//! applications, move them through the status workflow, assign them, watch
//! the dashboard and export reports.

use clap::Parser;

use loan_console::config::Config;
use loan_console::error::ClientError;

mod cli;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        environment = config.environment.as_str(),
        api = %config.api_base_url,
        "Configuration loaded"
    );

    let args = cli::Cli::parse();
    if let Err(e) = cli::run(args, config).await {
        match e.downcast_ref::<ClientError>() {
            Some(client_error) => {
                tracing::debug!(code = client_error.error_code(), error = %client_error, "Command failed");
                eprintln!("Error: {}", client_error.user_message());
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}
