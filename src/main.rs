use anaplan_client::{
    commands::{create_cli_commands, execute_command, PARAMETER_VERBOSE},
    exit_codes::ExitCode,
};
use tracing_subscriber::EnvFilter;

/// Main entry point for the program
#[tokio::main]
async fn main() {
    let matches = create_cli_commands();

    // RUST_LOG wins over --verbose
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if matches.get_flag(PARAMETER_VERBOSE) => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match execute_command(&matches).await {
        Ok(()) => std::process::exit(ExitCode::Success.code()),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(e.exit_code().code());
        }
    }
}
