//! CLI command definitions and argument parsing.
//!
//! Commands are built with the clap builder API, one module per command
//! group. Each module pairs the command definition with an `execute_*`
//! function that hands the parsed arguments to [`crate::actions`].

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::error::CliError;

pub mod config;
pub mod params;
pub mod resource;
pub mod run;
pub mod transfer;
pub mod user;

pub use params::{
    COMMAND_CONFIG, COMMAND_DOWNLOAD, COMMAND_LIST, COMMAND_MODELS, COMMAND_RESOLVE, COMMAND_RUN,
    COMMAND_UPLOAD, COMMAND_USER, COMMAND_WORKSPACES, PARAMETER_VERBOSE,
};

/// The complete command line interface.
pub fn cli_command() -> Command {
    Command::new("anaplan")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(PARAMETER_VERBOSE)
                .short('v')
                .long(PARAMETER_VERBOSE)
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable verbose output for debugging"),
        )
        .subcommand(resource::list_command())
        .subcommand(resource::resolve_command())
        .subcommand(transfer::upload_command())
        .subcommand(transfer::download_command())
        .subcommand(run::run_command())
        .subcommand(user::user_command())
        .subcommand(user::workspaces_command())
        .subcommand(user::models_command())
        .subcommand(config::config_command())
}

pub fn create_cli_commands() -> ArgMatches {
    cli_command().get_matches()
}

/// Dispatches the parsed command line to its handler
pub async fn execute_command(matches: &ArgMatches) -> Result<(), CliError> {
    match matches.subcommand() {
        Some((COMMAND_LIST, sub_matches)) => resource::execute_list_command(sub_matches).await,
        Some((COMMAND_RESOLVE, sub_matches)) => resource::execute_resolve_command(sub_matches).await,
        Some((COMMAND_UPLOAD, sub_matches)) => transfer::execute_upload_command(sub_matches).await,
        Some((COMMAND_DOWNLOAD, sub_matches)) => {
            transfer::execute_download_command(sub_matches).await
        }
        Some((COMMAND_RUN, sub_matches)) => run::execute_run_command(sub_matches).await,
        Some((COMMAND_USER, sub_matches)) => user::execute_user_command(sub_matches).await,
        Some((COMMAND_WORKSPACES, sub_matches)) => {
            user::execute_workspaces_command(sub_matches).await
        }
        Some((COMMAND_MODELS, sub_matches)) => user::execute_models_command(sub_matches).await,
        Some((COMMAND_CONFIG, sub_matches)) => config::execute_config_command(sub_matches),
        Some((name, _)) => Err(CliError::UnsupportedSubcommand(name.to_string())),
        None => Err(CliError::UnsupportedSubcommand("none".to_string())),
    }
}
