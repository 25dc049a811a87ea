//! User, workspace and model discovery commands.

use clap::{ArgMatches, Command};

use crate::{
    commands::params::{
        format_parameters, username_parameter, COMMAND_MODELS, COMMAND_USER, COMMAND_WORKSPACES,
    },
    error::CliError,
};

pub fn user_command() -> Command {
    Command::new(COMMAND_USER)
        .about("Show the authenticated user")
        .arg(username_parameter())
        .args(format_parameters())
}

pub fn workspaces_command() -> Command {
    Command::new(COMMAND_WORKSPACES)
        .about("List the workspaces the user can access")
        .arg(username_parameter())
        .args(format_parameters())
}

pub fn models_command() -> Command {
    Command::new(COMMAND_MODELS)
        .about("List the models the user can access")
        .arg(username_parameter())
        .args(format_parameters())
}

pub async fn execute_user_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    crate::actions::users::current_user(sub_matches).await
}

pub async fn execute_workspaces_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    crate::actions::users::list_workspaces(sub_matches).await
}

pub async fn execute_models_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    crate::actions::users::list_models(sub_matches).await
}
