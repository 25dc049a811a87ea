//! Resource listing and name resolution commands.

use clap::{ArgMatches, Command};

use crate::{
    commands::params::{
        connection_parameters, format_parameters, kind_parameter, name_parameter, COMMAND_LIST,
        COMMAND_RESOLVE,
    },
    error::CliError,
};

pub fn list_command() -> Command {
    Command::new(COMMAND_LIST)
        .about("List the files, imports, exports, processes or actions of a model")
        .visible_alias("ls")
        .arg(kind_parameter())
        .args(connection_parameters())
        .args(format_parameters())
}

pub fn resolve_command() -> Command {
    Command::new(COMMAND_RESOLVE)
        .about("Look up the ID of a named resource")
        .arg(kind_parameter())
        .arg(name_parameter())
        .args(connection_parameters())
}

pub async fn execute_list_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    crate::actions::resources::list_resources(sub_matches).await
}

pub async fn execute_resolve_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    crate::actions::resources::resolve_resource(sub_matches).await
}
