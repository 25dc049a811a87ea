//! Configuration command definitions.

use clap::{Arg, ArgMatches, Command};

use crate::{
    commands::params::{
        format_parameters, COMMAND_CONFIG, COMMAND_GET, COMMAND_PATH, COMMAND_SET, COMMAND_SHOW,
        PARAMETER_PROPERTY, PARAMETER_VALUE,
    },
    configuration::PROPERTY_NAMES,
    error::CliError,
};

pub fn config_command() -> Command {
    Command::new(COMMAND_CONFIG)
        .about("Configuration management")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get configuration details")
                .subcommand_required(true)
                .subcommand(Command::new(COMMAND_PATH).about("Show configuration file path")),
        )
        .subcommand(
            Command::new(COMMAND_SHOW)
                .about("Show the effective configuration")
                .args(format_parameters()),
        )
        .subcommand(
            Command::new(COMMAND_SET)
                .about("Set a configuration property; an empty value clears optional ones")
                .arg(
                    Arg::new(PARAMETER_PROPERTY)
                        .required(true)
                        .num_args(1)
                        .value_parser(PROPERTY_NAMES)
                        .help("Property name"),
                )
                .arg(
                    Arg::new(PARAMETER_VALUE)
                        .required(true)
                        .num_args(1)
                        .allow_hyphen_values(true)
                        .help("New value"),
                ),
        )
}

pub fn execute_config_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    match sub_matches.subcommand() {
        Some((COMMAND_GET, get_matches)) => match get_matches.subcommand() {
            Some((COMMAND_PATH, _)) => crate::actions::config::print_path(),
            Some((name, _)) => Err(CliError::UnsupportedSubcommand(name.to_string())),
            None => Err(CliError::UnsupportedSubcommand(COMMAND_GET.to_string())),
        },
        Some((COMMAND_SHOW, show_matches)) => crate::actions::config::show(show_matches),
        Some((COMMAND_SET, set_matches)) => crate::actions::config::set(set_matches),
        Some((name, _)) => Err(CliError::UnsupportedSubcommand(name.to_string())),
        None => Err(CliError::UnsupportedSubcommand(COMMAND_CONFIG.to_string())),
    }
}
