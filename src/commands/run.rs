//! Running imports, exports, processes and actions.

use clap::{ArgMatches, Command};

use crate::{
    commands::params::{
        action_id_parameter, connection_parameters, format_parameter, format_pretty_parameter,
        mapping_parameter, poll_interval_parameter, retries_parameter, timeout_parameter,
        COMMAND_RUN,
    },
    error::CliError,
};

pub fn run_command() -> Command {
    Command::new(COMMAND_RUN)
        .about("Run an action and wait for it to finish")
        .long_about(
            "Run an import (112...), export (116...), process (118...) or other action (117...), \
             wait for the task to complete and print its report. Failure dumps are fetched when \
             the server offers them. Without --format the human readable report is printed.",
        )
        .arg(action_id_parameter())
        .arg(mapping_parameter())
        .arg(retries_parameter())
        .arg(poll_interval_parameter())
        .arg(timeout_parameter())
        .args(connection_parameters())
        .arg(format_parameter().default_value(None::<&str>))
        .arg(format_pretty_parameter())
}

pub async fn execute_run_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    crate::actions::tasks::run(sub_matches).await
}
