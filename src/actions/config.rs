use crate::{
    actions::utils::print_formatted,
    commands::params::{PARAMETER_PROPERTY, PARAMETER_VALUE},
    configuration::Configuration,
    error::CliError,
};
use clap::ArgMatches;
use tracing::debug;

pub fn print_path() -> Result<(), CliError> {
    let path = Configuration::get_default_configuration_file_path()?;
    println!("{}", path.display());
    Ok(())
}

pub fn show(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let configuration = Configuration::load_default()?;
    print_formatted(&configuration, sub_matches)
}

pub fn set(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let property = sub_matches
        .get_one::<String>(PARAMETER_PROPERTY)
        .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_PROPERTY.to_string()))?;
    let value = sub_matches
        .get_one::<String>(PARAMETER_VALUE)
        .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_VALUE.to_string()))?;

    let mut configuration = Configuration::load_default()?;
    configuration.set(property, value)?;
    configuration.save_to_default()?;
    debug!("Set {} to {:?}", property, value);
    Ok(())
}
