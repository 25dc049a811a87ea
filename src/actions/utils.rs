use crate::{
    commands::params::{PARAMETER_FORMAT, PARAMETER_HEADERS, PARAMETER_PRETTY},
    error::CliError,
    format::{Formattable, OutputFormat, OutputFormatOptions},
};
use clap::ArgMatches;

/// Output format selected on the command line, `None` when no format was given
pub fn output_format(sub_matches: &ArgMatches) -> Result<Option<OutputFormat>, CliError> {
    let options = OutputFormatOptions {
        with_headers: flag(sub_matches, PARAMETER_HEADERS),
        pretty: flag(sub_matches, PARAMETER_PRETTY),
    };
    match sub_matches.try_get_one::<String>(PARAMETER_FORMAT) {
        Ok(Some(name)) => Ok(Some(OutputFormat::from_string_with_options(name, options)?)),
        _ => Ok(None),
    }
}

/// Formats `value` and writes it to stdout
pub fn print_formatted<T: Formattable>(
    value: &T,
    sub_matches: &ArgMatches,
) -> Result<(), CliError> {
    let format = output_format(sub_matches)?.unwrap_or_default();
    let text = value.format(&format)?;
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}

// flags absent from a command read as false
fn flag(sub_matches: &ArgMatches, name: &str) -> bool {
    matches!(sub_matches.try_get_one::<bool>(name), Ok(Some(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new(PARAMETER_FORMAT).long(PARAMETER_FORMAT))
            .arg(
                Arg::new(PARAMETER_HEADERS)
                    .long(PARAMETER_HEADERS)
                    .action(ArgAction::SetTrue),
            )
    }

    #[test]
    fn test_output_format_from_args() {
        let matches = command()
            .try_get_matches_from(["test", "--format", "csv", "--headers"])
            .unwrap();
        assert_eq!(
            output_format(&matches).unwrap(),
            Some(OutputFormat::Csv(OutputFormatOptions {
                with_headers: true,
                pretty: false,
            }))
        );

        let matches = command().try_get_matches_from(["test"]).unwrap();
        assert_eq!(output_format(&matches).unwrap(), None);
    }
}
