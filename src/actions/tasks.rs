use crate::{
    action::{parse_parameters, PollPolicy, RunOptions},
    actions::utils::{output_format, print_formatted},
    commands::params::{
        PARAMETER_ACTION_ID, PARAMETER_PARAMETER, PARAMETER_POLL_INTERVAL, PARAMETER_RETRIES,
        PARAMETER_TIMEOUT,
    },
    context::ExecutionContext,
    error::CliError,
};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub async fn run(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let action_id = sub_matches
        .get_one::<String>(PARAMETER_ACTION_ID)
        .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_ACTION_ID.to_string()))?;
    let parameters = parse_parameters(
        sub_matches
            .get_many::<String>(PARAMETER_PARAMETER)
            .into_iter()
            .flatten()
            .map(String::as_str),
    )
    .map_err(CliError::InvalidArgument)?;

    let ctx = ExecutionContext::from_args(sub_matches).await?;
    let connection = ctx.connection(sub_matches)?;
    let configuration = ctx.configuration();

    let poll = PollPolicy {
        interval: sub_matches
            .get_one::<u64>(PARAMETER_POLL_INTERVAL)
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or_else(|| configuration.poll_interval()),
        timeout: sub_matches
            .get_one::<u64>(PARAMETER_TIMEOUT)
            .map(|secs| Duration::from_secs(*secs))
            .or_else(|| configuration.poll_timeout()),
    };
    let retries = sub_matches
        .get_one::<u32>(PARAMETER_RETRIES)
        .copied()
        .unwrap_or_else(|| configuration.max_retries());

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let options = RunOptions::new(retries)
        .with_parameters(parameters)
        .with_poll(poll)
        .with_cancellation(cancellation);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Running {}...", action_id));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = ctx.client().run_action(&connection, action_id, &options).await;
    spinner.finish_and_clear();
    let report = result?;

    match output_format(sub_matches)? {
        Some(_) => print_formatted(&report, sub_matches),
        None => {
            print!("{}", report);
            Ok(())
        }
    }
}
