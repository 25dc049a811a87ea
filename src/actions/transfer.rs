use crate::{
    commands::params::{PARAMETER_CHUNK_SIZE, PARAMETER_FILE, PARAMETER_FILE_ID, PARAMETER_OUTPUT_DIR},
    context::ExecutionContext,
    error::CliError,
    transfer::MIB,
};
use clap::ArgMatches;
use std::path::PathBuf;
use tracing::info;

fn file_id(sub_matches: &ArgMatches) -> Result<&String, CliError> {
    sub_matches
        .get_one::<String>(PARAMETER_FILE_ID)
        .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_FILE_ID.to_string()))
}

pub async fn upload(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let file_id = file_id(sub_matches)?;
    let path = sub_matches
        .get_one::<PathBuf>(PARAMETER_FILE)
        .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_FILE.to_string()))?;
    let ctx = ExecutionContext::from_args(sub_matches).await?;
    let connection = ctx.connection(sub_matches)?;

    let chunk_size = match sub_matches.get_one::<u64>(PARAMETER_CHUNK_SIZE) {
        Some(mib) => *mib as usize * MIB,
        None => ctx.configuration().chunk_size(),
    };

    let summary = ctx
        .client()
        .upload_file(&connection, file_id, path, chunk_size)
        .await?;
    println!(
        "Uploaded {} to file {} in {} chunk(s)",
        path.display(),
        summary.file_id,
        summary.chunk_count
    );
    Ok(())
}

pub async fn download(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let file_id = file_id(sub_matches)?;
    let directory = sub_matches
        .get_one::<PathBuf>(PARAMETER_OUTPUT_DIR)
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let ctx = ExecutionContext::from_args(sub_matches).await?;
    let connection = ctx.connection(sub_matches)?;

    let summary = ctx
        .client()
        .download_to_dir(&connection, file_id, &directory)
        .await?;
    info!(
        "Downloaded {} chunk(s), {} bytes",
        summary.chunk_count, summary.bytes
    );
    if let Some(path) = summary.path {
        println!("{}", path.display());
    }
    Ok(())
}
