//! File upload and download commands.

use clap::{ArgMatches, Command};

use crate::{
    commands::params::{
        chunk_size_parameter, connection_parameters, file_id_parameter, file_parameter,
        output_dir_parameter, COMMAND_DOWNLOAD, COMMAND_UPLOAD,
    },
    error::CliError,
};

pub fn upload_command() -> Command {
    Command::new(COMMAND_UPLOAD)
        .about("Upload a local file to a server-side file in chunks")
        .arg(file_id_parameter())
        .arg(file_parameter())
        .arg(chunk_size_parameter())
        .args(connection_parameters())
}

pub fn download_command() -> Command {
    Command::new(COMMAND_DOWNLOAD)
        .about("Download a server-side file chunk by chunk")
        .arg(file_id_parameter())
        .arg(output_dir_parameter())
        .args(connection_parameters())
}

pub async fn execute_upload_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    crate::actions::transfer::upload(sub_matches).await
}

pub async fn execute_download_command(sub_matches: &ArgMatches) -> Result<(), CliError> {
    crate::actions::transfer::download(sub_matches).await
}
