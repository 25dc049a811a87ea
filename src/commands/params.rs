//! Shared command parameters for all CLI commands.
//!
//! Parameter names live here as constants together with the constructors for
//! arguments used by more than one command.

use crate::{format::OutputFormat, model::ResourceKind};
use clap::{Arg, ArgAction};
use std::path::PathBuf;
use strum::IntoEnumIterator;

// Top level commands
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_RESOLVE: &str = "resolve";
pub const COMMAND_UPLOAD: &str = "upload";
pub const COMMAND_DOWNLOAD: &str = "download";
pub const COMMAND_RUN: &str = "run";
pub const COMMAND_USER: &str = "user";
pub const COMMAND_WORKSPACES: &str = "workspaces";
pub const COMMAND_MODELS: &str = "models";
pub const COMMAND_CONFIG: &str = "config";

// Config subcommands
pub const COMMAND_GET: &str = "get";
pub const COMMAND_PATH: &str = "path";
pub const COMMAND_SHOW: &str = "show";
pub const COMMAND_SET: &str = "set";

// Parameter names
pub const PARAMETER_VERBOSE: &str = "verbose";
pub const PARAMETER_FORMAT: &str = "format";
pub const PARAMETER_PRETTY: &str = "pretty";
pub const PARAMETER_HEADERS: &str = "headers";
pub const PARAMETER_USERNAME: &str = "username";
pub const PARAMETER_WORKSPACE: &str = "workspace";
pub const PARAMETER_MODEL: &str = "model";
pub const PARAMETER_KIND: &str = "kind";
pub const PARAMETER_NAME: &str = "name";
pub const PARAMETER_FILE_ID: &str = "file-id";
pub const PARAMETER_FILE: &str = "file";
pub const PARAMETER_OUTPUT_DIR: &str = "output-dir";
pub const PARAMETER_CHUNK_SIZE: &str = "chunk-size";
pub const PARAMETER_ACTION_ID: &str = "action-id";
pub const PARAMETER_PARAMETER: &str = "parameter";
pub const PARAMETER_RETRIES: &str = "retries";
pub const PARAMETER_POLL_INTERVAL: &str = "poll-interval";
pub const PARAMETER_TIMEOUT: &str = "timeout";
pub const PARAMETER_PROPERTY: &str = "property";
pub const PARAMETER_VALUE: &str = "value";

// Environment variables
pub const ENV_FORMAT: &str = "ANAPLAN_FORMAT";
pub const ENV_USERNAME: &str = "ANAPLAN_USERNAME";
pub const ENV_PASSWORD: &str = "ANAPLAN_PASSWORD";
pub const ENV_TOKEN: &str = "ANAPLAN_TOKEN";
pub const ENV_WORKSPACE: &str = "ANAPLAN_WORKSPACE_ID";
pub const ENV_MODEL: &str = "ANAPLAN_MODEL_ID";

/// Output data format, shared by every command that prints results.
pub fn format_parameter() -> Arg {
    Arg::new(PARAMETER_FORMAT)
        .short('f')
        .long(PARAMETER_FORMAT)
        .num_args(1)
        .required(false)
        .env(ENV_FORMAT)
        .default_value("json")
        .help("Output data format")
        .value_parser(OutputFormat::names())
}

pub fn format_pretty_parameter() -> Arg {
    Arg::new(PARAMETER_PRETTY)
        .long(PARAMETER_PRETTY)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Format the output pretty")
}

pub fn format_with_headers_parameter() -> Arg {
    Arg::new(PARAMETER_HEADERS)
        .long(PARAMETER_HEADERS)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Format the output with headers")
}

/// The three output flags together
pub fn format_parameters() -> [Arg; 3] {
    [
        format_parameter(),
        format_pretty_parameter(),
        format_with_headers_parameter(),
    ]
}

/// The password is read from the environment only.
pub fn username_parameter() -> Arg {
    Arg::new(PARAMETER_USERNAME)
        .short('u')
        .long(PARAMETER_USERNAME)
        .num_args(1)
        .required(false)
        .env(ENV_USERNAME)
        .help(format!(
            "Anaplan user name; the password is read from {}",
            ENV_PASSWORD
        ))
}

pub fn workspace_parameter() -> Arg {
    Arg::new(PARAMETER_WORKSPACE)
        .short('w')
        .long(PARAMETER_WORKSPACE)
        .num_args(1)
        .required(false)
        .env(ENV_WORKSPACE)
        .help("Workspace ID (defaults to the configured workspace)")
}

pub fn model_parameter() -> Arg {
    Arg::new(PARAMETER_MODEL)
        .short('m')
        .long(PARAMETER_MODEL)
        .num_args(1)
        .required(false)
        .env(ENV_MODEL)
        .help("Model ID (defaults to the configured model)")
}

/// Credentials plus the workspace and model the command works in
pub fn connection_parameters() -> [Arg; 3] {
    [username_parameter(), workspace_parameter(), model_parameter()]
}

pub fn kind_parameter() -> Arg {
    Arg::new(PARAMETER_KIND)
        .help("Kind of resource")
        .required(true)
        .num_args(1)
        .value_parser(
            ResourceKind::iter()
                .map(|kind| kind.as_path())
                .collect::<Vec<_>>(),
        )
}

pub fn name_parameter() -> Arg {
    Arg::new(PARAMETER_NAME)
        .help("Resource name")
        .required(true)
        .num_args(1)
}

pub fn file_id_parameter() -> Arg {
    Arg::new(PARAMETER_FILE_ID)
        .help("ID of the server-side file")
        .required(true)
        .num_args(1)
}

pub fn file_parameter() -> Arg {
    Arg::new(PARAMETER_FILE)
        .long(PARAMETER_FILE)
        .num_args(1)
        .required(true)
        .help("Local file path")
        .value_parser(clap::value_parser!(PathBuf))
}

pub fn output_dir_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT_DIR)
        .short('o')
        .long(PARAMETER_OUTPUT_DIR)
        .num_args(1)
        .required(false)
        .default_value(".")
        .help("Directory the file is written to")
        .value_parser(clap::value_parser!(PathBuf))
}

/// Chunk size in MiB, at most 50
pub fn chunk_size_parameter() -> Arg {
    Arg::new(PARAMETER_CHUNK_SIZE)
        .long(PARAMETER_CHUNK_SIZE)
        .num_args(1)
        .required(false)
        .help("Upload chunk size in MiB (1-50, defaults to the configured size)")
        .value_parser(clap::value_parser!(u64).range(1..=50))
}

pub fn action_id_parameter() -> Arg {
    Arg::new(PARAMETER_ACTION_ID)
        .help("ID of the import, export, process or action to run")
        .required(true)
        .num_args(1)
}

pub fn mapping_parameter() -> Arg {
    Arg::new(PARAMETER_PARAMETER)
        .short('p')
        .long(PARAMETER_PARAMETER)
        .num_args(1)
        .action(ArgAction::Append)
        .required(false)
        .help("Mapping parameter as ENTITY=NAME, may be repeated (imports and processes only)")
}

pub fn retries_parameter() -> Arg {
    Arg::new(PARAMETER_RETRIES)
        .long(PARAMETER_RETRIES)
        .num_args(1)
        .required(false)
        .help("Launch retries before giving up (defaults to the configured count)")
        .value_parser(clap::value_parser!(u32))
}

pub fn poll_interval_parameter() -> Arg {
    Arg::new(PARAMETER_POLL_INTERVAL)
        .long(PARAMETER_POLL_INTERVAL)
        .num_args(1)
        .required(false)
        .help("Seconds between task status checks")
        .value_parser(clap::value_parser!(u64))
}

pub fn timeout_parameter() -> Arg {
    Arg::new(PARAMETER_TIMEOUT)
        .long(PARAMETER_TIMEOUT)
        .num_args(1)
        .required(false)
        .help("Give up waiting for the task after this many seconds")
        .value_parser(clap::value_parser!(u64))
}
