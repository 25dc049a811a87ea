use crate::{
    actions::utils::print_formatted,
    commands::params::{PARAMETER_KIND, PARAMETER_NAME},
    context::ExecutionContext,
    error::CliError,
    model::ResourceKind,
};
use clap::ArgMatches;
use std::str::FromStr;

fn resource_kind(sub_matches: &ArgMatches) -> Result<ResourceKind, CliError> {
    let kind = sub_matches
        .get_one::<String>(PARAMETER_KIND)
        .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_KIND.to_string()))?;
    ResourceKind::from_str(kind).map_err(|_| CliError::InvalidArgument(kind.to_string()))
}

pub async fn list_resources(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let kind = resource_kind(sub_matches)?;
    let ctx = ExecutionContext::from_args(sub_matches).await?;
    let connection = ctx.connection(sub_matches)?;

    if kind == ResourceKind::Files {
        let files = ctx.client().list_files(&connection).await?;
        print_formatted(&files, sub_matches)
    } else {
        let resources = ctx.client().list(&connection, kind).await?;
        print_formatted(&resources, sub_matches)
    }
}

pub async fn resolve_resource(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let kind = resource_kind(sub_matches)?;
    let name = sub_matches
        .get_one::<String>(PARAMETER_NAME)
        .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_NAME.to_string()))?;
    let ctx = ExecutionContext::from_args(sub_matches).await?;
    let connection = ctx.connection(sub_matches)?;

    let id = ctx.client().resolve_id(&connection, kind, name).await?;
    println!("{}", id);
    Ok(())
}
