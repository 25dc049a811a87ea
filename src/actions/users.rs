use crate::{actions::utils::print_formatted, context::ExecutionContext, error::CliError};
use clap::ArgMatches;

pub async fn current_user(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let ctx = ExecutionContext::from_args(sub_matches).await?;
    let user = ctx.client().current_user(ctx.token()).await?;
    print_formatted(&user, sub_matches)
}

pub async fn list_workspaces(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let ctx = ExecutionContext::from_args(sub_matches).await?;
    let user = ctx.client().current_user(ctx.token()).await?;
    let workspaces = ctx.client().workspaces(ctx.token(), &user.id).await?;
    print_formatted(&workspaces, sub_matches)
}

pub async fn list_models(sub_matches: &ArgMatches) -> Result<(), CliError> {
    let ctx = ExecutionContext::from_args(sub_matches).await?;
    let user = ctx.client().current_user(ctx.token()).await?;
    let models = ctx.client().models(ctx.token(), &user.id).await?;
    print_formatted(&models, sub_matches)
}
