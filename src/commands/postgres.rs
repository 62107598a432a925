use anyhow::Result;

use crate::cli::PostgresCommand;
use crate::context::Context;
use crate::postgres;

/// Run a `postgres` operation.
///
/// # Errors
///
/// Returns an error when the underlying operation fails.
pub fn run(ctx: &Context, command: &PostgresCommand) -> Result<()> {
    if ctx.dry_run {
        let action = match command {
            PostgresCommand::Start => "start the PostgreSQL server".to_string(),
            PostgresCommand::Stop => "stop the PostgreSQL server".to_string(),
            PostgresCommand::Create { name } => format!("create database '{name}'"),
            PostgresCommand::Init => "initialise the database cluster".to_string(),
        };
        ctx.log.dry_run(&action);
        return Ok(());
    }

    match command {
        PostgresCommand::Start => postgres::start(ctx),
        PostgresCommand::Stop => postgres::stop(ctx),
        PostgresCommand::Create { name } => postgres::create(ctx, name),
        PostgresCommand::Init => postgres::init(ctx),
    }
}
