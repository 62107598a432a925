use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use classkit::cli::{self, Command};
use classkit::commands;
use classkit::context::Context;
use classkit::exec::SystemExecutor;
use classkit::logging::Logger;

fn main() {
    let _ = enable_ansi_support::enable_ansi_support();

    // Interrupted runs exit with the conventional 130
    let _ = ctrlc::set_handler(|| {
        eprintln!();
        std::process::exit(130);
    });

    let args = cli::Cli::parse();
    let log = Logger::new(args.verbose);

    let ctx = match Context::from_opts(&args.global, log, Arc::new(SystemExecutor)) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("\x1b[31mERROR\x1b[0m {e:#}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&ctx, &args.command) {
        ctx.log.error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(ctx: &Context, command: &Command) -> Result<()> {
    match command {
        Command::Install(opts) => commands::install::run(ctx, opts),
        Command::List => commands::list::run(ctx),
        Command::Setup => commands::setup::run(ctx),
        Command::Postgres(cmd) => commands::postgres::run(ctx, cmd),
        Command::Backup => commands::backup::run_backup(ctx),
        Command::Restore => commands::backup::run_restore(ctx),
        Command::Update => commands::update::run(ctx),
        Command::InitRepo(opts) => commands::init_repo::run(ctx, opts),
        Command::Version => {
            let version = option_env!("CLASSKIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("classkit {version}");
            Ok(())
        }
    }
}
