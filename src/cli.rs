use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the classroom bootstrap toolkit.
#[derive(Parser, Debug)]
#[command(
    name = "classkit",
    about = "Classroom workstation bootstrap toolkit",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview the commands without executing them
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Override the student workspace directory (default: current directory)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install a development component
    Install(InstallOpts),
    /// List the components available on this platform
    List,
    /// Check and repair the workspace environment
    Setup,
    /// Manage the classroom PostgreSQL server
    #[command(subcommand)]
    Postgres(PostgresCommand),
    /// Back up the workspace to the USB key
    Backup,
    /// Restore the workspace from the USB key
    Restore,
    /// Synchronize the workspace with the class template
    Update,
    /// Point the workspace at your personal repository
    InitRepo(InitRepoOpts),
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Component name (see `classkit list`)
    pub component: String,
}

/// PostgreSQL operations.
#[derive(Subcommand, Debug)]
pub enum PostgresCommand {
    /// Start the server
    Start,
    /// Stop the server
    Stop,
    /// Create a UTF-8 database owned by the classroom superuser
    Create {
        /// Database name
        name: String,
    },
    /// Initialise (or reinitialise) the database cluster
    Init,
}

/// Options for the `init-repo` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InitRepoOpts {
    /// Personal repository URL (prompted for when omitted)
    #[arg(long)]
    pub url: Option<String>,

    /// Push to the new origin without asking
    #[arg(long)]
    pub push: bool,
}
