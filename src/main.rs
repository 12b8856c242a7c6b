//! The `wgsl` command line tool.

use std::io::IsTerminal;
use std::io::stderr;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap_verbosity_flag::Verbosity;
use colored::Colorize;
use wgsl::commands;
use wgsl::config::Config;

#[derive(Subcommand)]
enum Commands {
    /// Checks WGSL files (or directories containing WGSL files) and reports
    /// diagnostics.
    Check(commands::check::CheckArgs),

    /// Parses a WGSL file and prints its syntax tree.
    Dump(commands::dump::DumpArgs),

    /// Prints the classified tokens of a WGSL file.
    Tokens(commands::tokens::TokensArgs),
}

#[derive(Parser)]
#[command(author, version, propagate_version = true, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// The path to the configuration file.
    ///
    /// Defaults to `wgsl.toml` in the current directory, if present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity,
}

pub fn inner() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(cli.verbose.tracing_level_filter())
        .with_writer(std::io::stderr)
        .with_ansi(stderr().is_terminal())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Check(args) => commands::check::check(args.apply(&config)),
        Commands::Dump(args) => commands::dump::dump(args.apply(&config)),
        Commands::Tokens(args) => commands::tokens::tokens(args.apply(&config)),
    }
}

pub fn main() {
    if let Err(e) = inner() {
        eprintln!(
            "{error}: {e:?}",
            error = if std::io::stderr().is_terminal() {
                "error".red().bold()
            } else {
                "error".normal()
            }
        );
        std::process::exit(1);
    }
}
