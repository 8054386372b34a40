mod anchor;
mod assemble;
mod commands;
mod config;
mod diagnostics;
mod error;
mod issues;
mod numbering;
mod sources;
mod tokens;
mod types;
mod version;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bookstitch",
    version,
    about = "Stitch markdown chapters into one numbered book"
)]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Only print warnings and errors on stderr
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble chapters into one book
    Build {
        /// Chapter files or directories, in book order (default: `chapters` in .bookstitch.toml)
        inputs: Vec<PathBuf>,
        /// Write the book here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Rebuild whenever a chapter changes (requires --output)
        #[arg(long, requires = "output")]
        watch: bool,
    },
    /// Assemble without writing output; exit 1 if any issue is found
    Check {
        /// Chapter files or directories, in book order
        inputs: Vec<PathBuf>,
    },
    /// Print the table of contents
    Toc {
        /// Chapter files or directories, in book order
        inputs: Vec<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Route progress notices to stderr without timestamps. `RUST_LOG` wins
/// over the default level.
fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
    return;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let result = match cli.command {
        Commands::Build { inputs, output, watch } => match (watch, output) {
            (true, Some(output)) => watch::run(&inputs, &output),
            (_, output) => commands::build(&inputs, output.as_deref()).map(|()| return ExitCode::SUCCESS),
        },
        Commands::Check { inputs } => commands::check(&inputs),
        Commands::Toc { inputs, json } => commands::toc(&inputs, json).map(|()| return ExitCode::SUCCESS),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3)
        },
    };
}
