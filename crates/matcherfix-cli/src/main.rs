//! matcherfix - rewrites matcher quoting in stored Alertmanager configurations
//! and checks that the rewrite did not change their meaning.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod errors;
mod logging;
mod output;
mod path;

use commands::{canonicalize, check, fix, list, pack};

#[derive(Parser)]
#[command(name = "matcherfix")]
#[command(about = "Canonicalize matcher quoting in Alertmanager configurations")]
struct Cli {
    /// Log debug events (overridden by MATCHERFIX_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize a stored configuration and write the result
    Fix {
        /// Input AlertConfigDesc protobuf file
        input: PathBuf,
        /// Output file (default: <input>.out next to the input)
        output: Option<PathBuf>,
        /// Fail instead of warning when a rewrite changes the meaning
        #[arg(long)]
        strict: bool,
        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether two YAML configurations mean the same thing
    Check {
        /// First YAML file
        first: PathBuf,
        /// Second YAML file
        second: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical form of a YAML configuration
    Canonicalize {
        /// Input YAML file (or stdin if not provided)
        input: Option<PathBuf>,
    },
    /// List the configurations in a store directory
    List {
        /// Store directory holding <user>.pb files
        directory: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Wrap a YAML configuration and its templates into an AlertConfigDesc file
    Pack {
        /// YAML configuration file
        config: PathBuf,
        /// Tenant the configuration belongs to
        #[arg(long)]
        user: String,
        /// Template file to attach (repeatable)
        #[arg(long = "template")]
        templates: Vec<PathBuf>,
        /// Output file
        #[arg(required_unless_present = "store")]
        output: Option<PathBuf>,
        /// Store directory to write <user>.pb into instead of an output file
        #[arg(long, conflicts_with = "output")]
        store: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Fix {
            input,
            output,
            strict,
            json,
        } => fix::run(input, output, strict, json),
        Commands::Check {
            first,
            second,
            json,
        } => check::run(first, second, json),
        Commands::Canonicalize { input } => canonicalize::run(input),
        Commands::List { directory, json } => list::run(directory, json),
        Commands::Pack {
            config,
            user,
            templates,
            output,
            store,
        } => match (output, store) {
            (_, Some(directory)) => pack::run(config, user, templates, pack::Target::Store(directory)),
            (Some(file), None) => pack::run(config, user, templates, pack::Target::File(file)),
            (None, None) => Err(errors::CliError::MissingTarget),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
