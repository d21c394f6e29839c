//! # Commands
//!
//! - `shroud scan` - Redact sensitive text in a document
//! - `shroud patterns` - List redaction patterns
//! - `shroud settings` - Inspect and edit the persisted redaction settings

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod commands;
mod ui;

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use console::style;

use crate::ui::colors;

const REPO_URL: &str = "https://github.com/shroud-rs/shroud";

/// Default directory for the settings store.
const DEFAULT_STORE_DIR: &str = ".shroud";

#[derive(Debug, Parser)]
#[command(
    name = "shroud",
    version,
    styles = ui::clap_styles(),
    arg_required_else_help = true,
)]
struct Cli {
    /// Directory holding the persisted settings.
    #[arg(long, global = true, env = "SHROUD_STORE", value_name = "DIR", default_value = DEFAULT_STORE_DIR)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Redact sensitive text in a document
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    /// List redaction patterns
    #[command(visible_alias = "p")]
    Patterns(PatternsArgs),

    /// Inspect and edit the saved settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommand>,
    },
}

/// Output format for the `scan` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Visible text with every redacted span masked.
    #[default]
    Text,
    /// Escaped markup with marker classes on redacted spans.
    Markup,
    /// Machine-readable JSON report.
    Json,
}

/// How the `scan` input is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// Tree for `.json` files, plain text otherwise.
    #[default]
    Auto,
    /// Plain text; blank lines separate paragraphs.
    Text,
    /// JSON document tree.
    Tree,
}

/// Arguments for the `shroud scan` command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Document to redact (`-` reads stdin).
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// How to read the input.
    #[arg(short, long, value_enum, default_value_t)]
    pub input_format: InputFormat,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extra literal term to redact (repeatable).
    #[arg(short, long = "pattern", value_name = "TERM")]
    pub patterns: Vec<String>,

    /// Extra term that vetoes any match containing it (repeatable).
    #[arg(short, long = "exclude", value_name = "TERM")]
    pub excludes: Vec<String>,

    /// Skip the built-in PII patterns.
    #[arg(long)]
    pub no_pii: bool,

    /// Mark spans for block display.
    #[arg(long)]
    pub block: bool,

    /// Exit with code 1 if anything was redacted.
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the `shroud patterns` command.
#[derive(Debug, Parser)]
pub struct PatternsArgs {
    /// List the active set built from the saved settings, custom patterns included.
    #[arg(short, long)]
    pub active: bool,

    /// Show each pattern's regular expression.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Subcommands for `shroud settings`.
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings.
    Show {
        /// Print the raw JSON blob.
        #[arg(long)]
        json: bool,
    },
    /// Add a custom pattern.
    AddPattern {
        /// Literal term, or regular expression with `--regex`.
        term: String,
        /// Treat the term as a regular expression.
        #[arg(long)]
        regex: bool,
        /// Regex flags (`i`, `m`, `s`).
        #[arg(long, default_value = "", requires = "regex")]
        flags: String,
    },
    /// Add an exclusion term.
    AddExclude {
        /// Term that vetoes any match containing it.
        term: String,
    },
    /// Remove a custom pattern by index.
    RemovePattern {
        /// Zero-based index as shown by `settings show`.
        index: usize,
    },
    /// Remove an exclusion term by index.
    RemoveExclude {
        /// Zero-based index as shown by `settings show`.
        index: usize,
    },
    /// Set one top-level key (value parsed as JSON, else taken as a string).
    Set {
        /// Key name, e.g. `blockStyle` or `revealBehavior`.
        key: String,
        /// New value.
        value: String,
    },
    /// Delete the saved settings so defaults apply.
    Reset,
}

fn main() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }

    let cli = parse_cli();

    if let Err(e) = run(cli) {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(ui::exit::ERROR);
    }
}

fn parse_cli() -> Cli {
    let cmd = Cli::command().about(build_about()).after_help(build_after_help());

    let matches = cmd.get_matches();

    #[expect(clippy::expect_used, reason = "clap already validated args; this cannot fail")]
    Cli::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Scan(args) => commands::scan::run(&args, &cli.store),
        Command::Patterns(args) => commands::patterns::run(&args, &cli.store),
        Command::Settings { command } => commands::settings::run(command.as_ref(), &cli.store),
    }
}

fn build_about() -> String {
    format!(
        r"
  {} hides sensitive text in documents.

  Finds emails, phone numbers, card numbers, SSNs and your own
  terms, and masks them in place. Works offline.",
        colors::accent().apply_to("shroud").bold()
    )
}

fn build_after_help() -> String {
    format!(
        r"
  {}
    shroud scan notes.txt                  Print notes.txt with PII masked
    shroud scan page.json -f markup        Render a document tree as markup
    shroud scan notes.txt -f json          Output a JSON report
    shroud scan - -p 'project falcon'      Redact an extra term from stdin
    shroud settings add-exclude acme.com   Never redact matches containing acme.com
    shroud patterns --active               List patterns from saved settings

  Learn more: {}",
        style("Examples:").bold(),
        colors::accent().apply_to(REPO_URL).underlined()
    )
}
