/// Diagnostic tool for native-order interop memory dumps.
///
/// # Command overview
///
/// ```text
/// interop <COMMAND> [OPTIONS]
///
/// Commands:
///   info    Print the identity, length and a hex dump of the memory
///   dump    Decode the memory field by field with a layout
///   peek    Read one value at an absolute offset
///   help    Print help information
///
/// Global options:
///   -v, --verbose    Log stream diagnostics to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// Every command takes either a file path or `--hex <BYTES>`.
///
/// # Exit codes
///
/// | Code | Meaning                                            |
/// |------|----------------------------------------------------|
/// | 0    | Success                                            |
/// | 1    | Error (I/O failure, bad layout, not enough data)   |
///
/// All error details are written to stderr so stdout can be piped cleanly.
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod cmd_dump;
mod cmd_info;
mod cmd_peek;
mod layout;
mod source;

use source::Source;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Inspect native-order binary memory through a bounds-checked stream.
#[derive(Parser)]
#[command(name = "interop", version, about = "Interop memory inspection CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log stream diagnostics (failed reads, resynchronization) to stderr.
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print the identity, length and a hex dump of the memory.
    Info(InfoArgs),
    /// Decode the memory field by field with a layout.
    Dump(DumpArgs),
    /// Read one value at an absolute offset without consuming it.
    Peek(PeekArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `interop info`.
#[derive(clap::Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: Source,

    /// Show at most this many bytes in the hex dump.
    #[arg(long, default_value_t = 256)]
    pub limit: usize,
}

/// Arguments for `interop dump`.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                               │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ --layout L   │ Items to decode, e.g. `bool,i32,f64[2],pad[3]`       │
/// │ --offset N   │ Start decoding at byte N                             │
/// │ --len N      │ Treat only the first N bytes as available            │
/// │ --json       │ Print a JSON array instead of text lines             │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DumpArgs {
    #[command(flatten)]
    pub source: Source,

    /// Comma-separated field layout.
    #[arg(short, long)]
    pub layout: String,

    /// Byte offset to start decoding from.
    #[arg(long)]
    pub offset: Option<usize>,

    /// Cap the stream length (must not exceed the memory length).
    #[arg(long)]
    pub len: Option<usize>,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `interop peek`.
#[derive(clap::Args)]
pub struct PeekArgs {
    #[command(flatten)]
    pub source: Source,

    /// Absolute byte offset to read at.
    #[arg(long)]
    pub at: usize,

    /// Width of the value in bytes.
    #[arg(long, value_enum, default_value = "4")]
    pub width: PeekWidth,

    /// Move the stream to this position before peeking.
    #[arg(long)]
    pub position: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PeekWidth {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
    #[value(name = "4")]
    Four,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Info(args) => cmd_info::run(&args),
        Commands::Dump(args) => cmd_dump::run(&args),
        Commands::Peek(args) => cmd_peek::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
