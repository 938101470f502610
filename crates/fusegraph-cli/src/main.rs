//! Fusegraph Command-Line Interface
//!
//! Compiles graph programs into polarization-optics networks and runs them
//! on the local simulator or on Quandela cloud platforms.
//!
//! ```text
//!      ●───●           ┌────┐   ┌────┐   ┌────┐
//!     / \ /    ──▶     │ GHZ│──▶│FUSE│──▶│ PBS│──▶  |0,1,1,0>
//!    ●───●             └────┘   └────┘   └────┘
//!
//!                 F U S E G R A P H
//!        graph states on linear optics
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::run::RunArgs;
use commands::{backends, compile, run, version};

/// Fusegraph - graph-state compilation for linear-optical hardware
#[derive(Parser)]
#[command(name = "fusegraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a graph program into an optical network
    Compile {
        /// Input program (JSON or YAML)
        #[arg(short, long)]
        input: String,

        /// Write the compiled circuit as JSON to this file
        #[arg(short, long)]
        output: Option<String>,

        /// Output format on stdout (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Compile a graph program and run it on a backend
    Run {
        /// Input program (JSON or YAML)
        #[arg(short, long)]
        input: String,

        /// Backend to use (simulator, quandela)
        #[arg(short, long, default_value = "simulator", env = "FUSEGRAPH_BACKEND")]
        backend: String,

        /// Remote platform name
        #[arg(long, default_value = "sim:belenos", env = "QUANDELA_PLATFORM")]
        platform: String,

        /// Authentication token for remote backends
        #[arg(long, env = "QUANDELA_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Override the remote API endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// Number of samples; omit for the exact distribution
        #[arg(short, long)]
        shots: Option<u32>,

        /// Seed for local sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Keep outcomes that fail postselection
        #[arg(long)]
        no_postselect: bool,

        /// Show raw detection patterns instead of logical labels
        #[arg(long)]
        raw: bool,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            format,
        } => compile::execute(&input, output.as_deref(), &format),

        Commands::Run {
            input,
            backend,
            platform,
            token,
            endpoint,
            shots,
            seed,
            no_postselect,
            raw,
            format,
        } => {
            run::execute(RunArgs {
                input,
                backend,
                platform,
                token,
                endpoint,
                shots,
                seed,
                postselect: !no_postselect,
                raw,
                format,
            })
            .await
        }

        Commands::Backends => backends::execute().await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
