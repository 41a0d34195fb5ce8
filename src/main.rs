use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing_subscriber::{
    EnvFilter, Layer as _, filter::Directive, fmt::format::FmtSpan, layer::SubscriberExt,
    util::SubscriberInitExt as _,
};

use self::prelude::*;

mod aggregate;
mod cmd;
mod config;
mod engine;
mod error;
mod prelude;
mod queue;
mod rasterize;
mod router;
mod store;
mod submit;
mod subprocess;
mod worker;

/// Queue scanned documents for OCR and fetch the extracted text.
#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    after_help = r#"
Environment Variables:
  - RUST_LOG (optional): Override log filtering, e.g. `RUST_LOG=debug`.

  Variables may be set in a standard `.env` file.

The worker shells out to `tesseract` and `pdftoppm` (poppler-utils), which
must be on PATH.
"#
)]
struct Opts {
    #[clap(subcommand)]
    subcmd: Cmd,
}

/// The subcommands we support.
#[derive(Debug, Subcommand)]
enum Cmd {
    /// Run the OCR worker loop.
    Worker(cmd::worker::WorkerOpts),
    /// Store files and enqueue them as OCR jobs.
    Submit(cmd::submit::SubmitOpts),
    /// Show a job's status record and, optionally, its result text.
    Status(cmd::status::StatusOpts),
}

/// Our entry point, which can return an error. [`anyhow::Result`] will
/// automatically print a nice error message with optional backtrace.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing. Logs go to stderr so `submit` and `status` output
    // stays machine-readable on stdout.
    let directive =
        Directive::from_str("info").expect("built-in directive should be valid");
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    // We can stack multiple layers here if we need to.
    tracing_subscriber::registry().with(subscriber).init();

    // Call our real `main` function now that logging is set up.
    real_main().await
}

/// Our real entry point.
#[instrument(level = "debug", name = "main", skip_all)]
async fn real_main() -> Result<()> {
    // Load environment variables from a `.env` file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let opts = Opts::parse();
    debug!("Parsed options: {:?}", opts);

    // Run the appropriate subcommand.
    match &opts.subcmd {
        Cmd::Worker(opts) => cmd::worker::cmd_worker(opts).await,
        Cmd::Submit(opts) => cmd::submit::cmd_submit(opts).await,
        Cmd::Status(opts) => cmd::status::cmd_status(opts).await,
    }
}
