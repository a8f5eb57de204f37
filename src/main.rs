use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use fmodel::cli::args::Cli;
use fmodel::cli::commands::execute;
use fmodel::cli::output;
use fmodel::exitcode;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let status = execute(&cli).map_or_else(
        |e| {
            output::error(&e);
            e.exit_code()
        },
        |()| exitcode::OK,
    );
    std::process::exit(status);
}

/// `-v` count picks the level for this crate; `RUST_LOG` replaces it entirely.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // config and toml stay at warn unless RUST_LOG says otherwise
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,fmodel={level}")));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .with_span_events(if verbosity > 2 { FmtSpan::CLOSE } else { FmtSpan::NONE })
        .with_filter(filter);

    tracing_subscriber::registry().with(layer).init();
    tracing::debug!(%level, "logging initialized");
}
