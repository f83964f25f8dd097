//! Main entry point for the netstat tool
use std::io;

use log::debug;

use netstat::cli::args::Cli;
use netstat::error::NetstatError;
use netstat::formats::csv::CsvSink;
use netstat::formats::text::ConsoleSink;
use netstat::lookup::AddrFormatter;
use netstat::privilege::is_privileged;
use netstat::report::Reporter;
use netstat::sockets::filter::Filter;
use netstat::sockets::provider::system_provider;

fn main() -> Result<(), NetstatError> {
    let cli = Cli::parse_args();

    let default_level = if cli.debug { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Open the CSV destination before anything is printed; failure is fatal.
    let csv = match &cli.csv {
        Some(path) => Some(CsvSink::create(path)?),
        None => None,
    };

    let filter = Filter::new(&cli.filter_options());
    let provider = system_provider();
    let stdout = io::stdout();
    let console = ConsoleSink::new(stdout.lock()).privileged(is_privileged());

    let mut reporter = Reporter::new(
        provider.as_ref(),
        AddrFormatter::new(cli.resolve),
        Box::new(console),
    );
    if let Some(csv) = csv {
        reporter = reporter.with_csv(Box::new(csv));
    }

    let summary = reporter.run(&filter)?;
    debug!(
        "{} console rows, {} csv rows, {} unreadable tables",
        summary.console_rows,
        summary.csv_rows,
        summary.failed.len()
    );

    Ok(())
}
