//! `scribe`: turn a web page or local HTML file into Markdown plus a JSON
//! context record.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use engine_logging::{engine_error, engine_info, LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;
use scribe_engine::{
    default_output_base, FetchSettings, OutputPaths, OutputWriter, PageExtractor, ReqwestFetcher,
    ScraperConfig, Scraper, SourceLocator,
};

#[derive(Debug, Parser)]
#[command(
    name = "scribe",
    version,
    about = "Convert a web page (or one section of it) into LLM-ready Markdown."
)]
struct Cli {
    /// URL (optionally ending in `#anchor`) or path to a local .html file.
    resource: String,

    /// Base name for the output folder and files. Derived from the page
    /// title when omitted.
    #[arg(short = 'o', long = "output-base")]
    output_base: Option<String>,

    /// Directory the output folder is created in.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Also write the log to ./scribe.log.
    #[arg(long)]
    log_file: bool,

    /// Verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn log_destination(&self) -> LogDestination {
        if self.log_file {
            LogDestination::Both(PathBuf::from(DEFAULT_LOG_FILE))
        } else {
            LogDestination::Terminal
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    engine_logging::initialize(cli.log_destination(), cli.log_level());

    match run(&cli) {
        Ok(paths) => {
            println!("{}", paths.markdown.display());
            println!("{}", paths.metadata.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            engine_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<OutputPaths> {
    let locator = SourceLocator::parse(&cli.resource)
        .with_context(|| format!("cannot use {:?} as a resource", cli.resource))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let scraper = Scraper::new(
        ReqwestFetcher::new(FetchSettings::default()),
        PageExtractor::new(ScraperConfig::default()),
    );
    let record = runtime
        .block_on(scraper.scrape(&locator, Utc::now()))
        .with_context(|| format!("failed to scrape {locator}"))?;
    engine_info!("extracted {:?}", record.title);

    let base = cli
        .output_base
        .clone()
        .unwrap_or_else(|| default_output_base(&record.title, locator.as_str()));
    OutputWriter::new(&cli.output_dir)
        .write(&base, &record)
        .with_context(|| format!("failed to write output to {}", cli.output_dir.display()))
}
