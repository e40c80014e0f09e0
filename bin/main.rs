//! constprop - sparse conditional constant propagation over JSON functions.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use constprop::analysis::{self, OptionsBuilder};
use constprop::loader::{Json, Loader};
use constprop::report::{self, Report, Summary};
use constprop::Error;
use log::LevelFilter;

/// Find the constants and unreachable blocks of a function
#[derive(Parser, Debug)]
#[command(name = "constprop", version, rename_all = "kebab-case")]
struct Cli {
    /// JSON file describing the function
    #[arg(required = true)]
    input: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Write the control flow graph, in graphviz dot format, to this file
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Give up after this many sweeps
    #[arg(long)]
    max_sweeps: Option<usize>,

    /// Do not prune blocks behind branches on constants
    #[arg(long)]
    no_prune: bool,

    /// Log more, may be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("CONSTPROP_LOG")
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let function = Json::from_file(&cli.input)?.function()?;

    let mut builder = OptionsBuilder::new().prune_unreachable(!cli.no_prune);
    if let Some(max_sweeps) = cli.max_sweeps {
        builder = builder.max_sweeps(max_sweeps);
    }
    let result = analysis::analyze_with_options(&function, &builder.build())?;

    if let Some(ref path) = cli.dot {
        let mut file = File::create(path)?;
        file.write_all(report::dot(&function, &result)?.as_bytes())?;
    }

    if cli.json {
        let summary = Summary::new(&function, &result)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", Report::new(&function, &result));
    }

    Ok(())
}
