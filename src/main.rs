use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use sunbizfinder::models::SearchLimit;
use sunbizfinder::session::{run_search, SearchOptions};
use sunbizfinder::sunbiz::SunbizSource;
use sunbizfinder::tui::SessionDisplay;
use sunbizfinder::{debug, ledger::SeenLedger, utils};

const DEFAULT_TERM: &str = "PLUMBER";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Sunbizfinder - Business address scraper for Florida Sunbiz")]
struct Args {
    /// Directory for ledgers and output files
    #[clap(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Search term; when given, runs once without prompting
    #[clap(short, long)]
    term: Option<String>,

    /// Number of addresses to collect, or "all" (only with --term)
    #[clap(short, long, default_value = "all")]
    limit: String,

    /// Enable debug output
    #[clap(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    debug::set_debug(args.debug);

    let source = SunbizSource::new()?;

    // Non-interactive: one run, then exit.
    if let Some(term) = &args.term {
        let limit = SearchLimit::parse(&args.limit)
            .with_context(|| format!("Invalid limit: {}", args.limit))?;
        run_one(&source, term, limit, &args.data_dir)?;
        return Ok(());
    }

    println!("Sunbizfinder - Florida corporation address search");
    println!("=================================================");

    loop {
        let term = prompt(&format!("Search term [{}]: ", DEFAULT_TERM))?;
        let term = if term.is_empty() {
            DEFAULT_TERM.to_string()
        } else {
            term
        };

        let limit = loop {
            let answer = prompt("How many addresses? (Enter = all): ")?;
            match SearchLimit::parse(&answer) {
                Some(limit) => break limit,
                None => println!("Enter a positive number or \"all\"."),
            }
        };

        run_one(&source, &term, limit, &args.data_dir)?;

        let again = prompt("Another search? (y/n) [y]: ")?;
        if again.to_lowercase().starts_with('n') {
            break;
        }
        println!();
    }

    Ok(())
}

fn run_one(source: &SunbizSource, term: &str, limit: SearchLimit, data_dir: &Path) -> Result<()> {
    let mut display = SessionDisplay::new();

    // Peek at the history so the user knows what "new" is measured against.
    let known = SeenLedger::load(data_dir, term)?.len();
    display.show_history(known)?;
    display.update_progress(0)?;

    let options = SearchOptions::new(term, limit, data_dir);
    let result = run_search(source, &options, |accepted| {
        let _ = display.update_progress(accepted);
    })?;

    display.show_result(&result)?;
    println!(
        "  records: {}",
        utils::records_path(data_dir, term).display()
    );
    println!(
        "  addresses: {}",
        utils::addresses_path(data_dir, term, limit).display()
    );
    println!(
        "  ledger: {}",
        utils::ledger_path(data_dir, term).display()
    );
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read input")?;
    Ok(answer.trim().to_string())
}
