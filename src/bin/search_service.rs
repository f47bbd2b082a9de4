use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use clap::Parser;

use sunbizfinder::debug;
use sunbizfinder::models::SearchLimit;
use sunbizfinder::remote::{SearchService, ServiceConfig, SessionEvent};
use sunbizfinder::sunbiz::SunbizSource;

/// Line-driven front of the remote-trigger service: each stdin line is
/// "term [count]", the way the chat bot forwards requests. Session events
/// are printed as they arrive. EOF drains the queue and exits.
#[derive(Parser, Debug)]
#[clap(author, version, about = "Queue-based search service for Sunbizfinder")]
struct Args {
    /// Directory for ledgers and output files
    #[clap(short, long, default_value = "data/bot")]
    data_dir: PathBuf,

    /// Per-request ceiling on accepted addresses
    #[clap(short, long, default_value = "100")]
    max_addresses: usize,

    /// Enable debug output
    #[clap(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    debug::set_debug(args.debug);

    let source = Arc::new(SunbizSource::new()?);
    let config = ServiceConfig {
        data_dir: args.data_dir,
        max_addresses: args.max_addresses,
    };
    let (service, events) = SearchService::start(source, config);

    let printer = thread::spawn(move || {
        for notification in events {
            match notification.event {
                SessionEvent::Started => {
                    println!("[{}] started", notification.session_id);
                }
                SessionEvent::Progress(count) => {
                    println!("[{}] {} addresses so far", notification.session_id, count);
                }
                SessionEvent::Completed(result) => {
                    println!(
                        "[{}] completed: {} addresses for '{}' ({})",
                        notification.session_id, result.accepted, result.term, result.reason
                    );
                }
                SessionEvent::Aborted(reason) => {
                    println!("[{}] aborted: {}", notification.session_id, reason);
                }
            }
        }
    });

    println!("Send: term [count]   (count defaults to {})", args.max_addresses);
    for line in io::stdin().lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let term = match parts.next() {
            Some(term) => term,
            None => continue,
        };
        let limit = match parts.next() {
            Some(count) => match SearchLimit::parse(count) {
                Some(limit) => limit,
                None => {
                    println!("Usage: term [count], e.g. \"plumber 50\"");
                    continue;
                }
            },
            None => SearchLimit::All,
        };

        let queued_behind = service.pending();
        let id = service.submit_search(term, limit);
        println!("[{}] queued (position {})", id, queued_behind + 1);
    }

    service.shutdown();
    let _ = printer.join();
    Ok(())
}
