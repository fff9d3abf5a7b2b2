//! Backlog CLI Client
//!
//! Command-line interface for reporting to and paging through a backlog
//! hosted by `backlog-server`.

use clap::{Parser, Subcommand};
use regex::Regex;

use backlog::store::Search;
use backlog::{Config, LogEntry, PageQuery, ReportOptions, Result, Severity, Store};

/// Backlog CLI
#[derive(Parser, Debug)]
#[command(name = "backlog-cli")]
#[command(about = "CLI for Backlog log stores")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    server: String,

    /// Name of the backlog list on the server
    #[arg(short, long, default_value = "__BACKLOG__LOG")]
    list: String,

    /// Retained-entry capacity applied when reporting
    #[arg(long, default_value = "1000")]
    max_backlog: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report a log message
    Report {
        /// Severity name or number (debug=0 .. unknown=5)
        severity: Severity,

        /// Reporting program
        progname: String,

        /// The message
        message: String,
    },

    /// Show a page of entries, oldest first
    Latest {
        /// Page size
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,

        /// Entries older than this key
        #[arg(long, conflicts_with = "after")]
        before: Option<String>,

        /// Entries newer than this key
        #[arg(long)]
        after: Option<String>,

        /// Accepted severities (repeatable)
        #[arg(long = "severity")]
        severities: Vec<Severity>,

        /// Only messages containing this text (a regex with --regex)
        #[arg(long)]
        search: Option<String>,

        /// Treat --search as a regular expression
        #[arg(long, requires = "search")]
        regex: bool,

        /// Print raw JSON records
        #[arg(long)]
        json: bool,
    },

    /// Count retained entries
    Count,

    /// Delete every entry
    Clear,

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder()
        .list_key(args.list)
        .max_backlog(args.max_backlog)
        .capture_backtrace(false)
        .build();
    let store = Store::connect(config, args.server.as_str())?;

    match args.command {
        Commands::Report {
            severity,
            progname,
            message,
        } => match store.report(severity, &progname, &message, ReportOptions::new())? {
            Some(key) => println!("{}", key),
            None => println!("(dropped)"),
        },
        Commands::Latest {
            limit,
            before,
            after,
            severities,
            search,
            regex,
            json,
        } => {
            let mut query = PageQuery::new().limit(limit);
            if let Some(key) = before {
                query = query.before(key);
            }
            if let Some(key) = after {
                query = query.after(key);
            }
            if !severities.is_empty() {
                query = query.severities(severities);
            }
            if let Some(text) = search {
                query = query.search(if regex {
                    Search::Pattern(Regex::new(&text)?)
                } else {
                    Search::Literal(text)
                });
            }

            for entry in store.latest(&query)? {
                if json {
                    println!("{}", backlog::entry::encode(&entry)?);
                } else {
                    print_entry(&entry);
                }
            }
        }
        Commands::Count => println!("{}", store.count()?),
        Commands::Clear => {
            store.clear()?;
            println!("OK");
        }
        Commands::Ping => {
            store.backend().ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

fn print_entry(entry: &LogEntry) {
    println!(
        "{} {:<7} {} {}: {}",
        entry.timestamp, entry.severity, entry.key, entry.progname, entry.message
    );
}
