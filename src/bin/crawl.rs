//! Crawl the news site into `data/data.csv`.
//!
//! Usage: `crawl [start_page] [pages] [workers]` — a `pages` value of `0`
//! means "through the last page". Log verbosity follows `RUST_LOG`.

use std::env;
use std::error::Error;
use std::fs;
use std::str::FromStr;

use newsgrab::{CrawlTask, TaskOptions};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args().skip(1);
    let start_page: u32 = parse_arg(args.next(), 1)?;
    let pages: u32 = parse_arg(args.next(), 0)?;
    let workers: usize = parse_arg(args.next(), 4)?;

    let options = TaskOptions {
        start_page,
        pages: (pages > 0).then_some(pages),
        workers,
        ..TaskOptions::default()
    };

    let task = CrawlTask::new(options)?;
    println!("crawling {} index pages...", task.page_count());
    let target = task.run()?;

    let rows = fs::read_to_string(&target)?
        .lines()
        .count()
        .saturating_sub(1); // header
    println!("wrote {rows} records to {}", target.display());
    Ok(())
}

fn parse_arg<T>(arg: Option<String>, default: T) -> Result<T, Box<dyn Error>>
where
    T: FromStr,
    T::Err: Error + 'static,
{
    match arg {
        Some(value) => match value.parse() {
            Ok(parsed) => Ok(parsed),
            Err(err) => Err(format!("invalid argument {value:?}: {err}").into()),
        },
        None => Ok(default),
    }
}
