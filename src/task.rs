//! Chunked crawl orchestration and CSV persistence.
//!
//! A [`CrawlTask`] splits the requested page range into fixed-size units,
//! runs each unit on the worker pool (every unit builds its own crawler and
//! writes its own shard file), then concatenates the shards into one CSV in
//! ascending page order. A failed unit costs its shard, not the run.

use std::borrow::Cow;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::crawler::{CrawlOptions, Crawler};
use crate::error::{Error, Result};
use crate::parsers::NewsMeta;
use crate::pool::ThreadPool;

const MERGED_FILE: &str = "data.csv";
const CSV_HEADER: &str = "title,date,author,content";

/// Configuration for a multi-threaded crawl run.
///
/// All fields are public for easy configuration; use `Default::default()`
/// for standard settings.
#[derive(Debug, Clone)]
pub struct TaskOptions {
    /// First index page to crawl.
    ///
    /// Default: `1`
    pub start_page: u32,

    /// How many index pages to crawl; `None` means through the last page.
    ///
    /// Default: `None`
    pub pages: Option<u32>,

    /// Worker thread count.
    ///
    /// Default: `4`
    pub workers: usize,

    /// Index pages handled by one unit of work.
    ///
    /// Default: `10`
    pub chunk: u32,

    /// Output directory; shards go to a `temp` subdirectory.
    ///
    /// Default: `./data`
    pub data_dir: PathBuf,

    /// Crawler configuration shared by every unit.
    pub crawl: CrawlOptions,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            start_page: 1,
            pages: None,
            workers: 4,
            chunk: 10,
            data_dir: PathBuf::from("./data"),
            crawl: CrawlOptions::default(),
        }
    }
}

/// A prepared crawl run: directories in place, page range resolved.
#[derive(Debug)]
pub struct CrawlTask {
    options: TaskOptions,
    count: u32,
    temp_dir: PathBuf,
}

impl CrawlTask {
    /// Prepare a run: create the output directories, clean stale shards,
    /// probe the index for the total page count, and resolve the requested
    /// range against it (clamping with a warning when it reaches past the
    /// end).
    pub fn new(options: TaskOptions) -> Result<Self> {
        if options.start_page < 1 {
            return Err(Error::InvalidArgument {
                name: "start_page",
                value: options.start_page.to_string(),
            });
        }
        if options.pages == Some(0) {
            return Err(Error::InvalidArgument {
                name: "pages",
                value: "0".to_string(),
            });
        }

        let temp_dir = options.data_dir.join("temp");
        fs::create_dir_all(&temp_dir)?;
        clean_dir(&temp_dir)?;

        let pages = Crawler::new(&options.crawl)?.index_meta(1)?.last;
        if options.start_page > pages {
            return Err(Error::InvalidArgument {
                name: "start_page",
                value: format!("{} (only {pages} pages exist)", options.start_page),
            });
        }
        let available = pages - options.start_page + 1;
        let count = match options.pages {
            None => available,
            Some(requested) if requested > available => {
                tracing::warn!(requested, available, "not enough pages to crawl, clamped");
                available
            }
            Some(requested) => requested,
        };

        Ok(Self {
            options,
            count,
            temp_dir,
        })
    }

    /// Number of index pages this run will crawl.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.count
    }

    /// Run every unit on the pool, wait for them, and merge the shards.
    /// Returns the merged CSV path.
    pub fn run(&self) -> Result<PathBuf> {
        let pool = ThreadPool::new(self.options.workers);
        let first = self.options.start_page;
        let end = first + self.count;
        let temp_dir = Arc::new(self.temp_dir.clone());

        let mut unit_start = first;
        while unit_start < end {
            let len = self.options.chunk.max(1).min(end - unit_start);
            let options = self.options.crawl.clone();
            let temp_dir = Arc::clone(&temp_dir);
            let with_header = unit_start == first;
            pool.execute(move || {
                let unit_end = unit_start + len - 1;
                let shard = temp_dir.join(format!("{unit_start}-{unit_end}.csv"));
                tracing::info!(unit_start, unit_end, "crawling");
                match crawl_unit(&options, unit_start, len, &shard, with_header) {
                    Ok(rows) => tracing::info!(unit_start, unit_end, rows, "unit finished"),
                    Err(error) => {
                        tracing::warn!(unit_start, unit_end, %error, "unit failed");
                    }
                }
            });
            unit_start += len;
        }

        pool.join();
        tracing::info!("merging shards");
        let target = self.options.data_dir.join(MERGED_FILE);
        merge_shards(&self.temp_dir, &target)?;
        Ok(target)
    }
}

/// Crawl one unit of pages and write its shard. Returns the row count.
fn crawl_unit(
    options: &CrawlOptions,
    start: u32,
    len: u32,
    shard: &Path,
    with_header: bool,
) -> Result<usize> {
    let crawler = Crawler::new(options)?;
    let records = crawler.crawl(start, Some(len))?;
    write_shard(shard, &records, with_header)?;
    Ok(records.len())
}

/// Write records as CSV rows: `title,date,author,content`, empty author
/// for `None`.
fn write_shard(path: &Path, records: &[NewsMeta], with_header: bool) -> Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    if with_header {
        writeln!(out, "{CSV_HEADER}")?;
    }
    for record in records {
        writeln!(
            out,
            "{},{},{},{}",
            csv_field(&record.title),
            record.date,
            csv_field(record.author.as_deref().unwrap_or_default()),
            csv_field(&record.content),
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Concatenate shard files into `target` in ascending start-page order.
fn merge_shards(temp_dir: &Path, target: &Path) -> Result<()> {
    let mut shards: Vec<(u32, PathBuf)> = Vec::new();
    for entry in fs::read_dir(temp_dir)? {
        let path = entry?.path();
        if let Some(start) = path.is_file().then(|| shard_start(&path)).flatten() {
            shards.push((start, path));
        }
    }
    shards.sort_by_key(|&(start, _)| start);

    let mut out = BufWriter::new(fs::File::create(target)?);
    for (_, path) in shards {
        io::copy(&mut fs::File::open(&path)?, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

/// Leading page number of a shard filename like `21-30.csv`.
fn shard_start(path: &Path) -> Option<u32> {
    path.file_stem()?.to_str()?.split('-').next()?.parse().ok()
}

/// Quote a CSV field when it needs it; embedded quotes are doubled.
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains(['"', ',', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Remove every file directly inside `dir`.
fn clean_dir(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("newsgrab-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    fn record(title: &str, author: Option<&str>, content: &str) -> NewsMeta {
        NewsMeta {
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 3, 12).expect("valid date"),
            author: author.map(str::to_string),
            content: content.to_string(),
        }
    }

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn shard_start_reads_leading_page_number() {
        assert_eq!(shard_start(Path::new("/tmp/21-30.csv")), Some(21));
        assert_eq!(shard_start(Path::new("/tmp/1-10.csv")), Some(1));
        assert_eq!(shard_start(Path::new("/tmp/notes.txt")), None);
    }

    #[test]
    fn write_shard_emits_header_and_rows() {
        let dir = scratch_dir("shard");
        let path = dir.join("1-1.csv");
        let records = vec![
            record("Plain title", Some("张三"), "body, with comma"),
            record("Second", None, "text"),
        ];
        write_shard(&path, &records, true).expect("write shard");
        let written = fs::read_to_string(&path).expect("read shard");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines,
            vec![
                "title,date,author,content",
                "Plain title,2021-03-12,张三,\"body, with comma\"",
                "Second,2021-03-12,,text",
            ]
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn merge_orders_shards_by_page_number_not_name() {
        let dir = scratch_dir("merge");
        fs::write(dir.join("10-19.csv"), "later\n").expect("write");
        fs::write(dir.join("2-9.csv"), "earlier\n").expect("write");
        let target = dir.join("data.csv");
        merge_shards(&dir, &target).expect("merge");
        assert_eq!(
            fs::read_to_string(&target).expect("read merged"),
            "earlier\nlater\n"
        );
        let _ = fs::remove_dir_all(&dir);
    }
}
