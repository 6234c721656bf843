//! The page-walking crawler.
//!
//! One [`Crawler`] owns one [`Fetcher`] and both page parsers; crawling
//! walks index pages from a start page, fetches every news detail page they
//! link, and collects the extracted records. Each call builds independent
//! trees, so separate crawlers can run on separate threads untouched.

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::parsers::{IndexMeta, IndexParser, NewsMeta, NewsParser, PageParser};

/// Index URL template for the school news listing; `{page}` is replaced by
/// the page number.
pub const DEFAULT_INDEX_URL: &str = "https://web.fosu.edu.cn/school-news/page/{page}";

/// Configuration for one crawler.
///
/// All fields are public for easy configuration; use `Default::default()`
/// for standard settings.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Parse pages with the strict close-tag recovery policy.
    ///
    /// Default: `false`
    pub strict: bool,

    /// Attempts per request before giving up.
    ///
    /// Default: `3`
    pub retries: u32,

    /// Per-attempt timeout; `None` keeps the client default.
    ///
    /// Default: `None`
    pub timeout: Option<Duration>,

    /// Index URL template with a `{page}` placeholder.
    ///
    /// Default: [`DEFAULT_INDEX_URL`]
    pub index_url: String,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            strict: false,
            retries: 3,
            timeout: None,
            index_url: DEFAULT_INDEX_URL.to_string(),
        }
    }
}

/// Fetches and extracts index and news pages.
#[derive(Debug)]
pub struct Crawler {
    fetcher: Fetcher,
    index_parser: IndexParser,
    news_parser: NewsParser,
    index_url: String,
}

impl Crawler {
    /// Build a crawler from options.
    pub fn new(options: &CrawlOptions) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(options.retries, options.timeout)?,
            index_parser: IndexParser::new(options.strict),
            news_parser: NewsParser::new(options.strict),
            index_url: options.index_url.clone(),
        })
    }

    /// Crawl `pages` index pages starting at `start_page` (`None` = through
    /// the last page), collecting one record per news article.
    pub fn crawl(&self, start_page: u32, pages: Option<u32>) -> Result<Vec<NewsMeta>> {
        if start_page < 1 {
            return Err(Error::InvalidArgument {
                name: "start_page",
                value: start_page.to_string(),
            });
        }
        if pages == Some(0) {
            return Err(Error::InvalidArgument {
                name: "pages",
                value: "0".to_string(),
            });
        }

        let mut crawled = 0;
        let mut records = Vec::new();
        loop {
            let page = start_page + crawled;
            let index = self.index_meta(page)?;
            let base = Url::parse(&self.index_url_for(page))?;
            for href in &index.newses {
                let target = base.join(href)?;
                tracing::debug!(url = %target, "fetching news page");
                records.push(self.news_meta(target.as_str())?);
            }
            crawled += 1;

            if pages.is_some_and(|limit| crawled >= limit) || page >= index.last {
                break;
            }
        }
        Ok(records)
    }

    /// Fetch one index page and extract its meta.
    pub fn index_meta(&self, page: u32) -> Result<IndexMeta> {
        let html = self.fetcher.get(&self.index_url_for(page))?;
        self.index_parser.parse(&html)
    }

    /// Fetch one news detail page and extract its meta.
    pub fn news_meta(&self, url: &str) -> Result<NewsMeta> {
        let html = self.fetcher.get(url)?;
        self.news_parser.parse(&html)
    }

    fn index_url_for(&self, page: u32) -> String {
        self.index_url.replace("{page}", &page.to_string())
    }
}
