//! Extraction rules for the news index (listing) page.

use crate::dom::Parser;
use crate::error::{Error, Result};

use super::PageParser;

/// What one index page yields.
#[derive(Debug, Clone)]
pub struct IndexMeta {
    /// The page's own number.
    pub page: u32,
    /// Number of the last page the pagination bar links to.
    pub last: u32,
    /// Links to the news detail pages this page lists, in document order.
    pub newses: Vec<String>,
}

/// Parser for index pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexParser {
    parser: Parser,
}

impl IndexParser {
    /// An index parser whose DOM parser uses the given recovery policy.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            parser: Parser::new(strict),
        }
    }
}

impl PageParser for IndexParser {
    type Output = IndexMeta;

    fn parse(&self, html: &str) -> Result<IndexMeta> {
        let tree = self.parser.parse(html);
        let root = tree.root().filter();

        // Each listed item wraps its detail link as the first child.
        let mut newses = Vec::new();
        for link in root.cls("list-details").child(0).iter() {
            let href = link
                .attr("href")
                .ok_or(Error::MissingElement("news link href"))?;
            newses.push(href.to_string());
        }

        let page: u32 = root
            .cls("current")
            .child(0)
            .node()?
            .and_then(|node| node.text())
            .ok_or(Error::MissingElement("current page number"))?
            .trim()
            .parse()?;

        // The last pagination link carries the final page number as its
        // trailing path segment; an empty segment means we are on it.
        let pagination = root.cls("extend");
        let href = pagination
            .last()
            .and_then(|link| link.attr("href"))
            .ok_or(Error::MissingElement("pagination link"))?;
        let tail = href.rsplit('/').next().unwrap_or_default();
        let last = if tail.is_empty() { page } else { tail.parse()? };

        Ok(IndexMeta { page, last, newses })
    }
}
