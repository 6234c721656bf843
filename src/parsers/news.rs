//! Extraction rules for a news detail page.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::dom::{NodeType, Parser};
use crate::error::{Error, Result};

use super::PageParser;

/// Trailing `(author)` suffix on the article body, ASCII or fullwidth
/// brackets; the closing bracket must match the opening kind.
#[allow(clippy::expect_used)]
static AUTHOR_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?s:(?P<content>.*))(?:\((?P<ascii>.*?)\)|（(?P<fullwidth>.*?)）)\s*$")
        .expect("AUTHOR_SUFFIX regex")
});

/// What one news detail page yields.
#[derive(Debug, Clone)]
pub struct NewsMeta {
    /// Article headline.
    pub title: String,
    /// Publish date.
    pub date: NaiveDate,
    /// Author name recovered from the body's trailing bracket, if any.
    pub author: Option<String>,
    /// Concatenated body text, author suffix removed.
    pub content: String,
}

/// Parser for news detail pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsParser {
    parser: Parser,
}

impl NewsParser {
    /// A news parser whose DOM parser uses the given recovery policy.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            parser: Parser::new(strict),
        }
    }
}

impl PageParser for NewsParser {
    type Output = NewsMeta;

    fn parse(&self, html: &str) -> Result<NewsMeta> {
        let tree = self.parser.parse(html);
        let root = tree.root().filter();
        let header = root.cls("content-title");

        let title = header
            .tag("h1")
            .child(0)
            .node()?
            .and_then(|node| node.text())
            .ok_or(Error::MissingElement("news title"))?;

        // The publish time element mixes a label with the date; the date is
        // the last ten characters.
        let time = header
            .cls("vartime")
            .child(0)
            .node()?
            .and_then(|node| node.text())
            .ok_or(Error::MissingElement("publish time"))?;
        let date = NaiveDate::parse_from_str(char_suffix(&time, 10), "%Y-%m-%d")?;

        let mut content = String::new();
        for node in root.cls("content-item").node_type(NodeType::Text).iter() {
            if let Some(text) = node.text() {
                content.push_str(text.trim());
            }
        }

        let mut author = None;
        if let Some(caps) = AUTHOR_SUFFIX.captures(&content) {
            author = caps
                .name("ascii")
                .or_else(|| caps.name("fullwidth"))
                .map(|found| found.as_str().to_string());
            let keep = caps.name("content").map_or(0, |body| body.end());
            content.truncate(keep);
        }

        Ok(NewsMeta {
            title,
            date,
            author,
            content,
        })
    }
}

/// Last `n` characters of `s` (the whole string when shorter).
fn char_suffix(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    s.char_indices()
        .rev()
        .nth(n - 1)
        .map_or(s, |(idx, _)| &s[idx..])
}
