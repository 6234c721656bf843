//! # newsgrab
//!
//! Forgiving HTML tree parsing and selector-style querying, with a threaded
//! campus-news crawler built on top.
//!
//! The core takes a raw, possibly malformed markup document, builds an
//! in-memory tree, and lets callers pull specific nodes out of it through a
//! composable filter chain — by id, class, tag, node variant, child
//! position, or attribute — without a conformant HTML parser anywhere in
//! sight. Everything else here (fetching, retrying, worker threads, CSV
//! output) is plumbing layered on that engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use newsgrab::parse;
//!
//! let tree = parse(r#"<h1 class="title">Campus news</h1>"#, false);
//! let title = tree
//!     .root()
//!     .filter()
//!     .cls("title")
//!     .child(0)
//!     .node()?
//!     .and_then(|node| node.text());
//! assert_eq!(title.as_deref(), Some("Campus news"));
//! # Ok::<(), newsgrab::Error>(())
//! ```
//!
//! Malformed input never fails a parse: the tree built so far comes back and
//! downstream filters simply find less. The only error the query layer
//! raises is [`Error::MultipleNodes`], when a chain that must end in exactly
//! one node matches several.

mod error;

/// Forgiving document tree: node arena, tokenizing parser, query engine.
pub mod dom;

/// Charset sniffing and decoding for fetched pages.
pub mod encoding;

/// Blocking HTTP fetching with bounded retry.
pub mod fetch;

/// Page-type-specific extraction rules.
pub mod parsers;

/// The page-walking crawler.
pub mod crawler;

/// Fixed-size worker pool.
pub mod pool;

/// Chunked crawl orchestration and CSV persistence.
pub mod task;

// Public API - re-exports
pub use crawler::{CrawlOptions, Crawler, DEFAULT_INDEX_URL};
pub use dom::{Filter, NodeId, NodeKind, NodeRef, NodeType, Parser, Tree};
pub use error::{Error, Result};
pub use fetch::Fetcher;
pub use parsers::{IndexMeta, IndexParser, NewsMeta, NewsParser, PageParser};
pub use pool::ThreadPool;
pub use task::{CrawlTask, TaskOptions};

/// Parse a decoded HTML document into a tree.
///
/// `strict` selects the close-tag recovery policy (see [`dom::Parser`]).
/// Never fails: a truncated or malformed document yields a partial but
/// valid tree.
#[must_use]
pub fn parse(html: &str, strict: bool) -> Tree {
    Parser::new(strict).parse(html)
}

/// Parse raw HTML bytes, sniffing the charset from the document head.
///
/// # Example
///
/// ```rust
/// use newsgrab::parse_bytes;
///
/// // ISO-8859-1 bytes with a charset declaration
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><p>Caf\xE9</p></body></html>";
/// let tree = parse_bytes(html, false);
/// let text = tree.root().filter().tag("p").child(0).node()?.and_then(|n| n.text());
/// assert_eq!(text.as_deref(), Some("Café"));
/// # Ok::<(), newsgrab::Error>(())
/// ```
#[must_use]
pub fn parse_bytes(html: &[u8], strict: bool) -> Tree {
    parse(&encoding::decode_html(html), strict)
}
