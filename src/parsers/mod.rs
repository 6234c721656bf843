//! Page-type-specific extraction rules.
//!
//! Each parser consumes one decoded HTML page through the DOM engine and
//! pulls a typed meta value out of it. Parsers own their DOM [`Parser`]
//! (crate::dom::Parser) and share its strictness policy with the whole
//! crawl. Selector paths here encode where the ground truth lives in the
//! site's markup; keep them local to one page type.

pub mod index;
pub mod news;

pub use index::{IndexMeta, IndexParser};
pub use news::{NewsMeta, NewsParser};

use crate::error::Result;

/// One decoded page in, one typed meta value out.
pub trait PageParser {
    /// The extracted record type.
    type Output;

    /// Extract from a decoded HTML buffer.
    fn parse(&self, html: &str) -> Result<Self::Output>;
}
