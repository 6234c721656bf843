//! Error types for newsgrab.
//!
//! A single crate-wide error enum covers both the query engine and the
//! crawler plumbing built on top of it.

/// Error type for query and crawl operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A filter chain produced more than one node where exactly one was
    /// expected. Raised only by [`Filter::node`](crate::dom::Filter::node);
    /// it signals an under-specific selector path, not bad input data.
    #[error("found {0} nodes in the filter, expected 1")]
    MultipleNodes(usize),

    /// A page was missing an element the extraction rules rely on.
    #[error("missing expected element: {0}")]
    MissingElement(&'static str),

    /// A caller-supplied argument was out of range.
    #[error("invalid value for {name}: {value}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The server answered with something other than 200 OK.
    #[error("expected status code 200, got {0}")]
    UnexpectedStatus(u16),

    /// A request failed at the transport level.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Every retry attempt failed at the transport level.
    #[error("request failed after {retries} attempts: {source}")]
    RetryExhausted {
        /// Number of attempts made.
        retries: u32,
        /// The last transport error observed.
        #[source]
        source: reqwest::Error,
    },

    /// A URL could not be parsed or resolved.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// A publish date did not parse.
    #[error("invalid date: {0}")]
    Date(#[from] chrono::ParseError),

    /// A numeric field (page number) did not parse.
    #[error("invalid number: {0}")]
    Number(#[from] std::num::ParseIntError),

    /// Filesystem failure while writing or merging result shards.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for query and crawl operations.
pub type Result<T> = std::result::Result<T, Error>;
