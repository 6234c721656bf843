//! Character set detection and decoding for fetched pages.
//!
//! Servers in the wild still answer with GBK, Big5, or Latin-1 bodies; the
//! charset declaration, when present, sits in the document head. We sniff a
//! small window of the raw bytes for a `<meta>` declaration and decode the
//! whole body lossily (undecodable sequences become U+FFFD), defaulting to
//! UTF-8.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// How many leading bytes to sniff for a charset declaration.
const SNIFF_WINDOW: usize = 1024;

/// `<meta charset="...">`
#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>]+)"#).expect("META_CHARSET regex")
});

/// `<meta http-equiv="Content-Type" content="...; charset=...">`
#[allow(clippy::expect_used)]
static META_CONTENT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#,
    )
    .expect("META_CONTENT_TYPE regex")
});

/// Pick the encoding declared in the document head, or UTF-8.
#[must_use]
pub fn sniff_encoding(body: &[u8]) -> &'static Encoding {
    let head = String::from_utf8_lossy(&body[..body.len().min(SNIFF_WINDOW)]);
    [&META_CHARSET, &META_CONTENT_TYPE]
        .iter()
        .filter_map(|pattern| pattern.captures(&head))
        .filter_map(|caps| caps.get(1))
        .find_map(|label| Encoding::for_label(label.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode a raw HTML body to a UTF-8 string using the declared charset.
#[must_use]
pub fn decode_html(body: &[u8]) -> String {
    let (text, _, _) = sniff_encoding(body).decode(body);
    text.into_owned()
}
