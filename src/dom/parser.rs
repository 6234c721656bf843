//! Pattern-driven tokenizing parser.
//!
//! Consumes a whole decoded buffer left-to-right. At each step the cursor is
//! matched against a fixed, ordered set of anchored lexical rules; the first
//! rule that matches wins and the cursor advances past its span. There is no
//! formal grammar: input that stops matching ends the parse, and whatever
//! tree was built so far is returned as-is.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::node::{NodeId, Tree};

// Lexical rules, tried in declaration order. Leading insignificant
// whitespace is consumed by the rule itself.

/// `<!DOCTYPE ...>` and other markup declarations; consumed, no node.
#[allow(clippy::expect_used)]
static DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<![A-Za-z][\s\S]*?>\s*").expect("DECLARATION regex"));

/// `<![CDATA[...]]>`; the payload is character data.
#[allow(clippy::expect_used)]
static CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<!\[CDATA\[(?P<content>[\s\S]*?)\]\]>\s*").expect("CDATA regex")
});

/// `<!--...-->`; consumed, no node.
#[allow(clippy::expect_used)]
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<!--(?P<comment>[\s\S]*?)-->\s*").expect("COMMENT regex"));

/// `<tag ...>` or self-closing `<tag ... />`. Tag names match either case
/// but are stored as written.
#[allow(clippy::expect_used)]
static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<\s*(?P<tag>[A-Za-z]+[A-Za-z0-9-]*)(?P<attributes>[\s\S]*?)\s*(?P<closed>/)?\s*>")
        .expect("START_TAG regex")
});

/// `</tag>`.
#[allow(clippy::expect_used)]
static END_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<\s*/\s*(?P<tag>[A-Za-z]+[A-Za-z0-9-]*)\s*>").expect("END_TAG regex")
});

/// One `name="value"` (or single-quoted) pair inside a start tag.
#[allow(clippy::expect_used)]
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?P<name>[A-Za-z]+[A-Za-z0-9-]*)\s*=\s*(?:"(?P<double>[^"\n]*)"|'(?P<single>[^'\n]*)')"#,
    )
    .expect("ATTRIBUTE regex")
});

/// Recovery-aware tree builder over the lexical rules above.
///
/// The `strict` flag selects the close-tag recovery policy: in loose mode a
/// mismatched close tag implicitly closes the elements it pops; in strict
/// mode an element popped without its own close tag is invalid and is
/// spliced out of the tree, its children reparented in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    strict: bool,
}

impl Parser {
    /// A parser with the given recovery policy. `Parser::default()` is loose.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Parse a whole decoded buffer into a tree.
    ///
    /// Never fails: a truncated or malformed document yields a partial but
    /// valid tree. The open-element stack lives entirely inside this call.
    #[must_use]
    pub fn parse(&self, content: &str) -> Tree {
        let mut tree = Tree::new();
        let mut opened: Vec<NodeId> = Vec::new();
        let mut rest = content;

        while !rest.is_empty() {
            if let Some(matched) = DECLARATION.find(rest) {
                rest = &rest[matched.end()..];
                continue;
            }
            if let Some(caps) = CDATA.captures(rest) {
                let data = caps.name("content").map_or("", |m| m.as_str());
                append_character_data(&mut tree, &opened, data);
                rest = after(rest, &caps);
                continue;
            }
            if let Some(matched) = COMMENT.find(rest) {
                rest = &rest[matched.end()..];
                continue;
            }
            if let Some(caps) = START_TAG.captures(rest) {
                let tag = caps.name("tag").map_or("", |m| m.as_str());
                let attributes = parse_attributes(caps.name("attributes").map_or("", |m| m.as_str()));
                let parent = opened.last().copied().unwrap_or(Tree::ROOT);
                let node = tree.append_element(parent, tag.to_string(), attributes);
                if caps.name("closed").is_none() {
                    opened.push(node);
                }
                rest = after(rest, &caps);
                continue;
            }
            if let Some(caps) = END_TAG.captures(rest) {
                let tag = caps.name("tag").map_or("", |m| m.as_str());
                self.close_tag(&mut tree, &mut opened, tag);
                rest = after(rest, &caps);
                continue;
            }
            if let Some((end, data)) = match_text(rest) {
                append_character_data(&mut tree, &opened, data);
                rest = &rest[end..];
                continue;
            }
            // No rule matched: return what we have.
            break;
        }

        self.close_remaining(&mut tree, &mut opened);
        tree
    }

    /// Close-tag recovery: pop open elements until one matches `tag`.
    ///
    /// A popped non-matching element is implicitly closed in loose mode and
    /// spliced out in strict mode. If the stack empties without a match the
    /// close tag itself is a no-op.
    fn close_tag(&self, tree: &mut Tree, opened: &mut Vec<NodeId>, tag: &str) {
        while let Some(id) = opened.pop() {
            if tree.element_tag(id) == Some(tag) {
                return;
            }
            if self.strict {
                tree.splice_out(id);
            }
        }
    }

    /// End of input closes the outermost open element, so inner unclosed
    /// elements get the recovery treatment while the outermost stays valid.
    fn close_remaining(&self, tree: &mut Tree, opened: &mut Vec<NodeId>) {
        while let Some(&bottom) = opened.first() {
            let tag = tree.element_tag(bottom).unwrap_or_default().to_string();
            self.close_tag(tree, opened, &tag);
        }
    }
}

/// Append character data under the innermost open element (or the root),
/// coalescing with an existing trailing text node.
fn append_character_data(tree: &mut Tree, opened: &[NodeId], data: &str) {
    let parent = opened.last().copied().unwrap_or(Tree::ROOT);
    match tree.last_child(parent) {
        Some(last) if tree.is_text(last) => tree.extend_text(last, data),
        _ => {
            tree.append_text(parent, data.to_string());
        }
    }
}

/// Parse the raw substring between a tag's name and its `>` into an
/// attribute map. Stops at the first thing that is not a quoted pair;
/// the malformed tail is dropped silently.
fn parse_attributes(raw: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    let mut rest = raw;
    while !rest.is_empty() {
        let Some(caps) = ATTRIBUTE.captures(rest) else {
            break;
        };
        let name = caps.name("name").map_or("", |m| m.as_str());
        let value = caps
            .name("double")
            .or_else(|| caps.name("single"))
            .map_or("", |m| m.as_str());
        attributes.insert(name.to_string(), value.to_string());
        rest = after(rest, &caps);
    }
    attributes
}

/// Match a run of character data: the longest span up to the next complete
/// `<...>` construct or the end of the buffer. Leading whitespace is
/// discarded; whitespace immediately before the construct is left for the
/// next rule. Hand-written because this rule needs lookahead the regex
/// crate does not provide.
///
/// Returns the cursor advance and the content span.
fn match_text(rest: &str) -> Option<(usize, &str)> {
    if rest.is_empty() {
        return None;
    }
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        // Whitespace-only tail: the final character still counts as data.
        let (idx, _) = rest.char_indices().next_back()?;
        return Some((rest.len(), &rest[idx..]));
    }
    let start = rest.len() - trimmed.len();
    // Content is at least one character; a construct can begin only after it.
    let first = trimmed.chars().next().map_or(0, char::len_utf8);
    let search = start + first;
    let end = match rest[search..].find('<') {
        Some(offset) => {
            let lt = search + offset;
            if rest[lt + 1..].contains('>') {
                start + rest[start..lt].trim_end().len()
            } else {
                rest.len()
            }
        }
        None => rest.len(),
    };
    Some((end, &rest[start..end]))
}

/// Remainder of `rest` past a whole-pattern match.
fn after<'a>(rest: &'a str, caps: &regex::Captures<'_>) -> &'a str {
    caps.get(0).map_or(rest, |m| &rest[m.end()..])
}
