//! Forgiving document tree: node arena, tokenizing parser, query engine.
//!
//! The parser makes no conformance claims. It matches a small, ordered set of
//! lexical rules against the buffer, builds the best tree it can, and absorbs
//! malformed input instead of failing; downstream query chains then surface
//! anything missing as an empty result rather than an error.

pub mod filter;
pub mod node;
pub mod parser;

pub use filter::{Filter, Traverse};
pub use node::{unescape, NodeId, NodeKind, NodeRef, NodeType, Tree};
pub use parser::Parser;
