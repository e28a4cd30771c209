//! Expression reader
//!
//! Reads LISP-style S-expressions into [`Value`](crate::runtime::Value)
//! expressions: lists become calls, identifiers become symbols.

mod reader;

pub use reader::{read, read_all, SExprReader, MAX_READ_DEPTH};
