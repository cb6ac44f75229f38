//! Thread-local parser pooling.
//!
//! Eliminates redundant parser creation by maintaining a thread-local pool
//! of reusable parsers. Creates a new parser on first use per thread,
//! reuses it for subsequent documents. The pool holds no per-document
//! state, so parallel analyses on separate threads stay isolated.

use crate::ruby::{ParseError, RubyParser};
use std::cell::RefCell;

thread_local! {
    static RUBY_PARSER: RefCell<Option<RubyParser>> = const { RefCell::new(None) };
}

/// Execute function with pooled parser instance.
///
/// On first call per thread, creates a new parser. Subsequent calls reuse
/// the same parser instance, avoiding allocation and initialization
/// overhead.
pub fn with_parser<F, R>(f: F) -> Result<R, ParseError>
where
    F: FnOnce(&mut RubyParser) -> R,
{
    RUBY_PARSER.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(RubyParser::new()?);
        }
        Ok(f(opt.as_mut().expect("parser was just initialized above")))
    })
}
