//! Ruby parsing front end.
//!
//! Wraps tree-sitter behind a small parser type and lowers the foreign
//! tree into the owned arena document model the engine core reads. The
//! core never touches tree-sitter types.

pub mod errors;
pub mod lower;
pub mod parser;

pub use errors::ParseError;
pub use lower::lower;
pub use parser::{ParsedRuby, RubyParser};

use crate::document::Document;

/// Parse and lower one source text into a [`Document`].
///
/// Returns `None` when the source does not parse cleanly: the engine
/// treats a failed parse as "no offenses for this document", not as an
/// error.
pub fn parse_document(source: &str) -> Option<Document> {
    let result = crate::pool::with_parser(|parser| {
        let parsed = parser.parse(source)?;
        if parsed.has_errors() {
            return Err(ParseError::SyntaxErrors);
        }
        Ok(lower(source, &parsed))
    });

    match result {
        Ok(Ok(doc)) => Some(doc),
        _ => None,
    }
}
