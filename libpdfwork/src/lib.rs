//! Outline source parser and PDF bookmark synchronizer.
//!
//! An outline source is a plain-text table of contents, one entry per line,
//! nested by indentation:
//!
//! ```text
//! Preface @ 1
//! Crystals @ 3
//!     Lattices
//!     Symmetry @ 9
//! ```
//!
//! A missing `@ page` inherits the page of the entry before it.
//!
//! # Parsing Pipeline
//!
//! 1. **Scanner**: Splits source text into numbered lines, dropping blank
//!    and comment lines.
//!
//! 2. **Tokenizer**: Splits each line into its indentation prefix, title,
//!    and optional page number.
//!
//! 3. **Builder**: Converts prefixes into levels and attaches each entry
//!    under the last entry one level up.
//!
//! The resulting [`OutlineNode`] tree can be written back with [`encode`],
//! replayed into a document's bookmarks with [`synchronize`], or rebuilt
//! from native bookmarks with [`export`]. [`PdfDocument`] connects both
//! directions to real PDF files.

mod builder;
mod encode;
mod error;
mod export;
mod indent;
mod outline;
pub mod pdf;
mod scanner;
mod sync;
mod tokenizer;

pub use builder::{OutlineBuilder, DEFAULT_PAGE};
pub use encode::{encode, encode_title, UNTITLED};
pub use error::{ParseContext, ParseError, PdfError, Result, SyncError};
pub use export::{export, BookmarkTree, PageTable};
pub use indent::{IndentPattern, CANONICAL_UNIT};
pub use outline::{OutlineNode, Walk};
pub use pdf::PdfDocument;
pub use sync::{
    synchronize, target_page, BookmarkSink, Numbering, RangePolicy, SyncOptions, SyncReport,
};

/// Parse outline source into a tree.
///
/// # Example
///
/// ```
/// use libpdfwork::{decode, encode};
///
/// let root = decode("A @ 1\n    B\n").unwrap();
/// assert_eq!(encode(&root), "A @ 1\n    B @ 1\n");
/// ```
pub fn decode(input: &str) -> Result<OutlineNode> {
    decode_with_filename(input, None)
}

/// Parse outline source with a filename for error messages.
pub fn decode_with_filename(input: &str, filename: Option<&str>) -> Result<OutlineNode> {
    let ctx = ParseContext::new(filename);
    let mut pattern = IndentPattern::new();
    let mut builder = OutlineBuilder::new();

    // Phase 1: Scan source into lines
    for line in scanner::scan(input) {
        let locate = |e: ParseError| e.with_location(&ctx, line.line_num, line.text);

        // Phase 2: Split the line
        let token = tokenizer::tokenize(line.text).map_err(locate)?;

        // Phase 3: Attach to the tree
        let level = pattern.level(token.indent).map_err(locate)?;
        builder
            .push(level, token.title, token.page)
            .map_err(locate)?;
    }

    Ok(builder.finish())
}
