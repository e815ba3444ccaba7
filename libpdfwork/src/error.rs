//! Error types for outline parsing, bookmark synchronization, and PDF access.

use thiserror::Error;

/// Result type for outline parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, line: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at line {} of <{}>", line, name),
            None => format!(" at line {}", line),
        }
    }
}

/// Error type for outline source parsing.
///
/// Every variant carries the 1-based line number and the raw text of the
/// offending line. `loc` is the rendered location suffix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not match the `title [@ page]` grammar.
    #[error("Format error: {reason}{loc}: {text:?}")]
    Format {
        reason: String,
        line: usize,
        text: String,
        loc: String,
    },

    /// Indentation is a partial unit or mixes tabs and spaces.
    #[error("Indentation error: {reason}{loc}: {text:?}")]
    Indentation {
        reason: String,
        line: usize,
        text: String,
        loc: String,
    },

    /// Indentation deepens by more than one level.
    #[error("Nesting jumps to level {level} where at most level {max} is allowed{loc}: {text:?}")]
    NestingJump {
        level: usize,
        max: usize,
        line: usize,
        text: String,
        loc: String,
    },
}

impl ParseError {
    /// A grammar failure not yet attached to a line.
    pub fn format(reason: impl Into<String>) -> Self {
        ParseError::Format {
            reason: reason.into(),
            line: 0,
            text: String::new(),
            loc: String::new(),
        }
    }

    /// An indentation failure not yet attached to a line.
    pub fn indentation(reason: impl Into<String>) -> Self {
        ParseError::Indentation {
            reason: reason.into(),
            line: 0,
            text: String::new(),
            loc: String::new(),
        }
    }

    /// A nesting jump not yet attached to a line.
    pub fn nesting_jump(level: usize, max: usize) -> Self {
        ParseError::NestingJump {
            level,
            max,
            line: 0,
            text: String::new(),
            loc: String::new(),
        }
    }

    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, line: usize, text: &str) -> Self {
        let loc = ctx.loc_suffix(line);
        let text = text.to_string();
        match self {
            ParseError::Format { reason, .. } => ParseError::Format {
                reason,
                line,
                text,
                loc,
            },
            ParseError::Indentation { reason, .. } => ParseError::Indentation {
                reason,
                line,
                text,
                loc,
            },
            ParseError::NestingJump { level, max, .. } => ParseError::NestingJump {
                level,
                max,
                line,
                text,
                loc,
            },
        }
    }

    /// The 1-based line number, or 0 when the error has no location yet.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Format { line, .. }
            | ParseError::Indentation { line, .. }
            | ParseError::NestingJump { line, .. } => *line,
        }
    }

    /// The raw text of the offending line.
    pub fn text(&self) -> &str {
        match self {
            ParseError::Format { text, .. }
            | ParseError::Indentation { text, .. }
            | ParseError::NestingJump { text, .. } => text,
        }
    }

    /// Indentation errors are a kind of format error.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ParseError::Format { .. } | ParseError::Indentation { .. }
        )
    }
}

/// Error type for replaying an outline into a bookmark sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The computed target page does not exist in the document.
    #[error("Bookmark {title:?} targets page index {target}, but the document has {page_count} pages")]
    OffsetRange {
        title: String,
        target: i64,
        page_count: usize,
    },

    /// The sink rejected a bookmark.
    #[error("Cannot create bookmark: {0}")]
    Sink(String),
}

/// Error type for PDF document access.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Error reported by the PDF library.
    #[error("PDF error: {0}")]
    Lopdf(#[from] lopdf::Error),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document structure is not what a PDF requires.
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// Writing the document failed.
    #[error("Cannot save document: {0}")]
    Save(String),

    /// The outline could not be replayed into the document.
    #[error(transparent)]
    Sync(#[from] SyncError),
}
