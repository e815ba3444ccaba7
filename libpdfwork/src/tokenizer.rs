//! Phase 2: Line Tokenizer
//!
//! Splits one line into its raw indentation prefix, its title, and an
//! optional page number:
//!
//! ```text
//! <indent><title>(\s*@\s*<digits>)?
//! ```

use crate::error::{ParseError, Result};

/// A tokenized outline line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Leading run of spaces and tabs, as written.
    pub indent: &'a str,
    /// Title with surrounding whitespace removed.
    pub title: String,
    /// Explicit page number, if the line has one.
    pub page: Option<u32>,
}

/// Tokenize one line (without its line terminator).
pub fn tokenize(line: &str) -> Result<Token<'_>> {
    let indent_len = line
        .bytes()
        .take_while(|&b| b == b' ' || b == b'\t')
        .count();
    let (indent, rest) = line.split_at(indent_len);

    let (title_part, page_part) = match rest.split_once('@') {
        Some((title, page)) => (title, Some(page)),
        None => (rest, None),
    };

    let title = title_part.trim();
    if title.is_empty() {
        return Err(ParseError::format("missing title"));
    }

    let page = match page_part {
        Some(digits) => Some(parse_page(digits)?),
        None => None,
    };

    Ok(Token {
        indent,
        title: title.to_string(),
        page,
    })
}

/// Parse the text after `@`.
fn parse_page(text: &str) -> Result<u32> {
    let digits = text.trim();
    if digits.is_empty() {
        return Err(ParseError::format("missing page number after \"@\""));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::format(format!(
            "page number must be digits, found {:?}",
            digits
        )));
    }
    digits
        .parse::<u32>()
        .map_err(|_| ParseError::format(format!("page number {} is too large", digits)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_page() {
        let token = tokenize("Chapter One @ 12").unwrap();
        assert_eq!(token.indent, "");
        assert_eq!(token.title, "Chapter One");
        assert_eq!(token.page, Some(12));
    }

    #[test]
    fn test_tight_at_sign() {
        let token = tokenize("    Section@3  ").unwrap();
        assert_eq!(token.indent, "    ");
        assert_eq!(token.title, "Section");
        assert_eq!(token.page, Some(3));
    }

    #[test]
    fn test_page_omitted() {
        let token = tokenize("\t\tDeep title  ").unwrap();
        assert_eq!(token.indent, "\t\t");
        assert_eq!(token.title, "Deep title");
        assert_eq!(token.page, None);
    }

    #[test]
    fn test_unicode_title() {
        let token = tokenize("晶体与晶体学 @ 1").unwrap();
        assert_eq!(token.title, "晶体与晶体学");
        assert_eq!(token.page, Some(1));
    }

    #[test]
    fn test_missing_title() {
        assert!(matches!(tokenize("@12"), Err(ParseError::Format { .. })));
        assert!(matches!(tokenize("    @ 3"), Err(ParseError::Format { .. })));
    }

    #[test]
    fn test_bad_page() {
        assert!(tokenize("A @").is_err());
        assert!(tokenize("A @ twelve").is_err());
        assert!(tokenize("A @ 1 @ 2").is_err());
        assert!(tokenize("A @ 99999999999").is_err());
    }
}
