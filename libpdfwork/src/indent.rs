//! Indentation inference.
//!
//! The first indented line fixes the character class (spaces or tabs) and
//! the width of one level. Every later prefix must be a whole number of
//! those units.
//!
//! A prefix that is already a whole multiple of the canonical unit (four
//! spaces, or one tab) is read in canonical units, so an eight-space first
//! indent is level 2 rather than a new eight-space unit. Other widths (two
//! spaces, three spaces, six spaces) become the unit as written.

use crate::error::{ParseError, Result};

/// Unit written by the encoder.
pub const CANONICAL_UNIT: &str = "    ";

/// The indentation unit of one outline source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentPattern {
    unit: Option<String>,
}

impl IndentPattern {
    /// A pattern that has not seen an indented line yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The inferred unit, once an indented line has been seen.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Convert a raw indentation prefix into a nesting level, inferring the
    /// unit on first use.
    pub fn level(&mut self, prefix: &str) -> Result<usize> {
        if prefix.is_empty() {
            return Ok(0);
        }

        if self.unit.is_none() {
            self.unit = Some(infer_unit(prefix)?);
        }
        let unit = self.unit.as_deref().unwrap_or(CANONICAL_UNIT);

        let unit_char = unit.as_bytes()[0];
        if let Some(bad) = prefix.bytes().find(|&b| b != unit_char) {
            return Err(ParseError::indentation(format!(
                "found {} in indentation of a file indented with {}",
                class_name(bad),
                class_name(unit_char)
            )));
        }

        if prefix.len() % unit.len() != 0 {
            return Err(ParseError::indentation(format!(
                "indentation of {} is not a multiple of the {}-character unit",
                prefix.len(),
                unit.len()
            )));
        }

        Ok(prefix.len() / unit.len())
    }
}

/// Pick the unit from the first indented prefix.
fn infer_unit(prefix: &str) -> Result<String> {
    let first = prefix.as_bytes()[0];
    if prefix.bytes().any(|b| b != first) {
        return Err(ParseError::indentation("indentation mixes spaces and tabs"));
    }
    let unit = match first {
        b'\t' => "\t".to_string(),
        _ if prefix.len() % CANONICAL_UNIT.len() == 0 => CANONICAL_UNIT.to_string(),
        _ => prefix.to_string(),
    };
    Ok(unit)
}

fn class_name(b: u8) -> &'static str {
    if b == b'\t' {
        "tabs"
    } else {
        "spaces"
    }
}
