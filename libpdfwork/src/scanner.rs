//! Phase 1: Scanner
//!
//! The scanner splits outline source into physical lines. It:
//! - strips a leading BOM and trailing carriage returns
//! - drops blank lines and `#` comment lines
//! - numbers the remaining lines from 1 for error reporting

/// A single line after the scanning phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLine<'a> {
    /// The raw line, without line terminator.
    pub text: &'a str,
    /// One-based line number.
    pub line_num: usize,
}

/// Scan source text into significant lines.
pub fn scan(source: &str) -> Vec<ScanLine<'_>> {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    source
        .split('\n')
        .enumerate()
        .filter_map(|(index, raw)| {
            let text = raw.strip_suffix('\r').unwrap_or(raw);
            if is_ignored(text) {
                None
            } else {
                Some(ScanLine {
                    text,
                    line_num: index + 1,
                })
            }
        })
        .collect()
}

/// Blank lines and lines whose first non-indent character is `#`.
fn is_ignored(line: &str) -> bool {
    let rest = line.trim_start_matches([' ', '\t']);
    rest.trim().is_empty() || rest.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple() {
        let lines = scan("A @ 1\n    B @ 2\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "A @ 1");
        assert_eq!(lines[1].text, "    B @ 2");
        assert_eq!(lines[1].line_num, 2);
    }

    #[test]
    fn test_scan_skips_blank_and_comments() {
        let lines = scan("# heading\n\nA\n    # indented comment\n   \nB");
        let texts: Vec<&str> = lines.iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["A", "B"]);
        assert_eq!(lines[0].line_num, 3);
        assert_eq!(lines[1].line_num, 6);
    }

    #[test]
    fn test_scan_crlf_and_bom() {
        let lines = scan("\u{FEFF}A @ 1\r\n\tB\r\n");
        assert_eq!(lines[0].text, "A @ 1");
        assert_eq!(lines[1].text, "\tB");
    }
}
