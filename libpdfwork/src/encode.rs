//! Encode outline trees back to outline source.
//!
//! The output is normalized: four-space indentation and an explicit page
//! number on every line, so decoding and re-encoding is byte-stable.
//!
//! Titles coming from a document's bookmarks may hold characters that the
//! line syntax cannot carry. [`encode_title`] rewrites them so every entry
//! decodes back as exactly one entry with the same level and page.

use crate::indent::CANONICAL_UNIT;
use std::borrow::Cow;
use crate::outline::OutlineNode;
use std::fmt::Write;

/// Encode an outline tree as outline source text.
///
/// The root sentinel itself is never written.
pub fn encode(root: &OutlineNode) -> String {
    let mut out = String::new();
    let nodes = if root.is_root() {
        root.walk().map(|(_, node)| node).collect::<Vec<_>>()
    } else {
        std::iter::once(root)
            .chain(root.walk().map(|(_, node)| node))
            .collect()
    };
    for node in nodes {
        encode_line(&mut out, node);
    }
    out
}

/// Append one `title @ page` line for `node`.
fn encode_line(out: &mut String, node: &OutlineNode) {
    let level = node.indent.max(0) as usize;
    out.push_str(&CANONICAL_UNIT.repeat(level));
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{} @ {}", encode_title(&node.title), node.page_index);
}

/// Written for titles that are empty after trimming.
pub const UNTITLED: &str = "Untitled";

/// Make a title safe for a single outline line.
///
/// Line breaks become spaces, `@` becomes the fullwidth `＠`, and a leading
/// `#` becomes `＃` so the line is not read as a comment.
pub fn encode_title(title: &str) -> Cow<'_, str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Cow::Borrowed(UNTITLED);
    }
    let needs_rewrite = trimmed.len() != title.len()
        || trimmed.starts_with('#')
        || trimmed.contains(['@', '\r', '\n']);
    if !needs_rewrite {
        return Cow::Borrowed(title);
    }

    let mut safe: String = trimmed
        .replace("\r\n", "\n")
        .chars()
        .map(|c| match c {
            '\r' | '\n' => ' ',
            '@' => '＠',
            other => other,
        })
        .collect();
    if safe.starts_with('#') {
        safe.replace_range(..1, "＃");
    }
    Cow::Owned(safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&OutlineNode::root()), "");
    }

    #[test]
    fn test_encode_nested() {
        let root = OutlineNode::root()
            .with_child(
                OutlineNode::new(0, "A", 1)
                    .with_child(OutlineNode::new(1, "A1", 1))
                    .with_child(OutlineNode::new(1, "A2", 3)),
            )
            .with_child(OutlineNode::new(0, "B", 5));
        assert_eq!(encode(&root), "A @ 1\n    A1 @ 1\n    A2 @ 3\nB @ 5\n");
    }

    #[test]
    fn test_encode_title() {
        assert_eq!(encode_title("Plain"), "Plain");
        assert_eq!(encode_title("#1 Getting started"), "＃1 Getting started");
        assert_eq!(encode_title("Mail @ home"), "Mail ＠ home");
        assert_eq!(encode_title("   "), UNTITLED);
        assert_eq!(encode_title("Line\r\nbreak"), "Line break");
        assert_eq!(encode_title("  padded  "), "padded");
        assert_eq!(encode_title("C# in depth"), "C# in depth");
    }

    #[test]
    fn test_encode_subtree() {
        let node = OutlineNode::new(1, "Sub", 4).with_child(OutlineNode::new(2, "Leaf", 6));
        assert_eq!(encode(&node), "    Sub @ 4\n        Leaf @ 6\n");
    }
}
