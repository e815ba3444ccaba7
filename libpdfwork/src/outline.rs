//! Outline tree representation.

/// One entry in an outline tree.
///
/// The tree is rooted at a sentinel node with `indent == -1` that carries no
/// title of its own. Every child has `indent == parent.indent + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    /// Nesting depth; `-1` for the root sentinel.
    pub indent: i32,
    /// Bookmark title.
    pub title: String,
    /// Logical page number, 1-based.
    pub page_index: u32,
    /// Child entries in document order.
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// An empty root sentinel.
    pub fn root() -> Self {
        Self {
            indent: -1,
            title: String::new(),
            page_index: 0,
            children: Vec::new(),
        }
    }

    /// A childless entry.
    pub fn new(indent: i32, title: impl Into<String>, page_index: u32) -> Self {
        Self {
            indent,
            title: title.into(),
            page_index,
            children: Vec::new(),
        }
    }

    /// Builder-style child append, mostly for constructing trees by hand.
    pub fn with_child(mut self, child: OutlineNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns `true` for the root sentinel.
    pub fn is_root(&self) -> bool {
        self.indent < 0
    }

    /// Number of entries below this node.
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Returns `true` if the node has no descendants.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order iterator over all descendants, paired with their depth
    /// relative to this node's children (which are at depth 0).
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.children.iter().rev().map(|c| (0, c)).collect(),
        }
    }
}

/// Pre-order traversal driven by an explicit stack.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a OutlineNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a OutlineNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        Some((depth, node))
    }
}
