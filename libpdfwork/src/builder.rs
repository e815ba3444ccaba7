//! Phase 3: Outline Tree Builder
//!
//! Rebuilds the tree from a stream of `(level, title, page)` entries. The
//! builder keeps the path from the root to the most recently added node as
//! a stack of child indices, one per level, so each entry is attached to the
//! last node seen one level up.

use crate::error::{ParseError, Result};
use crate::outline::OutlineNode;

/// Page inherited by entries that precede any explicit page number.
pub const DEFAULT_PAGE: u32 = 1;

/// Incremental outline tree builder.
#[derive(Debug, Clone)]
pub struct OutlineBuilder {
    root: OutlineNode,
    /// Child index at each level along the path to the last node.
    path: Vec<usize>,
    last_page: u32,
}

impl Default for OutlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self {
            root: OutlineNode::root(),
            path: Vec::new(),
            last_page: DEFAULT_PAGE,
        }
    }

    /// Number of open levels, i.e. one more than the level of the last
    /// entry (0 before the first entry).
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Add an entry. A missing page inherits the previous entry's page.
    ///
    /// Fails when `level` is more than one deeper than the previous entry.
    pub fn push(&mut self, level: usize, title: impl Into<String>, page: Option<u32>) -> Result<()> {
        if level > self.path.len() {
            return Err(ParseError::nesting_jump(level, self.path.len()));
        }
        self.attach(level, title.into(), page);
        Ok(())
    }

    /// Add an entry, clamping `level` to the deepest legal level.
    pub(crate) fn attach(&mut self, level: usize, title: String, page: Option<u32>) {
        let level = level.min(self.path.len());
        let page = page.unwrap_or(self.last_page);
        self.last_page = page;

        self.path.truncate(level);
        let mut parent = &mut self.root;
        for &index in &self.path {
            parent = &mut parent.children[index];
        }
        parent
            .children
            .push(OutlineNode::new(level as i32, title, page));
        self.path.push(parent.children.len() - 1);
    }

    /// Finish building and return the root sentinel.
    pub fn finish(self) -> OutlineNode {
        self.root
    }
}
