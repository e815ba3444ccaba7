//! Bookmark Synchronizer
//!
//! Replays an outline tree into a document's native bookmarks. The walk is
//! an explicit pre-order traversal carrying two level-indexed stacks: the
//! section counters used for dotted numbering ("2.1.3") and the handle of
//! the last bookmark created at each level, used to find parents.

use crate::error::SyncError;
use crate::outline::OutlineNode;
use log::{debug, info, warn};

/// A document that can receive bookmarks.
pub trait BookmarkSink {
    /// Reference to a created bookmark, used to parent later ones.
    type Handle: Copy;

    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Create a bookmark pointing at the 0-based `page`, as the last child
    /// of `parent` or at the top level.
    fn add_bookmark(
        &mut self,
        title: &str,
        page: usize,
        parent: Option<Self::Handle>,
    ) -> Result<Self::Handle, SyncError>;
}

/// What to do with an entry whose target page does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangePolicy {
    /// Fail the whole synchronization.
    #[default]
    Abort,
    /// Log a warning and leave the entry out.
    Skip,
}

/// Synchronization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Added to each logical page to get the physical page; logical page 1
    /// lands on 0-based page `offset`.
    pub offset: i64,
    /// Prefix titles with dotted section numbers.
    pub numbering: bool,
    pub out_of_range: RangePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            numbering: true,
            out_of_range: RangePolicy::Abort,
        }
    }
}

/// Outcome of a synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub skipped: usize,
}

/// 0-based native page for a 1-based logical page.
pub fn target_page(page_index: u32, offset: i64) -> i64 {
    i64::from(page_index) + offset - 1
}

/// Hierarchical section counters, one per level.
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    sequence: Vec<u32>,
}

impl Numbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next entry at `level` and return its dotted number.
    pub fn advance(&mut self, level: usize) -> String {
        if level < self.sequence.len() {
            self.sequence.truncate(level + 1);
            self.sequence[level] += 1;
        } else {
            self.sequence.resize(level + 1, 1);
        }
        self.label()
    }

    /// The current dotted number, e.g. `2.1`.
    pub fn label(&self) -> String {
        self.sequence
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Replay `root`'s entries into `sink`.
pub fn synchronize<S: BookmarkSink>(
    root: &OutlineNode,
    sink: &mut S,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let page_count = sink.page_count();
    let mut numbering = Numbering::new();
    let mut bookmarks: Vec<Option<S::Handle>> = Vec::new();
    let mut report = SyncReport::default();

    for (level, node) in root.walk() {
        let number = numbering.advance(level);
        let title = if options.numbering {
            format!("{} {}", number, node.title)
        } else {
            node.title.clone()
        };

        bookmarks.truncate(level);
        bookmarks.resize(level, None);
        let parent = bookmarks.iter().rev().find_map(|handle| *handle);

        let target = target_page(node.page_index, options.offset);
        if target < 0 || target >= page_count as i64 {
            match options.out_of_range {
                RangePolicy::Abort => {
                    return Err(SyncError::OffsetRange {
                        title,
                        target,
                        page_count,
                    });
                }
                RangePolicy::Skip => {
                    warn!(
                        "Skipping bookmark {:?}: page index {} is outside 0..{}",
                        title, target, page_count
                    );
                    bookmarks.push(None);
                    report.skipped += 1;
                    continue;
                }
            }
        }

        debug!("Bookmark {:?} -> page index {}", title, target);
        let handle = sink.add_bookmark(&title, target as usize, parent)?;
        bookmarks.push(Some(handle));
        report.created += 1;
    }

    info!(
        "Created {} bookmarks ({} skipped)",
        report.created, report.skipped
    );
    Ok(report)
}
