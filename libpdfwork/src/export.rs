//! Bookmark Exporter
//!
//! Turns a document's native bookmark tree back into an outline tree. The
//! native tree is a nested list of items and lists, where a list holds the
//! children of the item immediately before it. Destinations are page
//! identities, resolved through a [`PageTable`] built once per document.

use crate::builder::{OutlineBuilder, DEFAULT_PAGE};
use crate::outline::OutlineNode;
use log::warn;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// One element of a native bookmark list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkTree<K> {
    /// A bookmark and its destination page identity, if it has one.
    Item {
        title: String,
        destination: Option<K>,
    },
    /// Children of the preceding item.
    List(Vec<BookmarkTree<K>>),
}

impl<K> BookmarkTree<K> {
    pub fn item(title: impl Into<String>, destination: Option<K>) -> Self {
        BookmarkTree::Item {
            title: title.into(),
            destination,
        }
    }
}

/// Page identity to 0-based page index.
#[derive(Debug, Clone)]
pub struct PageTable<K> {
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Debug> PageTable<K> {
    /// Index pages in document order.
    pub fn new(pages: impl IntoIterator<Item = K>) -> Self {
        let mut index = HashMap::new();
        for (i, page) in pages.into_iter().enumerate() {
            index.entry(page).or_insert(i);
        }
        Self { index }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// 0-based index of a page identity.
    pub fn lookup(&self, page: &K) -> Option<usize> {
        self.index.get(page).copied()
    }

    /// 1-based logical page for a bookmark destination. Destinations that
    /// cannot be resolved fall back to page 1 with a warning.
    pub fn resolve(&self, title: &str, destination: Option<&K>) -> u32 {
        match destination.and_then(|page| self.lookup(page)) {
            Some(index) => index as u32 + 1,
            None => {
                warn!(
                    "Cannot resolve destination {:?} of bookmark {:?}; using page {}",
                    destination, title, DEFAULT_PAGE
                );
                DEFAULT_PAGE
            }
        }
    }
}

/// Build an outline tree from a native bookmark list.
pub fn export<K: Eq + Hash + Debug>(
    bookmarks: &[BookmarkTree<K>],
    pages: &PageTable<K>,
) -> OutlineNode {
    let mut builder = OutlineBuilder::new();
    let mut stack = vec![(bookmarks.iter(), 0usize)];

    while let Some((items, level)) = stack.last_mut() {
        let level = *level;
        match items.next() {
            None => {
                stack.pop();
            }
            Some(BookmarkTree::Item { title, destination }) => {
                let page = pages.resolve(title, destination.as_ref());
                builder.attach(level, title.clone(), Some(page));
            }
            Some(BookmarkTree::List(children)) => {
                // A list nests under the last item at this level, if any.
                if builder.depth() > level {
                    stack.push((children.iter(), level + 1));
                } else {
                    warn!("Bookmark list without a parent item; hoisting to level {}", level);
                    stack.push((children.iter(), level));
                }
            }
        }
    }

    builder.finish()
}
