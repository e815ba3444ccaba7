//! PDF collaborator backed by `lopdf`.
//!
//! [`PdfDocument`] wraps a loaded document and offers what the outline
//! operations need: page identities, reading the `/Outlines` tree as a
//! [`BookmarkTree`], replacing it through [`PdfBookmarkWriter`], erasing it,
//! and saving. Documents are only written by [`PdfDocument::save`], after
//! every mutation has succeeded.

use crate::error::{PdfError, SyncError};
use crate::export::{export, BookmarkTree, PageTable};
use crate::outline::OutlineNode;
use crate::sync::{synchronize, BookmarkSink, SyncOptions, SyncReport};
use log::{debug, info, warn};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Guard against cyclic or absurdly deep outline and name trees.
const MAX_DEPTH: usize = 64;

/// A PDF document opened for outline work.
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    /// Load a document from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let path = path.as_ref();
        let doc = Document::load(path)?;
        debug!("Opened {} ({} pages)", path.display(), doc.get_pages().len());
        Ok(Self { doc })
    }

    /// Load a document from memory.
    pub fn load_mem(bytes: &[u8]) -> Result<Self, PdfError> {
        Ok(Self {
            doc: Document::load_mem(bytes)?,
        })
    }

    /// Create a document of `count` empty A4 pages.
    pub fn with_blank_pages(count: usize) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::with_capacity(count);
        for _ in 0..count {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(Object::Reference(page_id));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        };
        doc.objects.insert(pages_id, pages.into());

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self { doc }
    }

    /// Page object identities in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page identity to 0-based index, for resolving destinations.
    pub fn page_table(&self) -> PageTable<ObjectId> {
        PageTable::new(self.page_ids())
    }

    /// Read the native bookmark tree. A document without `/Outlines` has an
    /// empty tree.
    pub fn bookmarks(&self) -> Result<Vec<BookmarkTree<ObjectId>>, PdfError> {
        let catalog = self.catalog()?;
        let outlines = match catalog.get(b"Outlines").ok().and_then(|o| self.resolve(o)) {
            Some(Object::Dictionary(dict)) => dict,
            _ => return Ok(Vec::new()),
        };
        let first = match outlines.get(b"First") {
            Ok(Object::Reference(id)) => *id,
            _ => return Ok(Vec::new()),
        };
        let mut visited = HashSet::new();
        Ok(self.read_siblings(first, 0, &mut visited))
    }

    /// Export the document's bookmarks as an outline tree.
    pub fn export_outline(&self) -> Result<OutlineNode, PdfError> {
        let bookmarks = self.bookmarks()?;
        let root = export(&bookmarks, &self.page_table());
        info!("Exported {} bookmarks", root.len());
        Ok(root)
    }

    /// Replace the document's bookmarks with `root`. Nothing is changed if
    /// synchronization fails.
    pub fn import_outline(
        &mut self,
        root: &OutlineNode,
        options: &SyncOptions,
    ) -> Result<SyncReport, PdfError> {
        let mut writer = PdfBookmarkWriter::new(&mut self.doc);
        let report = synchronize(root, &mut writer, options)?;
        writer.finish()?;
        let pruned = self.doc.prune_objects();
        debug!("Pruned {} unreferenced objects", pruned.len());
        Ok(report)
    }

    /// Remove every bookmark. Returns `false` if there were none.
    pub fn erase_outline(&mut self) -> Result<bool, PdfError> {
        let catalog = self.catalog_mut()?;
        let had_outline = catalog.remove(b"Outlines").is_some();
        if let Ok(Object::Name(mode)) = catalog.get(b"PageMode") {
            if mode.as_slice() == b"UseOutlines" {
                catalog.remove(b"PageMode");
            }
        }
        if had_outline {
            let pruned = self.doc.prune_objects();
            debug!("Pruned {} outline objects", pruned.len());
        }
        Ok(had_outline)
    }

    /// Serialize the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, PdfError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PdfError::Save(e.to_string()))?;
        Ok(buffer)
    }

    /// Serialize fully in memory, then write `path` in one step.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), PdfError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        debug!("Saved {}", path.display());
        Ok(())
    }

    fn catalog(&self) -> Result<&Dictionary, PdfError> {
        let id = catalog_id(&self.doc)?;
        Ok(self.doc.get_object(id).and_then(Object::as_dict)?)
    }

    fn catalog_mut(&mut self) -> Result<&mut Dictionary, PdfError> {
        let id = catalog_id(&self.doc)?;
        Ok(self.doc.get_object_mut(id)?.as_dict_mut()?)
    }

    /// Follow one level of indirection.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Read a `/First` ... `/Next` chain and the subtrees below it.
    fn read_siblings(
        &self,
        first: ObjectId,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<BookmarkTree<ObjectId>> {
        let mut items = Vec::new();
        if depth >= MAX_DEPTH {
            warn!("Outline nested deeper than {} levels; truncating", MAX_DEPTH);
            return items;
        }

        let mut current = Some(first);
        while let Some(id) = current {
            if !visited.insert(id) {
                warn!("Outline item {:?} visited twice; stopping", id);
                break;
            }
            let dict = match self.doc.get_object(id).and_then(Object::as_dict) {
                Ok(dict) => dict,
                Err(e) => {
                    warn!("Outline item {:?} is not readable: {}", id, e);
                    break;
                }
            };

            let title = dict
                .get(b"Title")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| match o {
                    Object::String(bytes, _) => Some(decode_text_string(bytes)),
                    _ => None,
                })
                .unwrap_or_default();
            let destination = self.bookmark_destination(dict);
            items.push(BookmarkTree::Item { title, destination });

            if let Ok(Object::Reference(child)) = dict.get(b"First") {
                let children = self.read_siblings(*child, depth + 1, visited);
                if !children.is_empty() {
                    items.push(BookmarkTree::List(children));
                }
            }

            current = match dict.get(b"Next") {
                Ok(Object::Reference(next)) => Some(*next),
                _ => None,
            };
        }
        items
    }

    /// Page targeted by an outline item's `/Dest` or GoTo `/A` action.
    fn bookmark_destination(&self, item: &Dictionary) -> Option<ObjectId> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.destination_page(dest, 0);
        }
        let action = match self.resolve(item.get(b"A").ok()?)? {
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        match action.get(b"S") {
            Ok(Object::Name(kind)) if kind.as_slice() == b"GoTo" => {}
            _ => return None,
        }
        self.destination_page(action.get(b"D").ok()?, 0)
    }

    /// Resolve an explicit or named destination to its page object.
    fn destination_page(&self, dest: &Object, depth: usize) -> Option<ObjectId> {
        if depth > MAX_DEPTH {
            return None;
        }
        match self.resolve(dest)? {
            Object::Array(parts) => match parts.first()? {
                Object::Reference(page) => Some(*page),
                _ => None,
            },
            Object::Dictionary(dict) => self.destination_page(dict.get(b"D").ok()?, depth + 1),
            Object::Name(name) => self.destination_page(self.named_destination(name)?, depth + 1),
            Object::String(name, _) => {
                self.destination_page(self.named_destination(name)?, depth + 1)
            }
            _ => None,
        }
    }

    /// Look a name up in the catalog's `/Dests` dictionary or in the
    /// `/Names` `/Dests` name tree.
    fn named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.catalog().ok()?;

        let legacy = catalog
            .get(b"Dests")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|dests| dests.get(name).ok());
        if legacy.is_some() {
            return legacy;
        }

        let names = match self.resolve(catalog.get(b"Names").ok()?)? {
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        self.name_tree_lookup(names.get(b"Dests").ok()?, name, 0)
    }

    fn name_tree_lookup<'a>(
        &'a self,
        node: &'a Object,
        name: &[u8],
        depth: usize,
    ) -> Option<&'a Object> {
        if depth > MAX_DEPTH {
            return None;
        }
        let dict = match self.resolve(node)? {
            Object::Dictionary(dict) => dict,
            _ => return None,
        };

        if let Some(Object::Array(pairs)) = dict.get(b"Names").ok().and_then(|o| self.resolve(o)) {
            for pair in pairs.chunks(2) {
                if let [Object::String(key, _), value] = pair {
                    if key.as_slice() == name {
                        return Some(value);
                    }
                }
            }
        }

        if let Some(Object::Array(kids)) = dict.get(b"Kids").ok().and_then(|o| self.resolve(o)) {
            for kid in kids {
                if let Some(found) = self.name_tree_lookup(kid, name, depth + 1) {
                    return Some(found);
                }
            }
        }
        None
    }
}

fn catalog_id(doc: &Document) -> Result<ObjectId, PdfError> {
    doc.trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::Malformed("trailer has no /Root reference".to_string()))
}

/// A bookmark waiting to be written.
struct PendingBookmark {
    title: String,
    page: ObjectId,
    children: Vec<usize>,
}

/// [`BookmarkSink`] that collects bookmarks and writes a fresh `/Outlines`
/// tree into the document on [`finish`](PdfBookmarkWriter::finish).
pub struct PdfBookmarkWriter<'a> {
    doc: &'a mut Document,
    pages: Vec<ObjectId>,
    entries: Vec<PendingBookmark>,
    roots: Vec<usize>,
}

impl<'a> PdfBookmarkWriter<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            entries: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Write the collected bookmarks, replacing any existing outline.
    /// Returns the new `/Outlines` object, or `None` when nothing was added.
    pub fn finish(self) -> Result<Option<ObjectId>, PdfError> {
        let PdfBookmarkWriter {
            doc,
            entries,
            roots,
            ..
        } = self;

        let root_id = catalog_id(doc)?;
        if roots.is_empty() {
            doc.get_object_mut(root_id)?
                .as_dict_mut()?
                .remove(b"Outlines");
            return Ok(None);
        }

        let ids: Vec<ObjectId> = entries.iter().map(|_| doc.new_object_id()).collect();
        let outlines_id = doc.new_object_id();

        let mut stack: Vec<(&[usize], ObjectId)> = vec![(roots.as_slice(), outlines_id)];
        while let Some((siblings, parent_id)) = stack.pop() {
            for (i, &index) in siblings.iter().enumerate() {
                let entry = &entries[index];
                let mut dict = dictionary! {
                    "Title" => encode_text_string(&entry.title),
                    "Parent" => parent_id,
                    "Dest" => vec![Object::Reference(entry.page), "Fit".into()],
                };
                if i > 0 {
                    dict.set("Prev", ids[siblings[i - 1]]);
                }
                if i + 1 < siblings.len() {
                    dict.set("Next", ids[siblings[i + 1]]);
                }
                if let (Some(&first), Some(&last)) = (entry.children.first(), entry.children.last()) {
                    dict.set("First", ids[first]);
                    dict.set("Last", ids[last]);
                    dict.set("Count", -(entry.children.len() as i64));
                    stack.push((entry.children.as_slice(), ids[index]));
                }
                doc.objects.insert(ids[index], dict.into());
            }
        }

        let outlines = dictionary! {
            "Type" => "Outlines",
            "First" => ids[roots[0]],
            "Last" => ids[roots[roots.len() - 1]],
            "Count" => roots.len() as i64,
        };
        doc.objects.insert(outlines_id, outlines.into());

        let catalog = doc.get_object_mut(root_id)?.as_dict_mut()?;
        catalog.set("Outlines", outlines_id);
        catalog.set("PageMode", "UseOutlines");
        Ok(Some(outlines_id))
    }
}

impl BookmarkSink for PdfBookmarkWriter<'_> {
    type Handle = usize;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn add_bookmark(
        &mut self,
        title: &str,
        page: usize,
        parent: Option<usize>,
    ) -> Result<usize, SyncError> {
        let page = *self
            .pages
            .get(page)
            .ok_or_else(|| SyncError::Sink(format!("no page at index {}", page)))?;
        let index = self.entries.len();
        self.entries.push(PendingBookmark {
            title: title.to_string(),
            page,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.entries.get_mut(p)) {
            Some(parent) => parent.children.push(index),
            None => self.roots.push(index),
        }
        Ok(index)
    }
}

/// Encode a PDF text string: printable ASCII as a literal, everything else
/// as UTF-16BE with a byte order mark.
pub fn encode_text_string(text: &str) -> Object {
    if text.bytes().all(|b| (0x20..0x7f).contains(&b)) {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string: UTF-16BE with BOM, else UTF-8, else Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
