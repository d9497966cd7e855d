// View state for the document lists. This is everything the list screens
// need to know (what is loaded, which filter is active, what to draw)
// kept apart from the terminal code so it can be tested directly.

use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use crate::model::{Document, DocumentKind};

/// Label of the "show everything" category button.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => document.category() == name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Named(name) => name,
        }
    }
}

/// Which document families a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayType {
    #[default]
    All,
    Worksheet,
    Testsheet,
    Wrongsheet,
}

impl DisplayType {
    pub const ALL: [DisplayType; 4] = [
        DisplayType::All,
        DisplayType::Worksheet,
        DisplayType::Testsheet,
        DisplayType::Wrongsheet,
    ];

    pub fn matches(self, kind: DocumentKind) -> bool {
        match self {
            DisplayType::All => true,
            DisplayType::Worksheet => kind == DocumentKind::Worksheet,
            DisplayType::Testsheet => kind == DocumentKind::Testsheet,
            DisplayType::Wrongsheet => kind == DocumentKind::Wrongsheet,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayType::All => ALL_CATEGORIES,
            DisplayType::Worksheet => DocumentKind::Worksheet.file_type(),
            DisplayType::Testsheet => DocumentKind::Testsheet.file_type(),
            DisplayType::Wrongsheet => DocumentKind::Wrongsheet.file_type(),
        }
    }
}

impl From<DocumentKind> for DisplayType {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Worksheet => DisplayType::Worksheet,
            DocumentKind::Testsheet => DisplayType::Testsheet,
            DocumentKind::Wrongsheet => DisplayType::Wrongsheet,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("{0} {1} is not in the list")]
    NotFound(DocumentKind, i64),

    #[error("the new name is empty")]
    EmptyName,
}

fn newest_first(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.created_date().cmp(&a.created_date()));
}

/// The main document list: newest first, filtered by category and kind.
#[derive(Debug, Default)]
pub struct DocumentList {
    documents: Vec<Document>,
    categories: BTreeSet<String>,
    category: CategoryFilter,
    display: DisplayType,
    saved: Option<(CategoryFilter, DisplayType)>,
    /// Names changed this session, reapplied whenever documents are reloaded.
    renamed: HashMap<(DocumentKind, i64), String>,
}

impl DocumentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents. A category that no longer exists falls back
    /// to showing everything.
    pub fn set_documents(&mut self, mut documents: Vec<Document>, category: CategoryFilter, display: DisplayType) {
        for document in &mut documents {
            self.apply_rename(document);
        }
        newest_first(&mut documents);
        self.documents = documents;
        self.display = display;
        self.refresh_categories();
        self.category = category;
        self.drop_stale_category();
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The filtered view, in display order.
    pub fn visible(&self) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| self.display.matches(d.kind()) && self.category.matches(d))
            .collect()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn display(&self) -> DisplayType {
        self.display
    }

    /// Switch to the named category. Unknown names leave the filter alone;
    /// use [`reset_filter`](Self::reset_filter) to show everything.
    pub fn select_category(&mut self, name: &str) -> bool {
        if !self.categories.contains(name) {
            return false;
        }
        self.category = CategoryFilter::Named(name.to_string());
        true
    }

    pub fn set_display(&mut self, display: DisplayType) {
        self.display = display;
    }

    pub fn reset_filter(&mut self) {
        self.category = CategoryFilter::All;
    }

    pub fn get(&self, kind: DocumentKind, id: i64) -> Option<&Document> {
        self.documents.iter().find(|d| d.key() == (kind, id))
    }

    fn position(&self, kind: DocumentKind, id: i64) -> Result<usize, ListError> {
        self.documents
            .iter()
            .position(|d| d.key() == (kind, id))
            .ok_or(ListError::NotFound(kind, id))
    }

    /// Flip the bookmark locally and return the new state.
    pub fn toggle_bookmark(&mut self, kind: DocumentKind, id: i64) -> Result<bool, ListError> {
        let index = self.position(kind, id)?;
        let document = &mut self.documents[index];
        let bookmarked = !document.is_bookmarked();
        document.set_bookmarked(bookmarked);
        Ok(bookmarked)
    }

    /// Replace a document with the server's copy of it.
    pub fn apply_update(&mut self, mut updated: Document) -> Result<(), ListError> {
        let index = self.position(updated.kind(), updated.id())?;
        self.apply_rename(&mut updated);
        self.documents[index] = updated;
        newest_first(&mut self.documents);
        self.refresh_categories();
        self.drop_stale_category();
        Ok(())
    }

    pub fn remove(&mut self, kind: DocumentKind, id: i64) -> Result<Document, ListError> {
        let index = self.position(kind, id)?;
        let removed = self.documents.remove(index);
        self.refresh_categories();
        self.drop_stale_category();
        Ok(removed)
    }

    /// Remove several documents at once. Keys not in the list are skipped.
    pub fn remove_all(&mut self, keys: &[(DocumentKind, i64)]) -> Vec<Document> {
        let (removed, kept): (Vec<Document>, Vec<Document>) = std::mem::take(&mut self.documents)
            .into_iter()
            .partition(|d| keys.contains(&d.key()));
        self.documents = kept;
        self.refresh_categories();
        self.drop_stale_category();
        removed
    }

    pub fn rename(&mut self, kind: DocumentKind, id: i64, name: &str) -> Result<(), ListError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ListError::EmptyName);
        }
        let index = self.position(kind, id)?;
        self.documents[index].rename(name);
        self.renamed.insert((kind, id), name.to_string());
        Ok(())
    }

    /// Remember the current filter, e.g. before opening a document.
    pub fn save_state(&mut self) {
        self.saved = Some((self.category.clone(), self.display));
    }

    /// Go back to the filter saved by [`save_state`](Self::save_state).
    pub fn restore_state(&mut self) -> bool {
        let Some((category, display)) = self.saved.clone() else {
            return false;
        };
        self.display = display;
        match category {
            CategoryFilter::All => self.reset_filter(),
            CategoryFilter::Named(name) => {
                if !self.select_category(&name) {
                    self.reset_filter();
                }
            }
        }
        true
    }

    fn apply_rename(&self, document: &mut Document) {
        if let Some(name) = self.renamed.get(&document.key()) {
            document.rename(name);
        }
    }

    fn refresh_categories(&mut self) {
        self.categories = self.documents.iter().map(|d| d.category().to_string()).collect();
    }

    fn drop_stale_category(&mut self) {
        if let CategoryFilter::Named(name) = &self.category {
            if !self.categories.contains(name) {
                self.category = CategoryFilter::All;
            }
        }
    }
}

/// Bookmarked documents only, newest first, optionally narrowed to one
/// family.
#[derive(Debug, Default)]
pub struct BookmarkList {
    documents: Vec<Document>,
    display: DisplayType,
}

impl BookmarkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents.into_iter().filter(Document::is_bookmarked).collect();
        newest_first(&mut self.documents);
    }

    pub fn set_display(&mut self, display: DisplayType) {
        self.display = display;
    }

    pub fn display(&self) -> DisplayType {
        self.display
    }

    pub fn visible(&self) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| self.display.matches(d.kind()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Reflect a bookmark change: bookmarked documents are added or
    /// replaced, un-bookmarked ones drop out.
    pub fn apply_update(&mut self, updated: Document) {
        self.documents.retain(|d| d.key() != updated.key());
        if updated.is_bookmarked() {
            self.documents.push(updated);
            newest_first(&mut self.documents);
        }
    }

    pub fn remove(&mut self, kind: DocumentKind, id: i64) {
        self.documents.retain(|d| d.key() != (kind, id));
    }

    pub fn rename(&mut self, kind: DocumentKind, id: i64, name: &str) {
        if let Some(document) = self.documents.iter_mut().find(|d| d.key() == (kind, id)) {
            document.rename(name);
        }
    }
}
