//! Library catalog and selection ordering.
//!
//! The library browser hands over whatever the user ticked, in click order.
//! Drafts list entries in library order instead: each book, then its
//! chapters, each chapter followed by its subchapters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Entry, EntryType};

/// A book as shown in the library, with its chapter tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryBook {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<LibraryChapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryChapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subchapters: Vec<LibrarySubchapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySubchapter {
    pub id: String,
    pub title: String,
}

impl Entry {
    /// Entry covering a whole book.
    pub fn book(book: &LibraryBook) -> Self {
        Self {
            id: book.id.clone(),
            entry_type: EntryType::Book,
            name: book.title.clone(),
            book_id: book.id.clone(),
            chapter_id: None,
            subchapter_id: None,
        }
    }

    /// Entry covering one chapter of a book.
    pub fn chapter(book: &LibraryBook, chapter: &LibraryChapter) -> Self {
        Self {
            id: chapter.id.clone(),
            entry_type: EntryType::Chapter,
            name: chapter.title.clone(),
            book_id: book.id.clone(),
            chapter_id: Some(chapter.id.clone()),
            subchapter_id: None,
        }
    }

    /// Entry covering one subchapter.
    pub fn subchapter(
        book: &LibraryBook,
        chapter: &LibraryChapter,
        subchapter: &LibrarySubchapter,
    ) -> Self {
        Self {
            id: subchapter.id.clone(),
            entry_type: EntryType::Subchapter,
            name: subchapter.title.clone(),
            book_id: book.id.clone(),
            chapter_id: Some(chapter.id.clone()),
            subchapter_id: Some(subchapter.id.clone()),
        }
    }
}

/// Order a selection by its position in the library.
///
/// Selected entries found in `books` come first, in library order. Entries
/// the catalog does not know about follow in their original order.
/// Duplicates (same id) keep only their first occurrence.
pub fn order_selection(selection: &[Entry], books: &[LibraryBook]) -> Vec<Entry> {
    let find = |entry_type: EntryType, id: &str| {
        selection
            .iter()
            .find(|entry| entry.entry_type == entry_type && entry.id == id)
    };

    let mut ordered = Vec::with_capacity(selection.len());
    let mut seen: HashSet<&str> = HashSet::new();

    for book in books {
        let mut keys = vec![(EntryType::Book, book.id.as_str())];
        for chapter in &book.chapters {
            keys.push((EntryType::Chapter, chapter.id.as_str()));
            keys.extend(
                chapter
                    .subchapters
                    .iter()
                    .map(|sub| (EntryType::Subchapter, sub.id.as_str())),
            );
        }

        for (entry_type, id) in keys {
            if let Some(entry) = find(entry_type, id) {
                if seen.insert(entry.key()) {
                    ordered.push(entry.clone());
                }
            }
        }
    }

    for entry in selection {
        if seen.insert(entry.key()) {
            ordered.push(entry.clone());
        }
    }

    ordered
}
