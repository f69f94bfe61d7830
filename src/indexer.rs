//! Store coordination: building and updating the two index files.
//!
//! A note store is a directory tree of `.md` files. The term archive
//! (`index.tsar`) and the catalog (`index.json`) are always written as
//! a pair so that term lookups, tag lookups and filename lookups agree
//! on document ids. Reindexing rebuilds both from scratch with ids
//! assigned by position in sorted filename order; note filenames carry
//! a timestamp, so ids are creation order in practice and renames
//! invalidate them (a rename needs a reindex).

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::query::{self, eval, QueryError};
use crate::text::{extract_tags, tokenize_text};
use crate::tsar::{EntryList, Index};

/// Term archive filename within a store directory.
pub const INDEX_FILE: &str = "index.tsar";

/// Catalog filename within a store directory.
pub const CATALOG_FILE: &str = "index.json";

/// Rebuild both index files from every note under `notes_dir`.
///
/// Returns the number of notes indexed.
pub fn reindex(notes_dir: &Path, store_dir: &Path) -> io::Result<usize> {
    let notes = collect_notes(notes_dir)?;

    let mut list = EntryList::new();
    let mut catalog = Catalog::new();
    for (id, path) in notes.iter().enumerate() {
        let id = id as u32;
        let text = fs::read_to_string(path)?;
        let body = note_body(&text);

        catalog.insert(id, &note_name(path));
        catalog.set_tags(id, &extract_tags(body));
        for term in unique_terms(body) {
            list.append(&term, id)?;
        }
    }

    let index = list.to_index();
    info!(
        notes = notes.len(),
        terms = index.entries().len(),
        "reindexed note store"
    );
    persist(store_dir, &index, &catalog)
        .map(|()| notes.len())
}

/// Fold a single edited or created note into the existing index files.
///
/// Loads both files, resolves the note's id (assigning a fresh one for
/// a new note), replaces its tags, appends its body terms, reseals and
/// persists. Returns the note's id.
pub fn update_note(note_path: &Path, store_dir: &Path) -> io::Result<u32> {
    let mut catalog = load_catalog(store_dir)?;
    let mut list = match fs::read(store_dir.join(INDEX_FILE)) {
        Ok(data) => EntryList::from_index(&Index::unmarshal(&data)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => EntryList::new(),
        Err(e) => return Err(e),
    };

    let text = fs::read_to_string(note_path)?;
    let body = note_body(&text);

    let name = note_name(note_path);
    let id = catalog.assign_id(&name);
    catalog.set_tags(id, &extract_tags(body));

    let mut appended = 0usize;
    for term in unique_terms(body) {
        // terms already pointing at this note stay as they are
        if list.get(&term).is_some_and(|ptrs| ptrs.contains(&id)) {
            continue;
        }
        list.append(&term, id)?;
        appended += 1;
    }
    debug!(id, note = %name, appended, "updated note in index");

    persist(store_dir, &list.to_index(), &catalog).map(|()| id)
}

/// Open the store's term archive lazily over its file handle.
pub fn open_index(store_dir: &Path) -> io::Result<Index<File>> {
    let file = File::open(store_dir.join(INDEX_FILE))?;
    Index::unmarshal_lazy_reader(file)
}

pub fn load_catalog(store_dir: &Path) -> io::Result<Catalog> {
    Catalog::load(&store_dir.join(CATALOG_FILE))
}

/// Evaluate a query against the store, returning matching note ids.
pub fn search(store_dir: &Path, q: &str) -> Result<Vec<u32>, QueryError> {
    let tree = query::parse(q)?;
    let mut index = open_index(store_dir)?;
    Ok(eval(tree.as_ref(), &mut index)?)
}

fn persist(store_dir: &Path, index: &Index, catalog: &Catalog) -> io::Result<()> {
    fs::create_dir_all(store_dir)?;
    fs::write(store_dir.join(INDEX_FILE), index.to_bytes())?;
    catalog.save(&store_dir.join(CATALOG_FILE))
}

/// Every `.md` file under `dir`, recursively, sorted by filename.
fn collect_notes(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut notes = Vec::new();
    walk(dir, &mut notes)?;
    notes.sort_by(|a, b| note_name(a).cmp(&note_name(b)));
    Ok(notes)
}

fn walk(dir: &Path, notes: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, notes)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            notes.push(path);
        }
    }
    Ok(())
}

/// The catalog name of a note: its base filename. Note filenames embed
/// their creation timestamp, so base names are unique across the
/// year/month subdirectories.
fn note_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The indexable body of a note: everything after the YAML front-matter
/// fence pair, or the whole text when there is none.
fn note_body(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("---") else {
        return text;
    };
    match rest.split_once("---") {
        Some((_, body)) => body.trim(),
        None => text,
    }
}

/// Body terms, deduplicated: the archive codec permits duplicate
/// pointers but one occurrence per note is all a boolean query needs.
fn unique_terms(body: &str) -> BTreeSet<String> {
    tokenize_text(body).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_body_strips_front_matter() {
        let text = "---\ntitle: standup\ntags: [work]\n---\nalice was late\n";
        assert_eq!(note_body(text), "alice was late");
    }

    #[test]
    fn note_body_without_front_matter() {
        assert_eq!(note_body("plain note"), "plain note");
        assert_eq!(note_body("--- dangling fence"), "--- dangling fence");
    }

    #[test]
    fn unique_terms_deduplicates() {
        let terms = unique_terms("tea and tea and more tea");
        assert_eq!(
            terms.into_iter().collect::<Vec<_>>(),
            vec!["and", "more", "tea"]
        );
    }
}
