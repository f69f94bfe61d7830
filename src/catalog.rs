//! The document/tag catalog: a JSON mapping kept in lockstep with the
//! term archive so lookups by word, by tag, and by filename prefix all
//! land in the same pointer space.
//!
//! Serialized as an object with `id_to_name`, `tags_to_id` and
//! `id_to_tags` keys; integer map keys become JSON strings. Ids are
//! unique, filenames are unique, and the two tag maps mirror each
//! other: `id ∈ tags_to_id[tag]` exactly when `tag ∈ id_to_tags[id]`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Bidirectional id/filename/tag bookkeeping for a note store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub id_to_name: BTreeMap<u32, String>,
    pub tags_to_id: BTreeMap<String, Vec<u32>>,
    pub id_to_tags: BTreeMap<u32, Vec<String>>,

    /// Inverted view of `id_to_name`, rebuilt on load.
    #[serde(skip)]
    name_to_id: BTreeMap<String, u32>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a catalog from `path`. A missing file is an empty catalog;
    /// a present but unreadable one is an error.
    pub fn load(path: &Path) -> io::Result<Self> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e),
        };
        let mut catalog: Catalog = serde_json::from_slice(&data).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("when parsing catalog {}: {e}", path.display()),
            )
        })?;
        catalog.rebuild_names();
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let data = serde_json::to_vec_pretty(self).map_err(io::Error::other)?;
        fs::write(path, data)
    }

    fn rebuild_names(&mut self) {
        self.name_to_id = self
            .id_to_name
            .iter()
            .map(|(&id, name)| (name.clone(), id))
            .collect();
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.name_to_id.get(name).copied()
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.id_to_name.get(&id).map(String::as_str)
    }

    /// The id for `name`, assigning `max(existing) + 1` when the name
    /// is new.
    pub fn assign_id(&mut self, name: &str) -> u32 {
        if let Some(id) = self.id_of(name) {
            return id;
        }
        let id = self.id_to_name.keys().next_back().map_or(0, |max| max + 1);
        self.insert(id, name);
        id
    }

    /// Bind `id` to `name` directly (reindex path, where ids are
    /// positions in sorted filename order).
    pub fn insert(&mut self, id: u32, name: &str) {
        self.id_to_name.insert(id, name.to_owned());
        self.name_to_id.insert(name.to_owned(), id);
    }

    /// Replace the tag set of `id`: the id is stripped from every tag
    /// it was listed under, then filed under each new tag,
    /// deduplicated.
    pub fn set_tags(&mut self, id: u32, tags: &[String]) {
        if let Some(old) = self.id_to_tags.remove(&id) {
            for tag in old {
                if let Some(ids) = self.tags_to_id.get_mut(&tag) {
                    ids.retain(|&other| other != id);
                    if ids.is_empty() {
                        self.tags_to_id.remove(&tag);
                    }
                }
            }
        }

        let mut deduped: Vec<String> = Vec::new();
        for tag in tags {
            if !deduped.contains(tag) {
                deduped.push(tag.clone());
            }
        }

        for tag in &deduped {
            let ids = self.tags_to_id.entry(tag.clone()).or_default();
            if !ids.contains(&id) {
                ids.push(id);
                ids.sort_unstable();
            }
        }
        if !deduped.is_empty() {
            self.id_to_tags.insert(id, deduped);
        }
    }

    pub fn ids_for_tag(&self, tag: &str) -> &[u32] {
        self.tags_to_id.get(tag).map_or(&[], Vec::as_slice)
    }

    /// All `(id, name)` pairs whose name starts with `prefix`, in name
    /// order.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<(u32, &str)> {
        self.name_to_id
            .range(prefix.to_owned()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, &id)| (id, name.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn assign_id_is_max_plus_one() {
        let mut c = Catalog::new();
        assert_eq!(c.assign_id("a.md"), 0);
        assert_eq!(c.assign_id("b.md"), 1);
        assert_eq!(c.assign_id("a.md"), 0);

        // gaps don't get refilled
        c.insert(9, "z.md");
        assert_eq!(c.assign_id("new.md"), 10);
    }

    #[test]
    fn set_tags_keeps_both_maps_in_sync() {
        let mut c = Catalog::new();
        c.insert(0, "a.md");
        c.insert(1, "b.md");

        c.set_tags(0, &tags(&["work", "todo"]));
        c.set_tags(1, &tags(&["work"]));
        assert_eq!(c.ids_for_tag("work"), &[0, 1]);
        assert_eq!(c.ids_for_tag("todo"), &[0]);

        // retagging strips the old memberships
        c.set_tags(0, &tags(&["home"]));
        assert_eq!(c.ids_for_tag("work"), &[1]);
        assert!(c.ids_for_tag("todo").is_empty());
        assert_eq!(c.id_to_tags.get(&0), Some(&tags(&["home"])));
    }

    #[test]
    fn set_tags_deduplicates() {
        let mut c = Catalog::new();
        c.insert(0, "a.md");
        c.set_tags(0, &tags(&["work", "work", "todo"]));
        assert_eq!(c.id_to_tags.get(&0), Some(&tags(&["work", "todo"])));
        assert_eq!(c.ids_for_tag("work"), &[0]);
    }

    #[test]
    fn json_round_trip() {
        let mut c = Catalog::new();
        c.insert(0, "2026-01-02.md");
        c.insert(1, "2026-01-03.md");
        c.set_tags(0, &tags(&["work"]));

        let json = serde_json::to_vec(&c).unwrap();
        let mut back: Catalog = serde_json::from_slice(&json).unwrap();
        back.rebuild_names();

        assert_eq!(back.id_to_name, c.id_to_name);
        assert_eq!(back.tags_to_id, c.tags_to_id);
        assert_eq!(back.id_to_tags, c.id_to_tags);
        assert_eq!(back.id_of("2026-01-03.md"), Some(1));
    }

    #[test]
    fn json_uses_string_keys() {
        let mut c = Catalog::new();
        c.insert(3, "x.md");
        let json = String::from_utf8(serde_json::to_vec(&c).unwrap()).unwrap();
        assert!(json.contains(r#""3":"x.md""#), "{json}");
    }

    #[test]
    fn names_with_prefix() {
        let mut c = Catalog::new();
        c.insert(0, "2026-01-02.md");
        c.insert(1, "2026-01-15.md");
        c.insert(2, "2026-02-01.md");

        let hits = c.names_with_prefix("2026-01");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], (0, "2026-01-02.md"));
        assert_eq!(hits[1], (1, "2026-01-15.md"));
        assert!(c.names_with_prefix("2027").is_empty());
    }

    #[test]
    fn load_missing_file_is_empty() {
        let c = Catalog::load(Path::new("/no/such/catalog.json")).unwrap();
        assert!(c.is_empty());
    }
}
