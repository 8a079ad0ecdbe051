use crate::{image::ImageKey, source::SourceKind};
use std::{
    collections::{btree_map, BTreeMap},
    fmt,
    iter::FromIterator,
};

/// Image references from one source, keyed by that source's image keys
///
/// Built once by a parser and not modified afterwards. Iteration is ordered
/// by key so reports come out the same way on every run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SourceMapping {
    entries: BTreeMap<ImageKey, String>,
}

impl SourceMapping {
    pub fn new() -> Self {
        SourceMapping::default()
    }

    pub(crate) fn insert(&mut self, key: ImageKey, image: String) -> Option<String> {
        self.entries.insert(key, image)
    }

    /// Insert unless the key already has a different reference
    ///
    /// The first reference seen for a key is kept. Repeating the same
    /// reference is not a conflict.
    pub(crate) fn insert_first(&mut self, key: ImageKey, image: String) -> Result<(), KeyConflict> {
        match self.entries.entry(key) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(image);
                Ok(())
            }
            btree_map::Entry::Occupied(entry) if *entry.get() == image => Ok(()),
            btree_map::Entry::Occupied(entry) => Err(KeyConflict {
                key: entry.key().clone(),
                kept: entry.get().clone(),
                dropped: image,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ImageKey> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ImageKey, String> {
        self.entries.iter()
    }

    /// Only the entries whose key starts with `prefix`
    pub fn with_key_prefix(&self, prefix: &str) -> SourceMapping {
        self.iter()
            .filter(|(key, _)| key.as_str().starts_with(prefix))
            .map(|(key, image)| (key.clone(), image.clone()))
            .collect()
    }

    /// Write every entry to the log, one per line
    pub fn log(&self, title: &str) {
        log::info!("{} ({}):", title, self.len());
        for (key, image) in self.iter() {
            log::debug!("  {}: {}", key, image);
        }
    }
}

impl<'a> IntoIterator for &'a SourceMapping {
    type Item = (&'a ImageKey, &'a String);
    type IntoIter = btree_map::Iter<'a, ImageKey, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<ImageKey>, V: Into<String>> FromIterator<(K, V)> for SourceMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SourceMapping {
            entries: iter
                .into_iter()
                .map(|(key, image)| (key.into(), image.into()))
                .collect(),
        }
    }
}

/// A key one source gave two different references
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyConflict {
    pub key: ImageKey,
    pub kept: String,
    pub dropped: String,
}

impl fmt::Display for KeyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kept, {} ignored", self.kept, self.dropped)
    }
}

/// The two buckets every source is split into
///
/// `primary` holds the product's own images, the ones that must agree with
/// the snapshot. `other` holds everything the source declares that is not a
/// product image: third party helper images, or non-image entries like the
/// Ansible collection URL.
///
/// A key given twice with different references keeps its first reference;
/// the rest land in `conflicts` so a check can report them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitMapping {
    pub primary: SourceMapping,
    pub other: SourceMapping,
    pub conflicts: Vec<KeyConflict>,
}

impl SplitMapping {
    pub(crate) fn add_primary(&mut self, source_kind: SourceKind, key: ImageKey, image: String) {
        add(&mut self.primary, &mut self.conflicts, source_kind, key, image);
    }

    pub(crate) fn add_other(&mut self, source_kind: SourceKind, key: ImageKey, image: String) {
        add(&mut self.other, &mut self.conflicts, source_kind, key, image);
    }
}

fn add(
    bucket: &mut SourceMapping,
    conflicts: &mut Vec<KeyConflict>,
    source_kind: SourceKind,
    key: ImageKey,
    image: String,
) {
    if let Err(conflict) = bucket.insert_first(key, image) {
        log::warn!(
            "{} defines {} more than once, keeping {} and ignoring {}",
            source_kind,
            conflict.key,
            conflict.kept,
            conflict.dropped
        );
        conflicts.push(conflict);
    }
}
