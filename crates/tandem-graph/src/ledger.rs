use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A package dependency together with the files that reference it.
///
/// A record only exists because some file referenced the package, so it is
/// always created with its first referencing file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyRecord {
    pub name: String,
    pub version: String,
    referenced_from: Vec<PathBuf>,
}

impl DependencyRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            referenced_from: vec![file.into()],
        }
    }

    /// Files that reference this dependency, in first-seen order.
    pub fn referenced_from(&self) -> &[PathBuf] {
        &self.referenced_from
    }

    pub fn push_importer(&mut self, file: impl Into<PathBuf>) {
        let file = file.into();
        if !self.referenced_from.contains(&file) {
            self.referenced_from.push(file);
        }
    }

    pub fn extend_importers<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for file in iter {
            self.push_importer(file);
        }
    }
}

/// Insertion-ordered collection of dependency records keyed by package name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyLedger {
    records: IndexMap<String, DependencyRecord>,
}

impl DependencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `file` references package `name`.
    ///
    /// The first version recorded for a name is kept.
    pub fn record(&mut self, name: &str, version: &str, file: &Path) {
        match self.records.get_mut(name) {
            Some(existing) => existing.push_importer(file),
            None => {
                self.records
                    .insert(name.to_string(), DependencyRecord::new(name, version, file));
            }
        }
    }

    /// Union another ledger into this one.
    pub fn merge(&mut self, other: &DependencyLedger) {
        for record in other.records.values() {
            match self.records.get_mut(&record.name) {
                Some(existing) => existing.extend_importers(record.referenced_from.iter().cloned()),
                None => {
                    self.records.insert(record.name.clone(), record.clone());
                }
            }
        }
    }

    /// Copy of this ledger keeping only references from files accepted by `keep`.
    /// Records left without a referencing file are dropped.
    pub fn retain_importers<F>(&self, mut keep: F) -> DependencyLedger
    where
        F: FnMut(&Path) -> bool,
    {
        let mut filtered = DependencyLedger::new();
        for record in self.records.values() {
            for file in &record.referenced_from {
                if keep(file) {
                    filtered.record(&record.name, &record.version, file);
                }
            }
        }
        filtered
    }

    pub fn get(&self, name: &str) -> Option<&DependencyRecord> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn records(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.records.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
