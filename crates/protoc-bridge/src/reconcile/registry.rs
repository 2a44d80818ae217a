//! File registry for output reconciliation.
//!
//! Every relative path the reconciler sees, declared or discovered, has exactly
//! one [`FileRecord`]. Declared outputs are additionally indexed by basename so
//! that generated files landing in an unexpected directory can still be matched.

use std::collections::{BTreeMap, HashMap};

/// How a declared output has been matched against the generated tree so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchState {
    /// Nothing generated for this path yet.
    Unmatched,
    /// A generated file exists at exactly this path.
    Exact { source: String },
    /// A single generated file elsewhere shares this path's unique basename.
    Fallback { source: String },
    /// Several generated files share this path's unique basename.
    Ambiguous { candidates: Vec<String> },
}

impl MatchState {
    /// The scratch-relative file that will supply this output's bytes.
    pub fn source(&self) -> Option<&str> {
        match self {
            MatchState::Exact { source } | MatchState::Fallback { source } => Some(source),
            MatchState::Unmatched | MatchState::Ambiguous { .. } => None,
        }
    }
}

/// Whether a record was declared by the caller or only found in the scratch tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Expected {
        /// No other declared path has the same basename. Fixed at construction.
        basename_unique: bool,
        state: MatchState,
    },
    Discovered,
}

/// One relative path known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub basename: String,
    pub kind: RecordKind,
}

impl FileRecord {
    fn expected(path: String) -> Self {
        let basename = basename_of(&path).to_string();
        Self {
            path,
            basename,
            kind: RecordKind::Expected {
                basename_unique: true,
                state: MatchState::Unmatched,
            },
        }
    }

    fn discovered(path: String) -> Self {
        let basename = basename_of(&path).to_string();
        Self {
            path,
            basename,
            kind: RecordKind::Discovered,
        }
    }

    pub fn is_expected(&self) -> bool {
        matches!(self.kind, RecordKind::Expected { .. })
    }

    /// Match state for declared outputs, `None` for discovered-only files.
    pub fn state(&self) -> Option<&MatchState> {
        match &self.kind {
            RecordKind::Expected { state, .. } => Some(state),
            RecordKind::Discovered => None,
        }
    }
}

/// What happened when a generated file was offered to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// Bound to the declared output at the same path.
    Exact,
    /// Bound to the declared output sharing its basename.
    Fallback { target: String },
    /// Made the declared output sharing its basename ambiguous.
    Ambiguous { target: String },
    /// The declared output sharing its basename already has an exact match.
    Shadowed { target: String },
    /// Matches nothing declared.
    Unexpected,
}

/// Registry of declared and generated files, keyed by relative path.
#[derive(Debug, Default)]
pub struct Registry {
    records: BTreeMap<String, FileRecord>,
    /// Declared paths grouped by basename.
    by_basename: HashMap<String, Vec<String>>,
}

impl Registry {
    /// Build a registry from the declared output paths.
    ///
    /// Repeated paths collapse into one record. A basename shared by two or
    /// more distinct declared paths is marked non-unique on all of them.
    pub fn from_expected<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Registry::default();
        for path in paths {
            let path = path.into();
            if registry.records.contains_key(&path) {
                continue;
            }
            let record = FileRecord::expected(path.clone());
            registry
                .by_basename
                .entry(record.basename.clone())
                .or_default()
                .push(path.clone());
            registry.records.insert(path, record);
        }

        for paths in registry.by_basename.values() {
            if paths.len() < 2 {
                continue;
            }
            for path in paths {
                if let Some(RecordKind::Expected {
                    basename_unique, ..
                }) = registry.records.get_mut(path).map(|r| &mut r.kind)
                {
                    *basename_unique = false;
                }
            }
        }

        registry
    }

    /// Offer a generated file, given by its scratch-relative path.
    ///
    /// An exact path match always wins: it replaces an earlier basename
    /// binding, and later basename candidates for that output are ignored.
    pub fn discover(&mut self, path: &str) -> Discovery {
        if let Some(record) = self.records.get_mut(path) {
            if let RecordKind::Expected { state, .. } = &mut record.kind {
                *state = MatchState::Exact {
                    source: path.to_string(),
                };
                return Discovery::Exact;
            }
        }

        let record = self
            .records
            .entry(path.to_string())
            .or_insert_with(|| FileRecord::discovered(path.to_string()));
        let basename = record.basename.clone();

        let target = match self.by_basename.get(&basename).map(Vec::as_slice) {
            Some([target]) => target.clone(),
            _ => return Discovery::Unexpected,
        };

        let Some(RecordKind::Expected {
            basename_unique: true,
            state,
        }) = self.records.get_mut(&target).map(|r| &mut r.kind)
        else {
            return Discovery::Unexpected;
        };

        match state {
            MatchState::Unmatched => {
                *state = MatchState::Fallback {
                    source: path.to_string(),
                };
                Discovery::Fallback { target }
            }
            MatchState::Fallback { source } => {
                let candidates = vec![std::mem::take(source), path.to_string()];
                *state = MatchState::Ambiguous { candidates };
                Discovery::Ambiguous { target }
            }
            MatchState::Ambiguous { candidates } => {
                candidates.push(path.to_string());
                Discovery::Ambiguous { target }
            }
            MatchState::Exact { .. } => Discovery::Shadowed { target },
        }
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// All records in path order.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    /// Declared records in path order.
    pub fn expected(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values().filter(|r| r.is_expected())
    }
}

/// Final component of a `/`-separated relative path.
fn basename_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
