//! Output reconciliation
//!
//! Lines up the files a code generator actually wrote with the set of output
//! paths the build declared ahead of time:
//! - a generated file at a declared path is copied there as is
//! - otherwise a generated file whose basename is unique among the declared
//!   paths is copied to the declared path with that basename
//! - declared paths with nothing generated get a placeholder
//! - declared paths with several basename candidates are reported together

pub mod discover;
pub mod emit;
pub mod registry;

use std::path::Path;

use serde::Serialize;

use crate::error::{AmbiguityReport, AmbiguousOutput, BridgeError, Result};
pub use registry::{Discovery, FileRecord, MatchState, RecordKind, Registry};

/// Inputs of a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileRequest<'a> {
    /// Declared output paths, relative to `out_root`.
    pub expected: &'a [String],
    /// Directory the generator wrote into.
    pub scratch: &'a Path,
    /// Directory the declared outputs live under.
    pub out_root: &'a Path,
    /// Suffix of generated source files; anything else in `scratch` is ignored.
    pub suffix: &'a str,
    /// Contents written for declared outputs nothing was generated for.
    pub placeholder: &'a [u8],
}

/// How a declared output was satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Exact { source: String },
    Fallback { source: String },
    Placeholder,
    Ambiguous { candidates: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEntry {
    pub path: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Per-output result of a reconciliation run, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub outputs: Vec<OutputEntry>,
}

impl ReconcileReport {
    /// Declared outputs that could not be resolved to a single file.
    pub fn ambiguous(&self) -> Vec<AmbiguousOutput> {
        self.outputs
            .iter()
            .filter_map(|entry| match &entry.outcome {
                Outcome::Ambiguous { candidates } => Some(AmbiguousOutput {
                    path: entry.path.clone(),
                    candidates: candidates.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Fail with every ambiguous output listed, if there are any.
    ///
    /// `importpath` only feeds the hint at the end of the message.
    pub fn check(&self, importpath: &str) -> Result<()> {
        let outputs = self.ambiguous();
        if outputs.is_empty() {
            return Ok(());
        }
        Err(BridgeError::Ambiguous(AmbiguityReport {
            outputs,
            importpath: importpath.to_string(),
        }))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Walk the scratch tree once and emit every declared output.
///
/// Only filesystem failures are returned as errors. Ambiguous outputs are
/// recorded in the report; use [`ReconcileReport::check`] to turn them into
/// a failure.
pub fn reconcile(request: &ReconcileRequest<'_>) -> Result<ReconcileReport> {
    let mut registry = Registry::from_expected(request.expected.iter().cloned());

    create_out_root(request.out_root)?;
    discover::discover(&mut registry, request.scratch, request.out_root, request.suffix)?;
    let outputs = emit::emit(&registry, request.scratch, request.out_root, request.placeholder)?;

    Ok(ReconcileReport { outputs })
}

fn create_out_root(out_root: &Path) -> Result<()> {
    std::fs::create_dir_all(out_root)
        .map_err(|e| BridgeError::io("create output directory", out_root, e))
}
