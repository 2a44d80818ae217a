//! Bridge driver
//!
//! Ties one run together: protoc writes into a private scratch directory,
//! the reconciler lines its output up with the declared files, and the
//! scratch directory is removed whichever way the run ends.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, Result};
use crate::invoke::ProtocInvocation;
use crate::placeholder;
use crate::reconcile::{self, ReconcileReport, ReconcileRequest};

const SCRATCH_PREFIX: &str = "go_proto";

/// Options for a single bridge run.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    pub invocation: ProtocInvocation,
    /// Root the declared outputs are relative to.
    pub out_path: PathBuf,
    /// Declared outputs, relative to `out_path`.
    pub expected: Vec<String>,
    /// Import path of the generated package, used in ambiguity hints.
    pub importpath: String,
    /// Suffix of generated sources.
    pub suffix: String,
    /// Where to write the JSON reconciliation report, if anywhere.
    pub report: Option<PathBuf>,
}

impl BridgeOptions {
    pub fn new(protoc: impl Into<PathBuf>, plugin: impl Into<PathBuf>) -> Self {
        Self {
            invocation: ProtocInvocation {
                protoc: protoc.into(),
                plugin: plugin.into(),
                ..Default::default()
            },
            out_path: PathBuf::from("."),
            expected: Vec::new(),
            importpath: String::new(),
            suffix: ".go".to_string(),
            report: None,
        }
    }

    pub fn out_path(mut self, out_path: impl Into<PathBuf>) -> Self {
        self.out_path = out_path.into();
        self
    }

    pub fn importpath(mut self, importpath: impl Into<String>) -> Self {
        self.importpath = importpath.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn report(mut self, report: impl Into<PathBuf>) -> Self {
        self.report = Some(report.into());
        self
    }

    pub fn expected<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invocation
            .options
            .extend(options.into_iter().map(Into::into));
        self
    }

    pub fn imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invocation
            .imports
            .extend(imports.into_iter().map(Into::into));
        self
    }

    pub fn descriptor_sets<I, P>(mut self, sets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.invocation
            .descriptor_sets
            .extend(sets.into_iter().map(Into::into));
        self
    }

    pub fn includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invocation
            .includes
            .extend(includes.into_iter().map(Into::into));
        self
    }

    pub fn prefix_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invocation
            .prefix_args
            .extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments passed through to protoc after everything else.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invocation
            .args
            .extend(args.into_iter().map(Into::into));
        self
    }
}

/// Runs protoc and reconciles its output.
pub struct Bridge {
    options: BridgeOptions,
}

impl Bridge {
    pub fn new(options: BridgeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Run protoc into a fresh scratch directory and reconcile the result.
    pub fn run(&self) -> Result<ReconcileReport> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(|e| BridgeError::io("create scratch directory", std::env::temp_dir(), e))?;

        self.options.invocation.run(scratch.path())?;
        self.reconcile_from(scratch.path())
    }

    /// Reconcile an already generated tree in `scratch` against the declared outputs.
    pub fn reconcile_from(&self, scratch: &Path) -> Result<ReconcileReport> {
        let report = reconcile::reconcile(&ReconcileRequest {
            expected: &self.options.expected,
            scratch,
            out_root: &self.options.out_path,
            suffix: &self.options.suffix,
            placeholder: placeholder::get_placeholder_bytes(),
        })?;

        tracing::info!(
            outputs = report.outputs.len(),
            out_path = %self.options.out_path.display(),
            "reconciled generated files"
        );

        if let Some(path) = &self.options.report {
            fs::write(path, report.to_json()?)
                .map_err(|e| BridgeError::io("write report", path, e))?;
        }

        report.check(&self.options.importpath)?;
        Ok(report)
    }
}
