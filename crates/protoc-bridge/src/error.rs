//! Error types for the protoc bridge.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can abort a bridge run.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The external compiler could not be started.
    #[error("error running '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The external compiler exited unsuccessfully.
    #[error("error running '{command}': {status}{}", format_stderr(.stderr))]
    CompilerFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// A filesystem operation failed.
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking the scratch tree failed.
    #[error("failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A descriptor set path cannot be joined into a path list.
    #[error("invalid descriptor set path: {0}")]
    DescriptorSet(#[from] std::env::JoinPathsError),

    /// The reconciliation report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),

    /// One or more expected outputs matched more than one generated file.
    #[error("{0}")]
    Ambiguous(AmbiguityReport),
}

impl BridgeError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        BridgeError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

/// An expected output whose basename matched several generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousOutput {
    /// The declared output path.
    pub path: String,
    /// Scratch-relative paths of the competing generated files.
    pub candidates: Vec<String>,
}

/// Every ambiguous output of a run, plus the importpath used for the hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguityReport {
    pub outputs: Vec<AmbiguousOutput>,
    pub importpath: String,
}

impl fmt::Display for AmbiguityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for output in &self.outputs {
            writeln!(
                f,
                "Ambiguous output {} (matched {}).",
                output.path,
                output.candidates.join(", ")
            )?;
        }
        write!(f, "Check that the go_package option is {:?}.", self.importpath)
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguity_report_lists_every_path() {
        let report = AmbiguityReport {
            outputs: vec![
                AmbiguousOutput {
                    path: "out/a.pb.go".to_string(),
                    candidates: vec!["x/a.pb.go".to_string(), "y/a.pb.go".to_string()],
                },
                AmbiguousOutput {
                    path: "out/b.pb.go".to_string(),
                    candidates: vec!["x/b.pb.go".to_string(), "z/b.pb.go".to_string()],
                },
            ],
            importpath: "example.com/out".to_string(),
        };

        let message = BridgeError::Ambiguous(report).to_string();
        assert_eq!(
            message,
            "Ambiguous output out/a.pb.go (matched x/a.pb.go, y/a.pb.go).\n\
             Ambiguous output out/b.pb.go (matched x/b.pb.go, z/b.pb.go).\n\
             Check that the go_package option is \"example.com/out\"."
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_compiler_failure_includes_stderr() {
        use std::process::Command;

        let status = Command::new("sh")
            .args(["-c", "exit 2"])
            .status()
            .expect("sh should run");
        let err = BridgeError::CompilerFailed {
            command: "protoc foo.proto".to_string(),
            status,
            stderr: "foo.proto: File not found.\n".to_string(),
        };

        let message = err.to_string();
        assert!(message.starts_with("error running 'protoc foo.proto': "));
        assert!(message.ends_with("\nfoo.proto: File not found."));
    }
}
