//! Resolution and emission of declared outputs.

use std::fs;
use std::path::Path;

use super::registry::{MatchState, Registry};
use super::{Outcome, OutputEntry};
use crate::error::{BridgeError, Result};

/// Write every declared output under `out_root`.
///
/// Matched outputs get a verbatim copy of their source from `scratch`,
/// unmatched ones get `placeholder`, and ambiguous ones are left unwritten.
/// The pass does not stop at ambiguous outputs; a filesystem error aborts it
/// and leaves already written files in place.
pub fn emit(
    registry: &Registry,
    scratch: &Path,
    out_root: &Path,
    placeholder: &[u8],
) -> Result<Vec<OutputEntry>> {
    let mut entries = Vec::new();

    for record in registry.expected() {
        let Some(state) = record.state() else {
            continue;
        };
        let destination = out_root.join(&record.path);

        let outcome = match state {
            MatchState::Unmatched => {
                write_output(&destination, placeholder)?;
                tracing::debug!(path = %record.path, "wrote placeholder");
                Outcome::Placeholder
            }
            MatchState::Exact { source } | MatchState::Fallback { source } => {
                let from = scratch.join(source);
                let data =
                    fs::read(&from).map_err(|e| BridgeError::io("read generated file", &from, e))?;
                write_output(&destination, &data)?;
                tracing::debug!(path = %record.path, %source, "copied generated file");
                if matches!(state, MatchState::Exact { .. }) {
                    Outcome::Exact {
                        source: source.clone(),
                    }
                } else {
                    Outcome::Fallback {
                        source: source.clone(),
                    }
                }
            }
            MatchState::Ambiguous { candidates } => {
                tracing::debug!(path = %record.path, ?candidates, "ambiguous output");
                Outcome::Ambiguous {
                    candidates: candidates.clone(),
                }
            }
        };

        entries.push(OutputEntry {
            path: record.path.clone(),
            outcome,
        });
    }

    Ok(entries)
}

fn write_output(destination: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BridgeError::io("create directory", parent, e))?;
    }
    fs::write(destination, data).map_err(|e| BridgeError::io("write output", destination, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_state_maps_to_one_outcome() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::create_dir_all(scratch.path().join("gen")).unwrap();
        fs::write(scratch.path().join("gen/fallback.pb.go"), "package fallback").unwrap();
        fs::create_dir_all(scratch.path().join("out")).unwrap();
        fs::write(scratch.path().join("out/exact.pb.go"), "package exact").unwrap();

        let mut registry = Registry::from_expected([
            "out/exact.pb.go",
            "out/fallback.pb.go",
            "out/missing.pb.go",
            "out/twice.pb.go",
        ]);
        registry.discover("out/exact.pb.go");
        registry.discover("gen/fallback.pb.go");
        registry.discover("p/twice.pb.go");
        registry.discover("q/twice.pb.go");

        let entries = emit(&registry, scratch.path(), out.path(), b"stub").unwrap();
        let outcomes: Vec<_> = entries.iter().map(|e| (e.path.as_str(), &e.outcome)).collect();
        assert_eq!(
            outcomes,
            vec![
                (
                    "out/exact.pb.go",
                    &Outcome::Exact {
                        source: "out/exact.pb.go".to_string()
                    }
                ),
                (
                    "out/fallback.pb.go",
                    &Outcome::Fallback {
                        source: "gen/fallback.pb.go".to_string()
                    }
                ),
                ("out/missing.pb.go", &Outcome::Placeholder),
                (
                    "out/twice.pb.go",
                    &Outcome::Ambiguous {
                        candidates: vec!["p/twice.pb.go".to_string(), "q/twice.pb.go".to_string()]
                    }
                ),
            ]
        );

        let read = |p: &str| fs::read_to_string(out.path().join(p)).unwrap();
        assert_eq!(read("out/exact.pb.go"), "package exact");
        assert_eq!(read("out/fallback.pb.go"), "package fallback");
        assert_eq!(read("out/missing.pb.go"), "stub");
        assert!(!out.path().join("out/twice.pb.go").exists());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let scratch = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let mut registry = Registry::from_expected(["out/svc.pb.go"]);
        registry.discover("gen/svc.pb.go");

        let err = emit(&registry, scratch.path(), out.path(), b"stub").unwrap_err();
        assert!(matches!(err, BridgeError::Io { action: "read generated file", .. }));
    }
}
