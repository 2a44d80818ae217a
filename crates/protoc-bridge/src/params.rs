//! Params file expansion
//!
//! Build tools pass long argument lists through params files. An argument of
//! the form `@path` is replaced by the lines of `path`, one argument per line.
//! `@@x` stands for the literal argument `@x`.

use std::fs;

use crate::error::{BridgeError, Result};

/// Expand every `@file` argument in `args`.
///
/// Expansion is a single level: lines read from a params file are taken
/// verbatim, even if they start with `@`.
pub fn expand_params_files<I, S>(args: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut expanded = Vec::new();
    for arg in args {
        let arg = arg.into();
        if let Some(literal) = arg.strip_prefix("@@") {
            expanded.push(format!("@{}", literal));
        } else if let Some(path) = arg.strip_prefix('@') {
            let contents = fs::read_to_string(path)
                .map_err(|e| BridgeError::io("read params file", path, e))?;
            expanded.extend(split_params(&contents));
        } else {
            expanded.push(arg);
        }
    }
    Ok(expanded)
}

fn split_params(contents: &str) -> impl Iterator<Item = String> + '_ {
    let contents = contents.strip_suffix('\n').unwrap_or(contents);
    contents
        .split('\n')
        .filter(move |_| !contents.is_empty())
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_args_pass_through() {
        let args = expand_params_files(["protoc-bridge", "--protoc", "protoc"]).unwrap();
        assert_eq!(args, vec!["protoc-bridge", "--protoc", "protoc"]);
    }

    #[test]
    fn test_params_file_is_spliced_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let params = dir.path().join("args.params");
        fs::write(&params, "--expected\nout/a.pb.go\r\n--importpath\nexample.com/a\n").unwrap();

        let args = expand_params_files([
            "protoc-bridge".to_string(),
            format!("@{}", params.display()),
            "a.proto".to_string(),
        ])
        .unwrap();

        assert_eq!(
            args,
            vec![
                "protoc-bridge",
                "--expected",
                "out/a.pb.go",
                "--importpath",
                "example.com/a",
                "a.proto",
            ]
        );
    }

    #[test]
    fn test_empty_params_file_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let params = dir.path().join("empty.params");
        fs::write(&params, "").unwrap();

        let args = expand_params_files([format!("@{}", params.display())]).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_double_at_is_literal() {
        let args = expand_params_files(["@@scoped"]).unwrap();
        assert_eq!(args, vec!["@scoped"]);
    }

    #[test]
    fn test_missing_params_file_is_an_error() {
        let err = expand_params_files(["@/nonexistent/args.params"]).unwrap_err();
        assert!(matches!(err, BridgeError::Io { .. }));
        assert!(err.to_string().contains("read params file"));
    }
}
