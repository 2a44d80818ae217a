//! protoc invocation
//!
//! Builds the command line that runs protoc with a single code generator
//! plugin writing into a scratch directory, and runs it to completion.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{BridgeError, Result};

/// A fully described protoc run.
#[derive(Debug, Clone, Default)]
pub struct ProtocInvocation {
    /// The protoc executable.
    pub protoc: PathBuf,
    /// The `protoc-gen-*` plugin executable.
    pub plugin: PathBuf,
    /// Plugin options, joined with `,` into the `--*_out` flag.
    pub options: Vec<String>,
    /// `proto=importpath` mappings, passed to the plugin as `M` options.
    pub imports: Vec<String>,
    /// Descriptor sets read instead of parsing imported protos.
    pub descriptor_sets: Vec<PathBuf>,
    /// Include directories, each passed as `-I`.
    pub includes: Vec<String>,
    /// Arguments placed before everything else.
    pub prefix_args: Vec<String>,
    /// Remaining arguments, usually the proto files to compile.
    pub args: Vec<String>,
}

impl ProtocInvocation {
    /// Name of the plugin as protoc knows it: `protoc-gen-go` becomes `go`.
    pub fn plugin_name(&self) -> String {
        let base = file_name(&self.plugin);
        let base = base.strip_prefix("protoc-gen-").unwrap_or(&base);
        base.strip_suffix(".exe").unwrap_or(base).to_string()
    }

    /// Full protoc argument list for writing into `out_dir`.
    pub fn args(&self, out_dir: &Path) -> Result<Vec<OsString>> {
        let mut options = self.options.clone();
        options.extend(self.imports.iter().map(|m| format!("M{}", m)));

        let plugin_base = file_name(&self.plugin);
        let plugin_base = plugin_base.strip_suffix(".exe").unwrap_or(&plugin_base);

        let mut args: Vec<OsString> = self.prefix_args.iter().map(OsString::from).collect();

        let mut out_flag = OsString::from(format!(
            "--{}_out={}:",
            self.plugin_name(),
            options.join(",")
        ));
        out_flag.push(out_dir);
        args.push(out_flag);

        args.push("--plugin".into());
        let mut plugin_flag = OsString::from(format!("{}=", plugin_base));
        plugin_flag.push(&self.plugin);
        args.push(plugin_flag);

        if !self.descriptor_sets.is_empty() {
            args.push("--descriptor_set_in".into());
            args.push(env::join_paths(&self.descriptor_sets)?);
        }

        args.extend(self.includes.iter().map(|i| OsString::from(format!("-I{}", i))));
        args.extend(self.args.iter().map(OsString::from));

        Ok(args)
    }

    /// Run protoc into `out_dir` and wait for it to exit.
    ///
    /// Output is captured; on failure stderr is attached to the error, on
    /// success it is relayed to this process' own streams.
    pub fn run(&self, out_dir: &Path) -> Result<()> {
        let args = self.args(out_dir)?;
        let command_line = render_command(&self.protoc, &args);
        tracing::info!(command = %command_line, "running protoc");

        let output = Command::new(&self.protoc)
            .args(&args)
            .output()
            .map_err(|source| BridgeError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BridgeError::CompilerFailed {
                command: command_line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let _ = io::stdout().write_all(&output.stdout);
        let _ = io::stderr().write_all(&output.stderr);
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn render_command(program: &Path, args: &[OsString]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}
