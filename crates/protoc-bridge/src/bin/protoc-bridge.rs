//! protoc bridge CLI

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use protoc_bridge::{expand_params_files, Bridge, BridgeOptions, Outcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "protoc-bridge")]
#[command(about = "Runs protoc with a Go plugin and reconciles its output with the declared files")]
#[command(version)]
struct Args {
    /// The path to the real protoc
    #[arg(long, value_name = "FILE")]
    protoc: PathBuf,

    /// The base output path to write to
    #[arg(long = "out_path", value_name = "DIR", default_value = ".")]
    out_path: PathBuf,

    /// The code generator plugin to use
    #[arg(long, value_name = "FILE")]
    plugin: PathBuf,

    /// The importpath for the generated sources
    #[arg(long)]
    importpath: Option<String>,

    /// A plugin option (repeatable)
    #[arg(long = "option", value_name = "OPTION")]
    options: Vec<String>,

    /// A descriptor set to read (repeatable)
    #[arg(long = "descriptor_set", value_name = "FILE")]
    descriptor_sets: Vec<PathBuf>,

    /// An include directory (repeatable)
    #[arg(long = "include", value_name = "DIR")]
    includes: Vec<String>,

    /// An expected output file, relative to the output path (repeatable)
    #[arg(long = "expected", value_name = "FILE")]
    expected: Vec<String>,

    /// Map a proto file to an import path, as PROTO=IMPORTPATH (repeatable)
    #[arg(long = "import", value_name = "MAPPING")]
    imports: Vec<String>,

    /// An argument passed to protoc before the normal options (repeatable)
    #[arg(long = "prefix-arg", value_name = "ARG", allow_hyphen_values = true)]
    prefix_args: Vec<String>,

    /// Suffix of generated source files
    #[arg(long, default_value = ".go")]
    suffix: String,

    /// Write a JSON reconciliation report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Arguments passed to protoc, usually the proto files
    #[arg(value_name = "PROTOC_ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    protoc_args: Vec<String>,
}

fn main() {
    let argv = match command_line(std::env::args_os()) {
        Ok(argv) => argv,
        Err(e) => {
            eprintln!("protoc-bridge: {:#}", e);
            process::exit(1);
        }
    };
    let args = Args::parse_from(argv);

    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("protoc-bridge: {:#}", e);
        process::exit(1);
    }
}

/// Process arguments with params files expanded. Non-UTF-8 arguments are
/// converted lossily.
fn command_line<I>(args: I) -> anyhow::Result<Vec<String>>
where
    I: IntoIterator<Item = OsString>,
{
    let args = args
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned());
    expand_params_files(args).context("failed to expand arguments")
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut options = BridgeOptions::new(args.protoc, args.plugin)
        .out_path(args.out_path)
        .importpath(args.importpath.unwrap_or_default())
        .suffix(args.suffix)
        .expected(args.expected)
        .options(args.options)
        .imports(args.imports)
        .descriptor_sets(args.descriptor_sets)
        .includes(args.includes)
        .prefix_args(args.prefix_args)
        .args(args.protoc_args);
    if let Some(report) = args.report {
        options = options.report(report);
    }

    let report = Bridge::new(options).run()?;

    let placeholders = report
        .outputs
        .iter()
        .filter(|entry| entry.outcome == Outcome::Placeholder)
        .count();
    tracing::info!(
        outputs = report.outputs.len(),
        placeholders,
        "generation complete"
    );

    Ok(())
}
