use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use markdown_notebook::RewrittenBlock;
use markdown_notebook_config::{Config, LoadOptions};
use markdown_notebook_ops::{
    BatchReport, BuildOptions, OperationError, Operations, PlannedDocument,
};
use serde_json::{json, Value};

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut options = LoadOptions::default();
    if let Some(path) = cli.config {
        options = options.with_override_path(path);
    }
    let mut config = Config::load(options).context("failed to load configuration")?;

    match cli.command.unwrap_or_default() {
        Command::Build(args) => {
            args.apply(&mut config);
            handle_build(Operations::new(config), args, cli.quiet)
        }
        Command::List(args) => handle_list(Operations::new(config), args),
        Command::Rewrite(args) => handle_rewrite(Operations::new(config), args),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn handle_build(ops: Operations, args: BuildArgs, quiet: bool) -> Result<i32> {
    let converter = ops.command_converter();
    let options = BuildOptions {
        dry_run: args.dry_run,
    };

    let report = match ops.build(&converter, options) {
        Ok(report) => report,
        Err(err) => return Ok(report_failure(&err)),
    };

    let base = &ops.config().provenance.working_directory;
    match args.format.unwrap_or_default() {
        FormatValue::Plain if quiet => {}
        FormatValue::Plain => emit(&render_build_plain(&report, base))?,
        FormatValue::Json => emit(&render_build_json(&report).to_string())?,
    }
    Ok(0)
}

fn handle_list(ops: Operations, args: ListArgs) -> Result<i32> {
    let planned = match ops.list() {
        Ok(planned) => planned,
        Err(err) => return Ok(report_failure(&err)),
    };

    let base = &ops.config().provenance.working_directory;
    let rendered = match args.format.unwrap_or_default() {
        FormatValue::Plain => planned
            .iter()
            .map(|PlannedDocument { source, output }| {
                format!("{} -> {}\n", relative(source, base), relative(output, base))
            })
            .collect(),
        FormatValue::Json => json!({
            "documents": planned
                .iter()
                .map(|doc| json!({
                    "source": doc.source.display().to_string(),
                    "output": doc.output.display().to_string(),
                }))
                .collect::<Vec<_>>(),
        })
        .to_string(),
    };

    emit(&rendered)?;
    Ok(0)
}

fn handle_rewrite(ops: Operations, args: RewriteArgs) -> Result<i32> {
    let preview = if args.path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        ops.preview_text(text)
    } else {
        match ops.preview_path(&args.path) {
            Ok(preview) => preview,
            Err(err) => return Ok(report_failure(&err)),
        }
    };

    if args.diff {
        let label = args.path.display().to_string();
        if let Some(diff) = preview.diff(&label) {
            emit(&diff)?;
        }
    } else {
        write_stdout(&preview.outcome.text, false)?;
    }
    Ok(0)
}

fn report_failure(err: &OperationError) -> i32 {
    eprintln!("markdown-notebook: {err}");
    err.exit_code().code()
}

fn render_build_plain(report: &BatchReport, base: &Path) -> String {
    let verb = if report.dry_run {
        "would convert"
    } else {
        "converted"
    };
    let mut out = String::new();
    for doc in &report.documents {
        out.push_str(&format!(
            "{verb} {} -> {} ({} block{} rewritten)\n",
            relative(&doc.source, base),
            relative(&doc.output, base),
            doc.blocks.len(),
            if doc.blocks.len() == 1 { "" } else { "s" },
        ));
    }
    out
}

fn render_build_json(report: &BatchReport) -> Value {
    json!({
        "dry_run": report.dry_run,
        "documents": report
            .documents
            .iter()
            .map(|doc| json!({
                "source": doc.source.display().to_string(),
                "output": doc.output.display().to_string(),
                "removed_stale": doc.removed_stale,
                "blocks": doc.blocks.iter().map(block_json).collect::<Vec<_>>(),
            }))
            .collect::<Vec<_>>(),
    })
}

fn block_json(block: &RewrittenBlock) -> Value {
    json!({
        "kind": block.kind.as_str(),
        "line": block.line,
        "target": block.target,
    })
}

fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}

fn emit(content: &str) -> Result<()> {
    write_stdout(content, true)
}

/// Write to stdout, treating a closed downstream pipe as success.
fn write_stdout(content: &str, terminate_line: bool) -> Result<()> {
    if content.is_empty() {
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match write_content(&mut handle, content, terminate_line) {
        Ok(()) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(err).context("Failed to write to stdout"),
    }
}

fn write_content(handle: &mut impl Write, content: &str, terminate_line: bool) -> io::Result<()> {
    handle.write_all(content.as_bytes())?;
    if terminate_line && !content.ends_with('\n') {
        handle.write_all(b"\n")?;
    }
    handle.flush()
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Convert numbered markdown chapters into notebooks",
    propagate_version = true
)]
struct Cli {
    /// Use this config file on top of discovered ones
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every matching chapter (default)
    Build(BuildArgs),
    /// Show which chapters map to which notebooks
    List(ListArgs),
    /// Print the rewritten form of a single chapter
    Rewrite(RewriteArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Build(BuildArgs::default())
    }
}

#[derive(Args, Default)]
struct BuildArgs {
    /// Directory holding the chapters
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Directory receiving the notebooks
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Kernel recorded in the notebooks
    #[arg(long)]
    kernel: Option<String>,
    /// Converter program to run instead of the configured one
    #[arg(long, value_name = "PROGRAM")]
    converter: Option<PathBuf>,
    /// Plan and rewrite without touching notebooks
    #[arg(long)]
    dry_run: bool,
    /// Report format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
}

impl BuildArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.sources.root = config.resolve_cli_path(root);
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = config.resolve_cli_path(dir);
        }
        if let Some(kernel) = &self.kernel {
            config.converter.kernel = kernel.clone();
        }
        if let Some(program) = &self.converter {
            config.converter.program = if program.components().count() > 1 {
                config.resolve_cli_path(program)
            } else {
                program.clone()
            };
        }
    }
}

#[derive(Args)]
struct ListArgs {
    /// Report format
    #[arg(long, value_enum)]
    format: Option<FormatValue>,
}

#[derive(Args)]
struct RewriteArgs {
    /// Chapter to rewrite, or `-` for standard input
    #[arg(value_name = "FILE")]
    path: PathBuf,
    /// Show a unified diff instead of the rewritten text
    #[arg(long)]
    diff: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum FormatValue {
    #[default]
    Plain,
    Json,
}
