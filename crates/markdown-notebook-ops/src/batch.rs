use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use markdown_notebook::{rewrite_str, RewriteRules, RewrittenBlock};
use markdown_notebook_config::Pattern;

use crate::converter::{ConversionRequest, Converter};
use crate::error::{OperationError, OperationResult};

/// Inputs of one batch run.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub root: PathBuf,
    pub pattern: Pattern,
    pub output_dir: PathBuf,
    pub output_extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDocument {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Rewrite and plan only; leave artifacts and the converter alone.
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub removed_stale: bool,
    pub blocks: Vec<RewrittenBlock>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub dry_run: bool,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Destination of `source`: its stem plus `extension`, inside `output_dir`.
pub fn output_path(source: &Path, output_dir: &Path, extension: &str) -> PathBuf {
    let mut name = source
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".");
    name.push(extension);
    output_dir.join(name)
}

/// Immediate files of `root` whose names match `pattern`, sorted by name.
pub fn discover_sources(root: &Path, pattern: &Pattern) -> OperationResult<Vec<PathBuf>> {
    let discover_err = |source| OperationError::Discover {
        path: root.to_path_buf(),
        source,
    };

    let mut sources = Vec::new();
    for entry in fs::read_dir(root).map_err(discover_err)? {
        let entry = entry.map_err(discover_err)?;
        let path = entry.path();
        if !pattern.is_match(entry.file_name()) || !path.is_file() {
            continue;
        }
        sources.push(path);
    }

    sources.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(sources)
}

pub fn plan_documents(plan: &BatchPlan) -> OperationResult<Vec<PlannedDocument>> {
    let documents = discover_sources(&plan.root, &plan.pattern)?
        .into_iter()
        .map(|source| {
            let output = output_path(&source, &plan.output_dir, &plan.output_extension);
            PlannedDocument { source, output }
        })
        .collect();
    Ok(documents)
}

/// Read a chapter as UTF-8 text.
pub fn read_source(path: &Path) -> OperationResult<String> {
    let bytes = fs::read(path).map_err(|err| OperationError::io(path, err))?;
    String::from_utf8(bytes).map_err(|source| OperationError::Encoding {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether `output` names the existing file `source`, after resolving links
/// and `.`/`..` segments. An output whose directory does not exist yet never
/// matches.
fn same_file(source: &Path, output: &Path) -> bool {
    let (Some(dir), Some(name)) = (output.parent(), output.file_name()) else {
        return false;
    };
    match (fs::canonicalize(source), fs::canonicalize(dir)) {
        (Ok(source), Ok(dir)) => dir.join(name) == source,
        _ => false,
    }
}

/// Delete a previous artifact. Returns whether anything was removed.
pub fn remove_stale(path: &Path) -> OperationResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(OperationError::io(path, err)),
    }
}

/// Convert every planned document in order, stopping at the first failure.
pub fn run_batch(
    plan: &BatchPlan,
    rules: &RewriteRules,
    template: &ConversionRequest,
    converter: &dyn Converter,
    options: BuildOptions,
) -> OperationResult<BatchReport> {
    let documents = plan_documents(plan)?;
    let mut report = BatchReport {
        documents: Vec::with_capacity(documents.len()),
        dry_run: options.dry_run,
    };

    if documents.is_empty() {
        log::info!(
            "no documents matching '{}' in {}",
            plan.pattern.original(),
            plan.root.display()
        );
        return Ok(report);
    }

    if let Some(doc) = documents
        .iter()
        .find(|doc| same_file(&doc.source, &doc.output))
    {
        return Err(OperationError::OutputIsSource {
            output: doc.output.clone(),
        });
    }

    if !options.dry_run {
        fs::create_dir_all(&plan.output_dir)
            .map_err(|source| OperationError::io(&plan.output_dir, source))?;
    }

    for PlannedDocument { source, output } in documents {
        let removed_stale = if options.dry_run {
            false
        } else {
            remove_stale(&output)?
        };

        let text = read_source(&source)?;
        let rewritten = rewrite_str(&text, rules);

        if options.dry_run {
            log::info!("would convert {} -> {}", source.display(), output.display());
        } else {
            log::info!(
                "converting {} -> {} with {}",
                source.display(),
                output.display(),
                converter.name()
            );
            converter.convert(&template.for_output(&output), &rewritten.text)?;
        }

        report.documents.push(DocumentReport {
            source,
            output,
            removed_stale,
            blocks: rewritten.blocks,
        });
    }

    Ok(report)
}
