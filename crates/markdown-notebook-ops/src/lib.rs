//! High-level operations shared by markdown-notebook commands.

pub mod batch;
pub mod converter;
pub mod diff;
pub mod error;

pub use batch::{
    discover_sources, output_path, plan_documents, read_source, remove_stale, run_batch,
    BatchPlan, BatchReport, BuildOptions, DocumentReport, PlannedDocument,
};
pub use converter::{command_args, CommandConverter, ConversionRequest, Converter};
pub use diff::build_unified_diff;
pub use error::{ExitCode, OperationError, OperationResult};

use std::path::{Path, PathBuf};

use markdown_notebook::{rewrite_str, RewriteOutcome, RewriteRules};
use markdown_notebook_config::Config;

/// Rewritten view of one chapter, for previews.
#[derive(Debug, Clone)]
pub struct Preview {
    pub original: String,
    pub outcome: RewriteOutcome,
}

impl Preview {
    pub fn diff(&self, label: &str) -> Option<String> {
        build_unified_diff(&self.original, &self.outcome.text, label)
    }
}

/// Operation bundle wired from resolved configuration.
pub struct Operations {
    config: Config,
    rules: RewriteRules,
}

impl Operations {
    pub fn new(config: Config) -> Self {
        let rules = rules_from_config(&config);
        Self { config, rules }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rules(&self) -> &RewriteRules {
        &self.rules
    }

    pub fn plan(&self) -> BatchPlan {
        BatchPlan {
            root: self.config.sources.root.clone(),
            pattern: self.config.sources.pattern.clone(),
            output_dir: self.config.output.dir.clone(),
            output_extension: self.config.output.extension.clone(),
        }
    }

    /// Conversion arguments shared by every document; the output path is
    /// filled in per document.
    pub fn request_template(&self) -> ConversionRequest {
        let converter = &self.config.converter;
        ConversionRequest {
            input_format: converter.input_format.clone(),
            output_format: converter.output_format.clone(),
            kernel: converter.kernel.clone(),
            output: PathBuf::new(),
        }
    }

    /// The converter named by configuration.
    pub fn command_converter(&self) -> CommandConverter {
        CommandConverter::new(&self.config.converter.program)
    }

    pub fn list(&self) -> OperationResult<Vec<PlannedDocument>> {
        plan_documents(&self.plan())
    }

    pub fn build(
        &self,
        converter: &dyn Converter,
        options: BuildOptions,
    ) -> OperationResult<BatchReport> {
        let plan = self.plan();
        log::debug!(
            "building {} -> {}",
            plan.root.display(),
            plan.output_dir.display()
        );
        run_batch(
            &plan,
            &self.rules,
            &self.request_template(),
            converter,
            options,
        )
    }

    pub fn preview_path(&self, path: &Path) -> OperationResult<Preview> {
        let original = read_source(path)?;
        Ok(self.preview_text(original))
    }

    pub fn preview_text(&self, original: String) -> Preview {
        let outcome = rewrite_str(&original, &self.rules);
        Preview { original, outcome }
    }
}

pub fn rules_from_config(config: &Config) -> RewriteRules {
    let rewrite = &config.rewrite;
    RewriteRules {
        script_tag: rewrite.script_tag.clone(),
        shell_tags: rewrite.shell_tags.clone(),
        shell_marker: rewrite.shell_marker.clone(),
        source_tags: rewrite.source_tags.clone(),
        comment_prefix: rewrite.comment_prefix.clone(),
        build_tags: rewrite.build_tags.clone(),
        build_file: rewrite.build_file.clone(),
        write_directive: rewrite.write_directive.clone(),
    }
}
