//! Configuration primitives and loader for markdown-notebook.
//!
//! Settings resolve through the precedence stack
//! override flag → working directory → git root → built-in defaults.
//! Each layer is parsed from TOML into partial structures that remember where
//! every value came from, then merged and validated into typed settings.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".markdown-notebook.toml";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub sources: SourceSettings,
    pub output: OutputSettings,
    pub converter: ConverterSettings,
    pub rewrite: RewriteSettings,
    pub provenance: ConfigSources,
}

/// Where chapters are found and how they are named.
#[derive(Clone, Debug)]
pub struct SourceSettings {
    pub root: PathBuf,
    pub pattern: Pattern,
    pub extension: String,
}

/// Where notebooks are written.
#[derive(Clone, Debug)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub extension: String,
}

/// External conversion utility and the arguments handed to it.
#[derive(Clone, Debug)]
pub struct ConverterSettings {
    pub program: PathBuf,
    pub input_format: String,
    pub output_format: String,
    pub kernel: String,
}

/// Fence tags and replacement text used when rewriting chapters.
#[derive(Clone, Debug)]
pub struct RewriteSettings {
    pub script_tag: String,
    pub shell_tags: Vec<String>,
    pub shell_marker: String,
    pub source_tags: Vec<String>,
    pub comment_prefix: String,
    pub build_tags: Vec<String>,
    pub build_file: String,
    pub write_directive: String,
}

/// File-name glob plus its compiled matcher.
#[derive(Clone, Debug)]
pub struct Pattern {
    original: String,
    matcher: GlobMatcher,
}

impl Pattern {
    fn new(source: &ConfigSource, value: String) -> Result<Self, ConfigValidationError> {
        match Glob::new(&value) {
            Ok(glob) => Ok(Pattern {
                original: value,
                matcher: glob.compile_matcher(),
            }),
            Err(err) => Err(ConfigValidationError::new(
                Some(source.clone()),
                format!("invalid glob pattern '{value}': {err}"),
            )),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Match a bare file name (no directory components).
    pub fn is_match(&self, file_name: impl AsRef<Path>) -> bool {
        self.matcher.is_match(file_name)
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));
        if let Some(path) = override_path.as_ref().filter(|path| !path.exists()) {
            return Err(ConfigError::OverrideNotFound { path: path.clone() });
        }

        let defaults = ConfigSource::default(working_dir.clone());
        let mut merged = defaults_layer(&defaults);
        let mut layers = vec![defaults];
        for source in layer_files(&working_dir, override_path) {
            if let Some(path) = &source.path {
                log::debug!("reading {} at {}", source.kind, path.display());
                merged.merge(load_layer(path, &source)?);
            }
            layers.push(source);
        }

        let ResolvedConfig {
            sources,
            output,
            converter,
            rewrite,
        } = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            sources,
            output,
            converter,
            rewrite,
            provenance: ConfigSources {
                working_directory: working_dir,
                layers,
            },
        })
    }

    /// Resolve a path given on the command line against the working directory.
    pub fn resolve_cli_path(&self, path: &Path) -> PathBuf {
        make_absolute(path, &self.provenance.working_directory)
    }
}

/// Config files that exist, lowest precedence first. A file is read once
/// even when it is reachable as more than one layer; the highest kind wins.
fn layer_files(working_dir: &Path, override_path: Option<PathBuf>) -> Vec<ConfigSource> {
    let git_file = find_git_root(working_dir).map(|root| root.join(CONFIG_FILE_NAME));
    let local_file = Some(working_dir.join(CONFIG_FILE_NAME));
    let candidates = [
        (ConfigSourceKind::GitRoot, git_file),
        (ConfigSourceKind::Local, local_file),
        (ConfigSourceKind::Override, override_path),
    ];

    let mut layers: Vec<ConfigSource> = Vec::new();
    for (kind, path) in candidates {
        let Some(path) = path.filter(|path| path.exists()) else {
            continue;
        };
        layers.retain(|layer| layer.path.as_deref() != Some(path.as_path()));
        layers.push(ConfigSource::for_file(kind, path));
    }
    layers
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: &ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: &ConfigSource) -> PartialConfig {
    let at = |value: &str| Some(Located::new(value.to_string(), source.clone()));
    let tags = |value: &str| Some(Located::new(vec![value.to_string()], source.clone()));

    PartialConfig {
        sources: SourcesPartial {
            root: Some(Located::new(PathBuf::from(".."), source.clone())),
            pattern: at("[0-9][0-9]-*.md"),
            extension: at("md"),
        },
        output: OutputPartial {
            dir: Some(Located::new(PathBuf::from("."), source.clone())),
            extension: at("ipynb"),
        },
        converter: ConverterPartial {
            program: at("jupytext"),
            input_format: at("md"),
            output_format: at("ipynb"),
            kernel: at("python3"),
        },
        rewrite: RewritePartial {
            script_tag: at("python"),
            shell_tags: tags("bash"),
            shell_marker: at("!"),
            source_tags: tags("cpp"),
            comment_prefix: at("//"),
            build_tags: tags("cmake"),
            build_file: at("CMakeLists.txt"),
            write_directive: at("%%writefile"),
        },
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

fn overlay<T>(target: &mut Option<Located<T>>, other: Option<Located<T>>) {
    if other.is_some() {
        *target = other;
    }
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    sources: SourcesPartial,
    output: OutputPartial,
    converter: ConverterPartial,
    rewrite: RewritePartial,
}

#[derive(Clone, Debug, Default)]
struct SourcesPartial {
    root: Option<Located<PathBuf>>,
    pattern: Option<Located<String>>,
    extension: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct OutputPartial {
    dir: Option<Located<PathBuf>>,
    extension: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct ConverterPartial {
    program: Option<Located<String>>,
    input_format: Option<Located<String>>,
    output_format: Option<Located<String>>,
    kernel: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct RewritePartial {
    script_tag: Option<Located<String>>,
    shell_tags: Option<Located<Vec<String>>>,
    shell_marker: Option<Located<String>>,
    source_tags: Option<Located<Vec<String>>>,
    comment_prefix: Option<Located<String>>,
    build_tags: Option<Located<Vec<String>>>,
    build_file: Option<Located<String>>,
    write_directive: Option<Located<String>>,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        overlay(&mut self.sources.root, other.sources.root);
        overlay(&mut self.sources.pattern, other.sources.pattern);
        overlay(&mut self.sources.extension, other.sources.extension);

        overlay(&mut self.output.dir, other.output.dir);
        overlay(&mut self.output.extension, other.output.extension);

        overlay(&mut self.converter.program, other.converter.program);
        overlay(&mut self.converter.input_format, other.converter.input_format);
        overlay(&mut self.converter.output_format, other.converter.output_format);
        overlay(&mut self.converter.kernel, other.converter.kernel);

        let rewrite = other.rewrite;
        overlay(&mut self.rewrite.script_tag, rewrite.script_tag);
        overlay(&mut self.rewrite.shell_tags, rewrite.shell_tags);
        overlay(&mut self.rewrite.shell_marker, rewrite.shell_marker);
        overlay(&mut self.rewrite.source_tags, rewrite.source_tags);
        overlay(&mut self.rewrite.comment_prefix, rewrite.comment_prefix);
        overlay(&mut self.rewrite.build_tags, rewrite.build_tags);
        overlay(&mut self.rewrite.build_file, rewrite.build_file);
        overlay(&mut self.rewrite.write_directive, rewrite.write_directive);
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let mut required = Required {
            errors: &mut errors,
        };

        let root = required.path(self.sources.root, "sources.root");
        let source_extension = required.extension(self.sources.extension, "sources.extension");
        let pattern = required.text(self.sources.pattern, "sources.pattern");

        let output_dir_source = self.output.dir.as_ref().map(|located| located.source.clone());
        let output_dir = required.path(self.output.dir, "output.dir");
        let output_extension = required.extension(self.output.extension, "output.extension");

        let program = required.program(self.converter.program, "converter.program");
        let input_format = required.text(self.converter.input_format, "converter.input_format");
        let output_format = required.text(self.converter.output_format, "converter.output_format");
        let kernel = required.text(self.converter.kernel, "converter.kernel");

        let rewrite = self.rewrite;
        let script_tag = required.text(rewrite.script_tag, "rewrite.script_tag");
        let shell_marker = required.text(rewrite.shell_marker, "rewrite.shell_marker");
        let comment_prefix = required.text(rewrite.comment_prefix, "rewrite.comment_prefix");
        let build_file = required.text(rewrite.build_file, "rewrite.build_file");
        let write_directive = required.text(rewrite.write_directive, "rewrite.write_directive");
        let shell_tags = required.tags(rewrite.shell_tags, "rewrite.shell_tags");
        let source_tags = required.tags(rewrite.source_tags, "rewrite.source_tags");
        let build_tags = required.tags(rewrite.build_tags, "rewrite.build_tags");

        let pattern = pattern.and_then(|located| {
            let compiled = match Pattern::new(&located.source, located.value.clone()) {
                Ok(compiled) => compiled,
                Err(err) => {
                    errors.push(err.with_context("sources.pattern"));
                    return None;
                }
            };
            if let Some(extension) = &source_extension {
                if !located.value.ends_with(&format!(".{extension}")) {
                    errors.push(
                        ConfigValidationError::new(
                            Some(located.source.clone()),
                            format!(
                                "pattern '{}' must end with '.{extension}' so every chapter maps to a distinct output",
                                located.value
                            ),
                        )
                        .with_context("sources.pattern"),
                    );
                }
            }
            Some(compiled)
        });

        if let (Some(root), Some(dir), Some(source_ext), Some(output_ext)) =
            (&root, &output_dir, &source_extension, &output_extension)
        {
            if source_ext == output_ext && normalize_lexically(root) == normalize_lexically(dir) {
                errors.push(
                    ConfigValidationError::new(
                        output_dir_source,
                        format!(
                            "output directory {} is the chapter directory and both use '.{output_ext}'; notebooks would replace their chapters",
                            dir.display()
                        ),
                    )
                    .with_context("output.dir"),
                );
            }
        }

        check_disjoint_tags(
            [
                ("rewrite.shell_tags", &shell_tags),
                ("rewrite.source_tags", &source_tags),
                ("rewrite.build_tags", &build_tags),
            ],
            &mut errors,
        );

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        // Every field is Some once no errors were recorded.
        match (
            (root, pattern, source_extension, output_dir, output_extension),
            (program, input_format, output_format, kernel),
            (script_tag, shell_marker, comment_prefix, build_file, write_directive),
            (shell_tags, source_tags, build_tags),
        ) {
            (
                (Some(root), Some(pattern), Some(source_extension), Some(dir), Some(extension)),
                (Some(program), Some(input_format), Some(output_format), Some(kernel)),
                (
                    Some(script_tag),
                    Some(shell_marker),
                    Some(comment_prefix),
                    Some(build_file),
                    Some(write_directive),
                ),
                (Some(shell_tags), Some(source_tags), Some(build_tags)),
            ) => Ok(ResolvedConfig {
                sources: SourceSettings {
                    root,
                    pattern,
                    extension: source_extension,
                },
                output: OutputSettings { dir, extension },
                converter: ConverterSettings {
                    program,
                    input_format: input_format.value,
                    output_format: output_format.value,
                    kernel: kernel.value,
                },
                rewrite: RewriteSettings {
                    script_tag: script_tag.value,
                    shell_tags: shell_tags.value,
                    shell_marker: shell_marker.value,
                    source_tags: source_tags.value,
                    comment_prefix: comment_prefix.value,
                    build_tags: build_tags.value,
                    build_file: build_file.value,
                    write_directive: write_directive.value,
                },
            }),
            _ => Err(ConfigValidationErrors(vec![ConfigValidationError::new(
                None,
                "incomplete configuration".into(),
            )])),
        }
    }
}

/// Collects "missing or empty" failures while unwrapping partial fields.
struct Required<'e> {
    errors: &'e mut Vec<ConfigValidationError>,
}

impl Required<'_> {
    fn missing(&mut self, context: &str) {
        self.errors
            .push(ConfigValidationError::new(None, "value is required".into()).with_context(context));
    }

    fn text(&mut self, located: Option<Located<String>>, context: &str) -> Option<Located<String>> {
        let Some(located) = located else {
            self.missing(context);
            return None;
        };
        if located.value.trim().is_empty() {
            self.errors.push(
                ConfigValidationError::new(Some(located.source), "cannot be empty".into())
                    .with_context(context),
            );
            return None;
        }
        Some(located)
    }

    fn path(&mut self, located: Option<Located<PathBuf>>, context: &str) -> Option<PathBuf> {
        match located {
            Some(located) => Some(resolve_path(&located)),
            None => {
                self.missing(context);
                None
            }
        }
    }

    fn extension(&mut self, located: Option<Located<String>>, context: &str) -> Option<String> {
        let located = self.text(located, context)?;
        if located.value.starts_with('.') || located.value.contains(['/', '\\']) {
            self.errors.push(
                ConfigValidationError::new(
                    Some(located.source),
                    format!(
                        "extension '{}' must be a bare suffix without a leading dot",
                        located.value
                    ),
                )
                .with_context(context),
            );
            return None;
        }
        Some(located.value)
    }

    /// Bare program names are looked up on PATH; anything with a separator
    /// resolves against the declaring layer.
    fn program(&mut self, located: Option<Located<String>>, context: &str) -> Option<PathBuf> {
        let located = self.text(located, context)?;
        if located.value.contains(['/', '\\']) {
            Some(resolve_path(&Located::new(
                PathBuf::from(&located.value),
                located.source,
            )))
        } else {
            Some(PathBuf::from(located.value))
        }
    }

    fn tags(
        &mut self,
        located: Option<Located<Vec<String>>>,
        context: &str,
    ) -> Option<Located<Vec<String>>> {
        let Some(located) = located else {
            self.missing(context);
            return None;
        };
        let mut tags = Vec::with_capacity(located.value.len());
        for tag in located.value {
            let trimmed = tag.trim();
            if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
                self.errors.push(
                    ConfigValidationError::new(
                        Some(located.source.clone()),
                        format!("invalid fence tag '{tag}'"),
                    )
                    .with_context(context),
                );
                continue;
            }
            tags.push(trimmed.to_string());
        }
        Some(Located::new(tags, located.source))
    }
}

fn check_disjoint_tags<'a>(
    groups: [(&'a str, &'a Option<Located<Vec<String>>>); 3],
    errors: &mut Vec<ConfigValidationError>,
) {
    let mut owners: HashMap<&'a str, &'a str> = HashMap::new();
    for (context, located) in groups {
        let Some(located) = located else {
            continue;
        };
        for tag in &located.value {
            match owners.get(tag.as_str()) {
                Some(owner) if *owner != context => errors.push(
                    ConfigValidationError::new(
                        Some(located.source.clone()),
                        format!("fence tag '{tag}' is already claimed by {owner}"),
                    )
                    .with_context(context),
                ),
                Some(_) => {}
                None => {
                    owners.insert(tag.as_str(), context);
                }
            }
        }
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() {
        path.clone()
    } else {
        located.source.base_dir.join(path)
    }
}

/// Collapse `.` and `..` segments without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[derive(Clone, Debug)]
struct ResolvedConfig {
    sources: SourceSettings,
    output: OutputSettings,
    converter: ConverterSettings,
    rewrite: RewriteSettings,
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    sources: Option<RawSources>,
    #[serde(default)]
    output: Option<RawOutput>,
    #[serde(default)]
    converter: Option<RawConverter>,
    #[serde(default)]
    rewrite: Option<RawRewrite>,
}

impl RawConfig {
    fn into_partial(self, source: &ConfigSource) -> PartialConfig {
        let at = |value: Option<String>| value.map(|value| Located::new(value, source.clone()));
        let at_path = |value: Option<PathBuf>| value.map(|value| Located::new(value, source.clone()));
        let at_tags =
            |value: Option<Vec<String>>| value.map(|value| Located::new(value, source.clone()));

        let sources = self.sources.unwrap_or_default();
        let output = self.output.unwrap_or_default();
        let converter = self.converter.unwrap_or_default();
        let rewrite = self.rewrite.unwrap_or_default();

        PartialConfig {
            sources: SourcesPartial {
                root: at_path(sources.root),
                pattern: at(sources.pattern),
                extension: at(sources.extension),
            },
            output: OutputPartial {
                dir: at_path(output.dir),
                extension: at(output.extension),
            },
            converter: ConverterPartial {
                program: at(converter.program),
                input_format: at(converter.input_format),
                output_format: at(converter.output_format),
                kernel: at(converter.kernel),
            },
            rewrite: RewritePartial {
                script_tag: at(rewrite.script_tag),
                shell_tags: at_tags(rewrite.shell_tags),
                shell_marker: at(rewrite.shell_marker),
                source_tags: at_tags(rewrite.source_tags),
                comment_prefix: at(rewrite.comment_prefix),
                build_tags: at_tags(rewrite.build_tags),
                build_file: at(rewrite.build_file),
                write_directive: at(rewrite.write_directive),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSources {
    #[serde(default)]
    root: Option<PathBuf>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConverter {
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    input_format: Option<String>,
    #[serde(default)]
    output_format: Option<String>,
    #[serde(default)]
    kernel: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRewrite {
    #[serde(default)]
    script_tag: Option<String>,
    #[serde(default)]
    shell_tags: Option<Vec<String>>,
    #[serde(default)]
    shell_marker: Option<String>,
    #[serde(default)]
    source_tags: Option<Vec<String>>,
    #[serde(default)]
    comment_prefix: Option<String>,
    #[serde(default)]
    build_tags: Option<Vec<String>>,
    #[serde(default)]
    build_file: Option<String>,
    #[serde(default)]
    write_directive: Option<String>,
}
