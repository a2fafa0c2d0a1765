use std::fmt;

/// Recognised fence classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Shell commands; each body line becomes an inline shell invocation.
    Shell,
    /// Native source whose first line is a comment naming the file.
    Source,
    /// Build-tool configuration written to a fixed file.
    Build,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Shell => "shell",
            BlockKind::Source => "source",
            BlockKind::Build => "build",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags and replacement vocabulary used by the rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRules {
    pub script_tag: String,
    pub shell_tags: Vec<String>,
    pub shell_marker: String,
    pub source_tags: Vec<String>,
    pub comment_prefix: String,
    pub build_tags: Vec<String>,
    pub build_file: String,
    pub write_directive: String,
}

impl RewriteRules {
    pub fn write_line(&self, file: &str) -> String {
        format!("{} {}", self.write_directive, file)
    }
}

impl Default for RewriteRules {
    fn default() -> Self {
        RewriteRules {
            script_tag: "python".into(),
            shell_tags: vec!["bash".into()],
            shell_marker: "!".into(),
            source_tags: vec!["cpp".into()],
            comment_prefix: "//".into(),
            build_tags: vec!["cmake".into()],
            build_file: "CMakeLists.txt".into(),
            write_directive: "%%writefile".into(),
        }
    }
}
