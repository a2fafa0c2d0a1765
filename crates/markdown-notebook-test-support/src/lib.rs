//! Shared test harness utilities for markdown-notebook crates.

use std::fs;
use std::path::{Path, PathBuf};

use markdown_notebook_config::{Config, LoadOptions, CONFIG_FILE_NAME};
use tempfile::TempDir;

/// A chapter exercising every recognised fence kind.
pub const SAMPLE_CHAPTER: &str = "\
# First steps

```bash
pip install pybind11
```

```cpp
// example.cpp
int add(int i, int j) { return i + j; }
```

```cmake
project(example)
```
";

/// A chapter with nothing to rewrite.
pub const PLAIN_CHAPTER: &str = "# Notes\n\n```python\nimport example\n```\n";

/// Converter script body that copies stdin to the `--output` argument.
pub const COPY_TO_OUTPUT: &str = r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; shift; fi
  shift
done
cat > "$out"
"#;

pub fn write_file(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(&path, contents).expect("write file");
    path
}

/// Write an executable shell script acting as the converter.
#[cfg(unix)]
pub fn write_converter_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = write_file(dir, name, &format!("#!/bin/sh\n{body}"));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod converter");
    path
}

/// Temporary project with `chapters/` as source root and `notebooks/` as
/// output directory, configured through a local config file.
pub struct Workspace {
    temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("tempdir");
        fs::create_dir(temp.path().join("chapters")).expect("chapters dir");
        write_file(
            temp.path(),
            CONFIG_FILE_NAME,
            "[sources]\nroot = \"chapters\"\n\n[output]\ndir = \"notebooks\"\n",
        );
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn chapters(&self) -> PathBuf {
        self.root().join("chapters")
    }

    pub fn notebooks(&self) -> PathBuf {
        self.root().join("notebooks")
    }

    pub fn add_chapter(&self, name: &str, contents: &str) -> PathBuf {
        write_file(&self.chapters(), name, contents)
    }

    /// Append TOML to the workspace config file.
    pub fn append_config(&self, extra: &str) {
        let path = self.root().join(CONFIG_FILE_NAME);
        let mut contents = fs::read_to_string(&path).expect("read config");
        contents.push('\n');
        contents.push_str(extra);
        fs::write(&path, contents).expect("write config");
    }

    pub fn config(&self) -> Config {
        Config::load(LoadOptions::default().with_working_dir(self.root())).expect("load config")
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
