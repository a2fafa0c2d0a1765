use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use markdown_notebook_config::{Config, ConfigError, ConfigSourceKind, LoadOptions};
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert_eq!(config.sources.root, working_dir.join(".."));
    assert_eq!(config.sources.pattern.original(), "[0-9][0-9]-*.md");
    assert_eq!(config.sources.extension, "md");
    assert_eq!(config.output.dir, working_dir.join("."));
    assert_eq!(config.output.extension, "ipynb");
    assert_eq!(config.converter.program, PathBuf::from("jupytext"));
    assert_eq!(config.converter.input_format, "md");
    assert_eq!(config.converter.output_format, "ipynb");
    assert_eq!(config.converter.kernel, "python3");
    assert_eq!(config.rewrite.script_tag, "python");
    assert_eq!(config.rewrite.shell_tags, vec!["bash".to_string()]);
    assert_eq!(config.rewrite.source_tags, vec!["cpp".to_string()]);
    assert_eq!(config.rewrite.build_tags, vec!["cmake".to_string()]);
    assert_eq!(config.rewrite.build_file, "CMakeLists.txt");
    assert_eq!(config.rewrite.write_directive, "%%writefile");

    assert_eq!(config.provenance.layers.len(), 1);
    assert_eq!(config.provenance.layers[0].kind, ConfigSourceKind::Default);
}

#[test]
fn local_config_overrides_git_root_config() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical(temp.path());
    fs::create_dir(root.join(".git")).expect("git dir");
    let docs = root.join("docs");
    fs::create_dir(&docs).expect("docs dir");

    write_file(
        root.join(".markdown-notebook.toml"),
        r#"
[converter]
kernel = "xcpp17"
program = "tools/convert.sh"

[output]
extension = "nb.json"
"#,
    );
    write_file(
        docs.join(".markdown-notebook.toml"),
        r#"
[converter]
kernel = "python3.12"

[sources]
root = "chapters"
"#,
    );

    let config =
        Config::load(LoadOptions::default().with_working_dir(&docs)).expect("load layered config");

    assert_eq!(config.converter.kernel, "python3.12");
    assert_eq!(config.converter.program, root.join("tools/convert.sh"));
    assert_eq!(config.output.extension, "nb.json");
    assert_eq!(config.sources.root, docs.join("chapters"));

    let kinds: Vec<_> = config
        .provenance
        .layers
        .iter()
        .map(|layer| layer.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ConfigSourceKind::Default,
            ConfigSourceKind::GitRoot,
            ConfigSourceKind::Local
        ]
    );
}

#[test]
fn override_path_takes_precedence() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical(temp.path());
    write_file(
        root.join(".markdown-notebook.toml"),
        "[output]\ndir = \"local\"\n",
    );
    write_file(root.join("ci.toml"), "[output]\ndir = \"ci-out\"\n");

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&root)
            .with_override_path("ci.toml"),
    )
    .expect("load override");

    assert_eq!(config.output.dir, root.join("ci-out"));
    assert_eq!(
        config.provenance.layers.last().map(|layer| layer.kind),
        Some(ConfigSourceKind::Override)
    );
}

#[test]
fn missing_override_is_reported() {
    let temp = TempDir::new().expect("tempdir");

    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(temp.path())
            .with_override_path("absent.toml"),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::OverrideNotFound { .. }));
}

#[test]
fn parse_errors_name_the_file() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical(temp.path());
    write_file(root.join(".markdown-notebook.toml"), "[output\n");

    let err = Config::load(LoadOptions::default().with_working_dir(&root)).unwrap_err();

    match err {
        ConfigError::Parse { path, .. } => {
            assert_eq!(path, root.join(".markdown-notebook.toml"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn unknown_keys_are_parse_errors() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(".markdown-notebook.toml"),
        "[converter]\nkernal = \"python3\"\n",
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path())).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn validation_collects_every_problem() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(".markdown-notebook.toml"),
        r#"
[sources]
pattern = "*.markdown"

[output]
extension = ".ipynb"

[converter]
kernel = "  "

[rewrite]
source_tags = ["cpp", "bash"]
"#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path())).unwrap_err();

    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    let messages: Vec<String> = errors.iter().map(|err| err.to_string()).collect();
    assert_eq!(messages.len(), 4, "{messages:#?}");
    assert!(messages
        .iter()
        .any(|msg| msg.starts_with("output.extension: extension '.ipynb'")));
    assert!(messages
        .iter()
        .any(|msg| msg.starts_with("converter.kernel: cannot be empty")));
    assert!(messages
        .iter()
        .any(|msg| msg.starts_with("sources.pattern: pattern '*.markdown' must end with '.md'")));
    assert!(messages
        .iter()
        .any(|msg| msg.contains("fence tag 'bash' is already claimed by rewrite.shell_tags")));
    assert!(messages.iter().all(|msg| msg.contains("local config at")));
}

#[test]
fn invalid_glob_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(".markdown-notebook.toml"),
        "[sources]\npattern = \"[0-9.md\"\n",
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path())).unwrap_err();

    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors
        .iter()
        .any(|err| err.message.contains("invalid glob pattern '[0-9.md'")));
}

#[test]
fn output_replacing_chapters_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(".markdown-notebook.toml"),
        r#"
[sources]
root = "chapters"

[output]
dir = "chapters"
extension = "md"
"#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path())).unwrap_err();

    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    let messages: Vec<String> = errors.iter().map(|err| err.to_string()).collect();
    assert_eq!(messages.len(), 1, "{messages:#?}");
    assert!(messages[0].starts_with("output.dir: output directory"));
    assert!(messages[0].contains("local config at"));
}

#[test]
fn override_file_in_working_dir_is_read_once() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical(temp.path());
    write_file(
        root.join(".markdown-notebook.toml"),
        "[converter]\nkernel = \"xcpp17\"\n",
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&root)
            .with_override_path(".markdown-notebook.toml"),
    )
    .expect("load config");

    let kinds: Vec<_> = config
        .provenance
        .layers
        .iter()
        .map(|layer| layer.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![ConfigSourceKind::Default, ConfigSourceKind::Override]
    );
    assert_eq!(config.converter.kernel, "xcpp17");
}
