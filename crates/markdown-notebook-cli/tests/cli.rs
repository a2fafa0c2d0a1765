use std::fs;

use assert_cmd::Command;
use markdown_notebook_test_support::{Workspace, PLAIN_CHAPTER, SAMPLE_CHAPTER};
use predicates::prelude::*;

#[cfg(unix)]
use markdown_notebook_test_support::{write_converter_script, COPY_TO_OUTPUT};

fn cli(workspace: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("markdown-notebook").expect("binary");
    cmd.current_dir(workspace.root()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn no_matching_chapters_is_success() {
    let workspace = Workspace::new();
    workspace.add_chapter("intro.md", PLAIN_CHAPTER);

    cli(&workspace)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(!workspace.notebooks().exists());
}

#[cfg(unix)]
#[test]
fn bare_invocation_converts_every_chapter() {
    let workspace = Workspace::new();
    write_converter_script(workspace.root(), "convert.sh", COPY_TO_OUTPUT);
    workspace.append_config("[converter]\nprogram = \"./convert.sh\"\n");
    workspace.add_chapter("01-first-steps.md", SAMPLE_CHAPTER);
    workspace.add_chapter("02-notes.md", PLAIN_CHAPTER);

    cli(&workspace)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "converted chapters/01-first-steps.md -> notebooks/01-first-steps.ipynb (3 blocks rewritten)",
        ))
        .stdout(predicate::str::contains("(0 blocks rewritten)"));

    let notebook =
        fs::read_to_string(workspace.notebooks().join("01-first-steps.ipynb")).expect("notebook");
    assert!(notebook.contains("```python\n!pip install pybind11\n```"));
    assert!(notebook.contains("%%writefile example.cpp\n"));
    assert!(notebook.contains("%%writefile CMakeLists.txt\n"));
    assert!(workspace.notebooks().join("02-notes.ipynb").exists());
}

#[cfg(unix)]
#[test]
fn rerunning_produces_identical_notebooks() {
    let workspace = Workspace::new();
    let script = write_converter_script(workspace.root(), "convert.sh", COPY_TO_OUTPUT);
    workspace.add_chapter("01-first-steps.md", SAMPLE_CHAPTER);
    let notebook = workspace.notebooks().join("01-first-steps.ipynb");

    cli(&workspace)
        .arg("build")
        .arg("--converter")
        .arg(&script)
        .assert()
        .success();
    let first = fs::read(&notebook).expect("first run");

    cli(&workspace)
        .arg("build")
        .arg("--converter")
        .arg(&script)
        .assert()
        .success();

    assert_eq!(fs::read(&notebook).expect("second run"), first);
}

#[cfg(unix)]
#[test]
fn converter_failure_aborts_with_its_exit_status() {
    let workspace = Workspace::new();
    let script = write_converter_script(
        workspace.root(),
        "convert.sh",
        r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; shift; fi
  shift
done
case "$out" in
  *02-*) exit 3 ;;
esac
cat > "$out"
"#,
    );
    workspace.add_chapter("01-a.md", PLAIN_CHAPTER);
    workspace.add_chapter("02-b.md", PLAIN_CHAPTER);
    workspace.add_chapter("03-c.md", PLAIN_CHAPTER);

    cli(&workspace)
        .args(["build", "--converter"])
        .arg(&script)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("exit status 3"));

    assert!(workspace.notebooks().join("01-a.ipynb").exists());
    assert!(!workspace.notebooks().join("03-c.ipynb").exists());
}

#[test]
fn missing_converter_exits_127() {
    let workspace = Workspace::new();
    workspace.add_chapter("01-a.md", PLAIN_CHAPTER);

    cli(&workspace)
        .args([
            "build",
            "--converter",
            "markdown-notebook-no-such-converter",
        ])
        .assert()
        .code(127)
        .stderr(predicate::str::contains("failed to start converter"));
}

#[test]
fn dry_run_reports_json_without_converting() {
    let workspace = Workspace::new();
    workspace.add_chapter("01-first-steps.md", SAMPLE_CHAPTER);

    let output = cli(&workspace)
        .args(["build", "--dry-run", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout is a json report");
    assert_eq!(report["dry_run"], true);
    let blocks = report["documents"][0]["blocks"]
        .as_array()
        .expect("blocks array");
    let kinds: Vec<_> = blocks
        .iter()
        .map(|block| block["kind"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(kinds, vec!["shell", "source", "build"]);
    assert_eq!(blocks[1]["target"], "example.cpp");
    assert!(!workspace.notebooks().exists());
}

#[test]
fn list_shows_the_source_to_output_mapping() {
    let workspace = Workspace::new();
    workspace.add_chapter("02-classes.md", PLAIN_CHAPTER);
    workspace.add_chapter("01-intro.md", PLAIN_CHAPTER);

    cli(&workspace).arg("list").assert().success().stdout(
        "chapters/01-intro.md -> notebooks/01-intro.ipynb\n\
         chapters/02-classes.md -> notebooks/02-classes.ipynb\n",
    );
}

#[test]
fn rewrite_reads_standard_input() {
    let workspace = Workspace::new();

    cli(&workspace)
        .args(["rewrite", "-"])
        .write_stdin("```bash\necho hi\n```\n")
        .assert()
        .success()
        .stdout("```python\n!echo hi\n```\n");
}

#[test]
fn rewrite_diff_is_empty_for_plain_chapters() {
    let workspace = Workspace::new();
    let plain = workspace.add_chapter("01-notes.md", PLAIN_CHAPTER);
    let sample = workspace.add_chapter("02-sample.md", SAMPLE_CHAPTER);

    cli(&workspace)
        .args(["rewrite", "--diff"])
        .arg(&plain)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    cli(&workspace)
        .args(["rewrite", "--diff"])
        .arg(&sample)
        .assert()
        .success()
        .stdout(predicate::str::contains("+%%writefile CMakeLists.txt"));
}

#[test]
fn invalid_config_is_reported() {
    let workspace = Workspace::new();
    workspace.append_config("[converter]\nkernel = \"\"\n");

    cli(&workspace)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("converter.kernel: cannot be empty"));
}
