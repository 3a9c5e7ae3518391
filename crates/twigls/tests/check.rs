use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

fn twigls_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_twigls"))
}

fn check(dir: &Path, args: &[&str]) -> Output {
    Command::new(twigls_binary())
        .arg("check")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

fn write_template(dir: &Path, name: &str, source: &str) {
    let path = dir.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, source).unwrap();
}

#[test]
fn check_clean_templates_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_template(
        dir.path(),
        "templates/good.twig",
        "{% block content %}\n{% for item in items %}{{ item }}{% endfor %}\n{% endblock %}\n",
    );

    let output = check(dir.path(), &["templates"]);
    assert!(
        output.status.success(),
        "Expected exit 0, got {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn check_unclosed_block_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    write_template(dir.path(), "templates/broken.twig", "{% block content %}\n<p>Hello</p>\n");

    let output = check(dir.path(), &["templates"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("broken.twig:1:1: warning[T100]: Unclosed {% block %}"),
        "Expected unclosed block warning in output:\n{stdout}"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Found 1 warning in 1 file."), "stderr:\n{stderr}");
}

#[test]
fn check_only_walks_twig_files() {
    let dir = tempfile::tempdir().unwrap();
    write_template(dir.path(), "page.html", "{% if a %}");
    write_template(dir.path(), "nested/ok.twig", "{{ a }}");

    let output = check(dir.path(), &[]);
    assert!(output.status.success());
}

#[test]
fn check_respects_project_settings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("twigls.toml"),
        "[diagnostics]\nblock_tags = false\n",
    )
    .unwrap();
    write_template(dir.path(), "page.twig", "{% if a %}");

    let output = check(dir.path(), &["page.twig"]);
    assert!(output.status.success());
}

#[test]
fn check_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(twigls_binary())
        .args(["check", "-"])
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"{{ a # note }}\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<stdin>:1:6: warning[T200]:"), "stdout:\n{stdout}");
}

#[test]
fn check_quiet_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_template(dir.path(), "page.twig", "{% endif %}");

    let output = check(dir.path(), &["--quiet", "page.twig"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}
