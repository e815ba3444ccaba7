//! End-to-end tests for the pdfwork binary.

use libpdfwork::PdfDocument;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn pdfwork() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pdfwork"));
    command.env_remove("RUST_LOG");
    command
}

/// Write a PDF with `pages` blank pages into `dir`.
fn blank_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    PdfDocument::with_blank_pages(pages).save(&path).unwrap();
    path
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(command: &mut Command) -> Output {
    command.output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn export_text(pdf: &Path) -> String {
    let output = run(pdfwork().args(["outline", "export"]).arg(pdf));
    assert!(output.status.success(), "export failed: {}", stderr(&output));
    stdout(&output)
}

#[test]
fn test_import_with_offset_then_export() {
    let dir = TempDir::new().unwrap();
    let pdf = blank_pdf(dir.path(), "in.pdf", 10);
    let toc = write_file(dir.path(), "book.toc", "A @ 1\n    A1 @ 2\nB @ 5\n");
    let out = dir.path().join("out.pdf");

    let output = run(pdfwork()
        .args(["outline", "import", "--offset", "2", "-i"])
        .arg(&toc)
        .arg("-o")
        .arg(&out)
        .arg(&pdf));
    assert!(output.status.success(), "import failed: {}", stderr(&output));

    assert_eq!(export_text(&out), "1 A @ 3\n    1.1 A1 @ 4\n2 B @ 7\n");
    // The input document is left alone.
    assert_eq!(export_text(&pdf), "");
}

#[test]
fn test_import_from_stdin_without_numbers() {
    let dir = TempDir::new().unwrap();
    let pdf = blank_pdf(dir.path(), "in.pdf", 4);
    let out = dir.path().join("out.pdf");

    let mut child = pdfwork()
        .args(["outline", "import", "--no-number", "-o"])
        .arg(&out)
        .arg(&pdf)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all("Preface\nChapter 1 @ 2\n    Section 1.1\n".as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "import failed: {}", stderr(&output));

    assert_eq!(
        export_text(&out),
        "Preface @ 1\nChapter 1 @ 2\n    Section 1.1 @ 2\n"
    );
}

#[test]
fn test_out_of_range_aborts_without_writing() {
    let dir = TempDir::new().unwrap();
    let pdf = blank_pdf(dir.path(), "in.pdf", 3);
    let toc = write_file(dir.path(), "book.toc", "A @ 1\nB @ 9\n");
    let out = dir.path().join("out.pdf");

    let output = run(pdfwork()
        .args(["outline", "import", "-i"])
        .arg(&toc)
        .arg("-o")
        .arg(&out)
        .arg(&pdf));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: "));
    assert!(stderr(&output).contains("\"2 B\""));
    assert!(!out.exists());
}

#[test]
fn test_negative_offset_is_accepted() {
    let dir = TempDir::new().unwrap();
    let pdf = blank_pdf(dir.path(), "in.pdf", 3);
    let toc = write_file(dir.path(), "book.toc", "Front @ 2\n");
    let out = dir.path().join("out.pdf");

    let output = run(pdfwork()
        .args(["outline", "import", "--offset", "-1", "-i"])
        .arg(&toc)
        .arg("-o")
        .arg(&out)
        .arg(&pdf));
    assert!(output.status.success(), "import failed: {}", stderr(&output));
    assert_eq!(export_text(&out), "1 Front @ 1\n");
}

#[test]
fn test_skip_out_of_range() {
    let dir = TempDir::new().unwrap();
    let pdf = blank_pdf(dir.path(), "in.pdf", 3);
    let toc = write_file(dir.path(), "book.toc", "A @ 1\nB @ 9\nC @ 3\n");
    let out = dir.path().join("out.pdf");

    let output = run(pdfwork()
        .args(["outline", "import", "--skip-out-of-range", "-i"])
        .arg(&toc)
        .arg("-o")
        .arg(&out)
        .arg(&pdf));
    assert!(output.status.success(), "import failed: {}", stderr(&output));
    assert_eq!(export_text(&out), "1 A @ 1\n3 C @ 3\n");
}

#[test]
fn test_parse_error_names_line_and_file() {
    let dir = TempDir::new().unwrap();
    let pdf = blank_pdf(dir.path(), "in.pdf", 3);
    let toc = write_file(dir.path(), "jump.toc", "A\n        B @ 2\n");
    let out = dir.path().join("out.pdf");

    let output = run(pdfwork()
        .args(["outline", "import", "-i"])
        .arg(&toc)
        .arg("-o")
        .arg(&out)
        .arg(&pdf));
    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("at line 2 of <"), "{}", message);
    assert!(message.contains("jump.toc>"), "{}", message);
    assert!(!out.exists());
}

#[test]
fn test_export_to_file_then_reimport() {
    let dir = TempDir::new().unwrap();
    let pdf = blank_pdf(dir.path(), "in.pdf", 6);
    let toc = write_file(dir.path(), "book.toc", "A @ 1\n    A1 @ 2\nB @ 6\n");
    let first = dir.path().join("first.pdf");
    let exported = dir.path().join("exported.toc");
    let second = dir.path().join("second.pdf");

    let output = run(pdfwork()
        .args(["outline", "import", "--no-number", "-i"])
        .arg(&toc)
        .arg("-o")
        .arg(&first)
        .arg(&pdf));
    assert!(output.status.success(), "import failed: {}", stderr(&output));

    let output = run(pdfwork()
        .args(["outline", "export", "-o"])
        .arg(&exported)
        .arg(&first));
    assert!(output.status.success(), "export failed: {}", stderr(&output));
    assert_eq!(stdout(&output), "");
    assert_eq!(
        fs::read_to_string(&exported).unwrap(),
        "A @ 1\n    A1 @ 2\nB @ 6\n"
    );

    let output = run(pdfwork()
        .args(["outline", "import", "--no-number", "-i"])
        .arg(&exported)
        .arg("-o")
        .arg(&second)
        .arg(&pdf));
    assert!(output.status.success(), "import failed: {}", stderr(&output));
    assert_eq!(export_text(&second), export_text(&first));
}

#[test]
fn test_erase() {
    let dir = TempDir::new().unwrap();
    let pdf = blank_pdf(dir.path(), "in.pdf", 2);
    let toc = write_file(dir.path(), "book.toc", "A @ 1\n    B @ 2\n");
    let with_outline = dir.path().join("with.pdf");
    let erased = dir.path().join("erased.pdf");

    let output = run(pdfwork()
        .args(["outline", "import", "-i"])
        .arg(&toc)
        .arg("-o")
        .arg(&with_outline)
        .arg(&pdf));
    assert!(output.status.success(), "import failed: {}", stderr(&output));
    assert_eq!(export_text(&with_outline), "1 A @ 1\n    1.1 B @ 2\n");

    let output = run(pdfwork()
        .args(["outline", "erase", "-o"])
        .arg(&erased)
        .arg(&with_outline));
    assert!(output.status.success(), "erase failed: {}", stderr(&output));
    assert_eq!(export_text(&erased), "");
}

#[test]
fn test_check() {
    let dir = TempDir::new().unwrap();
    let good = write_file(dir.path(), "good.toc", "A @ 1\n    B\n");
    let bad = write_file(dir.path(), "bad.toc", "A @ 1\nB @ two\n");

    let output = run(pdfwork().args(["outline", "check", "-i"]).arg(&good));
    assert!(output.status.success());
    assert_eq!(stdout(&output), "ok\n");

    let output = run(pdfwork().args(["outline", "check", "-i"]).arg(&bad));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: Format error"));
    assert!(stderr(&output).contains("at line 2"));
}

#[test]
fn test_missing_pdf() {
    let dir = TempDir::new().unwrap();
    let output = run(pdfwork()
        .args(["outline", "export"])
        .arg(dir.path().join("missing.pdf")));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: Cannot open"));
}
