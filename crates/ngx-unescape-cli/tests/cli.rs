use std::fs;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ngx-unescape"))
}

fn write_fields(temp: &TempDir, contents: &[u8]) -> std::path::PathBuf {
    let path = temp.path().join("fields.txt");
    fs::write(&path, contents).expect("write fields");
    path
}

#[test]
fn help_lists_decode() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("decode"));
    cmd().arg("decode").arg("--help").assert().success();
}

#[test]
fn stdout_outputs_decoded_fields() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fields(&temp, br"foo\x22.bar\x5C?baz
plain
");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("--stdout")
        .assert()
        .success()
        .stdout("foo\".bar\\?baz\nplain\n");
}

#[test]
fn reads_stdin_when_input_is_dash() {
    cmd()
        .arg("decode")
        .arg("-")
        .arg("--stdout")
        .write_stdin(br"like\x5CGecko".as_slice())
        .assert()
        .success()
        .stdout("like\\Gecko\n");
}

#[test]
fn output_file_is_written_with_summary() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fields(&temp, br"\x41\x42
");
    let output = temp.path().join("out").join("decoded.txt");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(contains("OK: 1 fields decoded (0 rejected)"));

    assert_eq!(fs::read(&output).expect("read output"), b"AB\n");
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fields(&temp, b"x\n");
    let output = temp.path().join("decoded.txt");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("-o")
        .arg(output)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.txt");

    cmd()
        .arg("decode")
        .arg(missing)
        .arg("--stdout")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn stdout_and_output_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fields(&temp, b"x\n");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("--stdout")
        .arg("-o")
        .arg(temp.path().join("decoded.txt"))
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn output_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fields(&temp, b"x\n");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("output path must differ from input"));
}

#[test]
fn malformed_field_fails_with_line_number() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fields(&temp, br"fine
malformed line \x2, here
");

    cmd()
        .arg("decode")
        .arg(input)
        .arg("--stdout")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("line 2:").and(contains("malformed escape sequence")));
}

#[test]
fn strict_rejects_raw_nul() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fields(&temp, b"foo\\x09.bar\x00\\x5C?baz\n");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .failure()
        .stderr(contains("input not properly escaped"));

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--stdout")
        .assert()
        .success()
        .stdout(predicates::ord::eq(b"foo\t.bar\x00\\?baz\n".as_slice()));
}

#[test]
fn skip_and_partial_keep_going() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_fields(&temp, br"malformed line \2, here
ok\x21
");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--stdout")
        .arg("--on-error")
        .arg("skip")
        .assert()
        .success()
        .stdout("ok!\n")
        .stderr(contains("skipping field"));

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--stdout")
        .arg("--on-error")
        .arg("partial")
        .assert()
        .success()
        .stdout("malformed line \nok!\n");
}
