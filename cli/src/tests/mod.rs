use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

#[test]
fn cli_match() {
    Command::cargo_bin("ri")
        .unwrap()
        .arg("match")
        .arg("-i")
        .arg("(a+)(b+)")
        .arg("xAAb")
        .arg("xyz")
        .assert()
        .success()
        .stdout(
            r#"xAAb: match (3 groups)
  $0 = 1..4 "AAb"
  $1 = 1..3 "AA"
  $2 = 3..4 "b"
xyz: no match
"#,
        );
}

#[test]
fn cli_match_unset_group() {
    Command::cargo_bin("ri")
        .unwrap()
        .arg("match")
        .arg("(a)|(b)")
        .arg("b")
        .assert()
        .success()
        .stdout(predicate::str::contains("  $1 = unset\n"))
        .stdout(predicate::str::contains("  $2 = 0..1 \"b\"\n"));
}

#[test]
fn cli_match_not_empty() {
    Command::cargo_bin("ri")
        .unwrap()
        .arg("match")
        .arg("--not-empty")
        .arg("x*")
        .arg("abxxc")
        .assert()
        .success()
        .stdout("abxxc: match (1 groups)\n  $0 = 2..4 \"xx\"\n");
}

#[test]
fn cli_match_small_vector() {
    Command::cargo_bin("ri")
        .unwrap()
        .arg("match")
        .arg("--captures")
        .arg("3")
        .arg("(a)(b)")
        .arg("ab")
        .assert()
        .success()
        .stdout("ab: match (capture vector too small)\n");
}

#[test]
fn cli_match_start_offset() {
    Command::cargo_bin("ri")
        .unwrap()
        .arg("match")
        .arg("--start-offset")
        .arg("1")
        .arg("abc")
        .arg("abcabc")
        .assert()
        .success()
        .stdout("abcabc: match (1 groups)\n  $0 = 3..6 \"abc\"\n");
}

#[test]
fn cli_compile_error() {
    Command::cargo_bin("ri")
        .unwrap()
        .arg("match")
        .arg("(abc")
        .arg("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("can not compile `(abc`"))
        .stderr(predicate::str::contains("error offset = 4"));
}

#[test]
fn cli_invalid_priority() {
    Command::cargo_bin("ri")
        .unwrap()
        .arg("match")
        .arg("--priority")
        .arg("automata")
        .arg("abc")
        .arg("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("can not compile `abc`"));

    Command::cargo_bin("ri")
        .unwrap()
        .arg("match")
        .arg("--priority")
        .arg("pcre,foo")
        .arg("abc")
        .arg("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown engine `foo`"));
}

#[test]
fn cli_bench() {
    Command::cargo_bin("ri")
        .unwrap()
        .arg("bench")
        .arg("--duration")
        .arg("10")
        .arg("abc")
        .arg("xxabcxx")
        .assert()
        .success()
        .stdout(predicate::str::contains("[pcre]"))
        .stdout(predicate::str::contains("[pcre-jit]"))
        .stdout(predicate::str::contains("[automata, pcre]"))
        .stdout(predicate::str::contains("[automata, pcre-jit, pcre]"))
        .stdout(predicate::str::contains("ops/s"))
        .stdout(predicate::str::contains("differs").not());
}

#[test]
fn cli_config_match_limit() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file
        .write_str(
            r#"
            priority = ["pcre"]
            match_limit = 100
            "#,
        )
        .unwrap();

    let subject = format!("{}b", "a".repeat(32));

    Command::cargo_bin("ri")
        .unwrap()
        .arg("--config")
        .arg(config_file.path())
        .arg("match")
        .arg("(a+)+$")
        .arg(&subject)
        .assert()
        .failure()
        .stdout(predicate::str::starts_with(format!("{}: engine error", subject)))
        .stderr(predicate::str::contains("1 of the executions failed"));
}

#[test]
fn cli_config_unknown_key() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file.write_str("unknown = 1\n").unwrap();

    Command::cargo_bin("ri")
        .unwrap()
        .arg("--config")
        .arg(config_file.path())
        .arg("match")
        .arg("abc")
        .arg("abc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
