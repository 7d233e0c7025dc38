//! Formatter CLI tests
//!
//! Tests for the asfmt binary including:
//! - Output modes (stdout, in-place, check)
//! - Input expansion and ignore files
//! - Configuration files and flags
//! - Error handling and exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FORMATTED: &str = "@inline\nexport function add(a: i32, b: i32): i32 {\n  return a + b;\n}\n";
const UNFORMATTED: &str = "@inline\nexport function add(a:i32,b:i32):i32{return a+b}";

/// asfmt command isolated from the user's configuration
fn asfmt(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("asfmt").unwrap();
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", workdir)
        .env("NO_COLOR", "1")
        .env("ASFMT_NO_PROGRESS", "1");
    for var in [
        "ASFMT_INDENT_SIZE",
        "ASFMT_MAX_WIDTH",
        "ASFMT_USE_TABS",
        "ASFMT_SINGLE_QUOTE",
        "ASFMT_TRAILING_COMMAS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

// ============================================================================
// Output Modes
// ============================================================================

#[test]
fn test_stdout_mode() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "index.ts", UNFORMATTED);

    asfmt(temp.path())
        .arg("index.ts")
        .assert()
        .success()
        .stdout(FORMATTED);

    // The file itself is untouched
    assert_eq!(
        fs::read_to_string(temp.path().join("index.ts")).unwrap(),
        UNFORMATTED
    );
}

#[test]
fn test_stdout_mode_keeps_decorators_in_members() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "vec.ts",
        "@unmanaged class Vec2 { @inline get x(): f32 { return this._x; } private _x: f32 = 0; }",
    );

    let output = asfmt(temp.path()).arg("vec.ts").output().unwrap();

    assert!(output.status.success());
    insta::assert_snapshot!(String::from_utf8_lossy(&output.stdout), @r"
@unmanaged class Vec2 {
  @inline get x(): f32 {
    return this._x;
  }
  private _x: f32 = 0;
}
");
}

#[test]
fn test_write_mode() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "a.ts", UNFORMATTED);
    write_file(temp.path(), "b.ts", FORMATTED);

    asfmt(temp.path())
        .args(["--write", "."])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("Formatted: a.ts"))
        .stderr(predicate::str::contains("b.ts").not());

    assert_eq!(fs::read_to_string(temp.path().join("a.ts")).unwrap(), FORMATTED);
    assert_eq!(fs::read_to_string(temp.path().join("b.ts")).unwrap(), FORMATTED);
}

#[test]
fn test_check_mode_formatted() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "index.ts", FORMATTED);

    asfmt(temp.path())
        .args(["--check", "index.ts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Perfect code style!"));
}

#[test]
fn test_check_mode_needs_formatting() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "good.ts", FORMATTED);
    write_file(temp.path(), "src/bad.ts", UNFORMATTED);

    asfmt(temp.path())
        .args(["-c", "."])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Code style issues found"))
        .stderr(predicate::str::contains("- 'src/bad.ts'"))
        .stderr(predicate::str::contains("good.ts").not());

    assert_eq!(
        fs::read_to_string(temp.path().join("src/bad.ts")).unwrap(),
        UNFORMATTED
    );
}

#[test]
fn test_quiet_check() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "bad.ts", UNFORMATTED);

    asfmt(temp.path())
        .args(["-c", "-q", "bad.ts"])
        .assert()
        .code(1)
        .stderr("");
}

#[test]
fn test_verbose_output() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "index.ts", FORMATTED);

    asfmt(temp.path())
        .args(["-v", "-w", "index.ts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration:"))
        .stderr(predicate::str::contains("index.ts unchanged"))
        .stderr(predicate::str::contains("Total time:"));
}

// ============================================================================
// Inputs
// ============================================================================

#[test]
fn test_directory_skips_node_modules_and_ignored() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "assembly/index.ts", UNFORMATTED);
    write_file(temp.path(), "assembly/gen/out.ts", UNFORMATTED);
    write_file(temp.path(), "node_modules/dep/index.ts", UNFORMATTED);
    write_file(temp.path(), ".asfmtignore", "gen/\n");

    asfmt(temp.path())
        .args(["-c", "assembly"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("assembly/index.ts"))
        .stderr(predicate::str::contains("out.ts").not())
        .stderr(predicate::str::contains("node_modules").not());
}

#[test]
fn test_glob_input() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "assembly/a.ts", FORMATTED);
    write_file(temp.path(), "assembly/nested/b.ts", UNFORMATTED);

    asfmt(temp.path())
        .args(["-c", "assembly/*.ts"])
        .assert()
        .success();

    asfmt(temp.path())
        .args(["-c", "assembly/**/*.ts"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("assembly/nested/b.ts"));
}

#[test]
fn test_brace_pattern_is_not_expanded() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "assembly/a/x.ts", FORMATTED);

    asfmt(temp.path())
        .args(["-c", "assembly/{a,b}/*.ts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("assembly/{a,b}"));
}

#[test]
fn test_no_files_found() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "readme.md", "# hi\n");

    asfmt(temp.path())
        .arg(".")
        .assert()
        .success()
        .stderr(predicate::str::contains("No AssemblyScript files found"));
}

#[test]
fn test_missing_input() {
    let temp = TempDir::new().unwrap();

    asfmt(temp.path())
        .arg("nonexistent.ts")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nonexistent.ts"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_project_config_file() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), ".asfmt.toml", "indent_size = 4\n");
    write_file(temp.path(), "src/index.ts", UNFORMATTED);

    asfmt(temp.path())
        .arg("src/index.ts")
        .assert()
        .success()
        .stdout(predicate::str::contains("\n    return a + b;\n"));
}

#[test]
fn test_flags_override_config_file() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), ".asfmt.toml", "indent_size = 4\n");
    write_file(temp.path(), "index.ts", "function f(): void { log(\"x\") }");

    asfmt(temp.path())
        .args(["--indent-size", "3", "--single-quote", "true", "index.ts"])
        .assert()
        .success()
        .stdout("function f(): void {\n   log('x');\n}\n");
}

#[test]
fn test_explicit_config_flag() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "ci.toml", "use_tabs = true\n");
    write_file(temp.path(), "index.ts", UNFORMATTED);

    asfmt(temp.path())
        .args(["--config", "ci.toml", "index.ts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n\treturn a + b;\n"));
}

#[test]
fn test_flags_disable_config_file_options() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        ".asfmt.toml",
        "use_tabs = true\nsingle_quote = true\n",
    );
    write_file(temp.path(), "index.ts", "function f(): void { log(\"x\") }");

    asfmt(temp.path())
        .args(["--use-tabs", "false", "--single-quote", "false", "index.ts"])
        .assert()
        .success()
        .stdout("function f(): void {\n  log(\"x\");\n}\n");
}

#[test]
fn test_env_config() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "index.ts", UNFORMATTED);

    asfmt(temp.path())
        .env("ASFMT_INDENT_SIZE", "8")
        .arg("index.ts")
        .assert()
        .success()
        .stdout(predicate::str::contains("\n        return a + b;\n"));
}

#[test]
fn test_invalid_config_file() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), ".asfmt.toml", "tab_width = 4\n");
    write_file(temp.path(), "index.ts", FORMATTED);

    asfmt(temp.path())
        .arg("index.ts")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to resolve configuration"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_syntax_error_reported_and_others_processed() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "bad.ts", "@lazy\nlet x = ;");
    write_file(temp.path(), "good.ts", UNFORMATTED);

    asfmt(temp.path())
        .args(["-w", "."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[error] bad.ts"))
        .stderr(predicate::str::contains("2:9"));

    // The failing file does not stop the rest
    assert_eq!(fs::read_to_string(temp.path().join("good.ts")).unwrap(), FORMATTED);
    assert_eq!(
        fs::read_to_string(temp.path().join("bad.ts")).unwrap(),
        "@lazy\nlet x = ;"
    );
}

#[test]
fn test_write_conflicts_with_check() {
    let temp = TempDir::new().unwrap();

    asfmt(temp.path())
        .args(["-w", "-c", "index.ts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
