//! End-to-end driver tests.
//!
//! The compile-and-run scenarios need a native x86_64 GNU toolchain
//! (`as` and `ld`); they are skipped silently elsewhere so the suite
//! stays green on other hosts.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn olangc() -> Command {
    Command::cargo_bin("olangc").expect("binary built")
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("write source");
    path
}

fn have_native_toolchain() -> bool {
    cfg!(all(target_os = "linux", target_arch = "x86_64"))
        && Command::new("as").arg("--version").output().is_ok()
        && Command::new("ld").arg("--version").output().is_ok()
}

/// Build `source` and return the executable's exit status.
fn compile_and_run(source: &str) -> i32 {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "main.ol", source);
    let bin = dir.path().join("prog");

    olangc()
        .arg("-o")
        .arg(&bin)
        .arg(&src)
        .assert()
        .success();

    let status = Command::new(&bin).status().expect("run compiled binary");
    status.code().expect("exit code")
}

#[test]
fn no_arguments_prints_usage() {
    olangc()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn file_without_action_prints_usage() {
    olangc()
        .arg("whatever.ol")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn missing_file_is_reported() {
    olangc()
        .args(["--dump-tokens", "does-not-exist.ol"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not open file"));
}

#[test]
fn dump_tokens() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "main.ol", "fn main(): u32 { return 69 }\n");

    olangc()
        .arg("--dump-tokens")
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::contains(":1:1: <fn>"))
        .stdout(predicate::str::contains(":1:4: <identifier>"))
        .stdout(predicate::str::contains(":1:18: <return>"))
        .stdout(predicate::str::contains(":1:25: <number>"))
        .stdout(predicate::str::contains("<EOF>"));
}

#[test]
fn dump_ast() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "main.ol", "fn main(): u32 { return 69 }\n");

    olangc()
        .arg("--dump-ast")
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::contains("Translation_Unit"))
        .stdout(predicate::str::contains(
            "Function_Definition <name:main> <return:u32>",
        ))
        .stdout(predicate::str::contains("Literal <kind:u32> <value:69>"));
}

#[test]
fn syntax_error_has_location_line_and_caret() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "bad.ol", "fn main(): u32 {\nreturn }\n}\n");

    olangc()
        .arg("--dump-ast")
        .arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            ":2:8: syntax error: got '}' but expected 'expression'",
        ))
        .stderr(predicate::str::contains("return }"))
        .stderr(predicate::str::contains("       ^"));
}

#[test]
fn semantic_error_is_reported() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "bad.ol", "fn main(): u32 { return missing }\n");

    olangc()
        .arg("--dump-ast")
        .arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "semantic error: undefined name 'missing'",
        ));
}

#[test]
fn save_temps_keeps_the_assembly() {
    if !have_native_toolchain() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "main.ol", "fn main(): u32 { return 69 }\n");
    let bin = dir.path().join("prog");

    olangc()
        .arg("-o")
        .arg(&bin)
        .arg("--save-temps")
        .arg(&src)
        .assert()
        .success();

    let asm_path = dir.path().join("prog.s");
    let obj_path = dir.path().join("prog.o");
    assert!(asm_path.exists());
    assert!(obj_path.exists());
    assert!(Path::new(&bin).exists());

    let asm = fs::read_to_string(asm_path).unwrap();
    assert!(asm.contains(".globl _start"), "{asm}");
    assert!(asm.contains("call main"), "{asm}");
}

#[test]
fn temps_are_removed_by_default() {
    if !have_native_toolchain() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "main.ol", "fn main(): u32 { return 0 }\n");
    let bin = dir.path().join("prog");

    olangc().arg("-o").arg(&bin).arg(&src).assert().success();

    assert!(!dir.path().join("prog.s").exists());
    assert!(!dir.path().join("prog.o").exists());
    assert!(Path::new(&bin).exists());
}

#[test]
fn scenario_minimal_exit() {
    if !have_native_toolchain() {
        return;
    }
    assert_eq!(compile_and_run("fn main(): u32 { return 69 }\n"), 69);
}

#[test]
fn scenario_arithmetic_precedence() {
    if !have_native_toolchain() {
        return;
    }
    assert_eq!(
        compile_and_run("fn main(): u32 { return (1+2*3) - (8 - (3+1)/2) }\n"),
        1
    );
}

#[test]
fn scenario_if_else() {
    if !have_native_toolchain() {
        return;
    }
    assert_eq!(
        compile_and_run("fn main(): u32 { if 1 == 1 { return 3 } else { return 4 } }\n"),
        3
    );
    assert_eq!(
        compile_and_run("fn main(): u32 { if 1 == 2 { return 3 } else { return 4 } }\n"),
        4
    );
}

#[test]
fn scenario_local_variable() {
    if !have_native_toolchain() {
        return;
    }
    assert_eq!(
        compile_and_run("fn main(): u32 {\nvar x: u32 = 40\nx = x + 2\nreturn x\n}\n"),
        42
    );
}

#[test]
fn scenario_recursion() {
    if !have_native_toolchain() {
        return;
    }
    let source = "\
fn fact(n: u32): u32 {
    if n == 0 {
        return 1
    } else {
        return n * fact(n - 1)
    }
}

fn main(): u32 {
    return fact(5)
}
";
    assert_eq!(compile_and_run(source), 120);
}

#[test]
fn scenario_while_loop() {
    if !have_native_toolchain() {
        return;
    }
    let source = "\
fn main(): u32 {
    var i: u32 = 0
    var acc: u32 = 0
    while i < 10 {
        i = i + 1
        acc = acc + i
    }
    return acc
}
";
    assert_eq!(compile_and_run(source), 55);
}

#[test]
fn scenario_short_circuit() {
    if !have_native_toolchain() {
        return;
    }
    // boom() never terminates; the program only exits cleanly when the
    // right-hand sides are skipped.
    let source = "\
fn boom(n: u32): u32 {
    return boom(n + 1)
}

fn main(): u32 {
    var a: u32 = 0 && boom(1)
    var b: u32 = 1 || boom(1)
    return a * 100 + b
}
";
    assert_eq!(compile_and_run(source), 1);
}

#[test]
fn scenario_comparisons_feed_conditions() {
    if !have_native_toolchain() {
        return;
    }
    let source = "\
fn max(a: u32, b: u32): u32 {
    if a > b {
        return a
    }
    return b
}

fn main(): u32 {
    return max(11, 31)
}
";
    assert_eq!(compile_and_run(source), 31);
}
