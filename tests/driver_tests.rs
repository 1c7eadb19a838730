use std::fs;
use std::path::PathBuf;

use clap::Parser;

use yadfa::{execute, Config};

fn write_fixture(name: &str, source: &str) -> String {
    let path: PathBuf = std::env::temp_dir().join(name);
    fs::write(&path, source).expect("fixture is writable");
    path.to_string_lossy().into_owned()
}

fn config_from(args: &[&str]) -> Config {
    Config::try_parse_from(args).expect("arguments parse")
}

#[test]
fn raw_cfg_command_succeeds() {
    let path = write_fixture("yadfa_raw_cfg.ir", "var a int32\nmov a 4\n");
    let config = config_from(&["yadfa", "--raw-cfg", &path]);

    assert_eq!(execute(config), 0);
}

#[test]
fn use_def_command_succeeds() {
    let path = write_fixture("yadfa_use_def.ir", "var a int32\nmov a 4\npush a\n");
    let config = config_from(&["yadfa", "--use-def", &path]);

    assert_eq!(execute(config), 0);
}

#[test]
fn dot_cfg_command_succeeds() {
    let path = write_fixture("yadfa_dot_cfg.ir", "var a int32\nmov a 1\npush a\n");
    let config = config_from(&["yadfa", "--dot-cfg", &path]);

    assert_eq!(execute(config), 0);
}

#[test]
fn optimize_command_succeeds() {
    let path = write_fixture(
        "yadfa_optimize.ir",
        "var a int32\nmov a 1\nvar b int32\nmov b 2\npush a\n",
    );
    let config = config_from(&["yadfa", "--optimize", &path]);

    assert_eq!(execute(config), 0);
}

#[test]
fn dump_x86_command_succeeds() {
    let path = write_fixture("yadfa_dump_x86.ir", "var a int32\nmov a 42\n");
    let config = config_from(&["yadfa", "--dump-x86", &path]);

    assert_eq!(execute(config), 0);
}

#[test]
fn missing_file_fails() {
    let config = config_from(&["yadfa", "--raw-cfg", "/no/such/file.ir"]);

    assert_eq!(execute(config), -1);
}

#[test]
fn parse_errors_fail() {
    let path = write_fixture("yadfa_bad_opcode.ir", "nop\nfrobnicate a\n");
    let config = config_from(&["yadfa", "--raw-cfg", &path]);

    assert_eq!(execute(config), -1);
}

#[test]
fn unknown_analysis_kind_fails() {
    let path = write_fixture("yadfa_analysis_kind.ir", "nop\n");
    let config = config_from(&["yadfa", "--analysis", "reaching", &path]);

    assert_eq!(execute(config), -1);
}

#[test]
fn codegen_errors_fail() {
    let path = write_fixture("yadfa_bad_label.ir", "nop\njmp nowhere\n");
    let config = config_from(&["yadfa", "--dump-x86", &path]);

    assert_eq!(execute(config), -1);
}

#[test]
fn commands_are_mutually_exclusive() {
    assert!(Config::try_parse_from(["yadfa", "--raw-cfg", "a", "--use-def", "b"]).is_err());
    assert!(Config::try_parse_from(["yadfa"]).is_err());
}
