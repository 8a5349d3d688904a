//! Drives the CLI surface (`lox::run_file`, `lox::run_cli`) rather than the
//! scan/parse/interpret pipeline directly, exercising the exit-code contract
//! against real files on disk.

use std::io::Write;

use lox::{EXIT_DATA_ERROR, EXIT_OK, EXIT_SOFTWARE, EXIT_USAGE};

fn script_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp script file");
    write!(file, "{contents}").expect("write temp script file");
    file
}

#[test]
fn well_formed_program_exits_ok() {
    let file = script_file("print 1 + 1;");
    let code = lox::run_file(file.path().to_str().unwrap());
    assert_eq!(code, EXIT_OK);
}

#[test]
fn parse_error_exits_with_data_error_code() {
    let file = script_file("var = 3;");
    let code = lox::run_file(file.path().to_str().unwrap());
    assert_eq!(code, EXIT_DATA_ERROR);
}

#[test]
fn runtime_error_exits_with_software_error_code() {
    let file = script_file("a = 3;");
    let code = lox::run_file(file.path().to_str().unwrap());
    assert_eq!(code, EXIT_SOFTWARE);
}

#[test]
fn missing_file_exits_with_data_error_code() {
    let code = lox::run_file("/no/such/path/does-not-exist.lox");
    assert_eq!(code, EXIT_DATA_ERROR);
}

#[test]
fn too_many_arguments_is_a_usage_error() {
    let code = lox::run_cli(&["a.lox".to_string(), "b.lox".to_string()]);
    assert_eq!(code, EXIT_USAGE);
}
