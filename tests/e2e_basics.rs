//! End-to-end scenarios driving the whole pipeline (scan -> parse ->
//! interpret) from source text to captured standard output.

mod common;
use common::run;

#[test]
fn scenario_01_arithmetic_precedence() {
    let (out, had_error, result) = run("print 1 + 2 * 3;");
    assert!(!had_error);
    result.unwrap();
    assert_eq!(out, "7\n");
}

#[test]
fn scenario_02_variable_addition() {
    let (out, had_error, result) = run("var a = 1; var b = 2; print a + b;");
    assert!(!had_error);
    result.unwrap();
    assert_eq!(out, "3\n");
}

#[test]
fn scenario_03_string_concatenation() {
    let (out, had_error, result) = run(r#"var a = "hi "; print a + "there";"#);
    assert!(!had_error);
    result.unwrap();
    assert_eq!(out, "hi there\n");
}

#[test]
fn scenario_04_if_else() {
    let (out, had_error, result) = run(r#"var x = 0; if (x == 0) print "z"; else print "nz";"#);
    assert!(!had_error);
    result.unwrap();
    assert_eq!(out, "z\n");
}

#[test]
fn scenario_05_while_loop() {
    let (out, had_error, result) = run("var i = 0; while (i < 3) { print i; i = i + 1; }");
    assert!(!had_error);
    result.unwrap();
    assert_eq!(out, "0\n1\n2\n");
}

#[test]
fn scenario_06_for_loop() {
    let (out, had_error, result) = run("for (var i = 0; i < 3; i = i + 1) print i;");
    assert!(!had_error);
    result.unwrap();
    assert_eq!(out, "0\n1\n2\n");
}

#[test]
fn scenario_07_logical_operators_return_values() {
    let (out, had_error, result) = run(r#"print nil or "x"; print false and "y"; print "a" and "b";"#);
    assert!(!had_error);
    result.unwrap();
    assert_eq!(out, "x\nfalse\nb\n");
}

#[test]
fn scenario_08_nested_block_scoping() {
    let (out, had_error, result) = run("{ var a = 1; { var a = 2; print a; } print a; }");
    assert!(!had_error);
    result.unwrap();
    assert_eq!(out, "2\n1\n");
}
