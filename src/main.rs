//! `lox` — standalone binary.
//!
//! Thin wrapper around [`lox::run_cli`]: all pipeline and CLI logic lives
//! in the library crate so it stays testable without spawning a process.

use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let code = lox::run_cli(&args);
    process::exit(code);
}
