//! lua-parser
//!
//! Parses Lua 5.2 files, prints each syntax tree as a branch diagram and
//! runs the assignment walker over it.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use lua_parser::Driver;

/// Lua 5.2 AST printer
#[derive(Parser, Debug)]
#[command(name = "lua-parser")]
#[command(version)]
#[command(about = "Parse Lua 5.2 files and print their syntax trees")]
struct Cli {
    /// Lua source files, processed in the given order
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut driver = Driver::new(stdout.lock());
    let summary = driver.run(&cli.files).context("lua-parser aborted")?;

    for failure in &summary.failures {
        eprintln!("{}", failure);
    }

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
