//! Per-file pipeline: load, lex, parse, print, walk
//!
//! Files are handled strictly one after another. Nothing but the output
//! writer survives from one file to the next, so a failure in one file
//! cannot leak into another.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser;
use crate::frontend::token_types::LuaTypeNames;
use crate::frontend::walker::{AssignmentWalker, SemanticWalker};
use crate::printer::render_ast;
use crate::utils::{Error, Result};

/// How the driver reacts to a failing file
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverOptions {
    /// Stop after the first failed file instead of reporting and moving on
    pub fail_fast: bool,
}

/// A file whose pipeline did not complete
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error.span() {
            Some(span) => write!(
                f,
                "{}:{}: {}: {}",
                self.path.display(),
                span,
                self.error.kind(),
                self.error
            ),
            None => write!(f, "{}: {}: {}", self.path.display(), self.error.kind(), self.error),
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files that went through every stage
    pub processed: usize,
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs the pipeline over a list of files, writing diagrams to `out`
pub struct Driver<W: Write> {
    out: W,
    options: DriverOptions,
}

impl<W: Write> Driver<W> {
    pub fn new(out: W) -> Self {
        Self::with_options(out, DriverOptions::default())
    }

    pub fn with_options(out: W, options: DriverOptions) -> Self {
        Self { out, options }
    }

    /// Give back the output writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Process `paths` in order.
    ///
    /// Per-file lexical, syntax, semantic and read errors are collected in
    /// the summary; a missing input list, an unknown token type or a
    /// broken output stream abort the run.
    pub fn run<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<RunSummary> {
        if paths.is_empty() {
            return Err(Error::NoInputFiles);
        }

        let mut summary = RunSummary::default();
        for path in paths {
            let path = path.as_ref();
            match self.process_file(path) {
                Ok(()) => summary.processed += 1,
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    log::warn!("skipping `{}`: {}", path.display(), error);
                    summary.failures.push(FileFailure {
                        path: path.to_path_buf(),
                        error,
                    });
                    if self.options.fail_fast {
                        break;
                    }
                }
            }
        }
        Ok(summary)
    }

    /// Run every stage for one file
    pub fn process_file(&mut self, path: &Path) -> Result<()> {
        let source = load_source(path)?;

        let tokens = Lexer::new(&source).tokenize()?;
        log::debug!("{}: {} tokens", path.display(), tokens.len());

        let root = Parser::new(tokens).parse_chunk()?;
        log::debug!(
            "{}: {} nodes, depth {}",
            path.display(),
            root.node_count(),
            root.depth()
        );

        let tree = render_ast(Some(&root), &LuaTypeNames)?;
        write!(self.out, "Parsing `{}`...\n\n{}\n\n", path.display(), tree)?;
        self.out.flush()?;

        let mut walker = AssignmentWalker::new();
        walker.walk(&root)?;
        log::debug!("{}: {} assignment(s)", path.display(), walker.reports().len());
        Ok(())
    }
}

fn load_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
