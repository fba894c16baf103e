//! Linter for the workflow description language.
//!
//! Documents are made of `version`, `workflow` and `action` blocks whose
//! properties hold strings, arrays of strings, or objects. Linting runs
//! three stages over the text and collects every problem they find:
//!
//! 1. [`scan`] turns text into tokens, keeping whitespace and comments as
//!    trivia so that ranges point at exact characters.
//! 2. [`parse`] builds a syntax tree that keeps every token, recovering from
//!    malformed input with missing tokens and skipped tokens.
//! 3. [`bind`] builds a semantic tree over the syntax tree and checks
//!    names, properties, references and values.
//!
//! # Quick start
//!
//! ```
//! use workflow_lint::{DiagnosticCode, lint};
//!
//! let input = "workflow \"build\" {\n  on = \"push\"\n  resolves = [\"test\"]\n}\n";
//! let diagnostics = lint(input);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].code, DiagnosticCode::UnknownReference);
//! assert_eq!(diagnostics[0].range.start.line, 2);
//! ```
//!
//! ## Inspect the stages separately
//!
//! ```
//! use workflow_lint::{bind, parse, scan};
//!
//! let (tokens, _) = scan("action \"a\" {\n  uses = \"./a\"\n}\n");
//! let (document, _) = parse(tokens);
//! let (bound, diagnostics) = bind(&document);
//! assert!(diagnostics.is_empty());
//! assert_eq!(bound.actions[0].name.as_ref().map(|n| n.value.as_str()), Some("a"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod binder;
pub mod bound;
pub mod diagnostic;
pub mod parser;
pub mod position;
pub mod scanner;
pub mod syntax;
pub mod token;

use std::path::{Path, PathBuf};

pub use binder::bind;
pub use bound::{BoundDocument, BoundKind, BoundNode, BoundNodeVisitor, walk_children};
pub use diagnostic::{Diagnostic, DiagnosticBag, DiagnosticCategory, DiagnosticCode, Severity};
pub use parser::parse;
pub use position::{Position, Range};
pub use scanner::scan;
pub use syntax::{BlockKind, DocumentSyntax, PropertySyntax, SyntaxKind};
pub use token::{Token, TokenKind, Trivia, TriviaKind};

/// Unified error type for operations outside the lint pipeline itself.
///
/// Problems in a document are never errors; they are [`Diagnostic`]s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file could not be read.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lint a document and return every diagnostic, ordered by range.
///
/// Scanner diagnostics come first, then parser, then binder ones; the
/// sort is stable so diagnostics with equal ranges keep that order.
/// Calling this twice on the same text returns the same list.
#[must_use]
pub fn lint(text: &str) -> Vec<Diagnostic> {
    let (tokens, mut diagnostics) = scan(text);
    let (document, parse_diagnostics) = parse(tokens);
    diagnostics.extend(parse_diagnostics);
    let (_, bind_diagnostics) = bind(&document);
    diagnostics.extend(bind_diagnostics);

    log::debug!(diagnostics = diagnostics.len(); "lint finished");
    diagnostics.into_sorted()
}

/// Read a file and lint its contents.
pub fn lint_file(path: impl AsRef<Path>) -> Result<Vec<Diagnostic>, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(path:? = path, chars = text.chars().count(); "linting file");
    Ok(lint(&text))
}
