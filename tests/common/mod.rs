#![allow(dead_code)]

use workflow_lint::{Diagnostic, DiagnosticCode, Position, Range, Token, lint};

/// Lint `input` and return the codes of the diagnostics, in order.
pub fn codes(input: &str) -> Vec<DiagnosticCode> {
    lint(input).into_iter().map(|d| d.code).collect()
}

/// Lint `input` and assert it produced exactly one diagnostic.
pub fn single(input: &str) -> Diagnostic {
    let mut diagnostics = lint(input);
    assert_eq!(
        diagnostics.len(),
        1,
        "expected one diagnostic for {input:?}, got {diagnostics:#?}"
    );
    diagnostics.remove(0)
}

pub fn range(start: (usize, usize), end: (usize, usize)) -> Range {
    Range::new(
        Position::new(start.0, start.1),
        Position::new(end.0, end.1),
    )
}

/// Reassemble the source text from tokens and their trivia.
pub fn full_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_full_text(&mut out);
    }
    out
}

/// Every range the scanner produced, in source order.
pub fn all_ranges(tokens: &[Token]) -> Vec<Range> {
    tokens
        .iter()
        .flat_map(|token| {
            token
                .leading_trivia
                .iter()
                .map(|t| t.range)
                .chain(std::iter::once(token.range))
                .chain(token.trailing_trivia.iter().map(|t| t.range))
        })
        .collect()
}

/// Position just past the last character of `text`.
pub fn end_of(text: &str) -> Position {
    let mut position = Position::default();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' || (c == '\r' && chars.peek() == Some(&'\n')) {
            if c == '\r' {
                chars.next();
            }
            position.line += 1;
            position.column = 0;
        } else {
            position.column += 1;
        }
    }
    position
}
