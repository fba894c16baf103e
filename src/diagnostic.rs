//! Diagnostics reported by the scanner, parser, and binder.
//!
//! Every stage appends to its own [`DiagnosticBag`]. The bags are merged
//! and sorted by source position once the whole pipeline has run.

use std::fmt;

use crate::position::Range;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The document is invalid.
    Error,
    /// The document is valid but likely not what the author meant.
    Warning,
}

impl Severity {
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// The stage a diagnostic code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Lexical,
    Syntactic,
    Semantic,
}

/// Enumerates every problem the linter can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Lexical
    UnrecognizableCharacter,
    UnterminatedStringLiteral,
    UnsupportedEscapeSequence,
    UnsupportedCharacter,

    // Syntactic
    MissingToken,
    UnexpectedToken,

    // Semantic
    EmptyName,
    DuplicateName,
    DuplicateProperty,
    MissingRequiredProperty,
    PropertyNotAllowed,
    UnknownReference,
    CircularDependency,
    UnsupportedVersion,
    MultipleVersions,
    MisplacedVersion,
    DuplicateEnvironmentVariable,
    ReservedEnvironmentVariable,
    DuplicateSecret,
}

impl DiagnosticCode {
    #[must_use]
    pub const fn category(self) -> DiagnosticCategory {
        match self {
            Self::UnrecognizableCharacter
            | Self::UnterminatedStringLiteral
            | Self::UnsupportedEscapeSequence
            | Self::UnsupportedCharacter => DiagnosticCategory::Lexical,
            Self::MissingToken | Self::UnexpectedToken => DiagnosticCategory::Syntactic,
            Self::EmptyName
            | Self::DuplicateName
            | Self::DuplicateProperty
            | Self::MissingRequiredProperty
            | Self::PropertyNotAllowed
            | Self::UnknownReference
            | Self::CircularDependency
            | Self::UnsupportedVersion
            | Self::MultipleVersions
            | Self::MisplacedVersion
            | Self::DuplicateEnvironmentVariable
            | Self::ReservedEnvironmentVariable
            | Self::DuplicateSecret => DiagnosticCategory::Semantic,
        }
    }

    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::DuplicateSecret => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable kebab-case identifier, suitable for machine output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnrecognizableCharacter => "unrecognizable-character",
            Self::UnterminatedStringLiteral => "unterminated-string-literal",
            Self::UnsupportedEscapeSequence => "unsupported-escape-sequence",
            Self::UnsupportedCharacter => "unsupported-character",
            Self::MissingToken => "missing-token",
            Self::UnexpectedToken => "unexpected-token",
            Self::EmptyName => "empty-name",
            Self::DuplicateName => "duplicate-name",
            Self::DuplicateProperty => "duplicate-property",
            Self::MissingRequiredProperty => "missing-required-property",
            Self::PropertyNotAllowed => "property-not-allowed",
            Self::UnknownReference => "unknown-reference",
            Self::CircularDependency => "circular-dependency",
            Self::UnsupportedVersion => "unsupported-version",
            Self::MultipleVersions => "multiple-versions",
            Self::MisplacedVersion => "misplaced-version",
            Self::DuplicateEnvironmentVariable => "duplicate-environment-variable",
            Self::ReservedEnvironmentVariable => "reserved-environment-variable",
            Self::DuplicateSecret => "duplicate-secret",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem anchored to a source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: Range,
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.range.start.line, self.range.start.column
        )
    }
}

/// Append-only collection of diagnostics for one stage of one lint run.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Move every diagnostic of `other` to the end of this bag.
    pub fn extend(&mut self, other: Self) {
        self.items.extend(other.items);
    }

    /// Finish the bag: order by range start, then range end. The sort is
    /// stable, so equal ranges keep their insertion order.
    #[must_use]
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.items
            .sort_by(|a, b| (a.range.start, a.range.end).cmp(&(b.range.start, b.range.end)));
        self.items
    }

    fn report(&mut self, code: DiagnosticCode, range: Range, message: String) {
        log::trace!(code = code.as_str(), range:% = range; "{message}");
        self.items.push(Diagnostic {
            range,
            code,
            severity: code.severity(),
            message,
        });
    }

    pub fn unrecognizable_character(&mut self, character: char, range: Range) {
        self.report(
            DiagnosticCode::UnrecognizableCharacter,
            range,
            format!("the character '{}' is unrecognizable", character.escape_debug()),
        );
    }

    pub fn unterminated_string_literal(&mut self, range: Range) {
        self.report(
            DiagnosticCode::UnterminatedStringLiteral,
            range,
            "this string literal must end with double quotes".to_string(),
        );
    }

    pub fn unsupported_escape_sequence(&mut self, character: char, range: Range) {
        self.report(
            DiagnosticCode::UnsupportedEscapeSequence,
            range,
            format!(
                "the character '{}' is not a supported escape sequence",
                character.escape_debug()
            ),
        );
    }

    pub fn unsupported_character(&mut self, character: char, range: Range) {
        self.report(
            DiagnosticCode::UnsupportedCharacter,
            range,
            format!(
                "the character '{}' is not allowed in a string literal",
                character.escape_debug()
            ),
        );
    }

    pub fn missing_token(&mut self, expected: &str, found: &str, range: Range) {
        self.report(
            DiagnosticCode::MissingToken,
            range,
            format!("expected {expected}, found {found}"),
        );
    }

    pub fn unexpected_token(&mut self, found: &str, range: Range) {
        self.report(
            DiagnosticCode::UnexpectedToken,
            range,
            format!("unexpected {found}"),
        );
    }

    pub fn empty_name(&mut self, block: &str, range: Range) {
        self.report(
            DiagnosticCode::EmptyName,
            range,
            format!("the name of a {block} must not be empty"),
        );
    }

    pub fn duplicate_name(&mut self, block: &str, name: &str, range: Range) {
        self.report(
            DiagnosticCode::DuplicateName,
            range,
            format!("a {block} named '{name}' is already defined"),
        );
    }

    pub fn duplicate_property(&mut self, key: &str, range: Range) {
        self.report(
            DiagnosticCode::DuplicateProperty,
            range,
            format!("property '{key}' is already defined in this block"),
        );
    }

    pub fn missing_required_property(&mut self, block: &str, key: &str, range: Range) {
        self.report(
            DiagnosticCode::MissingRequiredProperty,
            range,
            format!("this {block} must contain a '{key}' property"),
        );
    }

    pub fn property_not_allowed(&mut self, key: &str, block: &str, range: Range) {
        self.report(
            DiagnosticCode::PropertyNotAllowed,
            range,
            format!("property '{key}' is not allowed in a {block}"),
        );
    }

    pub fn unknown_reference(&mut self, name: &str, range: Range) {
        self.report(
            DiagnosticCode::UnknownReference,
            range,
            format!("no action named '{name}' is defined"),
        );
    }

    pub fn circular_dependency(&mut self, name: &str, range: Range) {
        self.report(
            DiagnosticCode::CircularDependency,
            range,
            format!("depending on '{name}' creates a circular dependency"),
        );
    }

    pub fn unsupported_version(&mut self, value: &str, range: Range) {
        self.report(
            DiagnosticCode::UnsupportedVersion,
            range,
            format!("version '{value}' is not supported, expected '0'"),
        );
    }

    pub fn multiple_versions(&mut self, range: Range) {
        self.report(
            DiagnosticCode::MultipleVersions,
            range,
            "a document may declare its version only once".to_string(),
        );
    }

    pub fn misplaced_version(&mut self, range: Range) {
        self.report(
            DiagnosticCode::MisplacedVersion,
            range,
            "the version must be declared before any block".to_string(),
        );
    }

    pub fn duplicate_environment_variable(&mut self, name: &str, range: Range) {
        self.report(
            DiagnosticCode::DuplicateEnvironmentVariable,
            range,
            format!("environment variable '{name}' is already defined"),
        );
    }

    pub fn reserved_environment_variable(&mut self, name: &str, range: Range) {
        self.report(
            DiagnosticCode::ReservedEnvironmentVariable,
            range,
            format!("environment variable '{name}' uses the reserved 'GITHUB_' prefix"),
        );
    }

    pub fn duplicate_secret(&mut self, name: &str, range: Range) {
        self.report(
            DiagnosticCode::DuplicateSecret,
            range,
            format!("secret '{name}' is listed more than once"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn at(line: usize, start: usize, end: usize) -> Range {
        Range::new(Position::new(line, start), Position::new(line, end))
    }

    #[test]
    fn sorted_by_start_then_end_then_insertion() {
        let mut bag = DiagnosticBag::new();
        bag.duplicate_secret("B", at(2, 0, 3));
        bag.unrecognizable_character('%', at(0, 4, 5));
        bag.unexpected_token("'='", at(0, 4, 9));
        bag.multiple_versions(at(0, 4, 5));

        let sorted = bag.into_sorted();
        let codes: Vec<_> = sorted.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::UnrecognizableCharacter,
                DiagnosticCode::MultipleVersions,
                DiagnosticCode::UnexpectedToken,
                DiagnosticCode::DuplicateSecret,
            ]
        );
    }

    #[test]
    fn severity_follows_code() {
        let mut bag = DiagnosticBag::new();
        bag.duplicate_secret("TOKEN", at(0, 0, 7));
        bag.unknown_reference("build", at(1, 0, 7));
        let items: Vec<_> = bag.iter().collect();
        assert_eq!(items[0].severity, Severity::Warning);
        assert_eq!(items[1].severity, Severity::Error);
    }

    #[test]
    fn control_characters_are_escaped_in_messages() {
        let mut bag = DiagnosticBag::new();
        bag.unsupported_character('\u{0}', at(0, 0, 1));
        let message = &bag.iter().next().unwrap().message;
        assert!(message.contains("\\0"), "{message}");
    }

    #[test]
    fn categories() {
        assert_eq!(
            DiagnosticCode::UnsupportedEscapeSequence.category(),
            DiagnosticCategory::Lexical
        );
        assert_eq!(
            DiagnosticCode::MissingToken.category(),
            DiagnosticCategory::Syntactic
        );
        assert_eq!(
            DiagnosticCode::CircularDependency.category(),
            DiagnosticCategory::Semantic
        );
    }

    #[test]
    fn display_includes_location() {
        let mut bag = DiagnosticBag::new();
        bag.unrecognizable_character('/', at(1, 0, 1));
        let diagnostic = bag.into_sorted().remove(0);
        assert_eq!(
            diagnostic.to_string(),
            "the character '/' is unrecognizable at line 1, column 0"
        );
    }
}
