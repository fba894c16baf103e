use std::fmt;

use crate::position::{Position, Range};

/// Token kinds produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    VersionKeyword,
    WorkflowKeyword,
    ActionKeyword,
    OnKeyword,
    ResolvesKeyword,
    UsesKeyword,
    NeedsKeyword,
    RunsKeyword,
    ArgsKeyword,
    EnvKeyword,
    SecretsKeyword,

    // Punctuation
    Equal,
    Comma,
    LeftCurlyBracket,
    RightCurlyBracket,
    LeftSquareBracket,
    RightSquareBracket,

    // Literals
    Identifier,
    IntegerLiteral,
    StringLiteral,

    /// Placeholder synthesized by the parser for a token the input lacks.
    Missing,
    /// Zero-width token that ends every scan.
    EndOfFile,
}

impl TokenKind {
    /// Keyword kind for an identifier-shaped word, if it is one.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "version" => Self::VersionKeyword,
            "workflow" => Self::WorkflowKeyword,
            "action" => Self::ActionKeyword,
            "on" => Self::OnKeyword,
            "resolves" => Self::ResolvesKeyword,
            "uses" => Self::UsesKeyword,
            "needs" => Self::NeedsKeyword,
            "runs" => Self::RunsKeyword,
            "args" => Self::ArgsKeyword,
            "env" => Self::EnvKeyword,
            "secrets" => Self::SecretsKeyword,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this kind starts a block property.
    #[must_use]
    pub const fn is_property_keyword(self) -> bool {
        matches!(
            self,
            Self::OnKeyword
                | Self::ResolvesKeyword
                | Self::UsesKeyword
                | Self::NeedsKeyword
                | Self::RunsKeyword
                | Self::ArgsKeyword
                | Self::EnvKeyword
                | Self::SecretsKeyword
        )
    }

    /// Human-readable description used in diagnostics.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::VersionKeyword => "'version'",
            Self::WorkflowKeyword => "'workflow'",
            Self::ActionKeyword => "'action'",
            Self::OnKeyword => "'on'",
            Self::ResolvesKeyword => "'resolves'",
            Self::UsesKeyword => "'uses'",
            Self::NeedsKeyword => "'needs'",
            Self::RunsKeyword => "'runs'",
            Self::ArgsKeyword => "'args'",
            Self::EnvKeyword => "'env'",
            Self::SecretsKeyword => "'secrets'",
            Self::Equal => "'='",
            Self::Comma => "','",
            Self::LeftCurlyBracket => "'{'",
            Self::RightCurlyBracket => "'}'",
            Self::LeftSquareBracket => "'['",
            Self::RightSquareBracket => "']'",
            Self::Identifier => "identifier",
            Self::IntegerLiteral => "integer literal",
            Self::StringLiteral => "string literal",
            Self::Missing => "missing token",
            Self::EndOfFile => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Classifies a fragment of trivia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaKind {
    /// Spaces, tabs, lone carriage returns, byte order mark.
    Whitespace,
    /// `\n` or `\r\n`.
    Newline,
    /// `# ...` or `// ...`, without the line break.
    Comment,
    /// A character the scanner could not recognize.
    Skipped,
}

/// Source text that carries no meaning for the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
    pub range: Range,
}

/// A single token with its kind, exact text, trivia, and range.
///
/// `range` covers `text` only; trivia ranges sit before and after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub range: Range,
    pub leading_trivia: Vec<Trivia>,
    pub trailing_trivia: Vec<Trivia>,
}

impl Token {
    /// A zero-width placeholder for a token the input did not contain.
    #[must_use]
    pub const fn missing(position: Position) -> Self {
        Self {
            kind: TokenKind::Missing,
            text: String::new(),
            range: Range::empty_at(position),
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.kind == TokenKind::Missing
    }

    /// Range from the first leading trivia to the last trailing trivia.
    #[must_use]
    pub fn full_range(&self) -> Range {
        Range::combine(
            self.leading_trivia
                .iter()
                .map(|t| t.range)
                .chain(std::iter::once(self.range))
                .chain(self.trailing_trivia.iter().map(|t| t.range)),
        )
    }

    /// Append the token's exact source text, trivia included, to `out`.
    pub fn write_full_text(&self, out: &mut String) {
        for trivia in &self.leading_trivia {
            out.push_str(&trivia.text);
        }
        out.push_str(&self.text);
        for trivia in &self.trailing_trivia {
            out.push_str(&trivia.text);
        }
    }

    /// Decoded value of a string literal.
    ///
    /// Strips the surrounding quotes and decodes supported escapes.
    /// Unsupported escapes are kept verbatim; the scanner has already
    /// reported them. For any other kind the raw text is returned.
    #[must_use]
    pub fn string_value(&self) -> String {
        if self.kind != TokenKind::StringLiteral {
            return self.text.clone();
        }

        let inner = self.text.strip_prefix('"').unwrap_or(&self.text);
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '"' => break,
                '\\' => match chars.next() {
                    Some(escaped) => match unescape(escaped) {
                        Some(decoded) => value.push(decoded),
                        None => {
                            value.push('\\');
                            value.push(escaped);
                        }
                    },
                    None => value.push('\\'),
                },
                _ => value.push(c),
            }
        }
        value
    }
}

/// Decoded character for the escape `\c`, or `None` if `c` is not escapable.
#[must_use]
pub const fn unescape(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        '/' => Some('/'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    }
}
