use crate::diagnostic::DiagnosticBag;
use crate::position::{Position, Range};
use crate::token::{Token, TokenKind, Trivia, TriviaKind, unescape};

/// Scan source text into tokens.
///
/// Never fails: lexical problems are reported to the returned bag and
/// the scan carries on. The result always ends with exactly one
/// [`TokenKind::EndOfFile`] token, and the text of every token plus its
/// trivia reproduces `text` exactly.
#[must_use]
pub fn scan(text: &str) -> (Vec<Token>, DiagnosticBag) {
    let scanner = Scanner::new(text);
    scanner.scan()
}

struct Scanner {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    diagnostics: DiagnosticBag,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 0,
            col: 0,
            diagnostics: DiagnosticBag::new(),
        }
    }

    fn scan(mut self) -> (Vec<Token>, DiagnosticBag) {
        let mut tokens = Vec::new();

        loop {
            let leading_trivia = self.scan_trivia(false);

            if self.peek().is_none() {
                let position = self.position();
                tokens.push(Token {
                    kind: TokenKind::EndOfFile,
                    text: String::new(),
                    range: Range::empty_at(position),
                    leading_trivia,
                    trailing_trivia: Vec::new(),
                });
                break;
            }

            let start = self.position();
            let start_pos = self.pos;
            let kind = self.scan_token_kind();
            let text = self.slice(start_pos);
            let range = Range::new(start, self.position());
            let trailing_trivia = self.scan_trivia(true);

            tokens.push(Token {
                kind,
                text,
                range,
                leading_trivia,
                trailing_trivia,
            });
        }

        log::debug!(
            tokens = tokens.len(),
            diagnostics = self.diagnostics.len();
            "scanned document"
        );

        (tokens, self.diagnostics)
    }

    const fn position(&self) -> Position {
        Position::new(self.line, self.col)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(&c) = self.input.get(self.pos) {
            if c == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.pos].iter().collect()
    }

    fn at_newline(&self) -> bool {
        match self.peek() {
            Some('\n') => true,
            Some('\r') => self.peek_at(1) == Some('\n'),
            _ => false,
        }
    }

    /// Collect trivia up to the next token start.
    ///
    /// In trailing mode the run stops right after the first line break.
    fn scan_trivia(&mut self, trailing: bool) -> Vec<Trivia> {
        let mut trivia = Vec::new();

        while let Some(c) = self.peek() {
            let start = self.position();
            let start_pos = self.pos;

            let kind = if self.at_newline() {
                if c == '\r' {
                    self.advance();
                }
                self.advance();
                TriviaKind::Newline
            } else if is_whitespace(c) {
                while self.peek().is_some_and(is_whitespace) && !self.at_newline() {
                    self.advance();
                }
                TriviaKind::Whitespace
            } else if c == '#' || (c == '/' && self.peek_at(1) == Some('/')) {
                while self.peek().is_some() && !self.at_newline() {
                    self.advance();
                }
                TriviaKind::Comment
            } else if can_start_token(c) {
                break;
            } else {
                self.advance();
                self.diagnostics
                    .unrecognizable_character(c, Range::new(start, self.position()));
                TriviaKind::Skipped
            };

            trivia.push(Trivia {
                kind,
                text: self.slice(start_pos),
                range: Range::new(start, self.position()),
            });

            if trailing && kind == TriviaKind::Newline {
                break;
            }
        }

        trivia
    }

    /// Consume one token. The caller guarantees the next character can
    /// start a token.
    fn scan_token_kind(&mut self) -> TokenKind {
        let Some(c) = self.peek() else {
            return TokenKind::EndOfFile;
        };

        let punctuation = match c {
            '=' => Some(TokenKind::Equal),
            ',' => Some(TokenKind::Comma),
            '{' => Some(TokenKind::LeftCurlyBracket),
            '}' => Some(TokenKind::RightCurlyBracket),
            '[' => Some(TokenKind::LeftSquareBracket),
            ']' => Some(TokenKind::RightSquareBracket),
            _ => None,
        };
        if let Some(kind) = punctuation {
            self.advance();
            return kind;
        }

        if c == '"' {
            self.scan_string();
            return TokenKind::StringLiteral;
        }

        if c.is_ascii_digit() {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            return TokenKind::IntegerLiteral;
        }

        let start = self.pos;
        while self.peek().is_some_and(is_identifier_part) {
            self.advance();
        }
        let word = self.slice(start);
        TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier)
    }

    fn scan_string(&mut self) {
        let start = self.position();
        self.advance(); // opening quote

        loop {
            let Some(c) = self.peek() else {
                self.report_unterminated(start);
                return;
            };

            if self.at_newline() {
                self.report_unterminated(start);
                return;
            }

            let char_start = self.position();
            self.advance();

            match c {
                '"' => return,
                '\\' => {
                    let Some(escaped) = self.peek() else {
                        continue;
                    };
                    if self.at_newline() {
                        continue;
                    }
                    self.advance();
                    if unescape(escaped).is_none() {
                        self.diagnostics.unsupported_escape_sequence(
                            escaped,
                            Range::new(char_start, self.position()),
                        );
                    }
                }
                c if c.is_control() => {
                    self.diagnostics
                        .unsupported_character(c, Range::new(char_start, self.position()));
                }
                _ => {}
            }
        }
    }

    fn report_unterminated(&mut self, start: Position) {
        self.diagnostics
            .unterminated_string_literal(Range::new(start, self.position()));
    }
}

const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\u{feff}')
}

const fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

const fn can_start_token(c: char) -> bool {
    matches!(c, '=' | ',' | '{' | '}' | '[' | ']' | '"')
        || c.is_ascii_digit()
        || is_identifier_start(c)
}
