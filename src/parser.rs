use std::iter::Peekable;
use std::vec::IntoIter;

use crate::diagnostic::DiagnosticBag;
use crate::position::{Position, Range};
use crate::syntax::{
    ArrayItemSyntax, ArrayPropertySyntax, BlockSyntax, DocumentSyntax, ObjectMemberSyntax,
    ObjectPropertySyntax, PropertySyntax, StringPropertySyntax, VersionSyntax,
};
use crate::token::{Token, TokenKind};

/// Parse a token stream into a [`DocumentSyntax`].
///
/// Consumes every token, up to and including the end-of-file token.
/// Never fails: a missing token is synthesized as a zero-width
/// [`TokenKind::Missing`] placeholder and reported, and unexpected tokens
/// are reported and skipped up to the next synchronizing token.
#[must_use]
pub fn parse(tokens: Vec<Token>) -> (DocumentSyntax, DiagnosticBag) {
    Parser::new(tokens).parse()
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    /// End of the last token consumed; where a missing token would sit.
    last_end: Position,
    /// Position of the last reported missing token, to report a run of
    /// missing tokens at one spot only once.
    last_missing_at: Option<Position>,
    diagnostics: DiagnosticBag,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            last_end: Position::default(),
            last_missing_at: None,
            diagnostics: DiagnosticBag::new(),
        }
    }

    fn parse(mut self) -> (DocumentSyntax, DiagnosticBag) {
        let mut versions = Vec::new();
        let mut blocks = Vec::new();

        loop {
            match self.peek_kind() {
                TokenKind::VersionKeyword => versions.push(self.parse_version()),
                TokenKind::WorkflowKeyword | TokenKind::ActionKeyword => {
                    blocks.push(self.parse_block());
                }
                TokenKind::EndOfFile => break,
                _ => self.skip_unexpected(is_top_level_sync),
            }
        }

        let last_end = self.last_end;
        let end_of_file = self.tokens.next().unwrap_or_else(|| Token {
            kind: TokenKind::EndOfFile,
            text: String::new(),
            range: Range::empty_at(last_end),
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
        });
        debug_assert!(
            self.tokens.next().is_none(),
            "tokens left over after end of file"
        );

        log::debug!(
            versions = versions.len(),
            blocks = blocks.len(),
            diagnostics = self.diagnostics.len();
            "parsed document"
        );

        (
            DocumentSyntax::new(versions, blocks, end_of_file),
            self.diagnostics,
        )
    }

    fn peek_kind(&mut self) -> TokenKind {
        self.tokens.peek().map_or(TokenKind::EndOfFile, |t| t.kind)
    }

    fn bump(&mut self) -> Token {
        match self.tokens.next() {
            Some(token) => {
                self.last_end = token.range.end;
                token
            }
            None => Token::missing(self.last_end),
        }
    }

    /// Take the next token if it has `kind`, otherwise synthesize and
    /// report a missing one.
    fn expect(&mut self, kind: TokenKind) -> Token {
        if self.peek_kind() == kind {
            return self.bump();
        }
        self.missing(kind.description())
    }

    /// Like [`expect`](Self::expect) for a block's `}`, which is
    /// reported even when another missing token sits at the same spot.
    fn expect_block_end(&mut self) -> Token {
        if self.peek_kind() == TokenKind::RightCurlyBracket {
            return self.bump();
        }
        self.last_missing_at = None;
        self.missing(TokenKind::RightCurlyBracket.description())
    }

    fn missing(&mut self, expected: &str) -> Token {
        let position = self.last_end;
        if self.last_missing_at != Some(position) {
            let found = self.peek_kind().description();
            self.diagnostics
                .missing_token(expected, found, Range::empty_at(position));
            self.last_missing_at = Some(position);
        }
        Token::missing(position)
    }

    /// Report the current token and skip it, plus everything after it, up
    /// to the first token `stop` accepts.
    fn skip_unexpected(&mut self, stop: fn(TokenKind) -> bool) {
        let token = self.bump();
        self.diagnostics
            .unexpected_token(token.kind.description(), token.range);

        let mut skipped = 1;
        while !stop(self.peek_kind()) {
            self.bump();
            skipped += 1;
        }
        log::trace!(skipped; "recovered from unexpected token");
    }

    fn parse_version(&mut self) -> VersionSyntax {
        let version = self.bump();
        let equal = self.expect(TokenKind::Equal);
        let integer = self.expect(TokenKind::IntegerLiteral);
        VersionSyntax::new(version, equal, integer)
    }

    fn parse_block(&mut self) -> BlockSyntax {
        let block_type = self.bump();
        let name = self.expect(TokenKind::StringLiteral);
        let open_bracket = self.expect(TokenKind::LeftCurlyBracket);

        let mut properties = Vec::new();
        loop {
            let kind = self.peek_kind();
            if kind.is_property_keyword() {
                properties.push(self.parse_property());
            } else if is_block_sync(kind) {
                break;
            } else {
                self.skip_unexpected(is_block_sync);
            }
        }

        let close_bracket = self.expect_block_end();
        BlockSyntax::new(block_type, name, open_bracket, properties, close_bracket)
    }

    fn parse_property(&mut self) -> PropertySyntax {
        let key = self.bump();
        let equal = self.expect(TokenKind::Equal);

        match key.kind {
            TokenKind::OnKeyword | TokenKind::UsesKeyword | TokenKind::RunsKeyword => {
                let value = self.expect(TokenKind::StringLiteral);
                PropertySyntax::String(StringPropertySyntax::new(key, equal, value))
            }
            TokenKind::EnvKeyword => self.parse_object(key, equal),
            _ => match self.peek_kind() {
                TokenKind::LeftSquareBracket => self.parse_array(key, equal),
                TokenKind::StringLiteral => {
                    let value = self.bump();
                    PropertySyntax::String(StringPropertySyntax::new(key, equal, value))
                }
                _ => {
                    let value = self.missing("string literal or '['");
                    PropertySyntax::String(StringPropertySyntax::new(key, equal, value))
                }
            },
        }
    }

    fn parse_array(&mut self, key: Token, equal: Token) -> PropertySyntax {
        let open_bracket = self.bump();

        let mut items = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::StringLiteral => {
                    let value = self.bump();
                    let comma = match self.peek_kind() {
                        TokenKind::Comma => Some(self.bump()),
                        TokenKind::StringLiteral => Some(self.expect(TokenKind::Comma)),
                        _ => None,
                    };
                    items.push(ArrayItemSyntax::new(value, comma));
                }
                kind if kind == TokenKind::RightSquareBracket || is_block_sync(kind) => break,
                _ => self.skip_unexpected(|kind| {
                    matches!(
                        kind,
                        TokenKind::StringLiteral | TokenKind::RightSquareBracket
                    ) || is_block_sync(kind)
                }),
            }
        }

        let close_bracket = self.expect(TokenKind::RightSquareBracket);
        PropertySyntax::Array(ArrayPropertySyntax::new(
            key,
            equal,
            open_bracket,
            items,
            close_bracket,
        ))
    }

    fn parse_object(&mut self, key: Token, equal: Token) -> PropertySyntax {
        let open_bracket = self.expect(TokenKind::LeftCurlyBracket);

        let mut members = Vec::new();
        if !open_bracket.is_missing() {
            loop {
                match self.peek_kind() {
                    TokenKind::Identifier => members.push(self.parse_object_member()),
                    kind if is_block_sync(kind) => break,
                    _ => self.skip_unexpected(|kind| {
                        kind == TokenKind::Identifier || is_block_sync(kind)
                    }),
                }
            }
        }

        let close_bracket = self.expect(TokenKind::RightCurlyBracket);
        PropertySyntax::Object(ObjectPropertySyntax::new(
            key,
            equal,
            open_bracket,
            members,
            close_bracket,
        ))
    }

    fn parse_object_member(&mut self) -> ObjectMemberSyntax {
        let name = self.bump();
        let equal = self.expect(TokenKind::Equal);
        let value = self.expect(TokenKind::StringLiteral);
        let comma = match self.peek_kind() {
            TokenKind::Comma => Some(self.bump()),
            TokenKind::Identifier => Some(self.expect(TokenKind::Comma)),
            _ => None,
        };
        ObjectMemberSyntax::new(name, equal, value, comma)
    }
}

fn is_top_level_sync(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::VersionKeyword
            | TokenKind::WorkflowKeyword
            | TokenKind::ActionKeyword
            | TokenKind::EndOfFile
    )
}

fn is_block_sync(kind: TokenKind) -> bool {
    kind == TokenKind::RightCurlyBracket || kind.is_property_keyword() || is_top_level_sync(kind)
}
