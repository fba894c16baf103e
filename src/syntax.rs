//! Typed syntax tree produced by the parser.
//!
//! Every node checks, once, at construction, that each token slot holds
//! one of its permitted kinds or the [`TokenKind::Missing`] placeholder.
//! A violation is a parser bug and panics. Nodes are immutable after
//! construction, so each one computes its range up front.

use crate::position::Range;
use crate::token::{Token, TokenKind};

/// Tags every kind of syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Document,
    Version,
    Block,
    StringProperty,
    ArrayProperty,
    ArrayItem,
    ObjectProperty,
    ObjectMember,
}

fn assert_token_kind(node: SyntaxKind, token: &Token, accepted: &[TokenKind]) {
    assert!(
        token.kind == TokenKind::Missing || accepted.contains(&token.kind),
        "{node:?} node initialized with a token of invalid kind {}",
        token.kind
    );
}

fn assert_optional_token_kind(node: SyntaxKind, token: Option<&Token>, accepted: &[TokenKind]) {
    if let Some(token) = token {
        assert_token_kind(node, token, accepted);
    }
}

/// Root of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSyntax {
    versions: Vec<VersionSyntax>,
    blocks: Vec<BlockSyntax>,
    end_of_file: Token,
    range: Range,
}

impl DocumentSyntax {
    #[must_use]
    pub fn new(versions: Vec<VersionSyntax>, blocks: Vec<BlockSyntax>, end_of_file: Token) -> Self {
        assert_token_kind(SyntaxKind::Document, &end_of_file, &[TokenKind::EndOfFile]);
        let range = Range::combine(
            versions
                .iter()
                .map(VersionSyntax::range)
                .chain(blocks.iter().map(BlockSyntax::range))
                .chain(std::iter::once(end_of_file.full_range())),
        );
        Self {
            versions,
            blocks,
            end_of_file,
            range,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        SyntaxKind::Document
    }

    #[must_use]
    pub const fn range(&self) -> Range {
        self.range
    }

    #[must_use]
    pub fn versions(&self) -> &[VersionSyntax] {
        &self.versions
    }

    #[must_use]
    pub fn blocks(&self) -> &[BlockSyntax] {
        &self.blocks
    }

    /// The end-of-file token. Its leading trivia is everything after the
    /// last real token.
    #[must_use]
    pub const fn end_of_file(&self) -> &Token {
        &self.end_of_file
    }
}

/// `version = <integer>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSyntax {
    version: Token,
    equal: Token,
    integer: Token,
    range: Range,
}

impl VersionSyntax {
    #[must_use]
    pub fn new(version: Token, equal: Token, integer: Token) -> Self {
        let kind = SyntaxKind::Version;
        assert_token_kind(kind, &version, &[TokenKind::VersionKeyword]);
        assert_token_kind(kind, &equal, &[TokenKind::Equal]);
        assert_token_kind(kind, &integer, &[TokenKind::IntegerLiteral]);
        let range = Range::combine([version.range, equal.range, integer.range]);
        Self {
            version,
            equal,
            integer,
            range,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        SyntaxKind::Version
    }

    #[must_use]
    pub const fn range(&self) -> Range {
        self.range
    }

    #[must_use]
    pub const fn version(&self) -> &Token {
        &self.version
    }

    #[must_use]
    pub const fn equal(&self) -> &Token {
        &self.equal
    }

    #[must_use]
    pub const fn integer(&self) -> &Token {
        &self.integer
    }
}

/// Block type, taken from the keyword that opens the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Workflow,
    Action,
}

impl BlockKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Action => "action",
        }
    }
}

/// `workflow "<name>" { ... }` or `action "<name>" { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSyntax {
    block_kind: BlockKind,
    block_type: Token,
    name: Token,
    open_bracket: Token,
    properties: Vec<PropertySyntax>,
    close_bracket: Token,
    range: Range,
}

impl BlockSyntax {
    /// # Panics
    ///
    /// Panics if `block_type` is not a `workflow` or `action` keyword, or
    /// if any other token has a kind the slot does not permit.
    #[must_use]
    pub fn new(
        block_type: Token,
        name: Token,
        open_bracket: Token,
        properties: Vec<PropertySyntax>,
        close_bracket: Token,
    ) -> Self {
        let kind = SyntaxKind::Block;
        let block_kind = match block_type.kind {
            TokenKind::WorkflowKeyword => BlockKind::Workflow,
            TokenKind::ActionKeyword => BlockKind::Action,
            other => panic!("{kind:?} node initialized with a token of invalid kind {other}"),
        };
        assert_token_kind(kind, &name, &[TokenKind::StringLiteral]);
        assert_token_kind(kind, &open_bracket, &[TokenKind::LeftCurlyBracket]);
        assert_token_kind(kind, &close_bracket, &[TokenKind::RightCurlyBracket]);

        let range = Range::combine(
            [block_type.range, name.range, open_bracket.range]
                .into_iter()
                .chain(properties.iter().map(PropertySyntax::range))
                .chain(std::iter::once(close_bracket.range)),
        );

        Self {
            block_kind,
            block_type,
            name,
            open_bracket,
            properties,
            close_bracket,
            range,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        SyntaxKind::Block
    }

    #[must_use]
    pub const fn range(&self) -> Range {
        self.range
    }

    #[must_use]
    pub const fn block_kind(&self) -> BlockKind {
        self.block_kind
    }

    #[must_use]
    pub const fn block_type(&self) -> &Token {
        &self.block_type
    }

    #[must_use]
    pub const fn name(&self) -> &Token {
        &self.name
    }

    #[must_use]
    pub const fn open_bracket(&self) -> &Token {
        &self.open_bracket
    }

    #[must_use]
    pub fn properties(&self) -> &[PropertySyntax] {
        &self.properties
    }

    #[must_use]
    pub const fn close_bracket(&self) -> &Token {
        &self.close_bracket
    }
}

fn assert_property_key(node: SyntaxKind, key: &Token, equal: &Token) {
    assert!(
        key.kind.is_property_keyword(),
        "{node:?} node initialized with a token of invalid kind {}",
        key.kind
    );
    assert_token_kind(node, equal, &[TokenKind::Equal]);
}

/// A key/value assignment inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySyntax {
    String(StringPropertySyntax),
    Array(ArrayPropertySyntax),
    Object(ObjectPropertySyntax),
}

impl PropertySyntax {
    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        match self {
            Self::String(_) => SyntaxKind::StringProperty,
            Self::Array(_) => SyntaxKind::ArrayProperty,
            Self::Object(_) => SyntaxKind::ObjectProperty,
        }
    }

    #[must_use]
    pub const fn range(&self) -> Range {
        match self {
            Self::String(p) => p.range,
            Self::Array(p) => p.range,
            Self::Object(p) => p.range,
        }
    }

    /// The property keyword.
    #[must_use]
    pub const fn key(&self) -> &Token {
        match self {
            Self::String(p) => &p.key,
            Self::Array(p) => &p.key,
            Self::Object(p) => &p.key,
        }
    }

    #[must_use]
    pub const fn equal(&self) -> &Token {
        match self {
            Self::String(p) => &p.equal,
            Self::Array(p) => &p.equal,
            Self::Object(p) => &p.equal,
        }
    }
}

/// `key = "value"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringPropertySyntax {
    key: Token,
    equal: Token,
    value: Token,
    range: Range,
}

impl StringPropertySyntax {
    #[must_use]
    pub fn new(key: Token, equal: Token, value: Token) -> Self {
        let kind = SyntaxKind::StringProperty;
        assert_property_key(kind, &key, &equal);
        assert_token_kind(kind, &value, &[TokenKind::StringLiteral]);
        let range = Range::combine([key.range, equal.range, value.range]);
        Self {
            key,
            equal,
            value,
            range,
        }
    }

    #[must_use]
    pub const fn value(&self) -> &Token {
        &self.value
    }
}

/// `key = [ "a", "b" ]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayPropertySyntax {
    key: Token,
    equal: Token,
    open_bracket: Token,
    items: Vec<ArrayItemSyntax>,
    close_bracket: Token,
    range: Range,
}

impl ArrayPropertySyntax {
    #[must_use]
    pub fn new(
        key: Token,
        equal: Token,
        open_bracket: Token,
        items: Vec<ArrayItemSyntax>,
        close_bracket: Token,
    ) -> Self {
        let kind = SyntaxKind::ArrayProperty;
        assert_property_key(kind, &key, &equal);
        assert_token_kind(kind, &open_bracket, &[TokenKind::LeftSquareBracket]);
        assert_token_kind(kind, &close_bracket, &[TokenKind::RightSquareBracket]);
        let range = Range::combine(
            [key.range, equal.range, open_bracket.range]
                .into_iter()
                .chain(items.iter().map(ArrayItemSyntax::range))
                .chain(std::iter::once(close_bracket.range)),
        );
        Self {
            key,
            equal,
            open_bracket,
            items,
            close_bracket,
            range,
        }
    }

    #[must_use]
    pub const fn open_bracket(&self) -> &Token {
        &self.open_bracket
    }

    #[must_use]
    pub fn items(&self) -> &[ArrayItemSyntax] {
        &self.items
    }

    #[must_use]
    pub const fn close_bracket(&self) -> &Token {
        &self.close_bracket
    }
}

/// `"value"` with its optional trailing comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayItemSyntax {
    value: Token,
    comma: Option<Token>,
    range: Range,
}

impl ArrayItemSyntax {
    #[must_use]
    pub fn new(value: Token, comma: Option<Token>) -> Self {
        let kind = SyntaxKind::ArrayItem;
        assert_token_kind(kind, &value, &[TokenKind::StringLiteral]);
        assert_optional_token_kind(kind, comma.as_ref(), &[TokenKind::Comma]);
        let range = Range::combine(std::iter::once(value.range).chain(comma.iter().map(|c| c.range)));
        Self { value, comma, range }
    }

    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        SyntaxKind::ArrayItem
    }

    #[must_use]
    pub const fn range(&self) -> Range {
        self.range
    }

    #[must_use]
    pub const fn value(&self) -> &Token {
        &self.value
    }

    #[must_use]
    pub const fn comma(&self) -> Option<&Token> {
        self.comma.as_ref()
    }
}

/// `key = { NAME = "value", ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPropertySyntax {
    key: Token,
    equal: Token,
    open_bracket: Token,
    members: Vec<ObjectMemberSyntax>,
    close_bracket: Token,
    range: Range,
}

impl ObjectPropertySyntax {
    #[must_use]
    pub fn new(
        key: Token,
        equal: Token,
        open_bracket: Token,
        members: Vec<ObjectMemberSyntax>,
        close_bracket: Token,
    ) -> Self {
        let kind = SyntaxKind::ObjectProperty;
        assert_property_key(kind, &key, &equal);
        assert_token_kind(kind, &open_bracket, &[TokenKind::LeftCurlyBracket]);
        assert_token_kind(kind, &close_bracket, &[TokenKind::RightCurlyBracket]);
        let range = Range::combine(
            [key.range, equal.range, open_bracket.range]
                .into_iter()
                .chain(members.iter().map(ObjectMemberSyntax::range))
                .chain(std::iter::once(close_bracket.range)),
        );
        Self {
            key,
            equal,
            open_bracket,
            members,
            close_bracket,
            range,
        }
    }

    #[must_use]
    pub const fn open_bracket(&self) -> &Token {
        &self.open_bracket
    }

    #[must_use]
    pub fn members(&self) -> &[ObjectMemberSyntax] {
        &self.members
    }

    #[must_use]
    pub const fn close_bracket(&self) -> &Token {
        &self.close_bracket
    }
}

/// `NAME = "value"` with its optional trailing comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMemberSyntax {
    name: Token,
    equal: Token,
    value: Token,
    comma: Option<Token>,
    range: Range,
}

impl ObjectMemberSyntax {
    #[must_use]
    pub fn new(name: Token, equal: Token, value: Token, comma: Option<Token>) -> Self {
        let kind = SyntaxKind::ObjectMember;
        assert_token_kind(kind, &name, &[TokenKind::Identifier]);
        assert_token_kind(kind, &equal, &[TokenKind::Equal]);
        assert_token_kind(kind, &value, &[TokenKind::StringLiteral]);
        assert_optional_token_kind(kind, comma.as_ref(), &[TokenKind::Comma]);
        let range = Range::combine(
            [name.range, equal.range, value.range]
                .into_iter()
                .chain(comma.iter().map(|c| c.range)),
        );
        Self {
            name,
            equal,
            value,
            comma,
            range,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        SyntaxKind::ObjectMember
    }

    #[must_use]
    pub const fn range(&self) -> Range {
        self.range
    }

    #[must_use]
    pub const fn name(&self) -> &Token {
        &self.name
    }

    #[must_use]
    pub const fn equal(&self) -> &Token {
        &self.equal
    }

    #[must_use]
    pub const fn value(&self) -> &Token {
        &self.value
    }

    #[must_use]
    pub const fn comma(&self) -> Option<&Token> {
        self.comma.as_ref()
    }
}
