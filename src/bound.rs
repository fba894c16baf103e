//! Bound (semantic) tree and the visitor that walks it.
//!
//! The bound tree mirrors the syntax tree with one node per meaningful
//! construct. Each node borrows the syntax node it was bound from; the
//! borrow is only used to anchor diagnostics.

use crate::position::Range;
use crate::syntax::{BlockSyntax, DocumentSyntax, PropertySyntax, VersionSyntax};
use crate::token::Token;

/// Tags every kind of bound node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Document,
    Version,
    Workflow,
    Action,
    On,
    Resolves,
    Uses,
    Needs,
    Runs,
    Args,
    Env,
    Secrets,
}

/// A decoded string literal together with the token it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundString<'a> {
    pub value: String,
    pub token: &'a Token,
}

impl<'a> BoundString<'a> {
    /// Bind a string token. Missing tokens bind to nothing.
    #[must_use]
    pub fn from_token(token: &'a Token) -> Option<Self> {
        (!token.is_missing()).then(|| Self {
            value: token.string_value(),
            token,
        })
    }

    #[must_use]
    pub const fn range(&self) -> Range {
        self.token.range
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundDocument<'a> {
    pub syntax: &'a DocumentSyntax,
    pub versions: Vec<BoundVersion<'a>>,
    pub workflows: Vec<BoundWorkflow<'a>>,
    pub actions: Vec<BoundAction<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundVersion<'a> {
    pub syntax: &'a VersionSyntax,
    /// `None` when the integer is missing or does not fit.
    pub value: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundWorkflow<'a> {
    pub syntax: &'a BlockSyntax,
    pub name: Option<BoundString<'a>>,
    pub on: Option<BoundScalar<'a>>,
    pub resolves: Option<BoundList<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAction<'a> {
    pub syntax: &'a BlockSyntax,
    pub name: Option<BoundString<'a>>,
    pub uses: Option<BoundScalar<'a>>,
    pub needs: Option<BoundList<'a>>,
    pub runs: Option<BoundScalar<'a>>,
    pub args: Option<BoundList<'a>>,
    pub env: Option<BoundEnv<'a>>,
    pub secrets: Option<BoundList<'a>>,
}

/// A property holding a single string: `on`, `uses`, `runs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundScalar<'a> {
    pub syntax: &'a PropertySyntax,
    pub value: Option<BoundString<'a>>,
}

/// A property holding a string or an array of strings: `resolves`,
/// `needs`, `args`, `secrets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundList<'a> {
    pub syntax: &'a PropertySyntax,
    pub items: Vec<BoundString<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundEnv<'a> {
    pub syntax: &'a PropertySyntax,
    pub variables: Vec<BoundVariable<'a>>,
}

/// `NAME = "value"` inside `env`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundVariable<'a> {
    pub name: BoundString<'a>,
    pub value: Option<BoundString<'a>>,
}

/// Borrowed view of any bound node, used for dispatch.
#[derive(Debug, Clone, Copy)]
pub enum BoundNode<'b, 'a> {
    Document(&'b BoundDocument<'a>),
    Version(&'b BoundVersion<'a>),
    Workflow(&'b BoundWorkflow<'a>),
    Action(&'b BoundAction<'a>),
    On(&'b BoundScalar<'a>),
    Resolves(&'b BoundList<'a>),
    Uses(&'b BoundScalar<'a>),
    Needs(&'b BoundList<'a>),
    Runs(&'b BoundScalar<'a>),
    Args(&'b BoundList<'a>),
    Env(&'b BoundEnv<'a>),
    Secrets(&'b BoundList<'a>),
}

impl<'b, 'a> BoundNode<'b, 'a> {
    #[must_use]
    pub const fn kind(self) -> BoundKind {
        match self {
            Self::Document(_) => BoundKind::Document,
            Self::Version(_) => BoundKind::Version,
            Self::Workflow(_) => BoundKind::Workflow,
            Self::Action(_) => BoundKind::Action,
            Self::On(_) => BoundKind::On,
            Self::Resolves(_) => BoundKind::Resolves,
            Self::Uses(_) => BoundKind::Uses,
            Self::Needs(_) => BoundKind::Needs,
            Self::Runs(_) => BoundKind::Runs,
            Self::Args(_) => BoundKind::Args,
            Self::Env(_) => BoundKind::Env,
            Self::Secrets(_) => BoundKind::Secrets,
        }
    }

    /// Range of the syntax node this node was bound from.
    #[must_use]
    pub const fn range(self) -> Range {
        match self {
            Self::Document(n) => n.syntax.range(),
            Self::Version(n) => n.syntax.range(),
            Self::Workflow(n) => n.syntax.range(),
            Self::Action(n) => n.syntax.range(),
            Self::On(n) | Self::Uses(n) | Self::Runs(n) => n.syntax.range(),
            Self::Resolves(n) | Self::Needs(n) | Self::Args(n) | Self::Secrets(n) => {
                n.syntax.range()
            }
            Self::Env(n) => n.syntax.range(),
        }
    }

    /// Direct children, in a fixed order per kind.
    #[must_use]
    pub fn children(self) -> Vec<Self> {
        match self {
            Self::Document(n) => n
                .versions
                .iter()
                .map(BoundNode::Version)
                .chain(n.workflows.iter().map(BoundNode::Workflow))
                .chain(n.actions.iter().map(BoundNode::Action))
                .collect(),
            Self::Workflow(n) => n
                .on
                .iter()
                .map(BoundNode::On)
                .chain(n.resolves.iter().map(BoundNode::Resolves))
                .collect(),
            Self::Action(n) => n
                .uses
                .iter()
                .map(BoundNode::Uses)
                .chain(n.needs.iter().map(BoundNode::Needs))
                .chain(n.runs.iter().map(BoundNode::Runs))
                .chain(n.args.iter().map(BoundNode::Args))
                .chain(n.env.iter().map(BoundNode::Env))
                .chain(n.secrets.iter().map(BoundNode::Secrets))
                .collect(),
            Self::Version(_)
            | Self::On(_)
            | Self::Resolves(_)
            | Self::Uses(_)
            | Self::Needs(_)
            | Self::Runs(_)
            | Self::Args(_)
            | Self::Env(_)
            | Self::Secrets(_) => Vec::new(),
        }
    }
}

/// Walks a bound tree.
///
/// [`visit`](Self::visit) dispatches on the node kind. Every
/// `visit_*` method defaults to visiting the node's children, so an
/// implementation only overrides the kinds it cares about.
pub trait BoundNodeVisitor<'a> {
    fn visit(&mut self, node: BoundNode<'_, 'a>) {
        match node {
            BoundNode::Document(n) => self.visit_document(n),
            BoundNode::Version(n) => self.visit_version(n),
            BoundNode::Workflow(n) => self.visit_workflow(n),
            BoundNode::Action(n) => self.visit_action(n),
            BoundNode::On(n) => self.visit_on(n),
            BoundNode::Resolves(n) => self.visit_resolves(n),
            BoundNode::Uses(n) => self.visit_uses(n),
            BoundNode::Needs(n) => self.visit_needs(n),
            BoundNode::Runs(n) => self.visit_runs(n),
            BoundNode::Args(n) => self.visit_args(n),
            BoundNode::Env(n) => self.visit_env(n),
            BoundNode::Secrets(n) => self.visit_secrets(n),
        }
    }

    fn visit_document(&mut self, node: &BoundDocument<'a>) {
        walk_children(self, BoundNode::Document(node));
    }

    fn visit_version(&mut self, node: &BoundVersion<'a>) {
        walk_children(self, BoundNode::Version(node));
    }

    fn visit_workflow(&mut self, node: &BoundWorkflow<'a>) {
        walk_children(self, BoundNode::Workflow(node));
    }

    fn visit_action(&mut self, node: &BoundAction<'a>) {
        walk_children(self, BoundNode::Action(node));
    }

    fn visit_on(&mut self, node: &BoundScalar<'a>) {
        walk_children(self, BoundNode::On(node));
    }

    fn visit_resolves(&mut self, node: &BoundList<'a>) {
        walk_children(self, BoundNode::Resolves(node));
    }

    fn visit_uses(&mut self, node: &BoundScalar<'a>) {
        walk_children(self, BoundNode::Uses(node));
    }

    fn visit_needs(&mut self, node: &BoundList<'a>) {
        walk_children(self, BoundNode::Needs(node));
    }

    fn visit_runs(&mut self, node: &BoundScalar<'a>) {
        walk_children(self, BoundNode::Runs(node));
    }

    fn visit_args(&mut self, node: &BoundList<'a>) {
        walk_children(self, BoundNode::Args(node));
    }

    fn visit_env(&mut self, node: &BoundEnv<'a>) {
        walk_children(self, BoundNode::Env(node));
    }

    fn visit_secrets(&mut self, node: &BoundList<'a>) {
        walk_children(self, BoundNode::Secrets(node));
    }
}

/// Visit every child of `node`.
pub fn walk_children<'a, V>(visitor: &mut V, node: BoundNode<'_, 'a>)
where
    V: BoundNodeVisitor<'a> + ?Sized,
{
    for child in node.children() {
        visitor.visit(child);
    }
}
