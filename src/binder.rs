//! Semantic checks over the syntax tree.
//!
//! Binding runs in two passes. The first walks the syntax tree block by
//! block and builds the bound tree, reporting problems local to one
//! block or to the set of block names. The second runs
//! [`BoundNodeVisitor`]s over the finished tree for checks that need the
//! whole document: references, dependency cycles, and property values.

use std::collections::{HashMap, HashSet};

use crate::bound::{
    BoundAction, BoundDocument, BoundEnv, BoundList, BoundNode, BoundNodeVisitor, BoundScalar,
    BoundString, BoundVariable, BoundVersion, BoundWorkflow,
};
use crate::diagnostic::DiagnosticBag;
use crate::position::Range;
use crate::syntax::{BlockKind, BlockSyntax, DocumentSyntax, PropertySyntax, VersionSyntax};
use crate::token::{Token, TokenKind};

const RESERVED_ENV_PREFIX: &str = "GITHUB_";
const SUPPORTED_VERSION: u64 = 0;

/// Bind a syntax tree, reporting semantic problems.
///
/// The syntax tree is only read. The bound tree borrows from it.
#[must_use]
pub fn bind(document: &DocumentSyntax) -> (BoundDocument<'_>, DiagnosticBag) {
    let mut binder = Binder {
        diagnostics: DiagnosticBag::new(),
    };
    let bound = binder.bind_document(document);

    let root = BoundNode::Document(&bound);
    ReferenceChecker::new(&bound, &mut binder.diagnostics).visit(root);
    ValueChecker {
        diagnostics: &mut binder.diagnostics,
    }
    .visit(root);
    let mut dependencies = DependencyChecker::default();
    dependencies.visit(root);
    dependencies.report_cycles(&mut binder.diagnostics);

    log::debug!(
        workflows = bound.workflows.len(),
        actions = bound.actions.len(),
        diagnostics = binder.diagnostics.len();
        "bound document"
    );

    (bound, binder.diagnostics)
}

struct Binder {
    diagnostics: DiagnosticBag,
}

impl Binder {
    fn bind_document<'a>(&mut self, syntax: &'a DocumentSyntax) -> BoundDocument<'a> {
        let first_block = syntax.blocks().first().map(BlockSyntax::range);
        let versions = syntax
            .versions()
            .iter()
            .enumerate()
            .map(|(index, version)| self.bind_version(version, index, first_block))
            .collect();

        let mut workflows = Vec::new();
        let mut actions = Vec::new();
        let mut workflow_names = HashSet::new();
        let mut action_names = HashSet::new();

        for block in syntax.blocks() {
            let names = match block.block_kind() {
                BlockKind::Workflow => &mut workflow_names,
                BlockKind::Action => &mut action_names,
            };
            let name = self.bind_block_name(block, names);
            match block.block_kind() {
                BlockKind::Workflow => workflows.push(self.bind_workflow(block, name)),
                BlockKind::Action => actions.push(self.bind_action(block, name)),
            }
        }

        BoundDocument {
            syntax,
            versions,
            workflows,
            actions,
        }
    }

    fn bind_version<'a>(
        &mut self,
        syntax: &'a VersionSyntax,
        index: usize,
        first_block: Option<Range>,
    ) -> BoundVersion<'a> {
        if index > 0 {
            self.diagnostics.multiple_versions(syntax.range());
        }
        if first_block.is_some_and(|block| block.start < syntax.range().start) {
            self.diagnostics.misplaced_version(syntax.range());
        }

        let integer = syntax.integer();
        let value = if integer.is_missing() {
            None
        } else {
            let value = integer.text.parse::<u64>().ok();
            if value != Some(SUPPORTED_VERSION) {
                self.diagnostics
                    .unsupported_version(&integer.text, integer.range);
            }
            value
        };

        BoundVersion { syntax, value }
    }

    fn bind_block_name<'a>(
        &mut self,
        block: &'a BlockSyntax,
        seen: &mut HashSet<String>,
    ) -> Option<BoundString<'a>> {
        let name = BoundString::from_token(block.name())?;
        let kind = block.block_kind().as_str();
        if name.value.is_empty() {
            self.diagnostics.empty_name(kind, name.range());
        } else if !seen.insert(name.value.clone()) {
            self.diagnostics
                .duplicate_name(kind, &name.value, name.range());
        }
        Some(name)
    }

    fn bind_workflow<'a>(
        &mut self,
        syntax: &'a BlockSyntax,
        name: Option<BoundString<'a>>,
    ) -> BoundWorkflow<'a> {
        let mut workflow = BoundWorkflow {
            syntax,
            name,
            on: None,
            resolves: None,
        };

        for property in syntax.properties() {
            let key = property.key();
            match key.kind {
                TokenKind::OnKeyword => {
                    self.assign(&mut workflow.on, bind_scalar(property), key);
                }
                TokenKind::ResolvesKeyword => {
                    self.assign(&mut workflow.resolves, bind_list(property), key);
                }
                _ => self.diagnostics.property_not_allowed(
                    &key.text,
                    BlockKind::Workflow.as_str(),
                    key.range,
                ),
            }
        }

        workflow
    }

    fn bind_action<'a>(
        &mut self,
        syntax: &'a BlockSyntax,
        name: Option<BoundString<'a>>,
    ) -> BoundAction<'a> {
        let mut action = BoundAction {
            syntax,
            name,
            uses: None,
            needs: None,
            runs: None,
            args: None,
            env: None,
            secrets: None,
        };

        for property in syntax.properties() {
            let key = property.key();
            match key.kind {
                TokenKind::UsesKeyword => {
                    self.assign(&mut action.uses, bind_scalar(property), key);
                }
                TokenKind::NeedsKeyword => {
                    self.assign(&mut action.needs, bind_list(property), key);
                }
                TokenKind::RunsKeyword => {
                    self.assign(&mut action.runs, bind_scalar(property), key);
                }
                TokenKind::ArgsKeyword => {
                    self.assign(&mut action.args, bind_list(property), key);
                }
                TokenKind::EnvKeyword => {
                    self.assign(&mut action.env, bind_env(property), key);
                }
                TokenKind::SecretsKeyword => {
                    self.assign(&mut action.secrets, bind_list(property), key);
                }
                _ => self.diagnostics.property_not_allowed(
                    &key.text,
                    BlockKind::Action.as_str(),
                    key.range,
                ),
            }
        }

        if action.uses.is_none() {
            let anchor = Range::combine([syntax.block_type().range, syntax.name().range]);
            self.diagnostics
                .missing_required_property(BlockKind::Action.as_str(), "uses", anchor);
        }

        action
    }

    /// Store the first occurrence of a property; report later ones.
    fn assign<T>(&mut self, slot: &mut Option<T>, value: T, key: &Token) {
        if slot.is_some() {
            self.diagnostics.duplicate_property(&key.text, key.range);
        } else {
            *slot = Some(value);
        }
    }
}

fn bind_scalar(syntax: &PropertySyntax) -> BoundScalar<'_> {
    let value = match syntax {
        PropertySyntax::String(property) => BoundString::from_token(property.value()),
        PropertySyntax::Array(_) | PropertySyntax::Object(_) => None,
    };
    BoundScalar { syntax, value }
}

fn bind_list(syntax: &PropertySyntax) -> BoundList<'_> {
    let items = match syntax {
        PropertySyntax::String(property) => {
            BoundString::from_token(property.value()).into_iter().collect()
        }
        PropertySyntax::Array(property) => property
            .items()
            .iter()
            .filter_map(|item| BoundString::from_token(item.value()))
            .collect(),
        PropertySyntax::Object(_) => Vec::new(),
    };
    BoundList { syntax, items }
}

fn bind_env(syntax: &PropertySyntax) -> BoundEnv<'_> {
    let variables = match syntax {
        PropertySyntax::Object(property) => property
            .members()
            .iter()
            .filter_map(|member| {
                let name = BoundString::from_token(member.name())?;
                Some(BoundVariable {
                    name,
                    value: BoundString::from_token(member.value()),
                })
            })
            .collect(),
        PropertySyntax::String(_) | PropertySyntax::Array(_) => Vec::new(),
    };
    BoundEnv { syntax, variables }
}

/// Reports `resolves` and `needs` entries that name no declared action.
struct ReferenceChecker<'d> {
    actions: HashSet<String>,
    diagnostics: &'d mut DiagnosticBag,
}

impl<'d> ReferenceChecker<'d> {
    fn new(document: &BoundDocument<'_>, diagnostics: &'d mut DiagnosticBag) -> Self {
        let actions = document
            .actions
            .iter()
            .filter_map(|action| action.name.as_ref())
            .map(|name| name.value.clone())
            .collect();
        Self {
            actions,
            diagnostics,
        }
    }

    fn check(&mut self, list: &BoundList<'_>) {
        for item in &list.items {
            if !self.actions.contains(&item.value) {
                self.diagnostics.unknown_reference(&item.value, item.range());
            }
        }
    }
}

impl<'a> BoundNodeVisitor<'a> for ReferenceChecker<'_> {
    fn visit_resolves(&mut self, node: &BoundList<'a>) {
        self.check(node);
    }

    fn visit_needs(&mut self, node: &BoundList<'a>) {
        self.check(node);
    }
}

/// Reports repeated or reserved environment variables and repeated
/// secrets.
struct ValueChecker<'d> {
    diagnostics: &'d mut DiagnosticBag,
}

impl<'a> BoundNodeVisitor<'a> for ValueChecker<'_> {
    fn visit_env(&mut self, node: &BoundEnv<'a>) {
        let mut seen = HashSet::new();
        for variable in &node.variables {
            let name = &variable.name;
            if !seen.insert(name.value.as_str()) {
                self.diagnostics
                    .duplicate_environment_variable(&name.value, name.range());
            }
            if name.value.starts_with(RESERVED_ENV_PREFIX) {
                self.diagnostics
                    .reserved_environment_variable(&name.value, name.range());
            }
        }
    }

    fn visit_secrets(&mut self, node: &BoundList<'a>) {
        let mut seen = HashSet::new();
        for secret in &node.items {
            if !seen.insert(secret.value.as_str()) {
                self.diagnostics
                    .duplicate_secret(&secret.value, secret.range());
            }
        }
    }
}

/// Collects the `needs` graph between actions and reports cycles in it.
#[derive(Default)]
struct DependencyChecker {
    /// Action names in document order; the first declaration wins.
    order: Vec<String>,
    edges: HashMap<String, Vec<Dependency>>,
}

/// One `needs` entry: the action depended on and where it is named.
struct Dependency {
    name: String,
    range: Range,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl<'a> BoundNodeVisitor<'a> for DependencyChecker {
    fn visit_action(&mut self, node: &BoundAction<'a>) {
        let Some(name) = node.name.as_ref() else {
            return;
        };
        if self.edges.contains_key(&name.value) {
            return;
        }
        let needs = node
            .needs
            .iter()
            .flat_map(|needs| &needs.items)
            .map(|item| Dependency {
                name: item.value.clone(),
                range: item.range(),
            })
            .collect();
        self.order.push(name.value.clone());
        self.edges.insert(name.value.clone(), needs);
    }
}

impl DependencyChecker {
    /// Iterative depth-first search over the graph. Each back edge is
    /// reported on the `needs` entry that closes the cycle.
    fn report_cycles(&self, diagnostics: &mut DiagnosticBag) {
        let mut state: HashMap<&str, Visit> = HashMap::new();

        for root in &self.order {
            if state.contains_key(root.as_str()) {
                continue;
            }
            state.insert(root.as_str(), Visit::InProgress);
            let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];

            while let Some(frame) = stack.last_mut() {
                let (name, index) = *frame;
                let Some(dependency) = self.edges.get(name).and_then(|needs| needs.get(index))
                else {
                    state.insert(name, Visit::Done);
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                let Some((target, _)) = self.edges.get_key_value(&dependency.name) else {
                    continue;
                };
                match state.get(target.as_str()) {
                    Some(Visit::InProgress) => {
                        diagnostics.circular_dependency(target, dependency.range);
                    }
                    Some(Visit::Done) => {}
                    None => {
                        state.insert(target.as_str(), Visit::InProgress);
                        stack.push((target.as_str(), 0));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::{BoundKind, walk_children};
    use crate::diagnostic::{Diagnostic, DiagnosticCode};
    use crate::parser::parse;
    use crate::scanner::scan;

    fn bind_input(input: &str) -> Vec<Diagnostic> {
        let (tokens, _) = scan(input);
        let (document, _) = parse(tokens);
        let (_, diagnostics) = bind(&document);
        diagnostics.into_sorted()
    }

    fn codes(input: &str) -> Vec<DiagnosticCode> {
        bind_input(input).iter().map(|d| d.code).collect()
    }

    #[test]
    fn valid_document_has_no_diagnostics() {
        let diagnostics = bind_input(
            "version = 0\n\
             workflow \"main\" {\n  on = \"push\"\n  resolves = [\"deploy\"]\n}\n\
             action \"build\" {\n  uses = \"./build\"\n}\n\
             action \"deploy\" {\n  uses = \"./deploy\"\n  needs = [\"build\"]\n\
             \x20 env = { TARGET = \"prod\" }\n  secrets = [\"TOKEN\"]\n}\n",
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn bound_tree_shape() {
        let (tokens, _) = scan(
            "workflow \"w\" {\n  on = \"push\"\n}\n\
             action \"a\" {\n  uses = \"./a\"\n  args = \"one\"\n}\n",
        );
        let (document, _) = parse(tokens);
        let (bound, _) = bind(&document);
        assert_eq!(bound.workflows.len(), 1);
        assert_eq!(bound.actions.len(), 1);
        let action = &bound.actions[0];
        assert_eq!(action.name.as_ref().unwrap().value, "a");
        assert_eq!(action.args.as_ref().unwrap().items[0].value, "one");
        assert!(std::ptr::eq(action.syntax, &document.blocks()[1]));
    }

    #[test]
    fn duplicate_name_points_at_second_name() {
        let diagnostics = bind_input("workflow \"x\" {\n}\nworkflow \"x\" {\n}\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicateName);
        assert_eq!(diagnostics[0].range.start.line, 2);
        assert_eq!(diagnostics[0].range.start.column, 9);
    }

    #[test]
    fn same_name_in_different_kinds_is_allowed() {
        assert_eq!(
            codes("workflow \"x\" {\n}\naction \"x\" {\n  uses = \"./x\"\n}\n"),
            vec![]
        );
    }

    #[test]
    fn empty_name() {
        assert_eq!(codes("workflow \"\" {\n}\n"), vec![DiagnosticCode::EmptyName]);
    }

    #[test]
    fn action_requires_uses() {
        let diagnostics = bind_input("action \"a\" {\n  runs = \"make\"\n}\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::MissingRequiredProperty);
        assert_eq!(diagnostics[0].range.start.column, 0);
        assert_eq!(diagnostics[0].range.end.column, 10);
    }

    #[test]
    fn duplicate_property() {
        let diagnostics =
            bind_input("action \"a\" {\n  uses = \"./a\"\n  uses = \"./b\"\n}\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicateProperty);
        assert_eq!(diagnostics[0].range.start.line, 2);
    }

    #[test]
    fn property_in_wrong_block() {
        assert_eq!(
            codes("workflow \"w\" {\n  uses = \"./a\"\n}\n"),
            vec![DiagnosticCode::PropertyNotAllowed]
        );
        assert_eq!(
            codes("action \"a\" {\n  uses = \"./a\"\n  on = \"push\"\n}\n"),
            vec![DiagnosticCode::PropertyNotAllowed]
        );
    }

    #[test]
    fn unknown_reference() {
        let diagnostics = bind_input(
            "workflow \"w\" {\n  resolves = [\"a\", \"ghost\"]\n}\n\
             action \"a\" {\n  uses = \"./a\"\n  needs = \"phantom\"\n}\n",
        );
        let found: Vec<_> = diagnostics
            .iter()
            .map(|d| (d.code, d.range.start.line))
            .collect();
        assert_eq!(
            found,
            vec![
                (DiagnosticCode::UnknownReference, 1),
                (DiagnosticCode::UnknownReference, 5),
            ]
        );
    }

    #[test]
    fn resolving_a_workflow_is_unknown() {
        assert_eq!(
            codes("workflow \"w\" {\n  resolves = \"w\"\n}\n"),
            vec![DiagnosticCode::UnknownReference]
        );
    }

    #[test]
    fn circular_dependency() {
        let diagnostics = bind_input(
            "action \"a\" {\n  uses = \"./a\"\n  needs = [\"b\"]\n}\n\
             action \"b\" {\n  uses = \"./b\"\n  needs = [\"a\"]\n}\n",
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::CircularDependency);
        assert_eq!(diagnostics[0].range.start.line, 6);
    }

    #[test]
    fn long_dependency_chain_closing_a_cycle() {
        const LENGTH: usize = 50_000;
        let mut input = String::new();
        for index in 0..LENGTH {
            let next = (index + 1) % LENGTH;
            input.push_str(&format!(
                "action \"a{index}\" {{\n  uses = \"./a\"\n  needs = \"a{next}\"\n}}\n"
            ));
        }
        let diagnostics = bind_input(&input);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::CircularDependency);
        // The search starts at a0, so the edge back to it closes the cycle.
        assert_eq!(diagnostics[0].range.start.line, (LENGTH - 1) * 4 + 2);
    }

    #[test]
    fn self_dependency() {
        assert_eq!(
            codes("action \"a\" {\n  uses = \"./a\"\n  needs = \"a\"\n}\n"),
            vec![DiagnosticCode::CircularDependency]
        );
    }

    #[test]
    fn versions() {
        assert_eq!(codes("version = 0\n"), vec![]);
        assert_eq!(
            codes("version = 2\n"),
            vec![DiagnosticCode::UnsupportedVersion]
        );
        assert_eq!(
            codes("version = 0\nversion = 0\n"),
            vec![DiagnosticCode::MultipleVersions]
        );
        assert_eq!(
            codes("workflow \"w\" {\n}\nversion = 0\n"),
            vec![DiagnosticCode::MisplacedVersion]
        );
    }

    #[test]
    fn environment_variables() {
        let diagnostics = bind_input(
            "action \"a\" {\n  uses = \"./a\"\n\
             \x20 env = {\n    A = \"1\",\n    A = \"2\",\n    GITHUB_SHA = \"x\"\n  }\n}\n",
        );
        let found: Vec<_> = diagnostics
            .iter()
            .map(|d| (d.code, d.range.start.line))
            .collect();
        assert_eq!(
            found,
            vec![
                (DiagnosticCode::DuplicateEnvironmentVariable, 4),
                (DiagnosticCode::ReservedEnvironmentVariable, 5),
            ]
        );
    }

    #[test]
    fn duplicate_secret_is_a_warning() {
        let diagnostics = bind_input(
            "action \"a\" {\n  uses = \"./a\"\n  secrets = [\"T\", \"T\"]\n}\n",
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicateSecret);
        assert!(!diagnostics[0].severity.is_error());
    }

    #[test]
    fn default_dispatch_reaches_nested_properties() {
        struct PropertyCollector(Vec<BoundKind>);

        impl<'a> BoundNodeVisitor<'a> for PropertyCollector {
            fn visit_uses(&mut self, _: &BoundScalar<'a>) {
                self.0.push(BoundKind::Uses);
            }

            fn visit_env(&mut self, _: &BoundEnv<'a>) {
                self.0.push(BoundKind::Env);
            }
        }

        let (tokens, _) = scan(
            "version = 0\nworkflow \"w\" {\n  on = \"push\"\n}\n\
             action \"a\" {\n  uses = \"./a\"\n  env = { A = \"b\" }\n}\n",
        );
        let (document, _) = parse(tokens);
        let (bound, _) = bind(&document);
        let mut collector = PropertyCollector(Vec::new());
        collector.visit(BoundNode::Document(&bound));
        assert_eq!(collector.0, vec![BoundKind::Uses, BoundKind::Env]);
    }

    #[test]
    fn walk_children_reaches_every_node() {
        struct KindCollector(Vec<BoundKind>);

        impl<'a> BoundNodeVisitor<'a> for KindCollector {
            fn visit(&mut self, node: BoundNode<'_, 'a>) {
                self.0.push(node.kind());
                walk_children(self, node);
            }
        }

        let (tokens, _) = scan(
            "version = 0\nworkflow \"w\" {\n  on = \"push\"\n}\n\
             action \"a\" {\n  uses = \"./a\"\n  env = { A = \"b\" }\n}\n",
        );
        let (document, _) = parse(tokens);
        let (bound, _) = bind(&document);
        let mut collector = KindCollector(Vec::new());
        collector.visit(BoundNode::Document(&bound));
        assert_eq!(
            collector.0,
            vec![
                BoundKind::Document,
                BoundKind::Version,
                BoundKind::Workflow,
                BoundKind::On,
                BoundKind::Action,
                BoundKind::Uses,
                BoundKind::Env,
            ]
        );
    }
}
