mod common;

use common::{codes, range, single};
use workflow_lint::bound::{BoundAction, BoundList};
use workflow_lint::{BoundNode, BoundNodeVisitor, DiagnosticCode, bind, parse, scan, walk_children};

/// Collects every action name referenced through `needs`.
#[derive(Default)]
struct NeedsCollector(Vec<String>);

impl<'a> BoundNodeVisitor<'a> for NeedsCollector {
    fn visit_needs(&mut self, node: &BoundList<'a>) {
        self.0.extend(node.items.iter().map(|item| item.value.clone()));
    }
}

/// Counts actions, then stops descending.
#[derive(Default)]
struct ActionCounter(usize);

impl<'a> BoundNodeVisitor<'a> for ActionCounter {
    fn visit_action(&mut self, _: &BoundAction<'a>) {
        self.0 += 1;
    }
}

const PIPELINE: &str = "\
workflow \"release\" {
  on = \"release\"
  resolves = \"publish\"
}

action \"build\" {
  uses = \"./build\"
}

action \"test\" {
  uses = \"./test\"
  needs = \"build\"
}

action \"publish\" {
  uses = \"./publish\"
  needs = [\"build\", \"test\"]
}
";

#[test]
fn visitors_run_over_the_bound_tree() {
    let (tokens, _) = scan(PIPELINE);
    let (document, _) = parse(tokens);
    let (bound, diagnostics) = bind(&document);
    assert!(diagnostics.is_empty());

    let mut needs = NeedsCollector::default();
    needs.visit(BoundNode::Document(&bound));
    assert_eq!(needs.0, vec!["build", "build", "test"]);

    let mut actions = ActionCounter::default();
    walk_children(&mut actions, BoundNode::Document(&bound));
    assert_eq!(actions.0, 3);
}

#[test]
fn bound_nodes_point_back_at_syntax() {
    let (tokens, _) = scan(PIPELINE);
    let (document, _) = parse(tokens);
    let (bound, _) = bind(&document);
    let publish = &bound.actions[2];
    assert_eq!(
        BoundNode::Action(publish).range(),
        document.blocks()[3].range()
    );
    let needs = publish.needs.as_ref().map(|n| BoundNode::Needs(n).range());
    assert_eq!(needs, Some(range((16, 2), (16, 27))));
}

#[test]
fn single_string_references_are_checked() {
    let diagnostic = single("workflow \"w\" {\n  resolves = \"nobody\"\n}\n");
    assert_eq!(diagnostic.code, DiagnosticCode::UnknownReference);
    assert_eq!(diagnostic.range, range((1, 13), (1, 21)));
}

#[test]
fn dependency_cycle_is_reported_once() {
    let input = "\
action \"a\" {
  uses = \"./a\"
  needs = \"c\"
}
action \"b\" {
  uses = \"./b\"
  needs = \"a\"
}
action \"c\" {
  uses = \"./c\"
  needs = \"b\"
}
";
    assert_eq!(codes(input), vec![DiagnosticCode::CircularDependency]);
}

#[test]
fn names_are_unique_per_block_kind() {
    assert!(codes("workflow \"x\" {\n}\naction \"x\" {\n  uses = \"./x\"\n}\n").is_empty());
    assert_eq!(
        codes("action \"x\" {\n  uses = \"./x\"\n}\naction \"x\" {\n  uses = \"./y\"\n}\n"),
        vec![DiagnosticCode::DuplicateName]
    );
}

#[test]
fn misplaced_properties() {
    assert_eq!(
        codes("workflow \"w\" {\n  uses = \"./a\"\n}\naction \"a\" {\n  on = \"push\"\n  uses = \"./a\"\n}\n"),
        vec![
            DiagnosticCode::PropertyNotAllowed,
            DiagnosticCode::PropertyNotAllowed,
        ]
    );
}

#[test]
fn version_checks() {
    assert_eq!(
        codes("version = 1\nversion = 0\n"),
        vec![
            DiagnosticCode::UnsupportedVersion,
            DiagnosticCode::MultipleVersions,
        ]
    );
}

#[test]
fn empty_name_and_duplicate_property() {
    assert_eq!(
        codes("workflow \"\" {\n  on = \"push\"\n  on = \"fork\"\n}\n"),
        vec![DiagnosticCode::EmptyName, DiagnosticCode::DuplicateProperty]
    );
}

#[test]
fn long_needs_chain_is_linted() {
    let mut input = String::new();
    for index in 0..50_000 {
        input.push_str(&format!(
            "action \"a{index}\" {{\n  uses = \"./a\"\n  needs = \"a{}\"\n}}\n",
            index + 1
        ));
    }
    input.push_str("action \"a50000\" {\n  uses = \"./a\"\n}\n");
    assert!(codes(&input).is_empty());
}
