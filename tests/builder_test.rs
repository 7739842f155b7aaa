//! Integration tests for the tree builder and node lookups

use std::path::PathBuf;

use rstest::rstest;

use phosys::domain::{
    parse_document, ClosingMode, Container, Diagnostic, DiagnosticKind, DomainError, Leaf,
    NodeKind, NullSink, ParseOptions, Severity, TreeBuilder,
};
use phosys::util::testing::init_test_setup;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources/documents")
        .join(name)
}

fn parse(text: &str) -> (Container, Vec<Diagnostic>) {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let root = parse_document(text, &mut diagnostics).expect("valid document");
    (root, diagnostics)
}

// ============================================================
// well-formed documents
// ============================================================

#[test]
fn given_well_formed_document_when_parse_then_leaves_in_order_without_diagnostics() {
    init_test_setup();
    // Arrange
    let text = "===PHOSYS Start===\nname:Testlang\nautonym:\n===Meta Start===\nid:12345\n===Meta End===\n===PHOSYS End===\n";

    // Act
    let (root, diagnostics) = parse(text);

    // Assert
    assert!(diagnostics.is_empty());
    assert_eq!(root.name(), "PHOSYS");
    let names: Vec<&str> = root.children().iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["name", "autonym", "Meta"]);
    assert_eq!(root.get_leaf("name").unwrap().value(), "Testlang");
    assert_eq!(root.get_leaf("autonym").unwrap().value(), "");
    assert_eq!(
        root.get_container("Meta").unwrap().get_leaf("id").unwrap().value(),
        "12345"
    );
}

#[test]
fn given_fixture_when_parse_then_full_tree_resolves() {
    init_test_setup();
    // Arrange
    let text = std::fs::read_to_string(resource("testlang.language")).unwrap();

    // Act
    let (root, diagnostics) = parse(&text);

    // Assert
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
    assert_eq!(root.resolve("Meta/created").unwrap().value(), "2019-04-11");
    assert_eq!(
        root.resolve("Inventory/Consonants/b").unwrap().value(),
        "voiced bilabial plosive"
    );
    assert_eq!(root.resolve("Inventory/Vowels/a").unwrap().value(), "open front unrounded");

    let notes = root.get_container("Notes").unwrap();
    let values: Vec<&str> = notes.leaves().map(|l| l.value()).collect();
    assert_eq!(
        values,
        vec!["Free text without separator", "see: http://example.org"]
    );
    assert!(notes.leaves().all(|l| l.is_nameless()));
}

#[test]
fn given_value_with_second_separator_when_parse_then_nameless_leaf_with_whole_line() {
    let (root, diagnostics) = parse("===PHOSYS Start===\na:b:c\n===PHOSYS End===\n");

    assert!(diagnostics.is_empty());
    assert_eq!(root.len(), 1);
    let leaf = root.children()[0].as_leaf().unwrap();
    assert!(leaf.is_nameless());
    assert_eq!(leaf.value(), "a:b:c");
}

#[test]
fn given_blank_lines_when_parse_then_no_nodes_for_them() {
    let (root, diagnostics) = parse("===PHOSYS Start===\n\nx:1\n\n\ny:2\n===PHOSYS End===\n");

    assert!(diagnostics.is_empty());
    assert_eq!(root.len(), 2);
}

#[test]
fn given_empty_block_when_parse_then_empty_container() {
    let (root, _) = parse("===PHOSYS Start===\n===Empty Start===\n===Empty End===\n===PHOSYS End===\n");

    let empty = root.get_container("Empty").unwrap();
    assert!(empty.is_empty());
}

// ============================================================
// recovery
// ============================================================

#[test]
fn given_unclosed_block_when_parse_then_reported_and_content_kept_in_parent() {
    init_test_setup();
    // Arrange
    let text = "===PHOSYS Start===\n===A Start===\nfoo:bar\n===PHOSYS End===\n";

    // Act
    let (root, diagnostics) = parse(text);

    // Assert
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::UnclosedBlock);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].block, "A");
    assert_eq!(diagnostics[0].line, 2);
    assert!(root.get_container("A").unwrap_err().is_not_found());
    assert_eq!(root.get_leaf("foo").unwrap().value(), "bar");
}

#[test]
fn given_mismatched_closer_when_parse_then_kept_as_nameless_leaf() {
    let text = "===PHOSYS Start===\n===A Start===\n===B End===\nx:1\n===A End===\n===PHOSYS End===\n";

    let (root, diagnostics) = parse(text);

    assert!(diagnostics.is_empty());
    let a = root.get_container("A").unwrap();
    assert_eq!(a.len(), 2);
    let stray = a.children()[0].as_leaf().unwrap();
    assert!(stray.is_nameless());
    assert_eq!(stray.value(), "===B End===");
    assert_eq!(a.get_leaf("x").unwrap().value(), "1");
}

#[test]
fn given_root_closer_inside_nested_block_when_parse_then_absorbed_as_nameless_leaf() {
    init_test_setup();
    // Arrange
    let text = "===PHOSYS Start===\n===A Start===\nx:1\n===PHOSYS End===\n===A End===\n";

    // Act
    let (root, diagnostics) = parse(text);

    // Assert
    let expected = Container::with_children(
        "PHOSYS",
        vec![Container::with_children(
            "A",
            vec![Leaf::new("x", "1").into(), Leaf::nameless("===PHOSYS End===").into()],
        )
        .into()],
    );
    assert_eq!(root, expected);
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

#[test]
fn given_child_named_like_root_when_parse_then_child_kept_and_root_continues() {
    // Arrange
    let text = "===PHOSYS Start===\n===PHOSYS Start===\nx:1\n===PHOSYS End===\ny:2\n";

    // Act
    let (root, diagnostics) = parse(text);

    // Assert
    let expected = Container::with_children(
        "PHOSYS",
        vec![
            Container::with_children("PHOSYS", vec![Leaf::new("x", "1").into()]).into(),
            Leaf::new("y", "2").into(),
        ],
    );
    assert_eq!(root, expected);
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

#[test]
fn given_root_closer_two_levels_down_when_parse_then_innermost_block_absorbs_it() {
    let text = "===PHOSYS Start===\n===Outer Start===\n===Inner Start===\n===PHOSYS End===\n===Inner End===\n===Outer End===\n";

    let (root, diagnostics) = parse(text);

    let inner = root.get_container("Outer").unwrap().get_container("Inner").unwrap();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner.children()[0].as_leaf().unwrap().value(), "===PHOSYS End===");
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

#[test]
fn given_enclosing_closer_inside_inner_block_when_parse_then_enclosing_block_ends_first() {
    init_test_setup();
    // Arrange: `Outer End` sits inside Inner, but Outer is cut at its first closer
    let text = "===PHOSYS Start===\n===Outer Start===\n===Inner Start===\na:1\n===Outer End===\n===Inner End===\nb:2\n===Outer End===\n===PHOSYS End===\n";

    // Act
    let (root, diagnostics) = parse(text);

    // Assert
    let outer = root.get_container("Outer").unwrap();
    assert!(outer.get_container("Inner").is_err());
    assert_eq!(outer.get_value("a").unwrap(), "1");

    let stray: Vec<&str> = root
        .leaves()
        .filter(|leaf| leaf.is_nameless())
        .map(|leaf| leaf.value())
        .collect();
    assert_eq!(stray, vec!["===Inner End===", "===Outer End==="]);
    assert_eq!(root.get_value("b").unwrap(), "2");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].block, "Inner");
    assert_eq!(diagnostics[0].line, 3);
}

#[test]
fn given_unclosed_block_and_trailing_content_when_parse_then_diagnostics_in_document_order() {
    let text = "===PHOSYS Start===\n===A Start===\n===PHOSYS End===\nleftover\n";

    let (_, diagnostics) = parse(text);

    let found: Vec<(DiagnosticKind, usize)> = diagnostics.iter().map(|d| (d.kind, d.line)).collect();
    assert_eq!(
        found,
        vec![
            (DiagnosticKind::UnclosedBlock, 2),
            (DiagnosticKind::TrailingContent, 4),
        ]
    );
}

#[test]
fn given_damaged_fixture_when_parse_then_all_problems_reported() {
    init_test_setup();
    // Arrange
    let text = std::fs::read_to_string(resource("damaged.language")).unwrap();

    // Act
    let (root, diagnostics) = parse(&text);

    // Assert
    let unclosed: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::UnclosedBlock)
        .collect();
    assert_eq!(unclosed.len(), 1);
    assert_eq!(unclosed[0].block, "Orphan");
    assert_eq!(unclosed[0].line, 8);

    let trailing: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::TrailingContent)
        .collect();
    assert_eq!(trailing.len(), 1);
    assert_eq!(trailing[0].line, 11);
    assert!(!trailing[0].is_error());

    assert_eq!(root.resolve("Meta/Inventory/p").unwrap().value(), "plosive");
    assert_eq!(root.get_leaf("x").unwrap().value(), "1");

    let lines: Vec<usize> = diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![8, 11]);
}

#[test]
fn given_same_named_nesting_when_closing_modes_differ_then_trees_differ() {
    let text = "===PHOSYS Start===\n===A Start===\n===A Start===\nx:1\n===A End===\ny:2\n===A End===\n===PHOSYS End===\n";

    let (first_match, _) = parse(text);
    let nested = TreeBuilder::new(ParseOptions::default().with_closing(ClosingMode::Nested))
        .parse(text, &mut NullSink)
        .unwrap();

    // first match: the outer block ends at the first `A End`, the inner start is unclosed
    assert_eq!(first_match.get_container("A").unwrap().get_leaf("x").unwrap().value(), "1");
    assert!(first_match.get_container("A").unwrap().get_container("A").is_err());

    let outer = nested.get_container("A").unwrap();
    assert_eq!(outer.resolve("A/x").unwrap().value(), "1");
    assert_eq!(outer.get_leaf("y").unwrap().value(), "2");
}

// ============================================================
// invalid documents
// ============================================================

#[rstest]
#[case("")]
#[case("name:Testlang\n")]
#[case("===PHOSYS End===\n")]
#[case("=== Start===\n===  End===\n")]
fn given_bad_first_line_when_parse_then_not_a_valid_document(#[case] text: &str) {
    let err = parse_document(text, &mut NullSink).unwrap_err();

    assert!(matches!(err, DomainError::NotAValidDocument { .. }));
}

#[test]
fn given_required_root_name_when_matches_then_accepted() {
    let builder = TreeBuilder::new(ParseOptions::default().with_root_name("PHOSYS"));

    let ok = builder.parse("===PHOSYS Start===\n===PHOSYS End===\n", &mut NullSink);
    let rejected = builder.parse("===Other Start===\n===Other End===\n", &mut NullSink);

    assert!(ok.unwrap().is_empty());
    assert!(matches!(rejected, Err(DomainError::NotAValidDocument { .. })));
}

// ============================================================
// lookups
// ============================================================

#[test]
fn given_duplicate_names_when_lookup_then_first_match_wins() {
    let text = "===PHOSYS Start===\nname:first\n===Meta Start===\nid:1\n===Meta End===\nname:second\n===Meta Start===\nid:2\n===Meta End===\n===PHOSYS End===\n";

    let (root, _) = parse(text);

    assert_eq!(root.get_value("name").unwrap(), "first");
    assert_eq!(root.resolve("Meta/id").unwrap().value(), "1");
    let all: Vec<&str> = root.get_leaves("name").map(|l| l.value()).collect();
    assert_eq!(all, vec!["first", "second"]);
}

#[test]
fn given_missing_name_when_lookup_then_not_found_with_kind() {
    let (root, _) = parse("===PHOSYS Start===\nx:1\n===PHOSYS End===\n");

    let leaf_err = root.get_leaf("missing").unwrap_err();
    let container_err = root.get_container("x").unwrap_err();

    assert!(matches!(
        leaf_err,
        DomainError::NotFound { kind: NodeKind::Leaf, .. }
    ));
    assert!(matches!(
        container_err,
        DomainError::NotFound { kind: NodeKind::Container, .. }
    ));
}

#[test]
fn given_numeric_leaf_when_parse_value_then_typed() {
    let (root, _) = parse("===PHOSYS Start===\nid:12345\nname:Testlang\n===PHOSYS End===\n");

    let id: u32 = root.get_leaf("id").unwrap().parse().unwrap();
    let bad = root.get_leaf("name").unwrap().parse::<u32>();

    assert_eq!(id, 12345);
    assert!(matches!(bad, Err(DomainError::InvalidValue { .. })));
}

// ============================================================
// properties
// ============================================================

#[test]
fn given_same_input_when_parsed_twice_then_identical_results() {
    let text = std::fs::read_to_string(resource("damaged.language")).unwrap();

    let first = parse(&text);
    let second = parse(&text);

    assert_eq!(first, second);
}
