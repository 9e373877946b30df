//! Tests for CorpusTreeEngine: selection, expansion and search ranking

use std::collections::HashMap;

use rstest::{fixture, rstest};

use corpview::domain::{Corpus, CorpusTreeEngine, NodeId};
use corpview::util::testing;

// ============================================================
// Helpers
// ============================================================

fn id(engine: &CorpusTreeEngine, name: &str) -> NodeId {
    engine
        .find_by_name(name)
        .unwrap_or_else(|| panic!("no corpus named {name}"))
}

fn priority(engine: &CorpusTreeEngine, name: &str) -> u32 {
    engine.get(id(engine, name)).unwrap().priority
}

fn selected(engine: &CorpusTreeEngine, name: &str) -> bool {
    engine.get(id(engine, name)).unwrap().selected
}

fn names(engine: &CorpusTreeEngine, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|&id| engine.get(id).unwrap().name().to_string())
        .collect()
}

fn flags(engine: &CorpusTreeEngine) -> HashMap<NodeId, (bool, bool)> {
    engine
        .iter()
        .map(|(id, node)| (id, (node.selected, node.expanded)))
        .collect()
}

// Root
// ├── Child1
// │   ├── Grand1
// │   └── Grand2
// │       └── Great
// └── Child2
// Sibling
#[fixture]
fn deep_tree() -> CorpusTreeEngine {
    testing::init_test_setup();
    CorpusTreeEngine::with_corpora(vec![
        Corpus::new("Root").with_sub_corpora(vec![
            Corpus::new("Child1").with_sub_corpora(vec![
                Corpus::new("Grand1"),
                Corpus::new("Grand2").with_sub_corpora(vec![Corpus::new("Great")]),
            ]),
            Corpus::new("Child2"),
        ]),
        Corpus::new("Sibling"),
    ])
}

// ============================================================
// Load
// ============================================================

#[rstest]
fn given_new_tree_when_loading_then_every_node_has_default_flags(deep_tree: CorpusTreeEngine) {
    assert_eq!(deep_tree.len(), 7);
    for (_, node) in deep_tree.iter() {
        assert!(node.selected, "{} should start selected", node.name());
        assert!(!node.expanded, "{} should start collapsed", node.name());
        assert_eq!(node.priority, 1, "{} should start at priority 1", node.name());
    }
}

#[rstest]
fn given_mutated_tree_when_loading_again_then_flags_are_not_migrated(
    mut deep_tree: CorpusTreeEngine,
) {
    deep_tree.select_all(false);
    deep_tree.expand_all(true);
    deep_tree.search("great");

    deep_tree.load(vec![Corpus::new("Root").with_sub_corpora(vec![Corpus::new("Child1")])]);

    assert_eq!(deep_tree.len(), 2);
    assert!(deep_tree
        .iter()
        .all(|(_, n)| n.selected && !n.expanded && n.priority == 1));
}

// ============================================================
// Selection
// ============================================================

#[rstest]
fn given_two_levels_below_when_toggling_selection_then_whole_subtree_follows(
    mut deep_tree: CorpusTreeEngine,
) {
    let child1 = id(&deep_tree, "Child1");

    let value = deep_tree.toggle_selection(child1).unwrap();

    assert!(!value);
    for name in ["Child1", "Grand1", "Grand2", "Great"] {
        assert!(!selected(&deep_tree, name), "{name} should be deselected");
    }
    for name in ["Root", "Child2", "Sibling"] {
        assert!(selected(&deep_tree, name), "{name} should be untouched");
    }
}

#[rstest]
fn given_mixed_subtree_when_toggling_selection_then_value_is_applied_uniformly(
    mut deep_tree: CorpusTreeEngine,
) {
    let grand1 = id(&deep_tree, "Grand1");
    let child1 = id(&deep_tree, "Child1");
    deep_tree.toggle_selection(grand1).unwrap();
    assert!(!selected(&deep_tree, "Grand1"));

    // Child1 is still selected, so the toggle deselects everything below it
    deep_tree.toggle_selection(child1).unwrap();
    assert!(["Child1", "Grand1", "Grand2", "Great"]
        .iter()
        .all(|n| !selected(&deep_tree, n)));

    deep_tree.toggle_selection(child1).unwrap();
    assert!(["Child1", "Grand1", "Grand2", "Great"]
        .iter()
        .all(|n| selected(&deep_tree, n)));
}

#[rstest]
fn given_mixed_state_when_selecting_all_false_then_every_node_is_deselected(
    mut deep_tree: CorpusTreeEngine,
) {
    assert!(deep_tree.tree().depth() >= 3);
    let grand2 = id(&deep_tree, "Grand2");
    deep_tree.toggle_selection(grand2).unwrap();

    deep_tree.select_all(false);

    assert!(deep_tree.iter().all(|(_, n)| !n.selected));
    assert_eq!(deep_tree.stats().selected, 0);

    deep_tree.select_all(true);
    assert!(deep_tree.iter().all(|(_, n)| n.selected));
}

#[rstest]
fn given_selection_when_selecting_all_then_expansion_and_priority_are_untouched(
    mut deep_tree: CorpusTreeEngine,
) {
    let child1 = id(&deep_tree, "Child1");
    deep_tree.toggle_expansion(child1).unwrap();
    deep_tree.search("grand");
    let before: Vec<(bool, u32)> = deep_tree
        .iter()
        .map(|(_, n)| (n.expanded, n.priority))
        .collect();

    deep_tree.select_all(false);

    let after: Vec<(bool, u32)> = deep_tree
        .iter()
        .map(|(_, n)| (n.expanded, n.priority))
        .collect();
    assert_eq!(before, after);
}

// ============================================================
// Expansion
// ============================================================

#[rstest]
fn given_node_when_toggling_expansion_then_only_that_node_changes(
    mut deep_tree: CorpusTreeEngine,
) {
    let child1 = id(&deep_tree, "Child1");

    assert!(deep_tree.toggle_expansion(child1).unwrap());

    let expanded: Vec<String> = deep_tree
        .iter()
        .filter(|(_, n)| n.expanded)
        .map(|(_, n)| n.name().to_string())
        .collect();
    assert_eq!(expanded, ["Child1"]);

    assert!(!deep_tree.toggle_expansion(child1).unwrap());
    assert!(deep_tree.iter().all(|(_, n)| !n.expanded));
}

#[rstest]
fn given_collapsed_subtree_when_searching_and_toggling_then_subtree_is_still_walked(
    mut deep_tree: CorpusTreeEngine,
) {
    // everything is collapsed after load
    deep_tree.search("great");
    assert_eq!(priority(&deep_tree, "Great"), 1);

    let root = id(&deep_tree, "Root");
    deep_tree.toggle_selection(root).unwrap();
    assert!(!selected(&deep_tree, "Great"));
}

// ============================================================
// Search: scoring
// ============================================================

#[test]
fn given_name_description_and_language_match_when_searching_then_each_counts() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![Corpus::new("Czech Corpus")
        .with_description("czech texts")
        .with_languages(["Czech"])]);

    engine.search("czech");

    assert_eq!(priority(&engine, "Czech Corpus"), 3);
}

#[test]
fn given_institution_and_several_languages_when_searching_then_every_entry_counts() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![Corpus::new("Parallel")
        .with_institution("Institute of German Studies")
        .with_languages(["German", "Swiss German", "English"])]);

    engine.search("GERMAN");

    // institution + two language entries
    assert_eq!(priority(&engine, "Parallel"), 3);
}

#[test]
fn given_several_tokens_when_searching_then_scores_add_up() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![Corpus::new("Spoken Dutch")
        .with_description("recordings")
        .with_languages(["Dutch"])]);

    engine.search("dutch spoken");

    // "dutch": name + language, "spoken": name
    assert_eq!(priority(&engine, "Spoken Dutch"), 3);
}

#[test]
fn given_corpus_without_optional_fields_when_searching_then_nothing_fails() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![
        Corpus::new("Bare"),
        Corpus::new(""),
    ]);

    engine.search("bare");

    assert_eq!(priority(&engine, "Bare"), 1);
    assert_eq!(priority(&engine, ""), 0);
}

#[test]
fn given_double_space_when_searching_then_empty_token_matches_every_field() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![Corpus::new("Czech Corpus")
        .with_description("czech texts")
        .with_languages(["Czech"])]);

    engine.search("czech  q");

    // "czech": 3, "": 3 (name, description, language), "q": 0
    assert_eq!(priority(&engine, "Czech Corpus"), 6);
}

#[rstest]
fn given_repeated_search_when_scoring_then_priorities_do_not_accumulate(
    mut deep_tree: CorpusTreeEngine,
) {
    deep_tree.search("grand");
    let first: Vec<u32> = deep_tree.iter().map(|(_, n)| n.priority).collect();

    deep_tree.search("grand");
    let second: Vec<u32> = deep_tree.iter().map(|(_, n)| n.priority).collect();

    assert_eq!(first, second);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t")]
fn given_blank_query_when_searching_then_every_priority_is_one(
    mut deep_tree: CorpusTreeEngine,
    #[case] query: &str,
) {
    deep_tree.search("great");
    assert_eq!(priority(&deep_tree, "Sibling"), 0);

    deep_tree.search(query);

    assert!(deep_tree.iter().all(|(_, n)| n.priority == 1));
}

#[rstest]
fn given_empty_then_whitespace_query_when_searching_then_all_priorities_stay_one(
    mut deep_tree: CorpusTreeEngine,
) {
    deep_tree.search("");
    deep_tree.search("   ");

    assert!(deep_tree.iter().all(|(_, n)| n.priority == 1));
}

// ============================================================
// Search: propagation
// ============================================================

#[test]
fn given_one_matching_child_when_searching_then_parent_gets_exactly_one() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![Corpus::new("R").with_sub_corpora(vec![
        Corpus::new("alpha"),
        Corpus::new("beta").with_description("beta texts"),
    ])]);

    engine.search("beta");

    assert_eq!(priority(&engine, "alpha"), 0);
    assert_eq!(priority(&engine, "beta"), 2);
    assert_eq!(priority(&engine, "R"), 1);
}

#[test]
fn given_several_matching_children_when_searching_then_parent_still_gets_one() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![Corpus::new("R").with_sub_corpora(vec![
        Corpus::new("beta one"),
        Corpus::new("beta two"),
        Corpus::new("beta three"),
    ])]);

    engine.search("beta");

    assert_eq!(priority(&engine, "R"), 1);
}

#[test]
fn given_matching_parent_when_searching_then_children_do_not_add_to_it() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![Corpus::new("beta root")
        .with_sub_corpora(vec![Corpus::new("beta child").with_description("beta")])]);

    engine.search("beta");

    assert_eq!(priority(&engine, "beta root"), 1);
    assert_eq!(priority(&engine, "beta child"), 2);
}

#[rstest]
fn given_deep_match_when_searching_then_only_direct_parent_is_lifted(
    mut deep_tree: CorpusTreeEngine,
) {
    deep_tree.search("great");

    assert_eq!(priority(&deep_tree, "Great"), 1);
    assert_eq!(priority(&deep_tree, "Grand2"), 1);
    assert_eq!(priority(&deep_tree, "Child1"), 0);
    assert_eq!(priority(&deep_tree, "Root"), 0);
    assert_eq!(priority(&deep_tree, "Grand1"), 0);
    assert_eq!(priority(&deep_tree, "Child2"), 0);
    assert_eq!(priority(&deep_tree, "Sibling"), 0);
    assert_eq!(deep_tree.stats().matching, 2);
}

#[test]
fn given_match_two_levels_down_when_searching_then_grandparent_keeps_its_place() {
    // Arrange
    let mut engine = CorpusTreeEngine::with_corpora(vec![
        Corpus::new("G").with_sub_corpora(vec![
            Corpus::new("P").with_sub_corpora(vec![Corpus::new("match")]),
        ]),
        Corpus::new("Other"),
    ]);

    // Act
    engine.search("match");

    // Assert
    assert_eq!(priority(&engine, "match"), 1);
    assert_eq!(priority(&engine, "P"), 1);
    assert_eq!(priority(&engine, "G"), 0);
    assert_eq!(names(&engine, engine.roots()), ["G", "Other"]);
}

#[test]
fn given_lifted_child_when_searching_then_it_does_not_outrank_unmatched_sibling_of_parent() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![
        Corpus::new("Plain"),
        Corpus::new("Outer").with_sub_corpora(vec![
            Corpus::new("Inner").with_sub_corpora(vec![Corpus::new("deep hit")]),
        ]),
    ]);

    engine.search("hit");

    assert_eq!(priority(&engine, "Outer"), 0);
    assert_eq!(names(&engine, engine.roots()), ["Plain", "Outer"]);
}

// ============================================================
// Search: ordering
// ============================================================

#[test]
fn given_scored_siblings_when_searching_then_they_sort_by_priority_descending() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![Corpus::new("P").with_sub_corpora(vec![
        Corpus::new("X"),
        Corpus::new("Yq").with_description("q").with_languages(["q"]),
        Corpus::new("Zq"),
    ])]);

    engine.search("q");

    let p = id(&engine, "P");
    assert_eq!(names(&engine, engine.children(p)), ["Yq", "Zq", "X"]);
    assert_eq!(priority(&engine, "Yq"), 3);
}

#[test]
fn given_scored_roots_when_searching_then_root_list_is_sorted_too() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![
        Corpus::new("none"),
        Corpus::new("one match"),
        Corpus::new("match match").with_description("match"),
    ]);

    engine.search("match");

    assert_eq!(
        names(&engine, engine.roots()),
        ["match match", "one match", "none"]
    );
}

#[test]
fn given_equal_priorities_when_searching_then_current_order_is_kept() {
    let mut engine = CorpusTreeEngine::with_corpora(vec![
        Corpus::new("a"),
        Corpus::new("b x"),
        Corpus::new("c x"),
        Corpus::new("d"),
    ]);

    engine.search("x");
    assert_eq!(names(&engine, engine.roots()), ["b x", "c x", "a", "d"]);

    // nothing matches: all tie at 0, the previous order survives
    engine.search("zzz");
    assert_eq!(names(&engine, engine.roots()), ["b x", "c x", "a", "d"]);

    // empty query restores priorities but never re-sorts
    engine.search("");
    assert_eq!(names(&engine, engine.roots()), ["b x", "c x", "a", "d"]);
}

#[rstest]
fn given_sorted_tree_when_resolving_ids_then_they_still_point_to_the_same_nodes(
    mut deep_tree: CorpusTreeEngine,
) {
    let before: HashMap<NodeId, String> = deep_tree
        .iter()
        .map(|(id, n)| (id, n.name().to_string()))
        .collect();

    deep_tree.search("child2 sibling sib");

    for (id, name) in before {
        assert_eq!(deep_tree.get(id).unwrap().name(), name);
    }
    assert_eq!(names(&deep_tree, deep_tree.roots()), ["Sibling", "Root"]);
}

// ============================================================
// Search: round trip
// ============================================================

#[rstest]
fn given_custom_flags_when_searching_back_to_empty_then_flags_are_unchanged(
    mut deep_tree: CorpusTreeEngine,
) {
    let child1 = id(&deep_tree, "Child1");
    let grand2 = id(&deep_tree, "Grand2");
    deep_tree.toggle_expansion(child1).unwrap();
    deep_tree.toggle_selection(grand2).unwrap();
    let before = flags(&deep_tree);

    deep_tree.search("a");
    deep_tree.search("b");
    deep_tree.search("");

    assert!(deep_tree.iter().all(|(_, n)| n.priority == 1));
    assert_eq!(flags(&deep_tree), before);
}

#[test]
fn given_empty_engine_when_running_every_operation_then_nothing_happens() {
    let mut engine = CorpusTreeEngine::new();

    engine.search("anything");
    engine.search("");
    engine.select_all(false);

    assert!(engine.is_empty());
    assert_eq!(engine.stats().total, 0);
    assert!(engine.visible_rows().is_empty());
}

// ============================================================
// Fixture data
// ============================================================

#[test]
fn given_aggregator_corpora_when_searching_language_then_tree_is_ranked() {
    let json = std::fs::read_to_string("tests/resources/corpora/sample.json").unwrap();
    let corpora: Vec<Corpus> = serde_json::from_str(&json).unwrap();
    let mut engine = CorpusTreeEngine::with_corpora(corpora);

    engine.search("german");

    assert_eq!(
        names(&engine, engine.roots()),
        ["IDS Mannheim", "Czech National Corpus", "Meertens"]
    );
    assert_eq!(priority(&engine, "IDS Mannheim"), 2);
    assert_eq!(priority(&engine, "Czech National Corpus"), 1);
    assert_eq!(priority(&engine, "Meertens"), 0);

    let cnc = id(&engine, "Czech National Corpus");
    assert_eq!(names(&engine, engine.children(cnc)), ["InterCorp", "SYN2015"]);
}
