//! Property tests for the seed matcher and the token oracle.

use indexmap::IndexMap;
use proptest::prelude::*;
use refgraph::core::{
    FileStructure, FunctionDef, QualifiedId, ReferenceOracle, TokenOracle, build_reference_graph,
    seed_matches,
};

fn one_file(raw: &str, functions: Vec<(String, String)>) -> refgraph::AggregateStructure {
    let mut map = IndexMap::new();
    for (name, body) in functions {
        map.insert(name, FunctionDef { body });
    }

    let mut aggregate = IndexMap::new();
    aggregate.insert(
        "a.js".to_string(),
        FileStructure {
            raw: raw.to_string(),
            functions: map,
            classes: IndexMap::new(),
        },
    );
    aggregate
}

proptest! {
    /// Function oracle ⇔ plain substring test for `name(`
    #[test]
    fn function_oracle_is_call_token_containment(
        text in "[ -~]{0,40}",
        name in "[a-zA-Z_][a-zA-Z0-9_]{0,7}",
    ) {
        let target = QualifiedId::function("a.js", &name);
        let expected = text.contains(&format!("{name}("));
        prop_assert_eq!(TokenOracle.references(&text, &target), expected);
    }

    /// Class oracle ⇔ plain substring test for `name `
    #[test]
    fn class_oracle_is_name_space_containment(
        text in "[ -~]{0,40}",
        name in "[A-Z][a-zA-Z0-9]{0,7}",
    ) {
        let target = QualifiedId::class("a.js", &name);
        let expected = text.contains(&format!("{name} "));
        prop_assert_eq!(TokenOracle.references(&text, &target), expected);
    }

    /// File oracle is constant false regardless of text
    #[test]
    fn file_oracle_never_matches(text in "[ -~]{0,40}") {
        let target = QualifiedId::file("a.js");
        prop_assert!(!TokenOracle.references(&text, &target));
    }

    /// File seeds on raw-text containment; functions seed on name containment
    #[test]
    fn seeding_tests_raw_for_files_and_names_for_functions(
        raw in "[ -~]{0,40}",
        name in "[a-z]{1,6}",
        body in "[ -~]{0,40}",
        keyword in "[a-z]{1,4}",
    ) {
        let aggregate = one_file(&raw, vec![(name.clone(), body)]);
        let seeds = seed_matches(&aggregate, &keyword);
        let seed_strs: Vec<&str> = seeds.iter().map(|s| s.as_str()).collect();

        prop_assert_eq!(seed_strs.contains(&"a.js"), raw.contains(&keyword));
        let function_id = format!("a.js.f-{name}");
        prop_assert_eq!(
            seed_strs.contains(&function_id.as_str()),
            name.contains(&keyword)
        );
    }

    /// File-only seeds never expand into edges
    #[test]
    fn file_seeds_produce_no_edges(raw in "[ -~]{0,40}") {
        let aggregate = one_file(&raw, vec![]);
        let seeds = vec![QualifiedId::file("a.js")];
        let edges = build_reference_graph(&aggregate, seeds, &TokenOracle);
        prop_assert!(edges.is_empty());
    }

    /// Identical runs produce identical edge lists
    #[test]
    fn traversal_is_deterministic(
        raw in "[ -~]{0,60}",
        name in "[a-z]{1,6}",
        keyword in "[a-z]{1,4}",
    ) {
        let body = format!("function {name}() {{ {raw} }}");
        let aggregate = one_file(&raw, vec![(name, body)]);

        let first = build_reference_graph(
            &aggregate,
            seed_matches(&aggregate, &keyword),
            &TokenOracle,
        );
        let second = build_reference_graph(
            &aggregate,
            seed_matches(&aggregate, &keyword),
            &TokenOracle,
        );

        let as_strs = |edges: &[refgraph::Edge]| -> Vec<(String, String)> {
            edges
                .iter()
                .map(|e| (e.referencing.to_string(), e.referenced.to_string()))
                .collect()
        };
        prop_assert_eq!(as_strs(&first), as_strs(&second));
    }
}
