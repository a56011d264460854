use std::str::FromStr;
use std::sync::Arc;

use super::*;
use crate::feature::OutlierGroupFeatureData;

fn brightness_tree() -> DecisionTreeNode {
    DecisionTreeNode::split(
        Feature::Size,
        0.5,
        Arc::new(FullyNegativeTreeNode { indent: 2 }),
        Arc::new(LinearChoiceTreeNode {
            feature: Feature::MaxBrightness,
            min: 0.0,
            max: 100.0,
            indent: 2,
        }),
        0,
        4,
    )
}

fn group(pairs: &[(Feature, f64)]) -> OutlierGroupFeatureData {
    let features: Vec<Feature> = pairs.iter().map(|(f, _)| *f).collect();
    let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
    OutlierGroupFeatureData::new(&features, &values)
}

/// A chain of splits on `Size`, each one level deeper, ending in leaves.
fn chain(depth: usize, levels: usize, new_method_level: usize) -> Arc<dyn SourceDecisionTree> {
    if depth == levels {
        return Arc::new(FullyPositiveTreeNode { indent: depth + 1 });
    }
    Arc::new(DecisionTreeNode::split(
        Feature::Size,
        depth as f64,
        Arc::new(FullyNegativeTreeNode { indent: depth + 2 }),
        chain(depth + 1, levels, new_method_level),
        depth,
        new_method_level,
    ))
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn split_routes_on_threshold() {
    let tree = brightness_tree();

    let small = group(&[(Feature::Size, 0.2), (Feature::MaxBrightness, 90.0)]);
    assert_eq!(tree.classification(&small), -1.0);

    let large = group(&[(Feature::Size, 0.7), (Feature::MaxBrightness, 75.0)]);
    assert_eq!(tree.classification(&large), 0.5);

    // equal to the threshold goes right
    let edge = group(&[(Feature::Size, 0.5), (Feature::MaxBrightness, 0.0)]);
    assert_eq!(tree.classification(&edge), -1.0);
}

#[test]
fn parallel_arrays_treat_missing_features_as_zero() {
    let tree = brightness_tree();

    assert_eq!(
        tree.classification_of(&[Feature::MaxBrightness, Feature::Size], &[100.0, 0.9]),
        1.0
    );
    // no size supplied: 0.0 < 0.5
    assert_eq!(tree.classification_of(&[Feature::MaxBrightness], &[100.0]), -1.0);
}

#[test]
fn stump_returns_stored_scores() {
    let node = DecisionTreeNode::split(
        Feature::Width,
        0.3,
        Arc::new(FullyPositiveTreeNode::default()),
        Arc::new(FullyNegativeTreeNode::default()),
        0,
        4,
    )
    .stumped(-0.25, 0.75);

    assert_eq!(node.classification(&group(&[(Feature::Width, 0.1)])), -0.25);
    assert_eq!(node.classification(&group(&[(Feature::Width, 0.3)])), 0.75);
}

#[test]
fn feature_vectors_are_classifiable() {
    let tree = brightness_tree();
    let data = group(&[(Feature::Size, 0.9), (Feature::MaxBrightness, 25.0)]).feature_data();
    assert_eq!(tree.classification(&data), -0.5);
}

#[test]
fn forest_averages_weighted_votes() {
    let forest = ForestClassifier::new(
        "forest",
        vec![
            WeightedTree {
                tree: Arc::new(FullyPositiveTreeNode::default()),
                weight: 0.5,
            },
            WeightedTree {
                tree: Arc::new(FullyNegativeTreeNode::default()),
                weight: 1.0,
            },
        ],
    )
    .with_tree_names(vec!["a".into(), "b".into()]);

    assert_eq!(forest.classification(&group(&[])), -0.25);
    assert_eq!(forest.name(), "forest");
    match forest.classifier_type() {
        ClassifierType::Forest(params) => {
            assert_eq!(params.tree_count, 2);
            assert_eq!(params.tree_names, vec!["a", "b"]);
        }
        other => panic!("unexpected type {other:?}"),
    }

    let empty = ForestClassifier::new("empty", Vec::new());
    assert_eq!(empty.classification(&group(&[])), 0.0);
}

#[test]
fn tree_struct_delegates_and_keeps_provenance() {
    let params = DecisionTreeParams {
        name: "abc123".into(),
        input_sequences: vec!["night-1".into()],
        positive_training_size: 10,
        negative_training_size: 20,
        decision_features: vec![Feature::Size, Feature::MaxBrightness],
        decision_split_types: vec![DecisionSplitType::Median, DecisionSplitType::Mean],
        max_depth: Some(8),
        pruned: false,
    };
    let tree: Arc<dyn SourceDecisionTree> = Arc::new(brightness_tree());
    let decision_tree = DecisionTreeStruct {
        name: params.name.clone(),
        sha256: "abc123def".into(),
        source_code: render_source(tree.as_ref(), "classify"),
        filename: "tree_abc123.rs".into(),
        generation_seconds_since_1970: 1_700_000_000.0,
        input_sequences: params.input_sequences.clone(),
        decision_features: params.decision_features.clone(),
        tree,
        classifier_type: ClassifierType::Tree(params),
    };

    assert_eq!(decision_tree.name(), "abc123");
    assert_eq!(decision_tree.sha256(), "abc123def");
    assert_eq!(decision_tree.generation_seconds_since_1970(), 1_700_000_000.0);
    assert_eq!(decision_tree.classifier_type().name(), "abc123");
    assert!(decision_tree.source_code.starts_with("fn classify("));
    assert_eq!(
        decision_tree.classification(&group(&[(Feature::Size, 1.0), (Feature::MaxBrightness, 50.0)])),
        0.0
    );
}

#[test]
fn split_types_round_trip_names() {
    assert_eq!(DecisionSplitType::Median.to_string(), "median");
    assert_eq!(DecisionSplitType::from_str("mean"), Ok(DecisionSplitType::Mean));
}

// =============================================================================
// Source rendering
// =============================================================================

#[test]
fn stump_renders_both_returns() {
    let node = DecisionTreeNode::split(
        Feature::Width,
        0.3,
        Arc::new(FullyPositiveTreeNode::default()),
        Arc::new(FullyNegativeTreeNode::default()),
        0,
        4,
    )
    .stumped(-0.25, 0.75);

    let expected = "fn classify(group: &dyn ClassifiableOutlierGroup) -> f64 {\n\
        \x20   if group.decision_tree_value(Feature::Width) < 0.3 {\n\
        \x20       return -0.25;\n\
        \x20   } else {\n\
        \x20       return 0.75;\n\
        \x20   }\n\
        }\n";
    assert_eq!(render_source(&node, "classify"), expected);
}

#[test]
fn leaves_render_returns() {
    let linear = LinearChoiceTreeNode {
        feature: Feature::MaxBrightness,
        min: 10.0,
        max: 20.0,
        indent: 1,
    };
    let (source, subtrees) = linear.source_code();
    assert_eq!(
        source,
        "    return (group.decision_tree_value(Feature::MaxBrightness) - 10.0) / (20.0 - 10.0) * 2.0 - 1.0;"
    );
    assert!(subtrees.is_empty());
    assert_eq!(FullyNegativeTreeNode { indent: 0 }.source_code().0, "return -1.0;");
}

#[test]
fn shallow_tree_renders_inline() {
    let source = render_source(&brightness_tree(), "classify");
    assert!(source.contains("if group.decision_tree_value(Feature::Size) < 0.5 {"));
    assert!(source.contains("        return -1.0;"));
    assert!(!source.contains("subtree_"));
}

#[test]
fn deep_splits_move_into_subtree_functions() {
    // nodes at depth 2 and 4 start new functions
    let tree = chain(0, 5, 2);
    let (_, direct) = tree.source_code();
    assert_eq!(direct.len(), 1);

    let source = render_source(tree.as_ref(), "classify");
    assert_eq!(source.matches("fn subtree_").count(), 2);

    let first = direct[0].method_name();
    assert!(source.contains(&format!("return {first}(group);")));
    let (_, nested) = direct[0].source_code();
    assert_eq!(nested.len(), 1);
    let second = nested[0].method_name();

    // depth first: root, then the depth 2 subtree, then the depth 4 one
    let root_at = source.find("fn classify(").unwrap();
    let first_at = source.find(&format!("fn {first}(")).unwrap();
    let second_at = source.find(&format!("fn {second}(")).unwrap();
    assert!(root_at < first_at && first_at < second_at);
}

#[test]
fn identical_subtrees_are_written_once() {
    let deep = || -> Arc<dyn SourceDecisionTree> {
        Arc::new(DecisionTreeNode::split(
            Feature::Height,
            0.25,
            Arc::new(FullyPositiveTreeNode { indent: 2 }),
            Arc::new(FullyNegativeTreeNode { indent: 2 }),
            2,
            2,
        ))
    };
    let middle = |value: f64| -> Arc<dyn SourceDecisionTree> {
        Arc::new(DecisionTreeNode::split(Feature::Width, value, deep(), deep(), 1, 2))
    };
    let root = DecisionTreeNode::split(Feature::Size, 0.5, middle(0.1), middle(0.9), 0, 2);

    let source = render_source(&root, "classify");
    assert_eq!(source.matches("fn subtree_").count(), 1);
    assert_eq!(source.matches("(group);").count(), 4);
}

#[test]
#[should_panic(expected = "new_method_level must be positive")]
fn zero_method_level_rejected() {
    DecisionTreeNode::split(
        Feature::Size,
        0.0,
        Arc::new(FullyPositiveTreeNode::default()),
        Arc::new(FullyNegativeTreeNode::default()),
        0,
        0,
    );
}
