use std::sync::Arc;

use crate::feature::ClassifiableOutlierGroup;

use super::{
    ClassifierType, DecisionForestParams, NamedOutlierGroupClassifier, OutlierGroupClassifier,
};

/// A member tree and the weight its vote carries, usually its test score.
#[derive(Clone)]
pub struct WeightedTree {
    pub tree: Arc<dyn OutlierGroupClassifier>,
    pub weight: f64,
}

impl std::fmt::Debug for WeightedTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedTree")
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

/// Averages the weighted scores of its member trees.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    trees: Vec<WeightedTree>,
    classifier_type: ClassifierType,
}

impl ForestClassifier {
    pub fn new(name: impl Into<String>, trees: Vec<WeightedTree>) -> Self {
        let params = DecisionForestParams {
            name: name.into(),
            tree_count: trees.len(),
            tree_names: Vec::new(),
        };
        Self {
            trees,
            classifier_type: ClassifierType::Forest(params),
        }
    }

    /// Records the names of the member trees in the forest's parameters.
    pub fn with_tree_names(mut self, names: Vec<String>) -> Self {
        if let ClassifierType::Forest(params) = &mut self.classifier_type {
            params.tree_names = names;
        }
        self
    }

    pub fn trees(&self) -> &[WeightedTree] {
        &self.trees
    }
}

impl OutlierGroupClassifier for ForestClassifier {
    /// `sum(score * weight) / tree_count`; an empty forest scores `0`.
    fn classification(&self, group: &dyn ClassifiableOutlierGroup) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .trees
            .iter()
            .map(|member| member.tree.classification(group) * member.weight)
            .sum();
        total / self.trees.len() as f64
    }
}

impl NamedOutlierGroupClassifier for ForestClassifier {
    fn name(&self) -> &str {
        self.classifier_type.name()
    }

    fn classifier_type(&self) -> &ClassifierType {
        &self.classifier_type
    }
}
