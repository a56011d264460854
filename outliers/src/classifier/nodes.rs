use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use crate::feature::{ClassifiableOutlierGroup, Feature};

use super::{OutlierGroupClassifier, SourceDecisionTree, indentation, write_function};

// statements start one level in, inside the generated function body
const INITIAL_INDENT: usize = 1;

/// Splits on `feature < value` and defers to one of two subtrees.
///
/// A stumped node stops there and returns the stored score for the side of
/// the split the value falls on.
#[derive(Debug, Clone)]
pub struct DecisionTreeNode {
    pub feature: Feature,
    pub value: f64,
    pub less_than: Arc<dyn SourceDecisionTree>,
    pub greater_than: Arc<dyn SourceDecisionTree>,
    pub less_than_stump_value: f64,
    pub greater_than_stump_value: f64,
    pub stump: bool,
    /// Recursion depth of this node.
    pub indent: usize,
    /// Depth interval at which rendering moves into a new function.
    pub new_method_level: usize,
}

impl DecisionTreeNode {
    /// # Panics
    ///
    /// Panics if `new_method_level` is zero.
    pub fn split(
        feature: Feature,
        value: f64,
        less_than: Arc<dyn SourceDecisionTree>,
        greater_than: Arc<dyn SourceDecisionTree>,
        indent: usize,
        new_method_level: usize,
    ) -> Self {
        assert!(new_method_level > 0, "new_method_level must be positive");
        Self {
            feature,
            value,
            less_than,
            greater_than,
            less_than_stump_value: 0.0,
            greater_than_stump_value: 0.0,
            stump: false,
            indent,
            new_method_level,
        }
    }

    /// Cuts the tree off here with fixed scores for each side.
    pub fn stumped(mut self, less_than_value: f64, greater_than_value: f64) -> Self {
        self.stump = true;
        self.less_than_stump_value = less_than_value;
        self.greater_than_stump_value = greater_than_value;
        self
    }

    fn indentation(&self) -> String {
        indentation(INITIAL_INDENT + self.indent % self.new_method_level)
    }

    fn condition(&self) -> String {
        format!(
            "group.decision_tree_value(Feature::{:?}) < {:?}",
            self.feature, self.value
        )
    }

    /// Renders the split inline, regardless of depth.
    pub(crate) fn inline_source_code(&self) -> (String, Vec<DecisionSubtree>) {
        let (less_source, mut subtrees) = self.less_than.source_code();
        let (greater_source, greater_subtrees) = self.greater_than.source_code();
        subtrees.extend(greater_subtrees);

        let indent = self.indentation();
        let source = format!(
            "{indent}if {} {{\n{less_source}\n{indent}}} else {{\n{greater_source}\n{indent}}}",
            self.condition()
        );
        (source, subtrees)
    }
}

impl OutlierGroupClassifier for DecisionTreeNode {
    fn classification(&self, group: &dyn ClassifiableOutlierGroup) -> f64 {
        let value = group.decision_tree_value(self.feature);
        match (self.stump, value < self.value) {
            (true, true) => self.less_than_stump_value,
            (true, false) => self.greater_than_stump_value,
            (false, true) => self.less_than.classification(group),
            (false, false) => self.greater_than.classification(group),
        }
    }
}

impl SourceDecisionTree for DecisionTreeNode {
    fn source_code(&self) -> (String, Vec<DecisionSubtree>) {
        let indent = self.indentation();
        if self.stump {
            let source = format!(
                "{indent}if {} {{\n{indent}{INNER}return {:?};\n{indent}}} else {{\n{indent}{INNER}return {:?};\n{indent}}}",
                self.condition(),
                self.less_than_stump_value,
                self.greater_than_stump_value,
                INNER = super::INDENT,
            );
            return (source, Vec::new());
        }

        if self.indent != 0 && self.indent % self.new_method_level == 0 {
            let subtree = DecisionSubtree::new(self);
            let source = format!(
                "{}return {}(group);",
                indentation(INITIAL_INDENT + self.new_method_level),
                subtree.method_name()
            );
            return (source, vec![subtree]);
        }

        self.inline_source_code()
    }
}

/// A node rendered as its own function to keep generated functions small.
#[derive(Debug, Clone)]
pub struct DecisionSubtree {
    method_name: String,
    body: String,
    subtrees: Vec<DecisionSubtree>,
}

impl DecisionSubtree {
    pub fn new(root: &DecisionTreeNode) -> Self {
        let (body, subtrees) = root.inline_source_code();
        let mut hasher = DefaultHasher::new();
        body.hash(&mut hasher);
        Self {
            method_name: format!("subtree_{:016x}", hasher.finish()),
            body,
            subtrees,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The subtree's function and the subtrees it calls in turn.
    pub fn source_code(&self) -> (String, Vec<DecisionSubtree>) {
        let mut function = String::new();
        write_function(&mut function, &self.method_name, &self.body);
        (function, self.subtrees.clone())
    }
}

/// Leaf that is always certain the blob should be painted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullyPositiveTreeNode {
    pub indent: usize,
}

impl OutlierGroupClassifier for FullyPositiveTreeNode {
    fn classification(&self, _group: &dyn ClassifiableOutlierGroup) -> f64 {
        1.0
    }
}

impl SourceDecisionTree for FullyPositiveTreeNode {
    fn source_code(&self) -> (String, Vec<DecisionSubtree>) {
        (format!("{}return 1.0;", indentation(self.indent)), Vec::new())
    }
}

/// Leaf that is always certain the blob should be kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullyNegativeTreeNode {
    pub indent: usize,
}

impl OutlierGroupClassifier for FullyNegativeTreeNode {
    fn classification(&self, _group: &dyn ClassifiableOutlierGroup) -> f64 {
        -1.0
    }
}

impl SourceDecisionTree for FullyNegativeTreeNode {
    fn source_code(&self) -> (String, Vec<DecisionSubtree>) {
        (format!("{}return -1.0;", indentation(self.indent)), Vec::new())
    }
}

/// Leaf mapping a feature linearly from `[min, max]` onto `[-1, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct LinearChoiceTreeNode {
    pub feature: Feature,
    pub min: f64,
    pub max: f64,
    pub indent: usize,
}

impl LinearChoiceTreeNode {
    fn score(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min) * 2.0 - 1.0
    }
}

impl OutlierGroupClassifier for LinearChoiceTreeNode {
    fn classification(&self, group: &dyn ClassifiableOutlierGroup) -> f64 {
        self.score(group.decision_tree_value(self.feature))
    }
}

impl SourceDecisionTree for LinearChoiceTreeNode {
    fn source_code(&self) -> (String, Vec<DecisionSubtree>) {
        let source = format!(
            "{}return (group.decision_tree_value(Feature::{:?}) - {min:?}) / ({max:?} - {min:?}) * 2.0 - 1.0;",
            indentation(self.indent),
            self.feature,
            min = self.min,
            max = self.max,
        );
        (source, Vec::new())
    }
}
