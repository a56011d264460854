//! Scoring blobs from their feature vectors.
//!
//! Every classifier maps a blob to a score in `[-1, 1]`: `-1` means
//! certainly not paintable, `+1` certainly paintable, `0` unknown.

mod forest;
mod nodes;
mod tree_struct;

#[cfg(test)]
mod tests;

use std::fmt::Write;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::feature::{ClassifiableOutlierGroup, Feature, OutlierGroupFeatureData};

pub use forest::{ForestClassifier, WeightedTree};
pub use nodes::{
    DecisionSubtree, DecisionTreeNode, FullyNegativeTreeNode, FullyPositiveTreeNode,
    LinearChoiceTreeNode,
};
pub use tree_struct::DecisionTreeStruct;

/// Base scoring contract.
pub trait OutlierGroupClassifier: Send + Sync {
    fn classification(&self, group: &dyn ClassifiableOutlierGroup) -> f64;

    /// Scores parallel `features` / `values` arrays. Features not supplied
    /// read as `0.0`.
    fn classification_of(&self, features: &[Feature], values: &[f64]) -> f64 {
        self.classification(&OutlierGroupFeatureData::new(features, values))
    }
}

/// A classifier with a name and the parameters it was built with.
pub trait NamedOutlierGroupClassifier: OutlierGroupClassifier {
    fn name(&self) -> &str;

    fn classifier_type(&self) -> &ClassifierType;
}

/// A trained tree carrying provenance.
pub trait DecisionTree: NamedOutlierGroupClassifier {
    fn sha256(&self) -> &str;

    fn generation_seconds_since_1970(&self) -> f64;
}

/// A tree that can write itself out as Rust source.
///
/// `source_code` returns the statements for this node and every subtree
/// split off below it. Each subtree renders its own function.
pub trait SourceDecisionTree: OutlierGroupClassifier + std::fmt::Debug {
    fn source_code(&self) -> (String, Vec<DecisionSubtree>);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassifierType {
    Tree(DecisionTreeParams),
    Forest(DecisionForestParams),
}

impl ClassifierType {
    pub fn name(&self) -> &str {
        match self {
            ClassifierType::Tree(params) => &params.name,
            ClassifierType::Forest(params) => &params.name,
        }
    }
}

/// How a training split picks its threshold.
#[derive(
    Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DecisionSplitType {
    Median,
    Mean,
}

/// Hyperparameters a tree was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeParams {
    pub name: String,
    pub input_sequences: Vec<String>,
    pub positive_training_size: usize,
    pub negative_training_size: usize,
    pub decision_features: Vec<Feature>,
    pub decision_split_types: Vec<DecisionSplitType>,
    pub max_depth: Option<usize>,
    pub pruned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionForestParams {
    pub name: String,
    pub tree_count: usize,
    pub tree_names: Vec<String>,
}

const INDENT: &str = "    ";

pub(crate) fn indentation(levels: usize) -> String {
    INDENT.repeat(levels)
}

/// Renders `tree` as a standalone Rust function named `function_name`,
/// followed by every subtree function it references, depth first.
///
/// Subtrees with identical bodies share a name and are written once.
pub fn render_source(tree: &dyn SourceDecisionTree, function_name: &str) -> String {
    let (body, subtrees) = tree.source_code();

    let mut source = String::new();
    write_function(&mut source, function_name, &body);

    let mut written = HashSet::new();
    let mut pending: Vec<DecisionSubtree> = subtrees.into_iter().rev().collect();
    while let Some(subtree) = pending.pop() {
        if !written.insert(subtree.method_name().to_string()) {
            continue;
        }
        let (function, nested) = subtree.source_code();
        source.push('\n');
        source.push_str(&function);
        pending.extend(nested.into_iter().rev());
    }
    source
}

pub(crate) fn write_function(out: &mut String, name: &str, body: &str) {
    // writing to a String cannot fail
    let _ = writeln!(
        out,
        "fn {name}(group: &dyn ClassifiableOutlierGroup) -> f64 {{\n{body}\n}}"
    );
}
