use std::sync::Arc;

use crate::feature::{ClassifiableOutlierGroup, Feature};

use super::{
    ClassifierType, DecisionTree, NamedOutlierGroupClassifier, OutlierGroupClassifier,
    SourceDecisionTree,
};

/// A generated tree together with where it came from.
#[derive(Debug, Clone)]
pub struct DecisionTreeStruct {
    pub name: String,
    pub sha256: String,
    pub source_code: String,
    pub filename: String,
    pub generation_seconds_since_1970: f64,
    pub input_sequences: Vec<String>,
    pub decision_features: Vec<Feature>,
    pub tree: Arc<dyn SourceDecisionTree>,
    pub classifier_type: ClassifierType,
}

impl OutlierGroupClassifier for DecisionTreeStruct {
    fn classification(&self, group: &dyn ClassifiableOutlierGroup) -> f64 {
        self.tree.classification(group)
    }
}

impl NamedOutlierGroupClassifier for DecisionTreeStruct {
    fn name(&self) -> &str {
        &self.name
    }

    fn classifier_type(&self) -> &ClassifierType {
        &self.classifier_type
    }
}

impl DecisionTree for DecisionTreeStruct {
    fn sha256(&self) -> &str {
        &self.sha256
    }

    fn generation_seconds_since_1970(&self) -> f64 {
        self.generation_seconds_since_1970
    }
}
