//! Declarative Definitions
//!
//! TOML documents describing a taxonomy and a batch of classifications.
//! Invalid entries are skipped with a warning instead of failing the whole
//! batch.
//!
//! ```toml
//! name = "Life"
//!
//! [[items]]
//! name = "Flora"
//!
//! [[items]]
//! name = "Rose"
//! parent = "Flora"
//!
//! [[assignments]]
//! instance = "mittens"
//! item = "Rose"
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classifier::{ClassificationMode, ClassificationPolicy, Classifier};
use crate::error::Result;
use crate::taxonomy::{TaxonomicItem, Taxonomy};

/// Taxonomy section of a definition document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDefinition {
    /// Head name
    pub name: String,
    /// Items in insertion order
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub name: String,
    /// Name of an earlier item; first tier when absent
    #[serde(default)]
    pub parent: Option<String>,
}

/// Result of building a taxonomy from a definition
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub taxonomy: Taxonomy,
    /// Entries that were skipped
    pub warnings: Vec<String>,
}

impl TaxonomyDefinition {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build the taxonomy, skipping items whose parent cannot be resolved
    pub fn build(&self) -> BuildReport {
        let mut taxonomy = Taxonomy::new(&self.name);
        let mut warnings = Vec::new();

        for entry in &self.items {
            let parent = match &entry.parent {
                None => None,
                Some(parent_name) => match find_by_name(&taxonomy, parent_name) {
                    Some(parent) => Some(parent.clone()),
                    None => {
                        warn!(
                            taxonomy = %self.name,
                            item = %entry.name,
                            parent = %parent_name,
                            "skipping item with unknown parent"
                        );
                        warnings.push(format!(
                            "Skipped '{}': parent '{}' is not an earlier item",
                            entry.name, parent_name
                        ));
                        continue;
                    }
                },
            };
            taxonomy = taxonomy.add_item(entry.name.as_str(), parent.as_ref());
        }

        BuildReport { taxonomy, warnings }
    }
}

/// Classification section of a definition document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentDefinition {
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub instance: String,
    /// Name of the taxonomy item
    pub item: String,
}

/// Result of applying assignments to a classifier
#[derive(Debug, Clone)]
pub struct AssignmentReport<P: ClassificationPolicy> {
    pub classifier: Classifier<String, P>,
    /// Assignments that had no effect
    pub warnings: Vec<String>,
}

impl AssignmentDefinition {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Classify every assignment in order, starting from `classifier`
    pub fn apply<P: ClassificationPolicy>(
        &self,
        classifier: Classifier<String, P>,
    ) -> AssignmentReport<P> {
        let mut classifier = classifier;
        let mut warnings = Vec::new();

        for assignment in &self.assignments {
            let Some(item) = find_by_name(classifier.taxonomy(), &assignment.item).cloned() else {
                warn!(
                    instance = %assignment.instance,
                    item = %assignment.item,
                    "skipping assignment to unknown item"
                );
                warnings.push(format!(
                    "Skipped '{}': item '{}' not found",
                    assignment.instance, assignment.item
                ));
                continue;
            };

            if P::MODE == ClassificationMode::Exclusive
                && classifier.is_classified(&assignment.instance)
            {
                warnings.push(format!(
                    "Skipped '{}': already classified ({} mode)",
                    assignment.instance,
                    classifier.mode()
                ));
                continue;
            }
            classifier = classifier.classify(&item, assignment.instance.clone());
        }

        AssignmentReport {
            classifier,
            warnings,
        }
    }
}

fn find_by_name<'a>(taxonomy: &'a Taxonomy, name: &str) -> Option<&'a TaxonomicItem> {
    taxonomy.items().iter().find(|i| i.name() == name)
}
