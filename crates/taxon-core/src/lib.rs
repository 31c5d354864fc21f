//! Persistent two-tier taxonomies and the classifiers that bind values to
//! them.

pub mod classifier;
pub mod definition;
pub mod error;
pub mod taxonomy;

pub use error::{Result, TaxonError};
pub use taxonomy::{
    FirstTierBind, SubsequentTierBind, TaxonomicItem, Taxonomy, TaxonomyHead, TaxonomyParts,
};

// Classification
pub use classifier::{
    new_exclusive, new_inclusive, ClassificationMode, ClassificationPolicy, Classified,
    Classifier, Exclusive, ExclusiveClassifier, Inclusive, InclusiveClassifier,
};
pub use definition::{
    Assignment, AssignmentDefinition, AssignmentReport, BuildReport, ItemDefinition,
    TaxonomyDefinition,
};
