//! Exclusive Classifier
//!
//! Each instance is classified at most once. Reclassifying requires building
//! a new classifier from scratch.

use crate::taxonomy::Taxonomy;

use super::{ClassificationMode, ClassificationPolicy, Classifier};

/// Policy: one taxonomy position per instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exclusive;

impl ClassificationPolicy for Exclusive {
    type Record = usize;

    const MODE: ClassificationMode = ClassificationMode::Exclusive;

    fn open(index: usize) -> usize {
        index
    }

    fn extend(_record: &usize, _index: usize) -> Option<usize> {
        None
    }

    fn indices(record: &usize) -> Vec<usize> {
        vec![*record]
    }
}

pub type ExclusiveClassifier<T> = Classifier<T, Exclusive>;

/// Empty exclusive classifier for payload type `T`
pub fn new_exclusive<T>(taxonomy: Taxonomy) -> ExclusiveClassifier<T> {
    Classifier::new(taxonomy)
}
