//! Inclusive Classifier
//!
//! Instances accumulate taxonomy positions in the order they are classified.
//! Repeating a classification records the position again.

use crate::taxonomy::Taxonomy;

use super::{ClassificationMode, ClassificationPolicy, Classifier};

/// Policy: a growing list of taxonomy positions per instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inclusive;

impl ClassificationPolicy for Inclusive {
    type Record = Vec<usize>;

    const MODE: ClassificationMode = ClassificationMode::Inclusive;

    fn open(index: usize) -> Vec<usize> {
        vec![index]
    }

    fn extend(record: &Vec<usize>, index: usize) -> Option<Vec<usize>> {
        let mut next = record.clone();
        next.push(index);
        Some(next)
    }

    fn indices(record: &Vec<usize>) -> Vec<usize> {
        record.clone()
    }
}

pub type InclusiveClassifier<T> = Classifier<T, Inclusive>;

/// Empty inclusive classifier for payload type `T`
pub fn new_inclusive<T>(taxonomy: Taxonomy) -> InclusiveClassifier<T> {
    Classifier::new(taxonomy)
}
