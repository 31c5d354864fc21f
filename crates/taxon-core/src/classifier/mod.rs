//! # Classifier Module
//!
//! Binds instances of one payload type `T` to items of one fixed
//! [`Taxonomy`]. Two policies share the same base:
//!
//! - **Exclusive**: an instance holds at most one classification, ever.
//! - **Inclusive**: an instance accumulates classifications over time.
//!
//! Like `Taxonomy`, classifiers are values: `classify` returns a new
//! classifier and leaves the receiver untouched. Items that do not belong to
//! the bound taxonomy are ignored.
//!
//! ```rust
//! use taxon_core::{new_exclusive, new_inclusive, Taxonomy};
//!
//! let t = Taxonomy::new("Life").add_item("Flora", None);
//! let flora = t.items()[0].clone();
//! let t = t.add_item("Rose", Some(&flora));
//! let rose = t.items()[1].clone();
//!
//! let pets = new_exclusive(t.clone())
//!     .classify(&rose, "mittens")
//!     .classify(&flora, "mittens");
//! assert_eq!(pets.classification_indices(&"mittens"), vec![1]);
//!
//! let tags = new_inclusive(t)
//!     .classify(&flora, "rover")
//!     .classify(&rose, "rover");
//! assert_eq!(tags.classification_indices(&"rover"), vec![0, 1]);
//! ```

mod exclusive;
mod inclusive;

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{Result, TaxonError};
use crate::taxonomy::{TaxonomicItem, Taxonomy};

pub use exclusive::{new_exclusive, Exclusive, ExclusiveClassifier};
pub use inclusive::{new_inclusive, Inclusive, InclusiveClassifier};

/// Classification mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    Exclusive,
    Inclusive,
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclusive => write!(f, "exclusive"),
            Self::Inclusive => write!(f, "inclusive"),
        }
    }
}

/// How a classifier records taxonomy positions for one instance
pub trait ClassificationPolicy: Copy + Default + fmt::Debug + PartialEq {
    /// Per-instance classification state
    type Record: Clone + fmt::Debug + PartialEq;

    const MODE: ClassificationMode;

    /// Record for an instance classified for the first time
    fn open(index: usize) -> Self::Record;

    /// Record after classifying an already-known instance again.
    ///
    /// `None` rejects the classification.
    fn extend(record: &Self::Record, index: usize) -> Option<Self::Record>;

    /// Taxonomy positions held by `record`, in classification order
    fn indices(record: &Self::Record) -> Vec<usize>;
}

/// One classified instance and its record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classified<T, R> {
    pub instance: T,
    pub record: R,
}

/// Classifier over payload type `T`, bound to one taxonomy.
///
/// Entries keep first-classification order. Serialized snapshots carry
/// `mode`, `taxonomy` and `entries`; deserialization goes through
/// [`Classifier::from_parts`].
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier<T, P: ClassificationPolicy> {
    taxonomy: Taxonomy,
    entries: Vec<Classified<T, P::Record>>,
    policy: PhantomData<P>,
}

impl<T, P: ClassificationPolicy> Classifier<T, P> {
    /// Empty classifier bound to `taxonomy`
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy,
            entries: Vec::new(),
            policy: PhantomData,
        }
    }

    pub fn mode(&self) -> ClassificationMode {
        P::MODE
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn entries(&self) -> &[Classified<T, P::Record>] {
        &self.entries
    }

    /// Classified instances, in first-classification order
    pub fn classified_instances(&self) -> Vec<&T> {
        self.entries.iter().map(|e| &e.instance).collect()
    }

    /// Records aligned with [`classified_instances`](Self::classified_instances)
    pub fn classifications(&self) -> Vec<&P::Record> {
        self.entries.iter().map(|e| &e.record).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of instances classified under each taxonomy position
    pub fn classification_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            let mut indices = P::indices(&entry.record);
            indices.sort_unstable();
            indices.dedup();
            for index in indices {
                *counts.entry(index).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl<T: PartialEq + Clone, P: ClassificationPolicy> Classifier<T, P> {
    /// Classify `instance` under `item`.
    ///
    /// No-op when `item` is not part of the bound taxonomy, or when the
    /// policy refuses to extend an existing record.
    pub fn classify(&self, item: &TaxonomicItem, instance: T) -> Self {
        let Some(index) = self.taxonomy.index_of(item) else {
            debug!(
                taxonomy = %self.taxonomy.name(),
                item = %item.name(),
                "item not in taxonomy, classification ignored"
            );
            return self.clone();
        };

        let mut next = self.clone();
        match self.position_of(&instance) {
            None => next.entries.push(Classified {
                instance,
                record: P::open(index),
            }),
            Some(position) => match P::extend(&self.entries[position].record, index) {
                Some(record) => next.entries[position].record = record,
                None => {
                    debug!(
                        taxonomy = %self.taxonomy.name(),
                        item = %item.name(),
                        mode = %P::MODE,
                        "instance already classified, classification ignored"
                    );
                }
            },
        }
        next
    }

    pub fn is_classified(&self, instance: &T) -> bool {
        self.position_of(instance).is_some()
    }

    /// Taxonomy positions assigned to `instance`; empty when unclassified
    pub fn classification_indices(&self, instance: &T) -> Vec<usize> {
        self.record_of(instance).map(P::indices).unwrap_or_default()
    }

    /// Taxonomy items assigned to `instance`
    pub fn classified_items(&self, instance: &T) -> Vec<&TaxonomicItem> {
        self.classification_indices(instance)
            .into_iter()
            .filter_map(|i| self.taxonomy.get(i))
            .collect()
    }

    /// Instances classified under `item`
    pub fn instances_in(&self, item: &TaxonomicItem) -> Vec<&T> {
        let Some(index) = self.taxonomy.index_of(item) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|e| P::indices(&e.record).contains(&index))
            .map(|e| &e.instance)
            .collect()
    }

    pub fn record_of(&self, instance: &T) -> Option<&P::Record> {
        self.position_of(instance).map(|p| &self.entries[p].record)
    }

    fn position_of(&self, instance: &T) -> Option<usize> {
        self.entries.iter().position(|e| e.instance == *instance)
    }
}

impl<T: PartialEq, P: ClassificationPolicy> Classifier<T, P> {
    /// Rebuild a classifier from its entries.
    ///
    /// Fails when an instance appears twice, when a record holds no
    /// position, or when a position lies outside `taxonomy`.
    pub fn from_parts(taxonomy: Taxonomy, entries: Vec<Classified<T, P::Record>>) -> Result<Self> {
        for (position, entry) in entries.iter().enumerate() {
            if entries[..position].iter().any(|e| e.instance == entry.instance) {
                return Err(TaxonError::InvalidEntry {
                    position,
                    reason: "repeats an earlier instance",
                });
            }
            let indices = P::indices(&entry.record);
            if indices.is_empty() {
                return Err(TaxonError::InvalidEntry {
                    position,
                    reason: "holds no taxonomy position",
                });
            }
            if indices.iter().any(|&i| i >= taxonomy.len()) {
                return Err(TaxonError::InvalidEntry {
                    position,
                    reason: "points outside the taxonomy",
                });
            }
        }

        Ok(Self {
            taxonomy,
            entries,
            policy: PhantomData,
        })
    }
}

impl<T, P> Serialize for Classifier<T, P>
where
    T: Serialize,
    P: ClassificationPolicy,
    P::Record: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Classifier", 3)?;
        state.serialize_field("mode", &P::MODE)?;
        state.serialize_field("taxonomy", &self.taxonomy)?;
        state.serialize_field("entries", &self.entries)?;
        state.end()
    }
}

impl<'de, T, P> Deserialize<'de> for Classifier<T, P>
where
    T: Deserialize<'de> + PartialEq,
    P: ClassificationPolicy,
    P::Record: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Snapshot<T, R> {
            #[serde(default)]
            mode: Option<ClassificationMode>,
            taxonomy: Taxonomy,
            #[serde(default = "Vec::new")]
            entries: Vec<Classified<T, R>>,
        }

        let snapshot = Snapshot::<T, P::Record>::deserialize(deserializer)?;
        if let Some(mode) = snapshot.mode {
            if mode != P::MODE {
                return Err(serde::de::Error::custom(format!(
                    "expected a {} classifier, found {}",
                    P::MODE,
                    mode
                )));
            }
        }
        Self::from_parts(snapshot.taxonomy, snapshot.entries).map_err(serde::de::Error::custom)
    }
}
