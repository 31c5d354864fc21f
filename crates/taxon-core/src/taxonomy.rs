//! Taxonomy
//!
//! An append-only, two-tier tree of named items. Every mutator returns a new
//! `Taxonomy`; earlier values stay valid snapshots.
//!
//! ```rust
//! use taxon_core::Taxonomy;
//!
//! let life = Taxonomy::new("Life");
//! let life = life.add_item("Flora", None);
//! let flora = life.items()[0].clone();
//! let life = life.add_item("Rose", Some(&flora));
//!
//! let children: Vec<&str> = life.children(Some(&flora)).iter().map(|i| i.name()).collect();
//! assert_eq!(children, vec!["Rose"]);
//! assert_eq!(life.index_of(&flora), Some(0));
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TaxonError};

/// Named root of a taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomyHead {
    pub name: String,
}

/// A named node placed into a taxonomy.
///
/// Equality is by name; two items built with the same name compare equal
/// even when they come from different taxonomies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxonomicItem {
    name: String,
}

impl TaxonomicItem {
    pub(crate) fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Records that `child` hangs directly under the head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstTierBind {
    pub taxonomy: TaxonomyHead,
    pub child: TaxonomicItem,
}

/// Records that `child` hangs under another item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsequentTierBind {
    pub parent: TaxonomicItem,
    pub child: TaxonomicItem,
}

/// Raw layout of a taxonomy, checked by [`Taxonomy::from_parts`].
///
/// `first_tier` and `subsequent_tiers` hold the positions in `items` of the
/// child of each bind, in bind order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyParts {
    pub taxonomy_head: TaxonomyHead,
    #[serde(default)]
    pub items: Vec<TaxonomicItem>,
    #[serde(default)]
    pub first_tier: Vec<usize>,
    #[serde(default)]
    pub first_tier_binds: Vec<FirstTierBind>,
    #[serde(default)]
    pub subsequent_tiers: Vec<usize>,
    #[serde(default)]
    pub subsequent_tier_binds: Vec<SubsequentTierBind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyParts", into = "TaxonomyParts")]
pub struct Taxonomy {
    head: TaxonomyHead,
    /// All items in insertion order; the source of truth for indices
    items: Vec<TaxonomicItem>,
    first_tier: Vec<usize>,
    first_tier_binds: Vec<FirstTierBind>,
    subsequent_tiers: Vec<usize>,
    subsequent_tier_binds: Vec<SubsequentTierBind>,
}

impl Taxonomy {
    /// Create an empty taxonomy whose head is `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            head: TaxonomyHead { name: name.into() },
            items: Vec::new(),
            first_tier: Vec::new(),
            first_tier_binds: Vec::new(),
            subsequent_tiers: Vec::new(),
            subsequent_tier_binds: Vec::new(),
        }
    }

    /// Rebuild a taxonomy from its raw layout.
    ///
    /// Fails when the tier lists do not account for every item exactly once,
    /// when a bind disagrees with the item at its recorded position, or when
    /// a subsequent-tier parent is not an earlier item.
    pub fn from_parts(parts: TaxonomyParts) -> Result<Self> {
        let TaxonomyParts {
            taxonomy_head,
            items,
            first_tier,
            first_tier_binds,
            subsequent_tiers,
            subsequent_tier_binds,
        } = parts;

        if items.len() != first_tier_binds.len() + subsequent_tier_binds.len()
            || first_tier.len() != first_tier_binds.len()
            || subsequent_tiers.len() != subsequent_tier_binds.len()
        {
            return Err(TaxonError::TierCountMismatch {
                items: items.len(),
                first_tier: first_tier_binds.len(),
                subsequent_tier: subsequent_tier_binds.len(),
            });
        }

        let mut first = first_tier.iter().zip(&first_tier_binds).peekable();
        let mut subsequent = subsequent_tiers
            .iter()
            .zip(&subsequent_tier_binds)
            .peekable();

        // Both position lists must interleave to exactly 0..items.len()
        for (position, item) in items.iter().enumerate() {
            if let Some((_, bind)) = first.next_if(|(p, _)| **p == position) {
                if bind.child != *item || bind.taxonomy != taxonomy_head {
                    return Err(TaxonError::BindMismatch { position });
                }
            } else if let Some((_, bind)) = subsequent.next_if(|(p, _)| **p == position) {
                if bind.child != *item {
                    return Err(TaxonError::BindMismatch { position });
                }
                if !items[..position].contains(&bind.parent) {
                    return Err(TaxonError::UnknownParent {
                        parent: bind.parent.name.clone(),
                    });
                }
            } else {
                return Err(TaxonError::BindMismatch { position });
            }
        }

        Ok(Self {
            head: taxonomy_head,
            items,
            first_tier,
            first_tier_binds,
            subsequent_tiers,
            subsequent_tier_binds,
        })
    }

    pub fn name(&self) -> &str {
        &self.head.name
    }

    pub fn head(&self) -> &TaxonomyHead {
        &self.head
    }

    pub fn items(&self) -> &[TaxonomicItem] {
        &self.items
    }

    pub fn first_tier_binds(&self) -> &[FirstTierBind] {
        &self.first_tier_binds
    }

    pub fn subsequent_tier_binds(&self) -> &[SubsequentTierBind] {
        &self.subsequent_tier_binds
    }

    /// Positions of first-tier items, in bind order
    pub fn first_tier(&self) -> &[usize] {
        &self.first_tier
    }

    /// Positions of subsequent-tier items, in bind order
    pub fn subsequent_tiers(&self) -> &[usize] {
        &self.subsequent_tiers
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TaxonomicItem> {
        self.items.get(index)
    }

    pub fn contains(&self, item: &TaxonomicItem) -> bool {
        self.items.contains(item)
    }

    /// Append a new item named `name`.
    ///
    /// Without a parent the item joins the first tier. With a parent that is
    /// not an item of this taxonomy the call is a no-op and returns an
    /// unchanged copy.
    pub fn add_item(&self, name: impl Into<String>, parent: Option<&TaxonomicItem>) -> Self {
        let name = name.into();

        if let Some(parent) = parent {
            if !self.contains(parent) {
                debug!(
                    taxonomy = %self.head.name,
                    parent = %parent.name,
                    item = %name,
                    "parent not in taxonomy, item not added"
                );
                return self.clone();
            }
        }

        let item = TaxonomicItem::named(name);
        let position = self.items.len();
        let mut next = self.clone();
        next.items.push(item.clone());

        match parent {
            None => {
                next.first_tier.push(position);
                next.first_tier_binds.push(FirstTierBind {
                    taxonomy: self.head.clone(),
                    child: item,
                });
            }
            Some(parent) => {
                next.subsequent_tiers.push(position);
                next.subsequent_tier_binds.push(SubsequentTierBind {
                    parent: parent.clone(),
                    child: item,
                });
            }
        }

        debug_assert_eq!(
            next.items.len(),
            next.first_tier_binds.len() + next.subsequent_tier_binds.len()
        );
        next
    }

    /// Direct children of `target`, or the first tier when `target` is `None`.
    pub fn children(&self, target: Option<&TaxonomicItem>) -> Vec<&TaxonomicItem> {
        match target {
            None => self.first_tier_binds.iter().map(|b| &b.child).collect(),
            Some(target) => self
                .subsequent_tier_binds
                .iter()
                .filter(|b| b.parent == *target)
                .map(|b| &b.child)
                .collect(),
        }
    }

    /// Every item reachable below `target`, breadth-first.
    ///
    /// `None` yields all items in insertion order. `target` itself is never
    /// part of the result.
    pub fn descendants(&self, target: Option<&TaxonomicItem>) -> Vec<&TaxonomicItem> {
        let Some(target) = target else {
            return self.items.iter().collect();
        };

        let mut visited: Vec<bool> = self.items.iter().map(|i| i == target).collect();
        let mut queue = VecDeque::from([target]);
        let mut found = Vec::new();

        // Each position is enqueued at most once, so this is bounded by len()
        while let Some(current) = queue.pop_front() {
            for (bind, &position) in self
                .subsequent_tier_binds
                .iter()
                .zip(&self.subsequent_tiers)
            {
                if bind.parent != *current || visited[position] {
                    continue;
                }
                visited[position] = true;
                let child = &self.items[position];
                found.push(position);
                queue.push_back(child);
            }
        }

        found.into_iter().map(|p| &self.items[p]).collect()
    }

    /// Parent recorded for `item`; `None` for first-tier or unknown items
    pub fn parent_of(&self, item: &TaxonomicItem) -> Option<&TaxonomicItem> {
        self.subsequent_tier_binds
            .iter()
            .find(|b| b.child == *item)
            .map(|b| &b.parent)
    }

    /// Position of the first item equal to `target`
    pub fn index_of(&self, target: &TaxonomicItem) -> Option<usize> {
        self.items.iter().position(|i| i == target)
    }

    /// [`index_of`](Self::index_of) for each target, keeping input positions
    pub fn indices_of<'a, I>(&self, targets: I) -> Vec<Option<usize>>
    where
        I: IntoIterator<Item = &'a TaxonomicItem>,
    {
        targets.into_iter().map(|t| self.index_of(t)).collect()
    }
}

impl TryFrom<TaxonomyParts> for Taxonomy {
    type Error = TaxonError;

    fn try_from(parts: TaxonomyParts) -> Result<Self> {
        Self::from_parts(parts)
    }
}

impl From<Taxonomy> for TaxonomyParts {
    fn from(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy_head: taxonomy.head,
            items: taxonomy.items,
            first_tier: taxonomy.first_tier,
            first_tier_binds: taxonomy.first_tier_binds,
            subsequent_tiers: taxonomy.subsequent_tiers,
            subsequent_tier_binds: taxonomy.subsequent_tier_binds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(items: &[&'a TaxonomicItem]) -> Vec<&'a str> {
        items.iter().map(|i| i.name()).collect()
    }

    fn assert_tier_count(taxonomy: &Taxonomy) {
        assert_eq!(
            taxonomy.items().len(),
            taxonomy.first_tier_binds().len() + taxonomy.subsequent_tier_binds().len()
        );
    }

    /// Life -> Flora -> Rose, Life -> Fauna -> {Cat -> Lion, Dog}
    fn life() -> Taxonomy {
        let t = Taxonomy::new("Life")
            .add_item("Flora", None)
            .add_item("Fauna", None);
        let flora = t.items()[0].clone();
        let fauna = t.items()[1].clone();
        let t = t
            .add_item("Rose", Some(&flora))
            .add_item("Cat", Some(&fauna))
            .add_item("Dog", Some(&fauna));
        let cat = t.items()[3].clone();
        t.add_item("Lion", Some(&cat))
    }

    #[test]
    fn test_initial_state() {
        let t = Taxonomy::new("Life");
        assert_eq!(t.name(), "Life");
        assert!(t.is_empty());
        assert!(t.first_tier().is_empty());
        assert!(t.first_tier_binds().is_empty());
        assert!(t.subsequent_tiers().is_empty());
        assert!(t.subsequent_tier_binds().is_empty());
        assert!(t.children(None).is_empty());
        assert!(t.descendants(None).is_empty());
    }

    #[test]
    fn test_first_tier_state() {
        let t = Taxonomy::new("Life").add_item("Flora", None);
        assert_eq!(t.items()[0].name(), "Flora");
        assert_eq!(t.first_tier(), &[0]);
        assert_eq!(t.first_tier_binds().len(), 1);
        assert_eq!(t.first_tier_binds()[0].taxonomy.name, "Life");
        assert!(t.subsequent_tier_binds().is_empty());
        assert!(t.children(Some(&t.items()[0])).is_empty());
    }

    #[test]
    fn test_subsequent_tier_state() {
        let t1 = Taxonomy::new("Life").add_item("Flora", None);
        let flora = t1.items()[0].clone();
        let t2 = t1.add_item("Rose", Some(&flora));

        assert_eq!(t2.len(), 2);
        assert_eq!(t2.first_tier(), &[0]);
        assert_eq!(t2.subsequent_tiers(), &[1]);
        assert_eq!(t2.subsequent_tier_binds()[0].parent, flora);
        assert_eq!(names(&t2.children(Some(&flora))), vec!["Rose"]);
        assert_eq!(names(&t2.descendants(None)), vec!["Flora", "Rose"]);
        assert_eq!(t2.parent_of(&t2.items()[1]), Some(&flora));
        assert_eq!(t2.parent_of(&flora), None);
    }

    #[test]
    fn test_tier_count_holds_after_every_add() {
        let mut t = Taxonomy::new("Life");
        assert_tier_count(&t);
        for i in 0..10 {
            let parent = if i % 3 == 0 {
                None
            } else {
                t.items().last().cloned()
            };
            t = t.add_item(format!("item-{i}"), parent.as_ref());
            assert_tier_count(&t);
        }
        assert_eq!(t.len(), 10);
    }

    #[test]
    fn test_add_item_leaves_previous_snapshot_untouched() {
        let t1 = Taxonomy::new("Life").add_item("Flora", None);
        let before = t1.clone();
        let t2 = t1.add_item("Fauna", None);

        assert_eq!(t1, before);
        assert_eq!(t1.len(), 1);
        assert_eq!(t2.len(), 2);
    }

    #[test]
    fn test_add_item_with_foreign_parent_is_noop() {
        let t = Taxonomy::new("Life").add_item("Flora", None);
        let other = Taxonomy::new("Minerals").add_item("Quartz", None);

        let unchanged = t.add_item("Rose", Some(&other.items()[0]));
        assert_eq!(unchanged, t);
    }

    #[test]
    fn test_duplicate_names_coexist() {
        let t = Taxonomy::new("Life")
            .add_item("Rose", None)
            .add_item("Rose", None);
        assert_eq!(t.len(), 2);
        // Value equality resolves to the first occurrence
        assert_eq!(t.index_of(&t.items()[1]), Some(0));
    }

    #[test]
    fn test_children_of_first_tier() {
        let t = life();
        assert_eq!(names(&t.children(None)), vec!["Flora", "Fauna"]);
        assert_eq!(names(&t.children(Some(&t.items()[1]))), vec!["Cat", "Dog"]);
        assert!(t.children(Some(&t.items()[2])).is_empty());
    }

    #[test]
    fn test_descendants_is_transitive_and_breadth_first() {
        let t = life();
        let fauna = &t.items()[1];
        assert_eq!(names(&t.descendants(Some(fauna))), vec!["Cat", "Dog", "Lion"]);

        let flora = &t.items()[0];
        assert_eq!(names(&t.descendants(Some(flora))), vec!["Rose"]);

        let lion = &t.items()[5];
        assert!(t.descendants(Some(lion)).is_empty());
    }

    #[test]
    fn test_descendants_excludes_self_named_children() {
        let t = Taxonomy::new("Loop").add_item("A", None);
        let a = t.items()[0].clone();
        let t = t.add_item("A", Some(&a)).add_item("B", Some(&a));

        // The nested "A" equals its parent by value, so it is never revisited
        assert_eq!(names(&t.descendants(Some(&a))), vec!["B"]);
    }

    #[test]
    fn test_descendants_same_name_in_two_branches() {
        let t = Taxonomy::new("Life").add_item("A", None);
        let a = t.items()[0].clone();
        let t = t.add_item("B", Some(&a)).add_item("A", None);
        let second_a = t.items()[2].clone();
        let t = t.add_item("C", Some(&second_a));

        assert_eq!(names(&t.children(Some(&a))), vec!["B", "C"]);
        assert_eq!(names(&t.descendants(Some(&a))), vec!["B", "C"]);
        assert_eq!(names(&t.descendants(Some(&second_a))), vec!["B", "C"]);
    }

    #[test]
    fn test_descendants_visits_each_position_once() {
        let t = Taxonomy::new("Life").add_item("A", None);
        let a = t.items()[0].clone();
        let t = t.add_item("B", Some(&a));
        let b = t.items()[1].clone();
        let t = t.add_item("A", Some(&b)).add_item("C", Some(&a));

        assert_eq!(names(&t.descendants(Some(&a))), vec!["B", "C"]);
        assert_eq!(names(&t.descendants(Some(&b))), vec!["A", "C"]);
    }

    #[test]
    fn test_descendants_of_unknown_item_is_empty() {
        let t = life();
        let other = Taxonomy::new("Minerals").add_item("Quartz", None);
        assert!(t.descendants(Some(&other.items()[0])).is_empty());
    }

    #[test]
    fn test_indices_of_preserves_positions() {
        let t = life();
        let other = Taxonomy::new("Minerals").add_item("Quartz", None);
        let targets = [&t.items()[3], &other.items()[0], &t.items()[0]];

        assert_eq!(t.indices_of(targets), vec![Some(3), None, Some(0)]);
    }

    #[test]
    fn test_from_parts_round_trip() {
        let t = life();
        let rebuilt = Taxonomy::from_parts(TaxonomyParts::from(t.clone())).unwrap();
        assert_eq!(rebuilt, t);
    }

    #[test]
    fn test_from_parts_rejects_tier_count_mismatch() {
        let mut parts = TaxonomyParts::from(life());
        parts.subsequent_tier_binds.pop();
        parts.subsequent_tiers.pop();

        let err = Taxonomy::from_parts(parts).unwrap_err();
        assert!(matches!(err, TaxonError::TierCountMismatch { items: 6, .. }));
    }

    #[test]
    fn test_from_parts_rejects_forward_parent() {
        let t = Taxonomy::new("Life").add_item("Flora", None);
        let flora = t.items()[0].clone();
        let mut parts = TaxonomyParts::from(t.add_item("Rose", Some(&flora)));
        parts.subsequent_tier_binds[0].parent = TaxonomicItem::named("Rose");

        let err = Taxonomy::from_parts(parts).unwrap_err();
        assert!(matches!(err, TaxonError::UnknownParent { ref parent } if parent == "Rose"));
    }

    #[test]
    fn test_from_parts_rejects_misplaced_bind() {
        let mut parts = TaxonomyParts::from(life());
        parts.first_tier.swap(0, 1);

        let err = Taxonomy::from_parts(parts).unwrap_err();
        assert!(matches!(err, TaxonError::BindMismatch { position: 0 }));
    }

    #[test]
    fn test_json_round_trip_and_validation() {
        let t = life();
        let json = serde_json::to_string(&t).unwrap();
        let back: Taxonomy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);

        let corrupt = r#"{
            "taxonomy_head": {"name": "Life"},
            "items": [{"name": "Flora"}],
            "first_tier": [],
            "first_tier_binds": [],
            "subsequent_tiers": [],
            "subsequent_tier_binds": []
        }"#;
        assert!(serde_json::from_str::<Taxonomy>(corrupt).is_err());
    }
}
