//! Membership-unique containers used by the query algebra.

use indexmap::IndexSet;
use std::hash::Hash;

use world_model::{Choice, State};

use crate::events::{Event, Path};

/// A set with deterministic (insertion) iteration order.
#[derive(Debug, Clone)]
pub struct NarrativeSet<T: Hash + Eq> {
    items: IndexSet<T>,
}

/// A set of states.
pub type StateSet = NarrativeSet<State>;
/// A set of choices.
pub type ChoiceSet = NarrativeSet<Choice>;
/// A set of events.
pub type EventSet = NarrativeSet<Event>;
/// A set of paths.
pub type PathSet = NarrativeSet<Path>;

impl<T: Hash + Eq> NarrativeSet<T> {
    pub fn new() -> Self {
        Self {
            items: IndexSet::new(),
        }
    }

    /// Insert an item. Returns `false` if it was already present.
    pub fn insert(&mut self, item: T) -> bool {
        self.items.insert(item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, T> {
        self.items.iter()
    }

    /// Whether every item of `self` is in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.items.is_subset(&other.items)
    }
}

impl<T: Hash + Eq + Clone> NarrativeSet<T> {
    /// Items in either set.
    pub fn union(&self, other: &Self) -> Self {
        self.items.union(&other.items).cloned().collect()
    }

    /// Items in both sets.
    pub fn intersection(&self, other: &Self) -> Self {
        self.items.intersection(&other.items).cloned().collect()
    }

    /// Items of `self` not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.items.difference(&other.items).cloned().collect()
    }
}

impl<T: Hash + Eq> Default for NarrativeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Set equality, independent of insertion order.
impl<T: Hash + Eq> PartialEq for NarrativeSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Hash + Eq> Eq for NarrativeSet<T> {}

impl<T: Hash + Eq> FromIterator<T> for NarrativeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: Hash + Eq> Extend<T> for NarrativeSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T: Hash + Eq> IntoIterator for NarrativeSet<T> {
    type Item = T;
    type IntoIter = indexmap::set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T: Hash + Eq> IntoIterator for &'a NarrativeSet<T> {
    type Item = &'a T;
    type IntoIter = indexmap::set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Hash + Eq, const N: usize> From<[T; N]> for NarrativeSet<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<T: Hash + Eq + std::fmt::Display> std::fmt::Display for NarrativeSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for item in &self.items {
            writeln!(f, "-- {}", item)?;
        }
        Ok(())
    }
}
