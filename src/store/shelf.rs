use serde::Deserialize;
use tracing::debug;

use crate::error::{LibraryError, LibraryResult};

/// How a shelf grows once every slot is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Add a fixed number of slots.
    Increment { step: usize },
    /// Double the slot count (an empty shelf grows to one slot).
    Doubling,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy::Increment { step: 2 }
    }
}

impl GrowthPolicy {
    /// Build an increment policy, refusing a step that could never grow.
    pub fn increment(step: usize) -> LibraryResult<Self> {
        let policy = GrowthPolicy::Increment { step };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> LibraryResult<()> {
        match self {
            GrowthPolicy::Increment { step: 0 } => {
                Err(LibraryError::invalid("growth step must be at least 1"))
            }
            _ => Ok(()),
        }
    }

    /// Capacity after one growth step.
    pub fn next_capacity(&self, current: usize) -> LibraryResult<usize> {
        let next = match self {
            GrowthPolicy::Increment { step } => current.checked_add(*step),
            GrowthPolicy::Doubling => current.checked_mul(2).map(|doubled| doubled.max(1)),
        };
        next.ok_or(LibraryError::AllocationFailure)
    }
}

/// Ordered, growable storage backing both the catalog and the roster.
///
/// Slots are reserved before anything is written, so a failed growth leaves
/// every existing entry where it was. Removal shifts later entries left to
/// keep listing order stable.
#[derive(Debug, Clone)]
pub struct Shelf<T> {
    items: Vec<T>,
    capacity: usize,
    growth: GrowthPolicy,
}

impl<T> Shelf<T> {
    pub fn with_capacity(capacity: usize, growth: GrowthPolicy) -> LibraryResult<Self> {
        growth.validate()?;
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|_| LibraryError::AllocationFailure)?;
        Ok(Self {
            items,
            capacity,
            growth,
        })
    }

    /// Append an item, growing first when full. Returns the item's index.
    pub fn push(&mut self, item: T) -> LibraryResult<usize> {
        if self.items.len() >= self.capacity {
            self.grow()?;
        }
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    fn grow(&mut self) -> LibraryResult<()> {
        let next = self.growth.next_capacity(self.capacity)?;
        let additional = next.saturating_sub(self.items.len());
        self.items
            .try_reserve_exact(additional)
            .map_err(|_| LibraryError::AllocationFailure)?;
        debug!(from = self.capacity, to = next, "shelf grown");
        self.capacity = next;
        Ok(())
    }

    /// Remove the entry at `index`, compacting the rest.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().position(predicate)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Slots available before the next growth step.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }
}

impl<'a, T> IntoIterator for &'a Shelf<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
