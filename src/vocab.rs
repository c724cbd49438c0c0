//! Ordered identifier sets.
//!
//! A [`Vocabulary`] fixes the order of states (or observation symbols) once,
//! and maps each identifier to its dense index. Every table in the model is
//! indexed through one of these.

use crate::error::{DecodeError, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Identifier usable as a state or an observation.
pub trait Symbol: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Symbol for T {}

/// Ordered set of distinct identifiers with O(1) lookup of their index.
#[derive(Clone, Debug)]
pub struct Vocabulary<T> {
    items: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T: Symbol> Vocabulary<T> {
    /// Build from items in their declared order.
    ///
    /// # Errors
    /// `InvalidModel` if the same identifier appears twice.
    pub fn new(items: Vec<T>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if index.insert(item.clone(), i).is_some() {
                return Err(DecodeError::invalid_model(format!(
                    "identifier {item:?} is declared more than once"
                )));
            }
        }
        Ok(Self { items, index })
    }

    /// Insert `item` at the end unless it is already present; returns its index.
    pub(crate) fn intern(&mut self, item: &T) -> usize {
        if let Some(&i) = self.index.get(item) {
            return i;
        }
        let i = self.items.len();
        self.items.push(item.clone());
        self.index.insert(item.clone(), i);
        i
    }

    pub(crate) fn empty() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[inline]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.index.get(item).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
