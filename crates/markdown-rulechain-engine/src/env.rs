//! # Environment and extension bags
//!
//! [`Env`] is threaded through every rule invocation of one parse and into the
//! renderer. Built-in rules use it for the link reference table; plugins park
//! their own data in the typed [`Extensions`] bag instead of widening a sealed
//! record.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// A `TypeId`-keyed bag of plugin-owned values.
///
/// Each type gets at most one slot, so plugins should wrap their data in a
/// newtype they own.
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value`, returning the previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut::<T>())
    }

    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish()
    }
}

/// A link reference definition collected by the `reference` block rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reference {
    pub href: String,
    pub title: String,
}

/// Limit on empty cells a table may synthesize for short rows.
pub const DEFAULT_MAX_AUTOCOMPLETED_CELLS: usize = 0x10000;

/// Side channel shared by all rules of one parse and the renderer.
#[derive(Debug, Default)]
pub struct Env {
    /// Normalized label -> definition. The first definition of a label wins.
    pub references: HashMap<String, Reference>,
    /// Overrides [`DEFAULT_MAX_AUTOCOMPLETED_CELLS`] for the `table` rule.
    pub max_autocompleted_cells: Option<usize>,
    pub extensions: Extensions,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_autocompleted_cells(&self) -> usize {
        self.max_autocompleted_cells
            .unwrap_or(DEFAULT_MAX_AUTOCOMPLETED_CELLS)
    }
}
