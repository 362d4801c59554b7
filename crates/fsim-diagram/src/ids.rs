use std::fmt;
use std::ops::{Index, IndexMut};

use fsim_core::RngHandle;
use serde::{Deserialize, Serialize};

/// Stable integer handle into one of the diagram pools.
pub trait PoolId: Copy + Eq + Ord + fmt::Debug + fmt::Display {
    /// Creates the handle for a pool position.
    fn from_index(index: usize) -> Self;

    /// Pool position addressed by the handle.
    fn index(self) -> usize;
}

macro_rules! pool_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Creates a new identifier from its raw integer representation.
            pub fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            /// Returns the raw integer representation of the identifier.
            pub fn as_raw(&self) -> usize {
                self.0
            }
        }

        impl PoolId for $name {
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pool_id!(
    /// Handle of a vertex in the vertex pool.
    VertexId
);
pool_id!(
    /// Handle of a fermionic propagator in the G pool.
    GLineId
);
pool_id!(
    /// Handle of an interaction line in the W pool.
    WLineId
);

/// Element stored in a [`Pool`]; every element knows its own handle.
pub trait PoolItem {
    /// Handle type addressing this element.
    type Id: PoolId;

    /// Handle the element is currently stored under.
    fn name(&self) -> Self::Id;

    /// Records the handle the element is stored under.
    fn set_name(&mut self, id: Self::Id);
}

/// Index-addressed storage for one kind of diagram element.
///
/// Handles are dense: the live elements occupy positions `0..len()`. Removing
/// an element moves the last element into the hole and renames it, which
/// leaves the vertex back-references stale until the diagram is repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool<T> {
    label: &'static str,
    items: Vec<T>,
}

impl<T: PoolItem> Pool<T> {
    /// Creates an empty pool with a label used in diagnostics.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            items: Vec::new(),
        }
    }

    /// Diagnostic label of the pool.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pool holds no element.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends an element and stamps it with its handle.
    pub fn add(&mut self, mut item: T) -> T::Id {
        let id = T::Id::from_index(self.items.len());
        item.set_name(id);
        self.items.push(item);
        id
    }

    /// Removes an element, moving the last element into its position.
    pub fn remove(&mut self, id: T::Id) -> T {
        self.check(id);
        let removed = self.items.swap_remove(id.index());
        if let Some(moved) = self.items.get_mut(id.index()) {
            moved.set_name(id);
        }
        removed
    }

    /// Returns the element behind a handle, if live.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.get(id.index())
    }

    /// Uniformly selects a live handle. Panics on an empty pool.
    pub fn random_pick(&self, rng: &mut RngHandle) -> T::Id {
        assert!(
            !self.items.is_empty(),
            "cannot pick from empty {} pool",
            self.label
        );
        T::Id::from_index(rng.index(self.items.len()))
    }

    /// Iterates over live elements in handle order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Mutable iteration over live elements in handle order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Iterates over live handles.
    pub fn ids(&self) -> impl Iterator<Item = T::Id> {
        (0..self.items.len()).map(T::Id::from_index)
    }

    fn check(&self, id: T::Id) {
        assert!(
            id.index() < self.items.len(),
            "{} index {} out of range (pool holds {})",
            self.label,
            id,
            self.items.len()
        );
    }
}

impl<T: PoolItem> Index<T::Id> for Pool<T> {
    type Output = T;

    fn index(&self, id: T::Id) -> &T {
        self.check(id);
        &self.items[id.index()]
    }
}

impl<T: PoolItem> IndexMut<T::Id> for Pool<T> {
    fn index_mut(&mut self, id: T::Id) -> &mut T {
        self.check(id);
        &mut self.items[id.index()]
    }
}
