use std::fmt;

use serde::{Deserialize, Serialize};

use crate::convention::D;

/// Lattice site: unit-cell coordinate plus sublattice index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Site {
    /// Sublattice index inside the unit cell.
    pub sublattice: usize,
    /// Unit-cell coordinate.
    pub coordinate: [i32; D],
}

impl Site {
    /// Creates a site from its sublattice and coordinate.
    pub fn new(sublattice: usize, coordinate: [i32; D]) -> Self {
        Self {
            sublattice,
            coordinate,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, c) in self.coordinate.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")/{}", self.sublattice)
    }
}
