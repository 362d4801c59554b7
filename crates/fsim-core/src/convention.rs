use std::fmt;

use serde::{Deserialize, Serialize};

/// Spatial dimension of the lattice.
pub const D: usize = 2;

/// Hard upper bound (exclusive) on the perturbation order of a run.
pub const MAX_ORDER: usize = 10;

/// Momentum labels are drawn from `[-MAX_K, MAX_K)`.
pub const MAX_K: i32 = 10_000;

/// Fermion spin projection. `Down` encodes as 0 and `Up` as 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Spin {
    /// Spin down.
    Down,
    /// Spin up.
    Up,
}

impl Spin {
    /// Returns the opposite spin.
    pub fn flip(self) -> Self {
        match self {
            Spin::Down => Spin::Up,
            Spin::Up => Spin::Down,
        }
    }

    /// Integer encoding used by weight tables.
    pub fn as_index(self) -> usize {
        match self {
            Spin::Down => 0,
            Spin::Up => 1,
        }
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spin::Up => write!(f, "UP"),
            Spin::Down => write!(f, "DOWN"),
        }
    }
}

/// Orientation of a line end or a vertex slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dir {
    /// Incoming end.
    In,
    /// Outgoing end.
    Out,
}

impl Dir {
    /// Both directions in slot order.
    pub const ALL: [Dir; 2] = [Dir::In, Dir::Out];

    /// Returns the opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Dir::In => Dir::Out,
            Dir::Out => Dir::In,
        }
    }

    /// Slot index of the direction inside two-element arrays.
    pub fn index(self) -> usize {
        match self {
            Dir::In => 0,
            Dir::Out => 1,
        }
    }
}
