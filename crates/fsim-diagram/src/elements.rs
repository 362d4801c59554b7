use fsim_core::{Complex64, Dir, Site, Spin};
use serde::{Deserialize, Serialize};

use crate::ids::{GLineId, PoolItem, VertexId, WLineId};

/// Interaction point joining a fermionic in/out pair and one interaction line.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Handle of the vertex in its pool.
    pub name: VertexId,
    /// Lattice site of the vertex.
    pub site: Site,
    /// Imaginary-time coordinate.
    pub tau: f64,
    /// Spin slots indexed by [`Dir`].
    pub spin: [Spin; 2],
    /// Fermionic lines ending (`In`) and starting (`Out`) at the vertex.
    pub g: [GLineId; 2],
    /// Interaction line attached to the vertex.
    pub w: WLineId,
}

impl Vertex {
    /// Creates a detached vertex; back-references are filled by the repair pass.
    pub fn new(site: Site, tau: f64, spin: [Spin; 2]) -> Self {
        Self {
            name: VertexId::default(),
            site,
            tau,
            spin,
            g: [GLineId::default(); 2],
            w: WLineId::default(),
        }
    }

    /// Spin stored in a slot.
    pub fn spin(&self, dir: Dir) -> Spin {
        self.spin[dir.index()]
    }

    /// Fermionic line referenced by a slot.
    pub fn g(&self, dir: Dir) -> GLineId {
        self.g[dir.index()]
    }
}

impl PoolItem for Vertex {
    type Id = VertexId;

    fn name(&self) -> VertexId {
        self.name
    }

    fn set_name(&mut self, id: VertexId) {
        self.name = id;
    }
}

/// Fermionic propagator between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct GLine {
    /// Handle of the line in its pool.
    pub name: GLineId,
    /// Momentum label.
    pub k: i32,
    /// Cached amplitude.
    pub weight: Complex64,
    /// Start (`In`) and end (`Out`) vertices.
    pub vertex: [VertexId; 2],
}

impl GLine {
    /// Creates a propagator from `from` to `to` with unit weight.
    pub fn new(from: VertexId, to: VertexId, k: i32) -> Self {
        Self {
            name: GLineId::default(),
            k,
            weight: Complex64::new(1.0, 0.0),
            vertex: [from, to],
        }
    }
}

impl PoolItem for GLine {
    type Id = GLineId;

    fn name(&self) -> GLineId {
        self.name
    }

    fn set_name(&mut self, id: GLineId) {
        self.name = id;
    }
}

/// Interaction line between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct WLine {
    /// Handle of the line in its pool.
    pub name: WLineId,
    /// Momentum label.
    pub k: i32,
    /// Cached amplitude.
    pub weight: Complex64,
    /// End vertices.
    pub vertex: [VertexId; 2],
    /// Whether the line currently carries the worm.
    pub is_worm: bool,
}

impl WLine {
    /// Creates an interaction line with unit weight.
    pub fn new(from: VertexId, to: VertexId, k: i32) -> Self {
        Self {
            name: WLineId::default(),
            k,
            weight: Complex64::new(1.0, 0.0),
            vertex: [from, to],
            is_worm: false,
        }
    }
}

impl PoolItem for WLine {
    type Id = WLineId;

    fn name(&self) -> WLineId {
        self.name
    }

    fn set_name(&mut self, id: WLineId) {
        self.name = id;
    }
}

/// Line kinds share endpoint navigation.
pub trait Line: PoolItem {
    /// Vertex at one end of the line.
    fn vertex(&self, dir: Dir) -> VertexId;
}

impl Line for GLine {
    fn vertex(&self, dir: Dir) -> VertexId {
        self.vertex[dir.index()]
    }
}

impl Line for WLine {
    fn vertex(&self, dir: Dir) -> VertexId {
        self.vertex[dir.index()]
    }
}

/// Pair of open diagram ends used for topology-changing updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Worm {
    /// First worm end.
    pub ira: VertexId,
    /// Second worm end.
    pub masha: VertexId,
    /// Whether the diagram is currently in worm space.
    pub exist: bool,
}
