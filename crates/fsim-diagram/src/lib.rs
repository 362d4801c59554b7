#![deny(missing_docs)]

//! Diagram graph store for the worm-algorithm sampler: vertices joined by
//! fermionic propagators and interaction lines, held in index-addressed pools.

mod diagram;
mod elements;
mod generators;
mod hash;
mod ids;
mod render;
mod serialization;

pub use diagram::Diagram;
pub use elements::{GLine, Line, Vertex, WLine, Worm};
pub use generators::{random_ring_diagram, ring_diagram};
pub use hash::canonical_hash;
pub use ids::{GLineId, Pool, PoolId, PoolItem, VertexId, WLineId};

/// Re-export serialization helpers for downstream crates.
pub use serialization::{diagram_from_bytes, diagram_from_json, diagram_to_bytes, diagram_to_json};
