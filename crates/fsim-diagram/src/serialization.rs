use fsim_core::errors::{ErrorInfo, SimError};
use fsim_core::{Complex64, Site, Spin};
use serde::{Deserialize, Serialize};

use crate::diagram::Diagram;
use crate::elements::{GLine, Vertex, WLine, Worm};
use crate::ids::VertexId;

/// Serializes the diagram to a compact binary representation using `bincode`.
pub fn diagram_to_bytes(diagram: &Diagram) -> Result<Vec<u8>, SimError> {
    let serializable = SerializableDiagram::from_diagram(diagram);
    bincode::serialize(&serializable)
        .map_err(|err| SimError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a diagram from its binary representation and repairs it.
pub fn diagram_from_bytes(bytes: &[u8]) -> Result<Diagram, SimError> {
    let serializable: SerializableDiagram = bincode::deserialize(bytes)
        .map_err(|err| SimError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    serializable.into_diagram()
}

/// Serializes the diagram to a JSON string.
pub fn diagram_to_json(diagram: &Diagram) -> Result<String, SimError> {
    let serializable = SerializableDiagram::from_diagram(diagram);
    serde_json::to_string_pretty(&serializable)
        .map_err(|err| SimError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a diagram from a JSON string and repairs it.
pub fn diagram_from_json(json: &str) -> Result<Diagram, SimError> {
    let serializable: SerializableDiagram = serde_json::from_str(json)
        .map_err(|err| SimError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    serializable.into_diagram()
}

// Vertex back-references are not stored; they are rebuilt by the repair pass.
#[derive(Debug, Serialize, Deserialize)]
struct SerializableDiagram {
    vertices: Vec<SerializableVertex>,
    glines: Vec<SerializableLine>,
    wlines: Vec<SerializableLine>,
    worm: Worm,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableVertex {
    site: Site,
    tau: f64,
    spin: [Spin; 2],
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableLine {
    k: i32,
    weight: Complex64,
    vertex: [usize; 2],
}

impl SerializableDiagram {
    fn from_diagram(diagram: &Diagram) -> Self {
        let vertices = diagram
            .ver
            .iter()
            .map(|v| SerializableVertex {
                site: v.site,
                tau: v.tau,
                spin: v.spin,
            })
            .collect();
        let glines = diagram
            .g
            .iter()
            .map(|g| SerializableLine {
                k: g.k,
                weight: g.weight,
                vertex: g.vertex.map(|v| v.as_raw()),
            })
            .collect();
        let wlines = diagram
            .w
            .iter()
            .map(|w| SerializableLine {
                k: w.k,
                weight: w.weight,
                vertex: w.vertex.map(|v| v.as_raw()),
            })
            .collect();
        Self {
            vertices,
            glines,
            wlines,
            worm: diagram.worm,
        }
    }

    fn into_diagram(self) -> Result<Diagram, SimError> {
        let mut diagram = Diagram::new();
        for vertex in self.vertices {
            diagram
                .ver
                .add(Vertex::new(vertex.site, vertex.tau, vertex.spin));
        }
        for line in self.glines {
            let mut g = GLine::new(
                VertexId::from_raw(line.vertex[0]),
                VertexId::from_raw(line.vertex[1]),
                line.k,
            );
            g.weight = line.weight;
            diagram.g.add(g);
        }
        for line in self.wlines {
            let mut w = WLine::new(
                VertexId::from_raw(line.vertex[0]),
                VertexId::from_raw(line.vertex[1]),
                line.k,
            );
            w.weight = line.weight;
            diagram.w.add(w);
        }
        diagram.worm = self.worm;
        diagram.fix_diagram()?;
        diagram.check_diagram()?;
        Ok(diagram)
    }
}
