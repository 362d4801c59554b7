use fsim_core::errors::{ErrorInfo, SimError};
use fsim_core::{Complex64, Dir, Dressing, Endpoint, RngHandle, Spin, WeightTable};
use tracing::debug;

use crate::elements::{GLine, Line, Vertex, WLine, Worm};
use crate::ids::{GLineId, Pool, PoolId, VertexId, WLineId};

/// Mutable Feynman diagram: three index-addressed pools plus the worm.
///
/// Lines reference vertices and vertices reference lines through pool
/// handles. The two views may disagree while a move is being applied;
/// [`Diagram::fix_diagram`] reconciles them.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    /// Perturbation order, equal to the number of interaction lines after repair.
    pub order: usize,
    /// Phase of the diagram weight.
    pub phase: Complex64,
    /// Total diagram weight.
    pub weight: Complex64,
    /// Fermionic propagators.
    pub g: Pool<GLine>,
    /// Interaction lines.
    pub w: Pool<WLine>,
    /// Vertices.
    pub ver: Pool<Vertex>,
    /// Worm ends.
    pub worm: Worm,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    /// Creates an empty diagram with unit phase and weight.
    pub fn new() -> Self {
        Self {
            order: 0,
            phase: Complex64::new(1.0, 0.0),
            weight: Complex64::new(1.0, 0.0),
            g: Pool::new("GLine"),
            w: Pool::new("WLine"),
            ver: Pool::new("Vertex"),
            worm: Worm::default(),
        }
    }

    /// Uniformly selects a propagator. Panics on an empty pool.
    pub fn random_pick_g(&self, rng: &mut RngHandle) -> GLineId {
        self.g.random_pick(rng)
    }

    /// Uniformly selects an interaction line. Panics on an empty pool.
    pub fn random_pick_w(&self, rng: &mut RngHandle) -> WLineId {
        self.w.random_pick(rng)
    }

    /// Uniformly selects a vertex. Panics on an empty pool.
    pub fn random_pick_ver(&self, rng: &mut RngHandle) -> VertexId {
        self.ver.random_pick(rng)
    }

    /// Vertex at one end of a line.
    pub fn neigh_ver<L: Line>(&self, line: &L, dir: Dir) -> &Vertex {
        &self.ver[line.vertex(dir)]
    }

    /// Propagator attached to a vertex slot.
    pub fn neigh_g(&self, vertex: &Vertex, dir: Dir) -> &GLine {
        &self.g[vertex.g(dir)]
    }

    /// Interaction line attached to a vertex.
    pub fn neigh_w(&self, vertex: &Vertex) -> &WLine {
        &self.w[vertex.w]
    }

    /// Spin carried by a propagator at one end.
    ///
    /// The line enters its `Out` vertex through that vertex's `In` slot, so the
    /// spin is read from the opposite slot of the end vertex.
    pub fn g_spin(&self, g: &GLine, dir: Dir) -> Spin {
        self.neigh_ver(g, dir).spin(dir.flip())
    }

    /// Spin stored in slot `slot` of the vertex at end `end` of an interaction line.
    pub fn w_spin(&self, w: &WLine, end: Dir, slot: Dir) -> Spin {
        self.neigh_ver(w, end).spin(slot)
    }

    /// Sublattice of the vertex at one end of a line.
    pub fn sublattice<L: Line>(&self, line: &L, dir: Dir) -> usize {
        self.neigh_ver(line, dir).site.sublattice
    }

    /// Whether a vertex is one of the two worm ends.
    pub fn is_worm(&self, vertex: &Vertex) -> bool {
        self.worm.exist && (vertex.name == self.worm.ira || vertex.name == self.worm.masha)
    }

    /// Whether moving a worm end carrying spin change `dspin` onto `vertex`
    /// is forbidden. Proposals should be rejected before any weight ratio is
    /// computed when this returns true.
    pub fn can_not_move_worm(dspin: i32, vertex: &Vertex) -> bool {
        matches!(
            (dspin, vertex.spin(Dir::In), vertex.spin(Dir::Out)),
            (1, Spin::Down, Spin::Up) | (-1, Spin::Up, Spin::Down)
        )
    }

    /// Restores vertex back-references from the line pools.
    ///
    /// Every propagator writes its handle into the `Out` slot of its start
    /// vertex and the `In` slot of its end vertex; every interaction line
    /// writes its handle into the `w` field of both end vertices. The order is
    /// recomputed, worm flags on interaction lines are cleared and phase and
    /// weight are reset to one. The reweighting logic relies on that reset:
    /// after a repair the cached weight is a normalisation reference, not the
    /// physical weight of the diagram.
    ///
    /// Pools for which no consistent assignment exists (an endpoint outside
    /// the vertex pool, or two lines claiming the same slot) are rejected and
    /// the diagram is left untouched.
    pub fn fix_diagram(&mut self) -> Result<(), SimError> {
        let vertex_count = self.ver.len();
        let mut g_slots: Vec<[Option<GLineId>; 2]> = vec![[None, None]; vertex_count];
        let mut w_slots: Vec<Option<WLineId>> = vec![None; vertex_count];

        for g in self.g.iter() {
            for dir in Dir::ALL {
                ensure_vertex(g.vertex(dir), vertex_count, self.g.label(), g.name.index())?;
            }
        }
        for w in self.w.iter() {
            for dir in Dir::ALL {
                ensure_vertex(w.vertex(dir), vertex_count, self.w.label(), w.name.index())?;
            }
        }

        for g in self.g.iter() {
            for dir in Dir::ALL {
                let vertex = g.vertex(dir);
                let slot = &mut g_slots[vertex.index()][dir.flip().index()];
                if let Some(previous) = *slot {
                    return Err(diagram_error(
                        "slot-conflict",
                        "two propagators claim the same vertex slot",
                    )
                    .with_context("vertex", vertex)
                    .with_context("slot", format!("{:?}", dir.flip()))
                    .with_context("first", previous)
                    .with_context("second", g.name));
                }
                *slot = Some(g.name);
            }
        }

        for w in self.w.iter() {
            for dir in Dir::ALL {
                let vertex = w.vertex(dir);
                let slot = &mut w_slots[vertex.index()];
                match *slot {
                    Some(previous) if previous != w.name => {
                        return Err(diagram_error(
                            "slot-conflict",
                            "two interaction lines claim the same vertex",
                        )
                        .with_context("vertex", vertex)
                        .with_context("first", previous)
                        .with_context("second", w.name));
                    }
                    _ => *slot = Some(w.name),
                }
            }
        }

        for (vertex, (g_pair, w_slot)) in self.ver.iter_mut().zip(g_slots.into_iter().zip(w_slots)) {
            for (slot, line) in g_pair.into_iter().enumerate() {
                if let Some(line) = line {
                    vertex.g[slot] = line;
                }
            }
            if let Some(line) = w_slot {
                vertex.w = line;
            }
        }
        for w in self.w.iter_mut() {
            w.is_worm = false;
        }

        self.order = self.w.len();
        self.phase = Complex64::new(1.0, 0.0);
        self.weight = Complex64::new(1.0, 0.0);
        debug!(
            order = self.order,
            vertices = vertex_count,
            glines = self.g.len(),
            "diagram repaired"
        );
        Ok(())
    }

    /// Verifies the structural invariants without modifying the diagram.
    pub fn check_diagram(&self) -> Result<(), SimError> {
        let vertex_count = self.ver.len();
        for g in self.g.iter() {
            for dir in Dir::ALL {
                let vertex = g.vertex(dir);
                ensure_vertex(vertex, vertex_count, self.g.label(), g.name.index())?;
                if self.ver[vertex].g(dir.flip()) != g.name {
                    return Err(diagram_error(
                        "stale-g-reference",
                        "vertex does not point back to its propagator",
                    )
                    .with_context("vertex", vertex)
                    .with_context("gline", g.name));
                }
            }
        }
        for w in self.w.iter() {
            for dir in Dir::ALL {
                let vertex = w.vertex(dir);
                ensure_vertex(vertex, vertex_count, self.w.label(), w.name.index())?;
                if self.ver[vertex].w != w.name {
                    return Err(diagram_error(
                        "stale-w-reference",
                        "vertex does not point back to its interaction line",
                    )
                    .with_context("vertex", vertex)
                    .with_context("wline", w.name));
                }
            }
        }
        if self.order != self.w.len() {
            return Err(diagram_error("order-mismatch", "order differs from interaction count")
                .with_context("order", self.order)
                .with_context("wlines", self.w.len()));
        }
        if self.worm.exist {
            let Worm { ira, masha, .. } = self.worm;
            if ira.index() >= vertex_count || masha.index() >= vertex_count || ira == masha {
                return Err(diagram_error("invalid-worm", "worm ends must be two distinct vertices")
                    .with_context("ira", ira)
                    .with_context("masha", masha)
                    .with_context("vertices", vertex_count));
            }
        }
        Ok(())
    }

    /// Recomputes every line amplitude from a weight table.
    ///
    /// The diagram weight becomes the product of all line amplitudes and the
    /// phase its unit-modulus part (one for a vanishing weight).
    pub fn evaluate_weight(&mut self, table: &dyn WeightTable) -> Complex64 {
        let g_weights: Vec<Complex64> = self
            .g
            .iter()
            .map(|g| {
                let from = self.g_endpoint(g, Dir::In);
                let to = self.g_endpoint(g, Dir::Out);
                table.g_weight(from, to, Dressing::Dressed)
            })
            .collect();
        let w_weights: Vec<_> = self
            .w
            .iter()
            .map(|w| {
                let from = self.w_endpoint(w, Dir::In);
                let to = self.w_endpoint(w, Dir::Out);
                table.w_weight(from, to, w.is_worm, Dressing::Dressed)
            })
            .collect();

        let mut total = Complex64::new(1.0, 0.0);
        for (g, weight) in self.g.iter_mut().zip(g_weights) {
            g.weight = weight;
            total *= weight;
        }
        let mut interaction_order = 0;
        for (w, weight) in self.w.iter_mut().zip(w_weights) {
            w.weight = weight.amplitude;
            interaction_order += weight.order;
            total *= weight.amplitude;
        }

        let norm = total.norm();
        self.weight = total;
        self.phase = if norm > 0.0 {
            total / norm
        } else {
            Complex64::new(1.0, 0.0)
        };
        debug!(interaction_order, weight = %total, "diagram weight evaluated");
        total
    }

    fn g_endpoint(&self, g: &GLine, dir: Dir) -> Endpoint<Spin> {
        let vertex = self.neigh_ver(g, dir);
        Endpoint {
            site: vertex.site,
            tau: vertex.tau,
            spin: self.g_spin(g, dir),
        }
    }

    fn w_endpoint(&self, w: &WLine, dir: Dir) -> Endpoint<[Spin; 2]> {
        let vertex = self.neigh_ver(w, dir);
        Endpoint {
            site: vertex.site,
            tau: vertex.tau,
            spin: vertex.spin,
        }
    }
}

fn ensure_vertex(
    vertex: VertexId,
    vertex_count: usize,
    pool: &str,
    line: usize,
) -> Result<(), SimError> {
    if vertex.index() < vertex_count {
        return Ok(());
    }
    Err(
        diagram_error("dangling-endpoint", "line endpoint lies outside the vertex pool")
            .with_context("pool", pool)
            .with_context("line", line)
            .with_context("vertex", vertex)
            .with_context("vertices", vertex_count),
    )
}

fn diagram_error(code: impl Into<String>, message: impl Into<String>) -> SimError {
    SimError::Diagram(ErrorInfo::new(code, message))
}

trait ContextExt {
    fn with_context(self, key: impl Into<String>, value: impl ToString) -> SimError;
}

impl ContextExt for SimError {
    fn with_context(self, key: impl Into<String>, value: impl ToString) -> SimError {
        match self {
            SimError::Diagram(info) => SimError::Diagram(info.with_context(key, value.to_string())),
            other => other,
        }
    }
}
