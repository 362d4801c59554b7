use fsim_core::errors::{ErrorInfo, SimError};
use fsim_core::rng::RngHandle;
use fsim_core::{Site, Spin, D, MAX_ORDER};

use crate::diagram::Diagram;
use crate::elements::{GLine, Vertex, WLine};
use crate::ids::VertexId;

/// Builds a single-loop diagram of the requested order.
///
/// The diagram has `2 * order` vertices evenly spaced in `[0, beta)`, one
/// fermion loop `0 -> 1 -> ... -> 0` and interaction lines joining vertices
/// `2j` and `2j + 1`. Vertices alternate between sublattices 0 and 1, so the
/// fixture assumes a two-site unit cell. All spins are up and every momentum
/// is zero.
pub fn ring_diagram(order: usize, beta: f64) -> Result<Diagram, SimError> {
    ensure_order(order)?;
    let vertex_count = 2 * order;
    let vertices = (0..vertex_count)
        .map(|index| {
            let tau = beta * index as f64 / vertex_count as f64;
            Vertex::new(Site::new(index % 2, [0; D]), tau, [Spin::Up, Spin::Up])
        })
        .collect();
    assemble(vertices, vec![0; vertex_count], vec![0; order])
}

/// Builds a single-loop diagram with random times, sites, spins and momenta.
///
/// Topology matches [`ring_diagram`]; only the vertex and line labels are
/// drawn from `rng`. Sites lie inside `lattice` and on one of its `n_sublat`
/// sublattices.
pub fn random_ring_diagram(
    order: usize,
    beta: f64,
    lattice: [i32; D],
    n_sublat: usize,
    rng: &mut RngHandle,
) -> Result<Diagram, SimError> {
    ensure_order(order)?;
    if n_sublat == 0 {
        return Err(SimError::Diagram(
            ErrorInfo::new("invalid-lattice", "lattice needs at least one sublattice")
                .with_context("n_sublat", n_sublat.to_string()),
        ));
    }
    let vertex_count = 2 * order;
    let vertices = (0..vertex_count)
        .map(|_| {
            let mut coordinate = [0; D];
            for (axis, c) in coordinate.iter_mut().enumerate() {
                *c = rng.irn(0, lattice[axis].max(1) as i64) as i32;
            }
            let site = Site::new(rng.index(n_sublat), coordinate);
            let spin = [random_spin(rng), random_spin(rng)];
            Vertex::new(site, beta * rng.urn(), spin)
        })
        .collect();
    let g_momenta = (0..vertex_count).map(|_| rng.random_pick_k()).collect();
    let w_momenta = (0..order).map(|_| rng.random_pick_k()).collect();
    assemble(vertices, g_momenta, w_momenta)
}

fn assemble(
    vertices: Vec<Vertex>,
    g_momenta: Vec<i32>,
    w_momenta: Vec<i32>,
) -> Result<Diagram, SimError> {
    let mut diagram = Diagram::new();
    let ids: Vec<VertexId> = vertices.into_iter().map(|v| diagram.ver.add(v)).collect();
    for (index, k) in g_momenta.into_iter().enumerate() {
        let next = ids[(index + 1) % ids.len()];
        diagram.g.add(GLine::new(ids[index], next, k));
    }
    for (pair, k) in w_momenta.into_iter().enumerate() {
        diagram.w.add(WLine::new(ids[2 * pair], ids[2 * pair + 1], k));
    }
    diagram.fix_diagram()?;
    Ok(diagram)
}

fn random_spin(rng: &mut RngHandle) -> Spin {
    if rng.irn(0, 2) == 0 {
        Spin::Down
    } else {
        Spin::Up
    }
}

fn ensure_order(order: usize) -> Result<(), SimError> {
    if order == 0 || order >= MAX_ORDER {
        return Err(SimError::Diagram(
            ErrorInfo::new("invalid-order", "ring diagrams need 1 <= order < MAX_ORDER")
                .with_context("order", order.to_string())
                .with_context("max_order", MAX_ORDER.to_string()),
        ));
    }
    Ok(())
}
