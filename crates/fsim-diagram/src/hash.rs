use sha2::{Digest, Sha256};

use crate::diagram::Diagram;

/// Computes the structural hash of a diagram.
///
/// Covers vertex coordinates, times and spins, line endpoints and momenta, and
/// the worm. Cached weights and back-references are excluded, so a diagram
/// hashes identically before and after a repair pass.
pub fn canonical_hash(diagram: &Diagram) -> String {
    let mut hasher = Sha256::new();

    hasher.update(b"vertices");
    hasher.update((diagram.ver.len() as u64).to_le_bytes());
    for v in diagram.ver.iter() {
        hasher.update((v.site.sublattice as u64).to_le_bytes());
        for c in v.site.coordinate {
            hasher.update(c.to_le_bytes());
        }
        hasher.update(v.tau.to_bits().to_le_bytes());
        for spin in v.spin {
            hasher.update([spin.as_index() as u8]);
        }
    }

    hasher.update(b"glines");
    hasher.update((diagram.g.len() as u64).to_le_bytes());
    for g in diagram.g.iter() {
        hasher.update(g.k.to_le_bytes());
        update_endpoints(g.vertex.map(|v| v.as_raw()), &mut hasher);
    }

    hasher.update(b"wlines");
    hasher.update((diagram.w.len() as u64).to_le_bytes());
    for w in diagram.w.iter() {
        hasher.update(w.k.to_le_bytes());
        update_endpoints(w.vertex.map(|v| v.as_raw()), &mut hasher);
    }

    if diagram.worm.exist {
        hasher.update(b"worm:some");
        update_endpoints(
            [diagram.worm.ira.as_raw(), diagram.worm.masha.as_raw()],
            &mut hasher,
        );
    } else {
        hasher.update(b"worm:none");
    }

    format!("{:x}", hasher.finalize())
}

fn update_endpoints(values: [usize; 2], hasher: &mut Sha256) {
    for value in values {
        hasher.update((value as u64).to_le_bytes());
    }
}
