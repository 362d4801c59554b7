use fsim_core::rng::RngHandle;
use fsim_core::{Complex64, Dressing, Endpoint, InteractionWeight, Spin, UnitWeight, WeightTable};
use fsim_diagram::{
    canonical_hash, diagram_from_bytes, diagram_from_json, diagram_to_bytes, diagram_to_json,
    random_ring_diagram, ring_diagram, VertexId,
};

#[test]
fn json_snapshot_restores_structure() {
    let mut rng = RngHandle::from_seed(2024);
    let diagram = random_ring_diagram(3, 2.0, [8, 8], 2, &mut rng).unwrap();

    let json = diagram_to_json(&diagram).unwrap();
    let restored = diagram_from_json(&json).unwrap();

    assert_eq!(restored, diagram);
    assert_eq!(canonical_hash(&restored), canonical_hash(&diagram));
}

#[test]
fn binary_snapshot_restores_worm() {
    let mut diagram = ring_diagram(2, 1.0).unwrap();
    diagram.worm.exist = true;
    diagram.worm.ira = VertexId::from_raw(0);
    diagram.worm.masha = VertexId::from_raw(2);

    let bytes = diagram_to_bytes(&diagram).unwrap();
    let restored = diagram_from_bytes(&bytes).unwrap();
    assert_eq!(restored.worm, diagram.worm);
    assert_eq!(canonical_hash(&restored), canonical_hash(&diagram));
}

#[test]
fn snapshot_with_dangling_endpoint_is_rejected() {
    let json = r#"{
        "vertices": [{"site": {"sublattice": 0, "coordinate": [0, 0]}, "tau": 0.0, "spin": ["Up", "Up"]}],
        "glines": [{"k": 0, "weight": [1.0, 0.0], "vertex": [0, 3]}],
        "wlines": [],
        "worm": {"ira": 0, "masha": 0, "exist": false}
    }"#;
    let err = diagram_from_json(json).unwrap_err();
    assert_eq!(err.info().code, "dangling-endpoint");
}

#[test]
fn hash_ignores_cached_weights() {
    let mut diagram = ring_diagram(2, 1.0).unwrap();
    let before = canonical_hash(&diagram);
    diagram.evaluate_weight(&UnitWeight);
    for g in diagram.g.iter_mut() {
        g.weight = Complex64::new(0.5, 0.5);
    }
    assert_eq!(canonical_hash(&diagram), before);
    diagram.g.iter_mut().next().unwrap().k = 7;
    assert_ne!(canonical_hash(&diagram), before);
}

#[test]
fn rendering_is_stable_and_one_line_per_entity() {
    let diagram = ring_diagram(2, 1.0).unwrap();
    let first = diagram.pretty_string();
    let second = ring_diagram(2, 1.0).unwrap().pretty_string();
    assert_eq!(first, second);
    let lines: Vec<_> = first.lines().collect();
    assert_eq!(lines.len(), 1 + diagram.ver.len() + diagram.g.len() + diagram.w.len());
    assert_eq!(lines[0], "Order:2,Phase:(1,0),Weight:(1,0),Worm:none");
    assert_eq!(
        diagram.pretty_g(diagram.g.iter().next().unwrap()),
        "0 (UP) >>===Name:0,K:0,Weight:(1,0)===>>1 (UP);"
    );
    assert!(diagram.to_graphviz().contains("v0 -> v1 [label=\"G0\"];"));
}

struct SignedWeight;

impl WeightTable for SignedWeight {
    fn g_weight(&self, from: Endpoint<Spin>, to: Endpoint<Spin>, _dressing: Dressing) -> Complex64 {
        if to.tau > from.tau {
            Complex64::new(2.0, 0.0)
        } else {
            Complex64::new(-1.0, 0.0)
        }
    }

    fn w_weight(
        &self,
        _from: Endpoint<[Spin; 2]>,
        _to: Endpoint<[Spin; 2]>,
        _is_worm: bool,
        _dressing: Dressing,
    ) -> InteractionWeight {
        InteractionWeight {
            amplitude: Complex64::new(0.0, 0.5),
            order: 1,
        }
    }
}

#[test]
fn evaluate_weight_multiplies_line_amplitudes() {
    let mut diagram = ring_diagram(1, 1.0).unwrap();
    // loop 0 -> 1 (forward in time) -> 0 (backward): 2 * (-1) * 0.5i = -i
    let total = diagram.evaluate_weight(&SignedWeight);
    assert_eq!(total, Complex64::new(0.0, -1.0));
    assert_eq!(diagram.weight, total);
    assert_eq!(diagram.phase, Complex64::new(0.0, -1.0));
    assert_eq!(diagram.g.iter().next().unwrap().weight, Complex64::new(2.0, 0.0));

    diagram.fix_diagram().unwrap();
    assert_eq!(diagram.weight, Complex64::new(1.0, 0.0));
    assert_eq!(diagram.phase, Complex64::new(1.0, 0.0));
}
