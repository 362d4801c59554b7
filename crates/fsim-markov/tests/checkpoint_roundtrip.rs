use std::fs;

use fsim_core::Complex64;
use fsim_diagram::ring_diagram;
use fsim_markov::monitor::bundle_path;
use fsim_markov::{MarkovMonitor, ParaMc, Trajectory, C_ESTIMATOR, R_ESTIMATOR, UNIT_ESTIMATOR};
use tempfile::tempdir;

fn measured_monitor(para: &ParaMc) -> MarkovMonitor {
    let mut monitor = MarkovMonitor::build_new(para).unwrap();
    let mut diagram = ring_diagram(1, 1.0).unwrap();
    for step in 0..20 {
        diagram.phase = Complex64::new((step as f64).cos(), (step as f64).sin());
        diagram.worm.exist = step % 5 == 0;
        monitor.measure(&diagram);
        if step % 4 == 3 {
            monitor.add_statistics();
        }
    }
    monitor
}

#[test]
fn monitor_round_trip_restores_both_bundles() {
    let para = ParaMc::test_defaults();
    let dir = tempdir().unwrap();
    let monitor = measured_monitor(&para);
    monitor.save(dir.path()).unwrap();
    assert!(bundle_path(dir.path(), C_ESTIMATOR).exists());
    assert!(bundle_path(dir.path(), R_ESTIMATOR).exists());

    let mut restored = MarkovMonitor::load(&para, dir.path()).unwrap();
    let mut original = monitor.clone();
    assert_eq!(restored.c_estimator.estimates(), original.c_estimator.estimates());
    assert_eq!(restored.r_estimator.estimates(), original.r_estimator.estimates());
    assert_eq!(
        restored.r_estimator[UNIT_ESTIMATOR].history(),
        monitor.r_estimator[UNIT_ESTIMATOR].history()
    );
}

#[test]
fn monitor_load_requires_both_archives() {
    let para = ParaMc::test_defaults();
    let dir = tempdir().unwrap();
    measured_monitor(&para).save(dir.path()).unwrap();

    fs::remove_file(bundle_path(dir.path(), R_ESTIMATOR)).unwrap();
    let err = MarkovMonitor::load(&para, dir.path()).unwrap_err();
    assert_eq!(err.info().code, "checkpoint-read");

    let other = tempdir().unwrap();
    measured_monitor(&para).save(other.path()).unwrap();
    fs::remove_file(bundle_path(other.path(), C_ESTIMATOR)).unwrap();
    assert!(MarkovMonitor::load(&para, other.path()).is_err());
}

#[test]
fn monitor_load_rejects_archives_without_higher_orders() {
    let dir = tempdir().unwrap();
    measured_monitor(&ParaMc::test_defaults()).save(dir.path()).unwrap();

    let mut para = ParaMc::test_defaults();
    para.order = 2;
    para.order_reweight = vec![1.0; 3];
    let err = MarkovMonitor::load(&para, dir.path()).unwrap_err();
    assert_eq!(err.info().context.get("key").map(String::as_str), Some("Order2"));
}

#[test]
fn trajectory_resume_restores_diagram_and_counter() {
    let dir = tempdir().unwrap();
    let mut trajectory = Trajectory::new(ParaMc::test_defaults(), 3).unwrap();
    for step in 0..50 {
        trajectory.record();
        if step % 10 == 9 {
            trajectory.add_statistics();
        }
    }
    trajectory.save(dir.path()).unwrap();

    let resumed = Trajectory::resume(dir.path()).unwrap();
    assert_eq!(resumed.counter(), 50);
    assert_eq!(resumed.index(), 3);
    assert_eq!(resumed.seed(), trajectory.seed());
    assert_eq!(resumed.diagram, trajectory.diagram);
    // loading recomputes the cached estimates, so bring the original up to date
    let mut original = trajectory.monitor.clone();
    original.r_estimator.estimates();
    original.c_estimator.estimates();
    assert_eq!(resumed.monitor, original);
}

#[test]
fn trajectory_resume_detects_edited_snapshot() {
    let dir = tempdir().unwrap();
    let trajectory = Trajectory::new(ParaMc::test_defaults(), 0).unwrap();
    trajectory.save(dir.path()).unwrap();

    let path = dir.path().join(fsim_markov::checkpoint::DIAGRAM_FILE);
    let mut diagram = fsim_diagram::diagram_from_json(&fs::read_to_string(&path).unwrap()).unwrap();
    diagram.g.iter_mut().for_each(|g| g.k += 1);
    fs::write(&path, fsim_diagram::diagram_to_json(&diagram).unwrap()).unwrap();

    let err = Trajectory::resume(dir.path()).unwrap_err();
    assert_eq!(err.info().code, "checkpoint-hash-mismatch");
}
