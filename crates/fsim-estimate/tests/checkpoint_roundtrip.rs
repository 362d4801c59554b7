use fsim_core::{Complex64, SimError};
use fsim_estimate::{Archive, ArrayEntry, ComplexEstimator, EstimatorBundle, RealEstimator, SaveMode};
use tempfile::tempdir;

fn filled_complex(name: &str) -> ComplexEstimator {
    let mut estimator = ComplexEstimator::new(name);
    for step in 0..12 {
        estimator.measure(Complex64::new(step as f64, -(step as f64) / 2.0));
        if step % 3 == 2 {
            estimator.add_statistics();
        }
    }
    estimator
}

#[test]
fn estimator_state_survives_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("estimator.zip");
    let mut original = filled_complex("1");
    original.save_state(&path, SaveMode::Create).unwrap();

    let mut restored = ComplexEstimator::new("1");
    restored.load_state(&path).unwrap();
    assert_eq!(restored.history(), original.history());
    assert_eq!(restored.normalization(), original.normalization());
    assert_eq!(restored.accumulator(), original.accumulator());
    assert_eq!(restored.last_estimate(), original.estimate());
    assert_eq!(restored.ratio(), original.ratio());
}

#[test]
fn archive_uses_documented_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keys.zip");
    let mut estimator = RealEstimator::new("Order1");
    estimator.measure(1.0);
    estimator.add_statistics();
    estimator.save_state(&path, SaveMode::Create).unwrap();

    let archive = Archive::load(&path).unwrap();
    let keys: Vec<_> = archive.keys().collect();
    assert_eq!(keys, vec!["Order1", "Order1_Norm", "Order1_Accu"]);
    assert_eq!(archive.get("Order1_Norm").unwrap().shape, vec![1]);
}

#[test]
fn complex_arrays_store_two_columns() {
    let entry = ArrayEntry::from_samples(&[Complex64::new(1.0, 2.0), Complex64::new(3.0, 4.0)]);
    assert_eq!(entry.shape, vec![2, 2]);
    assert_eq!(entry.data, vec![1.0, 2.0, 3.0, 4.0]);
    assert!(entry.to_samples::<f64>("x").is_err());
}

#[test]
fn missing_key_is_reported_by_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.zip");
    let mut archive = Archive::open(&path, SaveMode::Create).unwrap();
    archive.insert("Order1", ArrayEntry::from_samples(&[0.5]));
    archive.insert("Order1_Norm", ArrayEntry::from_samples(&[2.0]));
    archive.commit().unwrap();

    let mut estimator = RealEstimator::new("Order1");
    estimator.measure(9.0);
    let before = estimator.clone();
    let err = estimator.load_state(&path).unwrap_err();
    match &err {
        SimError::Checkpoint(info) => {
            assert_eq!(info.code, "checkpoint-missing-key");
            assert_eq!(info.context.get("key").map(String::as_str), Some("Order1_Accu"));
            assert_eq!(info.context.get("estimator").map(String::as_str), Some("Order1"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(estimator, before);
}

#[test]
fn bundle_round_trip_restores_every_member() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("bundle.zip");
    let mut bundle = EstimatorBundle::new();
    for name in ["1", "Sigma", "Polar"] {
        bundle.push(filled_complex(name)).unwrap();
    }
    bundle.save_state(&path, SaveMode::Create).unwrap();

    let mut restored = EstimatorBundle::<Complex64>::new();
    for name in ["1", "Sigma", "Polar"] {
        restored.add_estimator(name).unwrap();
    }
    restored.load_state(&path).unwrap();
    for position in 0..3usize {
        assert_eq!(restored[position].history(), bundle[position].history());
        assert_eq!(restored[position].accumulator(), bundle[position].accumulator());
    }
    let keys: Vec<_> = Archive::load(&path).unwrap().keys().map(str::to_string).collect();
    assert_eq!(keys.len(), 9);
    assert_eq!(keys[0], "1");
    assert_eq!(keys[3], "Sigma");
}

#[test]
fn create_replaces_and_append_merges() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("modes.zip");
    let first = RealEstimator::new("a");
    let second = RealEstimator::new("b");

    first.save_state(&path, SaveMode::Create).unwrap();
    second.save_state(&path, SaveMode::Append).unwrap();
    let merged: Vec<_> = Archive::load(&path).unwrap().keys().map(str::to_string).collect();
    assert_eq!(merged, vec!["a", "a_Norm", "a_Accu", "b", "b_Norm", "b_Accu"]);

    second.save_state(&path, SaveMode::Create).unwrap();
    let replaced: Vec<_> = Archive::load(&path).unwrap().keys().map(str::to_string).collect();
    assert_eq!(replaced, vec!["b", "b_Norm", "b_Accu"]);
}

#[test]
fn failed_bundle_load_leaves_members_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.zip");
    let mut saved = EstimatorBundle::new();
    saved.push(filled_complex("1")).unwrap();
    saved.save_state(&path, SaveMode::Create).unwrap();

    let mut bundle = EstimatorBundle::new();
    bundle.push(filled_complex("1")).unwrap();
    bundle.add_estimator("extra").unwrap();
    bundle["1"].measure(Complex64::new(100.0, 0.0));
    let before = bundle.clone();
    assert!(bundle.load_state(&path).is_err());
    assert_eq!(bundle, before);
}

#[test]
fn loading_a_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let mut estimator = RealEstimator::new("x");
    let err = estimator.load_state(&dir.path().join("absent.zip")).unwrap_err();
    assert_eq!(err.info().code, "checkpoint-read");
}

#[test]
fn commit_leaves_only_the_archive_behind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clean.zip");
    filled_complex("1").save_state(&path, SaveMode::Create).unwrap();
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("clean.zip")]);
}

#[test]
fn failed_commit_removes_the_partial_file() {
    let dir = tempdir().unwrap();
    // a non-empty directory in the way makes the final rename fail
    let path = dir.path().join("blocked.zip");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("occupant"), b"x").unwrap();

    let err = filled_complex("1").save_state(&path, SaveMode::Create).unwrap_err();
    assert_eq!(err.info().code, "checkpoint-rename");
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("blocked.zip")]);
}
