use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use simfold::cache::{DatasetCache, Fingerprint, JsonFileCache, MemoryCache};
use simfold::config::{Spacing, TimeGridConfig};
use simfold::{
    CoordinateValue, Dataset, Diagnostic, FoldError, Pipeline, PipelineConfig, Selection,
};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).expect("write run file");
}

fn config(dir: &Path, experiments: &[&str]) -> PipelineConfig {
    PipelineConfig {
        data_dir: dir.to_path_buf(),
        file_prefix: "20210509-".to_string(),
        experiments: experiments.iter().map(|e| e.to_string()).collect(),
        time: TimeGridConfig {
            samples: 3,
            min: Some(0.0),
            max: Some(2.0),
            spacing: Spacing::Linear,
        },
        ..PipelineConfig::default()
    }
}

fn seed_pair(dir: &Path, experiment: &str) {
    write(
        dir,
        &format!("20210509-{experiment}_x-1_random-0.txt"),
        "# x = 1.0, random = 0\n# time value\n0 10\n1 20\n2 30\n",
    );
    write(
        dir,
        &format!("20210509-{experiment}_x-1_random-1.txt"),
        "# x = 1.0, random = 1\n# time value\n0 12\n1 18\n2 36\n",
    );
}

fn at_x(x: f64) -> Selection {
    Selection::from([("x".to_string(), CoordinateValue::from(x))])
}

fn series(mean: &Dataset, x: f64) -> Vec<f64> {
    mean.select(&at_x(x))
        .expect("select")
        .variable("value")
        .expect("value")
        .iter()
        .copied()
        .collect()
}

#[test]
fn two_seeds_average_into_one_series() {
    let dir = tempdir().expect("tempdir");
    seed_pair(dir.path(), "caseStudy");

    let report = Pipeline::new(config(dir.path(), &["caseStudy"])).run();
    assert!(report.is_success(), "{:?}", report.failures);
    assert!(report.diagnostics.is_empty());

    let mean = &report.means["caseStudy"];
    let names: Vec<_> = mean.axes().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["x", "time"]);
    assert_eq!(mean.time(), Some(vec![0.0, 1.0, 2.0]));

    assert_eq!(series(mean, 1.0), vec![11.0, 19.0, 33.0]);
}

#[test]
fn irregular_runs_are_resampled_by_nearest_row() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "20210509-irregular_a.txt",
        "# x = 2, random = 0\n# time value\n0 1\n0.4 2\n1.9 3\n2.7 4\n",
    );
    write(
        dir.path(),
        "20210509-irregular_b.txt",
        "# x = 3, random = 0\n# time value\n0.5 5\n1.6 6\n",
    );

    let report = Pipeline::new(config(dir.path(), &["irregular"])).run();
    assert!(report.is_success(), "{:?}", report.failures);
    let mean = &report.means["irregular"];

    // grid 0, 1, 2; run b starts after 0, and 1 is nearer 0.5 than 1.6
    assert_eq!(series(mean, 2.0), vec![1.0, 2.0, 3.0]);
    assert_eq!(series(mean, 3.0), vec![5.0, 5.0, 6.0]);
}

#[test]
fn missing_combination_stays_nan() {
    let dir = tempdir().expect("tempdir");
    write(
        dir.path(),
        "20210509-grid_a.txt",
        "# x = 1, mode = fast, random = 0\n# time value\n0 1\n",
    );
    write(
        dir.path(),
        "20210509-grid_b.txt",
        "# x = 2, mode = slow, random = 0\n# time value\n0 2\n",
    );

    let report = Pipeline::new(config(dir.path(), &["grid"])).run();
    assert!(report.is_success(), "{:?}", report.failures);
    let mean = &report.means["grid"];
    let names: Vec<_> = mean.axes().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["mode", "x", "time"]);

    let at = |mode: &str, x: f64| {
        mean.value_at("value", &[mode.into(), x.into(), 0.0.into()])
            .expect("cell")
    };
    assert_eq!(at("fast", 1.0), 1.0);
    assert_eq!(at("slow", 2.0), 2.0);
    assert!(at("fast", 2.0).is_nan());
    assert!(at("slow", 1.0).is_nan());
}

#[test]
fn experiment_without_files_is_empty_and_reported() {
    let dir = tempdir().expect("tempdir");
    seed_pair(dir.path(), "present");

    let report = Pipeline::new(config(dir.path(), &["present", "absent"])).run();
    assert!(report.is_success());
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::EmptyExperiment {
            experiment: "absent".to_string()
        }]
    );
    let empty = &report.means["absent"];
    assert!(empty.is_empty());
    assert_eq!(empty.time(), Some(vec![0.0, 1.0, 2.0]));
    assert!(!report.means["present"].is_empty());
}

#[test]
fn broken_file_fails_only_its_experiment() {
    let dir = tempdir().expect("tempdir");
    seed_pair(dir.path(), "good");
    seed_pair(dir.path(), "bad");
    write(
        dir.path(),
        "20210509-bad_x-1_random-2.txt",
        "# x = 1.0, random = 2\n# time value\n0 10\n1\n",
    );

    let report = Pipeline::new(config(dir.path(), &["good", "bad"])).run();
    assert!(!report.is_success());
    assert!(matches!(
        report.failures.get("bad"),
        Some(FoldError::MalformedRow { line: 4, .. })
    ));
    assert!(!report.means.contains_key("bad"));
    assert!(report.means.contains_key("good"));
}

#[test]
fn precomputed_datasets_short_circuit() {
    let dir = tempdir().expect("tempdir");
    seed_pair(dir.path(), "caseStudy");
    let pipeline = Pipeline::new(config(dir.path(), &["caseStudy"]));
    let first = pipeline.run().means;

    // Once the data is gone only the precomputed map can answer.
    fs::remove_dir_all(dir.path()).expect("remove data");
    let report = pipeline.run_with(first.clone());
    assert!(report.is_success());
    assert_eq!(report.means.len(), 1);
    assert_eq!(report.means["caseStudy"].axes(), first["caseStudy"].axes());

    // Without it the missing directory reads as an experiment with no files.
    let report = pipeline.run_with(BTreeMap::new());
    assert!(report.is_success(), "{:?}", report.failures);
    assert!(report.means["caseStudy"].is_empty());
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::EmptyExperiment {
            experiment: "caseStudy".to_string()
        }]
    );
}

#[test]
fn missing_data_directory_gives_empty_datasets() {
    let dir = tempdir().expect("tempdir");
    let mut config = config(dir.path(), &["one", "two"]);
    config.data_dir = dir.path().join("nope");

    let report = Pipeline::new(config).run();
    assert!(report.is_success(), "{:?}", report.failures);
    assert_eq!(report.means.len(), 2);
    assert!(report.means.values().all(Dataset::is_empty));
    assert_eq!(report.diagnostics.len(), 2);
}

#[test]
fn cache_is_reused_until_fingerprint_changes() {
    let dir = tempdir().expect("tempdir");
    seed_pair(dir.path(), "caseStudy");
    let cache_dir = tempdir().expect("cache dir");
    let mut cache = JsonFileCache::new(cache_dir.path());
    let pipeline = Pipeline::new(config(dir.path(), &["caseStudy"]));

    let report = pipeline.run_with_cache(&mut cache, Fingerprint(1));
    assert!(report.is_success());
    assert!(!cache.is_stale("caseStudy", Fingerprint(1)).expect("stale"));

    // Drop a file: a fresh fingerprint recomputes, the old one reuses the cache.
    fs::remove_file(dir.path().join("20210509-caseStudy_x-1_random-1.txt")).expect("rm");
    let cached = pipeline.run_with_cache(&mut cache, Fingerprint(1));
    let value = cached.means["caseStudy"]
        .value_at("value", &[1.0.into(), 2.0.into()])
        .expect("cell");
    assert_eq!(value, 33.0);

    let rebuilt = pipeline.run_with_cache(&mut cache, Fingerprint(2));
    let value = rebuilt.means["caseStudy"]
        .value_at("value", &[1.0.into(), 2.0.into()])
        .expect("cell");
    assert_eq!(value, 30.0);
}

#[test]
fn memory_cache_receives_every_success() {
    let dir = tempdir().expect("tempdir");
    seed_pair(dir.path(), "one");
    seed_pair(dir.path(), "two");
    let mut cache = MemoryCache::new();
    let pipeline = Pipeline::new(config(dir.path(), &["one", "two"]));

    pipeline.run_with_cache(&mut cache, Fingerprint(5));
    assert_eq!(cache.len(), 2);
}
