use std::fs;

use regprice_core::{EngineConfig, MaxSplits};
use regprice_runner::{
    generate, generate_batch, load_artifacts, load_csv, run_from_config, save_artifacts,
    write_csv, BatchRunner, InputConfig, LoadedSeries, OutputConfig, RunConfig, SyntheticConfig,
};

fn to_loaded(s: &regprice_runner::SyntheticSeries) -> LoadedSeries {
    LoadedSeries {
        id: s.id.clone(),
        time_index: s.time_index.clone(),
        prices: s.prices.clone(),
    }
}

#[test]
fn clean_step_series_recovers_every_change_point() {
    let cfg = SyntheticConfig {
        length: 120,
        regular_changes: 3,
        promo_rate: 0.0,
        missing_rate: 0.0,
        ..SyntheticConfig::default()
    };
    let runner = BatchRunner::new(EngineConfig::new(1, MaxSplits::Unbounded)).unwrap();
    for seed in 0..5 {
        let s = generate(&SyntheticConfig { seed, ..cfg.clone() }, "clean").unwrap();
        let r = runner.run_one(&to_loaded(&s)).unwrap();
        assert_eq!(r.splits, s.change_points, "seed {seed}");
        let regular: Vec<f64> = r.regular.iter().map(|v| v.unwrap()).collect();
        assert_eq!(regular, s.regular, "seed {seed}");
    }
}

#[test]
fn regular_price_is_never_below_observed() {
    let batch = generate_batch(&SyntheticConfig::default(), 6).unwrap();
    let loaded: Vec<LoadedSeries> = batch.iter().map(to_loaded).collect();
    let report = BatchRunner::new(EngineConfig::new(28, MaxSplits::Unbounded))
        .unwrap()
        .run(&loaded);
    assert_eq!(report.summary.segmented, 6);
    for r in &report.results {
        for (p, reg) in r.prices.iter().zip(&r.regular) {
            if let (Some(p), Some(reg)) = (p, reg) {
                assert!(p <= reg);
            }
        }
        for p in &r.partitions {
            assert!(p.last - p.first + 1 >= 1);
        }
    }
}

#[test]
fn csv_config_run_and_artifacts_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("prices.csv");
    let out_dir = dir.path().join("out");

    let batch = generate_batch(&SyntheticConfig::default(), 3).unwrap();
    write_csv(&csv_path, &batch).unwrap();

    let toml = format!(
        r#"
        [input]
        path = "{}"
        series_column = "series"

        [engine]
        min_leaf_size = 28

        [output]
        dir = "{}"
        "#,
        csv_path.display(),
        out_dir.display()
    );
    let config = RunConfig::from_toml_str(&toml).unwrap();

    let loaded = load_csv(&config.input.path, &config.input).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].id, "sku-0001");
    assert_eq!(loaded[0].len(), 365);

    let report = run_from_config(&config).unwrap();
    assert_eq!(report.summary.series, 3);
    assert!(report.failures.is_empty());

    let run_dir = save_artifacts(&report, &config.output).unwrap();
    assert!(run_dir.join("report.json").exists());
    assert!(run_dir.join("partitions.csv").exists());
    assert!(run_dir.join("regular.csv").exists());

    let back = load_artifacts(&run_dir).unwrap();
    assert_eq!(back.results.len(), 3);
    for (a, b) in back.results.iter().zip(&report.results) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.splits, b.splits);
    }

    let regular = fs::read_to_string(run_dir.join("regular.csv")).unwrap();
    assert_eq!(regular.lines().count(), 1 + 3 * 365);
}

#[test]
fn disabled_outputs_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = vec![LoadedSeries {
        id: "a".into(),
        time_index: (1..=10).collect(),
        prices: vec![1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0],
    }];
    let report = BatchRunner::new(EngineConfig::new(2, MaxSplits::Unbounded))
        .unwrap()
        .run(&loaded);
    let output = OutputConfig {
        dir: dir.path().to_path_buf(),
        json: true,
        partitions_csv: false,
        regular_csv: false,
    };
    let run_dir = save_artifacts(&report, &output).unwrap();
    assert!(run_dir.join("report.json").exists());
    assert!(!run_dir.join("partitions.csv").exists());
    assert!(!run_dir.join("regular.csv").exists());
}

#[test]
fn bad_series_in_file_is_recorded_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("mixed.csv");
    fs::write(
        &csv_path,
        "sku,time,price\n\
         a,1,1.0\na,2,1.0\na,3,1.0\na,4,2.0\na,5,2.0\na,6,2.0\n\
         b,1,3.0\n\
         c,1,1.0\nc,1,1.5\n",
    )
    .unwrap();

    let mut input = InputConfig::new(&csv_path);
    input.series_column = Some("sku".into());
    let config = RunConfig::new(input, EngineConfig::new(2, MaxSplits::Unbounded));
    let report = run_from_config(&config).unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].splits, vec![3]);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(failed, vec!["b", "c"]);
}

#[test]
fn missing_input_file_is_a_data_error() {
    let config = RunConfig::new(
        InputConfig::new("/nonexistent/prices.csv"),
        EngineConfig::default(),
    );
    let err = run_from_config(&config).unwrap_err();
    assert!(matches!(err, regprice_runner::RunError::Data(_)));
}
