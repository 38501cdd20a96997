//! Integration tests for the end-to-end triage pipeline.

use ctg_triage::data::{ClassLabel, Dataset};
use ctg_triage::pipeline::{Pipeline, PipelineConfig};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Imbalanced three-cluster fixture: 200 Normal, 80 Suspect, 60
/// Pathological rows around well-separated centers in four dimensions.
fn imbalanced_clusters() -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let centers = [
        (ClassLabel::Normal, [0.0, 0.0, 0.0, 0.0], 200usize),
        (ClassLabel::Suspect, [6.0, 0.0, 6.0, 0.0], 80),
        (ClassLabel::Pathological, [0.0, 6.0, 0.0, 6.0], 60),
    ];

    let n: usize = centers.iter().map(|(_, _, count)| count).sum();
    let mut features = Array2::zeros((n, 4));
    let mut labels = Vec::with_capacity(n);
    let mut row = 0;
    for (label, center, count) in &centers {
        for _ in 0..*count {
            for (j, c) in center.iter().enumerate() {
                features[[row, j]] = c + rng.gen_range(-0.5..0.5);
            }
            labels.push(*label);
            row += 1;
        }
    }

    let schema = (1..=4).map(|i| format!("f{i}")).collect();
    Dataset::new(features, labels, schema).unwrap()
}

#[test]
fn test_pipeline_produces_complete_report() {
    let data = imbalanced_clusters();
    let report = Pipeline::new(PipelineConfig::default())
        .run(&data)
        .unwrap();

    assert_eq!(report.train_rows + report.test_rows, data.n_rows());
    assert_eq!(report.train_rows, (0.8 * data.n_rows() as f64) as usize);

    // Balancing must leave every class represented in the training set
    assert!(report.balanced_class_counts.iter().all(|&c| c > 0));

    assert_eq!(report.n_components, 3);
    assert_eq!(report.explained_variance_ratio.len(), 4);
    let ratio_sum: f64 = report.explained_variance_ratio.iter().sum();
    assert!((ratio_sum - 1.0).abs() < 1e-6);

    assert_eq!(report.confusion_counts.len(), 3);
    assert_eq!(report.class_stats.len(), 3);
    let matrix_total: usize = report
        .confusion_counts
        .iter()
        .flat_map(|row| row.iter())
        .sum();
    assert_eq!(matrix_total, report.test_rows);

    assert!(report.accuracy >= 0.0 && report.accuracy <= 1.0);
    assert!(report.accuracy_p_value >= 0.0 && report.accuracy_p_value <= 1.0);
}

#[test]
fn test_pipeline_separable_clusters_classified_well() {
    let data = imbalanced_clusters();
    let report = Pipeline::new(PipelineConfig::default())
        .run(&data)
        .unwrap();

    // Cleanly separated clusters should be near-perfectly classified
    assert!(report.accuracy > 0.95, "accuracy {}", report.accuracy);
    assert!(report.accuracy > report.null_model_accuracy);

    // All three unordered pairs should yield a curve with high AUC
    assert_eq!(report.pair_aucs.len(), 3);
    for pair in &report.pair_aucs {
        assert!(
            pair.auc > 0.9,
            "{} vs {}: auc {}",
            pair.first.name(),
            pair.second.name(),
            pair.auc
        );
    }
}

#[test]
fn test_pipeline_is_deterministic_for_a_seed() {
    let data = imbalanced_clusters();
    let config = PipelineConfig::default().with_seed(11);

    let first = Pipeline::new(config.clone()).run(&data).unwrap();
    let second = Pipeline::new(config).run(&data).unwrap();

    assert_eq!(first.confusion_counts, second.confusion_counts);
    assert_eq!(first.accuracy, second.accuracy);
    assert_eq!(first.balanced_class_counts, second.balanced_class_counts);
}

#[test]
fn test_pipeline_seed_changes_the_split() {
    let data = imbalanced_clusters();

    let a = Pipeline::new(PipelineConfig::default().with_seed(1))
        .run(&data)
        .unwrap();
    let b = Pipeline::new(PipelineConfig::default().with_seed(2))
        .run(&data)
        .unwrap();

    // Same shapes, different resampled contents
    assert_eq!(a.train_rows, b.train_rows);
    assert!(
        a.balanced_class_counts != b.balanced_class_counts
            || a.confusion_counts != b.confusion_counts
            || a.accuracy != b.accuracy
    );
}

#[test]
fn test_report_render_mentions_all_classes() {
    let data = imbalanced_clusters();
    let report = Pipeline::new(PipelineConfig::default())
        .run(&data)
        .unwrap();

    let text = report.render();
    for label in ClassLabel::ALL {
        assert!(text.contains(label.name()));
    }
    assert!(text.contains("Accuracy"));
    assert!(text.contains("Pairwise AUC"));
}
