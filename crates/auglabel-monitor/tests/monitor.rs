//! kNN monitor and classifier evaluation over real loaders
//!
//! 1. Two well-separated clusters vote correctly with k=3
//! 2. k larger than the memory set fails before any batch is read
//! 3. Empty loaders and row-count mismatches are errors
//! 4. Non-finite embeddings are rejected
//! 5. Classifier evaluation scores both heads

use std::cell::Cell;
use std::sync::Arc;

use auglabel_core::prelude::*;
use auglabel_data::prelude::*;
use auglabel_monitor::prelude::*;
use auglabel_transforms::prelude::*;
use ndarray::{Array2, ArrayView4};

fn loader(pixels: &[(u8, usize)], batch_size: usize) -> DataLoader<InMemoryDataset> {
    let base: InMemoryDataset = pixels
        .iter()
        .map(|&(v, label)| (Image::filled(1, 1, [v, v, v]), label))
        .collect();
    DataLoader::new(
        AugmentedDataset::plain(base, Normalization::identity()),
        LoaderConfig::default().with_batch_size(batch_size),
    )
    .unwrap()
}

/// Loader that records whether it was iterated.
struct Tracked {
    inner: DataLoader<InMemoryDataset>,
    declared: usize,
    touched: Cell<bool>,
}

impl BatchLoader for Tracked {
    fn dataset_len(&self) -> usize {
        self.declared
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Result<Batch>> + '_> {
        self.touched.set(true);
        self.inner.batches()
    }
}

#[test]
fn clusters_vote_for_nearest_group() {
    let memory = loader(&[(0, 0), (10, 0), (240, 1), (250, 1)], 3);
    let query = loader(&[(20, 0)], 1);

    let report = KnnMonitor::new(3, 0.1)
        .unwrap()
        .run(&FlattenExtractor, &memory, &query)
        .unwrap();
    assert_eq!(report.correct, 1);
    assert_eq!(report.total, 1);
    assert_eq!(report.memory, 4);
    assert!((report.percent() - 100.0).abs() < 1e-9);
}

#[test]
fn k1_matches_nearest_label() {
    let memory = loader(&[(0, 3), (100, 1), (200, 2)], 2);
    let query = loader(&[(90, 1), (210, 2), (5, 3), (140, 2)], 3);
    // 140 is nearer to 100 (label 1), so one of four misses
    let pct = knn_monitor(&FlattenExtractor, &memory, &query, 1, 0.1).unwrap();
    assert!((pct - 75.0).abs() < 1e-9);
}

#[test]
fn k_larger_than_memory_is_rejected_before_work() {
    let memory = Tracked {
        inner: loader(&[(0, 0), (1, 1)], 2),
        declared: 2,
        touched: Cell::new(false),
    };
    let query = loader(&[(0, 0)], 1);

    let err = KnnMonitor::new(3, 0.1)
        .unwrap()
        .run(&FlattenExtractor, &memory, &query)
        .unwrap_err();
    assert!(err.is_config());
    assert!(!memory.touched.get());
}

#[test]
fn empty_loaders_are_errors() {
    let empty = loader(&[], 4);
    let some = loader(&[(0, 0), (1, 0)], 4);
    let monitor = KnnMonitor::new(1, 0.1).unwrap();

    let err = monitor.run(&FlattenExtractor, &empty, &some).unwrap_err();
    assert_eq!(err, AugError::empty_loader("memory"));

    let err = monitor.run(&FlattenExtractor, &some, &empty).unwrap_err();
    assert_eq!(err, AugError::empty_loader("query"));
}

#[test]
fn memory_row_count_must_match_declared_length() {
    let memory = Tracked {
        inner: loader(&[(0, 0), (1, 1), (2, 1)], 2),
        declared: 4,
        touched: Cell::new(false),
    };
    let query = loader(&[(0, 0)], 1);

    let err = KnnMonitor::new(1, 0.1)
        .unwrap()
        .run(&FlattenExtractor, &memory, &query)
        .unwrap_err();
    assert_eq!(err, AugError::row_count_mismatch(4, 3));
}

fn first_pixel(images: ArrayView4<'_, f32>) -> Result<Array2<f32>> {
    let b = images.shape()[0];
    Ok(Array2::from_shape_fn((b, 1), |(i, _)| images[[i, 0, 0, 0]]))
}

#[test]
fn function_extractor_and_bank_order() {
    let memory = loader(&[(5, 0), (6, 1), (7, 2), (8, 3), (9, 4)], 2);
    let bank = FeatureBank::build(&first_pixel, &memory).unwrap();
    assert_eq!(bank.labels(), &[0, 1, 2, 3, 4]);
    assert_eq!(bank.dim(), 1);
    assert!((bank.features()[[4, 0]] - 9.0 / 255.0).abs() < 1e-6);
}

/// Embeds bright pixels as NaN.
fn nan_when_bright(images: ArrayView4<'_, f32>) -> Result<Array2<f32>> {
    let b = images.shape()[0];
    Ok(Array2::from_shape_fn((b, 1), |(i, _)| {
        let v = images[[i, 0, 0, 0]];
        if v > 0.5 {
            f32::NAN
        } else {
            v
        }
    }))
}

#[test]
fn non_finite_embeddings_are_errors() {
    let monitor = KnnMonitor::new(1, 0.1).unwrap();

    let memory = loader(&[(0, 1), (250, 9), (10, 1)], 2);
    let query = loader(&[(0, 1)], 1);
    let err = monitor.run(&nan_when_bright, &memory, &query).unwrap_err();
    assert_eq!(err, AugError::non_finite_feature("memory", 1));

    let memory = loader(&[(0, 1), (10, 1)], 2);
    let query = loader(&[(5, 1), (250, 1)], 2);
    let err = monitor.run(&nan_when_bright, &memory, &query).unwrap_err();
    assert!(err.is_consistency());
}

/// Synthetic head reads the inverted flag from pixel brightness; online head
/// always answers class 0.
struct BrightnessClassifier;

impl Classifier for BrightnessClassifier {
    fn forward(&self, images: ArrayView4<'_, f32>) -> Result<ClassifierOutput> {
        let b = images.shape()[0];
        let synthetic_logits = Array2::from_shape_fn((b, 2), |(i, c)| {
            let bright = images[[i, 0, 0, 0]] > 0.5;
            if (c == 1) == bright {
                1.0
            } else {
                0.0
            }
        });
        let online_logits = Array2::from_shape_fn((b, 3), |(_, c)| if c == 0 { 1.0 } else { 0.0 });
        Ok(ClassifierOutput {
            synthetic_logits,
            online_logits,
        })
    }
}

#[test]
fn evaluation_scores_both_heads() {
    let units = TransformRegistry::new().select(["invert"]).unwrap();
    let catalog = ClassCatalog::enumerate(&units, ComboLimit::All, Normalization::identity());
    assert_eq!(catalog.descriptions(), vec!["identity", "invert"]);

    let base: InMemoryDataset = (0..40)
        .map(|i| (Image::filled(2, 2, [10, 10, 10]), i % 4 % 3))
        .collect();
    let data = DataLoader::new(
        AugmentedDataset::new(base, Arc::new(catalog)),
        LoaderConfig::default().with_batch_size(16).with_seed(5),
    )
    .unwrap();

    let report = evaluate_classifier(&BrightnessClassifier, &data, 2).unwrap();
    assert_eq!(report.samples, 40);
    assert!((report.accuracy - 1.0).abs() < 1e-12);
    assert!((report.mean_per_class_accuracy - 1.0).abs() < 1e-12);
    // Labels cycle 0, 1, 2, 0: half are class 0
    assert!((report.online_accuracy - 0.5).abs() < 1e-12);
    assert!(report.loss > 0.0 && report.online_loss > report.loss);
    assert_eq!(report.per_class_accuracy.len(), 2);
}

#[test]
fn evaluation_requires_synthetic_labels() {
    let base: InMemoryDataset = vec![(Image::filled(1, 1, [0, 0, 0]), 0)].into_iter().collect();
    let data = DataLoader::new(
        AugmentedDataset::new(base, Arc::new(ClassCatalog::from_combinations(vec![]))),
        LoaderConfig::default(),
    )
    .unwrap();

    let err = evaluate_classifier(&BrightnessClassifier, &data, 2).unwrap_err();
    assert!(err.is_consistency());
}
