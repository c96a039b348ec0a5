//! CIFAR binary files on disk.

use std::fs;
use std::path::Path;

use auglabel_core::prelude::*;
use auglabel_data::prelude::*;
use auglabel_data::cifar::CIFAR_PIXELS;
use tempfile::TempDir;

fn write_records(dir: &Path, file: &str, variant: CifarVariant, labels: &[u8]) {
    let mut bytes = Vec::new();
    for &label in labels {
        if variant == CifarVariant::Cifar100 {
            bytes.push(label / 5);
        }
        bytes.push(label);
        bytes.extend((0..CIFAR_PIXELS).map(|i| (i % 251) as u8 ^ label));
    }
    fs::write(dir.join(file), bytes).unwrap();
}

#[test]
fn loads_cifar10_train_batches_in_order() {
    let tmp = TempDir::new().unwrap();
    for (n, file) in CifarVariant::Cifar10.files(Split::Train).iter().enumerate() {
        write_records(tmp.path(), file, CifarVariant::Cifar10, &[n as u8, 9 - n as u8]);
    }

    let ds = CifarDataset::load(tmp.path(), CifarVariant::Cifar10, Split::Train).unwrap();
    assert_eq!(ds.len(), 10);
    assert_eq!(ds.labels(), &[0, 9, 1, 8, 2, 7, 3, 6, 4, 5]);
    assert_eq!(ds.name(), "cifar10-train");

    let (image, label) = ds.get(1).unwrap();
    assert_eq!(label, 9);
    // Red plane starts the record; pixel (0, 0) red is byte 0
    assert_eq!(image.get(0, 0)[0], 9);
}

#[test]
fn loads_cifar100_test_split() {
    let tmp = TempDir::new().unwrap();
    write_records(tmp.path(), "test.bin", CifarVariant::Cifar100, &[99, 0, 57]);

    let ds = CifarDataset::load(tmp.path(), CifarVariant::Cifar100, Split::Test).unwrap();
    assert_eq!(ds.labels(), &[99, 0, 57]);
    assert_eq!(ds.num_classes(), Some(100));
}

#[test]
fn missing_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    let err = CifarDataset::load(tmp.path(), CifarVariant::Cifar100, Split::Train).unwrap_err();
    match err {
        DataError::MissingFile(path) => assert!(path.ends_with("train.bin")),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn truncated_file_is_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("test_batch.bin"), vec![0u8; 100]).unwrap();
    let err = CifarDataset::load(tmp.path(), CifarVariant::Cifar10, Split::Test).unwrap_err();
    assert!(matches!(err, DataError::Truncated { len: 100, .. }));
}

#[test]
fn statistics_over_loaded_split() {
    let tmp = TempDir::new().unwrap();
    write_records(tmp.path(), "test_batch.bin", CifarVariant::Cifar10, &[0, 0]);
    let ds = CifarDataset::load(tmp.path(), CifarVariant::Cifar10, Split::Test).unwrap();

    let stats = compute_mean_std(&ds).unwrap();
    assert_eq!(stats.samples, 2);
    for c in 0..CHANNELS {
        assert!(stats.mean[c] > 0.0 && stats.mean[c] < 1.0);
        assert!(stats.std[c] > 0.0);
    }
    assert!(stats.normalization().is_ok());
}
