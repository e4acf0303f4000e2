// Loading MNIST-layout IDX files from disk.

use std::fs;
use std::path::Path;

use ferrite_digits::data::idx::{encode_images, encode_labels, read_images};
use ferrite_digits::data::mnist::{TEST_IMAGES, TEST_LABELS, TRAIN_IMAGES, TRAIN_LABELS};
use ferrite_digits::{DatasetError, MnistData};

fn write_split(dir: &Path, images_name: &str, labels_name: &str, labels: &[u8]) {
    let images: Vec<Vec<u8>> = labels
        .iter()
        .map(|&l| (0..4).map(|p| if p == (l as usize % 4) { 255 } else { 0 }).collect())
        .collect();
    fs::write(dir.join(images_name), encode_images(&images, 2, 2).unwrap()).unwrap();
    fs::write(dir.join(labels_name), encode_labels(labels).unwrap()).unwrap();
}

#[test]
fn loads_both_splits() {
    let dir = tempfile::tempdir().unwrap();
    write_split(dir.path(), TRAIN_IMAGES, TRAIN_LABELS, &[0, 1, 2, 3, 9]);
    write_split(dir.path(), TEST_IMAGES, TEST_LABELS, &[5, 6]);

    let data = MnistData::load(dir.path()).unwrap();
    assert_eq!(data.train.len(), 5);
    assert_eq!(data.test.len(), 2);
    assert_eq!(data.input_size(), Some(4));

    let nine = &data.train[4];
    assert_eq!(nine.target.len(), 10);
    assert_eq!(nine.label(), 9);
    assert_eq!(nine.input, vec![0.0, 1.0, 0.0, 0.0]);
    assert_eq!(data.test[0].label(), 5);
}

#[test]
fn truncate_keeps_prefix() {
    let dir = tempfile::tempdir().unwrap();
    write_split(dir.path(), TRAIN_IMAGES, TRAIN_LABELS, &[0, 1, 2, 3]);
    write_split(dir.path(), TEST_IMAGES, TEST_LABELS, &[4, 5, 6]);

    let mut data = MnistData::load(dir.path()).unwrap();
    data.truncate(Some(2), None);
    assert_eq!(data.train.len(), 2);
    assert_eq!(data.train[1].label(), 1);
    assert_eq!(data.test.len(), 3);
}

#[test]
fn count_mismatch_between_files_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_split(dir.path(), TRAIN_IMAGES, TRAIN_LABELS, &[0, 1, 2]);
    write_split(dir.path(), TEST_IMAGES, TEST_LABELS, &[4]);
    fs::write(dir.path().join(TRAIN_LABELS), encode_labels(&[0, 1]).unwrap()).unwrap();

    let err = MnistData::load(dir.path()).unwrap_err();
    assert!(matches!(err, DatasetError::LengthMismatch { images: 3, labels: 2 }));
}

#[test]
fn label_above_nine_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_split(dir.path(), TRAIN_IMAGES, TRAIN_LABELS, &[0, 12]);
    write_split(dir.path(), TEST_IMAGES, TEST_LABELS, &[4]);

    let err = MnistData::load(dir.path()).unwrap_err();
    assert!(matches!(err, DatasetError::LabelOutOfRange { index: 1, label: 12, classes: 10 }));
}

#[test]
fn missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MnistData::load(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, DatasetError::Io { .. }));
}

#[test]
fn read_images_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("imgs");
    fs::write(&path, encode_images(&[vec![0, 255, 0, 255, 0, 255]], 2, 3).unwrap()).unwrap();
    let images = read_images(&path).unwrap();
    assert_eq!(images, vec![vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]]);
}
