use nalgebra as na;

use na::{DMatrix, Vector4};
use posegen::dataset::{Datapoint, DatasetError, DatasetReader, DatasetWriter, TransformLabel};
use posegen::image::DepthImage;
use posegen::Float;

fn test_datapoint(obj_id: u32, label: TransformLabel, fill: Float) -> Datapoint {
    let buffer = DMatrix::<Float>::from_element(8, 8, fill);
    Datapoint {
        depth_image1: DepthImage::from_matrix(buffer.clone()),
        depth_image2: DepthImage::from_matrix(buffer),
        label,
        obj_id
    }
}

#[test]
fn shard_round_trip_preserves_labels_and_images() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = DatasetWriter::new(dir.path(), 8, 8, 3).unwrap();

    for i in 0..7 {
        let label = match i % 2 {
            0 => TransformLabel::Id(i),
            _ => TransformLabel::Quaternion(Vector4::new(0.0, 0.0, 0.5, 0.5))
        };
        writer.add(test_datapoint(i + 1, label, 0.125*(i as Float))).unwrap();
    }
    writer.flush().unwrap();

    let reader = DatasetReader::open(dir.path()).unwrap();
    assert_eq!(reader.num_datapoints(), 7);
    assert_eq!(reader.manifest.num_shards, 3); // 3 + 3 + 1

    for i in 0..7u32 {
        let datapoint = reader.datapoint(i as usize).unwrap();
        assert_eq!(datapoint.obj_id, i + 1);
        match i % 2 {
            0 => assert_eq!(datapoint.label, TransformLabel::Id(i)),
            _ => assert_eq!(datapoint.label, TransformLabel::Quaternion(Vector4::new(0.0, 0.0, 0.5, 0.5)))
        }
        // pixels survive the f32 storage within single precision
        let expected = 0.125*(i as Float);
        assert!((datapoint.depth_image1.buffer[(4, 4)] - expected).abs() < 1e-6);
    }

    assert!(reader.datapoint(7).is_err());
}

#[test]
fn partial_shards_from_periodic_flushes_stay_addressable() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = DatasetWriter::new(dir.path(), 8, 8, 3).unwrap();

    for i in 0..2 {
        writer.add(test_datapoint(i + 1, TransformLabel::Id(i), 0.1*(i as Float))).unwrap();
    }
    writer.flush().unwrap(); // partial shard of 2, below capacity
    for i in 2..5 {
        writer.add(test_datapoint(i + 1, TransformLabel::Id(i), 0.1*(i as Float))).unwrap();
    }
    writer.flush().unwrap();

    let reader = DatasetReader::open(dir.path()).unwrap();
    assert_eq!(reader.num_datapoints(), 5);
    assert_eq!(reader.manifest.shard_sizes, vec!(2, 3));

    for i in 0..5u32 {
        let datapoint = reader.datapoint(i as usize).unwrap();
        assert_eq!(datapoint.obj_id, i + 1);
        assert_eq!(datapoint.label, TransformLabel::Id(i));
        let expected = 0.1*(i as Float);
        assert!((datapoint.depth_image1.buffer[(0, 0)] - expected).abs() < 1e-6);
    }
    assert!(reader.datapoint(5).is_err());
}

#[test]
fn unknown_label_kind_is_a_corrupt_shard() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = DatasetWriter::new(dir.path(), 8, 8, 1).unwrap();
    writer.add(test_datapoint(1, TransformLabel::Id(0), 0.5)).unwrap();
    writer.flush().unwrap();

    // count | obj_id | label_kind | ... - clobber the kind field
    let shard = dir.path().join("shard_00000.bin");
    let mut bytes = std::fs::read(&shard).unwrap();
    bytes[8..12].copy_from_slice(&7u32.to_le_bytes());
    std::fs::write(&shard, bytes).unwrap();

    let reader = DatasetReader::open(dir.path()).unwrap();
    assert!(matches!(reader.read_shard(0), Err(DatasetError::CorruptShard(0))));
}

#[test]
fn image_shape_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = DatasetWriter::new(dir.path(), 16, 16, 3).unwrap();
    let result = writer.add(test_datapoint(1, TransformLabel::Id(0), 0.0));
    assert!(result.is_err());
}

#[test]
fn split_is_deterministic_and_respects_percentage() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = DatasetWriter::new(dir.path(), 8, 8, 10).unwrap();
    for i in 0..100 {
        writer.add(test_datapoint(1, TransformLabel::Id(i), 0.5)).unwrap();
    }
    writer.flush().unwrap();

    let reader = DatasetReader::open(dir.path()).unwrap();
    let (train_a, test_a) = reader.make_split(0.8, 99);
    let (train_b, test_b) = reader.make_split(0.8, 99);

    assert_eq!(train_a.len(), 80);
    assert_eq!(test_a.len(), 20);
    assert_eq!(train_a, train_b);
    assert_eq!(test_a, test_b);

    let mut all = train_a.clone();
    all.extend(&test_a);
    all.sort();
    assert_eq!(all, (0..100).collect::<Vec<usize>>());
}

#[test]
fn unflushed_datapoints_are_not_visible_to_readers() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = DatasetWriter::new(dir.path(), 8, 8, 100).unwrap();
    for i in 0..5 {
        writer.add(test_datapoint(1, TransformLabel::Id(i), 0.5)).unwrap();
    }
    writer.flush().unwrap();
    for i in 5..8 {
        writer.add(test_datapoint(1, TransformLabel::Id(i), 0.5)).unwrap();
    }
    // no flush for the tail

    let reader = DatasetReader::open(dir.path()).unwrap();
    assert_eq!(reader.num_datapoints(), 5);
}
