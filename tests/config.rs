use std::io::Write;

use posegen::config::GenConfig;
use posegen::pairgen::TransformSet;

#[test]
fn yaml_config_drives_the_rejection_policy() {
    let yaml = "\
debug: false
num_samples_per_obj: 2
state_space:
  camera: {fx: 260.0, fy: 260.0, cx: 32.0, cy: 32.0, width: 64, height: 64, znear: 0.05, zfar: 3.0, view_distance: 0.8}
  objects: {mesh_dir: data, collections: [a], stp_com_sigma: 0.01, stp_num_samples: 100, stp_min_prob: 0.05}
dataset:
  output_dir: out
  shard_capacity: 10
  transform_set: z-axis-only
  max_angle: 0.5
  similarity_threshold: 0.9
  reject_symmetric: true
  low_info_limit: 1
  collapse_limit: 5
  shape_match_points: null
  seed: 3
";
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", yaml).unwrap();

    let config = GenConfig::load(file.path()).unwrap();
    let parameters = config.pairgen_parameters();

    assert_eq!(parameters.transform_set, TransformSet::CanonicalZ);
    assert!(parameters.reject_symmetric);
    assert_eq!(parameters.low_info_limit, 1);
    assert_eq!(parameters.collapse_limit, 5);
    assert_eq!(parameters.samples_per_object, 2);
    assert_eq!(parameters.seed, 3);
}
