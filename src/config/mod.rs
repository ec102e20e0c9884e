use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::Float;
use crate::pairgen::{Dissimilarity, PairGenParameters, TransformSet};
use crate::stable_pose::StablePoseParameters;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fx: Float,
    pub fy: Float,
    pub cx: Float,
    pub cy: Float,
    pub width: usize,
    pub height: usize,
    pub znear: Float,
    pub zfar: Float,
    pub view_distance: Float
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectsConfig {
    pub mesh_dir: String,
    pub collections: Vec<String>,
    pub stp_com_sigma: Float,
    pub stp_num_samples: usize,
    pub stp_min_prob: Float
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSpaceConfig {
    pub camera: CameraConfig,
    pub objects: ObjectsConfig
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum TransformSetConfig {
    XyzAxis,
    ZAxisOnly,
    Quaternion
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub output_dir: String,
    pub shard_capacity: usize,
    pub transform_set: TransformSetConfig,
    /// angular bound in radians, only used by the quaternion transform set
    pub max_angle: Float,
    pub similarity_threshold: Float,
    pub reject_symmetric: bool,
    /// reject a stable pose once this many of its pairs are low-information ..
    pub low_info_limit: usize,
    /// .. and this many of its second images collapse onto each other
    pub collapse_limit: usize,
    pub shape_match_points: Option<usize>,
    pub seed: u64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    pub debug: bool,
    pub num_samples_per_obj: usize,
    pub state_space: StateSpaceConfig,
    pub dataset: DatasetConfig
}

impl GenConfig {

    pub fn load(file_path: &Path) -> Result<GenConfig, ConfigError> {
        let contents = std::fs::read_to_string(file_path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn stable_pose_parameters(&self) -> StablePoseParameters {
        StablePoseParameters {
            com_sigma: self.state_space.objects.stp_com_sigma,
            num_samples: self.state_space.objects.stp_num_samples,
            min_probability: self.state_space.objects.stp_min_prob
        }
    }

    pub fn pairgen_parameters(&self) -> PairGenParameters {
        let transform_set = match self.dataset.transform_set {
            TransformSetConfig::XyzAxis => TransformSet::CanonicalXyz,
            TransformSetConfig::ZAxisOnly => TransformSet::CanonicalZ,
            TransformSetConfig::Quaternion => TransformSet::SampledQuaternion { max_angle: self.dataset.max_angle }
        };
        let dissimilarity = match self.dataset.shape_match_points {
            Some(points) => Dissimilarity::ShapeMatch { points },
            None => Dissimilarity::PixelL2
        };
        PairGenParameters {
            transform_set,
            dissimilarity,
            similarity_threshold: self.dataset.similarity_threshold,
            reject_symmetric: self.dataset.reject_symmetric,
            low_info_limit: self.dataset.low_info_limit,
            collapse_limit: self.dataset.collapse_limit,
            samples_per_object: self.num_samples_per_obj,
            seed: self.dataset.seed
        }
    }
}
