extern crate nalgebra as na;
extern crate rand;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use na::{DMatrix, Vector4};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::Float;
use crate::image::DepthImage;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_yaml::Error),
    #[error("shard {0} is truncated or corrupt")]
    CorruptShard(usize),
    #[error("datapoint image is {got:?}, dataset schema is {expected:?}")]
    ImageShape { expected: (usize, usize), got: (usize, usize) },
    #[error("datapoint index {0} out of range")]
    IndexOutOfRange(usize),
}

/**
 * The rotation label of a datapoint. Canonical-transform datasets store a
 * discrete class id, sampled-quaternion datasets store the quaternion
 * coordinates (i,j,k,w).
 */
#[derive(Debug, Clone, PartialEq)]
pub enum TransformLabel {
    Id(u32),
    Quaternion(Vector4<Float>)
}

#[derive(Debug, Clone)]
pub struct Datapoint {
    pub depth_image1: DepthImage,
    pub depth_image2: DepthImage,
    pub label: TransformLabel,
    pub obj_id: u32
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub width: usize,
    pub height: usize,
    pub shard_capacity: usize,
    pub num_shards: usize,
    pub num_datapoints: usize,
    /// datapoint count per shard; flushes may emit partial shards
    pub shard_sizes: Vec<usize>,
    pub fields: Vec<String>
}

const LABEL_KIND_ID: u32 = 0;
const LABEL_KIND_QUATERNION: u32 = 1;

/**
 * Shard-based tensor container. Datapoints are buffered in memory and
 * written out whenever the buffer reaches shard capacity or on flush; the
 * manifest is rewritten on every flush so readers see a consistent view.
 * A crash between flushes loses only the unflushed buffer.
 */
pub struct DatasetWriter {
    root: PathBuf,
    width: usize,
    height: usize,
    shard_capacity: usize,
    buffer: Vec<Datapoint>,
    shard_sizes: Vec<usize>,
    num_datapoints: usize
}

impl DatasetWriter {

    pub fn new(root: &Path, width: usize, height: usize, shard_capacity: usize) -> Result<DatasetWriter, DatasetError> {
        fs::create_dir_all(root)?;
        Ok(DatasetWriter {
            root: root.to_path_buf(),
            width,
            height,
            shard_capacity: shard_capacity.max(1),
            buffer: Vec::new(),
            shard_sizes: Vec::new(),
            num_datapoints: 0
        })
    }

    pub fn add(&mut self, datapoint: Datapoint) -> Result<(), DatasetError> {
        for image in &[&datapoint.depth_image1, &datapoint.depth_image2] {
            let got = (image.width(), image.height());
            if got != (self.width, self.height) {
                return Err(DatasetError::ImageShape { expected: (self.width, self.height), got });
            }
        }
        self.buffer.push(datapoint);
        self.num_datapoints += 1;
        if self.buffer.len() >= self.shard_capacity {
            self.write_shard()?;
        }
        Ok(())
    }

    pub fn num_datapoints(&self) -> usize {
        self.num_datapoints
    }

    pub fn flush(&mut self) -> Result<(), DatasetError> {
        if !self.buffer.is_empty() {
            self.write_shard()?;
        }
        self.write_manifest()
    }

    fn write_shard(&mut self) -> Result<(), DatasetError> {
        let path = shard_path(&self.root, self.shard_sizes.len());
        let mut writer = BufWriter::new(File::create(&path)?);

        writer.write_all(&(self.buffer.len() as u32).to_le_bytes())?;
        for datapoint in &self.buffer {
            writer.write_all(&datapoint.obj_id.to_le_bytes())?;
            match &datapoint.label {
                TransformLabel::Id(id) => {
                    writer.write_all(&LABEL_KIND_ID.to_le_bytes())?;
                    writer.write_all(&id.to_le_bytes())?;
                    for _ in 0..4 {
                        writer.write_all(&0f32.to_le_bytes())?;
                    }
                },
                TransformLabel::Quaternion(quat) => {
                    writer.write_all(&LABEL_KIND_QUATERNION.to_le_bytes())?;
                    writer.write_all(&0u32.to_le_bytes())?;
                    for i in 0..4 {
                        writer.write_all(&(quat[i] as f32).to_le_bytes())?;
                    }
                }
            }
            write_image(&mut writer, &datapoint.depth_image1)?;
            write_image(&mut writer, &datapoint.depth_image2)?;
        }

        self.shard_sizes.push(self.buffer.len());
        self.buffer.clear();
        self.write_manifest()
    }

    fn write_manifest(&self) -> Result<(), DatasetError> {
        let manifest = DatasetManifest {
            width: self.width,
            height: self.height,
            shard_capacity: self.shard_capacity,
            num_shards: self.shard_sizes.len(),
            num_datapoints: self.flushed_datapoints(),
            shard_sizes: self.shard_sizes.clone(),
            fields: vec!(
                String::from("depth_image1"),
                String::from("depth_image2"),
                String::from("transform"),
                String::from("obj_id"),
            )
        };
        let yaml = serde_yaml::to_string(&manifest)?;
        fs::write(self.root.join("manifest.yaml"), yaml)?;
        Ok(())
    }

    // only flushed datapoints are visible to readers
    fn flushed_datapoints(&self) -> usize {
        self.num_datapoints - self.buffer.len()
    }
}

pub struct DatasetReader {
    root: PathBuf,
    pub manifest: DatasetManifest
}

impl DatasetReader {

    pub fn open(root: &Path) -> Result<DatasetReader, DatasetError> {
        let yaml = fs::read_to_string(root.join("manifest.yaml"))?;
        let manifest: DatasetManifest = serde_yaml::from_str(&yaml)?;
        Ok(DatasetReader { root: root.to_path_buf(), manifest })
    }

    pub fn num_datapoints(&self) -> usize {
        self.manifest.num_datapoints
    }

    pub fn read_shard(&self, shard: usize) -> Result<Vec<Datapoint>, DatasetError> {
        let mut reader = BufReader::new(File::open(shard_path(&self.root, shard))?);

        let count = read_u32(&mut reader).map_err(|_| DatasetError::CorruptShard(shard))? as usize;
        let mut datapoints = Vec::<Datapoint>::with_capacity(count);
        for _ in 0..count {
            let obj_id = read_u32(&mut reader).map_err(|_| DatasetError::CorruptShard(shard))?;
            let label_kind = read_u32(&mut reader).map_err(|_| DatasetError::CorruptShard(shard))?;
            let id = read_u32(&mut reader).map_err(|_| DatasetError::CorruptShard(shard))?;
            let mut quat = Vector4::<Float>::zeros();
            for i in 0..4 {
                quat[i] = read_f32(&mut reader).map_err(|_| DatasetError::CorruptShard(shard))? as Float;
            }
            let label = match label_kind {
                LABEL_KIND_ID => TransformLabel::Id(id),
                LABEL_KIND_QUATERNION => TransformLabel::Quaternion(quat),
                _ => return Err(DatasetError::CorruptShard(shard))
            };
            let depth_image1 = self.read_image(&mut reader, shard)?;
            let depth_image2 = self.read_image(&mut reader, shard)?;
            datapoints.push(Datapoint { depth_image1, depth_image2, label, obj_id });
        }
        Ok(datapoints)
    }

    /**
     * Random access by global index. Shards may hold fewer datapoints than
     * the capacity when a flush wrote a partial buffer, so the index is
     * resolved against the per-shard sizes, not the capacity.
     */
    pub fn datapoint(&self, index: usize) -> Result<Datapoint, DatasetError> {
        let mut offset = index;
        for (shard, size) in self.manifest.shard_sizes.iter().enumerate() {
            if offset < *size {
                let datapoints = self.read_shard(shard)?;
                return datapoints.into_iter().nth(offset).ok_or(DatasetError::CorruptShard(shard));
            }
            offset -= size;
        }
        Err(DatasetError::IndexOutOfRange(index))
    }

    /**
     * Deterministic shuffled split by datapoint index. The same seed always
     * yields the same partition.
     */
    pub fn make_split(&self, train_pct: Float, seed: u64) -> (Vec<usize>, Vec<usize>) {
        let mut indices = (0..self.manifest.num_datapoints).collect::<Vec<usize>>();
        let mut rng = SmallRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
        let split = ((self.manifest.num_datapoints as Float)*train_pct).round() as usize;
        let test = indices.split_off(split.min(indices.len()));
        (indices, test)
    }

    fn read_image<R: Read>(&self, reader: &mut R, shard: usize) -> Result<DepthImage, DatasetError> {
        let width = self.manifest.width;
        let height = self.manifest.height;
        let mut buffer = DMatrix::<Float>::zeros(height, width);
        for r in 0..height {
            for c in 0..width {
                buffer[(r, c)] = read_f32(reader).map_err(|_| DatasetError::CorruptShard(shard))? as Float;
            }
        }
        Ok(DepthImage::from_matrix(buffer))
    }
}

fn shard_path(root: &Path, shard: usize) -> PathBuf {
    root.join(format!("shard_{:05}.bin", shard))
}

fn write_image<W: Write>(writer: &mut W, image: &DepthImage) -> Result<(), DatasetError> {
    for r in 0..image.height() {
        for c in 0..image.width() {
            writer.write_all(&(image.buffer[(r, c)] as f32).to_le_bytes())?;
        }
    }
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_f32<R: Read>(reader: &mut R) -> std::io::Result<f32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(f32::from_le_bytes(bytes))
}
