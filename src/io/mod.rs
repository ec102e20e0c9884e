extern crate nalgebra as na;

use std::fs;
use std::path::{Path, PathBuf};
use na::{Matrix4, Vector4};

use crate::Float;
use crate::mesh::MeshLoadError;

/**
 * A mesh file inside a named sub-collection, with its assigned object id.
 */
#[derive(Debug, Clone)]
pub struct MeshEntry {
    pub path: PathBuf,
    pub collection: String,
    pub obj_id: u32
}

/**
 * Enumerates mesh files from a root directory partitioned into named
 * sub-collections. Entries are sorted by file name within each collection so
 * object ids are stable across platforms and runs.
 */
pub fn enumerate_meshes(mesh_dir: &Path, collections: &Vec<String>) -> Result<Vec<MeshEntry>, MeshLoadError> {
    let mut entries = Vec::<MeshEntry>::new();
    let mut obj_id = 0u32;

    for collection in collections {
        let dir = mesh_dir.join(collection);
        if !dir.is_dir() {
            log::warn!("mesh collection {} not found under {}", collection, mesh_dir.display());
            continue;
        }

        let mut files = fs::read_dir(&dir)?
            .collect::<Result<Vec<fs::DirEntry>, std::io::Error>>()?
            .into_iter()
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "obj").unwrap_or(false))
            .collect::<Vec<PathBuf>>();
        files.sort();

        for path in files {
            obj_id += 1;
            entries.push(MeshEntry { path, collection: collection.clone(), obj_id });
        }
    }

    Ok(entries)
}

/**
 * Plain text pose matrix, one row per line, whitespace separated.
 */
pub fn save_pose_matrix(file_path: &Path, pose: &Matrix4<Float>) -> std::io::Result<()> {
    let mut out = String::new();
    for r in 0..4 {
        let row = (0..4).map(|c| format!("{:e}", pose[(r, c)])).collect::<Vec<String>>();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    fs::write(file_path, out)
}

pub fn load_pose_matrix(file_path: &Path) -> std::io::Result<Matrix4<Float>> {
    let contents = fs::read_to_string(file_path)?;
    let values = contents.split_whitespace()
        .map(|t| t.parse::<Float>().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
        .collect::<std::io::Result<Vec<Float>>>()?;
    if values.len() != 16 {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, format!("expected 16 values, got {}", values.len())));
    }
    let mut pose = Matrix4::<Float>::zeros();
    for r in 0..4 {
        for c in 0..4 {
            pose[(r, c)] = values[r*4 + c];
        }
    }
    Ok(pose)
}

pub fn save_quaternion(file_path: &Path, quat: &Vector4<Float>) -> std::io::Result<()> {
    let row = (0..4).map(|i| format!("{:e}", quat[i])).collect::<Vec<String>>();
    fs::write(file_path, format!("{}\n", row.join(" ")))
}

pub fn load_quaternion(file_path: &Path) -> std::io::Result<Vector4<Float>> {
    let contents = fs::read_to_string(file_path)?;
    let values = contents.split_whitespace()
        .map(|t| t.parse::<Float>().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
        .collect::<std::io::Result<Vec<Float>>>()?;
    if values.len() != 4 {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, format!("expected 4 values, got {}", values.len())));
    }
    Ok(Vector4::new(values[0], values[1], values[2], values[3]))
}
