//! Dataset manifest: file path -> class label -> class index -> split
//!
//! The manifest is a CSV with header `path,label,label_idx,split`.
//! Relative paths are resolved against the manifest's own directory.

use crate::error::{Error, Result};
use crate::image::MultiChannelImage;
use crate::io::read_color_image;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Dataset partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl FromStr for Split {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "train" => Ok(Split::Train),
            "valid" | "validation" => Ok(Split::Valid),
            "test" => Ok(Split::Test),
            _ => Err(Error::config("split", s, "expected train, valid or test")),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        };
        f.write_str(name)
    }
}

/// One manifest row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub label: String,
    pub label_idx: usize,
    pub split: Split,
}

/// All rows of a manifest, paths already resolved
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Entries belonging to `split`, in manifest order
    pub fn split(&self, split: Split) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(move |e| e.split == split)
    }

    /// Number of entries in `split`
    pub fn count(&self, split: Split) -> usize {
        self.split(split).count()
    }
}

/// Read a manifest CSV
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let path = path.as_ref();
    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut reader = csv::Reader::from_path(path)?;

    let mut entries = Vec::new();
    for row in reader.deserialize() {
        let mut entry: ManifestEntry = row?;
        if entry.path.is_relative() {
            entry.path = base.join(&entry.path);
        }
        entries.push(entry);
    }

    debug!("manifest {}: {} entries", path.display(), entries.len());
    Ok(Manifest { entries })
}

/// Decode every image of `split` along with its class index.
///
/// Decode failures are attributed to the position within the split.
pub fn load_split(manifest: &Manifest, split: Split) -> Result<(Vec<MultiChannelImage>, Vec<usize>)> {
    let mut images = Vec::new();
    let mut labels = Vec::new();
    for (i, entry) in manifest.split(split).enumerate() {
        let img = read_color_image(&entry.path).map_err(|e| e.at_image(i))?;
        images.push(img);
        labels.push(entry.label_idx);
    }
    Ok((images, labels))
}
