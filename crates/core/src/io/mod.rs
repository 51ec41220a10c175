//! I/O for image files, feature tables and dataset manifests

mod image_file;
mod manifest;
mod table;

pub use image_file::{
    decode_color_image, read_color_image, read_gray_image, write_gray_image,
};
pub use manifest::{load_split, read_manifest, Manifest, ManifestEntry, Split};
pub use table::{write_feature_csv, write_feature_table};
