//! Error types for cellfeat

use thiserror::Error;

/// Main error type for cellfeat operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid or out-of-range construction parameter
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    Config {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Image or mask dimensions incompatible with an operation
    #[error("Shape error: {0}")]
    Shape(String),

    /// Image and mask (or paired images) of different sizes
    #[error("Size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    /// Paired input lists of different lengths
    #[error("Length mismatch: {what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Mathematically degenerate input
    #[error("Domain error: {0}")]
    Domain(String),

    /// Empty region where a region statistic or moment is required
    #[error("Degenerate region: {0}")]
    DegenerateRegion(String),

    /// A per-image failure inside a batch
    #[error("image {index}: {source}")]
    AtImage {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::Config`] error.
    pub fn config(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::Config {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Attribute this error to the image at `index` of a batch.
    pub fn at_image(self, index: usize) -> Self {
        match self {
            // Already attributed (nested batches keep the innermost index)
            e @ Error::AtImage { .. } => e,
            e => Error::AtImage {
                index,
                source: Box::new(e),
            },
        }
    }

    /// Index of the failing image, if this error came out of a batch.
    pub fn image_index(&self) -> Option<usize> {
        match self {
            Error::AtImage { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The underlying error with any batch attribution stripped.
    pub fn root(&self) -> &Error {
        match self {
            Error::AtImage { source, .. } => source.root(),
            e => e,
        }
    }
}

impl From<::image::ImageError> for Error {
    fn from(e: ::image::ImageError) -> Self {
        Error::Decode(e.to_string())
    }
}

/// Result type alias for cellfeat operations
pub type Result<T> = std::result::Result<T, Error>;
