//! Error types for auglabel operations.
//!
//! Three families: configuration problems rejected before any work starts,
//! consistency violations discovered while data flows, and failures raised
//! inside a transform unit.

use std::error::Error;
use std::fmt;

/// Result type for auglabel operations.
pub type Result<T> = std::result::Result<T, AugError>;

/// Errors that can occur during auglabel operations.
#[derive(Debug, Clone, PartialEq)]
pub enum AugError {
    /// Invalid configuration, rejected eagerly.
    Config(ConfigError),
    /// Data did not line up with what was declared.
    Consistency(ConsistencyError),
    /// A transform unit failed on its input.
    Transform(TransformError),
    /// I/O errors (wrapped).
    Io(String),
    /// Serialization errors.
    Serialization(String),
}

impl fmt::Display for AugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AugError::Config(e) => write!(f, "Config error: {}", e),
            AugError::Consistency(e) => write!(f, "Consistency error: {}", e),
            AugError::Transform(e) => write!(f, "Transform error: {}", e),
            AugError::Io(msg) => write!(f, "I/O error: {}", msg),
            AugError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for AugError {}

impl From<std::io::Error> for AugError {
    fn from(e: std::io::Error) -> Self {
        AugError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AugError {
    fn from(e: serde_json::Error) -> Self {
        AugError::Serialization(e.to_string())
    }
}

impl From<ConfigError> for AugError {
    fn from(e: ConfigError) -> Self {
        AugError::Config(e)
    }
}

impl From<ConsistencyError> for AugError {
    fn from(e: ConsistencyError) -> Self {
        AugError::Consistency(e)
    }
}

impl From<TransformError> for AugError {
    fn from(e: TransformError) -> Self {
        AugError::Transform(e)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid value.
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Transform name not in the vocabulary.
    UnknownTransform(String),
    /// Transform name reserved but not implemented.
    ReservedTransform(String),
    /// Out of range.
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid value for {}: {} ({})", field, value, reason)
            }
            ConfigError::UnknownTransform(name) => write!(f, "Unknown transform: {}", name),
            ConfigError::ReservedTransform(name) => {
                write!(f, "Transform {} is reserved and not implemented", name)
            }
            ConfigError::OutOfRange {
                field,
                min,
                max,
                value,
            } => {
                write!(
                    f,
                    "{} out of range: {} (must be {}-{})",
                    field, value, min, max
                )
            }
        }
    }
}

/// Consistency errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsistencyError {
    /// Number of rows produced differs from the declared dataset length.
    RowCountMismatch { expected: usize, actual: usize },
    /// A loader yielded no samples where a population is required.
    EmptyLoader(String),
    /// Tensors that must share a shape do not.
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    /// A sample carried no synthetic label where one is required.
    MissingSyntheticLabel { position: usize },
    /// Index outside the dataset.
    IndexOutOfRange { index: usize, len: usize },
    /// An embedding row holds NaN or infinity.
    NonFiniteFeature { source: String, row: usize },
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyError::RowCountMismatch { expected, actual } => {
                write!(f, "Row count mismatch: expected {}, got {}", expected, actual)
            }
            ConsistencyError::EmptyLoader(which) => write!(f, "Loader is empty: {}", which),
            ConsistencyError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {:?}, got {:?}", expected, actual)
            }
            ConsistencyError::MissingSyntheticLabel { position } => {
                write!(f, "Sample {} has no synthetic label", position)
            }
            ConsistencyError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for length {}", index, len)
            }
            ConsistencyError::NonFiniteFeature { source, row } => {
                write!(f, "Non-finite {} feature in row {}", source, row)
            }
        }
    }
}

/// Errors raised inside a transform unit.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Pixel buffer does not match the declared dimensions.
    MalformedImage { expected: usize, actual: usize },
    /// Transform cannot operate on a zero-sized image.
    EmptyImage(String),
    /// Transform parameters cannot be applied to this input.
    InvalidParameter { transform: String, reason: String },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::MalformedImage { expected, actual } => write!(
                f,
                "Malformed image: expected {} bytes, got {}",
                expected, actual
            ),
            TransformError::EmptyImage(transform) => {
                write!(f, "{} cannot be applied to an empty image", transform)
            }
            TransformError::InvalidParameter { transform, reason } => {
                write!(f, "Invalid parameter for {}: {}", transform, reason)
            }
        }
    }
}

// Convenience constructors
impl AugError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AugError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn unknown_transform(name: impl Into<String>) -> Self {
        AugError::Config(ConfigError::UnknownTransform(name.into()))
    }

    pub fn empty_loader(which: impl Into<String>) -> Self {
        AugError::Consistency(ConsistencyError::EmptyLoader(which.into()))
    }

    pub fn row_count_mismatch(expected: usize, actual: usize) -> Self {
        AugError::Consistency(ConsistencyError::RowCountMismatch { expected, actual })
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        AugError::Consistency(ConsistencyError::IndexOutOfRange { index, len })
    }

    pub fn non_finite_feature(source: impl Into<String>, row: usize) -> Self {
        AugError::Consistency(ConsistencyError::NonFiniteFeature {
            source: source.into(),
            row,
        })
    }

    pub fn invalid_parameter(transform: impl Into<String>, reason: impl Into<String>) -> Self {
        AugError::Transform(TransformError::InvalidParameter {
            transform: transform.into(),
            reason: reason.into(),
        })
    }

    /// True for errors that are rejected before any computation starts.
    pub fn is_config(&self) -> bool {
        matches!(self, AugError::Config(_))
    }

    /// True for data/declaration mismatches.
    pub fn is_consistency(&self) -> bool {
        matches!(self, AugError::Consistency(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_family() {
        let e = AugError::invalid_config("max_combo_size", "-3", "must be -1 or >= 0");
        assert_eq!(
            e.to_string(),
            "Config error: Invalid value for max_combo_size: -3 (must be -1 or >= 0)"
        );

        let e = AugError::row_count_mismatch(10, 9);
        assert!(e.to_string().starts_with("Consistency error"));
        assert!(e.is_consistency());
        assert!(!e.is_config());
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: AugError = io.into();
        assert!(matches!(e, AugError::Io(_)));
    }
}
