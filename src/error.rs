//! Error types for generation configuration.
//!
//! Invalid configuration is always reported, never silently coerced;
//! numeric sliders clamp to their documented domains elsewhere because that
//! clamping is part of their contract, not an error path.

/// Configuration errors detected before or during a generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A fractal mode string did not name a known mode.
    UnknownFractalMode(String),
    /// A distance metric string did not name a known metric.
    UnknownDistanceMetric(String),
    /// An occupancy layer's dimensions differ from the context's layers.
    LayerDimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Two placement layers in one generation pass share an id.
    DuplicateLayerId(String),
    /// A snapshot's flattened buffer length disagrees with its stated dims.
    SnapshotLengthMismatch {
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFractalMode(name) => {
                write!(f, "unknown fractal mode '{}'", name)
            }
            Self::UnknownDistanceMetric(name) => {
                write!(f, "unknown distance metric '{}'", name)
            }
            Self::LayerDimensionMismatch { expected, found } => write!(
                f,
                "layer dimensions {}x{} do not match existing layers {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            Self::DuplicateLayerId(id) => {
                write!(f, "duplicate placement layer id '{}'", id)
            }
            Self::SnapshotLengthMismatch { expected, found } => write!(
                f,
                "snapshot buffer holds {} cells but dimensions require {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ConfigError::DuplicateLayerId("trees".into());
        assert!(err.to_string().contains("trees"));

        let err = ConfigError::LayerDimensionMismatch {
            expected: (8, 8),
            found: (4, 4),
        };
        assert!(err.to_string().contains("4x4"));
    }
}
