//! Error kinds raised while turning joint samples into a pointer
//!
//! `DegenerateInput` and `ZeroPointingMagnitude` are recovered inside the
//! pipeline by holding the previous frame. `DimensionMismatch` only fires on a
//! broken caller.

use std::fmt;

/// Errors from the sphere fit and pointer pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerError {
    /// Normal-equations matrix is singular (collinear/coplanar samples)
    DegenerateInput,
    /// Dot product operands of unequal length
    DimensionMismatch { left: usize, right: usize },
    /// Hand root coincides with the fitted sphere center
    ZeroPointingMagnitude,
}

impl fmt::Display for PointerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerError::DegenerateInput => {
                write!(f, "Sphere fit failed: joint samples are collinear or coplanar")
            }
            PointerError::DimensionMismatch { left, right } => {
                write!(f, "Cannot take dot product of vectors of length {} and {}", left, right)
            }
            PointerError::ZeroPointingMagnitude => {
                write!(f, "Hand root coincides with the fitted sphere center")
            }
        }
    }
}

impl std::error::Error for PointerError {}

/// Errors from validating or parsing configuration
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// JSON could not be parsed into the target config type
    Parse(String),
    /// Release depth must sit strictly below select depth
    InvertedHysteresis { select_depth: f32, release_depth: f32 },
    /// A length or variance that must be positive was not
    NonPositive(&'static str),
    /// Sample set smaller than the four points a sphere needs
    TooFewSamples(usize),
    /// Hand index outside 0..2
    UnknownHand(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Config parse failed: {}", e),
            ConfigError::InvertedHysteresis { select_depth, release_depth } => write!(
                f,
                "release_depth ({}) must be below select_depth ({})",
                release_depth, select_depth
            ),
            ConfigError::NonPositive(field) => write!(f, "{} must be positive", field),
            ConfigError::TooFewSamples(n) => {
                write!(f, "Sphere fit needs at least 4 samples, got {}", n)
            }
            ConfigError::UnknownHand(i) => write!(f, "Unknown hand index {} (expected 0 or 1)", i),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
