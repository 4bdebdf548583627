#![forbid(unsafe_code)]

//! Configuration errors.
//!
//! The engine itself never fails: bad runtime input degrades to a fallback
//! and asynchronous outcomes are reported as `finished = false`. The only
//! typed error surface is [`SheetConfig::validate`](crate::config::SheetConfig::validate),
//! which hosts can call to reject a configuration up front instead of
//! letting the engine clamp it.

use std::fmt;

/// A configuration value outside its valid range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `bounces_factor` is negative or not finite.
    InvalidBouncesFactor(f64),
    /// A spring parameter is below its minimum or not finite.
    InvalidSpring { field: &'static str, value: f64 },
    /// `deceleration_rate` is outside `[0, 1)`.
    InvalidDecelerationRate(f64),
    /// A tolerance (`settle_threshold`, `pixel_epsilon`, `position_epsilon`)
    /// is not strictly positive and finite.
    InvalidTolerance { field: &'static str, value: f64 },
    /// `time_scale` is not strictly positive and finite.
    InvalidTimeScale(f64),
    /// The bottom bar height is negative or not finite.
    InvalidBottomBarHeight(f64),
}

impl ConfigError {
    /// Name of the offending configuration field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidBouncesFactor(_) => "bounces_factor",
            Self::InvalidSpring { field, .. } | Self::InvalidTolerance { field, .. } => field,
            Self::InvalidDecelerationRate(_) => "deceleration_rate",
            Self::InvalidTimeScale(_) => "time_scale",
            Self::InvalidBottomBarHeight(_) => "bottom_bar.height",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBouncesFactor(v) => {
                write!(f, "bounces factor must be finite and non-negative, got {v}")
            }
            Self::InvalidSpring { field, value } => {
                write!(f, "spring {field} out of range: {value}")
            }
            Self::InvalidDecelerationRate(v) => {
                write!(f, "deceleration rate must be in [0, 1), got {v}")
            }
            Self::InvalidTolerance { field, value } => {
                write!(f, "{field} must be finite and positive, got {value}")
            }
            Self::InvalidTimeScale(v) => {
                write!(f, "time scale must be finite and positive, got {v}")
            }
            Self::InvalidBottomBarHeight(v) => {
                write!(f, "bottom bar height must be finite and non-negative, got {v}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Standard result type for configuration checks.
pub type Result<T> = std::result::Result<T, ConfigError>;
