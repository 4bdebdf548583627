#![forbid(unsafe_code)]

//! Sheet configuration.
//!
//! [`SheetConfig`] gathers the tunables of the engine. Every field has a
//! default; `with_*` builders adjust single fields. Out-of-range values are
//! reported by [`SheetConfig::validate`] and clamped by
//! [`SheetConfig::sanitized`], which the engine applies on construction.

use crate::animation::spring::SpringParameters;
use crate::error::{ConfigError, Result};
use crate::selector::DECELERATION_RATE_FAST;

/// Default bottom bar height.
pub const DEFAULT_BOTTOM_BAR_HEIGHT: f64 = 64.0;

/// How the sheet animates between anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationParameters {
    /// Closed-form damped spring.
    Spring(SpringParameters),
}

impl Default for AnimationParameters {
    fn default() -> Self {
        Self::Spring(SpringParameters::default())
    }
}

impl AnimationParameters {
    /// Spring with the given physical parameters.
    #[must_use]
    pub fn spring(mass: f64, stiffness: f64, damping_ratio: f64) -> Self {
        Self::Spring(SpringParameters {
            mass,
            stiffness,
            damping_ratio,
        })
    }

    /// Underlying spring parameters.
    #[must_use]
    pub fn spring_parameters(&self) -> SpringParameters {
        match self {
            Self::Spring(p) => *p,
        }
    }
}

/// Bar pinned to the container bottom, below the sheet content.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BottomBarConfig {
    /// Whether the bar is hidden.
    pub hidden: bool,
    /// Bar height, excluding the bottom safe area.
    pub height: f64,
}

impl Default for BottomBarConfig {
    fn default() -> Self {
        Self {
            hidden: true,
            height: DEFAULT_BOTTOM_BAR_HEIGHT,
        }
    }
}

impl BottomBarConfig {
    /// A visible bar of the given height.
    #[must_use]
    pub fn visible(height: f64) -> Self {
        Self {
            hidden: false,
            height,
        }
    }
}

/// Engine tunables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetConfig {
    /// Soft overshoot past the anchor range; `false` hard-clamps.
    pub bounces: bool,
    /// Rubber-band coefficient.
    pub bounces_factor: f64,
    /// Settle animation.
    pub animation: AnimationParameters,
    /// Amplitude below which a settle animation is finished.
    pub settle_threshold: f64,
    /// Per-millisecond velocity retention used to project release points.
    pub deceleration_rate: f64,
    /// Tolerance when comparing offsets (one device pixel).
    pub pixel_epsilon: f64,
    /// Tolerance when matching a settled offset to a declared position.
    pub position_epsilon: f64,
    /// Multiplier applied to frame deltas; below one slows animations down.
    pub time_scale: f64,
    /// Content extends under the top safe area.
    pub view_ignores_top_safe_area: bool,
    /// Content extends under the bottom safe area.
    pub view_ignores_bottom_safe_area: bool,
    /// Content extends under the bottom bar.
    pub view_ignores_bottom_bar_height: bool,
    /// Bottom bar.
    pub bottom_bar: BottomBarConfig,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            bounces: true,
            bounces_factor: 0.1,
            animation: AnimationParameters::default(),
            settle_threshold: 0.5,
            deceleration_rate: DECELERATION_RATE_FAST,
            pixel_epsilon: 0.5,
            position_epsilon: 1.0,
            time_scale: 1.0,
            view_ignores_top_safe_area: true,
            view_ignores_bottom_safe_area: false,
            view_ignores_bottom_bar_height: false,
            bottom_bar: BottomBarConfig::default(),
        }
    }
}

impl SheetConfig {
    /// Enable or disable rubber-banding (builder pattern).
    #[must_use]
    pub fn with_bounces(mut self, bounces: bool) -> Self {
        self.bounces = bounces;
        self
    }

    /// Set the rubber-band coefficient (builder pattern).
    #[must_use]
    pub fn with_bounces_factor(mut self, factor: f64) -> Self {
        self.bounces_factor = factor;
        self
    }

    /// Set the settle animation (builder pattern).
    #[must_use]
    pub fn with_animation(mut self, animation: AnimationParameters) -> Self {
        self.animation = animation;
        self
    }

    /// Set the settle threshold (builder pattern).
    #[must_use]
    pub fn with_settle_threshold(mut self, threshold: f64) -> Self {
        self.settle_threshold = threshold;
        self
    }

    /// Set the projection deceleration rate (builder pattern).
    #[must_use]
    pub fn with_deceleration_rate(mut self, rate: f64) -> Self {
        self.deceleration_rate = rate;
        self
    }

    /// Set the offset comparison tolerance (builder pattern).
    #[must_use]
    pub fn with_pixel_epsilon(mut self, eps: f64) -> Self {
        self.pixel_epsilon = eps;
        self
    }

    /// Set the position matching tolerance (builder pattern).
    #[must_use]
    pub fn with_position_epsilon(mut self, eps: f64) -> Self {
        self.position_epsilon = eps;
        self
    }

    /// Set the animation time scale (builder pattern).
    #[must_use]
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale;
        self
    }

    /// Set the bottom bar (builder pattern).
    #[must_use]
    pub fn with_bottom_bar(mut self, bar: BottomBarConfig) -> Self {
        self.bottom_bar = bar;
        self
    }

    /// Set the content safe-area and bar handling (builder pattern).
    #[must_use]
    pub fn with_view_ignores(mut self, top_safe_area: bool, bottom_safe_area: bool, bottom_bar_height: bool) -> Self {
        self.view_ignores_top_safe_area = top_safe_area;
        self.view_ignores_bottom_safe_area = bottom_safe_area;
        self.view_ignores_bottom_bar_height = bottom_bar_height;
        self
    }

    /// Check every field, reporting the first out-of-range value.
    pub fn validate(&self) -> Result<()> {
        if !self.bounces_factor.is_finite() || self.bounces_factor < 0.0 {
            return Err(ConfigError::InvalidBouncesFactor(self.bounces_factor));
        }
        let spring = self.animation.spring_parameters();
        let sane = spring.sanitized();
        for (field, value, min) in [
            ("mass", spring.mass, sane.mass),
            ("stiffness", spring.stiffness, sane.stiffness),
            ("damping_ratio", spring.damping_ratio, sane.damping_ratio),
        ] {
            if !value.is_finite() || value < min {
                return Err(ConfigError::InvalidSpring { field, value });
            }
        }
        if !(0.0..1.0).contains(&self.deceleration_rate) {
            return Err(ConfigError::InvalidDecelerationRate(self.deceleration_rate));
        }
        for (field, value) in [
            ("settle_threshold", self.settle_threshold),
            ("pixel_epsilon", self.pixel_epsilon),
            ("position_epsilon", self.position_epsilon),
        ] {
            if !is_positive(value) {
                return Err(ConfigError::InvalidTolerance { field, value });
            }
        }
        if !is_positive(self.time_scale) {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        if !self.bottom_bar.height.is_finite() || self.bottom_bar.height < 0.0 {
            return Err(ConfigError::InvalidBottomBarHeight(self.bottom_bar.height));
        }
        Ok(())
    }

    /// Copy with every out-of-range field replaced by a usable value.
    ///
    /// Spring parameters and the bar height are clamped; other invalid
    /// values fall back to their defaults.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut out = self.clone();
        if !out.bounces_factor.is_finite() || out.bounces_factor < 0.0 {
            out.bounces_factor = defaults.bounces_factor;
        }
        out.animation = AnimationParameters::Spring(out.animation.spring_parameters().sanitized());
        if !(0.0..1.0).contains(&out.deceleration_rate) {
            out.deceleration_rate = defaults.deceleration_rate;
        }
        if !is_positive(out.settle_threshold) {
            out.settle_threshold = defaults.settle_threshold;
        }
        if !is_positive(out.pixel_epsilon) {
            out.pixel_epsilon = defaults.pixel_epsilon;
        }
        if !is_positive(out.position_epsilon) {
            out.position_epsilon = defaults.position_epsilon;
        }
        if !is_positive(out.time_scale) {
            out.time_scale = defaults.time_scale;
        }
        out.bottom_bar.height = if out.bottom_bar.height.is_finite() {
            out.bottom_bar.height.max(0.0)
        } else {
            0.0
        };

        #[cfg(feature = "tracing")]
        if let Err(err) = self.validate() {
            tracing::warn!(field = err.field(), error = %err, "sheet config sanitised");
        }

        out
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}
