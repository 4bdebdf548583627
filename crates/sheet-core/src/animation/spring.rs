#![forbid(unsafe_code)]

//! Closed-form damped harmonic oscillator.
//!
//! The sheet settles with the analytic solution of
//!
//!   m·x'' + c·x' + k·x = 0
//!
//! rather than numeric integration, so the offset at any time `t` is exact
//! regardless of frame pacing and the settle time is known up front.
//!
//! # Parameters
//!
//! - **mass** (m): inertia. Clamped to a small positive minimum.
//! - **stiffness** (k): restoring force. Clamped to minimum 0.1.
//! - **damping_ratio** (ζ): `c / (2·√(m·k))`.
//!   - ζ < 1: underdamped, overshoots and oscillates.
//!   - ζ = 1: critically damped, fastest approach without overshoot.
//!   - ζ > 1: overdamped, slow approach without overshoot.
//!
//! Derived quantities: `c = 2ζ√(mk)`, `β = c / 2m`, `ω₀ = √(k/m)` and for the
//! underdamped case `ω_d = ω₀·√(1 − ζ²)`.
//!
//! # Invariants
//!
//! 1. `value(0) == displacement` and `velocity(0) == initial_velocity`.
//! 2. `amplitude(t)` bounds `|value(t)|` and tends to zero.
//! 3. `duration()` is `0` when displacement and velocity are both zero,
//!    and `amplitude(duration()) <= threshold` otherwise (up to rounding).
//!
//! # Failure Modes
//!
//! - Zero damping would oscillate forever; the ratio is clamped to a small
//!   positive minimum so every spring eventually settles.
//! - A damping ratio within `1e-6` of one is treated as critical to avoid
//!   dividing by a vanishing `ω_d`.

/// Minimum mass to prevent degenerate springs.
const MIN_MASS: f64 = 1e-3;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Minimum damping ratio so the oscillation always decays.
const MIN_DAMPING_RATIO: f64 = 0.01;

/// Damping ratios this close to one use the critical solution.
const CRITICAL_TOLERANCE: f64 = 1e-6;

/// Physical parameters of the settle spring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringParameters {
    /// Mass.
    pub mass: f64,
    /// Stiffness.
    pub stiffness: f64,
    /// Damping ratio (ζ).
    pub damping_ratio: f64,
}

impl Default for SpringParameters {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 250.0,
            damping_ratio: 0.8,
        }
    }
}

impl SpringParameters {
    /// Create parameters, clamping each value to its minimum.
    #[must_use]
    pub fn new(mass: f64, stiffness: f64, damping_ratio: f64) -> Self {
        Self {
            mass,
            stiffness,
            damping_ratio,
        }
        .sanitized()
    }

    /// Set mass (builder pattern). Clamped to a small positive minimum.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = clamp_min(mass, MIN_MASS);
        self
    }

    /// Set stiffness (builder pattern). Clamped to minimum 0.1.
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = clamp_min(k, MIN_STIFFNESS);
        self
    }

    /// Set damping ratio (builder pattern). Clamped to minimum 0.01.
    #[must_use]
    pub fn with_damping_ratio(mut self, zeta: f64) -> Self {
        self.damping_ratio = clamp_min(zeta, MIN_DAMPING_RATIO);
        self
    }

    /// Copy with every field clamped into its valid range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            mass: clamp_min(self.mass, MIN_MASS),
            stiffness: clamp_min(self.stiffness, MIN_STIFFNESS),
            damping_ratio: clamp_min(self.damping_ratio, MIN_DAMPING_RATIO),
        }
    }

    /// Whether every field is finite and inside its valid range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.mass.is_finite()
            && self.mass >= MIN_MASS
            && self.stiffness.is_finite()
            && self.stiffness >= MIN_STIFFNESS
            && self.damping_ratio.is_finite()
            && self.damping_ratio >= MIN_DAMPING_RATIO
    }

    /// Viscous damping coefficient `c = 2ζ√(mk)`.
    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        2.0 * self.damping_ratio * (self.mass * self.stiffness).sqrt()
    }

    /// Decay rate `β = c / 2m`.
    #[inline]
    #[must_use]
    pub fn beta(&self) -> f64 {
        self.damping() / (2.0 * self.mass)
    }

    /// Undamped angular frequency `ω₀ = √(k/m)`.
    #[inline]
    #[must_use]
    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Which closed-form solution applies.
    #[must_use]
    pub fn regime(&self) -> SpringRegime {
        if (self.damping_ratio - 1.0).abs() <= CRITICAL_TOLERANCE {
            SpringRegime::CriticallyDamped
        } else if self.damping_ratio < 1.0 {
            SpringRegime::Underdamped
        } else {
            SpringRegime::Overdamped
        }
    }
}

fn clamp_min(v: f64, min: f64) -> f64 {
    if v.is_finite() { v.max(min) } else { min }
}

/// Damping regime of a spring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpringRegime {
    /// ζ < 1.
    Underdamped,
    /// ζ = 1.
    CriticallyDamped,
    /// ζ > 1.
    Overdamped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Solution {
    Under { omega_d: f64, c1: f64, c2: f64 },
    Critical { c1: f64, c2: f64 },
    Over { r1: f64, r2: f64, c1: f64, c2: f64 },
}

/// Motion of one spring from a given initial condition.
///
/// `value(t)` is the displacement from the target at `t` seconds; callers
/// add it to the target to get an offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringTiming {
    parameters: SpringParameters,
    displacement: f64,
    initial_velocity: f64,
    threshold: f64,
    beta: f64,
    solution: Solution,
    duration: f64,
}

impl SpringTiming {
    /// Solve for `displacement` (origin minus target) and `initial_velocity`
    /// in units per second. `threshold` is the settle amplitude.
    #[must_use]
    pub fn new(
        parameters: SpringParameters,
        displacement: f64,
        initial_velocity: f64,
        threshold: f64,
    ) -> Self {
        let parameters = parameters.sanitized();
        let threshold = threshold.abs();
        let beta = parameters.beta();
        let omega0 = parameters.natural_frequency();
        let x0 = displacement;
        let v0 = initial_velocity;

        let solution = match parameters.regime() {
            SpringRegime::Underdamped => {
                let zeta = parameters.damping_ratio;
                let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
                Solution::Under {
                    omega_d,
                    c1: x0,
                    c2: (v0 + beta * x0) / omega_d,
                }
            }
            SpringRegime::CriticallyDamped => Solution::Critical {
                c1: x0,
                c2: v0 + beta * x0,
            },
            SpringRegime::Overdamped => {
                let root = (beta * beta - omega0 * omega0).sqrt();
                let r1 = -beta + root;
                let r2 = -beta - root;
                let c2 = (v0 - r1 * x0) / (r2 - r1);
                Solution::Over {
                    r1,
                    r2,
                    c1: x0 - c2,
                    c2,
                }
            }
        };

        let duration = if x0 == 0.0 && v0 == 0.0 {
            0.0
        } else {
            settle_time(solution, beta, threshold)
        };

        Self {
            parameters,
            displacement,
            initial_velocity,
            threshold,
            beta,
            solution,
            duration,
        }
    }

    /// Parameters the motion was solved with (after clamping).
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> SpringParameters {
        self.parameters
    }

    /// Initial displacement from the target.
    #[inline]
    #[must_use]
    pub fn displacement(&self) -> f64 {
        self.displacement
    }

    /// Initial velocity in units per second.
    #[inline]
    #[must_use]
    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    /// Settle amplitude.
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Damping regime.
    #[must_use]
    pub fn regime(&self) -> SpringRegime {
        match self.solution {
            Solution::Under { .. } => SpringRegime::Underdamped,
            Solution::Critical { .. } => SpringRegime::CriticallyDamped,
            Solution::Over { .. } => SpringRegime::Overdamped,
        }
    }

    /// Seconds until the amplitude drops below the threshold.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Displacement from the target at `t` seconds.
    #[must_use]
    pub fn value(&self, t: f64) -> f64 {
        let beta = self.beta;
        match self.solution {
            Solution::Under { omega_d, c1, c2 } => {
                (-beta * t).exp() * (c1 * (omega_d * t).cos() + c2 * (omega_d * t).sin())
            }
            Solution::Critical { c1, c2 } => (-beta * t).exp() * (c1 + c2 * t),
            Solution::Over { r1, r2, c1, c2 } => c1 * (r1 * t).exp() + c2 * (r2 * t).exp(),
        }
    }

    /// Velocity at `t` seconds, in units per second.
    #[must_use]
    pub fn velocity(&self, t: f64) -> f64 {
        let beta = self.beta;
        match self.solution {
            Solution::Under { omega_d, c1, c2 } => {
                let (sin, cos) = (omega_d * t).sin_cos();
                (-beta * t).exp()
                    * ((omega_d * c2 - beta * c1) * cos - (beta * c2 + omega_d * c1) * sin)
            }
            Solution::Critical { c1, c2 } => (-beta * t).exp() * (c2 - beta * (c1 + c2 * t)),
            Solution::Over { r1, r2, c1, c2 } => {
                c1 * r1 * (r1 * t).exp() + c2 * r2 * (r2 * t).exp()
            }
        }
    }

    /// Envelope of the oscillation at `t` seconds.
    #[must_use]
    pub fn amplitude(&self, t: f64) -> f64 {
        let beta = self.beta;
        match self.solution {
            Solution::Under { c1, c2, .. } => (-beta * t).exp() * c1.hypot(c2),
            Solution::Critical { c1, c2 } => (-beta * t).exp() * (c1.abs() + c2.abs() * t),
            Solution::Over { r1, r2, c1, c2 } => {
                c1.abs() * (r1 * t).exp() + c2.abs() * (r2 * t).exp()
            }
        }
    }
}

fn settle_time(solution: Solution, beta: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return f64::INFINITY;
    }
    let t = match solution {
        Solution::Under { c1, c2, .. } => (c1.hypot(c2) / threshold).ln() / beta,
        Solution::Critical { c1, c2 } => {
            let t1 = (2.0 * c1.abs() / threshold).ln() / beta;
            let t2 = 2.0 / beta * (4.0 * c2.abs() / (std::f64::consts::E * beta * threshold)).ln();
            t1.max(t2)
        }
        Solution::Over { r1, c1, c2, .. } => ((c1.abs() + c2.abs()) / threshold).ln() / -r1,
    };
    if t.is_nan() { 0.0 } else { t.max(0.0) }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
