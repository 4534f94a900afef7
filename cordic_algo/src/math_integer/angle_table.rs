// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::error::{ConfigError, ConfigResult};

use super::fixed_point::{check_angle_width, pow2, radian_scale};

/// Upper bound on the number of micro-rotations an engine can run
pub const MAX_ITERATIONS: usize = 64;

/// Sum of `atan(2^-i)` over all i: the widest angle the micro-rotations can
/// cover, in radians.
pub const CONVERGENCE_RANGE: f64 = 1.743_286_620_472_340;

/// How each `atan(2^-i) * scale` step is reduced to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Round to nearest, halves away from zero
    #[default]
    Nearest,
    /// Drop the fraction
    Truncate,
}

/// Immutable table of arctangent steps `a[i] = round(atan(2^-i) * scale)`.
///
/// The table ends right before the first step that rounds to zero, so its
/// length is the engine's iteration count `n`. Steps are strictly positive
/// and non-increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleTable {
    steps: [i64; MAX_ITERATIONS], // Only the first `len` entries are valid
    len: usize,                   // Iteration count
    width: u32,                   // Angle width the table was built for
    scale: f64,                   // Codes per radian
}

impl AngleTable {
    /// Builds the table for the radian-like scale `2^width / PI`.
    ///
    /// ### Arguments
    /// * `width` - Angle register width in bits.
    pub fn new(width: u32) -> ConfigResult<Self> {
        Self::with_scale(width, radian_scale(width), Rounding::Nearest)
    }

    /// Builds the table for an explicit scale (codes per radian).
    ///
    /// ### Arguments
    /// * `width` - Angle register width in bits.
    /// * `scale` - Number of codes representing one radian.
    /// * `rounding` - Reduction of each step to an integer.
    ///
    /// ### Notes
    /// * Fails when the width is out of range, the scale is not a positive
    ///   finite number, the steps would add up past the `width + 1` bit
    ///   angle register, or the very first step already rounds to zero.
    pub fn with_scale(width: u32, scale: f64, rounding: Rounding) -> ConfigResult<Self> {
        check_angle_width(width)?;
        if !scale.is_finite() || scale <= 0.0 {
            error!("ANGLE TABLE: invalid scale for width {}", width);
            return Err(ConfigError::InvalidScale);
        }
        // z carries one guard bit above `width`, so it holds +-2^width
        if CONVERGENCE_RANGE * scale >= pow2(width) {
            error!("ANGLE TABLE: scale too large for width {}", width);
            return Err(ConfigError::ScaleOverflow { width });
        }

        // The scale bound above keeps every table well inside the capacity
        let mut steps = [0i64; MAX_ITERATIONS];
        let mut len = 0;
        while len < MAX_ITERATIONS {
            let step = Self::step(len, scale, rounding);
            if step == 0 {
                break;
            }
            steps[len] = step;
            len += 1;
        }

        if len == 0 {
            error!("ANGLE TABLE: width {} gives zero iterations", width);
            return Err(ConfigError::EmptyTable { width });
        }

        debug!("ANGLE TABLE: width {} -> {} iterations", width, len);
        Ok(Self {
            steps,
            len,
            width,
            scale,
        })
    }

    #[inline(always)]
    fn step(i: usize, scale: f64, rounding: Rounding) -> i64 {
        let exact = libm::atan(libm::ldexp(1.0, -(i as i32))) * scale;
        match rounding {
            Rounding::Nearest => libm::round(exact) as i64,
            Rounding::Truncate => exact as i64,
        }
    }

    /// Iteration count `n`.
    #[inline(always)]
    pub fn iterations(&self) -> usize {
        self.len
    }

    /// Step value for iteration `i` (`i < n`).
    #[inline(always)]
    pub fn get(&self, i: usize) -> i64 {
        self.steps[i]
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.steps[..self.len]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Smallest step in the table: the residual angle left after `n`
    /// iterations never exceeds it (in table codes).
    pub fn resolution(&self) -> i64 {
        self.steps[self.len - 1]
    }

    /// `resolution()` expressed in radians.
    pub fn resolution_radians(&self) -> f64 {
        self.resolution() as f64 / self.scale
    }
}
