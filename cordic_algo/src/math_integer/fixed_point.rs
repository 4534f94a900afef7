// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

// Fixed-point convention shared by every engine in the crate.
//
// Key Features:
// - Values are plain two's-complement integers of a configurable width `W`
// - The real value is `raw / scale`; the scale is chosen per use, not stored
// - Two scales are common: `2^(W-2)` (about +-2.0) and `2^W / PI` (radians)
// - Floating point only appears here, at the boundary, never in the core loop

use core::f64::consts::PI;

use crate::error::{ConfigError, ConfigResult};

/// Magnitude gain introduced by the full sequence of micro-rotations
pub const CORDIC_GAIN: f64 = 1.646760258121;

pub const MIN_ANGLE_WIDTH: u32 = 3; // 2 quadrant bits + at least 1 residue bit
pub const MAX_ANGLE_WIDTH: u32 = 48;
pub const MIN_OUTPUT_WIDTH: u32 = 4;
pub const MAX_OUTPUT_WIDTH: u32 = 48;

/// Reduces `value` to a signed `width`-bit register, discarding the upper bits.
///
/// ### Arguments
/// * `value` - Any integer, typically the result of an add/sub/shift.
/// * `width` - Register width in bits (1..=64).
///
/// ### Returns
/// * The sign-extended low `width` bits of `value`.
#[inline(always)]
pub const fn wrap(value: i64, width: u32) -> i64 {
    let shift = 64 - width;
    (value << shift) >> shift
}

/// Bit mask covering the low `width` bits.
#[inline(always)]
pub const fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Reinterprets a signed register as an unsigned `width`-bit code.
#[inline(always)]
pub const fn to_unsigned(value: i64, width: u32) -> u64 {
    (value as u64) & mask(width)
}

/// Sign bit of a `width`-bit register.
#[inline(always)]
pub const fn sign_bit(value: i64, width: u32) -> bool {
    ((value as u64) >> (width - 1)) & 1 == 1
}

/// Top 2 bits of an unsigned full-circle angle code of `width` bits.
///
/// ### Notes
/// * Codes `0..2^(width-2)` are quadrant 0, the quadrant changes exactly at
///   every multiple of `2^(width-2)`.
#[inline(always)]
pub const fn quadrant(code: u64, width: u32) -> u8 {
    ((code >> (width - 2)) & 0b11) as u8
}

/// `2^width` as a float; defined for any width, so it is safe to call
/// before the width has been validated.
#[inline(always)]
pub fn pow2(width: u32) -> f64 {
    libm::ldexp(1.0, width.min(i32::MAX as u32) as i32)
}

/// Radian-like scale: `PI` radians map to `2^width`.
pub fn radian_scale(width: u32) -> f64 {
    pow2(width) / PI
}

/// Unit scale: `1.0` maps to `2^(width-2)`, giving a nominal range of +-2.0.
pub fn unit_scale(width: u32) -> f64 {
    pow2(width - 2)
}

/// Converts a real number to the nearest fixed-point code in `scale`.
pub fn from_real(value: f64, scale: f64) -> i64 {
    libm::round(value * scale) as i64
}

/// Converts a fixed-point code back to a real number.
pub fn to_real(value: i64, scale: f64) -> f64 {
    value as f64 / scale
}

/// Pre-scales a magnitude by `1/K` so a full run of micro-rotations
/// returns it at unit gain.
pub fn gain_compensated(magnitude: f64) -> f64 {
    magnitude / CORDIC_GAIN
}

pub(crate) fn check_angle_width(width: u32) -> ConfigResult<()> {
    if !(MIN_ANGLE_WIDTH..=MAX_ANGLE_WIDTH).contains(&width) {
        error!("FIXED: angle width {} rejected", width);
        return Err(ConfigError::AngleWidth {
            width,
            min: MIN_ANGLE_WIDTH,
            max: MAX_ANGLE_WIDTH,
        });
    }
    Ok(())
}

pub(crate) fn check_output_width(width: u32) -> ConfigResult<()> {
    if !(MIN_OUTPUT_WIDTH..=MAX_OUTPUT_WIDTH).contains(&width) {
        error!("FIXED: output width {} rejected", width);
        return Err(ConfigError::OutputWidth {
            width,
            min: MIN_OUTPUT_WIDTH,
            max: MAX_OUTPUT_WIDTH,
        });
    }
    Ok(())
}
