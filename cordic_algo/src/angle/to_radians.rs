// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::f64::consts::FRAC_PI_2;

use crate::error::ConfigResult;
use crate::math_integer::fixed_point::{
    check_angle_width, check_output_width, from_real, mask, quadrant, unit_scale,
};

/// Registered converter from an unsigned full-circle angle code to a
/// quadrant tag plus the in-quadrant angle in radians.
///
/// ### Notes
/// * `radians` uses the unit convention of the output width:
///   `1.0 rad -> 2^(out_width-2)`, so it never exceeds `PI/2 * 2^(out_width-2)`.
/// * Outputs are registers: the angle presented to `tick` becomes visible
///   through `radians()` / `quadrant()` one step later.
pub struct ToRadians {
    in_width: u32,
    out_width: u32,
    quarter_turn: i64, // round(PI/2 * scale(out_width))

    quadrant: u8,
    radians: i64,
}

impl ToRadians {
    /// ### Arguments
    /// * `in_width` - Width of the full-circle input code (top 2 bits are the quadrant).
    /// * `out_width` - Width of the radian output register.
    pub fn new(in_width: u32, out_width: u32) -> ConfigResult<Self> {
        check_angle_width(in_width)?;
        check_output_width(out_width)?;
        Ok(Self {
            in_width,
            out_width,
            quarter_turn: from_real(FRAC_PI_2, unit_scale(out_width)),
            quadrant: 0,
            radians: 0,
        })
    }

    /// Residue of the angle inside its quadrant, re-aligned to `out_width` bits.
    #[inline(always)]
    pub fn theta(&self, angle: u64) -> u64 {
        let residue = angle & mask(self.in_width - 2);
        let shift = (self.in_width - 2) as i32 - self.out_width as i32;
        if shift >= 0 {
            residue >> shift
        } else {
            residue << -shift
        }
    }

    /// Registers a new input angle; results appear on the next step.
    pub fn tick(&mut self, angle: u64) {
        let angle = angle & mask(self.in_width);
        let theta = self.theta(angle) as i128;

        self.quadrant = quadrant(angle, self.in_width);
        self.radians = ((theta * self.quarter_turn as i128) >> self.out_width) as i64;
    }

    /// Quadrant of the angle registered by the previous `tick`.
    #[inline(always)]
    pub fn quadrant(&self) -> u8 {
        self.quadrant
    }

    /// In-quadrant angle registered by the previous `tick`.
    #[inline(always)]
    pub fn radians(&self) -> i64 {
        self.radians
    }

    pub fn in_width(&self) -> u32 {
        self.in_width
    }

    pub fn out_width(&self) -> u32 {
        self.out_width
    }
}
