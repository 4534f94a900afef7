// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::error::ConfigResult;
use crate::math_integer::angle_table::AngleTable;
use crate::math_integer::fixed_point::{mask, quadrant, wrap};

use super::engine::{CordicCore, StartOutcome};
use super::{Handshake, Mode, Output};

/// Sign applied to the core result for each quadrant of the input angle.
///
/// Shifting the angle code left by one folds it modulo PI into
/// `[-PI/2, PI/2)`; quadrants 1 and 2 land half a turn away from the
/// requested angle, so their result is negated.
#[inline(always)]
const fn fold_sign(quadrant: u8) -> i64 {
    match quadrant {
        0 | 3 => 1,
        _ => -1,
    }
}

/// Rotate-mode engine accepting a full-circle angle code.
///
/// The angle code is unsigned, `angle_width` bits wide, with `2^angle_width`
/// mapping to a full turn. Results are offset by a caller supplied bias,
/// typically half of an unsigned DAC range.
pub struct RotateExtend {
    core: CordicCore,
    offset: i64,  // Bias added to both outputs
    quadrant: u8, // Top 2 bits of the angle, latched at start
}

impl RotateExtend {
    /// ### Arguments
    /// * `angle_width` - Width of the full-circle angle code in bits.
    /// * `output_width` - Width of the x / y registers in bits.
    /// * `offset` - Bias added to both outputs once ready.
    pub fn new(angle_width: u32, output_width: u32, offset: i64) -> ConfigResult<Self> {
        Ok(Self {
            core: CordicCore::new(angle_width, output_width)?,
            offset,
            quadrant: 0,
        })
    }

    /// Same as `new`, around an already built radian-scale table.
    pub fn with_table(table: AngleTable, output_width: u32, offset: i64) -> ConfigResult<Self> {
        Ok(Self {
            core: CordicCore::with_table(table, output_width)?,
            offset,
            quadrant: 0,
        })
    }

    /// Latches the quadrant and starts the core on the folded angle.
    ///
    /// ### Arguments
    /// * `x0`, `y0` - Initial vector, pre-scaled by `1/K` for unit gain.
    /// * `angle` - Full-circle angle code; bits above `angle_width` are ignored.
    pub fn start(&mut self, x0: i64, y0: i64, angle: u64) -> StartOutcome {
        let width = self.core.angle_width();
        let angle = angle & mask(width);
        self.quadrant = quadrant(angle, width);

        // Drop the top bit: the core only needs the residue modulo PI
        let folded = wrap((angle << 1) as i64, width);
        self.core.start(x0, y0, folded, Mode::Rotate)
    }

    pub fn step(&mut self) {
        self.core.step();
    }

    /// Corrected outputs; final only when `ready` is set.
    ///
    /// `z` is the core's residual angle, passed through unchanged.
    pub fn read(&self) -> Output {
        let raw = self.core.read();
        let sign = fold_sign(self.quadrant);
        Output {
            x: self.offset + sign * raw.x,
            y: self.offset + sign * raw.y,
            z: raw.z,
            ready: raw.ready,
        }
    }

    /// Starts the engine and steps it to completion.
    pub fn compute(&mut self, x0: i64, y0: i64, angle: u64) -> Output {
        self.start(x0, y0, angle);
        while !self.core.is_ready() {
            self.core.step();
        }
        self.read()
    }

    pub fn is_ready(&self) -> bool {
        self.core.is_ready()
    }

    /// Quadrant latched by the last start.
    pub fn quadrant(&self) -> u8 {
        self.quadrant
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn core(&self) -> &CordicCore {
        &self.core
    }
}

impl Handshake for RotateExtend {
    type Result = Output;

    fn step(&mut self) {
        RotateExtend::step(self)
    }

    fn is_ready(&self) -> bool {
        RotateExtend::is_ready(self)
    }

    fn result(&self) -> Option<Output> {
        self.is_ready().then(|| self.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_integer::fixed_point::CORDIC_GAIN;

    const A: u32 = 12;
    const O: u32 = 12;

    fn unit_x0() -> i64 {
        (0.99 * (1u64 << O) as f64 / (2.0 * CORDIC_GAIN)) as i64
    }

    #[test]
    fn sign_table_covers_all_quadrants() {
        assert_eq!([0, 1, 2, 3].map(fold_sign), [1, -1, -1, 1]);
    }

    #[test]
    fn quadrant_latches_top_bits() {
        let mut rot = RotateExtend::new(A, O, 0).unwrap();
        let quarter = 1u64 << (A - 2);
        for (angle, q) in [(0, 0), (quarter - 1, 0), (quarter, 1), (2 * quarter, 2), (4 * quarter - 1, 3)] {
            rot.start(unit_x0(), 0, angle);
            assert_eq!(rot.quadrant(), q, "angle {angle}");
        }
    }

    #[test]
    fn cardinal_angles_land_on_axes() {
        let mut rot = RotateExtend::new(A, O, 0).unwrap();
        let r = (unit_x0() as f64 * CORDIC_GAIN) as i64;
        let quarter = 1u64 << (A - 2);
        let expected = [(r, 0), (0, r), (-r, 0), (0, -r)];
        for (k, (ex, ey)) in expected.into_iter().enumerate() {
            let out = rot.compute(unit_x0(), 0, k as u64 * quarter);
            assert!(out.ready);
            assert!((out.x - ex).abs() <= 8, "quadrant {k}: x = {}", out.x);
            assert!((out.y - ey).abs() <= 8, "quadrant {k}: y = {}", out.y);
        }
    }

    #[test]
    fn offset_biases_both_outputs() {
        let bias = 1 << (O - 1);
        let mut plain = RotateExtend::new(A, O, 0).unwrap();
        let mut biased = RotateExtend::new(A, O, bias).unwrap();
        for angle in [0u64, 700, 1500, 2600, 3900] {
            let a = plain.compute(unit_x0(), 0, angle);
            let b = biased.compute(unit_x0(), 0, angle);
            assert_eq!((b.x - bias, b.y - bias, b.z), (a.x, a.y, a.z));
        }
    }

    #[test]
    fn angle_bits_above_width_are_ignored() {
        let mut rot = RotateExtend::new(A, O, 0).unwrap();
        let a = rot.compute(unit_x0(), 0, 1234);
        let b = rot.compute(unit_x0(), 0, 1234 | (1 << A));
        assert_eq!(a, b);
    }

    #[test]
    fn handshake_takes_table_length_steps() {
        let mut rot = RotateExtend::new(A, O, 0).unwrap();
        rot.start(unit_x0(), 0, 100);
        let (_, steps) = crate::cordic::run_until_ready(&mut rot, 64).unwrap();
        assert_eq!(steps, rot.core().iterations());
    }

    #[test]
    fn truncated_table_stays_on_the_circle() {
        use crate::math_integer::angle_table::Rounding;
        use crate::math_integer::fixed_point::radian_scale;

        let table = AngleTable::with_scale(A, radian_scale(A), Rounding::Truncate).unwrap();
        let mut rot = RotateExtend::with_table(table, O, 0).unwrap();
        let mut nearest = RotateExtend::new(A, O, 0).unwrap();
        for angle in [0u64, 512, 1024, 2222, 3333] {
            let a = rot.compute(unit_x0(), 0, angle);
            let b = nearest.compute(unit_x0(), 0, angle);
            assert!((a.x - b.x).abs() <= 16 && (a.y - b.y).abs() <= 16, "angle {angle}");
        }
    }
}
