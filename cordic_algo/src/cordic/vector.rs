// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::error::ConfigResult;
use crate::math_integer::fixed_point::{sign_bit, to_unsigned};

use super::engine::{CordicCore, StartOutcome};
use super::{Handshake, Mode, Output};

/// Vector-mode engine returning a full-circle angle code.
///
/// ## Principle of Operation:
/// - The quadrant is read from the input signs: bit0 = sign of `x0`,
///   bit1 = sign of `y0`.
/// - The core drives `y` to zero. With `x0 < 0` it settles on the negative
///   x axis, so its angle is off by exactly half a turn.
/// - When ready, the core angle (radian-like scale, `PI -> 2^A`) is halved
///   into the full-circle code (`2*PI -> 2^A`) and quadrants 1 and 3 get
///   half a turn (`2^(A-1)`) added back.
/// - `x` and `y` pass through: `x` is `K` times the input magnitude.
pub struct VectorExtend {
    core: CordicCore,
    quadrant: u8, // Sign bits of the input vector, latched at start
}

impl VectorExtend {
    /// ### Arguments
    /// * `angle_width` - Width of the full-circle angle code in bits.
    /// * `output_width` - Width of the x / y registers; must leave room for
    ///   the `K` magnitude growth.
    pub fn new(angle_width: u32, output_width: u32) -> ConfigResult<Self> {
        Ok(Self {
            core: CordicCore::new(angle_width, output_width)?,
            quadrant: 0,
        })
    }

    /// Latches the sign quadrant and starts the core on the raw operands.
    pub fn start(&mut self, x0: i64, y0: i64, z0: i64) -> StartOutcome {
        let width = self.core.output_width();
        self.quadrant = Self::sign_quadrant(x0, y0, width);
        self.core.start(x0, y0, z0, Mode::Vector)
    }

    pub fn step(&mut self) {
        self.core.step();
    }

    /// Outputs with `z` unfolded to an unsigned full-circle code; final only
    /// when `ready` is set.
    pub fn read(&self) -> Output {
        let raw = self.core.read();
        let width = self.core.angle_width();
        let half_turn = 1i64 << (width - 1);

        let z = match self.quadrant {
            0 | 2 => raw.z >> 1,
            _ => (raw.z >> 1) + half_turn,
        };

        Output {
            x: raw.x,
            y: raw.y,
            z: to_unsigned(z, width) as i64,
            ready: raw.ready,
        }
    }

    /// Starts the engine and steps it to completion.
    pub fn compute(&mut self, x0: i64, y0: i64) -> Output {
        self.start(x0, y0, 0);
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

    pub fn core(&self) -> &CordicCore {
        &self.core
    }

    #[inline(always)]
    fn sign_quadrant(x0: i64, y0: i64, width: u32) -> u8 {
        (sign_bit(x0, width) as u8) | ((sign_bit(y0, width) as u8) << 1)
    }
}

impl Handshake for VectorExtend {
    type Result = Output;

    fn step(&mut self) {
        VectorExtend::step(self)
    }

    fn is_ready(&self) -> bool {
        VectorExtend::is_ready(self)
    }

    fn result(&self) -> Option<Output> {
        self.is_ready().then(|| self.read())
    }
}
