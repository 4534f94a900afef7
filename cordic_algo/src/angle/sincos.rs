// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

// Sine / cosine generator: angle converter feeding a rotate-mode engine.
//
// Key Features:
// - Accepts an unsigned full-circle angle code of any supported width
// - Rotates a gain-compensated unit vector by the in-quadrant angle
// - Restores the full circle with a quadrant-keyed swap/negate
// - Adds a configurable vertical offset for unsigned DAC ranges
//
// Detailed Operation:
// The converter registers its result, so the angle presented together with
// the start pulse is only available to the engine one step later. The start
// pulse is therefore sent through a depth-1 delay line and reaches the
// engine on the same step as the matching `radians` / `quadrant` pair.
// Skipping the delay would start the engine on the previous angle.

use crate::cordic::engine::CordicCore;
use crate::cordic::{Handshake, Mode};
use crate::error::{ConfigError, ConfigResult};
use crate::math_integer::angle_table::{AngleTable, Rounding};
use crate::math_integer::delay_line::DelayLine;
use crate::math_integer::fixed_point::{from_real, unit_scale, CORDIC_GAIN};

use super::to_radians::ToRadians;

/// Construction parameters of `SinCos`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinCosConfig {
    pub in_width: u32,  // Width of the full-circle angle code
    pub out_width: u32, // Width of the sine / cosine registers
    pub offset: i64,    // Bias added to both outputs
    pub amplitude: f64, // Peak as a fraction of 2^(out_width-1), in (0, 1)
    pub rounding: Rounding, // How the arctangent table is quantized
}

impl Default for SinCosConfig {
    fn default() -> Self {
        Self {
            in_width: 12,
            out_width: 12,
            offset: 0,
            amplitude: 0.99,
            rounding: Rounding::Nearest,
        }
    }
}

/// Result registers of `SinCos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinCosOutput {
    pub sin: i64,
    pub cos: i64,
    pub ready: bool,
}

pub struct SinCos {
    converter: ToRadians,
    core: CordicCore,
    start_delay: DelayLine<bool, 1>, // Re-aligns start with the registered angle

    angle_in: u64,  // Held angle input
    start_in: bool, // Start pulse for the next step
    quadrant: u8,   // Converter quadrant, latched when the engine starts

    x0: i64,     // round(amplitude * (2/K) * 2^(out_width-2))
    offset: i64, // Vertical offset
}

impl SinCos {
    pub fn new(config: SinCosConfig) -> ConfigResult<Self> {
        if !(config.amplitude > 0.0 && config.amplitude < 1.0) {
            error!("SINCOS: amplitude rejected");
            return Err(ConfigError::Amplitude(config.amplitude));
        }

        let converter = ToRadians::new(config.in_width, config.out_width)?;

        // Table in the converter's radian convention so `radians` feeds z directly
        let scale = unit_scale(config.out_width);
        let table = AngleTable::with_scale(config.out_width, scale, config.rounding)?;
        let core = CordicCore::with_table(table, config.out_width)?;

        let x0 = from_real(config.amplitude * 2.0 / CORDIC_GAIN, scale);
        info!(
            "SINCOS: {} bit angle -> {} bit output, {} iterations",
            config.in_width,
            config.out_width,
            core.iterations()
        );

        Ok(Self {
            converter,
            core,
            start_delay: DelayLine::new(),
            angle_in: 0,
            start_in: false,
            quadrant: 0,
            x0,
            offset: config.offset,
        })
    }

    /// Presents `angle` and raises the start pulse for the next step.
    pub fn start(&mut self, angle: u64) {
        self.angle_in = angle;
        self.start_in = true;
    }

    /// Changes the held angle input without starting.
    pub fn set_angle(&mut self, angle: u64) {
        self.angle_in = angle;
    }

    /// One discrete time step with explicit inputs.
    pub fn tick(&mut self, angle: u64, start: bool) {
        self.angle_in = angle;
        self.start_in = start;
        self.step();
    }

    /// One discrete time step on the held inputs; consumes the start pulse.
    pub fn step(&mut self) {
        let start = core::mem::take(&mut self.start_in);

        // All registers update from their pre-step values
        if self.start_delay.push(start) {
            self.quadrant = self.converter.quadrant();
            self.core.start(self.x0, 0, self.converter.radians(), Mode::Rotate);
        } else {
            self.core.step();
        }
        self.converter.tick(self.angle_in);
    }

    /// Ready once the engine finished and no start is still in the pipeline.
    pub fn is_ready(&self) -> bool {
        self.core.is_ready() && !self.start_in && !self.start_delay.oldest()
    }

    pub fn read(&self) -> SinCosOutput {
        let raw = self.core.read();
        let (x, y) = (raw.x, raw.y);

        // Rotate the in-quadrant result by whole quarter turns
        let (cos, sin) = match self.quadrant {
            0 => (x, y),
            1 => (-y, x),
            2 => (-x, -y),
            _ => (y, -x),
        };

        SinCosOutput {
            sin: self.offset + sin,
            cos: self.offset + cos,
            ready: self.is_ready(),
        }
    }

    /// Runs one angle through the pipeline and returns `(sin, cos)`.
    pub fn compute(&mut self, angle: u64) -> (i64, i64) {
        self.start(angle);
        self.step();
        while !self.is_ready() {
            self.step();
        }
        let out = self.read();
        (out.sin, out.cos)
    }

    /// Steps from start pulse to ready: converter register, engine load,
    /// then one per iteration.
    pub fn latency(&self) -> usize {
        self.core.iterations() + 2
    }

    /// Unbiased peak output.
    pub fn peak(&self) -> i64 {
        (self.x0 as f64 * CORDIC_GAIN) as i64
    }
}

impl Handshake for SinCos {
    type Result = SinCosOutput;

    fn step(&mut self) {
        SinCos::step(self)
    }

    fn is_ready(&self) -> bool {
        SinCos::is_ready(self)
    }

    fn result(&self) -> Option<SinCosOutput> {
        self.is_ready().then(|| self.read())
    }
}
