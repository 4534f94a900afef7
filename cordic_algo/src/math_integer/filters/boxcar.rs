// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::cordic::Handshake;
use crate::error::{ConfigError, ConfigResult};
use crate::math_integer::delay_line::DelayLine;
use crate::math_integer::fixed_point::{check_output_width, wrap};

/// Pipeline position of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Output valid, waiting for a sample
    Idle,
    /// New sample added, oldest one fetched from the window
    Retire,
    /// Sum settled, mean about to be published
    Publish,
}

/// Moving average over the last `N` samples (`N` a power of two) with the
/// same start/ready handshake as the rotation engines.
///
/// A sample takes three steps: the accepting start adds it to the running
/// sum, the next step retires the oldest sample, the last publishes
/// `sum >> log2(N)`. Unlike the rotation engines a start while busy is
/// refused.
pub struct Boxcar<const N: usize> {
    window: DelayLine<i64, N>, // Last N samples, oldest first out
    width: u32,                // Sample register width
    shift: u32,                // log2(N)

    sum: i64,    // Running sum of the window
    sample: i64, // Sample being absorbed
    oldest: i64, // Sample leaving the window
    output: i64, // Published mean

    stage: Stage,
}

impl<const N: usize> Boxcar<N> {
    /// ### Arguments
    /// * `width` - Width of the signed sample register in bits.
    pub fn new(width: u32) -> ConfigResult<Self> {
        if !N.is_power_of_two() {
            error!("BOXCAR: window {} rejected", N);
            return Err(ConfigError::WindowLength(N));
        }
        check_output_width(width)?;
        Ok(Self {
            window: DelayLine::new(),
            width,
            shift: N.trailing_zeros(),
            sum: 0,
            sample: 0,
            oldest: 0,
            output: 0,
            stage: Stage::Idle,
        })
    }

    /// Accepts a new sample when idle.
    ///
    /// ### Returns
    /// * `false` if the filter is still busy with the previous sample.
    pub fn start(&mut self, sample: i64) -> bool {
        if self.stage != Stage::Idle {
            return false;
        }
        self.sample = wrap(sample, self.width);
        self.sum += self.sample;
        self.oldest = self.window.oldest();
        self.stage = Stage::Retire;
        true
    }

    pub fn step(&mut self) {
        match self.stage {
            Stage::Idle => {}
            Stage::Retire => {
                self.sum -= self.oldest;
                self.window.push(self.sample);
                self.stage = Stage::Publish;
            }
            Stage::Publish => {
                self.output = self.sum >> self.shift;
                self.stage = Stage::Idle;
            }
        }
    }

    #[inline(always)]
    pub fn is_ready(&self) -> bool {
        self.stage == Stage::Idle
    }

    /// Last published mean.
    pub fn output(&self) -> i64 {
        self.output
    }

    /// Pushes one sample through and returns the new mean.
    pub fn tick(&mut self, sample: i64) -> i64 {
        while !self.is_ready() {
            self.step();
        }
        self.start(sample);
        while !self.is_ready() {
            self.step();
        }
        self.output
    }
}

impl<const N: usize> Handshake for Boxcar<N> {
    type Result = i64;

    fn step(&mut self) {
        Boxcar::step(self)
    }

    fn is_ready(&self) -> bool {
        Boxcar::is_ready(self)
    }

    fn result(&self) -> Option<i64> {
        self.is_ready().then_some(self.output)
    }
}
