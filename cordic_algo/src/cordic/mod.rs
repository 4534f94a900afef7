// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

// Shift-add rotation engine and its full-circle wrappers.
//
// Key Features:
// - `CordicCore` runs one micro-rotation per step on a quarter-circle domain
// - `RotateExtend` folds a full-circle angle code onto the core
// - `VectorExtend` unfolds the core's angle back to the full circle
// - Every engine speaks the same start/ready handshake (`Handshake`)
//
// Detailed Operation:
// A caller issues `start` with the initial operands, then advances the
// engine with `step` once per discrete time step. `ready` drops on the
// step that accepts `start` and rises again after exactly `n` steps, where
// `n` is the angle table length. Results stay frozen while `ready` is high
// and no new `start` arrives.

pub mod engine;
pub mod rotate;
pub mod vector;

/// Direction rule used by the micro-rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Rotate `(x, y)` by `z`, driving `z` to zero
    #[default]
    Rotate,
    /// Rotate `(x, y)` onto the x axis, accumulating the angle in `z`
    Vector,
}

/// Register snapshot of an engine.
///
/// Values are final only when `ready` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Output {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub ready: bool,
}

/// Step-driven engine with a start/ready handshake.
pub trait Handshake {
    type Result;

    /// Advances the engine by one discrete time step.
    fn step(&mut self);

    /// `true` while the result is valid and stable.
    fn is_ready(&self) -> bool;

    /// Final result, `None` while the engine is still working.
    fn result(&self) -> Option<Self::Result>;
}

/// Steps `engine` until it reports ready, giving up after `max_steps`.
///
/// ### Returns
/// * `Some((result, steps))` - The result and the number of steps taken.
/// * `None` - The budget ran out before `ready` rose.
pub fn run_until_ready<E: Handshake>(engine: &mut E, max_steps: usize) -> Option<(E::Result, usize)> {
    for steps in 0..=max_steps {
        if let Some(result) = engine.result() {
            return Some((result, steps));
        }
        if steps < max_steps {
            engine.step();
        }
    }
    None
}
