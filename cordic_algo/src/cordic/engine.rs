// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::error::ConfigResult;
use crate::math_integer::angle_table::AngleTable;
use crate::math_integer::fixed_point::{check_output_width, sign_bit, wrap};

use super::{Handshake, Mode, Output};

/// Lifecycle of one engine: `Idle -> Running(i) -> Ready`.
///
/// `start` moves any state straight to `Running(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing started since construction
    Idle,
    /// Busy, holding the index of the next micro-rotation
    Running(usize),
    /// Result valid and frozen until the next start
    Ready,
}

/// What an accepted `start` did to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Engine was idle or ready
    Accepted,
    /// Engine was busy: the partial computation at `discarded_at` was thrown
    /// away and the new operands took over. Callers that need determinism
    /// must wait for `ready` before starting again.
    Restarted { discarded_at: usize },
}

/// Iterative shift-add rotation engine.
///
/// ## Principle of Operation:
/// - Each step performs one micro-rotation by `+-atan(2^-i)`, using only a
///   shift by the current iteration index, an add and a subtract.
/// - Rotate mode picks the direction from the sign of `z`, steering `z` to
///   zero while `(x, y)` turns by the angle that `z` started with.
/// - Vector mode picks the direction from the signs of `x` and `y`,
///   steering `y` to zero while `z` accumulates the angle of the vector.
/// - Either way the magnitude grows by `CORDIC_GAIN`; callers pre-scale by
///   `1/K` for unit gain.
///
/// The core only converges for angles within about +-99 degrees; the
/// quadrant wrappers fold anything wider before it gets here.
///
/// Registers: `x`, `y` wrap at the output width; `z` wraps at the angle
/// width plus one guard bit, so a vector-mode accumulation of +-PI/2 does
/// not overflow.
pub struct CordicCore {
    table: AngleTable, // Arctangent steps, fixed at construction
    output_width: u32, // Width of the x / y registers
    mode: Mode,        // Direction rule latched at start

    x: i64,
    y: i64,
    z: i64,

    state: EngineState,
}

impl CordicCore {
    /// Creates an engine with a radian-like table (`2^angle_width / PI`).
    ///
    /// ### Arguments
    /// * `angle_width` - Width of the angle register in bits.
    /// * `output_width` - Width of the x / y registers in bits.
    pub fn new(angle_width: u32, output_width: u32) -> ConfigResult<Self> {
        Self::with_table(AngleTable::new(angle_width)?, output_width)
    }

    /// Creates an engine around an already built table.
    pub fn with_table(table: AngleTable, output_width: u32) -> ConfigResult<Self> {
        check_output_width(output_width)?;
        Ok(Self {
            table,
            output_width,
            mode: Mode::Rotate,
            x: 0,
            y: 0,
            z: 0,
            state: EngineState::Idle,
        })
    }

    /// Loads the operands and restarts the iteration counter.
    ///
    /// Never refused: a start while busy silently replaces the work in
    /// flight, reported as `StartOutcome::Restarted`.
    pub fn start(&mut self, x0: i64, y0: i64, z0: i64, mode: Mode) -> StartOutcome {
        let outcome = match self.state {
            EngineState::Running(i) => {
                warn!("CORDIC: start while busy at iteration {}, partial result discarded", i);
                StartOutcome::Restarted { discarded_at: i }
            }
            EngineState::Idle | EngineState::Ready => {
                debug!("CORDIC: start, ready in {} steps", self.table.iterations());
                StartOutcome::Accepted
            }
        };

        self.x = wrap(x0, self.output_width);
        self.y = wrap(y0, self.output_width);
        self.z = wrap(z0, self.z_width());
        self.mode = mode;
        self.state = EngineState::Running(0);
        outcome
    }

    /// Performs one micro-rotation. Does nothing unless running.
    pub fn step(&mut self) {
        let i = match self.state {
            EngineState::Running(i) => i,
            EngineState::Idle | EngineState::Ready => return,
        };

        // Shifted feedback, by the current iteration index
        let xs = self.x >> i;
        let ys = self.y >> i;

        let d = match self.mode {
            Mode::Rotate => !sign_bit(self.z, self.z_width()),
            Mode::Vector => sign_bit(self.x, self.output_width) ^ sign_bit(self.y, self.output_width),
        };

        let a = self.table.get(i);
        let (x, y, z) = if d {
            (self.x - ys, self.y + xs, self.z - a)
        } else {
            (self.x + ys, self.y - xs, self.z + a)
        };

        self.x = wrap(x, self.output_width);
        self.y = wrap(y, self.output_width);
        self.z = wrap(z, self.z_width());

        self.state = if i + 1 == self.table.iterations() {
            debug!("CORDIC: ready after {} iterations", i + 1);
            EngineState::Ready
        } else {
            EngineState::Running(i + 1)
        };
    }

    /// Current register values; final only when `ready` is set.
    #[inline(always)]
    pub fn read(&self) -> Output {
        Output {
            x: self.x,
            y: self.y,
            z: self.z,
            ready: self.is_ready(),
        }
    }

    /// Starts the engine and steps it to completion.
    pub fn run(&mut self, x0: i64, y0: i64, z0: i64, mode: Mode) -> Output {
        self.start(x0, y0, z0, mode);
        while !self.is_ready() {
            self.step();
        }
        self.read()
    }

    #[inline(always)]
    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    #[inline(always)]
    pub fn is_busy(&self) -> bool {
        matches!(self.state, EngineState::Running(_))
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of steps between an accepted start and `ready`.
    pub fn iterations(&self) -> usize {
        self.table.iterations()
    }

    pub fn table(&self) -> &AngleTable {
        &self.table
    }

    pub fn angle_width(&self) -> u32 {
        self.table.width()
    }

    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    #[inline(always)]
    fn z_width(&self) -> u32 {
        self.table.width() + 1
    }
}

impl Handshake for CordicCore {
    type Result = Output;

    fn step(&mut self) {
        CordicCore::step(self)
    }

    fn is_ready(&self) -> bool {
        CordicCore::is_ready(self)
    }

    fn result(&self) -> Option<Output> {
        self.is_ready().then(|| self.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cordic::run_until_ready;
    use crate::math_integer::fixed_point::{from_real, gain_compensated, radian_scale};
    use crate::ConfigError;

    #[test]
    fn starts_idle_and_ignores_steps() {
        let mut core = CordicCore::new(8, 12).unwrap();
        assert_eq!(core.state(), EngineState::Idle);
        core.step();
        assert_eq!(core.state(), EngineState::Idle);
        assert!(!core.read().ready);
    }

    #[test]
    fn ready_rises_after_exactly_n_steps() {
        let mut core = CordicCore::new(8, 12).unwrap();
        let n = core.iterations();
        assert_eq!(n, 8);

        assert_eq!(core.start(600, 0, 10, Mode::Rotate), StartOutcome::Accepted);
        for i in 0..n {
            assert_eq!(core.state(), EngineState::Running(i));
            assert!(!core.read().ready);
            core.step();
        }
        assert_eq!(core.state(), EngineState::Ready);
        assert!(core.read().ready);
    }

    #[test]
    fn outputs_stay_frozen_while_ready() {
        let mut core = CordicCore::new(8, 12).unwrap();
        let first = core.run(600, 100, -20, Mode::Rotate);
        for _ in 0..20 {
            core.step();
            assert_eq!(core.read(), first);
        }
    }

    #[test]
    fn zero_angle_returns_gain_compensated_input() {
        // x0 = X / K rotated by 0 comes back as (X, ~0)
        let mut core = CordicCore::new(8, 12).unwrap();
        let target = 1024;
        let x0 = from_real(gain_compensated(target as f64), 1.0);
        let out = core.run(x0, 0, 0, Mode::Rotate);

        let tolerance = (target as f64 * core.table().resolution_radians()).ceil() as i64;
        assert!((out.x - target).abs() <= 1, "x = {}", out.x);
        assert!(out.y.abs() <= tolerance, "y = {}", out.y);
        assert!(out.z.abs() <= core.table().resolution());
    }

    #[test]
    fn rotate_drives_z_within_one_table_step() {
        let mut core = CordicCore::new(12, 16).unwrap();
        let scale = radian_scale(12);
        for deg in [-90.0f64, -60.0, -45.0, -10.0, 0.0, 5.0, 30.0, 89.0] {
            let z0 = from_real(deg.to_radians(), scale);
            let out = core.run(10000, 0, z0, Mode::Rotate);
            assert!(out.z.abs() <= core.table().resolution(), "deg {deg}: z = {}", out.z);
        }
    }

    #[test]
    fn rotate_by_quarter_turn_swaps_axes() {
        let mut core = CordicCore::new(12, 16).unwrap();
        let z0 = from_real(std::f64::consts::FRAC_PI_2, radian_scale(12));
        let x0 = from_real(gain_compensated(16000.0), 1.0);
        let out = core.run(x0, 0, z0, Mode::Rotate);
        assert!(out.x.abs() <= 24, "x = {}", out.x);
        assert!((out.y - 16000).abs() <= 24, "y = {}", out.y);
    }

    #[test]
    fn vector_mode_recovers_angle_and_magnitude() {
        let mut core = CordicCore::new(12, 16).unwrap();
        let scale = radian_scale(12);
        let (x0, y0) = (3000, 4000);
        let out = core.run(x0, y0, 0, Mode::Vector);

        let angle = from_real((4000.0f64).atan2(3000.0), scale);
        assert!((out.z - angle).abs() <= 2, "z = {}, expected {}", out.z, angle);
        let magnitude = 5000.0 * crate::math_integer::fixed_point::CORDIC_GAIN;
        assert!((out.x as f64 - magnitude).abs() <= 12.0, "x = {}", out.x);
        let residual = (magnitude * core.table().resolution_radians()).ceil() as i64;
        assert!(out.y.abs() <= residual, "y = {}", out.y);
    }

    #[test]
    fn vector_mode_handles_negative_y() {
        let mut core = CordicCore::new(12, 16).unwrap();
        let out = core.run(3000, -4000, 0, Mode::Vector);
        let angle = from_real((-4000.0f64).atan2(3000.0), radian_scale(12));
        assert!((out.z - angle).abs() <= 2, "z = {}, expected {}", out.z, angle);
    }

    #[test]
    fn start_while_busy_discards_partial_result() {
        // Known hazard: a start pulse in the middle of a computation is not
        // guarded and silently replaces the work in flight.
        let mut core = CordicCore::new(8, 12).unwrap();
        let mut reference = CordicCore::new(8, 12).unwrap();
        let expected = reference.run(500, 0, -40, Mode::Rotate);

        core.start(600, 0, 40, Mode::Rotate);
        core.step();
        core.step();
        core.step();
        assert_eq!(
            core.start(500, 0, -40, Mode::Rotate),
            StartOutcome::Restarted { discarded_at: 3 }
        );
        assert_eq!(core.state(), EngineState::Running(0));

        let (out, steps) = run_until_ready(&mut core, 100).unwrap();
        assert_eq!(steps, core.iterations());
        assert_eq!(out, expected);
    }

    #[test]
    fn start_after_ready_is_accepted() {
        let mut core = CordicCore::new(8, 12).unwrap();
        core.run(600, 0, 10, Mode::Rotate);
        assert_eq!(core.start(600, 0, 20, Mode::Rotate), StartOutcome::Accepted);
        assert!(!core.is_ready());
        assert!(core.is_busy());
    }

    #[test]
    fn operands_wrap_to_register_width() {
        let mut core = CordicCore::new(8, 12).unwrap();
        core.start(0x1000 + 5, -0x1000 - 3, 0x200 + 1, Mode::Rotate);
        let out = core.read();
        assert_eq!((out.x, out.y, out.z), (5, -3, 1));
    }

    #[test]
    fn rejects_bad_widths() {
        assert!(matches!(
            CordicCore::new(2, 12),
            Err(ConfigError::AngleWidth { width: 2, .. })
        ));
        assert!(matches!(
            CordicCore::new(8, 2),
            Err(ConfigError::OutputWidth { width: 2, .. })
        ));
    }

    #[test]
    fn rejects_table_wider_than_the_angle_register() {
        use crate::math_integer::angle_table::Rounding;

        // 1e4 codes per radian can't live in a 9 bit z register
        let built = AngleTable::with_scale(8, 1e4, Rounding::Nearest)
            .and_then(|table| CordicCore::with_table(table, 16));
        assert!(matches!(built, Err(ConfigError::ScaleOverflow { width: 8 })));

        // A table at the radian scale of the same width runs a small rotation correctly
        let mut core = CordicCore::new(8, 16).unwrap();
        let z0 = from_real(0.1, radian_scale(8));
        let out = core.run(10000, 0, z0, Mode::Rotate);
        assert!(out.y > 0, "y = {}", out.y);
    }

    #[cfg(feature = "log")]
    mod logging {
        use super::*;
        use std::sync::{Mutex, Once};

        static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());
        static INIT: Once = Once::new();

        struct Capture;

        impl log::Log for Capture {
            fn enabled(&self, _: &log::Metadata) -> bool {
                true
            }

            fn log(&self, record: &log::Record) {
                LINES.lock().unwrap().push(format!("{}", record.args()));
            }

            fn flush(&self) {}
        }

        fn capture() {
            INIT.call_once(|| {
                log::set_logger(&Capture).unwrap();
                log::set_max_level(log::LevelFilter::Debug);
            });
        }

        #[test]
        fn start_and_restart_are_logged() {
            capture();
            let mut core = CordicCore::new(8, 12).unwrap();
            core.start(100, 0, 0, Mode::Rotate);
            core.step();
            core.start(100, 0, 0, Mode::Rotate);

            let lines = LINES.lock().unwrap();
            assert!(lines.iter().any(|l| l == "CORDIC: start, ready in 8 steps"));
            assert!(lines.iter().any(|l| l.starts_with("CORDIC: start while busy at iteration 1")));
        }
    }
}
