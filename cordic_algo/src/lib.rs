// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#![cfg_attr(not(any(test, feature = "std")), no_std)]

// Must stay first so the logging macros are visible to every module below
#[macro_use]
mod fmt;

pub mod error;
pub mod math_integer;

pub mod angle;
pub mod cordic;
pub mod link;

pub use angle::sincos::{SinCos, SinCosConfig, SinCosOutput};
pub use angle::to_radians::ToRadians;
pub use cordic::engine::{CordicCore, EngineState, StartOutcome};
pub use cordic::rotate::RotateExtend;
pub use cordic::vector::VectorExtend;
pub use cordic::{run_until_ready, Handshake, Mode, Output};
pub use error::{ConfigError, ConfigResult};
pub use link::{SampleForwarder, WordSink};
pub use math_integer::angle_table::{AngleTable, Rounding};
pub use math_integer::filters::boxcar::Boxcar;
pub use math_integer::fixed_point::CORDIC_GAIN;
