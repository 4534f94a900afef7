// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

//! Construction-time configuration errors.
//!
//! Nothing fails once an engine is built: start/step/read only shift, add
//! and subtract fixed-width integers. Every misconfiguration is caught by a
//! constructor instead.

use thiserror::Error;

/// Result type for engine construction
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Reasons an engine, table or filter refuses to be built
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Angle code width can't hold a quadrant tag plus a residue
    #[error("angle width {width} outside supported range {min}..={max}")]
    AngleWidth { width: u32, min: u32, max: u32 },

    /// Output register width unusable for a vector component
    #[error("output width {width} outside supported range {min}..={max}")]
    OutputWidth { width: u32, min: u32, max: u32 },

    /// Table scale is zero, negative, NaN or infinite
    #[error("table scale must be finite and positive")]
    InvalidScale,

    /// First arctangent step already rounds to zero
    #[error("angle table for width {width} has no iterations")]
    EmptyTable { width: u32 },

    /// Table steps add up to more than the guarded angle register holds
    #[error("angle table scale overflows the {width} bit angle register")]
    ScaleOverflow { width: u32 },

    /// Sine/cosine amplitude must leave headroom below full scale
    #[error("amplitude {0} must lie in (0, 1)")]
    Amplitude(f64),

    /// Boxcar window length must be a power of two
    #[error("boxcar window {0} is not a power of two")]
    WindowLength(usize),
}
