// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

// Angle-domain stages: code-to-radian conversion and the sine/cosine
// pipeline built on top of it.

pub mod sincos;
pub mod to_radians;
