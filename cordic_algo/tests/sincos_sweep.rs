// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use cordic_algo::{SinCos, SinCosConfig};

/// Worst-case LSB error over every input code stays below `tolerance`.
fn sweep(in_width: u32, out_width: u32, tolerance: f64) {
    let mut sincos = SinCos::new(SinCosConfig {
        in_width,
        out_width,
        ..SinCosConfig::default()
    })
    .unwrap();

    let peak = 0.99 * (1u64 << (out_width - 1)) as f64;
    for angle in 0..1u64 << in_width {
        let (s, c) = sincos.compute(angle);
        let th = 2.0 * PI * angle as f64 / (1u64 << in_width) as f64;
        assert_abs_diff_eq!(s as f64, peak * th.sin(), epsilon = tolerance);
        assert_abs_diff_eq!(c as f64, peak * th.cos(), epsilon = tolerance);
    }
}

#[test]
fn sweep_12_bit_angle_12_bit_output() {
    sweep(12, 12, 12.0);
}

#[test]
fn sweep_wide_angle_narrow_output() {
    sweep(16, 12, 12.0);
}

#[test]
fn sweep_narrow_angle_wide_output() {
    sweep(8, 14, 12.0);
    sweep(10, 16, 12.0);
}

#[test]
fn biased_output_fits_unsigned_range() {
    let out_width = 12;
    let mut sincos = SinCos::new(SinCosConfig {
        offset: 1 << (out_width - 1),
        ..SinCosConfig::default()
    })
    .unwrap();
    for angle in (0..1u64 << 12).step_by(7) {
        let (s, c) = sincos.compute(angle);
        assert!((0..1 << out_width).contains(&s), "angle {angle}: sin = {s}");
        assert!((0..1 << out_width).contains(&c), "angle {angle}: cos = {c}");
    }
}
