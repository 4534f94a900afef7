// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

// Prints one `cordic <angle> <x> <y>` line per angle code, ready to be
// piped into a plotting script.

use std::io::{self, BufWriter, Write};
use std::process;

use clap::{Parser, ValueEnum};
use cordic_algo::math_integer::fixed_point::radian_scale;
use cordic_algo::{
    AngleTable, ConfigResult, RotateExtend, Rounding, SinCos, SinCosConfig, CORDIC_GAIN,
};

/// Widest angle code the tool will walk; one line per code
const MAX_SWEEP_WIDTH: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SweepMode {
    /// Rotate wrapper on a gain-compensated unit vector
    Rotate,
    /// Sine / cosine generator (prints sin as x, cos as y)
    Sincos,
}

#[derive(Debug, Parser)]
#[command(name = "sweep", version, about = "Sweep the full angle range through a CORDIC engine")]
struct Args {
    /// Width of the full-circle angle code in bits
    #[arg(
        long,
        default_value_t = 12,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SWEEP_WIDTH)
    )]
    angle_width: u32,

    /// Width of the output registers in bits
    #[arg(long, default_value_t = 12)]
    output_width: u32,

    #[arg(long, value_enum, default_value_t = SweepMode::Rotate)]
    mode: SweepMode,

    /// Build the arctangent table by truncation instead of rounding
    #[arg(long)]
    truncate: bool,

    /// Peak as a fraction of half the output range
    #[arg(long, default_value_t = 0.99)]
    amplitude: f64,

    /// Bias added to both outputs
    #[arg(long, default_value_t = 0)]
    offset: i64,
}

impl Args {
    fn rounding(&self) -> Rounding {
        if self.truncate {
            Rounding::Truncate
        } else {
            Rounding::Nearest
        }
    }
}

/// Engine selected on the command line, ready to be swept.
enum Sweeper {
    Rotate { rot: RotateExtend, x0: i64 },
    Sincos(SinCos),
}

impl Sweeper {
    /// Builds the engine; every width is validated here, before any shift.
    fn build(args: &Args) -> ConfigResult<Self> {
        match args.mode {
            SweepMode::Rotate => {
                let table = AngleTable::with_scale(
                    args.angle_width,
                    radian_scale(args.angle_width),
                    args.rounding(),
                )?;
                let rot = RotateExtend::with_table(table, args.output_width, args.offset)?;
                let half_range = (1u64 << args.output_width) as f64 / 2.0;
                let x0 = (args.amplitude * half_range / CORDIC_GAIN) as i64;
                log::info!("rotate sweep: x0 = {}, {} iterations", x0, rot.core().iterations());
                Ok(Self::Rotate { rot, x0 })
            }
            SweepMode::Sincos => {
                let sincos = SinCos::new(SinCosConfig {
                    in_width: args.angle_width,
                    out_width: args.output_width,
                    offset: args.offset,
                    amplitude: args.amplitude,
                    rounding: args.rounding(),
                })?;
                log::info!("sincos sweep: latency {} steps", sincos.latency());
                Ok(Self::Sincos(sincos))
            }
        }
    }

    fn point(&mut self, angle: u64) -> (i64, i64) {
        match self {
            Self::Rotate { rot, x0 } => {
                let out = rot.compute(*x0, 0, angle);
                (out.x, out.y)
            }
            Self::Sincos(sincos) => sincos.compute(angle),
        }
    }
}

/// Streams one line per angle code of `angle_width` bits.
fn write_sweep<W: Write>(sweeper: &mut Sweeper, angle_width: u32, out: &mut W) -> io::Result<()> {
    for angle in 0..1u64 << angle_width {
        let (x, y) = sweeper.point(angle);
        writeln!(out, "cordic {angle} {x} {y}")?;
    }
    out.flush()
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut sweeper = match Sweeper::build(&args) {
        Ok(sweeper) => sweeper,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if let Err(e) = write_sweep(&mut sweeper, args.angle_width, &mut out) {
        // Downstream closing the pipe early is a normal way to stop
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
