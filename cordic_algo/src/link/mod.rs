// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

// Boundary to the serial-bus transmitter that carries results off-engine.
//
// The transmitter itself (bit shifting, chip select, device init) lives
// outside this crate; it only has to honor the same start/ready shape as
// the engines plus a raw data word.

use crate::cordic::Handshake;
use crate::math_integer::fixed_point::to_unsigned;

/// Word-oriented transmitter with a start/ready handshake.
pub trait WordSink {
    /// Width of a data word in bits.
    fn width(&self) -> u32;

    /// `true` when a new word may be started.
    fn is_ready(&self) -> bool;

    /// Begins sending `word`. Only called while `is_ready()`.
    fn start(&mut self, word: u64);

    /// Advances the transmitter by one discrete time step.
    fn step(&mut self);
}

/// Ships one value per fresh engine result to a `WordSink`.
///
/// A result counts as fresh on the rising edge of the engine's `ready`. The
/// value picked by `select` is reduced to the sink's word width and held
/// until the sink is ready. A newer result replaces a word still waiting.
pub struct SampleForwarder<F> {
    select: F,            // Picks the value to transmit from a result
    was_ready: bool,      // Engine ready level seen on the previous step
    pending: Option<u64>, // Word waiting for the sink
    sent: usize,          // Words handed to the sink so far
    dropped: usize,       // Words replaced before the sink took them
}

impl<F> SampleForwarder<F> {
    pub fn new(select: F) -> Self {
        Self {
            select,
            was_ready: false,
            pending: None,
            sent: 0,
            dropped: 0,
        }
    }

    /// One discrete time step for the engine, the forwarder and the sink.
    pub fn tick<E, S>(&mut self, engine: &mut E, sink: &mut S)
    where
        E: Handshake,
        S: WordSink,
        F: FnMut(&E::Result) -> i64,
    {
        let ready = engine.is_ready();
        if ready && !self.was_ready {
            if let Some(result) = engine.result() {
                let word = to_unsigned((self.select)(&result), sink.width());
                if self.pending.replace(word).is_some() {
                    warn!("LINK: sink busy, previous word dropped");
                    self.dropped += 1;
                }
            }
        }
        self.was_ready = ready;

        if sink.is_ready() {
            if let Some(word) = self.pending.take() {
                sink.start(word);
                self.sent += 1;
            }
        }

        engine.step();
        sink.step();
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
