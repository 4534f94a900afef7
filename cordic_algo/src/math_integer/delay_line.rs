// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Fixed-depth delay register: whatever is pushed comes back out exactly
/// `N` pushes later.
///
/// Used wherever one pipeline stage has to be re-aligned with another
/// (a start pulse waiting for a registered angle) and as the sample memory
/// of a moving-average window.
///
/// A zero-depth line is rejected at compile time:
///
/// ```compile_fail
/// use cordic_algo::math_integer::delay_line::DelayLine;
///
/// let _line: DelayLine<bool, 0> = DelayLine::new();
/// ```
pub struct DelayLine<T, const N: usize> {
    buffer: [T; N],
    idx: usize, // Slot holding the oldest value
}

impl<T, const N: usize> DelayLine<T, N>
where
    T: Default + Copy,
{
    const NON_EMPTY: () = assert!(N > 0, "delay line needs at least one slot");

    pub fn new() -> Self {
        Self::filled(T::default())
    }

    /// Creates a delay line whose history is `value` in every slot.
    pub fn filled(value: T) -> Self {
        let () = Self::NON_EMPTY;
        Self {
            buffer: [value; N],
            idx: 0,
        }
    }

    /// Shifts `value` in and returns the value pushed `N` calls ago.
    pub fn push(&mut self, value: T) -> T {
        let oldest = self.buffer[self.idx];
        self.buffer[self.idx] = value;
        self.idx = (self.idx + 1) % N;
        oldest
    }

    /// Value that the next `push` will return.
    pub fn oldest(&self) -> T {
        self.buffer[self.idx]
    }

    /// Forgets all history.
    pub fn clear(&mut self) {
        self.buffer = [T::default(); N];
        self.idx = 0;
    }

    pub const fn depth(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for DelayLine<T, N>
where
    T: Default + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_one_delays_by_a_single_push() {
        let mut line: DelayLine<bool, 1> = DelayLine::new();
        assert!(!line.push(true));
        assert!(line.push(false));
        assert!(!line.push(false));
    }

    #[test]
    fn values_emerge_in_order_after_n_pushes() {
        let mut line: DelayLine<i64, 4> = DelayLine::filled(-1);
        let out: Vec<i64> = (0..8).map(|v| line.push(v)).collect();
        assert_eq!(out, vec![-1, -1, -1, -1, 0, 1, 2, 3]);
        assert_eq!(line.oldest(), 4);
    }

    #[test]
    fn clear_resets_history() {
        let mut line: DelayLine<i64, 2> = DelayLine::new();
        line.push(7);
        line.push(9);
        line.clear();
        assert_eq!(line.oldest(), 0);
        assert_eq!(line.push(1), 0);
        assert_eq!(line.depth(), 2);
    }
}
