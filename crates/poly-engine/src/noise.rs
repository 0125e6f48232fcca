//! Pseudo-random source for noise-mode voices.

const SEED: u16 = 0xACE1;

/// 16-bit xorshift generator (shifts 7, 9, 8; period 65535).
///
/// Owned by the engine and reseeded on reset, so renders are repeatable.
#[derive(Clone, Debug)]
pub struct Noise {
    state: u16,
}

impl Noise {
    pub const fn new() -> Self {
        Self { state: SEED }
    }

    pub fn reset(&mut self) {
        self.state = SEED;
    }

    fn next_u16(&mut self) -> u16 {
        let mut x = self.state;
        x ^= x << 7;
        x ^= x >> 9;
        x ^= x << 8;
        self.state = x;
        x
    }

    /// Next value in `-256..256`.
    pub fn next_bipolar(&mut self) -> i32 {
        (self.next_u16() >> 7) as i32 - 256
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::new()
    }
}
