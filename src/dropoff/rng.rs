//! Seeded pseudorandom numbers for reproducible datasets.
//!
//! Both routines use wrapping 32-bit arithmetic only, so a given seed yields
//! the same sequence as the browser build of the app.

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the string's UTF-16 code units
#[must_use]
pub fn hash_str(key: &str) -> u32 {
    key.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Mulberry32 generator
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed from a string key via [`hash_str`]
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        Self::new(hash_str(key))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform draw in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// `floor(draw * len)`, an index into a table of `len` entries
    pub fn next_index(&mut self, len: usize) -> usize {
        (self.next_f64() * len as f64).floor() as usize
    }

    /// `floor(base + draw * span)`
    pub fn next_in(&mut self, base: f64, span: f64) -> u32 {
        (base + self.next_f64() * span).floor() as u32
    }
}
