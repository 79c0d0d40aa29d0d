//! Shared helpers for solver tests.

use std::collections::VecDeque;

use rand::RngCore;

/// Random source that replays a fixed script.
///
/// Each scripted fraction `n / d` becomes the smallest 53-bit mantissa at
/// or above it, so `random::<f64>()` returns a value no smaller than the
/// fraction and multiplying by `d` lands at or just above `n`.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: VecDeque<u64>,
}

impl ScriptedRandom {
    pub fn fractions(fractions: &[(u64, u64)]) -> Self {
        let values = fractions
            .iter()
            .map(|&(numerator, denominator)| {
                let scaled = ((numerator as u128) << 53).div_ceil(denominator as u128);
                (scaled as u64) << 11
            })
            .collect();
        Self { values }
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RngCore for ScriptedRandom {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.values.pop_front().expect("scripted random exhausted")
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
