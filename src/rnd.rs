// SPDX-FileCopyrightText: 2021 David Ruescas <david@sequentech.io>
//
// SPDX-License-Identifier: AGPL-3.0-only
use rand::rngs::OsRng;
use rand::CryptoRng;
use rand::Error;
use rand::RngCore;

/// Process wide randomness source.
///
/// Every draw goes straight to the operating system generator, there is no
/// shared state between callers, so independent threads get independent
/// output.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrandRng;

impl CryptoRng for StrandRng {}

impl RngCore for StrandRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        OsRng.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        OsRng.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest)
    }

    #[inline(always)]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        OsRng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_independent_draws_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| StrandRng.next_u64()))
            .collect();
        let mut values: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        values.sort();
        values.dedup();

        assert_eq!(values.len(), 4);
    }
}
