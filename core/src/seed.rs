// Copyright 2026. The Keyforge Contributors
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Seed composition and the deterministic bit stream that every generator draws from.
//!
//! A [`Seed`] canonicalizes the tuple `(master_seed, account_seed, field_name, key, version,
//! extra_seed)` into a byte string, then [`SeedStream`] repeatedly hashes that string with
//! SHA-512 (mixing in a 64-bit counter each round) to produce as many uniformly distributed bits
//! as a generator needs. Integers in `[0, n)` are drawn by rejection sampling so the distribution
//! stays uniform regardless of `n`.

use sha2::{Digest, Sha512};

use crate::error::{Error, Result};

/// Separator placed between canonicalized seed parts. Chosen so it cannot occur inside a
/// canonicalized part: canonicalization lowercases and never introduces `\u{1f}`.
const SEED_SEPARATOR: &str = "\u{1f}";

/// The number of fresh entropy bits every generator starts with.
pub const GENERATOR_BIT_BUDGET: u64 = 512;

/// Canonicalizes an account or field identity: lowercased, with `-` normalized to `_`.
///
/// Deliberately `to_ascii_lowercase` rather than a full Unicode case fold: identities are expected
/// to be ASCII, and a locale-dependent fold would make the derived seed stream depend on where it
/// runs.
pub fn canonical_identity(s: &str) -> String {
    s.chars()
        .map(|c| if c == '-' { '_' } else { c })
        .collect::<String>()
        .to_ascii_lowercase()
}

/// The composed seed inputs for a single field materialization.
#[derive(Debug, Clone)]
pub struct Seed {
    pub master_seed: String,
    pub account_seed: String,
    pub field_name: String,
    pub key: Option<String>,
    pub version: Option<String>,
    pub extra_seed: Option<String>,
}

impl Seed {
    pub fn new(master_seed: impl Into<String>, account_seed: impl Into<String>, field_name: impl Into<String>) -> Self {
        Seed {
            master_seed: master_seed.into(),
            account_seed: account_seed.into(),
            field_name: field_name.into(),
            key: None,
            version: None,
            extra_seed: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_extra_seed(mut self, extra_seed: impl Into<String>) -> Self {
        self.extra_seed = Some(extra_seed.into());
        self
    }

    /// The canonical byte string fed into SHA-512. Account and field identity are canonicalized;
    /// everything else (master seed, key, version, extra seed) is taken verbatim, since only
    /// account/field identity is documented as case/underscore-insensitive.
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut parts = vec![
            self.master_seed.clone(),
            canonical_identity(&self.account_seed),
            canonical_identity(&self.field_name),
        ];
        if let Some(key) = &self.key {
            parts.push(key.clone());
        }
        if let Some(version) = &self.version {
            parts.push(version.clone());
        }
        if let Some(extra) = &self.extra_seed {
            parts.push(extra.clone());
        }
        parts.join(SEED_SEPARATOR).into_bytes()
    }

    /// A hex digest of the canonical fragments, exposed so a host can warn when an upgrade
    /// altered generation logic.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha512::new();
        hasher.update(self.canonical_bytes());
        hex_encode(&hasher.finalize())
    }

    pub fn stream(&self) -> SeedStream {
        SeedStream::new(self.canonical_bytes())
    }
}

/// A reproducible, effectively-infinite stream of uniformly distributed bits derived from a
/// canonicalized seed.
pub struct SeedStream {
    base: Vec<u8>,
    counter: u64,
    buffer: Vec<u8>,
    buffer_pos: usize,
    bits_consumed: u64,
}

impl SeedStream {
    fn new(base: Vec<u8>) -> Self {
        SeedStream {
            base,
            counter: 0,
            buffer: Vec::new(),
            buffer_pos: 0,
            bits_consumed: 0,
        }
    }

    fn refill(&mut self) {
        let mut hasher = Sha512::new();
        hasher.update(&self.base);
        hasher.update(self.counter.to_be_bytes());
        self.counter += 1;
        self.buffer = hasher.finalize().to_vec();
        self.buffer_pos = 0;
    }

    fn next_byte(&mut self) -> u8 {
        if self.buffer_pos >= self.buffer.len() {
            self.refill();
        }
        let byte = self.buffer[self.buffer_pos];
        self.buffer_pos += 1;
        byte
    }

    /// Total bits drawn from this stream so far.
    pub fn bits_consumed(&self) -> u64 {
        self.bits_consumed
    }

    /// Draws a uniformly distributed integer in `[0, n)` via rejection sampling.
    ///
    /// `bits` is the number of bits charged against the entropy budget for this draw
    /// (`ceil(log2(n))`); callers are expected to pass the alphabet-derived value so the budget
    /// check in [`charge`](Self::charge) stays centralized.
    pub fn next_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        if n == 1 {
            return 0;
        }
        let bound = u64::MAX - (u64::MAX % n);
        loop {
            let mut v: u64 = 0;
            for _ in 0..8 {
                v = (v << 8) | self.next_byte() as u64;
            }
            if v < bound {
                return v % n;
            }
        }
    }

    /// Charges `bits` against the 512-bit generator budget, failing with [`Error::SecretExhausted`]
    /// once the budget is exceeded.
    pub fn charge(&mut self, bits: u64, culprit: &str) -> Result<()> {
        self.bits_consumed += bits;
        if self.bits_consumed > GENERATOR_BIT_BUDGET {
            return Err(Error::SecretExhausted {
                culprit: culprit.to_string(),
            });
        }
        Ok(())
    }

    /// Draws `n` uniformly and charges the budget in one step; the common case for generators.
    pub fn draw_below(&mut self, n: u64, bits: u64, culprit: &str) -> Result<u64> {
        self.charge(bits, culprit)?;
        Ok(self.next_below(n))
    }
}

/// Bits required to represent `n` distinct outcomes, i.e. `ceil(log2(n))`, with `n <= 1` costing
/// zero bits (a constant alphabet of one symbol need not consume entropy).
pub fn bits_for(n: u64) -> u64 {
    if n <= 1 {
        return 0;
    }
    64 - (n - 1).leading_zeros() as u64
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_identity_folds_case_and_dashes() {
        assert_eq!(canonical_identity("Big-Bank"), "big_bank");
        assert_eq!(canonical_identity("big_bank"), "big_bank");
        assert_eq!(canonical_identity("BIG_BANK"), "big_bank");
    }

    #[test]
    fn determinism_same_seed_same_stream() {
        let seed = Seed::new("master", "account", "field");
        let mut a = seed.stream();
        let mut b = seed.stream();
        for _ in 0..100 {
            assert_eq!(a.next_below(1000), b.next_below(1000));
        }
    }

    #[test]
    fn rename_sensitivity_changes_stream() {
        let a = Seed::new("master", "account", "field").stream().next_below(1_000_000);
        let b = Seed::new("master", "account2", "field").stream().next_below(1_000_000);
        assert_ne!(a, b);
    }

    #[test]
    fn bits_for_matches_ceil_log2() {
        assert_eq!(bits_for(1), 0);
        assert_eq!(bits_for(2), 1);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(4), 2);
        assert_eq!(bits_for(5), 3);
        assert_eq!(bits_for(256), 8);
    }

    #[test]
    fn budget_enforcement_fails_when_exhausted() {
        let mut stream = Seed::new("m", "a", "f").stream();
        // 512 bits / 8 bits-per-symbol = 64 draws within budget.
        for _ in 0..64 {
            assert!(stream.draw_below(256, 8, "a.f").is_ok());
        }
        assert!(matches!(
            stream.draw_below(256, 8, "a.f"),
            Err(Error::SecretExhausted { .. })
        ));
    }
}
