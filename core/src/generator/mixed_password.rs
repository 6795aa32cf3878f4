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

use crate::charset::Alphabet;
use crate::error::{Error, Result};
use crate::seed::{bits_for, SeedStream};

/// One `(alphabet, count)` requirement within a [`MixedPassword`].
#[derive(Debug, Clone)]
pub struct MixedPasswordPart {
    pub alphabet: Alphabet,
    pub count: usize,
}

/// `MixedPassword(parts, length)` — draws `count` symbols from each part's alphabet, fills the
/// remainder from the union of all part alphabets, then deterministically shuffles the result
///.
#[derive(Debug, Clone)]
pub struct MixedPassword {
    pub parts: Vec<MixedPasswordPart>,
    pub length: usize,
}

impl MixedPassword {
    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<String> {
        let required: usize = self.parts.iter().map(|p| p.count).sum();
        if required > self.length {
            return Err(Error::BadRecipe {
                recipe: culprit.to_string(),
                reason: format!("parts require {required} characters but length is {}", self.length),
            });
        }

        let mut symbols: Vec<char> = Vec::with_capacity(self.length);
        let mut fill_pool: Vec<char> = Vec::new();
        for part in &self.parts {
            let chars = part.alphabet.chars();
            let n = chars.len() as u64;
            let bits = bits_for(n);
            for _ in 0..part.count {
                let idx = stream.draw_below(n, bits, culprit)? as usize;
                symbols.push(chars[idx]);
            }
            for c in chars {
                if !fill_pool.contains(&c) {
                    fill_pool.push(c);
                }
            }
        }

        let remainder = self.length - required;
        let n = fill_pool.len() as u64;
        let bits = bits_for(n);
        for _ in 0..remainder {
            let idx = stream.draw_below(n, bits, culprit)? as usize;
            symbols.push(fill_pool[idx]);
        }

        fisher_yates_shuffle(&mut symbols, stream, culprit)?;
        Ok(symbols.into_iter().collect())
    }
}

/// Deterministic in-place Fisher–Yates shuffle driven by seed-derived swaps, shared with
/// [`super::recipe::PasswordRecipe`]'s positional placement.
pub(crate) fn fisher_yates_shuffle(items: &mut [char], stream: &mut SeedStream, culprit: &str) -> Result<()> {
    for i in (1..items.len()).rev() {
        let j = stream.draw_below((i + 1) as u64, bits_for((i + 1) as u64), culprit)? as usize;
        items.swap(i, j);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn honors_part_counts_and_total_length() {
        let gen = MixedPassword {
            parts: vec![
                MixedPasswordPart { alphabet: Alphabet::Uppercase, count: 2 },
                MixedPasswordPart { alphabet: Alphabet::Digits, count: 2 },
            ],
            length: 10,
        };
        let mut stream = Seed::new("m", "a", "f").stream();
        let value = gen.materialize(&mut stream, "a.f").unwrap();
        assert_eq!(value.chars().count(), 10);
        assert!(value.chars().filter(|c| c.is_ascii_uppercase()).count() >= 2);
        assert!(value.chars().filter(|c| c.is_ascii_digit()).count() >= 2);
    }

    #[test]
    fn rejects_parts_that_exceed_length() {
        let gen = MixedPassword {
            parts: vec![MixedPasswordPart { alphabet: Alphabet::Uppercase, count: 20 }],
            length: 5,
        };
        let mut stream = Seed::new("m", "a", "f").stream();
        assert!(gen.materialize(&mut stream, "a.f").is_err());
    }
}
