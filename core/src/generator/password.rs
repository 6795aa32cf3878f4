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

use crate::charset::{shift_sort, Alphabet};
use crate::error::Result;
use crate::seed::{bits_for, SeedStream};

/// `Password(alphabet, length)` — concatenation of `length` drawn symbols, optionally
/// shift-sorted, with `prefix`/`suffix`/`sep` decoration.
#[derive(Debug, Clone)]
pub struct Password {
    pub alphabet: Alphabet,
    pub length: usize,
    pub shift_sort: bool,
    pub prefix: String,
    pub suffix: String,
    pub sep: String,
}

impl Default for Password {
    fn default() -> Self {
        Password {
            alphabet: Alphabet::default(),
            length: 16,
            shift_sort: false,
            prefix: String::new(),
            suffix: String::new(),
            sep: String::new(),
        }
    }
}

impl Password {
    pub fn new(length: usize) -> Self {
        Password { length, ..Default::default() }
    }

    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<String> {
        let chars = self.alphabet.chars();
        let n = chars.len() as u64;
        let bits = bits_for(n);
        let mut symbols = Vec::with_capacity(self.length);
        for _ in 0..self.length {
            let idx = stream.draw_below(n, bits, culprit)? as usize;
            symbols.push(chars[idx]);
        }
        if self.shift_sort {
            symbols = shift_sort(&symbols);
        }
        let body: String = if self.sep.is_empty() {
            symbols.into_iter().collect()
        } else {
            symbols.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(&self.sep)
        };
        Ok(format!("{}{}{}", self.prefix, body, self.suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn produces_requested_length() {
        let gen = Password::new(20);
        let mut stream = Seed::new("master", "account", "field").stream();
        let value = gen.materialize(&mut stream, "account.field").unwrap();
        assert_eq!(value.chars().count(), 20);
    }

    #[test]
    fn is_deterministic() {
        let gen = Password::new(12);
        let a = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        let b = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn prefix_and_suffix_are_applied() {
        let gen = Password {
            length: 4,
            prefix: "pw-".into(),
            suffix: "-end".into(),
            ..Default::default()
        };
        let mut stream = Seed::new("m", "a", "f").stream();
        let value = gen.materialize(&mut stream, "a.f").unwrap();
        assert!(value.starts_with("pw-"));
        assert!(value.ends_with("-end"));
    }
}
