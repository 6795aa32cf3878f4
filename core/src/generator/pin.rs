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

use crate::error::Result;
use crate::seed::{bits_for, SeedStream};

/// `PIN(digits, length)` — a digit string of `length` digits drawn from `digits`.
#[derive(Debug, Clone)]
pub struct Pin {
    pub digits: String,
    pub length: usize,
}

impl Default for Pin {
    fn default() -> Self {
        Pin { digits: "0123456789".to_string(), length: 4 }
    }
}

impl Pin {
    pub fn new(length: usize) -> Self {
        Pin { length, ..Default::default() }
    }

    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<String> {
        let chars: Vec<char> = self.digits.chars().collect();
        let n = chars.len() as u64;
        let bits = bits_for(n);
        let mut out = String::with_capacity(self.length);
        for _ in 0..self.length {
            let idx = stream.draw_below(n, bits, culprit)? as usize;
            out.push(chars[idx]);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn produces_only_digits_of_requested_length() {
        let gen = Pin::new(4);
        let mut stream = Seed::new("master", "account", "field").stream();
        let value = gen.materialize(&mut stream, "account.field").unwrap();
        assert_eq!(value.len(), 4);
        assert!(value.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn is_deterministic() {
        let gen = Pin::new(6);
        let a = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        let b = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        assert_eq!(a, b);
    }
}
