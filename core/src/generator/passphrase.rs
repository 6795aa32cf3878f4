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

use std::sync::Arc;

use crate::error::Result;
use crate::seed::{bits_for, SeedStream};
use crate::wordlist::Wordlist;

/// `Passphrase(wordlist, length)` — `length` words drawn from `wordlist` and joined by `sep`
/// (default a single space).
#[derive(Clone)]
pub struct Passphrase {
    pub wordlist: Arc<Wordlist>,
    pub length: usize,
    pub sep: String,
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Passphrase")
            .field("wordlist_len", &self.wordlist.len())
            .field("length", &self.length)
            .field("sep", &self.sep)
            .finish()
    }
}

impl Passphrase {
    pub fn new(length: usize, wordlist: Arc<Wordlist>) -> Self {
        Passphrase { wordlist, length, sep: " ".to_string() }
    }

    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<String> {
        draw_words(&self.wordlist, self.length, &self.sep, stream, culprit)
    }
}

/// Shared by [`Passphrase`] and [`super::question::Question`]: draws `length` words from
/// `wordlist`, joined by `sep`.
pub(crate) fn draw_words(
    wordlist: &Wordlist,
    length: usize,
    sep: &str,
    stream: &mut SeedStream,
    culprit: &str,
) -> Result<String> {
    let n = wordlist.len() as u64;
    let bits = bits_for(n);
    let mut words = Vec::with_capacity(length);
    for _ in 0..length {
        let idx = stream.draw_below(n, bits, culprit)? as usize;
        words.push(wordlist.word_at(idx).to_string());
    }
    Ok(words.join(sep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn produces_requested_word_count() {
        let gen = Passphrase::new(4, Arc::new(Wordlist::default_list()));
        let mut stream = Seed::new("master", "account", "field").stream();
        let value = gen.materialize(&mut stream, "account.field").unwrap();
        assert_eq!(value.split(' ').count(), 4);
    }

    #[test]
    fn is_deterministic() {
        let wordlist = Arc::new(Wordlist::default_list());
        let gen = Passphrase::new(4, wordlist);
        let a = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        let b = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn custom_separator_is_used() {
        let gen = Passphrase { sep: "-".into(), ..Passphrase::new(3, Arc::new(Wordlist::default_list())) };
        let mut stream = Seed::new("m", "a", "f").stream();
        let value = gen.materialize(&mut stream, "a.f").unwrap();
        assert_eq!(value.matches('-').count(), 2);
    }
}
