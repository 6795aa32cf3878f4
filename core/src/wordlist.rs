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

//! The default dictionary used by [`crate::generator::Generator::Passphrase`] and
//! [`crate::generator::Generator::Question`].
//!
//! Shipped as a pinned asset rather than generated at runtime, so the word at a given index stays
//! the same across installs and crate versions; determinism depends on it never silently
//! reordering. A file-scoped dictionary override supplies a [`Wordlist`] built from a different
//! source instead of this default.

static DEFAULT_WORDLIST_TEXT: &str = include_str!("../assets/wordlist.txt");

/// A newline-separated, deduplicated, order-preserved list of words indexed by the seed stream.
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: Vec<String>,
}

impl Wordlist {
    pub fn from_text(text: &str) -> Wordlist {
        let words = text.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();
        Wordlist { words }
    }

    pub fn default_list() -> Wordlist {
        Wordlist::from_text(DEFAULT_WORDLIST_TEXT)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word_at(&self, index: usize) -> &str {
        &self.words[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_list_has_four_thousand_ninety_six_words() {
        let list = Wordlist::default_list();
        assert_eq!(list.len(), 4096);
    }

    #[test]
    fn from_text_skips_blank_lines() {
        let list = Wordlist::from_text("alpha\n\nbeta\n");
        assert_eq!(list.len(), 2);
        assert_eq!(list.word_at(0), "alpha");
        assert_eq!(list.word_at(1), "beta");
    }
}
