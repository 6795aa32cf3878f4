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

//! Named character sets (alphabets) used by [`crate::generator::Generator::Password`] and
//! friends, plus the shift-sort ordering used to push "shifted" symbols to the end of a
//! generated password.

/// Symbols considered "shifted" on a US keyboard: uppercase letters and the shifted row of
/// punctuation. Used by shift-sort.
pub const SHIFTED_SYMBOLS: &str = "~!@#$%^&*()_+{}|:\"<>?";

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,./<>?";

/// The default alphabet for [`crate::generator::Generator::Password`]: lower + upper + digits,
/// excluding the handful of characters (`l`, `1`, `I`, `O`, `0`) that are easy to transpose when
/// read aloud or copied by hand.
pub const DISTINGUISHABLE: &str = "abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A named alphabet, resolved either to one of the built-ins above or a literal character set
/// supplied in an account file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alphabet {
    Distinguishable,
    Lowercase,
    Uppercase,
    Digits,
    Symbols,
    Literal(String),
}

impl Alphabet {
    pub fn chars(&self) -> Vec<char> {
        match self {
            Alphabet::Distinguishable => DISTINGUISHABLE.chars().collect(),
            Alphabet::Lowercase => LOWERCASE.chars().collect(),
            Alphabet::Uppercase => UPPERCASE.chars().collect(),
            Alphabet::Digits => DIGITS.chars().collect(),
            Alphabet::Symbols => SYMBOLS.chars().collect(),
            Alphabet::Literal(s) => s.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn named(name: &str) -> Option<Alphabet> {
        match name {
            "DISTINGUISHABLE" => Some(Alphabet::Distinguishable),
            "LOWERCASE" => Some(Alphabet::Lowercase),
            "UPPERCASE" => Some(Alphabet::Uppercase),
            "DIGITS" => Some(Alphabet::Digits),
            "SYMBOLS" => Some(Alphabet::Symbols),
            _ => None,
        }
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::Distinguishable
    }
}

/// Whether a character counts as "shifted" for shift-sort purposes: uppercase letters or a
/// member of [`SHIFTED_SYMBOLS`].
pub fn is_shifted(c: char) -> bool {
    c.is_ascii_uppercase() || SHIFTED_SYMBOLS.contains(c)
}

/// Stable-sorts `symbols` so shifted characters move to the end, preserving relative order
/// within each class.
pub fn shift_sort(symbols: &[char]) -> Vec<char> {
    let mut unshifted: Vec<char> = Vec::with_capacity(symbols.len());
    let mut shifted: Vec<char> = Vec::with_capacity(symbols.len());
    for &c in symbols {
        if is_shifted(c) {
            shifted.push(c);
        } else {
            unshifted.push(c);
        }
    }
    unshifted.extend(shifted);
    unshifted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_sort_moves_uppercase_and_symbols_to_end_preserving_order() {
        let input: Vec<char> = "aB1$cD".chars().collect();
        let sorted = shift_sort(&input);
        let sorted_str: String = sorted.into_iter().collect();
        assert_eq!(sorted_str, "a1cB$D");
    }

    #[test]
    fn named_alphabet_lookup() {
        assert_eq!(Alphabet::named("DIGITS"), Some(Alphabet::Digits));
        assert_eq!(Alphabet::named("NOT_A_REAL_ALPHABET"), None);
    }
}
