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

use crate::charset::{Alphabet, DIGITS, LOWERCASE, SYMBOLS, UPPERCASE};
use crate::error::{Error, Result};
use crate::seed::{bits_for, SeedStream};

use super::mixed_password::fisher_yates_shuffle;

/// One class requirement parsed out of a [`PasswordRecipe`] string, e.g. `2u` or `2c!@#`.
#[derive(Debug, Clone)]
struct ClassRequirement {
    count: usize,
    alphabet: Alphabet,
}

/// `PasswordRecipe("L [N]l [N]u [N]d [N]s [N]c<chars>")` — a password of length `L` guaranteed
/// to contain at least the stated counts from each named class, with the remainder drawn from
/// `def_alphabet` and all characters shuffled into position by further seed-driven swaps
///.
#[derive(Debug, Clone)]
pub struct PasswordRecipe {
    pub recipe: String,
    pub def_alphabet: Alphabet,
}

impl PasswordRecipe {
    pub fn new(recipe: impl Into<String>) -> Self {
        PasswordRecipe { recipe: recipe.into(), def_alphabet: Alphabet::default() }
    }

    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<String> {
        let (length, requirements) = parse_recipe(&self.recipe)?;

        let required: usize = requirements.iter().map(|r| r.count).sum();
        if required > length {
            return Err(Error::BadRecipe {
                recipe: self.recipe.clone(),
                reason: format!("classes require {required} characters but length is {length}"),
            });
        }

        // Class-required characters are drawn first, in recipe order.
        let mut symbols: Vec<char> = Vec::with_capacity(length);
        for req in &requirements {
            let chars = req.alphabet.chars();
            let n = chars.len() as u64;
            let bits = bits_for(n);
            for _ in 0..req.count {
                let idx = stream.draw_below(n, bits, culprit)? as usize;
                symbols.push(chars[idx]);
            }
        }

        let remainder = length - required;
        let chars = self.def_alphabet.chars();
        let n = chars.len() as u64;
        let bits = bits_for(n);
        for _ in 0..remainder {
            let idx = stream.draw_below(n, bits, culprit)? as usize;
            symbols.push(chars[idx]);
        }

        // Positions of all characters (including the class-required ones) are chosen by further
        // bits from the stream via Fisher-Yates.
        fisher_yates_shuffle(&mut symbols, stream, culprit)?;
        Ok(symbols.into_iter().collect())
    }
}

fn parse_recipe(recipe: &str) -> Result<(usize, Vec<ClassRequirement>)> {
    let bad = |reason: &str| Error::BadRecipe { recipe: recipe.to_string(), reason: reason.to_string() };

    let mut tokens = recipe.split_whitespace();
    let length: usize = tokens
        .next()
        .ok_or_else(|| bad("empty recipe"))?
        .parse()
        .map_err(|_| bad("expected a length as the first token"))?;

    let mut requirements = Vec::new();
    for token in tokens {
        let split_at = token
            .find(|c: char| c.is_alphabetic())
            .ok_or_else(|| bad(&format!("malformed class token `{token}`")))?;
        let (count_str, rest) = token.split_at(split_at);
        let count: usize = count_str.parse().map_err(|_| bad(&format!("bad count in `{token}`")))?;
        let mut chars = rest.chars();
        let class = chars.next().ok_or_else(|| bad(&format!("malformed class token `{token}`")))?;
        let alphabet = match class {
            'l' => Alphabet::Literal(LOWERCASE.to_string()),
            'u' => Alphabet::Literal(UPPERCASE.to_string()),
            'd' => Alphabet::Literal(DIGITS.to_string()),
            's' => Alphabet::Literal(SYMBOLS.to_string()),
            'c' => {
                let literal: String = chars.collect();
                if literal.is_empty() {
                    return Err(bad(&format!("`c` class in `{token}` has no characters")));
                }
                Alphabet::Literal(literal)
            },
            other => return Err(bad(&format!("unknown recipe class `{other}`"))),
        };
        requirements.push(ClassRequirement { count, alphabet });
    }

    Ok((length, requirements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn produces_length_and_honors_class_minimums() {
        let gen = PasswordRecipe::new("12 2u 2d 2s");
        let mut stream = Seed::new("master", "account", "field").stream();
        let value = gen.materialize(&mut stream, "account.field").unwrap();
        assert_eq!(value.chars().count(), 12);
        assert!(value.chars().filter(|c| c.is_ascii_uppercase()).count() >= 2);
        assert!(value.chars().filter(|c| c.is_ascii_digit()).count() >= 2);
        assert!(value.chars().filter(|c| SYMBOLS.contains(*c)).count() >= 2);
    }

    #[test]
    fn literal_c_class_uses_only_its_chars() {
        let gen = PasswordRecipe::new("6 6c!@#");
        let mut stream = Seed::new("m", "a", "f").stream();
        let value = gen.materialize(&mut stream, "a.f").unwrap();
        assert!(value.chars().all(|c| "!@#".contains(c)));
    }

    #[test]
    fn rejects_recipes_whose_classes_exceed_length() {
        let gen = PasswordRecipe::new("4 3u 3d");
        let mut stream = Seed::new("m", "a", "f").stream();
        assert!(matches!(gen.materialize(&mut stream, "a.f"), Err(Error::BadRecipe { .. })));
    }

    #[test]
    fn is_deterministic() {
        let gen = PasswordRecipe::new("12 2u 2d 2s");
        let a = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        let b = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        assert_eq!(a, b);
    }
}
