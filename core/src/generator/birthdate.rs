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

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};
use crate::seed::SeedStream;

/// `BirthDate(year, min_age, max_age, format)` — an arbitrary date within `[min_age, max_age]`
/// years before `year`, rendered with `format` (a `chrono` strftime string).
#[derive(Debug, Clone)]
pub struct BirthDate {
    pub year: i32,
    pub min_age: u32,
    pub max_age: u32,
    pub format: String,
}

impl Default for BirthDate {
    fn default() -> Self {
        BirthDate { year: 2000, min_age: 18, max_age: 65, format: "%Y-%m-%d".to_string() }
    }
}

impl BirthDate {
    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<String> {
        if self.min_age > self.max_age {
            return Err(Error::BadRecipe {
                recipe: culprit.to_string(),
                reason: "min_age is greater than max_age".to_string(),
            });
        }
        let age_span = (self.max_age - self.min_age) as u64 + 1;
        let age = self.min_age as u64 + stream.draw_below(age_span, crate::seed::bits_for(age_span), culprit)?;
        let birth_year = self.year - age as i32;

        let is_leap = NaiveDate::from_ymd_opt(birth_year, 12, 31)
            .map(|d| d.ordinal() == 366)
            .unwrap_or(false);
        let days_in_year = if is_leap { 366u64 } else { 365u64 };
        let day_of_year = 1 + stream.draw_below(days_in_year, crate::seed::bits_for(days_in_year), culprit)?;

        let date = NaiveDate::from_yo_opt(birth_year, day_of_year as u32)
            .ok_or_else(|| Error::BadRecipe { recipe: culprit.to_string(), reason: "computed an invalid date".to_string() })?;

        Ok(date.format(&self.format).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;
    use chrono::Datelike;

    #[test]
    fn age_falls_within_the_requested_window() {
        let gen = BirthDate { year: 2020, min_age: 18, max_age: 65, format: "%Y-%m-%d".to_string() };
        let mut stream = Seed::new("master", "account", "field").stream();
        let value = gen.materialize(&mut stream, "account.field").unwrap();
        let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d").unwrap();
        let age = 2020 - date.year();
        assert!((18..=65).contains(&age));
    }

    #[test]
    fn is_deterministic() {
        let gen = BirthDate::default();
        let a = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        let b = gen.materialize(&mut Seed::new("m", "a", "f").stream(), "a.f").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_inverted_age_window() {
        let gen = BirthDate { min_age: 80, max_age: 10, ..BirthDate::default() };
        let mut stream = Seed::new("m", "a", "f").stream();
        assert!(gen.materialize(&mut stream, "a.f").is_err());
    }
}
