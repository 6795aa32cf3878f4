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

use super::passphrase::draw_words;
use crate::error::Result;
use crate::seed::SeedStream;
use crate::wordlist::Wordlist;

/// `Question(text, length=3)` — a security-question answer generated as a passphrase, with the
/// question text (lower-cased) mixed into the seed via [`Question::seed_version`] so that two
/// differently-worded questions on the same account never share an answer.
///
/// If the account file supplies a literal `answer`, that value is returned verbatim and no seed
/// bits are consumed.
#[derive(Clone)]
pub struct Question {
    pub text: String,
    pub length: usize,
    pub wordlist: Arc<Wordlist>,
    pub sep: String,
    pub answer: Option<String>,
}

impl std::fmt::Debug for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Question")
            .field("text", &self.text)
            .field("length", &self.length)
            .field("answer_is_literal", &self.answer.is_some())
            .finish()
    }
}

impl Question {
    pub fn new(text: impl Into<String>, wordlist: Arc<Wordlist>) -> Self {
        Question { text: text.into(), length: 3, wordlist, sep: " ".to_string(), answer: None }
    }

    /// The seed `version` fragment this question contributes: its lower-cased text.
    pub fn seed_version(&self) -> String {
        self.text.to_ascii_lowercase()
    }

    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<String> {
        if let Some(answer) = &self.answer {
            return Ok(answer.clone());
        }
        draw_words(&self.wordlist, self.length, &self.sep, stream, culprit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn literal_answer_bypasses_the_stream() {
        let mut q = Question::new("What street did you grow up on?", Arc::new(Wordlist::default_list()));
        q.answer = Some("Maple Avenue".to_string());
        let mut stream = Seed::new("m", "a", "f").stream();
        assert_eq!(q.materialize(&mut stream, "a.f").unwrap(), "Maple Avenue");
        assert_eq!(stream.bits_consumed(), 0);
    }

    #[test]
    fn different_question_text_changes_the_answer() {
        let wordlist = Arc::new(Wordlist::default_list());
        let q1 = Question::new("What street did you grow up on?", wordlist.clone());
        let q2 = Question::new("What was your first pet's name?", wordlist);

        let mut s1 = Seed::new("master", "account", "questions").with_version(q1.seed_version()).stream();
        let mut s2 = Seed::new("master", "account", "questions").with_version(q2.seed_version()).stream();

        assert_ne!(q1.materialize(&mut s1, "account.questions").unwrap(), q2.materialize(&mut s2, "account.questions").unwrap());
    }

    #[test]
    fn default_length_is_three_words() {
        let q = Question::new("text", Arc::new(Wordlist::default_list()));
        let mut stream = Seed::new("m", "a", "f").stream();
        let answer = q.materialize(&mut stream, "a.f").unwrap();
        assert_eq!(answer.split(' ').count(), 3);
    }
}
