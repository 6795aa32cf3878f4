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

//! The generator family: deterministic producers of secrets from a [`crate::seed::SeedStream`].
//!
//! Generators are modeled as a closed enum rather than a trait object, dispatched from
//! [`Generator::materialize`]. Each variant's evaluation logic lives in its own submodule, one
//! generator per file.

mod birthdate;
mod mixed_password;
mod otp;
mod passphrase;
mod password;
mod pin;
mod question;
mod recipe;
mod write_file;

pub use birthdate::BirthDate;
pub use mixed_password::{MixedPassword, MixedPasswordPart};
pub use otp::Otp;
pub use passphrase::Passphrase;
pub use password::Password;
pub use pin::Pin;
pub use question::Question;
pub use recipe::PasswordRecipe;
pub use write_file::WriteFile;

use crate::error::Result;
use crate::seed::SeedStream;

/// The outcome of materializing a generator: either a plain secret string, or a side effect
/// (only [`Generator::WriteFile`] produces one) paired with its user-visible acknowledgement.
pub enum Materialized {
    Value(String),
    SideEffect { ack: String, path: std::path::PathBuf, content: Vec<u8>, mode: u32 },
}

impl Materialized {
    /// Unwraps a plain value, discarding the filesystem details if this was instead a
    /// [`WriteFile`] side effect (its acknowledgement string is returned in that case).
    pub fn into_value(self) -> String {
        match self {
            Materialized::Value(v) => v,
            Materialized::SideEffect { ack, .. } => ack,
        }
    }
}

/// The closed family of generators, parameterized and dispatched as a single enum.
#[derive(Debug, Clone)]
pub enum Generator {
    Password(Password),
    Passphrase(Passphrase),
    Pin(Pin),
    Question(Question),
    MixedPassword(MixedPassword),
    PasswordRecipe(PasswordRecipe),
    BirthDate(BirthDate),
    Otp(Otp),
    WriteFile(WriteFile),
}

impl Generator {
    /// Produces the deterministic value for this generator, drawing from a fresh 512-bit-budgeted
    /// `stream` scoped to `culprit` (an `account.field` style path used in entropy-exhaustion
    /// errors).
    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<Materialized> {
        match self {
            Generator::Password(g) => g.materialize(stream, culprit).map(Materialized::Value),
            Generator::Passphrase(g) => g.materialize(stream, culprit).map(Materialized::Value),
            Generator::Pin(g) => g.materialize(stream, culprit).map(Materialized::Value),
            Generator::Question(g) => g.materialize(stream, culprit).map(Materialized::Value),
            Generator::MixedPassword(g) => g.materialize(stream, culprit).map(Materialized::Value),
            Generator::PasswordRecipe(g) => g.materialize(stream, culprit).map(Materialized::Value),
            Generator::BirthDate(g) => g.materialize(stream, culprit).map(Materialized::Value),
            Generator::Otp(g) => g.materialize().map(Materialized::Value),
            Generator::WriteFile(g) => g.materialize(stream, culprit),
        }
    }

    /// An explicit action object for `WriteFile`'s filesystem side effect, so tests can
    /// intercept it instead of performing the write. Returns `None` for pure generators.
    pub fn side_effect(&self, stream: &mut SeedStream, culprit: &str) -> Result<Option<(std::path::PathBuf, Vec<u8>, u32)>> {
        if let Generator::WriteFile(g) = self {
            if let Materialized::SideEffect { path, content, mode, .. } = g.materialize(stream, culprit)? {
                return Ok(Some((path, content, mode)));
            }
        }
        Ok(None)
    }
}
