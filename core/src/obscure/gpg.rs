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

use crate::error::{Error, Result};
use crate::obscure::envelope::EnvelopeAdapter;

/// `GPG(ciphertext)` — an asymmetrically-encrypted literal, revealed by handing the stored armor
/// to an [`EnvelopeAdapter`]. `reveal` itself only ever returns the flat decrypted string; a
/// caller that wants the "plaintext may itself be a nested value" behavior the account file format
/// allows re-parses it as a TOML document (see [`crate::account::Account::materialize`], which
/// does exactly this for a `FieldValue::Obscurer(Obscurer::Gpg(..))`).
#[derive(Debug, Clone)]
pub struct Gpg {
    pub ciphertext: Vec<u8>,
}

impl Gpg {
    pub fn new(ciphertext: Vec<u8>) -> Self {
        Gpg { ciphertext }
    }

    pub fn reveal(&self, adapter: &dyn EnvelopeAdapter) -> Result<String> {
        let plaintext = adapter.decrypt(&self.ciphertext)?;
        String::from_utf8(plaintext).map_err(|e| Error::DecryptionFailed(format!("gpg plaintext is not valid utf-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obscure::envelope::InMemoryEnvelope;

    #[test]
    fn round_trips_through_the_envelope_adapter() {
        let adapter = InMemoryEnvelope;
        let armor = adapter.encrypt(b"buried treasure", &[], None).unwrap();
        let gpg = Gpg::new(armor);
        assert_eq!(gpg.reveal(&adapter).unwrap(), "buried treasure");
    }

    #[test]
    fn wrong_adapter_state_surfaces_as_decryption_failure() {
        let gpg = Gpg::new(b"not actually an envelope".to_vec());
        let adapter = InMemoryEnvelope;
        assert!(gpg.reveal(&adapter).is_err());
    }
}
