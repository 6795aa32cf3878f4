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

use base64::Engine;

use crate::error::{Error, Result};

/// The text encoding a [`Hidden`] obscurer decodes into after base64 decoding. Only `Utf8` is
/// reachable today; the field exists because the format admits other encodings and a future
/// account file may ask for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Utf8
    }
}

/// `Hidden(base64, encoding)` — a base64-obscured literal. Defeats casual shoulder-surfing of an
/// account file without claiming to be encryption.
#[derive(Debug, Clone)]
pub struct Hidden {
    pub base64: String,
    pub encoding: TextEncoding,
}

impl Hidden {
    pub fn encode(plaintext: &str) -> Self {
        Hidden { base64: base64::engine::general_purpose::STANDARD.encode(plaintext), encoding: TextEncoding::Utf8 }
    }

    pub fn reveal(&self) -> Result<String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.base64.as_bytes())
            .map_err(|e| Error::DecryptionFailed(format!("invalid base64 in Hidden value: {e}")))?;
        match self.encoding {
            TextEncoding::Utf8 => String::from_utf8(bytes).map_err(|e| Error::DecryptionFailed(format!("Hidden value is not valid utf-8: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_base64() {
        let hidden = Hidden::encode("swordfish");
        assert_eq!(hidden.reveal().unwrap(), "swordfish");
    }

    #[test]
    fn rejects_invalid_base64() {
        let hidden = Hidden { base64: "not valid base64!!".to_string(), encoding: TextEncoding::Utf8 };
        assert!(hidden.reveal().is_err());
    }
}
