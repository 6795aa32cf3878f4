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

//! Value concealment: obscurers wrap a literal so an account file doesn't carry it in the clear.
//! Unlike generators, obscurers don't derive anything from the seed engine; revealing one is a
//! decode or decrypt of material already present in the file.

pub mod envelope;
pub mod gpg;
pub mod hidden;
pub mod hide;
pub mod scrypt_obscure;

pub use envelope::{EnvelopeAdapter, GpgArmor, GpgEnvelope, InMemoryEnvelope};
pub use gpg::Gpg;
pub use hidden::Hidden;
pub use hide::Hide;
pub use scrypt_obscure::ScryptObscurer;

use crate::error::Result;

/// Whatever a caller needs to reveal an obscured field or materialize a generator. Most obscurers
/// need nothing; `Gpg` needs an envelope adapter, `Scrypt` needs a passphrase or user key. A
/// context missing what a particular obscurer requires surfaces as a `Missing*` error from that
/// obscurer's `reveal`.
///
/// `extra_seed` and `stealth_account_seed` carry the two pieces of seed material a caller can only
/// supply at lookup time rather than in the account file: an extra fragment folded into every
/// generator's seed for this call (for deriving an alternate secret without editing the account),
/// and the account seed for a stealth account, which by definition stores none of its own.
pub struct RevealContext<'a> {
    pub envelope: Option<&'a dyn EnvelopeAdapter>,
    pub scrypt_passphrase: Option<&'a str>,
    pub scrypt_user_key: Option<&'a [u8]>,
    pub extra_seed: Option<&'a str>,
    pub stealth_account_seed: Option<&'a str>,
}

impl<'a> RevealContext<'a> {
    pub fn none() -> Self {
        RevealContext { envelope: None, scrypt_passphrase: None, scrypt_user_key: None, extra_seed: None, stealth_account_seed: None }
    }

    pub fn with_envelope(envelope: &'a dyn EnvelopeAdapter) -> Self {
        RevealContext { envelope: Some(envelope), scrypt_passphrase: None, scrypt_user_key: None, extra_seed: None, stealth_account_seed: None }
    }

    pub fn with_passphrase(passphrase: &'a str) -> Self {
        RevealContext { envelope: None, scrypt_passphrase: Some(passphrase), scrypt_user_key: None, extra_seed: None, stealth_account_seed: None }
    }

    pub fn with_extra_seed(mut self, extra_seed: &'a str) -> Self {
        self.extra_seed = Some(extra_seed);
        self
    }

    pub fn with_stealth_account_seed(mut self, account_seed: &'a str) -> Self {
        self.stealth_account_seed = Some(account_seed);
        self
    }
}

/// The closed set of concealment strategies a field value may wrap.
#[derive(Debug, Clone)]
pub enum Obscurer {
    Hide(Hide),
    Hidden(Hidden),
    Gpg(Gpg),
    Scrypt(ScryptObscurer),
}

impl Obscurer {
    pub fn reveal(&self, ctx: &RevealContext) -> Result<String> {
        match self {
            Obscurer::Hide(hide) => Ok(hide.reveal()),
            Obscurer::Hidden(hidden) => hidden.reveal(),
            Obscurer::Gpg(gpg) => {
                let envelope = ctx.envelope.ok_or(crate::error::Error::MissingEnvelopeAdapter)?;
                gpg.reveal(envelope)
            },
            Obscurer::Scrypt(scrypt) => {
                if let Some(passphrase) = ctx.scrypt_passphrase {
                    scrypt.reveal_with_passphrase(passphrase)
                } else if let Some(key) = ctx.scrypt_user_key {
                    scrypt.reveal_with_user_key(key)
                } else {
                    Err(crate::error::Error::MissingScryptKey)
                }
            },
        }
    }

    /// Whether revealing this obscurer requires material the caller might not have on hand.
    pub fn needs_secret(&self) -> bool {
        matches!(self, Obscurer::Gpg(_) | Obscurer::Scrypt(_))
    }

    /// Whether the revealed plaintext should be treated as sensitive. Every obscurer is secret
    /// except a `Hide` explicitly flagged `secure=false`.
    pub fn is_secret(&self) -> bool {
        match self {
            Obscurer::Hide(hide) => hide.secure,
            Obscurer::Hidden(_) | Obscurer::Gpg(_) | Obscurer::Scrypt(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hide_needs_no_secret() {
        let obscurer = Obscurer::Hide(Hide::new("plain"));
        assert!(!obscurer.needs_secret());
        assert_eq!(obscurer.reveal(&RevealContext::none()).unwrap(), "plain");
    }

    #[test]
    fn gpg_without_an_envelope_fails_clearly() {
        let obscurer = Obscurer::Gpg(Gpg::new(b"armor".to_vec()));
        assert!(obscurer.needs_secret());
        assert!(matches!(obscurer.reveal(&RevealContext::none()), Err(crate::error::Error::MissingEnvelopeAdapter)));
    }

    #[test]
    fn scrypt_without_a_key_fails_clearly() {
        let scrypt = ScryptObscurer::encrypt_with_passphrase("secret", "pass").unwrap();
        let obscurer = Obscurer::Scrypt(scrypt);
        assert!(matches!(obscurer.reveal(&RevealContext::none()), Err(crate::error::Error::MissingScryptKey)));
        assert_eq!(obscurer.reveal(&RevealContext::with_passphrase("pass")).unwrap(), "secret");
    }
}
