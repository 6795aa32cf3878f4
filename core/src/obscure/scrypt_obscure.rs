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

//! scrypt-keyed symmetric encryption shared by the [`super::Obscurer::Scrypt`] obscurer and the
//! in-memory stand-in envelope used by tests.
//!
//! Wire format: `salt(16) || nonce(12) || ciphertext`, all stored together so decryption needs
//! only the passphrase/user-key and the blob.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;
use scrypt::Params;

use crate::error::{Error, Result};

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Conservative scrypt cost parameters: a 32KiB..32MiB-scale N so an interactive reveal stays
/// fast while a brute-force attempt stays expensive.
fn scrypt_params() -> Params {
    Params::new(15, 8, 1, 32).expect("static scrypt parameters are valid")
}

fn derive_key(secret: &[u8], salt: &[u8]) -> Result<[u8; 32]> {
    let mut key = [0u8; 32];
    scrypt::scrypt(secret, salt, &scrypt_params(), &mut key).map_err(|e| Error::EncryptionFailed(e.to_string()))?;
    Ok(key)
}

fn encrypt(plaintext: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);

    let key_bytes = derive_key(secret, &salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key_bytes));
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher.encrypt(nonce, plaintext).map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

fn decrypt(blob: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < SALT_LEN + NONCE_LEN {
        return Err(Error::DecryptionFailed("ciphertext shorter than salt+nonce header".to_string()));
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key_bytes = derive_key(secret, salt)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key_bytes));
    let nonce = Nonce::from_slice(nonce_bytes);
    cipher.decrypt(nonce, ciphertext).map_err(|e| Error::DecryptionFailed(e.to_string()))
}

pub fn encrypt_with_passphrase(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    encrypt(plaintext, passphrase.as_bytes())
}

pub fn decrypt_with_passphrase(blob: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    decrypt(blob, passphrase.as_bytes())
}

/// Encrypts with a raw key instead of a passphrase, for callers holding a key file rather than a
/// user-typed secret.
pub fn encrypt_with_user_key(plaintext: &[u8], user_key: &[u8]) -> Result<Vec<u8>> {
    encrypt(plaintext, user_key)
}

pub fn decrypt_with_user_key(blob: &[u8], user_key: &[u8]) -> Result<Vec<u8>> {
    decrypt(blob, user_key)
}

/// `Scrypt(blob)` — a symmetrically-encrypted literal using the wire format above. Revealed with
/// either a user passphrase or a raw user key, matching the two entry points config exposes
/// (`scrypt_passphrase` vs. a key file).
#[derive(Debug, Clone)]
pub struct ScryptObscurer {
    pub blob: Vec<u8>,
}

impl ScryptObscurer {
    pub fn encrypt_with_passphrase(plaintext: &str, passphrase: &str) -> Result<Self> {
        Ok(ScryptObscurer { blob: encrypt_with_passphrase(plaintext.as_bytes(), passphrase)? })
    }

    pub fn reveal_with_passphrase(&self, passphrase: &str) -> Result<String> {
        let bytes = decrypt_with_passphrase(&self.blob, passphrase)?;
        String::from_utf8(bytes).map_err(|e| Error::DecryptionFailed(format!("scrypt plaintext is not valid utf-8: {e}")))
    }

    pub fn reveal_with_user_key(&self, user_key: &[u8]) -> Result<String> {
        let bytes = decrypt_with_user_key(&self.blob, user_key)?;
        String::from_utf8(bytes).map_err(|e| Error::DecryptionFailed(format!("scrypt plaintext is not valid utf-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_utf8() {
        let plaintext = "correct horse battery staple — 正しい馬".as_bytes();
        let blob = encrypt_with_passphrase(plaintext, "hunter2").unwrap();
        let recovered = decrypt_with_passphrase(&blob, "hunter2").unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn wrong_passphrase_fails_to_decrypt() {
        let blob = encrypt_with_passphrase(b"secret", "right").unwrap();
        assert!(decrypt_with_passphrase(&blob, "wrong").is_err());
    }

    #[test]
    fn each_encryption_uses_a_fresh_salt_and_nonce() {
        let a = encrypt_with_passphrase(b"same plaintext", "pass").unwrap();
        let b = encrypt_with_passphrase(b"same plaintext", "pass").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn obscurer_wrapper_round_trips_with_the_right_passphrase() {
        let obscurer = ScryptObscurer::encrypt_with_passphrase("swordfish", "hunter2").unwrap();
        assert_eq!(obscurer.reveal_with_passphrase("hunter2").unwrap(), "swordfish");
        assert!(obscurer.reveal_with_passphrase("wrong").is_err());
    }
}
