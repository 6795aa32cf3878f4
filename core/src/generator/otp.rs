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

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// `OTP(secret, interval, digits)` — a time-based one-time password per RFC 6238, using
/// HMAC-SHA1. `secret` is canonical base32, with trailing `=` padding tolerated
///.
#[derive(Debug, Clone)]
pub struct Otp {
    pub secret: String,
    pub interval: u64,
    pub digits: u32,
}

impl Default for Otp {
    fn default() -> Self {
        Otp { secret: String::new(), interval: 30, digits: 6 }
    }
}

impl Otp {
    pub fn new(secret: impl Into<String>) -> Self {
        Otp { secret: secret.into(), ..Default::default() }
    }

    /// Generates the code for the current wall-clock time.
    pub fn materialize(&self) -> Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|_| Error::IoFailure(std::io::Error::new(std::io::ErrorKind::Other, "system clock before epoch")))?;
        self.materialize_at(now.as_secs())
    }

    /// Generates the code for an explicit Unix time, used by hosts that want to display the
    /// upcoming code and by tests that need a fixed instant.
    pub fn materialize_at(&self, unix_time: u64) -> Result<String> {
        let key = decode_base32(&self.secret)?;
        let counter = unix_time / self.interval;
        let code = hotp(&key, counter, self.digits)?;
        Ok(code)
    }
}

fn hotp(key: &[u8], counter: u64, digits: u32) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|e| Error::DecryptionFailed(e.to_string()))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = ((digest[offset] as u32 & 0x7f) << 24)
        | ((digest[offset + 1] as u32) << 16)
        | ((digest[offset + 2] as u32) << 8)
        | (digest[offset + 3] as u32);

    let modulus = 10u32.pow(digits);
    Ok(format!("{:0width$}", binary % modulus, width = digits as usize))
}

const BASE32_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Decodes canonical RFC 4648 base32 (upper-case, no hyphens), tolerating trailing `=` padding
/// and lower-case input.
fn decode_base32(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| *c != '=').collect();
    let cleaned = cleaned.to_ascii_uppercase();

    let mut bits: u64 = 0;
    let mut bit_count = 0u32;
    let mut out = Vec::with_capacity(cleaned.len() * 5 / 8);

    for c in cleaned.chars() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&b| b == c as u8)
            .ok_or_else(|| Error::BadPath { path: input.to_string(), reason: format!("`{c}` is not a valid base32 character") })?;
        bits = (bits << 5) | value as u64;
        bit_count += 5;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push((bits >> bit_count) as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 6238-style test vectors for the commonly cited base32 secret "JBSWY3DPEHPK3PXP".
    #[test]
    fn rfc6238_vector_at_time_59() {
        let otp = Otp::new("JBSWY3DPEHPK3PXP");
        assert_eq!(otp.materialize_at(59).unwrap(), "287082");
    }

    #[test]
    fn rfc6238_vector_at_time_1111111109() {
        let otp = Otp::new("JBSWY3DPEHPK3PXP");
        assert_eq!(otp.materialize_at(1_111_111_109).unwrap(), "081804");
    }

    #[test]
    fn tolerates_lowercase_and_padding() {
        let a = Otp::new("jbswy3dpehpk3pxp").materialize_at(59).unwrap();
        let b = Otp::new("JBSWY3DPEHPK3PXP===").materialize_at(59).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn changes_every_interval() {
        let otp = Otp::new("JBSWY3DPEHPK3PXP");
        assert_ne!(otp.materialize_at(0).unwrap(), otp.materialize_at(30).unwrap());
        assert_eq!(otp.materialize_at(0).unwrap(), otp.materialize_at(29).unwrap());
    }
}
