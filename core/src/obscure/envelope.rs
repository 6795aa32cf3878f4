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

//! A thin abstraction around the system GPG/age-style tooling.
//!
//! Modeled as a trait rather than a concrete shell-out, so tests can substitute an in-memory
//! fake instead of invoking a real `gpg` binary.

use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `encrypt`/`decrypt` for asymmetric recipients, and `symmetric_encrypt`/`symmetric_decrypt`
/// for passphrase-based envelopes. All operations may block on user pin entry when
/// backed by a real `gpg` subprocess.
///
/// The encrypting operations take the file `target` the ciphertext is destined for (when known),
/// so an adapter whose armor policy is extension-sensitive (see [`GpgArmor::Extension`]) can
/// decide whether to armor without the caller having to resolve that policy itself.
pub trait EnvelopeAdapter {
    fn encrypt(&self, plaintext: &[u8], recipients: &[String], target: Option<&Path>) -> Result<Vec<u8>>;
    fn decrypt(&self, armor: &[u8]) -> Result<Vec<u8>>;
    fn symmetric_encrypt(&self, plaintext: &[u8], passphrase: &str, target: Option<&Path>) -> Result<Vec<u8>>;
    fn symmetric_decrypt(&self, armor: &[u8], passphrase: &str) -> Result<Vec<u8>>;
}

/// The `gpg_armor` config key's value space: whether to request `--armor` (ASCII-armored,
/// rather than binary, ciphertext) when encrypting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpgArmor {
    /// Always pass `--armor`.
    Always,
    /// Never pass `--armor`; ciphertext is written binary.
    Never,
    /// Armor exactly when the target path's extension is `.asc`, the conventional marker for
    /// armored GPG output. A target-less encrypt (no destination file known yet) armors, since
    /// ASCII output is the safer default for a destination that can't be checked.
    Extension,
}

impl GpgArmor {
    pub fn wants_armor(&self, target: Option<&Path>) -> bool {
        match self {
            GpgArmor::Always => true,
            GpgArmor::Never => false,
            GpgArmor::Extension => target
                .and_then(|p| p.extension())
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("asc"))
                .unwrap_or(true),
        }
    }
}

/// Shells out to the configured `gpg` executable, driven by the `gpg_executable`, `gpg_home`,
/// and `gpg_armor` settings.
#[derive(Debug, Clone)]
pub struct GpgEnvelope {
    pub executable: String,
    pub home: Option<String>,
    pub armor: GpgArmor,
}

impl Default for GpgEnvelope {
    fn default() -> Self {
        GpgEnvelope { executable: "gpg".to_string(), home: None, armor: GpgArmor::Always }
    }
}

impl GpgEnvelope {
    fn base_command(&self, target: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("--batch").arg("--quiet").arg("--yes");
        if let Some(home) = &self.home {
            cmd.arg("--homedir").arg(home);
        }
        if self.armor.wants_armor(target) {
            cmd.arg("--armor");
        }
        cmd
    }

    fn run(&self, mut cmd: Command, input: &[u8]) -> Result<Vec<u8>> {
        use std::io::Write;

        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| Error::EncryptionFailed(format!("failed to spawn gpg: {e}")))?;
        child
            .stdin
            .take()
            .expect("piped stdin")
            .write_all(input)
            .map_err(|e| Error::EncryptionFailed(format!("failed to write to gpg stdin: {e}")))?;
        let output = child.wait_with_output().map_err(|e| Error::EncryptionFailed(format!("gpg did not exit cleanly: {e}")))?;
        if !output.status.success() {
            return Err(Error::DecryptionFailed(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(output.stdout)
    }
}

impl EnvelopeAdapter for GpgEnvelope {
    fn encrypt(&self, plaintext: &[u8], recipients: &[String], target: Option<&Path>) -> Result<Vec<u8>> {
        let mut cmd = self.base_command(target);
        cmd.arg("--encrypt");
        for recipient in recipients {
            cmd.arg("--recipient").arg(recipient);
        }
        self.run(cmd, plaintext)
    }

    fn decrypt(&self, armor: &[u8]) -> Result<Vec<u8>> {
        let mut cmd = self.base_command(None);
        cmd.arg("--decrypt");
        self.run(cmd, armor)
    }

    fn symmetric_encrypt(&self, plaintext: &[u8], passphrase: &str, target: Option<&Path>) -> Result<Vec<u8>> {
        let mut cmd = self.base_command(target);
        cmd.arg("--symmetric").arg("--passphrase").arg(passphrase).arg("--pinentry-mode").arg("loopback");
        self.run(cmd, plaintext)
    }

    fn symmetric_decrypt(&self, armor: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        let mut cmd = self.base_command(None);
        cmd.arg("--decrypt").arg("--passphrase").arg(passphrase).arg("--pinentry-mode").arg("loopback");
        self.run(cmd, armor)
    }
}

/// An in-memory envelope used by tests (and by hosts without a real GPG install) backed by
/// ChaCha20-Poly1305 instead of shelling out. Recipients are ignored; this exists purely to make
/// the obscurer round-trip invariant testable without process spawning.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnvelope;

impl EnvelopeAdapter for InMemoryEnvelope {
    fn encrypt(&self, plaintext: &[u8], _recipients: &[String], target: Option<&Path>) -> Result<Vec<u8>> {
        self.symmetric_encrypt(plaintext, "in-memory-envelope-key", target)
    }

    fn decrypt(&self, armor: &[u8]) -> Result<Vec<u8>> {
        self.symmetric_decrypt(armor, "in-memory-envelope-key")
    }

    fn symmetric_encrypt(&self, plaintext: &[u8], passphrase: &str, _target: Option<&Path>) -> Result<Vec<u8>> {
        crate::obscure::scrypt_obscure::encrypt_with_passphrase(plaintext, passphrase)
    }

    fn symmetric_decrypt(&self, armor: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        crate::obscure::scrypt_obscure::decrypt_with_passphrase(armor, passphrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_policy_armors_dot_asc_targets_only() {
        assert!(GpgArmor::Extension.wants_armor(Some(Path::new("secret.asc"))));
        assert!(!GpgArmor::Extension.wants_armor(Some(Path::new("secret.gpg"))));
    }

    #[test]
    fn extension_policy_armors_when_target_is_unknown() {
        assert!(GpgArmor::Extension.wants_armor(None));
    }

    #[test]
    fn always_and_never_ignore_the_target() {
        assert!(GpgArmor::Always.wants_armor(Some(Path::new("secret.gpg"))));
        assert!(!GpgArmor::Never.wants_armor(Some(Path::new("secret.asc"))));
    }
}
