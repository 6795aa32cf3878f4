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

//! The error taxonomy shared by every component of the engine.
//!
//! Each leaf module raises its own narrow error type; this module collects them behind a single
//! [`Error`] enum so the facade and the CLI harness only need to match on one type. Every variant
//! carries an optional `culprit`: a dotted path identifying the offending account/field, never a
//! secret value.

use std::io;

use thiserror::Error;

pub const LOG_TARGET: &str = "keyforge::core::error";

/// The error taxonomy raised by any part of the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown account `{0}`")]
    UnknownAccount(String),

    #[error("unknown field `{field}` on account `{account}`")]
    UnknownField { account: String, field: String },

    #[error("path `{path}` on account `{account}` does not resolve to a scalar")]
    CompositeNotScalar { account: String, path: String },

    #[error("account name `{0}` is ambiguous")]
    AmbiguousName(String),

    #[error("no master seed is in scope for account `{0}`")]
    MasterSeedMissing(String),

    #[error("generator for `{culprit}` exhausted its entropy budget")]
    SecretExhausted { culprit: String },

    #[error("bad password recipe `{recipe}`: {reason}")]
    BadRecipe { recipe: String, reason: String },

    #[error("bad script token `{token}` in script for `{culprit}`")]
    BadScriptToken { token: String, culprit: String },

    #[error("bad path `{path}`: {reason}")]
    BadPath { path: String, reason: String },

    #[error("account file `{path}` has loose permissions ({mode:o})")]
    FilePermissionLoose { path: String, mode: u32 },

    #[error("archive at `{0}` is stale")]
    ArchiveStale(String),

    #[error("hash mismatch for fragment `{fragment}`: expected {expected}, got {actual}")]
    HashMismatch {
        fragment: String,
        expected: String,
        actual: String,
    },

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("user key is missing or unreadable")]
    UserKeyMissing,

    #[error("reveal requires an envelope adapter but none was supplied")]
    MissingEnvelopeAdapter,

    #[error("reveal requires a scrypt passphrase or user key but neither was supplied")]
    MissingScryptKey,

    #[error("no account could be discovered for the current environment")]
    NoAccountDiscovered,

    #[error("discovery is ambiguous between {0:?}")]
    DiscoveryAmbiguous(Vec<String>),

    #[error("i/o error: {0}")]
    IoFailure(#[from] io::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("duplicate account name `{0}` across account files")]
    DuplicateAccount(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The culprit chain for user-facing reporting, e.g. `bigbank.questions.1`.
    pub fn culprit(&self) -> Option<String> {
        match self {
            Error::UnknownAccount(a) => Some(a.clone()),
            Error::UnknownField { account, field } => Some(format!("{account}.{field}")),
            Error::CompositeNotScalar { account, path } => Some(format!("{account}.{path}")),
            Error::AmbiguousName(a) => Some(a.clone()),
            Error::MasterSeedMissing(a) => Some(a.clone()),
            Error::SecretExhausted { culprit } => Some(culprit.clone()),
            Error::BadScriptToken { culprit, .. } => Some(culprit.clone()),
            Error::BadPath { path, .. } => Some(path.clone()),
            Error::FilePermissionLoose { path, .. } => Some(path.clone()),
            Error::DuplicateAccount(a) => Some(a.clone()),
            _ => None,
        }
    }

    /// Whether this error kind is a non-terminating warning: loose permissions, a stale archive,
    /// or a hash mismatch are reported but do not abort the call that surfaced them.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Error::FilePermissionLoose { .. } | Error::ArchiveStale(_) | Error::HashMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
