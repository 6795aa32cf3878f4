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

//! The public surface of the crate: wires the loader, account model, discovery engine and
//! archive together behind a handful of entry points. Everything here is a thin composition over
//! the lower-level modules; a caller who needs finer control is free to use those directly.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::account::{Account, AccountValue};
use crate::archive::Archive;
use crate::discovery::{discover_excluding_stealth, DiscoveryEntry, DiscoveryMatch, Environment};
use crate::error::{Error, Result};
use crate::loader::{self, LoadWarning};
use crate::obscure::envelope::EnvelopeAdapter;
use crate::obscure::RevealContext;
use crate::settings::Settings;
use crate::wordlist::Wordlist;

pub const LOG_TARGET: &str = "keyforge::core::facade";

/// The loaded state an interactive session (or a single CLI invocation) operates on: every
/// account under `settings.accounts_dir`, plus whatever non-fatal problems surfaced while loading
/// them.
pub struct Engine {
    pub settings: Settings,
    pub accounts: Vec<Account>,
    pub warnings: Vec<LoadWarning>,
    wordlist: Arc<Wordlist>,
}

impl Engine {
    /// Loads every account under `settings.accounts_dir`, or, when `settings.accounts_files`
    /// points at an index file, exactly the files it lists. Either way, logs (but doesn't fail on)
    /// any warning the loader surfaces.
    pub fn open(settings: Settings, adapter: &dyn EnvelopeAdapter) -> Result<Self> {
        let wordlist = Arc::new(Wordlist::default_list());
        let result = match &settings.accounts_files {
            Some(index_path) => {
                let paths = loader::read_accounts_index(index_path)?;
                loader::load_files(&paths, adapter, &wordlist, settings.account_file_mask, settings.auto_tighten_permissions)?
            },
            None => loader::load_directory(&settings.accounts_dir, adapter, &wordlist, settings.account_file_mask, settings.auto_tighten_permissions)?,
        };
        for warning in &result.warnings {
            warn!(target: LOG_TARGET, "{}: {}", warning.path.display(), warning.error);
        }
        if let Some(hashes_path) = &settings.hashes_path {
            for mismatch in loader::verify_hashes(&settings.accounts_dir, hashes_path)? {
                warn!(target: LOG_TARGET, "integrity hash check failed: {mismatch}");
            }
        }
        let source = settings.accounts_files.as_deref().unwrap_or(&settings.accounts_dir);
        info!(target: LOG_TARGET, "loaded {} accounts from {}", result.accounts.len(), source.display());
        Ok(Engine { settings, accounts: result.accounts, warnings: result.warnings, wordlist })
    }

    pub fn all_accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Looks an account up by its canonical name or one of its aliases.
    pub fn get_account(&self, name: &str) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.identity == name || a.aliases.iter().any(|alias| alias == name))
            .ok_or_else(|| Error::UnknownAccount(name.to_string()))
    }

    /// Resolves and materializes a single scalar field, failing with `CompositeNotScalar` if
    /// `path` names a sequence or mapping rather than a leaf value.
    pub fn get_value(&self, account: &str, path: &str, ctx: &RevealContext) -> Result<AccountValue> {
        self.get_account(account)?.get_value(path, ctx)
    }

    /// Returns the whole structured subtree under a top-level field name, or `None` if the
    /// account has no such field.
    pub fn get_composite(&self, account: &str, name: &str, ctx: &RevealContext) -> Result<Option<serde_json::Value>> {
        self.get_account(account)?.get_composite(name, ctx)
    }

    /// Finds the single account whose recognizers best match `env`, excluding stealth accounts,
    /// and returns it paired with the winning recognizer's script.
    pub fn discover(&self, recognizers: &[DiscoveryEntry], env: &Environment) -> Result<(&Account, DiscoveryMatch)> {
        let matched = discover_excluding_stealth(recognizers, &self.accounts, env)?;
        let account = self.get_account(&matched.account)?;
        Ok((account, matched))
    }

    /// Builds a fresh archive snapshot of every visible field on every loaded account.
    pub fn build_archive(&self, ctx: &RevealContext) -> Result<Archive> {
        Archive::build(&self.accounts, ctx)
    }

    /// Writes a fresh archive to `path`, rotating any existing archive out of the way first.
    pub fn write_archive(&self, path: &Path, ctx: &RevealContext) -> Result<Archive> {
        let archive = self.build_archive(ctx)?;
        archive.write_atomically(path)?;
        Ok(archive)
    }

    pub fn wordlist(&self) -> &Arc<Wordlist> {
        &self.wordlist
    }
}

/// NATO-style phonetic spelling, so a value can be read aloud over a phone call without
/// ambiguity between similar-sounding letters.
const PHONETIC: [(char, &str); 26] = [
    ('a', "Alpha"),
    ('b', "Bravo"),
    ('c', "Charlie"),
    ('d', "Delta"),
    ('e', "Echo"),
    ('f', "Foxtrot"),
    ('g', "Golf"),
    ('h', "Hotel"),
    ('i', "India"),
    ('j', "Juliett"),
    ('k', "Kilo"),
    ('l', "Lima"),
    ('m', "Mike"),
    ('n', "November"),
    ('o', "Oscar"),
    ('p', "Papa"),
    ('q', "Quebec"),
    ('r', "Romeo"),
    ('s', "Sierra"),
    ('t', "Tango"),
    ('u', "Uniform"),
    ('v', "Victor"),
    ('w', "Whiskey"),
    ('x', "X-ray"),
    ('y', "Yankee"),
    ('z', "Zulu"),
];

/// Spells `value` out phonetically, one word per character. Digits and punctuation are passed
/// through as themselves, spaced the same way letters are.
pub fn render_phonetic(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            let lower = c.to_ascii_lowercase();
            match PHONETIC.iter().find(|(letter, _)| *letter == lower) {
                Some((_, word)) if c.is_uppercase() => format!("{} (upper)", word),
                Some((_, word)) => word.to_string(),
                None => c.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phonetic_rendering_spells_out_letters_and_passes_through_digits() {
        assert_eq!(render_phonetic("a1"), "Alpha 1");
    }

    #[test]
    fn phonetic_rendering_flags_uppercase_letters() {
        assert_eq!(render_phonetic("A"), "Alpha (upper)");
    }
}
