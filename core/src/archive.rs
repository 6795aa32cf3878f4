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

//! A canonical dump of every account's materialized fields, kept around so a user can tell what
//! changed the next time they regenerate it, and so they have an emergency offline copy of every
//! secret in the event the generation logic itself is ever lost.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::account::Account;
use crate::error::Result;
use crate::obscure::RevealContext;

/// One account's worth of materialized fields, field-ordered by name so the JSON dump is stable
/// byte-for-byte across runs whose underlying fields didn't change.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ArchivedAccount {
    pub account: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default, PartialEq, Eq)]
pub struct Archive {
    pub accounts: Vec<ArchivedAccount>,
}

impl Archive {
    /// Materializes every visible field of every account into a canonical, diffable snapshot.
    pub fn build(accounts: &[Account], ctx: &RevealContext) -> Result<Self> {
        let mut archived: Vec<ArchivedAccount> = accounts
            .iter()
            .map(|account| {
                let mut fields = BTreeMap::new();
                for name in account.visible_fields() {
                    fields.insert(name.to_string(), account.field_dump(name, ctx)?);
                }
                Ok(ArchivedAccount { account: account.identity.clone(), fields })
            })
            .collect::<Result<Vec<_>>>()?;
        archived.sort_by(|a, b| a.account.cmp(&b.account));
        Ok(Archive { accounts: archived })
    }

    /// Renders the archive as canonical, pretty-printed, UTF-8 JSON with stable key ordering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::error::Error::Config(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::error::Error::Config(e.to_string()))
    }

    /// Writes the archive to `path`, first rotating any existing file to `path.bak` and then
    /// writing the new content to a sibling temp file before renaming it into place, so a reader
    /// never observes a half-written archive.
    pub fn write_atomically(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        if path.exists() {
            let backup = path.with_extension("bak");
            fs::rename(path, backup)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json.as_bytes())?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// One unit of difference between two archives, at either account or field granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDiff {
    AccountAdded { account: String },
    AccountRemoved { account: String },
    Added { account: String, field: String, value: String },
    Removed { account: String, field: String },
    Changed { account: String, field: String, old: String, new: String },
}

/// Compares `old` against `new`, skipping any field named in `dynamic_fields` (fields that are
/// expected to change on every materialization, like an OTP, and so would otherwise drown out
/// every other diff). An account present in only one archive is reported once as added/removed
/// rather than field-by-field.
pub fn diff(old: &Archive, new: &Archive, dynamic_fields: &[String]) -> Vec<FieldDiff> {
    let mut out = Vec::new();
    let old_by_name: BTreeMap<&str, &ArchivedAccount> = old.accounts.iter().map(|a| (a.account.as_str(), a)).collect();
    let new_by_name: BTreeMap<&str, &ArchivedAccount> = new.accounts.iter().map(|a| (a.account.as_str(), a)).collect();

    for name in new_by_name.keys() {
        if !old_by_name.contains_key(name) {
            out.push(FieldDiff::AccountAdded { account: name.to_string() });
        }
    }
    for name in old_by_name.keys() {
        if !new_by_name.contains_key(name) {
            out.push(FieldDiff::AccountRemoved { account: name.to_string() });
        }
    }

    for (name, new_account) in &new_by_name {
        let Some(old_account) = old_by_name.get(name) else { continue };
        for (field, new_value) in &new_account.fields {
            if dynamic_fields.iter().any(|d| d == field) {
                continue;
            }
            match old_account.fields.get(field) {
                None => out.push(FieldDiff::Added { account: name.to_string(), field: field.clone(), value: new_value.clone() }),
                Some(old_value) if old_value != new_value => out.push(FieldDiff::Changed {
                    account: name.to_string(),
                    field: field.clone(),
                    old: old_value.clone(),
                    new: new_value.clone(),
                }),
                Some(_) => {},
            }
        }
        for field in old_account.fields.keys() {
            if !dynamic_fields.iter().any(|d| d == field) && !new_account.fields.contains_key(field) {
                out.push(FieldDiff::Removed { account: name.to_string(), field: field.clone() });
            }
        }
    }
    out
}

/// Whether the archive at `archive_mtime` is stale: older than `stale_after` relative to `now`.
/// A host calls this with the archive file's own mtime and a configured staleness window (the
/// `archive_stale_days` setting) to decide whether to surface a non-fatal warning.
pub fn is_stale(archive_mtime: SystemTime, now: SystemTime, stale_after: Duration) -> bool {
    now.duration_since(archive_mtime).map(|age| age > stale_after).unwrap_or(false)
}

pub fn stale_after_days(days: u64) -> Duration {
    Duration::from_secs(days * 24 * 60 * 60)
}

/// Reads a file's modification time, used by a host to compare an account file's last edit
/// against the archive's own age.
pub fn file_mtime(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::FieldValue;

    fn account(identity: &str, value: &str) -> Account {
        Account::new(identity, "master").with_field("note", FieldValue::Str(value.to_string()))
    }

    #[test]
    fn build_produces_stable_field_ordering() {
        let archive = Archive::build(&[account("a", "one")], &RevealContext::none()).unwrap();
        let json_a = archive.to_json().unwrap();
        let json_b = archive.to_json().unwrap();
        assert_eq!(json_a, json_b);
    }

    #[test]
    fn diff_reports_changed_fields() {
        let old = Archive::build(&[account("a", "one")], &RevealContext::none()).unwrap();
        let new = Archive::build(&[account("a", "two")], &RevealContext::none()).unwrap();
        let changes = diff(&old, &new, &[]);
        assert_eq!(changes, vec![FieldDiff::Changed { account: "a".to_string(), field: "note".to_string(), old: "one".to_string(), new: "two".to_string() }]);
    }

    #[test]
    fn diff_skips_dynamic_fields() {
        let old = Archive::build(&[account("a", "one")], &RevealContext::none()).unwrap();
        let new = Archive::build(&[account("a", "two")], &RevealContext::none()).unwrap();
        let changes = diff(&old, &new, &["note".to_string()]);
        assert!(changes.is_empty());
    }

    #[test]
    fn diff_reports_added_and_removed_accounts_fields() {
        let mut old_account = account("a", "one");
        old_account.fields.push(("extra".to_string(), FieldValue::Str("gone-soon".to_string())));
        let old = Archive::build(&[old_account], &RevealContext::none()).unwrap();
        let new = Archive::build(&[account("a", "one")], &RevealContext::none()).unwrap();
        let changes = diff(&old, &new, &[]);
        assert_eq!(changes, vec![FieldDiff::Removed { account: "a".to_string(), field: "extra".to_string() }]);
    }

    #[test]
    fn diff_reports_whole_accounts_added_and_removed() {
        let old = Archive::build(&[account("a", "one")], &RevealContext::none()).unwrap();
        let new = Archive::build(&[account("b", "one")], &RevealContext::none()).unwrap();
        let changes = diff(&old, &new, &[]);
        assert_eq!(changes.len(), 2);
        assert!(changes.contains(&FieldDiff::AccountAdded { account: "b".to_string() }));
        assert!(changes.contains(&FieldDiff::AccountRemoved { account: "a".to_string() }));
    }

    #[test]
    fn staleness_is_relative_to_the_configured_window() {
        let archive_mtime = SystemTime::UNIX_EPOCH;
        let now = archive_mtime + Duration::from_secs(40 * 24 * 60 * 60);
        assert!(is_stale(archive_mtime, now, stale_after_days(30)));
        assert!(!is_stale(archive_mtime, now, stale_after_days(50)));
    }
}
