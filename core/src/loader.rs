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

//! Reads account definitions off disk: plain `.toml` files and `.gpg`/`.asc` envelopes that
//! decrypt to TOML, both parsed into [`Account`] values the rest of the engine can work with.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::account::{Account, FieldValue};
use crate::discovery::Recognizer;
use crate::error::{Error, Result};
use crate::generator::{BirthDate, Generator, MixedPassword, MixedPasswordPart, Otp, Passphrase, PasswordRecipe, Pin, Question};
use crate::generator::Password;
use crate::charset::Alphabet;
use crate::obscure::{Gpg, Hidden, Hide, Obscurer, ScryptObscurer};
use crate::obscure::envelope::EnvelopeAdapter;
use crate::wordlist::Wordlist;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// A non-fatal problem surfaced while loading a directory of account files: the caller decides
/// whether to log it, display it, or ignore it, but loading continues regardless.
#[derive(Debug)]
pub struct LoadWarning {
    pub path: PathBuf,
    pub error: Error,
}

/// The outcome of loading every account file under a directory.
pub struct LoadResult {
    pub accounts: Vec<Account>,
    pub warnings: Vec<LoadWarning>,
}

/// Lists the account definition files in `dir`: anything with a `.toml`, `.gpg`, or `.asc`
/// extension, sorted for deterministic load order.
pub fn index_account_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| matches!(path.extension().and_then(|e| e.to_str()), Some("toml") | Some("gpg") | Some("asc")))
        .collect();
    files.sort();
    Ok(files)
}

/// Reads the raw TOML text for an account file, transparently decrypting `.gpg`/`.asc` envelopes
/// through `adapter`.
fn read_account_text(path: &Path, adapter: &dyn EnvelopeAdapter) -> Result<String> {
    let raw = fs::read(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("gpg") | Some("asc") => {
            let plaintext = adapter.decrypt(&raw)?;
            String::from_utf8(plaintext).map_err(|e| Error::DecryptionFailed(format!("account file `{}` did not decrypt to utf-8: {e}", path.display())))
        },
        _ => String::from_utf8(raw).map_err(|e| Error::DecryptionFailed(format!("account file `{}` is not utf-8: {e}", path.display()))),
    }
}

/// Checks an account file's permissions against the configured `account_file_mask`. A file
/// readable by anyone but its owner either surfaces as a warning (the caller decides what to do
/// with it) or, when `auto_tighten` is set, is masked down to the owner-only bits — nothing is
/// reported in that case unless the tighten itself fails.
#[cfg(unix)]
fn check_permissions(path: &Path, mask: u32, auto_tighten: bool) -> Option<Error> {
    let metadata = fs::metadata(path).ok()?;
    let mode = metadata.permissions().mode();
    if mode & mask == 0 {
        return None;
    }
    if auto_tighten {
        let tightened = mode & !mask & 0o777;
        match fs::set_permissions(path, fs::Permissions::from_mode(tightened)) {
            Ok(()) => None,
            Err(_) => Some(Error::FilePermissionLoose { path: path.display().to_string(), mode: mode & 0o777 }),
        }
    } else {
        Some(Error::FilePermissionLoose { path: path.display().to_string(), mode: mode & 0o777 })
    }
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path, _mask: u32, _auto_tighten: bool) -> Option<Error> {
    None
}

/// Module-scoped variables an account file may declare at its top level, alongside its sequence
/// of account definitions: a default master seed every account in the file inherits unless it
/// declares its own, and a file-scoped dictionary path overriding the default wordlist.
const MODULE_SCALAR_KEYS: &[&str] = &["master_seed", "dictionary"];

/// Parses one account's TOML table into an [`Account`]. `table_key` is the declared identifier
/// (the file's `[bigbank]`-style table name); it's used as the canonical identity unless the
/// table supplies an explicit `NAME` override, which lets an account be renamed for display
/// without touching the seed-stream identity recorded in `account_seed`.
fn parse_account_table(
    table_key: &str,
    table: &toml::map::Map<String, toml::Value>,
    wordlist: &Arc<Wordlist>,
    inherited_master_seed: Option<&str>,
) -> Result<Account> {
    let wordlist = match table.get("dictionary").and_then(|v| v.as_str()) {
        Some(text) => Arc::new(Wordlist::from_text(text)),
        None => wordlist.clone(),
    };

    let identity = table.get("NAME").and_then(|v| v.as_str()).unwrap_or(table_key).to_string();
    let master_seed = table.get("master_seed").and_then(|v| v.as_str()).map(|s| s.to_string()).or_else(|| inherited_master_seed.map(|s| s.to_string()));

    let mut account = Account::without_master_seed(identity);
    account.wordlist = wordlist.clone();
    account.master_seed = master_seed;
    account.account_seed = table.get("account_seed").and_then(|v| v.as_str()).map(|s| s.to_string());
    account.default_field = table.get("default").and_then(|v| v.as_str()).map(|s| s.to_string());
    account.stealth = table.get("stealth").and_then(|v| v.as_bool()).unwrap_or(false);
    account.aliases = string_list(table.get("aliases"));
    account.credential_ids = string_list(table.get("credential_ids"));
    account.credential_secrets = string_list(table.get("credential_secrets"));
    account.tool_fields = string_list(table.get("tool_fields"));

    if let Some(discovery) = table.get("discovery") {
        account.discovery = Some(parse_recognizer(discovery)?);
    }

    if let Some(fields) = table.get("fields").and_then(|v| v.as_table()) {
        for (name, value) in fields {
            account.fields.push((name.clone(), parse_field_value(value, &wordlist)?));
        }
    }

    Ok(account)
}

/// Parses an account file's full TOML body.
///
/// A file in the single-account shorthand — a top-level `fields` table, with every other account
/// attribute (`master_seed`, `discovery`, `stealth`, ...) also at the top level — declares exactly
/// one account, identified by `file_identity`. A file with no top-level `fields` table instead
/// declares one account per top-level table, keyed by the table's name (optionally overridden by a
/// `NAME` key inside it), each account inheriting the file's top-level `master_seed` unless it sets
/// its own. A file may not mix the two shapes. An empty file yields an empty list.
pub fn parse_account_file(file_identity: &str, source: &str, default_wordlist: &Arc<Wordlist>) -> Result<Vec<Account>> {
    let doc: toml::Value = source.parse::<toml::Value>().map_err(|e| Error::Config(format!("`{file_identity}`: {e}")))?;
    let top = doc.as_table().ok_or_else(|| Error::Config(format!("`{file_identity}`: account file is not a table")))?;

    if top.contains_key("fields") {
        return Ok(vec![parse_account_table(file_identity, top, default_wordlist, None)?]);
    }

    let file_master_seed = top.get("master_seed").and_then(|v| v.as_str());
    let wordlist = match top.get("dictionary").and_then(|v| v.as_str()) {
        Some(text) => Arc::new(Wordlist::from_text(text)),
        None => default_wordlist.clone(),
    };

    let mut accounts = Vec::new();
    for (key, value) in top {
        if MODULE_SCALAR_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some(table) = value.as_table() else {
            return Err(Error::Config(format!("`{file_identity}`: `{key}` is neither a recognized module variable nor an account table")));
        };
        accounts.push(parse_account_table(key, table, &wordlist, file_master_seed)?);
    }
    Ok(accounts)
}

/// Test convenience: parses a single-account-shorthand file body and unwraps the one account it
/// must produce.
#[cfg(test)]
pub fn parse_account_toml(identity: &str, text: &str, default_wordlist: &Arc<Wordlist>) -> Result<Account> {
    let mut accounts = parse_account_file(identity, text, default_wordlist)?;
    Ok(accounts.remove(0))
}

fn string_list(value: Option<&toml::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|i| i.as_str()).map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

/// Parses a `discovery` table into a [`Recognizer`] tree, dispatching on its `type` key the same
/// way [`parse_tagged_value`] dispatches field values. `all`/`any` recurse into a `children` array
/// of nested recognizer tables.
fn parse_recognizer(value: &toml::Value) -> Result<Recognizer> {
    let table = value.as_table().ok_or_else(|| Error::Config("discovery entry must be a table".to_string()))?;
    let kind = str_field(table, "type").ok_or_else(|| Error::Config("discovery entry requires `type`".to_string()))?;
    let script = str_field(table, "script").unwrap_or_default().to_string();

    match kind {
        "title" => Ok(Recognizer::Title { patterns: string_list(table.get("patterns")), script }),
        "host" => Ok(Recognizer::Host { patterns: string_list(table.get("patterns")), script }),
        "user" => Ok(Recognizer::User { patterns: string_list(table.get("patterns")), script }),
        "network" => Ok(Recognizer::Network { macs: string_list(table.get("macs")), script }),
        "url" => Ok(Recognizer::Url {
            urls: string_list(table.get("urls")),
            script,
            name: str_field(table, "name").map(|s| s.to_string()),
            exact_path: table.get("exact_path").and_then(|v| v.as_bool()).unwrap_or(false),
            fragment: table.get("fragment").and_then(|v| v.as_bool()).unwrap_or(false),
            default_protocol: str_field(table, "default_protocol").unwrap_or("https").to_string(),
        }),
        "cwd" => {
            let paths = string_list(table.get("paths")).into_iter().map(PathBuf::from).collect();
            Ok(Recognizer::Cwd { paths, script })
        },
        "env_var" => Ok(Recognizer::EnvVar {
            name: str_field(table, "name").ok_or_else(|| Error::Config("env_var recognizer requires `name`".to_string()))?.to_string(),
            value: str_field(table, "value").unwrap_or_default().to_string(),
            script,
        }),
        "file" => Ok(Recognizer::File {
            path: PathBuf::from(str_field(table, "path").ok_or_else(|| Error::Config("file recognizer requires `path`".to_string()))?),
            contents: str_field(table, "contents").map(|s| s.to_string()),
            ttl: std::time::Duration::from_secs(int_field(table, "ttl_secs", 3600) as u64),
            script,
        }),
        "all" | "any" => {
            let children = table
                .get("children")
                .and_then(|v| v.as_array())
                .ok_or_else(|| Error::Config(format!("`{kind}` recognizer requires `children`")))?
                .iter()
                .map(parse_recognizer)
                .collect::<Result<Vec<_>>>()?;
            if kind == "all" {
                Ok(Recognizer::All { children, script })
            } else {
                Ok(Recognizer::Any { children, script })
            }
        },
        other => Err(Error::Config(format!("unknown discovery recognizer type `{other}`"))),
    }
}

/// Converts a TOML value into a [`FieldValue`]. A bare string, integer, array, or table is taken
/// literally; a table carrying a `type` key is dispatched into the matching generator, obscurer,
/// or script constructor.
/// Parses `text` as a standalone TOML document (a top-level table, not a bare scalar) into a
/// [`FieldValue`], for a GPG-obscured field whose plaintext is itself a nested declaration rather
/// than a flat secret. Returns `None` when `text` doesn't parse as a TOML document at all — the
/// ordinary case of a plain revealed string — so the caller falls back to treating it as a literal
/// rather than failing the lookup.
pub(crate) fn parse_value_document(text: &str, wordlist: &Arc<Wordlist>) -> Option<Result<FieldValue>> {
    let table = text.parse::<toml::Value>().ok()?;
    Some(parse_field_value(&table, wordlist))
}

fn parse_field_value(value: &toml::Value, wordlist: &Arc<Wordlist>) -> Result<FieldValue> {
    match value {
        toml::Value::String(s) => Ok(FieldValue::Str(s.clone())),
        toml::Value::Integer(i) => Ok(FieldValue::Int(*i)),
        toml::Value::Array(items) => Ok(FieldValue::Sequence(items.iter().map(|v| parse_field_value(v, wordlist)).collect::<Result<Vec<_>>>()?)),
        toml::Value::Table(table) => match table.get("type").and_then(|v| v.as_str()) {
            Some(kind) => parse_tagged_value(kind, table, wordlist),
            None => {
                let mut map = std::collections::BTreeMap::new();
                for (k, v) in table {
                    map.insert(k.clone(), parse_field_value(v, wordlist)?);
                }
                Ok(FieldValue::Mapping(map))
            },
        },
        other => Err(Error::Config(format!("field value `{other}` is not a supported type"))),
    }
}

fn str_field<'a>(table: &'a toml::map::Map<String, toml::Value>, key: &str) -> Option<&'a str> {
    table.get(key).and_then(|v| v.as_str())
}

fn int_field(table: &toml::map::Map<String, toml::Value>, key: &str, default: i64) -> i64 {
    table.get(key).and_then(|v| v.as_integer()).unwrap_or(default)
}

fn alphabet_field(table: &toml::map::Map<String, toml::Value>, key: &str) -> Alphabet {
    match str_field(table, key) {
        Some("lowercase") => Alphabet::Lowercase,
        Some("uppercase") => Alphabet::Uppercase,
        Some("digits") => Alphabet::Digits,
        Some("symbols") => Alphabet::Symbols,
        Some(literal) => Alphabet::Literal(literal.to_string()),
        None => Alphabet::Distinguishable,
    }
}

fn parse_tagged_value(kind: &str, table: &toml::map::Map<String, toml::Value>, wordlist: &Arc<Wordlist>) -> Result<FieldValue> {
    match kind {
        "password" => {
            let mut password = Password::new(int_field(table, "length", 16) as usize);
            password.alphabet = alphabet_field(table, "alphabet");
            password.shift_sort = table.get("shift_sort").and_then(|v| v.as_bool()).unwrap_or(false);
            if let Some(prefix) = str_field(table, "prefix") {
                password.prefix = prefix.to_string();
            }
            if let Some(suffix) = str_field(table, "suffix") {
                password.suffix = suffix.to_string();
            }
            Ok(FieldValue::Generator(Generator::Password(password)))
        },
        "passphrase" => {
            let mut passphrase = Passphrase::new(int_field(table, "length", 4) as usize, wordlist.clone());
            if let Some(sep) = str_field(table, "sep") {
                passphrase.sep = sep.to_string();
            }
            Ok(FieldValue::Generator(Generator::Passphrase(passphrase)))
        },
        "pin" => Ok(FieldValue::Generator(Generator::Pin(Pin::new(int_field(table, "length", 4) as usize)))),
        "question" => {
            let text = str_field(table, "text").ok_or_else(|| Error::Config("question generator requires `text`".to_string()))?;
            let mut question = Question::new(text, wordlist.clone());
            if let Some(answer) = str_field(table, "answer") {
                question.answer = Some(answer.to_string());
            }
            Ok(FieldValue::Generator(Generator::Question(question)))
        },
        "mixed_password" => {
            let length = int_field(table, "length", 16) as usize;
            let parts = table
                .get("parts")
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_table())
                        .map(|t| MixedPasswordPart { alphabet: alphabet_field(t, "alphabet"), count: int_field(t, "count", 1) as usize })
                        .collect()
                })
                .unwrap_or_default();
            Ok(FieldValue::Generator(Generator::MixedPassword(MixedPassword { parts, length })))
        },
        "password_recipe" => {
            let recipe = str_field(table, "recipe").ok_or_else(|| Error::Config("password_recipe generator requires `recipe`".to_string()))?;
            Ok(FieldValue::Generator(Generator::PasswordRecipe(PasswordRecipe::new(recipe))))
        },
        "birth_date" => {
            let mut birth_date = BirthDate::default();
            birth_date.year = int_field(table, "year", birth_date.year as i64) as i32;
            birth_date.min_age = int_field(table, "min_age", birth_date.min_age as i64) as u32;
            birth_date.max_age = int_field(table, "max_age", birth_date.max_age as i64) as u32;
            if let Some(format) = str_field(table, "format") {
                birth_date.format = format.to_string();
            }
            Ok(FieldValue::Generator(Generator::BirthDate(birth_date)))
        },
        "otp" => {
            let secret = str_field(table, "secret").ok_or_else(|| Error::Config("otp generator requires `secret`".to_string()))?;
            let mut otp = Otp::new(secret);
            otp.interval = int_field(table, "interval", otp.interval as i64) as u64;
            otp.digits = int_field(table, "digits", otp.digits as i64) as u32;
            Ok(FieldValue::Generator(Generator::Otp(otp)))
        },
        "hide" => {
            let text = str_field(table, "text").ok_or_else(|| Error::Config("hide obscurer requires `text`".to_string()))?;
            let mut hide = Hide::new(text);
            hide.secure = table.get("secure").and_then(|v| v.as_bool()).unwrap_or(true);
            Ok(FieldValue::Obscurer(Obscurer::Hide(hide)))
        },
        "hidden" => {
            let base64 = str_field(table, "base64").ok_or_else(|| Error::Config("hidden obscurer requires `base64`".to_string()))?;
            Ok(FieldValue::Obscurer(Obscurer::Hidden(Hidden { base64: base64.to_string(), encoding: crate::obscure::hidden::TextEncoding::Utf8 })))
        },
        "gpg" => {
            let armor = str_field(table, "ciphertext").ok_or_else(|| Error::Config("gpg obscurer requires `ciphertext`".to_string()))?;
            Ok(FieldValue::Obscurer(Obscurer::Gpg(Gpg::new(armor.as_bytes().to_vec()))))
        },
        "scrypt" => {
            let blob = str_field(table, "blob").ok_or_else(|| Error::Config("scrypt obscurer requires `blob`".to_string()))?;
            Ok(FieldValue::Obscurer(Obscurer::Scrypt(ScryptObscurer { blob: blob.as_bytes().to_vec() })))
        },
        "script" => {
            let body = str_field(table, "body").ok_or_else(|| Error::Config("script field requires `body`".to_string()))?;
            Ok(FieldValue::Script(body.to_string()))
        },
        other => Err(Error::Config(format!("unknown field type `{other}`"))),
    }
}

/// Loads every account file under `dir`, enforcing that account names (and their aliases) are
/// unique. A duplicate account name is fatal; a duplicate alias is only a warning, since two
/// accounts sharing a nickname is surprising but not unsafe.
pub fn load_directory(
    dir: &Path,
    adapter: &dyn EnvelopeAdapter,
    default_wordlist: &Arc<Wordlist>,
    file_mask: u32,
    auto_tighten_permissions: bool,
) -> Result<LoadResult> {
    let mut accounts = Vec::new();
    let mut warnings = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_aliases: HashMap<String, String> = HashMap::new();

    for path in index_account_files(dir)? {
        if let Some(warning) = check_permissions(&path, file_mask, auto_tighten_permissions) {
            warnings.push(LoadWarning { path: path.clone(), error: warning });
        }

        let identity = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown").to_string();
        let text = read_account_text(&path, adapter)?;
        let file_accounts = parse_account_file(&identity, &text, default_wordlist)?;

        for account in file_accounts {
            if !seen_names.insert(account.identity.clone()) {
                return Err(Error::DuplicateAccount(account.identity.clone()));
            }
            for alias in &account.aliases {
                if let Some(existing) = seen_aliases.insert(alias.clone(), account.identity.clone()) {
                    warnings.push(LoadWarning {
                        path: path.clone(),
                        error: Error::Config(format!("alias `{alias}` is already used by account `{existing}`")),
                    });
                }
            }
            accounts.push(account);
        }
    }

    Ok(LoadResult { accounts, warnings })
}

/// Loads accounts from an explicit list of files (an `accounts_files` index: a caller-supplied,
/// ordered set of paths rather than a directory scan), applying the same permission check,
/// decryption, and duplicate-identity enforcement as [`load_directory`].
pub fn load_files(
    paths: &[PathBuf],
    adapter: &dyn EnvelopeAdapter,
    default_wordlist: &Arc<Wordlist>,
    file_mask: u32,
    auto_tighten_permissions: bool,
) -> Result<LoadResult> {
    let mut accounts = Vec::new();
    let mut warnings = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_aliases: HashMap<String, String> = HashMap::new();

    for path in paths {
        if let Some(warning) = check_permissions(path, file_mask, auto_tighten_permissions) {
            warnings.push(LoadWarning { path: path.clone(), error: warning });
        }

        let identity = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown").to_string();
        let text = read_account_text(path, adapter)?;
        let file_accounts = parse_account_file(&identity, &text, default_wordlist)?;

        for account in file_accounts {
            if !seen_names.insert(account.identity.clone()) {
                return Err(Error::DuplicateAccount(account.identity.clone()));
            }
            for alias in &account.aliases {
                if let Some(existing) = seen_aliases.insert(alias.clone(), account.identity.clone()) {
                    warnings.push(LoadWarning {
                        path: path.clone(),
                        error: Error::Config(format!("alias `{alias}` is already used by account `{existing}`")),
                    });
                }
            }
            accounts.push(account);
        }
    }

    Ok(LoadResult { accounts, warnings })
}

/// Reads an `accounts_files` index: a text file of newline-separated account file paths (blank
/// lines and `#`-prefixed comments ignored), relative paths resolved against the index file's own
/// directory.
pub fn read_accounts_index(index_path: &Path) -> Result<Vec<PathBuf>> {
    let base = index_path.parent().unwrap_or_else(|| Path::new("."));
    let text = fs::read_to_string(index_path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let path = Path::new(line);
            if path.is_absolute() { path.to_path_buf() } else { base.join(path) }
        })
        .collect())
}

/// Verifies each account file's SHA-256 digest against a `hashes` file (one `path = hex_digest`
/// TOML entry per account file). Mismatches and missing entries are returned as warnings, never
/// as a hard failure, since a stale hashes file shouldn't block reading the accounts themselves.
pub fn verify_hashes(dir: &Path, hashes_path: &Path) -> Result<Vec<Error>> {
    let mut warnings = Vec::new();
    if !hashes_path.exists() {
        return Ok(warnings);
    }
    let hashes_text = fs::read_to_string(hashes_path)?;
    let expected: toml::Value = hashes_text.parse().map_err(|e| Error::Config(e.to_string()))?;
    let expected_table = expected.as_table().cloned().unwrap_or_default();

    for path in index_account_files(dir)? {
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default().to_string();
        let Some(expected_hash) = expected_table.get(&name).and_then(|v| v.as_str()) else { continue };
        let bytes = fs::read(&path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let actual_hash = hex_encode(&hasher.finalize());
        if actual_hash != expected_hash {
            warnings.push(Error::HashMismatch { fragment: name, expected: expected_hash.to_string(), actual: actual_hash });
        }
    }
    Ok(warnings)
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obscure::InMemoryEnvelope;

    fn wordlist() -> Arc<Wordlist> {
        Arc::new(Wordlist::from_text("alpha beta gamma delta epsilon"))
    }

    #[test]
    fn parses_a_minimal_account() {
        let toml = r#"
            master_seed = "m"
            [fields]
            username = "alice"
        "#;
        let account = parse_account_toml("bigbank", toml, &wordlist()).unwrap();
        assert_eq!(account.master_seed.as_deref(), Some("m"));
        assert_eq!(account.fields.len(), 1);
    }

    #[test]
    fn parses_a_tagged_generator_field() {
        let toml = r#"
            master_seed = "m"
            [fields.pin]
            type = "pin"
            length = 6
        "#;
        let account = parse_account_toml("bigbank", toml, &wordlist()).unwrap();
        match &account.fields[0].1 {
            FieldValue::Generator(Generator::Pin(pin)) => assert_eq!(pin.length, 6),
            other => panic!("expected a pin generator, got {other:?}"),
        }
    }

    #[test]
    fn missing_master_seed_parses_fine_and_fails_lazily() {
        let toml = "[fields]\nusername = \"alice\"";
        let account = parse_account_toml("bigbank", toml, &wordlist()).unwrap();
        assert!(account.master_seed.is_none());
    }

    #[test]
    fn a_file_can_declare_more_than_one_account() {
        let toml = r#"
            master_seed = "shared"
            [bigbank]
            [bigbank.fields]
            username = "alice"
            [smallbank]
            master_seed = "own"
            [smallbank.fields]
            username = "bob"
        "#;
        let accounts = parse_account_file("multi", toml, &wordlist()).unwrap();
        assert_eq!(accounts.len(), 2);
        let bigbank = accounts.iter().find(|a| a.identity == "bigbank").unwrap();
        assert_eq!(bigbank.master_seed.as_deref(), Some("shared"));
        let smallbank = accounts.iter().find(|a| a.identity == "smallbank").unwrap();
        assert_eq!(smallbank.master_seed.as_deref(), Some("own"));
    }

    #[test]
    fn name_override_renames_the_account_but_not_the_table_key_lookup() {
        let toml = r#"
            [acct1]
            NAME = "bigbank"
            master_seed = "m"
            [acct1.fields]
            username = "alice"
        "#;
        let accounts = parse_account_file("named", toml, &wordlist()).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].identity, "bigbank");
    }

    #[test]
    fn discovery_table_parses_into_a_recognizer() {
        let toml = r#"
            master_seed = "m"
            [fields]
            username = "alice"
            [discovery]
            type = "host"
            patterns = ["bigbank.example"]
            script = "{username}{tab}{passcode}{return}"
        "#;
        let account = parse_account_toml("bigbank", toml, &wordlist()).unwrap();
        match account.discovery {
            Some(Recognizer::Host { patterns, .. }) => assert_eq!(patterns, vec!["bigbank.example".to_string()]),
            other => panic!("expected a host recognizer, got {other:?}"),
        }
    }

    #[test]
    fn distinct_file_stems_both_load_fine() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.toml"), "master_seed = \"m\"\n[fields]\nx = \"1\"").unwrap();
        fs::write(dir.path().join("b.toml"), "master_seed = \"m\"\n[fields]\nx = \"1\"").unwrap();
        let adapter = InMemoryEnvelope;
        let result = load_directory(dir.path(), &adapter, &wordlist(), 0o077, false).unwrap();
        assert_eq!(result.accounts.len(), 2);
    }

    #[test]
    fn duplicate_account_names_across_files_are_fatal() {
        // Two files sharing a stem (`a.toml` and `a.asc`) resolve to the same account identity.
        let dir = tempfile::tempdir().unwrap();
        let body = "master_seed = \"m\"\n[fields]\nx = \"1\"";
        fs::write(dir.path().join("a.toml"), body).unwrap();
        let adapter = InMemoryEnvelope;
        let envelope = adapter.encrypt(body.as_bytes(), &[], None).unwrap();
        fs::write(dir.path().join("a.asc"), envelope).unwrap();
        let result = load_directory(dir.path(), &adapter, &wordlist(), 0o077, false);
        assert!(matches!(result, Err(Error::DuplicateAccount(_))));
    }

    #[test]
    fn accounts_index_resolves_relative_paths_against_its_own_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.toml"), "master_seed = \"m\"\n[fields]\nx = \"1\"").unwrap();
        let index_path = dir.path().join("accounts_files");
        fs::write(&index_path, "# a comment\na.toml\n\n").unwrap();
        let paths = read_accounts_index(&index_path).unwrap();
        assert_eq!(paths, vec![dir.path().join("a.toml")]);

        let adapter = InMemoryEnvelope;
        let result = load_files(&paths, &adapter, &wordlist(), 0o077, false).unwrap();
        assert_eq!(result.accounts.len(), 1);
    }

    #[test]
    fn hash_mismatches_are_reported_as_warnings_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.toml"), "master_seed = \"m\"\n[fields]\nx = \"1\"").unwrap();
        let hashes_path = dir.path().join("hashes.toml");
        fs::write(&hashes_path, "\"a.toml\" = \"not-the-real-digest\"\n").unwrap();
        let warnings = verify_hashes(dir.path(), &hashes_path).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Error::HashMismatch { .. }));
    }

    #[test]
    fn loose_permissions_are_a_warning_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.toml");
        fs::write(&path, "master_seed = \"m\"\n[fields]\nx = \"1\"").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        }
        let adapter = InMemoryEnvelope;
        let result = load_directory(dir.path(), &adapter, &wordlist(), 0o077, false).unwrap();
        #[cfg(unix)]
        assert!(!result.warnings.is_empty());
        assert_eq!(result.accounts.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn auto_tighten_permissions_clears_the_masked_bits_instead_of_warning() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.toml");
        fs::write(&path, "master_seed = \"m\"\n[fields]\nx = \"1\"").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let adapter = InMemoryEnvelope;
        let result = load_directory(dir.path(), &adapter, &wordlist(), 0o077, true).unwrap();
        assert!(result.warnings.is_empty());
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
