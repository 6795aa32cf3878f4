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

//! The account entity: a named bundle of fields, each either a literal, a nested structure, a
//! generator, an obscurer, or a script. This is the layer that turns a [`crate::generator::Generator`]
//! or [`crate::obscure::Obscurer`] into a concrete, user-facing string by supplying the seed
//! material and reveal context they need.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::discovery::Recognizer;
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::obscure::{Obscurer, RevealContext};
use crate::seed::Seed;

/// What the public API hands back for a single resolved field: the rendered value plus enough
/// identity to report it responsibly (whether it's secret, which account/field/key it came from).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountValue {
    pub value: String,
    pub is_secret: bool,
    pub name: String,
    pub key: Option<String>,
    pub field: String,
    pub description: Option<String>,
}

/// Maximum nesting depth a generator or obscurer may sit at inside a field's value tree: a field
/// may be a generator directly (depth 0 here — a top-level field), or sit inside one level of
/// sequence/mapping (depth 1 here — inside a top-level sequence/mapping), but no deeper.
const MAX_GENERATOR_DEPTH: usize = 1;

/// The value a field may hold. Generators and obscurers are evaluated lazily, only when a caller
/// asks for the field's resolved value.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Sequence(Vec<FieldValue>),
    Mapping(BTreeMap<String, FieldValue>),
    Generator(Generator),
    Obscurer(Obscurer),
    Script(String),
}

impl FieldValue {
    /// Whether this value should be treated as sensitive: every generator, and every obscurer
    /// except a `Hide` explicitly marked not secure.
    pub fn is_secret(&self) -> bool {
        match self {
            FieldValue::Generator(_) => true,
            FieldValue::Obscurer(o) => o.is_secret(),
            FieldValue::Sequence(items) => items.iter().any(FieldValue::is_secret),
            FieldValue::Mapping(map) => map.values().any(FieldValue::is_secret),
            FieldValue::Str(_) | FieldValue::Int(_) | FieldValue::Script(_) => false,
        }
    }

    fn depth(&self) -> usize {
        match self {
            FieldValue::Sequence(items) => 1 + items.iter().map(FieldValue::depth).max().unwrap_or(0),
            FieldValue::Mapping(map) => 1 + map.values().map(FieldValue::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    fn validate_depth(&self, path: &str) -> Result<()> {
        if self.depth() > MAX_GENERATOR_DEPTH {
            return Err(Error::BadPath { path: path.to_string(), reason: "value nesting exceeds the depth of two levels".to_string() });
        }
        Ok(())
    }
}

/// A single named account: its seed identity plus an ordered collection of fields. Field order is
/// preserved as declared, since it drives the default listing order shown to a user.
#[derive(Debug, Clone)]
pub struct Account {
    pub identity: String,
    pub aliases: Vec<String>,
    /// The master seed in scope for this account: its own, or (set by the loader) the
    /// containing file's module-level default. `None` only for an account declared in a file
    /// with no `master_seed` at all, which is fine as long as it has no generator fields —
    /// consulting a generator with no master seed in scope is a lazy [`Error::MasterSeedMissing`],
    /// not a load-time failure.
    pub master_seed: Option<String>,
    pub account_seed: Option<String>,
    pub fields: Vec<(String, FieldValue)>,
    /// The account's own `default` field declaration, if any: either a field-name reference or
    /// (if it contains `{`) a script template, distinguished by [`crate::loader`] at parse time.
    pub default_field: Option<String>,
    pub credential_ids: Vec<String>,
    pub credential_secrets: Vec<String>,
    pub tool_fields: Vec<String>,
    pub stealth: bool,
    pub discovery: Option<Recognizer>,
    /// The wordlist in scope for this account, carried so a GPG-obscured field that reveals to a
    /// nested generator declaration (a `Passphrase`, say) can be materialized without the account
    /// needing a second, ambient source of dictionary words.
    pub(crate) wordlist: std::sync::Arc<crate::wordlist::Wordlist>,
}

impl Account {
    pub fn new(identity: impl Into<String>, master_seed: impl Into<String>) -> Self {
        Account {
            identity: identity.into(),
            aliases: Vec::new(),
            master_seed: Some(master_seed.into()),
            account_seed: None,
            fields: Vec::new(),
            default_field: None,
            credential_ids: Vec::new(),
            credential_secrets: Vec::new(),
            tool_fields: Vec::new(),
            stealth: false,
            discovery: None,
            wordlist: std::sync::Arc::new(crate::wordlist::Wordlist::default_list()),
        }
    }

    /// Builds an account with no master seed in scope yet (the loader assigns one from the
    /// account's own declaration or the containing file's default).
    pub fn without_master_seed(identity: impl Into<String>) -> Self {
        Account {
            identity: identity.into(),
            aliases: Vec::new(),
            master_seed: None,
            account_seed: None,
            fields: Vec::new(),
            default_field: None,
            credential_ids: Vec::new(),
            credential_secrets: Vec::new(),
            tool_fields: Vec::new(),
            stealth: false,
            discovery: None,
            wordlist: std::sync::Arc::new(crate::wordlist::Wordlist::default_list()),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// The seed identity used in entropy derivation: the declared account seed if present,
    /// otherwise the account's own name. A stealth account stores no account seed of its own by
    /// definition, so it always takes `stealth_override` instead — the value a host prompted the
    /// user for at lookup time — falling back to the account name only if none was supplied.
    fn account_seed<'a>(&'a self, stealth_override: Option<&'a str>) -> &'a str {
        if self.stealth {
            return stealth_override.unwrap_or(&self.identity);
        }
        self.account_seed.as_deref().unwrap_or(&self.identity)
    }

    fn field(&self, name: &str) -> Result<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::UnknownField { account: self.identity.clone(), field: name.to_string() })
    }

    /// Resolves a dotted/indexed path (`"questions.0"`, `"addresses.home.street"`) against a
    /// field's nested value.
    fn navigate<'a>(&self, root: &'a FieldValue, path: &str, full_path: &str) -> Result<&'a FieldValue> {
        let mut current = root;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                FieldValue::Sequence(items) => {
                    let index: usize = segment
                        .parse()
                        .map_err(|_| Error::BadPath { path: full_path.to_string(), reason: format!("`{segment}` is not a valid index") })?;
                    items
                        .get(index)
                        .ok_or_else(|| Error::BadPath { path: full_path.to_string(), reason: format!("index {index} out of range") })?
                },
                FieldValue::Mapping(map) => map
                    .get(segment)
                    .ok_or_else(|| Error::BadPath { path: full_path.to_string(), reason: format!("no key `{segment}`") })?,
                _ => return Err(Error::BadPath { path: full_path.to_string(), reason: format!("`{segment}` does not resolve inside a scalar") }),
            };
        }
        Ok(current)
    }

    /// Splits a path into its leading field name and remaining sub-path, after normalizing
    /// bracket indexing (`a[b][0]`) and incidental whitespace (`a .b. 0`) to plain dotted form so
    /// all three spellings resolve identically.
    fn split_path(path: &str) -> (String, String) {
        let normalized = path
            .replace('[', ".")
            .replace(']', "")
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(".");
        match normalized.split_once('.') {
            Some((f, r)) => (f.to_string(), r.to_string()),
            None => (normalized, String::new()),
        }
    }

    /// Resolves `path` (a field name, optionally followed by a dotted/indexed sub-path) to the
    /// underlying [`FieldValue`], without materializing it.
    pub fn resolve(&self, path: &str) -> Result<&FieldValue> {
        let (field_name, rest) = Self::split_path(path);
        let root = self.field(&field_name)?;
        root.validate_depth(path)?;
        if rest.is_empty() { Ok(root) } else { self.navigate(root, &rest, path) }
    }

    /// Materializes a resolved [`FieldValue`] into a display string: literals pass through,
    /// generators draw from a freshly seeded stream, obscurers reveal through `ctx`. `key` is the
    /// mapping key or sequence index this value sits under, if any, and is folded into a
    /// generator's seed so siblings of the same field never share a secret.
    fn materialize(&self, field_name: &str, key: Option<&str>, value: &FieldValue, path: &str, ctx: &RevealContext) -> Result<String> {
        match value {
            FieldValue::Str(s) => Ok(s.clone()),
            FieldValue::Int(i) => Ok(i.to_string()),
            FieldValue::Script(s) => Ok(s.clone()),
            FieldValue::Sequence(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, item)| self.materialize(field_name, Some(&i.to_string()), item, path, ctx))
                .collect::<Result<Vec<_>>>()?
                .join(", ")),
            FieldValue::Mapping(map) => Ok(map
                .iter()
                .map(|(k, v)| Ok(format!("{k}={}", self.materialize(field_name, Some(k), v, path, ctx)?)))
                .collect::<Result<Vec<_>>>()?
                .join(", ")),
            FieldValue::Generator(generator) => {
                let seed = self.seed_for(field_name, key, generator, ctx)?;
                let mut stream = seed.stream();
                Ok(generator.materialize(&mut stream, path)?.into_value())
            },
            FieldValue::Obscurer(obscurer) => {
                let revealed = obscurer.reveal(ctx)?;
                if matches!(obscurer, Obscurer::Gpg(_)) {
                    if let Some(nested) = crate::loader::parse_value_document(&revealed, &self.wordlist) {
                        let nested = nested?;
                        nested.validate_depth(path)?;
                        return self.materialize(field_name, key, &nested, path, ctx);
                    }
                }
                Ok(revealed)
            },
        }
    }

    /// Builds the seed a generator draws from: `key` (a mapping key or sequence index) is folded
    /// in for generators nested inside a composite, and a generator-specific version fragment
    /// (e.g. [`crate::generator::Question::seed_version`]) is folded in when the generator exposes
    /// one. Fails with [`Error::MasterSeedMissing`] if this account has no master seed in scope —
    /// the only point at which that's consulted, since an account with no generator fields at all
    /// never needs one.
    fn seed_for(&self, field_name: &str, key: Option<&str>, generator: &Generator, ctx: &RevealContext) -> Result<Seed> {
        let master_seed = self.master_seed.clone().ok_or_else(|| Error::MasterSeedMissing(self.identity.clone()))?;
        let account_seed = self.account_seed(ctx.stealth_account_seed).to_string();
        let mut seed = Seed::new(master_seed, account_seed, field_name.to_string());
        if let Some(key) = key {
            seed = seed.with_key(key.to_string());
        }
        if let Generator::Question(question) = generator {
            seed = seed.with_version(question.seed_version());
        }
        if let Some(extra) = ctx.extra_seed {
            seed = seed.with_extra_seed(extra.to_string());
        }
        Ok(seed)
    }

    /// Resolves and materializes `path` in one step, failing with [`Error::CompositeNotScalar`]
    /// if it resolves to a sequence or mapping rather than a scalar, generator, obscurer, or
    /// script.
    pub fn get_value(&self, path: &str, ctx: &RevealContext) -> Result<AccountValue> {
        let (field_name, rest) = Self::split_path(path);
        let value = self.resolve(path)?;
        if matches!(value, FieldValue::Sequence(_) | FieldValue::Mapping(_)) {
            return Err(Error::CompositeNotScalar { account: self.identity.clone(), path: path.to_string() });
        }
        let rendered = self.materialize(&field_name, None, value, path, ctx)?;
        Ok(AccountValue {
            value: rendered,
            is_secret: value.is_secret(),
            name: self.identity.clone(),
            key: if rest.is_empty() { None } else { Some(rest) },
            field: field_name,
            description: None,
        })
    }

    /// Resolves and materializes `path`, returning only the rendered string. A thin convenience
    /// over [`Account::get_value`] for callers that don't need the full [`AccountValue`] envelope
    /// (notably the archive dump, which needs every field including composites).
    pub fn field_dump(&self, path: &str, ctx: &RevealContext) -> Result<String> {
        let (field_name, _) = Self::split_path(path);
        let value = self.resolve(path)?;
        self.materialize(&field_name, None, value, path, ctx)
    }

    /// Returns the whole structured subtree under `name` (a top-level field), with every
    /// generator and obscurer materialized, or `None` if the field doesn't exist.
    pub fn get_composite(&self, name: &str, ctx: &RevealContext) -> Result<Option<JsonValue>> {
        match self.field(name) {
            Ok(value) => {
                value.validate_depth(name)?;
                Ok(Some(self.materialize_json(name, None, value, name, ctx)?))
            },
            Err(Error::UnknownField { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn materialize_json(&self, field_name: &str, key: Option<&str>, value: &FieldValue, path: &str, ctx: &RevealContext) -> Result<JsonValue> {
        match value {
            FieldValue::Sequence(items) => Ok(JsonValue::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.materialize_json(field_name, Some(&i.to_string()), item, path, ctx))
                    .collect::<Result<Vec<_>>>()?,
            )),
            FieldValue::Mapping(map) => Ok(JsonValue::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.materialize_json(field_name, Some(k), v, path, ctx)?)))
                    .collect::<Result<serde_json::Map<_, _>>>()?,
            )),
            other => Ok(JsonValue::String(self.materialize(field_name, key, other, path, ctx)?)),
        }
    }

    /// Resolves `path` and, if it names a `WriteFile` generator, produces the filesystem side
    /// effect it would write — the bytes and mode, and where — without writing anything itself.
    /// `None` if `path` resolves to anything else. The caller (the CLI harness; see
    /// [`crate::generator::Generator::side_effect`]) is responsible for actually performing the
    /// write, since this crate doesn't touch the filesystem outside of loading account files.
    pub fn write_file_side_effect(&self, path: &str, ctx: &RevealContext) -> Result<Option<(std::path::PathBuf, Vec<u8>, u32)>> {
        let (field_name, _) = Self::split_path(path);
        let value = self.resolve(path)?;
        let generator = match value {
            FieldValue::Generator(g @ Generator::WriteFile(_)) => g,
            _ => return Ok(None),
        };
        let seed = self.seed_for(&field_name, None, generator, ctx)?;
        let mut stream = seed.stream();
        generator.side_effect(&mut stream, path)
    }

    /// Resolves several paths and joins their materialized values with `separator`, for fields
    /// that are conventionally presented together (e.g. a username and a one-time code).
    pub fn join_values(&self, paths: &[&str], separator: &str, ctx: &RevealContext) -> Result<String> {
        paths.iter().map(|p| Ok(self.get_value(p, ctx)?.value)).collect::<Result<Vec<_>>>().map(|v| v.join(separator))
    }

    /// Resolves the account's default value: its own declared `default` (a field-name reference,
    /// or — when the text contains `{` — a script template rendered in place), falling back to the
    /// first of `fallback_candidates` (the `default_field` setting, e.g. `passcode password
    /// passphrase`) that names a field this account actually has.
    pub fn default_value(&self, fallback_candidates: &[String], ctx: &RevealContext) -> Result<AccountValue> {
        if let Some(default) = &self.default_field {
            if default.contains('{') {
                let tokens = crate::script::parse(default)?;
                let mut rendered = String::new();
                let mut is_secret = false;
                for token in tokens {
                    match token {
                        crate::script::ScriptToken::Literal(text) => rendered.push_str(&text),
                        crate::script::ScriptToken::Field(path) => {
                            let value = self.get_value(&path, ctx)?;
                            is_secret = is_secret || value.is_secret;
                            rendered.push_str(&value.value);
                        },
                        other => return Err(Error::BadScriptToken { token: format!("{other:?}"), culprit: self.identity.clone() }),
                    }
                }
                return Ok(AccountValue { value: rendered, is_secret, name: self.identity.clone(), key: None, field: "default".to_string(), description: None });
            }
            return self.get_value(default, ctx);
        }
        for candidate in fallback_candidates {
            if self.fields.iter().any(|(name, _)| name == candidate) {
                return self.get_value(candidate, ctx);
            }
        }
        Err(Error::UnknownField { account: self.identity.clone(), field: "default".to_string() })
    }

    /// Pairs each declared credential id with its corresponding secret, by declaration order.
    pub fn credentials(&self, ctx: &RevealContext) -> Result<Vec<(String, String)>> {
        self.credential_ids
            .iter()
            .zip(self.credential_secrets.iter())
            .map(|(id_path, secret_path)| Ok((self.get_value(id_path, ctx)?.value, self.get_value(secret_path, ctx)?.value)))
            .collect()
    }

    /// Field names visible in a generic listing: excludes tool fields, and any field whose name
    /// starts with `_` (the convention for a field meant only for internal cross-references).
    pub fn visible_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !name.starts_with('_'))
            .filter(|name| !self.tool_fields.iter().any(|t| t == name))
            .collect()
    }

    /// Whether this account should be hidden from discovery/listing unless addressed by name.
    pub fn is_stealth(&self) -> bool {
        self.stealth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Pin;
    use crate::obscure::Hide;

    fn account() -> Account {
        Account::new("bigbank", "master-secret")
            .with_field("username", FieldValue::Str("alice".to_string()))
            .with_field("pin", FieldValue::Generator(Generator::Pin(Pin::new(4))))
            .with_field("note", FieldValue::Obscurer(Obscurer::Hide(Hide::new("don't share"))))
            .with_field("_internal", FieldValue::Str("not for listing".to_string()))
    }

    #[test]
    fn literal_field_passes_through() {
        let account = account();
        assert_eq!(account.get_value("username", &RevealContext::none()).unwrap().value, "alice");
    }

    #[test]
    fn generator_field_is_deterministic() {
        let account = account();
        let ctx = RevealContext::none();
        let a = account.get_value("pin", &ctx).unwrap();
        let b = account.get_value("pin", &ctx).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.value.len(), 4);
        assert!(a.is_secret);
    }

    #[test]
    fn obscurer_field_reveals() {
        let account = account();
        assert_eq!(account.get_value("note", &RevealContext::none()).unwrap().value, "don't share");
    }

    #[test]
    fn unknown_field_is_an_error() {
        let account = account();
        assert!(matches!(account.get_value("nope", &RevealContext::none()), Err(Error::UnknownField { .. })));
    }

    #[test]
    fn visible_fields_excludes_underscore_prefixed_names() {
        let account = account();
        let visible = account.visible_fields();
        assert!(!visible.contains(&"_internal"));
        assert!(visible.contains(&"username"));
    }

    #[test]
    fn nested_path_resolves_through_a_mapping() {
        let mut map = BTreeMap::new();
        map.insert("street".to_string(), FieldValue::Str("1 Main St".to_string()));
        let account = Account::new("bigbank", "master-secret").with_field("address", FieldValue::Mapping(map));
        assert_eq!(account.get_value("address.street", &RevealContext::none()).unwrap().value, "1 Main St");
    }

    #[test]
    fn default_field_resolves_the_declared_default() {
        let mut account = account();
        account.default_field = Some("username".to_string());
        assert_eq!(account.default_value(&[], &RevealContext::none()).unwrap().value, "alice");
    }

    #[test]
    fn default_script_renders_instead_of_naming_a_field() {
        let mut account = account();
        account.default_field = Some("{username}!".to_string());
        assert_eq!(account.default_value(&[], &RevealContext::none()).unwrap().value, "alice!");
    }

    #[test]
    fn default_falls_back_to_the_settings_candidate_list() {
        let account = account();
        let value = account.default_value(&["nope".to_string(), "pin".to_string()], &RevealContext::none()).unwrap();
        assert_eq!(value.field, "pin");
    }

    #[test]
    fn missing_master_seed_is_reported_lazily_not_at_construction() {
        let account = Account::without_master_seed("bigbank").with_field("pin", FieldValue::Generator(Generator::Pin(Pin::new(4))));
        assert!(matches!(account.get_value("pin", &RevealContext::none()), Err(Error::MasterSeedMissing(_))));
    }

    #[test]
    fn credentials_pairs_ids_with_secrets_by_order() {
        let mut account = account();
        account.credential_ids = vec!["username".to_string()];
        account.credential_secrets = vec!["pin".to_string()];
        let creds = account.credentials(&RevealContext::none()).unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].0, "alice");
    }

    #[test]
    fn extra_seed_changes_the_generated_secret() {
        let account = account();
        let plain = account.get_value("pin", &RevealContext::none()).unwrap();
        let with_extra = account.get_value("pin", &RevealContext::none().with_extra_seed("alternate")).unwrap();
        assert_ne!(plain.value, with_extra.value);
    }

    #[test]
    fn stealth_account_requires_the_seed_supplied_at_lookup_time() {
        let mut account = account();
        account.stealth = true;
        account.account_seed = Some("stored-seed-is-ignored-for-stealth-accounts".to_string());

        let a = account.get_value("pin", &RevealContext::none().with_stealth_account_seed("prompted-seed")).unwrap();
        let b = account.get_value("pin", &RevealContext::none().with_stealth_account_seed("a-different-seed")).unwrap();
        assert_ne!(a.value, b.value);

        let fallback = account.get_value("pin", &RevealContext::none()).unwrap();
        assert_eq!(fallback.value, account.get_value("pin", &RevealContext::none()).unwrap().value);
    }

    #[test]
    fn get_composite_enforces_the_same_depth_limit_as_get_value() {
        let mut inner = BTreeMap::new();
        inner.insert("too_deep".to_string(), FieldValue::Sequence(vec![FieldValue::Str("x".to_string())]));
        let account = Account::new("bigbank", "master-secret").with_field("nested", FieldValue::Mapping(inner));

        assert!(matches!(account.get_composite("nested", &RevealContext::none()), Err(Error::BadPath { .. })));
        assert!(matches!(account.resolve("nested"), Err(Error::BadPath { .. })));
    }

    #[test]
    fn gpg_plaintext_that_parses_as_a_generator_declaration_is_materialized_as_nested() {
        use crate::obscure::envelope::{EnvelopeAdapter, InMemoryEnvelope};
        use crate::obscure::Gpg;

        let adapter = InMemoryEnvelope;
        let armor = adapter.encrypt(b"type = \"pin\"\nlength = 4\n", &[], None).unwrap();
        let account = Account::new("bigbank", "master-secret").with_field("buried", FieldValue::Obscurer(Obscurer::Gpg(Gpg::new(armor))));

        let value = account.get_value("buried", &RevealContext::with_envelope(&adapter)).unwrap();
        assert_eq!(value.value.len(), 4);
        assert!(value.value.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn gpg_plaintext_that_is_a_plain_string_is_not_mistaken_for_a_nested_value() {
        use crate::obscure::envelope::{EnvelopeAdapter, InMemoryEnvelope};
        use crate::obscure::Gpg;

        let adapter = InMemoryEnvelope;
        let armor = adapter.encrypt(b"hunter2", &[], None).unwrap();
        let account = Account::new("bigbank", "master-secret").with_field("buried", FieldValue::Obscurer(Obscurer::Gpg(Gpg::new(armor))));

        let value = account.get_value("buried", &RevealContext::with_envelope(&adapter)).unwrap();
        assert_eq!(value.value, "hunter2");
    }
}
