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

//! End-to-end coverage wiring the loader, account model, discovery engine, and script
//! interpolation together, the way a real `keyforge get`/`discover` invocation would.

use std::fs;

use keyforge_core::discovery::{DiscoveryEntry, Environment};
use keyforge_core::obscure::{InMemoryEnvelope, RevealContext};
use keyforge_core::script::{self, ScriptContext, ScriptToken};
use keyforge_core::settings::Settings;
use keyforge_core::{Account, Engine};

fn recognizer_entries(engine: &Engine) -> Vec<DiscoveryEntry> {
    engine
        .all_accounts()
        .iter()
        .filter_map(|a| a.discovery.clone().map(|recognizer| DiscoveryEntry { account: a.identity.clone(), recognizer }))
        .collect()
}

fn render(account: &Account, body: &str, ctx: &RevealContext) -> String {
    let tokens = script::parse(body).unwrap();
    script::validate_for_context(&tokens, ScriptContext::Discovery).unwrap();
    let mut out = String::new();
    for token in tokens {
        match token {
            ScriptToken::Literal(text) => out.push_str(&text),
            ScriptToken::Field(path) => out.push_str(&account.get_value(&path, ctx).unwrap().value),
            ScriptToken::Tab => out.push_str("<TAB>"),
            ScriptToken::Return => out.push_str("<RETURN>"),
            other => panic!("unexpected control token in a discovery script: {other:?}"),
        }
    }
    out
}

/// Scenario 5: a browser extension has augmented the window title with the page's URL; the
/// account's `url` recognizer matches on that URL and its autotype script expands to the
/// account's username, a tab, its passcode, and a return.
#[test]
fn discovery_matches_a_url_and_expands_the_autotype_script() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("chase.toml"),
        r#"
            master_seed = "c2VjcmV0IG1lc3NhZ2UsIHN1Y2Nlc3NmdWxseSBkZWNvZGVkIQ"
            [fields]
            username = "jsmith42"
            passcode = { type = "pin", length = 4 }

            [discovery]
            type = "url"
            urls = ["https://chaseonline.chase.com"]
            script = "{username}{tab}{passcode}{return}"
        "#,
    )
    .unwrap();

    let mut settings = Settings::default();
    settings.accounts_dir = dir.path().to_path_buf();
    let adapter = InMemoryEnvelope;
    let engine = Engine::open(settings, &adapter).unwrap();
    let entries = recognizer_entries(&engine);

    let env = Environment {
        window_title: Some("Chase Online — https://chaseonline.chase.com/home".to_string()),
        url: Some("https://chaseonline.chase.com/home".to_string()),
        ..Default::default()
    };
    let (account, matched) = engine.discover(&entries, &env).unwrap();
    assert_eq!(account.identity, "chase");

    let ctx = RevealContext::none();
    let rendered = render(account, &matched.script, &ctx);
    let passcode = account.get_value("passcode", &ctx).unwrap().value;
    assert_eq!(rendered, format!("jsmith42<TAB>{passcode}<RETURN>"));
    assert_eq!(passcode.len(), 4);
    assert!(passcode.chars().all(|c| c.is_ascii_digit()));

    // Deterministic: a second run against the same account yields the same passcode.
    assert_eq!(account.get_value("passcode", &ctx).unwrap().value, passcode);
}

/// A URL recognizer never matches across a scheme change, so a lookalike `http://` page never
/// gets mistaken for the real `https://` account.
#[test]
fn a_scheme_mismatch_never_discovers_the_account() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("chase.toml"),
        r#"
            master_seed = "m"
            [fields]
            username = "jsmith42"
            [discovery]
            type = "url"
            urls = ["https://chaseonline.chase.com"]
            script = "{username}"
        "#,
    )
    .unwrap();

    let mut settings = Settings::default();
    settings.accounts_dir = dir.path().to_path_buf();
    let adapter = InMemoryEnvelope;
    let engine = Engine::open(settings, &adapter).unwrap();
    let entries = recognizer_entries(&engine);

    let env = Environment { url: Some("http://chaseonline.chase.com/home".to_string()), ..Default::default() };
    assert!(engine.discover(&entries, &env).is_err());
}

/// A file with no top-level `fields` table declares one account per top-level table; an
/// `accounts_files` index can point straight at it, and each account keeps its own seed stream.
#[test]
fn an_accounts_index_loads_a_multi_account_file_with_independent_seeds() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("banks.toml"),
        r#"
            master_seed = "c2VjcmV0IG1lc3NhZ2UsIHN1Y2Nlc3NmdWxseSBkZWNvZGVkIQ"
            [bigbank]
            [bigbank.fields]
            pin = { type = "pin", length = 4 }
            [smallbank]
            master_seed = "YSBkaWZmZXJlbnQgc2VlZCBlbnRpcmVseQ"
            [smallbank.fields]
            pin = { type = "pin", length = 4 }
        "#,
    )
    .unwrap();
    let index_path = dir.path().join("accounts_files");
    fs::write(&index_path, "banks.toml\n").unwrap();

    let mut settings = Settings::default();
    settings.accounts_files = Some(index_path);
    let adapter = InMemoryEnvelope;
    let engine = Engine::open(settings, &adapter).unwrap();

    assert_eq!(engine.all_accounts().len(), 2);
    let ctx = RevealContext::none();
    let bigbank_pin = engine.get_value("bigbank", "pin", &ctx).unwrap().value;
    let smallbank_pin = engine.get_value("smallbank", "pin", &ctx).unwrap().value;
    assert_ne!(bigbank_pin, smallbank_pin);
}

/// A stale or tampered `hashes` manifest is surfaced as a warning on the loaded engine, never as
/// a load failure.
#[test]
fn a_mismatched_hashes_manifest_surfaces_as_an_engine_warning() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("chase.toml"), "master_seed = \"m\"\n[fields]\nusername = \"jsmith42\"\n").unwrap();
    let hashes_path = dir.path().join("hashes.toml");
    fs::write(&hashes_path, "\"chase.toml\" = \"0000000000000000000000000000000000000000000000000000000000000000\"\n").unwrap();

    let mut settings = Settings::default();
    settings.accounts_dir = dir.path().to_path_buf();
    settings.hashes_path = Some(hashes_path);
    let adapter = InMemoryEnvelope;
    let engine = Engine::open(settings, &adapter).unwrap();

    assert_eq!(engine.all_accounts().len(), 1);
}
