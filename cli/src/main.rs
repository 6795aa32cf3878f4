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

mod cli;
mod logging;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use keyforge_core::archive::Archive;
use keyforge_core::discovery::{DiscoveryEntry, Environment};
use keyforge_core::obscure::envelope::GpgEnvelope;
use keyforge_core::obscure::RevealContext;
use keyforge_core::script::{self, ScriptContext, ScriptToken};
use keyforge_core::settings::Settings;
use keyforge_core::{Account, Engine, Error};
use log::error;

use cli::{Cli, Command};

const LOG_TARGET: &str = "keyforge::cli::main";

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(cli.log_file.as_deref(), cli.verbose) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(target: LOG_TARGET, "{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// The `keyforge` subdirectory of the platform's config directory (e.g. `~/.config/keyforge` on
/// Linux), used as a fallback when the caller doesn't point us at a config file or accounts
/// directory explicitly.
fn default_config_dir() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("keyforge"))
}

fn run(cli: Cli) -> Result<(), Error> {
    let config_path = cli.config.or_else(|| default_config_dir().map(|d| d.join("config.toml")));
    let mut settings = Settings::load(config_path.as_deref())?;
    match cli.accounts_dir {
        Some(dir) => settings.accounts_dir = dir,
        None if settings.accounts_dir == std::path::Path::new(".") => {
            if let Some(dir) = default_config_dir() {
                settings.accounts_dir = dir.join("accounts");
            }
        },
        None => {},
    }

    let adapter = GpgEnvelope { executable: settings.gpg_executable.clone(), home: settings.gpg_home.clone(), armor: settings.gpg_armor };
    let engine = Engine::open(settings, &adapter)?;
    let ctx = RevealContext::with_envelope(&adapter);

    match cli.command {
        Command::Get { account, path, seed, stealth_seed } => run_get(&engine, &account, path.as_deref(), seed.as_deref(), stealth_seed.as_deref(), &ctx),
        Command::Discover { title, url, host } => run_discover(&engine, title, url, host, &ctx),
        Command::Archive => run_archive(&engine, &ctx),
        Command::Changed => run_changed(&engine, &ctx),
    }
}

/// Prompts on the terminal for a stealth account's seed, since it is stored nowhere and must be
/// supplied fresh at every lookup.
fn prompt_stealth_seed(account: &str) -> Result<String, Error> {
    rpassword::prompt_password(format!("account seed for stealth account '{account}': ")).map_err(Error::IoFailure)
}

fn run_get(engine: &Engine, account: &str, path: Option<&str>, seed: Option<&str>, stealth_seed: Option<&str>, ctx: &RevealContext) -> Result<(), Error> {
    let resolved_account = engine.get_account(account)?;
    let prompted;
    let mut ctx = RevealContext { envelope: ctx.envelope, scrypt_passphrase: ctx.scrypt_passphrase, scrypt_user_key: ctx.scrypt_user_key, extra_seed: None, stealth_account_seed: None };
    if let Some(seed) = seed {
        ctx = ctx.with_extra_seed(seed);
    }
    if resolved_account.is_stealth() {
        prompted = match stealth_seed {
            Some(seed) => seed.to_string(),
            None => prompt_stealth_seed(account)?,
        };
        ctx = ctx.with_stealth_account_seed(&prompted);
    }
    if let Some(path) = path {
        if let Some((write_path, content, mode)) = resolved_account.write_file_side_effect(path, &ctx)? {
            write_side_effect_file(&write_path, &content, mode)?;
        }
    }
    let value = match path {
        Some(path) => resolved_account.get_value(path, &ctx)?,
        None => resolved_account.default_value(&engine.settings.default_field, &ctx)?,
    };
    println!("{}", value.value);
    Ok(())
}

/// Performs the filesystem side effect a `WriteFile` generator describes: writes its content, then
/// locks the mode down, mirroring the write-then-secure sequence the teacher's identity files use.
fn write_side_effect_file(path: &std::path::Path, content: &[u8], mode: u32) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    {
        let _ = mode;
    }
    Ok(())
}

/// One [`DiscoveryEntry`] per account that declared a `discovery` recognizer tree; accounts with
/// none simply never participate in environment matching.
fn recognizer_entries(engine: &Engine) -> Vec<DiscoveryEntry> {
    engine
        .all_accounts()
        .iter()
        .filter_map(|account| account.discovery.clone().map(|recognizer| DiscoveryEntry { account: account.identity.clone(), recognizer }))
        .collect()
}

/// Renders a parsed script against the matched account, substituting field placeholders with
/// their materialized values and control tokens with their printable stand-ins (the real typing
/// and clipboard drivers live outside this crate; this is what a headless caller sees).
fn render_script(account: &Account, script_body: &str, ctx: &RevealContext) -> Result<String, Error> {
    let tokens = script::parse(script_body)?;
    script::validate_for_context(&tokens, ScriptContext::Discovery)?;
    let mut out = String::new();
    for token in tokens {
        match token {
            ScriptToken::Literal(text) => out.push_str(&text),
            ScriptToken::Field(path) => out.push_str(&account.get_value(&path, ctx)?.value),
            ScriptToken::Tab => out.push_str("<TAB>"),
            ScriptToken::Return => out.push_str("<RETURN>"),
            ScriptToken::Sleep(n) => out.push_str(&format!("<SLEEP {n}>")),
            ScriptToken::Rate(n) => out.push_str(&format!("<RATE {n}>")),
            ScriptToken::Remind(msg) => out.push_str(&format!("<REMIND {msg}>")),
            ScriptToken::Paste => out.push_str("<PASTE>"),
        }
    }
    Ok(out)
}

fn run_discover(engine: &Engine, title: Option<String>, url: Option<String>, host: Option<String>, ctx: &RevealContext) -> Result<(), Error> {
    let entries = recognizer_entries(engine);
    let env = Environment { window_title: title, url, host, ..Default::default() };
    let (account, matched) = engine.discover(&entries, &env)?;
    println!("{}", render_script(account, &matched.script, ctx)?);
    Ok(())
}

fn run_archive(engine: &Engine, ctx: &RevealContext) -> Result<(), Error> {
    let archive = engine.write_archive(&engine.settings.archive_path, ctx)?;
    println!("wrote archive for {} accounts to {}", archive.accounts.len(), engine.settings.archive_path.display());
    Ok(())
}

fn run_changed(engine: &Engine, ctx: &RevealContext) -> Result<(), Error> {
    let new_archive = engine.build_archive(ctx)?;
    let path = &engine.settings.archive_path;
    if !path.exists() {
        println!("no prior archive at {}; nothing to compare against", path.display());
        return Ok(());
    }
    let old_text = fs::read_to_string(path)?;
    let old_archive = Archive::from_json(&old_text)?;
    let changes = keyforge_core::archive::diff(&old_archive, &new_archive, &engine.settings.dynamic_fields);
    if changes.is_empty() {
        println!("no changes since the last archive");
    } else {
        for change in changes {
            println!("{change:?}");
        }
    }
    Ok(())
}
