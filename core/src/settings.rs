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

//! Runtime configuration. `Settings` is built explicitly by the caller and threaded through the
//! facade rather than read from a process-global, so a library embedder (or a test) can run with
//! whatever values it likes without touching the environment.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::obscure::envelope::GpgArmor;

fn default_account_file_mask() -> u32 {
    0o077
}

fn default_config_dir_mask() -> u32 {
    0o077
}

fn default_archive_stale_days() -> u64 {
    30
}

fn default_gpg_executable() -> String {
    "gpg".to_string()
}

fn default_gpg_armor() -> GpgArmor {
    GpgArmor::Always
}

fn default_default_field() -> Vec<String> {
    vec!["passcode".to_string(), "password".to_string(), "passphrase".to_string()]
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_display_time() -> u64 {
    60
}

fn default_ms_per_char() -> u64 {
    12
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_xdotool_executable() -> String {
    "xdotool".to_string()
}

fn default_xsel_executable() -> String {
    "xsel".to_string()
}

fn default_dmenu_executable() -> String {
    "dmenu".to_string()
}

fn default_selection_utility() -> String {
    "dmenu".to_string()
}

/// Every config key the engine recognizes. Unset keys fall back to the defaults below, which are
/// also what a bare `Settings::default()` produces; [`Settings::load`] layers a TOML file and then
/// `KEYFORGE_*` environment variables on top of them.
///
/// Several keys here (`browsers`, `xdotool_executable`, `selection_utility`, ...) are consumed
/// only by external collaborators this crate deliberately doesn't implement — the clipboard/
/// auto-type drivers and a GUI/dmenu selector. They're still recognized and carried here so a
/// host embedding this crate has one place to read them from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub accounts_dir: PathBuf,
    /// An optional index file of newline-separated account file paths (see
    /// [`crate::loader::read_accounts_index`]). When set, it replaces a plain directory scan of
    /// `accounts_dir` as the source of account files to load.
    pub accounts_files: Option<PathBuf>,
    /// A `hashes` manifest (`path = hex_digest` per account file) checked at startup; a mismatch
    /// or missing entry is logged as a warning, never a hard failure. `None` skips the check.
    pub hashes_path: Option<PathBuf>,
    pub archive_path: PathBuf,
    pub previous_archive_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_archive_stale_days")]
    pub archive_stale_days: u64,
    #[serde(default = "default_account_file_mask")]
    pub account_file_mask: u32,
    #[serde(default = "default_config_dir_mask")]
    pub config_dir_mask: u32,
    /// Whether a loose-permission account or config file gets tightened in place at load time
    /// (`fs::set_permissions`, clearing the bits `account_file_mask`/`config_dir_mask` forbid)
    /// instead of merely logging a warning.
    pub auto_tighten_permissions: bool,
    #[serde(default = "default_gpg_executable")]
    pub gpg_executable: String,
    pub gpg_home: Option<String>,
    #[serde(default = "default_gpg_armor")]
    pub gpg_armor: GpgArmor,
    pub gpg_ids: Vec<String>,
    pub dynamic_fields: Vec<String>,
    pub hidden_fields: Vec<String>,
    #[serde(default = "default_default_field")]
    pub default_field: Vec<String>,
    pub default_vector_field: Option<String>,
    pub credential_ids: Vec<String>,
    pub credential_secrets: Vec<String>,
    #[serde(default = "default_display_time")]
    pub display_time: u64,
    #[serde(default = "default_ms_per_char")]
    pub ms_per_char: u64,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    pub edit_account: Option<String>,
    pub edit_template: Option<String>,
    pub browsers: HashMap<String, String>,
    pub default_browser: Option<String>,
    pub command_aliases: HashMap<String, String>,
    #[serde(default = "default_protocol")]
    pub default_protocol: String,
    pub label_color: Option<String>,
    pub highlight_color: Option<String>,
    pub color_scheme: Option<String>,
    pub use_pager: bool,
    #[serde(default = "default_selection_utility")]
    pub selection_utility: String,
    pub verbose: bool,
    pub account_templates: Vec<String>,
    pub default_account_template: Option<String>,
    #[serde(default = "default_xdotool_executable")]
    pub xdotool_executable: String,
    #[serde(default = "default_xsel_executable")]
    pub xsel_executable: String,
    #[serde(default = "default_dmenu_executable")]
    pub dmenu_executable: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            accounts_dir: PathBuf::from("."),
            accounts_files: None,
            hashes_path: None,
            archive_path: PathBuf::from("archive.json"),
            previous_archive_path: None,
            log_file: None,
            archive_stale_days: default_archive_stale_days(),
            account_file_mask: default_account_file_mask(),
            config_dir_mask: default_config_dir_mask(),
            auto_tighten_permissions: false,
            gpg_executable: default_gpg_executable(),
            gpg_home: None,
            gpg_armor: default_gpg_armor(),
            gpg_ids: Vec::new(),
            dynamic_fields: Vec::new(),
            hidden_fields: Vec::new(),
            default_field: default_default_field(),
            default_vector_field: None,
            credential_ids: Vec::new(),
            credential_secrets: Vec::new(),
            display_time: default_display_time(),
            ms_per_char: default_ms_per_char(),
            encoding: default_encoding(),
            edit_account: None,
            edit_template: None,
            browsers: HashMap::new(),
            default_browser: None,
            command_aliases: HashMap::new(),
            default_protocol: default_protocol(),
            label_color: None,
            highlight_color: None,
            color_scheme: None,
            use_pager: true,
            selection_utility: default_selection_utility(),
            verbose: false,
            account_templates: Vec::new(),
            default_account_template: None,
            xdotool_executable: default_xdotool_executable(),
            xsel_executable: default_xsel_executable(),
            dmenu_executable: default_dmenu_executable(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from an optional TOML config file, with `KEYFORGE_*` environment variables
    /// (e.g. `KEYFORGE_ACCOUNTS_DIR`) taking precedence, in the manner of the `config` crate's
    /// layered `Config::builder`.
    pub fn load(config_path: Option<&std::path::Path>) -> Result<Self> {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Settings::default()).map_err(|e| Error::Config(e.to_string()))?);

        if let Some(path) = config_path {
            if path.exists() {
                builder = builder.add_source(config::File::from(path));
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("KEYFORGE").separator("_"));

        let config = builder.build().map_err(|e| Error::Config(e.to_string()))?;
        config.try_deserialize().map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.archive_stale_days, 30);
        assert_eq!(settings.gpg_executable, "gpg");
        assert_eq!(settings.gpg_armor, GpgArmor::Always);
        assert!(!settings.auto_tighten_permissions);
    }

    #[test]
    fn loading_with_no_file_and_no_env_yields_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.archive_stale_days, 30);
    }
}
