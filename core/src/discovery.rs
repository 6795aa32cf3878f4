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

//! Account discovery: matching the host's current environment (the active window, a typed URL, a
//! working directory, ...) against each account's declared recognizer tree to find the account
//! the user most likely means, without being told its name.
//!
//! Every recognizer carries the script to run once it matches (composites carry their own script
//! rather than deferring to whichever child happened to fire), and `RecognizeUrl` additionally
//! carries the `name` label shown to a user asked to disambiguate between tied candidates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use url::Url;

use crate::account::Account;
use crate::error::{Error, Result};

/// A snapshot of whatever the host can observe about its current context. Every field is
/// optional: a host that can't observe the network name, say, just leaves it `None`, and any
/// recognizer that needs it simply never matches.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub window_title: Option<String>,
    pub url: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub cwd: Option<PathBuf>,
    pub env_vars: BTreeMap<String, String>,
    pub network: Vec<String>,
    pub now: Option<SystemTime>,
}

/// The recognizer tree an account declares to say "this is me" for a given [`Environment`].
/// Every variant owns the script that should run when it (or, for `All`/`Any`, the composite
/// itself) is the one that matched.
#[derive(Debug, Clone)]
pub enum Recognizer {
    Title { patterns: Vec<String>, script: String },
    Url {
        urls: Vec<String>,
        script: String,
        name: Option<String>,
        exact_path: bool,
        fragment: bool,
        default_protocol: String,
    },
    Host { patterns: Vec<String>, script: String },
    User { patterns: Vec<String>, script: String },
    Cwd { paths: Vec<PathBuf>, script: String },
    EnvVar { name: String, value: String, script: String },
    Network { macs: Vec<String>, script: String },
    File {
        path: PathBuf,
        contents: Option<String>,
        ttl: Duration,
        script: String,
    },
    All { children: Vec<Recognizer>, script: String },
    Any { children: Vec<Recognizer>, script: String },
}

impl Recognizer {
    /// The script to run when this recognizer is the one a [`DiscoveryEntry`] matched on.
    pub fn script(&self) -> &str {
        match self {
            Recognizer::Title { script, .. }
            | Recognizer::Url { script, .. }
            | Recognizer::Host { script, .. }
            | Recognizer::User { script, .. }
            | Recognizer::Cwd { script, .. }
            | Recognizer::EnvVar { script, .. }
            | Recognizer::Network { script, .. }
            | Recognizer::File { script, .. }
            | Recognizer::All { script, .. }
            | Recognizer::Any { script, .. } => script,
        }
    }

    /// The disambiguation label shown to a user when several accounts tie, if this recognizer
    /// carries one. Only a `Url` recognizer declares a name; composites expose the first name a
    /// child carries.
    pub fn name(&self) -> Option<&str> {
        match self {
            Recognizer::Url { name, .. } => name.as_deref(),
            Recognizer::All { children, .. } | Recognizer::Any { children, .. } => children.iter().find_map(|c| c.name()),
            _ => None,
        }
    }

    /// Returns a specificity score if this recognizer matches `env`, `None` otherwise. Higher
    /// scores win ties between accounts that both match.
    fn evaluate(&self, env: &Environment) -> Option<u64> {
        match self {
            Recognizer::Title { patterns, .. } => patterns.iter().filter_map(|p| match_strength(env.window_title.as_deref(), p)).max(),
            Recognizer::Host { patterns, .. } => patterns.iter().filter_map(|p| match_strength(env.host.as_deref(), p)).max(),
            Recognizer::User { patterns, .. } => patterns.iter().filter_map(|p| match_strength(env.user.as_deref(), p)).max(),
            Recognizer::Network { macs, .. } => macs.iter().filter_map(|p| env.network.iter().find(|m| m.eq_ignore_ascii_case(p)).map(|_| 2)).max(),
            Recognizer::Url { urls, exact_path, fragment, default_protocol, .. } => {
                urls.iter().filter_map(|u| evaluate_url(env.url.as_deref(), u, *exact_path, *fragment, default_protocol)).max()
            },
            Recognizer::Cwd { paths, .. } => paths.iter().filter_map(|p| evaluate_cwd(env.cwd.as_deref(), p)).max(),
            Recognizer::EnvVar { name, value, .. } => {
                if env.env_vars.get(name).map(|v| v == value).unwrap_or(false) {
                    Some(2)
                } else {
                    None
                }
            },
            Recognizer::File { path, contents, ttl, .. } => evaluate_file(path, contents.as_deref(), *ttl, env.now),
            Recognizer::All { children, .. } => {
                let mut total = 0u64;
                for child in children {
                    total += child.evaluate(env)?;
                }
                Some(total)
            },
            Recognizer::Any { children, .. } => children.iter().filter_map(|c| c.evaluate(env)).max(),
        }
    }
}

fn match_strength(observed: Option<&str>, pattern: &str) -> Option<u64> {
    let observed = observed?;
    if observed.eq_ignore_ascii_case(pattern) {
        Some(2)
    } else if observed.to_ascii_lowercase().contains(&pattern.to_ascii_lowercase()) {
        Some(1)
    } else {
        None
    }
}

/// Matches a URL recognizer against the observed URL, parsed out of a browser window title by a
/// title-augmenting extension. When the recognizer's URL carries no scheme, `default_protocol` is
/// assumed. A scheme mismatch is treated as no match at all rather than a partial one: a
/// recognizer declared for `https://bank.example` must never fire against `http://bank.example`,
/// since that's exactly the shape of a phishing page.
fn evaluate_url(observed: Option<&str>, pattern: &str, exact_path: bool, match_fragment: bool, default_protocol: &str) -> Option<u64> {
    let observed_url = Url::parse(observed?).ok()?;
    let qualified_pattern = if pattern.contains("://") { pattern.to_string() } else { format!("{default_protocol}://{pattern}") };
    let pattern_url = Url::parse(&qualified_pattern).ok()?;

    if observed_url.scheme() != pattern_url.scheme() {
        return None;
    }
    if observed_url.host_str() != pattern_url.host_str() {
        return None;
    }
    if match_fragment && observed_url.fragment() != pattern_url.fragment() {
        return None;
    }

    if exact_path {
        if observed_url.path() == pattern_url.path() { Some(2) } else { None }
    } else if observed_url.path() == pattern_url.path() {
        Some(2)
    } else if observed_url.path().starts_with(pattern_url.path()) {
        Some(1)
    } else {
        None
    }
}

fn evaluate_cwd(observed: Option<&Path>, prefix: &Path) -> Option<u64> {
    let observed = observed?;
    if observed.starts_with(prefix) {
        Some(prefix.as_os_str().len() as u64)
    } else {
        None
    }
}

/// Matches a file-presence recognizer: the file must exist, have been modified within `ttl` of
/// `now` (defaulting to the real clock if `now` is unset), and, if `contents` is given, its body
/// must equal it exactly.
fn evaluate_file(path: &Path, contents: Option<&str>, ttl: Duration, now: Option<SystemTime>) -> Option<u64> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    let now = now.unwrap_or_else(SystemTime::now);
    let age = now.duration_since(modified).ok()?;
    if age > ttl {
        return None;
    }
    if let Some(expected) = contents {
        let actual = std::fs::read_to_string(path).ok()?;
        if actual != expected {
            return None;
        }
        Some(2)
    } else {
        Some(1)
    }
}

/// One account's worth of recognizer declarations.
pub struct DiscoveryEntry {
    pub account: String,
    pub recognizer: Recognizer,
}

/// What [`discover`] returns for a single matched account: the script to run (with its field
/// placeholders still unexpanded — a caller with access to the [`Account`] interpolates them) and
/// the disambiguation name, if the winning recognizer declared one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryMatch {
    pub account: String,
    pub script: String,
    pub name: Option<String>,
}

/// Finds the single best-matching account for `env` among `entries`, breaking ties by
/// specificity score and then by earliest declaration order.
///
/// Returns [`Error::NoAccountDiscovered`] when nothing matches, and
/// [`Error::DiscoveryAmbiguous`] (carrying every tied candidate's disambiguation name, or account
/// name if it declared none) when more than one distinct account ties for the top score.
pub fn discover(entries: &[DiscoveryEntry], env: &Environment) -> Result<DiscoveryMatch> {
    let mut candidates: Vec<(usize, u64, &DiscoveryEntry)> =
        entries.iter().enumerate().filter_map(|(i, entry)| entry.recognizer.evaluate(env).map(|score| (i, score, entry))).collect();

    if candidates.is_empty() {
        return Err(Error::NoAccountDiscovered);
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let top_score = candidates[0].1;
    let tied: Vec<&(usize, u64, &DiscoveryEntry)> = candidates.iter().filter(|(_, score, _)| *score == top_score).collect();

    let distinct_accounts: std::collections::BTreeSet<&str> = tied.iter().map(|(_, _, e)| e.account.as_str()).collect();
    if distinct_accounts.len() > 1 {
        let labels = tied
            .iter()
            .map(|(_, _, e)| e.recognizer.name().map(|n| n.to_string()).unwrap_or_else(|| e.account.clone()))
            .collect();
        return Err(Error::DiscoveryAmbiguous(labels));
    }

    let winner = candidates[0].2;
    Ok(DiscoveryMatch { account: winner.account.clone(), script: winner.recognizer.script().to_string(), name: winner.recognizer.name().map(str::to_string) })
}

/// Convenience wrapper that also filters out stealth accounts: a stealth account is discoverable
/// only by explicit name, never by environment matching.
pub fn discover_excluding_stealth(entries: &[DiscoveryEntry], accounts: &[Account], env: &Environment) -> Result<DiscoveryMatch> {
    let visible: Vec<&DiscoveryEntry> =
        entries.iter().filter(|entry| accounts.iter().find(|a| a.identity == entry.account).map(|a| !a.is_stealth()).unwrap_or(true)).collect();
    let owned: Vec<DiscoveryEntry> =
        visible.into_iter().map(|e| DiscoveryEntry { account: e.account.clone(), recognizer: e.recognizer.clone() }).collect();
    discover(&owned, env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(pattern: &str, script: &str) -> Recognizer {
        Recognizer::Title { patterns: vec![pattern.to_string()], script: script.to_string() }
    }

    fn host(pattern: &str, script: &str) -> Recognizer {
        Recognizer::Host { patterns: vec![pattern.to_string()], script: script.to_string() }
    }

    fn url(pattern: &str, script: &str) -> Recognizer {
        Recognizer::Url {
            urls: vec![pattern.to_string()],
            script: script.to_string(),
            name: None,
            exact_path: false,
            fragment: false,
            default_protocol: "https".to_string(),
        }
    }

    #[test]
    fn exact_title_match_beats_substring_match() {
        let entries = vec![
            DiscoveryEntry { account: "acme".to_string(), recognizer: title("Acme Corp Login", "s1") },
            DiscoveryEntry { account: "acme-exact".to_string(), recognizer: title("Acme Login", "s2") },
        ];
        let env = Environment { window_title: Some("Acme Login".to_string()), ..Default::default() };
        assert_eq!(discover(&entries, &env).unwrap().account, "acme-exact");
    }

    #[test]
    fn longest_cwd_prefix_wins() {
        let entries = vec![
            DiscoveryEntry { account: "outer".to_string(), recognizer: Recognizer::Cwd { paths: vec![PathBuf::from("/home/alice")], script: "s".to_string() } },
            DiscoveryEntry {
                account: "inner".to_string(),
                recognizer: Recognizer::Cwd { paths: vec![PathBuf::from("/home/alice/work")], script: "s".to_string() },
            },
        ];
        let env = Environment { cwd: Some(PathBuf::from("/home/alice/work/project")), ..Default::default() };
        assert_eq!(discover(&entries, &env).unwrap().account, "inner");
    }

    #[test]
    fn protocol_mismatch_is_treated_as_no_match() {
        let entries = vec![DiscoveryEntry { account: "bank".to_string(), recognizer: url("https://bank.example/login", "s") }];
        let env = Environment { url: Some("http://bank.example/login".to_string()), ..Default::default() };
        assert!(matches!(discover(&entries, &env), Err(Error::NoAccountDiscovered)));
    }

    #[test]
    fn exact_path_rejects_a_prefix_match() {
        let entries = vec![DiscoveryEntry {
            account: "bank".to_string(),
            recognizer: Recognizer::Url {
                urls: vec!["https://bank.example/login".to_string()],
                script: "s".to_string(),
                name: None,
                exact_path: true,
                fragment: false,
                default_protocol: "https".to_string(),
            },
        }];
        let env = Environment { url: Some("https://bank.example/login/step2".to_string()), ..Default::default() };
        assert!(matches!(discover(&entries, &env), Err(Error::NoAccountDiscovered)));
    }

    #[test]
    fn no_scheme_in_pattern_assumes_default_protocol() {
        let entries = vec![DiscoveryEntry { account: "bank".to_string(), recognizer: url("bank.example/login", "s") }];
        let env = Environment { url: Some("https://bank.example/login".to_string()), ..Default::default() };
        assert_eq!(discover(&entries, &env).unwrap().account, "bank");
    }

    #[test]
    fn ambiguous_equal_matches_are_reported_with_labels() {
        let entries = vec![
            DiscoveryEntry { account: "a".to_string(), recognizer: host("example.com", "s") },
            DiscoveryEntry { account: "b".to_string(), recognizer: host("example.com", "s") },
        ];
        let env = Environment { host: Some("example.com".to_string()), ..Default::default() };
        let err = discover(&entries, &env).unwrap_err();
        assert!(matches!(err, Error::DiscoveryAmbiguous(labels) if labels.len() == 2));
    }

    #[test]
    fn no_match_reports_no_account_discovered() {
        let entries = vec![DiscoveryEntry { account: "a".to_string(), recognizer: host("example.com", "s") }];
        let env = Environment::default();
        assert!(matches!(discover(&entries, &env), Err(Error::NoAccountDiscovered)));
    }

    #[test]
    fn all_requires_every_child_to_match() {
        let recognizer = Recognizer::All { children: vec![host("example.com", "s"), Recognizer::User { patterns: vec!["alice".to_string()], script: "s".to_string() }], script: "both".to_string() };
        let entries = vec![DiscoveryEntry { account: "a".to_string(), recognizer }];
        let partial_env = Environment { host: Some("example.com".to_string()), ..Default::default() };
        assert!(matches!(discover(&entries, &partial_env), Err(Error::NoAccountDiscovered)));

        let full_env = Environment { host: Some("example.com".to_string()), user: Some("alice".to_string()), ..Default::default() };
        let matched = discover(&entries, &full_env).unwrap();
        assert_eq!(matched.account, "a");
        assert_eq!(matched.script, "both");
    }

    #[test]
    fn any_exposes_its_own_script_regardless_of_which_child_matched() {
        let recognizer = Recognizer::Any { children: vec![title("Chase Online", "leaf-script")], script: "composite-script".to_string() };
        let entries = vec![DiscoveryEntry { account: "chase".to_string(), recognizer }];
        let env = Environment { window_title: Some("Chase Online".to_string()), ..Default::default() };
        assert_eq!(discover(&entries, &env).unwrap().script, "composite-script");
    }

    #[test]
    fn stealth_accounts_are_excluded_from_discovery() {
        let entries = vec![DiscoveryEntry { account: "hidden".to_string(), recognizer: host("example.com", "s") }];
        let mut stealth_account = Account::new("hidden", "m");
        stealth_account.stealth = true;
        let env = Environment { host: Some("example.com".to_string()), ..Default::default() };
        assert!(matches!(discover_excluding_stealth(&entries, &[stealth_account], &env), Err(Error::NoAccountDiscovered)));
    }
}
