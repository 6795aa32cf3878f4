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

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A thin demonstration harness over the keyforge engine. Does not implement clipboard,
/// auto-type, or a pager; those are host-specific collaborators this crate leaves for an embedder
/// to supply.
#[derive(Debug, Parser)]
#[command(name = "keyforge", version, about)]
pub struct Cli {
    /// Path to a config.toml overriding the compiled-in defaults.
    #[arg(long, global = true, env = "KEYFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory containing account definition files.
    #[arg(long, global = true, env = "KEYFORGE_ACCOUNTS_DIR")]
    pub accounts_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr only.
    #[arg(long, global = true, env = "KEYFORGE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints a field's materialized value for an account.
    Get {
        account: String,
        /// Dotted/indexed path within the account; defaults to the account's default field.
        path: Option<String>,
        /// Extra seed fragment folded into every generator drawn for this lookup, for deriving an
        /// alternate secret without editing the account file.
        #[arg(long)]
        seed: Option<String>,
        /// The account seed for a stealth account. A stealth account stores none of its own; if
        /// this is omitted for one, it is prompted for interactively.
        #[arg(long)]
        stealth_seed: Option<String>,
    },
    /// Finds the account that best matches the described environment.
    Discover {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        host: Option<String>,
    },
    /// Writes a fresh archive snapshot of every loaded account.
    Archive,
    /// Compares the current state against the last written archive.
    Changed,
}
