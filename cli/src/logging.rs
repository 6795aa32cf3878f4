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

//! Logging setup for the CLI harness: an embedded `log4rs` YAML template, substituted with the
//! requested log file path (if any) and loaded via `log4rs::init_file`. With no log path, logging
//! falls back to a bare stderr appender built programmatically.

use std::io;
use std::path::Path;

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use thiserror::Error;

const TEMPLATE: &str = include_str!("../config/log4rs_sample.yml");

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to write the rendered log4rs config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse or apply the log4rs config: {0}")]
    Log4rs(String),
}

fn level_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes logging for the process. When `log_path` is given, the embedded YAML template is
/// rendered with that path substituted in and loaded through `log4rs::init_file`; otherwise a
/// minimal stderr-only config is built directly, since there's no file to roll.
pub fn init_logging(log_path: Option<&Path>, verbose: bool) -> Result<(), LoggingError> {
    match log_path {
        Some(path) => init_from_template(path, verbose),
        None => init_stderr_only(verbose),
    }
}

fn init_from_template(log_path: &Path, verbose: bool) -> Result<(), LoggingError> {
    let rendered = TEMPLATE.replace("{{log_path}}", &log_path.display().to_string());
    let rendered = if verbose { rendered.replace("level: info", "level: debug") } else { rendered };

    let config_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)?;
    let rendered_path = config_dir.join(".keyforge-log4rs.generated.yml");
    std::fs::write(&rendered_path, rendered)?;

    log4rs::init_file(&rendered_path, Default::default()).map_err(|e| LoggingError::Log4rs(e.to_string()))
}

fn init_stderr_only(verbose: bool) -> Result<(), LoggingError> {
    let encoder = PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}");
    let stderr = ConsoleAppender::builder().target(Target::Stderr).encoder(Box::new(encoder)).build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level_filter(verbose)))
        .map_err(|e| LoggingError::Log4rs(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| LoggingError::Log4rs(e.to_string()))?;
    Ok(())
}
