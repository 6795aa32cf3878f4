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

//! Script parsing for a field whose value is a sequence of keystrokes rather than a single
//! string: field interpolation (`{field}`, `{field.key}`, `{field[key]}`) interleaved with control
//! tokens (`{tab}`, `{return}`, `{sleep N}`, `{rate N}`, `{remind msg}`, `{paste}`).
//!
//! Parsing only builds the token list; running it against an account's fields is the caller's job
//! (the CLI harness's `get` subcommand does this for the fields it demonstrates), since token
//! execution needs a typing driver this crate deliberately doesn't own.

use crate::error::{Error, Result};

/// Where a parsed script is about to run. `Remind` is only meaningful before typing starts, so
/// it's rejected once typing is already underway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptContext {
    Discovery,
    AutoType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptToken {
    Literal(String),
    Field(String),
    Tab,
    Return,
    Sleep(u64),
    Rate(u64),
    Remind(String),
    Paste,
}

impl ScriptToken {
    /// Whether this token is legal to execute in `context`.
    fn valid_in(&self, context: ScriptContext) -> bool {
        !matches!((self, context), (ScriptToken::Remind(_), ScriptContext::AutoType))
    }
}

/// Converts `field[key]` bracket syntax to the dotted path the account resolver expects.
fn normalize_field_path(raw: &str) -> String {
    raw.replace('[', ".").replace(']', "")
}

/// Parses a script body into a token sequence, without yet checking the tokens are valid for a
/// particular execution context (use [`validate_for_context`] once the run site is known).
pub fn parse(script: &str) -> Result<Vec<ScriptToken>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            literal.push(c);
            continue;
        }
        if !literal.is_empty() {
            tokens.push(ScriptToken::Literal(std::mem::take(&mut literal)));
        }
        let mut inner = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            inner.push(c);
        }
        if !closed {
            return Err(Error::BadScriptToken { token: inner, culprit: script.to_string() });
        }
        tokens.push(parse_token(&inner, script)?);
    }
    if !literal.is_empty() {
        tokens.push(ScriptToken::Literal(literal));
    }
    Ok(tokens)
}

fn parse_token(inner: &str, script: &str) -> Result<ScriptToken> {
    let inner = inner.trim();
    match inner {
        "tab" => return Ok(ScriptToken::Tab),
        "return" => return Ok(ScriptToken::Return),
        "paste" => return Ok(ScriptToken::Paste),
        _ => {},
    }
    if let Some(rest) = inner.strip_prefix("sleep ") {
        let ms: u64 = rest.trim().parse().map_err(|_| Error::BadScriptToken { token: inner.to_string(), culprit: script.to_string() })?;
        return Ok(ScriptToken::Sleep(ms));
    }
    if let Some(rest) = inner.strip_prefix("rate ") {
        let wpm: u64 = rest.trim().parse().map_err(|_| Error::BadScriptToken { token: inner.to_string(), culprit: script.to_string() })?;
        return Ok(ScriptToken::Rate(wpm));
    }
    if let Some(rest) = inner.strip_prefix("remind ") {
        return Ok(ScriptToken::Remind(rest.trim().to_string()));
    }
    if inner.is_empty() {
        return Err(Error::BadScriptToken { token: inner.to_string(), culprit: script.to_string() });
    }
    Ok(ScriptToken::Field(normalize_field_path(inner)))
}

/// Rejects any parsed token that isn't legal for `context`.
pub fn validate_for_context(tokens: &[ScriptToken], context: ScriptContext) -> Result<()> {
    for token in tokens {
        if !token.valid_in(context) {
            return Err(Error::BadScriptToken { token: format!("{token:?}"), culprit: format!("{context:?}") });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_text_and_field_interpolation() {
        let tokens = parse("user: {username}{tab}pass: {password}").unwrap();
        assert_eq!(
            tokens,
            vec![
                ScriptToken::Literal("user: ".to_string()),
                ScriptToken::Field("username".to_string()),
                ScriptToken::Tab,
                ScriptToken::Literal("pass: ".to_string()),
                ScriptToken::Field("password".to_string()),
            ]
        );
    }

    #[test]
    fn bracket_syntax_normalizes_to_dotted_path() {
        let tokens = parse("{address[street]}").unwrap();
        assert_eq!(tokens, vec![ScriptToken::Field("address.street".to_string())]);
    }

    #[test]
    fn parses_control_tokens_with_arguments() {
        let tokens = parse("{sleep 500}{rate 200}{remind check the 2fa app}{paste}").unwrap();
        assert_eq!(
            tokens,
            vec![
                ScriptToken::Sleep(500),
                ScriptToken::Rate(200),
                ScriptToken::Remind("check the 2fa app".to_string()),
                ScriptToken::Paste,
            ]
        );
    }

    #[test]
    fn unclosed_brace_is_a_bad_token() {
        assert!(parse("{tab").is_err());
    }

    #[test]
    fn remind_is_rejected_once_autotype_is_underway() {
        let tokens = parse("{remind look at your phone}").unwrap();
        assert!(validate_for_context(&tokens, ScriptContext::Discovery).is_ok());
        assert!(validate_for_context(&tokens, ScriptContext::AutoType).is_err());
    }
}
