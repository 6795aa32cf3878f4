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

use super::Materialized;
use crate::error::Result;
use crate::seed::SeedStream;

/// The content a [`WriteFile`] writes: either a literal byte string, or another generator whose
/// output becomes the file body").
#[derive(Debug, Clone)]
pub enum FileContent {
    Literal(Vec<u8>),
    Generator(Box<super::Generator>),
}

/// `WriteFile(path, content, mode)` — a generator whose materialization is a filesystem side
/// effect rather than a returned secret: it writes `content` to `path` with `mode` and returns a
/// short acknowledgement.
#[derive(Debug, Clone)]
pub struct WriteFile {
    pub path: PathBuf,
    pub content: FileContent,
    pub mode: u32,
}

impl WriteFile {
    pub fn materialize(&self, stream: &mut SeedStream, culprit: &str) -> Result<Materialized> {
        let bytes = match &self.content {
            FileContent::Literal(bytes) => bytes.clone(),
            FileContent::Generator(inner) => match inner.materialize(stream, culprit)? {
                Materialized::Value(s) => s.into_bytes(),
                Materialized::SideEffect { ack, .. } => ack.into_bytes(),
            },
        };
        let ack = format!("wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(Materialized::SideEffect { ack, path: self.path.clone(), content: bytes, mode: self.mode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    #[test]
    fn literal_content_round_trips_into_the_side_effect() {
        let gen = WriteFile { path: PathBuf::from("/tmp/secret.txt"), content: FileContent::Literal(b"hunter2".to_vec()), mode: 0o600 };
        let mut stream = Seed::new("m", "a", "f").stream();
        match gen.materialize(&mut stream, "a.f").unwrap() {
            Materialized::SideEffect { content, mode, path, .. } => {
                assert_eq!(content, b"hunter2");
                assert_eq!(mode, 0o600);
                assert_eq!(path, PathBuf::from("/tmp/secret.txt"));
            },
            Materialized::Value(_) => panic!("expected a side effect"),
        }
    }

    #[test]
    fn nested_generator_content_is_materialized() {
        let inner = super::super::Generator::Pin(super::super::Pin::new(4));
        let gen = WriteFile { path: PathBuf::from("/tmp/pin.txt"), content: FileContent::Generator(Box::new(inner)), mode: 0o600 };
        let mut stream = Seed::new("m", "a", "f").stream();
        match gen.materialize(&mut stream, "a.f").unwrap() {
            Materialized::SideEffect { content, .. } => assert_eq!(content.len(), 4),
            Materialized::Value(_) => panic!("expected a side effect"),
        }
    }
}
