//! Buffer-resident cursor scanner
//!
//! Every design file is read into memory once and tokenized in place. The
//! scanner knows nothing about the individual grammars: it only offers the
//! primitives the record loops are built from (skip whitespace, peek the next
//! significant byte, read an unsigned integer, read a prefixed identifier and
//! optionally consume a delimiter).
//!
//! Newlines carry no meaning here. Record boundaries are found by peeking the
//! leading byte of the next token.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected byte {:?} at offset {offset}", char::from(*byte))]
    Stalled { offset: usize, byte: u8 },
}

pub struct Cursor {
    input: Vec<u8>,
    pos: usize,
}

impl Cursor {
    /// Read the whole file into a single buffer.
    pub fn open(path: &Path) -> Result<Self, ScanError> {
        let input = std::fs::read(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(input))
    }

    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into(),
            pos: 0,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Current byte offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn skip_whitespace(&mut self) {
        while self.current().is_some_and(is_blank) {
            self.pos += 1;
        }
    }

    /// Next non-whitespace byte, without consuming anything. `None` at end of input.
    pub fn peek_significant(&self) -> Option<u8> {
        self.next_significant().map(|(_, byte)| byte)
    }

    /// Leading byte of the token after the next one, without consuming anything.
    ///
    /// Tokens are maximal runs of non-whitespace bytes.
    pub fn peek_second_significant(&self) -> Option<u8> {
        let (start, _) = self.next_significant()?;
        let rest = &self.input[start..];
        let token_len = rest.iter().position(|&b| is_blank(b))?;
        rest[token_len..].iter().copied().find(|&b| !is_blank(b))
    }

    /// Consume consecutive decimal digits after any whitespace.
    ///
    /// Zero digits yield 0, indistinguishable from a literal `0`. Accumulation
    /// wraps instead of checking for overflow.
    pub fn parse_unsigned(&mut self) -> u32 {
        self.skip_whitespace();
        let mut value: u32 = 0;
        while let Some(digit @ b'0'..=b'9') = self.current() {
            value = value.wrapping_mul(10).wrapping_add(u32::from(digit - b'0'));
            self.pos += 1;
        }
        value
    }

    /// Read `<prefix><digits>`. A missing prefix is tolerated.
    pub fn parse_prefixed_id(&mut self, prefix: u8) -> u32 {
        self.skip_whitespace();
        if self.current() == Some(prefix) {
            self.pos += 1;
        }
        self.parse_unsigned()
    }

    /// Consume one `delimiter` if present, along with the whitespace around it.
    pub fn skip_delimiter(&mut self, delimiter: u8) {
        self.skip_whitespace();
        if self.current() == Some(delimiter) {
            self.pos += 1;
        }
        self.skip_whitespace();
    }

    /// Fail when nothing was consumed since `start`.
    ///
    /// Record loops call this once per iteration so bytes that no rule can
    /// consume surface as an error instead of spinning forever.
    pub fn ensure_progress(&self, start: usize) -> Result<(), ScanError> {
        if self.pos > start {
            return Ok(());
        }
        match self.next_significant() {
            Some((offset, byte)) => Err(ScanError::Stalled { offset, byte }),
            None => Ok(()),
        }
    }

    fn next_significant(&self) -> Option<(usize, u8)> {
        let rest = self.input.get(self.pos..)?;
        rest.iter()
            .position(|&b| !is_blank(b))
            .map(|skip| (self.pos + skip, rest[skip]))
    }

    fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
}

fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}
