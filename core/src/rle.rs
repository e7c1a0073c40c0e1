//! Run-length decoding of a single mask row.
//!
//! A row is a concatenation of `<digits><letters>` tokens such as
//! `120W45K80W`. The encoder pads rows to a fixed width with `0` bytes, and a
//! run length may itself carry leading zeros (`0005W`).
//!
//! # Design
//! Decoding is split in two layers. `Tokens` classifies every stretch of the
//! row as a run, as padding, or as invalid, and never fails. `RunDecoder`
//! applies a `RowPolicy` on top: `Permissive` drops invalid stretches the way
//! a skip-on-mismatch pattern scan would, `Strict` reports the first one.

use serde::{Deserialize, Serialize};

use crate::error::RowFault;

/// Color code of the target region. Matched case-sensitively.
pub const TARGET_COLOR: &str = "W";

/// A horizontal span of `length` pixels sharing one color code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub length: u32,
    pub color: String,
}

impl Run {
    pub fn new(length: u32, color: &str) -> Self {
        Self {
            length,
            color: color.to_string(),
        }
    }

    /// True when this run belongs to the target region.
    pub fn is_target(&self) -> bool {
        self.color == TARGET_COLOR
    }
}

/// One classified stretch of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Run(Run),
    /// Zero bytes with no color code after them.
    Padding,
    Invalid { offset: usize, fault: RowFault },
}

/// Single forward pass over a row's bytes.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    row: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(row: &'a [u8]) -> Self {
        Self { row, pos: 0 }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let row = self.row;
        let start = self.pos;
        while self.pos < row.len() && pred(row[self.pos]) {
            self.pos += 1;
        }
        &row[start..self.pos]
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let start = self.pos;
        let first = *self.row.get(start)?;

        if !first.is_ascii_digit() {
            self.pos += 1;
            return Some(Token::Invalid {
                offset: start,
                fault: RowFault::UnexpectedByte(first),
            });
        }

        let digits = self.take_while(|b| b.is_ascii_digit());
        let color = self.take_while(|b| b.is_ascii_alphabetic());

        if color.is_empty() {
            if digits.iter().all(|&b| b == b'0') {
                return Some(Token::Padding);
            }
            return Some(Token::Invalid {
                offset: start,
                fault: RowFault::DanglingLength,
            });
        }

        let length = std::str::from_utf8(digits)
            .ok()
            .and_then(|d| d.parse::<u32>().ok());
        let color = String::from_utf8_lossy(color);
        Some(match length {
            Some(length) => Token::Run(Run::new(length, &color)),
            None => Token::Invalid {
                offset: start,
                fault: RowFault::LengthOverflow,
            },
        })
    }
}

/// How `RunDecoder` treats stretches that are neither runs nor padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Report the first invalid stretch, and an empty row, as an error.
    #[default]
    Strict,
    /// Skip invalid stretches silently.
    Permissive,
}

/// Decoding failure under `RowPolicy::Strict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowError {
    pub offset: usize,
    pub fault: RowFault,
}

/// Lazy sequence of runs in left-to-right order.
///
/// After yielding an error the decoder is exhausted.
#[derive(Debug, Clone)]
pub struct RunDecoder<'a> {
    tokens: Tokens<'a>,
    policy: RowPolicy,
    done: bool,
}

impl<'a> RunDecoder<'a> {
    pub fn new(row: &'a [u8], policy: RowPolicy) -> Self {
        Self {
            tokens: Tokens::new(row),
            policy,
            done: false,
        }
    }
}

impl Iterator for RunDecoder<'_> {
    type Item = Result<Run, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.tokens.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Token::Run(run)) => return Some(Ok(run)),
                Some(Token::Padding) => continue,
                Some(Token::Invalid { offset, fault }) => match self.policy {
                    RowPolicy::Permissive => continue,
                    RowPolicy::Strict => {
                        self.done = true;
                        return Some(Err(RowError { offset, fault }));
                    }
                },
            }
        }
    }
}

/// Decode a whole row eagerly.
pub fn parse(row: &[u8], policy: RowPolicy) -> Result<Vec<Run>, RowError> {
    RunDecoder::new(row, policy).collect()
}
